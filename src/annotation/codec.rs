//! Conversion between live surface objects and persisted annotation records.
//!
//! Encoding divides every length by the surface's render scale so records are
//! always in scale-1.0 page pixels; decoding multiplies by the scale of the
//! surface being filled. Corrupt records are skipped one by one.

use bevy::prelude::*;
use thiserror::Error;

use crate::surface::{NewObject, PageSurface, SurfaceObject};
use crate::theme::{array_to_color, color_to_array};

use super::buffer::AnnotationBuffer;
use super::kind::{AnnotationKind, PrimitiveFamily};
use super::record::Annotation;
use super::shape::Shape;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),
    #[error("{kind:?} annotation cannot be drawn with a {found:?} primitive")]
    KindMismatch {
        kind: AnnotationKind,
        found: PrimitiveFamily,
    },
    #[error("position ({0}, {1}) is not finite")]
    InvalidPosition(f32, f32),
    #[error("record belongs to page {record}, surface shows page {surface}")]
    PageMismatch { record: u32, surface: u32 },
    #[error("render scale {0} is not usable")]
    InvalidScale(f32),
}

/// Outcome of filling a surface from records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub added: usize,
    pub skipped: usize,
}

fn family_of(shape: &Shape) -> PrimitiveFamily {
    match shape {
        Shape::Path { .. } => PrimitiveFamily::Path,
        Shape::Ellipse { .. } => PrimitiveFamily::Ellipse,
        Shape::Text { .. } => PrimitiveFamily::Text,
    }
}

fn check_scale(scale: f32) -> Result<(), CodecError> {
    if scale > 0.0 && scale.is_finite() {
        Ok(())
    } else {
        Err(CodecError::InvalidScale(scale))
    }
}

/// Encode one live object into a record for `page_number`.
pub fn encode_object(
    object: &SurfaceObject,
    page_number: u32,
    scale: f32,
    default_author: &str,
) -> Result<Annotation, CodecError> {
    check_scale(scale)?;

    let geometry = serde_json::to_string(&object.shape.scaled(1.0 / scale))
        .map_err(|e| CodecError::MalformedGeometry(e.to_string()))?;

    Ok(Annotation {
        page_number,
        kind: object.kind,
        geometry,
        position: object.origin / scale,
        color: color_to_array(object.color),
        author_id: object
            .author_id
            .clone()
            .unwrap_or_else(|| default_author.to_string()),
    })
}

/// Encode every object on a surface. Blank text boxes are left out.
pub fn encode_surface(surface: &PageSurface, default_author: &str) -> Vec<Annotation> {
    let page = surface.page_number();
    let scale = surface.scale();

    surface
        .objects()
        .iter()
        .filter(|o| !o.is_blank_text())
        .filter_map(|o| match encode_object(o, page, scale, default_author) {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Failed to encode {:?} on page {}: {}", o.kind, page, e);
                None
            }
        })
        .collect()
}

/// Snapshot a surface into the buffer, replacing that page's records.
pub fn flush_surface(surface: &PageSurface, buffer: &mut AnnotationBuffer, default_author: &str) {
    let records = encode_surface(surface, default_author);
    debug!(
        "Flushed {} annotations from page {}",
        records.len(),
        surface.page_number()
    );
    buffer.replace_page(surface.page_number(), records);
}

/// Rebuild one object from a record at the given render scale.
pub fn decode_record(record: &Annotation, scale: f32) -> Result<NewObject, CodecError> {
    check_scale(scale)?;

    let shape: Shape = serde_json::from_str(&record.geometry)
        .map_err(|e| CodecError::MalformedGeometry(e.to_string()))?;

    if !shape.is_well_formed() {
        return Err(CodecError::MalformedGeometry(
            "non-finite or empty primitive".to_string(),
        ));
    }

    let found = family_of(&shape);
    if found != record.kind.primitive() {
        return Err(CodecError::KindMismatch {
            kind: record.kind,
            found,
        });
    }

    if !record.position.is_finite() {
        return Err(CodecError::InvalidPosition(
            record.position.x,
            record.position.y,
        ));
    }

    Ok(NewObject {
        kind: record.kind,
        shape: shape.scaled(scale),
        origin: record.position * scale,
        color: array_to_color(record.color),
        author_id: Some(record.author_id.clone()),
    })
}

/// Add every decodable record to the surface. Interactivity follows the
/// surface mode, so the same records come back editable for the grader and
/// display-only for the student.
pub fn decode_into(surface: &mut PageSurface, records: &[Annotation]) -> DecodeReport {
    let mut report = DecodeReport::default();
    let page = surface.page_number();

    for record in records {
        let decoded = if record.page_number == page {
            decode_record(record, surface.scale())
        } else {
            Err(CodecError::PageMismatch {
                record: record.page_number,
                surface: page,
            })
        };

        match decoded.map(|object| surface.add(object)) {
            Ok(Some(_)) => report.added += 1,
            Ok(None) => {
                debug!("Surface for page {} is not sized, dropping decoded object", page);
                report.skipped += 1;
            }
            Err(e) => {
                warn!("Skipping {:?} annotation on page {}: {}", record.kind, page, e);
                report.skipped += 1;
            }
        }
    }

    report
}
