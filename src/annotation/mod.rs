//! Annotation object model and codec.
//!
//! Annotations are the marks a grader places over an answer-sheet page. Each
//! carries a semantic [`AnnotationKind`] tagged at creation time and a
//! [`Shape`] that draws it; several kinds share the path primitive.
//!
//! ## Module Structure
//!
//! - [`kind`] - Semantic kinds and the primitive family each one uses
//! - [`shape`] - Vector primitives (path, ellipse, text) in object-local pixels
//! - [`record`] - The persisted [`Annotation`] record
//! - [`buffer`] - Page-keyed in-memory snapshot of records
//! - [`codec`] - Surface objects <-> records, with per-object error skipping

mod buffer;
mod codec;
mod kind;
mod record;
mod shape;


pub use buffer::AnnotationBuffer;
pub use codec::{decode_into, flush_surface, DecodeReport};
pub use kind::AnnotationKind;
pub use record::Annotation;
pub use shape::{text_extent, Shape};
