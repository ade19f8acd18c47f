//! Viewport synchronizer: owns the single live page surface.
//!
//! Every completed page render disposes the previous surface and builds a new
//! one sized to the renderer's report, then refills it from buffered records.
//! Nothing is resized in place, so no object or selection from the previous
//! page/scale can leak into the next one.

use bevy::prelude::*;

use crate::annotation::{decode_into, Annotation, DecodeReport};
use crate::render::RenderComplete;

use super::page::{PageSurface, SurfaceMode};
use super::viewport::PageViewport;

#[derive(Resource, Default)]
pub struct SurfaceTable {
    mode: SurfaceMode,
    active: Option<PageSurface>,
    /// Bumped on every (re)creation; lets systems notice a fresh surface
    generation: u64,
}

impl SurfaceTable {
    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    /// Change the mode used for surfaces created from now on.
    pub fn set_mode(&mut self, mode: SurfaceMode) {
        self.mode = mode;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the live surface after a render finished.
    ///
    /// `records` are the buffered annotations for the rendered page. Objects
    /// on the old surface that were not flushed beforehand are lost.
    pub fn on_render_complete(
        &mut self,
        event: &RenderComplete,
        records: &[Annotation],
    ) -> DecodeReport {
        self.dispose();

        let viewport = PageViewport::new(
            event.page_number,
            event.width_px,
            event.height_px,
            event.scale,
        );
        let mut surface = PageSurface::new(viewport, self.mode);
        let report = decode_into(&mut surface, records);

        debug!(
            "Created {:?} surface for page {} ({}x{} @ {}), {} objects restored, {} skipped",
            self.mode,
            event.page_number,
            event.width_px,
            event.height_px,
            event.scale,
            report.added,
            report.skipped
        );

        self.active = Some(surface);
        self.generation += 1;
        report
    }

    /// Drop the live surface and everything on it.
    pub fn dispose(&mut self) {
        if let Some(old) = self.active.take() {
            debug!(
                "Disposing surface for page {} ({} objects)",
                old.page_number(),
                old.len()
            );
        }
    }

    pub fn active(&self) -> Option<&PageSurface> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut PageSurface> {
        self.active.as_mut()
    }

    /// The live surface, only if it shows the given page.
    pub fn surface_for(&self, page_number: u32) -> Option<&PageSurface> {
        self.active
            .as_ref()
            .filter(|s| s.page_number() == page_number)
    }
}
