//! Page renderer backed by pre-rendered page images.
//!
//! Answer-sheet documents are rasterized ahead of time into one image per
//! page: `{root}/{file_ref}/page-{n}.{png|jpg|jpeg|webp}`. Rendering at a
//! scale only reads the image header; the sprite is stretched to the scaled
//! size on screen.

use std::path::{Path, PathBuf};

use super::{PageRenderer, RenderError, RenderedPage};

const PAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

pub struct RasterPageRenderer {
    root: PathBuf,
}

impl RasterPageRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_dir(&self, file_ref: &str) -> PathBuf {
        self.root.join(file_ref)
    }

    fn find_page_image(&self, file_ref: &str, page_number: u32) -> Option<PathBuf> {
        let dir = self.document_dir(file_ref);
        PAGE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("page-{}.{}", page_number, ext)))
            .find(|p| p.is_file())
    }
}

/// Parse `page-{n}.{ext}` into `n`.
fn page_number_of(path: &Path) -> Option<u32> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if !PAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
        .filter(|n| *n > 0)
}

impl PageRenderer for RasterPageRenderer {
    fn page_count(&self, file_ref: &str) -> Result<u32, RenderError> {
        let dir = self.document_dir(file_ref);
        let entries = std::fs::read_dir(&dir).map_err(|e| RenderError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let count = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| page_number_of(&entry.path()))
            .max()
            .unwrap_or(0);

        if count == 0 {
            return Err(RenderError::NoPages(file_ref.to_string()));
        }
        Ok(count)
    }

    fn render_page(
        &self,
        file_ref: &str,
        page_number: u32,
        scale: f32,
    ) -> Result<RenderedPage, RenderError> {
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(RenderError::InvalidScale(scale));
        }

        let path = self
            .find_page_image(file_ref, page_number)
            .ok_or_else(|| RenderError::MissingPage {
                file_ref: file_ref.to_string(),
                page_number,
            })?;

        let (width, height) = image::image_dimensions(&path)?;

        Ok(RenderedPage {
            page_number,
            width_px: (width as f32 * scale).round(),
            height_px: (height as f32 * scale).round(),
            scale,
            image_path: path,
        })
    }
}
