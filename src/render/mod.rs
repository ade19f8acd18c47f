//! Page rendering: turns (document, page, scale) into a page sprite and
//! reports the rendered pixel size once it is known.
//!
//! The size report ([`RenderComplete`]) is the only signal the annotation
//! surface is rebuilt from. Page changes and zoom changes both go through a
//! [`RenderPageRequest`]; nothing resizes a surface directly.

mod raster;

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use thiserror::Error;

pub use raster::RasterPageRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page {page_number} of '{file_ref}' does not exist")]
    MissingPage { file_ref: String, page_number: u32 },
    #[error("document '{0}' has no pages")]
    NoPages(String),
    #[error("render scale {0} is not usable")]
    InvalidScale(f32),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode page image: {0}")]
    Image(#[from] image::ImageError),
}

/// A page rendered at some scale.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page_number: u32,
    /// Rendered size in surface pixels, scale already applied
    pub width_px: f32,
    pub height_px: f32,
    pub scale: f32,
    pub image_path: PathBuf,
}

/// Source of rendered answer-sheet pages.
pub trait PageRenderer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, file_ref: &str) -> Result<u32, RenderError>;

    /// Render one page (1-based) at `scale`.
    fn render_page(
        &self,
        file_ref: &str,
        page_number: u32,
        scale: f32,
    ) -> Result<RenderedPage, RenderError>;
}

/// Shared handle to the active renderer; cloned into background tasks.
#[derive(Resource, Clone)]
pub struct PageRendererHandle(pub Arc<dyn PageRenderer>);

impl PageRendererHandle {
    pub fn new(renderer: impl PageRenderer + 'static) -> Self {
        Self(Arc::new(renderer))
    }
}

/// Ask for a page to be (re)rendered.
#[derive(Message, Debug, Clone)]
pub struct RenderPageRequest {
    pub file_ref: String,
    pub page_number: u32,
    pub scale: f32,
}

/// A render finished; carries the exact pixel size the surface must take.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct RenderComplete {
    pub page_number: u32,
    pub width_px: f32,
    pub height_px: f32,
    pub scale: f32,
}

#[derive(Message, Debug, Clone)]
pub struct RenderFailed {
    pub page_number: u32,
    pub reason: String,
}

/// Marker for the sprite showing the current page.
#[derive(Component)]
pub struct PageSprite {
    pub page_number: u32,
}

const PAGE_Z: f32 = 0.0;

/// Render the most recent request of the frame and swap the page sprite.
pub fn render_requested_pages(
    mut commands: Commands,
    mut requests: MessageReader<RenderPageRequest>,
    renderer: Option<Res<PageRendererHandle>>,
    asset_server: Res<AssetServer>,
    existing: Query<Entity, With<PageSprite>>,
    mut completed: MessageWriter<RenderComplete>,
    mut failed: MessageWriter<RenderFailed>,
) {
    // Only the last request matters; earlier ones are already stale
    let Some(request) = requests.read().last().cloned() else {
        return;
    };
    let Some(renderer) = renderer else {
        warn!("No page renderer configured");
        return;
    };

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    match renderer
        .0
        .render_page(&request.file_ref, request.page_number, request.scale)
    {
        Ok(page) => {
            info!(
                "Rendered page {} of '{}' at {}x{} (scale {})",
                page.page_number, request.file_ref, page.width_px, page.height_px, page.scale
            );

            commands.spawn((
                Sprite {
                    image: asset_server.load(page.image_path.clone()),
                    custom_size: Some(Vec2::new(page.width_px, page.height_px)),
                    ..default()
                },
                Transform::from_translation(Vec3::new(0.0, 0.0, PAGE_Z)),
                PageSprite {
                    page_number: page.page_number,
                },
            ));

            completed.write(RenderComplete {
                page_number: page.page_number,
                width_px: page.width_px,
                height_px: page.height_px,
                scale: page.scale,
            });
        }
        Err(e) => {
            error!(
                "Failed to render page {} of '{}': {}",
                request.page_number, request.file_ref, e
            );
            failed.write(RenderFailed {
                page_number: request.page_number,
                reason: e.to_string(),
            });
        }
    }
}

pub struct PageRenderPlugin;

impl Plugin for PageRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<RenderPageRequest>()
            .add_message::<RenderComplete>()
            .add_message::<RenderFailed>()
            .add_systems(Update, render_requested_pages);
    }
}
