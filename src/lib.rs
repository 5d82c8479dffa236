//! Gradii composes layered wallpapers on the CPU and exports them as PNG.
//!
//! A wallpaper is a plain settings value ([`WallpaperDef`]): a solid background with either a
//! cover-fit photo or a set of randomized blob shapes, a fixed filter chain (blur, brightness,
//! contrast, saturate), film grain, a text or logo overlay and a vignette.
//!
//! - Load and validate settings with [`Wallpaper`]
//! - Drive interactive edits through an [`EditorSession`]
//! - Export the settled frame to a [`DownloadSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod effects;
/// PNG export and download sinks.
pub mod encode;
/// CPU rendering pipeline.
pub mod render;
/// Settings model and JSON boundary.
pub mod scene;
/// Interactive editing session.
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, MAX_CANVAS_SIDE, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{GradiiError, GradiiResult};

pub use crate::assets::color::Color;
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::slot::{ImageSlot, LoadOutcome, LoadTicket, SlotState};
pub use crate::assets::text::{FontFace, ShapedGlyph, ShapedLine, TextShaper, find_fallback_font};
pub use crate::assets::upload::{
    CheckedUpload, DEFAULT_MAX_UPLOAD_BYTES, check_bytes, check_data_url, load_image_ref,
};
pub use crate::effects::composite::BlendMode;
pub use crate::effects::filters::{BlurStrategy, FilterChain};
pub use crate::effects::grain::{NoiseField, apply_grain};
pub use crate::effects::vignette::{VignetteCache, apply_vignette, render_vignette};
pub use crate::encode::png::{ExportArtifact, ExportPayload, encode_png, export_filename};
pub use crate::encode::sink::{DownloadSink, FileSink, InMemorySink};
pub use crate::render::backend::{FrameRGBA, RenderCaps};
pub use crate::render::compositor::Compositor;
pub use crate::render::overlay::OverlayAssets;
pub use crate::scene::model::{
    BackgroundDef, EffectsDef, FiltersDef, LogoOverlay, OffsetDef, Overlay, ShadowDef, ShapeDef,
    TextAlign, TextOverlay, WallpaperDef,
};
pub use crate::scene::wallpaper::Wallpaper;
pub use crate::session::editor::{EditorSession, ImageTarget, Invalidation, SessionOpts};
