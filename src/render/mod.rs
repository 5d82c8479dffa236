//! CPU rendering: blob shapes, the background layer, overlays and the compositor.
//!
//! Vector content is rasterized with `vello_cpu` into transparent layers; everything after that
//! (filters, grain, blending) runs on premultiplied RGBA8 buffers.

/// Frame type and host capabilities.
pub mod backend;
/// Fixed-order compositing pipeline.
pub mod compositor;
/// Background layer and cover-fit math.
pub mod layer;
/// Text and logo overlay layout and drawing.
pub mod overlay;
/// Blob shape generation.
pub mod shape;
pub(crate) mod surface;
