use std::time::Instant;

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::text::TextShaper;
use crate::effects::composite::{BlendMode, composite_in_place, fill};
use crate::effects::filters::FilterChain;
use crate::effects::grain::apply_grain;
use crate::effects::vignette::{VignetteCache, apply_vignette};
use crate::foundation::core::Canvas;
use crate::foundation::error::{GradiiError, GradiiResult};
use crate::foundation::math::derive_seed;
use crate::render::backend::{FrameRGBA, RenderCaps};
use crate::render::layer::{BackgroundSource, render_background};
use crate::render::overlay::{OverlayAssets, draw_overlay};
use crate::render::surface::Rasterizer;
use crate::scene::model::{Overlay, WallpaperDef};

/// Buffers at or above this many pixels use rayon for per-row work.
pub const DEFAULT_PARALLEL_MIN_PIXELS: usize = 256 * 256;

/// Everything one compositing pass reads besides the background layer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CompositeInputs<'a> {
    pub(crate) background_color: Color,
    pub(crate) filters: FilterChain,
    pub(crate) grain: f64,
    pub(crate) vignette: f64,
    pub(crate) overlay: &'a Overlay,
    pub(crate) assets: OverlayAssets<'a>,
    pub(crate) seed: Option<u64>,
}

impl<'a> CompositeInputs<'a> {
    pub(crate) fn from_def(def: &'a WallpaperDef, assets: OverlayAssets<'a>) -> Self {
        Self {
            background_color: def.background.color,
            filters: FilterChain::from(&def.filters),
            grain: def.effects.grain,
            vignette: def.effects.vignette,
            overlay: &def.overlay,
            assets,
            seed: def.seed,
        }
    }
}

/// Owns the reusable state of the pipeline: the raster target, the text shaper and the vignette
/// gradient.
#[derive(Debug)]
pub struct Compositor {
    caps: RenderCaps,
    parallel_min_pixels: usize,
    raster: Rasterizer,
    shaper: TextShaper,
    vignette: VignetteCache,
}

impl Compositor {
    /// New compositor for the given host capabilities.
    pub fn new(caps: RenderCaps, parallel_min_pixels: usize) -> Self {
        Self {
            caps,
            parallel_min_pixels,
            raster: Rasterizer::new(),
            shaper: TextShaper::new(),
            vignette: VignetteCache::new(),
        }
    }

    /// Capabilities this compositor was built with.
    pub fn caps(&self) -> RenderCaps {
        self.caps
    }

    fn parallel(&self, canvas: Canvas) -> bool {
        canvas.pixel_count() >= self.parallel_min_pixels
    }

    /// Rasterize the background layer of `def` with the given source on top of the fill.
    #[tracing::instrument(skip_all, fields(w = def.canvas.width, h = def.canvas.height))]
    pub(crate) fn render_background(
        &mut self,
        def: &WallpaperDef,
        source: BackgroundSource<'_>,
    ) -> GradiiResult<Vec<u8>> {
        let t0 = Instant::now();
        let out = render_background(
            &mut self.raster,
            def.canvas,
            def.background.color,
            source,
            def.seed,
        )?;
        tracing::debug!(elapsed_us = t0.elapsed().as_micros() as u64, "background layer");
        Ok(out)
    }

    /// Composite the background layer into `target` in the fixed order: clear, solid fill,
    /// filtered background, grain, overlay, vignette.
    #[tracing::instrument(skip_all, fields(w = target.width, h = target.height))]
    pub(crate) fn composite(
        &mut self,
        target: &mut FrameRGBA,
        background: &[u8],
        inputs: &CompositeInputs<'_>,
    ) -> GradiiResult<()> {
        let canvas = target.canvas();
        if background.len() != canvas.byte_len() || target.data.len() != canvas.byte_len() {
            return Err(GradiiError::render(
                "background layer does not match the target canvas",
            ));
        }
        let parallel = self.parallel(canvas);
        let t0 = Instant::now();

        target.data.fill(0);
        fill(
            &mut target.data,
            inputs.background_color.to_rgba8_premul().to_array(),
        );

        let chain = inputs.filters.clamped();
        if chain.blur_sigma() > 0.0 || !chain.is_color_neutral() {
            let mut filtered = background.to_vec();
            chain.apply_blur(
                &mut filtered,
                canvas.width,
                canvas.height,
                self.caps.blur_strategy(),
                parallel,
            )?;
            chain.apply_color(&mut filtered, parallel);
            composite_in_place(&mut target.data, &filtered, 1.0, BlendMode::Normal)?;
        } else {
            composite_in_place(&mut target.data, background, 1.0, BlendMode::Normal)?;
        }
        let t_filters = t0.elapsed();

        let grain_seed = inputs.seed.map(|s| derive_seed(s, b"grain"));
        apply_grain(
            &mut target.data,
            canvas.width,
            canvas.height,
            inputs.grain,
            grain_seed,
            parallel,
        )?;

        draw_overlay(
            &mut target.data,
            canvas,
            inputs.overlay,
            inputs.assets,
            &mut self.raster,
            &mut self.shaper,
            parallel,
        )?;

        apply_vignette(
            &mut target.data,
            canvas.width,
            canvas.height,
            inputs.vignette,
            &mut self.vignette,
        )?;

        tracing::debug!(
            filters = %chain.css(),
            filters_us = t_filters.as_micros() as u64,
            total_us = t0.elapsed().as_micros() as u64,
            parallel,
            "composite"
        );
        Ok(())
    }

    /// Background plus composite into a fresh frame. Without a photo the shapes are drawn.
    pub fn render(
        &mut self,
        def: &WallpaperDef,
        background_image: Option<&PreparedImage>,
        overlay_assets: OverlayAssets<'_>,
    ) -> GradiiResult<FrameRGBA> {
        def.canvas.check()?;
        let source = match background_image {
            Some(img) => BackgroundSource::Image(img),
            None if def.shapes.is_empty() => BackgroundSource::Solid,
            None => BackgroundSource::Shapes(&def.shapes),
        };
        let background = self.render_background(def, source)?;
        let mut frame = FrameRGBA::transparent(def.canvas);
        let inputs = CompositeInputs::from_def(def, overlay_assets);
        self.composite(&mut frame, &background, &inputs)?;
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
