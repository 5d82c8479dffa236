use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::color::Color;
use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::slot::{ImageSlot, LoadOutcome, LoadTicket, SlotState};
use crate::assets::text::FontFace;
use crate::assets::upload::{DEFAULT_MAX_UPLOAD_BYTES, check_data_url, load_image_ref};
use crate::encode::png::{ExportArtifact, export_frame};
use crate::encode::sink::DownloadSink;
use crate::foundation::error::{GradiiError, GradiiResult};
use crate::foundation::math::derive_seed;
use crate::render::backend::{FrameRGBA, RenderCaps};
use crate::render::compositor::{CompositeInputs, Compositor, DEFAULT_PARALLEL_MIN_PIXELS};
use crate::render::layer::BackgroundSource;
use crate::render::overlay::OverlayAssets;
use crate::scene::model::{Overlay, WallpaperDef};
use crate::scene::palette::{self, ModifiedProperties, PaletteHistory, Property};
use crate::scene::presets::{RESTORED_BLUR, preview_scale};
use crate::session::scheduler::{DEFAULT_FRAME_INTERVAL, FrameDebounce};

/// Options for an [`EditorSession`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOpts {
    /// Host capabilities (filter path, export payload form).
    pub caps: RenderCaps,
    /// Quiet interval before a requested redraw runs.
    pub frame_interval: Duration,
    /// Largest accepted upload, in decoded bytes.
    pub max_upload_bytes: usize,
    /// Buffers with at least this many pixels are processed with rayon.
    pub parallel_min_pixels: usize,
}

impl Default for SessionOpts {
    fn default() -> Self {
        let parallel_min_pixels = std::env::var("GRADII_PARALLEL_MIN_PIXELS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PARALLEL_MIN_PIXELS);
        Self {
            caps: RenderCaps::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            parallel_min_pixels,
        }
    }
}

/// What a settings change invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Invalidation {
    /// Nothing visible changed.
    None,
    /// Filters, effects or overlay changed; the background layer is reused.
    Composite,
    /// The background layer must be redrawn as well.
    Background,
}

/// Which image slot an upload targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageTarget {
    /// Cover-fit background photo.
    Background,
    /// Logo overlay image.
    Logo,
}

/// Interactive editing state: settings, cached layers, image slots and redraw scheduling.
///
/// The session is the single writer. Callers push changes with [`update`](Self::update) and the
/// palette operations, then drive rendering with [`poll`](Self::poll) or
/// [`render_now`](Self::render_now).
#[derive(Debug)]
pub struct EditorSession {
    def: WallpaperDef,
    opts: SessionOpts,
    compositor: Compositor,
    background_image: ImageSlot,
    logo: ImageSlot,
    fonts: HashMap<String, FontFace>,
    default_font: Option<FontFace>,
    background_layer: Option<Vec<u8>>,
    visible: FrameRGBA,
    composite_dirty: bool,
    debounce: FrameDebounce,
    history: PaletteHistory,
    modified: ModifiedProperties,
    rng: StdRng,
}

impl EditorSession {
    /// Start a session; the settings are validated first.
    pub fn new(def: WallpaperDef, opts: SessionOpts) -> GradiiResult<Self> {
        crate::scene::wallpaper::Wallpaper::from_def(def.clone()).validate()?;
        let mut background_image = ImageSlot::new();
        if def.background.image.is_some() {
            background_image.mark_pending();
        }
        let mut logo = ImageSlot::new();
        if logo_ref(&def.overlay).is_some() {
            logo.mark_pending();
        }
        let rng = match def.seed {
            Some(s) => StdRng::seed_from_u64(derive_seed(s, b"palette")),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            visible: FrameRGBA::transparent(def.canvas),
            compositor: Compositor::new(opts.caps, opts.parallel_min_pixels),
            background_image,
            logo,
            fonts: HashMap::new(),
            default_font: None,
            background_layer: None,
            composite_dirty: true,
            debounce: FrameDebounce::new(opts.frame_interval),
            history: PaletteHistory::default(),
            modified: ModifiedProperties::new(),
            rng,
            def,
            opts,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &WallpaperDef {
        &self.def
    }

    /// Session options.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// The full-resolution visible buffer, as of the last render.
    pub fn visible(&self) -> &FrameRGBA {
        &self.visible
    }

    /// Whether the visible buffer is behind the settings.
    pub fn is_dirty(&self) -> bool {
        self.composite_dirty || self.background_layer.is_none()
    }

    /// Display scale for a preview box of `box_w`x`box_h`.
    pub fn preview_scale(&self, box_w: u32, box_h: u32) -> f64 {
        preview_scale(self.def.canvas, (box_w, box_h))
    }

    /// Properties the user changed by hand.
    pub fn modified(&self) -> &ModifiedProperties {
        &self.modified
    }

    /// Whether a shuffle can be undone.
    pub fn has_previous_palette(&self) -> bool {
        self.history.has_previous()
    }

    /// State of an image slot.
    pub fn image_state(&self, target: ImageTarget) -> &SlotState {
        self.slot(target).state()
    }

    fn slot(&self, target: ImageTarget) -> &ImageSlot {
        match target {
            ImageTarget::Background => &self.background_image,
            ImageTarget::Logo => &self.logo,
        }
    }

    fn slot_mut(&mut self, target: ImageTarget) -> &mut ImageSlot {
        match target {
            ImageTarget::Background => &mut self.background_image,
            ImageTarget::Logo => &mut self.logo,
        }
    }

    fn invalidate(&mut self, what: Invalidation, now: Instant) {
        match what {
            Invalidation::None => return,
            Invalidation::Composite => self.composite_dirty = true,
            Invalidation::Background => {
                self.background_layer = None;
                self.composite_dirty = true;
            }
        }
        self.debounce.request(now);
    }

    /// Replace the settings snapshot.
    ///
    /// A changed image reference is not loaded here; its slot turns pending (solid background, no
    /// logo) until [`begin_image_load`](Self::begin_image_load) or
    /// [`load_referenced_assets`](Self::load_referenced_assets) delivers it. Clearing a reference
    /// empties its slot.
    ///
    /// Invalid settings are rejected and leave the session untouched. Otherwise the snapshot is
    /// diffed against the previous one and only the affected layers are invalidated. Manual
    /// changes to shuffle-controlled properties are recorded so later shuffles keep them.
    pub fn update(&mut self, new: WallpaperDef, now: Instant) -> GradiiResult<Invalidation> {
        crate::scene::wallpaper::Wallpaper::from_def(new.clone()).validate()?;
        let old = std::mem::replace(&mut self.def, new);
        self.track_manual_changes(&old);

        match (&self.def.background.image, &old.background.image) {
            (None, Some(_)) => self.background_image.clear(),
            (Some(new), old_ref) if old_ref.as_ref() != Some(new) => {
                self.background_image.mark_pending()
            }
            _ => {}
        }
        match (logo_ref(&self.def.overlay), logo_ref(&old.overlay)) {
            (None, Some(_)) => self.logo.clear(),
            (Some(new), old_ref) if old_ref != Some(new) => self.logo.mark_pending(),
            _ => {}
        }
        if old.canvas != self.def.canvas {
            self.visible = FrameRGBA::transparent(self.def.canvas);
        }

        let what = diff(&old, &self.def);
        tracing::debug!(?what, "settings updated");
        self.invalidate(what, now);
        Ok(what)
    }

    fn track_manual_changes(&mut self, old: &WallpaperDef) {
        if old.background.color != self.def.background.color {
            self.modified.track(Property::BackgroundColor);
        }
        if let (Overlay::Text(a), Overlay::Text(b)) = (&old.overlay, &self.def.overlay) {
            if a.font_family != b.font_family {
                self.modified.track(Property::FontFamily);
            }
            if a.font_weight != b.font_weight {
                self.modified.track(Property::FontWeight);
            }
            if a.font_size != b.font_size {
                self.modified.track(Property::FontSize);
            }
            if a.letter_spacing != b.letter_spacing {
                self.modified.track(Property::LetterSpacing);
            }
        }
    }

    /// Register a font for a family name used by the text overlay.
    pub fn register_font(&mut self, family: impl Into<String>, font: FontFace, now: Instant) {
        self.fonts.insert(family.into(), font);
        if matches!(self.def.overlay, Overlay::Text(_)) {
            self.invalidate(Invalidation::Composite, now);
        }
    }

    /// Font used when the overlay's family is not registered.
    ///
    /// Without one, an unknown family falls back to the first registered family by name; with no
    /// fonts at all the text overlay is skipped.
    pub fn set_default_font(&mut self, font: FontFace, now: Instant) {
        self.default_font = Some(font);
        if matches!(self.def.overlay, Overlay::Text(_)) {
            self.invalidate(Invalidation::Composite, now);
        }
    }

    /// Start an asynchronous image load; the returned ticket must accompany the completion.
    ///
    /// While a background photo is pending only the solid fill is drawn.
    pub fn begin_image_load(&mut self, target: ImageTarget, now: Instant) -> LoadTicket {
        let ticket = self.slot_mut(target).begin();
        self.invalidate(invalidation_for(target), now);
        ticket
    }

    /// Deliver a load result. Stale completions are dropped without touching the state.
    pub fn complete_image_load(
        &mut self,
        target: ImageTarget,
        ticket: LoadTicket,
        result: Result<PreparedImage, String>,
        now: Instant,
    ) -> LoadOutcome {
        let outcome = self.slot_mut(target).complete(ticket, result);
        if outcome == LoadOutcome::Committed {
            self.invalidate(invalidation_for(target), now);
        }
        outcome
    }

    /// Validate and decode a `data:` URL upload synchronously.
    ///
    /// Boundary failures (wrong type, too large) leave the session unchanged. A decode failure
    /// leaves the slot failed, so the solid background shows, and is returned to the caller.
    pub fn upload_image(
        &mut self,
        target: ImageTarget,
        data_url: &str,
        now: Instant,
    ) -> GradiiResult<()> {
        let checked = check_data_url(data_url, self.opts.max_upload_bytes)?;
        match target {
            ImageTarget::Background => self.def.background.image = Some(data_url.to_owned()),
            ImageTarget::Logo => match &mut self.def.overlay {
                Overlay::Logo(logo) => logo.image = data_url.to_owned(),
                other => {
                    *other = Overlay::Logo(crate::scene::model::LogoOverlay {
                        image: data_url.to_owned(),
                        ..Default::default()
                    })
                }
            },
        }
        let ticket = self.begin_image_load(target, now);
        match decode_image(&checked.bytes) {
            Ok(img) => {
                self.complete_image_load(target, ticket, Ok(img), now);
                Ok(())
            }
            Err(e) => {
                self.complete_image_load(target, ticket, Err(e.to_string()), now);
                Err(e)
            }
        }
    }

    /// Drop the background photo; shapes come back. A zero blur is reset so the shapes are
    /// soft again.
    pub fn remove_background_image(&mut self, now: Instant) {
        self.def.background.image = None;
        self.background_image.clear();
        if self.def.filters.blur == 0.0 {
            self.def.filters.blur = RESTORED_BLUR;
        }
        self.invalidate(Invalidation::Background, now);
    }

    /// Resolve the image and font references of the current settings synchronously.
    ///
    /// Every reference is attempted. Images that fail leave their slot failed (solid fallback);
    /// the first error is returned after all loads ran.
    pub fn load_referenced_assets(
        &mut self,
        base_dir: Option<&Path>,
        now: Instant,
    ) -> GradiiResult<()> {
        let mut first_err: Option<GradiiError> = None;
        let max = self.opts.max_upload_bytes;

        let fonts: Vec<(String, String)> = self
            .def
            .fonts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (family, reference) in fonts {
            match FontFace::from_reference(&reference, base_dir) {
                Ok(face) => self.register_font(family, face, now),
                Err(e) => {
                    tracing::warn!(%family, error = %e, "font load failed");
                    first_err.get_or_insert(e);
                }
            }
        }

        let refs = [
            (ImageTarget::Background, self.def.background.image.clone()),
            (
                ImageTarget::Logo,
                logo_ref(&self.def.overlay).map(str::to_owned),
            ),
        ];
        for (target, reference) in refs {
            let Some(reference) = reference else {
                continue;
            };
            let ticket = self.begin_image_load(target, now);
            let result = load_image_ref(&reference, base_dir, max);
            let delivered = result.as_ref().cloned().map_err(|e| e.to_string());
            self.complete_image_load(target, ticket, delivered, now);
            if let Err(e) = result {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Shuffle shape positions and untouched style properties; the previous shapes go to the
    /// undo slot.
    pub fn generate_new_palette(&mut self, now: Instant) {
        palette::generate_new_palette(
            &mut self.def,
            &mut self.history,
            &self.modified,
            &mut self.rng,
        );
        self.invalidate(Invalidation::Background, now);
    }

    /// Undo the last shuffle. The background photo is removed as well so the restored shapes
    /// are visible. Returns `false` when there was nothing to restore.
    pub fn restore_previous_palette(&mut self, now: Instant) -> bool {
        if !palette::restore_previous_palette(&mut self.def, &mut self.history) {
            return false;
        }
        if self.def.background.image.is_some() {
            self.remove_background_image(now);
        }
        self.invalidate(Invalidation::Background, now);
        true
    }

    /// Resize the shape list (clamped to `1..=10`).
    pub fn set_shape_count(&mut self, n: usize, now: Instant) {
        palette::set_shape_count(&mut self.def, n, &mut self.rng);
        self.invalidate(Invalidation::Background, now);
    }

    /// Recolor one shape.
    pub fn update_shape_color(
        &mut self,
        index: usize,
        color: Color,
        now: Instant,
    ) -> GradiiResult<()> {
        palette::update_shape_color(&mut self.def, index, color)?;
        self.invalidate(Invalidation::Background, now);
        Ok(())
    }

    /// Render if a redraw was requested and the debounce interval elapsed. Returns whether a
    /// pass ran.
    pub fn poll(&mut self, now: Instant) -> GradiiResult<bool> {
        if !self.debounce.poll(now) {
            return Ok(false);
        }
        self.render_pass()?;
        Ok(true)
    }

    /// Render immediately, bypassing the debounce.
    pub fn render_now(&mut self) -> GradiiResult<&FrameRGBA> {
        self.debounce.cancel();
        self.render_pass()?;
        Ok(&self.visible)
    }

    fn render_pass(&mut self) -> GradiiResult<()> {
        if self.background_layer.is_none() {
            let slot = &self.background_image;
            let photo_selected = slot.is_selected() || self.def.background.image.is_some();
            let source = match slot.image() {
                Some(img) => BackgroundSource::Image(Arc::as_ref(img)),
                None if photo_selected || self.def.shapes.is_empty() => BackgroundSource::Solid,
                None => BackgroundSource::Shapes(&self.def.shapes),
            };
            let layer = self.compositor.render_background(&self.def, source)?;
            self.background_layer = Some(layer);
            self.composite_dirty = true;
        }
        if !self.composite_dirty {
            return Ok(());
        }
        let Some(background) = self.background_layer.as_deref() else {
            return Err(GradiiError::render("background layer missing after redraw"));
        };
        let font = match &self.def.overlay {
            Overlay::Text(t) => font_for(&self.fonts, self.default_font.as_ref(), &t.font_family),
            _ => None,
        };
        let assets = OverlayAssets {
            font,
            logo: self.logo.image().map(Arc::as_ref),
        };
        let inputs = CompositeInputs::from_def(&self.def, assets);
        self.compositor.composite(&mut self.visible, background, &inputs)?;
        self.composite_dirty = false;
        Ok(())
    }

    /// Export the settled state at full canvas resolution and hand it to `sink`.
    ///
    /// Pending changes are rendered first. Any failure is reported as one export error and the
    /// sink receives nothing.
    #[tracing::instrument(skip_all, fields(w = self.def.canvas.width, h = self.def.canvas.height))]
    pub fn export(&mut self, sink: &mut dyn DownloadSink) -> GradiiResult<ExportArtifact> {
        if self.is_dirty() {
            self.render_now().map_err(as_export_error)?;
        }
        self.deliver(sink)
    }

    /// Export after a complete re-render (background included), independent of cached layers.
    pub fn export_fresh(&mut self, sink: &mut dyn DownloadSink) -> GradiiResult<ExportArtifact> {
        self.background_layer = None;
        self.render_now().map_err(as_export_error)?;
        self.deliver(sink)
    }

    fn deliver(&mut self, sink: &mut dyn DownloadSink) -> GradiiResult<ExportArtifact> {
        let artifact = export_frame(&self.visible, self.opts.caps).map_err(as_export_error)?;
        sink.deliver(&artifact).map_err(as_export_error)?;
        Ok(artifact)
    }
}

fn as_export_error(e: GradiiError) -> GradiiError {
    match e {
        GradiiError::Export(_) => e,
        other => {
            tracing::warn!(error = %other, "export failed");
            GradiiError::export(other.to_string())
        }
    }
}

fn font_for<'a>(
    fonts: &'a HashMap<String, FontFace>,
    default_font: Option<&'a FontFace>,
    family: &str,
) -> Option<&'a FontFace> {
    if let Some(font) = fonts.get(family) {
        return Some(font);
    }
    let fallback = default_font.or_else(|| {
        fonts
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, font)| font)
    });
    if fallback.is_some() {
        tracing::debug!(%family, "font family not registered, using fallback font");
    }
    fallback
}

fn logo_ref(overlay: &Overlay) -> Option<&str> {
    match overlay {
        Overlay::Logo(l) if !l.image.is_empty() => Some(l.image.as_str()),
        _ => None,
    }
}

fn invalidation_for(target: ImageTarget) -> Invalidation {
    match target {
        ImageTarget::Background => Invalidation::Background,
        ImageTarget::Logo => Invalidation::Composite,
    }
}

/// Classify a settings change by the layers it touches.
pub(crate) fn diff(old: &WallpaperDef, new: &WallpaperDef) -> Invalidation {
    if old.canvas != new.canvas
        || old.background != new.background
        || old.shapes != new.shapes
        || old.seed != new.seed
    {
        return Invalidation::Background;
    }
    if old.filters != new.filters
        || old.effects != new.effects
        || old.overlay != new.overlay
        || old.fonts != new.fonts
    {
        return Invalidation::Composite;
    }
    // Palette alone only matters for shapes created later.
    Invalidation::None
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
