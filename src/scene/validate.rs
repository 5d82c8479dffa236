use std::fmt;

use smallvec::SmallVec;

use crate::foundation::core::MAX_CANVAS_SIDE;
use crate::scene::model::{Overlay, ShadowDef, WallpaperDef};
use crate::scene::presets::SHAPE_COUNT_RANGE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: SmallVec<[SchemaPathElem; 4]>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.iter().cloned().collect(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

use SchemaPathElem::{Field, Index};

fn finite(errors: &mut Vec<SchemaError>, path: &[SchemaPathElem], v: f64) {
    if !v.is_finite() {
        errors.push(SchemaError::at(path, "must be a finite number"));
    }
}

fn positive(errors: &mut Vec<SchemaError>, path: &[SchemaPathElem], v: f64) {
    if !v.is_finite() || v <= 0.0 {
        errors.push(SchemaError::at(path, "must be finite and > 0"));
    }
}

/// Structural checks only; slider values outside their ranges are clamped at render time.
pub(crate) fn validate_wallpaper(def: &WallpaperDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    for (name, v) in [("width", def.canvas.width), ("height", def.canvas.height)] {
        if v == 0 || v > MAX_CANVAS_SIDE {
            errors.push(SchemaError::at(
                &[Field("canvas"), Field(name)],
                format!("must be in 1..={MAX_CANVAS_SIDE}, got {v}"),
            ));
        }
    }

    if def.palette.is_empty() {
        errors.push(SchemaError::at(
            &[Field("palette")],
            "palette must contain at least one color",
        ));
    }

    if def.shapes.len() > *SHAPE_COUNT_RANGE.end() {
        errors.push(SchemaError::at(
            &[Field("shapes")],
            format!(
                "at most {} shapes are supported, got {}",
                SHAPE_COUNT_RANGE.end(),
                def.shapes.len()
            ),
        ));
    }
    for (i, s) in def.shapes.iter().enumerate() {
        finite(&mut errors, &[Field("shapes"), Index(i), Field("x")], s.x);
        finite(&mut errors, &[Field("shapes"), Index(i), Field("y")], s.y);
    }

    if let Some(img) = &def.background.image
        && img.trim().is_empty()
    {
        errors.push(SchemaError::at(
            &[Field("background"), Field("image")],
            "image reference must not be empty (omit it instead)",
        ));
    }

    let f = &def.filters;
    for (name, v) in [
        ("blur", f.blur),
        ("brightness", f.brightness),
        ("contrast", f.contrast),
        ("saturation", f.saturation),
    ] {
        finite(&mut errors, &[Field("filters"), Field(name)], v);
    }
    finite(&mut errors, &[Field("effects"), Field("grain")], def.effects.grain);
    finite(&mut errors, &[Field("effects"), Field("vignette")], def.effects.vignette);

    match &def.overlay {
        Overlay::None => {}
        Overlay::Text(t) => {
            let p = |name| [Field("overlay"), Field(name)];
            positive(&mut errors, &p("font_size"), t.font_size);
            positive(&mut errors, &p("line_height"), t.line_height);
            finite(&mut errors, &p("letter_spacing"), t.letter_spacing);
            finite(&mut errors, &p("opacity"), t.opacity);
            if !(1..=1000).contains(&t.font_weight) {
                errors.push(SchemaError::at(&p("font_weight"), "must be in 1..=1000"));
            }
            if t.font_family.trim().is_empty() {
                errors.push(SchemaError::at(&p("font_family"), "must not be empty"));
            }
            validate_shadow(&t.shadow, &mut errors);
            finite(&mut errors, &[Field("overlay"), Field("offset"), Field("x")], t.offset.x);
            finite(&mut errors, &[Field("overlay"), Field("offset"), Field("y")], t.offset.y);
        }
        Overlay::Logo(l) => {
            if l.image.trim().is_empty() {
                errors.push(SchemaError::at(
                    &[Field("overlay"), Field("image")],
                    "logo overlay requires an image",
                ));
            }
            positive(&mut errors, &[Field("overlay"), Field("scale_pct")], l.scale_pct);
            finite(&mut errors, &[Field("overlay"), Field("opacity")], l.opacity);
            validate_shadow(&l.shadow, &mut errors);
            finite(&mut errors, &[Field("overlay"), Field("offset"), Field("x")], l.offset.x);
            finite(&mut errors, &[Field("overlay"), Field("offset"), Field("y")], l.offset.y);
        }
    }

    for (family, src) in &def.fonts {
        if src.trim().is_empty() {
            errors.push(SchemaError::at(
                &[Field("fonts")],
                format!("font '{family}' has an empty source"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_shadow(s: &ShadowDef, errors: &mut Vec<SchemaError>) {
    let p = |name| [Field("overlay"), Field("shadow"), Field(name)];
    finite(errors, &p("blur"), s.blur);
    finite(errors, &p("offset_x"), s.offset_x);
    finite(errors, &p("offset_y"), s.offset_y);
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;
