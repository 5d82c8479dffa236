//! Wallpaper settings: the serde model, JSON loading, validation, presets and palette operations.

/// Settings model.
pub mod model;
/// Shuffle, undo and shape list operations.
pub mod palette;
/// Product presets and defaults.
pub mod presets;
pub(crate) mod validate;
/// JSON boundary.
pub mod wallpaper;
