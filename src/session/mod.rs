//! Interactive editing session: settings diffing, cached layers, image loads and redraw
//! scheduling.

/// Editor session and its options.
pub mod editor;
/// Redraw debouncing.
pub mod scheduler;
