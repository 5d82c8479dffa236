//! PNG export and delivery.
//!
//! The composited frame is encoded at full canvas resolution and handed to a [`sink::DownloadSink`].

/// In-memory PNG encoding and export artifacts.
pub mod png;
/// Download sink trait and built-in sinks.
pub mod sink;
