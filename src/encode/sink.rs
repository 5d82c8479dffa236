use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::png::ExportArtifact;
use crate::foundation::error::{GradiiError, GradiiResult};

/// Receiver of finished exports; the host-side equivalent of the browser download.
pub trait DownloadSink {
    /// Deliver one artifact. Either the whole file arrives or an error is returned.
    fn deliver(&mut self, artifact: &ExportArtifact) -> GradiiResult<()>;
}

/// Writes artifacts into a directory using their file names.
///
/// Each file is written to a hidden temporary sibling and renamed into place, so a failed write
/// never leaves a truncated PNG behind.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Sink writing into `dir` (created on first delivery).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for FileSink {
    fn deliver(&mut self, artifact: &ExportArtifact) -> GradiiResult<()> {
        if artifact.filename.is_empty()
            || artifact.filename.contains(['/', '\\'])
            || artifact.filename.starts_with('.')
        {
            return Err(GradiiError::export(format!(
                "invalid export file name '{}'",
                artifact.filename
            )));
        }
        let bytes = artifact.payload.png_bytes()?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;

        let dest = self.dir.join(&artifact.filename);
        let tmp = self.dir.join(format!(".{}.part", artifact.filename));
        let written = std::fs::write(&tmp, &bytes)
            .with_context(|| format!("write '{}'", tmp.display()))
            .and_then(|()| {
                std::fs::rename(&tmp, &dest)
                    .with_context(|| format!("move png into '{}'", dest.display()))
            });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(GradiiError::export(format!("{e:#}")));
        }
        tracing::debug!(path = %dest.display(), bytes = bytes.len(), "export written");
        self.written.push(dest);
        Ok(())
    }
}

/// Keeps artifacts in memory, for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct InMemorySink {
    artifacts: Vec<ExportArtifact>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered artifacts in order.
    pub fn artifacts(&self) -> &[ExportArtifact] {
        &self.artifacts
    }
}

impl DownloadSink for InMemorySink {
    fn deliver(&mut self, artifact: &ExportArtifact) -> GradiiResult<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
