//! Multi-part archive driver
//!
//! Large installs split their content across several header/data pairs.
//! The divided binder drives the whole set: selection applies to every
//! part, fully ignored parts are skipped, and the async path feeds one
//! progress aggregator so the caller sees a single mean fraction.

use crate::cancel::CancellationToken;
use crate::model::Binder;
use crate::progress::AggregateProgress;
use crate::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A list of binders, each paired with the path of its data file.
#[derive(Debug, Clone, Default)]
pub struct DividedBinder {
    pub parts: Vec<(Binder, PathBuf)>,
}

impl DividedBinder {
    pub fn new(parts: Vec<(Binder, PathBuf)>) -> Self {
        Self { parts }
    }

    pub fn push(&mut self, binder: Binder, data_path: PathBuf) {
        self.parts.push((binder, data_path));
    }

    /// Apply one selection across every part.
    pub fn set_selected<S: AsRef<str>>(&mut self, selected: &[S]) {
        for (binder, _) in &mut self.parts {
            binder.set_selected(selected);
        }
    }

    /// Unpack every part with at least one selected entry.
    pub fn unpack(&self, out_dir: &Path) -> Result<()> {
        for (binder, data_path) in &self.parts {
            if binder.all_ignored() {
                debug!("Skipping fully ignored part {data_path:?}");
                continue;
            }
            let mut reader = BufReader::new(File::open(data_path)?);
            binder.unpack(&mut reader, out_dir)?;
        }
        Ok(())
    }

    /// Asynchronous unpack reporting the mean progress across parts.
    ///
    /// Fully ignored parts report 1.0 immediately so the mean stays
    /// meaningful.
    pub async fn unpack_async(
        &self,
        out_dir: &Path,
        sink: impl Fn(f64) + Send + Sync + 'static,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let aggregate = AggregateProgress::new(sink);
        let handles: Vec<_> = self.parts.iter().map(|_| aggregate.attach()).collect();

        for ((binder, data_path), handle) in self.parts.iter().zip(&handles) {
            if binder.all_ignored() {
                debug!("Skipping fully ignored part {data_path:?}");
                handle.report(1.0);
                continue;
            }
            binder
                .unpack_async(data_path, out_dir, Some(handle), cancel)
                .await?;
        }
        Ok(())
    }
}
