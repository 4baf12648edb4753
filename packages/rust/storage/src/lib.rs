//! Record persistence.
//!
//! The pipeline hands each finished batch of [`PageRecord`]s to a
//! [`RecordSink`]. [`JsonFileSink`] writes them as one pretty-printed JSON
//! array; [`MemorySink`] keeps them in memory for callers that post-process.

use std::path::{Path, PathBuf};

use tracing::info;

use qaharvest_shared::{HarvestError, PageRecord, Result};

/// Destination for assembled page records.
pub trait RecordSink {
    /// Persist one batch of records, in the order given.
    fn write_batch(&mut self, records: &[PageRecord]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JsonFileSink
// ---------------------------------------------------------------------------

/// Writes every batch to a JSON file, replacing its previous contents.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonFileSink {
    fn write_batch(&mut self, records: &[PageRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| HarvestError::Storage(format!("failed to serialize records: {e}")))?;

        // Write next to the target, then rename, so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| HarvestError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| HarvestError::io(&self.path, e))?;

        info!(path = %self.path.display(), records = records.len(), "records saved");
        Ok(())
    }
}

/// Read back records written by [`JsonFileSink`].
pub fn load_records(path: &Path) -> Result<Vec<PageRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| HarvestError::parse(format!("{}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<PageRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }
}

impl RecordSink for MemorySink {
    fn write_batch(&mut self, records: &[PageRecord]) -> Result<()> {
        self.records.extend_from_slice(records);
        Ok(())
    }
}
