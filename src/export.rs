//! Archive export to durable tables.
//!
//! [`ArchiveSink`] is the boundary between the bounded archive and whatever
//! stores it. [`CsvTableSink`] writes the layout produced by the sensor demo
//! tooling: one row per range bin, a leading distance column, and one column
//! per frame.
//!
//! ```text
//! Range (m),Frame 17,Frame 18
//! 0,1021,1019
//! 0.04,998,1003
//! ```

use std::{fs::File, io, path::Path, sync::Arc};

use thiserror::Error;

use crate::profile::RangeProfile;

/// Errors raised while exporting an archive.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination could not be opened or written.
    #[error("export I/O error: {0}")]
    Io(#[from] io::Error),

    /// The CSV encoder failed.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// Profiles in one export disagree on their range-bin count.
    #[error("frame {frame_number} has {actual} range bins, expected {expected}")]
    RaggedProfiles {
        /// Offending frame.
        frame_number: u32,
        /// Bin count of the first exported profile.
        expected: usize,
        /// Bin count of the offending profile.
        actual: usize,
    },
}

/// Destination for archived profiles.
pub trait ArchiveSink {
    /// Persist `profiles`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the profiles could not be stored.
    fn export(&mut self, profiles: &[Arc<RangeProfile>]) -> Result<(), ExportError>;
}

/// Writes profiles as a CSV table with one column per frame.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use radarframe::{
///     export::{ArchiveSink, CsvTableSink},
///     profile::RangeProfile,
/// };
///
/// let mut sink = CsvTableSink::new(Vec::new(), 0.5);
/// sink.export(&[Arc::new(RangeProfile::new(7, vec![10, 20]))])
///     .expect("export succeeds");
///
/// let table = String::from_utf8(sink.into_inner()).expect("utf-8");
/// assert_eq!(table, "Range (m),Frame 7\n0,10\n0.5,20\n");
/// ```
#[derive(Debug)]
pub struct CsvTableSink<W: io::Write> {
    writer: W,
    bin_spacing_m: f64,
    rows_written: usize,
}

impl CsvTableSink<File> {
    /// Create (or truncate) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, bin_spacing_m: f64) -> Result<Self, ExportError> {
        Ok(Self::new(File::create(path)?, bin_spacing_m))
    }
}

impl<W: io::Write> CsvTableSink<W> {
    /// Wrap `writer`; bin `i` is labelled `i * bin_spacing_m` metres.
    #[must_use]
    pub fn new(writer: W, bin_spacing_m: f64) -> Self {
        Self {
            writer,
            bin_spacing_m,
            rows_written: 0,
        }
    }

    /// Data rows written by the last export.
    #[must_use]
    pub fn rows_written(&self) -> usize { self.rows_written }

    /// Recover the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W { self.writer }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Range-bin indices are far below f64's exact integer range."
)]
fn bin_distance(bin: usize, spacing: f64) -> f64 { bin as f64 * spacing }

impl<W: io::Write> ArchiveSink for CsvTableSink<W> {
    fn export(&mut self, profiles: &[Arc<RangeProfile>]) -> Result<(), ExportError> {
        self.rows_written = 0;
        let Some(first) = profiles.first() else {
            return Ok(());
        };
        let bins = first.len();
        if let Some(ragged) = profiles.iter().find(|p| p.len() != bins) {
            return Err(ExportError::RaggedProfiles {
                frame_number: ragged.frame_number(),
                expected: bins,
                actual: ragged.len(),
            });
        }

        let mut table = csv::Writer::from_writer(&mut self.writer);
        let mut header = Vec::with_capacity(profiles.len() + 1);
        header.push("Range (m)".to_owned());
        header.extend(profiles.iter().map(|p| format!("Frame {}", p.frame_number())));
        table.write_record(&header)?;

        let mut row = Vec::with_capacity(profiles.len() + 1);
        for bin in 0..bins {
            row.clear();
            row.push(bin_distance(bin, self.bin_spacing_m).to_string());
            row.extend(
                profiles
                    .iter()
                    .map(|p| p.samples().get(bin).copied().unwrap_or_default().to_string()),
            );
            table.write_record(&row)?;
        }
        table.flush()?;
        self.rows_written = bins;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(frame_number: u32, samples: Vec<u16>) -> Arc<RangeProfile> {
        Arc::new(RangeProfile::new(frame_number, samples))
    }

    #[test]
    fn table_has_one_column_per_frame() {
        let mut sink = CsvTableSink::new(Vec::new(), 0.25);
        sink.export(&[profile(1, vec![1, 2, 3]), profile(2, vec![4, 5, 6])])
            .expect("export succeeds");
        assert_eq!(sink.rows_written(), 3);

        let table = String::from_utf8(sink.into_inner()).expect("utf-8");
        assert_eq!(
            table,
            "Range (m),Frame 1,Frame 2\n0,1,4\n0.25,2,5\n0.5,3,6\n"
        );
    }

    #[test]
    fn empty_archive_writes_nothing() {
        let mut sink = CsvTableSink::new(Vec::new(), 1.0);
        sink.export(&[]).expect("empty export succeeds");
        assert_eq!(sink.rows_written(), 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn ragged_profiles_are_refused() {
        let mut sink = CsvTableSink::new(Vec::new(), 1.0);
        let err = sink
            .export(&[profile(1, vec![1, 2]), profile(2, vec![1])])
            .expect_err("bin counts differ");
        assert!(matches!(
            err,
            ExportError::RaggedProfiles {
                frame_number: 2,
                expected: 2,
                actual: 1
            }
        ));
    }
}
