use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::error::ExtractError;
use super::model::{Channel, Row, SeriesSet};
use super::reader::RowStream;

// ---------------------------------------------------------------------------
// Extraction: fold the row stream into a SeriesSet
// ---------------------------------------------------------------------------

/// Row counters for one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
}

/// Extract from a file on disk. See [`extract`].
pub fn extract_path(
    path: &Path,
    progress_interval: usize,
    on_progress: impl FnMut(ExtractStats),
) -> Result<(SeriesSet, ExtractStats), ExtractError> {
    let file = File::open(path).map_err(|source| ExtractError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    extract(BufReader::new(file), progress_interval, on_progress)
}

/// Stream a CSV source and build the aligned mains series.
///
/// Rows where any of the three channels cannot be found are skipped
/// entirely. `on_progress` fires every `progress_interval` rows read
/// (never when the interval is zero). On a fatal stream error nothing
/// partial is returned.
pub fn extract<R: Read>(
    source: R,
    progress_interval: usize,
    mut on_progress: impl FnMut(ExtractStats),
) -> Result<(SeriesSet, ExtractStats), ExtractError> {
    let mut series = SeriesSet::default();
    let mut stats = ExtractStats::default();

    let rows = RowStream::new(source)?;
    log::debug!("CSV columns: {:?}", rows.headers());

    for row in rows {
        let row = row?;
        stats.rows_read += 1;

        if absorb_row(&mut series, &row) {
            stats.rows_kept += 1;
        } else {
            stats.rows_skipped += 1;
        }

        if progress_interval > 0 && stats.rows_read % progress_interval == 0 {
            on_progress(stats);
        }
    }

    Ok((series, stats))
}

/// Append `row` to `series` if all three channels resolve.
/// Returns whether the row was kept.
fn absorb_row(series: &mut SeriesSet, row: &Row) -> bool {
    let [a, b, c] = Channel::ALL.map(|ch| row.find_by_keyword(ch.keyword()));
    let (Some(a), Some(b), Some(c)) = (a, b, c) else {
        return false;
    };

    let label = row.first_value().map(|v| v.to_string()).unwrap_or_default();
    series.push(label, a.as_f64(), b.as_f64(), c.as_f64());
    true
}
