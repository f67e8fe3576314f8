use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of an extraction run. Row-level gaps are not errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("malformed CSV at record {record}: {source}")]
    Record {
        record: u64,
        #[source]
        source: csv::Error,
    },
}
