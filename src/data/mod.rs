/// Data layer: CSV streaming, series extraction, background loading.
///
/// Architecture:
/// ```text
///        .csv
///         │
///         ▼
///   ┌───────────┐
///   │  reader    │  CSV records → Row (header → CellValue), one at a time
///   └───────────┘
///         │
///         ▼
///   ┌───────────┐
///   │  extract   │  fold rows → SeriesSet (labels, A, B, C, max sum)
///   └───────────┘
///         │
///         ▼
///   ┌───────────┐
///   │  loader    │  run extract on a worker thread, report LoadEvents
///   └───────────┘
/// ```

pub mod error;
pub mod extract;
pub mod loader;
pub mod model;
pub mod reader;
