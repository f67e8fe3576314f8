use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::extract::{ExtractStats, extract_path};
use super::model::SeriesSet;

// ---------------------------------------------------------------------------
// Background load: one extraction run off the UI thread
// ---------------------------------------------------------------------------

/// Messages sent from the worker back to the UI.
#[derive(Debug)]
pub enum LoadEvent {
    Progress(ExtractStats),
    Finished(SeriesSet, ExtractStats),
    Failed(String),
}

/// Handle to an in-flight extraction.
pub struct LoadHandle {
    pub path: PathBuf,
    rx: Receiver<LoadEvent>,
}

impl LoadHandle {
    /// Start extracting `path` on a worker thread.
    ///
    /// `notify` runs after every event is queued so the UI can wake up
    /// (typically `egui::Context::request_repaint`).
    pub fn spawn(
        path: PathBuf,
        progress_interval: usize,
        notify: impl Fn() + Send + 'static,
    ) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();

        thread::Builder::new()
            .name("csv-extract".into())
            .spawn(move || {
                let progress_tx = tx.clone();
                let result = extract_path(&worker_path, progress_interval, |stats| {
                    let _ = progress_tx.send(LoadEvent::Progress(stats));
                    notify();
                });
                let event = match result {
                    Ok((series, stats)) => LoadEvent::Finished(series, stats),
                    Err(e) => LoadEvent::Failed(e.to_string()),
                };
                // The receiver may be gone if the window closed mid-run.
                let _ = tx.send(event);
                notify();
            })?;

        Ok(Self { path, rx })
    }

    /// Drain pending events without blocking.
    ///
    /// A worker that disappears without a final event is reported as a
    /// failure so the caller never waits forever.
    pub fn poll(&self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    let finished = events
                        .iter()
                        .any(|e| matches!(e, LoadEvent::Finished(..) | LoadEvent::Failed(_)));
                    if !finished {
                        events.push(LoadEvent::Failed("extraction worker stopped".into()));
                    }
                    break;
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::{Duration, Instant};

    use super::*;

    fn wait_for_terminal(handle: &LoadHandle) -> Vec<LoadEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut all = Vec::new();
        while Instant::now() < deadline {
            all.extend(handle.poll());
            if all
                .iter()
                .any(|e| matches!(e, LoadEvent::Finished(..) | LoadEvent::Failed(_)))
            {
                return all;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("load did not finish");
    }

    #[test]
    fn finished_event_carries_series() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Time,Mains_A,Mains_B,Mains_C").unwrap();
        for i in 0..5 {
            writeln!(file, "t{i},1,2,{i}").unwrap();
        }
        file.flush().unwrap();

        let handle = LoadHandle::spawn(file.path().to_path_buf(), 2, || {}).unwrap();
        let events = wait_for_terminal(&handle);

        let progress = events
            .iter()
            .filter(|e| matches!(e, LoadEvent::Progress(_)))
            .count();
        assert_eq!(progress, 2);

        match events.last() {
            Some(LoadEvent::Finished(series, stats)) => {
                assert_eq!(series.len(), 5);
                assert_eq!(series.max_sum, 7.0);
                assert_eq!(stats.rows_kept, 5);
            }
            other => panic!("unexpected final event: {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_failure() {
        let handle =
            LoadHandle::spawn(PathBuf::from("/nonexistent/mains.csv"), 0, || {}).unwrap();
        let events = wait_for_terminal(&handle);
        assert!(matches!(events.last(), Some(LoadEvent::Failed(msg)) if msg.contains("cannot open")));
    }
}
