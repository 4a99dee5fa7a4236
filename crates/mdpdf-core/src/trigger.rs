//! Single-flight export trigger
//!
//! At most one export runs at a time. Firing claims the busy flag; a guard
//! owned by the job releases it when the job ends, whether it succeeds, fails,
//! panics, or is dropped before it starts.

use crate::capture::PreviewCapture;
use crate::export::Exporter;
use crate::export::options::ExportOptions;
use crate::{Error, Result};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// A running export, resolving to the saved file's path
pub type ExportJob = Pin<Box<dyn Future<Output = Result<PathBuf>> + Send>>;

/// Holds the busy flag for the lifetime of one job
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!("export slot released");
    }
}

/// Starts exports with a fixed configuration, one at a time
#[derive(Clone)]
pub struct ExportTrigger {
    exporter: Arc<dyn Exporter>,
    options: Arc<ExportOptions>,
    busy: Arc<AtomicBool>,
}

impl ExportTrigger {
    pub fn new(exporter: Arc<dyn Exporter>, options: ExportOptions) -> Self {
        Self {
            exporter,
            options: Arc::new(options),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a job is currently running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start exporting `capture`
    ///
    /// Returns `None` without touching the exporter if a job is already
    /// running. The exporter runs on the blocking thread pool once the
    /// returned job is polled.
    pub fn fire(&self, capture: PreviewCapture) -> Option<ExportJob> {
        let Some(guard) = BusyGuard::acquire(&self.busy) else {
            debug!("export already running, ignoring trigger");
            return None;
        };
        let exporter = Arc::clone(&self.exporter);
        let options = Arc::clone(&self.options);
        info!("Exporting {}...", options.filename);

        Some(Box::pin(async move {
            let handle = tokio::task::spawn_blocking(move || {
                let _guard = guard;
                exporter.export(&capture, &options)
            });
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::JobFailed(e.to_string())),
            }
        }))
    }
}

impl fmt::Debug for ExportTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportTrigger")
            .field("options", &self.options)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}
