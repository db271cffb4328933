//! # Print Dispatcher
//!
//! Drives a print request through its phases: validate the target against
//! the printer directory, render the document, hand the artifact to the
//! sink. Each phase transition is a tracing event carrying the job id, so a
//! stuck job is diagnosable from logs alone.
//!
//! Jobs against the same printer never interleave. A per-printer lock is
//! held for the whole job; a second request while one is in flight fails
//! immediately with a busy error rather than queueing, and the caller
//! retries at its own pace. Jobs against different printers run freely in
//! parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::document::{Document, PrintOptions};
use crate::error::PrintError;
use crate::printer::PrinterDirectory;
use crate::render::{self, Backend};
use crate::sink::PrintSink;

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    Idle,
    Validating,
    Rendering,
    Dispatching,
    Succeeded,
    Failed,
}

/// Outcome of a completed job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: u64,
    pub printer: String,
    pub backend: Backend,
    pub stage: JobStage,
    pub artifact_bytes: usize,
    pub elapsed_ms: u64,
}

/// Serializes jobs per printer and runs the print pipeline.
pub struct Dispatcher {
    directory: Arc<dyn PrinterDirectory>,
    sink: Arc<dyn PrintSink>,
    locks: std::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    next_job_id: AtomicU64,
}

impl Dispatcher {
    pub fn new(directory: Arc<dyn PrinterDirectory>, sink: Arc<dyn PrintSink>) -> Self {
        Self {
            directory,
            sink,
            locks: std::sync::Mutex::new(HashMap::new()),
            next_job_id: AtomicU64::new(1),
        }
    }

    fn lock_for(&self, printer: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(printer.to_string()).or_default().clone()
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Run one print job to completion.
    pub async fn print(
        &self,
        document: &Document,
        options: &PrintOptions,
    ) -> Result<JobReport, PrintError> {
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        match self.run(job_id, document, options).await {
            Ok(artifact_bytes) => {
                let report = JobReport {
                    job_id,
                    printer: options.printer_name.clone(),
                    backend: options.backend,
                    stage: JobStage::Succeeded,
                    artifact_bytes,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                info!(
                    job_id,
                    printer = %report.printer,
                    stage = ?report.stage,
                    bytes = report.artifact_bytes,
                    elapsed_ms = report.elapsed_ms,
                    "print job finished"
                );
                Ok(report)
            }
            Err(err) => {
                error!(job_id, printer = %options.printer_name, stage = ?JobStage::Failed, %err);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        job_id: u64,
        document: &Document,
        options: &PrintOptions,
    ) -> Result<usize, PrintError> {
        info!(job_id, printer = %options.printer_name, stage = ?JobStage::Validating);
        let printer = self.directory.verify(&options.printer_name).await?;

        // Lock only after validation; unrecognized names never allocate a
        // map entry, so the map stays bounded by the directory.
        let lock = self.lock_for(&printer.name);
        let Ok(_guard) = lock.try_lock() else {
            return Err(PrintError::Dispatch(format!(
                "printer busy: {}",
                printer.name
            )));
        };

        info!(job_id, backend = ?options.backend, stage = ?JobStage::Rendering);
        let artifact = match options.backend {
            Backend::Markup => render::render_document(document, options)?,
            Backend::Commands => {
                // The commands renderer may fetch images over the network.
                let document = document.clone();
                let options = options.clone();
                tokio::task::spawn_blocking(move || render::render_document(&document, &options))
                    .await
                    .map_err(|e| PrintError::Render(format!("render task failed: {}", e)))??
            }
        };

        info!(job_id, bytes = artifact.len(), stage = ?JobStage::Dispatching);
        self.sink.dispatch(&printer, &artifact, options).await?;
        Ok(artifact.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, TextBlock};
    use crate::printer::{Printer, StaticDirectory};
    use crate::render::Artifact;
    use async_trait::async_trait;

    struct RecordingSink {
        jobs: std::sync::Mutex<Vec<(String, usize)>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                jobs: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PrintSink for RecordingSink {
        async fn dispatch(
            &self,
            printer: &Printer,
            artifact: &Artifact,
            _options: &PrintOptions,
        ) -> Result<(), PrintError> {
            self.jobs
                .lock()
                .unwrap()
                .push((printer.name.clone(), artifact.len()));
            Ok(())
        }
    }

    struct StalledSink {
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl PrintSink for StalledSink {
        async fn dispatch(
            &self,
            _printer: &Printer,
            _artifact: &Artifact,
            _options: &PrintOptions,
        ) -> Result<(), PrintError> {
            self.release.notified().await;
            Ok(())
        }
    }

    fn directory() -> Arc<StaticDirectory> {
        Arc::new(StaticDirectory::new(vec![
            Printer::from_queue_name("TM-T20", true),
            Printer::from_queue_name("Star_TSP100", false),
        ]))
    }

    fn document() -> Document {
        Document {
            blocks: vec![Block::Text(TextBlock::new("hello"))],
        }
    }

    #[tokio::test]
    async fn test_successful_job_report() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(directory(), sink.clone());
        let report = dispatcher
            .print(&document(), &PrintOptions::for_printer("TM-T20"))
            .await
            .unwrap();
        assert_eq!(report.stage, JobStage::Succeeded);
        assert_eq!(report.printer, "TM-T20");
        assert!(report.artifact_bytes > 0);
        assert_eq!(sink.jobs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_printer_never_reaches_sink() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(directory(), sink.clone());
        let err = dispatcher
            .print(&document(), &PrintOptions::for_printer("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::PrinterNotFound(_)));
        assert!(sink.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_option_never_reaches_sink() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(directory(), sink.clone());
        let mut options = PrintOptions::for_printer("TM-T20");
        options.paper_size = Some("99mm".into());
        let err = dispatcher.print(&document(), &options).await.unwrap_err();
        assert!(matches!(err, PrintError::InvalidOption(_)));
        assert!(sink.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_printer_is_busy_while_in_flight() {
        let release = Arc::new(tokio::sync::Notify::new());
        let sink = Arc::new(StalledSink {
            release: release.clone(),
        });
        let dispatcher = Arc::new(Dispatcher::new(directory(), sink));

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .print(&document(), &PrintOptions::for_printer("TM-T20"))
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let err = dispatcher
            .print(&document(), &PrintOptions::for_printer("TM-T20"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::Dispatch(msg) if msg.contains("busy")));

        release.notify_one();
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_different_printers_run_in_parallel() {
        let release = Arc::new(tokio::sync::Notify::new());
        let sink = Arc::new(StalledSink {
            release: release.clone(),
        });
        let dispatcher = Arc::new(Dispatcher::new(directory(), sink));

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .print(&document(), &PrintOptions::for_printer("TM-T20"))
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let second = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .print(&document(), &PrintOptions::for_printer("Star_TSP100"))
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // Both jobs are stalled inside the sink, not queued on a lock.
        release.notify_waiters();
        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_printers_never_allocate_locks() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(directory(), sink);
        for name in ["Ghost", "../../etc", "TM-T20-but-longer"] {
            let err = dispatcher
                .print(&document(), &PrintOptions::for_printer(name))
                .await
                .unwrap_err();
            assert!(matches!(err, PrintError::PrinterNotFound(_)));
        }
        assert_eq!(dispatcher.lock_count(), 0);

        dispatcher
            .print(&document(), &PrintOptions::for_printer("TM-T20"))
            .await
            .unwrap();
        assert_eq!(dispatcher.lock_count(), 1);
    }

    #[tokio::test]
    async fn test_job_ids_increase() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(directory(), sink);
        let a = dispatcher
            .print(&document(), &PrintOptions::for_printer("TM-T20"))
            .await
            .unwrap();
        let b = dispatcher
            .print(&document(), &PrintOptions::for_printer("TM-T20"))
            .await
            .unwrap();
        assert!(b.job_id > a.job_id);
    }
}
