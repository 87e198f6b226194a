//! Scheduler module driving periodic and on-demand availability scans.

use crate::config::SchedulerConfig;
use crate::scan::{AvailabilityExecutor, AvailabilityReport, ScanOptions};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::time::{Instant, MissedTickBehavior};

/// Scheduler error types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,
    #[error("scheduler is not running")]
    NotRunning,
}

/// Runs scans on a fixed period and on request, handing reports to the
/// transport over a channel.
pub struct AvailabilityScheduler {
    executor: Arc<AvailabilityExecutor>,
    report_tx: mpsc::Sender<AvailabilityReport>,
    scan_interval: Duration,
    initial_delay: Duration,
    request_tx: Mutex<Option<mpsc::Sender<ScanOptions>>>,
    stop: Arc<Mutex<Option<broadcast::Sender<()>>>>,
}

impl AvailabilityScheduler {
    pub fn new(
        executor: Arc<AvailabilityExecutor>,
        config: &SchedulerConfig,
        report_tx: mpsc::Sender<AvailabilityReport>,
    ) -> Self {
        Self {
            executor,
            report_tx,
            scan_interval: config.scan_interval.max(Duration::from_millis(1)),
            initial_delay: config.initial_delay,
            request_tx: Mutex::new(None),
            stop: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scan loop in a background task.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut stop_guard = self.stop.lock().await;
        if stop_guard.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = broadcast::channel(1);
        let (request_tx, request_rx) = mpsc::channel(16);
        *stop_guard = Some(stop_tx);
        *self.request_tx.lock().await = Some(request_tx);
        drop(stop_guard);

        tracing::info!(
            "Starting availability scheduler: every {:?} after {:?}",
            self.scan_interval,
            self.initial_delay
        );

        let executor = self.executor.clone();
        let report_tx = self.report_tx.clone();
        let mut interval = tokio::time::interval_at(Instant::now() + self.initial_delay, self.scan_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::spawn(run_scan_loop(executor, report_tx, interval, request_rx, stop_rx));
        Ok(())
    }

    /// Queue an on-demand scan, e.g. a user-triggered "check now".
    pub async fn request_scan(&self, options: ScanOptions) -> Result<(), SchedulerError> {
        let request_tx = self.request_tx.lock().await;
        let tx = request_tx.as_ref().ok_or(SchedulerError::NotRunning)?;
        tx.send(options).await.map_err(|_| SchedulerError::NotRunning)
    }

    /// Stop the scan loop, aborting any scan in progress.
    pub async fn stop(&self) {
        let mut stop = self.stop.lock().await;
        if let Some(tx) = stop.take() {
            let _ = tx.send(());
            self.executor.abort();
            tracing::info!("Availability scheduler stopped");
        }
        *self.request_tx.lock().await = None;
    }
}

async fn run_scan_loop(
    executor: Arc<AvailabilityExecutor>,
    report_tx: mpsc::Sender<AvailabilityReport>,
    mut interval: tokio::time::Interval,
    mut request_rx: mpsc::Receiver<ScanOptions>,
    mut stop_rx: broadcast::Receiver<()>,
) {
    loop {
        let options = tokio::select! {
            _ = stop_rx.recv() => break,
            Some(options) = request_rx.recv() => options,
            _ = interval.tick() => ScanOptions::scheduled(),
        };

        // stop() aborts through the executor, so the scan still gets recorded.
        let report = executor.call(options).await;
        if !matches!(stop_rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)) {
            break;
        }

        if report.is_changes_only() && report.is_empty() {
            continue;
        }

        if report_tx.send(report).await.is_err() {
            tracing::error!("Availability report channel closed, stopping scheduler");
            break;
        }
    }
}
