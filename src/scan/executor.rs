//! Availability executor.
//!
//! Walks the inventory tree top-down, calls providers for the resources
//! that must be checked, applies the results and records the scan.

use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Arc, MutexGuard};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::Mutex;

use super::planner::{inherited_availability, Action, CheckReason, ParentOutcome, ScanPlanner};
use super::record::{Scan, ScanStats};
use super::report::{AvailabilityReport, Datum, ReportAssembler};
use crate::clock::{Clock, SystemClock};
use crate::config::SchedulerConfig;
use crate::inventory::{AvailabilityType, ResourceCategory, ResourceId, ResourceTree};
use crate::provider;

/// Parameters of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Check every resource whether or not its schedule fired.
    pub forced: bool,
    /// Report only changes, unless a full report is pending.
    pub changes_only: bool,
}

impl ScanOptions {
    /// Periodic scan of due resources.
    pub fn scheduled() -> Self {
        Self {
            forced: false,
            changes_only: true,
        }
    }

    /// "Check now": every enabled resource is checked.
    pub fn forced() -> Self {
        Self {
            forced: true,
            changes_only: true,
        }
    }
}

struct ExecutorState {
    full_report_pending: bool,
    history: VecDeque<Scan>,
}

/// Runs availability scans against a shared inventory tree.
///
/// Concurrent calls are serialized on the tree lock.
pub struct AvailabilityExecutor {
    tree: Arc<Mutex<ResourceTree>>,
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    assembler: ReportAssembler,
    state: std::sync::Mutex<ExecutorState>,
    abort_tx: broadcast::Sender<()>,
}

impl AvailabilityExecutor {
    pub fn new(tree: Arc<Mutex<ResourceTree>>, config: SchedulerConfig) -> Self {
        Self::with_clock(tree, config, Arc::new(SystemClock))
    }

    pub fn with_clock(tree: Arc<Mutex<ResourceTree>>, config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        let (abort_tx, _) = broadcast::channel(1);
        let assembler = ReportAssembler::new(&config.agent_name);

        Self {
            tree,
            config,
            clock,
            assembler,
            state: std::sync::Mutex::new(ExecutorState {
                full_report_pending: true,
                history: VecDeque::new(),
            }),
            abort_tx,
        }
    }

    /// Make the next scan report every resource.
    pub fn send_full_report_next_time(&self) {
        self.lock_state().full_report_pending = true;
    }

    /// Let the next scan report only changes, even if it is the first.
    pub fn send_changes_only_report_next_time(&self) {
        self.lock_state().full_report_pending = false;
    }

    pub fn most_recent_scan(&self) -> Option<Scan> {
        self.lock_state().history.back().cloned()
    }

    /// Recent scans, oldest first.
    pub fn scan_history(&self) -> Vec<Scan> {
        self.lock_state().history.iter().cloned().collect()
    }

    /// Abort the scan currently holding the tree. Scans still waiting for
    /// the tree are not affected. Resources not yet visited keep their
    /// availability and schedule.
    pub fn abort(&self) {
        let _ = self.abort_tx.send(());
    }

    /// Run one scan and return its report.
    pub async fn call(&self, options: ScanOptions) -> AvailabilityReport {
        let mut tree = self.tree.lock().await;
        let mut abort_rx = self.abort_tx.subscribe();

        let full = !options.changes_only || self.lock_state().full_report_pending;
        let now = self.clock.now_millis();
        let planner = ScanPlanner::new(options.forced);
        let mut stats = ScanStats::new(options.forced, full, now);
        let mut changed = Vec::new();

        tracing::debug!(
            "Starting availability scan (forced={}, full={}) of {} resources",
            options.forced,
            full,
            tree.len()
        );

        let mut stack: Vec<(ResourceId, Option<ParentOutcome>)> = vec![(tree.root(), None)];

        while let Some((id, parent)) = stack.pop() {
            if parent.is_some() && abort_requested(&mut abort_rx) {
                stats.aborted();
                break;
            }

            let (action, previous, category, node_provider) = {
                let Some(node) = tree.get(id) else { continue };
                (
                    planner.decide(node, parent.as_ref(), now),
                    node.availability,
                    node.category,
                    node.provider.clone(),
                )
            };

            let resolved = match action {
                Action::Check(_) => {
                    let checked = tokio::select! {
                        biased;
                        _ = abort_rx.recv() => None,
                        result = provider::invoke(node_provider, id, self.config.provider_timeout) => Some(result),
                    };
                    let Some(result) = checked else {
                        stats.aborted();
                        break;
                    };

                    stats.get_availability_call();
                    result.unwrap_or_else(|e| {
                        tracing::warn!("Availability check of resource {} failed: {}", id, e);
                        AvailabilityType::Unknown
                    })
                }
                Action::DeferUp | Action::DeferDisabled => parent
                    .as_ref()
                    .and_then(|p| inherited_availability(action, p))
                    .unwrap_or(AvailabilityType::Unknown),
                Action::Skip => previous.unwrap_or(AvailabilityType::Unknown),
            };
            stats.resource();

            let Some(node) = tree.get_mut(id) else { continue };
            match action {
                Action::Check(reason) => {
                    node.availability = Some(resolved);
                    if reason.reschedules() {
                        // Providers may block, so `now` can be well behind by this point.
                        node.next_check_time = Some(self.clock.now_millis() + self.jitter(category));
                        stats.scheduled_randomly();
                    } else if reason == CheckReason::Forced {
                        stats.pushed_by_interval();
                    }
                }
                Action::DeferUp | Action::DeferDisabled => {
                    node.availability = Some(resolved);
                    stats.defer_to_parent();
                }
                Action::Skip => stats.pushed_by_interval(),
            }

            if action != Action::Skip && previous != Some(resolved) {
                stats.availability_change();
                changed.push(Datum {
                    resource_id: id,
                    availability_type: resolved,
                });
            }

            tracing::trace!("Resource {} resolved {} via {:?}", id, resolved, action);

            let outcome = ParentOutcome {
                availability: resolved,
                came_up: resolved == AvailabilityType::Up
                    && previous != Some(AvailabilityType::Up)
                    && matches!(action, Action::Check(_) | Action::DeferDisabled),
            };
            stack.extend(tree.children(id).iter().rev().map(|child| (*child, Some(outcome))));
        }

        let scan = stats.finish(self.clock.now_millis());
        let report = self.assembler.assemble(&scan, &tree, changed);

        if scan.is_aborted() {
            tracing::warn!(
                "Availability scan aborted after {} resources, {} changes applied",
                scan.num_resources(),
                scan.num_availability_changes()
            );
        } else {
            tracing::info!(
                "Availability scan: {} resources, {} checks, {} changes, {} deferred ({}ms)",
                scan.num_resources(),
                scan.num_get_availability_calls(),
                scan.num_availability_changes(),
                scan.num_defer_to_parent(),
                scan.end_time() - scan.start_time()
            );
        }

        // Record while still holding the tree so the next scan sees the
        // cleared full-report flag.
        self.record(scan);
        drop(tree);
        report
    }

    fn record(&self, scan: Scan) {
        let mut state = self.lock_state();
        if !scan.is_aborted() {
            state.full_report_pending = false;
        }
        state.history.push_back(scan);
        while state.history.len() > self.config.scan_history.max(1) {
            state.history.pop_front();
        }
    }

    /// Random offset in (0, window] for the resource's category.
    fn jitter(&self, category: ResourceCategory) -> i64 {
        let window = match category {
            ResourceCategory::Service => self.config.service_jitter,
            ResourceCategory::Platform | ResourceCategory::Server => self.config.server_jitter,
        };
        let max = (window.as_millis() as i64).max(1);
        rand::thread_rng().gen_range(1..=max)
    }

    fn lock_state(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn abort_requested(rx: &mut broadcast::Receiver<()>) -> bool {
    !matches!(rx.try_recv(), Err(TryRecvError::Empty))
}
