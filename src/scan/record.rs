//! Statistics of one completed scan.

use serde::Serialize;

/// Immutable record of one scan, kept for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scan {
    forced: bool,
    full: bool,
    aborted: bool,
    start_time: i64,
    end_time: i64,
    num_resources: usize,
    num_availability_changes: usize,
    num_get_availability_calls: usize,
    num_scheduled_randomly: usize,
    num_pushed_by_interval: usize,
    num_defer_to_parent: usize,
}

impl Scan {
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// The report lists every resource rather than only changes.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// The scan was stopped before visiting every resource.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn end_time(&self) -> i64 {
        self.end_time
    }

    pub fn num_resources(&self) -> usize {
        self.num_resources
    }

    pub fn num_availability_changes(&self) -> usize {
        self.num_availability_changes
    }

    pub fn num_get_availability_calls(&self) -> usize {
        self.num_get_availability_calls
    }

    pub fn num_scheduled_randomly(&self) -> usize {
        self.num_scheduled_randomly
    }

    pub fn num_pushed_by_interval(&self) -> usize {
        self.num_pushed_by_interval
    }

    pub fn num_defer_to_parent(&self) -> usize {
        self.num_defer_to_parent
    }
}

/// Counters accumulated while a scan runs.
#[derive(Debug)]
pub struct ScanStats {
    scan: Scan,
}

impl ScanStats {
    pub fn new(forced: bool, full: bool, start_time: i64) -> Self {
        Self {
            scan: Scan {
                forced,
                full,
                aborted: false,
                start_time,
                end_time: start_time,
                num_resources: 0,
                num_availability_changes: 0,
                num_get_availability_calls: 0,
                num_scheduled_randomly: 0,
                num_pushed_by_interval: 0,
                num_defer_to_parent: 0,
            },
        }
    }

    pub fn resource(&mut self) {
        self.scan.num_resources += 1;
    }

    pub fn availability_change(&mut self) {
        self.scan.num_availability_changes += 1;
    }

    pub fn get_availability_call(&mut self) {
        self.scan.num_get_availability_calls += 1;
    }

    pub fn scheduled_randomly(&mut self) {
        self.scan.num_scheduled_randomly += 1;
    }

    pub fn pushed_by_interval(&mut self) {
        self.scan.num_pushed_by_interval += 1;
    }

    pub fn defer_to_parent(&mut self) {
        self.scan.num_defer_to_parent += 1;
    }

    pub fn aborted(&mut self) {
        self.scan.aborted = true;
    }

    pub fn finish(mut self, end_time: i64) -> Scan {
        self.scan.end_time = end_time;
        self.scan
    }
}
