//! Availability scanning for a hierarchical resource inventory.
//!
//! Periodically determines whether each managed resource is UP, DOWN or
//! UNKNOWN and reports only the changes to a remote collector.

pub mod clock;
pub mod config;
pub mod inventory;
pub mod provider;
pub mod scan;
pub mod scheduler;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::SchedulerConfig;
pub use inventory::{AvailabilityType, InventoryError, ResourceCategory, ResourceId, ResourceNode, ResourceTree};
pub use provider::{AvailabilityProvider, ProviderError};
pub use scan::{AvailabilityExecutor, AvailabilityReport, Datum, Scan, ScanOptions};
pub use scheduler::{AvailabilityScheduler, SchedulerError};
