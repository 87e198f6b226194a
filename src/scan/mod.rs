//! Availability scanning: planning, execution and reporting of one pass
//! over the inventory tree.

mod executor;
mod planner;
mod record;
mod report;

pub use executor::*;
pub use planner::*;
pub use record::*;
pub use report::*;

#[cfg(test)]
pub(crate) mod fixtures;
