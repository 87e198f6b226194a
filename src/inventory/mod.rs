//! Inventory module.
//!
//! The resource tree the scanner walks, rooted at the platform.

mod models;
mod tree;

pub use models::*;
pub use tree::*;
