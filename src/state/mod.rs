//! State module for run-scoped bookkeeping
//!
//! # Components
//!
//! - `VisitedSet`: URLs already fetched in this run, shared by every crawl
//! - `RunBudget`: package limit, deadline and stop flag checked cooperatively

mod budget;
mod visited;

pub use budget::RunBudget;
pub use visited::VisitedSet;
