//! Data module - CSV loading, filtering and aggregation
//!
//! ```text
//!  data.csv ──► loader ──► CanonicalTable ──┬──► filter ────► FilteredView
//!                                           └──► aggregate ─► Distribution
//! ```

mod aggregate;
mod filter;
mod loader;
mod model;

pub use aggregate::{CategoryColumn, Distribution, OTHER_LABEL, STATE_THRESHOLD, TYPE_THRESHOLD};
pub use filter::{filter, Selection, TrendPoint};
pub use loader::DatasetLoader;
pub use model::{CanonicalTable, Choice};
#[cfg(test)]
pub use model::Reading;
