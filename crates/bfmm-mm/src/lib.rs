//! Two-sided quoting strategy for bfmm.
//!
//! The strategy is split into three layers: `pricer` derives a
//! depth-weighted limit price from one book side, `lifecycle` runs a
//! single side of the quote loop from entry to fill, and `coordinator`
//! gates entry on spread, sizes both sides against held inventory, and
//! runs them concurrently to completion.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod lifecycle;
pub mod pricer;

pub use config::MakerConfig;
pub use coordinator::{Coordinator, CycleReport};
pub use error::{MmError, MmResult};
pub use lifecycle::QuoteLifecycle;
pub use pricer::depth_limit_price;
