//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ApifyAdapter, PostgresSnapshotStore, ServerDeps};
pub use test_dependencies::{FailingSnapshotStore, MemorySnapshotStore, MockScrapeProvider};
pub use traits::*;
