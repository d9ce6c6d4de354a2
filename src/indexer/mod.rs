//! Indexer: the Sync Controller, Block Syncer, Rollback Engine and
//! CheckInfo Cleaner, composed the way `ChainSync` is composed over a
//! shared `BlockProcessor`.

pub mod cleaner;
pub mod controller;
pub mod rollback;
pub mod syncer;

pub use cleaner::CheckInfoCleaner;
pub use controller::SyncController;
