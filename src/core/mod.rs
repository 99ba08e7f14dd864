pub mod engine;
pub mod fingerprint;
pub mod marker;

#[cfg(test)]
pub mod testutil;

pub use engine::{SyncEngine, SyncOptions, SyncReport};
pub use marker::MarkerStore;
