pub mod layout;
pub mod snapshot;

pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
