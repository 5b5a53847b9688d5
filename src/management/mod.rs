mod games;
mod snapshot;
mod state;
mod user;

pub use games::GameTableStore;
pub use snapshot::{Snapshot, SnapshotStore, StoreError, is_fresh};
pub use state::{StateError, StateFile};
pub use user::{User, get_buddies, get_collection};
