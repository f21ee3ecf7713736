//! Reparse scheduling and interface synchronization.

mod action;
mod context;
mod coordinator;
mod index;
mod interface;

pub use action::{ActionKind, ChangeAction};
pub use context::{Confirmation, ConsistencyListener, SyncConfirmer, SynchronizationContext};
pub use coordinator::{CycleReport, PrepareHandle, ReparseReport, SynchronizationCoordinator};
pub use interface::{InterfaceSyncEngine, SyncOutcome};
