//! Live structural model of Java compilation units, kept in step with the
//! source text, plus propagation of interface methods to implementors.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod source;
pub mod sync;
pub mod text;

pub use config::{SyncMode, SyncSettings};
pub use error::{Result, SyncError};
pub use model::{ElementId, SourceModel, SourceStatus};
pub use source::{ListenerScope, SourceFile};
pub use sync::{SynchronizationContext, SynchronizationCoordinator};
