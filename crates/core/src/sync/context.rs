//! Per-session synchronization state: settings, file modes, open sources and
//! the external collaborators (confirmation, consistency listeners).

use super::action::ChangeAction;
use super::coordinator::SynchronizationCoordinator;
use crate::config::{SyncMode, SyncSettings};
use crate::error::SyncError;
use crate::model::ChangeRecord;
use crate::source::SourceFile;
use dashmap::DashMap;
use parking_lot::RwLock;
use srcsync_api::SourceParser;
use std::sync::Arc;
use tracing::info;

/// The user's answer to a list of proposed actions.
#[derive(Debug, Clone, Default)]
pub struct Confirmation {
    /// Indices into the proposed list.
    pub approved: Vec<usize>,
    /// New mode for the file, when the user changed it.
    pub mode: Option<SyncMode>,
}

/// The confirmation dialog seam.
pub trait SyncConfirmer: Send + Sync {
    fn confirm(&self, file: &str, actions: &[ChangeAction], mode: SyncMode) -> Confirmation;

    fn report_failures(&self, failures: &[(ChangeAction, SyncError)]);
}

/// Notified after every reparse that produced change records.
pub trait ConsistencyListener: Send + Sync {
    fn source_changed(&self, file: &SourceFile, changes: &[ChangeRecord]);
}

pub struct SynchronizationContext {
    settings: RwLock<SyncSettings>,
    modes: DashMap<String, SyncMode>,
    sources: DashMap<String, Arc<SourceFile>>,
    coordinators: DashMap<String, Arc<SynchronizationCoordinator>>,
    confirmer: RwLock<Option<Arc<dyn SyncConfirmer>>>,
    consistency_listeners: RwLock<Vec<Arc<dyn ConsistencyListener>>>,
}

impl SynchronizationContext {
    pub fn new(settings: SyncSettings) -> Arc<Self> {
        Arc::new(Self {
            settings: RwLock::new(settings),
            modes: DashMap::new(),
            sources: DashMap::new(),
            coordinators: DashMap::new(),
            confirmer: RwLock::new(None),
            consistency_listeners: RwLock::new(Vec::new()),
        })
    }

    pub fn settings(&self) -> SyncSettings {
        self.settings.read().clone()
    }

    pub fn update_settings(&self, update: impl FnOnce(&mut SyncSettings)) {
        update(&mut self.settings.write());
    }

    /// The file's explicit mode, or the default mode.
    pub fn mode(&self, file: &str) -> SyncMode {
        self.modes
            .get(file)
            .map(|m| *m)
            .unwrap_or_else(|| self.settings.read().default_mode)
    }

    pub fn set_mode(&self, file: &str, mode: SyncMode) {
        self.modes.insert(file.to_string(), mode);
    }

    pub fn set_confirmer(&self, confirmer: Arc<dyn SyncConfirmer>) {
        *self.confirmer.write() = Some(confirmer);
    }

    pub fn confirmer(&self) -> Option<Arc<dyn SyncConfirmer>> {
        self.confirmer.read().clone()
    }

    pub fn add_consistency_listener(&self, listener: Arc<dyn ConsistencyListener>) {
        self.consistency_listeners.write().push(listener);
    }

    pub(crate) fn consistency_listeners(&self) -> Vec<Arc<dyn ConsistencyListener>> {
        self.consistency_listeners.read().clone()
    }

    /// Registers a source and returns its coordinator. Reopening a name
    /// replaces the previous source.
    pub fn open_source(
        self: &Arc<Self>,
        name: impl Into<String>,
        text: impl Into<String>,
        parser: Arc<dyn SourceParser>,
    ) -> Arc<SynchronizationCoordinator> {
        let name = name.into();
        self.close_source(&name);
        let file = Arc::new(SourceFile::new(name.clone(), text));
        let coordinator = Arc::new(SynchronizationCoordinator::new(
            file.clone(),
            parser,
            Arc::downgrade(self),
            self.settings.read().parse_cache_capacity,
        ));
        self.sources.insert(name.clone(), file);
        self.coordinators.insert(name.clone(), coordinator.clone());
        info!("Opened source {}", name);
        coordinator
    }

    /// Stops the file's worker and releases its cached parses.
    pub fn close_source(&self, name: &str) -> bool {
        self.sources.remove(name);
        match self.coordinators.remove(name) {
            Some((_, coordinator)) => {
                coordinator.shutdown();
                coordinator.release();
                info!("Closed source {}", name);
                true
            }
            None => false,
        }
    }

    pub fn source(&self, name: &str) -> Option<Arc<SourceFile>> {
        self.sources.get(name).map(|s| s.value().clone())
    }

    pub fn coordinator(&self, name: &str) -> Option<Arc<SynchronizationCoordinator>> {
        self.coordinators.get(name).map(|c| c.value().clone())
    }

    /// Every open source, ordered by name.
    pub fn sources(&self) -> Vec<Arc<SourceFile>> {
        let mut sources: Vec<Arc<SourceFile>> =
            self.sources.iter().map(|entry| entry.value().clone()).collect();
        sources.sort_by(|a, b| a.name().cmp(b.name()));
        sources
    }
}
