use crate::error::Result;
use crate::model::{ElementId, EventTarget, PropertyChange, PropertyListener, SourceModel};
use crate::text::Document;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Which events a listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    All,
    /// Events on the compilation unit: status, package, imports, top-level classes.
    Unit,
    Element(ElementId),
}

impl ListenerScope {
    fn accepts(&self, target: EventTarget) -> bool {
        match (self, target) {
            (ListenerScope::All, _) => true,
            (ListenerScope::Unit, EventTarget::Unit) => true,
            (ListenerScope::Element(id), EventTarget::Element(target)) => *id == target,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    scope: ListenerScope,
    listener: Arc<dyn PropertyListener>,
}

/// An open source file: its document, its structural model and the
/// listeners observing the model.
pub struct SourceFile {
    name: String,
    document: Document,
    model: RwLock<SourceModel>,
    listeners: RwLock<Vec<ListenerEntry>>,
    next_listener: AtomicU64,
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile").field("name", &self.name).finish()
    }
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let document = Document::new(text);
        Self {
            name: name.into(),
            model: RwLock::new(SourceModel::new(document.clone())),
            document,
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Read access to the model. Do not hold the guard across a call to
    /// [`edit`](Self::edit) or a reparse.
    pub fn read(&self) -> RwLockReadGuard<'_, SourceModel> {
        self.model.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, SourceModel> {
        self.model.write()
    }

    /// Runs a mutation against the model. Queued events are dispatched after
    /// the lock is released, also when the mutation failed part way.
    pub fn edit<R>(&self, f: impl FnOnce(&mut SourceModel) -> Result<R>) -> Result<R> {
        let (result, events) = {
            let mut model = self.model.write();
            let result = f(&mut model);
            (result, model.take_events())
        };
        self.dispatch(events);
        result
    }

    pub fn add_listener(
        &self,
        scope: ListenerScope,
        listener: Arc<dyn PropertyListener>,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push(ListenerEntry {
            id,
            scope,
            listener,
        });
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        before != listeners.len()
    }

    pub(crate) fn dispatch(&self, events: Vec<PropertyChange>) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<(ListenerScope, Arc<dyn PropertyListener>)> = self
            .listeners
            .read()
            .iter()
            .map(|entry| (entry.scope, entry.listener.clone()))
            .collect();
        for event in &events {
            for (scope, listener) in &listeners {
                if scope.accepts(event.target) {
                    listener.property_changed(event);
                }
            }
        }
    }
}
