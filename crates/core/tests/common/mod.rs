#![allow(dead_code)]

use srcsync_api::{ElementKind, SourceParser};
use srcsync_core::model::{CollectionRef, ElementId, SourceModel};
use srcsync_core::sync::{SynchronizationContext, SynchronizationCoordinator};
use srcsync_core::{SyncMode, SyncSettings};
use srcsync_java::JavaParser;
use std::sync::Arc;

pub fn java() -> Arc<dyn SourceParser> {
    Arc::new(JavaParser::new().unwrap())
}

pub fn context() -> Arc<SynchronizationContext> {
    SynchronizationContext::new(SyncSettings::default())
}

pub fn context_with_mode(mode: SyncMode) -> Arc<SynchronizationContext> {
    SynchronizationContext::new(SyncSettings {
        default_mode: mode,
        ..Default::default()
    })
}

/// Opens a source and runs its first reparse.
pub fn open(
    ctx: &Arc<SynchronizationContext>,
    name: &str,
    text: &str,
) -> Arc<SynchronizationCoordinator> {
    let coordinator = ctx.open_source(name, text, java());
    coordinator.reparse_now().unwrap();
    coordinator
}

pub fn class(model: &SourceModel, qualified: &str) -> ElementId {
    model.find_class(qualified).unwrap()
}

pub fn member(model: &SourceModel, class: ElementId, kind: ElementKind, name: &str) -> ElementId {
    model
        .find_member(CollectionRef::of(class, kind), Some(name), None)
        .unwrap()
        .unwrap()
}

pub fn member_names(model: &SourceModel, class: ElementId, kind: ElementKind) -> Vec<String> {
    model
        .members(CollectionRef::of(class, kind))
        .unwrap()
        .into_iter()
        .map(|id| model.element(id).unwrap().name().as_str().to_string())
        .collect()
}
