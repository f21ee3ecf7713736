//! The live structural model of one compilation unit.
//!
//! Records live in a generational arena owned by [`SourceModel`]; collections
//! hold ids in source order. Parents own children, children only know their
//! parent's id.

mod build;
mod change;
mod collection;
mod decl;
mod element;
mod event;
mod id;
pub(crate) mod kind;
mod matcher;
mod mutate;
pub(crate) mod render;

pub use change::{ChangeKind, ChangeMask, ChangeRecord};
pub use collection::{CollectionChange, CollectionOwner, CollectionRef, MemberCollection};
pub use decl::{
    ClassDetail, ConstructorDetail, Declaration, DeclarationDetail, FieldDetail, InitializerDetail,
    MethodDetail,
};
pub use element::{
    ClassPayload, ConstructorPayload, ElementBase, ElementRecord, FieldPayload,
    InitializerPayload, MethodPayload, Payload, SourceBounds,
};
pub use event::{EventTarget, Property, PropertyChange, PropertyListener, PropertyValue};
pub use id::ElementId;
pub use matcher::{Comparator, Matchable, StructuralMatcher};
pub use mutate::InterfacesChange;

use crate::error::{Result, SyncError};
use crate::text::{Document, PositionSource};
use id::ElementArena;
use serde::Serialize;
use srcsync_api::{ElementKind, Identifier, ParseTree, RawImport, RawMember};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    NotParsed,
    Ok,
    /// Parsed with syntax errors; the model holds best-effort data.
    Partial,
    /// The last parse produced nothing; the model holds the last good data.
    Error,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceStatus::NotParsed => "not parsed",
            SourceStatus::Ok => "ok",
            SourceStatus::Partial => "partial",
            SourceStatus::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Import {
    pub name: Identifier,
    pub is_static: bool,
    pub on_demand: bool,
}

impl From<&RawImport> for Import {
    fn from(raw: &RawImport) -> Self {
        Self {
            name: raw.name.clone(),
            is_static: raw.is_static,
            on_demand: raw.on_demand,
        }
    }
}

pub struct SourceModel {
    document: Document,
    arena: ElementArena,
    package: Option<Identifier>,
    imports: Vec<Import>,
    classes: MemberCollection,
    status: SourceStatus,
    events: Vec<PropertyChange>,
}

impl fmt::Debug for SourceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceModel")
            .field("package", &self.package)
            .field("classes", &self.classes)
            .field("status", &self.status)
            .field("elements", &self.arena.len())
            .finish()
    }
}

impl SourceModel {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            arena: ElementArena::default(),
            package: None,
            imports: Vec::new(),
            classes: MemberCollection::new(ElementKind::Class),
            status: SourceStatus::NotParsed,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn status(&self) -> SourceStatus {
        self.status
    }

    pub fn package(&self) -> Option<&Identifier> {
        self.package.as_ref()
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// Top-level classes in source order.
    pub fn classes(&self) -> Vec<ElementId> {
        self.classes.to_array()
    }

    pub fn element(&self, id: ElementId) -> Result<&ElementRecord> {
        self.arena.get(id).ok_or(SyncError::InvalidElement(id))
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Result<&mut ElementRecord> {
        self.arena.get_mut(id).ok_or(SyncError::InvalidElement(id))
    }

    pub fn is_valid(&self, id: ElementId) -> bool {
        self.arena.contains(id)
    }

    /// Number of live records, nested members included.
    pub fn element_count(&self) -> usize {
        self.arena.len()
    }

    pub fn class(&self, id: ElementId) -> Result<&ClassPayload> {
        self.element(id)?
            .as_class()
            .ok_or_else(|| SyncError::structural(format!("{} is not a class", id)))
    }

    /// Every class of the unit, nested ones included, outer classes first.
    pub fn all_classes(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.classes.iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Ok(class) = self.class(id) {
                stack.extend(class.members(ElementKind::Class).iter().rev());
            }
        }
        out
    }

    /// Dotted name including the package and enclosing classes.
    pub fn qualified_name(&self, id: ElementId) -> Result<String> {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let record = self.element(cur)?;
            parts.push(record.name().as_str().to_string());
            current = record.parent();
        }
        if let Some(package) = &self.package {
            parts.push(package.as_str().to_string());
        }
        parts.reverse();
        Ok(parts.join("."))
    }

    pub fn find_class(&self, qualified: &str) -> Option<ElementId> {
        self.all_classes()
            .into_iter()
            .find(|id| self.qualified_name(*id).is_ok_and(|name| name == qualified))
    }

    pub(crate) fn queue(
        &mut self,
        target: EventTarget,
        property: Property,
        old: PropertyValue,
        new: PropertyValue,
    ) {
        self.events.push(PropertyChange {
            target,
            property,
            old,
            new,
        });
    }

    pub(crate) fn take_events(&mut self) -> Vec<PropertyChange> {
        std::mem::take(&mut self.events)
    }

    /// Always queues a status event, even when the value is unchanged.
    pub(crate) fn set_status(&mut self, status: SourceStatus) {
        let old = std::mem::replace(&mut self.status, status);
        self.queue(
            EventTarget::Unit,
            Property::Status,
            PropertyValue::Status(old),
            PropertyValue::Status(status),
        );
    }

    /// Diffs a fresh parse tree into the model. `text` is the text the tree
    /// was parsed from and `source` must hand out positions in that text.
    pub(crate) fn apply_parse_tree(
        &mut self,
        tree: ParseTree,
        text: &str,
        source: &dyn PositionSource,
        mask: ChangeMask,
    ) -> Result<Vec<ChangeRecord>> {
        if tree.package != self.package {
            let old = std::mem::replace(&mut self.package, tree.package.clone());
            self.queue(
                EventTarget::Unit,
                Property::Package,
                PropertyValue::Identifier(old),
                PropertyValue::Identifier(tree.package),
            );
        }

        let imports: Vec<Import> = tree.imports.iter().map(Import::from).collect();
        if imports != self.imports {
            let old = std::mem::replace(&mut self.imports, imports.clone());
            self.queue(
                EventTarget::Unit,
                Property::Imports,
                PropertyValue::Imports(old),
                PropertyValue::Imports(imports),
            );
        }

        let mut records = Vec::new();
        let classes = tree.classes.into_iter().map(RawMember::Class).collect();
        let changed = self.update_content(
            CollectionRef::classes(),
            classes,
            text,
            source,
            mask,
            &mut records,
        )?;
        debug!(
            "Applied parse tree: {} change records, top-level classes changed: {}",
            records.len(),
            changed
        );
        Ok(records)
    }
}
