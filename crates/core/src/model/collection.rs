//! Member collections: ordered sibling records of one kind, diffed on reparse
//! and changed on request.

use super::change::{ChangeKind, ChangeMask, ChangeRecord};
use super::decl::{Declaration, DeclarationDetail};
use super::element::ElementRecord;
use super::event::{EventTarget, PropertyValue};
use super::id::ElementId;
use super::kind;
use super::matcher::StructuralMatcher;
use super::render::{self, INDENT_UNIT};
use super::SourceModel;
use crate::error::{Result, SyncError};
use crate::text::{PositionSource, expand_to_lines, line_indent};
use srcsync_api::{ElementKind, RawMember, TypeRef};
use tracing::debug;

/// Ordered ids of sibling records of one kind.
#[derive(Debug, Clone)]
pub struct MemberCollection {
    kind: ElementKind,
    members: Vec<ElementId>,
}

impl MemberCollection {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            members: Vec::new(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// A copy of the current members.
    pub fn to_array(&self) -> Vec<ElementId> {
        self.members.clone()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ElementId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.members.contains(&id)
    }

    pub fn last(&self) -> Option<ElementId> {
        self.members.last().copied()
    }

    pub(crate) fn replace(&mut self, members: Vec<ElementId>) {
        self.members = members;
    }

    pub(crate) fn push(&mut self, id: ElementId) {
        self.members.push(id);
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        before != self.members.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionOwner {
    Unit,
    Class(ElementId),
}

/// Addresses one member collection of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub owner: CollectionOwner,
    pub kind: ElementKind,
}

impl CollectionRef {
    /// The top-level classes of the compilation unit.
    pub fn classes() -> Self {
        Self {
            owner: CollectionOwner::Unit,
            kind: ElementKind::Class,
        }
    }

    pub fn of(class: ElementId, kind: ElementKind) -> Self {
        Self {
            owner: CollectionOwner::Class(class),
            kind,
        }
    }

    pub(crate) fn parent(&self) -> Option<ElementId> {
        match self.owner {
            CollectionOwner::Unit => None,
            CollectionOwner::Class(id) => Some(id),
        }
    }

    fn target(&self) -> EventTarget {
        match self.owner {
            CollectionOwner::Unit => EventTarget::Unit,
            CollectionOwner::Class(id) => EventTarget::Element(id),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CollectionChange {
    /// Replace every member with new ones, in order.
    Set(Vec<Declaration>),
    /// Append new members after the current last one.
    Add(Vec<Declaration>),
    /// Remove the listed members; ids not in the collection are ignored.
    Remove(Vec<ElementId>),
}

struct InsertionPoint {
    offset: usize,
    prefix: String,
    suffix: String,
    indent: String,
}

impl SourceModel {
    pub fn collection(&self, at: CollectionRef) -> Result<&MemberCollection> {
        match at.owner {
            CollectionOwner::Unit if at.kind == ElementKind::Class => Ok(&self.classes),
            CollectionOwner::Unit => Err(SyncError::structural(format!(
                "a compilation unit has no {} collection",
                at.kind
            ))),
            CollectionOwner::Class(id) => Ok(self.class(id)?.members(at.kind)),
        }
    }

    fn collection_mut(&mut self, at: CollectionRef) -> Result<&mut MemberCollection> {
        match at.owner {
            CollectionOwner::Unit if at.kind == ElementKind::Class => Ok(&mut self.classes),
            CollectionOwner::Unit => Err(SyncError::structural(format!(
                "a compilation unit has no {} collection",
                at.kind
            ))),
            CollectionOwner::Class(id) => self
                .element_mut(id)?
                .as_class_mut()
                .map(|c| c.members_mut(at.kind))
                .ok_or_else(|| SyncError::structural(format!("{} is not a class", id))),
        }
    }

    /// Current members of a collection.
    pub fn members(&self, at: CollectionRef) -> Result<Vec<ElementId>> {
        Ok(self.collection(at)?.to_array())
    }

    /// Finds a member by name and, for callables, by parameter types.
    /// Either criterion may be left out.
    pub fn find_member(
        &self,
        at: CollectionRef,
        name: Option<&str>,
        parameter_types: Option<&[TypeRef]>,
    ) -> Result<Option<ElementId>> {
        for id in self.collection(at)?.iter() {
            let record = self.element(id)?;
            if name.is_some_and(|n| record.name().as_str() != n) {
                continue;
            }
            if let Some(types) = parameter_types {
                let params = record.parameters();
                if params.len() != types.len()
                    || params.iter().zip(types).any(|(p, t)| !p.type_ref.same_as(t))
                {
                    continue;
                }
            }
            return Ok(Some(id));
        }
        Ok(None)
    }

    /// Applies a programmatic change, regenerating source text. Returns the ids
    /// of created members. On error some members may already have been removed
    /// or added; the collection reflects what actually happened.
    pub fn change_members(
        &mut self,
        at: CollectionRef,
        change: CollectionChange,
    ) -> Result<Vec<ElementId>> {
        if let Some(owner) = at.parent() {
            self.writable(owner)?;
        }
        let before = self.collection(at)?.to_array();
        let outcome = self.apply_collection_change(at, change);
        let after = self.collection(at)?.to_array();
        if before != after {
            self.queue(
                at.target(),
                kind::capabilities(at.kind).collection_property,
                PropertyValue::Elements(before),
                PropertyValue::Elements(after),
            );
        }
        outcome
    }

    fn apply_collection_change(
        &mut self,
        at: CollectionRef,
        change: CollectionChange,
    ) -> Result<Vec<ElementId>> {
        match change {
            CollectionChange::Set(decls) => {
                check_kinds(at.kind, &decls)?;
                for id in self.collection(at)?.to_array() {
                    self.remove_member(at, id)?;
                }
                decls.iter().map(|d| self.insert_declaration(at, d)).collect()
            }
            CollectionChange::Add(decls) => {
                check_kinds(at.kind, &decls)?;
                decls.iter().map(|d| self.insert_declaration(at, d)).collect()
            }
            CollectionChange::Remove(ids) => {
                for id in ids {
                    if self.collection(at)?.contains(id) {
                        self.remove_member(at, id)?;
                    }
                }
                Ok(Vec::new())
            }
        }
    }

    fn remove_member(&mut self, at: CollectionRef, id: ElementId) -> Result<()> {
        self.remove_from_source(id)?;
        self.collection_mut(at)?.remove(id);
        self.invalidate(id);
        Ok(())
    }

    fn insert_declaration(&mut self, at: CollectionRef, decl: &Declaration) -> Result<ElementId> {
        let mut decl = decl.clone();
        if let (DeclarationDetail::Constructor(_), Some(owner)) = (&decl.detail, at.parent()) {
            decl.base.name = self.element(owner)?.name().clone();
        }
        let point = self.insertion_point(at)?;
        let rendered = render::render(&decl, &point.indent);
        let text = format!("{}{}{}", point.prefix, rendered.text, point.suffix);
        self.document.insert(point.offset, &text)?;
        let id = self.create_from_declaration(
            at.parent(),
            &decl,
            &rendered.layout,
            point.offset + point.prefix.len(),
        );
        self.collection_mut(at)?.push(id);
        debug!("Inserted {} {} at {}", at.kind, decl.name(), point.offset);
        Ok(id)
    }

    fn insertion_point(&self, at: CollectionRef) -> Result<InsertionPoint> {
        let text = self.document.text();
        let Some(owner) = at.parent() else {
            if let Some(last) = self.classes.last() {
                return Ok(InsertionPoint {
                    offset: self.element(last)?.bounds.element.end(),
                    prefix: "\n\n".to_string(),
                    suffix: String::new(),
                    indent: String::new(),
                });
            }
            let prefix = if text.is_empty() || text.ends_with("\n\n") {
                ""
            } else if text.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            return Ok(InsertionPoint {
                offset: text.len(),
                prefix: prefix.to_string(),
                suffix: "\n".to_string(),
                indent: String::new(),
            });
        };

        let class_record = self.element(owner)?;
        let class = self.class(owner)?;
        // After the last member of this kind, or of the closest kind before it.
        for kind in ElementKind::MEMBER_ORDER[..=at.kind.position()].iter().rev() {
            if let Some(last) = class.members(*kind).last() {
                let bounds = &self.element(last)?.bounds;
                let indent = line_indent(&text, bounds.header.begin());
                let separator = if *kind == ElementKind::Field && at.kind == ElementKind::Field {
                    "\n"
                } else {
                    "\n\n"
                };
                return Ok(InsertionPoint {
                    offset: bounds.element.end(),
                    prefix: format!("{}{}", separator, indent),
                    suffix: String::new(),
                    indent,
                });
            }
        }

        let body = class_record
            .bounds
            .body
            .as_ref()
            .ok_or_else(|| SyncError::structural(format!("class {} has no body", class_record.name())))?;
        let class_indent = line_indent(&text, class_record.bounds.header.begin());
        let indent = format!("{}{}", class_indent, INDENT_UNIT);
        let offset = body.begin() + 1;
        let rest = text.get(offset..).unwrap_or_default();
        let line_rest = rest.split('\n').next().unwrap_or_default().trim();
        let suffix = if line_rest.starts_with('}') {
            format!("\n{}", class_indent)
        } else if !line_rest.is_empty() {
            format!("\n{}", indent)
        } else {
            String::new()
        };
        Ok(InsertionPoint {
            offset,
            prefix: format!("\n{}", indent),
            suffix,
            indent,
        })
    }

    /// Deletes the text of a member, keeping shared field-group text.
    pub(crate) fn remove_from_source(&mut self, id: ElementId) -> Result<()> {
        let record = self.writable(id)?;
        if record.as_field().is_some_and(|f| f.is_grouped()) {
            return self.remove_grouped_field(id);
        }
        let range = record.bounds.element.range();
        let text = self.document.text();
        let (begin, end) = expand_to_lines(&text, range.begin, range.end);
        self.document.remove(begin, end - begin)
    }

    pub(super) fn remove_grouped_field(&mut self, id: ElementId) -> Result<()> {
        let (begin, end) = self.grouped_declarator_span(id)?;
        self.document.remove(begin, end - begin)?;
        self.unlink_from_group(id);
        Ok(())
    }

    /// The text to cut when a field leaves its group: its declarator plus the
    /// comma joining it to a neighbour.
    pub(super) fn grouped_declarator_span(&self, id: ElementId) -> Result<(usize, usize)> {
        let record = self.element(id)?;
        let (previous, next) = match record.as_field() {
            Some(f) => (f.previous_in_group, f.next_in_group),
            None => (None, None),
        };
        let own = declarator_of(record)?;
        let (begin, end) = match (previous, next) {
            (Some(prev), _) => (declarator_of(self.element(prev)?)?.end(), own.end()),
            (None, Some(next)) => (own.begin(), declarator_of(self.element(next)?)?.begin()),
            (None, None) => return Err(SyncError::Internal("field is not grouped".to_string())),
        };
        Ok((begin, end))
    }

    pub(crate) fn unlink_from_group(&mut self, id: ElementId) {
        let Some(field) = self.arena.get_mut(id).and_then(|r| r.as_field_mut()) else {
            return;
        };
        let previous = field.previous_in_group.take();
        let next = field.next_in_group.take();
        if let Some(f) = previous.and_then(|p| self.arena.get_mut(p)).and_then(|r| r.as_field_mut()) {
            f.next_in_group = next;
        }
        if let Some(f) = next.and_then(|n| self.arena.get_mut(n)).and_then(|r| r.as_field_mut()) {
            f.previous_in_group = previous;
        }
    }

    /// Marks a record and everything nested in it as removed.
    pub(crate) fn invalidate(&mut self, id: ElementId) {
        let Some(record) = self.arena.remove(id) else {
            return;
        };
        if let Some(class) = record.as_class() {
            for kind in ElementKind::MEMBER_ORDER {
                for member in class.members(kind).iter() {
                    self.invalidate(member);
                }
            }
        }
        self.queue(
            EventTarget::Element(id),
            super::Property::Valid,
            PropertyValue::Flag(true),
            PropertyValue::Flag(false),
        );
    }

    /// Diffs freshly parsed members into a collection. Returns whether the
    /// collection changed structurally (membership or order).
    pub(crate) fn update_content(
        &mut self,
        at: CollectionRef,
        fresh: Vec<RawMember>,
        text: &str,
        source: &dyn PositionSource,
        mask: ChangeMask,
        out: &mut Vec<ChangeRecord>,
    ) -> Result<bool> {
        let old = self.collection(at)?.to_array();
        let category = at.kind;

        if fresh.is_empty() {
            if old.is_empty() {
                return Ok(false);
            }
            for id in &old {
                self.report_removal(at, *id, mask, out);
                self.invalidate(*id);
            }
            self.collection_mut(at)?.replace(Vec::new());
            self.queue(
                at.target(),
                kind::capabilities(category).collection_property,
                PropertyValue::Elements(old),
                PropertyValue::Elements(Vec::new()),
            );
            return Ok(true);
        }

        let pairs = {
            let records = old
                .iter()
                .map(|id| self.element(*id))
                .collect::<Result<Vec<&ElementRecord>>>()?;
            StructuralMatcher::for_kind(category).pair(&records, &fresh)?
        };
        let changed =
            fresh.len() != old.len() || pairs.iter().enumerate().any(|(i, p)| *p != Some(i));

        let groups = super::build::field_groups(&fresh);

        let mut used = vec![false; old.len()];
        let mut next = Vec::with_capacity(fresh.len());
        for (raw, pair) in fresh.into_iter().zip(pairs) {
            match pair {
                Some(j) => {
                    used[j] = true;
                    self.update_from_raw(old[j], raw, text, source, mask, out)?;
                    next.push(old[j]);
                }
                None => {
                    let id = self.create_from_raw(at.parent(), raw, text, source);
                    if mask.allows(ChangeKind::Add, category) {
                        out.push(ChangeRecord {
                            kind: ChangeKind::Add,
                            category,
                            owner: at.parent(),
                            element: id,
                            previous: None,
                        });
                    }
                    debug!("{}: {}", kind::describe(ChangeKind::Add, category), id);
                    next.push(id);
                }
            }
        }

        for (j, id) in old.iter().enumerate() {
            if !used[j] {
                self.report_removal(at, *id, mask, out);
                debug!("{}: {}", kind::describe(ChangeKind::Remove, category), id);
                self.invalidate(*id);
            }
        }

        if category == ElementKind::Field {
            self.relink_field_groups(&next, &groups);
        }

        if changed {
            self.collection_mut(at)?.replace(next.clone());
            self.queue(
                at.target(),
                kind::capabilities(category).collection_property,
                PropertyValue::Elements(old),
                PropertyValue::Elements(next),
            );
        }
        Ok(changed)
    }

    fn report_removal(
        &self,
        at: CollectionRef,
        id: ElementId,
        mask: ChangeMask,
        out: &mut Vec<ChangeRecord>,
    ) {
        if mask.allows(ChangeKind::Remove, at.kind) {
            out.push(ChangeRecord {
                kind: ChangeKind::Remove,
                category: at.kind,
                owner: at.parent(),
                element: id,
                previous: self.snapshot(id).ok(),
            });
        }
    }

    /// Links consecutive fields that came from one declaration statement.
    pub(crate) fn relink_field_groups(&mut self, fields: &[ElementId], groups: &[Option<u32>]) {
        for (i, id) in fields.iter().enumerate() {
            let group = groups.get(i).copied().flatten();
            let same = |other: Option<usize>| {
                other
                    .and_then(|o| groups.get(o).copied().flatten())
                    .is_some_and(|g| Some(g) == group)
            };
            let previous = if i > 0 && same(Some(i - 1)) { Some(fields[i - 1]) } else { None };
            let next = if same(Some(i + 1)) { fields.get(i + 1).copied() } else { None };
            if let Some(field) = self.arena.get_mut(*id).and_then(|r| r.as_field_mut()) {
                field.previous_in_group = previous;
                field.next_in_group = next;
            }
        }
    }
}

fn check_kinds(expected: ElementKind, decls: &[Declaration]) -> Result<()> {
    match decls.iter().find(|d| d.kind() != expected) {
        Some(stray) => Err(SyncError::structural(format!(
            "cannot put {} {} into a {} collection",
            stray.kind(),
            stray.name(),
            expected
        ))),
        None => Ok(()),
    }
}

fn declarator_of(record: &ElementRecord) -> Result<&crate::text::Bounds> {
    record
        .bounds
        .declarator
        .as_ref()
        .ok_or_else(|| SyncError::structural(format!("field {} has no declarator", record.name())))
}
