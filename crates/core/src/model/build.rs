//! Record construction from parse output and from detached declarations, and
//! in-place updates of matched records.

use super::change::{ChangeKind, ChangeMask, ChangeRecord};
use super::collection::CollectionRef;
use super::decl::{
    ClassDetail, ConstructorDetail, Declaration, DeclarationDetail, FieldDetail, InitializerDetail,
    MethodDetail,
};
use super::element::{
    ClassPayload, ConstructorPayload, ElementBase, ElementRecord, FieldPayload,
    InitializerPayload, MethodPayload, Payload, SourceBounds,
};
use super::event::{EventTarget, Property, PropertyChange, PropertyValue};
use super::id::ElementId;
use super::render::{Layout, dedent_block, javadoc_text};
use super::SourceModel;
use crate::error::{Result, SyncError};
use crate::text::{Bounds, PositionSource, line_indent};
use srcsync_api::{ElementKind, Identifier, RawMember, SourceSpan, TextRange};

type Nested = Vec<(ElementKind, Vec<RawMember>)>;

pub(super) fn field_groups(members: &[RawMember]) -> Vec<Option<u32>> {
    members
        .iter()
        .map(|m| match m {
            RawMember::Field(f) => f.group,
            _ => None,
        })
        .collect()
}

fn bind_span(source: &dyn PositionSource, span: &SourceSpan, declarator: Option<TextRange>) -> SourceBounds {
    SourceBounds {
        element: Bounds::new(source, TextRange::new(span.begin, span.end)),
        header: Bounds::new(source, TextRange::new(span.header_begin, span.header_end)),
        javadoc: span.javadoc.map(|r| Bounds::new(source, r)),
        body: span.body.map(|r| Bounds::new(source, r)),
        declarator: declarator.map(|r| Bounds::new(source, r)),
    }
}

pub(super) fn bind_layout(source: &dyn PositionSource, layout: &Layout, base: usize) -> SourceBounds {
    let at = |r: TextRange| TextRange::new(r.begin + base, r.end + base);
    SourceBounds {
        element: Bounds::new(source, at(layout.element)),
        header: Bounds::new(source, at(layout.header)),
        javadoc: layout.javadoc.map(|r| Bounds::new(source, at(r))),
        body: layout.body.map(|r| Bounds::new(source, at(r))),
        declarator: layout.declarator.map(|r| Bounds::new(source, at(r))),
    }
}

/// Splits a parsed member into record parts. Bodies and javadoc are stored
/// relative to the declaration's own indentation.
fn split_raw(raw: RawMember, indent: &str) -> (ElementBase, Payload, Nested) {
    let relative = |text: String| dedent_block(&text, indent);
    match raw {
        RawMember::Class(mut class) => {
            let nested = ElementKind::MEMBER_ORDER
                .iter()
                .map(|k| (*k, class.take_members(*k)))
                .collect();
            let base = ElementBase {
                name: Identifier::new(class.name),
                modifiers: class.modifiers,
                annotations: class.annotations,
                javadoc: class.javadoc.map(relative),
            };
            let payload = Payload::Class(ClassPayload::new(
                class.is_interface,
                class.type_parameters,
                class.superclass,
                class.interfaces,
            ));
            (base, payload, nested)
        }
        RawMember::Field(field) => (
            ElementBase {
                name: Identifier::new(field.name),
                modifiers: field.modifiers,
                annotations: field.annotations,
                javadoc: field.javadoc.map(relative),
            },
            Payload::Field(FieldPayload {
                type_ref: field.type_ref,
                initializer: field.initializer,
                previous_in_group: None,
                next_in_group: None,
            }),
            Vec::new(),
        ),
        RawMember::Method(method) => (
            ElementBase {
                name: Identifier::new(method.name),
                modifiers: method.modifiers,
                annotations: method.annotations,
                javadoc: method.javadoc.map(relative),
            },
            Payload::Method(MethodPayload {
                type_parameters: method.type_parameters,
                return_type: method.return_type,
                parameters: method.parameters,
                exceptions: method.exceptions,
                body: method.body.map(relative),
            }),
            Vec::new(),
        ),
        RawMember::Constructor(ctor) => (
            ElementBase {
                name: Identifier::new(ctor.name),
                modifiers: ctor.modifiers,
                annotations: ctor.annotations,
                javadoc: ctor.javadoc.map(relative),
            },
            Payload::Constructor(ConstructorPayload {
                type_parameters: ctor.type_parameters,
                parameters: ctor.parameters,
                exceptions: ctor.exceptions,
                body: relative(ctor.body),
            }),
            Vec::new(),
        ),
        RawMember::Initializer(init) => (
            ElementBase::default(),
            Payload::Initializer(InitializerPayload {
                is_static: init.is_static,
                body: relative(init.body),
            }),
            Vec::new(),
        ),
    }
}

/// Collects property events for one record; `significant` tracks whether a
/// change record is warranted.
struct Diff<'a> {
    target: EventTarget,
    events: &'a mut Vec<PropertyChange>,
    significant: bool,
}

impl Diff<'_> {
    fn set<T: PartialEq>(
        &mut self,
        slot: &mut T,
        value: T,
        property: Property,
        wrap: impl Fn(&T) -> PropertyValue,
    ) {
        if *slot != value {
            let old = std::mem::replace(slot, value);
            self.events.push(PropertyChange {
                target: self.target,
                property,
                old: wrap(&old),
                new: wrap(slot),
            });
            // Body edits are reported but do not make the element "changed".
            if property != Property::Body {
                self.significant = true;
            }
        }
    }

    fn set_quiet<T: PartialEq>(&mut self, slot: &mut T, value: T) {
        if *slot != value {
            *slot = value;
            self.significant = true;
        }
    }

    fn base(&mut self, slot: &mut ElementBase, fresh: ElementBase) {
        self.set(&mut slot.name, fresh.name, Property::Name, |v| {
            PropertyValue::Identifier(Some(v.clone()))
        });
        self.set(&mut slot.modifiers, fresh.modifiers, Property::Modifiers, |v| {
            PropertyValue::Modifiers(*v)
        });
        self.set_quiet(&mut slot.annotations, fresh.annotations);
        self.set(&mut slot.javadoc, fresh.javadoc, Property::Javadoc, |v| {
            PropertyValue::Text(v.clone())
        });
    }

    fn payload(&mut self, slot: &mut Payload, fresh: Payload) -> Result<()> {
        match (slot, fresh) {
            (Payload::Class(c), Payload::Class(n)) => {
                self.set_quiet(&mut c.is_interface, n.is_interface);
                self.set_quiet(&mut c.type_parameters, n.type_parameters);
                self.set(&mut c.superclass, n.superclass, Property::Superclass, |v| {
                    PropertyValue::Identifier(v.clone())
                });
                // Order carries no meaning for equality, but is kept for display.
                let same_set = c.interfaces.len() == n.interfaces.len()
                    && n.interfaces.iter().all(|i| c.interfaces.contains(i));
                if same_set {
                    c.interfaces = n.interfaces;
                } else {
                    self.set(&mut c.interfaces, n.interfaces, Property::Interfaces, |v| {
                        PropertyValue::Identifiers(v.clone())
                    });
                }
            }
            (Payload::Field(f), Payload::Field(n)) => {
                self.set(&mut f.type_ref, n.type_ref, Property::Type, |v| {
                    PropertyValue::Type(v.clone())
                });
                self.set(&mut f.initializer, n.initializer, Property::Initializer, |v| {
                    PropertyValue::Text(v.clone())
                });
            }
            (Payload::Method(m), Payload::Method(n)) => {
                self.set_quiet(&mut m.type_parameters, n.type_parameters);
                self.set(&mut m.return_type, n.return_type, Property::ReturnType, |v| {
                    PropertyValue::Type(v.clone())
                });
                self.set(&mut m.parameters, n.parameters, Property::Parameters, |v| {
                    PropertyValue::Parameters(v.clone())
                });
                self.set(&mut m.exceptions, n.exceptions, Property::Exceptions, |v| {
                    PropertyValue::Identifiers(v.clone())
                });
                self.set(&mut m.body, n.body, Property::Body, |v| PropertyValue::Text(v.clone()));
            }
            (Payload::Constructor(c), Payload::Constructor(n)) => {
                self.set_quiet(&mut c.type_parameters, n.type_parameters);
                self.set(&mut c.parameters, n.parameters, Property::Parameters, |v| {
                    PropertyValue::Parameters(v.clone())
                });
                self.set(&mut c.exceptions, n.exceptions, Property::Exceptions, |v| {
                    PropertyValue::Identifiers(v.clone())
                });
                self.set(&mut c.body, n.body, Property::Body, |v| {
                    PropertyValue::Text(Some(v.clone()))
                });
            }
            (Payload::Initializer(i), Payload::Initializer(n)) => {
                self.set(&mut i.is_static, n.is_static, Property::Static, |v| {
                    PropertyValue::Flag(*v)
                });
                self.set(&mut i.body, n.body, Property::Body, |v| {
                    PropertyValue::Text(Some(v.clone()))
                });
            }
            _ => {
                return Err(SyncError::MatchContract(
                    "matched a record with a member of another kind".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl SourceModel {
    /// Builds a record (and its nested members) from parse output.
    pub(crate) fn create_from_raw(
        &mut self,
        parent: Option<ElementId>,
        raw: RawMember,
        text: &str,
        source: &dyn PositionSource,
    ) -> ElementId {
        let indent = line_indent(text, raw.span().header_begin);
        let declarator = match &raw {
            RawMember::Field(f) => Some(f.declarator),
            _ => None,
        };
        let bounds = bind_span(source, raw.span(), declarator);
        let (base, payload, nested) = split_raw(raw, &indent);
        let id = self.arena.insert_with(|id| ElementRecord {
            id,
            parent,
            base,
            locked: false,
            bounds,
            payload,
        });

        for (kind, members) in nested {
            let groups = field_groups(&members);
            let ids: Vec<ElementId> = members
                .into_iter()
                .map(|m| self.create_from_raw(Some(id), m, text, source))
                .collect();
            if kind == ElementKind::Field {
                self.relink_field_groups(&ids, &groups);
            }
            if let Some(class) = self.arena.get_mut(id).and_then(|r| r.as_class_mut()) {
                class.members_mut(kind).replace(ids);
            }
        }
        id
    }

    /// Updates a matched record in place from parse output, keeping its id.
    pub(crate) fn update_from_raw(
        &mut self,
        id: ElementId,
        raw: RawMember,
        text: &str,
        source: &dyn PositionSource,
        mask: ChangeMask,
        out: &mut Vec<ChangeRecord>,
    ) -> Result<()> {
        let category = raw.kind();
        let previous = if mask.allows(ChangeKind::Change, category) {
            Some(self.snapshot(id)?)
        } else {
            None
        };
        let indent = line_indent(text, raw.span().header_begin);
        let declarator = match &raw {
            RawMember::Field(f) => Some(f.declarator),
            _ => None,
        };
        let bounds = bind_span(source, raw.span(), declarator);
        let (base, payload, nested) = split_raw(raw, &indent);

        let mut events = Vec::new();
        let record = self.element_mut(id)?;
        let owner = record.parent;
        record.bounds = bounds;
        let mut diff = Diff {
            target: EventTarget::Element(id),
            events: &mut events,
            significant: false,
        };
        diff.base(&mut record.base, base);
        diff.payload(&mut record.payload, payload)?;
        let significant = diff.significant;
        self.events.extend(events);

        if significant && previous.is_some() {
            out.push(ChangeRecord {
                kind: ChangeKind::Change,
                category,
                owner,
                element: id,
                previous,
            });
        }

        for (kind, members) in nested {
            self.update_content(CollectionRef::of(id, kind), members, text, source, mask, out)?;
        }
        Ok(())
    }

    /// Builds records for a declaration just rendered at `base`.
    pub(crate) fn create_from_declaration(
        &mut self,
        parent: Option<ElementId>,
        decl: &Declaration,
        layout: &Layout,
        base: usize,
    ) -> ElementId {
        let document = self.document.clone();
        let bounds = bind_layout(&document, layout, base);
        let mut element_base = decl.base.clone();
        element_base.javadoc = element_base.javadoc.as_deref().map(javadoc_text);
        let payload = match &decl.detail {
            DeclarationDetail::Class(c) => Payload::Class(ClassPayload::new(
                c.is_interface,
                c.type_parameters.clone(),
                c.superclass.clone(),
                c.interfaces.clone(),
            )),
            DeclarationDetail::Field(f) => Payload::Field(FieldPayload {
                type_ref: f.type_ref.clone(),
                initializer: f.initializer.clone(),
                previous_in_group: None,
                next_in_group: None,
            }),
            DeclarationDetail::Method(m) => Payload::Method(MethodPayload {
                type_parameters: m.type_parameters.clone(),
                return_type: m.return_type.clone(),
                parameters: m.parameters.clone(),
                exceptions: m.exceptions.clone(),
                body: m.body.clone(),
            }),
            DeclarationDetail::Constructor(c) => Payload::Constructor(ConstructorPayload {
                type_parameters: c.type_parameters.clone(),
                parameters: c.parameters.clone(),
                exceptions: c.exceptions.clone(),
                body: c.body.clone(),
            }),
            DeclarationDetail::Initializer(i) => Payload::Initializer(InitializerPayload {
                is_static: i.is_static,
                body: i.body.clone(),
            }),
        };
        let id = self.arena.insert_with(|id| ElementRecord {
            id,
            parent,
            base: element_base,
            locked: false,
            bounds,
            payload,
        });

        if let DeclarationDetail::Class(class) = &decl.detail {
            for (member, child) in class.members.iter().zip(&layout.children) {
                let member_id = self.create_from_declaration(Some(id), member, child, base);
                if let Some(payload) = self.arena.get_mut(id).and_then(|r| r.as_class_mut()) {
                    payload.members_mut(member.kind()).push(member_id);
                }
            }
        }
        id
    }

    /// A detached copy of a record, nested members included in source order.
    pub fn declaration(&self, id: ElementId) -> Result<Declaration> {
        self.to_declaration(id, true)
    }

    /// A detached copy without nested members.
    pub(crate) fn snapshot(&self, id: ElementId) -> Result<Declaration> {
        self.to_declaration(id, false)
    }

    fn to_declaration(&self, id: ElementId, deep: bool) -> Result<Declaration> {
        let record = self.element(id)?;
        let detail = match &record.payload {
            Payload::Class(c) => {
                let members = if deep {
                    let mut ids: Vec<ElementId> = ElementKind::MEMBER_ORDER
                        .iter()
                        .flat_map(|k| c.members(*k).iter())
                        .collect();
                    ids.sort_by_key(|m| {
                        self.element(*m)
                            .map(|r| r.bounds.element.begin())
                            .unwrap_or(usize::MAX)
                    });
                    ids.into_iter()
                        .map(|m| self.to_declaration(m, true))
                        .collect::<Result<Vec<_>>>()?
                } else {
                    Vec::new()
                };
                DeclarationDetail::Class(ClassDetail {
                    is_interface: c.is_interface,
                    type_parameters: c.type_parameters.clone(),
                    superclass: c.superclass.clone(),
                    interfaces: c.interfaces.clone(),
                    members,
                })
            }
            Payload::Field(f) => DeclarationDetail::Field(FieldDetail {
                type_ref: f.type_ref.clone(),
                initializer: f.initializer.clone(),
            }),
            Payload::Method(m) => DeclarationDetail::Method(MethodDetail {
                type_parameters: m.type_parameters.clone(),
                return_type: m.return_type.clone(),
                parameters: m.parameters.clone(),
                exceptions: m.exceptions.clone(),
                body: m.body.clone(),
            }),
            Payload::Constructor(c) => DeclarationDetail::Constructor(ConstructorDetail {
                type_parameters: c.type_parameters.clone(),
                parameters: c.parameters.clone(),
                exceptions: c.exceptions.clone(),
                body: c.body.clone(),
            }),
            Payload::Initializer(i) => DeclarationDetail::Initializer(InitializerDetail {
                is_static: i.is_static,
                body: i.body.clone(),
            }),
        };
        Ok(Declaration {
            base: record.base.clone(),
            detail,
        })
    }
}
