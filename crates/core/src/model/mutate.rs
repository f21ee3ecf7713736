//! Programmatic edits of single records.
//!
//! Every setter validates the record, stores the new value, regenerates the
//! affected piece of source text and queues a property event. When the text
//! cannot be written the previous value is put back and the error returned.

use super::element::{ElementRecord, Payload};
use super::event::{EventTarget, Property, PropertyValue};
use super::id::ElementId;
use super::render::{self, indent_block, javadoc_text};
use super::SourceModel;
use crate::error::{Result, SyncError};
use crate::text::{Bounds, line_indent};
use srcsync_api::{ElementKind, Identifier, Modifiers, Parameter, TextRange, TypeRef};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum InterfacesChange {
    Set(Vec<Identifier>),
    Add(Vec<Identifier>),
    Remove(Vec<Identifier>),
}

/// The piece of source text a property lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Header,
    Declarator,
    /// Modifiers and type of a field, up to its declarator.
    FieldPrefix,
    Javadoc,
    Body,
}

type Access<T> = for<'a> fn(&'a mut ElementRecord) -> Option<&'a mut T>;

impl SourceModel {
    /// The record, provided it is alive and not locked.
    pub(crate) fn writable(&self, id: ElementId) -> Result<&ElementRecord> {
        let record = self.element(id)?;
        if record.locked {
            return Err(SyncError::structural(format!(
                "{} {} is locked",
                record.kind(),
                record.name()
            )));
        }
        Ok(record)
    }

    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> Result<()> {
        let record = self.element_mut(id)?;
        if record.locked != locked {
            record.locked = locked;
            self.queue(
                EventTarget::Element(id),
                Property::Locked,
                PropertyValue::Flag(!locked),
                PropertyValue::Flag(locked),
            );
        }
        Ok(())
    }

    pub fn set_name(&mut self, id: ElementId, name: impl Into<Identifier>) -> Result<()> {
        let region = match self.element(id)?.kind() {
            ElementKind::Field => Region::Declarator,
            ElementKind::Initializer => {
                return Err(SyncError::structural("initializers have no name"));
            }
            _ => Region::Header,
        };
        self.update(id, Property::Name, name.into(), region, |r| Some(&mut r.base.name), |v| {
            PropertyValue::Identifier(Some(v.clone()))
        })
    }

    pub fn set_modifiers(&mut self, id: ElementId, modifiers: Modifiers) -> Result<()> {
        let region = match self.element(id)?.kind() {
            ElementKind::Field => Region::FieldPrefix,
            ElementKind::Initializer => {
                return Err(SyncError::structural("use set_static for initializers"));
            }
            _ => Region::Header,
        };
        self.update(id, Property::Modifiers, modifiers, region, |r| Some(&mut r.base.modifiers), |v| {
            PropertyValue::Modifiers(*v)
        })
    }

    /// Sets or removes the doc comment. Plain text is wrapped in `/** */`.
    pub fn set_javadoc(&mut self, id: ElementId, javadoc: Option<String>) -> Result<()> {
        let javadoc = javadoc.as_deref().map(javadoc_text);
        self.update(id, Property::Javadoc, javadoc, Region::Javadoc, |r| Some(&mut r.base.javadoc), |v| {
            PropertyValue::Text(v.clone())
        })
    }

    pub fn set_field_type(&mut self, id: ElementId, type_ref: TypeRef) -> Result<()> {
        self.update(
            id,
            Property::Type,
            type_ref,
            Region::FieldPrefix,
            |r| r.as_field_mut().map(|f| &mut f.type_ref),
            |v| PropertyValue::Type(v.clone()),
        )
    }

    pub fn set_initializer(&mut self, id: ElementId, initializer: Option<String>) -> Result<()> {
        self.update(
            id,
            Property::Initializer,
            initializer,
            Region::Declarator,
            |r| r.as_field_mut().map(|f| &mut f.initializer),
            |v| PropertyValue::Text(v.clone()),
        )
    }

    pub fn set_return_type(&mut self, id: ElementId, return_type: TypeRef) -> Result<()> {
        self.update(
            id,
            Property::ReturnType,
            return_type,
            Region::Header,
            |r| match &mut r.payload {
                Payload::Method(m) => Some(&mut m.return_type),
                _ => None,
            },
            |v| PropertyValue::Type(v.clone()),
        )
    }

    pub fn set_parameters(&mut self, id: ElementId, parameters: Vec<Parameter>) -> Result<()> {
        self.update(
            id,
            Property::Parameters,
            parameters,
            Region::Header,
            |r| match &mut r.payload {
                Payload::Method(m) => Some(&mut m.parameters),
                Payload::Constructor(c) => Some(&mut c.parameters),
                _ => None,
            },
            |v| PropertyValue::Parameters(v.clone()),
        )
    }

    pub fn set_exceptions(&mut self, id: ElementId, exceptions: Vec<Identifier>) -> Result<()> {
        self.update(
            id,
            Property::Exceptions,
            exceptions,
            Region::Header,
            |r| match &mut r.payload {
                Payload::Method(m) => Some(&mut m.exceptions),
                Payload::Constructor(c) => Some(&mut c.exceptions),
                _ => None,
            },
            |v| PropertyValue::Identifiers(v.clone()),
        )
    }

    /// Replaces a body, given with braces and indented relative to the
    /// declaration. Body-less methods cannot be given one.
    pub fn set_body(&mut self, id: ElementId, body: impl Into<String>) -> Result<()> {
        self.update(
            id,
            Property::Body,
            body.into(),
            Region::Body,
            |r| match &mut r.payload {
                Payload::Method(m) => m.body.as_mut(),
                Payload::Constructor(c) => Some(&mut c.body),
                Payload::Initializer(i) => Some(&mut i.body),
                _ => None,
            },
            |v| PropertyValue::Text(Some(v.clone())),
        )
    }

    pub fn set_static(&mut self, id: ElementId, is_static: bool) -> Result<()> {
        self.update(
            id,
            Property::Static,
            is_static,
            Region::Header,
            |r| match &mut r.payload {
                Payload::Initializer(i) => Some(&mut i.is_static),
                _ => None,
            },
            |v| PropertyValue::Flag(*v),
        )
    }

    pub fn set_superclass(&mut self, id: ElementId, superclass: Option<Identifier>) -> Result<()> {
        if self.class(id)?.is_interface && superclass.is_some() {
            return Err(SyncError::structural("interfaces have no superclass"));
        }
        self.update(
            id,
            Property::Superclass,
            superclass,
            Region::Header,
            |r| r.as_class_mut().map(|c| &mut c.superclass),
            |v| PropertyValue::Identifier(v.clone()),
        )
    }

    pub fn change_interfaces(&mut self, id: ElementId, change: InterfacesChange) -> Result<()> {
        let mut interfaces = self.class(id)?.interfaces.clone();
        match change {
            InterfacesChange::Set(names) => interfaces = names,
            InterfacesChange::Add(names) => {
                for name in names {
                    if !interfaces.contains(&name) {
                        interfaces.push(name);
                    }
                }
            }
            InterfacesChange::Remove(names) => interfaces.retain(|i| !names.contains(i)),
        }
        self.update(
            id,
            Property::Interfaces,
            interfaces,
            Region::Header,
            |r| r.as_class_mut().map(|c| &mut c.interfaces),
            |v| PropertyValue::Identifiers(v.clone()),
        )
    }

    fn update<T: PartialEq>(
        &mut self,
        id: ElementId,
        property: Property,
        value: T,
        region: Region,
        access: Access<T>,
        wrap: fn(&T) -> PropertyValue,
    ) -> Result<()> {
        self.writable(id)?;
        let record = self.element_mut(id)?;
        let kind = record.kind();
        let slot = access(record).ok_or_else(|| {
            SyncError::structural(format!("a {} has no {} to set", kind, property))
        })?;
        if *slot == value {
            return Ok(());
        }
        let new = wrap(&value);
        let old = std::mem::replace(slot, value);

        if let Err(err) = self.regenerate(id, region) {
            if let Some(slot) = self.arena.get_mut(id).and_then(access) {
                *slot = old;
            }
            return Err(err);
        }
        debug!("Set {} of {}", property, id);
        self.queue(EventTarget::Element(id), property, wrap(&old), new);
        Ok(())
    }

    /// Rewrites one region of a record's text from its current state.
    fn regenerate(&mut self, id: ElementId, region: Region) -> Result<()> {
        let record = self.element(id)?;
        let bounds = &record.bounds;
        let text = self.document.text();
        let indent = line_indent(&text, bounds.header.begin());

        match region {
            Region::Header => {
                let anchored: Vec<&Bounds> = if bounds.element.begin() == bounds.header.begin() {
                    vec![&bounds.element]
                } else {
                    Vec::new()
                };
                bounds.header.set_text_anchored(&header_text(record), &anchored)
            }
            Region::Declarator => {
                let field = record
                    .as_field()
                    .ok_or_else(|| SyncError::Internal("declarator of a non-field".to_string()))?;
                let declarator = bounds.declarator.as_ref().ok_or_else(|| {
                    SyncError::structural(format!("field {} has no declarator", record.name()))
                })?;
                declarator.set_text(&render::declarator(
                    record.name().as_str(),
                    field.initializer.as_deref(),
                ))
            }
            Region::FieldPrefix => {
                let field = record
                    .as_field()
                    .ok_or_else(|| SyncError::Internal("type of a non-field".to_string()))?;
                if field.is_grouped() {
                    return self.split_from_group(id, &indent);
                }
                let declarator = bounds.declarator.as_ref().ok_or_else(|| {
                    SyncError::structural(format!("field {} has no declarator", record.name()))
                })?;
                Bounds::between_starts(&bounds.header, declarator)
                    .set_text(&render::field_prefix(&record.base, &field.type_ref))
            }
            Region::Javadoc => {
                match (&bounds.javadoc, &record.base.javadoc) {
                    (Some(existing), Some(doc)) => existing.set_text(&indent_block(doc, &indent)),
                    (None, Some(doc)) => {
                        let doc = indent_block(doc, &indent);
                        bounds
                            .element
                            .insert_before(&format!("{}\n{}", doc, indent))?;
                        let begin = bounds.element.begin();
                        let javadoc = Bounds::new(&self.document, TextRange::new(begin, begin + doc.len()));
                        self.element_mut(id)?.bounds.javadoc = Some(javadoc);
                        Ok(())
                    }
                    (Some(existing), None) => {
                        Bounds::between_starts(existing, &bounds.header).set_text("")?;
                        self.element_mut(id)?.bounds.javadoc = None;
                        Ok(())
                    }
                    (None, None) => Ok(()),
                }
            }
            Region::Body => {
                let body_text = match &record.payload {
                    Payload::Method(m) => m.body.clone(),
                    Payload::Constructor(c) => Some(c.body.clone()),
                    Payload::Initializer(i) => Some(i.body.clone()),
                    _ => None,
                };
                match (&bounds.body, body_text) {
                    (Some(body), Some(text)) => body.set_text(&indent_block(&text, &indent)),
                    _ => Err(SyncError::structural(format!(
                        "{} {} has no body",
                        record.kind(),
                        record.name()
                    ))),
                }
            }
        }
    }

    /// Moves a grouped field into a declaration of its own, placed right after
    /// the group's statement.
    fn split_from_group(&mut self, id: ElementId, indent: &str) -> Result<()> {
        let mut decl = self.snapshot(id)?;
        decl.base.javadoc = None;
        let statement = self.element(id)?.bounds.header.clone();

        let (begin, end) = self.grouped_declarator_span(id)?;

        // The new statement goes in first so a refused edit leaves the group
        // intact. It lands after the cut span, which keeps its offsets valid.
        let rendered = render::render(&decl, indent);
        let inserted = statement.insert_after(&format!("\n{}{}", indent, rendered.text))?;
        if let Err(err) = self.document.remove(begin, end - begin) {
            inserted.remove()?;
            return Err(err);
        }
        self.unlink_from_group(id);
        let base = inserted.begin() + 1 + indent.len();
        let document = self.document.clone();
        self.element_mut(id)?.bounds = super::build::bind_layout(&document, &rendered.layout, base);
        debug!("Split field {} out of its group", decl.name());
        Ok(())
    }
}

fn header_text(record: &ElementRecord) -> String {
    match &record.payload {
        Payload::Class(c) => render::class_header(
            &record.base,
            c.is_interface,
            c.type_parameters.as_deref(),
            c.superclass.as_ref(),
            &c.interfaces,
        ),
        Payload::Method(m) => render::method_header(
            &record.base,
            m.type_parameters.as_deref(),
            &m.return_type,
            &m.parameters,
            &m.exceptions,
        ),
        Payload::Constructor(c) => render::constructor_header(
            &record.base,
            c.type_parameters.as_deref(),
            &c.parameters,
            &c.exceptions,
        ),
        Payload::Initializer(i) => render::initializer_header(i.is_static).to_string(),
        Payload::Field(f) => {
            let mut out = render::field_prefix(&record.base, &f.type_ref);
            out.push_str(&render::declarator(record.name().as_str(), f.initializer.as_deref()));
            out.push(';');
            out
        }
    }
}
