use super::collection::MemberCollection;
use super::id::ElementId;
use crate::text::Bounds;
use srcsync_api::{ElementKind, Identifier, Modifiers, Parameter, TypeRef};

/// Attributes shared by every declaration, live or detached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementBase {
    pub name: Identifier,
    pub modifiers: Modifiers,
    /// Annotation source text, e.g. `@Override`, in declaration order.
    pub annotations: Vec<String>,
    /// Full comment text including `/**` and `*/`.
    pub javadoc: Option<String>,
}

/// Positions of the pieces of a declaration in the live document.
///
/// `element` spans the whole declaration including its javadoc. For fields
/// `header` is the whole declaration statement, shared by a field group.
#[derive(Debug, Clone)]
pub struct SourceBounds {
    pub element: Bounds,
    pub header: Bounds,
    pub javadoc: Option<Bounds>,
    pub body: Option<Bounds>,
    pub declarator: Option<Bounds>,
}

#[derive(Debug)]
pub struct ClassPayload {
    pub is_interface: bool,
    pub type_parameters: Option<String>,
    pub superclass: Option<Identifier>,
    pub interfaces: Vec<Identifier>,
    pub(crate) fields: MemberCollection,
    pub(crate) initializers: MemberCollection,
    pub(crate) constructors: MemberCollection,
    pub(crate) methods: MemberCollection,
    pub(crate) classes: MemberCollection,
}

impl ClassPayload {
    pub(crate) fn new(
        is_interface: bool,
        type_parameters: Option<String>,
        superclass: Option<Identifier>,
        interfaces: Vec<Identifier>,
    ) -> Self {
        Self {
            is_interface,
            type_parameters,
            superclass,
            interfaces,
            fields: MemberCollection::new(ElementKind::Field),
            initializers: MemberCollection::new(ElementKind::Initializer),
            constructors: MemberCollection::new(ElementKind::Constructor),
            methods: MemberCollection::new(ElementKind::Method),
            classes: MemberCollection::new(ElementKind::Class),
        }
    }

    pub fn members(&self, kind: ElementKind) -> &MemberCollection {
        match kind {
            ElementKind::Field => &self.fields,
            ElementKind::Initializer => &self.initializers,
            ElementKind::Constructor => &self.constructors,
            ElementKind::Method => &self.methods,
            ElementKind::Class => &self.classes,
        }
    }

    pub(crate) fn members_mut(&mut self, kind: ElementKind) -> &mut MemberCollection {
        match kind {
            ElementKind::Field => &mut self.fields,
            ElementKind::Initializer => &mut self.initializers,
            ElementKind::Constructor => &mut self.constructors,
            ElementKind::Method => &mut self.methods,
            ElementKind::Class => &mut self.classes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldPayload {
    pub type_ref: TypeRef,
    pub initializer: Option<String>,
    pub previous_in_group: Option<ElementId>,
    pub next_in_group: Option<ElementId>,
}

impl FieldPayload {
    pub fn is_grouped(&self) -> bool {
        self.previous_in_group.is_some() || self.next_in_group.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MethodPayload {
    pub type_parameters: Option<String>,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    /// Body text including braces, indented relative to the declaration.
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConstructorPayload {
    pub type_parameters: Option<String>,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct InitializerPayload {
    pub is_static: bool,
    pub body: String,
}

#[derive(Debug)]
pub enum Payload {
    Class(ClassPayload),
    Field(FieldPayload),
    Method(MethodPayload),
    Constructor(ConstructorPayload),
    Initializer(InitializerPayload),
}

/// A live declaration owned by a [`SourceModel`](super::SourceModel).
#[derive(Debug)]
pub struct ElementRecord {
    pub(crate) id: ElementId,
    pub(crate) parent: Option<ElementId>,
    pub(crate) base: ElementBase,
    pub(crate) locked: bool,
    pub(crate) bounds: SourceBounds,
    pub(crate) payload: Payload,
}

impl ElementRecord {
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Declaring class, `None` for top-level classes.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn kind(&self) -> ElementKind {
        match self.payload {
            Payload::Class(_) => ElementKind::Class,
            Payload::Field(_) => ElementKind::Field,
            Payload::Method(_) => ElementKind::Method,
            Payload::Constructor(_) => ElementKind::Constructor,
            Payload::Initializer(_) => ElementKind::Initializer,
        }
    }

    pub fn name(&self) -> &Identifier {
        &self.base.name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.base.modifiers
    }

    pub fn annotations(&self) -> &[String] {
        &self.base.annotations
    }

    pub fn javadoc(&self) -> Option<&str> {
        self.base.javadoc.as_deref()
    }

    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn bounds(&self) -> &SourceBounds {
        &self.bounds
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn as_class(&self) -> Option<&ClassPayload> {
        match &self.payload {
            Payload::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldPayload> {
        match &self.payload {
            Payload::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodPayload> {
        match &self.payload {
            Payload::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&ConstructorPayload> {
        match &self.payload {
            Payload::Constructor(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_initializer(&self) -> Option<&InitializerPayload> {
        match &self.payload {
            Payload::Initializer(i) => Some(i),
            _ => None,
        }
    }

    pub(crate) fn as_class_mut(&mut self) -> Option<&mut ClassPayload> {
        match &mut self.payload {
            Payload::Class(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_field_mut(&mut self) -> Option<&mut FieldPayload> {
        match &mut self.payload {
            Payload::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Parameters of methods and constructors; empty for other kinds.
    pub fn parameters(&self) -> &[Parameter] {
        match &self.payload {
            Payload::Method(m) => &m.parameters,
            Payload::Constructor(c) => &c.parameters,
            _ => &[],
        }
    }

    pub fn exceptions(&self) -> &[Identifier] {
        match &self.payload {
            Payload::Method(m) => &m.exceptions,
            Payload::Constructor(c) => &c.exceptions,
            _ => &[],
        }
    }

    pub fn is_static(&self) -> bool {
        match &self.payload {
            Payload::Initializer(i) => i.is_static,
            _ => self.base.modifiers.contains(Modifiers::STATIC),
        }
    }

    /// Text currently covered by the whole declaration.
    pub fn source_text(&self) -> crate::Result<String> {
        self.bounds.element.text()
    }
}
