use super::id::ElementId;
use super::{Import, SourceStatus};
use srcsync_api::{Identifier, Modifiers, Parameter, TypeRef};
use std::fmt;

/// Names of observable properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Fields,
    Initializers,
    Constructors,
    Methods,
    Classes,
    Status,
    Name,
    Modifiers,
    Type,
    Parameters,
    Exceptions,
    ReturnType,
    Superclass,
    Interfaces,
    Javadoc,
    Initializer,
    Body,
    Static,
    Package,
    Imports,
    Locked,
    /// The element was removed and its id is dead.
    Valid,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Fields => "fields",
            Property::Initializers => "initializers",
            Property::Constructors => "constructors",
            Property::Methods => "methods",
            Property::Classes => "classes",
            Property::Status => "status",
            Property::Name => "name",
            Property::Modifiers => "modifiers",
            Property::Type => "type",
            Property::Parameters => "parameters",
            Property::Exceptions => "exceptions",
            Property::ReturnType => "returnType",
            Property::Superclass => "superclass",
            Property::Interfaces => "interfaces",
            Property::Javadoc => "javadoc",
            Property::Initializer => "initializer",
            Property::Body => "body",
            Property::Static => "static",
            Property::Package => "package",
            Property::Imports => "imports",
            Property::Locked => "locked",
            Property::Valid => "valid",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    None,
    Elements(Vec<ElementId>),
    Text(Option<String>),
    Identifier(Option<Identifier>),
    Identifiers(Vec<Identifier>),
    Modifiers(Modifiers),
    Type(TypeRef),
    Parameters(Vec<Parameter>),
    Flag(bool),
    Status(SourceStatus),
    Imports(Vec<Import>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The compilation unit itself.
    Unit,
    Element(ElementId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub target: EventTarget,
    pub property: Property,
    pub old: PropertyValue,
    pub new: PropertyValue,
}

/// Receives property changes after the model lock has been released.
pub trait PropertyListener: Send + Sync {
    fn property_changed(&self, change: &PropertyChange);
}

impl<F> PropertyListener for F
where
    F: Fn(&PropertyChange) + Send + Sync,
{
    fn property_changed(&self, change: &PropertyChange) {
        self(change)
    }
}
