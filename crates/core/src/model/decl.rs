//! Detached declarations.
//!
//! A [`Declaration`] is a plain value describing one member: it is what callers
//! hand to [`SourceModel::change_members`](super::SourceModel::change_members)
//! and what change records carry as the pre-update snapshot.

use super::element::ElementBase;
use srcsync_api::{ElementKind, Identifier, Modifiers, Parameter, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub base: ElementBase,
    pub detail: DeclarationDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationDetail {
    Class(ClassDetail),
    Field(FieldDetail),
    Method(MethodDetail),
    Constructor(ConstructorDetail),
    Initializer(InitializerDetail),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassDetail {
    pub is_interface: bool,
    pub type_parameters: Option<String>,
    pub superclass: Option<Identifier>,
    pub interfaces: Vec<Identifier>,
    /// Members in insertion order. Change-record snapshots leave this empty.
    pub members: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDetail {
    pub type_ref: TypeRef,
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodDetail {
    pub type_parameters: Option<String>,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructorDetail {
    pub type_parameters: Option<String>,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitializerDetail {
    pub is_static: bool,
    pub body: String,
}

impl Declaration {
    fn with_detail(name: impl Into<Identifier>, detail: DeclarationDetail) -> Self {
        Self {
            base: ElementBase {
                name: name.into(),
                ..Default::default()
            },
            detail,
        }
    }

    pub fn class(name: impl Into<Identifier>) -> Self {
        Self::with_detail(name, DeclarationDetail::Class(ClassDetail::default()))
    }

    pub fn interface(name: impl Into<Identifier>) -> Self {
        Self::with_detail(
            name,
            DeclarationDetail::Class(ClassDetail {
                is_interface: true,
                ..Default::default()
            }),
        )
    }

    pub fn field(name: impl Into<Identifier>, type_ref: TypeRef) -> Self {
        Self::with_detail(
            name,
            DeclarationDetail::Field(FieldDetail {
                type_ref,
                initializer: None,
            }),
        )
    }

    /// A method with an empty body.
    pub fn method(name: impl Into<Identifier>, return_type: TypeRef, parameters: Vec<Parameter>) -> Self {
        Self::with_detail(
            name,
            DeclarationDetail::Method(MethodDetail {
                return_type,
                parameters,
                body: Some("{\n}".to_string()),
                ..Default::default()
            }),
        )
    }

    /// A body-less method, as declared by interfaces.
    pub fn abstract_method(
        name: impl Into<Identifier>,
        return_type: TypeRef,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self::with_detail(
            name,
            DeclarationDetail::Method(MethodDetail {
                return_type,
                parameters,
                ..Default::default()
            }),
        )
    }

    pub fn constructor(name: impl Into<Identifier>, parameters: Vec<Parameter>) -> Self {
        Self::with_detail(
            name,
            DeclarationDetail::Constructor(ConstructorDetail {
                parameters,
                body: "{\n}".to_string(),
                ..Default::default()
            }),
        )
    }

    pub fn initializer(is_static: bool) -> Self {
        Self::with_detail(
            "",
            DeclarationDetail::Initializer(InitializerDetail {
                is_static,
                body: "{\n}".to_string(),
            }),
        )
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.base.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.base.annotations.push(annotation.into());
        self
    }

    pub fn with_javadoc(mut self, javadoc: impl Into<String>) -> Self {
        self.base.javadoc = Some(javadoc.into());
        self
    }

    /// Sets the body of a method, constructor or initializer. Ignored for
    /// other kinds.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        match &mut self.detail {
            DeclarationDetail::Method(m) => m.body = Some(body),
            DeclarationDetail::Constructor(c) => c.body = body,
            DeclarationDetail::Initializer(i) => i.body = body,
            _ => {}
        }
        self
    }

    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        if let DeclarationDetail::Field(f) = &mut self.detail {
            f.initializer = Some(initializer.into());
        }
        self
    }

    pub fn with_exceptions(mut self, exceptions: Vec<Identifier>) -> Self {
        match &mut self.detail {
            DeclarationDetail::Method(m) => m.exceptions = exceptions,
            DeclarationDetail::Constructor(c) => c.exceptions = exceptions,
            _ => {}
        }
        self
    }

    pub fn with_superclass(mut self, superclass: impl Into<Identifier>) -> Self {
        if let DeclarationDetail::Class(c) = &mut self.detail {
            c.superclass = Some(superclass.into());
        }
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<Identifier>) -> Self {
        if let DeclarationDetail::Class(c) = &mut self.detail {
            c.interfaces = interfaces;
        }
        self
    }

    pub fn with_member(mut self, member: Declaration) -> Self {
        if let DeclarationDetail::Class(c) = &mut self.detail {
            c.members.push(member);
        }
        self
    }

    pub fn kind(&self) -> ElementKind {
        match self.detail {
            DeclarationDetail::Class(_) => ElementKind::Class,
            DeclarationDetail::Field(_) => ElementKind::Field,
            DeclarationDetail::Method(_) => ElementKind::Method,
            DeclarationDetail::Constructor(_) => ElementKind::Constructor,
            DeclarationDetail::Initializer(_) => ElementKind::Initializer,
        }
    }

    pub fn name(&self) -> &Identifier {
        &self.base.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.detail {
            DeclarationDetail::Method(m) => &m.parameters,
            DeclarationDetail::Constructor(c) => &c.parameters,
            _ => &[],
        }
    }

    pub fn is_static(&self) -> bool {
        match &self.detail {
            DeclarationDetail::Initializer(i) => i.is_static,
            _ => self.base.modifiers.contains(Modifiers::STATIC),
        }
    }

    pub fn as_class(&self) -> Option<&ClassDetail> {
        match &self.detail {
            DeclarationDetail::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDetail> {
        match &self.detail {
            DeclarationDetail::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDetail> {
        match &self.detail {
            DeclarationDetail::Field(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_kind_specific_detail() {
        let method = Declaration::method("run", TypeRef::void(), vec![])
            .with_modifiers(Modifiers::PUBLIC)
            .with_body("{\n    go();\n}")
            .with_exceptions(vec![Identifier::new("IOException")]);
        assert_eq!(method.kind(), ElementKind::Method);
        let detail = method.as_method().unwrap();
        assert_eq!(detail.body.as_deref(), Some("{\n    go();\n}"));
        assert_eq!(detail.exceptions.len(), 1);

        let field = Declaration::field("x", TypeRef::raw("int")).with_initializer("1");
        assert_eq!(field.as_field().unwrap().initializer.as_deref(), Some("1"));
        assert!(field.with_body("{}").as_method().is_none());
    }

    #[test]
    fn test_static_flag() {
        assert!(Declaration::initializer(true).is_static());
        assert!(!Declaration::initializer(false).is_static());
        let field = Declaration::field("x", TypeRef::raw("int")).with_modifiers(Modifiers::STATIC);
        assert!(field.is_static());
    }
}
