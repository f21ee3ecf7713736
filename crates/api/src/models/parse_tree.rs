//! Parser output consumed by the synchronization engine.
//!
//! All offsets are byte offsets into the exact text that was parsed. A member's
//! `span.begin` includes its javadoc comment when one is attached, while
//! `span.header_begin` points at the first modifier, annotation or keyword.

use super::{ElementKind, Identifier, Modifiers, Parameter, TypeRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub begin: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub begin: usize,
    pub end: usize,
    pub header_begin: usize,
    pub header_end: usize,
    pub javadoc: Option<TextRange>,
    /// Brace-delimited body, including the braces.
    pub body: Option<TextRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseTree {
    pub package: Option<Identifier>,
    pub imports: Vec<RawImport>,
    pub classes: Vec<RawClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImport {
    pub name: Identifier,
    pub is_static: bool,
    /// `import a.b.*;`
    pub on_demand: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClass {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub javadoc: Option<String>,
    pub is_interface: bool,
    pub type_parameters: Option<String>,
    pub superclass: Option<Identifier>,
    /// `implements` list for classes, `extends` list for interfaces.
    pub interfaces: Vec<Identifier>,
    pub fields: Vec<RawField>,
    pub initializers: Vec<RawInitializer>,
    pub constructors: Vec<RawConstructor>,
    pub methods: Vec<RawMethod>,
    pub classes: Vec<RawClass>,
    pub span: SourceSpan,
}

impl RawClass {
    /// Moves the members of one kind out of the class, wrapped for matching.
    pub fn take_members(&mut self, kind: ElementKind) -> Vec<RawMember> {
        match kind {
            ElementKind::Field => std::mem::take(&mut self.fields)
                .into_iter()
                .map(RawMember::Field)
                .collect(),
            ElementKind::Initializer => std::mem::take(&mut self.initializers)
                .into_iter()
                .map(RawMember::Initializer)
                .collect(),
            ElementKind::Constructor => std::mem::take(&mut self.constructors)
                .into_iter()
                .map(RawMember::Constructor)
                .collect(),
            ElementKind::Method => std::mem::take(&mut self.methods)
                .into_iter()
                .map(RawMember::Method)
                .collect(),
            ElementKind::Class => std::mem::take(&mut self.classes)
                .into_iter()
                .map(RawMember::Class)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub javadoc: Option<String>,
    pub type_ref: TypeRef,
    pub initializer: Option<String>,
    /// Name plus optional `= initializer` of this variable.
    pub declarator: TextRange,
    /// Declarations with several variables (`int a, b;`) share a group id,
    /// unique within the enclosing class.
    pub group: Option<u32>,
    /// The whole declaration statement, shared by all members of a group.
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMethod {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub javadoc: Option<String>,
    pub type_parameters: Option<String>,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    /// `None` for abstract and interface methods.
    pub body: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConstructor {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<String>,
    pub javadoc: Option<String>,
    pub type_parameters: Option<String>,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<Identifier>,
    pub body: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInitializer {
    pub is_static: bool,
    pub body: String,
    pub span: SourceSpan,
}

/// One freshly parsed member, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawMember {
    Class(RawClass),
    Field(RawField),
    Method(RawMethod),
    Constructor(RawConstructor),
    Initializer(RawInitializer),
}

impl RawMember {
    pub fn kind(&self) -> ElementKind {
        match self {
            RawMember::Class(_) => ElementKind::Class,
            RawMember::Field(_) => ElementKind::Field,
            RawMember::Method(_) => ElementKind::Method,
            RawMember::Constructor(_) => ElementKind::Constructor,
            RawMember::Initializer(_) => ElementKind::Initializer,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawMember::Class(c) => &c.name,
            RawMember::Field(f) => &f.name,
            RawMember::Method(m) => &m.name,
            RawMember::Constructor(c) => &c.name,
            RawMember::Initializer(_) => "",
        }
    }

    pub fn parameters(&self) -> Option<&[Parameter]> {
        match self {
            RawMember::Method(m) => Some(&m.parameters),
            RawMember::Constructor(c) => Some(&c.parameters),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            RawMember::Initializer(i) => i.is_static,
            RawMember::Class(c) => c.modifiers.contains(Modifiers::STATIC),
            RawMember::Field(f) => f.modifiers.contains(Modifiers::STATIC),
            RawMember::Method(m) => m.modifiers.contains(Modifiers::STATIC),
            RawMember::Constructor(_) => false,
        }
    }

    pub fn span(&self) -> &SourceSpan {
        match self {
            RawMember::Class(c) => &c.span,
            RawMember::Field(f) => &f.span,
            RawMember::Method(m) => &m.span,
            RawMember::Constructor(c) => &c.span,
            RawMember::Initializer(i) => &i.span,
        }
    }
}
