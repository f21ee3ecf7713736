use crate::model::{Declaration, ElementId};
use std::fmt;

/// One edit proposed by interface synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAction {
    pub description: String,
    /// Name of the open source holding the class.
    pub file: String,
    /// Qualified name of the class to edit.
    pub class: String,
    /// Qualified name of the interface the method comes from.
    pub interface: String,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Add a new implementing method.
    Add(Declaration),
    /// Bring an existing method's signature in line with the interface.
    Update {
        method: ElementId,
        declaration: Declaration,
    },
}

impl ChangeAction {
    pub fn declaration(&self) -> &Declaration {
        match &self.kind {
            ActionKind::Add(decl) => decl,
            ActionKind::Update { declaration, .. } => declaration,
        }
    }

    /// `name(type, type)` of the resulting method.
    pub fn signature(&self) -> String {
        method_signature(self.declaration())
    }

    pub fn is_add(&self) -> bool {
        matches!(self.kind, ActionKind::Add(_))
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

pub(crate) fn method_signature(decl: &Declaration) -> String {
    let types: Vec<String> = decl
        .parameters()
        .iter()
        .map(|p| p.type_ref.signature_text())
        .collect();
    format!("{}({})", decl.name(), types.join(","))
}
