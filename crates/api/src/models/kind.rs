use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of declarations tracked by the source model. Also used as the
/// category of member collections and change records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Field,
    Initializer,
    Constructor,
    Method,
    Class,
}

impl ElementKind {
    /// Member kinds in declaration order inside a class body.
    pub const MEMBER_ORDER: [ElementKind; 5] = [
        ElementKind::Field,
        ElementKind::Initializer,
        ElementKind::Constructor,
        ElementKind::Method,
        ElementKind::Class,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Field => "field",
            ElementKind::Initializer => "initializer",
            ElementKind::Constructor => "constructor",
            ElementKind::Method => "method",
            ElementKind::Class => "class",
        }
    }

    pub fn position(&self) -> usize {
        match self {
            ElementKind::Field => 0,
            ElementKind::Initializer => 1,
            ElementKind::Constructor => 2,
            ElementKind::Method => 3,
            ElementKind::Class => 4,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
