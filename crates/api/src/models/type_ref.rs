use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Default)]
#[serde(tag = "kind", content = "data")]
pub enum TypeRef {
    /// Primitive or not yet structured type name (e.g., "int", "void", "java.util.List")
    Raw(String),

    /// Generic instantiation (e.g., List<String>)
    Generic {
        base: Box<TypeRef>,
        args: Vec<TypeRef>,
    },

    /// Array type (e.g., String[])
    Array {
        element: Box<TypeRef>,
        dimensions: usize,
    },

    /// Wildcard type (e.g., ? extends Number)
    Wildcard {
        bound: Option<Box<TypeRef>>,
        is_upper_bound: bool, // true: extends, false: super
    },

    #[default]
    Unknown,
}

const PRIMITIVES: [&str; 8] = [
    "boolean", "byte", "short", "int", "long", "char", "float", "double",
];

impl TypeRef {
    /// Helper to create a Raw type
    pub fn raw(s: impl Into<String>) -> Self {
        TypeRef::Raw(s.into())
    }

    pub fn void() -> Self {
        TypeRef::Raw("void".to_string())
    }

    pub fn array_of(element: TypeRef, dimensions: usize) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            dimensions,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Raw(name) if name == "void")
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Raw(name) if PRIMITIVES.contains(&name.as_str()))
    }

    /// Source text of the type as it would be written in a declaration.
    pub fn to_source(&self) -> String {
        self.to_string()
    }

    /// Whitespace-insensitive form used when comparing signatures.
    pub fn signature_text(&self) -> String {
        self.to_string()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Signature equality: two types match when their source forms agree
    /// modulo whitespace, regardless of how structured each side is.
    pub fn same_as(&self, other: &TypeRef) -> bool {
        self.signature_text() == other.signature_text()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Raw(name) => f.write_str(name),
            TypeRef::Generic { base, args } => {
                write!(f, "{}<", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            TypeRef::Array {
                element,
                dimensions,
            } => {
                write!(f, "{}", element)?;
                for _ in 0..*dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            TypeRef::Wildcard {
                bound,
                is_upper_bound,
            } => match bound {
                Some(bound) if *is_upper_bound => write!(f, "? extends {}", bound),
                Some(bound) => write!(f, "? super {}", bound),
                None => f.write_str("?"),
            },
            TypeRef::Unknown => f.write_str("Object"),
        }
    }
}

/// A formal parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: TypeRef,
    pub is_final: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_final: false,
        }
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        if self.is_final {
            out.push_str("final ");
        }
        out.push_str(&self.type_ref.to_source());
        if !self.name.is_empty() {
            out.push(' ');
            out.push_str(&self.name);
        }
        out
    }
}

/// True when both parameter lists have the same types in the same order.
/// Names and `final` flags are ignored.
pub fn same_parameter_types(left: &[Parameter], right: &[Parameter]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| l.type_ref.same_as(&r.type_ref))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        let list = TypeRef::Generic {
            base: Box::new(TypeRef::raw("Map")),
            args: vec![TypeRef::raw("String"), TypeRef::array_of(TypeRef::raw("int"), 2)],
        };
        assert_eq!(list.to_source(), "Map<String, int[][]>");
        assert!(list.same_as(&TypeRef::raw("Map<String,int[][]>")));
        assert!(TypeRef::raw("long").is_primitive());
        assert!(!TypeRef::raw("Long").is_primitive());
        assert!(TypeRef::void().is_void());
    }

    #[test]
    fn test_parameter_types_ignore_names() {
        let a = vec![Parameter::new("x", TypeRef::raw("int"))];
        let mut b = vec![Parameter::new("", TypeRef::raw("int"))];
        b[0].is_final = true;
        assert!(same_parameter_types(&a, &b));
        assert!(!same_parameter_types(&a, &[]));
    }
}
