use serde::{Deserialize, Serialize};
use std::fmt;

/// A possibly qualified Java name, e.g. `List` or `java.util.List`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment of the name, ignoring any type arguments.
    pub fn simple_name(&self) -> &str {
        let base = self.0.split('<').next().unwrap_or(&self.0);
        base.rsplit('.').next().unwrap_or(base).trim()
    }

    pub fn is_qualified(&self) -> bool {
        self.0.split('<').next().is_some_and(|base| base.contains('.'))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier(value)
    }
}
