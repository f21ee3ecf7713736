use crate::models::ParseTree;
use serde::{Deserialize, Serialize};

/// Result of running an external parser over a complete document text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// `None` when the parser could not produce anything usable.
    pub tree: Option<ParseTree>,
    /// Number of syntax errors seen. A tree with errors is a best-effort partial result.
    pub error_count: usize,
}

impl ParseOutcome {
    pub fn complete(tree: ParseTree) -> Self {
        Self {
            tree: Some(tree),
            error_count: 0,
        }
    }

    pub fn partial(tree: ParseTree, error_count: usize) -> Self {
        Self {
            tree: Some(tree),
            error_count,
        }
    }

    pub fn failed(error_count: usize) -> Self {
        Self {
            tree: None,
            error_count,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.tree.is_some() && self.error_count > 0
    }
}

/// The language parser seam. Implementations turn document text into a
/// [`ParseTree`] whose offsets are byte offsets into exactly that text.
pub trait SourceParser: Send + Sync {
    fn language(&self) -> &str;

    fn parse(&self, text: &str) -> ParseOutcome;
}
