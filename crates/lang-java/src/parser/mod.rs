use srcsync_api::{ApiError, ApiResult, ParseOutcome, SourceParser};
use tracing::debug;
use tree_sitter::{Node, Parser};

mod decl;
mod types;

/// Tree-sitter based [`SourceParser`] for Java.
#[derive(Clone)]
pub struct JavaParser {
    pub language: tree_sitter::Language,
}

impl JavaParser {
    pub fn new() -> ApiResult<Self> {
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
        // Fail at construction rather than on every parse.
        Parser::new()
            .set_language(&language)
            .map_err(|e| ApiError::Parser(e.to_string()))?;
        Ok(Self { language })
    }
}

impl SourceParser for JavaParser {
    fn language(&self) -> &str {
        "java"
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        let mut parser = Parser::new();
        if parser.set_language(&self.language).is_err() {
            return ParseOutcome::failed(0);
        }
        let Some(ts_tree) = parser.parse(text, None) else {
            return ParseOutcome::failed(0);
        };

        let root = ts_tree.root_node();
        let errors = count_errors(root);
        let tree = self.build_tree(root, text);
        debug!(
            "Parsed {} bytes: {} classes, {} syntax errors",
            text.len(),
            tree.classes.len(),
            errors
        );

        if errors == 0 {
            ParseOutcome::complete(tree)
        } else if tree.classes.is_empty() && tree.package.is_none() && tree.imports.is_empty() {
            ParseOutcome::failed(errors)
        } else {
            ParseOutcome::partial(tree, errors)
        }
    }
}

pub(crate) fn text_of<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

fn count_errors(node: Node) -> usize {
    if !node.has_error() {
        return 0;
    }
    let mut count = usize::from(node.is_error() || node.is_missing());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_errors(child);
    }
    count
}
