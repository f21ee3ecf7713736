use super::document::{Bias, Document, Pin, PositionBinding, PositionSource};
use crate::error::Result;
use srcsync_api::TextRange;
use std::fmt;

/// A begin/end pair of positions in a live document.
///
/// The begin position leans forward and the end position leans backward, so
/// text inserted exactly at either edge lands outside the range.
#[derive(Clone)]
pub struct Bounds {
    document: Document,
    begin: PositionBinding,
    end: PositionBinding,
}

impl fmt::Debug for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounds({}..{})", self.begin(), self.end())
    }
}

impl Bounds {
    pub fn new(source: &dyn PositionSource, range: TextRange) -> Self {
        Self {
            document: source.document().clone(),
            begin: source.position(range.begin, Bias::Forward),
            end: source.position(range.end.max(range.begin), Bias::Backward),
        }
    }

    /// Bounds spanning from the start of `from` to the start of `to`,
    /// sharing their positions.
    pub fn between_starts(from: &Bounds, to: &Bounds) -> Self {
        Self {
            document: from.document.clone(),
            begin: from.begin.clone(),
            end: to.begin.clone(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn begin(&self) -> usize {
        self.begin.offset()
    }

    pub fn end(&self) -> usize {
        self.end.offset().max(self.begin())
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.begin(), self.end())
    }

    pub fn is_empty(&self) -> bool {
        self.begin() == self.end()
    }

    pub fn text(&self) -> Result<String> {
        self.document.slice(self.begin(), self.end())
    }

    /// Replaces the covered text; afterwards the bounds cover exactly `text`.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let begin = self.begin();
        self.document.edit(
            begin,
            self.end() - begin,
            text,
            &[(&self.begin, Pin::Start), (&self.end, Pin::End)],
        )
    }

    /// Like [`set_text`](Self::set_text), also keeping the start of every
    /// bounds in `anchored` at the start of the new text.
    pub(crate) fn set_text_anchored(&self, text: &str, anchored: &[&Bounds]) -> Result<()> {
        let begin = self.begin();
        let mut pins = vec![(&self.begin, Pin::Start), (&self.end, Pin::End)];
        pins.extend(anchored.iter().map(|b| (&b.begin, Pin::Start)));
        self.document.edit(begin, self.end() - begin, text, &pins)
    }

    /// Inserts `text` right after the range and returns bounds covering it.
    pub fn insert_after(&self, text: &str) -> Result<Bounds> {
        let at = self.end();
        self.document.insert(at, text)?;
        Ok(Bounds::new(
            &self.document,
            TextRange::new(at, at + text.len()),
        ))
    }

    /// Inserts `text` right before the range, keeping the range start in
    /// front of it so the bounds grow to include the new text.
    pub fn insert_before(&self, text: &str) -> Result<()> {
        let at = self.begin();
        self.document.edit(at, 0, text, &[(&self.begin, Pin::Start)])
    }

    pub fn remove(&self) -> Result<()> {
        let begin = self.begin();
        self.document.remove(begin, self.end() - begin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_rebinds_to_new_text() {
        let doc = Document::new("int x = 1;");
        let init = Bounds::new(&doc, TextRange::new(8, 9));
        init.set_text("42").unwrap();
        assert_eq!(doc.text(), "int x = 42;");
        assert_eq!(init.text().unwrap(), "42");

        let empty = Bounds::new(&doc, TextRange::new(0, 0));
        empty.set_text("final ").unwrap();
        assert_eq!(empty.text().unwrap(), "final ");
        assert_eq!(init.text().unwrap(), "42");
    }

    #[test]
    fn test_anchored_edit_keeps_outer_start() {
        let doc = Document::new("{ }");
        let element = Bounds::new(&doc, TextRange::new(0, 3));
        let header = Bounds::new(&doc, TextRange::new(0, 0));
        let body = Bounds::new(&doc, TextRange::new(0, 3));
        header.set_text_anchored("static ", &[&element]).unwrap();
        assert_eq!(doc.text(), "static { }");
        assert_eq!(element.text().unwrap(), "static { }");
        assert_eq!(header.text().unwrap(), "static ");
        assert_eq!(body.text().unwrap(), "{ }");
    }

    #[test]
    fn test_insert_after_does_not_grow_range() {
        let doc = Document::new("a;");
        let stmt = Bounds::new(&doc, TextRange::new(0, 2));
        let added = stmt.insert_after(" b;").unwrap();
        assert_eq!(stmt.text().unwrap(), "a;");
        assert_eq!(added.text().unwrap(), " b;");
        assert_eq!(doc.text(), "a; b;");
    }

    #[test]
    fn test_insert_before_grows_range() {
        let doc = Document::new("x void m();");
        let element = Bounds::new(&doc, TextRange::new(2, 11));
        let header = Bounds::new(&doc, TextRange::new(2, 10));
        element.insert_before("/** d */ ").unwrap();
        assert_eq!(element.text().unwrap(), "/** d */ void m();");
        assert_eq!(header.text().unwrap(), "void m()");
    }
}
