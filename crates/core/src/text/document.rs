use crate::error::{Result, SyncError};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Which way a position moves when text is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Stay before the inserted text.
    Backward,
    /// Move past the inserted text.
    Forward,
}

#[derive(Debug)]
struct Mark {
    offset: AtomicUsize,
    bias: Bias,
}

/// A byte offset in a [`Document`] that follows edits made elsewhere.
///
/// Bindings are never compared with each other; compare their offsets.
#[derive(Clone)]
pub struct PositionBinding {
    mark: Arc<Mark>,
}

impl PositionBinding {
    pub fn offset(&self) -> usize {
        self.mark.offset.load(Ordering::Acquire)
    }

    pub fn bias(&self) -> Bias {
        self.mark.bias
    }

    fn pin(&self, offset: usize) {
        self.mark.offset.store(offset, Ordering::Release);
    }
}

impl fmt::Debug for PositionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}{}", self.offset(), match self.bias() {
            Bias::Backward => "<",
            Bias::Forward => ">",
        })
    }
}

/// Where a pinned position is placed after an edit.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Pin {
    Start,
    End,
}

struct DocumentState {
    text: String,
    revision: u64,
    read_only: bool,
}

struct DocumentInner {
    state: Mutex<DocumentState>,
    marks: Mutex<Vec<Weak<Mark>>>,
    revisions: watch::Sender<u64>,
}

/// Something that can hand out positions in a document: the document itself,
/// or a [`DocumentGuard`] holding its lock.
pub trait PositionSource {
    fn document(&self) -> &Document;

    fn position(&self, offset: usize, bias: Bias) -> PositionBinding;
}

/// Thread-safe in-memory text buffer.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.len())
            .field("revision", &self.revision())
            .finish()
    }
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let (revisions, _) = watch::channel(0);
        Self {
            inner: Arc::new(DocumentInner {
                state: Mutex::new(DocumentState {
                    text: text.into(),
                    revision: 0,
                    read_only: false,
                }),
                marks: Mutex::new(Vec::new()),
                revisions,
            }),
        }
    }

    pub fn text(&self) -> String {
        self.inner.state.lock().text.clone()
    }

    /// Text together with the revision it belongs to.
    pub fn snapshot(&self) -> (String, u64) {
        let state = self.inner.state.lock();
        (state.text.clone(), state.revision)
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.inner.state.lock().revision
    }

    /// Receives the new revision after every successful edit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revisions.subscribe()
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.inner.state.lock().read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.state.lock().read_only
    }

    /// Locks the buffer; edits from other threads wait until the guard drops.
    pub fn lock(&self) -> DocumentGuard<'_> {
        DocumentGuard {
            document: self,
            state: self.inner.state.lock(),
        }
    }

    pub fn slice(&self, begin: usize, end: usize) -> Result<String> {
        let state = self.inner.state.lock();
        check_range(&state.text, begin, end)?;
        Ok(state.text[begin..end].to_string())
    }

    pub fn insert(&self, offset: usize, text: &str) -> Result<()> {
        self.edit(offset, 0, text, &[])
    }

    pub fn remove(&self, offset: usize, len: usize) -> Result<()> {
        self.edit(offset, len, "", &[])
    }

    pub fn replace(&self, offset: usize, len: usize, text: &str) -> Result<()> {
        self.edit(offset, len, text, &[])
    }

    /// Replaces the whole content, e.g. when the file is reloaded.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let len = self.len();
        self.edit(0, len, text, &[])
    }

    /// Applies one edit and then moves every pinned position to the start or
    /// the end of the inserted text.
    pub(crate) fn edit(
        &self,
        offset: usize,
        len: usize,
        text: &str,
        pins: &[(&PositionBinding, Pin)],
    ) -> Result<()> {
        let revision = {
            let mut state = self.inner.state.lock();
            if state.read_only {
                return Err(SyncError::structural("document is read-only"));
            }
            let end = offset
                .checked_add(len)
                .ok_or_else(|| SyncError::structural("edit range overflows"))?;
            check_range(&state.text, offset, end)?;
            state.text.replace_range(offset..end, text);
            state.revision += 1;

            let inserted = text.len();
            let mut marks = self.inner.marks.lock();
            marks.retain(|weak| match weak.upgrade() {
                Some(mark) => {
                    let current = mark.offset.load(Ordering::Acquire);
                    let moved = adjust(current, mark.bias, offset, end, inserted);
                    mark.offset.store(moved, Ordering::Release);
                    true
                }
                None => false,
            });
            for (binding, pin) in pins {
                binding.pin(match pin {
                    Pin::Start => offset,
                    Pin::End => offset + inserted,
                });
            }
            state.revision
        };
        self.inner.revisions.send_replace(revision);
        Ok(())
    }

    fn register(&self, offset: usize, bias: Bias) -> PositionBinding {
        let mark = Arc::new(Mark {
            offset: AtomicUsize::new(offset),
            bias,
        });
        self.inner.marks.lock().push(Arc::downgrade(&mark));
        PositionBinding { mark }
    }
}

impl PositionSource for Document {
    fn document(&self) -> &Document {
        self
    }

    fn position(&self, offset: usize, bias: Bias) -> PositionBinding {
        let state = self.inner.state.lock();
        let offset = clamp_offset(&state.text, offset);
        self.register(offset, bias)
    }
}

/// Exclusive access to a document while a parse result is being bound to it.
pub struct DocumentGuard<'a> {
    document: &'a Document,
    state: MutexGuard<'a, DocumentState>,
}

impl DocumentGuard<'_> {
    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }
}

impl PositionSource for DocumentGuard<'_> {
    fn document(&self) -> &Document {
        self.document
    }

    fn position(&self, offset: usize, bias: Bias) -> PositionBinding {
        let offset = clamp_offset(&self.state.text, offset);
        self.document.register(offset, bias)
    }
}

fn check_range(text: &str, begin: usize, end: usize) -> Result<()> {
    if begin > end || end > text.len() {
        return Err(SyncError::structural(format!(
            "range {}..{} outside document of length {}",
            begin,
            end,
            text.len()
        )));
    }
    if !text.is_char_boundary(begin) || !text.is_char_boundary(end) {
        return Err(SyncError::structural(format!(
            "range {}..{} splits a character",
            begin, end
        )));
    }
    Ok(())
}

fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// New offset of a mark at `pos` after `[begin, end)` is replaced by
/// `inserted` bytes.
fn adjust(pos: usize, bias: Bias, begin: usize, end: usize, inserted: usize) -> usize {
    if pos < begin {
        pos
    } else if pos > end {
        pos + inserted - (end - begin)
    } else if begin == end {
        match bias {
            Bias::Forward => begin + inserted,
            Bias::Backward => begin,
        }
    } else if pos == begin {
        begin
    } else if pos == end {
        begin + inserted
    } else {
        match bias {
            Bias::Forward => begin + inserted,
            Bias::Backward => begin,
        }
    }
}
