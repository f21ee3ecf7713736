use super::decl::Declaration;
use super::id::ElementId;
use bitflags::bitflags;
use srcsync_api::ElementKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Remove,
    Change,
}

impl ChangeKind {
    fn offset(self) -> usize {
        match self {
            ChangeKind::Add => 0,
            ChangeKind::Remove => 1,
            ChangeKind::Change => 2,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::Change => "change",
        })
    }
}

bitflags! {
    /// Selects which change records a reparse reports.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ChangeMask: u16 {
        const FIELD_ADD = 1 << 0;
        const FIELD_REMOVE = 1 << 1;
        const FIELD_CHANGE = 1 << 2;
        const INITIALIZER_ADD = 1 << 3;
        const INITIALIZER_REMOVE = 1 << 4;
        const INITIALIZER_CHANGE = 1 << 5;
        const CONSTRUCTOR_ADD = 1 << 6;
        const CONSTRUCTOR_REMOVE = 1 << 7;
        const CONSTRUCTOR_CHANGE = 1 << 8;
        const METHOD_ADD = 1 << 9;
        const METHOD_REMOVE = 1 << 10;
        const METHOD_CHANGE = 1 << 11;
        const CLASS_ADD = 1 << 12;
        const CLASS_REMOVE = 1 << 13;
        const CLASS_CHANGE = 1 << 14;
    }
}

impl ChangeMask {
    /// The single flag for one kind of change in one category.
    pub fn of(kind: ChangeKind, category: ElementKind) -> Self {
        Self::from_bits_truncate(1 << (category.position() * 3 + kind.offset()))
    }

    pub fn allows(&self, kind: ChangeKind, category: ElementKind) -> bool {
        self.contains(Self::of(kind, category))
    }
}

/// One add/remove/change of an element detected by a reparse.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub category: ElementKind,
    /// Declaring class; `None` for top-level classes.
    pub owner: Option<ElementId>,
    pub element: ElementId,
    /// State before the update, present for `Change` records.
    pub previous: Option<Declaration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_flag_layout() {
        assert_eq!(ChangeMask::of(ChangeKind::Add, ElementKind::Field), ChangeMask::FIELD_ADD);
        assert_eq!(
            ChangeMask::of(ChangeKind::Remove, ElementKind::Method),
            ChangeMask::METHOD_REMOVE
        );
        assert_eq!(
            ChangeMask::of(ChangeKind::Change, ElementKind::Class),
            ChangeMask::CLASS_CHANGE
        );
        assert_eq!(ChangeMask::all().bits().count_ones(), 15);
    }

    #[test]
    fn test_allows() {
        let mask = ChangeMask::METHOD_ADD;
        assert!(mask.allows(ChangeKind::Add, ElementKind::Method));
        assert!(!mask.allows(ChangeKind::Remove, ElementKind::Method));
        assert!(!ChangeMask::empty().allows(ChangeKind::Add, ElementKind::Method));
    }
}
