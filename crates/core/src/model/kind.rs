//! Per-kind behavior, looked up instead of dispatched through the payload.

use super::change::ChangeKind;
use super::event::Property;
use super::matcher::Comparator;
use srcsync_api::ElementKind;

pub(crate) struct KindCapabilities {
    /// Collection property fired when a collection of this kind changes.
    pub collection_property: Property,
    pub comparators: &'static [Comparator],
    /// Singular label used in user-facing descriptions.
    pub label: &'static str,
}

static CAPABILITIES: [KindCapabilities; 5] = [
    KindCapabilities {
        collection_property: Property::Fields,
        comparators: &[Comparator::Name],
        label: "field",
    },
    KindCapabilities {
        collection_property: Property::Initializers,
        comparators: &[Comparator::StaticFlag],
        label: "initializer",
    },
    KindCapabilities {
        collection_property: Property::Constructors,
        comparators: &[Comparator::Signature],
        label: "constructor",
    },
    KindCapabilities {
        collection_property: Property::Methods,
        comparators: &[
            Comparator::NameAndSignature,
            Comparator::Name,
            Comparator::Signature,
        ],
        label: "method",
    },
    KindCapabilities {
        collection_property: Property::Classes,
        comparators: &[Comparator::Name],
        label: "class",
    },
];

pub(crate) fn capabilities(kind: ElementKind) -> &'static KindCapabilities {
    &CAPABILITIES[kind.position()]
}

/// Human-readable text for a change record, e.g. "method added".
pub(crate) fn describe(kind: ChangeKind, category: ElementKind) -> String {
    let verb = match kind {
        ChangeKind::Add => "added",
        ChangeKind::Remove => "removed",
        ChangeKind::Change => "changed",
    };
    format!("{} {}", capabilities(category).label, verb)
}
