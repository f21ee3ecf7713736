//! Pairing of freshly parsed members with the live records they replace.
//!
//! Each comparator runs three passes: a forward lockstep scan, a backward
//! lockstep scan, then an exhaustive scan over whatever is still unpaired.
//! Later comparators only see the leftovers of earlier ones, so a strict
//! comparator wins over a looser fallback.

use super::decl::Declaration;
use super::element::ElementRecord;
use crate::error::{Result, SyncError};
use srcsync_api::{ElementKind, Parameter, RawMember};
use std::cmp::Ordering;
use tracing::debug;

/// The view of a member the matcher needs.
pub trait Matchable {
    fn match_kind(&self) -> ElementKind;
    fn match_name(&self) -> &str;
    fn match_parameters(&self) -> &[Parameter];
    fn match_static(&self) -> bool;
}

impl<T: Matchable + ?Sized> Matchable for &T {
    fn match_kind(&self) -> ElementKind {
        (**self).match_kind()
    }

    fn match_name(&self) -> &str {
        (**self).match_name()
    }

    fn match_parameters(&self) -> &[Parameter] {
        (**self).match_parameters()
    }

    fn match_static(&self) -> bool {
        (**self).match_static()
    }
}

impl Matchable for RawMember {
    fn match_kind(&self) -> ElementKind {
        self.kind()
    }

    fn match_name(&self) -> &str {
        self.name()
    }

    fn match_parameters(&self) -> &[Parameter] {
        self.parameters().unwrap_or(&[])
    }

    fn match_static(&self) -> bool {
        self.is_static()
    }
}

impl Matchable for ElementRecord {
    fn match_kind(&self) -> ElementKind {
        self.kind()
    }

    fn match_name(&self) -> &str {
        self.name().as_str()
    }

    fn match_parameters(&self) -> &[Parameter] {
        self.parameters()
    }

    fn match_static(&self) -> bool {
        self.is_static()
    }
}

impl Matchable for Declaration {
    fn match_kind(&self) -> ElementKind {
        self.kind()
    }

    fn match_name(&self) -> &str {
        self.name().as_str()
    }

    fn match_parameters(&self) -> &[Parameter] {
        self.parameters()
    }

    fn match_static(&self) -> bool {
        self.is_static()
    }
}

/// A total order over members; `Equal` means "the same member".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    NameAndSignature,
    Name,
    Signature,
    StaticFlag,
}

impl Comparator {
    pub fn compare(&self, new: &dyn Matchable, old: &dyn Matchable) -> Ordering {
        match self {
            Comparator::Name => new.match_name().cmp(old.match_name()),
            Comparator::Signature => {
                compare_signatures(new.match_parameters(), old.match_parameters())
            }
            Comparator::NameAndSignature => Comparator::Name
                .compare(new, old)
                .then_with(|| Comparator::Signature.compare(new, old)),
            Comparator::StaticFlag => new.match_static().cmp(&old.match_static()),
        }
    }
}

fn compare_signatures(left: &[Parameter], right: &[Parameter]) -> Ordering {
    left.iter()
        .map(|p| p.type_ref.signature_text())
        .cmp(right.iter().map(|p| p.type_ref.signature_text()))
}

pub struct StructuralMatcher {
    kind: ElementKind,
    comparators: &'static [Comparator],
}

impl StructuralMatcher {
    /// The matcher registered for `kind` in the capability table.
    pub fn for_kind(kind: ElementKind) -> Self {
        Self {
            kind,
            comparators: super::kind::capabilities(kind).comparators,
        }
    }

    pub fn with_comparators(kind: ElementKind, comparators: &'static [Comparator]) -> Self {
        Self { kind, comparators }
    }

    /// For each new member, the index of the old member it continues, if any.
    ///
    /// Fails with `MatchContract` when a member of another kind is passed in.
    pub fn pair<O: Matchable, N: Matchable>(&self, old: &[O], new: &[N]) -> Result<Vec<Option<usize>>> {
        if let Some(stray) = new
            .iter()
            .map(|n| n.match_kind())
            .chain(old.iter().map(|o| o.match_kind()))
            .find(|k| *k != self.kind)
        {
            return Err(SyncError::MatchContract(format!(
                "expected {} members, got a {}",
                self.kind, stray
            )));
        }

        let mut result = vec![None; new.len()];
        if new.is_empty() || old.is_empty() {
            return Ok(result);
        }

        let mut used = vec![false; old.len()];
        let mut unmatched = new.len();

        for comparator in self.comparators {
            let mut try_pair = |i: usize, j: usize, result: &mut Vec<Option<usize>>, used: &mut Vec<bool>| {
                if result[i].is_none()
                    && !used[j]
                    && comparator.compare(&new[i], &old[j]) == Ordering::Equal
                {
                    result[i] = Some(j);
                    used[j] = true;
                    unmatched -= 1;
                }
            };

            for (i, j) in (0..new.len()).zip(0..old.len()) {
                try_pair(i, j, &mut result, &mut used);
            }
            for (i, j) in (0..new.len()).rev().zip((0..old.len()).rev()) {
                try_pair(i, j, &mut result, &mut used);
            }
            for i in 0..new.len() {
                for j in 0..old.len() {
                    if result[i].is_some() {
                        break;
                    }
                    try_pair(i, j, &mut result, &mut used);
                }
            }

            debug!(
                "Matcher {:?} on {} {}: {} of {} still unpaired",
                comparator,
                new.len(),
                self.kind,
                unmatched,
                new.len()
            );
            if unmatched == 0 {
                break;
            }
        }

        Ok(result)
    }
}
