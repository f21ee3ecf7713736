use super::element::ElementRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an element record.
///
/// Ids survive reparses as long as the record keeps being matched. Once the
/// record is removed the id is dead for good: its slot may be reused, but with
/// a new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    #[cfg(test)]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    record: Option<ElementRecord>,
}

/// Generational storage owning every live record of one compilation unit.
#[derive(Default)]
pub(crate) struct ElementArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ElementArena {
    pub fn insert_with(&mut self, build: impl FnOnce(ElementId) -> ElementRecord) -> ElementId {
        let id = match self.free.pop() {
            Some(index) => ElementId {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    record: None,
                });
                ElementId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.slots[id.index as usize].record = Some(build(id));
        self.live += 1;
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementRecord> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementRecord> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_mut())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: ElementId) -> Option<ElementRecord> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.live
    }
}
