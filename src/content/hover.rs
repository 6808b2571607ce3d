//! Tracks censored elements under the pointer and reports edge transitions only.

use crate::types::ElementId;
use std::collections::HashSet;

/// Change of the derived "hovering censored text" flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChange {
    pub current: bool,
    pub previous: bool,
}

/// Set of hovered censored elements.
///
/// An element removed from the page without a mouseleave stays in the set, so
/// the derived flag can remain true until a later leave or a page reload.
#[derive(Debug, Default)]
pub struct HoverTracker {
    hovered: HashSet<ElementId>,
    current: bool,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hovering(&self) -> bool {
        self.current
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.hovered.contains(&element)
    }

    pub fn len(&self) -> usize {
        self.hovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hovered.is_empty()
    }

    pub fn enter(&mut self, element: ElementId) -> Option<HoverChange> {
        self.hovered.insert(element);
        self.recompute()
    }

    pub fn leave(&mut self, element: ElementId) -> Option<HoverChange> {
        self.hovered.remove(&element);
        self.recompute()
    }

    fn recompute(&mut self) -> Option<HoverChange> {
        let previous = self.current;
        self.current = !self.hovered.is_empty();
        (self.current != previous).then_some(HoverChange {
            current: self.current,
            previous,
        })
    }
}
