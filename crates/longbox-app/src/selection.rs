// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::ids::VolumeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSummary {
    NoneSelected,
    SomeSelected,
    AllSelected,
}

/// Id-keyed selection with an explicit last-toggled anchor, so shift
/// ranges are computed from state rather than from sibling widgets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    selected: BTreeMap<VolumeId, bool>,
    last_toggled: Option<VolumeId>,
}

impl SelectionState {
    pub fn is_selected(&self, id: VolumeId) -> bool {
        self.selected.get(&id).copied().unwrap_or(false)
    }

    pub fn selected_ids(&self) -> Vec<VolumeId> {
        self.selected
            .iter()
            .filter_map(|(id, selected)| selected.then_some(*id))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.values().filter(|selected| **selected).count()
    }

    pub fn last_toggled(&self) -> Option<VolumeId> {
        self.last_toggled
    }

    /// Toggle one id, or with `shift` a contiguous range between the
    /// last-toggled anchor and `id` in the order given. The range is
    /// inclusive of both endpoints, so anchor->id and id->anchor mark the
    /// identical set. A vanished anchor degrades to a plain toggle.
    pub fn toggle(&mut self, order: &[VolumeId], id: VolumeId, selected: bool, shift: bool) {
        if shift
            && let Some(anchor) = self.last_toggled
            && let (Some(from), Some(to)) = (
                order.iter().position(|candidate| *candidate == anchor),
                order.iter().position(|candidate| *candidate == id),
            )
        {
            let (low, high) = if from <= to { (from, to) } else { (to, from) };
            for member in &order[low..=high] {
                self.selected.insert(*member, selected);
            }
            self.last_toggled = Some(id);
            return;
        }

        self.selected.insert(id, selected);
        self.last_toggled = Some(id);
    }

    /// Uniformly select every visible id. Items outside the visible set
    /// keep whatever state they had.
    pub fn select_all(&mut self, visible: &[VolumeId]) {
        for id in visible {
            self.selected.insert(*id, true);
        }
    }

    pub fn unselect_all(&mut self, visible: &[VolumeId]) {
        for id in visible {
            self.selected.insert(*id, false);
        }
    }

    /// Drop entries whose id no longer exists in the collection. Keeps
    /// the invariant that the mapping only holds known identifiers.
    pub fn retain_known(&mut self, known: &[VolumeId]) {
        self.selected.retain(|id, _| known.contains(id));
        if let Some(anchor) = self.last_toggled
            && !known.contains(&anchor)
        {
            self.last_toggled = None;
        }
    }

    pub fn reset(&mut self) {
        self.selected.clear();
        self.last_toggled = None;
    }

    pub fn all_selected(&self, visible: &[VolumeId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.is_selected(*id))
    }

    pub fn all_unselected(&self, visible: &[VolumeId]) -> bool {
        visible.iter().all(|id| !self.is_selected(*id))
    }

    pub fn summary(&self, visible: &[VolumeId]) -> SelectionSummary {
        if self.all_selected(visible) {
            SelectionSummary::AllSelected
        } else if self.all_unselected(visible) {
            SelectionSummary::NoneSelected
        } else {
            SelectionSummary::SomeSelected
        }
    }
}
