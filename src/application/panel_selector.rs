//! Per-panel indicator choices.
//!
//! Each transition returns the selectors it touched so the page can patch
//! its `<select>` elements instead of rebuilding them.

use crate::domain::chart::PanelAssignment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorChange {
    Added { panel: usize, selection: String },
    Removed { panel: usize },
    Changed { panel: usize, selection: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSelector {
    /// `selections[k - 1]` feeds panel `k`. `None` is not chosen yet and
    /// takes the default once indicators are known; `Some("")` is an
    /// explicit "no series".
    selections: Vec<Option<String>>,
    available: Vec<String>,
    max_panels: usize,
}

impl PanelSelector {
    pub fn new(max_panels: usize) -> Self {
        Self {
            selections: Vec::new(),
            available: Vec::new(),
            max_panels,
        }
    }

    pub fn panel_count(&self) -> usize {
        self.selections.len()
    }

    /// What each selector shows; pending panels show as empty.
    pub fn selections(&self) -> Vec<String> {
        self.selections
            .iter()
            .map(|selection| selection.clone().unwrap_or_default())
            .collect()
    }

    pub fn selection(&self, panel: usize) -> Option<&str> {
        panel
            .checked_sub(1)
            .and_then(|slot| self.selections.get(slot))
            .map(|selection| selection.as_deref().unwrap_or(""))
    }

    /// Option list for every selector, in dataset declaration order.
    pub fn options(&self) -> &[String] {
        &self.available
    }

    /// Chosen panels only, explicit "no series" included.
    pub fn assignment(&self) -> PanelAssignment {
        self.selections
            .iter()
            .enumerate()
            .filter_map(|(slot, selection)| selection.clone().map(|name| (slot + 1, name)))
            .collect()
    }

    /// Indicators in declaration order, wrapping when there are more panels.
    /// `None` while no indicators are known.
    fn default_for(&self, panel: usize) -> Option<String> {
        if self.available.is_empty() {
            return None;
        }
        Some(self.available[(panel - 1) % self.available.len()].clone())
    }

    fn needs_default(&self, selection: &Option<String>) -> bool {
        match selection {
            None => true,
            Some(name) => !name.is_empty() && !self.available.contains(name),
        }
    }

    /// Clamped to `max_panels`.
    pub fn set_panel_count(&mut self, count: usize) -> Vec<SelectorChange> {
        let count = count.min(self.max_panels);
        let mut changes = Vec::new();
        while self.selections.len() > count {
            let panel = self.selections.len();
            self.selections.pop();
            changes.push(SelectorChange::Removed { panel });
        }
        while self.selections.len() < count {
            let panel = self.selections.len() + 1;
            let selection = self.default_for(panel);
            changes.push(SelectorChange::Added {
                panel,
                selection: selection.clone().unwrap_or_default(),
            });
            self.selections.push(selection);
        }
        changes
    }

    /// Ignores unknown panels and names the dataset does not have. An empty
    /// name is an explicit choice and is kept across datasets.
    pub fn set_selection(&mut self, panel: usize, name: &str) -> Vec<SelectorChange> {
        if !name.is_empty() && !self.available.iter().any(|known| known == name) {
            return Vec::new();
        }
        let Some(slot) = panel
            .checked_sub(1)
            .and_then(|slot| self.selections.get_mut(slot))
        else {
            return Vec::new();
        };
        if slot.as_deref() == Some(name) {
            return Vec::new();
        }
        *slot = Some(name.to_string());
        vec![SelectorChange::Changed {
            panel,
            selection: name.to_string(),
        }]
    }

    /// New dataset: pending panels and names the dataset no longer has take
    /// the default for their panel. Explicit "no series" stays.
    pub fn set_available(&mut self, names: Vec<String>) -> Vec<SelectorChange> {
        self.available = names;
        let mut changes = Vec::new();
        for slot in 0..self.selections.len() {
            if !self.needs_default(&self.selections[slot]) {
                continue;
            }
            let selection = self.default_for(slot + 1);
            if selection != self.selections[slot] {
                changes.push(SelectorChange::Changed {
                    panel: slot + 1,
                    selection: selection.clone().unwrap_or_default(),
                });
                self.selections[slot] = selection;
            }
        }
        changes
    }

    /// Saved state from a previous visit. Names are kept even before a
    /// dataset lists them.
    pub fn restore(&mut self, panel_count: usize, assignment: &PanelAssignment) -> Vec<SelectorChange> {
        let mut changes = self.set_panel_count(panel_count);
        for (panel, name) in assignment.iter() {
            let Some(slot) = panel
                .checked_sub(1)
                .and_then(|slot| self.selections.get_mut(slot))
            else {
                continue;
            };
            if slot.as_deref() != Some(name) {
                *slot = Some(name.to_string());
                changes.push(SelectorChange::Changed {
                    panel,
                    selection: name.to_string(),
                });
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_wrap_around_available() {
        let mut selector = PanelSelector::new(8);
        selector.set_available(vec!["macd".into(), "rsi".into()]);
        selector.set_panel_count(3);
        assert_eq!(selector.selections(), ["macd", "rsi", "macd"]);
    }

    #[test]
    fn pending_panels_are_left_out_of_the_assignment() {
        let mut selector = PanelSelector::new(8);
        selector.set_panel_count(2);
        selector.set_available(Vec::new());
        assert!(selector.assignment().is_empty());
        selector.set_selection(2, "");
        assert_eq!(selector.assignment().iter().collect::<Vec<_>>(), vec![(2, "")]);
    }

    #[test]
    fn panel_count_is_clamped() {
        let mut selector = PanelSelector::new(2);
        assert_eq!(selector.set_panel_count(5).len(), 2);
        assert_eq!(selector.panel_count(), 2);
    }
}
