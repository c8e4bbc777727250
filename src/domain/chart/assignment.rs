use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sub-panel index (1-based) to indicator name. Panel 0 is always the main
/// candlestick panel and never appears here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelAssignment {
    selections: BTreeMap<usize, String>,
}

impl PanelAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, panel_index: usize, indicator: impl Into<String>) {
        if panel_index == 0 {
            return;
        }
        self.selections.insert(panel_index, indicator.into());
    }

    /// `None` for unassigned panels and for empty names.
    pub fn get(&self, panel_index: usize) -> Option<&str> {
        self.selections
            .get(&panel_index)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.selections
            .iter()
            .map(|(panel, name)| (*panel, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for PanelAssignment {
    fn from_iter<T: IntoIterator<Item = (usize, S)>>(iter: T) -> Self {
        let mut assignment = Self::new();
        for (panel, name) in iter {
            assignment.assign(panel, name);
        }
        assignment
    }
}
