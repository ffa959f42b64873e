use serde::Serialize;

use crate::anomaly::AnomalyId;

/// Which anomaly is selected, and whether related-site analysis is shown
/// for it.
///
/// Analysis without a selection is not representable through the public
/// methods: entering analysis requires a selection and selecting anything
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    selected: Option<AnomalyId>,
    analysis: bool,
}

impl SelectionState {
    pub fn selected(&self) -> Option<&AnomalyId> {
        self.selected.as_ref()
    }

    pub fn analysis(&self) -> bool {
        self.analysis
    }

    pub fn select(&mut self, id: AnomalyId) {
        self.selected = Some(id);
        self.analysis = false;
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.analysis = false;
    }

    /// Returns `false` (and changes nothing) when nothing is selected.
    pub fn enter_analysis(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        self.analysis = true;
        true
    }
}
