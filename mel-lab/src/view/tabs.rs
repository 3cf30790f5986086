//! Display tabs with per-tab scroll memory

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three mutually exclusive display tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewTab {
    #[default]
    PrimaryDetail,
    CompositionReport,
    RestrictedSynopsis,
}

impl ViewTab {
    pub const ALL: [ViewTab; 3] = [
        ViewTab::PrimaryDetail,
        ViewTab::CompositionReport,
        ViewTab::RestrictedSynopsis,
    ];

    fn index(self) -> usize {
        match self {
            ViewTab::PrimaryDetail => 0,
            ViewTab::CompositionReport => 1,
            ViewTab::RestrictedSynopsis => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewTab::PrimaryDetail => "primary-detail",
            ViewTab::CompositionReport => "composition-report",
            ViewTab::RestrictedSynopsis => "restricted-synopsis",
        }
    }
}

impl fmt::Display for ViewTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active tab plus the last scroll offset saved for each tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabScrollMemory {
    active: ViewTab,
    offsets: [u32; 3],
}

impl TabScrollMemory {
    pub fn active(&self) -> ViewTab {
        self.active
    }

    /// Saved offset for `tab` (0 if never left)
    pub fn saved_offset(&self, tab: ViewTab) -> u32 {
        self.offsets[tab.index()]
    }

    /// Move to `tab`
    ///
    /// Saves `current_offset` for the tab being left and returns the offset
    /// to restore for the tab being entered. Switching to the active tab
    /// saves and returns `current_offset`.
    pub fn switch(&mut self, tab: ViewTab, current_offset: u32) -> u32 {
        self.offsets[self.active.index()] = current_offset;
        self.active = tab;
        self.offsets[tab.index()]
    }

    /// Back to the default tab with every saved offset cleared
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
