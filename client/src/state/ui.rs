//! Local UI chrome state (theme, navigation drawer, chat launcher).
//!
//! DESIGN
//! ======
//! Keeps transient presentation concerns out of domain state (`chat`,
//! `problems`) so rendering controls can evolve independently of API data.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// UI state shared through context as `RwSignal<UiState>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    /// Collapsed navigation menu on narrow screens.
    pub nav_open: bool,
    /// Whether the floating chat widget is expanded.
    pub chat_open: bool,
}

impl UiState {
    pub fn toggle_nav(&mut self) {
        self.nav_open = !self.nav_open;
    }

    /// Route changes close the navigation drawer but leave the chat alone.
    pub fn on_navigate(&mut self) {
        self.nav_open = false;
    }

    pub fn toggle_chat(&mut self) {
        self.chat_open = !self.chat_open;
    }
}
