use crate::config::Theme;
use console::style;
use std::fmt::Display;

/// Theme-aware styling helpers. The behavioral contract is only that the
/// strings are distinguishable; the colors themselves are a preference.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
}

impl Palette {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Role headers and prompt markers.
    pub fn accent<D: Display>(&self, text: D) -> String {
        match self.theme {
            Theme::Dark => style(text).cyan().bold().to_string(),
            Theme::Light => style(text).blue().bold().to_string(),
        }
    }

    /// Timestamps, hints, secondary text.
    pub fn dim<D: Display>(&self, text: D) -> String {
        style(text).dim().to_string()
    }

    /// Failed results and error reports.
    pub fn error<D: Display>(&self, text: D) -> String {
        style(text).red().to_string()
    }

    /// Ids, confirmed values.
    pub fn value<D: Display>(&self, text: D) -> String {
        style(text).green().to_string()
    }

    /// Section headers.
    pub fn header<D: Display>(&self, text: D) -> String {
        style(text).bold().to_string()
    }
}
