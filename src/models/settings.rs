//! Application settings.
//!
//! The settings file is a single JSON object read at startup and rewritten in
//! full on every change. The core only validates the global shortcut; the
//! other sections are carried through unchanged for the UI layer.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortcut registered when no settings file exists.
pub const DEFAULT_QUICK_PICKER_SHORTCUT: &str = "CommandOrControl+Shift+P";

/// Persisted application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Global hotkey configuration.
    pub global_shortcut: GlobalShortcutSettings,
    /// Appearance options.
    pub appearance: AppearanceSettings,
    /// General toggles.
    pub general: GeneralSettings,
    /// Quick picker window state.
    pub quick_picker: QuickPickerSettings,
}

impl AppSettings {
    /// Checks every field the core is responsible for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the quick picker shortcut is enabled
    /// but does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.global_shortcut.enabled {
            Shortcut::from_str(&self.global_shortcut.quick_picker)?;
        }
        Ok(())
    }
}

/// Global hotkey that opens the quick picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalShortcutSettings {
    /// Accelerator string, e.g. `CommandOrControl+Shift+P`.
    pub quick_picker: String,
    /// Whether the hotkey is registered.
    pub enabled: bool,
}

impl Default for GlobalShortcutSettings {
    fn default() -> Self {
        Self {
            quick_picker: DEFAULT_QUICK_PICKER_SHORTCUT.to_string(),
            enabled: true,
        }
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
    /// Follow the operating system.
    #[default]
    System,
}

/// Appearance section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearanceSettings {
    /// Active theme.
    pub theme: Theme,
}

/// General toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct GeneralSettings {
    /// Launch at login.
    pub start_at_login: bool,
    /// Show the application in the dock.
    pub show_in_dock: bool,
    /// Show the tray icon.
    pub show_tray_icon: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            start_at_login: false,
            show_in_dock: false,
            show_tray_icon: true,
        }
    }
}

/// Quick picker window state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickPickerSettings {
    /// Last window position; `None` centers the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<WindowPosition>,
}

/// Physical window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

/// A modifier key in a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Command on macOS, Control elsewhere.
    CommandOrControl,
    /// Control.
    Control,
    /// Alt / Option.
    Alt,
    /// Shift.
    Shift,
    /// Meta / Windows key.
    Meta,
}

impl Modifier {
    /// Parses a modifier token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "CommandOrControl" | "Cmd" | "Command" => Some(Self::CommandOrControl),
            "Ctrl" | "Control" => Some(Self::Control),
            "Alt" | "Option" => Some(Self::Alt),
            "Shift" => Some(Self::Shift),
            "Meta" => Some(Self::Meta),
            _ => None,
        }
    }

    /// Returns the canonical token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CommandOrControl => "CommandOrControl",
            Self::Control => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Meta => "Meta",
        }
    }
}

/// Named keys accepted in addition to letters, digits, and F1–F12.
const NAMED_KEYS: &[&str] = &[
    "Space",
    "Tab",
    "Enter",
    "Escape",
    "Backspace",
    "Delete",
    "Up",
    "Down",
    "Left",
    "Right",
    "Home",
    "End",
    "PageUp",
    "PageDown",
];

/// A parsed global shortcut: one or more modifiers followed by one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Modifiers in the order given, without duplicates.
    pub modifiers: Vec<Modifier>,
    /// Canonical key name (`A`, `7`, `F5`, `Space`, ...).
    pub key: String,
}

impl Shortcut {
    fn normalize_key(raw: &str) -> Option<String> {
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphanumeric() {
                return Some(c.to_ascii_uppercase().to_string());
            }
            return None;
        }

        let upper = raw.to_ascii_uppercase();
        if let Some(number) = upper.strip_prefix('F') {
            if let Ok(n) = number.parse::<u8>() {
                if (1..=12).contains(&n) && !number.starts_with('0') {
                    return Some(format!("F{n}"));
                }
            }
        }

        NAMED_KEYS
            .iter()
            .find(|name| name.eq_ignore_ascii_case(raw))
            .map(|name| (*name).to_string())
    }
}

impl FromStr for Shortcut {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifier_tokens)) = parts.split_last() else {
            return Err(Error::InvalidInput("empty shortcut".to_string()));
        };
        if key.is_empty() {
            return Err(Error::InvalidInput(format!("shortcut '{s}' has no key")));
        }
        if modifier_tokens.is_empty() {
            return Err(Error::InvalidInput(format!(
                "shortcut '{s}' needs at least one modifier"
            )));
        }

        let mut modifiers = Vec::with_capacity(modifier_tokens.len());
        for token in modifier_tokens {
            let modifier = Modifier::parse(token)
                .ok_or_else(|| Error::InvalidInput(format!("unknown modifier: {token}")))?;
            if !modifiers.contains(&modifier) {
                modifiers.push(modifier);
            }
        }

        let key = Self::normalize_key(key)
            .ok_or_else(|| Error::InvalidInput(format!("unknown key: {key}")))?;

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        f.write_str(&self.key)
    }
}
