//! Keybinding configuration for the TUI.
//!
//! Bindings apply while browsing. While the input line has focus, printable
//! keys are typed into it instead.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub next_pane: Vec<String>,
    pub prev_pane: Vec<String>,
    pub select: Vec<String>,
    pub mark_read: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub focus_input: Vec<String>,
    pub toggle_maximize: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["n", "PageDown"]),
            prev_page: keys(&["p", "PageUp"]),
            next_pane: keys(&["Tab"]),
            prev_pane: keys(&["BackTab", "Shift+Tab"]),
            select: keys(&["Enter"]),
            mark_read: keys(&["r"]),
            open_in_browser: keys(&["o"]),
            focus_input: keys(&["a", "/"]),
            toggle_maximize: keys(&["m"]),
        }
    }
}

impl KeybindingConfig {
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 12] = [
            (self.quit.as_slice(), Action::Quit),
            (self.move_up.as_slice(), Action::MoveUp),
            (self.move_down.as_slice(), Action::MoveDown),
            (self.next_page.as_slice(), Action::NextPage),
            (self.prev_page.as_slice(), Action::PrevPage),
            (self.next_pane.as_slice(), Action::NextPane),
            (self.prev_pane.as_slice(), Action::PrevPane),
            (self.select.as_slice(), Action::Select),
            (self.mark_read.as_slice(), Action::MarkRead),
            (self.open_in_browser.as_slice(), Action::OpenInBrowser),
            (self.focus_input.as_slice(), Action::FocusInput),
            (self.toggle_maximize.as_slice(), Action::ToggleMaximize),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_any(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }

    /// Every binding string that fails to parse, for startup validation.
    pub fn invalid_bindings(&self) -> Vec<String> {
        [
            &self.quit,
            &self.move_up,
            &self.move_down,
            &self.next_page,
            &self.prev_page,
            &self.next_pane,
            &self.prev_pane,
            &self.select,
            &self.mark_read,
            &self.open_in_browser,
            &self.focus_input,
            &self.toggle_maximize,
        ]
        .into_iter()
        .flatten()
        .filter(|binding| parse_key_string(binding).is_err())
        .cloned()
        .collect()
    }
}

fn matches_any(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored when the binding does not ask for it, since
    /// terminals report "R" as Shift+R.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse "j", "Enter", "F5", "Ctrl+c", "Shift+Tab", "Ctrl+Alt+x".
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // A lone "+" is the plus key, not a separator.
    let (modifier_parts, key_part) = match s.rsplit_once('+') {
        Some((mods, key)) if !mods.is_empty() && !key.is_empty() => (Some(mods), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts.into_iter().flat_map(|m| m.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" | "bs" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        _ => return Err(format!("Unknown key: {}", s)),
    };
    Ok(code)
}
