//! Keyboard shortcut routing and the shortcut registry.

use crate::config::ShortcutConfig;
use crate::input::{Key, KeyEvent, KeyboardState};
use crate::selection::{NudgeDirection, NudgeStep};
use crate::tools::ToolKind;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// A command a key binding resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCommand {
    SwitchTool(ToolKind),
    Copy,
    Cut,
    Paste,
    SelectAll,
    Group,
    Ungroup,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    FitToScreen,
    Nudge(NudgeDirection, NudgeStep),
    Delete,
    Deselect,
}

impl ShortcutCommand {
    /// Whether a held key keeps firing this command on auto-repeat.
    pub fn is_repeatable(self) -> bool {
        matches!(self, ShortcutCommand::Nudge(..))
    }

    /// Commands that do nothing on an empty selection.
    pub fn requires_selection(self) -> bool {
        matches!(
            self,
            ShortcutCommand::Copy
                | ShortcutCommand::Cut
                | ShortcutCommand::Delete
                | ShortcutCommand::Group
        )
    }
}

/// Map a key event to a command, ignoring focus and repeat state.
///
/// Ctrl/Cmd bindings are checked first. Alt, or Ctrl/Cmd with a key that
/// has no binding, matches nothing; bare keys only fire with no modifier or
/// Shift alone.
pub fn resolve(event: &KeyEvent) -> Option<ShortcutCommand> {
    let mods = event.modifiers;

    if mods.command() {
        if mods.alt {
            return None;
        }
        let Key::Character(c) = event.key else {
            return None;
        };
        return match (c, mods.shift) {
            ('c', false) => Some(ShortcutCommand::Copy),
            ('x', false) => Some(ShortcutCommand::Cut),
            ('v', false) => Some(ShortcutCommand::Paste),
            ('a', false) => Some(ShortcutCommand::SelectAll),
            ('g', false) => Some(ShortcutCommand::Group),
            ('g', true) => Some(ShortcutCommand::Ungroup),
            ('z', false) => Some(ShortcutCommand::Undo),
            ('z', true) | ('y', false) => Some(ShortcutCommand::Redo),
            ('=', _) | ('+', _) => Some(ShortcutCommand::ZoomIn),
            ('-', false) => Some(ShortcutCommand::ZoomOut),
            ('0', false) => Some(ShortcutCommand::FitToScreen),
            _ => None,
        };
    }

    if mods.has_non_shift() {
        return None;
    }

    let step = if mods.shift {
        NudgeStep::Fast
    } else {
        NudgeStep::Fine
    };
    match event.key {
        Key::Character(c) => ToolKind::from_shortcut(c).map(ShortcutCommand::SwitchTool),
        Key::ArrowUp => Some(ShortcutCommand::Nudge(NudgeDirection::Up, step)),
        Key::ArrowDown => Some(ShortcutCommand::Nudge(NudgeDirection::Down, step)),
        Key::ArrowLeft => Some(ShortcutCommand::Nudge(NudgeDirection::Left, step)),
        Key::ArrowRight => Some(ShortcutCommand::Nudge(NudgeDirection::Right, step)),
        Key::Delete | Key::Backspace => Some(ShortcutCommand::Delete),
        Key::Escape => Some(ShortcutCommand::Deselect),
        Key::Enter | Key::Tab | Key::Other(_) => None,
    }
}

/// The editor side of the router.
pub trait ShortcutTarget {
    fn active_tool(&self) -> ToolKind;
    fn selection_is_empty(&self) -> bool;
    fn apply_shortcut(&mut self, command: ShortcutCommand);
}

/// Transient "tool changed" notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolNotice {
    pub tool: ToolKind,
    pub tool_name: &'static str,
    pub shortcut: char,
    pub issued_at: Instant,
    pub duration: Duration,
}

impl ToolNotice {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) >= self.duration
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Result of routing one key down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    /// The command that was applied to the target, if any.
    pub command: Option<ShortcutCommand>,
    /// Whether the host should suppress the key's default action.
    pub prevent_default: bool,
    /// Set when the key switched tools.
    pub notice: Option<ToolNotice>,
}

impl KeyOutcome {
    fn passthrough() -> Self {
        Self::default()
    }

    fn swallowed() -> Self {
        Self {
            prevent_default: true,
            ..Self::default()
        }
    }
}

/// Routes key events to a [`ShortcutTarget`].
///
/// The router only acts between [`subscribe`](Self::subscribe) and
/// [`unsubscribe`](Self::unsubscribe).
#[derive(Debug, Clone)]
pub struct ShortcutRouter {
    subscribed: bool,
    keys: KeyboardState,
    notice: Option<ToolNotice>,
    notice_duration: Duration,
}

impl Default for ShortcutRouter {
    fn default() -> Self {
        Self::new(&ShortcutConfig::default())
    }
}

impl ShortcutRouter {
    pub fn new(config: &ShortcutConfig) -> Self {
        Self {
            subscribed: false,
            keys: KeyboardState::new(),
            notice: None,
            notice_duration: config.notice_duration(),
        }
    }

    pub fn subscribe(&mut self) {
        if !self.subscribed {
            log::debug!("Shortcut router subscribed");
        }
        self.subscribed = true;
    }

    /// Stop handling events and forget held keys.
    pub fn unsubscribe(&mut self) {
        if self.subscribed {
            log::debug!("Shortcut router unsubscribed");
        }
        self.subscribed = false;
        self.reset();
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Forget held keys and any live notice, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.notice = None;
    }

    pub fn handle_key_down(
        &mut self,
        event: &KeyEvent,
        target: &mut impl ShortcutTarget,
    ) -> KeyOutcome {
        self.handle_key_down_at(event, target, Instant::now())
    }

    /// Route a key down that happened at `now`.
    pub fn handle_key_down_at(
        &mut self,
        event: &KeyEvent,
        target: &mut impl ShortcutTarget,
        now: Instant,
    ) -> KeyOutcome {
        if !self.subscribed || event.target.accepts_text() {
            return KeyOutcome::passthrough();
        }
        let Some(command) = resolve(event) else {
            return KeyOutcome::passthrough();
        };

        let first_press = self.keys.press(&event.key);
        if !first_press && !(event.repeat && command.is_repeatable()) {
            return KeyOutcome::swallowed();
        }

        if let ShortcutCommand::SwitchTool(tool) = command {
            if target.active_tool() == tool {
                return KeyOutcome::swallowed();
            }
            target.apply_shortcut(command);
            let notice = ToolNotice {
                tool,
                tool_name: tool.display_name(),
                shortcut: tool.shortcut(),
                issued_at: now,
                duration: self.notice_duration,
            };
            self.notice = Some(notice.clone());
            return KeyOutcome {
                command: Some(command),
                prevent_default: true,
                notice: Some(notice),
            };
        }

        if command.requires_selection() && target.selection_is_empty() {
            log::debug!("Ignoring {command:?} with empty selection");
            return KeyOutcome::swallowed();
        }

        target.apply_shortcut(command);
        KeyOutcome {
            command: Some(command),
            prevent_default: true,
            notice: None,
        }
    }

    pub fn handle_key_up(&mut self, key: &Key) {
        self.keys.release(key);
    }

    /// The most recent tool notice, if it is still live at `now`.
    pub fn active_notice_at(&self, now: Instant) -> Option<&ToolNotice> {
        self.notice.as_ref().filter(|n| !n.is_expired_at(now))
    }

    pub fn active_notice(&self) -> Option<&ToolNotice> {
        self.active_notice_at(Instant::now())
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+G").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts, for help overlays.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("V", false, false, "Select tool"),
            Shortcut::new("P", false, false, "Smart pen"),
            Shortcut::new("Z", false, false, "Zoom tool"),
            Shortcut::new("H", false, false, "Hand tool"),
            Shortcut::new("U", false, false, "Upload"),
            Shortcut::new("C", false, false, "Comment"),
            Shortcut::new("T", false, false, "Text"),
            Shortcut::new("S", false, false, "Shape"),
            Shortcut::new("N", false, false, "Sticky note"),
            Shortcut::new("L", false, false, "Timeline"),
            Shortcut::new("M", false, false, "Mind map"),
            Shortcut::new("E", false, false, "Smart element"),
            Shortcut::new("C", true, false, "Copy selection"),
            Shortcut::new("X", true, false, "Cut selection"),
            Shortcut::new("V", true, false, "Paste"),
            Shortcut::new("A", true, false, "Select all"),
            Shortcut::new("G", true, false, "Group selection"),
            Shortcut::new("G", true, true, "Ungroup selection"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("=", true, false, "Zoom in"),
            Shortcut::new("-", true, false, "Zoom out"),
            Shortcut::new("0", true, false, "Zoom to fit"),
            Shortcut::new("Arrows", false, false, "Nudge selection"),
            Shortcut::new("Arrows", false, true, "Nudge selection further"),
            Shortcut::new("Delete", false, false, "Delete selection"),
            Shortcut::new("Backspace", false, false, "Delete selection"),
            Shortcut::new("Escape", false, false, "Clear selection"),
        ]
    }
}
