// crates/neoncut-core/src/keymap.rs
//
// Keyboard shortcuts → EditorCommand.
//
//   Ctrl/Cmd+Z             undo
//   Ctrl/Cmd+Shift+Z       redo
//   Ctrl+Y                 redo
//   Ctrl/Cmd+B             split at playhead
//   Delete / Backspace     delete selected
//   Shift+Delete           ripple delete selected
//   Space                  play / pause
//
// Hosts must not forward keys while a text field has focus.

use crate::commands::EditorCommand;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Delete,
    Backspace,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl:  bool,
    /// Cmd on macOS.
    pub meta:  bool,
    pub shift: bool,
    pub alt:   bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, meta: false, shift: false, alt: false };

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key:  Key,
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

pub fn command_for(event: KeyEvent) -> Option<EditorCommand> {
    let m = event.mods;
    match event.key {
        Key::Char(c) if m.command() && !m.alt => match c.to_ascii_lowercase() {
            'z' if m.shift => Some(EditorCommand::Redo),
            'z'            => Some(EditorCommand::Undo),
            'y' if m.ctrl  => Some(EditorCommand::Redo),
            'b'            => Some(EditorCommand::SplitSelected),
            _              => None,
        },
        Key::Delete if m.shift       => Some(EditorCommand::RippleDeleteSelected),
        Key::Delete | Key::Backspace if !m.command() => Some(EditorCommand::DeleteSelected),
        Key::Space if !m.command()   => Some(EditorCommand::TogglePlayback),
        _ => None,
    }
}
