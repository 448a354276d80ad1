//! Keystroke vocabulary shared with hosts.

use bitflags::bitflags;

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Return / keypad Enter.
    Enter,
    /// Tab (Shift+Tab is `Tab` with [`Modifiers::SHIFT`] or [`Key::BackTab`]).
    Tab,
    /// Left tab as reported by some terminals for Shift+Tab.
    BackTab,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Home.
    Home,
    /// End.
    End,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// A printable character.
    Char(char),
}

bitflags! {
    /// Modifier state accompanying a key press.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Meta / Command.
        const META = 1 << 3;
    }
}

/// Whether a handler consumed a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was fully handled; the host must not apply its default behaviour.
    Handled,
    /// The host should apply its default behaviour.
    PassThrough,
}

impl KeyOutcome {
    /// Returns `true` for [`KeyOutcome::Handled`].
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}

impl Key {
    /// Shift+Tab in either encoding.
    pub(crate) fn is_unindent(self, mods: Modifiers) -> bool {
        matches!(self, Self::BackTab) || (self == Self::Tab && mods.contains(Modifiers::SHIFT))
    }
}
