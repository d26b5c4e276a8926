//! Raw key events as delivered by the host input framework.

use bitflags::bitflags;

use crate::keysym;

bitflags! {
    /// Modifier state attached to a key event (IBus bit layout).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
        const RELEASE = 1 << 30;
    }
}

impl ModifierMask {
    pub const ALT: Self = Self::MOD1;
    pub const NUM_LOCK: Self = Self::MOD2;
    /// Modifiers reserved for host hotkeys.
    pub const HOTKEYS: Self = Self::CONTROL
        .union(Self::MOD1)
        .union(Self::SUPER)
        .union(Self::HYPER)
        .union(Self::META);
}

/// A single key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    keycode: u32,
    mask: ModifierMask,
}

impl KeyEvent {
    pub fn new(keycode: u32, mask: ModifierMask) -> Self {
        Self { keycode, mask }
    }

    /// Unmodified press of `keycode`.
    pub fn press(keycode: u32) -> Self {
        Self::new(keycode, ModifierMask::empty())
    }

    pub fn keycode(&self) -> u32 {
        self.keycode
    }

    pub fn mask(&self) -> ModifierMask {
        self.mask
    }

    pub fn is_release(&self) -> bool {
        self.mask.contains(ModifierMask::RELEASE)
    }

    /// Character produced by the key, when it is printable.
    pub fn char(&self) -> Option<char> {
        keysym::to_char(self.keycode)
    }

    /// Whether the key coins a character that can be committed literally:
    /// printable and unmodified.
    pub fn is_coined(&self) -> bool {
        self.mask.is_empty() && self.char().is_some()
    }
}
