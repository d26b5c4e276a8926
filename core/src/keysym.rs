//! X11/IBus keysym values used by the dispatch layers.
//!
//! Only the keys the engine and schema menu react to are named here. Printable
//! Latin-1 keysyms equal their code point; any other character is carried as a
//! Unicode keysym (`0x0100_0000 + code point`).

use phf::phf_map;

pub const SPACE: u32 = 0x0020;
pub const APOSTROPHE: u32 = 0x0027;
pub const COMMA: u32 = 0x002c;
pub const MINUS: u32 = 0x002d;
pub const PERIOD: u32 = 0x002e;
pub const KEY_0: u32 = 0x0030;
pub const KEY_1: u32 = 0x0031;
pub const KEY_2: u32 = 0x0032;
pub const KEY_9: u32 = 0x0039;
pub const EQUAL: u32 = 0x003d;
pub const GRAVE: u32 = 0x0060;

pub const BACKSPACE: u32 = 0xff08;
pub const TAB: u32 = 0xff09;
pub const RETURN: u32 = 0xff0d;
pub const ESCAPE: u32 = 0xff1b;
pub const HOME: u32 = 0xff50;
pub const LEFT: u32 = 0xff51;
pub const UP: u32 = 0xff52;
pub const RIGHT: u32 = 0xff53;
pub const DOWN: u32 = 0xff54;
pub const PAGE_UP: u32 = 0xff55;
pub const PAGE_DOWN: u32 = 0xff56;
pub const END: u32 = 0xff57;
pub const SHIFT_L: u32 = 0xffe1;
pub const SHIFT_R: u32 = 0xffe2;
pub const CONTROL_L: u32 = 0xffe3;
pub const CONTROL_R: u32 = 0xffe4;
pub const CAPS_LOCK: u32 = 0xffe5;
pub const ALT_L: u32 = 0xffe9;
pub const ALT_R: u32 = 0xffea;

const UNICODE_OFFSET: u32 = 0x0100_0000;

/// Key names as spelled by X11 (`xev`, `xmodmap`).
static NAMES: phf::Map<&'static str, u32> = phf_map! {
    "space" => SPACE,
    "apostrophe" => APOSTROPHE,
    "comma" => COMMA,
    "minus" => MINUS,
    "period" => PERIOD,
    "equal" => EQUAL,
    "grave" => GRAVE,
    "BackSpace" => BACKSPACE,
    "Tab" => TAB,
    "Return" => RETURN,
    "Escape" => ESCAPE,
    "Home" => HOME,
    "Left" => LEFT,
    "Up" => UP,
    "Right" => RIGHT,
    "Down" => DOWN,
    "Page_Up" => PAGE_UP,
    "Prior" => PAGE_UP,
    "Page_Down" => PAGE_DOWN,
    "Next" => PAGE_DOWN,
    "End" => END,
    "Shift_L" => SHIFT_L,
    "Shift_R" => SHIFT_R,
    "Control_L" => CONTROL_L,
    "Control_R" => CONTROL_R,
    "Caps_Lock" => CAPS_LOCK,
    "Alt_L" => ALT_L,
    "Alt_R" => ALT_R,
};

/// Keysym of a named key, or of a single character.
pub fn from_name(name: &str) -> Option<u32> {
    if let Some(code) = NAMES.get(name) {
        return Some(*code);
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(from_char(ch)),
        _ => None,
    }
}

/// Keysym carrying `ch`.
pub fn from_char(ch: char) -> u32 {
    let cp = ch as u32;
    if is_latin1_printable(cp) {
        cp
    } else {
        UNICODE_OFFSET + cp
    }
}

/// Printable character produced by `keysym`, if any.
pub fn to_char(keysym: u32) -> Option<char> {
    if is_latin1_printable(keysym) {
        return char::from_u32(keysym);
    }
    if keysym > UNICODE_OFFSET {
        return char::from_u32(keysym - UNICODE_OFFSET).filter(|ch| !ch.is_control());
    }
    None
}

pub fn is_shift(keysym: u32) -> bool {
    keysym == SHIFT_L || keysym == SHIFT_R
}

fn is_latin1_printable(cp: u32) -> bool {
    (0x20..=0x7e).contains(&cp) || (0xa0..=0xff).contains(&cp)
}
