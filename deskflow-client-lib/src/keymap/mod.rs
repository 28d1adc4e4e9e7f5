//! Key-code translation path (component C3): server key id -> HID usage ->
//! Linux evdev code, and the symmetric mouse-button translation. Three
//! static, pure-function tables, declared once and never mutated.

mod ecode;
mod hid;

pub use ecode::{hid_to_ecode, hid_to_name, name_to_hid};
pub use hid::synergy_to_hid;

/// A USB HID keyboard/button usage code.
pub type HidUsage = u8;

/// A Linux kernel input event code (`KEY_*`/`BTN_*`).
pub type EvdevCode = u16;
