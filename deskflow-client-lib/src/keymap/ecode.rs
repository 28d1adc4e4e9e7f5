//! HID usage -> Linux evdev code, and a small bijective name table used by
//! logging and config validation. Numeric values come straight from the
//! kernel's `input-event-codes.h`; the HID side follows the USB HID Usage
//! Tables keyboard/keypad page (0x07).

use super::{EvdevCode, HidUsage};

macro_rules! ecode_table {
    ($($hid:literal => $name:literal, $code:literal;)+) => {
        /// Translates a HID keyboard/button usage into the matching Linux
        /// evdev `KEY_*`/`BTN_*` code. `None` for usages this client has no
        /// mapping for.
        pub fn hid_to_ecode(usage: HidUsage) -> Option<EvdevCode> {
            match usage {
                $($hid => Some($code),)+
                _ => None,
            }
        }

        /// Human-readable evdev name for a HID usage, e.g. for logging.
        pub fn hid_to_name(usage: HidUsage) -> Option<&'static str> {
            match usage {
                $($hid => Some($name),)+
                _ => None,
            }
        }

        /// Reverse lookup of [`hid_to_name`], for config-file key names.
        pub fn name_to_hid(name: &str) -> Option<HidUsage> {
            match name {
                $($name => Some($hid),)+
                _ => None,
            }
        }
    };
}

ecode_table! {
    0x04 => "KEY_A", 30;
    0x05 => "KEY_B", 48;
    0x06 => "KEY_C", 46;
    0x07 => "KEY_D", 32;
    0x08 => "KEY_E", 18;
    0x09 => "KEY_F", 33;
    0x0A => "KEY_G", 34;
    0x0B => "KEY_H", 35;
    0x0C => "KEY_I", 23;
    0x0D => "KEY_J", 36;
    0x0E => "KEY_K", 37;
    0x0F => "KEY_L", 38;
    0x10 => "KEY_M", 50;
    0x11 => "KEY_N", 49;
    0x12 => "KEY_O", 24;
    0x13 => "KEY_P", 25;
    0x14 => "KEY_Q", 16;
    0x15 => "KEY_R", 19;
    0x16 => "KEY_S", 31;
    0x17 => "KEY_T", 20;
    0x18 => "KEY_U", 22;
    0x19 => "KEY_V", 47;
    0x1A => "KEY_W", 17;
    0x1B => "KEY_X", 45;
    0x1C => "KEY_Y", 21;
    0x1D => "KEY_Z", 44;
    0x1E => "KEY_1", 2;
    0x1F => "KEY_2", 3;
    0x20 => "KEY_3", 4;
    0x21 => "KEY_4", 5;
    0x22 => "KEY_5", 6;
    0x23 => "KEY_6", 7;
    0x24 => "KEY_7", 8;
    0x25 => "KEY_8", 9;
    0x26 => "KEY_9", 10;
    0x27 => "KEY_0", 11;
    0x28 => "KEY_ENTER", 28;
    0x29 => "KEY_ESC", 1;
    0x2A => "KEY_BACKSPACE", 14;
    0x2B => "KEY_TAB", 15;
    0x2C => "KEY_SPACE", 57;
    0x2D => "KEY_MINUS", 12;
    0x2E => "KEY_EQUAL", 13;
    0x2F => "KEY_LEFTBRACE", 26;
    0x30 => "KEY_RIGHTBRACE", 27;
    0x31 => "KEY_BACKSLASH", 43;
    0x33 => "KEY_SEMICOLON", 39;
    0x34 => "KEY_APOSTROPHE", 40;
    0x35 => "KEY_GRAVE", 41;
    0x36 => "KEY_COMMA", 51;
    0x37 => "KEY_DOT", 52;
    0x38 => "KEY_SLASH", 53;
    0x39 => "KEY_CAPSLOCK", 58;
    0x3A => "KEY_F1", 59;
    0x3B => "KEY_F2", 60;
    0x3C => "KEY_F3", 61;
    0x3D => "KEY_F4", 62;
    0x3E => "KEY_F5", 63;
    0x3F => "KEY_F6", 64;
    0x40 => "KEY_F7", 65;
    0x41 => "KEY_F8", 66;
    0x42 => "KEY_F9", 67;
    0x43 => "KEY_F10", 68;
    0x44 => "KEY_F11", 87;
    0x45 => "KEY_F12", 88;
    0x49 => "KEY_INSERT", 110;
    0x4A => "KEY_HOME", 102;
    0x4B => "KEY_PAGEUP", 104;
    0x4C => "KEY_DELETE", 111;
    0x4D => "KEY_END", 107;
    0x4E => "KEY_PAGEDOWN", 109;
    0x4F => "KEY_RIGHT", 106;
    0x50 => "KEY_LEFT", 105;
    0x51 => "KEY_DOWN", 108;
    0x52 => "KEY_UP", 103;
    0x54 => "KEY_KPSLASH", 98;
    0x55 => "KEY_KPASTERISK", 55;
    0x56 => "KEY_KPMINUS", 74;
    0x57 => "KEY_KPPLUS", 78;
    0x58 => "KEY_KPENTER", 96;
    0x59 => "KEY_KP1", 79;
    0x5A => "KEY_KP2", 80;
    0x5B => "KEY_KP3", 81;
    0x5C => "KEY_KP4", 75;
    0x5D => "KEY_KP5", 76;
    0x5E => "KEY_KP6", 77;
    0x5F => "KEY_KP7", 71;
    0x60 => "KEY_KP8", 72;
    0x61 => "KEY_KP9", 73;
    0x62 => "KEY_KP0", 82;
    0x63 => "KEY_KPDOT", 83;
    0xE0 => "KEY_LEFTCTRL", 29;
    0xE1 => "KEY_LEFTSHIFT", 42;
    0xE2 => "KEY_LEFTALT", 56;
    0xE3 => "KEY_LEFTMETA", 125;
    0xE4 => "KEY_RIGHTCTRL", 97;
    0xE5 => "KEY_RIGHTSHIFT", 54;
    0xE6 => "KEY_RIGHTALT", 100;
    0xE7 => "KEY_RIGHTMETA", 126;
    0x01 => "BTN_LEFT", 272;
    0x02 => "BTN_RIGHT", 273;
    0x03 => "BTN_MIDDLE", 274;
}
