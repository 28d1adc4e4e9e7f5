//! Server key id -> HID usage.
//!
//! Grounded on `src/keymaps/base.py` in the original Python client: printable
//! characters travel as their own ASCII code point, mouse buttons are
//! tagged with the `0xAA` low byte, and everything else (modifiers,
//! navigation, function keys) already carries its HID usage in the low
//! byte of the id.

use super::HidUsage;

const MOUSE_BUTTON_TAG: u32 = 0xAA;

/// Translates the server's key identifier into a USB HID usage code.
///
/// - Mouse buttons: `key_id = (button << 8) | 0xAA`; the button number
///   *is* its HID usage (`0x01` left, `0x02` right, `0x03` middle, ...).
/// - Printable characters: `key_id` is the ASCII code point of the base
///   character (case-insensitively — shift state travels in the separate
///   modifier mask, not in the key id).
/// - Everything else (modifiers, navigation, function keys): the low byte
///   of `key_id` already *is* the HID usage.
pub fn synergy_to_hid(key_id: u32) -> HidUsage {
    if key_id > 0xFF && key_id & 0xFF == MOUSE_BUTTON_TAG {
        return (key_id >> 8) as HidUsage;
    }
    if let Some(hid) = ascii_to_hid(key_id) {
        return hid;
    }
    (key_id & 0xFF) as HidUsage
}

fn ascii_to_hid(key_id: u32) -> Option<HidUsage> {
    let c = u8::try_from(key_id).ok()?;
    Some(match c {
        b'a'..=b'z' => 0x04 + (c - b'a'),
        b'A'..=b'Z' => 0x04 + (c - b'A'),
        b'1'..=b'9' => 0x1E + (c - b'1'),
        b'0' => 0x27,
        b' ' => 0x2C,
        b'\t' => 0x2B,
        b'\r' => 0x28,
        0x08 => 0x2A, // backspace
        0x1B => 0x29, // escape
        b'-' => 0x2D,
        b'=' => 0x2E,
        b'[' => 0x2F,
        b']' => 0x30,
        b'\\' => 0x31,
        b';' => 0x33,
        b'\'' => 0x34,
        b'`' => 0x35,
        b',' => 0x36,
        b'.' => 0x37,
        b'/' => 0x38,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_letter_maps_through_ascii_table() {
        // scenario from spec.md §8: DKDN(key_id=97) is the letter 'a'
        assert_eq!(synergy_to_hid(97), 0x04);
    }

    #[test]
    fn mouse_button_tag_extracts_button_number() {
        assert_eq!(synergy_to_hid((1 << 8) | 0xAA), 1);
        assert_eq!(synergy_to_hid((3 << 8) | 0xAA), 3);
    }

    #[test]
    fn control_key_low_byte_is_already_hid_usage() {
        // left control: HID 0xE0 arrives directly as the low byte.
        assert_eq!(synergy_to_hid(0xE0), 0xE0);
    }

    #[test]
    fn is_injective_on_the_declared_alphanumeric_domain() {
        use std::collections::HashSet;
        let ids: Vec<u32> = (b'a'..=b'z')
            .chain(b'0'..=b'9')
            .map(u32::from)
            .collect();
        let hids: HashSet<HidUsage> = ids.iter().map(|&id| synergy_to_hid(id)).collect();
        assert_eq!(hids.len(), ids.len());
    }
}
