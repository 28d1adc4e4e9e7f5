//! Keyboard handlers: `DKDN`/`DKUP`/`DKRP`/`DKDL`, all routed through the
//! same `synergy_to_hid` -> `hid_to_ecode` translation (§4.3, §4.7).

use tracing::{info, warn};

use crate::error::StopReason;
use crate::keymap::{hid_to_ecode, synergy_to_hid, EvdevCode};
use crate::wire::AnyMessage;

use super::Handlers;

fn translate(key_button: u16) -> Option<EvdevCode> {
    hid_to_ecode(synergy_to_hid(u32::from(key_button)))
}

fn press(h: &mut Handlers, key_button: u16) {
    match translate(key_button) {
        Some(code) => match h.keyboard.send_key(code, true) {
            Ok(()) => {
                let _ = h.keyboard.syn();
                let _ = h.mouse.syn();
            }
            Err(e) => warn!(error = %e, code, "send_key press failed"),
        },
        None => warn!(key_button, "no evdev mapping for key_button"),
    }
}

fn release(h: &mut Handlers, key_button: u16) {
    match translate(key_button) {
        Some(code) => match h.keyboard.send_key(code, false) {
            Ok(()) => {
                let _ = h.keyboard.syn();
                let _ = h.mouse.syn();
            }
            Err(e) => warn!(error = %e, code, "send_key release failed"),
        },
        None => warn!(key_button, "no evdev mapping for key_button"),
    }
}

pub(crate) fn handle_dkdn(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dkdn(m) = msg else { return None };
    press(h, m.key_button);
    None
}

pub(crate) fn handle_dkup(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dkup(m) = msg else { return None };
    release(h, m.key_button);
    None
}

pub(crate) fn handle_dkdl(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dkdl(m) = msg else { return None };
    info!(language = %m.language, "key-down with language hint");
    press(h, m.key_button);
    None
}

/// `DKRP` only presses if the key isn't already believed pressed, since a
/// key-repeat that arrived for an already-held key would otherwise desync
/// the device's pressed-keys bookkeeping from a spurious second press.
pub(crate) fn handle_dkrp(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dkrp(m) = msg else { return None };
    if let Some(code) = translate(m.key_button) {
        if !h.keyboard.pressed_keys().contains(&code) {
            press(h, m.key_button);
        }
    } else {
        warn!(key_button = m.key_button, "no evdev mapping for key_button");
    }
    None
}
