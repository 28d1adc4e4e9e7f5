//! Mouse handlers: button down/up, relative move, wheel, and the `DMMV`
//! smoothing/flush pipeline (§4.7).

use tokio::time::Instant;
use tracing::warn;

use crate::error::StopReason;
use crate::keymap::{hid_to_ecode, synergy_to_hid};
use crate::wire::AnyMessage;

use super::Handlers;

const MOUSE_BUTTON_TAG: u32 = 0xAA;

fn translate_button(button: u8) -> Option<crate::keymap::EvdevCode> {
    let key_id = (u32::from(button) << 8) | MOUSE_BUTTON_TAG;
    hid_to_ecode(synergy_to_hid(key_id))
}

pub(crate) fn handle_dmdn(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dmdn(m) = msg else { return None };
    if let Some(code) = translate_button(m.button) {
        match h.mouse.send_button(code, true) {
            Ok(()) => {
                let _ = h.mouse.syn();
                let _ = h.keyboard.syn();
            }
            Err(e) => warn!(error = %e, "send_button press failed"),
        }
    } else {
        warn!(button = m.button, "no evdev mapping for mouse button");
    }
    None
}

pub(crate) fn handle_dmup(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dmup(m) = msg else { return None };
    if let Some(code) = translate_button(m.button) {
        match h.mouse.send_button(code, false) {
            Ok(()) => {
                let _ = h.mouse.syn();
                let _ = h.keyboard.syn();
            }
            Err(e) => warn!(error = %e, "send_button release failed"),
        }
    } else {
        warn!(button = m.button, "no evdev mapping for mouse button");
    }
    None
}

pub(crate) fn handle_dmrm(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dmrm(m) = msg else { return None };
    match h.mouse.move_relative(i32::from(m.dx), i32::from(m.dy)) {
        Ok(()) => {
            let _ = h.mouse.syn();
            let _ = h.keyboard.syn();
        }
        Err(e) => warn!(error = %e, "move_relative failed"),
    }
    None
}

/// Magnitude is discarded: one `wheel_relative` call of sign `±1` per
/// non-zero axis (§8 boundary behavior, §9 open question).
pub(crate) fn handle_dmwm(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dmwm(m) = msg else { return None };
    let mut emitted = false;
    if m.x_delta != 0 {
        if let Err(e) = h.mouse.wheel_relative(i32::from(m.x_delta.signum())) {
            warn!(error = %e, "wheel_relative failed");
        } else {
            emitted = true;
        }
    }
    if m.y_delta != 0 {
        if let Err(e) = h.mouse.wheel_relative(i32::from(m.y_delta.signum())) {
            warn!(error = %e, "wheel_relative failed");
        } else {
            emitted = true;
        }
    }
    if emitted {
        let _ = h.mouse.syn();
        let _ = h.keyboard.syn();
    }
    None
}

/// Coalesces high-rate absolute-move messages per §4.7's three-step
/// algorithm.
pub(crate) fn handle_dmmv(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    let AnyMessage::Dmmv(m) = msg else { return None };
    let (x, y) = (i32::from(m.x), i32::from(m.y));

    // Step 1: cancel whatever flush was previously armed.
    if let Some(handle) = h.smoother.flush_handle.take() {
        handle.abort();
    }

    let now = Instant::now();
    let interval = h.config.mouse_move_interval();
    let throttled = matches!(h.smoother.last_emit, Some(prev) if now.duration_since(prev) < interval);

    if throttled {
        h.smoother.pending_pos = Some((x, y));
        h.arm_flush();
        return None;
    }

    h.smoother.last_emit = Some(now);
    if h.config.abs_mouse_move {
        match h.mouse.move_absolute(x, y) {
            Ok(()) => {
                let _ = h.mouse.syn();
                let _ = h.keyboard.syn();
            }
            Err(e) => warn!(error = %e, "move_absolute failed"),
        }
        h.smoother.pending_pos = None;
    } else {
        h.smoother.move_count += 1;
        if h.smoother.move_count >= h.config.mouse_pos_sync_freq {
            match h.mouse.move_absolute(x, y) {
                Ok(()) => {
                    let _ = h.mouse.syn();
                    let _ = h.keyboard.syn();
                }
                Err(e) => warn!(error = %e, "resync move_absolute failed"),
            }
            h.smoother.move_count = 0;
        } else {
            let (dx, dy) = h.ctx.calculate_relative_move(x, y);
            if (dx, dy) != (0, 0) {
                match h.mouse.move_relative(dx, dy) {
                    Ok(()) => {
                        let _ = h.mouse.syn();
                        let _ = h.keyboard.syn();
                    }
                    Err(e) => warn!(error = %e, "move_relative failed"),
                }
            }
        }
    }
    None
}
