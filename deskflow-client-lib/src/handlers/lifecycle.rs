//! Lifecycle handlers: handshake follow-up, screen enter/leave, keepalive,
//! screen info, and the terminal error/bye codes. These run regardless of
//! connection state (§4.7's exempt set).

use tracing::{info, warn};

use crate::client::state::ClientState;
use crate::error::StopReason;
use crate::wire::messages::{CiakMsg, CinnMsg, DinfMsg};
use crate::wire::AnyMessage;

use super::Handlers;

pub(crate) fn handle_cinn(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    let AnyMessage::Cinn(m) = msg else { return None };
    if let Err(e) = h.mouse.move_absolute(i32::from(m.entry_x), i32::from(m.entry_y)) {
        warn!(error = %e, "move_absolute on screen entry failed");
    }
    // Set logical position to the server's entry point; the returned delta
    // is discarded since calculate_relative_move is the only contracted way
    // to write logical_pos (§4.4).
    let _ = h.ctx.calculate_relative_move(i32::from(m.entry_x), i32::from(m.entry_y));
    h.state = ClientState::Active;
    if let Err(e) = h.keyboard.sync_modifiers(m.mod_mask) {
        warn!(error = %e, "sync_modifiers on screen entry failed");
    }
    let _ = h.mouse.syn();
    let _ = h.keyboard.syn();
    info!(x = m.entry_x, y = m.entry_y, "screen entered, now active");
    None
}

pub(crate) fn handle_cout(h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    h.state = ClientState::Connected;
    if let Err(e) = h.keyboard.release_all_key() {
        warn!(error = %e, "release_all_key on screen leave failed");
    }
    if let Err(e) = h.mouse.release_all_button() {
        warn!(error = %e, "release_all_button on screen leave failed");
    }
    let _ = h.keyboard.syn();
    let _ = h.mouse.syn();
    info!("screen left, now connected");
    None
}

pub(crate) fn handle_calv(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    let AnyMessage::Calv(m) = msg else { return None };
    h.send(&m);
    None
}

pub(crate) fn handle_cbye(_h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    info!("server said goodbye");
    Some(StopReason::Bye)
}

pub(crate) fn handle_ebad(_h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    warn!("server reported a protocol error (EBAD)");
    Some(StopReason::Bad)
}

pub(crate) fn handle_ebsy(_h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    warn!("server reported this name is already in use (EBSY)");
    Some(StopReason::Busy)
}

pub(crate) fn handle_eunk(_h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    warn!("server reported an unknown client (EUNK)");
    Some(StopReason::Unknown)
}

pub(crate) fn handle_eicv(_h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    let AnyMessage::Eicv(m) = msg else { return None };
    warn!(major = m.major, minor = m.minor, "incompatible protocol version");
    Some(StopReason::Incompatible { major: m.major, minor: m.minor })
}

pub(crate) fn handle_qinf(h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    if let Err(e) = h.ctx.update_screen_info() {
        warn!(error = %e, "update_screen_info failed");
    }
    let (width, height) = h.ctx.screen_size();
    let (mouse_x, mouse_y) = h.ctx.logical_pos().unwrap_or((0, 0));
    h.send(&DinfMsg {
        left: 0,
        top: 0,
        width: width as u16,
        height: height as u16,
        warp: 0,
        mouse_x: mouse_x as i16,
        mouse_y: mouse_y as i16,
    });
    None
}

pub(crate) fn handle_dinf(h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    h.send(&CiakMsg {});
    None
}
