//! Codes the core decodes but does not act on: clipboard, drag, file
//! transfer, language sync, secure-input, option negotiation, and the
//! remaining lifecycle misc codes. Each is logged and dropped (§4.7, §6.1).

use tracing::info;

use crate::error::StopReason;
use crate::wire::AnyMessage;

use super::Handlers;

pub(crate) fn handle_dclp(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    if let AnyMessage::Dclp(m) = msg {
        info!(identifier = m.identifier, sequence = m.sequence, bytes = m.data.len(), "clipboard data (opaque)");
    }
    None
}

pub(crate) fn handle_ddrg(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    if let AnyMessage::Ddrg(m) = msg {
        info!(file_count = m.file_count, "drag payload (opaque)");
    }
    None
}

pub(crate) fn handle_dftr(h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if !h.require_active() {
        return None;
    }
    if let AnyMessage::Dftr(m) = msg {
        info!(mark = m.mark, bytes = m.data.len(), "file-transfer chunk (opaque)");
    }
    None
}

pub(crate) fn handle_lsyn(_h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if let AnyMessage::Lsyn(m) = msg {
        info!(languages = ?m.lang_list, "language list");
    }
    None
}

pub(crate) fn handle_secn(_h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if let AnyMessage::Secn(m) = msg {
        info!(app = %m.app_name, "secure input notification");
    }
    None
}

pub(crate) fn handle_dsop(_h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if let AnyMessage::Dsop(m) = msg {
        info!(option_count = m.options.len(), "server options");
    }
    None
}

pub(crate) fn handle_cclp(_h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if let AnyMessage::Cclp(m) = msg {
        info!(identifier = %m.identifier, sequence = m.sequence, "clipboard grab notification");
    }
    None
}

pub(crate) fn handle_crop(_h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    info!("reset options (no-op in this core)");
    None
}

pub(crate) fn handle_cnop(_h: &mut Handlers, _msg: AnyMessage) -> Option<StopReason> {
    None
}

pub(crate) fn handle_csec(_h: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if let AnyMessage::Csec(m) = msg {
        info!(state = m.state, "secure-input state change");
    }
    None
}
