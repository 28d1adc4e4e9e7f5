//! Per-code handlers (component C7). Each submodule owns one family of
//! codes; [`Handlers`] is the shared state every handler function mutates,
//! passed in by the dispatcher worker rather than captured, since the
//! worker and the handlers it drives would otherwise need to reference
//! each other.

pub mod keyboard;
pub mod lifecycle;
pub mod mouse;
pub mod opaque;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::warn;

use crate::client::state::ClientState;
use crate::config::Config;
use crate::device::{DeviceContext, KeyboardDevice, MouseDevice};
use crate::dispatcher::DispatchItem;
use crate::wire::{self, WireMessage};

/// Coalescing state for `DMMV` smoothing (§4.7), owned by the handler and
/// touched only from the single dispatcher worker.
pub(crate) struct MoveSmoother {
    pub last_emit: Option<Instant>,
    pub pending_pos: Option<(i32, i32)>,
    pub move_count: u32,
    pub flush_handle: Option<JoinHandle<()>>,
}

impl Default for MoveSmoother {
    fn default() -> Self {
        Self { last_emit: None, pending_pos: None, move_count: 0, flush_handle: None }
    }
}

/// Everything a handler needs: device state, the current connection state,
/// the outgoing-frame queue, and a way to re-enqueue a flush tick onto
/// itself. One instance lives inside the dispatcher worker task; it is
/// never shared or locked (§5).
pub struct Handlers {
    pub(crate) state: ClientState,
    pub(crate) config: Arc<Config>,
    pub(crate) ctx: Box<dyn DeviceContext>,
    pub(crate) mouse: Box<dyn MouseDevice>,
    pub(crate) keyboard: Box<dyn KeyboardDevice>,
    write_tx: mpsc::UnboundedSender<Vec<u8>>,
    queue_tx: mpsc::UnboundedSender<DispatchItem>,
    pub(crate) smoother: MoveSmoother,
}

impl Handlers {
    pub fn new(
        config: Arc<Config>,
        ctx: Box<dyn DeviceContext>,
        mouse: Box<dyn MouseDevice>,
        keyboard: Box<dyn KeyboardDevice>,
        write_tx: mpsc::UnboundedSender<Vec<u8>>,
        queue_tx: mpsc::UnboundedSender<DispatchItem>,
    ) -> Self {
        Self {
            state: ClientState::Connected,
            config,
            ctx,
            mouse,
            keyboard,
            write_tx,
            queue_tx,
            smoother: MoveSmoother::default(),
        }
    }

    /// Enqueues a reply frame. Non-blocking; the writer task is the single
    /// serializer (§4.5).
    pub(crate) fn send<T: WireMessage>(&self, msg: &T) {
        let _ = self.write_tx.send(wire::pack_for_socket(msg));
    }

    /// Lifecycle handlers run regardless of state; everything else is a
    /// no-op outside `ACTIVE` (§4.7).
    pub(crate) fn require_active(&self) -> bool {
        self.state.is_active()
    }

    /// Arms a one-shot flush 50ms out, aborting whatever was previously
    /// scheduled. The abort is what makes "if still armed" true: a
    /// cancelled task never reaches its `send`.
    pub(crate) fn arm_flush(&mut self) {
        if let Some(h) = self.smoother.flush_handle.take() {
            h.abort();
        }
        let tx = self.queue_tx.clone();
        self.smoother.flush_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            let _ = tx.send(DispatchItem::Flush);
        }));
    }

    /// Invoked when a previously armed flush fires.
    pub(crate) fn flush_pending_move(&mut self) {
        self.smoother.flush_handle = None;
        if let Some((x, y)) = self.smoother.pending_pos.take() {
            match self.mouse.move_absolute(x, y) {
                Ok(()) => {
                    let _ = self.mouse.syn();
                    self.smoother.last_emit = Some(Instant::now());
                }
                Err(e) => warn!(error = %e, "flushed move_absolute failed"),
            }
        }
    }

    /// Releases every held key and button. Called once, on shutdown.
    pub(crate) fn teardown(&mut self) {
        if let Some(h) = self.smoother.flush_handle.take() {
            h.abort();
        }
        if let Err(e) = self.keyboard.release_all_key() {
            warn!(error = %e, "release_all_key failed during teardown");
        }
        if let Err(e) = self.mouse.release_all_button() {
            warn!(error = %e, "release_all_button failed during teardown");
        }
        let _ = self.keyboard.syn();
        let _ = self.mouse.syn();
    }
}
