//! Dispatcher (component C6): a single-consumer queue plus the one worker
//! task that owns every handler invocation. Grounded on the shutdown-watch
//! pattern in `huginn-proxy-lib/src/tcp/handler.rs`, adapted from an accept
//! loop to a message-processing loop.

use std::collections::HashMap;
use std::sync::OnceLock;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::error::StopReason;
use crate::handlers::{self, Handlers};
use crate::wire::AnyMessage;

/// What travels through the dispatcher queue: a wire message, or a
/// self-scheduled flush tick for the `DMMV` smoother (§4.7). Keeping the
/// flush on the same queue as ordinary messages is what lets the single
/// worker invariant (§4.6) cover it too — a flush is never reordered
/// against the messages around it.
#[derive(Debug)]
pub enum DispatchItem {
    Wire(AnyMessage),
    Flush,
}

/// Non-blocking producer handle for the dispatcher queue. Cloned freely —
/// `submit` never reorders because the single channel preserves FIFO order
/// regardless of how many producers feed it.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<DispatchItem>,
}

impl Dispatcher {
    pub fn new(tx: mpsc::UnboundedSender<DispatchItem>) -> Self {
        Self { tx }
    }

    /// Enqueues a parsed message from the read loop. Never blocks.
    pub fn submit(&self, msg: AnyMessage) {
        let _ = self.tx.send(DispatchItem::Wire(msg));
    }
}

type HandlerFn = fn(&mut Handlers, AnyMessage) -> Option<StopReason>;

fn handler_table() -> &'static HashMap<[u8; 4], HandlerFn> {
    static TABLE: OnceLock<HashMap<[u8; 4], HandlerFn>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m: HashMap<[u8; 4], HandlerFn> = HashMap::new();
        m.insert(*b"CINN", handlers::lifecycle::handle_cinn);
        m.insert(*b"COUT", handlers::lifecycle::handle_cout);
        m.insert(*b"CALV", handlers::lifecycle::handle_calv);
        m.insert(*b"CBYE", handlers::lifecycle::handle_cbye);
        m.insert(*b"EBAD", handlers::lifecycle::handle_ebad);
        m.insert(*b"EBSY", handlers::lifecycle::handle_ebsy);
        m.insert(*b"EUNK", handlers::lifecycle::handle_eunk);
        m.insert(*b"EICV", handlers::lifecycle::handle_eicv);
        m.insert(*b"QINF", handlers::lifecycle::handle_qinf);
        m.insert(*b"DINF", handlers::lifecycle::handle_dinf);
        m.insert(*b"DKDN", handlers::keyboard::handle_dkdn);
        m.insert(*b"DKDL", handlers::keyboard::handle_dkdl);
        m.insert(*b"DKRP", handlers::keyboard::handle_dkrp);
        m.insert(*b"DKUP", handlers::keyboard::handle_dkup);
        m.insert(*b"DMDN", handlers::mouse::handle_dmdn);
        m.insert(*b"DMUP", handlers::mouse::handle_dmup);
        m.insert(*b"DMMV", handlers::mouse::handle_dmmv);
        m.insert(*b"DMRM", handlers::mouse::handle_dmrm);
        m.insert(*b"DMWM", handlers::mouse::handle_dmwm);
        m.insert(*b"DCLP", handlers::opaque::handle_dclp);
        m.insert(*b"DDRG", handlers::opaque::handle_ddrg);
        m.insert(*b"DFTR", handlers::opaque::handle_dftr);
        m.insert(*b"LSYN", handlers::opaque::handle_lsyn);
        m.insert(*b"SECN", handlers::opaque::handle_secn);
        m.insert(*b"DSOP", handlers::opaque::handle_dsop);
        m.insert(*b"CCLP", handlers::opaque::handle_cclp);
        m.insert(*b"CROP", handlers::opaque::handle_crop);
        m.insert(*b"CNOP", handlers::opaque::handle_cnop);
        m.insert(*b"CSEC", handlers::opaque::handle_csec);
        m
    })
}

/// Default handler for a code with no entry: logs and drops.
fn default_handler(msg: &AnyMessage) {
    warn!(code = %String::from_utf8_lossy(&msg.code()), "no handler for this code; dropping");
}

fn dispatch_wire(handlers: &mut Handlers, msg: AnyMessage) -> Option<StopReason> {
    if let AnyMessage::Unknown { code, .. } = &msg {
        warn!(code = %String::from_utf8_lossy(code), "unrecognized code; dropping");
        return None;
    }
    match handler_table().get(&msg.code()) {
        Some(f) => f(handlers, msg),
        None => {
            default_handler(&msg);
            None
        }
    }
}

/// Runs the single dispatcher worker until the queue closes or a handler
/// requests a stop. `shutdown` is signalled both ways: the worker sends on
/// it when a handler demands a stop, and the reader loop sends on it on
/// I/O failure, each side holding its own `Receiver` to notice the other.
/// Returns the handler-requested [`StopReason`], if any, so the caller can
/// turn a fatal protocol stop into an error (§7).
pub async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<DispatchItem>,
    mut handlers: Handlers,
    shutdown: watch::Sender<bool>,
    mut reader_shutdown: watch::Receiver<bool>,
) -> Option<StopReason> {
    let mut stop_reason = None;
    loop {
        tokio::select! {
            item = rx.recv() => {
                match item {
                    Some(DispatchItem::Wire(msg)) => {
                        if let Some(reason) = dispatch_wire(&mut handlers, msg) {
                            info!(?reason, "stopping on protocol message");
                            stop_reason = Some(reason);
                            let _ = shutdown.send(true);
                            break;
                        }
                    }
                    Some(DispatchItem::Flush) => handlers.flush_pending_move(),
                    None => break,
                }
            }
            changed = reader_shutdown.changed() => {
                if changed.is_ok() && *reader_shutdown.borrow() {
                    break;
                }
            }
        }
    }
    handlers.teardown();
    stop_reason
}
