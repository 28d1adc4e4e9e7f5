//! Client connection (component C5): TCP endpoint, handshake, read loop,
//! write queue, and the task layout that ties the reader to the dispatcher
//! worker (C6) and the serializing writer. Grounded on the accept-loop /
//! shutdown-watch shape of `huginn-proxy-lib/src/tcp/handler.rs`, rebuilt
//! around one outbound connection instead of many inbound ones.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::config::Config;
use crate::device::{DeviceContext, KeyboardDevice, MouseDevice};
use crate::dispatcher::{self, Dispatcher};
use crate::error::{ClientError, Result, StopReason};
use crate::handlers::Handlers;
use crate::parser::StreamParser;
use crate::wire::{self, messages::HelloMsg, messages::HelloBackMsg};

const READ_BUF_SIZE: usize = 4096;

/// Owns nothing across the lifetime of a connection beyond its
/// configuration; every piece of live state (socket halves, parser,
/// handler state) is local to [`Client::run`] or handed off to the tasks
/// it spawns.
pub struct Client {
    config: Arc<Config>,
}

impl Client {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Connects, performs the handshake, then runs the reader/dispatcher/
    /// writer pipeline until a terminal message, a cancellation, or an I/O
    /// error ends the run. Never reconnects (non-goal, §1).
    pub async fn run(
        self,
        ctx: Box<dyn DeviceContext>,
        mouse: Box<dyn MouseDevice>,
        keyboard: Box<dyn KeyboardDevice>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<()> {
        let addr = format!("{}:{}", self.config.server, self.config.port);
        info!(%addr, "connecting");
        let stream = TcpStream::connect(&addr).await?;
        info!(%addr, "tcp connected, awaiting handshake");

        let (mut read_half, mut write_half) = tokio::io::split(stream);
        let mut parser = StreamParser::new();

        let hello = read_hello(&mut read_half, &mut parser).await?;
        info!(major = hello.major, minor = hello.minor, "hello received");

        let hello_back = HelloBackMsg {
            protocol_name: "Synergy".into(),
            major: hello.major,
            minor: hello.minor,
            name: self.config.client_name.clone(),
        };
        write_half.write_all(&wire::pack_for_socket(&hello_back)).await?;
        info!(client_name = %self.config.client_name, "hello-back sent, connected");

        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<dispatcher::DispatchItem>();
        let (shutdown_tx, shutdown_rx_worker) = watch::channel(false);
        let shutdown_rx_reader = shutdown_tx.subscribe();

        let writer_task = tokio::spawn(async move {
            while let Some(frame) = write_rx.recv().await {
                if let Err(e) = write_half.write_all(&frame).await {
                    warn!(error = %e, "write failed, closing writer");
                    break;
                }
            }
        });

        let handlers = Handlers::new(
            self.config.clone(),
            ctx,
            mouse,
            keyboard,
            write_tx.clone(),
            queue_tx.clone(),
        );
        let worker_task = tokio::spawn(dispatcher::run_worker(
            queue_rx,
            handlers,
            shutdown_tx.clone(),
            shutdown_rx_worker,
        ));

        let dispatch = Dispatcher::new(queue_tx.clone());
        let read_result = read_loop(read_half, parser, &dispatch, shutdown_rx_reader, &mut cancel).await;

        let _ = shutdown_tx.send(true);
        drop(write_tx);
        drop(queue_tx);
        let worker_stop = worker_task.await.ok().flatten();
        let _ = writer_task.await;

        // A handler-requested stop is the definitive reason the connection
        // ended; `Bye` is a clean shutdown, every other reason is fatal
        // (§7). Otherwise fall back to whatever the read loop itself saw
        // (EOF, cancellation, or an I/O error).
        match worker_stop {
            Some(StopReason::Bye) | None => read_result,
            Some(reason) => Err(ClientError::ProtocolStop(reason)),
        }
    }
}

async fn read_hello(
    read_half: &mut (impl AsyncRead + Unpin),
    parser: &mut StreamParser,
) -> Result<HelloMsg> {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = read_half.read(&mut buf).await?;
        if n == 0 {
            return Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed during handshake",
            )));
        }
        parser.feed(&buf[..n]);
        if let Some(hello) = parser.next_handshake_msg::<HelloMsg>(b"Synergy")? {
            return Ok(hello);
        }
    }
}

/// Reads from the socket, feeds the parser, and submits every complete
/// message onto the dispatcher. Stops on EOF, an I/O error, or a
/// cancellation/shutdown signal, whichever comes first.
async fn read_loop(
    mut read_half: impl AsyncRead + Unpin,
    mut parser: StreamParser,
    dispatch: &Dispatcher,
    mut shutdown: watch::Receiver<bool>,
    cancel: &mut watch::Receiver<bool>,
) -> Result<()> {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_ok() && *shutdown.borrow() {
                    return Ok(());
                }
            }
            changed = cancel.changed() => {
                if changed.is_ok() && *cancel.borrow() {
                    info!("cancellation requested, stopping read loop");
                    return Ok(());
                }
            }
            read = read_half.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    info!("connection closed by peer");
                    return Ok(());
                }
                parser.feed(&buf[..n]);
                while let Some(msg) = parser.next_msg()? {
                    dispatch.submit(msg);
                }
            }
        }
    }
}
