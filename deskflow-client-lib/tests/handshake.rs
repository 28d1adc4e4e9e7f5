//! End-to-end scenarios against a loopback fake server, grounded on
//! `huginn-proxy-lib`'s `tcp_basic.rs` pattern (`pick_free_port` +
//! `tokio::spawn`ed accept loop + a plain `TcpStream` on the other end).

use std::collections::HashSet;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use deskflow_client_lib::config::Config;
use deskflow_client_lib::device::{DeviceContext, KeyboardDevice, MouseDevice};
use deskflow_client_lib::error::{ClientError, DeviceError, StopReason};
use deskflow_client_lib::keymap::EvdevCode;
use deskflow_client_lib::wire::messages::{
    CbyeMsg, CinnMsg, DinfMsg, DkdnMsg, DkupMsg, EbadMsg, EbsyMsg, EicvMsg, EunkMsg, HelloBackMsg, HelloMsg, QinfMsg,
};
use deskflow_client_lib::wire;
use deskflow_client_lib::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn pick_free_port() -> TestResult<SocketAddr> {
    let listener = StdTcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

fn make_config(addr: SocketAddr) -> Arc<Config> {
    Arc::new(Config {
        server: addr.ip().to_string(),
        port: addr.port(),
        client_name: "Pynergy".into(),
        screen_width: 1920,
        screen_height: 1080,
        abs_mouse_move: true,
        mouse_move_threshold: 16,
        mouse_pos_sync_freq: 30,
    })
}

/// Records every call so scenario assertions can inspect ordering and
/// arguments without a concrete backend.
#[derive(Default)]
struct RecordingDevices {
    trace: Arc<Mutex<Vec<String>>>,
}

struct TraceContext {
    trace: Arc<Mutex<Vec<String>>>,
    screen: (u32, u32),
    pos: Option<(i32, i32)>,
}

impl DeviceContext for TraceContext {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }
    fn logical_pos(&self) -> Option<(i32, i32)> {
        self.pos
    }
    fn update_screen_info(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
    fn sync_logical_to_real(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
    fn calculate_relative_move(&mut self, x: i32, y: i32) -> (i32, i32) {
        let prev = self.pos.replace((x, y));
        match prev {
            Some((px, py)) => (x - px, y - py),
            None => (0, 0),
        }
    }
}

struct TraceMouse {
    trace: Arc<Mutex<Vec<String>>>,
}

impl MouseDevice for TraceMouse {
    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push(format!("mouse.move_absolute({x},{y})"));
        Ok(())
    }
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push(format!("mouse.move_relative({dx},{dy})"));
        Ok(())
    }
    fn send_button(&mut self, code: EvdevCode, pressed: bool) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push(format!("mouse.send_button({code},{pressed})"));
        Ok(())
    }
    fn wheel_relative(&mut self, clicks: i32) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push(format!("mouse.wheel_relative({clicks})"));
        Ok(())
    }
    fn release_all_button(&mut self) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push("mouse.release_all_button".into());
        Ok(())
    }
    fn syn(&mut self) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push("mouse.syn".into());
        Ok(())
    }
}

struct TraceKeyboard {
    trace: Arc<Mutex<Vec<String>>>,
    pressed: HashSet<EvdevCode>,
}

impl KeyboardDevice for TraceKeyboard {
    fn send_key(&mut self, code: EvdevCode, pressed: bool) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push(format!("keyboard.send_key({code},{pressed})"));
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
        Ok(())
    }
    fn sync_modifiers(&mut self, mask: u16) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push(format!("keyboard.sync_modifiers({mask})"));
        Ok(())
    }
    fn release_all_key(&mut self) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push("keyboard.release_all_key".into());
        self.pressed.clear();
        Ok(())
    }
    fn syn(&mut self) -> Result<(), DeviceError> {
        self.trace.lock().unwrap().push("keyboard.syn".into());
        Ok(())
    }
    fn pressed_keys(&self) -> &HashSet<EvdevCode> {
        &self.pressed
    }
}

impl RecordingDevices {
    fn build(self, screen: (u32, u32)) -> (Box<dyn DeviceContext>, Box<dyn MouseDevice>, Box<dyn KeyboardDevice>) {
        (
            Box::new(TraceContext { trace: self.trace.clone(), screen, pos: None }),
            Box::new(TraceMouse { trace: self.trace.clone() }),
            Box::new(TraceKeyboard { trace: self.trace.clone(), pressed: HashSet::new() }),
        )
    }
}

/// Reads one length-prefixed frame off `sock` and returns its raw body
/// (code + fields, length prefix stripped).
async fn read_frame(sock: &mut TcpStream) -> TestResult<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    sock.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut body = vec![0u8; len];
    sock.read_exact(&mut body).await?;
    Ok(body)
}

#[tokio::test]
async fn scenario_one_hello_back_echoes_version_and_states_client_name() -> TestResult<()> {
    let addr = pick_free_port()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let cfg = make_config(addr);

    let client_task = tokio::spawn({
        let cfg = cfg.clone();
        async move {
            let devices = RecordingDevices::default();
            let (ctx, mouse, keyboard) = devices.build((1920, 1080));
            let (_tx, rx) = watch::channel(false);
            Client::new(cfg).run(ctx, mouse, keyboard, rx).await
        }
    });

    let (mut sock, _) = listener.accept().await?;
    sock.write_all(&wire::pack_for_socket(&HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 }))
        .await?;

    let body = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;
    let reply: HelloBackMsg = wire::unpack(&body)?;
    assert_eq!(reply.major, 1);
    assert_eq!(reply.minor, 6);
    assert_eq!(reply.name, "Pynergy");

    drop(sock);
    let _ = timeout(Duration::from_secs(2), client_task).await;
    Ok(())
}

#[tokio::test]
async fn scenario_two_enter_then_key_press_reaches_the_keyboard_device() -> TestResult<()> {
    let addr = pick_free_port()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let cfg = make_config(addr);
    let devices = RecordingDevices::default();
    let trace = devices.trace.clone();
    let (ctx, mouse, keyboard) = devices.build((1920, 1080));

    let client_task = tokio::spawn({
        let cfg = cfg.clone();
        async move {
            let (_tx, rx) = watch::channel(false);
            Client::new(cfg).run(ctx, mouse, keyboard, rx).await
        }
    });

    let (mut sock, _) = listener.accept().await?;
    sock.write_all(&wire::pack_for_socket(&HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 }))
        .await?;
    let _ = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;

    sock.write_all(&wire::pack_for_socket(&CinnMsg { entry_x: 10, entry_y: 20, sequence: 1, mod_mask: 0 }))
        .await?;
    // key_id 97 ('a'), key_button carries the same id here for simplicity.
    sock.write_all(&wire::pack_for_socket(&DkdnMsg { key_id: 97, mod_mask: 0, key_button: 97 })).await?;
    sock.write_all(&wire::pack_for_socket(&DkupMsg { key_id: 97, mod_mask: 0, repeat_count: 1, key_button: 97 }))
        .await?;

    // Give the dispatcher worker a moment to drain all three messages.
    tokio::time::sleep(Duration::from_millis(100)).await;
    {
        let trace = trace.lock().unwrap();
        // Full device trace: screen entry moves the mouse and syncs modifiers,
        // then the key press/release cycle, each step committed on *both*
        // devices regardless of which one it mutated (§4.7).
        let expected: &[&str] = &[
            "mouse.move_absolute(10,20)",
            "keyboard.sync_modifiers(0)",
            "mouse.syn",
            "keyboard.syn",
            "keyboard.send_key(30,true)",
            "keyboard.syn",
            "mouse.syn",
            "keyboard.send_key(30,false)",
            "keyboard.syn",
            "mouse.syn",
        ];
        assert_eq!(trace.as_slice(), expected, "trace: {trace:?}");
    }

    drop(sock);
    let _ = timeout(Duration::from_secs(2), client_task).await;
    Ok(())
}

#[tokio::test]
async fn scenario_three_calv_keepalive_is_echoed_back() -> TestResult<()> {
    use deskflow_client_lib::wire::messages::CalvMsg;

    let addr = pick_free_port()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let cfg = make_config(addr);

    let client_task = tokio::spawn({
        let cfg = cfg.clone();
        async move {
            let devices = RecordingDevices::default();
            let (ctx, mouse, keyboard) = devices.build((1920, 1080));
            let (_tx, rx) = watch::channel(false);
            Client::new(cfg).run(ctx, mouse, keyboard, rx).await
        }
    });

    let (mut sock, _) = listener.accept().await?;
    sock.write_all(&wire::pack_for_socket(&HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 }))
        .await?;
    let _ = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;

    sock.write_all(&wire::pack_for_socket(&CalvMsg {})).await?;
    let body = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;
    assert_eq!(&body[..4], b"CALV");

    drop(sock);
    let _ = timeout(Duration::from_secs(2), client_task).await;
    Ok(())
}

#[tokio::test]
async fn scenario_four_qinf_gets_a_dinf_reply_with_configured_screen_size() -> TestResult<()> {
    let addr = pick_free_port()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let cfg = make_config(addr);

    let client_task = tokio::spawn({
        let cfg = cfg.clone();
        async move {
            let devices = RecordingDevices::default();
            let (ctx, mouse, keyboard) = devices.build((1920, 1080));
            let (_tx, rx) = watch::channel(false);
            Client::new(cfg).run(ctx, mouse, keyboard, rx).await
        }
    });

    let (mut sock, _) = listener.accept().await?;
    sock.write_all(&wire::pack_for_socket(&HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 }))
        .await?;
    let _ = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;

    sock.write_all(&wire::pack_for_socket(&QinfMsg {})).await?;
    let body = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;
    assert_eq!(&body[..4], b"DINF");
    let reply: DinfMsg = wire::unpack(&body[4..])?;
    assert_eq!(reply.width, 1920);
    assert_eq!(reply.height, 1080);

    drop(sock);
    let _ = timeout(Duration::from_secs(2), client_task).await;
    Ok(())
}

/// Completes the handshake, writes `msg_frame` onto the wire, then waits for
/// `Client::run` to return and reports its result. Used by the stop-reason
/// tests below, where the interesting assertion is on the `Result` itself
/// rather than on device calls.
async fn run_until_stop(msg_frame: Vec<u8>) -> TestResult<Result<(), ClientError>> {
    let addr = pick_free_port()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let cfg = make_config(addr);
    let devices = RecordingDevices::default();
    let (ctx, mouse, keyboard) = devices.build((1920, 1080));

    let client_task = tokio::spawn({
        let cfg = cfg.clone();
        async move {
            let (_tx, rx) = watch::channel(false);
            Client::new(cfg).run(ctx, mouse, keyboard, rx).await
        }
    });

    let (mut sock, _) = listener.accept().await?;
    sock.write_all(&wire::pack_for_socket(&HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 }))
        .await?;
    let _ = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;

    sock.write_all(&msg_frame).await?;

    let result = timeout(Duration::from_secs(2), client_task).await??;
    drop(sock);
    Ok(result)
}

#[tokio::test]
async fn cbye_yields_a_clean_shutdown() -> TestResult<()> {
    let result = run_until_stop(wire::pack_for_socket(&CbyeMsg {})).await?;
    assert!(result.is_ok(), "expected clean shutdown, got {result:?}");
    Ok(())
}

#[tokio::test]
async fn ebad_is_a_fatal_protocol_stop() -> TestResult<()> {
    let result = run_until_stop(wire::pack_for_socket(&EbadMsg {})).await?;
    assert!(matches!(result, Err(ClientError::ProtocolStop(StopReason::Bad))), "got {result:?}");
    Ok(())
}

#[tokio::test]
async fn ebsy_is_a_fatal_protocol_stop() -> TestResult<()> {
    let result = run_until_stop(wire::pack_for_socket(&EbsyMsg {})).await?;
    assert!(matches!(result, Err(ClientError::ProtocolStop(StopReason::Busy))), "got {result:?}");
    Ok(())
}

#[tokio::test]
async fn eunk_is_a_fatal_protocol_stop() -> TestResult<()> {
    let result = run_until_stop(wire::pack_for_socket(&EunkMsg {})).await?;
    assert!(matches!(result, Err(ClientError::ProtocolStop(StopReason::Unknown))), "got {result:?}");
    Ok(())
}

#[tokio::test]
async fn eicv_is_a_fatal_protocol_stop_carrying_the_offered_version() -> TestResult<()> {
    let result = run_until_stop(wire::pack_for_socket(&EicvMsg { major: 1, minor: 2 })).await?;
    match result {
        Err(ClientError::ProtocolStop(StopReason::Incompatible { major, minor })) => {
            assert_eq!((major, minor), (1, 2));
        }
        other => panic!("got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn scenario_six_byte_at_a_time_handshake_still_completes() -> TestResult<()> {
    let addr = pick_free_port()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let cfg = make_config(addr);

    let client_task = tokio::spawn({
        let cfg = cfg.clone();
        async move {
            let devices = RecordingDevices::default();
            let (ctx, mouse, keyboard) = devices.build((1920, 1080));
            let (_tx, rx) = watch::channel(false);
            Client::new(cfg).run(ctx, mouse, keyboard, rx).await
        }
    });

    let (mut sock, _) = listener.accept().await?;
    let frame = wire::pack_for_socket(&HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 });
    for b in &frame {
        sock.write_all(std::slice::from_ref(b)).await?;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let body = timeout(Duration::from_secs(2), read_frame(&mut sock)).await??;
    let reply: HelloBackMsg = wire::unpack(&body)?;
    assert_eq!(reply.name, "Pynergy");

    drop(sock);
    let _ = timeout(Duration::from_secs(2), client_task).await;
    Ok(())
}
