use thiserror::Error;

/// Codec and framing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("frame body shorter than its schema requires")]
    ShortBody,

    #[error("non-UTF-8 bytes in field `{field}`")]
    BadEncoding { field: &'static str },

    #[error(
        "handshake mismatch: expected {}, got {}",
        String::from_utf8_lossy(.expected),
        String::from_utf8_lossy(.got)
    )]
    HandshakeMismatch { expected: Vec<u8>, got: Vec<u8> },

    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

/// A device backend failed to inject an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("device error: {0}")]
pub struct DeviceError(pub String);

/// Why the client stopped a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Bye,
    Bad,
    Busy,
    Unknown,
    Incompatible { major: u16, minor: u16 },
}

/// Top-level error for the client connection and its handlers.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    #[error("protocol stop: {0:?}")]
    ProtocolStop(StopReason),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
