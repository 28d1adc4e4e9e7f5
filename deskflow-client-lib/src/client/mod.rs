pub mod connection;
pub mod state;

pub use connection::Client;
pub use state::ClientState;
