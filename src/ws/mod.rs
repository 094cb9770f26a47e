pub mod client;
pub mod messages;

pub use client::{connect, interview_url, spawn_heartbeat, spawn_writer, WsSink, WsStream};
pub use messages::{InboundMessage, OutboundMessage};
