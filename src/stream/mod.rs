//! Progress stream: wire messages, event sources, and the live subscriber
//!
//! The stream half of the protocol. [`message`] defines the tagged wire
//! taxonomy, [`source`] the injectable [`ProgressEventSource`] seam with a
//! scripted implementation, and [`subscriber`] the live WebSocket source.

pub mod message;
pub mod source;
pub mod subscriber;

pub use message::{ClientMessage, ServerMessage, StagePayload};
pub use source::{
    ProgressEvent, ProgressEventSource, ScriptedSource, ScriptedStep, StageUpdate, StreamItem,
    Subscription,
};
pub use subscriber::WebSocketSource;
