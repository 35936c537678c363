//! Typed pipeline events: payloads, handler trait, dispatcher.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::HarkEventHandler;
pub use types::*;
