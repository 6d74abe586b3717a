//! Runtime infrastructure - session, port relay and the Tokio runtime bridge

mod bridge;
mod relay;
mod session;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand};
pub use relay::PortRelay;
pub use session::{Session, SessionSettings};
pub use worker::{run_async_worker, run_relay};
