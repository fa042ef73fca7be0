pub mod constants;
pub mod error;
pub mod host;
pub mod message;
pub mod types;

pub use constants::*;
pub use error::CertIdError;
pub use host::{BlockContext, Event, EventSink, VecEventSink};
pub use message::{Action, Message};
pub use types::{Addr, Height, Timestamp, Uid};
