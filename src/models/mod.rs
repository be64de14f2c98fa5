//! Data models for contact messages

mod collection;
mod message;

pub use collection::*;
pub use message::*;
