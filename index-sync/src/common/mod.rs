//! Common types shared by the request builder, the store and the engine.
//!
//! - [`Document`] and [`Value`] are the wire-level shapes handed to the store
//! - [`IndexDirection`] encodes the sort order of an indexed field
//! - [`SyncEventBus`] carries mapping notifications to subscribers

mod constants;
mod direction;
mod document;
mod event_bus;
mod value;

pub use constants::*;
pub use direction::*;
pub use document::*;
pub use event_bus::*;
pub use value::*;
