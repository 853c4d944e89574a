//! The synchronization engine and the notifications that drive it.

mod event;
mod report;
mod sync_engine;

pub use event::*;
pub use report::*;
pub use sync_engine::*;
