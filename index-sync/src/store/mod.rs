//! Store collaborator abstraction.
//!
//! The engine talks to the document store only through [`IndexStore`],
//! wrapped in a cloneable [`StoreHandle`]. [`InMemoryIndexStore`] is a
//! reference implementation that keeps definitions in memory.

mod index_store;
mod memory;

pub use index_store::*;
pub use memory::*;
