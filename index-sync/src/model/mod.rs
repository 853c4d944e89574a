//! Declarative index model supplied by the mapping layer.
//!
//! An [`EntityDescriptor`] describes one mapped type: its collection, its
//! properties and the compound indexes declared on it. Each
//! [`PropertyDescriptor`] carries at most one [`PropertyIndex`].

mod declaration;
mod entity;

pub use declaration::*;
pub use entity::*;
