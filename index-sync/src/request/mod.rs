//! Index request construction.
//!
//! Declarations are resolved against their entity and property and turned into
//! the documents the store expects:
//!
//! - key document: `{<field>: 1 | -1}`, a parsed compound definition, or
//!   `{<field>: "2d"}` for geospatial indexes
//! - options document: `{name, dropDups, sparse, unique}`, or
//!   `{name, min, max}` for geospatial indexes

mod advisory;
mod index_request;
mod request_builder;

pub use advisory::*;
pub use index_request::*;
pub use request_builder::*;
