use crate::common::Document;
use std::fmt::{Display, Formatter};

/// A request to ensure a regular (single-field or compound) index.
///
/// Built per submission and dropped after the store call. `keys` is the
/// ordered key document and `options` always holds exactly the keys `name`,
/// `dropDups`, `sparse` and `unique`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    collection: String,
    keys: Document,
    options: Document,
}

impl IndexRequest {
    pub fn new(collection: &str, keys: Document, options: Document) -> Self {
        IndexRequest {
            collection: collection.to_string(),
            keys,
            options,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn keys(&self) -> &Document {
        &self.keys
    }

    pub fn options(&self) -> &Document {
        &self.options
    }
}

impl Display for IndexRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.ensureIndex({}, {})", self.collection, self.keys, self.options)
    }
}

/// A request to ensure a 2D geospatial index.
///
/// Unlike [IndexRequest] the options carry `name`, `min` and `max`, and the
/// request is handed to the store as one unit against its target collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoIndexRequest {
    keys: Document,
    options: Document,
}

impl GeoIndexRequest {
    pub fn new(keys: Document, options: Document) -> Self {
        GeoIndexRequest { keys, options }
    }

    pub fn keys(&self) -> &Document {
        &self.keys
    }

    pub fn options(&self) -> &Document {
        &self.options
    }
}

impl Display for GeoIndexRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GeospatialIndex({}, {})", self.keys, self.options)
    }
}
