use crate::common::IndexDirection;
use std::fmt::{Display, Formatter};

/// Default lower bound of a geospatial index.
pub const GEO_DEFAULT_MIN: i32 = -180;
/// Default upper bound of a geospatial index.
pub const GEO_DEFAULT_MAX: i32 = 180;

/// Common view over the three declaration kinds.
///
/// Name and collection overrides resolve the same way for every kind, so the
/// request builder works against this trait rather than each struct.
pub trait IndexDeclaration {
    /// The explicit index name, `None` when absent or blank.
    fn declared_name(&self) -> Option<&str>;

    /// The explicit target collection, `None` when absent or blank.
    fn declared_collection(&self) -> Option<&str>;
}

macro_rules! impl_index_declaration {
    ($($declaration:ty),*) => {
        $(
            impl IndexDeclaration for $declaration {
                fn declared_name(&self) -> Option<&str> {
                    self.name()
                }

                fn declared_collection(&self) -> Option<&str> {
                    self.collection()
                }
            }
        )*
    };
}

impl_index_declaration!(SimpleIndexDeclaration, CompoundIndexDeclaration, GeoIndexDeclaration);

/// Returns the text if it holds anything other than whitespace.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|text| !text.trim().is_empty())
}

/// Declares an index over a single property.
///
/// # Purpose
/// Captures what the mapping layer declared for one field: an optional index
/// name, the sort direction, the uniqueness flags and an optional target
/// collection. Nothing is resolved here; blank names and collections fall back
/// to the property's field name and the entity's collection when the request
/// is built.
///
/// # Usage
/// ```rust
/// use index_sync::common::IndexDirection;
/// use index_sync::model::SimpleIndexDeclaration;
///
/// let email = SimpleIndexDeclaration::new()
///     .with_unique(true)
///     .with_sparse(true);
/// assert!(email.is_unique());
/// assert_eq!(email.direction(), IndexDirection::Ascending);
/// assert!(email.name().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleIndexDeclaration {
    name: Option<String>,
    direction: IndexDirection,
    unique: bool,
    drop_duplicates: bool,
    sparse: bool,
    collection: Option<String>,
}

impl SimpleIndexDeclaration {
    /// Creates an ascending, non-unique, non-sparse declaration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_direction(mut self, direction: IndexDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_drop_duplicates(mut self, drop_duplicates: bool) -> Self {
        self.drop_duplicates = drop_duplicates;
        self
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    /// Returns the explicit index name, if one was declared and is not blank.
    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn direction(&self) -> IndexDirection {
        self.direction
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_drop_duplicates(&self) -> bool {
        self.drop_duplicates
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    /// Returns the explicit target collection, if one was declared and is not blank.
    pub fn collection(&self) -> Option<&str> {
        non_blank(&self.collection)
    }
}

impl Display for SimpleIndexDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Indexed(name={}, direction={}, unique={}, dropDups={}, sparse={}, collection={})",
            self.name().unwrap_or(""),
            self.direction,
            self.unique,
            self.drop_duplicates,
            self.sparse,
            self.collection().unwrap_or("")
        )
    }
}

/// Declares an index over several fields, attached to the entity type.
///
/// The key definition is kept as the raw serialized document the mapping layer
/// supplied (for example `{"last_name": 1, "age": -1}`); it is parsed only
/// when the request is built so that one malformed definition cannot affect
/// any other declaration. A definition may also be a plain list of field names,
/// in which case every field takes the declaration's direction.
///
/// # Usage
/// ```rust
/// use index_sync::model::CompoundIndexDeclaration;
///
/// let by_name = CompoundIndexDeclaration::new(r#"{"last_name": 1, "first_name": 1}"#)
///     .with_name("by_name")
///     .with_unique(true);
/// assert_eq!(by_name.name(), Some("by_name"));
/// assert_eq!(by_name.definition(), r#"{"last_name": 1, "first_name": 1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundIndexDeclaration {
    name: Option<String>,
    definition: String,
    direction: IndexDirection,
    unique: bool,
    drop_duplicates: bool,
    sparse: bool,
    collection: Option<String>,
}

impl CompoundIndexDeclaration {
    /// Creates a declaration from a raw key definition.
    pub fn new(definition: &str) -> Self {
        CompoundIndexDeclaration {
            name: None,
            definition: definition.to_string(),
            direction: IndexDirection::default(),
            unique: false,
            drop_duplicates: false,
            sparse: false,
            collection: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the direction applied when the key definition lists bare field
    /// names (`["a", "b"]`) instead of a key document.
    pub fn with_direction(mut self, direction: IndexDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_drop_duplicates(mut self, drop_duplicates: bool) -> Self {
        self.drop_duplicates = drop_duplicates;
        self
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn direction(&self) -> IndexDirection {
        self.direction
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_drop_duplicates(&self) -> bool {
        self.drop_duplicates
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    pub fn collection(&self) -> Option<&str> {
        non_blank(&self.collection)
    }
}

impl Display for CompoundIndexDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompoundIndex(name={}, def={}, unique={}, dropDups={}, sparse={}, collection={})",
            self.name().unwrap_or(""),
            self.definition,
            self.unique,
            self.drop_duplicates,
            self.sparse,
            self.collection().unwrap_or("")
        )
    }
}

/// Declares a 2D geospatial index over a single coordinate property.
///
/// # Usage
/// ```rust
/// use index_sync::model::GeoIndexDeclaration;
///
/// let location = GeoIndexDeclaration::new();
/// assert_eq!((location.min(), location.max()), (-180, 180));
///
/// let grid = GeoIndexDeclaration::new().with_bounds(0, 1000).with_name("grid");
/// assert_eq!(grid.name(), Some("grid"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoIndexDeclaration {
    name: Option<String>,
    min: i32,
    max: i32,
    collection: Option<String>,
}

impl Default for GeoIndexDeclaration {
    fn default() -> Self {
        GeoIndexDeclaration {
            name: None,
            min: GEO_DEFAULT_MIN,
            max: GEO_DEFAULT_MAX,
            collection: None,
        }
    }
}

impl GeoIndexDeclaration {
    /// Creates a declaration with the default bounds of `-180..180`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_bounds(mut self, min: i32, max: i32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn collection(&self) -> Option<&str> {
        non_blank(&self.collection)
    }
}

impl Display for GeoIndexDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GeoSpatialIndexed(name={}, min={}, max={}, collection={})",
            self.name().unwrap_or(""),
            self.min,
            self.max,
            self.collection().unwrap_or("")
        )
    }
}
