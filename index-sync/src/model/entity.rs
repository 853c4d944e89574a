use crate::model::{CompoundIndexDeclaration, GeoIndexDeclaration, SimpleIndexDeclaration};

/// The index kind declared on a single property.
///
/// A property carries at most one index declaration; a simple and a
/// geospatial index on the same field cannot both be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyIndex {
    #[default]
    None,
    Simple(SimpleIndexDeclaration),
    Geo(GeoIndexDeclaration),
}

/// Describes one mapped property of an entity type.
///
/// # Purpose
/// Holds the property's own `name`, the `field_name` it is stored under in the
/// document (the same as `name` unless the mapping layer renamed it) and the
/// index declared on it.
///
/// # Usage
/// ```rust
/// use index_sync::model::{PropertyDescriptor, PropertyIndex, SimpleIndexDeclaration};
///
/// let email = PropertyDescriptor::new("email")
///     .indexed(SimpleIndexDeclaration::new().with_unique(true).with_sparse(true));
/// assert_eq!(email.field_name(), "email");
/// assert!(matches!(email.index(), PropertyIndex::Simple(_)));
///
/// let zip = PropertyDescriptor::new("zip_code").with_field_name("zip");
/// assert_eq!(zip.name(), "zip_code");
/// assert_eq!(zip.field_name(), "zip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    field_name: String,
    index: PropertyIndex,
}

impl PropertyDescriptor {
    pub fn new(name: &str) -> Self {
        PropertyDescriptor {
            name: name.to_string(),
            field_name: name.to_string(),
            index: PropertyIndex::None,
        }
    }

    /// Sets the document field the property is stored under.
    pub fn with_field_name(mut self, field_name: &str) -> Self {
        self.field_name = field_name.to_string();
        self
    }

    pub fn with_index(mut self, index: PropertyIndex) -> Self {
        self.index = index;
        self
    }

    /// Declares a single-field index, replacing any previous declaration.
    pub fn indexed(self, declaration: SimpleIndexDeclaration) -> Self {
        self.with_index(PropertyIndex::Simple(declaration))
    }

    /// Declares a geospatial index, replacing any previous declaration.
    pub fn geo_indexed(self, declaration: GeoIndexDeclaration) -> Self {
        self.with_index(PropertyIndex::Geo(declaration))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn index(&self) -> &PropertyIndex {
        &self.index
    }
}

/// Read-only description of a mapped entity type.
///
/// # Purpose
/// The output contract of the mapping layer: a stable type identifier, the
/// collection documents of this type live in, the ordered list of properties
/// and the compound indexes declared on the type itself.
///
/// # Characteristics
/// - **Immutable**: built once through the consuming `with_*` methods and only
///   read afterwards
/// - **Default collection**: derived from the last segment of the type id with
///   its first letter lowercased (`app::model::UserAccount` →
///   `userAccount`) unless set explicitly
///
/// # Usage
/// ```rust
/// use index_sync::model::{EntityDescriptor, PropertyDescriptor};
///
/// let user = EntityDescriptor::new("app::model::User")
///     .with_property(PropertyDescriptor::new("id"));
/// assert_eq!(user.collection(), "user");
///
/// let user = user.with_collection("users");
/// assert_eq!(user.collection(), "users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    type_id: String,
    collection: String,
    properties: Vec<PropertyDescriptor>,
    compound_indexes: Vec<CompoundIndexDeclaration>,
}

impl EntityDescriptor {
    pub fn new(type_id: &str) -> Self {
        EntityDescriptor {
            type_id: type_id.to_string(),
            collection: default_collection_name(type_id),
            properties: Vec::new(),
            compound_indexes: Vec::new(),
        }
    }

    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = collection.to_string();
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_compound_index(mut self, index: CompoundIndexDeclaration) -> Self {
        self.compound_indexes.push(index);
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn compound_indexes(&self) -> &[CompoundIndexDeclaration] {
        &self.compound_indexes
    }

    /// Number of index declarations on this type, over all kinds.
    pub fn declared_index_count(&self) -> usize {
        self.compound_indexes.len()
            + self
                .properties
                .iter()
                .filter(|p| !matches!(p.index(), PropertyIndex::None))
                .count()
    }
}

fn default_collection_name(type_id: &str) -> String {
    let simple_name = type_id
        .rsplit(|c: char| c == ':' || c == '.')
        .next()
        .unwrap_or(type_id);

    let mut chars = simple_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
