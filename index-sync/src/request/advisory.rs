use std::fmt::{Display, Formatter};

/// Non-fatal warning raised for a unique, non-sparse index whose explicit
/// name differs from the property name.
///
/// The store rejects a document that omits the indexed field once another
/// document already stores `null` for it, unless the index is sparse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingAdvisory {
    type_id: String,
    property: String,
    index_name: String,
}

impl NamingAdvisory {
    pub fn new(type_id: &str, property: &str, index_name: &str) -> Self {
        NamingAdvisory {
            type_id: type_id.to_string(),
            property: property.to_string(),
            index_name: index_name.to_string(),
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}

impl Display for NamingAdvisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The index name {} doesn't match the property name {} on {}. \
             Setting sparse=true on this index will prevent errors when inserting documents.",
            self.index_name, self.property, self.type_id
        )
    }
}
