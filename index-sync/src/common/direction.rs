use std::fmt::{Display, Formatter};

/// Specifies the sort direction of an indexed field.
///
/// # Purpose
/// Declares whether the store should keep index entries for a field in
/// ascending or descending order. On the wire the direction is encoded as `1`
/// or `-1` in the index key document.
///
/// # Variants
/// - `Ascending`: encoded as `1`
/// - `Descending`: encoded as `-1`
///
/// # Usage
/// ```rust
/// use index_sync::common::IndexDirection;
///
/// assert_eq!(IndexDirection::Ascending.key_value(), 1);
/// assert_eq!(IndexDirection::Descending.key_value(), -1);
/// assert_eq!(IndexDirection::default(), IndexDirection::Ascending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexDirection {
    /// Entries ordered from smallest to largest value
    #[default]
    Ascending,
    /// Entries ordered from largest to smallest value
    Descending,
}

impl IndexDirection {
    /// Returns the key document encoding of this direction.
    pub fn key_value(&self) -> i32 {
        match self {
            IndexDirection::Ascending => 1,
            IndexDirection::Descending => -1,
        }
    }
}

impl Display for IndexDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexDirection::Ascending => write!(f, "ASCENDING"),
            IndexDirection::Descending => write!(f, "DESCENDING"),
        }
    }
}
