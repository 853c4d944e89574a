// index option keys
pub const OPTION_NAME: &str = "name";
pub const OPTION_DROP_DUPS: &str = "dropDups";
pub const OPTION_SPARSE: &str = "sparse";
pub const OPTION_UNIQUE: &str = "unique";
pub const OPTION_MIN: &str = "min";
pub const OPTION_MAX: &str = "max";

// index type markers
pub const GEO_2D_INDEX: &str = "2d";

// event constants
pub const MAPPING_EVENT: &str = "mapping_event";
