// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";

// store constants
pub const DEFAULT_MAX_PIPELINE_STAGES: usize = 64;
