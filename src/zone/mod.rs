pub mod editor;
pub mod errors;
pub mod line;

pub use editor::ZoneEditor;
pub use errors::{Result, ZoneError};

/// Zone constants
pub mod constants {
    /// Maximum zone file size (10MB)
    pub const MAX_ZONE_FILE_SIZE: usize = 10 * 1024 * 1024;

    /// File extension for zone files under the zone directory
    pub const ZONE_FILE_EXTENSION: &str = "zone";
}
