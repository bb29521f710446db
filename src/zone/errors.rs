use thiserror::Error;

/// Zone-editing errors
#[derive(Debug, Clone, Error)]
pub enum ZoneError {
    /// IO error reading or writing the zone file
    #[error("IO error: {0}")]
    Io(String),

    /// Zone file has no SOA marker line, or nothing follows it
    #[error("Zone missing required SOA record")]
    MissingSoa,

    /// The line after the SOA marker does not start with an unsigned integer
    #[error("Invalid serial number line: {0}")]
    InvalidSerial(String),

    /// Zone file too large
    #[error("Zone file exceeds maximum size")]
    FileTooLarge,
}

pub type Result<T> = std::result::Result<T, ZoneError>;
