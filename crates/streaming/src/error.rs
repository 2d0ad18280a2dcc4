use foundation::Year;

/// Reasons a year's tile URL could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageryError {
    /// Year outside the configured range.
    InvalidYear { year: Year, start: Year, end: Year },
    /// The request could not be sent or its body could not be read.
    Network(String),
    /// The service answered with a non-success status.
    Upstream { status: u16, body: String },
    /// The body did not carry a usable `tile_url`.
    Parse(String),
}

impl std::fmt::Display for ImageryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageryError::InvalidYear { year, start, end } => {
                write!(f, "year {year} outside supported range {start}-{end}")
            }
            ImageryError::Network(msg) => write!(f, "imagery request failed: {msg}"),
            ImageryError::Upstream { status, body } => {
                if body.is_empty() {
                    write!(f, "imagery service returned status {status}")
                } else {
                    write!(f, "imagery service returned status {status}: {body}")
                }
            }
            ImageryError::Parse(msg) => write!(f, "unexpected imagery response: {msg}"),
        }
    }
}

impl std::error::Error for ImageryError {}

impl ImageryError {
    /// Failures worth retrying later; an invalid year never becomes valid.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ImageryError::InvalidYear { .. })
    }
}
