use foundation::Year;
use layers::MapError;
use streaming::ImageryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    Resolve(ImageryError),
    Map(MapError),
    AlreadyPinned { year: Year, layer_id: String },
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerError::Resolve(err) => write!(f, "{err}"),
            LayerError::Map(err) => write!(f, "map update failed: {err}"),
            LayerError::AlreadyPinned { year, layer_id } => {
                write!(f, "{year} is already pinned as {layer_id}")
            }
        }
    }
}

impl std::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayerError::Resolve(err) => Some(err),
            LayerError::Map(err) => Some(err),
            LayerError::AlreadyPinned { .. } => None,
        }
    }
}

impl From<ImageryError> for LayerError {
    fn from(err: ImageryError) -> Self {
        LayerError::Resolve(err)
    }
}

impl From<MapError> for LayerError {
    fn from(err: MapError) -> Self {
        LayerError::Map(err)
    }
}
