pub mod controls;
pub mod layer;
pub mod playa;
pub mod query;
pub mod raster;
pub mod style;
pub mod symbology;
pub mod vector;

pub use controls::*;
pub use layer::*;
pub use query::*;
pub use raster::*;
pub use style::*;
pub use symbology::*;
pub use vector::*;
