pub mod event_bus;
pub mod metrics;
pub mod sequence;

pub use event_bus::*;
pub use metrics::*;
pub use sequence::*;
