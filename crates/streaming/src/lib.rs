pub mod cache;
pub mod error;
pub mod prefetch;
pub mod protocol;
pub mod request;
pub mod resolver;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::*;
pub use error::*;
pub use prefetch::*;
pub use protocol::*;
pub use request::*;
pub use resolver::*;
