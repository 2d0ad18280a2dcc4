//! Time-synchronized NAIP imagery on top of the playa map.
//!
//! One active raster layer follows the year slider; any year can also be
//! pinned as its own layer that stays put while the slider moves.

use std::sync::Arc;

use parking_lot::Mutex;

pub mod active;
pub mod config;
pub mod error;
pub mod pinned;
pub mod slider;

#[cfg(test)]
mod testing;

pub use active::*;
pub use config::*;
pub use error::*;
pub use pinned::*;
pub use slider::*;

/// Map state shared between the slider hooks and whoever renders it.
pub type SharedMap<M> = Arc<Mutex<M>>;
