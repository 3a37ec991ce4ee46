//! Packs rectangles into a narrow bounding box.
//!
//! [`cut_grid::CutGrid`] keeps the plane as a grid of cells split on demand
//! by cut lines. [`packer::Packer`] places rectangles greedily into a fresh
//! grid under a height bound, then grows the bound until the packing is as
//! narrow as the widest rectangle.

pub mod config;
pub mod cut_grid;
pub mod error;
pub mod packer;
pub mod render;
pub mod types;

pub use config::SearchConfig;
pub use error::PackError;
pub use packer::{PackReport, Packer, SearchOutcome, pack};
pub use types::{NamedRect, Packing, Placement, Rect};
