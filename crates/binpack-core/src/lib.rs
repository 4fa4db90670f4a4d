//! Rectangle bin packing into a fixed-size bin.
//!
//! - Algorithms: Skyline (BL/MW + optional waste map), MaxRects (BAF/BSSF/BLSF/BL/CP),
//!   Guillotine (choice + split rules), Shelf (seven choice rules + optional waste map),
//!   ShelfNextFit (cursor-only fast path)
//! - Single inserts report placements as `Option`; batch inserts return the
//!   placed subset in placement order.
//! - Config and results are serde-serializable.
//!
//! Quick example:
//! ```
//! use binpack_core::prelude::*;
//!
//! let cfg = PackerConfig::builder().with_dimensions(256, 256).build();
//! let mut packer = SkylinePacker::new(cfg);
//! let placed = packer.insert(64, 32, SkylineHeuristic::BottomLeft);
//! assert!(placed.is_some());
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod packer;

pub use config::*;
pub use error::*;
pub use model::*;
pub use packer::*;

/// Convenience prelude for common types and functions.
/// Importing `binpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig, PackerConfigBuilder,
        ShelfHeuristic, SkylineHeuristic,
    };
    pub use crate::model::{Placement, Rect, RectSize};
    pub use crate::packer::{
        BinPacker, GuillotinePacker, MaxRectsPacker, ShelfNextFitPacker, ShelfPacker,
        SkylinePacker,
    };
}
