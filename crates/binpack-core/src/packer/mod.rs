use crate::model::{Placement, RectSize};

pub mod guillotine;
pub mod maxrects;
pub mod shelf;
pub mod shelf_next_fit;
pub mod skyline;

pub use guillotine::GuillotinePacker;
pub use maxrects::MaxRectsPacker;
pub use shelf::ShelfPacker;
pub use shelf_next_fit::ShelfNextFitPacker;
pub use skyline::SkylinePacker;

/// Online rectangle packer over a fixed-size bin.
///
/// Implementations keep their own free-space bookkeeping and take the
/// heuristics they run with from [`PackerConfig`](crate::PackerConfig) at
/// construction. A failed placement is an expected outcome and reported as
/// `None`, not as an error.
pub trait BinPacker {
    /// True if `insert` with the same dimensions would currently succeed.
    fn can_insert(&self, width: u32, height: u32) -> bool;

    /// Places one `width x height` item, or returns `None` if it does not fit.
    fn insert(&mut self, width: u32, height: u32) -> Option<Placement>;

    /// Packs as many of `items` as possible and returns the placements in
    /// placement order. Items that do not fit are skipped. The default takes
    /// the items one by one in the given order; packers with a smarter batch
    /// rule override this.
    fn insert_batch(&mut self, items: Vec<RectSize>) -> Vec<Placement> {
        let mut out = Vec::with_capacity(items.len());
        for it in items {
            if let Some(p) = self.insert(it.w, it.h) {
                out.push(p);
            }
        }
        out
    }

    /// Fraction of the bin area covered by placed items, in `[0, 1]`.
    fn occupancy(&self) -> f64;

    /// Discards all placements and restores the empty-bin state.
    fn reset(&mut self);
}
