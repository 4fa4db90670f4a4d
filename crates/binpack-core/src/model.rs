use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in bin coordinates. `x,y` is the top-left corner;
/// `w,h` are sizes. Edges returned by [`Rect::right`] and [`Rect::bottom`]
/// are exclusive, so a rectangle occupies `[x, right())` x `[y, bottom())`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True if the two rectangles share no interior point. Touching edges
    /// still count as disjoint.
    pub fn disjoint(&self, other: &Rect) -> bool {
        self.x >= other.right()
            || other.x >= self.right()
            || self.y >= other.bottom()
            || other.y >= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.disjoint(other)
    }
}

/// Size-only insert request, used by the batch operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RectSize {
    pub w: u32,
    pub h: u32,
}

impl RectSize {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

/// A successful placement: where the item landed and whether it was stored
/// rotated by 90 degrees. When `rotated` is true, `rect.w`/`rect.h` are the
/// swapped request dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub rect: Rect,
    pub rotated: bool,
}

/// Bookkeeping helper used by packers to self-verify that their placements
/// never overlap. The packers only carry one in debug builds.
#[derive(Debug, Default, Clone)]
pub struct DisjointRectCollection {
    pub rects: Vec<Rect>,
}

impl DisjointRectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `r` if it stays disjoint from everything already tracked.
    /// Returns false (and does not add) on overlap.
    pub fn add(&mut self, r: Rect) -> bool {
        if !self.disjoint(&r) {
            return false;
        }
        self.rects.push(r);
        true
    }

    pub fn disjoint(&self, r: &Rect) -> bool {
        self.rects.iter().all(|other| other.disjoint(r))
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}
