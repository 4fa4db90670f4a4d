use super::BinPacker;
use crate::config::PackerConfig;
use crate::model::{Placement, Rect, RectSize};

/// Lightweight shelf packer that only ever appends to the current shelf.
/// When an item overflows the bin width, the shelf is abandoned for good and
/// a new one opens directly below it. Keeps no per-item bookkeeping beyond
/// the running cursor, so it is the cheapest strategy by a wide margin.
pub struct ShelfNextFitPacker {
    config: PackerConfig,
    current_x: u32,
    current_y: u32,
    shelf_height: u32,
    used_area: u64,
}

impl ShelfNextFitPacker {
    pub fn new(config: PackerConfig) -> Self {
        Self {
            config,
            current_x: 0,
            current_y: 0,
            shelf_height: 0,
            used_area: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Dry run of [`insert`](Self::insert): answers whether the item would be
    /// placed right now, without advancing the cursor.
    pub fn can_insert(&self, width: u32, height: u32) -> bool {
        let (mut w, mut h) = (width, height);
        let allow = self.config.allow_rotation;
        if allow && ((w > h && w < self.shelf_height) || (w < h && h > self.shelf_height)) {
            std::mem::swap(&mut w, &mut h);
        }
        let mut y = self.current_y;
        if self.current_x as u64 + w as u64 > self.config.width as u64 {
            y += self.shelf_height;
            if allow && w < h {
                std::mem::swap(&mut w, &mut h);
            }
        }
        if w as u64 > self.config.width as u64
            || y as u64 + h as u64 > self.config.height as u64
        {
            if !allow {
                return false;
            }
            std::mem::swap(&mut w, &mut h);
        }
        w as u64 <= self.config.width as u64 && y as u64 + h as u64 <= self.config.height as u64
    }

    /// Places one item at the cursor. Note that a failed insert may still
    /// have abandoned the current shelf: once the item overflows the shelf,
    /// the move down to the next shelf happens before fitting is re-checked.
    pub fn insert(&mut self, width: u32, height: u32) -> Option<Placement> {
        let (mut w, mut h) = (width, height);
        let mut flipped = false;
        let allow = self.config.allow_rotation;

        // Lay the item so that its orientation matches the open shelf.
        if allow && ((w > h && w < self.shelf_height) || (w < h && h > self.shelf_height)) {
            std::mem::swap(&mut w, &mut h);
            flipped = true;
        }

        if self.current_x as u64 + w as u64 > self.config.width as u64 {
            self.current_x = 0;
            self.current_y += self.shelf_height;
            self.shelf_height = 0;
            // A fresh shelf starts with the long edge horizontal.
            if allow && w < h {
                std::mem::swap(&mut w, &mut h);
                flipped = !flipped;
            }
        }

        if w as u64 > self.config.width as u64
            || self.current_y as u64 + h as u64 > self.config.height as u64
        {
            if !allow {
                return None;
            }
            std::mem::swap(&mut w, &mut h);
            flipped = !flipped;
            if w as u64 > self.config.width as u64
                || self.current_y as u64 + h as u64 > self.config.height as u64
            {
                return None;
            }
        }

        let node = Rect::new(self.current_x, self.current_y, w, h);
        self.current_x += w;
        self.shelf_height = self.shelf_height.max(h);
        self.used_area += w as u64 * h as u64;
        Some(Placement {
            rect: node,
            rotated: flipped,
        })
    }

    pub fn insert_batch(&mut self, items: Vec<RectSize>) -> Vec<Placement> {
        let mut out = Vec::with_capacity(items.len());
        for it in items {
            if let Some(p) = self.insert(it.w, it.h) {
                out.push(p);
            }
        }
        out
    }

    pub fn occupancy(&self) -> f64 {
        let total = self.config.width as u64 * self.config.height as u64;
        if total == 0 {
            return 0.0;
        }
        self.used_area as f64 / total as f64
    }

    pub fn reset(&mut self) {
        self.current_x = 0;
        self.current_y = 0;
        self.shelf_height = 0;
        self.used_area = 0;
    }
}

impl BinPacker for ShelfNextFitPacker {
    fn can_insert(&self, width: u32, height: u32) -> bool {
        ShelfNextFitPacker::can_insert(self, width, height)
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<Placement> {
        ShelfNextFitPacker::insert(self, width, height)
    }

    fn occupancy(&self) -> f64 {
        ShelfNextFitPacker::occupancy(self)
    }

    fn reset(&mut self) {
        ShelfNextFitPacker::reset(self)
    }
}
