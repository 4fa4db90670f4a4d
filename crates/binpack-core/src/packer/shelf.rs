use tracing::debug;

use super::BinPacker;
use super::guillotine::GuillotinePacker;
use crate::config::{GuillotineChoice, GuillotineSplit, PackerConfig, ShelfHeuristic};
#[cfg(debug_assertions)]
use crate::model::DisjointRectCollection;
use crate::model::{Placement, Rect, RectSize};

#[derive(Debug, Clone)]
struct Shelf {
    /// Horizontal fill position; the next item on this shelf starts here.
    current_x: u32,
    start_y: u32,
    height: u32,
    used: Vec<Rect>,
}

/// Shelf packer: items go onto full-width horizontal shelves stacked from
/// the top of the bin down. Only the newest shelf may still grow in height.
/// With the waste map enabled, a shelf that gets closed donates its gaps to
/// an internal guillotine packer, which is consulted first on every insert.
pub struct ShelfPacker {
    config: PackerConfig,
    current_y: u32,
    used_area: u64,
    shelves: Vec<Shelf>,
    waste: Option<GuillotinePacker>,
    #[cfg(debug_assertions)]
    disjoint: DisjointRectCollection,
}

impl ShelfPacker {
    pub fn new(config: PackerConfig) -> Self {
        let waste = if config.use_waste_map {
            Some(GuillotinePacker::new_empty(config.clone()))
        } else {
            None
        };
        let mut packer = Self {
            current_y: 0,
            used_area: 0,
            shelves: Vec::new(),
            waste,
            config,
            #[cfg(debug_assertions)]
            disjoint: DisjointRectCollection::new(),
        };
        packer.start_new_shelf(0);
        packer
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn shelf_count(&self) -> usize {
        self.shelves.len()
    }

    pub fn can_insert(&self, width: u32, height: u32, heuristic: &ShelfHeuristic) -> bool {
        if let Some(wm) = &self.waste {
            if wm.can_insert(width, height) {
                return true;
            }
        }
        let (found, mut w, mut h) = self.find_shelf(width, height, heuristic);
        if found.is_some() {
            return true;
        }
        if self.config.allow_rotation && w < h && h <= self.config.width {
            std::mem::swap(&mut w, &mut h);
        }
        w <= self.config.width && self.can_start_new_shelf(h)
    }

    /// Places one item. The waste map, when enabled, is consulted before the
    /// shelves; if no shelf can take the item a new one is opened below the
    /// last, closing (and salvaging) the shelf it replaces.
    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        heuristic: ShelfHeuristic,
    ) -> Option<Placement> {
        if let Some(wm) = &mut self.waste {
            if let Some(p) = wm.insert(
                width,
                height,
                true,
                GuillotineChoice::BestShortSideFit,
                GuillotineSplit::SplitMaximizeArea,
            ) {
                self.used_area += width as u64 * height as u64;
                #[cfg(debug_assertions)]
                debug_assert!(self.disjoint.add(p.rect));
                return Some(p);
            }
        }

        let (found, mut w, mut h) = self.find_shelf(width, height, &heuristic);
        if let Some(index) = found {
            let node = self.add_to_shelf(index, w, h);
            return Some(Placement {
                rect: node,
                rotated: node.w != width,
            });
        }

        // No shelf could take it; lay the item flat and open a new shelf.
        if self.config.allow_rotation && w < h && h <= self.config.width {
            std::mem::swap(&mut w, &mut h);
        }
        if w <= self.config.width && self.can_start_new_shelf(h) {
            if self.waste.is_some() {
                let last = self.shelves.len() - 1;
                self.move_shelf_to_waste_map(last);
            }
            self.start_new_shelf(h);
            let last = self.shelves.len() - 1;
            debug_assert!(self.fits_on_shelf(&self.shelves[last], w, h, true));
            let node = self.add_to_shelf(last, w, h);
            return Some(Placement {
                rect: node,
                rotated: node.w != width,
            });
        }
        None
    }

    pub fn insert_batch(
        &mut self,
        items: Vec<RectSize>,
        heuristic: ShelfHeuristic,
    ) -> Vec<Placement> {
        let mut out = Vec::with_capacity(items.len());
        for it in items {
            if let Some(p) = self.insert(it.w, it.h, heuristic.clone()) {
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
        self.current_y = 0;
        self.used_area = 0;
        self.shelves.clear();
        self.start_new_shelf(0);
        if self.config.use_waste_map {
            self.waste = Some(GuillotinePacker::new_empty(self.config.clone()));
        }
        #[cfg(debug_assertions)]
        self.disjoint.clear();
    }

    /// Picks the shelf for an item per the choice rule, or `None` when no
    /// shelf can take it. Returns the (possibly swapped) dimensions the scan
    /// ended with: every rule pre-rotates the item against each shelf it
    /// examines and the adjustment from one candidate carries into the
    /// next, so the dimensions that come back belong to the last shelf
    /// looked at, not necessarily the chosen one. The caller feeds them to
    /// [`add_to_shelf`](Self::add_to_shelf), which re-rotates for the shelf
    /// that actually won.
    fn find_shelf(
        &self,
        width: u32,
        height: u32,
        heuristic: &ShelfHeuristic,
    ) -> (Option<usize>, u32, u32) {
        let (mut w, mut h) = (width, height);
        let last = self.shelves.len() - 1;
        match heuristic {
            ShelfHeuristic::NextFit => {
                self.rotate_to_shelf(&self.shelves[last], &mut w, &mut h);
                if self.fits_on_shelf(&self.shelves[last], w, h, true) {
                    return (Some(last), w, h);
                }
            }
            ShelfHeuristic::FirstFit => {
                for i in 0..self.shelves.len() {
                    self.rotate_to_shelf(&self.shelves[i], &mut w, &mut h);
                    if self.fits_on_shelf(&self.shelves[i], w, h, i == last) {
                        return (Some(i), w, h);
                    }
                }
            }
            ShelfHeuristic::BestAreaFit => {
                let mut best: Option<usize> = None;
                let mut best_area = u64::MAX;
                for i in 0..self.shelves.len() {
                    self.rotate_to_shelf(&self.shelves[i], &mut w, &mut h);
                    if self.fits_on_shelf(&self.shelves[i], w, h, i == last) {
                        let area = (self.config.width - self.shelves[i].current_x) as u64
                            * self.shelves[i].height as u64;
                        if area < best_area {
                            best = Some(i);
                            best_area = area;
                        }
                    }
                }
                if best.is_some() {
                    return (best, w, h);
                }
            }
            ShelfHeuristic::WorstAreaFit => {
                let mut best: Option<usize> = None;
                let mut best_area = 0u64;
                for i in 0..self.shelves.len() {
                    self.rotate_to_shelf(&self.shelves[i], &mut w, &mut h);
                    if self.fits_on_shelf(&self.shelves[i], w, h, i == last) {
                        let area = (self.config.width - self.shelves[i].current_x) as u64
                            * self.shelves[i].height as u64;
                        if best.is_none() || area > best_area {
                            best = Some(i);
                            best_area = area;
                        }
                    }
                }
                if best.is_some() {
                    return (best, w, h);
                }
            }
            ShelfHeuristic::BestHeightFit => {
                let mut best: Option<usize> = None;
                let mut best_diff = u32::MAX;
                for i in 0..self.shelves.len() {
                    self.rotate_to_shelf(&self.shelves[i], &mut w, &mut h);
                    if self.fits_on_shelf(&self.shelves[i], w, h, i == last) {
                        let diff = self.shelves[i].height.saturating_sub(h);
                        if diff < best_diff {
                            best = Some(i);
                            best_diff = diff;
                        }
                    }
                }
                if best.is_some() {
                    return (best, w, h);
                }
            }
            ShelfHeuristic::BestWidthFit => {
                let mut best: Option<usize> = None;
                let mut best_diff = u32::MAX;
                for i in 0..self.shelves.len() {
                    self.rotate_to_shelf(&self.shelves[i], &mut w, &mut h);
                    if self.fits_on_shelf(&self.shelves[i], w, h, i == last) {
                        let diff = self.config.width - self.shelves[i].current_x - w;
                        if diff < best_diff {
                            best = Some(i);
                            best_diff = diff;
                        }
                    }
                }
                if best.is_some() {
                    return (best, w, h);
                }
            }
            ShelfHeuristic::WorstWidthFit => {
                let mut best: Option<usize> = None;
                let mut best_diff = 0u32;
                for i in 0..self.shelves.len() {
                    self.rotate_to_shelf(&self.shelves[i], &mut w, &mut h);
                    if self.fits_on_shelf(&self.shelves[i], w, h, i == last) {
                        let diff = self.config.width - self.shelves[i].current_x - w;
                        if best.is_none() || diff > best_diff {
                            best = Some(i);
                            best_diff = diff;
                        }
                    }
                }
                if best.is_some() {
                    return (best, w, h);
                }
            }
        }
        (None, w, h)
    }

    /// True if an item fits on `shelf` as oriented. For the newest shelf
    /// `can_resize` lets the shelf grow toward the bottom of the bin.
    fn fits_on_shelf(&self, shelf: &Shelf, width: u32, height: u32, can_resize: bool) -> bool {
        let shelf_height = if can_resize {
            self.config.height - shelf.start_y
        } else {
            shelf.height
        };
        shelf.current_x as u64 + width as u64 <= self.config.width as u64
            && height as u64 <= shelf_height as u64
    }

    /// Swaps the item onto its better orientation for `shelf`: lie flat when
    /// the long edge no longer fits horizontally or would stay under the
    /// shelf height anyway, stand upright when that is what fits.
    fn rotate_to_shelf(&self, shelf: &Shelf, width: &mut u32, height: &mut u32) {
        if !self.config.allow_rotation {
            return;
        }
        let room = self.config.width - shelf.current_x;
        if (*width > *height && *width > room)
            || (*width > *height && *width < shelf.height)
            || (*width < *height && *height > shelf.height && *height <= room)
        {
            std::mem::swap(width, height);
        }
    }

    /// Appends the item to `shelves[index]`, growing the shelf height if
    /// needed, and returns the placed rectangle.
    fn add_to_shelf(&mut self, index: usize, mut width: u32, mut height: u32) -> Rect {
        self.rotate_to_shelf(&self.shelves[index], &mut width, &mut height);
        debug_assert!(self.fits_on_shelf(&self.shelves[index], width, height, true));

        let node = Rect::new(
            self.shelves[index].current_x,
            self.shelves[index].start_y,
            width,
            height,
        );
        let shelf = &mut self.shelves[index];
        shelf.used.push(node);
        shelf.current_x += width;
        debug_assert!(shelf.current_x <= self.config.width);
        shelf.height = shelf.height.max(height);
        debug_assert!(shelf.height <= self.config.height);

        self.used_area += width as u64 * height as u64;
        #[cfg(debug_assertions)]
        debug_assert!(self.disjoint.add(node));
        node
    }

    fn can_start_new_shelf(&self, height: u32) -> bool {
        match self.shelves.last() {
            Some(last) => {
                last.start_y as u64 + last.height as u64 + height as u64
                    <= self.config.height as u64
            }
            None => height as u64 <= self.config.height as u64,
        }
    }

    fn start_new_shelf(&mut self, starting_height: u32) {
        if let Some(last) = self.shelves.last() {
            debug_assert!(last.height != 0);
            self.current_y += last.height;
            debug_assert!(self.current_y < self.config.height);
        }
        self.shelves.push(Shelf {
            current_x: 0,
            start_y: self.current_y,
            height: starting_height,
            used: Vec::new(),
        });
        debug_assert!(self.current_y + starting_height <= self.config.height);
    }

    /// Closes `shelves[index]`: the gap above every item and the unused right
    /// end of the shelf become free rectangles of the waste map, and the
    /// shelf stops accepting items.
    fn move_shelf_to_waste_map(&mut self, index: usize) {
        let wm = match self.waste.as_mut() {
            Some(wm) => wm,
            None => return,
        };
        let shelf = &mut self.shelves[index];
        for r in shelf.used.drain(..) {
            wm.add_free_rect(Rect::new(r.x, r.y + r.h, r.w, shelf.height - r.h));
        }
        wm.add_free_rect(Rect::new(
            shelf.current_x,
            shelf.start_y,
            self.config.width - shelf.current_x,
            shelf.height,
        ));
        shelf.current_x = self.config.width;
        wm.merge_free_list();
        debug!(free_rects = wm.free_rect_count(), "salvaged closed shelf into waste map");
    }
}

impl BinPacker for ShelfPacker {
    fn can_insert(&self, width: u32, height: u32) -> bool {
        let heuristic = self.config.shelf_heuristic.clone();
        ShelfPacker::can_insert(self, width, height, &heuristic)
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<Placement> {
        let heuristic = self.config.shelf_heuristic.clone();
        ShelfPacker::insert(self, width, height, heuristic)
    }

    fn occupancy(&self) -> f64 {
        ShelfPacker::occupancy(self)
    }

    fn reset(&mut self) {
        ShelfPacker::reset(self)
    }
}
