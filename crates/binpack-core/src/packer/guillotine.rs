use tracing::instrument;

use super::BinPacker;
use crate::config::{GuillotineChoice, GuillotineSplit, PackerConfig};
#[cfg(debug_assertions)]
use crate::model::DisjointRectCollection;
use crate::model::{Placement, Rect, RectSize};

/// Guillotine packer: every placement cuts the hosting free rectangle into
/// two disjoint leftovers along a single axis, so the free list always stays
/// an exact partition of the unused space.
pub struct GuillotinePacker {
    config: PackerConfig,
    free: Vec<Rect>,
    used: Vec<Rect>,
    #[cfg(debug_assertions)]
    disjoint: DisjointRectCollection,
}

impl GuillotinePacker {
    pub fn new(config: PackerConfig) -> Self {
        let bin = Rect::new(0, 0, config.width, config.height);
        Self {
            config,
            free: vec![bin],
            used: Vec::new(),
            #[cfg(debug_assertions)]
            disjoint: DisjointRectCollection::new(),
        }
    }

    /// Starts with an empty free list. Hosts that use this packer as a waste
    /// map seed it through [`add_free_rect`](Self::add_free_rect) instead of
    /// granting it the whole bin.
    pub(crate) fn new_empty(config: PackerConfig) -> Self {
        Self {
            config,
            free: Vec::new(),
            used: Vec::new(),
            #[cfg(debug_assertions)]
            disjoint: DisjointRectCollection::new(),
        }
    }

    /// Registers `r` as free space. Degenerate rectangles are dropped.
    pub(crate) fn add_free_rect(&mut self, r: Rect) {
        if r.w == 0 || r.h == 0 {
            return;
        }
        self.free.push(r);
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn free_rect_count(&self) -> usize {
        self.free.len()
    }

    pub fn used_rect_count(&self) -> usize {
        self.used.len()
    }

    pub fn can_insert(&self, width: u32, height: u32) -> bool {
        self.free.iter().any(|fr| {
            (fr.w >= width && fr.h >= height)
                || (self.config.allow_rotation && fr.w >= height && fr.h >= width)
        })
    }

    /// Places one item. `merge` runs a free-list merge pass after the split;
    /// `choice` scores candidate free rectangles and `split` picks the cut
    /// axis for the leftover space.
    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Option<Placement> {
        let (index, placed, rotated) = self.choose(width, height, &choice)?;
        self.place(index, &placed, merge, &split);
        Some(Placement {
            rect: placed,
            rotated,
        })
    }

    /// Greedy batch insert: each round scores every (free rect, item) pair
    /// and commits the globally best one, until nothing fits any more.
    /// Unplaced leftovers are skipped.
    #[instrument(skip_all)]
    pub fn insert_batch(
        &mut self,
        mut items: Vec<RectSize>,
        merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Vec<Placement> {
        let mut out = Vec::new();
        while !items.is_empty() {
            let mut best_score = i64::MAX;
            let mut best_pair: Option<(usize, usize)> = None;
            let mut best_rect = Rect::new(0, 0, 0, 0);
            let mut best_rotated = false;

            'scan: for (i, fr) in self.free.iter().enumerate() {
                for (j, it) in items.iter().enumerate() {
                    // A perfect match is taken instantly.
                    if it.w == fr.w && it.h == fr.h {
                        best_pair = Some((i, j));
                        best_rect = Rect::new(fr.x, fr.y, it.w, it.h);
                        best_rotated = false;
                        break 'scan;
                    } else if self.config.allow_rotation && it.h == fr.w && it.w == fr.h {
                        best_pair = Some((i, j));
                        best_rect = Rect::new(fr.x, fr.y, it.h, it.w);
                        best_rotated = true;
                        break 'scan;
                    } else if it.w <= fr.w && it.h <= fr.h {
                        let score = Self::score(&choice, fr, it.w, it.h);
                        if score < best_score {
                            best_pair = Some((i, j));
                            best_rect = Rect::new(fr.x, fr.y, it.w, it.h);
                            best_rotated = false;
                            best_score = score;
                        }
                    } else if self.config.allow_rotation && it.h <= fr.w && it.w <= fr.h {
                        let score = Self::score(&choice, fr, it.h, it.w);
                        if score < best_score {
                            best_pair = Some((i, j));
                            best_rect = Rect::new(fr.x, fr.y, it.h, it.w);
                            best_rotated = true;
                            best_score = score;
                        }
                    }
                }
            }

            let (free_index, item_index) = match best_pair {
                Some(pair) => pair,
                None => break,
            };
            self.place(free_index, &best_rect, merge, &split);
            out.push(Placement {
                rect: best_rect,
                rotated: best_rotated,
            });
            items.remove(item_index);
        }
        out
    }

    pub fn occupancy(&self) -> f64 {
        let total = self.config.width as u64 * self.config.height as u64;
        if total == 0 {
            return 0.0;
        }
        let used: u64 = self.used.iter().map(|r| r.area()).sum();
        used as f64 / total as f64
    }

    pub fn reset(&mut self) {
        self.free.clear();
        self.free
            .push(Rect::new(0, 0, self.config.width, self.config.height));
        self.used.clear();
        #[cfg(debug_assertions)]
        self.disjoint.clear();
    }

    /// Merges pairs of free rectangles that line up into a single larger one.
    /// A single pass can miss three-way merges; callers that care run it again.
    pub fn merge_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            while j < self.free.len() {
                let a = self.free[i];
                let b = self.free[j];
                if a.w == b.w && a.x == b.x {
                    if a.y == b.bottom() {
                        self.free[i].y -= b.h;
                        self.free[i].h += b.h;
                        self.free.remove(j);
                    } else if a.bottom() == b.y {
                        self.free[i].h += b.h;
                        self.free.remove(j);
                    } else {
                        j += 1;
                    }
                } else if a.x == b.right() && a.y == b.y && a.h == b.h {
                    self.free[i].x -= b.w;
                    self.free[i].w += b.w;
                    self.free.remove(j);
                } else if a.right() == b.x && a.y == b.y && a.h == b.h {
                    self.free[i].w += b.w;
                    self.free.remove(j);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    /// Scans the free list for the best spot. Exact fits win immediately in
    /// either orientation; otherwise the rotated orientation is only tried
    /// for rectangles the upright one does not fit into.
    fn choose(
        &self,
        width: u32,
        height: u32,
        choice: &GuillotineChoice,
    ) -> Option<(usize, Rect, bool)> {
        let mut best_score = i64::MAX;
        let mut best_index: Option<usize> = None;
        let mut best_rect = Rect::new(0, 0, 0, 0);
        let mut best_rotated = false;

        for (i, fr) in self.free.iter().enumerate() {
            if width == fr.w && height == fr.h {
                return Some((i, Rect::new(fr.x, fr.y, width, height), false));
            } else if self.config.allow_rotation && height == fr.w && width == fr.h {
                return Some((i, Rect::new(fr.x, fr.y, height, width), true));
            } else if width <= fr.w && height <= fr.h {
                let score = Self::score(choice, fr, width, height);
                if score < best_score {
                    best_index = Some(i);
                    best_rect = Rect::new(fr.x, fr.y, width, height);
                    best_rotated = false;
                    best_score = score;
                }
            } else if self.config.allow_rotation && height <= fr.w && width <= fr.h {
                let score = Self::score(choice, fr, height, width);
                if score < best_score {
                    best_index = Some(i);
                    best_rect = Rect::new(fr.x, fr.y, height, width);
                    best_rotated = true;
                    best_score = score;
                }
            }
        }
        best_index.map(|i| (i, best_rect, best_rotated))
    }

    /// Penalty of putting a `width x height` item into `fr`. Smaller is
    /// better; the worst-fit rules negate their best-fit counterpart.
    fn score(choice: &GuillotineChoice, fr: &Rect, width: u32, height: u32) -> i64 {
        let area_fit = fr.area() as i64 - (width as u64 * height as u64) as i64;
        let leftover_h = (fr.w as i64 - width as i64).abs();
        let leftover_v = (fr.h as i64 - height as i64).abs();
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match choice {
            GuillotineChoice::BestAreaFit => area_fit,
            GuillotineChoice::BestShortSideFit => short_fit,
            GuillotineChoice::BestLongSideFit => long_fit,
            GuillotineChoice::WorstAreaFit => -area_fit,
            GuillotineChoice::WorstShortSideFit => -short_fit,
            GuillotineChoice::WorstLongSideFit => -long_fit,
        }
    }

    /// Cuts the L-shaped leftover of `fr` around `placed` into two
    /// rectangles along the axis the split rule picks.
    fn split_free_rect(
        fr: &Rect,
        placed: &Rect,
        method: &GuillotineSplit,
    ) -> (Option<Rect>, Option<Rect>) {
        let leftover_w = fr.w - placed.w;
        let leftover_h = fr.h - placed.h;
        let split_horizontal = match method {
            GuillotineSplit::SplitShorterLeftoverAxis => leftover_w <= leftover_h,
            GuillotineSplit::SplitLongerLeftoverAxis => leftover_w > leftover_h,
            GuillotineSplit::SplitMinimizeArea => {
                placed.w as u64 * leftover_h as u64 > leftover_w as u64 * placed.h as u64
            }
            GuillotineSplit::SplitMaximizeArea => {
                placed.w as u64 * leftover_h as u64 <= leftover_w as u64 * placed.h as u64
            }
            GuillotineSplit::SplitShorterAxis => fr.w <= fr.h,
            GuillotineSplit::SplitLongerAxis => fr.w > fr.h,
        };

        let mut bottom = Rect::new(fr.x, fr.y + placed.h, 0, leftover_h);
        let mut right = Rect::new(fr.x + placed.w, fr.y, leftover_w, 0);
        if split_horizontal {
            bottom.w = fr.w;
            right.h = placed.h;
        } else {
            bottom.w = placed.w;
            right.h = fr.h;
        }
        let bottom = (bottom.w > 0 && bottom.h > 0).then_some(bottom);
        let right = (right.w > 0 && right.h > 0).then_some(right);
        (bottom, right)
    }

    fn place(&mut self, index: usize, placed: &Rect, merge: bool, method: &GuillotineSplit) {
        let fr = self.free.remove(index);
        let (bottom, right) = Self::split_free_rect(&fr, placed, method);
        if let Some(r) = bottom {
            self.free.push(r);
        }
        if let Some(r) = right {
            self.free.push(r);
        }
        if merge {
            self.merge_free_list();
        }
        self.used.push(*placed);
        #[cfg(debug_assertions)]
        debug_assert!(self.disjoint.add(*placed));
    }
}

impl BinPacker for GuillotinePacker {
    fn can_insert(&self, width: u32, height: u32) -> bool {
        GuillotinePacker::can_insert(self, width, height)
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<Placement> {
        let merge = self.config.g_merge;
        let choice = self.config.g_choice.clone();
        let split = self.config.g_split.clone();
        GuillotinePacker::insert(self, width, height, merge, choice, split)
    }

    fn insert_batch(&mut self, items: Vec<RectSize>) -> Vec<Placement> {
        let merge = self.config.g_merge;
        let choice = self.config.g_choice.clone();
        let split = self.config.g_split.clone();
        GuillotinePacker::insert_batch(self, items, merge, choice, split)
    }

    fn occupancy(&self) -> f64 {
        GuillotinePacker::occupancy(self)
    }

    fn reset(&mut self) {
        GuillotinePacker::reset(self)
    }
}
