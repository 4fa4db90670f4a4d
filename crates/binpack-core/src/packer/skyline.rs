use tracing::instrument;

use super::BinPacker;
use super::guillotine::GuillotinePacker;
use crate::config::{GuillotineChoice, GuillotineSplit, PackerConfig, SkylineHeuristic};
#[cfg(debug_assertions)]
use crate::model::DisjointRectCollection;
use crate::model::{Placement, Rect, RectSize};

/// One horizontal segment of the skyline. `x` is the left edge, `x + w` the
/// exclusive right edge, `y` the first free row above the segment.
#[derive(Clone, Copy, Debug)]
struct SkylineNode {
    x: u32,
    y: u32,
    w: u32,
}

/// Skyline packer: tracks only the top contour of the placed items. Space
/// lost below a placement is gone unless the waste map is enabled, in which
/// case it is handed to an internal guillotine packer and consulted first on
/// every insert.
pub struct SkylinePacker {
    config: PackerConfig,
    skyline: Vec<SkylineNode>,
    used_area: u64,
    waste: Option<GuillotinePacker>,
    #[cfg(debug_assertions)]
    disjoint: DisjointRectCollection,
}

impl SkylinePacker {
    pub fn new(config: PackerConfig) -> Self {
        let waste = if config.use_waste_map {
            Some(GuillotinePacker::new_empty(config.clone()))
        } else {
            None
        };
        Self {
            skyline: vec![SkylineNode {
                x: 0,
                y: 0,
                w: config.width,
            }],
            used_area: 0,
            waste,
            config,
            #[cfg(debug_assertions)]
            disjoint: DisjointRectCollection::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn can_insert(&self, width: u32, height: u32, heuristic: &SkylineHeuristic) -> bool {
        if let Some(wm) = &self.waste {
            if wm.can_insert(width, height) {
                return true;
            }
        }
        self.find_position(width, height, heuristic).is_some()
    }

    /// Places one item. The waste map, when enabled, is consulted before the
    /// skyline itself.
    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        heuristic: SkylineHeuristic,
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
        let (index, node, rotated, _) = self.find_position(width, height, &heuristic)?;
        self.add_skyline_level(index, &node);
        self.used_area += width as u64 * height as u64;
        #[cfg(debug_assertions)]
        debug_assert!(self.disjoint.add(node));
        Some(Placement {
            rect: node,
            rotated,
        })
    }

    /// Greedy batch insert: each round places the remaining item whose best
    /// skyline position scores lowest. The waste map is not consulted here,
    /// but shed areas still feed it for later single inserts. Unplaced
    /// leftovers are skipped.
    #[instrument(skip_all)]
    pub fn insert_batch(
        &mut self,
        mut items: Vec<RectSize>,
        heuristic: SkylineHeuristic,
    ) -> Vec<Placement> {
        let mut out = Vec::new();
        while !items.is_empty() {
            let mut best_score = (i64::MAX, i64::MAX);
            let mut best: Option<(usize, usize, Rect, bool)> = None;

            for (i, it) in items.iter().enumerate() {
                if let Some((index, node, rotated, score)) =
                    self.find_position(it.w, it.h, &heuristic)
                {
                    if score < best_score {
                        best_score = score;
                        best = Some((i, index, node, rotated));
                    }
                }
            }

            let (item_index, index, node, rotated) = match best {
                Some(b) => b,
                None => break,
            };
            self.add_skyline_level(index, &node);
            self.used_area += items[item_index].w as u64 * items[item_index].h as u64;
            #[cfg(debug_assertions)]
            debug_assert!(self.disjoint.add(node));
            out.push(Placement {
                rect: node,
                rotated,
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
        self.used_area as f64 / total as f64
    }

    pub fn reset(&mut self) {
        self.skyline.clear();
        self.skyline.push(SkylineNode {
            x: 0,
            y: 0,
            w: self.config.width,
        });
        self.used_area = 0;
        if self.config.use_waste_map {
            self.waste = Some(GuillotinePacker::new_empty(self.config.clone()));
        }
        #[cfg(debug_assertions)]
        self.disjoint.clear();
    }

    fn find_position(
        &self,
        width: u32,
        height: u32,
        heuristic: &SkylineHeuristic,
    ) -> Option<(usize, Rect, bool, (i64, i64))> {
        match heuristic {
            SkylineHeuristic::BottomLeft => self.find_bottom_left(width, height),
            SkylineHeuristic::MinWaste => self.find_min_waste(width, height),
        }
    }

    /// Lowest resulting top edge wins; ties go to the narrower segment.
    fn find_bottom_left(&self, width: u32, height: u32) -> Option<(usize, Rect, bool, (i64, i64))> {
        let mut best_height = u32::MAX;
        let mut best_width = u32::MAX;
        let mut best_index: Option<usize> = None;
        let mut best_node = Rect::new(0, 0, 0, 0);
        let mut best_rotated = false;

        for i in 0..self.skyline.len() {
            if let Some(y) = self.rectangle_fits(i, width, height) {
                if y + height < best_height
                    || (y + height == best_height && self.skyline[i].w < best_width)
                {
                    best_height = y + height;
                    best_width = self.skyline[i].w;
                    best_index = Some(i);
                    best_node = Rect::new(self.skyline[i].x, y, width, height);
                    best_rotated = false;
                }
            }
            if self.config.allow_rotation {
                if let Some(y) = self.rectangle_fits(i, height, width) {
                    if y + width < best_height
                        || (y + width == best_height && self.skyline[i].w < best_width)
                    {
                        best_height = y + width;
                        best_width = self.skyline[i].w;
                        best_index = Some(i);
                        best_node = Rect::new(self.skyline[i].x, y, height, width);
                        best_rotated = true;
                    }
                }
            }
        }
        best_index.map(|i| {
            (
                i,
                best_node,
                best_rotated,
                (best_height as i64, best_width as i64),
            )
        })
    }

    /// Least area shed below the item wins; ties go to the lower top edge.
    fn find_min_waste(&self, width: u32, height: u32) -> Option<(usize, Rect, bool, (i64, i64))> {
        let mut best_waste = u64::MAX;
        let mut best_height = u32::MAX;
        let mut best_index: Option<usize> = None;
        let mut best_node = Rect::new(0, 0, 0, 0);
        let mut best_rotated = false;

        for i in 0..self.skyline.len() {
            if let Some(y) = self.rectangle_fits(i, width, height) {
                let waste = self.wasted_area(i, width, y);
                if waste < best_waste || (waste == best_waste && y + height < best_height) {
                    best_waste = waste;
                    best_height = y + height;
                    best_index = Some(i);
                    best_node = Rect::new(self.skyline[i].x, y, width, height);
                    best_rotated = false;
                }
            }
            if self.config.allow_rotation {
                if let Some(y) = self.rectangle_fits(i, height, width) {
                    let waste = self.wasted_area(i, height, y);
                    if waste < best_waste || (waste == best_waste && y + width < best_height) {
                        best_waste = waste;
                        best_height = y + width;
                        best_index = Some(i);
                        best_node = Rect::new(self.skyline[i].x, y, height, width);
                        best_rotated = true;
                    }
                }
            }
        }
        best_index.map(|i| {
            (
                i,
                best_node,
                best_rotated,
                (best_waste as i64, best_height as i64),
            )
        })
    }

    /// Supporting y for an item whose left edge sits on segment `index`, or
    /// `None` if it would stick out of the bin. The item rests on the highest
    /// segment under its span.
    fn rectangle_fits(&self, index: usize, width: u32, height: u32) -> Option<u32> {
        let x = self.skyline[index].x;
        if x as u64 + width as u64 > self.config.width as u64 {
            return None;
        }
        let mut width_left = width;
        let mut i = index;
        let mut y = self.skyline[index].y;
        while width_left > 0 {
            y = y.max(self.skyline[i].y);
            if y as u64 + height as u64 > self.config.height as u64 {
                return None;
            }
            width_left = width_left.saturating_sub(self.skyline[i].w);
            i += 1;
            debug_assert!(i < self.skyline.len() || width_left == 0);
        }
        Some(y)
    }

    /// Area shed between the supporting level `y` and the segments under an
    /// item of `width` whose left edge sits on segment `index`.
    fn wasted_area(&self, index: usize, width: u32, y: u32) -> u64 {
        let rect_left = self.skyline[index].x;
        let rect_right = rect_left + width;
        let mut wasted: u64 = 0;
        let mut i = index;
        while i < self.skyline.len() && self.skyline[i].x < rect_right {
            let seg = self.skyline[i];
            if seg.x >= rect_right || seg.x + seg.w <= rect_left {
                break;
            }
            let left_side = seg.x;
            let right_side = rect_right.min(seg.x + seg.w);
            debug_assert!(y >= seg.y);
            wasted += (right_side - left_side) as u64 * (y - seg.y) as u64;
            i += 1;
        }
        wasted
    }

    /// Hands the gaps under `rect` to the waste map. Must run before the
    /// skyline is raised over them, while the segments still describe the
    /// old contour.
    fn add_waste_areas(&mut self, index: usize, rect: &Rect) {
        let wm = match self.waste.as_mut() {
            Some(wm) => wm,
            None => return,
        };
        let rect_left = rect.x;
        let rect_right = rect.x + rect.w;
        let mut i = index;
        while i < self.skyline.len() && self.skyline[i].x < rect_right {
            let seg = self.skyline[i];
            if seg.x >= rect_right || seg.x + seg.w <= rect_left {
                break;
            }
            let left_side = seg.x;
            let right_side = rect_right.min(seg.x + seg.w);
            debug_assert!(rect.y >= seg.y);
            wm.add_free_rect(Rect::new(
                left_side,
                seg.y,
                right_side - left_side,
                rect.y - seg.y,
            ));
            i += 1;
        }
    }

    /// Raises the skyline over `rect`: records the shed gaps, inserts the new
    /// top segment, clips or removes the segments it shadows, then merges
    /// equal-height neighbors.
    fn add_skyline_level(&mut self, index: usize, rect: &Rect) {
        self.add_waste_areas(index, rect);

        let node = SkylineNode {
            x: rect.x,
            y: rect.y + rect.h,
            w: rect.w,
        };
        debug_assert!(node.x + node.w <= self.config.width);
        debug_assert!(node.y <= self.config.height);
        self.skyline.insert(index, node);

        let i = index + 1;
        while i < self.skyline.len() {
            debug_assert!(self.skyline[i - 1].x <= self.skyline[i].x);
            if self.skyline[i].x < self.skyline[i - 1].x + self.skyline[i - 1].w {
                let shrink = self.skyline[i - 1].x + self.skyline[i - 1].w - self.skyline[i].x;
                if self.skyline[i].w <= shrink {
                    self.skyline.remove(i);
                } else {
                    self.skyline[i].x += shrink;
                    self.skyline[i].w -= shrink;
                    break;
                }
            } else {
                break;
            }
        }
        self.merge();
    }

    /// Joins neighboring segments at the same height.
    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skyline.len() {
            if self.skyline[i - 1].y == self.skyline[i].y {
                self.skyline[i - 1].w += self.skyline[i].w;
                self.skyline.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl BinPacker for SkylinePacker {
    fn can_insert(&self, width: u32, height: u32) -> bool {
        let heuristic = self.config.skyline_heuristic.clone();
        SkylinePacker::can_insert(self, width, height, &heuristic)
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<Placement> {
        let heuristic = self.config.skyline_heuristic.clone();
        SkylinePacker::insert(self, width, height, heuristic)
    }

    fn insert_batch(&mut self, items: Vec<RectSize>) -> Vec<Placement> {
        let heuristic = self.config.skyline_heuristic.clone();
        SkylinePacker::insert_batch(self, items, heuristic)
    }

    fn occupancy(&self) -> f64 {
        SkylinePacker::occupancy(self)
    }

    fn reset(&mut self) {
        SkylinePacker::reset(self)
    }
}
