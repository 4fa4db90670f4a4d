use tracing::instrument;

use super::BinPacker;
use crate::config::{MaxRectsHeuristic, PackerConfig};
use crate::model::{Placement, Rect, RectSize};

/// MaxRects packer: the free list keeps maximal free rectangles, which may
/// overlap each other. Placements never overlap; after each one, every free
/// rectangle the item intersects is split into the up-to-four maximal
/// leftovers and the list is pruned of contained entries.
pub struct MaxRectsPacker {
    config: PackerConfig,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl MaxRectsPacker {
    pub fn new(config: PackerConfig) -> Self {
        let bin = Rect::new(0, 0, config.width, config.height);
        Self {
            config,
            free: vec![bin],
            used: Vec::new(),
        }
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

    pub fn can_insert(&self, width: u32, height: u32, heuristic: &MaxRectsHeuristic) -> bool {
        self.score_rect(width, height, heuristic).is_some()
    }

    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        heuristic: MaxRectsHeuristic,
    ) -> Option<Placement> {
        let (node, rotated, _, _) = self.score_rect(width, height, &heuristic)?;
        self.place_rect(&node);
        Some(Placement {
            rect: node,
            rotated,
        })
    }

    /// Greedy batch insert: each round scores the best position of every
    /// remaining item and commits the one with the lowest score pair.
    /// Unplaced leftovers are skipped.
    #[instrument(skip_all)]
    pub fn insert_batch(
        &mut self,
        mut items: Vec<RectSize>,
        heuristic: MaxRectsHeuristic,
    ) -> Vec<Placement> {
        let mut out = Vec::new();
        while !items.is_empty() {
            let mut best_score1 = i64::MAX;
            let mut best_score2 = i64::MAX;
            let mut best_item: Option<usize> = None;
            let mut best_node = Rect::new(0, 0, 0, 0);
            let mut best_rotated = false;

            for (i, it) in items.iter().enumerate() {
                if let Some((node, rotated, s1, s2)) = self.score_rect(it.w, it.h, &heuristic) {
                    if s1 < best_score1 || (s1 == best_score1 && s2 < best_score2) {
                        best_score1 = s1;
                        best_score2 = s2;
                        best_item = Some(i);
                        best_node = node;
                        best_rotated = rotated;
                    }
                }
            }

            let item_index = match best_item {
                Some(i) => i,
                None => break,
            };
            self.place_rect(&best_node);
            out.push(Placement {
                rect: best_node,
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
    }

    /// Best position and its score pair for one item, or `None` if nothing
    /// fits. An exact fit in either orientation short-circuits the scan with
    /// a minimal score so it always wins.
    fn score_rect(
        &self,
        width: u32,
        height: u32,
        heuristic: &MaxRectsHeuristic,
    ) -> Option<(Rect, bool, i64, i64)> {
        let mut best_score1 = i64::MAX;
        let mut best_score2 = i64::MAX;
        let mut best_node: Option<Rect> = None;
        let mut best_rotated = false;

        for fr in &self.free {
            if fr.w >= width && fr.h >= height {
                if fr.w == width && fr.h == height {
                    return Some((Rect::new(fr.x, fr.y, width, height), false, i64::MIN, i64::MIN));
                }
                let (s1, s2) = self.score(fr, width, height, heuristic);
                if s1 < best_score1 || (s1 == best_score1 && s2 < best_score2) {
                    best_score1 = s1;
                    best_score2 = s2;
                    best_node = Some(Rect::new(fr.x, fr.y, width, height));
                    best_rotated = false;
                }
            }
            if self.config.allow_rotation && fr.w >= height && fr.h >= width {
                if fr.w == height && fr.h == width {
                    return Some((Rect::new(fr.x, fr.y, height, width), true, i64::MIN, i64::MIN));
                }
                let (s1, s2) = self.score(fr, height, width, heuristic);
                if s1 < best_score1 || (s1 == best_score1 && s2 < best_score2) {
                    best_score1 = s1;
                    best_score2 = s2;
                    best_node = Some(Rect::new(fr.x, fr.y, height, width));
                    best_rotated = true;
                }
            }
        }
        best_node.map(|node| (node, best_rotated, best_score1, best_score2))
    }

    /// Score pair of putting a `width x height` item at the top-left corner
    /// of `fr`. Lower compares better, lexicographically.
    fn score(
        &self,
        fr: &Rect,
        width: u32,
        height: u32,
        heuristic: &MaxRectsHeuristic,
    ) -> (i64, i64) {
        let leftover_h = (fr.w as i64 - width as i64).abs();
        let leftover_v = (fr.h as i64 - height as i64).abs();
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        let area_fit = fr.area() as i64 - (width as u64 * height as u64) as i64;
        match heuristic {
            MaxRectsHeuristic::BestAreaFit => (area_fit, short_fit),
            MaxRectsHeuristic::BestShortSideFit => (short_fit, long_fit),
            MaxRectsHeuristic::BestLongSideFit => (long_fit, short_fit),
            MaxRectsHeuristic::BottomLeft => (fr.y as i64 + height as i64, fr.x as i64),
            MaxRectsHeuristic::ContactPoint => {
                // Bigger contact is better, so negate for the minimizing compare.
                let contact = self.contact_point_score(fr.x, fr.y, width, height);
                (-(contact as i64), area_fit)
            }
        }
    }

    /// Total perimeter length the candidate would share with the bin borders
    /// and already placed rectangles.
    fn contact_point_score(&self, x: u32, y: u32, width: u32, height: u32) -> u64 {
        let mut score: u64 = 0;
        if x == 0 || x + width == self.config.width {
            score += height as u64;
        }
        if y == 0 || y + height == self.config.height {
            score += width as u64;
        }
        for u in &self.used {
            if u.x == x + width || u.right() == x {
                score += overlap_1d(u.y, u.bottom(), y, y + height) as u64;
            }
            if u.y == y + height || u.bottom() == y {
                score += overlap_1d(u.x, u.right(), x, x + width) as u64;
            }
        }
        score
    }

    /// Commits `node`: splits every intersecting free rectangle into its
    /// maximal leftovers, then prunes contained entries. Rectangles appended
    /// during the pass are left untouched; they cannot intersect `node`.
    fn place_rect(&mut self, node: &Rect) {
        let mut num_to_process = self.free.len();
        let mut i = 0;
        while i < num_to_process {
            let fr = self.free[i];
            if self.split_free_node(&fr, node) {
                self.free.remove(i);
                num_to_process -= 1;
            } else {
                i += 1;
            }
        }
        self.prune_free_list();
        self.used.push(*node);
    }

    /// If `fr` intersects `node`, appends the up-to-four maximal leftover
    /// rectangles of `fr` around `node` to the free list and reports true so
    /// the caller removes `fr`.
    fn split_free_node(&mut self, fr: &Rect, node: &Rect) -> bool {
        if !fr.intersects(node) {
            return false;
        }
        if node.x < fr.right() && node.right() > fr.x {
            // Leftover above the placed node.
            if node.y > fr.y && node.y < fr.bottom() {
                let mut top = *fr;
                top.h = node.y - fr.y;
                self.free.push(top);
            }
            // Leftover below.
            if node.bottom() < fr.bottom() {
                let mut bottom = *fr;
                bottom.y = node.bottom();
                bottom.h = fr.bottom() - node.bottom();
                self.free.push(bottom);
            }
        }
        if node.y < fr.bottom() && node.bottom() > fr.y {
            // Leftover on the left side.
            if node.x > fr.x && node.x < fr.right() {
                let mut left = *fr;
                left.w = node.x - fr.x;
                self.free.push(left);
            }
            // Leftover on the right side.
            if node.right() < fr.right() {
                let mut right = *fr;
                right.x = node.right();
                right.w = fr.right() - node.right();
                self.free.push(right);
            }
        }
        true
    }

    /// Drops every free rectangle fully contained in another one.
    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            let mut removed_i = false;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    self.free.remove(i);
                    removed_i = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.remove(j);
                } else {
                    j += 1;
                }
            }
            if !removed_i {
                i += 1;
            }
        }
    }
}

fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    let start = a1.max(b1);
    let end = a2.min(b2);
    end.saturating_sub(start)
}

impl BinPacker for MaxRectsPacker {
    fn can_insert(&self, width: u32, height: u32) -> bool {
        let heuristic = self.config.mr_heuristic.clone();
        MaxRectsPacker::can_insert(self, width, height, &heuristic)
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<Placement> {
        let heuristic = self.config.mr_heuristic.clone();
        MaxRectsPacker::insert(self, width, height, heuristic)
    }

    fn insert_batch(&mut self, items: Vec<RectSize>) -> Vec<Placement> {
        let heuristic = self.config.mr_heuristic.clone();
        MaxRectsPacker::insert_batch(self, items, heuristic)
    }

    fn occupancy(&self) -> f64 {
        MaxRectsPacker::occupancy(self)
    }

    fn reset(&mut self) {
        MaxRectsPacker::reset(self)
    }
}
