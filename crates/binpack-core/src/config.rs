use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{BinPackError, Result};

/// Free-rectangle choice heuristic for the guillotine packer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FromStr for GuillotineChoice {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(GuillotineChoice::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(GuillotineChoice::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(GuillotineChoice::BestLongSideFit),
            "waf" | "worstareafit" => Ok(GuillotineChoice::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(GuillotineChoice::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(GuillotineChoice::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Split axis heuristic for the guillotine packer: how the L-shaped leftover
/// of a free rectangle is cut into two after a placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(GuillotineSplit::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(GuillotineSplit::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(GuillotineSplit::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(GuillotineSplit::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(GuillotineSplit::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(GuillotineSplit::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// Position scoring heuristic for the MaxRects packer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaxRectsHeuristic {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    BottomLeft,
    ContactPoint,
}

impl FromStr for MaxRectsHeuristic {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(MaxRectsHeuristic::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(MaxRectsHeuristic::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(MaxRectsHeuristic::BestLongSideFit),
            "bl" | "bottomleft" => Ok(MaxRectsHeuristic::BottomLeft),
            "cp" | "contactpoint" => Ok(MaxRectsHeuristic::ContactPoint),
            _ => Err(()),
        }
    }
}

/// Level choice heuristic for the skyline packer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkylineHeuristic {
    BottomLeft,
    MinWaste,
}

impl FromStr for SkylineHeuristic {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bl" | "bottomleft" => Ok(SkylineHeuristic::BottomLeft),
            "mw" | "minwaste" => Ok(SkylineHeuristic::MinWaste),
            _ => Err(()),
        }
    }
}

/// Shelf choice heuristic for the shelf packer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShelfHeuristic {
    NextFit,
    FirstFit,
    BestAreaFit,
    WorstAreaFit,
    BestHeightFit,
    BestWidthFit,
    WorstWidthFit,
}

impl FromStr for ShelfHeuristic {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nf" | "nextfit" => Ok(ShelfHeuristic::NextFit),
            "ff" | "firstfit" => Ok(ShelfHeuristic::FirstFit),
            "baf" | "bestareafit" => Ok(ShelfHeuristic::BestAreaFit),
            "waf" | "worstareafit" => Ok(ShelfHeuristic::WorstAreaFit),
            "bhf" | "bestheightfit" => Ok(ShelfHeuristic::BestHeightFit),
            "bwf" | "bestwidthfit" => Ok(ShelfHeuristic::BestWidthFit),
            "wwf" | "worstwidthfit" => Ok(ShelfHeuristic::WorstWidthFit),
            _ => Err(()),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_g_choice() -> GuillotineChoice {
    GuillotineChoice::BestAreaFit
}
fn default_g_split() -> GuillotineSplit {
    GuillotineSplit::SplitShorterLeftoverAxis
}
fn default_mr_heuristic() -> MaxRectsHeuristic {
    MaxRectsHeuristic::BestAreaFit
}
fn default_skyline_heuristic() -> SkylineHeuristic {
    SkylineHeuristic::BottomLeft
}
fn default_shelf_heuristic() -> ShelfHeuristic {
    ShelfHeuristic::FirstFit
}

/// Packing configuration. `width`/`height` fix the bin; the heuristic fields
/// select the strategy a packer falls back to when it is driven through the
/// [`BinPacker`](crate::packer::BinPacker) trait instead of the per-call APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Bin width.
    pub width: u32,
    /// Bin height.
    pub height: u32,
    /// Allow storing items rotated by 90 degrees.
    #[serde(default = "default_true")]
    pub allow_rotation: bool,
    /// Recover shelf/skyline fragmentation through a guillotine waste map.
    #[serde(default)]
    pub use_waste_map: bool,
    /// Guillotine free-rect choice rule.
    #[serde(default = "default_g_choice")]
    pub g_choice: GuillotineChoice,
    /// Guillotine split rule.
    #[serde(default = "default_g_split")]
    pub g_split: GuillotineSplit,
    /// Merge the guillotine free list after each insert.
    #[serde(default)]
    pub g_merge: bool,
    /// MaxRects position rule.
    #[serde(default = "default_mr_heuristic")]
    pub mr_heuristic: MaxRectsHeuristic,
    /// Skyline level rule.
    #[serde(default = "default_skyline_heuristic")]
    pub skyline_heuristic: SkylineHeuristic,
    /// Shelf choice rule.
    #[serde(default = "default_shelf_heuristic")]
    pub shelf_heuristic: ShelfHeuristic,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            allow_rotation: true,
            use_waste_map: false,
            g_choice: default_g_choice(),
            g_split: default_g_split(),
            g_merge: false,
            mr_heuristic: default_mr_heuristic(),
            skyline_heuristic: default_skyline_heuristic(),
            shelf_heuristic: default_shelf_heuristic(),
        }
    }
}

impl PackerConfig {
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }

    /// Checks the configuration for values the packers cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BinPackError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        // Scores are computed in i64; cap the dimensions so w*h stays in range.
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(BinPackError::InvalidConfig(format!(
                "bin dimensions must be <= {}",
                i32::MAX
            )));
        }
        Ok(())
    }
}

/// Chained builder for [`PackerConfig`].
#[derive(Debug, Clone, Default)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.cfg.width = width;
        self.cfg.height = height;
        self
    }

    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }

    pub fn use_waste_map(mut self, v: bool) -> Self {
        self.cfg.use_waste_map = v;
        self
    }

    pub fn g_choice(mut self, v: GuillotineChoice) -> Self {
        self.cfg.g_choice = v;
        self
    }

    pub fn g_split(mut self, v: GuillotineSplit) -> Self {
        self.cfg.g_split = v;
        self
    }

    pub fn g_merge(mut self, v: bool) -> Self {
        self.cfg.g_merge = v;
        self
    }

    pub fn mr_heuristic(mut self, v: MaxRectsHeuristic) -> Self {
        self.cfg.mr_heuristic = v;
        self
    }

    pub fn skyline_heuristic(mut self, v: SkylineHeuristic) -> Self {
        self.cfg.skyline_heuristic = v;
        self
    }

    pub fn shelf_heuristic(mut self, v: ShelfHeuristic) -> Self {
        self.cfg.shelf_heuristic = v;
        self
    }

    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}
