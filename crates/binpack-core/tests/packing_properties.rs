use binpack_core::config::PackerConfig;
use binpack_core::model::Placement;
use binpack_core::packer::guillotine::GuillotinePacker;
use binpack_core::packer::maxrects::MaxRectsPacker;
use binpack_core::packer::shelf::ShelfPacker;
use binpack_core::packer::shelf_next_fit::ShelfNextFitPacker;
use binpack_core::packer::skyline::SkylinePacker;
use binpack_core::packer::BinPacker;
use rand::{Rng, SeedableRng};

fn packers(cfg: &PackerConfig) -> Vec<(&'static str, Box<dyn BinPacker>)> {
    vec![
        ("guillotine", Box::new(GuillotinePacker::new(cfg.clone()))),
        ("maxrects", Box::new(MaxRectsPacker::new(cfg.clone()))),
        ("skyline", Box::new(SkylinePacker::new(cfg.clone()))),
        ("shelf", Box::new(ShelfPacker::new(cfg.clone()))),
        (
            "shelf_next_fit",
            Box::new(ShelfNextFitPacker::new(cfg.clone())),
        ),
    ]
}

fn run_sequence(packer: &mut dyn BinPacker, items: &[(u32, u32)]) -> Vec<(u32, u32, Placement)> {
    let mut placed = Vec::new();
    for (w, h) in items.iter().cloned() {
        let predicted = packer.can_insert(w, h);
        match packer.insert(w, h) {
            Some(p) => {
                assert!(predicted, "can_insert said no but insert placed {}x{}", w, h);
                placed.push((w, h, p));
            }
            None => {
                assert!(!predicted, "can_insert said yes but insert failed {}x{}", w, h);
            }
        }
    }
    placed
}

fn random_items(count: usize, max_side: u32) -> Vec<(u32, u32)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xDEADBEEF);
    (0..count)
        .map(|_| (rng.gen_range(1..=max_side), rng.gen_range(1..=max_side)))
        .collect()
}

#[test]
fn placements_stay_inside_bin_and_disjoint() {
    let cfg = PackerConfig::builder()
        .with_dimensions(256, 256)
        .allow_rotation(true)
        .build();
    let items = random_items(300, 40);
    for (name, mut packer) in packers(&cfg) {
        let placed = run_sequence(packer.as_mut(), &items);
        assert!(!placed.is_empty(), "{}: nothing placed at all", name);
        for (_, _, p) in &placed {
            assert!(
                p.rect.right() <= 256 && p.rect.bottom() <= 256,
                "{}: {:?} sticks out of the bin",
                name,
                p.rect
            );
            assert!(p.rect.w > 0 && p.rect.h > 0);
        }
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                assert!(
                    placed[i].2.rect.disjoint(&placed[j].2.rect),
                    "{}: {:?} overlaps {:?}",
                    name,
                    placed[i].2.rect,
                    placed[j].2.rect
                );
            }
        }
    }
}

#[test]
fn occupancy_matches_placed_area_and_is_idempotent() {
    let cfg = PackerConfig::builder()
        .with_dimensions(200, 200)
        .allow_rotation(true)
        .use_waste_map(true)
        .build();
    let items = random_items(200, 50);
    let bin_area = 200.0 * 200.0;
    for (name, mut packer) in packers(&cfg) {
        let placed = run_sequence(packer.as_mut(), &items);
        let used: u64 = placed.iter().map(|(_, _, p)| p.rect.area()).sum();
        let occ = packer.occupancy();
        assert!(
            (occ - used as f64 / bin_area).abs() < 1e-9,
            "{}: occupancy {} != placed area ratio {}",
            name,
            occ,
            used as f64 / bin_area
        );
        assert!(occ >= 0.0 && occ <= 1.0, "{}: occupancy out of range", name);
        assert_eq!(occ.to_bits(), packer.occupancy().to_bits(), "{}", name);
    }
}

#[test]
fn rotation_disabled_preserves_request_dimensions() {
    let cfg = PackerConfig::builder()
        .with_dimensions(128, 128)
        .allow_rotation(false)
        .build();
    let items = random_items(150, 30);
    for (name, mut packer) in packers(&cfg) {
        let placed = run_sequence(packer.as_mut(), &items);
        for (w, h, p) in &placed {
            assert!(!p.rotated, "{}: rotated a request with rotation off", name);
            assert_eq!(
                (p.rect.w, p.rect.h),
                (*w, *h),
                "{}: dimensions changed with rotation off",
                name
            );
        }
    }
}

#[test]
fn reset_allows_identical_repacking() {
    let cfg = PackerConfig::builder()
        .with_dimensions(96, 96)
        .allow_rotation(true)
        .build();
    let items = random_items(80, 24);
    for (name, mut packer) in packers(&cfg) {
        let first = run_sequence(packer.as_mut(), &items);
        packer.reset();
        assert_eq!(packer.occupancy(), 0.0, "{}", name);
        let second = run_sequence(packer.as_mut(), &items);
        assert_eq!(first, second, "{}: repack after reset diverged", name);
    }
}
