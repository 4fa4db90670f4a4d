use binpack_core::config::{PackerConfig, SkylineHeuristic};
use binpack_core::model::Placement;
use binpack_core::packer::skyline::SkylinePacker;
use rand::{Rng, SeedableRng};

fn make_cfg(use_waste_map: bool) -> PackerConfig {
    PackerConfig::builder()
        .with_dimensions(2048, 2048)
        .allow_rotation(true)
        .use_waste_map(use_waste_map)
        .build()
}

fn disjoint(placements: &[Placement]) -> bool {
    for i in 0..placements.len() {
        for j in (i + 1)..placements.len() {
            if placements[i].rect.intersects(&placements[j].rect) {
                return false;
            }
        }
    }
    true
}

fn occupancy_of(placements: &[Placement], bin_area: u64) -> f64 {
    let used: u64 = placements.iter().map(|p| p.rect.area()).sum();
    used as f64 / bin_area as f64
}

#[test]
fn waste_map_improves_or_equal_occupancy() {
    // deterministic set of rectangles
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xDEADBEEF);
    let mut rects: Vec<(u32, u32)> = Vec::new();
    for _ in 0..2000u32 {
        let w = rng.gen_range(4..=128);
        let h = rng.gen_range(4..=128);
        rects.push((w, h));
    }
    let bin_area = 2048u64 * 2048;

    let mut plain = SkylinePacker::new(make_cfg(false));
    let mut placed_plain: Vec<Placement> = Vec::new();
    for (w, h) in rects.iter().cloned() {
        if let Some(p) = plain.insert(w, h, SkylineHeuristic::MinWaste) {
            placed_plain.push(p);
        } else {
            break;
        }
    }
    assert!(disjoint(&placed_plain));
    let occ_plain = occupancy_of(&placed_plain, bin_area);
    assert!((plain.occupancy() - occ_plain).abs() < 1e-9);

    let mut waste = SkylinePacker::new(make_cfg(true));
    let mut placed_waste: Vec<Placement> = Vec::new();
    for (w, h) in rects.iter().cloned() {
        if let Some(p) = waste.insert(w, h, SkylineHeuristic::MinWaste) {
            placed_waste.push(p);
        } else {
            break;
        }
    }
    assert!(disjoint(&placed_waste));
    let occ_waste = occupancy_of(&placed_waste, bin_area);

    assert!(
        occ_waste + 1e-9 >= occ_plain,
        "waste-map occupancy {} should be >= plain {}",
        occ_waste,
        occ_plain
    );
}

#[test]
fn waste_map_recovers_area_shed_under_an_overhang() {
    // A 9x5 slab placed over a 2-high step sheds a 6x2 pocket; only the
    // waste-map packer can give that pocket out again.
    let mut p = SkylinePacker::new(
        PackerConfig::builder()
            .with_dimensions(10, 10)
            .allow_rotation(false)
            .use_waste_map(true)
            .build(),
    );
    let a = p.insert(3, 4, SkylineHeuristic::BottomLeft).expect("fits");
    let b = p.insert(7, 2, SkylineHeuristic::BottomLeft).expect("fits");
    let c = p.insert(9, 5, SkylineHeuristic::BottomLeft).expect("fits");
    assert_eq!((a.rect.x, a.rect.y), (0, 0));
    assert_eq!((b.rect.x, b.rect.y), (3, 0));
    assert_eq!((c.rect.x, c.rect.y), (0, 4));

    let pocket = p
        .insert(6, 2, SkylineHeuristic::BottomLeft)
        .expect("pocket under the slab is reusable");
    assert_eq!((pocket.rect.x, pocket.rect.y), (3, 2));
    assert_eq!((pocket.rect.w, pocket.rect.h), (6, 2));

    // Without the waste map the same sequence has nowhere for the 6x2.
    let mut plain = SkylinePacker::new(
        PackerConfig::builder()
            .with_dimensions(10, 10)
            .allow_rotation(false)
            .build(),
    );
    plain.insert(3, 4, SkylineHeuristic::BottomLeft).expect("fits");
    plain.insert(7, 2, SkylineHeuristic::BottomLeft).expect("fits");
    plain.insert(9, 5, SkylineHeuristic::BottomLeft).expect("fits");
    assert!(plain.insert(6, 2, SkylineHeuristic::BottomLeft).is_none());
}
