use binpack_core::config::{MaxRectsHeuristic, PackerConfig};
use binpack_core::model::RectSize;
use binpack_core::packer::maxrects::MaxRectsPacker;

fn cfg(w: u32, h: u32) -> PackerConfig {
    PackerConfig::builder()
        .with_dimensions(w, h)
        .allow_rotation(false)
        .build()
}

#[test]
fn batch_is_global_greedy_not_input_order() {
    let mut p = MaxRectsPacker::new(cfg(10, 10));
    let items = vec![RectSize::new(2, 2), RectSize::new(9, 9)];
    let placed = p.insert_batch(items, MaxRectsHeuristic::BestAreaFit);
    // The 9x9 scores far better in the empty bin and goes first; the 2x2
    // then has no strip wide enough left.
    assert_eq!(placed.len(), 1);
    assert_eq!((placed[0].rect.x, placed[0].rect.y), (0, 0));
    assert_eq!((placed[0].rect.w, placed[0].rect.h), (9, 9));
}

#[test]
fn batch_matches_replayed_single_inserts() {
    let mut batch = MaxRectsPacker::new(cfg(8, 8));
    let items = vec![RectSize::new(3, 5), RectSize::new(6, 2), RectSize::new(2, 2)];
    let placed = batch.insert_batch(items, MaxRectsHeuristic::BestAreaFit);
    assert_eq!(placed.len(), 3);

    let mut single = MaxRectsPacker::new(cfg(8, 8));
    for expected in &placed {
        let got = single
            .insert(expected.rect.w, expected.rect.h, MaxRectsHeuristic::BestAreaFit)
            .expect("replayed item fits");
        assert_eq!(got, *expected);
    }
    assert!((batch.occupancy() - single.occupancy()).abs() < 1e-9);
}

#[test]
fn batch_result_stays_disjoint_and_contained() {
    let mut p = MaxRectsPacker::new(cfg(64, 64));
    let mut items = Vec::new();
    for i in 0..12u32 {
        items.push(RectSize::new(6 + (i * 5) % 17, 4 + (i * 7) % 13));
    }
    let placed = p.insert_batch(items, MaxRectsHeuristic::BestShortSideFit);
    assert!(!placed.is_empty());
    for p1 in &placed {
        assert!(p1.rect.right() <= 64 && p1.rect.bottom() <= 64);
    }
    for i in 0..placed.len() {
        for j in (i + 1)..placed.len() {
            assert!(
                placed[i].rect.disjoint(&placed[j].rect),
                "{:?} overlaps {:?}",
                placed[i].rect,
                placed[j].rect
            );
        }
    }
}
