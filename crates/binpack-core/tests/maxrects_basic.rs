use binpack_core::config::{MaxRectsHeuristic, PackerConfig};
use binpack_core::packer::maxrects::MaxRectsPacker;

fn cfg(w: u32, h: u32, allow_rotation: bool) -> PackerConfig {
    PackerConfig::builder()
        .with_dimensions(w, h)
        .allow_rotation(allow_rotation)
        .build()
}

#[test]
fn upright_fit_wins_over_rotated_candidate() {
    let mut p = MaxRectsPacker::new(cfg(5, 5, true));
    let first = p
        .insert(1, 5, MaxRectsHeuristic::BestShortSideFit)
        .expect("tall strip fits");
    assert_eq!((first.rect.x, first.rect.y), (0, 0));
    assert_eq!((first.rect.w, first.rect.h), (1, 5));
    assert!(!first.rotated);

    // The 4x1 fits upright in the remaining 4x5 region; rotation must not
    // be preferred when upright already fits better.
    let second = p
        .insert(4, 1, MaxRectsHeuristic::BestShortSideFit)
        .expect("bar fits upright");
    assert_eq!((second.rect.x, second.rect.y), (1, 0));
    assert_eq!((second.rect.w, second.rect.h), (4, 1));
    assert!(!second.rotated);

    assert!((p.occupancy() - 9.0 / 25.0).abs() < 1e-9);
}

#[test]
fn contact_point_then_exact_fit_fills_bin() {
    let mut p = MaxRectsPacker::new(cfg(10, 10, false));
    let a = p
        .insert(6, 6, MaxRectsHeuristic::ContactPoint)
        .expect("fits");
    assert_eq!((a.rect.x, a.rect.y), (0, 0));
    // Two maximal leftovers overlap below and to the right of the square.
    assert_eq!(p.free_rect_count(), 2);

    // Exact 4x10 column: short-circuits as a perfect match even under
    // BottomLeft, which would otherwise prefer the lower strip.
    let b = p
        .insert(4, 10, MaxRectsHeuristic::BottomLeft)
        .expect("fits");
    assert_eq!((b.rect.x, b.rect.y), (6, 0));
    assert_eq!((b.rect.w, b.rect.h), (4, 10));

    let c = p
        .insert(6, 4, MaxRectsHeuristic::BestAreaFit)
        .expect("fits");
    assert_eq!((c.rect.x, c.rect.y), (0, 6));
    assert!((p.occupancy() - 1.0).abs() < 1e-9);
    assert_eq!(p.free_rect_count(), 0);
}

#[test]
fn bottom_left_prefers_lower_position() {
    let mut p = MaxRectsPacker::new(cfg(10, 10, false));
    p.insert(3, 3, MaxRectsHeuristic::BottomLeft)
        .expect("fits");
    let second = p
        .insert(3, 3, MaxRectsHeuristic::BottomLeft)
        .expect("fits");
    // Beside the first item, not on top of it.
    assert_eq!((second.rect.x, second.rect.y), (3, 0));
}

#[test]
fn rotation_gate_controls_sideways_fit() {
    let mut p = MaxRectsPacker::new(cfg(12, 4, false));
    assert!(p.insert(3, 12, MaxRectsHeuristic::BestAreaFit).is_none());
    assert!(!p.can_insert(3, 12, &MaxRectsHeuristic::BestAreaFit));

    let mut p = MaxRectsPacker::new(cfg(12, 4, true));
    assert!(p.can_insert(3, 12, &MaxRectsHeuristic::BestAreaFit));
    let placed = p
        .insert(3, 12, MaxRectsHeuristic::BestAreaFit)
        .expect("fits rotated");
    assert!(placed.rotated);
    assert_eq!((placed.rect.w, placed.rect.h), (12, 3));
}

#[test]
fn reset_restores_empty_bin() {
    let mut p = MaxRectsPacker::new(cfg(8, 8, false));
    p.insert(5, 5, MaxRectsHeuristic::BestAreaFit).expect("fits");
    p.reset();
    assert_eq!(p.occupancy(), 0.0);
    assert_eq!(p.free_rect_count(), 1);
    assert_eq!(p.used_rect_count(), 0);
    let placed = p
        .insert(8, 8, MaxRectsHeuristic::BestAreaFit)
        .expect("whole bin is free again");
    assert_eq!((placed.rect.w, placed.rect.h), (8, 8));
}
