use binpack_core::config::{GuillotineChoice, GuillotineSplit, PackerConfig};
use binpack_core::packer::guillotine::GuillotinePacker;

fn cfg(w: u32, h: u32, allow_rotation: bool) -> PackerConfig {
    PackerConfig::builder()
        .with_dimensions(w, h)
        .allow_rotation(allow_rotation)
        .build()
}

#[test]
fn full_bin_exact_insert_then_reject() {
    let mut p = GuillotinePacker::new(cfg(10, 10, false));
    let placed = p
        .insert(
            10,
            10,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitMaximizeArea,
        )
        .expect("exact bin-sized item should fit");
    assert_eq!((placed.rect.x, placed.rect.y), (0, 0));
    assert_eq!((placed.rect.w, placed.rect.h), (10, 10));
    assert!(!placed.rotated);
    assert!((p.occupancy() - 1.0).abs() < 1e-9);

    let second = p.insert(
        1,
        1,
        false,
        GuillotineChoice::BestAreaFit,
        GuillotineSplit::SplitMaximizeArea,
    );
    assert!(second.is_none(), "full bin must reject everything");
}

#[test]
fn exact_fit_wins_over_heuristic_preference() {
    // Leaves two free rects: a 20x5 strip at (0,5) and a 5x5 square at (15,0).
    let mut p = GuillotinePacker::new(cfg(20, 10, false));
    p.insert(
        15,
        5,
        false,
        GuillotineChoice::BestAreaFit,
        GuillotineSplit::SplitShorterLeftoverAxis,
    )
    .expect("first item fits");
    assert_eq!(p.free_rect_count(), 2);

    // WorstAreaFit prefers the big strip, but the exact 5x5 fit must win.
    let placed = p
        .insert(
            5,
            5,
            false,
            GuillotineChoice::WorstAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        )
        .expect("5x5 fits");
    assert_eq!((placed.rect.x, placed.rect.y), (15, 0));
    assert_eq!((placed.rect.w, placed.rect.h), (5, 5));
}

#[test]
fn rotates_when_only_rotated_fits() {
    let mut p = GuillotinePacker::new(cfg(16, 12, true));
    let placed = p
        .insert(
            8,
            14,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        )
        .expect("rotated fit should succeed");
    assert!(placed.rotated, "should rotate because only rotated fits");
    assert_eq!(placed.rect.w, 14);
    assert_eq!(placed.rect.h, 8);
}

#[test]
fn no_rotation_rejects_rotated_only_fit() {
    let mut p = GuillotinePacker::new(cfg(16, 12, false));
    let placed = p.insert(
        8,
        14,
        false,
        GuillotineChoice::BestAreaFit,
        GuillotineSplit::SplitShorterLeftoverAxis,
    );
    assert!(placed.is_none());
}

#[test]
fn split_rule_changes_what_fits_later() {
    // After placing 6x4, SplitMinimizeArea keeps a full-width 10x6 strip
    // while SplitMaximizeArea cuts the leftover the other way; only the
    // former can still take a 10x6 item.
    let mut keep_strip = GuillotinePacker::new(cfg(10, 10, false));
    keep_strip
        .insert(
            6,
            4,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitMinimizeArea,
        )
        .expect("fits");
    let placed = keep_strip
        .insert(
            10,
            6,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitMinimizeArea,
        )
        .expect("full-width strip survived the split");
    assert_eq!((placed.rect.x, placed.rect.y), (0, 4));
    assert_eq!((placed.rect.w, placed.rect.h), (10, 6));

    let mut cut_strip = GuillotinePacker::new(cfg(10, 10, false));
    cut_strip
        .insert(
            6,
            4,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitMaximizeArea,
        )
        .expect("fits");
    let placed = cut_strip.insert(
        10,
        6,
        false,
        GuillotineChoice::BestAreaFit,
        GuillotineSplit::SplitMaximizeArea,
    );
    assert!(placed.is_none());
}

#[test]
fn three_piece_perfect_pack() {
    let mut p = GuillotinePacker::new(cfg(6, 6, false));
    let a = p
        .insert(
            4,
            4,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        )
        .expect("fits");
    let b = p
        .insert(
            6,
            2,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        )
        .expect("fits");
    let c = p
        .insert(
            2,
            4,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        )
        .expect("fits");
    assert_eq!((a.rect.x, a.rect.y), (0, 0));
    assert_eq!((b.rect.x, b.rect.y), (0, 4));
    assert_eq!((c.rect.x, c.rect.y), (4, 0));
    assert!((p.occupancy() - 1.0).abs() < 1e-9);
    assert_eq!(p.free_rect_count(), 0);
    assert_eq!(p.used_rect_count(), 3);
}

#[test]
fn merge_flag_does_not_change_clean_sequences() {
    // Nothing in this sequence produces mergeable neighbors, so packing with
    // and without the merge pass must place identically.
    let items = [(6u32, 4u32), (4, 4), (10, 2), (4, 2)];
    let mut with_merge = GuillotinePacker::new(cfg(10, 10, false));
    let mut without = GuillotinePacker::new(cfg(10, 10, false));
    for (w, h) in items {
        let a = with_merge.insert(
            w,
            h,
            true,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        );
        let b = without.insert(
            w,
            h,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        );
        assert_eq!(a, b);
    }
    assert_eq!(with_merge.free_rect_count(), without.free_rect_count());
}

#[test]
fn reset_restores_empty_bin() {
    let mut p = GuillotinePacker::new(cfg(10, 10, false));
    p.insert(
        4,
        4,
        false,
        GuillotineChoice::BestAreaFit,
        GuillotineSplit::SplitShorterLeftoverAxis,
    )
    .expect("fits");
    assert!(p.occupancy() > 0.0);
    p.reset();
    assert_eq!(p.occupancy(), 0.0);
    assert_eq!(p.free_rect_count(), 1);
    assert_eq!(p.used_rect_count(), 0);
    let placed = p
        .insert(
            10,
            10,
            false,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        )
        .expect("whole bin is free again");
    assert_eq!((placed.rect.w, placed.rect.h), (10, 10));
}
