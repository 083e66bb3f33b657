// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use proptest::prelude::*;
use vt_common::geometry::{Coordinate, Margin, Range, WindowSize};

#[test]
fn range_length_is_inclusive() {
    assert_eq!(Range::new(1, 1).len(), 1);
    assert_eq!(Range::new(1, 80).len(), 80);
    assert_eq!(Range::new(5, 10).len(), 6);
}

#[test]
fn range_contains_boundaries() {
    let r = Range::new(5, 10);
    assert!(r.contains(5));
    assert!(r.contains(10));
    assert!(!r.contains(4));
    assert!(!r.contains(11));
}

#[test]
fn margin_full_screen_covers_everything() {
    let m = Margin::full_screen(25, 80);
    assert_eq!(m.vertical, Range::new(1, 25));
    assert_eq!(m.horizontal, Range::new(1, 80));
}

#[test]
fn coordinate_display_matches_row_column_order() {
    let c = Coordinate::new(5, 1);
    assert_eq!(c.to_string(), "(5, 1)");
}

#[test]
fn window_size_stores_rows_and_columns() {
    let w = WindowSize::new(25, 80);
    assert_eq!(w.rows, 25);
    assert_eq!(w.columns, 80);
}

proptest! {
    #[test]
    fn range_len_matches_definition(from in 1usize..1000, extra in 0usize..1000) {
        let r = Range::new(from, from + extra);
        prop_assert_eq!(r.len(), extra + 1);
    }
}
