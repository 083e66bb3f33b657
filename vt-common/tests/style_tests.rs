// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vt_common::style::Style;

#[test]
fn default_is_empty() {
    assert_eq!(Style::default(), Style::empty());
}

#[test]
fn set_and_clear_round_trip() {
    let mut s = Style::default();
    assert!(!s.is_set(Style::BOLD));
    s.set_mask(Style::BOLD);
    assert!(s.is_set(Style::BOLD));
    s.clear_mask(Style::BOLD);
    assert!(!s.is_set(Style::BOLD));
}

#[test]
fn masks_are_independent() {
    let mut s = Style::default();
    s.set_mask(Style::BOLD);
    s.set_mask(Style::UNDERLINE);
    assert!(s.is_set(Style::BOLD));
    assert!(s.is_set(Style::UNDERLINE));
    assert!(!s.is_set(Style::ITALIC));

    s.clear_mask(Style::BOLD);
    assert!(!s.is_set(Style::BOLD));
    assert!(s.is_set(Style::UNDERLINE));
}
