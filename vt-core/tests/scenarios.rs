// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Black-box end-to-end scenarios driving [`Screen`] through its public
//! `write`/query API only, the way a pty consumer would.

use std::cell::RefCell;
use std::rc::Rc;

use vt_common::geometry::{Coordinate, WindowSize};
use vt_core::screen::Screen;

fn screen(rows: usize, cols: usize) -> Screen {
    Screen::new(WindowSize::new(rows, cols))
}

#[test_log::test]
fn utf8_single_scalar_updates_grid_and_cursor() {
    let mut s = screen(25, 80);
    s.write(&[0xC3, 0xB6]); // 'ö'
    assert_eq!(s.render_text_line(1).chars().next(), Some('ö'));
    assert_eq!(s.real_cursor_position(), Coordinate::new(1, 2));
}

#[test_log::test]
fn utf8_embedded_scalar_between_ascii() {
    let mut s = screen(25, 80);
    s.write(&[0x41, 0xC3, 0xB6, 0x5A]); // "A" 'ö' "Z"
    let line = s.render_text_line(1);
    assert!(line.starts_with("AöZ"));
}

#[test_log::test]
fn line_wrap_at_right_margin_carries_into_next_row() {
    let mut s = screen(25, 80);
    s.write(&[b'X'; 80]);
    s.write(b"Y");
    assert_eq!(s.real_cursor_position(), Coordinate::new(2, 2));
    assert_eq!(s.render_text_line(1).trim_end(), "X".repeat(80));
    assert_eq!(s.render_text_line(2).chars().next(), Some('Y'));
}

#[test_log::test]
fn scroll_past_bottom_of_primary_screen_feeds_scrollback() {
    let mut s = screen(3, 10);
    s.write(b"A\r\nB\r\nC\r\nD\r\n");
    assert_eq!(s.render_text_line(1).trim_end(), "B");
    assert_eq!(s.render_text_line(2).trim_end(), "C");
    assert_eq!(s.render_text_line(3).trim_end(), "D");
    assert!(s.scrollback_lines() >= 1);
    assert_eq!(s.render_history_text_line(1).unwrap().trim_end(), "A");
}

#[test_log::test]
fn decstbm_then_origin_mode_then_home_reports_margin_relative_cursor() {
    let mut s = screen(25, 80);
    s.write(b"\x1b[5;10r");
    s.write(b"\x1b[?6h");
    s.write(b"\x1b[H");
    assert_eq!(s.real_cursor_position(), Coordinate::new(5, 1));
    assert_eq!(s.cursor_position(), Coordinate::new(1, 1));
}

#[test_log::test]
fn device_attributes_request_replies_with_da1() {
    let replies = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::clone(&replies);
    let mut s = screen(25, 80);
    s.set_reply_sink(Box::new(move |bytes| handle.borrow_mut().push(bytes.to_vec())));
    s.write(b"\x1b[c");
    assert_eq!(replies.borrow().as_slice(), [b"\x1b[?64;1;6;9;15;22c".to_vec()]);
}

#[test_log::test]
fn secondary_device_attributes_request_replies_with_da2() {
    let replies = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::clone(&replies);
    let mut s = screen(25, 80);
    s.set_reply_sink(Box::new(move |bytes| handle.borrow_mut().push(bytes.to_vec())));
    s.write(b"\x1b[>c");
    assert_eq!(replies.borrow().as_slice(), [b"\x1b[>1;10;0c".to_vec()]);
}

#[test_log::test]
fn decrqm_reports_auto_wrap_as_set_by_default() {
    let replies = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::clone(&replies);
    let mut s = screen(25, 80);
    s.set_reply_sink(Box::new(move |bytes| handle.borrow_mut().push(bytes.to_vec())));
    s.write(b"\x1b[?7$p");
    assert_eq!(replies.borrow().as_slice(), [b"\x1b[?7;1$y".to_vec()]);
}

#[test_log::test]
fn full_reset_clears_both_buffers_and_title() {
    let mut s = screen(10, 20);
    s.write(b"\x1b]0;my title\x07");
    s.write(b"hello world");
    s.write(b"\x1bc");
    assert_eq!(s.window_title(), "");
    assert_eq!(s.render_text_line(1).trim_end(), "");
    assert_eq!(s.real_cursor_position(), Coordinate::new(1, 1));
}

#[test_log::test]
fn window_title_osc_round_trips_through_query() {
    let mut s = screen(10, 20);
    s.write(b"\x1b]2;pane one\x07");
    assert_eq!(s.window_title(), "pane one");
}

#[test_log::test]
fn resize_wider_pads_and_narrower_truncates_rows() {
    let mut s = screen(5, 10);
    s.write(b"abcdefghij");
    s.resize(WindowSize::new(5, 14));
    assert_eq!(s.render_text_line(1).len(), 14);
    s.resize(WindowSize::new(5, 6));
    assert_eq!(s.render_text_line(1), "abcdef");
}
