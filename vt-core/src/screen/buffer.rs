// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! One screen's worth of state: the grid, scrollback, cursor, margins,
//! enabled modes, and the saved-state stack. A `Screen` owns exactly two
//! of these (primary and alternate) and multiplexes `Command`s onto
//! whichever is active.

use std::collections::HashSet;

use vt_common::geometry::{Coordinate, Margin, Range, WindowSize};

use crate::command::{Charset, CharsetTable};
use crate::mode::Mode;

use super::cell::{Cell, GraphicsAttributes};
use super::cursor::{Cursor, SavedState};

/// Which of the two buffers a `Buffer` is. The alternate buffer never
/// accumulates scrollback.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BufferKind {
    Primary,
    Alternate,
}

#[derive(Debug, Clone)]
pub struct Buffer {
    kind: BufferKind,
    size: WindowSize,
    lines: Vec<Vec<Cell>>,
    saved_lines: Vec<Vec<Cell>>,
    cursor: Cursor,
    margin: Margin,
    modes: HashSet<Mode>,
    attributes: GraphicsAttributes,
    auto_wrap: bool,
    wrap_pending: bool,
    origin_mode: bool,
    left_right_margin_enabled: bool,
    tab_width: usize,
    saved_states: Vec<SavedState>,
    g0: Charset,
    g1: Charset,
    g2: Charset,
    g3: Charset,
    single_shift: Option<CharsetTable>,
}

impl Buffer {
    #[must_use]
    pub fn new(kind: BufferKind, size: WindowSize) -> Self {
        Self {
            kind,
            size,
            lines: blank_grid(size),
            saved_lines: Vec::new(),
            cursor: Cursor::default(),
            margin: Margin::full_screen(size.rows, size.columns),
            modes: HashSet::new(),
            attributes: GraphicsAttributes::default(),
            auto_wrap: true,
            wrap_pending: false,
            origin_mode: false,
            left_right_margin_enabled: false,
            tab_width: 8,
            saved_states: Vec::new(),
            g0: Charset::Ascii,
            g1: Charset::Ascii,
            g2: Charset::Ascii,
            g3: Charset::Ascii,
            single_shift: None,
        }
    }

    /// DECCharset designation (`ESC ) 0`, `ESC ( B`, …): sets the charset a
    /// `G0..G3` table holds. Only `G0` is consulted by `append_char` today;
    /// there is no `SI`/`SO` in the command vocabulary to shift `GL` onto
    /// `G1`, so designating `G1`/`G2`/`G3` only matters via `SingleShiftSelect`.
    pub fn designate_charset(&mut self, table: CharsetTable, charset: Charset) {
        match table {
            CharsetTable::G0 => self.g0 = charset,
            CharsetTable::G1 => self.g1 = charset,
            CharsetTable::G2 => self.g2 = charset,
            CharsetTable::G3 => self.g3 = charset,
        }
    }

    /// SS2/SS3: the next single character printed is taken from `table`
    /// instead of the currently-invoked `GL` table.
    pub fn single_shift(&mut self, table: CharsetTable) {
        self.single_shift = Some(table);
    }

    fn charset_for(&self, table: CharsetTable) -> Charset {
        match table {
            CharsetTable::G0 => self.g0,
            CharsetTable::G1 => self.g1,
            CharsetTable::G2 => self.g2,
            CharsetTable::G3 => self.g3,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> BufferKind {
        self.kind
    }

    #[must_use]
    pub const fn size(&self) -> WindowSize {
        self.size
    }

    #[must_use]
    pub const fn margin(&self) -> Margin {
        self.margin
    }

    #[must_use]
    pub const fn real_cursor_position(&self) -> Coordinate {
        self.cursor.position
    }

    /// Cursor position translated to margin-relative coordinates when
    /// origin mode is enabled, absolute otherwise.
    #[must_use]
    pub const fn logical_cursor_position(&self) -> Coordinate {
        if self.origin_mode {
            Coordinate::new(
                self.cursor.position.row - self.margin.vertical.from + 1,
                self.cursor.position.column - self.margin.horizontal.from + 1,
            )
        } else {
            self.cursor.position
        }
    }

    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    #[must_use]
    pub fn scrollback_lines(&self) -> usize {
        self.saved_lines.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[Vec<Cell>] {
        &self.lines
    }

    #[must_use]
    pub fn scrollback_line(&self, n: usize) -> Option<&[Cell]> {
        self.saved_lines.get(n).map(Vec::as_slice)
    }

    /// Modes whose enabled/disabled state is tracked on a dedicated field
    /// (because something other than DECRQM needs to read it on every hot
    /// path — `append_char`, `clamp_cursor`, `screenshot`) answer from that
    /// field directly rather than the catch-all `modes` set, so a fresh
    /// `Buffer`'s defaults (`auto_wrap: true`, cursor visible, …) are
    /// reported correctly even though `set_mode` was never called.
    #[must_use]
    pub fn is_mode_enabled(&self, mode: Mode) -> bool {
        match mode {
            Mode::AutoWrap => self.auto_wrap,
            Mode::CursorRestrictedToMargin => self.origin_mode,
            Mode::LeftRightMargin => self.left_right_margin_enabled,
            Mode::CursorVisible => self.cursor.visible,
            _ => self.modes.contains(&mode),
        }
    }

    pub fn set_mode(&mut self, mode: Mode, enable: bool) {
        if enable {
            self.modes.insert(mode);
        } else {
            self.modes.remove(&mode);
        }

        match mode {
            Mode::AutoWrap => self.auto_wrap = enable,
            Mode::CursorVisible => self.cursor.visible = enable,
            Mode::CursorRestrictedToMargin => {
                self.origin_mode = enable;
                self.home_to_margin_origin();
            }
            Mode::LeftRightMargin => {
                self.left_right_margin_enabled = enable;
                if !enable {
                    self.margin.horizontal = Range::new(1, self.size.columns);
                }
            }
            _ => {}
        }
    }

    fn home_to_margin_origin(&mut self) {
        self.cursor.position = if self.origin_mode {
            Coordinate::new(self.margin.vertical.from, self.margin.horizontal.from)
        } else {
            Coordinate::new(1, 1)
        };
        self.wrap_pending = false;
    }

    fn blank_cell(&self) -> Cell {
        Cell::blank_with_attributes(&self.attributes)
    }

    fn blank_row(&self) -> Vec<Cell> {
        vec![self.blank_cell(); self.size.columns]
    }

    fn row_mut(&mut self, row: usize) -> &mut Vec<Cell> {
        &mut self.lines[row - 1]
    }

    fn clamp_cursor(&mut self) {
        let (min_row, max_row, min_col, max_col) = if self.origin_mode {
            (
                self.margin.vertical.from,
                self.margin.vertical.to,
                self.margin.horizontal.from,
                self.margin.horizontal.to,
            )
        } else {
            (1, self.size.rows, 1, self.size.columns)
        };
        self.cursor.position.row = self.cursor.position.row.clamp(min_row, max_row);
        self.cursor.position.column = self.cursor.position.column.clamp(min_col, max_col);
    }

    // ---- character output ----------------------------------------------

    pub fn append_char(&mut self, ch: char) {
        if self.wrap_pending && self.auto_wrap {
            self.wrap_pending = false;
            self.carriage_return_linefeed();
        }

        let table = self.single_shift.take().unwrap_or(CharsetTable::G0);
        let ch = if self.charset_for(table) == Charset::Special {
            dec_special_graphics(ch)
        } else {
            ch
        };

        let attrs = self.attributes;
        let pos = self.cursor.position;
        self.row_mut(pos.row)[pos.column - 1] = Cell {
            character: ch,
            foreground: attrs.foreground,
            background: attrs.background,
            style: attrs.style,
        };

        if pos.column < self.margin.horizontal.to {
            self.cursor.position.column += 1;
        } else if self.auto_wrap {
            self.wrap_pending = true;
        }
    }

    fn carriage_return_linefeed(&mut self) {
        self.cursor.position.column = self.margin.horizontal.from;
        self.linefeed();
    }

    // ---- C0 / cursor motion ---------------------------------------------

    pub fn linefeed(&mut self) {
        self.wrap_pending = false;
        if self.cursor.position.row == self.margin.vertical.to {
            self.scroll_up(1);
        } else if self.cursor.position.row < self.size.rows {
            self.cursor.position.row += 1;
        }
    }

    pub fn reverse_index(&mut self) {
        self.wrap_pending = false;
        if self.cursor.position.row == self.margin.vertical.from {
            self.scroll_down(1);
        } else if self.cursor.position.row > 1 {
            self.cursor.position.row -= 1;
        }
    }

    pub fn move_cursor_up(&mut self, n: usize) {
        self.wrap_pending = false;
        self.cursor.position.row = self.cursor.position.row.saturating_sub(n).max(1);
        self.clamp_cursor();
    }

    pub fn move_cursor_down(&mut self, n: usize) {
        self.wrap_pending = false;
        self.cursor.position.row = (self.cursor.position.row + n).min(self.size.rows);
        self.clamp_cursor();
    }

    pub fn move_cursor_forward(&mut self, n: usize) {
        self.wrap_pending = false;
        self.cursor.position.column = (self.cursor.position.column + n).min(self.size.columns);
        self.clamp_cursor();
    }

    pub fn move_cursor_backward(&mut self, n: usize) {
        self.wrap_pending = false;
        self.cursor.position.column = self.cursor.position.column.saturating_sub(n).max(1);
        self.clamp_cursor();
    }

    pub fn move_cursor_to_column(&mut self, col: usize) {
        self.wrap_pending = false;
        self.cursor.position.column = col.clamp(1, self.size.columns);
        self.clamp_cursor();
    }

    pub fn move_cursor_to_line(&mut self, row: usize) {
        self.wrap_pending = false;
        self.cursor.position.row = row.clamp(1, self.size.rows);
        self.clamp_cursor();
    }

    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        self.wrap_pending = false;
        let (row_offset, col_offset) = if self.origin_mode {
            (self.margin.vertical.from - 1, self.margin.horizontal.from - 1)
        } else {
            (0, 0)
        };
        self.cursor.position.row = (row + row_offset).clamp(1, self.size.rows);
        self.cursor.position.column = (col + col_offset).clamp(1, self.size.columns);
        self.clamp_cursor();
    }

    pub fn move_cursor_to_begin_of_line(&mut self) {
        self.wrap_pending = false;
        self.cursor.position.column = 1;
    }

    pub fn move_cursor_to_next_tab(&mut self) {
        self.wrap_pending = false;
        let right = self.margin.horizontal.to;
        let mut next = (self.cursor.position.column / self.tab_width + 1) * self.tab_width;
        if next > right {
            next = right;
        }
        self.cursor.position.column = next.max(1);
    }

    pub fn cursor_next_line(&mut self, n: usize) {
        self.move_cursor_down(n);
        self.cursor.position.column = self.margin.horizontal.from;
    }

    pub fn cursor_previous_line(&mut self, n: usize) {
        self.move_cursor_up(n);
        self.cursor.position.column = self.margin.horizontal.from;
    }

    pub fn horizontal_position_absolute(&mut self, col: usize) {
        self.move_cursor_to_column(col);
    }

    pub fn horizontal_position_relative(&mut self, n: usize) {
        self.move_cursor_forward(n);
    }

    // ---- save/restore -----------------------------------------------------

    pub fn save_cursor(&mut self) {
        self.saved_states.push(SavedState {
            position: self.cursor.position,
            attributes: self.attributes,
            auto_wrap: self.auto_wrap,
            origin_mode: self.origin_mode,
        });
    }

    pub fn restore_cursor(&mut self) {
        self.wrap_pending = false;
        if let Some(saved) = self.saved_states.pop() {
            self.cursor.position = saved.position;
            self.attributes = saved.attributes;
            self.auto_wrap = saved.auto_wrap;
            self.origin_mode = saved.origin_mode;
        } else {
            self.cursor.position = Coordinate::new(1, 1);
            self.attributes = GraphicsAttributes::default();
        }
        self.clamp_cursor();
    }

    // ---- erase --------------------------------------------------------

    pub fn clear_to_end_of_line(&mut self) {
        let blank = self.blank_cell();
        let pos = self.cursor.position;
        self.row_mut(pos.row)[pos.column - 1..].fill(blank);
    }

    pub fn clear_to_begin_of_line(&mut self) {
        let blank = self.blank_cell();
        let pos = self.cursor.position;
        self.row_mut(pos.row)[..pos.column].fill(blank);
    }

    pub fn clear_line(&mut self) {
        let row = self.blank_row();
        let pos = self.cursor.position;
        self.lines[pos.row - 1] = row;
    }

    pub fn clear_to_end_of_screen(&mut self) {
        self.clear_to_end_of_line();
        let blank = self.blank_row();
        let from = self.cursor.position.row;
        for row in &mut self.lines[from..] {
            *row = blank.clone();
        }
    }

    pub fn clear_to_begin_of_screen(&mut self) {
        self.clear_to_begin_of_line();
        let blank = self.blank_row();
        let to = self.cursor.position.row - 1;
        for row in &mut self.lines[..to] {
            *row = blank.clone();
        }
    }

    pub fn clear_screen(&mut self) {
        let blank = self.blank_row();
        self.lines = vec![blank; self.size.rows];
    }

    pub fn clear_scrollback(&mut self) {
        self.saved_lines.clear();
    }

    pub fn erase_characters(&mut self, n: usize) {
        let blank = self.blank_cell();
        let pos = self.cursor.position;
        let end = (pos.column - 1 + n).min(self.size.columns);
        self.row_mut(pos.row)[pos.column - 1..end].fill(blank);
    }

    // ---- insert/delete ---------------------------------------------------

    pub fn insert_characters(&mut self, n: usize) {
        let right = self.margin.horizontal.to;
        let pos = self.cursor.position;
        let blank = self.blank_cell();
        let row = self.row_mut(pos.row);
        let start = pos.column - 1;
        let end = right.min(row.len());
        if start >= end {
            return;
        }
        row[start..end].rotate_right(n.min(end - start));
        let fill_end = (start + n).min(end);
        row[start..fill_end].fill(blank);
    }

    pub fn delete_characters(&mut self, n: usize) {
        let right = self.margin.horizontal.to;
        let pos = self.cursor.position;
        let blank = self.blank_cell();
        let row = self.row_mut(pos.row);
        let start = pos.column - 1;
        let end = right.min(row.len());
        if start >= end {
            return;
        }
        let n = n.min(end - start);
        row[start..end].rotate_left(n);
        row[end - n..end].fill(blank);
    }

    pub fn insert_lines(&mut self, n: usize) {
        let top = self.cursor.position.row;
        let bottom = self.margin.vertical.to;
        if top > bottom {
            return;
        }
        let n = n.min(bottom - top + 1);
        for _ in 0..n {
            self.lines.remove(bottom - 1);
            self.lines.insert(top - 1, self.blank_row());
        }
    }

    pub fn delete_lines(&mut self, n: usize) {
        let top = self.cursor.position.row;
        let bottom = self.margin.vertical.to;
        if top > bottom {
            return;
        }
        let n = n.min(bottom - top + 1);
        for _ in 0..n {
            self.lines.remove(top - 1);
            self.lines.insert(bottom - 1, self.blank_row());
        }
    }

    pub fn insert_columns(&mut self, n: usize) {
        let col = self.cursor.position.column;
        let right = self.margin.horizontal.to;
        let blank = self.blank_cell();
        let (top, bottom) = (self.margin.vertical.from, self.margin.vertical.to);
        for row in &mut self.lines[top - 1..bottom] {
            let end = right.min(row.len());
            let start = col - 1;
            if start >= end {
                continue;
            }
            row[start..end].rotate_right(n.min(end - start));
            let fill_end = (start + n).min(end);
            row[start..fill_end].fill(blank);
        }
    }

    pub fn delete_columns(&mut self, n: usize) {
        let col = self.cursor.position.column;
        let right = self.margin.horizontal.to;
        let blank = self.blank_cell();
        let (top, bottom) = (self.margin.vertical.from, self.margin.vertical.to);
        for row in &mut self.lines[top - 1..bottom] {
            let end = right.min(row.len());
            let start = col - 1;
            if start >= end {
                continue;
            }
            let n = n.min(end - start);
            row[start..end].rotate_left(n);
            row[end - n..end].fill(blank);
        }
    }

    // ---- DEC back/forward index ------------------------------------------

    /// DECBI: moves the cursor one column left; if already at the left
    /// margin, shifts everything inside the margins one column right
    /// instead (the column that scrolls off the right margin is lost).
    pub fn back_index(&mut self) {
        self.wrap_pending = false;
        if self.cursor.position.column == self.margin.horizontal.from {
            self.insert_columns(1);
        } else {
            self.cursor.position.column -= 1;
        }
    }

    /// DECFI: moves the cursor one column right; if already at the right
    /// margin, shifts everything inside the margins one column left
    /// instead (the column that scrolls off the left margin is lost).
    pub fn forward_index(&mut self) {
        self.wrap_pending = false;
        if self.cursor.position.column == self.margin.horizontal.to {
            self.delete_columns(1);
        } else {
            self.cursor.position.column += 1;
        }
    }

    // ---- scroll -----------------------------------------------------------

    pub fn scroll_up(&mut self, n: usize) {
        let top = self.margin.vertical.from;
        let bottom = self.margin.vertical.to;
        if top > bottom {
            return;
        }
        let full_width_scrollback =
            self.kind == BufferKind::Primary && top == 1 && bottom == self.size.rows;
        let n = n.min(bottom - top + 1);
        for _ in 0..n {
            let removed = self.lines.remove(top - 1);
            if full_width_scrollback {
                self.saved_lines.push(removed);
            }
            self.lines.insert(bottom - 1, self.blank_row());
        }
    }

    pub fn scroll_down(&mut self, n: usize) {
        let top = self.margin.vertical.from;
        let bottom = self.margin.vertical.to;
        if top > bottom {
            return;
        }
        let n = n.min(bottom - top + 1);
        for _ in 0..n {
            self.lines.remove(bottom - 1);
            self.lines.insert(top - 1, self.blank_row());
        }
    }

    // ---- rendition ----------------------------------------------------

    pub fn set_foreground(&mut self, color: vt_common::color::Color) {
        self.attributes.foreground = color;
    }

    pub fn set_background(&mut self, color: vt_common::color::Color) {
        self.attributes.background = color;
    }

    pub fn reset_attributes(&mut self) {
        self.attributes = GraphicsAttributes::default();
    }

    pub fn set_style(&mut self, style: vt_common::style::Style) {
        self.attributes.style.set_mask(style);
    }

    pub fn clear_style(&mut self, style: vt_common::style::Style) {
        self.attributes.style.clear_mask(style);
    }

    // ---- margins --------------------------------------------------------

    pub fn set_top_bottom_margin(&mut self, top: Option<usize>, bottom: Option<usize>) {
        let top = top.unwrap_or(1).max(1);
        let bottom = bottom.unwrap_or(self.size.rows).min(self.size.rows);
        if top < bottom {
            self.margin.vertical = Range::new(top, bottom);
        } else {
            self.margin.vertical = Range::new(1, self.size.rows);
        }
        self.home_to_margin_origin();
    }

    pub fn set_left_right_margin(&mut self, left: Option<usize>, right: Option<usize>) {
        if !self.left_right_margin_enabled {
            return;
        }
        let left = left.unwrap_or(1).max(1);
        let right = right.unwrap_or(self.size.columns).min(self.size.columns);
        if left < right {
            self.margin.horizontal = Range::new(left, right);
        } else {
            self.margin.horizontal = Range::new(1, self.size.columns);
        }
        self.home_to_margin_origin();
    }

    // ---- reset ----------------------------------------------------------

    pub fn soft_reset(&mut self) {
        self.attributes = GraphicsAttributes::default();
        self.origin_mode = false;
        self.auto_wrap = true;
        self.cursor.visible = true;
        self.margin = Margin::full_screen(self.size.rows, self.size.columns);
        self.left_right_margin_enabled = false;
        self.saved_states.clear();
        self.wrap_pending = false;
    }

    pub fn full_reset(&mut self) {
        self.soft_reset();
        self.clear_screen();
        self.clear_scrollback();
        self.cursor.position = Coordinate::new(1, 1);
        self.tab_width = 8;
        self.modes.clear();
        self.g0 = Charset::Ascii;
        self.g1 = Charset::Ascii;
        self.g2 = Charset::Ascii;
        self.g3 = Charset::Ascii;
        self.single_shift = None;
    }

    pub fn screen_alignment_pattern(&mut self) {
        for row in &mut self.lines {
            for cell in row.iter_mut() {
                *cell = Cell {
                    character: 'E',
                    ..Cell::blank()
                };
            }
        }
        self.margin = Margin::full_screen(self.size.rows, self.size.columns);
        self.cursor.position = Coordinate::new(1, 1);
        self.wrap_pending = false;
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    // ---- resize ---------------------------------------------------------

    pub fn resize(&mut self, new_size: WindowSize) {
        for row in &mut self.lines {
            resize_row(row, new_size.columns, &self.attributes);
        }

        if new_size.rows > self.size.rows {
            let mut to_add = new_size.rows - self.size.rows;
            while to_add > 0 {
                if self.kind == BufferKind::Primary {
                    if let Some(row) = self.saved_lines.pop() {
                        let mut row = row;
                        resize_row(&mut row, new_size.columns, &self.attributes);
                        self.lines.insert(0, row);
                        to_add -= 1;
                        continue;
                    }
                }
                self.lines.push(vec![
                    Cell::blank_with_attributes(&self.attributes);
                    new_size.columns
                ]);
                to_add -= 1;
            }
        } else if new_size.rows < self.size.rows {
            let mut to_remove = self.size.rows - new_size.rows;
            while to_remove > 0 && self.lines.len() > new_size.rows {
                let row = self.lines.remove(0);
                if self.kind == BufferKind::Primary {
                    self.saved_lines.push(row);
                }
                to_remove -= 1;
            }
            self.lines.truncate(new_size.rows);
        }

        self.size = new_size;
        self.margin.vertical.to = self.margin.vertical.to.min(new_size.rows);
        self.margin.vertical.from = self.margin.vertical.from.min(self.margin.vertical.to);
        self.margin.horizontal.to = self.margin.horizontal.to.min(new_size.columns);
        self.margin.horizontal.from = self.margin.horizontal.from.min(self.margin.horizontal.to);
        self.wrap_pending = false;
        self.clamp_cursor();
    }

    /// Internal invariant check. Returns the first violated invariant
    /// description, if any.
    #[must_use]
    pub fn verify_state(&self) -> Option<String> {
        if self.lines.len() != self.size.rows {
            return Some(format!(
                "expected {} rows, have {}",
                self.size.rows,
                self.lines.len()
            ));
        }
        for (idx, row) in self.lines.iter().enumerate() {
            if row.len() != self.size.columns {
                return Some(format!(
                    "row {idx} has {} cells, expected {}",
                    row.len(),
                    self.size.columns
                ));
            }
        }
        if !(1..=self.size.rows).contains(&self.cursor.position.row)
            || !(1..=self.size.columns).contains(&self.cursor.position.column)
        {
            return Some(format!("cursor {:?} outside screen", self.cursor.position));
        }
        if self.kind == BufferKind::Alternate && !self.saved_lines.is_empty() {
            return Some("alternate buffer accumulated scrollback".to_string());
        }
        None
    }
}

/// DEC Special Graphics (the VT100 line-drawing set, code page 1090):
/// `0x5f..=0x7e` map to box-drawing glyphs; everything else passes through
/// unchanged. <http://fileformats.archiveteam.org/wiki/DEC_Special_Graphics_Character_Set>
const fn dec_special_graphics(ch: char) -> char {
    match ch {
        '_' => '\u{00A0}',
        '`' => '\u{25C6}',
        'a' => '\u{2592}',
        'b' => '\u{2409}',
        'c' => '\u{240C}',
        'd' => '\u{240D}',
        'e' => '\u{240A}',
        'f' => '\u{00B0}',
        'g' => '\u{00B1}',
        'h' => '\u{2424}',
        'i' => '\u{240B}',
        'j' => '\u{2518}',
        'k' => '\u{2510}',
        'l' => '\u{250C}',
        'm' => '\u{2514}',
        'n' => '\u{253C}',
        'o' => '\u{23BA}',
        'p' => '\u{23BB}',
        'q' => '\u{2500}',
        'r' => '\u{23BC}',
        's' => '\u{23BD}',
        't' => '\u{251C}',
        'u' => '\u{2524}',
        'v' => '\u{2534}',
        'w' => '\u{252C}',
        'x' => '\u{2502}',
        'y' => '\u{2264}',
        'z' => '\u{2265}',
        '{' => '\u{03C0}',
        '|' => '\u{2260}',
        '}' => '\u{00A3}',
        '~' => '\u{00B7}',
        other => other,
    }
}

fn resize_row(row: &mut Vec<Cell>, columns: usize, attrs: &GraphicsAttributes) {
    if columns > row.len() {
        row.resize(columns, Cell::blank_with_attributes(attrs));
    } else {
        row.truncate(columns);
    }
}

fn blank_grid(size: WindowSize) -> Vec<Vec<Cell>> {
    vec![vec![Cell::blank(); size.columns]; size.rows]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(rows: usize, cols: usize) -> Buffer {
        Buffer::new(BufferKind::Primary, WindowSize::new(rows, cols))
    }

    #[test_log::test]
    fn append_char_advances_column() {
        let mut b = buf(25, 80);
        b.append_char('A');
        assert_eq!(b.real_cursor_position(), Coordinate::new(1, 2));
        assert_eq!(b.lines()[0][0].character, 'A');
    }

    #[test_log::test]
    fn line_wrap_sets_wrap_pending_then_wraps() {
        let mut b = buf(25, 80);
        for _ in 0..80 {
            b.append_char('X');
        }
        assert_eq!(b.real_cursor_position(), Coordinate::new(1, 80));
        b.append_char('Y');
        assert_eq!(b.real_cursor_position(), Coordinate::new(2, 2));
        assert_eq!(b.lines()[1][0].character, 'Y');
        assert!(b.lines()[0].iter().all(|c| c.character == 'X'));
    }

    #[test_log::test]
    fn scroll_into_history_on_three_row_screen() {
        let mut b = buf(3, 80);
        for ch in ['A', 'B', 'C', 'D'] {
            b.append_char(ch);
            b.linefeed();
            b.move_cursor_to_begin_of_line();
        }
        assert_eq!(b.lines()[0][0].character, 'B');
        assert_eq!(b.lines()[1][0].character, 'C');
        assert_eq!(b.lines()[2][0].character, 'D');
        assert_eq!(b.scrollback_line(0).unwrap()[0].character, 'A');
    }

    #[test_log::test]
    fn decstbm_and_origin_mode_home_cursor() {
        let mut b = buf(25, 80);
        b.set_top_bottom_margin(Some(5), Some(10));
        b.set_mode(Mode::CursorRestrictedToMargin, true);
        b.move_cursor_to(1, 1);
        assert_eq!(b.real_cursor_position(), Coordinate::new(5, 1));
        assert_eq!(b.logical_cursor_position(), Coordinate::new(1, 1));
    }

    #[test_log::test]
    fn save_restore_round_trips_position() {
        let mut b = buf(25, 80);
        b.move_cursor_to(10, 10);
        b.save_cursor();
        b.move_cursor_to(1, 1);
        b.restore_cursor();
        assert_eq!(b.real_cursor_position(), Coordinate::new(10, 10));
    }

    #[test_log::test]
    fn alternate_buffer_never_accumulates_scrollback() {
        let mut b = Buffer::new(BufferKind::Alternate, WindowSize::new(3, 10));
        for ch in ['A', 'B', 'C', 'D'] {
            b.append_char(ch);
            b.linefeed();
            b.move_cursor_to_begin_of_line();
        }
        assert_eq!(b.scrollback_lines(), 0);
        assert!(b.verify_state().is_none());
    }

    #[test_log::test]
    fn resize_pads_and_truncates_columns() {
        let mut b = buf(5, 10);
        b.resize(WindowSize::new(5, 20));
        assert_eq!(b.lines()[0].len(), 20);
        b.resize(WindowSize::new(5, 5));
        assert_eq!(b.lines()[0].len(), 5);
        assert!(b.verify_state().is_none());
    }

    #[test_log::test]
    fn insert_and_delete_characters_with_cursor_right_of_margin_are_no_ops() {
        let mut b = buf(25, 80);
        b.set_mode(Mode::LeftRightMargin, true);
        b.set_left_right_margin(Some(1), Some(40));
        b.move_cursor_forward(200); // clamps to column 80, right of the margin
        b.insert_characters(1);
        b.delete_characters(1);
        assert!(b.verify_state().is_none());
    }
}
