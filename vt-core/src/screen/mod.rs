// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The top-level orchestrator: owns the [`Parser`], both [`Buffer`]s
//! (primary/alternate), and the callback sinks a host wires up (reply,
//! logger, hook, mode-switch). [`Screen::write`] is the single entry point
//! for bytes coming off the child pty; everything else is a query or a
//! reshape.

pub mod buffer;
pub mod cell;
pub mod cursor;

use std::fmt::Write as _;

use vt_common::color::Color;
use vt_common::geometry::{Coordinate, Margin, WindowSize};

use crate::command::{Command, GraphicsRenditionChange};
use crate::mode::Mode;
use crate::parser::Parser;

use self::buffer::{Buffer, BufferKind};
use self::cell::Cell;

/// A sink for reply bytes (DSR/CPR/DA responses, `screenshot()` output)
/// destined for the child process's input.
pub type ReplySink = Box<dyn FnMut(&[u8])>;
/// A sink for purely observational diagnostic strings.
pub type LoggerSink = Box<dyn FnMut(&str)>;
/// Invoked once per [`Screen::write`] with the `Command`s it produced,
/// after they have been applied. Must not mutate the `Screen`.
pub type CommandsHook = Box<dyn FnMut(&[Command])>;
/// Invoked exactly when `ApplicationCursorKeys` transitions.
pub type ModeSwitchCallback = Box<dyn FnMut(bool)>;

/// Owns the parser and both buffers, and multiplexes `Command`s onto
/// whichever is active. Single-threaded: nothing here suspends, and the
/// callback sinks must not call back into `write` on the same `Screen`.
pub struct Screen {
    parser: Parser,
    primary: Buffer,
    alternate: Buffer,
    active: BufferKind,
    application_cursor_keys: bool,
    window_title: String,
    icon_name: String,
    reply: Option<ReplySink>,
    logger: Option<LoggerSink>,
    hook: Option<CommandsHook>,
    mode_switch: Option<ModeSwitchCallback>,
}

impl Screen {
    #[must_use]
    pub fn new(size: WindowSize) -> Self {
        Self {
            parser: Parser::new(),
            primary: Buffer::new(BufferKind::Primary, size),
            alternate: Buffer::new(BufferKind::Alternate, size),
            active: BufferKind::Primary,
            application_cursor_keys: false,
            window_title: String::new(),
            icon_name: String::new(),
            reply: None,
            logger: None,
            hook: None,
            mode_switch: None,
        }
    }

    pub fn set_reply_sink(&mut self, sink: ReplySink) {
        self.reply = Some(sink);
    }

    pub fn set_logger(&mut self, logger: LoggerSink) {
        self.logger = Some(logger);
    }

    pub fn set_hook(&mut self, hook: CommandsHook) {
        self.hook = Some(hook);
    }

    pub fn set_mode_switch_callback(&mut self, callback: ModeSwitchCallback) {
        self.mode_switch = Some(callback);
    }

    fn active_buffer(&self) -> &Buffer {
        match self.active {
            BufferKind::Primary => &self.primary,
            BufferKind::Alternate => &self.alternate,
        }
    }

    fn active_buffer_mut(&mut self) -> &mut Buffer {
        match self.active {
            BufferKind::Primary => &mut self.primary,
            BufferKind::Alternate => &mut self.alternate,
        }
    }

    fn log(&mut self, msg: &str) {
        if let Some(logger) = &mut self.logger {
            logger(msg);
        }
    }

    fn reply(&mut self, bytes: &[u8]) {
        if let Some(reply) = &mut self.reply {
            reply(bytes);
        }
    }

    // ---- public queries ---------------------------------------------------

    #[must_use]
    pub fn size(&self) -> WindowSize {
        self.active_buffer().size()
    }

    #[must_use]
    pub fn cursor_position(&self) -> Coordinate {
        self.active_buffer().logical_cursor_position()
    }

    #[must_use]
    pub fn real_cursor_position(&self) -> Coordinate {
        self.active_buffer().real_cursor_position()
    }

    #[must_use]
    pub const fn is_primary_screen(&self) -> bool {
        matches!(self.active, BufferKind::Primary)
    }

    #[must_use]
    pub const fn is_alternate_screen(&self) -> bool {
        matches!(self.active, BufferKind::Alternate)
    }

    #[must_use]
    pub fn is_mode_enabled(&self, mode: Mode) -> bool {
        match mode {
            Mode::UseAlternateScreen | Mode::UseAlternateScreenSaveCursor => {
                self.is_alternate_screen()
            }
            Mode::ApplicationCursorKeys => self.application_cursor_keys,
            _ => self.active_buffer().is_mode_enabled(mode),
        }
    }

    #[must_use]
    pub fn margin(&self) -> Margin {
        self.active_buffer().margin()
    }

    #[must_use]
    pub fn scrollback_lines(&self) -> usize {
        self.active_buffer().scrollback_lines()
    }

    #[must_use]
    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    #[must_use]
    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    // ---- upstream: bytes in -------------------------------------------

    /// Feeds a fragment of bytes from the child pty. Parses and applies
    /// every `Command` it produces, in order, then invokes the hook (if
    /// set) with the whole batch.
    pub fn write(&mut self, bytes: &[u8]) {
        let commands = self.parser.parse_fragment(bytes);
        for command in &commands {
            self.apply(command.clone());
        }
        if let Some(hook) = &mut self.hook {
            hook(&commands);
        }
    }

    #[allow(clippy::too_many_lines)]
    fn apply(&mut self, command: Command) {
        match command {
            Command::AppendChar { ch } => self.active_buffer_mut().append_char(ch),
            Command::Bell => self.log("bell"),
            Command::Linefeed | Command::Index => self.active_buffer_mut().linefeed(),
            Command::Backspace => self.active_buffer_mut().move_cursor_backward(1),
            Command::ReverseIndex => self.active_buffer_mut().reverse_index(),
            Command::BackIndex => self.active_buffer_mut().back_index(),
            Command::ForwardIndex => self.active_buffer_mut().forward_index(),

            Command::MoveCursorUp { n } => self.active_buffer_mut().move_cursor_up(n),
            Command::MoveCursorDown { n } => self.active_buffer_mut().move_cursor_down(n),
            Command::MoveCursorForward { n } => self.active_buffer_mut().move_cursor_forward(n),
            Command::MoveCursorBackward { n } => self.active_buffer_mut().move_cursor_backward(n),
            Command::MoveCursorToColumn { col } => {
                self.active_buffer_mut().move_cursor_to_column(col);
            }
            Command::MoveCursorToLine { row } => self.active_buffer_mut().move_cursor_to_line(row),
            Command::MoveCursorTo { row, col } => {
                self.active_buffer_mut().move_cursor_to(row, col);
            }
            Command::MoveCursorToBeginOfLine => {
                self.active_buffer_mut().move_cursor_to_begin_of_line();
            }
            Command::MoveCursorToNextTab => self.active_buffer_mut().move_cursor_to_next_tab(),
            Command::CursorNextLine { n } => self.active_buffer_mut().cursor_next_line(n),
            Command::CursorPreviousLine { n } => self.active_buffer_mut().cursor_previous_line(n),
            Command::HorizontalPositionAbsolute { col } => {
                self.active_buffer_mut().horizontal_position_absolute(col);
            }
            Command::HorizontalPositionRelative { n } => {
                self.active_buffer_mut().horizontal_position_relative(n);
            }

            Command::SaveCursor => self.active_buffer_mut().save_cursor(),
            Command::RestoreCursor => self.active_buffer_mut().restore_cursor(),

            Command::ClearToEndOfScreen => self.active_buffer_mut().clear_to_end_of_screen(),
            Command::ClearToBeginOfScreen => self.active_buffer_mut().clear_to_begin_of_screen(),
            Command::ClearScreen => self.active_buffer_mut().clear_screen(),
            Command::ClearScrollbackBuffer => self.active_buffer_mut().clear_scrollback(),
            Command::ClearToEndOfLine => self.active_buffer_mut().clear_to_end_of_line(),
            Command::ClearToBeginOfLine => self.active_buffer_mut().clear_to_begin_of_line(),
            Command::ClearLine => self.active_buffer_mut().clear_line(),
            Command::EraseCharacters { n } => self.active_buffer_mut().erase_characters(n),

            Command::InsertCharacters { n } => self.active_buffer_mut().insert_characters(n),
            Command::InsertColumns { n } => self.active_buffer_mut().insert_columns(n),
            Command::InsertLines { n } => self.active_buffer_mut().insert_lines(n),
            Command::DeleteCharacters { n } => self.active_buffer_mut().delete_characters(n),
            Command::DeleteColumns { n } => self.active_buffer_mut().delete_columns(n),
            Command::DeleteLines { n } => self.active_buffer_mut().delete_lines(n),

            Command::ScrollUp { n } => self.active_buffer_mut().scroll_up(n),
            Command::ScrollDown { n } => self.active_buffer_mut().scroll_down(n),

            Command::SetForegroundColor { color } => self.active_buffer_mut().set_foreground(color),
            Command::SetBackgroundColor { color } => self.active_buffer_mut().set_background(color),
            Command::SetGraphicsRendition { change } => match change {
                GraphicsRenditionChange::Reset => self.active_buffer_mut().reset_attributes(),
                GraphicsRenditionChange::Set(style) => self.active_buffer_mut().set_style(style),
                GraphicsRenditionChange::Clear(style) => self.active_buffer_mut().clear_style(style),
            },

            Command::SetMode { mode, enable } => self.apply_mode(mode, enable),
            Command::RequestMode { mode } => self.report_mode(mode),
            Command::AlternateKeypadMode { .. } => {}
            Command::DesignateCharset { table, charset } => {
                self.active_buffer_mut().designate_charset(table, charset);
            }
            Command::SingleShiftSelect { table } => self.active_buffer_mut().single_shift(table),
            Command::SendMouseEvents { protocol, enable } => {
                self.active_buffer_mut()
                    .set_mode(Mode::MouseReporting(protocol), enable);
            }

            Command::SetTopBottomMargin { top, bottom } => {
                self.active_buffer_mut().set_top_bottom_margin(top, bottom);
            }
            Command::SetLeftRightMargin { left, right } => {
                self.active_buffer_mut().set_left_right_margin(left, right);
            }

            Command::DeviceStatusReport => self.reply(b"\x1b[0n"),
            Command::ReportCursorPosition => self.report_cursor_position(false),
            Command::ReportExtendedCursorPosition => self.report_cursor_position(true),
            Command::SendDeviceAttributes => self.reply(b"\x1b[?64;1;6;9;15;22c"),
            Command::SendTerminalId => self.reply(b"\x1b[>1;10;0c"),

            Command::ChangeWindowTitle { s } => self.window_title = s,
            Command::ChangeIconName { s } => self.icon_name = s,

            Command::FullReset => self.full_reset(),
            Command::SoftTerminalReset => self.active_buffer_mut().soft_reset(),
            Command::ScreenAlignmentPattern => self.active_buffer_mut().screen_alignment_pattern(),
        }

        self.assert_invariants_at_key_transitions(&command);
    }

    fn assert_invariants_at_key_transitions(&self, command: &Command) {
        let checked = matches!(
            command,
            Command::SetMode { .. } | Command::FullReset | Command::SoftTerminalReset
        );
        if !checked {
            return;
        }
        if let Some(violation) = self.active_buffer().verify_state() {
            panic!("internal invariant violated after applying {command:?}: {violation}");
        }
    }

    fn apply_mode(&mut self, mode: Mode, enable: bool) {
        match mode {
            Mode::UseAlternateScreen | Mode::UseAlternateScreenSaveCursor => {
                self.switch_screen(enable, matches!(mode, Mode::UseAlternateScreenSaveCursor));
            }
            Mode::ApplicationCursorKeys => {
                self.active_buffer_mut().set_mode(mode, enable);
                if self.application_cursor_keys != enable {
                    self.application_cursor_keys = enable;
                    if let Some(callback) = &mut self.mode_switch {
                        callback(enable);
                    }
                }
            }
            _ => self.active_buffer_mut().set_mode(mode, enable),
        }
    }

    fn switch_screen(&mut self, enable: bool, save_cursor: bool) {
        match (enable, self.active) {
            (true, BufferKind::Primary) => {
                if save_cursor {
                    self.primary.save_cursor();
                }
                let size = self.alternate.size();
                self.alternate = Buffer::new(BufferKind::Alternate, size);
                self.active = BufferKind::Alternate;
            }
            (false, BufferKind::Alternate) => {
                self.active = BufferKind::Primary;
                if save_cursor {
                    self.primary.restore_cursor();
                }
            }
            _ => {}
        }
    }

    fn full_reset(&mut self) {
        self.primary.full_reset();
        self.alternate.full_reset();
        self.active = BufferKind::Primary;
        self.application_cursor_keys = false;
        self.window_title.clear();
        self.icon_name.clear();
    }

    fn report_cursor_position(&mut self, extended: bool) {
        let pos = self.active_buffer().logical_cursor_position();
        if extended {
            self.reply(format!("\x1b[{};{};1R", pos.row, pos.column).as_bytes());
        } else {
            self.reply(format!("\x1b[{};{}R", pos.row, pos.column).as_bytes());
        }
    }

    fn report_mode(&mut self, mode: Mode) {
        let enabled = self.is_mode_enabled(mode);
        let (private, number) = mode.to_params();
        let pm = if enabled { 1 } else { 2 };
        if private {
            self.reply(format!("\x1b[?{number};{pm}$y").as_bytes());
        } else {
            self.reply(format!("\x1b[{number};{pm}$y").as_bytes());
        }
    }

    // ---- downstream: rendering ------------------------------------------

    /// Visits every visible cell once in row-major order. No mutation
    /// occurs during the call.
    pub fn render(&self, mut renderer: impl FnMut(usize, usize, &Cell)) {
        for (row_idx, row) in self.active_buffer().lines().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                renderer(row_idx + 1, col_idx + 1, cell);
            }
        }
    }

    #[must_use]
    pub fn render_text_line(&self, row: usize) -> String {
        self.active_buffer()
            .lines()
            .get(row - 1)
            .map(|cells| cells_to_text(cells))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn render_history_text_line(&self, n: usize) -> Option<String> {
        self.active_buffer()
            .scrollback_line(n)
            .map(cells_to_text)
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let rows = self.active_buffer().size().rows;
        let mut out = String::new();
        for row in 1..=rows {
            out.push_str(&self.render_text_line(row));
            out.push('\n');
        }
        out
    }

    /// Emits a VT byte stream that, when written to a fresh `Screen` of
    /// identical size, reproduces the current visible buffer: an initial
    /// clear, cursor hidden, one SGR-tracked run of characters per row
    /// (blank runs are erased rather than printed as spaces, so the
    /// replayed cells stay `'\0'` instead of `' '`), and a final cursor
    /// move (plus a cursor show, if it was visible).
    #[must_use]
    pub fn screenshot(&self) -> Vec<u8> {
        let buffer = self.active_buffer();
        let mut out = String::new();
        out.push_str("\x1b[0m\x1b[2J\x1b[H\x1b[?25l");

        let mut last_attrs: Option<(Color, Color, vt_common::style::Style)> = None;
        for (row_idx, row) in buffer.lines().iter().enumerate() {
            let _ = write!(out, "\x1b[{};1H", row_idx + 1);
            last_attrs = None;
            let mut col = 0;
            while col < row.len() {
                let cell = &row[col];
                let attrs = (cell.foreground, cell.background, cell.style);
                if last_attrs != Some(attrs) {
                    write_sgr(&mut out, cell);
                    last_attrs = Some(attrs);
                }
                if cell.is_blank() {
                    // `X` (erase) rather than a printed space, so the replayed
                    // cell keeps the blank sentinel character instead of ' '.
                    let run = row[col..]
                        .iter()
                        .take_while(|c| c.is_blank() && (c.foreground, c.background, c.style) == attrs)
                        .count();
                    let _ = write!(out, "\x1b[{run}X\x1b[{run}C");
                    col += run;
                } else {
                    out.push(cell.character);
                    col += 1;
                }
            }
        }

        let pos = buffer.real_cursor_position();
        let _ = write!(out, "\x1b[{};{}H", pos.row, pos.column);
        if buffer.cursor_visible() {
            out.push_str("\x1b[?25h");
        }

        out.into_bytes()
    }

    /// Reshapes both buffers in place: pads/truncates columns, then
    /// rows (preferring to reveal scrollback on the primary buffer when
    /// growing), clamps the cursor and margins, and clears pending wrap.
    pub fn resize(&mut self, new_size: WindowSize) {
        self.primary.resize(new_size);
        self.alternate.resize(new_size);
        if let Some(violation) = self.active_buffer().verify_state() {
            panic!("internal invariant violated after resize: {violation}");
        }
    }
}

fn cells_to_text(cells: &[Cell]) -> String {
    cells
        .iter()
        .map(|c| if c.is_blank() { ' ' } else { c.character })
        .collect()
}

fn write_sgr(out: &mut String, cell: &Cell) {
    out.push_str("\x1b[0");
    if cell.style.is_set(vt_common::style::Style::BOLD) {
        out.push_str(";1");
    }
    if cell.style.is_set(vt_common::style::Style::FAINT) {
        out.push_str(";2");
    }
    if cell.style.is_set(vt_common::style::Style::ITALIC) {
        out.push_str(";3");
    }
    if cell.style.is_set(vt_common::style::Style::UNDERLINE) {
        out.push_str(";4");
    }
    if cell.style.is_set(vt_common::style::Style::BLINKING) {
        out.push_str(";5");
    }
    if cell.style.is_set(vt_common::style::Style::INVERSE) {
        out.push_str(";7");
    }
    if cell.style.is_set(vt_common::style::Style::HIDDEN) {
        out.push_str(";8");
    }
    if cell.style.is_set(vt_common::style::Style::CROSSED_OUT) {
        out.push_str(";9");
    }
    if cell.style.is_set(vt_common::style::Style::DOUBLY_UNDERLINED) {
        out.push_str(";21");
    }
    write_color_param(out, 38, cell.foreground);
    write_color_param(out, 48, cell.background);
    out.push('m');
}

fn write_color_param(out: &mut String, base: u8, color: Color) {
    match color {
        Color::Default => {
            let _ = write!(out, ";{}", base + 1);
        }
        Color::Indexed(n) => {
            let _ = write!(out, ";{base};5;{n}");
        }
        Color::Bright(n) => {
            let offset = if base == 38 { 90 } else { 100 };
            let _ = write!(out, ";{}", offset + u16::from(n));
        }
        Color::Rgb(r, g, b) => {
            let _ = write!(out, ";{base};2;{r};{g};{b}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(rows: usize, cols: usize) -> Screen {
        Screen::new(WindowSize::new(rows, cols))
    }

    #[test_log::test]
    fn write_appends_character_and_advances_cursor() {
        let mut s = screen(25, 80);
        s.write(b"A");
        assert_eq!(s.real_cursor_position(), Coordinate::new(1, 2));
    }

    #[test_log::test]
    fn render_visits_every_cell_exactly_once() {
        let s = screen(3, 4);
        let mut count = 0;
        s.render(|_, _, _| count += 1);
        assert_eq!(count, 12);
    }

    #[test_log::test]
    fn text_idempotence_for_printable_ascii() {
        let mut a = screen(5, 10);
        a.write(b"hello");
        let line = a.render_text_line(1);
        let mut b = screen(5, 10);
        b.write(line.as_bytes());
        assert_eq!(a.render_text_line(1), b.render_text_line(1));
    }

    #[test_log::test]
    fn screenshot_replay_reproduces_visible_grid() {
        let mut a = screen(5, 10);
        a.write(b"\x1b[31mHi\x1b[0m there");
        let bytes = a.screenshot();

        let mut b = screen(5, 10);
        b.write(&bytes);

        assert_eq!(a.render_text(), b.render_text());
        let mut a_cells = Vec::new();
        a.render(|r, c, cell| a_cells.push((r, c, *cell)));
        let mut b_cells = Vec::new();
        b.render(|r, c, cell| b_cells.push((r, c, *cell)));
        assert_eq!(a_cells, b_cells);
    }

    #[test_log::test]
    fn alternate_screen_round_trip_preserves_primary_content() {
        let mut s = screen(5, 10);
        s.write(b"primary content");
        assert_eq!(s.render_text_line(1).trim_end(), "primary co");
        s.write(b"\x1b[?1049h");
        assert!(s.is_alternate_screen());
        s.write(b"alt screen stuff");
        s.write(b"\x1b[?1049l");
        assert!(s.is_primary_screen());
        assert_eq!(s.render_text_line(1).trim_end(), "primary co");
    }

    #[test_log::test]
    fn scrolling_inside_margin_never_touches_rows_outside_it() {
        let mut s = screen(6, 10);
        s.write(b"\x1b[2;4r"); // DECSTBM top=2 bottom=4
        s.write(b"\x1b[1;1Htop");
        s.write(b"\x1b[6;1Hbottom");
        s.write(b"\x1b[2;1H\x1b[S"); // scroll up inside the margin
        assert_eq!(s.render_text_line(1).trim_end(), "top");
        assert_eq!(s.render_text_line(6).trim_end(), "bottom");
    }

    #[test_log::test]
    fn origin_mode_reports_margin_relative_cursor() {
        let mut s = screen(25, 80);
        s.write(b"\x1b[5;10r");
        s.write(b"\x1b[?6h");
        s.write(b"\x1b[H");
        assert_eq!(s.real_cursor_position(), Coordinate::new(5, 1));
        assert_eq!(s.cursor_position(), Coordinate::new(1, 1));
    }

    #[test_log::test]
    fn dectcem_toggles_cursor_visibility() {
        let mut s = screen(25, 80);
        assert!(s.screenshot().ends_with(b"\x1b[?25h"));
        s.write(b"\x1b[?25l");
        assert!(!s.is_mode_enabled(Mode::CursorVisible));
        assert!(!s.screenshot().ends_with(b"\x1b[?25h"));
        s.write(b"\x1b[?25h");
        assert!(s.is_mode_enabled(Mode::CursorVisible));
    }

    #[test_log::test]
    fn device_status_report_replies_terminal_ok() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let replies = Rc::new(RefCell::new(Vec::new()));
        let replies_handle = Rc::clone(&replies);
        let mut s = screen(25, 80);
        s.set_reply_sink(Box::new(move |bytes| {
            replies_handle.borrow_mut().push(bytes.to_vec());
        }));
        s.write(b"\x1b[5n");
        assert_eq!(replies.borrow().as_slice(), [b"\x1b[0n".to_vec()]);
    }

    #[test_log::test]
    fn cursor_position_report_round_trips_through_reply_sink() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let replies = Rc::new(RefCell::new(Vec::new()));
        let replies_handle = Rc::clone(&replies);
        let mut s = screen(25, 80);
        s.set_reply_sink(Box::new(move |bytes| {
            replies_handle.borrow_mut().push(bytes.to_vec());
        }));
        s.write(b"\x1b[10;20H\x1b[6n");
        assert_eq!(replies.borrow().as_slice(), [b"\x1b[10;20R".to_vec()]);
    }
}
