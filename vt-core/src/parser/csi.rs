// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `ESC [ ... final-byte` dispatch: CSI_Entry/CSI_Param/CSI_Intermediate/
//! CSI_Ignore folded into one small state machine, plus the final-byte
//! table that turns collected params/intermediates into `Command`s.

use crate::command::Command;
use crate::mode::Mode;

use super::tracer::{SequenceTraceable, SequenceTracer};
use super::{ParserOutcome, extract_param, split_params_into_semicolon_delimited_usize};

mod sgr;

#[derive(Debug, Eq, PartialEq, Default)]
pub enum CsiParserState {
    #[default]
    Params,
    Intermediates,
    Finished(u8),
    Invalid,
    InvalidFinished,
}

#[derive(Debug, Default)]
pub struct CsiParser {
    pub(crate) state: CsiParserState,
    params: Vec<u8>,
    intermediates: Vec<u8>,
    seq_trace: SequenceTracer,
}

impl SequenceTraceable for CsiParser {
    fn seq_tracer(&mut self) -> &mut SequenceTracer {
        &mut self.seq_trace
    }
    fn seq_tracer_ref(&self) -> &SequenceTracer {
        &self.seq_trace
    }
}

const fn is_csi_param(b: u8) -> bool {
    (0x30..=0x3f).contains(&b)
}

const fn is_csi_intermediate(b: u8) -> bool {
    (0x20..=0x2f).contains(&b)
}

const fn is_csi_terminator(b: u8) -> bool {
    (0x40..=0x7e).contains(&b)
}

impl CsiParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CsiParserState::Params,
            params: Vec::with_capacity(8),
            intermediates: Vec::with_capacity(4),
            seq_trace: SequenceTracer::new(),
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn push(&mut self, b: u8) -> ParserOutcome {
        self.append_trace(b);

        if matches!(
            self.state,
            CsiParserState::Finished(_) | CsiParserState::InvalidFinished
        ) {
            return ParserOutcome::Invalid("parser pushed to once finished".to_string());
        }

        match &self.state {
            CsiParserState::Params => {
                if is_csi_param(b) {
                    self.params.push(b);
                    ParserOutcome::Continue
                } else if is_csi_intermediate(b) {
                    self.intermediates.push(b);
                    self.state = CsiParserState::Intermediates;
                    ParserOutcome::Continue
                } else if is_csi_terminator(b) {
                    self.state = CsiParserState::Finished(b);
                    self.seq_trace.trim_control_tail();
                    ParserOutcome::Finished
                } else {
                    self.state = CsiParserState::Invalid;
                    ParserOutcome::Invalid("invalid CSI parameter byte".to_string())
                }
            }
            CsiParserState::Intermediates => {
                if is_csi_param(b) {
                    self.state = CsiParserState::Invalid;
                    ParserOutcome::Invalid("invalid CSI intermediate byte".to_string())
                } else if is_csi_intermediate(b) {
                    self.intermediates.push(b);
                    ParserOutcome::Continue
                } else if is_csi_terminator(b) {
                    self.state = CsiParserState::Finished(b);
                    self.seq_trace.trim_control_tail();
                    ParserOutcome::Finished
                } else {
                    self.state = CsiParserState::Invalid;
                    ParserOutcome::Invalid("invalid CSI intermediate byte".to_string())
                }
            }
            CsiParserState::Invalid => {
                if is_csi_terminator(b) {
                    self.state = CsiParserState::InvalidFinished;
                }
                ParserOutcome::Invalid("invalid CSI sequence".to_string())
            }
            CsiParserState::Finished(_) | CsiParserState::InvalidFinished => unreachable!(),
        }
    }

    /// `?` is an ECMA-48 "private use" parameter byte, always the first
    /// byte of `params` when present (e.g. `CSI ? 1049 h`). It is not a
    /// digit, so it is stripped before numeric parsing.
    fn is_private(&self) -> bool {
        self.params.first() == Some(&b'?')
    }

    fn is_dec_request_mode(&self) -> bool {
        self.intermediates.last() == Some(&b'$')
    }

    fn numeric_params(&self) -> &[u8] {
        if self.is_private() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    fn params(&self) -> Vec<Option<usize>> {
        split_params_into_semicolon_delimited_usize(self.numeric_params()).unwrap_or_default()
    }

    /// Turns the finished sequence into zero or more `Command`s.
    #[allow(clippy::too_many_lines)]
    pub fn dispatch(&self, commands: &mut Vec<Command>) {
        let CsiParserState::Finished(final_byte) = self.state else {
            return;
        };

        let params = self.params();
        let p = |idx: usize, default: usize| extract_param(idx, &params).unwrap_or(default);

        match final_byte {
            b'@' => commands.push(Command::InsertCharacters { n: p(0, 1).max(1) }),
            b'A' => commands.push(Command::MoveCursorUp { n: p(0, 1).max(1) }),
            b'B' => commands.push(Command::MoveCursorDown { n: p(0, 1).max(1) }),
            b'C' => commands.push(Command::MoveCursorForward { n: p(0, 1).max(1) }),
            b'D' => commands.push(Command::MoveCursorBackward { n: p(0, 1).max(1) }),
            b'E' => commands.push(Command::CursorNextLine { n: p(0, 1).max(1) }),
            b'F' => commands.push(Command::CursorPreviousLine { n: p(0, 1).max(1) }),
            b'G' => commands.push(Command::MoveCursorToColumn { col: p(0, 1).max(1) }),
            b'H' | b'f' => commands.push(Command::MoveCursorTo {
                row: p(0, 1).max(1),
                col: p(1, 1).max(1),
            }),
            b'J' => dispatch_erase_display(p(0, 0), commands),
            b'K' => dispatch_erase_line(p(0, 0), commands),
            b'L' => commands.push(Command::InsertLines { n: p(0, 1).max(1) }),
            b'M' => commands.push(Command::DeleteLines { n: p(0, 1).max(1) }),
            b'P' => commands.push(Command::DeleteCharacters { n: p(0, 1).max(1) }),
            b'S' => commands.push(Command::ScrollUp { n: p(0, 1).max(1) }),
            b'T' => commands.push(Command::ScrollDown { n: p(0, 1).max(1) }),
            b'X' => commands.push(Command::EraseCharacters { n: p(0, 1).max(1) }),
            b'`' => commands.push(Command::HorizontalPositionAbsolute { col: p(0, 1).max(1) }),
            b'a' => commands.push(Command::HorizontalPositionRelative { n: p(0, 1).max(1) }),
            b'd' => commands.push(Command::MoveCursorToLine { row: p(0, 1).max(1) }),
            b'e' => commands.push(Command::MoveCursorDown { n: p(0, 1).max(1) }),
            b'm' => sgr::dispatch(&self.params, commands),
            b'h' => self.dispatch_mode(&params, true, commands),
            b'l' => self.dispatch_mode(&params, false, commands),
            b'n' => self.dispatch_report(p(0, 0), commands),
            b'p' if self.intermediates.last() == Some(&b'!') => {
                commands.push(Command::SoftTerminalReset);
            }
            b'p' if self.is_dec_request_mode() => {
                let number = p(0, 0) as u16;
                let mode = if self.is_private() {
                    Mode::from_dec_private(number)
                } else {
                    Mode::from_ansi(number)
                };
                commands.push(Command::RequestMode { mode });
            }
            b'r' => commands.push(Command::SetTopBottomMargin {
                top: extract_param(0, &params),
                bottom: extract_param(1, &params),
            }),
            b's' => commands.push(Command::SetLeftRightMargin {
                left: extract_param(0, &params),
                right: extract_param(1, &params),
            }),
            b'c' => {
                if self.params.first() == Some(&b'>') {
                    commands.push(Command::SendTerminalId);
                } else {
                    commands.push(Command::SendDeviceAttributes);
                }
            }
            _ => {
                warn!(
                    "unhandled CSI final byte {:#x} params={:?} intermediates={:?}",
                    final_byte, self.params, self.intermediates
                );
            }
        }
    }

    fn dispatch_mode(&self, params: &[Option<usize>], enable: bool, commands: &mut Vec<Command>) {
        let private = self.is_private();
        for raw in params {
            let Some(number) = raw else { continue };
            let number = *number as u16;
            if private && matches!(number, 9 | 1000 | 1002 | 1003 | 1005 | 1006 | 1015) {
                commands.push(Command::SendMouseEvents {
                    protocol: number,
                    enable,
                });
                continue;
            }
            let mode = if private {
                Mode::from_dec_private(number)
            } else {
                Mode::from_ansi(number)
            };
            commands.push(Command::SetMode { mode, enable });
        }
    }

    fn dispatch_report(&self, param: usize, commands: &mut Vec<Command>) {
        match (self.is_private(), param) {
            (false, 5) => commands.push(Command::DeviceStatusReport),
            (false, 6) => commands.push(Command::ReportCursorPosition),
            (true, 6) => commands.push(Command::ReportExtendedCursorPosition),
            _ => warn!("unhandled DSR parameter: {param}"),
        }
    }
}

fn dispatch_erase_display(param: usize, commands: &mut Vec<Command>) {
    match param {
        0 => commands.push(Command::ClearToEndOfScreen),
        1 => commands.push(Command::ClearToBeginOfScreen),
        2 => commands.push(Command::ClearScreen),
        3 => commands.push(Command::ClearScrollbackBuffer),
        other => warn!("unhandled ED parameter: {other}"),
    }
}

fn dispatch_erase_line(param: usize, commands: &mut Vec<Command>) {
    match param {
        0 => commands.push(Command::ClearToEndOfLine),
        1 => commands.push(Command::ClearToBeginOfLine),
        2 => commands.push(Command::ClearLine),
        other => warn!("unhandled EL parameter: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bytes: &[u8]) -> Vec<Command> {
        let mut parser = CsiParser::new();
        let mut commands = Vec::new();
        for &b in bytes {
            if let ParserOutcome::Finished = parser.push(b) {
                parser.dispatch(&mut commands);
            }
        }
        commands
    }

    #[test_log::test]
    fn cuu_defaults_to_one() {
        assert_eq!(run(b"A"), vec![Command::MoveCursorUp { n: 1 }]);
    }

    #[test_log::test]
    fn cup_with_both_params() {
        assert_eq!(
            run(b"5;10H"),
            vec![Command::MoveCursorTo { row: 5, col: 10 }]
        );
    }

    #[test_log::test]
    fn decstbm_with_missing_bottom() {
        assert_eq!(
            run(b"5r"),
            vec![Command::SetTopBottomMargin {
                top: Some(5),
                bottom: None
            }]
        );
    }

    #[test_log::test]
    fn indexed_foreground_color() {
        use vt_common::color::Color;
        assert_eq!(
            run(b"38;5;235m"),
            vec![Command::SetForegroundColor {
                color: Color::Indexed(235)
            }]
        );
    }

    #[test_log::test]
    fn dsr_cursor_position_report() {
        assert_eq!(run(b"6n"), vec![Command::ReportCursorPosition]);
    }
}
