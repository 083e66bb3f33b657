// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The byte-level VT500-family state machine. [`Parser::parse_fragment`]
//! is the single entry point: it consumes an arbitrary prefix of a byte
//! stream and returns the `Command`s recognised so far. Partial sequences
//! at the end of a fragment are held in the machine's state and completed
//! by the next call.

pub mod csi;
pub mod dcs;
pub mod osc;
pub mod tracer;
pub mod utf8;

use core::fmt;

use crate::command::Command;
use crate::error::ParserFailures;

use self::csi::CsiParser;
use self::dcs::DcsParser;
use self::osc::OscParser;
use self::tracer::{SequenceTraceable, SequenceTracer};
use self::utf8::{Utf8Decoder, Utf8Step};

/// Result of feeding one byte to a sub-parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserOutcome {
    /// The byte was consumed; no complete sequence yet.
    Continue,
    /// A complete sequence was recognised and its `Command`(s) pushed.
    Finished,
    /// The byte produced a malformed sequence (human-readable detail).
    Invalid(String),
    /// The byte produced a malformed sequence with a structured cause.
    InvalidParserFailure(ParserFailures),
}

impl fmt::Display for ParserOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "Continue"),
            Self::Finished => write!(f, "Finished"),
            Self::Invalid(msg) => write!(f, "Invalid: {msg}"),
            Self::InvalidParserFailure(e) => write!(f, "InvalidParserFailure: {e}"),
        }
    }
}

const ESC: u8 = 0x1B;
const BEL: u8 = 0x07;
const ST_FINAL: u8 = 0x5C;
const C1_ST: u8 = 0x9C;

#[derive(Debug, Default)]
enum State {
    #[default]
    Ground,
    Escape,
    EscapeIntermediate,
    Csi(CsiParser),
    Dcs(DcsParser),
    Osc(OscParser),
    SosPmApcString { last_was_esc: bool },
}

/// The VT byte-stream parser. Owns no buffer identity; it only turns
/// bytes into `Command`s. One `Parser` per input stream (the Screen owns
/// exactly one, regardless of how many buffers it multiplexes).
#[derive(Debug)]
pub struct Parser {
    state: State,
    utf8: Utf8Decoder,
    escape_intermediates: Vec<u8>,
    seq_trace: SequenceTracer,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceTraceable for Parser {
    fn seq_tracer(&mut self) -> &mut SequenceTracer {
        &mut self.seq_trace
    }
    fn seq_tracer_ref(&self) -> &SequenceTracer {
        &self.seq_trace
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            utf8: Utf8Decoder::new(),
            escape_intermediates: Vec::new(),
            seq_trace: SequenceTracer::new(),
        }
    }

    /// Parses an arbitrary prefix of a byte stream, returning every
    /// `Command` recognised in it. Incomplete sequences at the end of
    /// `bytes` remain in the parser's state and are completed on the
    /// next call.
    pub fn parse_fragment(&mut self, bytes: &[u8]) -> Vec<Command> {
        let mut commands = Vec::new();
        for &b in bytes {
            self.push(b, &mut commands);
        }
        commands
    }

    fn push(&mut self, b: u8, commands: &mut Vec<Command>) {
        self.append_trace(b);
        match &mut self.state {
            State::Ground => self.push_ground(b, commands),
            State::Escape => self.push_escape(b, commands),
            State::EscapeIntermediate => self.push_escape_intermediate(b, commands),
            State::Csi(_) => self.push_csi(b, commands),
            State::Dcs(_) => self.push_dcs(b, commands),
            State::Osc(_) => self.push_osc(b, commands),
            State::SosPmApcString { .. } => self.push_sos_pm_apc(b),
        }
    }

    fn push_ground(&mut self, b: u8, commands: &mut Vec<Command>) {
        if b == ESC {
            self.state = State::Escape;
            self.escape_intermediates.clear();
            return;
        }

        if b < 0x20 || b == 0x7F {
            self.utf8 = Utf8Decoder::new();
            execute_c0(b, commands);
            return;
        }

        self.step_utf8(b, commands);
    }

    fn step_utf8(&mut self, b: u8, commands: &mut Vec<Command>) {
        match self.utf8.push(b) {
            Utf8Step::Pending => {}
            Utf8Step::Char(ch) => commands.push(Command::AppendChar { ch }),
            Utf8Step::Invalid { reconsume } => {
                warn!("malformed UTF-8 byte sequence in Ground state");
                commands.push(Command::AppendChar {
                    ch: '\u{FFFD}',
                });
                if let Some(b) = reconsume {
                    self.push_ground(b, commands);
                }
            }
        }
    }

    fn push_escape(&mut self, b: u8, commands: &mut Vec<Command>) {
        match b {
            b'[' => self.state = State::Csi(CsiParser::new()),
            b'P' => self.state = State::Dcs(DcsParser::new()),
            b']' => self.state = State::Osc(OscParser::new()),
            b'X' | b'^' | b'_' => {
                self.state = State::SosPmApcString {
                    last_was_esc: false,
                };
            }
            0x20..=0x2F => {
                self.escape_intermediates.push(b);
                self.state = State::EscapeIntermediate;
            }
            ESC => {} // ESC ESC: stay in Escape, drop the first
            _ => {
                dispatch_escape_final(&self.escape_intermediates, b, commands);
                self.state = State::Ground;
            }
        }
    }

    fn push_escape_intermediate(&mut self, b: u8, commands: &mut Vec<Command>) {
        if (0x20..=0x2F).contains(&b) {
            self.escape_intermediates.push(b);
            return;
        }
        dispatch_escape_final(&self.escape_intermediates, b, commands);
        self.state = State::Ground;
    }

    fn push_csi(&mut self, b: u8, commands: &mut Vec<Command>) {
        let State::Csi(parser) = &mut self.state else {
            unreachable!()
        };
        match parser.push(b) {
            ParserOutcome::Finished => {
                parser.dispatch(commands);
                self.state = State::Ground;
            }
            ParserOutcome::InvalidParserFailure(e) => {
                warn!("CSI sequence rejected: {e}");
                self.state = State::Ground;
            }
            ParserOutcome::Invalid(msg) => {
                warn!("CSI sequence rejected: {msg}");
                if matches!(parser.state, csi::CsiParserState::InvalidFinished) {
                    self.state = State::Ground;
                }
            }
            ParserOutcome::Continue => {}
        }
    }

    fn push_dcs(&mut self, b: u8, commands: &mut Vec<Command>) {
        let State::Dcs(parser) = &mut self.state else {
            unreachable!()
        };
        if parser.push(b) {
            self.state = State::Ground;
        }
        let _ = commands; // DCS payloads are out of the Command vocabulary; see dcs.rs.
    }

    fn push_osc(&mut self, b: u8, commands: &mut Vec<Command>) {
        let State::Osc(parser) = &mut self.state else {
            unreachable!()
        };
        match parser.push(b) {
            ParserOutcome::Finished => {
                parser.dispatch(commands);
                self.state = State::Ground;
            }
            ParserOutcome::Invalid(msg) => {
                warn!("OSC sequence dropped: {msg}");
                self.state = State::Ground;
            }
            ParserOutcome::InvalidParserFailure(e) => {
                warn!("OSC sequence dropped: {e}");
                self.state = State::Ground;
            }
            ParserOutcome::Continue => {}
        }
    }

    fn push_sos_pm_apc(&mut self, b: u8) {
        let State::SosPmApcString { last_was_esc } = &mut self.state else {
            unreachable!()
        };
        if b == C1_ST || (b == ST_FINAL && *last_was_esc) {
            self.state = State::Ground;
            return;
        }
        *last_was_esc = b == ESC;
    }
}

fn execute_c0(b: u8, commands: &mut Vec<Command>) {
    match b {
        BEL => commands.push(Command::Bell),
        0x0A => commands.push(Command::Linefeed),
        0x08 => commands.push(Command::Backspace),
        0x0D => commands.push(Command::MoveCursorToBeginOfLine),
        0x09 => commands.push(Command::MoveCursorToNextTab),
        _ => {}
    }
}

fn dispatch_escape_final(intermediates: &[u8], b: u8, commands: &mut Vec<Command>) {
    use crate::command::{Charset, CharsetTable};

    match (intermediates, b) {
        ([], b'7') => commands.push(Command::SaveCursor),
        ([], b'8') => commands.push(Command::RestoreCursor),
        ([], b'D') => commands.push(Command::Index),
        ([], b'M') => commands.push(Command::ReverseIndex),
        ([], b'E') => commands.push(Command::Linefeed),
        ([], b'6') => commands.push(Command::BackIndex),
        ([], b'9') => commands.push(Command::ForwardIndex),
        ([], b'=') => commands.push(Command::AlternateKeypadMode { enable: true }),
        ([], b'>') => commands.push(Command::AlternateKeypadMode { enable: false }),
        ([], b'c') => commands.push(Command::FullReset),
        ([b'#'], b'8') => commands.push(Command::ScreenAlignmentPattern),
        ([b')'], b'0') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G1,
            charset: Charset::Special,
        }),
        ([b')'], b'B' | b'A') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G1,
            charset: Charset::Ascii,
        }),
        ([b'('], b'0') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G0,
            charset: Charset::Special,
        }),
        ([b'('], b'B' | b'A') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G0,
            charset: Charset::Ascii,
        }),
        ([b'*'], b'0') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G2,
            charset: Charset::Special,
        }),
        ([b'*'], b'B' | b'A') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G2,
            charset: Charset::Ascii,
        }),
        ([b'+'], b'0') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G3,
            charset: Charset::Special,
        }),
        ([b'+'], b'B' | b'A') => commands.push(Command::DesignateCharset {
            table: CharsetTable::G3,
            charset: Charset::Ascii,
        }),
        ([], b'n') => commands.push(Command::SingleShiftSelect {
            table: CharsetTable::G2,
        }),
        ([], b'o') => commands.push(Command::SingleShiftSelect {
            table: CharsetTable::G3,
        }),
        _ => {
            warn!(
                "unhandled escape sequence: intermediates={intermediates:?} final={b:#x}"
            );
        }
    }
}

/// Splits a CSI/SGR parameter byte string on `;`, parsing each field as
/// an optional `usize` (empty field ⇒ `None`, meaning "use default").
///
/// # Errors
/// Returns `Err` if a non-empty field is not a valid unsigned integer.
pub fn split_params_into_semicolon_delimited_usize(
    params: &[u8],
) -> Result<Vec<Option<usize>>, ParserFailures> {
    params
        .split(|b| *b == b';')
        .map(parse_param_as_usize)
        .collect()
}

/// Splits a CSI/SGR parameter byte string on `:` (the sub-parameter
/// separator used by extended SGR forms like `38:2:r:g:b`).
///
/// # Errors
/// Returns `Err` if a non-empty field is not a valid unsigned integer.
pub fn split_params_into_colon_delimited_usize(
    params: &[u8],
) -> Result<Vec<Option<usize>>, ParserFailures> {
    params
        .split(|b| *b == b':')
        .map(parse_param_as_usize)
        .collect()
}

fn parse_param_as_usize(field: &[u8]) -> Result<Option<usize>, ParserFailures> {
    if field.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .map_or_else(|| Err(ParserFailures::UnhandledSgrCommand(field.to_vec())), |n| Ok(Some(n)))
}

/// Returns the parameter at `idx`, or `None` if absent/empty, so callers
/// can apply their own VT default.
#[must_use]
pub fn extract_param(idx: usize, params: &[Option<usize>]) -> Option<usize> {
    params.get(idx).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn ascii_printable_emits_append_char() {
        let mut parser = Parser::new();
        let commands = parser.parse_fragment(b"A");
        assert_eq!(commands, vec![Command::AppendChar { ch: 'A' }]);
    }

    #[test_log::test]
    fn utf8_single_scalar_across_one_fragment() {
        let mut parser = Parser::new();
        let commands = parser.parse_fragment(&[0xC3, 0xB6]);
        assert_eq!(commands, vec![Command::AppendChar { ch: '\u{F6}' }]);
    }

    #[test_log::test]
    fn utf8_embedded_scalar() {
        let mut parser = Parser::new();
        let commands = parser.parse_fragment(&[b'A', 0xC3, 0xB6, b'Z']);
        assert_eq!(
            commands,
            vec![
                Command::AppendChar { ch: 'A' },
                Command::AppendChar { ch: '\u{F6}' },
                Command::AppendChar { ch: 'Z' },
            ]
        );
    }

    #[test_log::test]
    fn utf8_sequence_split_across_fragments() {
        let mut parser = Parser::new();
        assert_eq!(parser.parse_fragment(&[0xC3]), vec![]);
        assert_eq!(
            parser.parse_fragment(&[0xB6]),
            vec![Command::AppendChar { ch: '\u{F6}' }]
        );
    }

    #[test_log::test]
    fn designate_g1_special_charset() {
        use crate::command::{Charset, CharsetTable};
        let mut parser = Parser::new();
        let commands = parser.parse_fragment(b"\x1b)0");
        assert_eq!(
            commands,
            vec![Command::DesignateCharset {
                table: CharsetTable::G1,
                charset: Charset::Special,
            }]
        );
    }

    #[test_log::test]
    fn bell_and_linefeed_are_recognised() {
        let mut parser = Parser::new();
        let commands = parser.parse_fragment(b"\x07\n");
        assert_eq!(commands, vec![Command::Bell, Command::Linefeed]);
    }

    /// Malformed UTF-8 logs a `warn!` on the way to U+FFFD; install a real
    /// subscriber so `cargo test -- --nocapture` shows it instead of the
    /// event being dropped for lack of any registered subscriber.
    #[test]
    fn malformed_utf8_logs_a_warning_and_still_recovers() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .try_init();

        let mut parser = Parser::new();
        let commands = parser.parse_fragment(&[0x80, b'A']);
        assert_eq!(
            commands,
            vec![
                Command::AppendChar { ch: '\u{FFFD}' },
                Command::AppendChar { ch: 'A' },
            ]
        );
    }
}
