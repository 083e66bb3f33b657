// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `ESC ] ... (BEL | ST)`: OSC data bytes are collected verbatim (they
//! may contain non-ASCII, unlike CSI parameters) and split on `;` once
//! the terminator is seen. Only `0`/`1`/`2` (title/icon) map to a
//! `Command`; anything else is logged and dropped.

use crate::command::Command;

use super::ParserOutcome;
use super::tracer::{SequenceTraceable, SequenceTracer};

#[derive(Debug, Eq, PartialEq, Default)]
enum OscState {
    #[default]
    Collecting,
    Finished,
    Invalid,
}

#[derive(Debug, Default)]
pub struct OscParser {
    state: OscState,
    data: Vec<u8>,
    seq_trace: SequenceTracer,
}

impl SequenceTraceable for OscParser {
    fn seq_tracer(&mut self) -> &mut SequenceTracer {
        &mut self.seq_trace
    }
    fn seq_tracer_ref(&self) -> &SequenceTracer {
        &self.seq_trace
    }
}

const fn is_valid_osc_byte(b: u8) -> bool {
    (0x20..=0x7E).contains(&b) || b >= 0x80 || b == 0x07 || b == 0x1B
}

impl OscParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: OscState::Collecting,
            data: Vec::new(),
            seq_trace: SequenceTracer::new(),
        }
    }

    pub fn push(&mut self, b: u8) -> ParserOutcome {
        self.append_trace(b);

        if self.state == OscState::Finished {
            return ParserOutcome::Invalid("parser pushed to once finished".to_string());
        }

        if !is_valid_osc_byte(b) {
            self.state = OscState::Invalid;
            return ParserOutcome::Invalid("invalid OSC byte".to_string());
        }

        self.data.push(b);

        if matches!(self.data.as_slice(), [.., 0x07] | [.., 0x1B, 0x5C]) {
            self.state = OscState::Finished;
            self.seq_trace.trim_control_tail();
            while matches!(self.data.last(), Some(0x07 | 0x1B | 0x5C)) {
                self.data.pop();
            }
            return ParserOutcome::Finished;
        }

        ParserOutcome::Continue
    }

    pub fn dispatch(&self, commands: &mut Vec<Command>) {
        let text = String::from_utf8_lossy(&self.data);
        let mut fields = text.splitn(2, ';');
        let Some(kind) = fields.next() else {
            warn!("empty OSC sequence");
            return;
        };
        let payload = fields.next().unwrap_or("").to_string();

        match kind {
            "0" | "2" => commands.push(Command::ChangeWindowTitle { s: payload }),
            "1" => commands.push(Command::ChangeIconName { s: payload }),
            other => debug!("unhandled OSC type {other}, dropping payload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bytes: &[u8]) -> Vec<Command> {
        let mut parser = OscParser::new();
        let mut commands = Vec::new();
        for &b in bytes {
            if parser.push(b) == ParserOutcome::Finished {
                parser.dispatch(&mut commands);
            }
        }
        commands
    }

    #[test_log::test]
    fn set_title_with_bel_terminator() {
        assert_eq!(
            run(b"0;hello\x07"),
            vec![Command::ChangeWindowTitle {
                s: "hello".to_string()
            }]
        );
    }

    #[test_log::test]
    fn set_icon_name_with_st_terminator() {
        assert_eq!(
            run(b"1;icon\x1b\\"),
            vec![Command::ChangeIconName {
                s: "icon".to_string()
            }]
        );
    }

    #[test_log::test]
    fn unknown_type_is_dropped() {
        assert_eq!(run(b"52;c;foo\x07"), vec![]);
    }
}
