// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `ESC P ... ST`: Device Control Strings. No Device Control String maps
//! to a `Command` in this core (sixel/ReGIS graphics and terminfo
//! queries are out of scope); the payload is collected only so the
//! string terminator can be recognised, then logged and dropped.

use super::tracer::{SequenceTraceable, SequenceTracer};

#[derive(Debug, Default)]
pub struct DcsParser {
    data: Vec<u8>,
    last_was_esc: bool,
    seq_trace: SequenceTracer,
}

impl SequenceTraceable for DcsParser {
    fn seq_tracer(&mut self) -> &mut SequenceTracer {
        &mut self.seq_trace
    }
    fn seq_tracer_ref(&self) -> &SequenceTracer {
        &self.seq_trace
    }
}

impl DcsParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            last_was_esc: false,
            seq_trace: SequenceTracer::new(),
        }
    }

    /// Feeds one byte. Returns `true` once the string terminator has
    /// been seen, at which point the whole sequence is logged and the
    /// caller should return to `Ground`.
    pub fn push(&mut self, b: u8) -> bool {
        self.append_trace(b);

        if b == 0x9C || (b == 0x5C && self.last_was_esc) {
            debug!(
                "dropped DCS sequence ({} bytes): no semantic mapping",
                self.data.len()
            );
            return true;
        }

        self.last_was_esc = b == 0x1B;
        if !self.last_was_esc {
            self.data.push(b);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn terminates_on_esc_backslash() {
        let mut parser = DcsParser::new();
        assert!(!parser.push(b'0'));
        assert!(!parser.push(b'$'));
        assert!(!parser.push(b'q'));
        assert!(!parser.push(0x1B));
        assert!(parser.push(b'\\'));
    }

    #[test_log::test]
    fn terminates_on_c1_st() {
        let mut parser = DcsParser::new();
        assert!(!parser.push(b'a'));
        assert!(parser.push(0x9C));
    }
}
