// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Failures the parser can hit while turning bytes into `Command`s.
///
/// None of these are fatal: the parser logs and drops the offending
/// sequence, then returns to `Ground`.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum ParserFailures {
    #[error("parser pushed to once finished")]
    ParsedPushedToOnceFinished,
    #[error("unhandled escape intermediate/final sequence: {0}")]
    UnhandledInnerEscape(String),
    #[error("invalid CSI final byte '{0}' with params {1:?}")]
    UnhandledCsiCommand(char, Vec<u8>),
    #[error("invalid SGR parameter sequence: {0:?}")]
    UnhandledSgrCommand(Vec<u8>),
    #[error("invalid mode set/reset parameter sequence: {0:?}")]
    UnhandledModeCommand(Vec<u8>),
    #[error("invalid DECSTBM/DECSLRM parameter sequence: {0:?}")]
    UnhandledMarginCommand(Vec<u8>),
    #[error("invalid cursor position parameter sequence: {0:?}")]
    UnhandledCursorCommand(Vec<u8>),
    #[error("invalid charset designation sequence: {0:?}")]
    UnhandledCharsetCommand(Vec<u8>),
    #[error("malformed UTF-8 byte sequence: {0:?}")]
    InvalidUtf8(Vec<u8>),
    #[error("OSC sequence had no type field: {0:?}")]
    UnhandledOscCommand(Vec<u8>),
}

/// Errors surfaced at the Screen level. Everything here is either a
/// clamp-and-continue situation the caller may want to observe, or a
/// fatal invariant violation.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// `verifyState` found a violated invariant. The Screen must not be
    /// used after this is returned.
    #[error("internal invariant violated: {0}")]
    StateCorruption(String),
    /// Allocation failed while reshaping a buffer during `resize`. The
    /// buffer is left in its prior state.
    #[error("resize failed to allocate new buffer storage")]
    ResizeAllocationFailure,
}
