// Copyright (C) 2024-2025 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

/// Graphics-rendition colour.
///
/// Tagged variant matching the SGR colour model: the default terminal
/// colour, a palette index (0..=255, covering both the 8/16-colour and
/// the extended 256-colour tables), one of the eight "bright" ANSI
/// colours addressed directly (90..=97 / 100..=107), or a 24-bit RGB
/// truecolor value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Hash)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Bright(u8),
    Rgb(u8, u8, u8),
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Indexed(n) => write!(f, "indexed({n})"),
            Self::Bright(n) => write!(f, "bright({n})"),
            Self::Rgb(r, g, b) => write!(f, "rgb({r},{g},{b})"),
        }
    }
}
