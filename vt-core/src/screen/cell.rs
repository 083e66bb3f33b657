// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vt_common::color::Color;
use vt_common::style::Style;

/// The graphics-attribute register: the rendition newly-printed or
/// newly-inserted cells pick up. One lives on each `Buffer`, updated by
/// `SetForegroundColor`/`SetBackgroundColor`/`SetGraphicsRendition`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Hash)]
pub struct GraphicsAttributes {
    pub foreground: Color,
    pub background: Color,
    pub style: Style,
}

/// A single grid cell. `character == '\0'` means blank.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Cell {
    pub character: char,
    pub foreground: Color,
    pub background: Color,
    pub style: Style,
}

impl Cell {
    pub const BLANK_CHAR: char = '\0';

    #[must_use]
    pub const fn blank() -> Self {
        Self {
            character: Self::BLANK_CHAR,
            foreground: Color::Default,
            background: Color::Default,
            style: Style::empty(),
        }
    }

    /// A blank cell carrying the current background so erases paint with
    /// the active rendition rather than always-default, per xterm
    /// convention.
    #[must_use]
    pub const fn blank_with_attributes(attrs: &GraphicsAttributes) -> Self {
        Self {
            character: Self::BLANK_CHAR,
            foreground: attrs.foreground,
            background: attrs.background,
            style: Style::empty(),
        }
    }

    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.character == Self::BLANK_CHAR
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}
