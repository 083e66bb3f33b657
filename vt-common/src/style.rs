// Copyright (C) 2024-2025 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bitflags::bitflags;

bitflags! {
    /// Character style mask set by SGR, mirroring the VT220/xterm rendition
    /// bits a cell can carry alongside its foreground/background colour.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Hash)]
    pub struct Style: u16 {
        const BOLD              = 1 << 0;
        const FAINT              = 1 << 1;
        const ITALIC             = 1 << 2;
        const UNDERLINE          = 1 << 3;
        const BLINKING           = 1 << 4;
        const INVERSE            = 1 << 5;
        const HIDDEN             = 1 << 6;
        const CROSSED_OUT        = 1 << 7;
        const DOUBLY_UNDERLINED  = 1 << 8;
    }
}

impl Style {
    #[must_use]
    pub const fn is_set(self, mask: Self) -> bool {
        self.contains(mask)
    }

    pub fn set_mask(&mut self, mask: Self) {
        self.insert(mask);
    }

    pub fn clear_mask(&mut self, mask: Self) {
        self.remove(mask);
    }
}
