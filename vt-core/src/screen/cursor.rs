// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vt_common::geometry::Coordinate;

use super::cell::GraphicsAttributes;

/// The cursor: a 1-based screen-absolute position plus visibility. "Real
/// cursor position" is always this; origin-mode translation to
/// margin-relative coordinates happens at the `Buffer`/`Screen` API
/// boundary, not here.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Cursor {
    pub position: Coordinate,
    pub visible: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Coordinate::new(1, 1),
            visible: true,
        }
    }
}

/// A DECSC snapshot, restored by DECRC. Character-set state is reserved
/// for future extension (the core has a single implicit charset today).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SavedState {
    pub position: Coordinate,
    pub attributes: GraphicsAttributes,
    pub auto_wrap: bool,
    pub origin_mode: bool,
}
