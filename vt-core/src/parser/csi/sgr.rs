// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Select Graphic Rendition (`CSI … m`): walks the parameter list
//! left-to-right, emitting one `Command` per attribute change. Accepts
//! both `;`-separated and `:`-separated (sub-parameter) forms for the
//! indexed/truecolor extensions.

use std::vec::IntoIter;

use vt_common::color::Color;
use vt_common::style::Style;

use crate::command::{Command, GraphicsRenditionChange};

use super::super::{split_params_into_colon_delimited_usize, split_params_into_semicolon_delimited_usize};

pub(super) fn dispatch(raw_params: &[u8], commands: &mut Vec<Command>) {
    let split_by_colon = raw_params.contains(&b':');
    let parsed = if split_by_colon {
        split_params_into_colon_delimited_usize(raw_params)
    } else {
        split_params_into_semicolon_delimited_usize(raw_params)
    };

    let Ok(mut params) = parsed else {
        warn!("invalid SGR parameter sequence: {raw_params:?}");
        return;
    };

    if params.is_empty() || (params.len() == 1 && params[0].is_none()) {
        params = vec![Some(0)];
    }

    let mut iter: IntoIter<Option<usize>> = params.into_iter();
    while let Some(param) = iter.next() {
        let Some(param) = param else { continue };

        if matches!(param, 38 | 48 | 58) {
            dispatch_extended_color(param, &mut iter, split_by_colon, commands);
            continue;
        }

        dispatch_simple(param, commands);
    }
}

fn dispatch_simple(param: usize, commands: &mut Vec<Command>) {
    match param {
        0 => commands.push(Command::SetGraphicsRendition {
            change: GraphicsRenditionChange::Reset,
        }),
        1 => set(Style::BOLD, commands),
        2 => set(Style::FAINT, commands),
        3 => set(Style::ITALIC, commands),
        4 => set(Style::UNDERLINE, commands),
        5 | 6 => set(Style::BLINKING, commands),
        7 => set(Style::INVERSE, commands),
        8 => set(Style::HIDDEN, commands),
        9 => set(Style::CROSSED_OUT, commands),
        21 => set(Style::DOUBLY_UNDERLINED, commands),
        22 => clear(Style::BOLD | Style::FAINT, commands),
        23 => clear(Style::ITALIC, commands),
        24 => clear(Style::UNDERLINE | Style::DOUBLY_UNDERLINED, commands),
        25 => clear(Style::BLINKING, commands),
        27 => clear(Style::INVERSE, commands),
        28 => clear(Style::HIDDEN, commands),
        29 => clear(Style::CROSSED_OUT, commands),
        30..=37 => fg(Color::Indexed((param - 30) as u8), commands),
        39 => fg(Color::Default, commands),
        40..=47 => bg(Color::Indexed((param - 40) as u8), commands),
        49 => bg(Color::Default, commands),
        90..=97 => fg(Color::Bright((param - 90) as u8), commands),
        100..=107 => bg(Color::Bright((param - 100) as u8), commands),
        other => warn!("unhandled SGR parameter: {other}"),
    }
}

fn dispatch_extended_color(
    control: usize,
    iter: &mut IntoIter<Option<usize>>,
    split_by_colon: bool,
    commands: &mut Vec<Command>,
) {
    let Some(mode) = iter.next().flatten() else {
        if control == 38 {
            fg(Color::Default, commands);
        } else if control == 48 {
            bg(Color::Default, commands);
        }
        return;
    };

    match mode {
        2 => {
            if split_by_colon && iter.len() > 3 {
                let _ = iter.next(); // skip optional colour-space id
            }
            let r = iter.next().flatten().unwrap_or(0) as u8;
            let g = iter.next().flatten().unwrap_or(0) as u8;
            let b = iter.next().flatten().unwrap_or(0) as u8;
            let color = Color::Rgb(r, g, b);
            match control {
                38 => fg(color, commands),
                48 => bg(color, commands),
                _ => {}
            }
        }
        5 => {
            let index = iter.next().flatten().unwrap_or(0) as u8;
            match control {
                38 => fg(Color::Indexed(index), commands),
                48 => bg(Color::Indexed(index), commands),
                _ => {}
            }
        }
        other => warn!("unhandled extended SGR colour mode: {other}"),
    }
}

fn set(style: Style, commands: &mut Vec<Command>) {
    commands.push(Command::SetGraphicsRendition {
        change: GraphicsRenditionChange::Set(style),
    });
}

fn clear(style: Style, commands: &mut Vec<Command>) {
    commands.push(Command::SetGraphicsRendition {
        change: GraphicsRenditionChange::Clear(style),
    });
}

fn fg(color: Color, commands: &mut Vec<Command>) {
    commands.push(Command::SetForegroundColor { color });
}

fn bg(color: Color, commands: &mut Vec<Command>) {
    commands.push(Command::SetBackgroundColor { color });
}
