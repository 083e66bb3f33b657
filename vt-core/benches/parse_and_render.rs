// Copyright (C) 2024-2025 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use vt_common::geometry::WindowSize;
use vt_core::parser::Parser;
use vt_core::screen::Screen;

fn plain_text(lines: usize, columns: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines * (columns + 2));
    for line in 0..lines {
        for col in 0..columns {
            out.push(b'a' + ((line + col) % 26) as u8);
        }
        out.extend_from_slice(b"\r\n");
    }
    out
}

fn styled_text(lines: usize, columns: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines * (columns + 16));
    for line in 0..lines {
        out.extend_from_slice(format!("\x1b[38;5;{}m", (line % 230) + 1).as_bytes());
        for col in 0..columns {
            out.push(b'a' + ((line + col) % 26) as u8);
        }
        out.extend_from_slice(b"\x1b[0m\r\n");
    }
    out
}

fn bench_parse_fragment(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_fragment");
    for &(lines, columns) in &[(100, 80), (1000, 80)] {
        let data = plain_text(lines, columns);
        group.bench_with_input(
            BenchmarkId::new("plain", format!("{lines}x{columns}")),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut parser = Parser::new();
                    parser.parse_fragment(data)
                });
            },
        );

        let styled = styled_text(lines, columns);
        group.bench_with_input(
            BenchmarkId::new("styled", format!("{lines}x{columns}")),
            &styled,
            |b, data| {
                b.iter(|| {
                    let mut parser = Parser::new();
                    parser.parse_fragment(data)
                });
            },
        );
    }
    group.finish();
}

fn bench_screen_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen_write");
    let data = plain_text(1000, 80);
    group.bench_function("plain_1000x80", |b| {
        b.iter(|| {
            let mut screen = Screen::new(WindowSize::new(25, 80));
            screen.write(&data);
        });
    });

    let styled = styled_text(1000, 80);
    group.bench_function("styled_1000x80", |b| {
        b.iter(|| {
            let mut screen = Screen::new(WindowSize::new(25, 80));
            screen.write(&styled);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse_fragment, bench_screen_write);
criterion_main!(benches);
