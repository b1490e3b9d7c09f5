//! ASCII plotting of a pump curve for terminal output.
//!
//! Fixed-size character grid, deterministic output.
//!
//! Plot elements:
//! - head curve over the sampled flow range: `-`
//! - system curve: `.`
//! - duty point: `X`
//! - operating point: `O`

use crate::domain::{DutyPoint, OperatingEnvelope};
use crate::models::evaluate;
use crate::selection::{OperatingPoint, SystemCurve};

/// Render a head curve with optional duty point and system curve.
pub fn render_pump_plot(
    head: &[f64],
    envelope: &OperatingEnvelope,
    duty: Option<DutyPoint>,
    system: Option<(&SystemCurve, &OperatingPoint)>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (q_min, q_max) = flow_range(envelope, duty, system.map(|(_, op)| op));

    let (c_min, c_max) = if envelope.q_max > envelope.q_min {
        (envelope.q_min, envelope.q_max)
    } else {
        (q_min, q_max)
    };
    let head_curve = sample(|q| evaluate(head, q), c_min, c_max, width);
    let system_curve = system.map(|(s, _)| sample(|q| s.head_at(q), q_min, q_max, width));

    let mut marks = Vec::new();
    if let Some(d) = duty {
        marks.push((d.q_req, d.h_req, 'X'));
    }
    if let Some((_, op)) = system.filter(|(_, op)| op.found) {
        marks.push((op.q, op.h, 'O'));
    }

    let (h_min, h_max) = head_range(&head_curve, system_curve.as_deref(), &marks).unwrap_or((0.0, 1.0));
    let (h_min, h_max) = pad_range(h_min, h_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so points can overlay.
    draw_curve(&mut grid, &head_curve, '-', q_min, q_max, h_min, h_max);
    if let Some(curve) = &system_curve {
        draw_curve(&mut grid, curve, '.', q_min, q_max, h_min, h_max);
    }
    for &(q, h, ch) in &marks {
        let x = map_x(q, q_min, q_max, width);
        let y = map_y(h, h_min, h_max, height);
        grid[y][x] = ch;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: Q=[{q_min:.3}, {q_max:.3}] m3/h | H=[{h_min:.2}, {h_max:.2}] m\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn flow_range(envelope: &OperatingEnvelope, duty: Option<DutyPoint>, op: Option<&OperatingPoint>) -> (f64, f64) {
    let mut lo = envelope.q_min;
    let mut hi = envelope.q_max;
    for q in duty.map(|d| d.q_req).into_iter().chain(op.map(|o| o.q)) {
        lo = lo.min(q);
        hi = hi.max(q);
    }
    if lo.is_finite() && hi.is_finite() && hi > lo {
        (lo, hi)
    } else {
        (lo.min(0.0), lo.min(0.0) + 1.0)
    }
}

fn sample(f: impl Fn(f64) -> f64, q_min: f64, q_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let q = q_min + u * (q_max - q_min);
            (q, f(q))
        })
        .collect()
}

fn head_range(curve: &[(f64, f64)], system: Option<&[(f64, f64)]>, marks: &[(f64, f64, char)]) -> Option<(f64, f64)> {
    let mut min_h = f64::INFINITY;
    let mut max_h = f64::NEG_INFINITY;

    let values = curve
        .iter()
        .chain(system.unwrap_or(&[]))
        .map(|&(_, h)| h)
        .chain(marks.iter().map(|&(_, h, _)| h));
    for h in values.filter(|h| h.is_finite()) {
        min_h = min_h.min(h);
        max_h = max_h.max(h);
    }

    if min_h.is_finite() && max_h.is_finite() && max_h > min_h {
        Some((min_h, max_h))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(q: f64, q_min: f64, q_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((q - q_min) / (q_max - q_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(h: f64, h_min: f64, h_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((h - h_min) / (h_max - h_min)).clamp(0.0, 1.0);
    // Highest head is row 0.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, q_min: f64, q_max: f64, h_min: f64, h_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(q, h) in curve {
        if !h.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(q, q_min, q_max, width);
        let y = map_y(h, h_min, h_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, ch);
        } else if grid[y][x] == ' ' {
            grid[y][x] = ch;
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
