//! Sequential yellow-green-blue color scale for fraction values.

use plotters::style::RGBColor;

/// Nine-class YlGnBu scheme, lightest first.
const YLGNBU: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xd9),
    (0xed, 0xf8, 0xb1),
    (0xc7, 0xe9, 0xb4),
    (0x7f, 0xcd, 0xbb),
    (0x41, 0xb6, 0xc4),
    (0x1d, 0x91, 0xc0),
    (0x22, 0x5e, 0xa8),
    (0x25, 0x34, 0x94),
    (0x08, 0x1d, 0x58),
];

/// Fill for stations without any qualifying day.
pub const NO_DATA: RGBColor = RGBColor(0x9e, 0x9e, 0x9e);

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// Uniform cubic B-spline through one channel of the scheme.
fn spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };

    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };

    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// Color at position `t` in [0, 1] along the scheme.
pub fn interpolate_ylgnbu(t: f64) -> RGBColor {
    let channel = |pick: fn(&(u8, u8, u8)) -> u8| {
        let values: Vec<f64> = YLGNBU.iter().map(|c| pick(c) as f64).collect();
        spline(&values, t).round().clamp(0.0, 255.0) as u8
    };
    RGBColor(channel(|c| c.0), channel(|c| c.1), channel(|c| c.2))
}

/// Maps a fraction over `[0, domain_max]` onto the scheme, clamping values
/// outside the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialScale {
    domain_max: f64,
}

impl SequentialScale {
    pub fn new(domain_max: f64) -> Self {
        Self { domain_max }
    }

    pub fn color(&self, val: Option<f64>) -> RGBColor {
        match val {
            Some(v) if v.is_finite() && self.domain_max > 0.0 => {
                interpolate_ylgnbu((v / self.domain_max).clamp(0.0, 1.0))
            }
            _ => NO_DATA,
        }
    }
}

/// `"42%"`, or `"n/a"` when there is no value.
pub fn percent_label(val: Option<f64>) -> String {
    match val {
        Some(v) if v.is_finite() => format!("{}%", (v * 100.0).round() as i64),
        _ => "n/a".to_string(),
    }
}
