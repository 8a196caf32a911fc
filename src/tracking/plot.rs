use image::{Rgb, RgbImage};

use crate::math::stats::column_mean_std;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const BAND: Rgb<u8> = Rgb([170, 200, 235]);
const MEAN: Rgb<u8> = Rgb([25, 80, 160]);

/// Geometry of a mean-variance plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// Value range mapped onto the y axis; values outside are clipped.
    pub ylim: (f64, f64),
    pub margin: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            width: 640,
            height: 480,
            ylim: (0.0, 100.0),
            margin: 40,
        }
    }
}

/// Renders the column-wise mean of `rows` (one row per run, one column per
/// epoch) as a line over a band of ± one standard deviation.
///
/// Horizontal grid lines mark every tenth of the y range.
pub fn plot_mean_variance(rows: &[Vec<f64>], options: &PlotOptions) -> RgbImage {
    let mut img = RgbImage::from_pixel(options.width, options.height, BACKGROUND);
    let (mean, std) = column_mean_std(rows);

    let left = options.margin as f64;
    let right = options.width.saturating_sub(options.margin) as f64;
    let top = options.margin as f64;
    let bottom = options.height.saturating_sub(options.margin) as f64;
    let (y_min, y_max) = options.ylim;

    let to_y = |v: f64| {
        let t = ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
        bottom - t * (bottom - top)
    };
    let points = mean.len();
    let to_x = |i: usize| {
        if points <= 1 {
            (left + right) / 2.0
        } else {
            left + (right - left) * i as f64 / (points - 1) as f64
        }
    };

    for k in 0..=10 {
        let y = top + (bottom - top) * k as f64 / 10.0;
        draw_line(&mut img, (left, y), (right, y), GRID);
    }

    // Band: one vertical span per pixel column, interpolated between epochs.
    if points > 1 {
        for px in left as u32..=right as u32 {
            let pos = (px as f64 - left) / (right - left) * (points - 1) as f64;
            let i = (pos.floor() as usize).min(points - 2);
            let t = pos - i as f64;
            let m = mean[i] + t * (mean[i + 1] - mean[i]);
            let s = std[i] + t * (std[i + 1] - std[i]);
            draw_line(&mut img, (px as f64, to_y(m + s)), (px as f64, to_y(m - s)), BAND);
        }
    } else if points == 1 {
        let x = to_x(0);
        draw_line(&mut img, (x, to_y(mean[0] + std[0])), (x, to_y(mean[0] - std[0])), BAND);
    }

    for i in 1..points {
        let a = (to_x(i - 1), to_y(mean[i - 1]));
        let b = (to_x(i), to_y(mean[i]));
        draw_line(&mut img, a, b, MEAN);
        draw_line(&mut img, (a.0, a.1 + 1.0), (b.0, b.1 + 1.0), MEAN);
    }
    for i in 0..points {
        let (x, y) = (to_x(i), to_y(mean[i]));
        for dx in -2..=2 {
            for dy in -2..=2 {
                put(&mut img, x + dx as f64, y + dy as f64, MEAN);
            }
        }
    }

    draw_line(&mut img, (left, top), (left, bottom), AXIS);
    draw_line(&mut img, (left, bottom), (right, bottom), AXIS);
    img
}

fn put(img: &mut RgbImage, x: f64, y: f64, color: Rgb<u8>) {
    if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Straight line by uniform sampling along the longer axis.
fn draw_line(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        put(img, from.0 + t * (to.0 - from.0), from.1 + t * (to.1 - from.1), color);
    }
}
