// src/debug.rs
//
// Debug rendering of one tracked frame: the mask, the region each side was
// searched in, the pixels attributed to each side and the smoothed curves.
//
//   white  = mask pixel       dark green = warm-start band
//   green  = sliding window   red / blue = left / right pixels
//   yellow = best_plotx

use crate::analysis::CurveTrack;
use crate::mask::BinaryMask;
use crate::pipeline::{FrameResult, SideOutcome};
use crate::search::SearchWindow;
use crate::types::LanePixels;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

const MASK_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BAND_COLOR: Rgb<u8> = Rgb([0, 80, 0]);
const WINDOW_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LEFT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const RIGHT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const CURVE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Mask as a white-on-black RGB image.
pub fn mask_to_rgb(mask: &BinaryMask) -> RgbImage {
    RgbImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        if mask.is_on(x as usize, y as usize) {
            MASK_COLOR
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Sliding-window rectangles drawn 2px wide, clipped to the canvas.
pub fn draw_windows(canvas: &mut RgbImage, windows: &[SearchWindow]) {
    for w in windows {
        for inset in 0..2i64 {
            let width = w.x_high - w.x_low - 2 * inset;
            let height = w.y_high - w.y_low - 2 * inset;
            if width <= 0 || height <= 0 {
                continue;
            }
            let rect = Rect::at((w.x_low + inset) as i32, (w.y_low + inset) as i32)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(canvas, rect, WINDOW_COLOR);
        }
    }
}

fn draw_band(canvas: &mut RgbImage, outcome: &SideOutcome) {
    let Some(band) = &outcome.band else {
        return;
    };
    for &(y, x0, x1) in &band.rows {
        for x in x0..x1 {
            let px = canvas.get_pixel_mut(x as u32, y as u32);
            if *px != MASK_COLOR {
                *px = BAND_COLOR;
            }
        }
    }
}

fn paint_pixels(canvas: &mut RgbImage, pixels: &LanePixels, color: Rgb<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    for (x, y) in pixels.iter() {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

pub fn draw_curve(canvas: &mut RgbImage, track: &CurveTrack) {
    let Some(best) = track.best_plotx() else {
        return;
    };
    for (y, pair) in best.windows(2).enumerate() {
        draw_line_segment_mut(
            canvas,
            (pair[0] as f32, y as f32),
            (pair[1] as f32, (y + 1) as f32),
            CURVE_COLOR,
        );
    }
}

/// Full debug view of a processed frame.
pub fn render_frame(
    mask: &BinaryMask,
    result: &FrameResult,
    left: &CurveTrack,
    right: &CurveTrack,
) -> RgbImage {
    let mut canvas = mask_to_rgb(mask);
    draw_band(&mut canvas, &result.left);
    draw_band(&mut canvas, &result.right);
    if let Some(seed) = &result.seed {
        draw_windows(&mut canvas, &seed.windows);
    }
    paint_pixels(&mut canvas, &result.left.pixels, LEFT_COLOR);
    paint_pixels(&mut canvas, &result.right.pixels, RIGHT_COLOR);
    draw_curve(&mut canvas, left);
    draw_curve(&mut canvas, right);
    canvas
}
