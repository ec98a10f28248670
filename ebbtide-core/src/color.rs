//! Node color state.
//!
//! Color smoothing is simulation-owned (the seed transition snaps a node
//! to white, and layout reassigns hue targets every tick); turning these
//! channel values into pixels is the renderer's concern.

use serde::Serialize;

/// An RGB color with channels in `0.0..=255.0`.
///
/// Channels stay floating point so per-tick smoothing accumulates without
/// rounding; a renderer truncates to bytes at draw time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Rgb = Rgb {
        r: 255.0,
        g: 255.0,
        b: 255.0,
    };

    /// Converts HSL (all components in `0..=1`) to RGB channels in `0..=255`.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        // Achromatic fallback
        let mut r = l;
        let mut g = l;
        let mut b = l;

        let v = if l <= 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };

        if v > 0.0 {
            let m = 2.0 * l - v;
            let sv = (v - m) / v;
            let h6 = h * 6.0;
            let sextant = h6 as i32;
            let fract = h6 - sextant as f64;
            let vsf = v * sv * fract;
            let mid1 = m + vsf;
            let mid2 = v - vsf;

            match sextant {
                0 => {
                    r = v;
                    g = mid1;
                    b = m;
                }
                1 => {
                    r = mid2;
                    g = v;
                    b = m;
                }
                2 => {
                    r = m;
                    g = v;
                    b = mid1;
                }
                3 => {
                    r = m;
                    g = mid2;
                    b = v;
                }
                4 => {
                    r = mid1;
                    g = m;
                    b = v;
                }
                5 => {
                    r = v;
                    g = m;
                    b = mid2;
                }
                _ => {}
            }
        }

        Rgb {
            r: (r * 255.0) as f32,
            g: (g * 255.0) as f32,
            b: (b * 255.0) as f32,
        }
    }

    /// Moves a fraction of the remaining distance toward `target` per channel.
    pub fn approach(&mut self, target: Rgb, factor: f32) {
        self.r += (target.r - self.r) * factor;
        self.g += (target.g - self.g) * factor;
        self.b += (target.b - self.b) * factor;
    }
}
