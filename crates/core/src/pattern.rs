//! Circle test pattern.
//!
//! Every pixel is a pure function of its coordinates: pixels closer to the
//! center than `size / radius_divisor` are opaque and red-based, the rest are
//! translucent and colored by which quadrant they fall in.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, CHANNELS};
use crate::error::RenderError;

/// Side length of the canonical pattern.
pub const DEFAULT_SIZE: usize = 512;

/// How a channel value above 255 is stored in a byte.
///
/// The inside-circle green channel is computed as 256 in the left half.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOverflow {
    /// Clamp to 255, as a canvas `Uint8ClampedArray` does.
    #[default]
    Saturate,
    /// Keep the low byte, so 256 becomes 0.
    Wrap,
}

impl ChannelOverflow {
    /// Stores `value` into a byte according to this policy.
    pub fn apply(self, value: u16) -> u8 {
        match self {
            ChannelOverflow::Saturate => value.min(u8::MAX as u16) as u8,
            ChannelOverflow::Wrap => (value & 0xFF) as u8,
        }
    }

    /// Parses `"saturate"` or `"wrap"`.
    pub fn from_name(name: &str) -> Result<Self, RenderError> {
        match name {
            "saturate" => Ok(ChannelOverflow::Saturate),
            "wrap" => Ok(ChannelOverflow::Wrap),
            other => Err(RenderError::InvalidConfig(format!(
                "unknown overflow policy '{other}' (expected saturate or wrap)"
            ))),
        }
    }
}

/// Parameters of the circle pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Side length in pixels; the bitmap is always square.
    pub size: usize,
    /// The circle radius is `size / radius_divisor`.
    pub radius_divisor: f64,
    /// Alpha of pixels inside the circle.
    pub inner_alpha: u8,
    /// Alpha of pixels outside the circle.
    pub outer_alpha: u8,
    pub overflow: ChannelOverflow,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            radius_divisor: 3.0,
            inner_alpha: 255,
            outer_alpha: 40,
            overflow: ChannelOverflow::Saturate,
        }
    }
}

/// A validated circle pattern ready to be sampled or rasterized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePattern {
    size: usize,
    half: usize,
    center: DVec2,
    radius: f64,
    inner_alpha: u8,
    outer_alpha: u8,
    overflow: ChannelOverflow,
}

impl CirclePattern {
    /// Creates the default pattern at the given size.
    pub fn new(size: usize) -> Result<Self, RenderError> {
        Self::from_config(&PatternConfig {
            size,
            ..PatternConfig::default()
        })
    }

    /// Validates `config` and builds the pattern.
    ///
    /// Returns `RenderError::InvalidDimensions` for a zero or overflowing size
    /// and `RenderError::InvalidConfig` for a non-positive radius divisor.
    pub fn from_config(config: &PatternConfig) -> Result<Self, RenderError> {
        let size = config.size;
        if size == 0 {
            return Err(RenderError::InvalidDimensions);
        }
        size.checked_mul(size)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(RenderError::InvalidDimensions)?;
        if !(config.radius_divisor.is_finite() && config.radius_divisor > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "radius_divisor must be a positive number, got {}",
                config.radius_divisor
            )));
        }

        let extent = size as f64;
        Ok(Self {
            size,
            half: size / 2,
            center: DVec2::splat(extent / 2.0),
            radius: extent / config.radius_divisor,
            inner_alpha: config.inner_alpha,
            outer_alpha: config.outer_alpha,
            overflow: config.overflow,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Radius of the opaque disc in pixels.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `(i, j)` lies strictly inside the disc.
    pub fn is_inside(&self, i: usize, j: usize) -> bool {
        DVec2::new(i as f64, j as f64).distance(self.center) < self.radius
    }

    /// RGBA value of pixel `(i, j)`, where `i` is the column and `j` the row.
    pub fn pixel(&self, i: usize, j: usize) -> [u8; 4] {
        let full = |cond: bool| if cond { 255 } else { 0 };
        let left = i < self.half;
        let lower = j > self.half;

        if self.is_inside(i, j) {
            let green = if left { 256 } else { 0 };
            [
                255,
                self.overflow.apply(green),
                full(lower),
                self.inner_alpha,
            ]
        } else {
            [full(i > self.half), full(left), full(lower), self.outer_alpha]
        }
    }

    /// Rasterizes the whole pattern into a new `size x size` bitmap.
    pub fn generate(&self) -> Result<Bitmap, RenderError> {
        let mut bitmap = Bitmap::new(self.size, self.size)?;
        for (idx, px) in bitmap.data_mut().chunks_exact_mut(CHANNELS).enumerate() {
            px.copy_from_slice(&self.pixel(idx % self.size, idx / self.size));
        }
        Ok(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> CirclePattern {
        CirclePattern::new(DEFAULT_SIZE).unwrap()
    }

    #[test]
    fn center_pixel_is_opaque_red() {
        let pattern = canonical();
        assert_eq!(pattern.pixel(256, 256), [255, 0, 0, 255]);
    }

    #[test]
    fn corner_pixel_is_translucent_green() {
        let pattern = canonical();
        assert_eq!(pattern.pixel(0, 0), [0, 255, 0, 40]);
    }

    #[test]
    fn inside_left_green_saturates_by_default() {
        let pattern = canonical();
        // distance 156 < 170.67, i < 256
        assert_eq!(pattern.pixel(100, 256), [255, 255, 0, 255]);
    }

    #[test]
    fn inside_left_green_wraps_when_requested() {
        let pattern = CirclePattern::from_config(&PatternConfig {
            overflow: ChannelOverflow::Wrap,
            ..PatternConfig::default()
        })
        .unwrap();
        assert_eq!(pattern.pixel(100, 256), [255, 0, 0, 255]);
    }

    #[test]
    fn inside_lower_right_has_blue() {
        let pattern = canonical();
        assert_eq!(pattern.pixel(300, 300), [255, 0, 255, 255]);
    }

    #[test]
    fn outside_quadrants() {
        let pattern = canonical();
        assert_eq!(pattern.pixel(511, 0), [255, 0, 0, 40]);
        assert_eq!(pattern.pixel(511, 511), [255, 0, 255, 40]);
        assert_eq!(pattern.pixel(0, 511), [0, 255, 255, 40]);
        // on the center column and row only alpha survives
        assert_eq!(pattern.pixel(256, 0), [0, 0, 0, 40]);
    }

    #[test]
    fn radius_is_a_third_of_size() {
        let pattern = canonical();
        assert!((pattern.radius() - 512.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_is_strict() {
        let pattern = CirclePattern::from_config(&PatternConfig {
            size: 8,
            radius_divisor: 4.0,
            ..PatternConfig::default()
        })
        .unwrap();
        // center (4, 4), radius 2: distance exactly 2 is outside
        assert!(!pattern.is_inside(6, 4));
        assert!(pattern.is_inside(5, 4));
    }

    #[test]
    fn generate_writes_pixel_at_linear_offset() {
        let pattern = canonical();
        let bmp = pattern.generate().unwrap();
        assert_eq!(bmp.len(), 512 * 512 * 4);
        let (i, j) = (100, 256);
        let offset = 4 * (j * 512 + i);
        assert_eq!(&bmp.data()[offset..offset + 4], &pattern.pixel(i, j));
    }

    #[test]
    fn generate_is_deterministic() {
        let pattern = canonical();
        assert_eq!(pattern.generate().unwrap(), pattern.generate().unwrap());
        assert_eq!(pattern.generate().unwrap(), canonical().generate().unwrap());
    }

    #[test]
    fn zero_size_rejected() {
        assert!(matches!(
            CirclePattern::new(0),
            Err(RenderError::InvalidDimensions)
        ));
    }

    #[test]
    fn non_positive_divisor_rejected() {
        for divisor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = CirclePattern::from_config(&PatternConfig {
                radius_divisor: divisor,
                ..PatternConfig::default()
            });
            assert!(
                matches!(result, Err(RenderError::InvalidConfig(_))),
                "divisor {divisor} accepted"
            );
        }
    }

    #[test]
    fn overflow_policy_parses_names() {
        assert_eq!(ChannelOverflow::from_name("wrap").unwrap(), ChannelOverflow::Wrap);
        assert_eq!(
            ChannelOverflow::from_name("saturate").unwrap(),
            ChannelOverflow::Saturate
        );
        assert!(ChannelOverflow::from_name("clip").is_err());
    }

    #[test]
    fn overflow_policy_leaves_bytes_alone() {
        for v in [0u16, 40, 255] {
            assert_eq!(ChannelOverflow::Saturate.apply(v), v as u8);
            assert_eq!(ChannelOverflow::Wrap.apply(v), v as u8);
        }
        assert_eq!(ChannelOverflow::Saturate.apply(256), 255);
        assert_eq!(ChannelOverflow::Wrap.apply(256), 0);
    }

    #[test]
    fn pattern_config_deserializes_partial_json() {
        let config: PatternConfig =
            serde_json::from_str(r#"{"size": 64, "overflow": "wrap"}"#).unwrap();
        assert_eq!(config.size, 64);
        assert_eq!(config.overflow, ChannelOverflow::Wrap);
        assert_eq!(config.outer_alpha, 40);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn alpha_and_red_follow_distance(i in 0usize..512, j in 0usize..512) {
                let pattern = canonical();
                let r = ((i as f64 - 256.0).powi(2) + (j as f64 - 256.0).powi(2)).sqrt();
                let px = pattern.pixel(i, j);
                if r < 512.0 / 3.0 {
                    prop_assert_eq!(px[0], 255);
                    prop_assert_eq!(px[3], 255);
                } else {
                    prop_assert_eq!(px[3], 40);
                }
            }

            #[test]
            fn bitmap_length_matches_size(size in 1usize..96) {
                let bmp = CirclePattern::new(size).unwrap().generate().unwrap();
                prop_assert_eq!(bmp.len(), size * size * 4);
                prop_assert_eq!(bmp.width(), size);
                prop_assert_eq!(bmp.height(), size);
            }

            #[test]
            fn generated_bitmap_agrees_with_pixel(size in 1usize..64, fx in 0.0f64..1.0, fy in 0.0f64..1.0) {
                let x = (fx * size as f64) as usize;
                let y = (fy * size as f64) as usize;
                let pattern = CirclePattern::new(size).unwrap();
                prop_assert_eq!(pattern.generate().unwrap().get(x, y), Some(pattern.pixel(x, y)));
            }
        }
    }
}
