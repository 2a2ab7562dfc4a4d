// crates/darkcut-core/src/classify.rs
//
// Luminance classification: mean of a single-channel luma plane compared
// against a fixed, inclusive threshold.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Brightness cut-off. A frame whose mean luma is `<=` this value is dark.
///
/// Always finite: `NaN` would make every comparison false and `inf` would
/// make every frame dark, neither of which is a meaningful setting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold(f64);

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("threshold '{0}' is not a number")]
    NotANumber(String),
    #[error("threshold must be finite, got {0}")]
    NotFinite(f64),
}

impl Threshold {
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(ThresholdError::NotFinite(value))
        }
    }

    pub fn value(self) -> f64 { self.0 }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: f64 = s.trim().parse()
            .map_err(|_| ThresholdError::NotANumber(s.to_string()))?;
        Self::new(v)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `true` ("dark") iff `brightness <= threshold`.
#[inline]
pub fn classify(brightness: f64, threshold: Threshold) -> bool {
    brightness <= threshold.0
}

/// Mean value of the visible pixels of an 8-bit single-channel plane.
///
/// `stride` is the byte distance between row starts (>= `width`); padding
/// bytes past `width` in each row are ignored. An empty plane averages to 0.
///
/// # Panics
///
/// If `plane` is shorter than `(height - 1) * stride + width` bytes, or
/// `stride < width`.
pub fn mean_luma(plane: &[u8], width: usize, height: usize, stride: usize) -> f64 {
    if width == 0 || height == 0 {
        return 0.0;
    }
    assert!(stride >= width, "stride {stride} is narrower than width {width}");
    let needed = (height - 1) * stride + width;
    assert!(
        plane.len() >= needed,
        "plane holds {} bytes, {width}x{height} at stride {stride} needs {needed}",
        plane.len(),
    );
    let sum: u64 = (0..height)
        .map(|row| {
            let s = row * stride;
            plane[s..s + width].iter().map(|&p| p as u64).sum::<u64>()
        })
        .sum();
    sum as f64 / (width * height) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_brightness_is_dark() {
        let t = Threshold::new(12.5).unwrap();
        assert!(classify(12.5, t));
        assert!(classify(12.4999, t));
        assert!(!classify(12.5001, t));
    }

    #[test]
    fn mean_of_uniform_plane() {
        let plane = vec![40u8; 16 * 9];
        assert_eq!(mean_luma(&plane, 16, 9, 16), 40.0);
    }

    #[test]
    fn stride_padding_is_ignored() {
        // 2x2 visible pixels, stride 4: padding bytes are 255.
        let plane = [10u8, 20, 255, 255, 30, 40, 255, 255];
        assert_eq!(mean_luma(&plane, 2, 2, 4), 25.0);
    }

    #[test]
    fn last_row_needs_no_padding() {
        let plane = [10u8, 20, 255, 30, 40];
        assert_eq!(mean_luma(&plane, 2, 2, 3), 25.0);
    }

    #[test]
    #[should_panic(expected = "plane holds 5 bytes")]
    fn short_plane_panics() {
        let plane = [0u8; 5];
        mean_luma(&plane, 2, 2, 4);
    }

    #[test]
    fn empty_plane_is_zero() {
        assert_eq!(mean_luma(&[], 0, 0, 0), 0.0);
    }

    #[test]
    fn threshold_at_computed_mean_classifies_dark() {
        let plane = [0u8, 0, 3, 3];
        let mean = mean_luma(&plane, 4, 1, 4);
        assert_eq!(mean, 1.5);
        assert!(classify(mean, Threshold::new(mean).unwrap()));
    }

    #[test]
    fn parse_threshold() {
        assert_eq!("16".parse::<Threshold>().unwrap().value(), 16.0);
        assert_eq!(" 0.75 ".parse::<Threshold>().unwrap().value(), 0.75);
        assert_eq!("-1".parse::<Threshold>().unwrap().value(), -1.0);
    }

    #[test]
    fn reject_garbage_and_non_finite() {
        assert_eq!(
            "dark".parse::<Threshold>(),
            Err(ThresholdError::NotANumber("dark".into()))
        );
        assert!(matches!("NaN".parse::<Threshold>(), Err(ThresholdError::NotFinite(_))));
        assert!(matches!("inf".parse::<Threshold>(), Err(ThresholdError::NotFinite(_))));
    }
}
