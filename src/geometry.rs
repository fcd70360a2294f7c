//! Dot-by-dot display geometry.
//!
//! Maps the configured target resolution onto the actual screen so that one
//! target pixel lands on exactly one screen pixel, with the presentation
//! pinned to the top-left corner. No scaling or letterboxing is ever applied.

use std::fmt;

use thiserror::Error;

/// A pixel resolution. Dimensions are signed because native screen queries
/// report signed values; anything non-positive is rejected by [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

impl Resolution {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Normalized viewport rectangle, origin at the bottom-left, y growing upward.
///
/// Values are fractions of the actual screen. When the target is larger than
/// the screen the rectangle legitimately extends past `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    /// The whole screen.
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

impl fmt::Display for ViewportRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4}, {:.4})",
            self.x, self.y, self.width, self.height
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("invalid resolution {width}x{height}: both dimensions must be positive")]
    InvalidResolution { width: i32, height: i32 },
}

/// Computes the viewport that shows `target` pixel-for-pixel on a screen of
/// size `actual`, anchored at the screen's top-left corner.
///
/// The caller must keep its previous geometry when this fails.
pub fn compute(target: Resolution, actual: Resolution) -> Result<ViewportRect, GeometryError> {
    if !actual.is_positive() {
        return Err(GeometryError::InvalidResolution {
            width: actual.width,
            height: actual.height,
        });
    }

    let width = f64::from(target.width) / f64::from(actual.width);
    let height = f64::from(target.height) / f64::from(actual.height);

    // Bottom-left origin: pinning to the top edge means starting at 1 - height.
    Ok(ViewportRect {
        x: 0.0,
        y: 1.0 - height,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: Resolution = Resolution::new(1920, 1080);

    #[test]
    fn test_matching_resolution_fills_screen() {
        let rect = compute(FULL_HD, FULL_HD).unwrap();
        assert_eq!(rect, ViewportRect::FULL);
    }

    #[test]
    fn test_4k_screen_uses_top_left_quarter() {
        let rect = compute(FULL_HD, Resolution::new(3840, 2160)).unwrap();
        assert_eq!(
            rect,
            ViewportRect {
                x: 0.0,
                y: 0.5,
                width: 0.5,
                height: 0.5,
            }
        );
    }

    #[test]
    fn test_formula_holds_for_mixed_sizes() {
        let cases = [
            (Resolution::new(1920, 1080), Resolution::new(2560, 1440)),
            (Resolution::new(1080, 1920), Resolution::new(1920, 1200)),
            (Resolution::new(800, 600), Resolution::new(1366, 768)),
            (Resolution::new(1, 1), Resolution::new(7, 3)),
        ];
        for (target, actual) in cases {
            let rect = compute(target, actual).unwrap();
            assert_eq!(rect.width, target.width as f64 / actual.width as f64);
            assert_eq!(rect.height, target.height as f64 / actual.height as f64);
            assert_eq!(rect.x, 0.0);
            assert_eq!(rect.y, 1.0 - rect.height);
        }
    }

    #[test]
    fn test_target_larger_than_screen_is_not_clamped() {
        let rect = compute(FULL_HD, Resolution::new(1280, 720)).unwrap();
        assert_eq!(rect.width, 1.5);
        assert_eq!(rect.height, 1.5);
        assert_eq!(rect.y, -0.5);
    }

    #[test]
    fn test_zero_or_negative_screen_is_rejected() {
        for actual in [
            Resolution::new(0, 1080),
            Resolution::new(1920, 0),
            Resolution::new(-1920, 1080),
            Resolution::new(0, 0),
        ] {
            assert_eq!(
                compute(FULL_HD, actual),
                Err(GeometryError::InvalidResolution {
                    width: actual.width,
                    height: actual.height,
                })
            );
        }
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(FULL_HD.to_string(), "1920x1080");
    }
}
