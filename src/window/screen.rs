use crate::geometry::Resolution;

/// Screen and display queries.
pub trait Screen {
    /// Current screen resolution in physical pixels.
    fn resolution(&mut self) -> Resolution;

    /// Switches exclusive/windowed fullscreen. Returns false when the platform
    /// cannot do it.
    fn set_fullscreen(&mut self, fullscreen: bool) -> bool;

    fn is_fullscreen(&self) -> bool;

    /// Hides the cursor and keeps it from leaving the presentation.
    fn set_cursor_locked(&mut self, locked: bool);
}

/// Parses `WIDTHxHEIGHT` (as used by `SIGNAGE_SCREEN`).
pub fn parse_resolution(value: &str) -> Option<Resolution> {
    let (width, height) = value.trim().split_once(['x', 'X'])?;
    Some(Resolution::new(
        width.trim().parse().ok()?,
        height.trim().parse().ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("3840x2160"), Some(Resolution::new(3840, 2160)));
        assert_eq!(parse_resolution(" 1280 X 720 "), Some(Resolution::new(1280, 720)));
        assert_eq!(parse_resolution("0x0"), Some(Resolution::new(0, 0)));
        assert_eq!(parse_resolution("1920"), None);
        assert_eq!(parse_resolution("widexhigh"), None);
    }
}
