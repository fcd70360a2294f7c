//! Per-tick screen resolution polling.
//!
//! Every change observed on a tick triggers exactly one geometry pass; there
//! is no debouncing. The first sample counts as a change so the initial
//! geometry is applied on the first tick.

use crate::geometry::{self, GeometryError, Resolution};
use crate::surface::{ApplyReport, SurfaceBinder, UiElement};
use crate::window::Screen;

/// Computes the viewport for `actual` and binds it to the surface.
///
/// On [`GeometryError`] nothing is touched and the previous geometry stays.
pub fn apply_geometry<E: UiElement>(
    binder: &mut SurfaceBinder,
    actual: Resolution,
    elements: &mut [E],
) -> Result<ApplyReport, GeometryError> {
    let rect = geometry::compute(binder.target(), actual)?;
    Ok(binder.apply(rect, actual, elements))
}

pub struct ResolutionMonitor {
    last: Option<Resolution>,
    /// When false, changes are tracked but geometry is left alone.
    scaling_enabled: bool,
}

impl ResolutionMonitor {
    pub fn new(scaling_enabled: bool) -> Self {
        Self {
            last: None,
            scaling_enabled,
        }
    }

    /// Last sampled resolution, if any.
    pub fn current(&self) -> Option<Resolution> {
        self.last
    }

    /// Samples the screen once. Returns the outcome of the geometry pass when
    /// the resolution changed and scaling is enabled.
    pub fn poll<E: UiElement>(
        &mut self,
        screen: &mut dyn Screen,
        binder: &mut SurfaceBinder,
        elements: &mut [E],
    ) -> Option<Result<ApplyReport, GeometryError>> {
        let sampled = screen.resolution();
        if self.last == Some(sampled) {
            return None;
        }

        match self.last {
            Some(previous) => log::info!("Screen resolution changed: {} -> {}", previous, sampled),
            None => log::info!("Screen resolution: {}", sampled),
        }
        self.last = Some(sampled);

        if !self.scaling_enabled {
            return None;
        }
        Some(self.apply(binder, sampled, elements))
    }

    /// Re-applies geometry for the last sampled resolution, e.g. after the
    /// window was moved by the startup sequence.
    pub fn reapply<E: UiElement>(
        &mut self,
        binder: &mut SurfaceBinder,
        elements: &mut [E],
    ) -> Option<Result<ApplyReport, GeometryError>> {
        if !self.scaling_enabled {
            return None;
        }
        let actual = self.last?;
        Some(self.apply(binder, actual, elements))
    }

    fn apply<E: UiElement>(
        &self,
        binder: &mut SurfaceBinder,
        actual: Resolution,
        elements: &mut [E],
    ) -> Result<ApplyReport, GeometryError> {
        let result = apply_geometry(binder, actual, elements);
        if let Err(e) = &result {
            log::warn!("Skipping geometry pass, keeping previous viewport: {}", e);
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::ViewportRect;
    use crate::surface::{PixelCanvas, RectTransform, RenderTargets, ViewportCamera};
    use std::collections::VecDeque;

    /// Screen returning scripted resolutions, repeating the last one.
    pub struct ScriptedScreen {
        pub samples: VecDeque<Resolution>,
        pub last: Resolution,
        pub fullscreen: bool,
        pub cursor_locked: bool,
    }

    impl ScriptedScreen {
        pub fn new(samples: &[Resolution]) -> Self {
            Self {
                samples: samples.iter().copied().collect(),
                last: samples[0],
                fullscreen: false,
                cursor_locked: false,
            }
        }
    }

    impl Screen for ScriptedScreen {
        fn resolution(&mut self) -> Resolution {
            if let Some(next) = self.samples.pop_front() {
                self.last = next;
            }
            self.last
        }

        fn set_fullscreen(&mut self, fullscreen: bool) -> bool {
            self.fullscreen = fullscreen;
            true
        }

        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn set_cursor_locked(&mut self, locked: bool) {
            self.cursor_locked = locked;
        }
    }

    const TARGET: Resolution = Resolution::new(1920, 1080);
    const UHD: Resolution = Resolution::new(3840, 2160);

    fn binder() -> SurfaceBinder {
        SurfaceBinder::new(
            TARGET,
            RenderTargets {
                camera: Some(Box::new(ViewportCamera::default())),
                canvas: Some(Box::new(PixelCanvas::new(TARGET))),
            },
        )
    }

    #[test]
    fn test_first_sample_applies_geometry() {
        let mut screen = ScriptedScreen::new(&[UHD]);
        let mut binder = binder();
        let mut monitor = ResolutionMonitor::new(true);

        let report = monitor
            .poll(&mut screen, &mut binder, &mut Vec::<RectTransform>::new())
            .unwrap()
            .unwrap();

        assert_eq!(report.actual, UHD);
        assert_eq!(monitor.current(), Some(UHD));
        assert_eq!(binder.camera().unwrap().viewport().width, 0.5);
    }

    #[test]
    fn test_unchanged_resolution_does_nothing() {
        let mut screen = ScriptedScreen::new(&[UHD, UHD, UHD]);
        let mut binder = binder();
        let mut monitor = ResolutionMonitor::new(true);
        let mut elements: Vec<RectTransform> = Vec::new();

        assert!(monitor.poll(&mut screen, &mut binder, &mut elements).is_some());
        assert!(monitor.poll(&mut screen, &mut binder, &mut elements).is_none());
        assert!(monitor.poll(&mut screen, &mut binder, &mut elements).is_none());
    }

    #[test]
    fn test_two_consecutive_changes_apply_twice() {
        let mut screen = ScriptedScreen::new(&[TARGET, UHD, TARGET]);
        let mut binder = binder();
        let mut monitor = ResolutionMonitor::new(true);
        let mut elements = vec![RectTransform::new("clock", (10.0, -10.0), (200.0, 50.0))];

        monitor.poll(&mut screen, &mut binder, &mut elements);
        let applied: Vec<ApplyReport> = (0..2)
            .filter_map(|_| monitor.poll(&mut screen, &mut binder, &mut elements))
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].actual, UHD);
        assert_eq!(applied[1].actual, TARGET);
        for report in &applied {
            let rect = report.viewport;
            assert_eq!(rect.x, 0.0);
            assert_eq!(rect.y, 1.0 - rect.height);
            assert_eq!(report.scale, 1.0);
        }
        assert_eq!(binder.camera().unwrap().viewport(), ViewportRect::FULL);
    }

    #[test]
    fn test_invalid_resolution_keeps_previous_viewport() {
        let mut screen = ScriptedScreen::new(&[UHD, Resolution::new(0, 0)]);
        let mut binder = binder();
        let mut monitor = ResolutionMonitor::new(true);
        let mut elements: Vec<RectTransform> = Vec::new();

        monitor.poll(&mut screen, &mut binder, &mut elements);
        let before = binder.camera().unwrap().viewport();
        let result = monitor.poll(&mut screen, &mut binder, &mut elements).unwrap();

        assert_eq!(
            result,
            Err(GeometryError::InvalidResolution {
                width: 0,
                height: 0
            })
        );
        assert_eq!(binder.camera().unwrap().viewport(), before);
    }

    #[test]
    fn test_disabled_scaling_tracks_without_applying() {
        let mut screen = ScriptedScreen::new(&[UHD]);
        let mut binder = binder();
        let mut monitor = ResolutionMonitor::new(false);
        let mut elements: Vec<RectTransform> = Vec::new();

        assert!(monitor.poll(&mut screen, &mut binder, &mut elements).is_none());
        assert!(monitor.reapply(&mut binder, &mut elements).is_none());
        assert_eq!(monitor.current(), Some(UHD));
        assert_eq!(binder.camera().unwrap().viewport(), ViewportRect::FULL);
    }
}
