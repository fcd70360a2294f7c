//! Binds computed geometry to the rendering surface.
//!
//! The camera gets the normalized viewport, the canvas is forced into
//! constant-pixel-size mode at scale 1.0 and anchored top-left, and every
//! registered UI element is normalized to identity scale with a top-left
//! anchor. Element positions and sizes belong to content authors and are
//! never touched.

use crate::geometry::{Resolution, ViewportRect};

/// A point or vector in normalized anchor space (origin bottom-left).
pub type Vec2 = (f64, f64);

/// Anchor rectangle and pivot of a rectangular UI transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub min: Vec2,
    pub max: Vec2,
    pub pivot: Vec2,
}

impl Anchor {
    pub const TOP_LEFT: Self = Self {
        min: (0.0, 1.0),
        max: (0.0, 1.0),
        pivot: (0.0, 1.0),
    };

    pub const CENTER: Self = Self {
        min: (0.5, 0.5),
        max: (0.5, 0.5),
        pivot: (0.5, 0.5),
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// UI units are screen pixels.
    ConstantPixelSize,
    /// UI is scaled relative to a reference resolution.
    ScaleWithScreenSize,
}

/// Full layout state of the UI canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasLayout {
    pub scale_mode: ScaleMode,
    pub scale_factor: f64,
    pub anchor: Anchor,
    pub anchored_position: Vec2,
    pub size: Resolution,
}

impl CanvasLayout {
    /// Layout that renders `target` dot-by-dot from the top-left corner.
    pub fn pixel_exact(target: Resolution) -> Self {
        Self {
            scale_mode: ScaleMode::ConstantPixelSize,
            scale_factor: 1.0,
            anchor: Anchor::TOP_LEFT,
            anchored_position: (0.0, 0.0),
            size: target,
        }
    }
}

pub trait Camera {
    fn set_viewport(&mut self, rect: ViewportRect);
    fn viewport(&self) -> ViewportRect;
}

pub trait Canvas {
    fn set_layout(&mut self, layout: CanvasLayout);
    fn layout(&self) -> CanvasLayout;
}

/// A rectangular UI element owned by content; the binder only normalizes
/// its scale and anchor.
pub trait UiElement {
    fn set_local_scale(&mut self, scale: [f64; 3]);
    fn set_anchor(&mut self, anchor: Anchor);
}

/// Camera state held by the player process.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportCamera {
    viewport: ViewportRect,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            viewport: ViewportRect::FULL,
        }
    }
}

impl Camera for ViewportCamera {
    fn set_viewport(&mut self, rect: ViewportRect) {
        self.viewport = rect;
    }

    fn viewport(&self) -> ViewportRect {
        self.viewport
    }
}

/// Canvas state held by the player process. Starts out in
/// reference-resolution scaling, the usual engine default.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCanvas {
    layout: CanvasLayout,
}

impl PixelCanvas {
    pub fn new(reference: Resolution) -> Self {
        Self {
            layout: CanvasLayout {
                scale_mode: ScaleMode::ScaleWithScreenSize,
                scale_factor: 1.0,
                anchor: Anchor::CENTER,
                anchored_position: (0.0, 0.0),
                size: reference,
            },
        }
    }
}

impl Canvas for PixelCanvas {
    fn set_layout(&mut self, layout: CanvasLayout) {
        self.layout = layout;
    }

    fn layout(&self) -> CanvasLayout {
        self.layout
    }
}

/// A content rectangle: position and size in pixels, plus scale and anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct RectTransform {
    pub name: String,
    pub position: Vec2,
    pub size: Vec2,
    pub local_scale: [f64; 3],
    pub anchor: Anchor,
    /// Driven by content rotation; the binder leaves it alone.
    pub visible: bool,
}

impl RectTransform {
    pub fn new(name: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            size,
            local_scale: [1.0, 1.0, 1.0],
            anchor: Anchor::CENTER,
            visible: true,
        }
    }
}

impl UiElement for RectTransform {
    fn set_local_scale(&mut self, scale: [f64; 3]) {
        self.local_scale = scale;
    }

    fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }
}

/// Camera and canvas the binder drives, resolved once at startup.
/// Either may be absent, in which case that half of a pass is skipped.
pub struct RenderTargets {
    pub camera: Option<Box<dyn Camera>>,
    pub canvas: Option<Box<dyn Canvas>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceWarning {
    MissingCamera,
    MissingCanvas,
}

/// Diagnostic record of one geometry application.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub target: Resolution,
    pub actual: Resolution,
    pub viewport: ViewportRect,
    /// Always 1.0: the presentation is never scaled.
    pub scale: f64,
    pub elements: usize,
    pub warnings: Vec<SurfaceWarning>,
}

pub struct SurfaceBinder {
    target: Resolution,
    targets: RenderTargets,
}

impl SurfaceBinder {
    pub fn new(target: Resolution, targets: RenderTargets) -> Self {
        Self { target, targets }
    }

    pub fn target(&self) -> Resolution {
        self.target
    }

    #[cfg(test)]
    pub fn camera(&self) -> Option<&dyn Camera> {
        self.targets.camera.as_deref()
    }

    #[cfg(test)]
    pub fn canvas(&self) -> Option<&dyn Canvas> {
        self.targets.canvas.as_deref()
    }

    /// Applies `rect` to the camera and pins the canvas and `elements` to the
    /// top-left at scale 1.0. Idempotent for identical inputs.
    pub fn apply<E: UiElement>(
        &mut self,
        rect: ViewportRect,
        actual: Resolution,
        elements: &mut [E],
    ) -> ApplyReport {
        let mut warnings = Vec::new();

        match self.targets.camera.as_mut() {
            Some(camera) if camera.viewport() == rect => {}
            Some(camera) => camera.set_viewport(rect),
            None => {
                log::warn!("No camera bound; viewport not applied");
                warnings.push(SurfaceWarning::MissingCamera);
            }
        }

        let layout = CanvasLayout::pixel_exact(self.target);
        match self.targets.canvas.as_mut() {
            Some(canvas) if canvas.layout() == layout => {}
            Some(canvas) => canvas.set_layout(layout),
            None => {
                log::warn!("No canvas bound; canvas layout not applied");
                warnings.push(SurfaceWarning::MissingCanvas);
            }
        }

        for element in elements.iter_mut() {
            element.set_local_scale([1.0, 1.0, 1.0]);
            element.set_anchor(Anchor::TOP_LEFT);
        }

        log::info!(
            "Dot-by-dot display applied - target {}, actual {}, viewport {}, no scaling",
            self.target,
            actual,
            rect
        );

        ApplyReport {
            target: self.target,
            actual,
            viewport: rect,
            scale: 1.0,
            elements: elements.len(),
            warnings,
        }
    }
}
