use crate::types::{CanvasSize, Color};

pub const PINCH_THRESHOLD: f32 = 0.04;
pub const THUMB_EXTENSION_THRESHOLD: f32 = 0.04;
pub const GESTURE_HISTORY_SIZE: usize = 4;
pub const GESTURE_STABILITY_COUNT: usize = 3;

pub const SIMPLIFY_TOLERANCE: f32 = 1.5;
pub const SPLINE_TENSION: f32 = 0.5;
pub const SPLINE_SEGMENTS: usize = 12;
/// Freehand strokes need more points than this to be smoothed.
pub const SMOOTHING_MIN_POINTS: usize = 5;

pub const DEFAULT_BRUSH_SIZE: f32 = 4.0;
pub const DEFAULT_ERASER_SIZE: f32 = 30.0;
pub const MIN_STROKE_SIZE: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Thumb-tip to index-tip distance (normalized) below which a pinch counts.
    pub pinch_threshold: f32,
    /// Thumb-tip to thumb-IP distance (normalized) above which the thumb is out.
    pub thumb_extension_threshold: f32,
    pub history_size: usize,
    pub stability_count: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: PINCH_THRESHOLD,
            thumb_extension_threshold: THUMB_EXTENSION_THRESHOLD,
            history_size: GESTURE_HISTORY_SIZE,
            stability_count: GESTURE_STABILITY_COUNT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SmoothingConfig {
    pub tolerance: f32,
    pub tension: f32,
    pub segments: usize,
    pub min_points: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            tolerance: SIMPLIFY_TOLERANCE,
            tension: SPLINE_TENSION,
            segments: SPLINE_SEGMENTS,
            min_points: SMOOTHING_MIN_POINTS,
        }
    }
}

/// Stroke metadata latched by new elements. Changing it never touches
/// committed elements.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSettings {
    pub brush_color: Color,
    pub brush_size: f32,
    pub eraser_size: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            brush_color: Color::rgb(0x1a, 0x1a, 0x1a),
            brush_size: DEFAULT_BRUSH_SIZE,
            eraser_size: DEFAULT_ERASER_SIZE,
        }
    }
}

/// Optional clamp on the view zoom. Zoom is unbounded unless one is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min.min(self.max), self.max.max(self.min))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanvasConfig {
    pub canvas_size: CanvasSize,
    pub gesture: GestureConfig,
    pub smoothing: SmoothingConfig,
    pub tools: ToolSettings,
    pub zoom_limits: Option<ZoomLimits>,
}
