//! Gesture-driven drawing canvas core.
//!
//! Per frame, hand landmarks are classified into a tool gesture, debounced by
//! a majority-vote filter and dispatched into draw, erase, pan and zoom
//! actions on a [`GestureCanvas`]. Completed strokes can be simplified and
//! smoothed on demand; rendering is left to a [`render::RenderSink`].

pub mod canvas;
pub mod config;
pub mod error;
pub mod gesture;
pub mod history;
pub mod pipeline;
pub mod render;
pub mod smoothing;
pub mod synthetic;
pub mod types;

pub use canvas::{CanvasCommand, FrameOutcome, GestureCanvas, SceneSnapshot};
pub use config::{CanvasConfig, GestureConfig, SmoothingConfig, ToolSettings, ZoomLimits};
pub use error::CanvasError;
pub use types::{
    CanvasElement, CanvasSize, Color, ElementKind, GestureLabel, HandLandmarks, Landmark,
    LandmarkFrame, Point, ToolStatus, ViewTransform,
};
