use rayon::prelude::*;

use crate::{
    config::{CanvasConfig, MIN_STROKE_SIZE, ToolSettings},
    gesture::{self, GestureClassifier},
    history::History,
    smoothing,
    types::{
        CanvasElement, CanvasSize, Color, ElementKind, GestureLabel, LandmarkFrame, Point,
        ToolStatus, ViewTransform,
    },
};

/// Inter-hand distances (screen units) at or below this are ignored while
/// zooming.
const MIN_ZOOM_BASELINE: f32 = 1e-4;

#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCommand {
    Clear,
    Smoothen,
    Undo,
    Redo,
    SetBrushColor(Color),
    SetBrushSize(f32),
    SetEraserSize(f32),
    Resize(CanvasSize),
}

#[derive(Clone, Debug, PartialEq)]
enum ToolState {
    Idle,
    Drawing(CanvasElement),
    Panning { anchor: Point },
    Zooming { last_distance: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutcome {
    pub tool: GestureLabel,
    pub tool_changed: bool,
    pub cursor: Option<Point>,
}

/// Everything a render sink needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSnapshot {
    pub elements: Vec<CanvasElement>,
    pub in_progress: Option<CanvasElement>,
    pub view: ViewTransform,
    pub cursor: Option<Point>,
    pub tool: GestureLabel,
    pub settings: ToolSettings,
    pub size: CanvasSize,
}

/// One drawing session: gesture classification, the tool state machine,
/// the element list and its history.
pub struct GestureCanvas {
    config: CanvasConfig,
    classifier: GestureClassifier,
    elements: Vec<CanvasElement>,
    state: ToolState,
    view: ViewTransform,
    history: History,
    cursor: Option<Point>,
    current_tool: GestureLabel,
    next_element_id: u64,
}

impl Default for GestureCanvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl GestureCanvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            classifier: GestureClassifier::new(config.gesture.clone()),
            config,
            elements: Vec::new(),
            state: ToolState::Idle,
            view: ViewTransform::default(),
            history: History::new(),
            cursor: None,
            current_tool: GestureLabel::Idle,
            next_element_id: 1,
        }
    }

    /// Runs one landmark frame through classification and dispatch.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        let hands = frame.hands();
        let tool = self.classifier.classify(hands);
        let size = self.config.canvas_size;
        self.cursor = None;

        match (hands.first(), tool) {
            (None, _) => self.release(),
            (Some(_), GestureLabel::Zoom) if hands.len() == 2 => {
                match gesture::two_hand_distance(hands) {
                    Ok(distance) => self.handle_zoom(distance * size.width),
                    Err(err) => {
                        log::debug!("zoom skipped: {err}");
                        self.release();
                    }
                }
            }
            (Some(primary), GestureLabel::Pan) => {
                let position = gesture::palm_center(primary, &size);
                self.cursor = Some(position);
                self.handle_pan(position);
            }
            (Some(primary), tool) => {
                let position = gesture::drawing_position(primary, &size);
                self.cursor = Some(position);
                match tool {
                    GestureLabel::Draw => self.handle_stroke(ElementKind::Freedraw, position),
                    GestureLabel::Erase => self.handle_stroke(ElementKind::Erase, position),
                    GestureLabel::Clear => self.clear(),
                    _ => self.release(),
                }
            }
        }

        let tool_changed = tool != self.current_tool;
        if tool_changed {
            log::info!(
                "tool changed: {} {} -> {} {}",
                self.current_tool.icon(),
                self.current_tool.display_name(),
                tool.icon(),
                tool.display_name()
            );
            self.current_tool = tool;
        }

        FrameOutcome {
            tool,
            tool_changed,
            cursor: self.cursor,
        }
    }

    pub fn apply(&mut self, command: CanvasCommand) {
        match command {
            CanvasCommand::Clear => self.clear(),
            CanvasCommand::Smoothen => {
                self.smoothen_all();
            }
            CanvasCommand::Undo => self.undo(),
            CanvasCommand::Redo => self.redo(),
            CanvasCommand::SetBrushColor(color) => self.config.tools.brush_color = color,
            CanvasCommand::SetBrushSize(size) => {
                self.config.tools.brush_size = size.max(MIN_STROKE_SIZE)
            }
            CanvasCommand::SetEraserSize(size) => {
                self.config.tools.eraser_size = size.max(MIN_STROKE_SIZE)
            }
            CanvasCommand::Resize(size) => self.config.canvas_size = size,
        }
    }

    fn handle_stroke(&mut self, kind: ElementKind, screen: Point) {
        let world = self.view.screen_to_world(screen);
        match &mut self.state {
            ToolState::Drawing(element) if element.kind == kind => element.points.push(world),
            _ => {
                self.finish_drawing();
                self.start_drawing(kind, world);
            }
        }
    }

    fn start_drawing(&mut self, kind: ElementKind, world: Point) {
        let tools = &self.config.tools;
        let stroke_width = match kind {
            ElementKind::Erase => tools.eraser_size,
            _ => tools.brush_size,
        };
        let element = CanvasElement {
            id: self.next_element_id,
            kind,
            color: tools.brush_color,
            stroke_width,
            points: vec![world],
        };
        self.next_element_id += 1;
        self.state = ToolState::Drawing(element);
    }

    /// Commits the in-progress stroke if it has at least two points. Leaves
    /// the dispatcher idle either way.
    fn finish_drawing(&mut self) {
        if let ToolState::Drawing(element) = std::mem::replace(&mut self.state, ToolState::Idle) {
            if element.points.len() > 1 {
                log::debug!(
                    "committing {:?} stroke {} with {} points",
                    element.kind,
                    element.id,
                    element.points.len()
                );
                self.elements.push(element);
                self.history.commit(&self.elements);
            } else {
                log::debug!("discarding stroke {} with a single point", element.id);
            }
        }
    }

    fn release(&mut self) {
        self.finish_drawing();
        self.state = ToolState::Idle;
    }

    fn handle_pan(&mut self, position: Point) {
        match &mut self.state {
            ToolState::Panning { anchor } => {
                self.view.pan_offset.x += position.x - anchor.x;
                self.view.pan_offset.y += position.y - anchor.y;
                *anchor = position;
            }
            _ => {
                self.finish_drawing();
                self.state = ToolState::Panning { anchor: position };
            }
        }
    }

    fn handle_zoom(&mut self, distance: f32) {
        match &mut self.state {
            // Coincident tips keep both the zoom and the previous baseline.
            ToolState::Zooming { .. } if distance <= MIN_ZOOM_BASELINE => {}
            ToolState::Zooming { last_distance } if *last_distance > MIN_ZOOM_BASELINE => {
                let zoom = self.view.zoom * (distance / *last_distance);
                self.view.zoom = match self.config.zoom_limits {
                    Some(limits) => limits.clamp(zoom),
                    None => zoom,
                };
                *last_distance = distance;
            }
            ToolState::Zooming { last_distance } => *last_distance = distance,
            _ => {
                self.finish_drawing();
                self.state = ToolState::Zooming {
                    last_distance: distance,
                };
            }
        }
    }

    /// Drops every element and resets the view. The cleared state is
    /// recorded in history so undo brings the drawing back, rather than
    /// starting history over from an empty snapshot.
    pub fn clear(&mut self) {
        let had_content =
            !self.elements.is_empty() || matches!(self.state, ToolState::Drawing(_));
        self.elements.clear();
        self.state = ToolState::Idle;
        self.view.reset();
        if had_content {
            log::info!("canvas cleared");
            self.history.commit(&self.elements);
        }
    }

    /// Smooths every freehand stroke long enough to benefit. Returns how many
    /// strokes changed.
    pub fn smoothen_all(&mut self) -> usize {
        if self.elements.is_empty() {
            return 0;
        }

        let config = &self.config.smoothing;
        let smoothed = self
            .elements
            .par_iter_mut()
            .filter(|e| e.kind == ElementKind::Freedraw && e.points.len() > config.min_points)
            .map(|e| e.points = smoothing::smoothen_path(&e.points, config))
            .count();

        self.history.commit(&self.elements);
        log::info!("handwriting smoothened: {smoothed} strokes");
        smoothed
    }

    /// Steps back in history; at the oldest snapshot this is a full reset.
    pub fn undo(&mut self) {
        match self.history.undo() {
            Some(elements) => {
                log::debug!("undo to snapshot {}", self.history.cursor());
                self.elements = elements;
            }
            None => {
                log::debug!("undo underflow, clearing canvas");
                self.elements.clear();
                self.state = ToolState::Idle;
                self.view.reset();
                self.history.reset();
            }
        }
    }

    pub fn redo(&mut self) {
        if let Some(elements) = self.history.redo() {
            log::debug!("redo to snapshot {}", self.history.cursor());
            self.elements = elements;
        }
    }

    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn in_progress(&self) -> Option<&CanvasElement> {
        match &self.state {
            ToolState::Drawing(element) => Some(element),
            _ => None,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn current_tool(&self) -> GestureLabel {
        self.current_tool
    }

    pub fn tool_status(&self) -> ToolStatus {
        ToolStatus::from(self.current_tool)
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.config.tools
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            elements: self.elements.clone(),
            in_progress: self.in_progress().cloned(),
            view: self.view,
            cursor: self.cursor,
            tool: self.current_tool,
            settings: self.config.tools.clone(),
            size: self.config.canvas_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ZoomLimits,
        synthetic::{self, SyntheticHand},
    };

    fn canvas() -> GestureCanvas {
        GestureCanvas::new(CanvasConfig {
            canvas_size: CanvasSize::new(1000.0, 1000.0),
            ..CanvasConfig::default()
        })
    }

    fn feed(canvas: &mut GestureCanvas, hand: SyntheticHand, frames: usize) -> FrameOutcome {
        let frame = synthetic::frame(&[hand]);
        let mut outcome = canvas.process_frame(&frame);
        for _ in 1..frames {
            outcome = canvas.process_frame(&frame);
        }
        outcome
    }

    /// Pinches along a horizontal line, one point per frame.
    fn draw_stroke(canvas: &mut GestureCanvas, points: usize) {
        for i in 0..points {
            let x = 0.3 + i as f32 * 0.01;
            canvas.process_frame(&synthetic::frame(&[SyntheticHand::pinch().at(x, 0.5)]));
        }
    }

    #[test]
    fn test_draw_commits_on_release() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 6);
        assert_eq!(canvas.current_tool(), GestureLabel::Draw);
        // Frames 1 and 2 are still idle; drawing starts at frame 3.
        assert_eq!(canvas.in_progress().unwrap().points.len(), 4);
        assert!(canvas.elements().is_empty());

        canvas.process_frame(&LandmarkFrame::empty());
        assert!(canvas.in_progress().is_none());
        assert_eq!(canvas.elements().len(), 1);
        assert_eq!(canvas.elements()[0].kind, ElementKind::Freedraw);
        assert_eq!(canvas.elements()[0].stroke_width, 4.0);
        assert_eq!(canvas.history().snapshot_count(), 2);
    }

    #[test]
    fn test_single_point_stroke_is_discarded() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 3);
        assert_eq!(canvas.in_progress().unwrap().points.len(), 1);
        canvas.process_frame(&LandmarkFrame::empty());
        assert!(canvas.elements().is_empty());
        assert_eq!(canvas.history().snapshot_count(), 1);
    }

    #[test]
    fn test_stroke_points_are_world_space() {
        let mut canvas = canvas();
        canvas.view = ViewTransform {
            pan_offset: Point::new(100.0, 50.0),
            zoom: 2.0,
        };
        draw_stroke(&mut canvas, 4);
        // Drawing starts on the third frame, palm at x = 0.32, so the index
        // tip lands on screen at (1000 * (1 - 0.28), 1000 * (0.5 - 0.14)).
        let first = canvas.in_progress().unwrap().points[0];
        assert!((first.x - (720.0 - 100.0) / 2.0).abs() < 0.01);
        assert!((first.y - (360.0 - 50.0) / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_erase_uses_eraser_size() {
        let mut canvas = canvas();
        feed(&mut canvas, SyntheticHand::four_fingers(), 5);
        let element = canvas.in_progress().unwrap();
        assert_eq!(element.kind, ElementKind::Erase);
        assert_eq!(element.stroke_width, 30.0);
    }

    #[test]
    fn test_settings_only_affect_new_strokes() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 5);
        canvas.process_frame(&LandmarkFrame::empty());

        let red = Color::from_hex("#ff0000").unwrap();
        canvas.apply(CanvasCommand::SetBrushColor(red));
        canvas.apply(CanvasCommand::SetBrushSize(0.0));
        assert_ne!(canvas.elements()[0].color, red);

        draw_stroke(&mut canvas, 3);
        let element = canvas.in_progress().unwrap();
        assert_eq!(element.color, red);
        assert_eq!(element.stroke_width, MIN_STROKE_SIZE);
    }

    #[test]
    fn test_pan_accumulates_deltas() {
        let mut canvas = canvas();
        let outcome = feed(&mut canvas, SyntheticHand::fist().at(0.5, 0.5), 4);
        assert_eq!(outcome.tool, GestureLabel::Pan);
        assert_eq!(canvas.view().pan_offset, Point::ORIGIN);

        for step in 1..=3 {
            let x = 0.5 - 0.05 * step as f32 / 3.0;
            canvas.process_frame(&synthetic::frame(&[SyntheticHand::fist().at(x, 0.5)]));
        }
        assert!((canvas.view().pan_offset.x - 50.0).abs() < 0.01);
        assert!(canvas.view().pan_offset.y.abs() < 0.01);
    }

    #[test]
    fn test_pan_restarts_anchor_after_release() {
        let mut canvas = canvas();
        feed(&mut canvas, SyntheticHand::fist().at(0.5, 0.5), 3);
        feed(&mut canvas, SyntheticHand::fist().at(0.4, 0.5), 1);
        assert!((canvas.view().pan_offset.x - 100.0).abs() < 0.01);

        canvas.process_frame(&LandmarkFrame::empty());
        // Hand comes back elsewhere: first frame only re-anchors.
        feed(&mut canvas, SyntheticHand::fist().at(0.8, 0.5), 1);
        assert!((canvas.view().pan_offset.x - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_zoom_is_multiplicative() {
        let mut canvas = canvas();
        for _ in 0..3 {
            canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.1));
        }
        assert_eq!(canvas.current_tool(), GestureLabel::Zoom);
        assert_eq!(canvas.view().zoom, 1.0);

        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.2));
        assert!((canvas.view().zoom - 2.0).abs() < 1e-4);
        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.1));
        assert!((canvas.view().zoom - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_limits_clamp() {
        let mut canvas = GestureCanvas::new(CanvasConfig {
            zoom_limits: Some(ZoomLimits { min: 0.5, max: 1.5 }),
            ..CanvasConfig::default()
        });
        for _ in 0..3 {
            canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.1));
        }
        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.3));
        assert_eq!(canvas.view().zoom, 1.5);
    }

    #[test]
    fn test_zoom_ignores_coincident_baseline() {
        let mut canvas = canvas();
        for _ in 0..3 {
            canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.0));
        }
        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.2));
        assert_eq!(canvas.view().zoom, 1.0);
        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.4));
        assert!((canvas.view().zoom - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_survives_coincident_tips() {
        let mut canvas = canvas();
        for distance in [0.1, 0.1, 0.1, 0.0] {
            canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), distance));
        }
        assert_eq!(canvas.view().zoom, 1.0);

        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.2));
        assert!((canvas.view().zoom - 2.0).abs() < 1e-4);

        draw_stroke(&mut canvas, 8);
        canvas.process_frame(&LandmarkFrame::empty());
        assert_eq!(canvas.elements().len(), 1);
        let points = &canvas.elements()[0].points;
        // The first two pinch frames still read as zoom.
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_zoom_label_with_one_hand_releases() {
        let mut canvas = canvas();
        for _ in 0..3 {
            canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.1));
        }
        assert!(matches!(
            canvas.state,
            ToolState::Zooming { last_distance } if (last_distance - 100.0).abs() < 0.01
        ));

        let outcome = feed(&mut canvas, SyntheticHand::pinch(), 1);
        assert_eq!(outcome.tool, GestureLabel::Zoom);
        assert_eq!(canvas.state, ToolState::Idle);
        assert!(canvas.in_progress().is_none());

        // The old baseline is gone: the next two-hand frame only re-anchors.
        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.2));
        assert_eq!(canvas.view().zoom, 1.0);
        canvas.process_frame(&synthetic::two_hand_frame((0.5, 0.5), 0.4));
        assert!((canvas.view().zoom - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_switch_to_erase_splits_stroke() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 5);
        assert_eq!(canvas.in_progress().unwrap().points.len(), 3);

        let outcome = feed(&mut canvas, SyntheticHand::four_fingers(), 5);
        assert_eq!(outcome.tool, GestureLabel::Erase);
        canvas.process_frame(&LandmarkFrame::empty());

        let [stroke, erase] = canvas.elements() else {
            panic!("expected two elements, got {}", canvas.elements().len());
        };
        // The filter keeps drawing for two frames before erase commits.
        assert_eq!(stroke.kind, ElementKind::Freedraw);
        assert_eq!(stroke.points.len(), 5);
        assert_eq!(stroke.stroke_width, 4.0);
        assert_eq!(erase.kind, ElementKind::Erase);
        assert_eq!(erase.points.len(), 3);
        assert_eq!(erase.stroke_width, 30.0);

        let tip = outcome.cursor.unwrap();
        assert!(erase.points.iter().all(|p| *p == tip));
        assert_eq!(canvas.history().snapshot_count(), 3);
    }

    #[test]
    fn test_resize_changes_screen_mapping() {
        let mut canvas = canvas();
        let before = feed(&mut canvas, SyntheticHand::pointer(), 3).cursor.unwrap();
        assert!((before.x - 540.0).abs() < 0.01);
        assert!((before.y - 360.0).abs() < 0.01);

        let size = CanvasSize::new(500.0, 250.0);
        canvas.apply(CanvasCommand::Resize(size));
        let after = feed(&mut canvas, SyntheticHand::pointer(), 1).cursor.unwrap();
        assert!((after.x - 270.0).abs() < 0.01);
        assert!((after.y - 90.0).abs() < 0.01);
        assert_eq!(canvas.snapshot().size, size);
    }

    #[test]
    fn test_clear_gesture_is_undoable() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 5);
        canvas.process_frame(&LandmarkFrame::empty());
        assert_eq!(canvas.elements().len(), 1);

        let outcome = feed(&mut canvas, SyntheticHand::open_palm(), 4);
        assert_eq!(outcome.tool, GestureLabel::Clear);
        assert!(canvas.elements().is_empty());
        // Repeated clear frames on an empty canvas record nothing more.
        assert_eq!(canvas.history().snapshot_count(), 3);

        canvas.undo();
        assert_eq!(canvas.elements().len(), 1);
    }

    #[test]
    fn test_undo_underflow_clears() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 5);
        canvas.process_frame(&LandmarkFrame::empty());
        canvas.view.zoom = 3.0;

        canvas.undo();
        assert!(canvas.elements().is_empty());
        canvas.undo();
        assert!(canvas.elements().is_empty());
        assert_eq!(canvas.view(), ViewTransform::default());
        assert_eq!(canvas.history().snapshot_count(), 1);
        canvas.redo();
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn test_smoothen_only_long_freehand() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 12);
        canvas.process_frame(&LandmarkFrame::empty());
        // Draw stays committed while the hand is away, so every frame counts.
        draw_stroke(&mut canvas, 5);
        canvas.process_frame(&LandmarkFrame::empty());
        assert_eq!(canvas.elements()[0].points.len(), 10);
        assert_eq!(canvas.elements()[1].points.len(), 5);

        assert_eq!(canvas.smoothen_all(), 1);
        // A straight stroke collapses to one spline span.
        assert_eq!(canvas.elements()[0].points.len(), 13);
        assert_eq!(canvas.elements()[1].points.len(), 5);

        canvas.undo();
        assert_eq!(canvas.elements()[0].points.len(), 10);
    }

    #[test]
    fn test_pointer_finalizes_stroke() {
        let mut canvas = canvas();
        draw_stroke(&mut canvas, 5);
        let outcome = feed(&mut canvas, SyntheticHand::pointer(), 3);
        assert_eq!(outcome.tool, GestureLabel::Pointer);
        assert!(outcome.cursor.is_some());
        assert!(canvas.in_progress().is_none());
        assert_eq!(canvas.elements().len(), 1);
    }

    #[test]
    fn test_tool_changed_reported_once() {
        let mut canvas = canvas();
        let frame = synthetic::frame(&[SyntheticHand::fist()]);
        let changes: Vec<bool> = (0..5)
            .map(|_| canvas.process_frame(&frame).tool_changed)
            .collect();
        assert_eq!(changes, [false, false, true, false, false]);
        assert_eq!(canvas.tool_status().name, "Pan");
    }
}
