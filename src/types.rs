use crate::error::{CanvasError, Result};

pub const HAND_LANDMARK_COUNT: usize = 21;
pub const MAX_HANDS: usize = 2;

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// A tracked hand point in normalized camera space. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance in the image plane; depth is ignored.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; HAND_LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; HAND_LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; HAND_LANDMARK_COUNT] =
            points.try_into().map_err(|_| CanvasError::LandmarkCount {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            })?;
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(CanvasError::NonFiniteLandmark { index });
        }
        Ok(Self { points })
    }

    pub fn from_raw(raw: &[[f32; 3]]) -> Result<Self> {
        let points: Vec<Landmark> = raw.iter().map(|&[x, y, z]| Landmark::new(x, y, z)).collect();
        Self::from_slice(&points)
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Landmark; HAND_LANDMARK_COUNT] {
        &mut self.points
    }
}

/// Hands observed in one camera frame, at most [`MAX_HANDS`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn new(mut hands: Vec<HandLandmarks>) -> Self {
        if hands.len() > MAX_HANDS {
            log::debug!("dropping {} extra hands", hands.len() - MAX_HANDS);
            hands.truncate(MAX_HANDS);
        }
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a frame from raw detector output. Malformed hands are skipped
    /// so the frame degrades to fewer hands instead of failing.
    pub fn from_raw(raw_hands: &[Vec<[f32; 3]>]) -> Self {
        let hands = raw_hands
            .iter()
            .filter_map(|raw| match HandLandmarks::from_raw(raw) {
                Ok(hand) => Some(hand),
                Err(err) => {
                    log::debug!("skipping malformed hand: {err}");
                    None
                }
            })
            .collect();
        Self::new(hands)
    }

    pub fn hands(&self) -> &[HandLandmarks] {
        &self.hands
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FingerState {
    Extended,
    Folded,
}

impl FingerState {
    pub fn from_extended(extended: bool) -> Self {
        if extended {
            FingerState::Extended
        } else {
            FingerState::Folded
        }
    }

    pub fn is_extended(&self) -> bool {
        matches!(self, FingerState::Extended)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    Pointer,
    Draw,
    Erase,
    Pan,
    Zoom,
    Clear,
    Idle,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 7] = [
        GestureLabel::Pointer,
        GestureLabel::Draw,
        GestureLabel::Erase,
        GestureLabel::Pan,
        GestureLabel::Zoom,
        GestureLabel::Clear,
        GestureLabel::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::Pointer => "pointer",
            GestureLabel::Draw => "draw",
            GestureLabel::Erase => "erase",
            GestureLabel::Pan => "pan",
            GestureLabel::Zoom => "zoom",
            GestureLabel::Clear => "clear",
            GestureLabel::Idle => "idle",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GestureLabel::Pointer => "Cursor",
            GestureLabel::Draw => "Draw",
            GestureLabel::Erase => "Erase",
            GestureLabel::Pan => "Pan",
            GestureLabel::Zoom => "Zoom",
            GestureLabel::Clear => "Clear All",
            GestureLabel::Idle => "Idle",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            GestureLabel::Pointer => "☝️",
            GestureLabel::Draw => "🤏",
            GestureLabel::Erase => "✋",
            GestureLabel::Pan => "✊",
            GestureLabel::Zoom => "🙌",
            GestureLabel::Clear => "🤚",
            GestureLabel::Idle => "🤷",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GestureLabel::Pointer => "Index finger to move cursor",
            GestureLabel::Draw => "Pinch thumb and index to draw",
            GestureLabel::Erase => "Open hand to erase",
            GestureLabel::Pan => "Fist to move the canvas",
            GestureLabel::Zoom => "Two hands to zoom",
            GestureLabel::Clear => "Both hands open",
            GestureLabel::Idle => "No gesture",
        }
    }

    /// Tools that show a cursor marker on the canvas.
    pub fn shows_cursor(&self) -> bool {
        matches!(
            self,
            GestureLabel::Pointer | GestureLabel::Draw | GestureLabel::Erase
        )
    }
}

/// Status pushed to the UI whenever the committed tool changes.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolStatus {
    pub label: GestureLabel,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<GestureLabel> for ToolStatus {
    fn from(label: GestureLabel) -> Self {
        Self {
            label,
            icon: label.icon(),
            name: label.display_name(),
            description: label.description(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Maps a normalized landmark to screen space, mirrored horizontally so
    /// the canvas behaves like a mirror of the user.
    pub fn landmark_to_screen(&self, landmark: &Landmark) -> Point {
        Point::new((1.0 - landmark.x) * self.width, landmark.y * self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let invalid = || CanvasError::InvalidColor(text.to_string());
        let hex = text.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Maps world space (element coordinates) to screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub pan_offset: Point,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan_offset: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.pan_offset.x) / self.zoom,
            (p.y - self.pan_offset.y) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.zoom + self.pan_offset.x,
            p.y * self.zoom + self.pan_offset.y,
        )
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Freedraw,
    Erase,
    Circle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasElement {
    pub id: u64,
    pub kind: ElementKind,
    pub color: Color,
    pub stroke_width: f32,
    pub points: Vec<Point>,
}
