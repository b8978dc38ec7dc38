use std::collections::VecDeque;

use crate::{
    config::GestureConfig,
    error::{CanvasError, Result},
    types::{
        CanvasSize, FingerState, GestureLabel, HandLandmarks, INDEX_PIP, INDEX_TIP, MIDDLE_MCP,
        MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, Point, RING_PIP, RING_TIP, THUMB_IP,
        THUMB_TIP,
    },
};

const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// Raw classification followed by the stability filter.
pub struct GestureClassifier {
    config: GestureConfig,
    filter: StabilityFilter,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        let filter = StabilityFilter::new(config.history_size, config.stability_count);
        Self { config, filter }
    }

    /// Returns the committed gesture for this frame. The first hand is the
    /// primary one. With no hands the result is `Idle` and the filter is not
    /// touched.
    pub fn classify(&mut self, hands: &[HandLandmarks]) -> GestureLabel {
        let Some(primary) = hands.first() else {
            return GestureLabel::Idle;
        };

        let finger_states = finger_states(primary, &self.config);
        let raw = classify_raw(&finger_states, primary, hands.len(), &self.config);
        self.filter.push(raw)
    }

    pub fn current(&self) -> GestureLabel {
        self.filter.current()
    }
}

pub fn finger_states(hand: &HandLandmarks, config: &GestureConfig) -> [FingerState; 5] {
    let thumb = classify_thumb(hand, config.thumb_extension_threshold);
    let [index, middle, ring, pinky] = FINGER_JOINTS.map(|(tip, pip)| classify_finger(hand, tip, pip));
    [thumb, index, middle, ring, pinky]
}

// The thumb folds sideways, so its tip height says little; use the tip-IP gap.
fn classify_thumb(hand: &HandLandmarks, threshold: f32) -> FingerState {
    let gap = hand.point(THUMB_TIP).planar_distance(&hand.point(THUMB_IP));
    FingerState::from_extended(gap > threshold)
}

fn classify_finger(hand: &HandLandmarks, tip: usize, pip: usize) -> FingerState {
    FingerState::from_extended(hand.point(tip).y < hand.point(pip).y)
}

pub fn extended_count(finger_states: &[FingerState; 5]) -> usize {
    finger_states.iter().filter(|s| s.is_extended()).count()
}

pub fn pinch_distance(hand: &HandLandmarks) -> f32 {
    hand.point(THUMB_TIP).planar_distance(&hand.point(INDEX_TIP))
}

/// Distance between the index tips of two hands, in normalized units.
pub fn two_hand_distance(hands: &[HandLandmarks]) -> Result<f32> {
    match hands {
        [first, second] => Ok(first.point(INDEX_TIP).planar_distance(&second.point(INDEX_TIP))),
        _ => Err(CanvasError::HandCount(hands.len())),
    }
}

/// Maps one frame's finger states to a gesture before any debouncing.
/// Rules are checked in priority order; a pinch also has the index out, so
/// it must be tested before the pointer rule.
pub fn classify_raw(
    finger_states: &[FingerState; 5],
    hand: &HandLandmarks,
    hand_count: usize,
    config: &GestureConfig,
) -> GestureLabel {
    if hand_count == 2 {
        return GestureLabel::Zoom;
    }

    let [thumb, index, middle, ring, pinky] = finger_states.map(|s| s.is_extended());
    let others_folded = !middle && !ring && !pinky;
    let extended = extended_count(finger_states);

    if pinch_distance(hand) < config.pinch_threshold && others_folded {
        GestureLabel::Draw
    } else if index && others_folded {
        GestureLabel::Pointer
    } else if extended == 0 || (extended == 1 && thumb) {
        GestureLabel::Pan
    } else if extended == 5 {
        GestureLabel::Clear
    } else if extended == 4 {
        GestureLabel::Erase
    } else {
        GestureLabel::Idle
    }
}

/// Majority-vote debouncer: a new gesture is committed once it fills
/// `required` of the last `capacity` raw observations.
pub struct StabilityFilter {
    history: VecDeque<GestureLabel>,
    capacity: usize,
    required: usize,
    current: GestureLabel,
}

impl StabilityFilter {
    pub fn new(capacity: usize, required: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            required: required.clamp(1, capacity),
            current: GestureLabel::Idle,
        }
    }

    pub fn push(&mut self, raw: GestureLabel) -> GestureLabel {
        self.history.push_back(raw);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let votes = self.history.iter().filter(|&&g| g == raw).count();
        if votes >= self.required && raw != self.current {
            log::debug!(
                "gesture committed: {} -> {}",
                self.current.as_str(),
                raw.as_str()
            );
            self.current = raw;
        }
        self.current
    }

    pub fn current(&self) -> GestureLabel {
        self.current
    }
}

/// Index fingertip in screen space, used as the drawing cursor.
pub fn drawing_position(hand: &HandLandmarks, size: &CanvasSize) -> Point {
    size.landmark_to_screen(&hand.point(INDEX_TIP))
}

/// Middle-finger base in screen space, used as the pan handle.
pub fn palm_center(hand: &HandLandmarks, size: &CanvasSize) -> Point {
    size.landmark_to_screen(&hand.point(MIDDLE_MCP))
}
