//! Synthetic hand poses.
//!
//! Produces anatomically ordered landmark sets for a chosen finger
//! configuration. Used by the replay demo and by tests in place of a live
//! hand-pose model.

use crate::types::{
    FingerState, HAND_LANDMARK_COUNT, HandLandmarks, INDEX_TIP, Landmark, LandmarkFrame, THUMB_TIP,
    WRIST,
};

const FINGER_X_OFFSETS: [f32; 4] = [-0.04, 0.0, 0.04, 0.08];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticHand {
    fingers: [FingerState; 5],
    palm: (f32, f32),
    pinch: bool,
}

impl SyntheticHand {
    pub fn new(fingers: [bool; 5]) -> Self {
        Self {
            fingers: fingers.map(FingerState::from_extended),
            palm: (0.5, 0.5),
            pinch: false,
        }
    }

    pub fn fist() -> Self {
        Self::new([false; 5])
    }

    pub fn thumb_out() -> Self {
        Self::new([true, false, false, false, false])
    }

    pub fn pointer() -> Self {
        Self::new([false, true, false, false, false])
    }

    pub fn victory() -> Self {
        Self::new([false, true, true, false, false])
    }

    pub fn four_fingers() -> Self {
        Self::new([false, true, true, true, true])
    }

    pub fn open_palm() -> Self {
        Self::new([true; 5])
    }

    /// Index out with the thumb tip touching it.
    pub fn pinch() -> Self {
        Self {
            pinch: true,
            ..Self::pointer()
        }
    }

    /// Places the palm center (middle-finger base) at a normalized position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.palm = (x, y);
        self
    }

    pub fn build(&self) -> HandLandmarks {
        let (px, py) = self.palm;
        let mut points = [Landmark::default(); HAND_LANDMARK_COUNT];

        points[WRIST] = Landmark::new(px, py + 0.15, 0.0);

        points[1] = Landmark::new(px - 0.08, py + 0.10, 0.0);
        points[2] = Landmark::new(px - 0.10, py + 0.06, 0.0);
        points[3] = Landmark::new(px - 0.12, py + 0.02, 0.0);
        points[4] = if self.fingers[0].is_extended() {
            Landmark::new(px - 0.14, py - 0.04, 0.0)
        } else {
            Landmark::new(px - 0.11, py + 0.04, 0.0)
        };

        for (finger, offset) in FINGER_X_OFFSETS.iter().enumerate() {
            let base = 5 + finger * 4;
            let fx = px + offset;
            points[base] = Landmark::new(fx, py, 0.0);
            points[base + 1] = Landmark::new(fx, py - 0.06, 0.0);
            if self.fingers[finger + 1].is_extended() {
                points[base + 2] = Landmark::new(fx, py - 0.10, 0.0);
                points[base + 3] = Landmark::new(fx, py - 0.14, 0.0);
            } else {
                points[base + 2] = Landmark::new(fx, py - 0.03, 0.0);
                points[base + 3] = Landmark::new(fx, py - 0.01, 0.0);
            }
        }

        if self.pinch {
            let index_tip = points[INDEX_TIP];
            points[THUMB_TIP] = Landmark::new(index_tip.x + 0.01, index_tip.y, 0.0);
        }

        HandLandmarks::new(points)
    }
}

pub fn frame(hands: &[SyntheticHand]) -> LandmarkFrame {
    LandmarkFrame::new(hands.iter().map(SyntheticHand::build).collect())
}

/// Two open hands whose index tips sit `distance` apart horizontally.
pub fn two_hand_frame(center: (f32, f32), distance: f32) -> LandmarkFrame {
    let half = distance / 2.0;
    frame(&[
        SyntheticHand::open_palm().at(center.0 - half, center.1),
        SyntheticHand::open_palm().at(center.0 + half, center.1),
    ])
}
