//! Gesture state tracking
//!
//! Reduces the classifier output of one camera frame to the pair of gesture
//! labels the resolver matches against. This is a pure projection: no
//! smoothing, no history.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Category the classifier reports when a hand shows no known gesture
pub const NONE_CATEGORY: &str = "None";

/// Which hand a classifier result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

impl Handedness {
    /// Whether this is the left hand
    pub fn is_left(self) -> bool {
        self == Self::Left
    }
}

/// A hand landmark, normalized to the frame dimensions (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0 = left edge of the camera image
    pub x: f64,
    /// Vertical position, 0 = top edge
    pub y: f64,
    /// Depth relative to the wrist
    #[serde(default)]
    pub z: f64,
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    /// Left or right hand
    pub handedness: Handedness,
    /// Top gesture category, [`NONE_CATEGORY`] if nothing was recognized
    pub category: String,
    /// Raw landmarks; may be empty when the classifier dropped them
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl HandResult {
    /// The category as a gesture label, `None` for the sentinel or an empty category
    pub fn gesture(&self) -> Option<&str> {
        match self.category.as_str() {
            "" | NONE_CATEGORY => None,
            label => Some(label),
        }
    }
}

/// Classifier output for one camera frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureFrame {
    /// Zero to two detected hands
    #[serde(default)]
    pub hands: SmallVec<[HandResult; 2]>,
}

impl GestureFrame {
    /// Build a frame from detected hands
    pub fn new(hands: impl IntoIterator<Item = HandResult>) -> Self {
        Self {
            hands: hands.into_iter().collect(),
        }
    }

    /// The detected hand with the given handedness; the last one wins on duplicates
    pub fn hand(&self, handedness: Handedness) -> Option<&HandResult> {
        self.hands.iter().rev().find(|h| h.handedness == handedness)
    }
}

/// Left and right gesture labels of one frame; empty means no gesture
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GesturePair {
    /// Left hand label
    pub left: String,
    /// Right hand label
    pub right: String,
}

impl GesturePair {
    /// Whether neither hand shows a gesture
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Project a frame onto its gesture pair
pub fn track(frame: &GestureFrame) -> GesturePair {
    let label = |handedness| {
        frame
            .hand(handedness)
            .and_then(HandResult::gesture)
            .unwrap_or_default()
            .to_string()
    };
    GesturePair {
        left: label(Handedness::Left),
        right: label(Handedness::Right),
    }
}
