//! Pointer control
//!
//! While exactly one hand shows the control gesture, successive fingertip
//! positions become relative pointer motion. Jitter below the noise threshold
//! is swallowed, the horizontal axis is mirrored to match the selfie camera,
//! and a baseline left idle for too long is discarded so that re-presenting
//! the gesture never produces a jump.

use crate::config::models::EngineSettings;
use crate::engine::tracker::{GestureFrame, Handedness};
use serde::Serialize;
use smallvec::SmallVec;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A fingertip position normalized to the frame (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

/// A hand currently showing the control gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlHand {
    /// Which hand
    pub hand: Handedness,
    /// Fingertip position
    pub tip: Point,
}

/// Relative pointer motion in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PointerDelta {
    /// Horizontal motion, positive to the right
    pub x: f64,
    /// Vertical motion, positive downwards
    pub y: f64,
}

/// Output of one pointer update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotion {
    /// Motion to apply
    pub delta: PointerDelta,
    /// Whether the left hand drives it; the dispatcher picks scroll vs cursor from this
    pub is_left_hand: bool,
}

/// Last accepted fingertip sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerBaseline {
    /// Hand the sample belongs to
    pub hand: Handedness,
    /// Sample position
    pub point: Point,
    /// When the sample was accepted
    pub timestamp: Instant,
}

/// Pointer filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSettings {
    /// Per-axis jitter threshold in normalized units
    pub noise_threshold: f64,
    /// Normalized delta to pixels
    pub scale_factor: f64,
    /// Baselines older than this are discarded
    pub idle_timeout: Duration,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self::from(&EngineSettings::default())
    }
}

impl From<&EngineSettings> for PointerSettings {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            noise_threshold: settings.noise_threshold,
            scale_factor: settings.scale_factor,
            idle_timeout: settings.pointer_idle_timeout(),
        }
    }
}

/// Converts fingertip samples into filtered relative motion
#[derive(Debug, Clone)]
pub struct PointerController {
    settings: PointerSettings,
    baseline: Option<PointerBaseline>,
}

impl PointerController {
    /// Create a controller without a baseline
    pub fn new(settings: PointerSettings) -> Self {
        Self {
            settings,
            baseline: None,
        }
    }

    /// Current baseline, for inspection
    pub fn baseline(&self) -> Option<&PointerBaseline> {
        self.baseline.as_ref()
    }

    /// Drop the baseline (session start/stop)
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Process the control-gesture hands of one frame
    pub fn update(&mut self, hands: &[ControlHand], now: Instant) -> Option<PointerMotion> {
        if let Some(baseline) = self.baseline
            && now.saturating_duration_since(baseline.timestamp) > self.settings.idle_timeout
        {
            debug!("Pointer baseline idle, resetting");
            self.baseline = None;
        }

        let active = match hands {
            [] => return None,
            [only] => *only,
            _ => {
                trace!("Control gesture on {} hands, ignoring frame", hands.len());
                return None;
            }
        };

        let Some(baseline) = self.baseline.filter(|b| b.hand == active.hand) else {
            debug!("Pointer baseline set for {:?} hand", active.hand);
            self.advance(active, now);
            return None;
        };

        let dx = active.tip.x - baseline.point.x;
        let dy = active.tip.y - baseline.point.y;
        self.advance(active, now);

        let noise = self.settings.noise_threshold;
        if dx.abs() <= noise && dy.abs() <= noise {
            trace!("Pointer jitter ({:.4}, {:.4}) ignored", dx, dy);
            return None;
        }

        // The camera image is mirrored, so moving the hand right decreases x
        Some(PointerMotion {
            delta: PointerDelta {
                x: -dx * self.settings.scale_factor,
                y: dy * self.settings.scale_factor,
            },
            is_left_hand: active.hand.is_left(),
        })
    }

    fn advance(&mut self, active: ControlHand, now: Instant) {
        self.baseline = Some(PointerBaseline {
            hand: active.hand,
            point: active.tip,
            timestamp: now,
        });
    }
}

/// Hands of `frame` showing `control_gesture`, with their fingertip
///
/// Each side is looked up with [`GestureFrame::hand`], so a duplicated side
/// resolves to its last report exactly as the gesture pair does. A hand
/// without the fingertip landmark is treated as absent.
pub fn control_hands(
    frame: &GestureFrame,
    control_gesture: &str,
    fingertip_landmark: usize,
) -> SmallVec<[ControlHand; 2]> {
    [Handedness::Left, Handedness::Right]
        .into_iter()
        .filter_map(|side| frame.hand(side))
        .filter(|hand| hand.gesture() == Some(control_gesture))
        .filter_map(|hand| {
            let tip = hand.landmarks.get(fingertip_landmark)?;
            Some(ControlHand {
                hand: hand.handedness,
                tip: Point { x: tip.x, y: tip.y },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tracker::{HandResult, Landmark};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn right(x: f64, y: f64) -> ControlHand {
        ControlHand {
            hand: Handedness::Right,
            tip: Point { x, y },
        }
    }

    fn left(x: f64, y: f64) -> ControlHand {
        ControlHand {
            hand: Handedness::Left,
            tip: Point { x, y },
        }
    }

    fn controller() -> PointerController {
        PointerController::new(PointerSettings {
            noise_threshold: 0.005,
            scale_factor: 4000.0,
            idle_timeout: ms(1000),
        })
    }

    #[test]
    fn test_first_sample_sets_baseline_only() {
        let mut pointer = controller();
        let now = Instant::now();

        assert_eq!(pointer.update(&[right(0.5, 0.5)], now), None);
        let baseline = pointer.baseline().unwrap();
        assert_eq!(baseline.hand, Handedness::Right);
        assert_eq!(baseline.timestamp, now);
    }

    #[test]
    fn test_motion_is_scaled_and_mirrored() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        let motion = pointer.update(&[right(0.51, 0.48)], start + ms(33)).unwrap();

        assert!((motion.delta.x - -40.0).abs() < 1e-6);
        assert!((motion.delta.y - -80.0).abs() < 1e-6);
        assert!(!motion.is_left_hand);
        assert_eq!(pointer.baseline().unwrap().point, Point { x: 0.51, y: 0.48 });
    }

    #[test]
    fn test_left_hand_is_reported() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[left(0.2, 0.2)], start);
        let motion = pointer.update(&[left(0.2, 0.3)], start + ms(33)).unwrap();
        assert!(motion.is_left_hand);
        assert!(motion.delta.y > 0.0);
    }

    #[test]
    fn test_jitter_is_swallowed_but_advances_baseline() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        assert_eq!(pointer.update(&[right(0.504, 0.497)], start + ms(33)), None);

        let baseline = pointer.baseline().unwrap();
        assert_eq!(baseline.point, Point { x: 0.504, y: 0.497 });
        assert_eq!(baseline.timestamp, start + ms(33));

        // Measured from the advanced baseline, not the original one
        assert_eq!(pointer.update(&[right(0.508, 0.497)], start + ms(66)), None);
    }

    #[test]
    fn test_one_axis_over_threshold_moves() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        let motion = pointer.update(&[right(0.5, 0.51)], start + ms(33)).unwrap();
        assert!(motion.delta.x.abs() < 1e-9);
        assert!((motion.delta.y - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_hands_are_ambiguous() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        let motion = pointer.update(&[right(0.9, 0.9), left(0.1, 0.1)], start + ms(33));
        assert_eq!(motion, None);
        // Baseline untouched by the ambiguous frame
        assert_eq!(pointer.baseline().unwrap().point, Point { x: 0.5, y: 0.5 });
    }

    #[test]
    fn test_idle_timeout_resets_baseline() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        pointer.update(&[], start + ms(500));
        assert_eq!(pointer.update(&[right(0.9, 0.9)], start + ms(1200)), None);
        assert_eq!(pointer.baseline().unwrap().timestamp, start + ms(1200));
    }

    #[test]
    fn test_within_idle_window_continues() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        pointer.update(&[], start + ms(400));
        assert!(pointer.update(&[right(0.6, 0.5)], start + ms(1000)).is_some());
    }

    #[test]
    fn test_hand_switch_starts_fresh_baseline() {
        let mut pointer = controller();
        let start = Instant::now();

        pointer.update(&[right(0.5, 0.5)], start);
        assert_eq!(pointer.update(&[left(0.1, 0.1)], start + ms(33)), None);
        assert_eq!(pointer.baseline().unwrap().hand, Handedness::Left);
    }

    #[test]
    fn test_control_hands_extraction() {
        let mut landmarks = vec![Landmark::default(); 21];
        landmarks[8] = Landmark { x: 0.3, y: 0.7, z: 0.0 };
        let frame = GestureFrame::new([
            HandResult {
                handedness: Handedness::Right,
                category: "Pointing_Up".to_string(),
                landmarks,
            },
            HandResult {
                handedness: Handedness::Left,
                category: "Open_Palm".to_string(),
                landmarks: vec![Landmark::default(); 21],
            },
        ]);

        let hands = control_hands(&frame, "Pointing_Up", 8);
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].hand, Handedness::Right);
        assert_eq!(hands[0].tip, Point { x: 0.3, y: 0.7 });
    }

    #[test]
    fn test_duplicate_side_uses_last_report() {
        let pointing = |x: f64| {
            let mut landmarks = vec![Landmark::default(); 21];
            landmarks[8] = Landmark { x, y: 0.5, z: 0.0 };
            HandResult {
                handedness: Handedness::Right,
                category: "Pointing_Up".to_string(),
                landmarks,
            }
        };
        let frame = GestureFrame::new([pointing(0.2), pointing(0.6)]);

        let hands = control_hands(&frame, "Pointing_Up", 8);
        assert_eq!(hands.as_slice(), &[right(0.6, 0.5)]);

        // The pointer keeps working instead of treating the frame as two hands
        let mut pointer = controller();
        let start = Instant::now();
        pointer.update(&[right(0.5, 0.5)], start);
        assert!(pointer.update(&hands, start + ms(33)).is_some());
    }

    #[test]
    fn test_duplicate_side_last_report_not_pointing() {
        let mut landmarks = vec![Landmark::default(); 21];
        landmarks[8] = Landmark { x: 0.4, y: 0.4, z: 0.0 };
        let frame = GestureFrame::new([
            HandResult {
                handedness: Handedness::Left,
                category: "Pointing_Up".to_string(),
                landmarks: landmarks.clone(),
            },
            HandResult {
                handedness: Handedness::Left,
                category: "Closed_Fist".to_string(),
                landmarks,
            },
        ]);
        assert!(control_hands(&frame, "Pointing_Up", 8).is_empty());
    }

    #[test]
    fn test_control_hand_without_landmarks_is_absent() {
        let frame = GestureFrame::new([HandResult {
            handedness: Handedness::Left,
            category: "Pointing_Up".to_string(),
            landmarks: vec![Landmark::default(); 5],
        }]);
        assert!(control_hands(&frame, "Pointing_Up", 8).is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: motion is emitted only above the noise threshold, mirrored on x
            #[test]
            fn motion_only_above_threshold(
                x0 in 0.0f64..1.0, y0 in 0.0f64..1.0,
                dx in -0.05f64..0.05, dy in -0.05f64..0.05,
            ) {
                let mut pointer = controller();
                let start = Instant::now();
                prop_assert!(pointer.update(&[right(x0, y0)], start).is_none());

                let x1 = x0 + dx;
                let y1 = y0 + dy;
                let motion = pointer.update(&[right(x1, y1)], start + ms(33));
                let (rdx, rdy) = (x1 - x0, y1 - y0);
                if rdx.abs().max(rdy.abs()) > 0.005 {
                    let motion = motion.expect("motion above threshold");
                    if rdx.abs() > 1e-9 {
                        prop_assert!(motion.delta.x.signum() == -rdx.signum());
                    }
                } else {
                    prop_assert!(motion.is_none());
                }
            }

            /// Property: two control hands never move the pointer
            #[test]
            fn two_hands_never_move(
                a in (0.0f64..1.0, 0.0f64..1.0),
                b in (0.0f64..1.0, 0.0f64..1.0),
            ) {
                let mut pointer = controller();
                let start = Instant::now();
                pointer.update(&[right(0.5, 0.5)], start);
                prop_assert!(pointer.update(&[right(a.0, a.1), left(b.0, b.1)], start + ms(33)).is_none());
            }
        }
    }
}
