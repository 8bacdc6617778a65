//! Hand-to-face proximity test.
//!
//! The "touching" boolean for an evaluation is a pure function of the
//! face box, the hand landmark sets, and the margin. Temporal memory
//! lives in the state machine, never here.

use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::hand_landmarks::HandLandmarks;

/// True when any key point of `hand` (wrist or a fingertip) lies inside
/// `face` expanded by `margin`, with inclusive bounds.
///
/// Testing six key points instead of intersecting the hand polygon keeps
/// the check O(1) per hand while still catching any realistic touch pose.
pub fn is_hand_near_face(hand: &HandLandmarks, face: &FaceBox, margin: f64) -> bool {
    let near_region = face.expand(margin);
    hand.key_points().any(|p| near_region.contains(p))
}

/// True when any of the present hands is near `face`.
pub fn any_hand_near_face(hands: &[HandLandmarks], face: &FaceBox, margin: f64) -> bool {
    hands.iter().any(|hand| is_hand_near_face(hand, face, margin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::hand_landmarks::{INDEX_TIP, LANDMARK_COUNT, WRIST};
    use rstest::rstest;

    /// All landmarks far away except the one at `index`.
    fn hand_with_point(index: usize, p: (f64, f64)) -> HandLandmarks {
        let mut pts = [(10.0, 10.0); LANDMARK_COUNT];
        pts[index] = p;
        HandLandmarks::new(pts)
    }

    fn face() -> FaceBox {
        // Box spans [0.4, 0.6] x [0.4, 0.6]
        FaceBox::new(0.5, 0.5, 0.2, 0.2)
    }

    #[test]
    fn test_fingertip_inside_face_box() {
        let hand = hand_with_point(INDEX_TIP, (0.5, 0.5));
        assert!(is_hand_near_face(&hand, &face(), 0.0));
    }

    #[test]
    fn test_wrist_inside_counts() {
        let hand = hand_with_point(WRIST, (0.55, 0.45));
        assert!(is_hand_near_face(&hand, &face(), 0.0));
    }

    #[test]
    fn test_fingertip_exactly_on_edge_zero_margin() {
        // Boundary-inclusive: a point on the box edge is touching.
        let hand = hand_with_point(INDEX_TIP, (0.6, 0.5));
        assert!(is_hand_near_face(&hand, &face(), 0.0));
    }

    #[test]
    fn test_fingertip_just_outside_margin() {
        let hand = hand_with_point(INDEX_TIP, (0.6 + 0.08 + 1e-9, 0.5));
        assert!(!is_hand_near_face(&hand, &face(), 0.08));
    }

    #[test]
    fn test_fingertip_inside_margin_band_only() {
        // Outside the box, inside the expanded region.
        let hand = hand_with_point(INDEX_TIP, (0.65, 0.5));
        assert!(!is_hand_near_face(&hand, &face(), 0.0));
        assert!(is_hand_near_face(&hand, &face(), 0.08));
    }

    #[test]
    fn test_non_key_landmark_inside_is_ignored() {
        // A mid-finger joint inside the box must not count; only the six
        // key points are tested.
        let hand = hand_with_point(6, (0.5, 0.5));
        assert!(!is_hand_near_face(&hand, &face(), 0.08));
    }

    #[rstest]
    #[case::small_face(FaceBox::new(0.5, 0.5, 0.1, 0.1), (0.54, 0.5))]
    #[case::wide_face(FaceBox::new(0.5, 0.5, 0.5, 0.1), (0.74, 0.5))]
    #[case::off_center(FaceBox::new(0.2, 0.8, 0.2, 0.2), (0.29, 0.75))]
    fn test_normalized_coordinates_only(#[case] face: FaceBox, #[case] tip: (f64, f64)) {
        // The test depends only on normalized geometry; there is no frame
        // size anywhere in the signature.
        let hand = hand_with_point(INDEX_TIP, tip);
        assert!(is_hand_near_face(&hand, &face, 0.0));
    }

    // ── any_hand_near_face ───────────────────────────────────────────

    #[test]
    fn test_any_hand_empty_slice_is_false() {
        assert!(!any_hand_near_face(&[], &face(), 0.08));
    }

    #[test]
    fn test_any_hand_second_hand_touches() {
        let far = hand_with_point(INDEX_TIP, (0.9, 0.9));
        let near = hand_with_point(INDEX_TIP, (0.5, 0.5));
        assert!(any_hand_near_face(&[far, near], &face(), 0.0));
    }

    #[test]
    fn test_any_hand_none_touch() {
        let a = hand_with_point(INDEX_TIP, (0.9, 0.9));
        let b = hand_with_point(WRIST, (0.05, 0.05));
        assert!(!any_hand_near_face(&[a, b], &face(), 0.05));
    }
}
