//! 21-point hand landmark set with fixed semantic indices.
//!
//! Index semantics follow the common hand-landmark convention:
//! 0 is the wrist, 4/8/12/16/20 are the fingertips, the rest are joints.

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// The landmarks tested against the face region: wrist + five fingertips.
///
/// These approximate "any part of the hand" well enough for proximity
/// purposes without a full polygon test.
pub const KEY_POINTS: [usize; 6] = [WRIST, THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// One detected hand: 21 ordered normalized (x, y) points.
///
/// The arity is part of the type; decoders producing untrusted output go
/// through [`HandLandmarks::from_points`].
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [(f64, f64); LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [(f64, f64); LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Checked construction for decoder output of uncertain arity.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, &'static str> {
        let points: [(f64, f64); LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| "hand landmark set must contain exactly 21 points")?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64); LANDMARK_COUNT] {
        &self.points
    }

    pub fn point(&self, index: usize) -> (f64, f64) {
        self.points[index]
    }

    /// The six proximity key points in index order.
    pub fn key_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        KEY_POINTS.iter().map(|&i| self.points[i])
    }
}
