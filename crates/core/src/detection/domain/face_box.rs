/// One detected face as a normalized bounding box.
///
/// Center and size are fractions of frame width/height, so downstream
/// geometry is independent of capture resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned rectangle in normalized units with inclusive edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl FaceBox {
    pub fn new(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// The box grown by `margin` on all four sides.
    ///
    /// This is the "near face" region of the proximity test; a margin of
    /// 0 yields the box itself.
    pub fn expand(&self, margin: f64) -> Bounds {
        Bounds {
            min_x: self.x_center - self.width / 2.0 - margin,
            min_y: self.y_center - self.height / 2.0 - margin,
            max_x: self.x_center + self.width / 2.0 + margin,
            max_y: self.y_center + self.height / 2.0 + margin,
        }
    }
}

impl Bounds {
    /// Inclusive on all edges: a point exactly on the boundary is inside.
    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
