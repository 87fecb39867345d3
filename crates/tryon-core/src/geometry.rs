//! Geometry primitives shared by hit testing, dragging, and painting.

use crate::model::Point;

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Position of the given corner.
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.right(), self.y),
            Corner::BottomLeft => Point::new(self.x, self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// `width / height`, or 1.0 for a degenerate box.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Resize handle positions of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Checked in this order; the first corner under the pointer wins.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The corner that stays fixed while this one is dragged.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// +1 when dragging this corner rightwards grows the box, else -1.
    pub fn x_sign(self) -> f32 {
        match self {
            Corner::TopRight | Corner::BottomRight => 1.0,
            Corner::TopLeft | Corner::BottomLeft => -1.0,
        }
    }

    /// +1 when dragging this corner downwards grows the box, else -1.
    pub fn y_sign(self) -> f32 {
        match self {
            Corner::BottomLeft | Corner::BottomRight => 1.0,
            Corner::TopLeft | Corner::TopRight => -1.0,
        }
    }
}

/// Distance from `p` to the segment `a`–`b`, with the projection clamped
/// to the segment. A zero-length segment degrades to point distance.
pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * dx, a.y + t * dy);
    p.distance(proj)
}

/// Arrowhead constants and math.
pub mod arrow {
    use crate::model::Point;

    /// Arrowhead angle from shaft in radians (30 degrees).
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;
    /// Head length as a multiple of stroke thickness.
    pub const HEAD_SCALE: f32 = 4.0;
    /// Shortest head drawn, in pixels.
    pub const MIN_HEAD: f32 = 10.0;

    /// The two barb endpoints of the head at `end`, or `None` for a
    /// zero-length arrow.
    pub fn head_points(start: Point, end: Point, thickness: f32) -> Option<(Point, Point)> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        let size = (thickness * HEAD_SCALE).max(MIN_HEAD);
        let angle = dy.atan2(dx);
        let barb = |offset: f32| {
            Point::new(
                end.x - size * (angle + offset).cos(),
                end.y - size * (angle + offset).sin(),
            )
        };
        Some((barb(-HEAD_ANGLE), barb(HEAD_ANGLE)))
    }
}

/// Points spaced at most `step` apart along `from`–`to`, excluding `from`
/// and including `to`. Used to fill gaps between fast pointer samples.
pub fn interpolate(from: Point, to: Point, step: f32) -> Vec<Point> {
    let dist = from.distance(to);
    if step <= 0.0 || dist <= step {
        return vec![to];
    }
    let n = (dist / step).ceil() as usize;
    (1..=n)
        .map(|i| {
            let t = i as f32 / n as f32;
            Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
        })
        .collect()
}
