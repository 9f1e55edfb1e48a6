//! Plane geometry used by hit testing, overlap and selection containment.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn delta_to(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

/// Axis-aligned rectangle normalized so that `min` is the smaller corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Square of half-width `half` centered on `center`.
    pub fn around(center: Point, half: f64) -> Self {
        Self {
            min: Point::new(center.x - half, center.y - half),
            max: Point::new(center.x + half, center.y + half),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Inclusive containment.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Strict overlap; touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.min.x >= other.max.x
            || other.min.x >= self.max.x
            || self.min.y >= other.max.y
            || other.min.y >= self.max.y)
    }
}

/// Angle from `a` to `b` in degrees, in `[0, 360)`.
pub fn angle_degrees(a: Point, b: Point) -> f64 {
    let degrees = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    if degrees < 0.0 { degrees + 360.0 } else { degrees }
}

/// Which side of a square a ray leaving its center at `degrees` crosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SquareSide {
    Right,
    Top,
    Left,
    Bottom,
}

pub fn intersect_side(degrees: f64) -> SquareSide {
    if degrees > 45.0 && degrees < 135.0 {
        SquareSide::Top
    } else if (135.0..=225.0).contains(&degrees) {
        SquareSide::Left
    } else if degrees > 225.0 && degrees < 315.0 {
        SquareSide::Bottom
    } else {
        SquareSide::Right
    }
}

/// Distance from a square's center to its border along a ray at `degrees`,
/// where `half_side` is the distance from the center to each side.
pub fn distance_to_square_border(half_side: f64, degrees: f64) -> f64 {
    let radians = degrees.to_radians();
    let trig = match intersect_side(degrees) {
        SquareSide::Left | SquareSide::Right => radians.cos(),
        SquareSide::Top | SquareSide::Bottom => radians.sin(),
    };
    (half_side / trig).abs()
}

/// Move `p` by `distance` along a ray at `degrees`.
pub fn move_point(p: Point, distance: f64, degrees: f64) -> Point {
    let radians = degrees.to_radians();
    Point::new(p.x + radians.cos() * distance, p.y + radians.sin() * distance)
}

/// Evenly spaced positions on a circle, starting at angle zero.
pub fn circle_layout(center: Point, count: usize, radius: f64) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let step = std::f64::consts::TAU / count as f64;
    (0..count)
        .map(|i| {
            let angle = i as f64 * step;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}
