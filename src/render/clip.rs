use crate::core::types::Point;

/// Pixel edges of the plot area. `top` is numerically smaller than `bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipBounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// Trims the segment `from -> to` at the four plot edges.
///
/// Segments are assumed to run left to right (non-decreasing X). Returns
/// `None` when nothing of the segment is inside the area. Interpolation runs
/// in `f64`, so endpoints anywhere in the `i32` range are accepted.
#[must_use]
pub fn clip_segment(from: Point, to: Point, bounds: ClipBounds) -> Option<(Point, Point)> {
    let mut p1 = Vertex::from(from);
    let mut p2 = Vertex::from(to);
    let left = f64::from(bounds.left);
    let right = f64::from(bounds.right);
    let top = f64::from(bounds.top);
    let bottom = f64::from(bounds.bottom);

    if p2.x > right && p1.x >= right {
        return None;
    }
    if p2.x < left {
        return None;
    }

    if p1.x < left {
        if let Some(m) = slope(p1, p2) {
            p1.y = p2.y - (m * (p2.x - left)).trunc();
            p1.x = left;
        }
    }
    if p2.x > right {
        if let Some(m) = slope(p1, p2) {
            p2.y = p1.y + (m * (right - p1.x)).trunc();
            p2.x = right;
        }
    }

    let visible = if p1.y <= top && p2.y <= top {
        p1.y == p2.y && p1.y == top
    } else if p1.y >= bottom && p2.y >= bottom {
        p1.y == p2.y && p1.y == bottom
    } else {
        true
    };
    if !visible {
        return None;
    }

    if p1.y > top && p2.y < top {
        p2 = cut_end(p1, p2, top);
    } else if p1.y < top && p2.y > top {
        p1 = cut_start(p1, p2, top);
    }
    if p1.y < bottom && p2.y > bottom {
        p2 = cut_end(p1, p2, bottom);
    } else if p1.y > bottom && p2.y < bottom {
        p1 = cut_start(p1, p2, bottom);
    }

    Some((p1.to_point(), p2.to_point()))
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    x: f64,
    y: f64,
}

impl From<Point> for Vertex {
    fn from(point: Point) -> Self {
        Self {
            x: f64::from(point.x),
            y: f64::from(point.y),
        }
    }
}

impl Vertex {
    // Float to int casts saturate at the i32 range.
    fn to_point(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

fn slope(p1: Vertex, p2: Vertex) -> Option<f64> {
    let dx = p2.x - p1.x;
    (dx != 0.0).then(|| (p2.y - p1.y) / dx)
}

/// Moves `p2` onto the horizontal line `edge_y`.
fn cut_end(p1: Vertex, p2: Vertex, edge_y: f64) -> Vertex {
    match slope(p1, p2) {
        Some(m) if m != 0.0 => Vertex {
            x: p1.x + ((edge_y - p1.y) / m).trunc(),
            y: edge_y,
        },
        Some(_) => p2,
        None => Vertex { x: p2.x, y: edge_y },
    }
}

/// Moves `p1` onto the horizontal line `edge_y`.
fn cut_start(p1: Vertex, p2: Vertex, edge_y: f64) -> Vertex {
    match slope(p1, p2) {
        Some(m) if m != 0.0 => Vertex {
            x: p2.x - ((p2.y - edge_y) / m).trunc(),
            y: edge_y,
        },
        Some(_) => p1,
        None => Vertex { x: p1.x, y: edge_y },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: ClipBounds = ClipBounds {
        left: 10,
        right: 110,
        top: 0,
        bottom: 100,
    };

    #[test]
    fn inside_segment_is_untouched() {
        let from = Point::new(20, 20);
        let to = Point::new(40, 60);
        assert_eq!(clip_segment(from, to, AREA), Some((from, to)));
    }

    #[test]
    fn segments_left_or_right_of_area_are_dropped() {
        assert_eq!(clip_segment(Point::new(0, 50), Point::new(5, 50), AREA), None);
        assert_eq!(
            clip_segment(Point::new(110, 50), Point::new(130, 50), AREA),
            None
        );
    }

    #[test]
    fn left_edge_is_interpolated() {
        let clipped = clip_segment(Point::new(0, 0), Point::new(20, 20), AREA);
        assert_eq!(clipped, Some((Point::new(10, 10), Point::new(20, 20))));
    }

    #[test]
    fn right_edge_is_interpolated() {
        let clipped = clip_segment(Point::new(100, 50), Point::new(120, 70), AREA);
        assert_eq!(clipped, Some((Point::new(100, 50), Point::new(110, 60))));
    }

    #[test]
    fn crossing_top_and_bottom_is_cut() {
        let (p1, p2) = clip_segment(Point::new(20, 50), Point::new(40, -50), AREA).expect("visible");
        assert_eq!(p1, Point::new(20, 50));
        assert_eq!(p2, Point::new(30, 0));

        let (p1, p2) = clip_segment(Point::new(20, 50), Point::new(40, 150), AREA).expect("visible");
        assert_eq!(p1, Point::new(20, 50));
        assert_eq!(p2, Point::new(30, 100));
    }

    #[test]
    fn segment_above_area_is_dropped() {
        assert_eq!(
            clip_segment(Point::new(20, -10), Point::new(40, -5), AREA),
            None
        );
        assert!(clip_segment(Point::new(20, 0), Point::new(40, 0), AREA).is_some());
    }

    #[test]
    fn vertical_segment_is_cut_at_bottom() {
        let clipped = clip_segment(Point::new(50, 50), Point::new(50, 200), AREA);
        assert_eq!(clipped, Some((Point::new(50, 50), Point::new(50, 100))));
    }

    #[test]
    fn saturated_endpoints_do_not_overflow() {
        let from = Point::new(20, i32::MAX);
        let to = Point::new(40, i32::MIN);
        let (p1, p2) = clip_segment(from, to, AREA).expect("crosses the area");
        assert_eq!((p1.y, p2.y), (100, 0));
        assert!((20..=40).contains(&p1.x) && (20..=40).contains(&p2.x));

        let wide = clip_segment(Point::new(i32::MIN, 50), Point::new(i32::MAX, 50), AREA);
        assert_eq!(wide, Some((Point::new(10, 50), Point::new(110, 50))));
    }
}
