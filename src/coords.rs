use serde::{Deserialize, Serialize};

use crate::types::Bank;

/// Width and height of the square board, in board units.
pub const BOARD_SIZE: f64 = 600.0;
pub const BOARD_CENTER: Point = Point::new(BOARD_SIZE / 2.0, BOARD_SIZE / 2.0);

/// Distance of a bank's edge line from the board border.
const EDGE_INSET: f64 = 40.0;
/// Connectors along one edge are spread over `[SPAN_START, SPAN_START + SPAN_LENGTH]`.
const SPAN_START: f64 = 100.0;
const SPAN_LENGTH: f64 = 400.0;

/// Outer radius of a drawn connector; the default hit radius.
pub const CONNECTOR_RADIUS: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Converts an absolute pointer position into coordinates relative to `origin`
    /// (the top-left corner of the board).
    pub fn relative_to(self, origin: Point) -> Self {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(self, other: Point, t: f64) -> Self {
        Point::new(
            (1.0 - t) * self.x + t * other.x,
            (1.0 - t) * self.y + t * other.y,
        )
    }
}

/// Offset of the `slot`-th connector among `count` evenly spread along one edge.
fn edge_offset(slot: usize, count: usize) -> f64 {
    if count <= 1 {
        return BOARD_CENTER.x;
    }
    SPAN_START + (SPAN_LENGTH / (count - 1) as f64) * slot as f64
}

/// Board position of connector `index` in a bank of `total` connectors.
///
/// The first `ceil(total / 2)` connectors run along the bank's horizontal edge
/// (top for the left bank, bottom for the right bank), the rest along its
/// vertical edge (left or right). Returns `None` for an index outside the bank.
pub fn connector_position(bank: Bank, index: usize, total: usize) -> Option<Point> {
    if index >= total {
        return None;
    }
    let half = total.div_ceil(2);
    let far = BOARD_SIZE - EDGE_INSET;
    let point = if index < half {
        let x = edge_offset(index, half);
        match bank {
            Bank::Left => Point::new(x, EDGE_INSET),
            Bank::Right => Point::new(x, far),
        }
    } else {
        let y = edge_offset(index - half, total - half);
        match bank {
            Bank::Left => Point::new(EDGE_INSET, y),
            Bank::Right => Point::new(far, y),
        }
    };
    Some(point)
}

/// All connector positions of a bank, in index order.
pub fn bank_positions(bank: Bank, total: usize) -> Vec<Point> {
    (0..total)
        .filter_map(|index| connector_position(bank, index, total))
        .collect()
}

/// The connector of `bank` closest to `point`, if its center lies within `radius`.
pub fn hit_test(bank: Bank, total: usize, point: Point, radius: f64) -> Option<usize> {
    bank_positions(bank, total)
        .into_iter()
        .enumerate()
        .map(|(index, center)| (index, center.distance(point)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Control point of the quadratic curve drawn between two connectors: the
/// midpoint pulled towards the board center.
pub fn cable_control_point(start: Point, end: Point) -> Point {
    const CURVE_STRENGTH: f64 = 0.22;
    let mid = start.lerp(end, 0.5);
    mid.lerp(BOARD_CENTER, CURVE_STRENGTH)
}

/// Samples the quadratic Bézier between `start` and `end` into `segments + 1` points.
pub fn cable_curve(start: Point, end: Point, segments: usize) -> Vec<Point> {
    let control = cable_control_point(start, end);
    let segments = segments.max(1);
    (0..=segments)
        .map(|step| {
            let t = step as f64 / segments as f64;
            let a = start.lerp(control, t);
            let b = control.lerp(end, t);
            a.lerp(b, t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_connectors_split_between_edges() {
        let top = connector_position(Bank::Left, 0, 10).unwrap();
        assert_eq!(top, Point::new(100.0, 40.0));
        let last_top = connector_position(Bank::Left, 4, 10).unwrap();
        assert_eq!(last_top, Point::new(500.0, 40.0));
        let first_side = connector_position(Bank::Left, 5, 10).unwrap();
        assert_eq!(first_side, Point::new(40.0, 100.0));
        let last_side = connector_position(Bank::Right, 9, 10).unwrap();
        assert_eq!(last_side, Point::new(560.0, 500.0));
    }

    #[test]
    fn right_bank_mirrors_left() {
        for index in 0..7 {
            let left = connector_position(Bank::Left, index, 7).unwrap();
            let right = connector_position(Bank::Right, index, 7).unwrap();
            let expected = if index < 4 {
                Point::new(left.x, BOARD_SIZE - left.y)
            } else {
                Point::new(BOARD_SIZE - left.x, left.y)
            };
            assert_eq!(right, expected, "index {index}");
        }
    }

    #[test]
    fn single_connector_on_an_edge_is_centered() {
        assert_eq!(
            connector_position(Bank::Left, 0, 1),
            Some(Point::new(300.0, 40.0))
        );
        // total 3: two on top, one centered on the side
        assert_eq!(
            connector_position(Bank::Right, 2, 3),
            Some(Point::new(560.0, 300.0))
        );
    }

    #[test]
    fn out_of_range_index_has_no_position() {
        assert_eq!(connector_position(Bank::Left, 10, 10), None);
        assert_eq!(connector_position(Bank::Right, 0, 0), None);
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let target = connector_position(Bank::Right, 3, 10).unwrap();
        let near = Point::new(target.x + 5.0, target.y - 4.0);
        assert_eq!(hit_test(Bank::Right, 10, near, CONNECTOR_RADIUS), Some(3));
        assert_eq!(hit_test(Bank::Right, 10, BOARD_CENTER, CONNECTOR_RADIUS), None);
    }

    #[test]
    fn relative_to_subtracts_origin() {
        let p = Point::new(120.0, 75.0).relative_to(Point::new(20.0, 25.0));
        assert_eq!(p, Point::new(100.0, 50.0));
    }

    #[test]
    fn curve_starts_and_ends_on_connectors() {
        let start = Point::new(100.0, 40.0);
        let end = Point::new(560.0, 300.0);
        let curve = cable_curve(start, end, 8);
        assert_eq!(curve.len(), 9);
        assert_eq!(curve[0], start);
        assert!(curve[8].distance(end) < 1e-9);
    }
}
