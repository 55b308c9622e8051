//! Grid snapping for element placement.

use kurbo::{Point, Rect};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Snap a point to the nearest grid intersection.
///
/// Non-positive or non-finite grid sizes leave the point unchanged.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap both corners of a rectangle to the grid.
///
/// A rectangle that would collapse to zero width or height keeps at least
/// one grid cell on that axis.
pub fn snap_rect_to_grid(rect: Rect, grid_size: f64) -> Rect {
    let min = snap_to_grid(rect.origin(), grid_size);
    let mut max = snap_to_grid(Point::new(rect.x1, rect.y1), grid_size);
    if grid_size.is_finite() && grid_size > 0.0 {
        if max.x <= min.x {
            max.x = min.x + grid_size;
        }
        if max.y <= min.y {
            max.y = min.y + grid_size;
        }
    }
    Rect::from_points(min, max)
}
