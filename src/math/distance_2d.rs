use super::Coord;

/// Returns the minimum distance from point `(px, py)` to the line segment
/// from `(ax, ay)` to `(bx, by)`.
#[must_use]
pub fn point_to_segment_dist(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((px - ax) * dx + (py - ay) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = ax + t * dx;
    let closest_y = ay + t * dy;

    ((px - closest_x).powi(2) + (py - closest_y).powi(2)).sqrt()
}

/// [`point_to_segment_dist`] over kernel coordinates.
#[must_use]
pub fn coord_to_segment_dist(p: Coord, a: Coord, b: Coord) -> f64 {
    point_to_segment_dist(p.x, p.y, a.x, a.y, b.x, b.y)
}

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the point distance when `a` and `b` coincide.
#[must_use]
pub fn coord_to_line_dist(p: Coord, a: Coord, b: Coord) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len < 1e-20 {
        return (p.x - a.x).hypot(p.y - a.y);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// Parameter of the orthogonal projection of `p` onto the line `a + t (b - a)`.
///
/// Not clamped; `0` and `1` correspond to `a` and `b`.
#[must_use]
pub fn project_param(p: Coord, a: Coord, b: Coord) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-20 {
        return 0.0;
    }
    ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq
}

/// Minimum distance from `p` to any segment in `segments`.
///
/// Returns `f64::INFINITY` for an empty slice.
#[must_use]
pub fn coord_to_segments_dist(p: Coord, segments: &[(Coord, Coord)]) -> f64 {
    segments
        .iter()
        .map(|&(a, b)| coord_to_segment_dist(p, a, b))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    const TOL: f64 = 1e-10;

    #[test]
    fn segment_dist_perpendicular_projection() {
        // Point (1, 1) to segment (0,0)→(2,0). Closest at (1,0), dist = 1.
        let d = point_to_segment_dist(1.0, 1.0, 0.0, 0.0, 2.0, 0.0);
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_endpoint_closest() {
        let d = point_to_segment_dist(-1.0, 0.0, 0.0, 0.0, 2.0, 0.0);
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_degenerate() {
        let d = point_to_segment_dist(3.0, 4.0, 0.0, 0.0, 0.0, 0.0);
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn line_dist_ignores_segment_bounds() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 1.0, y: 0.0 };
        let p = coord! { x: 5.0, y: 2.0 };
        assert!((coord_to_line_dist(p, a, b) - 2.0).abs() < TOL);
        assert!((coord_to_segment_dist(p, a, b) - 20.0_f64.sqrt()).abs() < TOL);
    }

    #[test]
    fn projection_parameter() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 4.0, y: 0.0 };
        assert!((project_param(coord! { x: 1.0, y: 3.0 }, a, b) - 0.25).abs() < TOL);
        assert!((project_param(coord! { x: -4.0, y: 0.0 }, a, b) + 1.0).abs() < TOL);
    }

    #[test]
    fn nearest_of_many_segments() {
        let segs = [
            (coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }),
            (coord! { x: 0.0, y: 3.0 }, coord! { x: 1.0, y: 3.0 }),
        ];
        let d = coord_to_segments_dist(coord! { x: 0.5, y: 2.0 }, &segs);
        assert!((d - 1.0).abs() < TOL);
        assert!(coord_to_segments_dist(coord! { x: 0.0, y: 0.0 }, &[]).is_infinite());
    }
}
