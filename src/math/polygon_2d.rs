use super::Coord;

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. A closing
/// duplicate of the first point is allowed and contributes nothing.
#[must_use]
pub fn signed_area_2d(points: &[Coord]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Rotates a closed ring so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Coord], tol: f64) -> Vec<Coord> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - tol || (pt.x - b.x).abs() < tol && pt.y < b.y {
            best = i;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Centroid of a triangle.
#[must_use]
pub fn triangle_centroid(a: Coord, b: Coord, c: Coord) -> Coord {
    Coord {
        x: (a.x + b.x + c.x) / 3.0,
        y: (a.y + b.y + c.y) / 3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    const TOL: f64 = 1e-10;

    fn square_ccw() -> Vec<Coord> {
        vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&square_ccw()) - 1.0).abs() < TOL);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square_ccw();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOL);
    }

    #[test]
    fn signed_area_ignores_closing_point() {
        let mut pts = square_ccw();
        pts.push(pts[0]);
        assert!((signed_area_2d(&pts) - 1.0).abs() < TOL);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[coord! { x: 0.0, y: 0.0 }]).abs() < TOL);
        assert!(signed_area_2d(&[]).abs() < TOL);
    }

    #[test]
    fn canonical_start_rotation() {
        let pts = vec![
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
            coord! { x: 0.0, y: 0.0 },
        ];
        let rotated = rotate_to_canonical_start(&pts, TOL);
        assert!(rotated[0].x.abs() < TOL);
        assert!(rotated[0].y.abs() < TOL);
    }

    #[test]
    fn centroid_of_triangle() {
        let c = triangle_centroid(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 3.0, y: 0.0 },
            coord! { x: 0.0, y: 3.0 },
        );
        assert!((c.x - 1.0).abs() < TOL && (c.y - 1.0).abs() < TOL);
    }
}
