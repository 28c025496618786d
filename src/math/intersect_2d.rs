use super::distance_2d::{coord_to_line_dist, coord_to_segment_dist, project_param};
use super::Coord;

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel segments return `None`; use [`collinear_overlap`] for those.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: Coord,
    a1: Coord,
    b0: Coord,
    b1: Coord,
    tol: f64,
) -> Option<(Coord, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    let len_a = da.x.hypot(da.y);
    let len_b = db.x.hypot(db.y);
    if len_a < tol || len_b < tol || cross.abs() < tol * tol * len_a.max(len_b) {
        return None;
    }

    let d = b0 - a0;
    let t = (d.x * db.y - d.y * db.x) / cross;
    let u = (d.x * da.y - d.y * da.x) / cross;

    // Parameter slack scaled so that endpoints within `tol` are included.
    let eps_t = tol / len_a;
    let eps_u = tol / len_b;
    if t >= -eps_t && t <= 1.0 + eps_t && u >= -eps_u && u <= 1.0 + eps_u {
        let t_clamped = t.clamp(0.0, 1.0);
        let pt = a0 + da * t_clamped;
        Some((pt, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Overlap of two collinear segments, as a parameter interval on `a`.
///
/// Returns `Some((t0, t1))` with `t0 < t1` when both endpoints of `b` lie
/// within `tol` of the line through `a` and the shared stretch is longer
/// than `tol`. Touching end to end is not an overlap.
#[must_use]
pub fn collinear_overlap(a0: Coord, a1: Coord, b0: Coord, b1: Coord, tol: f64) -> Option<(f64, f64)> {
    let len_a = super::distance(a0, a1);
    if len_a < tol {
        return None;
    }
    if coord_to_line_dist(b0, a0, a1) > tol || coord_to_line_dist(b1, a0, a1) > tol {
        return None;
    }
    let s0 = project_param(b0, a0, a1);
    let s1 = project_param(b1, a0, a1);
    let lo = s0.min(s1).max(0.0);
    let hi = s0.max(s1).min(1.0);
    if (hi - lo) * len_a > tol {
        Some((lo, hi))
    } else {
        None
    }
}

/// Returns `true` if the two closed segments share at least one point
/// within `tol` (crossing, touching, or overlapping).
#[must_use]
pub fn segments_touch(a0: Coord, a1: Coord, b0: Coord, b1: Coord, tol: f64) -> bool {
    segment_segment_intersect_2d(a0, a1, b0, b1, tol).is_some()
        || coord_to_segment_dist(b0, a0, a1) <= tol
        || coord_to_segment_dist(b1, a0, a1) <= tol
        || coord_to_segment_dist(a0, b0, b1) <= tol
        || coord_to_segment_dist(a1, b0, b1) <= tol
}

/// All points where segment `b` meets segment `a`, as parameters on `a`.
///
/// Includes proper crossings, endpoint touches and the two ends of a
/// collinear overlap. Parameters are in `[0, 1]`, unsorted, possibly repeated.
#[must_use]
pub fn segment_hit_params(a0: Coord, a1: Coord, b0: Coord, b1: Coord, tol: f64) -> Vec<f64> {
    if let Some((t0, t1)) = collinear_overlap(a0, a1, b0, b1, tol) {
        return vec![t0, t1];
    }
    let mut hits = Vec::new();
    if let Some((_, t, _)) = segment_segment_intersect_2d(a0, a1, b0, b1, tol) {
        hits.push(t);
    }
    for p in [b0, b1] {
        if coord_to_segment_dist(p, a0, a1) <= tol {
            hits.push(project_param(p, a0, a1).clamp(0.0, 1.0));
        }
    }
    hits
}
