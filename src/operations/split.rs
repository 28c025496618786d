use geo::LineString;

use crate::math::distance_2d::project_param;
use crate::math::intersect_2d::collinear_overlap;
use crate::math::{distance, Coord};

/// Subdivides `curve` wherever it runs along `other`.
///
/// For every stretch where a segment of `curve` overlaps a segment of
/// `other` collinearly, the ends of that stretch become vertices of the
/// result. Inserted vertices take `other`'s coordinates exactly. Crossings
/// and single-point touches do not split. The geometry of `curve` is
/// unchanged, and breaking an already broken curve against the same
/// `other` returns it as is.
#[must_use]
pub fn break_curve(curve: &LineString<f64>, other: &LineString<f64>, tol: f64) -> LineString<f64> {
    let coords = &curve.0;
    let Some(&first) = coords.first() else {
        return curve.clone();
    };

    let mut out = Vec::with_capacity(coords.len());
    out.push(first);
    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        out.extend(overlap_ends(a, b, other, tol));
        out.push(b);
    }
    LineString::new(out)
}

/// Breaks `curve` against each of `others` in turn.
///
/// The final vertex set is the union of every pairwise overlap end, so the
/// order of `others` does not change the result.
#[must_use]
pub fn break_against<'a>(
    curve: &LineString<f64>,
    others: impl IntoIterator<Item = &'a LineString<f64>>,
    tol: f64,
) -> LineString<f64> {
    others
        .into_iter()
        .fold(curve.clone(), |acc, other| break_curve(&acc, other, tol))
}

/// Interior split points of segment `a -> b`, sorted from `a` to `b`.
fn overlap_ends(a: Coord, b: Coord, other: &LineString<f64>, tol: f64) -> Vec<Coord> {
    let len = distance(a, b);
    let mut hits: Vec<(f64, Coord)> = Vec::new();
    for seg in other.lines() {
        let Some((t0, t1)) = collinear_overlap(a, b, seg.start, seg.end, tol) else {
            continue;
        };
        for p in [seg.start, seg.end] {
            let t = project_param(p, a, b);
            let strictly_inside = t * len > tol && (1.0 - t) * len > tol;
            let on_overlap = t >= t0 - tol / len && t <= t1 + tol / len;
            if strictly_inside && on_overlap {
                hits.push((t, p));
            }
        }
    }
    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    hits.dedup_by(|later, earlier| (later.0 - earlier.0) * len <= tol);
    hits.into_iter().map(|(_, p)| p).collect()
}
