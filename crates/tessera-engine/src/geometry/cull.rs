use crate::coords::Vec2;

/// Tolerance for all culling comparisons.
///
/// Edge-on contact with the view rectangle counts as overlap.
pub const CULL_EPSILON: f32 = 1e-5;

#[inline]
fn lt(a: f32, b: f32) -> bool {
    a < b - CULL_EPSILON
}

#[inline]
fn gt(a: f32, b: f32) -> bool {
    a > b + CULL_EPSILON
}

/// Returns `true` if the triangle `p0 p1 p2` overlaps the view rectangle
/// `[-1, 1] × [-1, 1]`.
///
/// Points are expected in normalized device coordinates. The rectangle axes are
/// tested first (all three points beyond one side), then each triangle edge
/// normal is tried as a separating axis. Triangles whose vertices are all
/// off-screen but whose body crosses the view are kept.
pub fn triangle_overlaps_view(p0: Vec2, p1: Vec2, p2: Vec2) -> bool {
    if lt(p0.x, -1.0) && lt(p1.x, -1.0) && lt(p2.x, -1.0) {
        return false;
    }
    if gt(p0.x, 1.0) && gt(p1.x, 1.0) && gt(p2.x, 1.0) {
        return false;
    }
    if lt(p0.y, -1.0) && lt(p1.y, -1.0) && lt(p2.y, -1.0) {
        return false;
    }
    if gt(p0.y, 1.0) && gt(p1.y, 1.0) && gt(p2.y, 1.0) {
        return false;
    }

    !(edge_separates(p0, p1, p2) || edge_separates(p1, p2, p0) || edge_separates(p2, p0, p1))
}

/// Tests the normal of edge `a -> b` as a separating axis; `c` is the opposite vertex.
fn edge_separates(a: Vec2, b: Vec2, c: Vec2) -> bool {
    // Degenerate edge: no usable axis.
    let Some(axis) = (a - b).perp().normalized() else { return false };

    // `a` and `b` project to the same value on their own edge normal.
    let da = axis.dot(a);
    let dc = axis.dot(c);
    let (tri_min, tri_max) = if da > dc { (dc, da) } else { (da, dc) };

    // The view corners are (±1, ±1).
    let corners = [
        axis.x + axis.y,
        axis.x - axis.y,
        -axis.x - axis.y,
        -axis.x + axis.y,
    ];
    let quad_min = corners.iter().copied().fold(f32::INFINITY, f32::min);
    let quad_max = corners.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    lt(quad_max, tri_min) || gt(quad_min, tri_max)
}
