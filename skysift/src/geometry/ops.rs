//! Containment and intersection predicates.
//!
//! These back the spatial bounds filter and image clipping. Containment is
//! inclusive: points on a polygon edge count as inside, matching the
//! behavior expected of clip regions (a pixel center on the boundary is
//! kept rather than dropped).

use super::types::{Geometry, Point, Polygon};

/// Floating-point tolerance for on-segment and point-equality checks.
const EPSILON: f64 = 1e-12;

impl Geometry {
    /// Returns true if the geometry contains the given point.
    ///
    /// Point geometries contain only a coincident point; polygon edges are
    /// inclusive.
    pub fn contains_point(&self, p: Point) -> bool {
        match self {
            Geometry::Point(q) => points_coincide(*q, p),
            Geometry::Polygon(poly) => polygon_contains(poly, p),
            Geometry::MultiPolygon(mp) => mp.polygons().iter().any(|poly| polygon_contains(poly, p)),
        }
    }

    /// Returns true if the two geometries share at least one point.
    pub fn intersects(&self, other: &Geometry) -> bool {
        match (self, other) {
            (Geometry::Point(a), _) => other.contains_point(*a),
            (_, Geometry::Point(b)) => self.contains_point(*b),
            (Geometry::Polygon(a), Geometry::Polygon(b)) => polygons_intersect(a, b),
            (Geometry::Polygon(a), Geometry::MultiPolygon(mb)) => {
                mb.polygons().iter().any(|b| polygons_intersect(a, b))
            }
            (Geometry::MultiPolygon(ma), Geometry::Polygon(b)) => {
                ma.polygons().iter().any(|a| polygons_intersect(a, b))
            }
            (Geometry::MultiPolygon(ma), Geometry::MultiPolygon(mb)) => ma
                .polygons()
                .iter()
                .any(|a| mb.polygons().iter().any(|b| polygons_intersect(a, b))),
        }
    }
}

fn points_coincide(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
}

/// Even-odd ray casting with inclusive boundary.
fn polygon_contains(poly: &Polygon, p: Point) -> bool {
    if poly.is_empty() {
        return false;
    }
    let ring = poly.exterior();
    let n = ring.len();

    for i in 0..n {
        if on_segment(ring[i], ring[(i + 1) % n], p) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn polygons_intersect(a: &Polygon, b: &Polygon) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    // Bounding-box reject before the O(n*m) edge sweep.
    match (a.bounding_box(), b.bounding_box()) {
        (Some(ba), Some(bb)) if !ba.intersects(&bb) => return false,
        _ => {}
    }

    if a.exterior().iter().any(|p| polygon_contains(b, *p)) {
        return true;
    }
    if b.exterior().iter().any(|p| polygon_contains(a, *p)) {
        return true;
    }

    let (ra, rb) = (a.exterior(), b.exterior());
    let (na, nb) = (ra.len(), rb.len());
    for i in 0..na {
        for j in 0..nb {
            if segments_intersect(ra[i], ra[(i + 1) % na], rb[j], rb[(j + 1) % nb]) {
                return true;
            }
        }
    }
    false
}

/// Signed area of the triangle (a, b, c); zero means collinear.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    if cross(a, b, p).abs() > EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear touch cases
    on_segment(b1, b2, a1) || on_segment(b1, b2, a2) || on_segment(a1, a2, b1) || on_segment(a1, a2, b2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MultiPolygon;

    fn unit_square() -> Polygon {
        Polygon::rect(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn test_polygon_contains_interior_point() {
        let g = Geometry::Polygon(unit_square());
        assert!(g.contains_point(Point::new(0.5, 0.5)));
    }

    #[test]
    fn test_polygon_excludes_exterior_point() {
        let g = Geometry::Polygon(unit_square());
        assert!(!g.contains_point(Point::new(1.5, 0.5)));
        assert!(!g.contains_point(Point::new(0.5, -0.1)));
    }

    #[test]
    fn test_polygon_boundary_is_inclusive() {
        let g = Geometry::Polygon(unit_square());
        assert!(g.contains_point(Point::new(0.0, 0.5)));
        assert!(g.contains_point(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_point_geometry_contains_only_itself() {
        let g = Geometry::point(-117.18, 46.73);
        assert!(g.contains_point(Point::new(-117.18, 46.73)));
        assert!(!g.contains_point(Point::new(-117.18, 46.74)));
    }

    #[test]
    fn test_point_polygon_intersection_is_symmetric() {
        let square = Geometry::Polygon(unit_square());
        let inside = Geometry::point(0.25, 0.25);
        let outside = Geometry::point(2.0, 2.0);
        assert!(square.intersects(&inside));
        assert!(inside.intersects(&square));
        assert!(!square.intersects(&outside));
    }

    #[test]
    fn test_overlapping_polygons_intersect() {
        let a = Geometry::Polygon(unit_square());
        let b = Geometry::Polygon(Polygon::rect(0.5, 0.5, 1.5, 1.5));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_disjoint_polygons_do_not_intersect() {
        let a = Geometry::Polygon(unit_square());
        let b = Geometry::Polygon(Polygon::rect(2.0, 2.0, 3.0, 3.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contained_polygon_intersects() {
        // No edge crossings: containment must still count.
        let outer = Geometry::Polygon(Polygon::rect(0.0, 0.0, 10.0, 10.0));
        let inner = Geometry::Polygon(Polygon::rect(4.0, 4.0, 5.0, 5.0));
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_edge_crossing_without_vertex_containment() {
        // Long thin cross shapes: edges intersect but no vertex of either
        // polygon lies inside the other.
        let horizontal = Geometry::Polygon(Polygon::rect(-2.0, 0.4, 2.0, 0.6));
        let vertical = Geometry::Polygon(Polygon::rect(0.4, -2.0, 0.6, 2.0));
        assert!(horizontal.intersects(&vertical));
    }

    #[test]
    fn test_multi_polygon_intersection() {
        let mp = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::rect(0.0, 0.0, 1.0, 1.0),
            Polygon::rect(5.0, 5.0, 6.0, 6.0),
        ]));
        assert!(mp.contains_point(Point::new(5.5, 5.5)));
        assert!(mp.intersects(&Geometry::point(0.5, 0.5)));
        assert!(!mp.intersects(&Geometry::point(3.0, 3.0)));
    }

    #[test]
    fn test_empty_polygon_contains_nothing() {
        let g = Geometry::Polygon(Polygon::new(vec![]));
        assert!(!g.contains_point(Point::new(0.0, 0.0)));
    }
}
