//! Geometry type definitions

use serde::{Deserialize, Serialize};

/// A point in geographic coordinates (longitude, latitude in decimal degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Longitude (east-west)
    pub x: f64,
    /// Latitude (north-south)
    pub y: f64,
}

impl Point {
    /// Creates a new point from longitude and latitude.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner (west, south)
    pub min: Point,
    /// Maximum corner (east, north)
    pub max: Point,
}

impl Rect {
    /// Creates a rectangle from two corner points, normalizing the order.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns true if the two rectangles overlap (boundary touch counts).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Expands the rectangle to include another.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

/// A simple polygon described by one exterior ring.
///
/// The ring is implicitly closed: the last vertex connects back to the
/// first. Rings with fewer than three vertices are treated as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from an exterior ring.
    ///
    /// A trailing vertex equal to the first (explicitly closed ring) is
    /// dropped so edge iteration never produces a zero-length edge.
    pub fn new(mut exterior: Vec<Point>) -> Self {
        if exterior.len() > 1 && exterior.first() == exterior.last() {
            exterior.pop();
        }
        Self { exterior }
    }

    /// Builds an axis-aligned rectangle polygon from corner coordinates.
    pub fn rect(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(vec![
            Point::new(west, south),
            Point::new(east, south),
            Point::new(east, north),
            Point::new(west, north),
        ])
    }

    /// The exterior ring vertices (not explicitly closed).
    pub fn exterior(&self) -> &[Point] {
        &self.exterior
    }

    /// Returns true if the ring cannot enclose any area.
    pub fn is_empty(&self) -> bool {
        self.exterior.len() < 3
    }

    /// Bounding box, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let first = self.exterior[0];
        let mut rect = Rect::new(first, first);
        for p in &self.exterior[1..] {
            rect = rect.union(&Rect::new(*p, *p));
        }
        Some(rect)
    }
}

/// A collection of polygons treated as a single geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    /// Creates a multi-polygon, discarding empty members.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons: polygons.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Member polygons.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Bounding box over all members, or `None` when empty.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut boxes = self.polygons.iter().filter_map(|p| p.bounding_box());
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, b| acc.union(&b)))
    }
}

/// A point, polygon, or multi-polygon boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point(Point),
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Geometry {
    /// Point geometry from longitude/latitude.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Point::new(x, y))
    }

    /// Returns true if the geometry encloses nothing (degenerate polygon
    /// rings, empty multi-polygons). Points are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::Polygon(p) => p.is_empty(),
            Geometry::MultiPolygon(mp) => mp.is_empty(),
        }
    }

    /// Bounding box of the geometry, or `None` when empty.
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Geometry::Point(p) => Some(Rect::new(*p, *p)),
            Geometry::Polygon(p) => p.bounding_box(),
            Geometry::MultiPolygon(mp) => mp.bounding_box(),
        }
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Geometry::Point(p)
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(mp: MultiPolygon) -> Self {
        Geometry::MultiPolygon(mp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = Rect::new(Point::new(5.0, 1.0), Point::new(-5.0, 3.0));
        assert_eq!(r.min, Point::new(-5.0, 1.0));
        assert_eq!(r.max, Point::new(5.0, 3.0));
    }

    #[test]
    fn test_rect_contains_boundary() {
        let r = Rect::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(1.0, 2.0)));
        assert!(!r.contains(Point::new(2.1, 1.0)));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let b = Rect::new(Point::new(1.0, 1.0), Point::new(3.0, 3.0));
        let c = Rect::new(Point::new(5.0, 5.0), Point::new(6.0, 6.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_polygon_drops_closing_vertex() {
        let p = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(p.exterior().len(), 3);
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let p = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(p.is_empty());
        assert!(p.bounding_box().is_none());
        assert!(Geometry::Polygon(p).is_empty());
    }

    #[test]
    fn test_polygon_bounding_box() {
        let p = Polygon::rect(-117.5, 46.5, -117.0, 47.0);
        let b = p.bounding_box().unwrap();
        assert_eq!(b.min, Point::new(-117.5, 46.5));
        assert_eq!(b.max, Point::new(-117.0, 47.0));
    }

    #[test]
    fn test_multi_polygon_discards_empty_members() {
        let mp = MultiPolygon::new(vec![
            Polygon::new(vec![Point::new(0.0, 0.0)]),
            Polygon::rect(0.0, 0.0, 1.0, 1.0),
        ]);
        assert_eq!(mp.polygons().len(), 1);
        assert!(!mp.is_empty());
    }

    #[test]
    fn test_multi_polygon_bounding_box_unions_members() {
        let mp = MultiPolygon::new(vec![
            Polygon::rect(0.0, 0.0, 1.0, 1.0),
            Polygon::rect(4.0, 4.0, 5.0, 6.0),
        ]);
        let b = mp.bounding_box().unwrap();
        assert_eq!(b.min, Point::new(0.0, 0.0));
        assert_eq!(b.max, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_point_geometry_never_empty() {
        assert!(!Geometry::point(-117.1801, 46.727).is_empty());
    }

    #[test]
    fn test_geometry_serde_round_trip() {
        let g = Geometry::Polygon(Polygon::rect(0.0, 0.0, 1.0, 1.0));
        let json = serde_json::to_string(&g).unwrap();
        let back: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }
}
