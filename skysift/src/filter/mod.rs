//! Collection filter predicates.
//!
//! A [`FilterSpec`] is an ordered list of predicates applied conjunctively
//! to scene or feature metadata. Order is preserved for traceability (the
//! serialized request reports predicates in the order they were chained)
//! but has no effect on the resulting membership set: predicates are pure
//! and commute.

use crate::collection::{Feature, ImageMeta, PropertyValue};
use crate::geometry::Geometry;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing a predicate.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Date string is not of the form YYYY-MM-DD
    #[error("invalid date '{text}': {source}")]
    InvalidDate {
        text: String,
        source: chrono::ParseError,
    },
}

/// Metadata view a predicate evaluates against.
///
/// Implemented by both scene metadata and vector features so the same
/// predicates filter image collections and feature collections.
pub trait Filterable {
    /// Named property lookup.
    fn property(&self, name: &str) -> Option<&PropertyValue>;
    /// Acquisition timestamp, when the entity has one.
    fn timestamp(&self) -> Option<DateTime<Utc>>;
    /// Spatial extent of the entity.
    fn footprint(&self) -> &Geometry;
}

impl Filterable for ImageMeta {
    fn property(&self, name: &str) -> Option<&PropertyValue> {
        ImageMeta::property(self, name)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }

    fn footprint(&self) -> &Geometry {
        &self.footprint
    }
}

impl Filterable for Feature {
    fn property(&self, name: &str) -> Option<&PropertyValue> {
        Feature::property(self, name)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn footprint(&self) -> &Geometry {
        &self.geometry
    }
}

/// A single declarative predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Numeric property strictly below a threshold
    Lt { property: String, value: f64 },
    /// Property equal to a value
    Eq {
        property: String,
        value: PropertyValue,
    },
    /// Timestamp within `start <= t < end`
    Date {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Footprint intersects a geometry
    Bounds { geometry: Geometry },
}

impl Filter {
    /// `property < value` for numeric properties.
    pub fn lt(property: impl Into<String>, value: f64) -> Self {
        Filter::Lt {
            property: property.into(),
            value,
        }
    }

    /// `property == value`.
    pub fn eq(property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Filter::Eq {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Half-open timestamp interval `start <= t < end`.
    pub fn date(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Filter::Date { start, end }
    }

    /// [`Filter::date`] from `YYYY-MM-DD` strings, each taken at midnight UTC.
    pub fn date_range(start: &str, end: &str) -> Result<Self, FilterError> {
        Ok(Filter::Date {
            start: parse_day(start)?,
            end: parse_day(end)?,
        })
    }

    /// Footprint-intersects-geometry predicate.
    pub fn bounds(geometry: impl Into<Geometry>) -> Self {
        Filter::Bounds {
            geometry: geometry.into(),
        }
    }

    /// Evaluates the predicate against one metadata entity.
    ///
    /// Missing or non-numeric properties fail `Lt`; entities without a
    /// timestamp fail `Date`.
    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        match self {
            Filter::Lt { property, value } => item
                .property(property)
                .and_then(PropertyValue::as_number)
                .is_some_and(|n| n < *value),
            Filter::Eq { property, value } => item.property(property) == Some(value),
            Filter::Date { start, end } => item
                .timestamp()
                .is_some_and(|t| t >= *start && t < *end),
            Filter::Bounds { geometry } => item.footprint().intersects(geometry),
        }
    }
}

fn parse_day(text: &str) -> Result<DateTime<Utc>, FilterError> {
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|source| {
        FilterError::InvalidDate {
            text: text.to_string(),
            source,
        }
    })?;
    Ok(day.and_time(NaiveTime::MIN).and_utc())
}

/// An ordered, commutative chain of predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    predicates: Vec<Filter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate, consuming and returning the spec for chaining.
    pub fn with(mut self, filter: Filter) -> Self {
        self.predicates.push(filter);
        self
    }

    /// Appends a predicate in place.
    pub fn push(&mut self, filter: Filter) {
        self.predicates.push(filter);
    }

    /// Predicates in the order they were chained.
    pub fn predicates(&self) -> &[Filter] {
        &self.predicates
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Conjunction of all predicates. An empty spec matches everything.
    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        self.predicates.iter().all(|f| f.matches(item))
    }
}

impl FromIterator<Filter> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use chrono::TimeZone;

    fn scene(cloud_pct: f64, day: u32) -> ImageMeta {
        ImageMeta::new(
            format!("S2A_{:04}", day),
            Utc.with_ymd_and_hms(2019, 6, day, 10, 30, 0).unwrap(),
            Geometry::Polygon(Polygon::rect(-118.0, 46.0, -117.0, 47.0)),
        )
        .with_property("CLOUDY_PIXEL_PERCENTAGE", cloud_pct)
    }

    #[test]
    fn test_lt_matches_strictly_below() {
        let f = Filter::lt("CLOUDY_PIXEL_PERCENTAGE", 30.0);
        assert!(f.matches(&scene(29.9, 1)));
        assert!(!f.matches(&scene(30.0, 1)));
        assert!(!f.matches(&scene(75.0, 1)));
    }

    #[test]
    fn test_lt_fails_on_missing_or_text_property() {
        let missing = Filter::lt("NO_SUCH_PROPERTY", 30.0);
        assert!(!missing.matches(&scene(0.0, 1)));

        let textual = scene(5.0, 1).with_property("LABEL", "cloudy");
        assert!(!Filter::lt("LABEL", 30.0).matches(&textual));
    }

    #[test]
    fn test_eq_matches_text_and_number() {
        let feature = Feature::new(
            "00000000000000002bf8",
            Geometry::Polygon(Polygon::rect(0.0, 0.0, 1.0, 1.0)),
        )
        .with_property("country_na", "Japan")
        .with_property("rank", 3.0);

        assert!(Filter::eq("country_na", "Japan").matches(&feature));
        assert!(!Filter::eq("country_na", "Chile").matches(&feature));
        assert!(Filter::eq("rank", 3.0).matches(&feature));
        assert!(!Filter::eq("rank", 4.0).matches(&feature));
    }

    #[test]
    fn test_date_interval_is_half_open() {
        let f = Filter::date_range("2019-06-02", "2019-06-04").unwrap();
        assert!(!f.matches(&scene(0.0, 1)));
        assert!(f.matches(&scene(0.0, 2)));
        assert!(f.matches(&scene(0.0, 3)));
        // 2019-06-04 10:30 is past the exclusive end (midnight)
        assert!(!f.matches(&scene(0.0, 4)));
    }

    #[test]
    fn test_date_start_boundary_inclusive() {
        let start = Utc.with_ymd_and_hms(2019, 6, 2, 10, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2019, 6, 3, 0, 0, 0).unwrap();
        assert!(Filter::date(start, end).matches(&scene(0.0, 2)));
    }

    #[test]
    fn test_date_range_rejects_malformed_input() {
        assert!(Filter::date_range("2019/06/02", "2019-06-04").is_err());
        assert!(Filter::date_range("2019-06-02", "junk").is_err());
    }

    #[test]
    fn test_date_fails_for_features_without_timestamp() {
        let f = Filter::date_range("2019-01-01", "2020-01-01").unwrap();
        let feature = Feature::new("a", Geometry::Polygon(Polygon::rect(0.0, 0.0, 1.0, 1.0)));
        assert!(!f.matches(&feature));
    }

    #[test]
    fn test_bounds_matches_intersecting_footprint() {
        let inside = Filter::bounds(Geometry::point(-117.5, 46.5));
        let outside = Filter::bounds(Geometry::point(10.0, 10.0));
        assert!(inside.matches(&scene(0.0, 1)));
        assert!(!outside.matches(&scene(0.0, 1)));
    }

    #[test]
    fn test_spec_is_conjunction() {
        let spec = FilterSpec::new()
            .with(Filter::lt("CLOUDY_PIXEL_PERCENTAGE", 30.0))
            .with(Filter::date_range("2019-01-01", "2020-01-01").unwrap());

        assert!(spec.matches(&scene(10.0, 5)));
        assert!(!spec.matches(&scene(50.0, 5)));
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_empty_spec_matches_everything() {
        assert!(FilterSpec::new().matches(&scene(99.0, 1)));
    }

    #[test]
    fn test_predicate_order_preserved_but_membership_commutes() {
        let a = Filter::lt("CLOUDY_PIXEL_PERCENTAGE", 30.0);
        let b = Filter::date_range("2019-01-01", "2020-01-01").unwrap();
        let c = Filter::bounds(Geometry::point(-117.5, 46.5));

        let forward = FilterSpec::new().with(a.clone()).with(b.clone()).with(c.clone());
        let reverse = FilterSpec::new().with(c.clone()).with(b.clone()).with(a.clone());

        assert_eq!(forward.predicates()[0], a);
        assert_eq!(reverse.predicates()[0], c);

        let scenes = [scene(10.0, 5), scene(40.0, 5), scene(10.0, 20)];
        for s in &scenes {
            assert_eq!(forward.matches(s), reverse.matches(s));
        }
    }

    #[test]
    fn test_filter_serde_round_trip() {
        let f = Filter::lt("CLOUDY_PIXEL_PERCENTAGE", 20.0);
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"kind\":\"lt\""));
        let back: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
