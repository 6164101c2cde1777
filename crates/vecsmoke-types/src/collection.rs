//! Collection types.
//!
//! A collection is a named server-side container of points sharing one
//! dimensionality and distance metric.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::point::Point;

/// Similarity function used to rank search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// Cosine similarity (higher is closer)
    #[default]
    #[serde(alias = "Cosine", alias = "COSINE")]
    Cosine,
    /// Dot product (higher is closer)
    #[serde(alias = "Dot", alias = "DOT")]
    Dot,
    /// Euclidean distance (lower is closer)
    #[serde(
        alias = "euclid",
        alias = "l2",
        alias = "Euclid",
        alias = "Euclidean",
        alias = "EUCLID",
        alias = "EUCLIDEAN",
        alias = "L2"
    )]
    Euclidean,
}

impl Distance {
    /// Whether a larger score means a closer match.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Distance::Euclidean)
    }

    /// Whether a hit scored `a` ranks ahead of one scored `b`.
    pub fn ranks_before(self, a: f32, b: f32) -> bool {
        if self.higher_is_better() {
            a > b
        } else {
            a < b
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Cosine => write!(f, "cosine"),
            Distance::Dot => write!(f, "dot"),
            Distance::Euclidean => write!(f, "euclidean"),
        }
    }
}

impl FromStr for Distance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Distance::Cosine),
            "dot" => Ok(Distance::Dot),
            "euclid" | "euclidean" | "l2" => Ok(Distance::Euclidean),
            other => Err(format!(
                "unknown distance metric '{}' (expected cosine, dot or euclidean)",
                other
            )),
        }
    }
}

/// Parameters for creating a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Collection name (not unique across runs)
    pub name: String,

    /// Vector dimensionality
    pub dimension: u64,

    /// Distance metric
    pub distance: Distance,
}

impl CollectionSpec {
    /// Create a new collection spec.
    pub fn new(name: impl Into<String>, dimension: u64, distance: Distance) -> Self {
        Self {
            name: name.into(),
            dimension,
            distance,
        }
    }

    /// Check name and dimensionality.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyCollectionName);
        }
        if self.dimension == 0 {
            return Err(ValidationError::ZeroDimension);
        }
        Ok(())
    }

    /// Check an upsert batch against this collection.
    ///
    /// Rejects empty batches, malformed or duplicate ids, non-finite
    /// components and vectors whose length differs from the dimensionality.
    pub fn validate_points(&self, points: &[Point]) -> Result<(), ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(points.len());
        for point in points {
            point.id.validate()?;
            if !seen.insert(&point.id) {
                return Err(ValidationError::DuplicateId(point.id.clone()));
            }
            if point.dimension() as u64 != self.dimension {
                return Err(ValidationError::DimensionMismatch {
                    id: point.id.clone(),
                    expected: self.dimension,
                    actual: point.dimension(),
                });
            }
            if point.vector.iter().any(|v| !v.is_finite()) {
                return Err(ValidationError::NonFinite(point.id.clone()));
            }
        }
        Ok(())
    }

    /// Check a query vector against this collection.
    pub fn validate_query(&self, query: &[f32]) -> Result<(), ValidationError> {
        if query.len() as u64 != self.dimension {
            return Err(ValidationError::QueryDimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NonFiniteQuery);
        }
        Ok(())
    }
}

/// Vector parameters of an existing collection as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Vector dimensionality
    pub dimension: u64,

    /// Distance metric
    pub distance: Distance,
}

impl CollectionInfo {
    /// Whether these parameters match the requested spec.
    pub fn matches(&self, spec: &CollectionSpec) -> bool {
        self.dimension == spec.dimension && self.distance == spec.distance
    }
}

impl fmt::Display for CollectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dimension={} distance={}", self.dimension, self.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::PointId;

    fn spec() -> CollectionSpec {
        CollectionSpec::new("smoke", 4, Distance::Cosine)
    }

    #[test]
    fn test_distance_from_str() {
        assert_eq!("Cosine".parse::<Distance>().unwrap(), Distance::Cosine);
        assert_eq!("dot".parse::<Distance>().unwrap(), Distance::Dot);
        assert_eq!("euclid".parse::<Distance>().unwrap(), Distance::Euclidean);
        assert!("manhattan".parse::<Distance>().is_err());
    }

    #[test]
    fn test_distance_serde() {
        let d: Distance = serde_json::from_str(r#""euclid""#).unwrap();
        assert_eq!(d, Distance::Euclidean);
        assert_eq!(serde_json::to_string(&Distance::Dot).unwrap(), r#""dot""#);
    }

    #[test]
    fn test_distance_serde_accepts_wire_names() {
        for (text, expected) in [
            (r#""Cosine""#, Distance::Cosine),
            (r#""Dot""#, Distance::Dot),
            (r#""Euclid""#, Distance::Euclidean),
            (r#""Euclidean""#, Distance::Euclidean),
        ] {
            let d: Distance = serde_json::from_str(text).unwrap();
            assert_eq!(d, expected, "{text}");
            assert_eq!(d, text.trim_matches('"').parse::<Distance>().unwrap());
        }
    }

    #[test]
    fn test_ranks_before() {
        assert!(Distance::Cosine.ranks_before(0.9, 0.1));
        assert!(Distance::Dot.ranks_before(2.0, 1.0));
        assert!(Distance::Euclidean.ranks_before(0.1, 0.9));
        assert!(!Distance::Euclidean.ranks_before(0.9, 0.1));
    }

    #[test]
    fn test_spec_validation() {
        assert!(spec().validate().is_ok());
        assert_eq!(
            CollectionSpec::new(" ", 4, Distance::Cosine).validate(),
            Err(ValidationError::EmptyCollectionName)
        );
        assert_eq!(
            CollectionSpec::new("smoke", 0, Distance::Cosine).validate(),
            Err(ValidationError::ZeroDimension)
        );
    }

    #[test]
    fn test_validate_points_dimension_mismatch() {
        let points = vec![
            Point::new(1, vec![0.1, 0.2, 0.3, 0.4]),
            Point::new(2, vec![0.1, 0.2, 0.3]),
        ];
        assert_eq!(
            spec().validate_points(&points),
            Err(ValidationError::DimensionMismatch {
                id: PointId::Num(2),
                expected: 4,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_validate_points_duplicate_id() {
        let points = vec![
            Point::new(1, vec![0.1, 0.2, 0.3, 0.4]),
            Point::new(1, vec![0.5, 0.6, 0.7, 0.8]),
        ];
        assert_eq!(
            spec().validate_points(&points),
            Err(ValidationError::DuplicateId(PointId::Num(1)))
        );
    }

    #[test]
    fn test_validate_points_rejects_empty_and_nan() {
        assert_eq!(spec().validate_points(&[]), Err(ValidationError::EmptyBatch));

        let points = vec![Point::new(9, vec![0.1, f32::NAN, 0.3, 0.4])];
        assert_eq!(
            spec().validate_points(&points),
            Err(ValidationError::NonFinite(PointId::Num(9)))
        );
    }

    #[test]
    fn test_validate_query() {
        assert!(spec().validate_query(&[0.1, 0.2, 0.3, 0.4]).is_ok());
        assert_eq!(
            spec().validate_query(&[0.1]),
            Err(ValidationError::QueryDimensionMismatch {
                expected: 4,
                actual: 1
            })
        );
        assert_eq!(
            spec().validate_query(&[0.1, 0.2, f32::INFINITY, 0.4]),
            Err(ValidationError::NonFiniteQuery)
        );
    }

    #[test]
    fn test_collection_info_matches() {
        let info = CollectionInfo {
            dimension: 4,
            distance: Distance::Cosine,
        };
        assert!(info.matches(&spec()));

        let other = CollectionInfo {
            dimension: 128,
            distance: Distance::Cosine,
        };
        assert!(!other.matches(&spec()));
    }
}
