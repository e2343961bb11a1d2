//! Spatial and temporal constraints attached to tasks and queries.

use super::TaskDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn check_latitude(value: f64) -> Result<f64, TaskDomainError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(value)
    } else {
        Err(TaskDomainError::InvalidLatitude(value))
    }
}

fn check_longitude(value: f64) -> Result<f64, TaskDomainError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(value)
    } else {
        Err(TaskDomainError::InvalidLongitude(value))
    }
}

/// A single geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    latitude: f64,
    longitude: f64,
}

impl Position {
    /// Creates a validated position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidLatitude`] or
    /// [`TaskDomainError::InvalidLongitude`] for out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TaskDomainError> {
        Ok(Self {
            latitude: check_latitude(latitude)?,
            longitude: check_longitude(longitude)?,
        })
    }

    /// Returns the latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

/// Rectangular area given by its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskDomainError`] when a coordinate is out of range or
    /// the south-west corner does not lie south-west of the north-east one.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, TaskDomainError> {
        let south = check_latitude(south)?;
        let north = check_latitude(north)?;
        let west = check_longitude(west)?;
        let east = check_longitude(east)?;
        if south > north {
            return Err(TaskDomainError::InvertedLatitudes { south, north });
        }
        if west > east {
            return Err(TaskDomainError::InvertedLongitudes { west, east });
        }
        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Creates a bounding box from a GeoJSON `[west, south, east, north]`
    /// array, the order used on the wire.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`BoundingBox::new`].
    pub fn from_geojson(bbox: [f64; 4]) -> Result<Self, TaskDomainError> {
        let [west, south, east, north] = bbox;
        Self::new(south, west, north, east)
    }

    /// Returns the GeoJSON `[west, south, east, north]` array.
    #[must_use]
    pub const fn to_geojson(self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Returns the south-west corner.
    #[must_use]
    pub const fn south_west(self) -> Position {
        Position {
            latitude: self.south,
            longitude: self.west,
        }
    }

    /// Returns the north-east corner.
    #[must_use]
    pub const fn north_east(self) -> Position {
        Position {
            latitude: self.north,
            longitude: self.east,
        }
    }
}

/// Closed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a validated time range.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvertedTimeRange`] when `end` precedes
    /// `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TaskDomainError> {
        if end < start {
            return Err(TaskDomainError::InvertedTimeRange);
        }
        Ok(Self { start, end })
    }

    /// Returns the start of the range.
    #[must_use]
    pub const fn start(self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the end of the range.
    #[must_use]
    pub const fn end(self) -> DateTime<Utc> {
        self.end
    }
}

/// Server-side ordering applied to common task queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Most recently created first.
    Newest,
    /// Highest vote balance first.
    TopRated,
    /// Most submissions first.
    MostActive,
}

impl OrderType {
    /// Returns the path segment used by the common query endpoints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::TopRated => "toprated",
            Self::MostActive => "active",
        }
    }
}
