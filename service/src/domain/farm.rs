//! [`Farm`] definitions.

use common::Positive;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::Serialize;

/// Farm which can be sold to a [`Client`].
///
/// [`Client`]: crate::domain::Client
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Farm {
    /// ID of this [`Farm`].
    pub id: Id,

    /// [`Name`] of this [`Farm`].
    pub name: Name,

    /// [`Location`] of this [`Farm`].
    pub location: Location,

    /// [`Area`] of this [`Farm`].
    pub area: Area,
}

/// [`Farm`] which is not persisted yet, so has no [`Id`] assigned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct New {
    /// [`Name`] of a new [`Farm`].
    pub name: Name,

    /// [`Location`] of a new [`Farm`].
    pub location: Location,

    /// [`Area`] of a new [`Farm`].
    pub area: Area,
}

impl New {
    /// Turns this [`New`] into a [`Farm`] with the provided [`Id`].
    #[must_use]
    pub fn with_id(self, id: Id) -> Farm {
        let Self {
            name,
            location,
            area,
        } = self;
        Farm {
            id,
            name,
            location,
            area,
        }
    }
}

/// ID of a [`Farm`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
#[serde(transparent)]
pub struct Id(i32);

/// Name of a [`Farm`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty()).then_some(Self(name))
    }
}

impl std::str::FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Location of a [`Farm`] as a [WKT] geometry in the [WGS 84] spatial
/// reference system.
///
/// The geometry itself is parsed by the database, so only emptiness is checked
/// here.
///
/// [WGS 84]: https://epsg.io/4326
/// [WKT]: https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// [SRID] of the spatial reference system every [`Location`] belongs to.
    ///
    /// [SRID]: https://en.wikipedia.org/wiki/Spatial_reference_system#Identifier
    pub const SRID: i32 = 4326;

    /// Creates a new [`Location`] out of the provided [WKT] text.
    ///
    /// [WKT]: https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry
    #[must_use]
    pub fn new(wkt: impl Into<String>) -> Option<Self> {
        let wkt = wkt.into();
        (!wkt.trim().is_empty()).then_some(Self(wkt))
    }
}

/// Area of a [`Farm`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Into, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Area(Positive);

#[cfg(test)]
mod spec {
    use super::{Area, Location, Name};

    #[test]
    fn name() {
        assert_eq!("Sunny".parse::<Name>().ok(), Name::new("Sunny"));
        assert!("".parse::<Name>().is_err());
    }

    #[test]
    fn location() {
        assert!(Location::new("POINT(-47.9 -15.7)").is_some());
        assert!(Location::new("   ").is_none());
    }

    #[test]
    fn area() {
        assert_eq!("1500.5".parse::<Area>().unwrap().to_string(), "1500.5");
        assert!("0".parse::<Area>().is_err());
        assert!("-3".parse::<Area>().is_err());
    }
}
