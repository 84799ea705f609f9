//! [`Client`] definitions.

use std::sync::LazyLock;

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;

/// Client buying farms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Client {
    /// ID of this [`Client`].
    pub id: Id,

    /// [`Name`] of this [`Client`].
    pub name: Name,

    /// [`Email`] of this [`Client`].
    pub email: Email,

    /// [`Phone`] of this [`Client`].
    pub phone: Option<Phone>,
}

/// [`Client`] which is not persisted yet, so has no [`Id`] assigned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct New {
    /// [`Name`] of a new [`Client`].
    pub name: Name,

    /// [`Email`] of a new [`Client`].
    pub email: Email,

    /// [`Phone`] of a new [`Client`].
    pub phone: Option<Phone>,
}

impl New {
    /// Turns this [`New`] into a [`Client`] with the provided [`Id`].
    #[must_use]
    pub fn with_id(self, id: Id) -> Client {
        let Self { name, email, phone } = self;
        Client {
            id,
            name,
            email,
            phone,
        }
    }
}

/// ID of a [`Client`].
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

/// Name of a [`Client`].
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

/// Email address of a [`Client`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format: a local part and a
        /// dot-separated domain with a top-level label of at least two
        /// letters.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl std::str::FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Client`].
///
/// Any text is accepted as a phone number.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq, Serialize)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Phone(String);

#[cfg(test)]
mod spec {
    use super::{Email, Name};

    #[test]
    fn email() {
        assert!(Email::new("john@example.com").is_some());
        assert!(Email::new("john.doe+farms@mail.example.com.br").is_some());

        assert!(Email::new("").is_none());
        assert!(Email::new("john").is_none());
        assert!(Email::new("john@").is_none());
        assert!(Email::new("@example.com").is_none());
        assert!(Email::new("john@example").is_none());
        assert!(Email::new("john doe@example.com").is_none());
        assert!(Email::new("john@@example.com").is_none());
    }

    #[test]
    fn name() {
        assert!(Name::new("John Doe").is_some());
        assert!(Name::new(" ").is_some());

        assert!(Name::new("").is_none());
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("John".parse::<Name>().ok(), Name::new("John"));
        assert!("".parse::<Name>().is_err());

        assert_eq!(
            "john@example.com".parse::<Email>().ok(),
            Email::new("john@example.com"),
        );
        assert!("john".parse::<Email>().is_err());
    }
}
