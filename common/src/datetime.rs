//! Date and time utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, marker::PhantomData};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    UtcOffset,
};

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Inner representation of the date and time.
    inner: time::OffsetDateTime,

    /// Type parameter describing the kind of date and time.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Creates a new [`DateTime`] from the provided Unix timestamp in
    /// milliseconds.
    ///
    /// [`None`] is returned if the timestamp is out of range.
    #[must_use]
    pub fn from_unix_timestamp_millis(millis: i64) -> Option<Self> {
        let nanos = i128::from(millis) * 1_000_000;
        time::OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()?
            .try_into()
            .ok()
    }

    /// Creates a new [`DateTime`] from the provided [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        use ParseError as E;

        time::OffsetDateTime::parse(input, &Rfc3339)
            .map_err(E::Parse)?
            .try_into()
            .map_err(E::ComponentRange)
    }

    /// Creates a new [`DateTime`] pointing to the UTC midnight of the provided
    /// calendar date (like `2023-10-01` or `2023/10/01`).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid calendar date.
    pub fn from_date(input: &str) -> Result<Self, ParseError> {
        use ParseError as E;

        time::Date::parse(input, format_description!("[year]-[month]-[day]"))
            .or_else(|_| {
                time::Date::parse(input, format_description!("[year]/[month]/[day]"))
            })
            .map_err(E::Parse)?
            .midnight()
            .assume_utc()
            .try_into()
            .map_err(E::ComponentRange)
    }

    /// Creates a new [`DateTime`] from the provided date and time without an
    /// offset (like `2023-10-01T12:00:00` or `2023-10-01 12:00`), treating it
    /// as UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the string matches none of the supported formats.
    pub fn from_naive(input: &str) -> Result<Self, ParseError> {
        use ParseError as E;

        const FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
            ),
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
            ),
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        ];

        FORMATS
            .iter()
            .find_map(|f| time::PrimitiveDateTime::parse(input, f).ok())
            .ok_or(E::Unsupported)?
            .assume_utc()
            .try_into()
            .map_err(E::ComponentRange)
    }

    /// Parses a [`DateTime`] from a [RFC 3339] string, a calendar date or a
    /// date and time without an offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is neither of the supported formats.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_rfc3339(input)
            .or_else(|_| Self::from_date(input))
            .or_else(|_| Self::from_naive(input))
    }

    /// Returns the [`DateTime`] as an [RFC 3339] string.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.inner.format(&Rfc3339).unwrap_or_else(|e| {
            panic!("cannot format `DateTime` as RFC 3339: {e}")
        })
    }
}

/// Error of parsing [`DateTime`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ParseError {
    /// Failed to parse the string into an [`DateTime`].
    Parse(time::error::Parse),

    /// Parsed [`DateTime`] has an out of range component.
    ComponentRange(time::error::ComponentRange),

    /// String matches none of the supported formats.
    #[display("unsupported date and time format")]
    Unsupported,
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> TryFrom<time::OffsetDateTime> for DateTimeOf<Of> {
    type Error = time::error::ComponentRange;

    fn try_from(dt: time::OffsetDateTime) -> Result<Self, Self::Error> {
        dt.to_offset(UtcOffset::UTC)
            .replace_microsecond(dt.microsecond())
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for time::OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.inner
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::OffsetDateTime::from_sql(ty, raw)?
            .try_into()
            .map_err(Box::from)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! Module providing integration with [`serde`] crate.

    use super::DateTimeOf;

    pub mod rfc3339 {
        //! Module providing serialization of [`DateTimeOf`] as a [RFC 3339]
        //! string.
        //!
        //! [RFC 3339]: https://tools.ietf.org/html/rfc3339

        use serde::Serializer;

        use super::DateTimeOf;

        /// Serializes the [`DateTimeOf`] as a [RFC 3339] string.
        ///
        /// # Errors
        ///
        /// Returns an error if the `serializer` fails.
        ///
        /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            Of: ?Sized,
        {
            serializer.serialize_str(&dt.to_rfc3339())
        }
    }
}

#[cfg(test)]
mod spec {
    use super::DateTime;

    #[test]
    fn parses_calendar_date() {
        let dt = DateTime::parse("2023-10-01").unwrap();

        assert_eq!(dt.to_rfc3339(), "2023-10-01T00:00:00Z");
    }

    #[test]
    fn parses_rfc3339() {
        let dt = DateTime::parse("2023-10-01T12:30:00+03:00").unwrap();

        assert_eq!(dt.to_rfc3339(), "2023-10-01T09:30:00Z");
    }

    #[test]
    fn parses_unix_timestamp_millis() {
        let dt = DateTime::from_unix_timestamp_millis(1_696_118_400_000)
            .unwrap();

        assert_eq!(dt, DateTime::parse("2023-10-01").unwrap());
    }

    #[test]
    fn parses_slashed_calendar_date() {
        let dt = DateTime::parse("2023/10/01").unwrap();

        assert_eq!(dt, DateTime::parse("2023-10-01").unwrap());
    }

    #[test]
    fn parses_date_time_without_offset_as_utc() {
        for input in [
            "2023-10-01T12:00:00",
            "2023-10-01T12:00",
            "2023-10-01T12:00:00.000",
            "2023-10-01 12:00:00",
            "2023-10-01 12:00",
        ] {
            let dt = DateTime::parse(input).unwrap();

            assert_eq!(dt.to_rfc3339(), "2023-10-01T12:00:00Z", "{input}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(DateTime::parse("not a date").is_err());
        assert!(DateTime::parse("2023-13-01").is_err());
        assert!(DateTime::parse("2023-02-30").is_err());
        assert!(DateTime::parse("2023-10-01T25:00:00").is_err());
        assert!(DateTime::parse("2023/13/01").is_err());
        assert!(DateTime::parse("").is_err());
    }
}
