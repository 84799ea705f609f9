//! Validation of untyped JSON request bodies.
//!
//! Only the first violated rule is reported. Fields are checked in the order
//! the parsing code reads them, and unknown fields are checked last.

use std::str::FromStr as _;

use common::{DateTimeOf, Positive};
use serde_json::{Map, Value};

use crate::Error;

/// Creates a validation [`Error`] of the provided field.
fn invalid(field: &str, rule: &str) -> Error {
    Error::bad_request(&format!("\"{field}\" {rule}"))
}

/// Requires the provided `value` of the `field` to be present.
///
/// # Errors
///
/// If the `value` is [`None`].
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| invalid(field, "is required"))
}

/// JSON object being validated.
#[derive(Clone, Copy, Debug)]
pub struct Object<'a>(&'a Map<String, Value>);

impl<'a> Object<'a> {
    /// Wraps the provided JSON `value`, ensuring it's an object.
    ///
    /// # Errors
    ///
    /// If the `value` is not a JSON object.
    pub fn new(value: &'a Value) -> Result<Self, Error> {
        value
            .as_object()
            .map(Self)
            .ok_or_else(|| invalid("value", "must be of type object"))
    }

    /// Ensures this [`Object`] contains no fields except the `allowed` ones.
    ///
    /// # Errors
    ///
    /// If an unknown field is present.
    pub fn only(&self, allowed: &[&str]) -> Result<(), Error> {
        match self.0.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(unknown) => Err(invalid(unknown, "is not allowed")),
            None => Ok(()),
        }
    }

    /// Reads a non-empty string `field`, if present.
    ///
    /// # Errors
    ///
    /// If the `field` is not a string or is empty.
    pub fn string(&self, field: &str) -> Result<Option<&'a str>, Error> {
        match self.0.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => {
                Err(invalid(field, "is not allowed to be empty"))
            }
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(invalid(field, "must be a string")),
        }
    }

    /// Reads a strictly positive number `field`, if present.
    ///
    /// Numeric strings are accepted.
    ///
    /// # Errors
    ///
    /// If the `field` is not a number or is not positive.
    pub fn positive(&self, field: &str) -> Result<Option<Positive>, Error> {
        let Some((repr, num)) = self.number(field)? else {
            return Ok(None);
        };
        if num <= 0.0 {
            return Err(invalid(field, "must be a positive number"));
        }
        Positive::from_str(&repr)
            .map(Some)
            .map_err(|_| invalid(field, "must be a safe number"))
    }

    /// Reads an integer `field`, if present.
    ///
    /// Numeric strings are accepted.
    ///
    /// # Errors
    ///
    /// If the `field` is not an integer or doesn't fit into [`i32`].
    pub fn integer(&self, field: &str) -> Result<Option<i32>, Error> {
        let Some((_, num)) = self.number(field)? else {
            return Ok(None);
        };
        if num.fract() != 0.0 {
            return Err(invalid(field, "must be an integer"));
        }
        if num < f64::from(i32::MIN) || num > f64::from(i32::MAX) {
            return Err(invalid(field, "must be a safe number"));
        }
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let num = num as i32;
        Ok(Some(num))
    }

    /// Reads a date `field`, if present.
    ///
    /// Accepts [RFC 3339] strings, calendar dates (like `2023-10-01` or
    /// `2023/10/01`), dates and times without an offset (like
    /// `2023-10-01 12:00:00`, read as UTC) and Unix timestamps in
    /// milliseconds (either numbers or numeric strings).
    ///
    /// # Errors
    ///
    /// If the `field` cannot be parsed as a date.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn date<Of: ?Sized>(
        &self,
        field: &str,
    ) -> Result<Option<DateTimeOf<Of>>, Error> {
        let parsed = match self.0.get(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => {
                n.as_i64().and_then(DateTimeOf::from_unix_timestamp_millis)
            }
            Some(Value::String(s)) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(millis) => DateTimeOf::from_unix_timestamp_millis(millis),
                    Err(_) => DateTimeOf::parse(s).ok(),
                }
            }
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid(field, "must be a valid date"))
    }

    /// Reads a finite number `field` along with its textual representation,
    /// if present.
    fn number(&self, field: &str) -> Result<Option<(String, f64)>, Error> {
        let (repr, num) = match self.0.get(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => (n.to_string(), n.as_f64()),
            Some(Value::String(s)) => {
                let s = s.trim();
                (s.to_owned(), s.parse::<f64>().ok())
            }
            Some(_) => (String::new(), None),
        };
        match num {
            Some(num) if num.is_finite() => Ok(Some((repr, num))),
            _ => Err(invalid(field, "must be a number")),
        }
    }
}
