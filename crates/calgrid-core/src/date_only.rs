use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize
};
use serde_json::Value;

/// Days between 0001-01-01 (CE day 1) and
/// 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 =
  719_163;

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M:%S"
];

/// A calendar date with no time-of-day.
///
/// Every comparison in the grid engine
/// goes through this type, so two values
/// are equal exactly when year, month and
/// day match.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct DateOnly(NaiveDate);

impl DateOnly {
  #[must_use]
  pub fn from_ymd(
    year: i32,
    month: u32,
    day: u32
  ) -> Option<Self> {
    NaiveDate::from_ymd_opt(
      year, month, day
    )
    .map(Self)
  }

  #[must_use]
  pub fn from_epoch_millis(
    millis: i64
  ) -> Option<Self> {
    DateTime::<Utc>::from_timestamp_millis(
      millis
    )
    .map(|dt| Self(dt.date_naive()))
  }

  /// Inverse of [`DateOnly::sort_key`].
  #[must_use]
  pub fn from_sort_key(
    key: i64
  ) -> Option<Self> {
    let days = key.checked_add(
      UNIX_EPOCH_DAYS_FROM_CE
    )?;
    let days = i32::try_from(days).ok()?;
    NaiveDate::from_num_days_from_ce_opt(
      days
    )
    .map(Self)
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.0.year()
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.0.month()
  }

  #[must_use]
  pub fn day(self) -> u32 {
    self.0.day()
  }

  /// Weekday index with 0 = Sunday.
  #[must_use]
  pub fn weekday_index(self) -> u32 {
    self
      .0
      .weekday()
      .num_days_from_sunday()
  }

  /// Signed day count since 1970-01-01.
  #[must_use]
  pub fn sort_key(self) -> i64 {
    i64::from(self.0.num_days_from_ce())
      - UNIX_EPOCH_DAYS_FROM_CE
  }

  #[must_use]
  pub fn naive(self) -> NaiveDate {
    self.0
  }

  #[must_use]
  pub fn add_days(
    self,
    days: i64
  ) -> Self {
    self
      .0
      .checked_add_signed(
        Duration::days(days)
      )
      .map(Self)
      .unwrap_or(self)
  }

  #[must_use]
  pub fn same_month(
    self,
    other: Self
  ) -> bool {
    self.year() == other.year()
      && self.month() == other.month()
  }
}

impl From<NaiveDate> for DateOnly {
  fn from(date: NaiveDate) -> Self {
    Self(date)
  }
}

impl From<NaiveDateTime> for DateOnly {
  fn from(dt: NaiveDateTime) -> Self {
    Self(dt.date())
  }
}

impl<Tz: TimeZone> From<DateTime<Tz>>
  for DateOnly
{
  fn from(dt: DateTime<Tz>) -> Self {
    Self(dt.date_naive())
  }
}

impl From<DateOnly> for NaiveDate {
  fn from(date: DateOnly) -> Self {
    date.0
  }
}

impl fmt::Display for DateOnly {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}",
      self.0.format("%Y-%m-%d")
    )
  }
}

impl FromStr for DateOnly {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    parse_date_like(s).ok_or_else(|| {
      anyhow!(
        "expected a date like \
         YYYY-MM-DD, got: {s}"
      )
    })
  }
}

/// First day of `month` in `year`, with
/// months outside 1..=12 carried into
/// neighbouring years (month 0 is the
/// previous December, month 13 the next
/// January).
#[must_use]
pub fn month_start(
  year: i32,
  month: i64
) -> Option<DateOnly> {
  let total = i64::from(year)
    .checked_mul(12)?
    .checked_add(month.checked_sub(1)?)?;
  let year =
    i32::try_from(total.div_euclid(12))
      .ok()?;
  let month =
    u32::try_from(total.rem_euclid(12))
      .ok()?
      + 1;
  DateOnly::from_ymd(year, month, 1)
}

/// Shift a display month by `amount`
/// months, returning the first day of
/// the target month.
#[must_use]
pub fn shift_month(
  year: i32,
  month: u32,
  amount: i64
) -> Option<DateOnly> {
  month_start(
    year,
    i64::from(month).checked_add(amount)?
  )
}

/// Number of days in the month starting
/// at `first`.
#[must_use]
pub fn days_in_month(
  first: DateOnly
) -> u32 {
  match shift_month(
    first.year(),
    first.month(),
    1
  ) {
    | Some(next) => {
      next.add_days(-1).day()
    }
    // Only reachable at the end of
    // chrono's range, which is December.
    | None => 31
  }
}

/// Lenient conversion of a textual
/// host value into a [`DateOnly`].
///
/// Accepts ISO dates, RFC 3339
/// timestamps (truncated to their own
/// local date) and naive datetimes.
/// Epoch milliseconds are only taken
/// from JSON numbers.
#[must_use]
pub fn parse_date_like(
  raw: &str
) -> Option<DateOnly> {
  let token = raw.trim();
  if token.is_empty() {
    return None;
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Some(DateOnly(date));
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Some(DateOnly::from(dt));
  }

  NAIVE_DATETIME_FORMATS
    .iter()
    .find_map(|format| {
      NaiveDateTime::parse_from_str(
        token, format
      )
      .ok()
    })
    .map(DateOnly::from)
}

/// Convert a JSON host value. Anything
/// that is not a recognisable date is
/// treated as unset.
#[must_use]
pub fn from_json_value(
  value: &Value
) -> Option<DateOnly> {
  let parsed = match value {
    | Value::Null => return None,
    | Value::String(raw) => {
      parse_date_like(raw)
    }
    | Value::Number(number) => {
      number
        .as_i64()
        .and_then(
          DateOnly::from_epoch_millis
        )
    }
    | _ => None
  };

  if parsed.is_none() {
    tracing::warn!(
      value = %value,
      "ignoring unrecognised date value"
    );
  }
  parsed
}

/// `deserialize_with` helper for
/// optional, loosely typed date fields.
pub fn deserialize_lenient<'de, D>(
  deserializer: D
) -> Result<Option<DateOnly>, D::Error>
where
  D: Deserializer<'de>
{
  let raw =
    Option::<Value>::deserialize(
      deserializer
    )?;
  Ok(raw.as_ref().and_then(from_json_value))
}
