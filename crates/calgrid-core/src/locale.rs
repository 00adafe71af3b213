use serde::{
  Deserialize,
  Deserializer,
  Serialize
};
use serde_json::Value;

const MONTHS_IN_YEAR: usize = 12;
const DAYS_IN_WEEK: usize = 7;

/// Raw locale data as supplied by the
/// host.
///
/// `day_names` is Sunday-first.
/// `first_day_of_week` follows the
/// Monday-based convention (0 = Monday,
/// 6 = Sunday).
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct LocaleTable {
  #[serde(default)]
  pub month_names:       Vec<String>,
  #[serde(default)]
  pub short_month_names: Vec<String>,
  #[serde(default)]
  pub day_names:         Vec<String>,
  #[serde(
    default,
    deserialize_with = "deserialize_first_day"
  )]
  pub first_day_of_week: Option<i64>
}

/// Only integers count as a locale first
/// day; anything else is dropped so the
/// labels survive.
fn deserialize_first_day<'de, D>(
  deserializer: D
) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>
{
  let raw =
    Option::<Value>::deserialize(
      deserializer
    )?;
  Ok(raw.and_then(|value| {
    let day = value.as_i64();
    if day.is_none() && !value.is_null()
    {
      tracing::warn!(
        value = %value,
        "ignoring non-integer locale \
         first_day_of_week"
      );
    }
    day
  }))
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct MonthLabel {
  pub full_name:  String,
  pub short_name: String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayLabel {
  pub full_name:    String,
  pub first_letter: String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLocale {
  pub months:            Vec<MonthLabel>,
  pub days_of_week:      Vec<WeekdayLabel>,
  pub first_day_of_week: u32
}

impl LocaleTable {
  #[must_use]
  pub fn en_us() -> Self {
    fn owned(
      names: &[&str]
    ) -> Vec<String> {
      names
        .iter()
        .map(|name| (*name).to_string())
        .collect()
    }

    Self {
      month_names:       owned(&[
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December"
      ]),
      short_month_names: owned(&[
        "Jan", "Feb", "Mar", "Apr", "May",
        "Jun", "Jul", "Aug", "Sep", "Oct",
        "Nov", "Dec"
      ]),
      day_names:         owned(&[
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday"
      ]),
      first_day_of_week: Some(6)
    }
  }
}

impl Default for LocaleTable {
  fn default() -> Self {
    Self::en_us()
  }
}

/// Resolve the first day of the week
/// (0 = Sunday).
///
/// An explicit override (Sunday-based)
/// wins. Otherwise the locale's
/// Monday-based value is shifted by one;
/// with neither, the week starts on
/// Sunday.
#[must_use]
pub fn resolve_first_day_of_week(
  locale_value: Option<i64>,
  override_value: Option<i64>
) -> u32 {
  let resolved = match (
    override_value,
    locale_value
  ) {
    | (Some(explicit), _) => {
      explicit.rem_euclid(7)
    }
    | (None, Some(value)) => {
      (value.rem_euclid(7) + 1) % 7
    }
    | (None, None) => 0
  };

  u32::try_from(resolved).unwrap_or(0)
}

fn first_letter(name: &str) -> String {
  name
    .chars()
    .next()
    .map(String::from)
    .unwrap_or_default()
}

fn label_at(
  names: &[String],
  index: usize
) -> String {
  names
    .get(index)
    .cloned()
    .unwrap_or_default()
}

/// Produce month and weekday labels for
/// the grid header. Weekdays are rotated
/// so index 0 is the resolved first day
/// of the week; months stay in calendar
/// order.
#[tracing::instrument(
  skip(table),
  fields(
    locale_first_day = ?table.first_day_of_week
  )
)]
#[must_use]
pub fn normalize_locale(
  table: &LocaleTable,
  override_value: Option<i64>
) -> NormalizedLocale {
  let first_day_of_week =
    resolve_first_day_of_week(
      table.first_day_of_week,
      override_value
    );

  if table.month_names.len()
    != MONTHS_IN_YEAR
    || table.short_month_names.len()
      != MONTHS_IN_YEAR
    || table.day_names.len()
      != DAYS_IN_WEEK
  {
    tracing::warn!(
      months = table.month_names.len(),
      short_months =
        table.short_month_names.len(),
      days = table.day_names.len(),
      "locale table incomplete; missing \
       labels left empty"
    );
  }

  let months = (0..MONTHS_IN_YEAR)
    .map(|index| {
      MonthLabel {
        full_name:  label_at(
          &table.month_names,
          index
        ),
        short_name: label_at(
          &table.short_month_names,
          index
        )
      }
    })
    .collect();

  let start = first_day_of_week as usize;
  let days_of_week = (0..DAYS_IN_WEEK)
    .map(|offset| {
      let full_name = label_at(
        &table.day_names,
        (offset + start) % DAYS_IN_WEEK
      );
      WeekdayLabel {
        first_letter: first_letter(
          &full_name
        ),
        full_name
      }
    })
    .collect();

  tracing::debug!(
    first_day_of_week,
    "normalized locale labels"
  );

  NormalizedLocale {
    months,
    days_of_week,
    first_day_of_week
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn letters(
    locale: &NormalizedLocale
  ) -> Vec<&str> {
    locale
      .days_of_week
      .iter()
      .map(|day| day.first_letter.as_str())
      .collect()
  }

  #[test]
  fn locale_value_is_shifted_to_sunday_based(
  ) {
    assert_eq!(
      resolve_first_day_of_week(
        Some(6),
        None
      ),
      0
    );
    assert_eq!(
      resolve_first_day_of_week(
        Some(0),
        None
      ),
      1
    );
    assert_eq!(
      resolve_first_day_of_week(
        Some(5),
        None
      ),
      6
    );
    assert_eq!(
      resolve_first_day_of_week(
        None, None
      ),
      0
    );
  }

  #[test]
  fn explicit_override_wins() {
    assert_eq!(
      resolve_first_day_of_week(
        Some(6),
        Some(1)
      ),
      1
    );
    assert_eq!(
      resolve_first_day_of_week(
        None,
        Some(-1)
      ),
      6
    );
    assert_eq!(
      resolve_first_day_of_week(
        None,
        Some(9)
      ),
      2
    );
  }

  #[test]
  fn en_us_starts_on_sunday() {
    let locale = normalize_locale(
      &LocaleTable::en_us(),
      None
    );

    assert_eq!(locale.first_day_of_week, 0);
    assert_eq!(locale.months.len(), 12);
    assert_eq!(
      locale.months[0].full_name,
      "January"
    );
    assert_eq!(
      locale.months[11].short_name,
      "Dec"
    );
    assert_eq!(
      letters(&locale),
      vec!["S", "M", "T", "W", "T", "F", "S"]
    );
  }

  #[test]
  fn weekdays_rotate_but_months_do_not() {
    let mut table = LocaleTable::en_us();
    table.first_day_of_week = Some(0);
    let locale =
      normalize_locale(&table, None);

    assert_eq!(locale.first_day_of_week, 1);
    assert_eq!(
      locale.days_of_week[0].full_name,
      "Monday"
    );
    assert_eq!(
      locale.days_of_week[6].full_name,
      "Sunday"
    );
    assert_eq!(
      locale.months[0].full_name,
      "January"
    );
  }

  #[test]
  fn missing_locale_data_defaults_silently(
  ) {
    let table = LocaleTable {
      month_names:       vec![],
      short_month_names: vec![],
      day_names:         vec![
        "Domingo".to_string()
      ],
      first_day_of_week: None
    };
    let locale =
      normalize_locale(&table, None);

    assert_eq!(locale.first_day_of_week, 0);
    assert_eq!(locale.months.len(), 12);
    assert!(locale.months.iter().all(
      |month| month.full_name.is_empty()
        && month.short_name.is_empty()
    ));
    assert_eq!(locale.days_of_week.len(), 7);
    assert_eq!(
      locale.days_of_week[0].first_letter,
      "D"
    );
    assert!(
      locale.days_of_week[1]
        .first_letter
        .is_empty()
    );
  }

  #[test]
  fn first_letter_respects_multibyte_names(
  ) {
    let mut table = LocaleTable::en_us();
    table.day_names[0] =
      "Ñedomingo".to_string();
    let locale =
      normalize_locale(&table, None);

    assert_eq!(
      locale.days_of_week[0].first_letter,
      "Ñ"
    );
  }
}
