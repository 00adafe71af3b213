use serde::{
  Deserialize,
  Serialize
};

use crate::date_only::{
  DateOnly,
  days_in_month,
  month_start,
  shift_month
};

pub const GRID_ROWS: usize = 6;
pub const GRID_COLUMNS: usize = 7;
pub const GRID_CELLS: usize =
  GRID_ROWS * GRID_COLUMNS;

/// Inclusive selectable window. A
/// missing side is unbounded.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
  pub min_date: Option<DateOnly>,
  pub max_date: Option<DateOnly>
}

impl Bounds {
  #[must_use]
  pub fn contains(
    &self,
    date: DateOnly
  ) -> bool {
    self
      .min_date
      .is_none_or(|min| date >= min)
      && self
        .max_date
        .is_none_or(|max| date <= max)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
  pub selected_date:  Option<DateOnly>,
  pub selected_start: Option<DateOnly>,
  pub selected_end:   Option<DateOnly>
}

impl Selection {
  /// The closed range, present only when
  /// both endpoints are set.
  #[must_use]
  pub fn active_range(
    &self
  ) -> Option<(DateOnly, DateOnly)> {
    self
      .selected_start
      .zip(self.selected_end)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
  pub date:             DateOnly,
  pub sort_key:         i64,
  pub day_number:       u32,
  pub is_current_month: bool,
  pub is_today:         bool,
  pub is_selected:      bool,
  pub is_span_start:    bool,
  pub is_span_end:      bool,
  pub is_in_span:       bool,
  pub is_selectable:    bool
}

impl DayCell {
  /// Leading or trailing cell borrowed
  /// from an adjacent month.
  #[must_use]
  pub fn is_padding(&self) -> bool {
    !self.is_current_month
  }
}

/// Everything the grid depends on.
/// `display_month` is 1-based; values
/// outside 1..=12 roll into adjacent
/// years rather than failing.
#[derive(Debug, Clone, Copy)]
pub struct GridRequest {
  pub display_year:      i32,
  pub display_month:     u32,
  pub first_day_of_week: u32,
  pub bounds:            Bounds,
  pub today:             DateOnly,
  pub selection:         Selection
}

/// Number of previous-month cells shown
/// before the 1st. Never zero: when the
/// month starts exactly on the first day
/// of the week a whole row of the
/// previous month is shown instead.
#[must_use]
pub fn leading_days(
  first_weekday: u32,
  first_day_of_week: u32
) -> u32 {
  let leading = (first_weekday % 7 + 7
    - first_day_of_week % 7)
    % 7;
  if leading == 0 { 7 } else { leading }
}

fn make_cell(
  request: &GridRequest,
  date: DateOnly,
  is_current_month: bool
) -> DayCell {
  let (is_span_start, is_span_end, is_in_span) =
    match request.selection.active_range()
    {
      | Some((start, end)) => {
        (
          date == start,
          date == end,
          start <= date && date <= end
        )
      }
      | None => (false, false, false)
    };

  DayCell {
    date,
    sort_key: date.sort_key(),
    day_number: date.day(),
    is_current_month,
    is_today: date == request.today,
    is_selected: request
      .selection
      .selected_date
      == Some(date),
    is_span_start,
    is_span_end,
    is_in_span,
    is_selectable: request
      .bounds
      .contains(date)
  }
}

fn push_month_cells(
  days: &mut Vec<DayCell>,
  request: &GridRequest,
  month_first: Option<DateOnly>,
  day_numbers: std::ops::RangeInclusive<
    u32
  >,
  is_current_month: bool
) {
  let Some(month_first) = month_first
  else {
    return;
  };

  days.extend(day_numbers.filter_map(
    |day| {
      DateOnly::from_ymd(
        month_first.year(),
        month_first.month(),
        day
      )
      .map(|date| {
        make_cell(
          request,
          date,
          is_current_month
        )
      })
    }
  ));
}

/// Build the 6x7 day grid for the
/// requested month.
#[tracing::instrument(
  skip(request),
  fields(
    year = request.display_year,
    month = request.display_month,
    first_day = request.first_day_of_week
  )
)]
#[must_use]
pub fn build_grid(
  request: &GridRequest
) -> Vec<DayCell> {
  let Some(first) = month_start(
    request.display_year,
    i64::from(request.display_month)
  ) else {
    tracing::warn!(
      "display month outside the \
       supported date range; grid left \
       empty"
    );
    return Vec::new();
  };

  let previous_first = shift_month(
    first.year(),
    first.month(),
    -1
  );
  let next_first =
    shift_month(first.year(), first.month(), 1);

  let days_in_current =
    days_in_month(first);
  let days_in_previous = previous_first
    .map(days_in_month)
    .unwrap_or(0);
  let leading = leading_days(
    first.weekday_index(),
    request.first_day_of_week
  );
  let trailing = (GRID_CELLS as u32)
    .saturating_sub(
      leading + days_in_current
    );

  let mut days =
    Vec::with_capacity(GRID_CELLS);
  push_month_cells(
    &mut days,
    request,
    previous_first,
    (days_in_previous + 1)
      .saturating_sub(leading)
      ..=days_in_previous,
    false
  );
  push_month_cells(
    &mut days,
    request,
    Some(first),
    1..=days_in_current,
    true
  );
  push_month_cells(
    &mut days,
    request,
    next_first,
    1..=trailing,
    false
  );

  tracing::debug!(
    leading,
    current = days_in_current,
    trailing,
    total = days.len(),
    "built calendar grid"
  );
  days
}
