use chrono::{
  Local,
  Utc
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

use crate::date_only::{
  DateOnly,
  deserialize_lenient,
  shift_month
};
use crate::grid::{
  Bounds,
  DayCell,
  GridRequest,
  Selection,
  build_grid
};
use crate::locale::{
  LocaleTable,
  MonthLabel,
  WeekdayLabel,
  normalize_locale
};

/// Source of "today" for grid rebuilds.
pub trait Clock {
  fn today(&self) -> DateOnly;
}

/// Wall clock, read in the local zone or
/// in a configured IANA timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
  timezone: Option<Tz>
}

impl SystemClock {
  #[must_use]
  pub fn new(
    timezone: Option<Tz>
  ) -> Self {
    Self { timezone }
  }
}

impl Clock for SystemClock {
  fn today(&self) -> DateOnly {
    match self.timezone {
      | Some(tz) => {
        DateOnly::from(
          Utc::now().with_timezone(&tz)
        )
      }
      | None => DateOnly::from(Local::now())
    }
  }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateOnly);

impl Clock for FixedClock {
  fn today(&self) -> DateOnly {
    self.0
  }
}

/// Receives the "selection changed"
/// notification after a successful pick.
/// The host reads the new selection back
/// from the state.
pub trait SelectionListener {
  fn selection_changed(&mut self);
}

impl<F: FnMut()> SelectionListener for F {
  fn selection_changed(&mut self) {
    self()
  }
}

/// Values the host binds into a widget
/// on mount. Date fields accept any
/// representation understood by
/// [`crate::date_only::from_json_value`];
/// unrecognised values are treated as
/// unset.
#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct HostInputs {
  #[serde(
    default,
    deserialize_with = "deserialize_lenient"
  )]
  pub min_date:          Option<DateOnly>,
  #[serde(
    default,
    deserialize_with = "deserialize_lenient"
  )]
  pub max_date:          Option<DateOnly>,
  #[serde(
    default,
    deserialize_with = "deserialize_lenient"
  )]
  pub selected_date:     Option<DateOnly>,
  #[serde(
    default,
    deserialize_with = "deserialize_lenient"
  )]
  pub selected_start:    Option<DateOnly>,
  #[serde(
    default,
    deserialize_with = "deserialize_lenient"
  )]
  pub selected_end:      Option<DateOnly>,
  /// 1-based; Jan = 1.
  #[serde(default)]
  pub display_month:     Option<u32>,
  #[serde(default)]
  pub display_year:      Option<i32>,
  /// Explicit first day of the week,
  /// 0 = Sunday.
  #[serde(default)]
  pub first_day_of_week: Option<i64>
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PickOutcome {
  /// The cell was not selectable.
  Ignored,
  /// Selected inside the displayed
  /// month.
  Selected,
  /// Selected a padding cell and moved
  /// the display to its month.
  SelectedAndNavigated
}

/// View-model for one mounted calendar
/// widget.
///
/// Every mutating call leaves
/// `days` rebuilt for the current
/// display month and selection before it
/// returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarGridState<
  C = SystemClock
> {
  #[serde(skip)]
  instance_id:        Uuid,
  display_year:       i32,
  display_month:      u32,
  #[serde(flatten)]
  bounds:             Bounds,
  #[serde(flatten)]
  selection:          Selection,
  first_day_of_week:  u32,
  today:              DateOnly,
  months:             Vec<MonthLabel>,
  days_of_week:       Vec<WeekdayLabel>,
  days:               Vec<DayCell>,
  #[serde(skip)]
  first_day_override: Option<i64>,
  #[serde(skip)]
  clock:              C
}

impl<C: Clock> CalendarGridState<C> {
  /// Mount a widget: normalise the
  /// locale, default the display month to
  /// today's when the host did not supply
  /// both year and month, and build the
  /// first grid.
  #[tracing::instrument(
    skip(inputs, locale, clock)
  )]
  pub fn init(
    inputs: HostInputs,
    locale: &LocaleTable,
    clock: C
  ) -> Self {
    let today = clock.today();
    let labels = normalize_locale(
      locale,
      inputs.first_day_of_week
    );
    let (display_year, display_month) =
      match (
        inputs.display_year,
        inputs.display_month
      ) {
        | (Some(year), Some(month)) => {
          (year, month)
        }
        | _ => (today.year(), today.month())
      };

    let mut state = Self {
      instance_id: Uuid::new_v4(),
      display_year,
      display_month,
      bounds: Bounds {
        min_date: inputs.min_date,
        max_date: inputs.max_date
      },
      selection: Selection {
        selected_date:  inputs
          .selected_date,
        selected_start: inputs
          .selected_start,
        selected_end:   inputs
          .selected_end
      },
      first_day_of_week: labels
        .first_day_of_week,
      today,
      months: labels.months,
      days_of_week: labels.days_of_week,
      days: Vec::new(),
      first_day_override: inputs
        .first_day_of_week,
      clock
    };

    tracing::info!(
      instance = %state.instance_id,
      display_year,
      display_month,
      first_day_of_week = state.first_day_of_week,
      range_active = state
        .selection
        .active_range()
        .is_some(),
      "calendar widget mounted"
    );
    state.rebuild();
    state
  }

  #[must_use]
  pub fn instance_id(&self) -> Uuid {
    self.instance_id
  }

  #[must_use]
  pub fn display_year(&self) -> i32 {
    self.display_year
  }

  #[must_use]
  pub fn display_month(&self) -> u32 {
    self.display_month
  }

  #[must_use]
  pub fn bounds(&self) -> Bounds {
    self.bounds
  }

  #[must_use]
  pub fn selection(&self) -> Selection {
    self.selection
  }

  #[must_use]
  pub fn selected_date(
    &self
  ) -> Option<DateOnly> {
    self.selection.selected_date
  }

  #[must_use]
  pub fn first_day_of_week(&self) -> u32 {
    self.first_day_of_week
  }

  #[must_use]
  pub fn today(&self) -> DateOnly {
    self.today
  }

  #[must_use]
  pub fn months(&self) -> &[MonthLabel] {
    &self.months
  }

  #[must_use]
  pub fn days_of_week(
    &self
  ) -> &[WeekdayLabel] {
    &self.days_of_week
  }

  #[must_use]
  pub fn days(&self) -> &[DayCell] {
    &self.days
  }

  /// The grid cell showing `date`, if it
  /// is on screen.
  #[must_use]
  pub fn cell_for(
    &self,
    date: DateOnly
  ) -> Option<&DayCell> {
    self
      .days
      .iter()
      .find(|cell| cell.date == date)
  }

  #[must_use]
  pub fn grid_request(
    &self
  ) -> GridRequest {
    GridRequest {
      display_year:      self.display_year,
      display_month:     self
        .display_month,
      first_day_of_week: self
        .first_day_of_week,
      bounds:            self.bounds,
      today:             self.today,
      selection:         self.selection
    }
  }

  fn rebuild(&mut self) {
    self.today = self.clock.today();
    self.days =
      build_grid(&self.grid_request());
  }

  /// Show the month containing `date`.
  /// Selection is left untouched.
  #[tracing::instrument(
    skip(self, date),
    fields(instance = %self.instance_id, date = %date)
  )]
  pub fn change_to_month(
    &mut self,
    date: DateOnly
  ) {
    self.display_year = date.year();
    self.display_month = date.month();
    tracing::info!(
      display_year = self.display_year,
      display_month = self.display_month,
      "changed display month"
    );
    self.rebuild();
  }

  /// Move the display by `amount` months
  /// in either direction, crossing year
  /// boundaries as needed.
  #[tracing::instrument(
    skip(self),
    fields(instance = %self.instance_id)
  )]
  pub fn change_month_by(
    &mut self,
    amount: i64
  ) {
    match shift_month(
      self.display_year,
      self.display_month,
      amount
    ) {
      | Some(target) => {
        self.change_to_month(target)
      }
      | None => {
        tracing::warn!(
          display_year = self.display_year,
          display_month = self.display_month,
          "month shift leaves the \
           supported date range; ignoring"
        );
      }
    }
  }

  /// Apply a user pick. Non-selectable
  /// cells are ignored. Picking a padding
  /// cell also moves the display to that
  /// cell's month. The listener fires once
  /// per successful pick, after the state
  /// is fully updated.
  #[tracing::instrument(
    skip(self, cell, listener),
    fields(instance = %self.instance_id, date = %cell.date)
  )]
  pub fn pick_day<L>(
    &mut self,
    cell: &DayCell,
    listener: &mut L
  ) -> PickOutcome
  where
    L: SelectionListener + ?Sized
  {
    if !cell.is_selectable {
      tracing::debug!(
        "ignoring pick on unselectable \
         day"
      );
      return PickOutcome::Ignored;
    }

    self.selection.selected_date =
      Some(cell.date);

    let outcome = if cell.is_padding() {
      self.change_to_month(cell.date);
      PickOutcome::SelectedAndNavigated
    } else {
      self.rebuild();
      PickOutcome::Selected
    };

    tracing::info!(
      ?outcome,
      "day picked"
    );
    listener.selection_changed();
    outcome
  }

  pub fn set_selected_date(
    &mut self,
    date: Option<DateOnly>
  ) {
    self.selection.selected_date = date;
    self.rebuild();
  }

  pub fn set_selected_range(
    &mut self,
    start: Option<DateOnly>,
    end: Option<DateOnly>
  ) {
    self.selection.selected_start = start;
    self.selection.selected_end = end;
    self.rebuild();
  }

  pub fn set_bounds(
    &mut self,
    bounds: Bounds
  ) {
    self.bounds = bounds;
    self.rebuild();
  }

  /// Swap locale tables. The first day of
  /// the week may change, so the grid is
  /// rebuilt.
  #[tracing::instrument(
    skip(self, locale),
    fields(instance = %self.instance_id)
  )]
  pub fn set_locale(
    &mut self,
    locale: &LocaleTable,
    first_day_override: Option<i64>
  ) {
    let labels = normalize_locale(
      locale,
      first_day_override
    );
    self.first_day_override =
      first_day_override;
    self.first_day_of_week =
      labels.first_day_of_week;
    self.months = labels.months;
    self.days_of_week =
      labels.days_of_week;
    self.rebuild();
  }

  #[must_use]
  pub fn first_day_override(
    &self
  ) -> Option<i64> {
    self.first_day_override
  }
}
