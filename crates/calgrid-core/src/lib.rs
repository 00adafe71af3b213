pub mod cli;
pub mod config;
pub mod date_only;
pub mod grid;
pub mod locale;
pub mod navigator;

use std::ffi::OsString;

use anyhow::{
  Context,
  anyhow
};
use clap::Parser;
use serde::Serialize;
use tracing::{
  debug,
  info
};

use crate::cli::Action;
use crate::locale::LocaleTable;
use crate::navigator::{
  CalendarGridState,
  Clock,
  FixedClock,
  HostInputs,
  PickOutcome
};

pub use crate::date_only::DateOnly;
pub use crate::grid::DayCell;

#[derive(Debug, Serialize)]
#[serde(
  rename_all = "camelCase",
  bound = ""
)]
pub struct ActionReport<'a, C> {
  pub action:        &'static str,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub outcome:       Option<PickOutcome>,
  pub notifications: u32,
  pub state:         &'a CalendarGridState<C>
}

/// Mount a widget from `inputs`, apply
/// one host action and return the JSON
/// view-model the host would read back.
#[tracing::instrument(
  skip(inputs, locale, clock)
)]
pub fn execute<C: Clock>(
  inputs: HostInputs,
  locale: &LocaleTable,
  clock: C,
  action: &Action
) -> anyhow::Result<String> {
  let mut state = CalendarGridState::init(
    inputs, locale, clock
  );
  let mut notifications = 0_u32;
  let mut outcome = None;

  match action {
    | Action::Show => {}
    | Action::Shift { amount } => {
      state.change_month_by(*amount);
    }
    | Action::Goto { date } => {
      state.change_to_month(*date);
    }
    | Action::Pick { date } => {
      let cell = state
        .cell_for(*date)
        .copied()
        .ok_or_else(|| {
          anyhow!(
            "{date} is not shown in the \
             {}-{:02} grid",
            state.display_year(),
            state.display_month()
          )
        })?;
      outcome = Some(state.pick_day(
        &cell,
        &mut || {
          notifications += 1;
        }
      ));
    }
  }

  let report = ActionReport {
    action: action.name(),
    outcome,
    notifications,
    state: &state
  };
  serde_json::to_string_pretty(&report)
    .context(
      "failed to serialize calendar \
       state"
    )
}

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting calgrid"
  );

  let cfg = config::CalGridConfig::load(
    cli.config.as_deref()
  )
  .context(
    "failed to load calendar config"
  )?;
  let inputs = cli.state.host_inputs(
    cfg.policies.first_day_of_week
  );
  debug!(?inputs, "resolved host inputs");

  let action = cli
    .action
    .clone()
    .unwrap_or(Action::Show);

  let rendered = match cli.today {
    | Some(today) => {
      execute(
        inputs,
        &cfg.locale,
        FixedClock(today),
        &action
      )?
    }
    | None => {
      execute(
        inputs,
        &cfg.locale,
        cfg.clock(),
        &action
      )?
    }
  };

  println!("{rendered}");
  info!("done");
  Ok(())
}
