use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::date_only::DateOnly;
use crate::navigator::HostInputs;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "calgrid",
    version,
    about = "Month-grid calendar view-model: builds the 42-day grid and applies navigation and picks",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Pin "today" instead of reading the clock.
    #[arg(
        long = "today",
        global = true,
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>())
    )]
    pub today: Option<DateOnly>,

    #[command(flatten)]
    pub state: StateArgs,

    #[command(subcommand)]
    pub action: Option<Action>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StateArgs {
    #[arg(long = "year", global = true, allow_negative_numbers = true)]
    pub year: Option<i32>,

    #[arg(long = "month", global = true)]
    pub month: Option<u32>,

    #[arg(
        long = "min",
        global = true,
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>())
    )]
    pub min: Option<DateOnly>,

    #[arg(
        long = "max",
        global = true,
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>())
    )]
    pub max: Option<DateOnly>,

    #[arg(
        long = "selected",
        global = true,
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>())
    )]
    pub selected: Option<DateOnly>,

    #[arg(
        long = "start",
        global = true,
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>())
    )]
    pub start: Option<DateOnly>,

    #[arg(
        long = "end",
        global = true,
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>())
    )]
    pub end: Option<DateOnly>,

    /// First day of the week, 0 = Sunday. Overrides config and locale.
    #[arg(long = "first-day", global = true, allow_negative_numbers = true)]
    pub first_day: Option<i64>,
}

impl StateArgs {
    /// Command-line flags win over the config file's override.
    pub fn host_inputs(&self, configured_first_day: Option<i64>) -> HostInputs {
        HostInputs {
            min_date: self.min,
            max_date: self.max,
            selected_date: self.selected,
            selected_start: self.start,
            selected_end: self.end,
            display_month: self.month,
            display_year: self.year,
            first_day_of_week: self.first_day.or(configured_first_day),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print the initial grid.
    Show,
    /// Move the display by N months (negative goes back).
    Shift {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Display the month containing DATE.
    Goto {
        #[arg(value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>()))]
        date: DateOnly,
    },
    /// Pick the visible cell for DATE.
    Pick {
        #[arg(value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DateOnly>()))]
        date: DateOnly,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Shift { .. } => "shift",
            Self::Goto { .. } => "goto",
            Self::Pick { .. } => "pick",
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
