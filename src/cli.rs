use std::{
    fs,
    num::{NonZeroU32, NonZeroUsize},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand, ValueEnum};
use enumset::EnumSet;
use ratelens::{
    prelude::*,
    results::{DEFAULT_ANALYSIS_YEAR, Overlay},
    tariff::PeriodNumbering,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a tariff into time-of-use periods, seasons and tier rates.
    #[clap(name = "tariff")]
    Tariff(Box<TariffArgs>),

    /// Resample the optimizer results into a chart-ready day.
    #[clap(name = "daily")]
    Daily(Box<DailyArgs>),

    /// Sum the optimizer results into monthly energy per source.
    #[clap(name = "monthly")]
    Monthly(Box<MonthlyArgs>),
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum Format {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Parser)]
pub struct OutputArgs {
    #[clap(long, env = "OUTPUT_FORMAT", value_enum, default_value = "table")]
    pub format: Format,
}

#[derive(Parser)]
pub struct DocumentArgs {
    /// Path to the downloaded JSON document.
    pub path: PathBuf,
}

impl DocumentArgs {
    pub fn read(&self) -> Result<String> {
        read_document(&self.path)
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}

#[derive(Parser)]
pub struct TariffArgs {
    #[clap(flatten)]
    pub document: DocumentArgs,

    /// Rate label to pick from a listing. The first listed rate is used otherwise.
    #[clap(long, env = "TARIFF_LABEL")]
    pub label: Option<String>,

    /// How the schedule matrices number their periods.
    #[clap(long, env = "SCHEDULE_NUMBERING", value_enum, default_value = "one-based")]
    pub numbering: PeriodNumbering,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct DailyArgs {
    #[clap(flatten)]
    pub document: DocumentArgs,

    /// 0-based day of the year.
    #[clap(long = "day", env = "DAY_INDEX", default_value = "0")]
    pub day_index: usize,

    #[clap(long = "days", env = "N_DAYS", default_value = "1")]
    pub n_days: NonZeroUsize,

    /// Overrides the resolution declared by the results.
    #[clap(long, env = "TIME_STEPS_PER_HOUR")]
    pub time_steps_per_hour: Option<NonZeroU32>,

    #[clap(long, env = "ANALYSIS_YEAR", default_value_t = DEFAULT_ANALYSIS_YEAR)]
    pub analysis_year: i32,

    #[clap(
        long = "overlays",
        env = "OVERLAYS",
        value_delimiter = ',',
        num_args = 0..,
        default_value = "utility-residual,charging,exports",
    )]
    pub overlays: Vec<Overlay>,

    #[clap(flatten)]
    pub output: OutputArgs,
}

impl DailyArgs {
    #[must_use]
    pub fn overlays(&self) -> EnumSet<Overlay> {
        self.overlays.iter().copied().collect()
    }
}

#[derive(Parser)]
pub struct MonthlyArgs {
    #[clap(flatten)]
    pub document: DocumentArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}
