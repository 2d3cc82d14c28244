mod cli;

use clap::{Parser, crate_version};
use ratelens::{
    prelude::*,
    quantity::rate::Rate,
    results::{Composer, OptimizerResults, Window, monthly_rollup},
    tables::{
        build_monthly_table,
        build_periods_table,
        build_points_table,
        build_seasons_table,
        build_tiers_table,
    },
    tariff::{RateSchedule, SideDecoding, decode},
};
use serde::Serialize;

use crate::cli::{Args, Command, DailyArgs, DocumentArgs, Format, MonthlyArgs, TariffArgs};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Tariff(args) => tariff(&args),
        Command::Daily(args) => daily(&args),
        Command::Monthly(args) => monthly(&args),
    }
}

fn print_json(value: &impl Serialize) -> Result {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn tariff(args: &TariffArgs) -> Result {
    let json = args.document.read()?;
    let Some(schedule) = RateSchedule::from_json(&json, args.label.as_deref(), args.numbering)?
    else {
        warn!("the listing has no rates");
        println!("No structure available");
        return Ok(());
    };
    let decoding = decode(&schedule);
    info!(
        label = decoding.label.as_deref(),
        name = decoding.name.as_deref(),
        utility = decoding.utility.as_deref(),
        "decoded the tariff",
    );

    match args.output.format {
        Format::Json => print_json(&decoding)?,
        Format::Table => {
            print_side("Energy", &decoding.energy);
            print_side("Demand", &decoding.demand);
        }
    }
    Ok(())
}

fn print_side<R: Rate>(title: &str, side: &SideDecoding<R>) {
    let Some(source) = side.source else {
        println!("{title}: no structure available");
        return;
    };
    println!("{title} ({source:?})");
    println!("{}", build_periods_table(&side.periods));
    if !side.seasons.is_empty() {
        println!("{}", build_seasons_table(&side.seasons));
    }
    println!("{}", build_tiers_table(&side.tiers));
}

/// Load the optimizer results, refusing those the optimizer failed to produce.
fn load_results(document: &DocumentArgs) -> Result<OptimizerResults> {
    let results = OptimizerResults::from_json(&document.read()?)?;
    for error in results.errors() {
        warn!("optimizer error: {error}");
    }
    ensure!(
        results.errors().is_empty(),
        "the optimizer reported {} error(s) instead of results",
        results.errors().len(),
    );
    Ok(results)
}

#[instrument(skip_all, fields(day_index = args.day_index))]
fn daily(args: &DailyArgs) -> Result {
    let results = load_results(&args.document)?;
    let time_steps_per_hour =
        args.time_steps_per_hour.unwrap_or_else(|| results.time_steps_per_hour());
    let max_day_index = results.max_day_index(time_steps_per_hour);
    if args.day_index > max_day_index {
        warn!(max_day_index, "the day is past the end of the results");
    }

    let window = Window::builder()
        .day_index(args.day_index)
        .n_days(args.n_days.get())
        .time_steps_per_hour(time_steps_per_hour)
        .build();
    let points = Composer::builder()
        .results(&results)
        .window(window)
        .overlays(args.overlays())
        .analysis_year(args.analysis_year)
        .compose()?;

    match args.output.format {
        Format::Json => print_json(&points)?,
        Format::Table => println!("{}", build_points_table(&points)),
    }
    Ok(())
}

fn monthly(args: &MonthlyArgs) -> Result {
    let results = load_results(&args.document)?;
    let months = monthly_rollup(&results);
    match args.output.format {
        Format::Json => print_json(&months)?,
        Format::Table => println!("{}", build_monthly_table(&months)),
    }
    Ok(())
}
