use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    fmt::HourRanges,
    quantity::{power::Kilowatts, rate::Rate},
    results::{MonthlyEnergy, TimeSeriesPoint},
    tariff::{MonthSignature, PeriodTable, Season, TierRow},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn power_cell(power: Kilowatts) -> Cell {
    let cell = Cell::new(power).set_alignment(CellAlignment::Right);
    if power == Kilowatts::ZERO { cell.add_attribute(Attribute::Dim) } else { cell }
}

pub fn build_periods_table<R: Rate>(periods: &PeriodTable<R>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Period", "Label", "Weekday hours", "Weekend hours", "First tier"]);
    for (period, info) in periods {
        let label = info.label.map_or_else(
            || Cell::new("-").add_attribute(Attribute::Dim),
            |label| Cell::new(label).fg(label.color()),
        );
        let rate = info.first_tier_rate.map_or_else(
            || Cell::new("n/a").add_attribute(Attribute::Dim),
            |rate| Cell::new(rate).set_alignment(CellAlignment::Right),
        );
        table.add_row(vec![
            Cell::new(period),
            label,
            Cell::new(HourRanges(&info.weekday_hours)),
            Cell::new(HourRanges(&info.weekend_hours)),
            rate,
        ]);
    }
    table
}

pub fn build_seasons_table(seasons: &[Season<MonthSignature>]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Months", "Label", "Weekday hours", "Weekend hours"]);
    for season in seasons {
        if season.detail.is_empty() {
            table.add_row(vec![
                Cell::new(season.span()),
                Cell::new("-").add_attribute(Attribute::Dim),
                Cell::new(""),
                Cell::new(""),
            ]);
        }
        for (i, (label, hours)) in season.detail.iter().enumerate() {
            let span = if i == 0 { season.span().to_string() } else { String::new() };
            table.add_row(vec![
                Cell::new(span),
                Cell::new(label).fg(label.color()),
                Cell::new(HourRanges(&hours.weekday_hours)),
                Cell::new(HourRanges(&hours.weekend_hours)),
            ]);
        }
    }
    table
}

pub fn build_tiers_table<R: Rate>(tiers: &[TierRow<R>]) -> Table {
    let mut table = new_table();
    let max_header = format!("Max, {}", R::CAP_UNIT);
    table.set_header(vec![
        "Period",
        "Tier",
        "Generation",
        "Delivery",
        "Other",
        "Total",
        max_header.as_str(),
    ]);
    for row in tiers {
        let rate_cell = |rate: R| {
            let cell = Cell::new(rate).set_alignment(CellAlignment::Right);
            if rate == R::ZERO { cell.add_attribute(Attribute::Dim) } else { cell }
        };
        table.add_row(vec![
            Cell::new(row.period),
            Cell::new(row.tier).add_attribute(Attribute::Dim),
            rate_cell(row.generation),
            rate_cell(row.delivery),
            rate_cell(row.other),
            Cell::new(row.total).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
            row.max.map_or_else(
                || Cell::new("∞").add_attribute(Attribute::Dim),
                |max| Cell::new(max).set_alignment(CellAlignment::Right),
            ),
        ]);
    }
    table
}

pub fn build_points_table(points: &[TimeSeriesPoint]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Time", "Load", "Utility", "Solar", "BESS", "Generator", "CHP", "Residual", "Charging",
        "Export", "Net",
    ]);
    for point in points {
        let charging = point.utility_to_bess + point.solar_to_bess + point.genset_to_bess;
        let export = point.solar_export + point.bess_export + point.gen_export;
        table.add_row(vec![
            Cell::new(point.timestamp.format("%b %d %H:%M")),
            power_cell(point.load).add_attribute(Attribute::Bold),
            power_cell(point.utility_to_load),
            power_cell(point.solar_to_load),
            power_cell(point.bess_to_load),
            power_cell(point.genset_to_load),
            power_cell(point.chp_to_load),
            power_cell(point.utility_residual),
            power_cell(charging),
            power_cell(export),
            power_cell(point.net_utility).fg(if point.net_utility > Kilowatts::ZERO {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }
    table
}

pub fn build_monthly_table(months: &[MonthlyEnergy]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Month", "PV", "BESS discharge", "Generator", "CHP"]);
    for month in months {
        table.add_row(vec![
            Cell::new(month.month),
            Cell::new(month.pv_total).set_alignment(CellAlignment::Right).fg(Color::Yellow),
            Cell::new(month.bess_discharge).set_alignment(CellAlignment::Right),
            Cell::new(month.generator).set_alignment(CellAlignment::Right),
            Cell::new(month.chp).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
