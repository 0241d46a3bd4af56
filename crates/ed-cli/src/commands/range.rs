use ed_core::period::{DateRange, PeriodSelection};

/// Run the `range` subcommand: show what a period resolves to right now.
pub fn run(period: PeriodSelection) {
    print!("{}", describe(period, &period.resolve()));
}

pub fn describe(period: PeriodSelection, range: &DateRange) -> String {
    let params = range.params();
    format!(
        "{} ({})\n  start: {}\n  end:   {}\n",
        period.label(),
        period.id(),
        params.start_iso(),
        params.end_iso()
    )
}
