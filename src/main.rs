mod app;
mod help;
mod jumpto;
mod theme;
mod widget;
use crate::app::App;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use log::{debug, warn};
use rangecal::calendar::RangeCalendar;
use rangecal::config::CalendarConfig;
use rangecal::date::PackedDate;
use rangecal::saved::SavedState;
use rangecal::selection::ClickOnCellBehavior;
use rangecal::yearmonth::YearMonth;
use ratatui::DefaultTerminal;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime, Weekday};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    year_month: Option<YearMonth>,
    min: Option<PackedDate>,
    max: Option<PackedDate>,
    sunday_first: bool,
    hide_adjacent: bool,
    click_clears: bool,
    log: Option<PathBuf>,
    state: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("min") => opts.min = Some(parse_date(parser.value()?)?),
                Arg::Long("max") => opts.max = Some(parse_date(parser.value()?)?),
                Arg::Long("sunday-first") => opts.sunday_first = true,
                Arg::Long("hide-adjacent") => opts.hide_adjacent = true,
                Arg::Long("click-clears") => opts.click_clears = true,
                Arg::Long("log") => opts.log = Some(parser.value()?.into()),
                Arg::Long("state") => opts.state = Some(parser.value()?.into()),
                Arg::Value(value) if opts.year_month.is_none() => {
                    opts.year_month = Some(value.parse()?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => run(opts),
            Command::Help => {
                println!("Usage: rangecal [<options>] [YYYY-MM]");
                println!();
                println!("Month calendar for selecting days, weeks, months & date ranges");
                println!();
                println!("Options:");
                println!("  --min YYYY-MM-DD  Earliest date that can be selected");
                println!("  --max YYYY-MM-DD  Latest date that can be selected");
                println!("  --sunday-first    Start weeks on Sunday instead of Monday");
                println!("  --hide-adjacent   Hide the days of the previous & next month");
                println!("  --click-clears    Selecting the selected day again clears it");
                println!("  --log FILE        Write debug logs to FILE");
                println!("  --state FILE      Restore the selection from FILE & save it on exit");
                println!("  -h, --help        Display this help message and exit");
                println!("  -V, --version     Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn run(opts: Options) -> anyhow::Result<()> {
    if let Some(path) = &opts.log {
        init_logging(path)?;
    }
    let today = OffsetDateTime::now_local()
        .context("failed to determine local date")?
        .date();
    let today = PackedDate::try_from(today).context("local date is out of range")?;
    let config = opts.config();
    let year_month = match opts.year_month {
        Some(ym) => ym,
        None => {
            let (min, max) = config.month_bounds();
            today.year_month().clamp(min, max)
        }
    };
    let mut calendar = RangeCalendar::new(config, Rc::new(widget::grid_measure()), year_month)
        .context("invalid calendar settings")?;
    if let Some(saved) = opts.state.as_deref().map(load_state).transpose()?.flatten() {
        match calendar.restore(&saved) {
            Ok(status) => debug!("Restored saved state: {status:?}"),
            Err(e) => warn!("Ignoring saved state: {e}"),
        }
        if opts.year_month.is_some() {
            calendar
                .set_year_month(year_month)
                .context("invalid calendar settings")?;
        }
    }
    let state = with_terminal(|mut terminal| {
        terminal.hide_cursor().context("failed to hide cursor")?;
        Ok(App::new(calendar, today).run(terminal)?)
    })?;
    if let Some(path) = &opts.state {
        let json = serde_json::to_string_pretty(&state).context("failed to serialize state")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("failed to write state to {}", path.display()))?;
    }
    Ok(())
}

impl Options {
    fn config(&self) -> CalendarConfig {
        let mut config = CalendarConfig::new()
            .show_adjacent_months(!self.hide_adjacent)
            .first_day_of_week(if self.sunday_first {
                Weekday::Sunday
            } else {
                Weekday::Monday
            });
        if let Some(min) = self.min {
            config = config.min_date(min);
        }
        if let Some(max) = self.max {
            config = config.max_date(max);
        }
        if self.click_clears {
            config = config.click_on_selected_cell(ClickOnCellBehavior::Clear);
        }
        config
    }
}

fn parse_date(value: OsString) -> Result<PackedDate, lexopt::Error> {
    value.parse_with(|s| -> Result<PackedDate, Box<dyn std::error::Error + Send + Sync>> {
        let date = Date::parse(s, &YMD_FMT)?;
        Ok(PackedDate::try_from(date)?)
    })
}

/// Sends log records to `path`, since the terminal belongs to the UI
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("rangecal=debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Reads a saved state.  A missing file is not an error.
fn load_state(path: &Path) -> anyhow::Result<Option<SavedState>> {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read state from {}", path.display()))
        }
    };
    serde_json::from_str(&src)
        .map(Some)
        .with_context(|| format!("failed to parse state from {}", path.display()))
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_args(args.iter().copied()))
    }

    #[test]
    fn test_parse_options() {
        let cmd = parse(&[
            "--min",
            "2024-01-15",
            "--sunday-first",
            "--state",
            "cal.json",
            "2024-02",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::Run(Options {
                year_month: Some(YearMonth::new(2024, 2).unwrap()),
                min: Some(PackedDate::new(2024, 1, 15).unwrap()),
                sunday_first: true,
                state: Some(PathBuf::from("cal.json")),
                ..Options::default()
            })
        );
        let Command::Run(opts) = cmd else {
            unreachable!("options were parsed");
        };
        let config = opts.config();
        assert_eq!(config.first_day_of_week, Weekday::Sunday);
        assert_eq!(config.min_date, PackedDate::new(2024, 1, 15).unwrap());
        assert!(config.show_adjacent_months);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--min", "2024-02-30"]).is_err());
        assert!(parse(&["2024-13"]).is_err());
        assert!(parse(&["2024-02", "2024-03"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert_eq!(parse(&["-V", "--bogus"]).unwrap(), Command::Version);
    }

    #[test]
    fn test_missing_state_file() {
        let path = std::env::temp_dir().join("rangecal-no-such-state.json");
        assert!(load_state(&path).unwrap().is_none());
    }
}
