use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use lockin::{
    app::{App, Control, Startup},
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    cue::player_from_settings,
    export::export_sessions,
    logging::init_logging,
    report::{weekday_name, History, PeriodStats, StatsPeriod},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    store::{SessionStore, SqliteStore},
    timer::TimerVariant,
    ui,
    util::format_hours_minutes,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

/// pomodoro-style focus timer that keeps counting into overtime
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A focus timer TUI with Lock In, Small Break and Long Break presets, overtime tracking for Lock In sessions, a monthly calendar report and weekly statistics."
)]
pub struct Cli {
    /// session database location (default: ~/.local/state/lockin/lockin.db)
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// config file location
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// stop Lock In at zero instead of counting overtime
    #[clap(long)]
    no_overtime: bool,

    /// disable audible cues
    #[clap(long)]
    mute: bool,

    /// print statistics for a period and exit
    #[clap(long, value_enum, value_name = "PERIOD")]
    stats: Option<StatsArg>,

    /// write every stored session to a CSV file and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum StatsArg {
    LastWeek,
    LastTwoWeeks,
    LastMonth,
}

impl StatsArg {
    fn as_period(&self) -> StatsPeriod {
        match self {
            StatsArg::LastWeek => StatsPeriod::LastWeek,
            StatsArg::LastTwoWeeks => StatsPeriod::LastTwoWeeks,
            StatsArg::LastMonth => StatsPeriod::LastMonth,
        }
    }
}

impl Cli {
    /// Config file contents with command line overrides applied
    fn resolve_config(&self) -> Config {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        let mut config = store.load();

        if self.no_overtime {
            config.variant = TimerVariant::StopAtZero;
        }
        if self.mute {
            config.cues.muted = true;
        }
        if let Some(db) = &self.db {
            config.database_path = Some(db.clone());
        }
        config
    }

    fn is_headless(&self) -> bool {
        self.stats.is_some() || self.export.is_some()
    }
}

fn database_path(config: &Config) -> PathBuf {
    config
        .database_path
        .clone()
        .or_else(AppDirs::db_path)
        .unwrap_or_else(|| PathBuf::from("lockin.db"))
}

/// Plain-text rendering of period statistics for `--stats`
fn stats_report(period: StatsPeriod, stats: &PeriodStats) -> String {
    let day_or_dash = |day: Option<chrono::Weekday>, seconds: u64| {
        day.map_or("-".to_string(), |d| {
            format!("{} ({})", weekday_name(d), format_hours_minutes(seconds))
        })
    };

    let mut lines = vec![
        format!("{} ({} to {})", period, stats.period_start, stats.period_end),
        format!("Total: {}", format_hours_minutes(stats.total_time_in_period)),
        format!(
            "Overtime: {} ({}%)",
            format_hours_minutes(stats.total_overtime_in_period),
            stats.overtime_percentage
        ),
        format!("Active days: {}", stats.days_with_activity),
        format!(
            "Average per active day: {}",
            format_hours_minutes(stats.average_per_active_day)
        ),
        format!("Best day: {}", day_or_dash(stats.highest_day, stats.highest_avg)),
        format!(
            "Lightest day: {}",
            day_or_dash(Some(stats.lowest_day), stats.lowest_avg)
        ),
        format!(
            "Most overtime: {}",
            day_or_dash(stats.day_with_most_overtime, stats.max_overtime)
        ),
    ];
    lines.extend(stats.weekdays.iter().map(|day| {
        format!(
            "  {:<10} {:>7}  overtime {}",
            weekday_name(day.weekday),
            format_hours_minutes(day.average),
            format_hours_minutes(day.overtime)
        )
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn run_headless(cli: &Cli, store: &dyn SessionStore) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &cli.export {
        let written = export_sessions(store, path)?;
        println!("exported {} sessions to {}", written, path.display());
    }
    if let Some(arg) = cli.stats {
        let period = arg.as_period();
        let history = History::new(store.read_all_sessions()?);
        let stats = history.period_stats(period, SystemClock.today());
        print!("{}", stats_report(period, &stats));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _log_guard = match AppDirs::log_dir().map(|dir| init_logging(&dir)) {
        Some(Ok(guard)) => Some(guard),
        Some(Err(e)) => {
            eprintln!("lockin: logging disabled: {e}");
            None
        }
        None => None,
    };

    let config = cli.resolve_config();
    let db_path = database_path(&config);

    if cli.is_headless() {
        let store = SqliteStore::open(&db_path)?;
        return run_headless(&cli, &store);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store: Box<dyn SessionStore> = match SqliteStore::open(&db_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::error!(path = %db_path.display(), error = %e,
                "could not open session database, history will not be kept");
            Box::new(SqliteStore::open_in_memory()?)
        }
    };
    tracing::info!(path = %db_path.display(), variant = ?config.variant, "starting");

    let startup = Startup::load(store.as_ref());
    let mut app = App::new(
        startup,
        config.variant,
        store,
        player_from_settings(&config.cues),
        Box::new(SystemClock),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // dropping the app waits for queued saves
    drop(app);
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::seconds());

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match app.handle_event(runner.step()) {
            Control::Quit => break,
            Control::Ticker(command) => runner.apply(command),
            Control::Continue => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lockin::preset::Preset;
    use lockin::session::{NewSession, Session};

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["lockin"]);

        assert_eq!(cli.db, None);
        assert_eq!(cli.config, None);
        assert!(!cli.no_overtime);
        assert!(!cli.mute);
        assert_eq!(cli.stats, None);
        assert_eq!(cli.export, None);
        assert!(!cli.is_headless());
    }

    #[test]
    fn test_cli_stats_periods() {
        let cli = Cli::parse_from(["lockin", "--stats", "last-week"]);
        assert_eq!(cli.stats, Some(StatsArg::LastWeek));
        assert!(cli.is_headless());

        let cli = Cli::parse_from(["lockin", "--stats", "last-two-weeks"]);
        assert_eq!(cli.stats.map(|s| s.as_period()), Some(StatsPeriod::LastTwoWeeks));

        let cli = Cli::parse_from(["lockin", "--stats", "last-month"]);
        assert_eq!(cli.stats.map(|s| s.as_period()), Some(StatsPeriod::LastMonth));

        assert!(Cli::try_parse_from(["lockin", "--stats", "last-year"]).is_err());
    }

    #[test]
    fn test_cli_paths() {
        let cli = Cli::parse_from(["lockin", "--db", "/tmp/x.db", "--export", "out.csv"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{"database_path": "/from/file.db", "variant": "overtime", "cues": {"muted": false}}"#,
        )
        .unwrap();
        let config_arg = config_path.to_str().unwrap();

        let cli = Cli::parse_from(["lockin", "--config", config_arg]);
        let config = cli.resolve_config();
        assert_eq!(config.variant, TimerVariant::Overtime);
        assert_eq!(database_path(&config), PathBuf::from("/from/file.db"));

        let cli = Cli::parse_from([
            "lockin",
            "--config",
            config_arg,
            "--no-overtime",
            "--mute",
            "--db",
            "/from/flag.db",
        ]);
        let config = cli.resolve_config();
        assert_eq!(config.variant, TimerVariant::StopAtZero);
        assert!(config.cues.muted);
        assert_eq!(database_path(&config), PathBuf::from("/from/flag.db"));
    }

    #[test]
    fn test_stats_report_text() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let new = NewSession {
            date: today,
            kind: Preset::LockIn,
            duration: 1500,
            completed: true,
            overtime: 660,
            is_partial_completion: false,
        };
        let history = History::new(vec![Session::from_new(
            "a".into(),
            new,
            chrono::Local::now(),
        )]);
        let stats = history.period_stats(StatsPeriod::LastWeek, today);
        let text = stats_report(StatsPeriod::LastWeek, &stats);

        assert!(text.starts_with("Last Week (2024-03-08 to 2024-03-14)"));
        assert!(text.contains("Total: 36m"));
        assert!(text.contains("Overtime: 11m (31%)"));
        assert!(text.contains("Best day: Thursday (36m)"));
        assert!(text.contains("Most overtime: Thursday (11m)"));
        assert_eq!(text.lines().count(), 15);
    }

    #[test]
    fn test_stats_report_empty() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let stats = History::default().period_stats(StatsPeriod::LastWeek, today);
        let text = stats_report(StatsPeriod::LastWeek, &stats);
        assert!(text.contains("Total: 0m"));
        assert!(text.contains("Best day: -"));
        assert!(text.contains("Lightest day: Sunday (0m)"));
    }
}
