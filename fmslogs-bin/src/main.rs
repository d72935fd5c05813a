use anyhow::{Result, anyhow, bail};
use clap::Parser;
use fmslogs_catalog::LogCatalog;
use fmslogs_engine::{
    DisplayOptions, FollowTarget, LineFilter, LogInstant, WindowMode, WindowRequest, print_window,
    start_follow,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::{self, Write};
use std::path::PathBuf;

/// View FileMaker Server logs.
#[derive(Parser)]
#[command(name = "fmslogs", version, about = "View FileMaker Server logs")]
struct Cli {
    /// Only print lines matching this regular expression
    #[arg(short = 'f', long, value_name = "REGEX")]
    filter: Option<String>,

    /// Print the start of each log instead of the end
    #[arg(long)]
    head: bool,

    /// Number of lines to print (default: terminal rows - 1)
    #[arg(short = 'n', long, value_name = "NUM")]
    lines: Option<usize>,

    /// Start at the first line at or after this timestamp
    /// (e.g. "2025-10-15 12:30:00", "2025-10-15 12:30" or "2025-10-15")
    #[arg(long, value_name = "TIMESTAMP", conflicts_with = "head")]
    since: Option<String>,

    /// List all log files with size and modification time
    #[arg(short = 'l', long)]
    list: bool,

    /// List log names supported by the command with their expected paths
    #[arg(short = 'L', long)]
    lognames: bool,

    /// Combine output of two or more logs
    #[arg(short = 'm', long)]
    merge: bool,

    /// Strip less useful details (timezone, redundant hostname) from output
    #[arg(short = 's', long)]
    succinct: bool,

    /// Wait for new messages after printing the current end of each log
    #[arg(short = 't', long)]
    tail: bool,

    /// Cut off output beyond the width of the screen
    #[arg(long)]
    truncate: bool,

    /// Override the FileMaker Server install directory
    #[arg(long, value_name = "PATH")]
    base_path: Option<PathBuf>,

    /// Verbose internal logging on stderr
    #[arg(long)]
    debug: bool,

    /// Logs to display
    #[arg(value_name = "LOG")]
    logs: Vec<String>,
}

fn parse_since(text: &str) -> Result<LogInstant> {
    use chrono::{NaiveDate, NaiveDateTime};

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(instant);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        && let Some(instant) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(instant);
    }
    Err(anyhow!("unrecognized timestamp: {text}"))
}

/// terminal geometry, with a sane fallback when not attached to a terminal
fn screen_size() -> (usize, usize) {
    match crossterm::terminal::size() {
        Ok((cols, rows)) => (cols as usize, rows as usize),
        Err(_) => (80, 24),
    }
}

fn main() -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("error installing color_eyre: {e}"))?;
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let catalog = LogCatalog::new(cli.base_path.clone());
    log::debug!("deployment root: {}", catalog.base_path().display());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.lognames {
        catalog.list_log_names(&mut out)?;
        return Ok(());
    }
    if cli.list {
        catalog.list_logs(&mut out)?;
        return Ok(());
    }
    if cli.merge {
        bail!("--merge is not implemented");
    }
    if cli.logs.is_empty() {
        bail!("no log specified; use --lognames to see what is supported");
    }

    // compile the filter once, before any file is touched
    let filter = match &cli.filter {
        Some(pattern) => LineFilter::compile(pattern)?,
        None => LineFilter::match_all(),
    };

    let (cols, rows) = screen_size();
    let limit = cli.lines.unwrap_or_else(|| rows.saturating_sub(1).max(1));

    let mode = if let Some(since) = &cli.since {
        WindowMode::FromTimestamp(parse_since(since)?)
    } else if cli.head {
        WindowMode::Head
    } else {
        WindowMode::TailCount
    };
    let request = WindowRequest::new(mode, limit, filter.clone())?;

    let opts = DisplayOptions {
        succinct: cli.succinct,
        truncate_width: cli.truncate.then_some(cols),
        ..DisplayOptions::default()
    };

    // resolve every name before printing anything; a bad identifier is fatal
    let targets = cli
        .logs
        .iter()
        .map(|name| catalog.resolve(name))
        .collect::<Result<Vec<_>, _>>()?;

    for target in &targets {
        let header = if cli.succinct {
            target.layout.succinct_header.or(target.layout.header)
        } else {
            target.layout.header
        };
        if let Some(header) = header {
            writeln!(out, "{header}")?;
        }
        print_window(&target.path, &target.layout, &request, &opts, &mut out)?;
    }

    if cli.tail {
        let follow_targets = targets
            .iter()
            .map(|t| FollowTarget {
                path: t.path.clone(),
                layout: t.layout,
            })
            .collect();
        let handle = start_follow(follow_targets, &filter, &opts, None);
        // runs until interrupted; every emitted line is already filtered
        // and formatted by its own log's layout
        for line in handle.receiver().iter() {
            writeln!(out, "{line}")?;
        }
    }

    Ok(())
}
