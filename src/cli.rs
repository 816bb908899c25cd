use clap::Parser;
use showcopy_library::Selection;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Copy episodes that the DVD player can play from the show library to the
/// target library, picking from every given show in turn.
#[derive(Debug, Parser)]
#[command(name = "showcopy", version, about)]
pub struct Cli {
    /// Shows to copy from. Restrict to a single season with `Show/Season 01`.
    #[arg(required = true, value_name = "SHOW", value_parser = parse_selection)]
    pub shows: Vec<Selection>,
    /// Number of episodes to copy.
    #[arg(short = 'N', long)]
    pub count: usize,
    /// Configuration file [default: $SHOWCOPY_CONFIG, or the platform config directory]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Take episodes in library order instead of shuffling them.
    #[arg(long)]
    pub ordered: bool,
    /// More output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Less output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}
impl Cli {
    /// Default log level; `RUST_LOG` still takes precedence.
    pub fn level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            ..=-2 => LevelFilter::ERROR,
            -1 => LevelFilter::WARN,
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            2.. => LevelFilter::TRACE,
        }
    }
}

fn parse_selection(s: &str) -> Result<Selection, String> {
    s.parse::<Selection>().map_err(|err| (*err).to_string())
}
