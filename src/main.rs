mod cli;
mod error;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use showcopy_cache::{CompatibilityCache, KeyResolver, ShowRegistry};
use showcopy_config::Config;
use showcopy_library::{Copier, Report};
use showcopy_probe::{MediaInfo, Profile};
use std::process::ExitCode;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::builder().with_default_directive(cli.level().into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(&cli) {
        Ok(report) => {
            for path in &report.copied {
                println!("{}", path.display());
            }
            if report.copied.len() < cli.count {
                tracing::warn!(
                    requested = cli.count,
                    copied = report.copied.len(),
                    "Ran out of compatible episodes"
                );
            }
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<Report> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let resolver = KeyResolver::new(config.library.clone(), Rc::new(ShowRegistry::new()));
    let mut cache = CompatibilityCache::open(&config.cache_file, resolver).or_raise(|| ErrorKind::Cache)?;
    let oracle = MediaInfo::discover(Profile::dvp3850()).or_raise(|| ErrorKind::Probe)?;
    let copier = Copier::new(config.library, config.target).shuffle(!cli.ordered);
    copier.run(&mut cache, &oracle, &cli.shows, cli.count, &mut rand::rng()).or_raise(|| ErrorKind::Copy)
}
