use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use covid_analytics::report::{
    format_death_rate, format_efficiency, format_recovery, render_efficiency_chart,
};
use covid_analytics::{CsvTableStore, DeathRateDivisor, Engine, Error, Settings};

#[derive(Parser)]
#[command(name = "covid-analytics", version, about = "Recovery and measure analytics over COVID case data")]
struct Cli {
    /// Config file (defaults to ./covid.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Case table CSV, overrides [sources].cases
    #[arg(long, global = true)]
    cases: Option<PathBuf>,

    /// Measure table CSV, overrides [sources].measures
    #[arg(long, global = true)]
    measures: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Ratio of recovered cases to total cases in one country
    Recovery { country: String },

    /// Average cases-per-death among countries that adopted a measure
    DeathRate {
        measure: String,

        /// all-adopters or retained
        #[arg(long)]
        divisor: Option<DeathRateDivisor>,
    },

    /// Recovery efficiency of the most adopted measures
    Efficiency {
        #[arg(long)]
        top: Option<usize>,

        /// Also render a bar chart to this PNG
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Prompt for a country and a measure, then run all three analyses
    Interactive,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(cases) = cli.cases {
        settings.sources.cases = cases;
    }
    if let Some(measures) = cli.measures {
        settings.sources.measures = measures;
    }
    if let Some(Command::DeathRate {
        divisor: Some(divisor),
        ..
    }) = &cli.command
    {
        settings.analysis.death_rate_divisor = *divisor;
    }

    let store = CsvTableStore::from_paths(&settings.sources.cases, &settings.sources.measures);
    let engine = Engine::from_store(&store, settings.engine_options())?;
    info!(
        cases = engine.cases().len(),
        measures = engine.measures().len(),
        divisor = %engine.options().death_rate_divisor,
        "engine ready"
    );

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Recovery { country } => {
            println!("{}", format_recovery(&country, &engine.recovery_ratio(&country)));
        }
        Command::DeathRate { measure, .. } => {
            println!("{}", format_death_rate(&engine.average_death_rate(&measure)));
        }
        Command::Efficiency { top, chart } => {
            let entries = engine.top_measures_efficiency(top.unwrap_or(settings.analysis.top_k));
            println!("{}", format_efficiency(&entries));
            if let Some(path) = chart.or(settings.report.chart) {
                render_efficiency_chart(&entries, &path)?;
                println!("Chart saved to {}", path.display());
            }
        }
        Command::Interactive => interactive(&engine, settings.analysis.top_k)?,
    }

    Ok(())
}

fn interactive(engine: &Engine, top_k: usize) -> Result<(), Error> {
    let stdin = io::stdin();
    let mut lines = stdin.lock();

    let country = prompt(&mut lines, "enter country name: ")?;
    println!("{}", format_recovery(&country, &engine.recovery_ratio(&country)));

    let measure = prompt(&mut lines, "enter measure: ")?;
    println!("{}", format_death_rate(&engine.average_death_rate(&measure)));

    println!("{}", format_efficiency(&engine.top_measures_efficiency(top_k)));
    Ok(())
}

fn prompt(input: &mut impl BufRead, message: &str) -> Result<String, Error> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    // Strip only the line terminator; names are matched byte-for-byte.
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}
