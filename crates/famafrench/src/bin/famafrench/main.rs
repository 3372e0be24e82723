//! famafrench CLI.
//!
//! Builds Rm / SMB / HML from stock data and regresses fund returns on them.
//!
//! Usage: `famafrench [--config run.json] <returns|factors|regress|pipeline> [flags]`

mod commands;
mod config;

use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{RunConfig, UniverseFilter};
use famafrench::{
    model::Construction,
    primitives::{Date, ShareBasis},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "famafrench")]
#[command(about = "Fama-French factors and fund exposure regressions", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON run configuration; flags take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// First date, inclusive (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<Date>,

    /// Last date, inclusive (YYYY-MM-DD)
    #[arg(long, global = true)]
    end: Option<Date>,

    /// Output directory
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Fund listing used as the regression universe
    #[arg(long, global = true)]
    instruments: Option<PathBuf>,

    /// Filter on the fund listing, e.g. invest_type=equity
    #[arg(long, global = true, value_parser = UniverseFilter::parse)]
    filter: Option<UniverseFilter>,

    /// Stock listing used as the return step's universe
    #[arg(long, global = true)]
    stock_instruments: Option<PathBuf>,

    /// Filter on the stock listing, e.g. board=main
    #[arg(long, global = true, value_parser = UniverseFilter::parse)]
    stock_filter: Option<UniverseFilter>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConstructionArg {
    /// Size halves and value terciles sorted independently
    SimpleDivide,
    /// Six size / value cells
    #[value(name = "grid2x3")]
    Grid2x3,
}

impl From<ConstructionArg> for Construction {
    fn from(arg: ConstructionArg) -> Self {
        match arg {
            ConstructionArg::SimpleDivide => Self::SimpleDivide,
            ConstructionArg::Grid2x3 => Self::Grid2x3,
        }
    }
}

#[derive(Args)]
struct FactorArgs {
    /// Precomputed stock returns
    #[arg(long)]
    returns: Option<PathBuf>,

    /// Capitalization sort panel (symbol, date, value)
    #[arg(long)]
    cap: Option<PathBuf>,

    /// Price-to-book sort panel (symbol, date, value)
    #[arg(long)]
    pb: Option<PathBuf>,

    /// Construction method
    #[arg(long, value_enum)]
    construction: Option<ConstructionArg>,

    /// Equal-weight group returns
    #[arg(long)]
    equal_weighted: bool,

    /// Shares used as weights: total or free_float
    #[arg(long)]
    share_basis: Option<ShareBasis>,

    /// Minimum securities with a value for a date to form groups
    #[arg(long)]
    min_population: Option<usize>,
}

#[derive(Args)]
struct RegressArgs {
    /// Fund NAV bars
    #[arg(long)]
    nav: Option<PathBuf>,

    /// Factor panel, calculated or downloaded (date, Rm, SMB, HML)
    #[arg(long)]
    factors: Option<PathBuf>,

    /// Market index bars replacing the panel's Rm
    #[arg(long)]
    index: Option<PathBuf>,

    /// Z-score the regressors
    #[arg(long)]
    normalize: bool,

    /// Minimum joined observations per fund
    #[arg(long)]
    min_observations: Option<usize>,

    /// Log each fund's coefficient table (debug level)
    #[arg(long)]
    print_summary: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute stock returns from price bars
    Returns {
        /// Stock bars (date, symbol, close, total_shares, free_float_shares)
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Value column of the bars file
        #[arg(long)]
        price_column: Option<String>,
    },
    /// Construct the factor panel
    Factors(FactorArgs),
    /// Regress fund returns on a factor panel
    Regress(RegressArgs),
    /// Run returns, factors and regress in sequence
    Pipeline {
        /// Stock bars
        #[arg(long)]
        prices: Option<PathBuf>,

        #[command(flatten)]
        factors: FactorArgs,

        #[command(flatten)]
        regress: RegressArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };
    apply_common(&mut config, cli.common);

    match cli.command {
        Commands::Returns { prices, price_column } => {
            override_opt(&mut config.paths.prices, prices);
            if let Some(column) = price_column {
                config.price_column = column;
            }
            commands::returns(&config)?;
        }
        Commands::Factors(args) => {
            apply_factors(&mut config, args);
            commands::factors(&config, None)?;
        }
        Commands::Regress(args) => {
            apply_regress(&mut config, args);
            commands::regress(&config, None)?;
        }
        Commands::Pipeline { prices, factors, regress } => {
            override_opt(&mut config.paths.prices, prices);
            apply_factors(&mut config, factors);
            apply_regress(&mut config, regress);

            let returns = commands::returns(&config)?;
            let factors = commands::factors(&config, Some(returns))?;
            commands::regress(&config, Some(factors))?;
        }
    }
    Ok(())
}

fn override_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn apply_common(config: &mut RunConfig, args: CommonArgs) {
    override_opt(&mut config.start, args.start);
    override_opt(&mut config.end, args.end);
    override_opt(&mut config.paths.out_dir, args.out_dir);
    override_opt(&mut config.paths.instruments, args.instruments);
    override_opt(&mut config.universe, args.filter);
    override_opt(&mut config.paths.stock_instruments, args.stock_instruments);
    override_opt(&mut config.stock_universe, args.stock_filter);
}

fn apply_factors(config: &mut RunConfig, args: FactorArgs) {
    override_opt(&mut config.paths.returns, args.returns);
    override_opt(&mut config.paths.cap, args.cap);
    override_opt(&mut config.paths.pb, args.pb);
    let factors = &mut config.factors;
    if let Some(construction) = args.construction {
        factors.construction = construction.into();
    }
    if args.equal_weighted {
        factors.weighted = false;
    }
    if let Some(basis) = args.share_basis {
        factors.share_basis = basis;
    }
    if let Some(n) = args.min_population {
        factors.sorts.min_population = n;
    }
}

fn apply_regress(config: &mut RunConfig, args: RegressArgs) {
    override_opt(&mut config.paths.nav, args.nav);
    override_opt(&mut config.paths.factors, args.factors);
    override_opt(&mut config.paths.index, args.index);
    let regression = &mut config.regression;
    regression.normalize |= args.normalize;
    regression.print_summary |= args.print_summary;
    if let Some(n) = args.min_observations {
        regression.min_observations = n;
    }
}
