use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

use shelf_rank::config::Config;
use shelf_rank::pipeline::RankingRun;
use shelf_rank::scoring::ScoringConfig;

const EXIT_SUCCESS: i32 = 0;
/// Input could not be read, or output could not be written
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Args, Debug, Default)]
struct RankArgs {
    /// Catalog CSV to rank (defaults to paths.input from config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the ranked list as CSV (defaults to paths.output from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of products to keep (0 uses top_n_products from config)
    #[arg(short = 'n', long = "top")]
    top: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Show per-factor contributions under each product
    #[arg(long)]
    explain: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank the catalog (default if no subcommand)
    Rank(RankArgs),
    /// Show one product's detail, rank and score breakdown
    Show {
        /// Product key (SKU, or product name when the catalog has no SKU column)
        key: String,

        /// Catalog CSV (defaults to paths.input from config)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Validate the config and report every problem
    Check,
    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "shelf-rank")]
#[command(about = "Merchandising ranker for product catalogs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/shelf-rank/weights.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load and validate the config, exiting with EXIT_CONFIG on any problem
fn load_scoring(config_path: Option<PathBuf>) -> (Config, ScoringConfig) {
    let config = match shelf_rank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    match shelf_rank::scoring::validate_scoring(&config) {
        Ok(scoring) => (config, scoring),
        Err(errors) => {
            eprintln!("Scoring config errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_CONFIG);
        }
    }
}

/// Load the catalog and run the pipeline, exiting with EXIT_INPUT on failure
fn run(
    config: &Config,
    scoring: &ScoringConfig,
    input: Option<PathBuf>,
    top_n: Option<usize>,
) -> RankingRun {
    let Some(input) = input.or_else(|| config.input_path().cloned()) else {
        eprintln!("No input file. Pass --input or set paths.input in the config:");
        eprintln!("  paths:");
        eprintln!("    input: catalog.csv");
        std::process::exit(EXIT_INPUT);
    };

    let load = match shelf_rank::catalog::load_products_from_path(&input) {
        Ok(load) => load,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    shelf_rank::pipeline::run_pipeline(load, scoring, top_n)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Rank(RankArgs::default()));
    let config_path = cli.config.map(PathBuf::from);
    let start_time = Instant::now();

    match command {
        Commands::Rank(args) => {
            let (config, scoring) = load_scoring(config_path);
            let result = run(&config, &scoring, args.input, args.top);
            let entries = result.snapshot.ranked().entries();
            let use_colors = shelf_rank::output::should_use_colors();

            match args.format {
                OutputFormat::Table if args.explain => {
                    for entry in entries {
                        println!(
                            "{}",
                            shelf_rank::output::format_ranked_table(
                                std::slice::from_ref(entry),
                                use_colors
                            )
                        );
                        println!(
                            "{}",
                            shelf_rank::output::format_breakdown(&entry.scored, use_colors)
                        );
                    }
                    if entries.is_empty() {
                        println!("{}", shelf_rank::output::format_ranked_table(entries, use_colors));
                    }
                }
                OutputFormat::Table => {
                    println!(
                        "{}",
                        shelf_rank::output::format_ranked_table(entries, use_colors)
                    );
                }
                OutputFormat::Tsv => {
                    let output = shelf_rank::output::format_tsv(entries);
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                OutputFormat::Json => match shelf_rank::output::format_json(entries) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                },
            }

            if let Some(output) = args.output.or_else(|| config.output_path().cloned()) {
                if let Err(e) =
                    shelf_rank::output::write_ranked_csv(&output, result.snapshot.ranked())
                {
                    eprintln!("Output error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            }

            let report = &result.report;
            if report.warning_count() > 0 && !cli.verbose {
                eprintln!(
                    "{} warning(s) while ranking; rerun with -v for details",
                    report.warning_count()
                );
            }
            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Ranked {} of {} loaded products ({} rows read) in {:?}",
                    report.ranked,
                    report.loaded,
                    report.rows_seen,
                    start_time.elapsed()
                );
                for (kind, count) in &report.filtered_out {
                    eprintln!("  {}: removed {}", kind, count);
                }
            }
        }
        Commands::Show { key, input } => {
            let (config, scoring) = load_scoring(config_path);
            let result = run(&config, &scoring, input, None);

            let Some(view) = result.snapshot.get(&key) else {
                eprintln!(
                    "No product with key '{}' ({} products loaded)",
                    key,
                    result.snapshot.catalog_len()
                );
                std::process::exit(EXIT_NOT_FOUND);
            };

            let use_colors = shelf_rank::output::should_use_colors();
            println!(
                "{}",
                shelf_rank::output::format_product_detail(&view, use_colors)
            );
        }
        Commands::Check => {
            let (_config, scoring) = load_scoring(config_path);
            let factors: Vec<String> = scoring
                .weights()
                .map(|(factor, weight)| format!("{}={}", factor, weight))
                .collect();
            let filters: Vec<String> = scoring
                .filters()
                .iter()
                .map(|(kind, threshold)| format!("{}={}", kind, threshold))
                .collect();
            println!("Config OK");
            println!("  Factors: {}", factors.join(", "));
            println!("  Brand tiers: {}", scoring.brand_tiers().len());
            if scoring.filters().is_empty() {
                println!("  Filters: none");
            } else {
                println!("  Filters: {}", filters.join(", "));
            }
            println!("  Top N: {}", scoring.default_top_n());
        }
        Commands::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => match shelf_rank::config::get_config_path() {
                    Ok(path) => path,
                    Err(e) => {
                        eprintln!("Config error: {:#}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
            };

            if let Err(e) = shelf_rank::config::write_default_config(&path, force) {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Wrote default config to {}", path.display());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
