use clap::{Args, Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, debug};
use lpcalc_core::{
    BlockKind, CanonicalForm, DisplayResult, Lexer, LineInput, Orchestrator, Problem, Relation,
    SolverOptions, TokenKind, format_value,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lpcalc")]
#[command(about = "Solve small linear programs entered as text", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SolverArgs {
    /// JSON file with solver options ({"max_iterations": .., "tolerance": ..})
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum simplex pivots
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Magnitude below which values count as zero
    #[arg(long)]
    tolerance: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the optimal solution
    Solve {
        /// The problem file
        file: PathBuf,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Solve a problem given on the command line
    Inline {
        /// min or max
        #[arg(short, long)]
        goal: String,
        /// Objective coefficients, e.g. "3 5"
        #[arg(short, long)]
        objective: String,
        /// A constraint line, e.g. "3 2 <= 18" (repeatable)
        #[arg(short, long = "constraint")]
        constraints: Vec<String>,
        /// Number of variables (defaults to the number of objective coefficients)
        #[arg(long)]
        variables: Option<String>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Print the standard form a problem file is solved in
    Canonical {
        /// The problem file
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.verbose) {
        eprintln!("Error setting up logging: {}", e);
    }

    match cli.command {
        Commands::Solve { file, format, solver } => {
            let source = read_source(&file);
            let orchestrator = orchestrator(&solver);
            let result = lpcalc_core::solve_document(&source, &orchestrator);
            print_result(&result, &format);
        }
        Commands::Inline {
            goal,
            objective,
            constraints,
            variables,
            format,
            solver,
        } => {
            let variables = variables.unwrap_or_else(|| count_values(&objective).to_string());
            let input = LineInput {
                variables,
                goal,
                objective,
                constraints,
            };
            let result = match lpcalc_core::parse_lines(&input) {
                Ok(problem) => lpcalc_core::solve_with(&problem, &orchestrator(&solver)),
                Err(e) => DisplayResult::failed(e),
            };
            print_result(&result, &format);
        }
        Commands::Canonical { file, format } => {
            let source = read_source(&file);
            let problem = parse_or_exit(&source, &file);
            let form = lpcalc_core::canonicalize(&problem);

            if format == "json" {
                match serde_json::to_string_pretty(&form) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing canonical form: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_canonical(&form);
            }
        }
        Commands::Check { file } => {
            let source = read_source(&file);
            let problem = parse_or_exit(&source, &file);

            let count = |relation: Relation| {
                problem
                    .constraints()
                    .iter()
                    .filter(|c| c.relation == relation)
                    .count()
            };

            println!("✓ {} is valid", file.display());
            println!("  {}", problem.goal());
            println!("  {} variables", problem.num_variables());
            println!(
                "  {} constraints ({} <=, {} >=, {} =)",
                problem.num_constraints(),
                count(Relation::LessEq),
                count(Relation::GreaterEq),
                count(Relation::Equal)
            );
        }
    }
}

fn setup_logger(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let colors = ColoredLevelConfig::new()
        .debug(Color::White)
        .info(Color::Green)
        .warn(Color::BrightYellow)
        .error(Color::BrightRed);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} | {:5} | {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn read_source(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_or_exit(source: &str, file: &Path) -> Problem {
    match lpcalc_core::parse_document(source) {
        Ok(problem) => problem,
        Err(e) => {
            eprintln!("✗ {} has errors:", file.display());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

/// Defaults, then the config file, then individual flags.
fn solver_options(args: &SolverArgs) -> Result<SolverOptions, String> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading config {}: {}", path.display(), e))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => SolverOptions::default(),
    };
    if let Some(max) = args.max_iterations {
        options.max_iterations = max;
    }
    if let Some(tol) = args.tolerance {
        options.tolerance = tol;
    }
    Ok(options)
}

fn orchestrator(args: &SolverArgs) -> Orchestrator {
    match solver_options(args) {
        Ok(options) => {
            let orchestrator = Orchestrator::from_options(options);
            debug!("solver options: {:?}", orchestrator.solver().options());
            orchestrator
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn count_values(line: &str) -> usize {
    Lexer::tokenize(line)
        .iter()
        .filter(|t| t.kind == TokenKind::Literal)
        .count()
}

fn print_result(result: &DisplayResult, format: &str) {
    if format == "json" {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                std::process::exit(1);
            }
        }
    } else if result.is_optimal() {
        println!("{}", result);
    } else {
        eprintln!("{}", result);
    }

    if !result.is_optimal() {
        std::process::exit(1);
    }
}

fn print_canonical(form: &CanonicalForm) {
    let costs: Vec<String> = form.costs.iter().map(|&c| format_value(c)).collect();
    println!("Minimize: {}", costs.join(" "));

    for (kind, block, symbol) in [
        (BlockKind::Inequality, &form.inequalities, "<="),
        (BlockKind::Equality, &form.equalities, "="),
    ] {
        println!();
        let Some(block) = block else {
            println!("{:?} rows: none", kind);
            continue;
        };
        println!("{:?} rows:", kind);
        let origins = form.row_origins().iter().filter(|o| o.block == kind);
        for (origin, (row, rhs)) in origins.zip(block.matrix.iter().zip(&block.rhs)) {
            let coefficients: Vec<String> = row.iter().map(|&a| format_value(a)).collect();
            println!(
                "  {:30} {} {:>10}   constraint {}{}",
                coefficients.join(" "),
                symbol,
                format_value(*rhs),
                origin.constraint + 1,
                if origin.negated { " (negated)" } else { "" }
            );
        }
    }
}
