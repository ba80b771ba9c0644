//! Template Override CLI
//!
//! Usage:
//!   template-override [OPTIONS] <COMMAND>
//!
//! Commands:
//!   render   Resolve the override chain of a template and print the result
//!   resolve  Print one override layer of a template
//!   chain    Print the layers and fragments of an override chain
//!
//! Options:
//!   -c, --config <FILE>        Engine configuration (TOML format)
//!   -p, --provider <ROOTS>     Comma-separated search roots of one provider
//!       --allow-late-override  Accept override tags after other tags
//!   -v, --verbose              Log resolution steps to stderr
//!   -h, --help                 Print help

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use template_override::{Context, Engine, EngineConfig, ResolutionError};

#[derive(Parser)]
#[command(name = "template-override")]
#[command(about = "Resolve template override chains across search roots")]
struct Cli {
    /// Engine configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated search roots of one provider, repeatable
    #[arg(short, long = "provider", value_name = "ROOTS", global = true)]
    providers: Vec<String>,

    /// Accept an override tag that is not the first tag of its template
    #[arg(long, global = true)]
    allow_late_override: bool,

    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ContextArgs {
    /// TOML file with template variables
    #[arg(long = "context")]
    file: Option<PathBuf>,

    /// Template variable as KEY=VALUE, repeatable
    #[arg(long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the override chain of a template and print the result
    Render {
        name: String,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Print one override layer of a template
    Resolve {
        name: String,
        /// Override level, 1 is the most specific definition
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },
    /// Print the layers and fragments of an override chain
    Chain {
        name: String,
        #[command(flatten)]
        context: ContextArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = build_engine(&cli);

    match &cli.command {
        Command::Render { name, context } => {
            let context = load_context(context);
            match engine.render(name, &context) {
                Ok(output) => print!("{}", output),
                Err(e) => fail(&e),
            }
        }
        Command::Resolve { name, depth } => match engine.resolve(name, *depth) {
            Ok(found) => {
                println!("# {}", found.origin);
                print!("{}", found.content);
            }
            Err(e) => fail(&e),
        },
        Command::Chain { name, context } => {
            let context = load_context(context);
            match engine.resolve_chain(name, &context) {
                Ok(resolved) => {
                    println!(
                        "{} ({} definitions found, {} merged)",
                        resolved.name,
                        engine.chain().count_matches(name),
                        resolved.table.layer_count()
                    );
                    for layer in resolved.layers() {
                        println!("  {:>3}  {}  {}", layer.depth, layer.name, layer.origin);
                    }
                    let mut names: Vec<_> = resolved.table.names().collect();
                    names.sort_unstable();
                    for fragment in names {
                        let count = resolved.table.get(fragment).map_or(0, |b| b.len());
                        println!("  block {} ({} layers)", fragment, count);
                    }
                }
                Err(e) => fail(&e),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_engine(cli: &Cli) -> Engine {
    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None if cli.providers.is_empty() => {
            EngineConfig::new().with_provider("templates", [PathBuf::from(".")])
        }
        None => cli
            .providers
            .iter()
            .enumerate()
            .fold(EngineConfig::new(), |config, (i, roots)| {
                config.with_provider(
                    format!("provider{}", i + 1),
                    roots.split(',').filter(|r| !r.is_empty()).map(PathBuf::from),
                )
            }),
    };

    let config = if cli.allow_late_override {
        config.with_redirect_must_be_first(false)
    } else {
        config
    };

    Engine::from_config(&config)
}

fn load_context(args: &ContextArgs) -> Context {
    let mut context = match &args.file {
        Some(path) => match Context::from_file(path) {
            Ok(context) => context,
            Err(e) => {
                eprintln!("Error loading context '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Context::new(),
    };

    for var in &args.vars {
        if let Err(e) = context.assign(var) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    context
}

fn fail(error: &ResolutionError) -> ! {
    eprintln!("Error: {}", error.report());
    std::process::exit(1);
}
