use clap::Parser;
use serpent_interpreter::{repl, Config, DirectoryModules, Interpreter};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "serpent", version, about = "Runs serpent scripts", long_about = None)]
struct Cli {
    /// Script to run; starts the REPL when omitted
    script: Option<PathBuf>,
    /// Extra directory searched for imported modules
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include: Vec<PathBuf>,
    /// Nested calls allowed before RecursionError
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
}

/// Logs go to stderr and only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(depth) = cli.max_depth {
        config = config.with_max_call_depth(depth);
    }
    let script_dir = match &cli.script {
        Some(script) => script
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        None => PathBuf::from("."),
    };
    let mut paths = vec![script_dir];
    paths.extend(cli.include.iter().cloned());
    paths.append(&mut config.module_paths);
    config.module_paths = paths;
    config
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = config(&cli);
    let modules = DirectoryModules::new(config.module_paths.clone());

    let script = match &cli.script {
        Some(script) => script,
        None => {
            println!("serpent {}", env!("CARGO_PKG_VERSION"));
            repl::start(config, modules);
            return;
        }
    };

    let source = match fs::read_to_string(script) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("serpent: cannot read {}: {}", script.display(), err);
            process::exit(2);
        }
    };

    let mut interpreter = Interpreter::new(config).with_modules(modules);
    match interpreter.run(&source) {
        Err(err) => {
            eprintln!("SyntaxError: {}", err);
            process::exit(2);
        }
        Ok(outcome) => {
            if let Some(diagnostic) = outcome.diagnostic() {
                eprintln!("{}", diagnostic);
            }
            process::exit(outcome.exit_code());
        }
    }
}
