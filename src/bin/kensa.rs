use clap::{command, Parser};
use kensa::{
    adapter::JsonTree,
    config::{KensaConfig, TraceTarget},
    Error, RuleEngine, RuleOutcome,
};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "kensa.json")]
    config: PathBuf,

    /// Syntax tree to check, as JSON
    #[arg(short, long)]
    tree: PathBuf,

    /// Rule files, replacing `rule_files` from the config
    #[arg(short, long, num_args = 1..)]
    rules: Vec<PathBuf>,

    /// Rules to execute, replacing `entry_rules` from the config
    #[arg(long, num_args = 1..)]
    run: Vec<String>,

    /// List loaded rules
    #[arg(short, long)]
    list: bool,

    /// Trace to stdout at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Returns whether every requested rule executed.
fn run(cli: &Cli) -> Result<bool, Error> {
    let mut config = if cli.config.exists() {
        KensaConfig::from_file(&cli.config)?
    } else {
        KensaConfig::default()
    };
    if cli.verbose {
        config.trace.target = TraceTarget::Stdout;
        config.trace.filter = "kensa=debug".to_string();
    }
    if !cli.rules.is_empty() {
        config.rule_files = cli.rules.clone();
    }
    if !cli.run.is_empty() {
        config.entry_rules = cli.run.clone();
    }
    config.trace.init()?;
    info!("config loaded.");
    debug!("config: {:?}", config);

    let tree = JsonTree::from_file(&cli.tree)?;
    let mut engine = RuleEngine::new(tree);
    let report = engine.load(&config.rule_files);
    for error in &report.errors {
        eprintln!("{}", error);
    }

    if cli.list {
        for id in engine.loaded_functions() {
            println!("{}", id);
        }
    }

    let mut all_executed = true;
    for id in &config.entry_rules {
        println!("[EXECUTING: {}]", id);
        let outcome = engine
            .execute(&[id])?
            .pop()
            .unwrap_or(RuleOutcome::NotExecuted);
        println!();
        println!("[FINISHED: {}] => {}", id, outcome.as_bool());
        all_executed &= outcome.was_executed();
    }
    Ok(all_executed)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
