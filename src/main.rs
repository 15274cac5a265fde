use anyhow::Context;
use coderefs::ci::GithubContext;
use coderefs::error::{CoderefsError, Result as CoderefsResult};
use coderefs::{Cli, Commands, Config, IdentifierTable, Parser, SearchEngine, SourceFile};
use colored::*;
use env_logger::{Builder, Env, Target};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(&cli).and_then(|_| run(&cli)) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CoderefsResult<()> {
    debug!("Application started with command: {:?}", cli.command);

    match &cli.command {
        Commands::Scan {
            flags,
            config,
            project_key,
            context_lines,
            input,
            pretty,
            print_metrics,
        } => {
            let mut config = match config {
                Some(path) => Config::load(path)?,
                None => Config::default(),
            };
            config.apply_env(|name| std::env::var(name).ok())?;
            if let Some(project_key) = project_key {
                config.project_key = project_key.clone();
            }
            if let Some(context_lines) = context_lines {
                config.context_lines = *context_lines;
            }
            config.validate()?;

            let aliases = read_flags(flags)?;
            let table = IdentifierTable::new(&aliases, &config.delimiters)?;
            info!(
                "Searching for {} flag(s) in project {}",
                table.len(),
                config.project_key
            );

            let reader: Box<dyn Read + Send> = match input {
                Some(path) => Box::new(open_input(path)?),
                None => Box::new(io::stdin()),
            };
            let engine = SearchEngine::new(table, config.hunk_options(), config.search_limits())?;
            let result = engine.search(read_records(reader));

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if *pretty {
                serde_json::to_writer_pretty(&mut out, &result.references)?;
            } else {
                serde_json::to_writer(&mut out, &result.references)?;
            }
            writeln!(out)?;

            eprintln!(
                "{} {} hunk(s) in {} file(s)",
                "Found".green(),
                result.total_hunks,
                result.references.len()
            );
            if let Some(reason) = result.stopped {
                eprintln!("{}", format!("Results truncated at the {reason}").yellow());
            }
            if *print_metrics {
                eprint!("{}", engine.metrics().gather()?);
            }
        }
        Commands::GithubEnv => {
            let ctx = GithubContext::from_env(|name| std::env::var(name).ok())?;
            info!(
                "Resolved GitHub Actions context for {} on branch {}",
                ctx.repo_name, ctx.branch
            );
            println!("{}", serde_json::to_string_pretty(&ctx.options())?);
        }
    }

    Ok(())
}

fn read_flags(path: &Path) -> CoderefsResult<HashMap<String, Vec<String>>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read flags file: {}", path.display()))?;
    let aliases: HashMap<String, Vec<String>> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse flags file: {}", path.display()))?;
    Ok(aliases)
}

fn open_input(path: &Path) -> CoderefsResult<fs::File> {
    Ok(fs::File::open(path)
        .with_context(|| format!("Failed to open input: {}", path.display()))?)
}

/// Stream file records, stopping at the first malformed one.
fn read_records(reader: Box<dyn Read + Send>) -> impl Iterator<Item = SourceFile> + Send + 'static {
    serde_json::Deserializer::from_reader(BufReader::new(reader))
        .into_iter::<SourceFile>()
        .map_while(|record| match record {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Stopping at malformed file record: {e}");
                None
            }
        })
}

fn setup_logging(cli: &Cli) -> CoderefsResult<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir).map_err(CoderefsError::Io)?;
            }
        }
        let log_file = fs::File::create(log_path).map_err(CoderefsError::Io)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| CoderefsError::Other(e.to_string()))?;
    Ok(())
}
