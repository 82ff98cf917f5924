use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use perfile::load_rules;

#[derive(Parser, Debug)]
#[command(
    name = "perfile",
    about = "Apply configured commands to every matching file in a directory"
)]
struct Cli {
    /// Path to the config file (JSON, or YAML by extension)
    #[arg(short, long, required_unless_present = "dump_default")]
    config: Option<PathBuf>,

    /// Directory containing the files to process
    #[arg(short, long, required_unless_present = "dump_default")]
    directory: Option<PathBuf>,

    /// Print a default config to stdout instead of running
    #[arg(long)]
    dump_default: bool,

    /// Number of files to process concurrently within a rule
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Suppress stdout/stderr for commands that pass
    #[arg(long)]
    mute_success: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.dump_default {
        println!("{}", perfile::config_file::dump_default()?);
        return Ok(ExitCode::SUCCESS);
    }

    // clap enforces presence of both unless --dump-default
    let (Some(config_path), Some(directory)) = (cli.config, cli.directory) else {
        return Err("--config and --directory are required".into());
    };
    if !directory.is_dir() {
        return Err(format!("directory does not exist: {}", directory.display()).into());
    }

    let rules = load_rules(&config_path)?;
    let jobs = cli.jobs.max(1);
    let report = perfile::dispatch::run(&rules, &directory, jobs, cli.mute_success);
    report.print_summary(&perfile::report::Style::new(), &rules);

    if report.exit_code() == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
