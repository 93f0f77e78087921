use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use spiral_galaxy::config::{parse_commit_arg, GalaxyArgs, RunConfig};
use spiral_galaxy::params::ParamEdit;
use std::io;
use std::process::ExitCode;

/// Procedural spiral galaxy viewer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  #[command(flatten)]
  galaxy: GalaxyArgs,
  /// Run in headless mode (no window)
  #[arg(long, default_value_t = false)]
  headless: bool,
  /// Commit `field=value` after the first galaxy (headless mode, repeatable)
  #[arg(long = "commit", value_name = "FIELD=VALUE", value_parser = parse_commit_arg)]
  commits: Vec<ParamEdit>,
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

fn main() -> ExitCode {
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    return ExitCode::SUCCESS;
  }

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  if !args.headless && !args.commits.is_empty() {
    log::warn!("--commit is only replayed in headless mode");
  }
  let config = RunConfig {
    params: args.galaxy.parameters(),
    seed: args.galaxy.seed,
    headless: args.headless,
    commits: args.commits,
  };

  match spiral_galaxy::state::run(config) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      log::error!("{err}");
      ExitCode::FAILURE
    }
  }
}
