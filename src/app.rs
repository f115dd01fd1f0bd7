//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads and validates the research configuration
//! - runs the research pipeline
//! - prints reports
//! - writes profile / combined / CSV outputs

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ConfigArgs, ResearchArgs, ShowArgs};
use crate::config::ResearchConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `prospect` binary.
pub fn run() -> Result<(), AppError> {
    // `prospect` alone (or with leading flags) behaves like `prospect research ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Research(args) => handle_research(args, OutputMode::Full),
        Command::Rank(args) => handle_research(args, OutputMode::RankOnly),
        Command::Show(args) => handle_show(args),
        Command::Config(args) => handle_config(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // Logs go to stderr so stdout stays clean for reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_research(args: ResearchArgs, mode: OutputMode) -> Result<(), AppError> {
    init_tracing(args.verbose);

    let config = ResearchConfig::load(args.config.as_deref())?.restrict_to(&args.tickers)?;
    let run = pipeline::run_research(&config)?;
    let ranked = run.ranked();

    // Print terminal output.
    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(&run.profiles, &run.skipped, &config)
            );
        }
        OutputMode::RankOnly => {}
    }

    let shown = crate::report::rank_top(&run.profiles, args.top);
    println!("{}", crate::report::format_priority(&shown));

    if mode == OutputMode::Full && !args.no_write {
        let written = crate::io::write_profiles(&args.output_dir, &ranked)?;
        let combined_path = args.output_dir.join(crate::io::COMBINED_FILE_NAME);
        let combined = crate::io::CombinedReport::new(&ranked, &run.skipped, run.researched_at);
        crate::io::write_combined_json(&combined_path, &combined)?;
        tracing::info!(
            profiles = written.len(),
            combined = %combined_path.display(),
            "wrote research outputs"
        );
    }

    // Optional exports.
    if let Some(path) = &args.export_csv {
        crate::io::write_priority_csv(path, &ranked)?;
        tracing::info!(path = %path.display(), "wrote priority CSV");
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let record = crate::io::read_profile_json(&args.profile)?;
    println!("{}", crate::report::format_profile_record(&record));
    Ok(())
}

fn handle_config(args: ConfigArgs) -> Result<(), AppError> {
    init_tracing(false);
    let config = ResearchConfig::load(args.config.as_deref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Rewrite argv so `prospect` defaults to `prospect research`.
///
/// Rules:
/// - `prospect`                     -> `prospect research`
/// - `prospect -t UNH ...`          -> `prospect research -t UNH ...`
/// - `prospect --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("research".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "research" | "rank" | "show" | "config");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "research flags".
    if arg1.starts_with('-') {
        argv.insert(1, "research".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_researches() {
        assert_eq!(rewrite_args(argv(&["prospect"])), argv(&["prospect", "research"]));
    }

    #[test]
    fn leading_flags_go_to_research() {
        assert_eq!(
            rewrite_args(argv(&["prospect", "-t", "UNH"])),
            argv(&["prospect", "research", "-t", "UNH"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        assert_eq!(rewrite_args(argv(&["prospect", "rank"])), argv(&["prospect", "rank"]));
        assert_eq!(rewrite_args(argv(&["prospect", "--help"])), argv(&["prospect", "--help"]));
    }
}
