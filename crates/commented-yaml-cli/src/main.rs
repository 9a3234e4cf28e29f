use std::path::PathBuf;
use std::process::ExitCode;

use bpaf::Bpaf;
use tracing_subscriber::prelude::*;

mod commands;
mod config;
mod diagnostics;

#[derive(Debug, Clone, Bpaf)]
pub struct InspectArgs {
    /// Print the document as JSON instead of a comment listing
    #[bpaf(long("json"), switch)]
    pub json: bool,

    /// YAML file to read
    #[bpaf(positional("FILE"))]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Bpaf)]
pub struct RoundtripArgs {
    /// Exit with status 1 if the output does not read back as the same document
    #[bpaf(long("check"), switch)]
    pub check: bool,

    /// YAML file to read
    #[bpaf(positional("FILE"))]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage)]
/// Read and write YAML documents without losing their comments
struct Cli {
    /// TOML file with [read] and [write] options
    #[bpaf(long("config"), argument("FILE"))]
    config: Option<PathBuf>,

    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    #[bpaf(command("inspect"))]
    /// Show which entry every comment is attached to
    Inspect(#[bpaf(external(inspect_args))] InspectArgs),

    #[bpaf(command("roundtrip"))]
    /// Read a document and write it back to stdout
    Roundtrip(#[bpaf(external(roundtrip_args))] RoundtripArgs),

    #[bpaf(command("version"))]
    /// Print version information
    Version,
}

fn init_tracing() {
    if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_env("COMMENTED_YAML_LOG") {
        tracing_subscriber::registry()
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true)
                    .with_indent_lines(true)
                    .with_verbose_exit(true)
                    .with_verbose_entry(true)
                    .with_timer(tracing_tree::time::Uptime::default())
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    }
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();
    init_tracing();

    let cli = cli().run();

    let result = match &cli.command {
        Commands::Version => {
            println!("commented-yaml {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Commands::Inspect(args) => config::load(cli.config.as_deref())
            .and_then(|config| commands::inspect::run(args, &config.read))
            .map(|()| true),
        Commands::Roundtrip(args) => config::load(cli.config.as_deref())
            .and_then(|config| commands::roundtrip::run(args, &config.read, &config.write)),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
