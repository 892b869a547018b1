use anyhow::Result;
use clap::Parser;
use crossterm::{
    queue,
    style::{Print, PrintStyledContent, Stylize},
};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

use hypnosvn::{
    Args, Commands, OutputSurface, Settings,
    core::{
        ExitCode,
        operations::{ProcessDispatcher, RunOutcome, SvnRunner, resolve_paths},
        output::CONFLICTS_KEY,
    },
    error::{HypnoError, SvnError},
    host::{EditorHost, MemoryHost, Region},
    logging::{init_logging, parse_early_log_config},
    models::OutputTo,
};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let _log_guard = init_logging(parse_early_log_config(&raw_args));

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError.into()
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    // Handle --create-config flag
    if args.create_config {
        let path = Settings::create_sample_config()?;
        println!("Settings file: {}", path.display());
        return Ok(ExitCode::Success);
    }

    let Some(command) = args.command.clone() else {
        eprintln!("No command given, see --help");
        return Ok(ExitCode::GeneralError);
    };

    // Resolve settings from defaults, settings file, environment variables, and CLI args
    let settings = Settings::default()
        .merge(Settings::load_from_file()?)
        .merge(Settings::load_from_env())
        .merge(args.cli_settings());
    for problem in settings.validate() {
        warn!(%problem, "ignoring invalid setting");
        eprintln!("Warning: {problem}");
    }
    debug!(output_to = %settings.output_to(), "settings resolved");

    let mut surface = OutputSurface::new(MemoryHost::new(), settings);
    let runner = SvnRunner::new(ProcessDispatcher::new());
    let result = execute(&runner, &mut surface, &command).await;

    render(&surface)?;

    Ok(match result {
        Ok(outcome) if outcome.has_conflicts() => ExitCode::Conflict,
        Ok(outcome) if outcome.code.is_some_and(|c| c != 0) => ExitCode::GeneralError,
        Ok(_) => ExitCode::Success,
        Err(HypnoError::Svn(SvnError::ToolNotFound { .. })) => ExitCode::ToolNotFound,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::GeneralError
        }
    })
}

async fn execute(
    runner: &SvnRunner<ProcessDispatcher>,
    surface: &mut OutputSurface<MemoryHost>,
    command: &Commands,
) -> Result<RunOutcome, HypnoError> {
    let selected = match command {
        Commands::Update(p)
        | Commands::Commit(p)
        | Commands::Diff(p)
        | Commands::DiffPrevious(p)
        | Commands::Status(p) => &p.paths,
    };
    // The working directory stands in for the editor's active document
    let paths = resolve_paths(selected, Some(Path::new(".")))?;

    match command {
        Commands::Update(_) => runner.update(surface, &paths).await,
        Commands::Commit(_) => runner.commit(surface, &paths).await,
        Commands::Diff(_) => runner.diff(surface, &paths).await,
        Commands::DiffPrevious(_) => runner.diff_previous(surface, &paths).await,
        Commands::Status(_) => runner.status(surface, &paths).await,
    }
}

/// Print the destination text with conflict regions painted, then any dialogs.
fn render(surface: &OutputSurface<MemoryHost>) -> io::Result<()> {
    let host = surface.host();
    let mut out = io::stdout().lock();

    if let Some(destination) = surface.get_existing_only() {
        let view = destination.view();
        let text = host.text(view);
        let regions = host
            .regions(view, CONFLICTS_KEY)
            .map(|set| set.regions.clone())
            .unwrap_or_default();
        write_painted(&mut out, &text, &regions)?;
    }

    let dialogs = host.dialogs();
    if surface.settings().output_to() == OutputTo::Dialog {
        for dialog in dialogs {
            queue!(out, Print(dialog))?;
        }
    } else {
        for dialog in dialogs {
            eprintln!("{dialog}");
        }
    }
    out.flush()
}

fn write_painted(out: &mut impl Write, text: &str, regions: &[Region]) -> io::Result<()> {
    let mut cursor = 0;
    for region in regions {
        let (Some(before), Some(marked)) = (
            text.get(cursor..region.start),
            text.get(region.start..region.end),
        ) else {
            continue;
        };
        queue!(out, Print(before), PrintStyledContent(marked.red().bold()))?;
        cursor = region.end;
    }
    queue!(out, Print(text.get(cursor..).unwrap_or_default()))
}
