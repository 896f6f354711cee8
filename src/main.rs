use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lightpad::controller::CanvasController;
use lightpad::error::{PersistError, ScriptError};
use lightpad::persist::FileStore;
use lightpad::script::{ScriptRunner, load_script};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "lightpad", about = "Replay light-panel interaction scripts headlessly")]
struct Cli {
    /// Directory holding the saved canvas state.
    #[arg(long, env = "LIGHTPAD_STATE_DIR", default_value = ".lightpad")]
    state_dir: PathBuf,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the saved canvas, replay a script against it, save the result and
    /// print the final snapshot.
    Replay {
        /// JSON script file.
        script: PathBuf,
        /// Start from an empty canvas instead of the saved one.
        #[arg(long)]
        fresh: bool,
        /// Do not write the result back.
        #[arg(long)]
        no_save: bool,
    },
    /// Print the saved canvas snapshot.
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lightpad failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut store = FileStore::new(cli.state_dir);
    let mut controller = CanvasController::from_env();

    match cli.command {
        Command::Replay { script, fresh, no_save } => {
            let steps = load_script(&script)?;
            if !fresh {
                controller.load(&store);
            }
            let report = ScriptRunner::new(&mut controller).run(&steps);
            info!(
                script = %script.display(),
                steps = report.steps,
                failed = report.failed,
                actions = report.actions.len(),
                shapes = controller.core().shape_count(),
                "script replayed"
            );
            if !no_save {
                controller.save(&mut store)?;
                info!(dir = %store.dir().display(), "state saved");
            }
        }
        Command::Show => {
            controller.load(&store);
        }
    }

    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    Ok(())
}
