//! CLI entry point for the ticksim simulator.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::info;
use ticksim::config::{Assets, Config};
use ticksim::loader::load_program;
use ticksim::render::StateWriter;
use ticksim::session::Session;
use ticksim::SimError;
use ticksim_core::Processor;

/// Clock-stepping processor simulator.
#[derive(Parser, Debug)]
#[command(name = "ticksim", version, about)]
struct Cli {
    /// Properties file naming the program, output, writer settings, help and
    /// welcome files.
    config: PathBuf,
}

fn run(config_path: &Path) -> Result<(), SimError> {
    let config = Config::load(config_path)?;
    let assets = Assets::load(&config)?;

    let program = load_program(&assets.program)?;
    info!(
        "loaded {} commands from {}",
        program.commands.len(),
        config.input.display()
    );
    let processor = Processor::with_program(program.commands)?;
    let writer = StateWriter::new(assets.settings, program.comments);
    let sink = config.create_output()?;

    let session = Session::new(processor, writer, assets.help, assets.welcome, sink)?;
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    session.run(stdin, &mut stdout)?;
    info!("history written to {}", config.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
