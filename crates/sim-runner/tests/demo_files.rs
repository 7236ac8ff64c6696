//! The bundled demo run loads and executes to completion.

use std::path::PathBuf;

use ticksim::config::{Assets, Config};
use ticksim::loader::load_program;
use ticksim::render::Format;
use ticksim_core::{History, Processor, Register};

fn demo_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/countdown.properties")
}

#[test]
fn demo_assets_load() {
    let config = Config::load(&demo_config()).unwrap();
    let assets = Assets::load(&config).unwrap();

    assert_eq!(assets.settings.format, Format::Text);
    assert_eq!(assets.settings.title, "countdown");
    assert!(assets.settings.hide_zero_memory);
    assert!(assets.help.contains("stateHistory | sh"));
}

#[test]
fn demo_program_runs_to_halt() {
    let config = Config::load(&demo_config()).unwrap();
    let assets = Assets::load(&config).unwrap();
    let program = load_program(&assets.program).unwrap();
    assert_eq!(program.commands.len(), 11);
    assert!(program.comments.contains_key(&1));

    let mut processor = Processor::with_program(program.commands).unwrap();
    let mut history = History::start(&processor).unwrap();
    while !processor.is_halted() {
        processor.clk().unwrap();
        history.record(&processor).unwrap();
    }

    let last = history.latest();
    assert_eq!(last.memory()[1..=5], [1, 4, 9, 16, 25]);
    assert_eq!(last.register(Register::R0), 0);
    assert_eq!(last.register(Register::R2), 25);
    assert_eq!(last.register(Register::R3), 1);
}
