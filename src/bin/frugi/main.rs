//! frugi - play the synth engine from a computer keyboard
//!
//! Run with: cargo run --bin frugi
//!
//! The audio device stands in for the I2S transfer engine and the keyboard
//! stands in for the MIDI UART; the engine itself runs unchanged on its own
//! thread.

mod audio;
mod keyboard;
mod ui;

use std::thread;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use log::info;

use frugi_dsp::{
    engine::{EngineConfig, Scheduler},
    synth::PolySynth,
    MAX_VOICES,
};

use audio::CpalHardware;
use ui::UiApp;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::default();
    let synth = PolySynth::new(MAX_VOICES).with_patch(0);

    let (mut scheduler, ports) =
        Scheduler::new(config.clone(), synth).wrap_err("invalid engine configuration")?;

    let mut hardware = CpalHardware::new(ports.buffer_ready.clone());
    scheduler
        .start(&mut hardware)
        .wrap_err("failed to start audio output")?;

    let engine = thread::Builder::new()
        .name("frugi-engine".into())
        .spawn(move || scheduler.run())
        .wrap_err("failed to spawn engine thread")?;

    info!("{} voices, press keys to play", MAX_VOICES);

    let mut terminal = ratatui::init();
    let result = UiApp::new(ports.midi_in, ports.buffer, config, MAX_VOICES).run(&mut terminal);
    ratatui::restore();

    // Dropping the stream stops buffer-ready notifications and ends the engine loop
    drop(hardware);
    drop(ports.buffer_ready);
    match engine.join() {
        Ok(Ok(())) | Ok(Err(frugi_dsp::engine::EngineError::Disconnected)) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(eyre!("engine thread panicked")),
    }

    result
}
