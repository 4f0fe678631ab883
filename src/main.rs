//! Ringpulse - Audio-reactive rings and sparks

use clap::Parser;
use winit::event_loop::EventLoop;

use ringpulse::app::App;
use ringpulse::cli::Args;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Ringpulse - audio-reactive rings and sparks");

    let mut app = App::new(&args)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    app.finish()
}
