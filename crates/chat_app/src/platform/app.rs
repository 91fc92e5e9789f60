use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chat_core::{update, AppState, Msg};
use chat_logging::{chat_debug, chat_info};
use log::LevelFilter;

use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::render::TranscriptRenderer;

const QUIT_COMMAND: &str = "/quit";

pub fn run_app() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let config = config::load(&cwd)?;
    logging::initialize(config.log_destination, LevelFilter::Info);
    chat_info!("Starting chat widget against {}", config.base_url);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(&config, msg_tx.clone())
        .with_context(|| format!("configuring backend at {}", config.base_url))?;

    let mut renderer = TranscriptRenderer::new(io::stdout(), io::stderr());
    renderer.greet(&config.base_url)?;

    spawn_input_reader(msg_tx.clone());

    // Background tick drives the typing animation.
    thread::spawn(move || {
        let interval = Duration::from_millis(400);
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(interval);
        }
    });

    let mut state = AppState::with_status_style(config.status_style());
    while let Ok(msg) = msg_rx.recv() {
        let is_tick = msg == Msg::Tick;
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        if state.consume_dirty() {
            renderer.render(&state.view())?;
        } else if is_tick {
            renderer.animate()?;
        }

        if state.view().should_exit {
            break;
        }
    }

    chat_info!("Chat widget exiting");
    Ok(())
}

/// Each stdin line is one submission; `/quit` or end of input asks to leave.
fn spawn_input_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim() == QUIT_COMMAND {
                break;
            }
            chat_debug!("input line of {} chars", line.len());
            if msg_tx.send(Msg::InputChanged(line)).is_err()
                || msg_tx.send(Msg::SendClicked).is_err()
            {
                return;
            }
        }
        let _ = msg_tx.send(Msg::QuitRequested);
    });
}
