use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use scene_composer::{logging, ChatConfig, ChatController, LifecycleState, RequestController};
use scene_composer_cli::commands::{handle_line, LineOutcome, HELP_TEXT};
use scene_composer_cli::providers;
use scene_composer_cli::transcript::TranscriptHost;

enum LoopEvent {
    Line(String),
    Wake,
    InputClosed,
}

fn main() -> io::Result<()> {
    logging::init_from_env();

    let config = ChatConfig::load().map_err(io::Error::other)?;
    let project_root = match std::env::args_os().nth(1) {
        Some(root) => PathBuf::from(root),
        None => std::env::current_dir()?,
    };

    let provider = providers::provider_from_env(&config).map_err(io::Error::other)?;
    let profile = provider.profile();
    tracing::info!(
        provider = %profile.provider_id,
        model = %profile.model_id,
        root = %project_root.display(),
        "starting"
    );

    let (tx, rx) = mpsc::channel();
    let wake_tx = tx.clone();
    let requests = RequestController::with_notifier(
        provider,
        config.drain_timeout,
        Arc::new(move || {
            let _ = wake_tx.send(LoopEvent::Wake);
        }),
    );

    let mut chat = ChatController::new(&config, project_root, requests);
    let mut host = TranscriptHost::new(io::stdout());
    chat.greet(&mut host);
    println!("{HELP_TEXT}");

    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(LoopEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(LoopEvent::InputClosed);
        })?;

    let mut input_closed = false;
    while let Ok(event) = rx.recv() {
        match event {
            LoopEvent::Line(line) => {
                if handle_line(&mut chat, &line, &mut host) == LineOutcome::Quit {
                    break;
                }
            }
            LoopEvent::Wake => {
                chat.poll(&mut host);
            }
            LoopEvent::InputClosed => input_closed = true,
        }

        // Piped input may end before the last reply arrives.
        if input_closed && chat.lifecycle_state() == LifecycleState::Idle {
            break;
        }
    }

    Ok(())
}
