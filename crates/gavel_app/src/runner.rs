use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gavel_core::{Effect, Msg};
use gavel_engine::{EngineCommand, EngineEvent, EngineEvents, EngineHandle};
use gavel_logging::{gavel_info, gavel_warn};

/// Bridges the pure core and the engine: dispatches core effects as engine
/// commands and pumps engine completions back as core messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, events: EngineEvents, msg_tx: mpsc::Sender<Msg>) -> Self {
        spawn_event_loop(events, msg_tx);
        Self { engine }
    }

    /// Dispatches network effects. `RequestLogin` is presentation and is
    /// left to the caller.
    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Search { token, query } => {
                    gavel_info!("Search token={} query={:?}", token, query);
                    self.engine.send(EngineCommand::Search { token, query });
                }
                Effect::FetchGarage { epoch } => {
                    gavel_info!("FetchGarage epoch={}", epoch);
                    self.engine.send(EngineCommand::FetchGarage { epoch });
                }
                Effect::SaveListing { epoch, url } => {
                    self.engine.send(EngineCommand::Save { epoch, url });
                }
                Effect::DeleteSavedListing { epoch, url } => {
                    self.engine.send(EngineCommand::DeleteSaved { epoch, url });
                }
                Effect::RequestLogin => {
                    // Handled by the caller; nothing to run.
                }
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || loop {
        if let Some(event) = events.try_recv() {
            if let Some(msg) = map_event(event) {
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

/// Maps engine completions to core messages. Sign-in failures never enter
/// core state; they surface here and the state machine sees nothing.
fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::SearchDone {
            token,
            fetched_at,
            result,
        } => Some(Msg::SearchCompleted {
            token,
            fetched_at,
            result: result.map_err(|err| err.to_string()),
        }),
        EngineEvent::GarageDone { epoch, result } => Some(Msg::GarageFetched {
            epoch,
            result: result.map_err(|err| err.to_string()),
        }),
        EngineEvent::SaveDone { epoch, url, result } => Some(Msg::SaveCompleted {
            epoch,
            url,
            result: result.map_err(|err| err.to_string()),
        }),
        EngineEvent::DeleteSavedDone { epoch, url, result } => Some(Msg::UnsaveCompleted {
            epoch,
            url,
            result: result.map_err(|err| err.to_string()),
        }),
        EngineEvent::LoginDone { result } | EngineEvent::RegisterDone { result } => match result {
            Ok(user) => Some(Msg::LoggedIn { user }),
            Err(err) => {
                gavel_warn!("Sign-in failed: {}", err);
                println!("Sign-in failed: {err}");
                None
            }
        },
        EngineEvent::LogoutDone { result } => {
            if let Err(err) = result {
                gavel_warn!("Remote logout failed: {}", err);
            }
            // The session ends locally regardless.
            Some(Msg::LoggedOut)
        }
    }
}
