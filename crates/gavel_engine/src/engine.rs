use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gavel_core::{IdentityEpoch, Listing, RequestToken, UserIdentity};
use gavel_logging::gavel_error;

use crate::client::{ApiSettings, ReqwestApiClient};
use crate::{ApiClient, ApiError};

/// Commands mirror the core's effects plus the auth operations the driver
/// issues directly.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Search {
        token: RequestToken,
        query: String,
    },
    FetchGarage {
        epoch: IdentityEpoch,
    },
    Save {
        epoch: IdentityEpoch,
        url: String,
    },
    DeleteSaved {
        epoch: IdentityEpoch,
        url: String,
    },
    Login {
        email_or_username: String,
        password: String,
    },
    Logout,
    Register {
        email: String,
        username: String,
        password: String,
    },
}

/// Completions carry the token or epoch they were issued under so the core
/// can discard the stale ones, plus the engine's completion timestamp where
/// sorting needs a "now".
#[derive(Debug)]
pub enum EngineEvent {
    SearchDone {
        token: RequestToken,
        fetched_at: DateTime<Utc>,
        result: Result<Vec<Listing>, ApiError>,
    },
    GarageDone {
        epoch: IdentityEpoch,
        result: Result<Vec<Listing>, ApiError>,
    },
    SaveDone {
        epoch: IdentityEpoch,
        url: String,
        result: Result<Listing, ApiError>,
    },
    DeleteSavedDone {
        epoch: IdentityEpoch,
        url: String,
        result: Result<(), ApiError>,
    },
    LoginDone {
        result: Result<UserIdentity, ApiError>,
    },
    LogoutDone {
        result: Result<(), ApiError>,
    },
    RegisterDone {
        result: Result<UserIdentity, ApiError>,
    },
}

/// Sends commands into the engine thread. Cheap to clone.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving side of the engine's event stream.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<(Self, EngineEvents), ApiError> {
        let client = Arc::new(ReqwestApiClient::new(settings)?);
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Arc<dyn ApiClient>) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    gavel_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut search_task: Option<tokio::task::JoinHandle<()>> = None;

            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                match command {
                    EngineCommand::Search { token, query } => {
                        // A newer search supersedes the one in flight. The
                        // core's token guard stays authoritative; aborting
                        // just avoids the wasted work.
                        if let Some(task) = search_task.take() {
                            task.abort();
                        }
                        search_task = Some(runtime.spawn(async move {
                            let result = if query.is_empty() {
                                client.listings().await
                            } else {
                                client.search(&query).await
                            };
                            let _ = event_tx.send(EngineEvent::SearchDone {
                                token,
                                fetched_at: Utc::now(),
                                result,
                            });
                        }));
                    }
                    EngineCommand::FetchGarage { epoch } => {
                        runtime.spawn(async move {
                            let result = client.garage().await;
                            let _ = event_tx.send(EngineEvent::GarageDone { epoch, result });
                        });
                    }
                    EngineCommand::Save { epoch, url } => {
                        runtime.spawn(async move {
                            let result = client.save(&url).await;
                            let _ = event_tx.send(EngineEvent::SaveDone { epoch, url, result });
                        });
                    }
                    EngineCommand::DeleteSaved { epoch, url } => {
                        runtime.spawn(async move {
                            let result = client.delete_saved_listing(&url).await;
                            let _ =
                                event_tx.send(EngineEvent::DeleteSavedDone { epoch, url, result });
                        });
                    }
                    EngineCommand::Login {
                        email_or_username,
                        password,
                    } => {
                        runtime.spawn(async move {
                            let result = client.login(&email_or_username, &password).await;
                            let _ = event_tx.send(EngineEvent::LoginDone { result });
                        });
                    }
                    EngineCommand::Logout => {
                        runtime.spawn(async move {
                            let result = client.logout().await;
                            let _ = event_tx.send(EngineEvent::LogoutDone { result });
                        });
                    }
                    EngineCommand::Register {
                        email,
                        username,
                        password,
                    } => {
                        runtime.spawn(async move {
                            let result = client.register(&email, &username, &password).await;
                            let _ = event_tx.send(EngineEvent::RegisterDone { result });
                        });
                    }
                }
            }
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}
