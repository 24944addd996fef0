use std::sync::mpsc;
use std::thread;

use chrono::Local;
use portal_core::{Effect, Entry, ListFetchFailure, Msg};
use portal_engine::{EngineEvent, EngineEvents, EngineHandle, EngineSession, LedgerError};
use portal_logging::{portal_debug, portal_info, portal_warn};

use super::app::AppEvent;

/// Runs effects on the engine and feeds its events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(session: EngineSession, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let (engine, events) = EngineHandle::spawn(session);
        spawn_event_loop(events, event_tx);
        Self { engine }
    }

    /// Every effect produces exactly one engine message later on.
    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AutoConnect => self.engine.auto_connect(),
                Effect::Connect => self.engine.connect(),
                Effect::SubmitEntry { request_id, link } => {
                    portal_info!("SubmitEntry #{} link_len={}", request_id, link.len());
                    self.engine.submit(request_id, link);
                }
                Effect::InitializeAccount { request_id } => {
                    portal_info!("InitializeAccount #{}", request_id);
                    self.engine.initialize(request_id);
                }
                Effect::RefreshList { request_id } => self.engine.refresh(request_id),
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if event_tx.send(AppEvent::Engine(map_event(event))).is_err() {
                break;
            }
        }
        portal_debug!("Engine event loop finished");
    });
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ProviderMissing => Msg::WalletMissing,
        EngineEvent::ProviderUnrecognized { name } => Msg::ConnectFailed {
            explicit: false,
            reason: format!("wallet provider {name} is not recognized"),
        },
        EngineEvent::Connected { address } => Msg::WalletConnected {
            address: address.to_string(),
        },
        EngineEvent::ConnectFailed { explicit, error } => Msg::ConnectFailed {
            explicit,
            reason: error.to_string(),
        },
        EngineEvent::SubmitCompleted { request_id, result } => Msg::SubmitCompleted {
            request_id,
            result: result
                .map(|signature| signature.to_string())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::InitializeCompleted { request_id, result } => Msg::InitializeCompleted {
            request_id,
            result: result
                .map(|signature| signature.to_string())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::ListFetched {
            request_id,
            result: Ok(account),
        } => {
            if account.total != account.entries.len() as u64 {
                portal_warn!(
                    "List counter {} disagrees with {} stored entries",
                    account.total,
                    account.entries.len()
                );
            }
            Msg::ListFetched {
                request_id,
                result: Ok(account
                    .entries
                    .into_iter()
                    .map(|entry| Entry::new(entry.link, entry.submitter.to_string()))
                    .collect()),
                fetched_at: Some(Local::now().format("%H:%M:%S").to_string()),
            }
        }
        EngineEvent::ListFetched {
            request_id,
            result: Err(LedgerError::AccountNotFound(_)),
        } => Msg::ListFetched {
            request_id,
            result: Err(ListFetchFailure::AccountMissing),
            fetched_at: None,
        },
        EngineEvent::ListFetched {
            request_id,
            result: Err(err),
        } => Msg::ListFetched {
            request_id,
            result: Err(ListFetchFailure::Other(err.to_string())),
            fetched_at: None,
        },
    }
}
