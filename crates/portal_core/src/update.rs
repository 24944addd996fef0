use portal_logging::{portal_debug, portal_error, portal_info, portal_warn, short_address};

use crate::{AppState, Effect, EntryList, ListFetchFailure, Msg, Notice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded => {
            if state.is_connected() {
                Vec::new()
            } else {
                vec![Effect::AutoConnect]
            }
        }
        Msg::WalletMissing => {
            portal_warn!("Wallet provider not found");
            state.set_notice(Notice::blocking(
                "Wallet provider not found! Configure a wallet keypair to continue.",
            ));
            Vec::new()
        }
        Msg::ConnectClicked => {
            if state.is_connected() {
                Vec::new()
            } else {
                vec![Effect::Connect]
            }
        }
        Msg::WalletConnected { address } => {
            let label = short_address(&address);
            if state.connect(address) {
                portal_info!("Connected with public key {}", label);
                state.set_notice(Notice::info(format!("Connected as {label}")));
                refresh(&mut state)
            } else {
                portal_debug!("Ignoring repeated connection from {}", label);
                Vec::new()
            }
        }
        Msg::ConnectFailed { explicit, reason } => {
            if explicit {
                portal_error!("Wallet connection rejected: {}", reason);
                state.set_notice(Notice::warning(format!("Wallet connection failed: {reason}")));
            } else if !state.has_blocking_notice() {
                // Trusted-only connections fail quietly.
                portal_debug!("Automatic wallet connection declined: {}", reason);
            }
            Vec::new()
        }
        Msg::InputChanged(text) => {
            state.set_draft(text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::SubmitCompleted { request_id, result } => {
            if !state.finish_submit(request_id) {
                portal_debug!("Ignoring stale submission result #{}", request_id);
                return (state, Vec::new());
            }
            match result {
                Ok(signature) => {
                    portal_info!("Link submitted in transaction {}", signature);
                    state.set_notice(Notice::info("Link submitted"));
                    refresh(&mut state)
                }
                Err(reason) => {
                    portal_error!("Error sending link: {}", reason);
                    state.set_notice(Notice::warning(format!("Submission failed: {reason}")));
                    Vec::new()
                }
            }
        }
        Msg::InitializeClicked => initialize(&mut state),
        Msg::InitializeCompleted { request_id, result } => {
            if !state.finish_init(request_id) {
                portal_debug!("Ignoring stale initialization result #{}", request_id);
                return (state, Vec::new());
            }
            match result {
                Ok(signature) => {
                    portal_info!("Created list account in transaction {}", signature);
                    state.set_notice(Notice::info("List account created"));
                    refresh(&mut state)
                }
                Err(reason) => {
                    portal_error!("Error creating list account: {}", reason);
                    state.set_notice(Notice::warning(format!(
                        "Initialization failed: {reason}"
                    )));
                    Vec::new()
                }
            }
        }
        Msg::ListFetched {
            request_id,
            result,
            fetched_at,
        } => {
            if !state.accept_refresh(request_id) {
                portal_debug!("Ignoring outdated list read #{}", request_id);
                return (state, Vec::new());
            }
            match result {
                Ok(entries) => {
                    portal_debug!("Fetched list with {} entries", entries.len());
                    state.set_entries(EntryList::Entries(entries));
                    state.set_last_refresh(fetched_at);
                }
                Err(ListFetchFailure::AccountMissing) => {
                    portal_info!("List account does not exist yet");
                    state.set_entries(EntryList::Uninitialized);
                }
                Err(ListFetchFailure::Other(reason)) => {
                    portal_warn!("Error fetching list: {}", reason);
                    state.set_entries(EntryList::Uninitialized);
                }
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    let link = state.draft().trim().to_string();
    if link.is_empty() {
        portal_debug!("No link given");
        state.set_notice(Notice::warning("No gif link given!"));
        return Vec::new();
    }
    if !state.is_connected() {
        portal_debug!("Submit ignored while disconnected");
        return Vec::new();
    }
    if state.entries().is_uninitialized() {
        portal_debug!("Submit ignored before the list account exists");
        state.set_notice(Notice::warning("Initialize the list account first"));
        return Vec::new();
    }
    if let Some(pending) = state.submit_in_flight() {
        portal_debug!("Submit ignored, request #{} still in flight", pending);
        state.set_notice(Notice::warning("A submission is already in progress"));
        return Vec::new();
    }

    portal_info!("Submitting link {}", link);
    let request_id = state.begin_submit();
    vec![Effect::SubmitEntry { request_id, link }]
}

fn refresh(state: &mut AppState) -> Vec<Effect> {
    let request_id = state.begin_refresh();
    vec![Effect::RefreshList { request_id }]
}

fn initialize(state: &mut AppState) -> Vec<Effect> {
    if !state.is_connected() {
        portal_debug!("Initialize ignored while disconnected");
        return Vec::new();
    }
    if !state.entries().is_uninitialized() {
        portal_warn!("Initialize ignored, list account already exists");
        state.set_notice(Notice::warning("The list account already exists"));
        return Vec::new();
    }
    if let Some(pending) = state.init_in_flight() {
        portal_debug!("Initialize ignored, request #{} still in flight", pending);
        return Vec::new();
    }

    let request_id = state.begin_init();
    vec![Effect::InitializeAccount { request_id }]
}
