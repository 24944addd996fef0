use std::sync::Once;

use portal_core::{update, AppState, Effect, Entry, EntryList, ListFetchFailure, Msg, NoticeLevel};
use pretty_assertions::assert_eq;

const ADDRESS: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(portal_logging::initialize_for_tests);
}

fn entry(link: &str) -> Entry {
    Entry::new(link, ADDRESS)
}

/// Connected state whose list has been read back as `entries`.
fn connected_with(entries: Vec<Entry>) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::WalletConnected {
            address: ADDRESS.to_string(),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::ListFetched {
            request_id: 1,
            result: Ok(entries),
            fetched_at: None,
        },
    );
    state.consume_dirty();
    state
}

fn submit_link(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::SubmitClicked)
}

#[test]
fn empty_and_whitespace_drafts_never_reach_the_network() {
    init_logging();
    for draft in ["", " ", "\t", "  \n  "] {
        let state = connected_with(vec![entry("https://x/b.gif")]);
        let before = state.entries().clone();

        let (next, effects) = submit_link(state, draft);

        assert!(effects.is_empty(), "draft {draft:?} produced effects");
        assert_eq!(next.entries(), &before);
        assert_eq!(next.submit_in_flight(), None);
        assert_eq!(next.notice().map(|n| n.level), Some(NoticeLevel::Warning));
    }
}

#[test]
fn submit_sends_trimmed_link_and_keeps_the_draft() {
    init_logging();
    let state = connected_with(Vec::new());

    let (state, effects) = submit_link(state, "  https://x/a.gif \n");

    assert_eq!(
        effects,
        vec![Effect::SubmitEntry {
            request_id: 2,
            link: "https://x/a.gif".to_string(),
        }]
    );
    assert_eq!(state.draft(), "  https://x/a.gif \n");
    assert_eq!(state.submit_in_flight(), Some(2));
    assert!(!state.view().can_submit);
}

#[test]
fn submit_is_ignored_while_disconnected() {
    init_logging();
    let (state, effects) = submit_link(AppState::new(), "https://x/a.gif");

    assert!(effects.is_empty());
    assert_eq!(state.submit_in_flight(), None);
}

#[test]
fn submit_is_ignored_before_initialization() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::WalletConnected {
            address: ADDRESS.to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::ListFetched {
            request_id: 1,
            result: Err(ListFetchFailure::AccountMissing),
            fetched_at: None,
        },
    );

    let (state, effects) = submit_link(state, "https://x/a.gif");

    assert!(effects.is_empty());
    assert_eq!(state.entries(), &EntryList::Uninitialized);
}

#[test]
fn overlapping_submissions_are_serialized() {
    init_logging();
    let state = connected_with(Vec::new());
    let (state, first) = submit_link(state, "https://x/a.gif");
    assert_eq!(first.len(), 1);

    let (state, second) = update(state, Msg::SubmitClicked);
    assert!(second.is_empty());
    assert_eq!(state.submit_in_flight(), Some(2));
    assert_eq!(
        state.notice().map(|n| n.text.as_str()),
        Some("A submission is already in progress")
    );
}

#[test]
fn confirmed_submission_triggers_refresh_and_append_shows_up() {
    init_logging();
    let state = connected_with(vec![entry("https://x/b.gif"), entry("https://x/c.gif")]);
    let (state, _) = submit_link(state, "https://x/a.gif");

    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            request_id: 2,
            result: Ok("5sig".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::RefreshList { request_id: 3 }]);
    assert_eq!(state.submit_in_flight(), None);

    let (state, effects) = update(
        state,
        Msg::ListFetched {
            request_id: 3,
            result: Ok(vec![
                entry("https://x/b.gif"),
                entry("https://x/c.gif"),
                entry("https://x/a.gif"),
            ]),
            fetched_at: Some("12:00:00".to_string()),
        },
    );
    assert!(effects.is_empty());
    let links: Vec<_> = match state.entries() {
        EntryList::Entries(entries) => entries.iter().map(|e| e.link.as_str()).collect(),
        EntryList::Uninitialized => panic!("list should exist"),
    };
    assert_eq!(links, vec!["https://x/b.gif", "https://x/c.gif", "https://x/a.gif"]);
    assert_eq!(state.view().last_refresh.as_deref(), Some("12:00:00"));
}

#[test]
fn failed_submission_leaves_draft_and_list_unchanged() {
    init_logging();
    let state = connected_with(vec![entry("https://x/b.gif")]);
    let (state, _) = submit_link(state, "https://x/a.gif");
    let list_before = state.entries().clone();

    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            request_id: 2,
            result: Err("blockhash not found".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.entries(), &list_before);
    assert_eq!(state.draft(), "https://x/a.gif");
    assert_eq!(state.submit_in_flight(), None);
    assert!(state.view().can_submit);
}

#[test]
fn stale_completion_is_ignored() {
    init_logging();
    let state = connected_with(Vec::new());
    let (state, _) = submit_link(state, "https://x/a.gif");

    let (next, effects) = update(
        state.clone(),
        Msg::SubmitCompleted {
            request_id: 42,
            result: Ok("sig".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(next, state);
}
