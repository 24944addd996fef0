use std::sync::Once;

use portal_core::{
    update, AppState, Effect, Entry, EntryList, ListFetchFailure, ListView, Msg, NoticeLevel,
};

const ADDRESS: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(portal_logging::initialize_for_tests);
}

fn connected() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::WalletConnected {
            address: ADDRESS.to_string(),
        },
    );
    state
}

fn fetched(
    state: AppState,
    request_id: u64,
    result: Result<Vec<Entry>, ListFetchFailure>,
) -> AppState {
    let (state, effects) = update(
        state,
        Msg::ListFetched {
            request_id,
            result,
            fetched_at: None,
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn missing_account_is_uninitialized_not_empty() {
    init_logging();
    let state = fetched(connected(), 1, Err(ListFetchFailure::AccountMissing));

    assert_eq!(state.entries(), &EntryList::Uninitialized);
    assert_ne!(state.entries(), &EntryList::Entries(Vec::new()));
    assert_eq!(state.view().list, ListView::NeedsInitialization);
    assert!(state.view().can_initialize);
    assert!(!state.view().can_submit);
}

#[test]
fn any_fetch_failure_maps_to_uninitialized() {
    init_logging();
    let state = fetched(connected(), 1, Ok(vec![Entry::new("https://x/a.gif", ADDRESS)]));
    let state = fetched(state, 2, Err(ListFetchFailure::Other("connection reset".into())));

    assert_eq!(state.entries(), &EntryList::Uninitialized);
}

#[test]
fn existing_empty_account_is_an_empty_sequence() {
    init_logging();
    let state = fetched(connected(), 1, Ok(Vec::new()));

    assert_eq!(state.entries(), &EntryList::Entries(Vec::new()));
    assert_eq!(state.view().list, ListView::Entries(Vec::new()));
    assert!(state.view().can_submit);
}

#[test]
fn refresh_replaces_instead_of_merging() {
    init_logging();
    let state = fetched(
        connected(),
        1,
        Ok(vec![
            Entry::new("https://x/b.gif", ADDRESS),
            Entry::new("https://x/c.gif", ADDRESS),
        ]),
    );
    let state = fetched(state, 2, Ok(vec![Entry::new("https://x/z.gif", ADDRESS)]));

    match state.view().list {
        ListView::Entries(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].position, 1);
            assert_eq!(rows[0].link, "https://x/z.gif");
        }
        other => panic!("unexpected list view {other:?}"),
    }
}

#[test]
fn initialization_then_refresh_yields_empty_list() {
    init_logging();
    let state = fetched(connected(), 1, Err(ListFetchFailure::AccountMissing));

    let (state, effects) = update(state, Msg::InitializeClicked);
    assert_eq!(effects, vec![Effect::InitializeAccount { request_id: 2 }]);
    assert!(state.view().initializing);

    let (state, effects) = update(
        state,
        Msg::InitializeCompleted {
            request_id: 2,
            result: Ok("init-sig".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::RefreshList { request_id: 3 }]);

    let state = fetched(state, 3, Ok(Vec::new()));
    assert_eq!(state.entries(), &EntryList::Entries(Vec::new()));
}

#[test]
fn second_initialization_fails_without_touching_the_list() {
    init_logging();
    let existing = vec![Entry::new("https://x/b.gif", ADDRESS)];
    let state = fetched(connected(), 1, Ok(existing.clone()));

    let (state, effects) = update(state, Msg::InitializeClicked);

    assert!(effects.is_empty());
    assert_eq!(state.entries(), &EntryList::Entries(existing));
    assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Warning));
}

#[test]
fn remote_already_exists_error_is_a_normal_failure() {
    init_logging();
    let state = fetched(connected(), 1, Err(ListFetchFailure::Other("timeout".into())));
    let (state, _) = update(state, Msg::InitializeClicked);

    let (state, effects) = update(
        state,
        Msg::InitializeCompleted {
            request_id: 2,
            result: Err("list account already exists".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.entries(), &EntryList::Uninitialized);
    assert_eq!(state.init_in_flight(), None);
    assert!(state.view().can_initialize);
}

#[test]
fn initialization_requires_connection() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::InitializeClicked);

    assert!(effects.is_empty());
    assert_eq!(state.init_in_flight(), None);
}

#[test]
fn older_refresh_arriving_late_does_not_roll_back_the_list() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::WalletConnected {
            address: ADDRESS.to_string(),
        },
    );
    assert_eq!(effects, vec![Effect::RefreshList { request_id: 1 }]);

    let (state, _) = update(state, Msg::InputChanged("https://x/a.gif".into()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitEntry {
            request_id: 2,
            link: "https://x/a.gif".into(),
        }]
    );
    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            request_id: 2,
            result: Ok("sig".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::RefreshList { request_id: 3 }]);

    let written = vec![Entry::new("https://x/a.gif", ADDRESS)];
    let state = fetched(state, 3, Ok(written.clone()));
    let (state, effects) = update(
        state,
        Msg::ListFetched {
            request_id: 1,
            result: Ok(Vec::new()),
            fetched_at: None,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.entries(), &EntryList::Entries(written));
}

#[test]
fn late_account_missing_does_not_uninitialize_a_created_list() {
    init_logging();
    let state = fetched(connected(), 1, Err(ListFetchFailure::AccountMissing));
    let (state, _) = update(state, Msg::InitializeClicked);
    let (state, _) = update(
        state,
        Msg::InitializeCompleted {
            request_id: 2,
            result: Ok("init-sig".to_string()),
        },
    );
    let state = fetched(state, 3, Ok(Vec::new()));

    let (state, _) = update(
        state,
        Msg::ListFetched {
            request_id: 1,
            result: Err(ListFetchFailure::AccountMissing),
            fetched_at: None,
        },
    );

    assert_eq!(state.entries(), &EntryList::Entries(Vec::new()));
    assert!(state.view().can_submit);
}
