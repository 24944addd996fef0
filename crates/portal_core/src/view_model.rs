use crate::{ConnectionState, Notice};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub connection: ConnectionState,
    pub draft: String,
    pub list: ListView,
    pub can_connect: bool,
    pub can_initialize: bool,
    pub can_submit: bool,
    pub submitting: bool,
    pub initializing: bool,
    pub notice: Option<Notice>,
    /// Wall-clock label of the last successful list read.
    pub last_refresh: Option<String>,
}

/// What the list area of the page shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListView {
    /// Not connected; the list is not rendered.
    #[default]
    Hidden,
    /// Connected, but the list account does not exist yet.
    NeedsInitialization,
    Entries(Vec<EntryView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    /// 1-based position in stored order.
    pub position: usize,
    pub link: String,
    pub submitter: String,
}
