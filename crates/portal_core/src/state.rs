use crate::view_model::{AppViewModel, EntryView, ListView};

/// Token tying an engine completion back to the request that caused it.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected {
        address: String,
    },
}

/// One link stored in the list account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub link: String,
    /// Base58 address of the wallet that submitted the link.
    pub submitter: String,
}

impl Entry {
    pub fn new(link: impl Into<String>, submitter: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            submitter: submitter.into(),
        }
    }
}

/// Last known contents of the list account.
///
/// `Uninitialized` means the account does not exist yet, which is distinct
/// from an existing account holding zero entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryList {
    Uninitialized,
    Entries(Vec<Entry>),
}

impl Default for EntryList {
    fn default() -> Self {
        EntryList::Entries(Vec::new())
    }
}

impl EntryList {
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, EntryList::Uninitialized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    /// The feature cannot be used at all until the user acts outside the app.
    Blocking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn blocking(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Blocking,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    connection: ConnectionState,
    draft: String,
    entries: EntryList,
    notice: Option<Notice>,
    submit_in_flight: Option<RequestId>,
    init_in_flight: Option<RequestId>,
    last_request_id: RequestId,
    /// Newest refresh whose result has been applied.
    applied_refresh: RequestId,
    last_refresh: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let connected = self.is_connected();
        let list = match (&self.connection, &self.entries) {
            (ConnectionState::Disconnected, _) => ListView::Hidden,
            (ConnectionState::Connected { .. }, EntryList::Uninitialized) => {
                ListView::NeedsInitialization
            }
            (ConnectionState::Connected { .. }, EntryList::Entries(entries)) => ListView::Entries(
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| EntryView {
                        position: index + 1,
                        link: entry.link.clone(),
                        submitter: entry.submitter.clone(),
                    })
                    .collect(),
            ),
        };

        AppViewModel {
            connection: self.connection.clone(),
            draft: self.draft.clone(),
            list,
            can_connect: !connected,
            can_initialize: connected
                && self.entries.is_uninitialized()
                && self.init_in_flight.is_none(),
            can_submit: connected
                && !self.entries.is_uninitialized()
                && self.submit_in_flight.is_none(),
            submitting: self.submit_in_flight.is_some(),
            initializing: self.init_in_flight.is_some(),
            notice: self.notice.clone(),
            last_refresh: self.last_refresh.clone(),
        }
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected { .. })
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn submit_in_flight(&self) -> Option<RequestId> {
        self.submit_in_flight
    }

    pub fn init_in_flight(&self) -> Option<RequestId> {
        self.init_in_flight
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Moves `Disconnected -> Connected`. Returns false if already connected.
    pub(crate) fn connect(&mut self, address: String) -> bool {
        if self.is_connected() {
            return false;
        }
        self.connection = ConnectionState::Connected { address };
        self.mark_dirty();
        true
    }

    pub(crate) fn set_draft(&mut self, draft: String) {
        if self.draft != draft {
            self.draft = draft;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_entries(&mut self, entries: EntryList) {
        self.entries = entries;
        self.mark_dirty();
    }

    pub(crate) fn set_last_refresh(&mut self, fetched_at: Option<String>) {
        if fetched_at.is_some() {
            self.last_refresh = fetched_at;
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        if self.notice.as_ref() != Some(&notice) {
            self.notice = Some(notice);
            self.mark_dirty();
        }
    }

    pub(crate) fn has_blocking_notice(&self) -> bool {
        matches!(
            self.notice,
            Some(Notice {
                level: NoticeLevel::Blocking,
                ..
            })
        )
    }

    fn next_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    pub(crate) fn begin_submit(&mut self) -> RequestId {
        let id = self.next_request_id();
        self.submit_in_flight = Some(id);
        self.mark_dirty();
        id
    }

    /// Clears the submission slot if `request_id` is the one in flight.
    pub(crate) fn finish_submit(&mut self, request_id: RequestId) -> bool {
        if self.submit_in_flight != Some(request_id) {
            return false;
        }
        self.submit_in_flight = None;
        self.mark_dirty();
        true
    }

    pub(crate) fn begin_refresh(&mut self) -> RequestId {
        self.next_request_id()
    }

    /// Accepts a refresh result unless a newer one was already applied.
    pub(crate) fn accept_refresh(&mut self, request_id: RequestId) -> bool {
        if request_id <= self.applied_refresh {
            return false;
        }
        self.applied_refresh = request_id;
        true
    }

    pub(crate) fn begin_init(&mut self) -> RequestId {
        let id = self.next_request_id();
        self.init_in_flight = Some(id);
        self.mark_dirty();
        id
    }

    pub(crate) fn finish_init(&mut self, request_id: RequestId) -> bool {
        if self.init_in_flight != Some(request_id) {
            return false;
        }
        self.init_in_flight = None;
        self.mark_dirty();
        true
    }
}
