//! Portal core: pure controller state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{ListFetchFailure, Msg};
pub use state::{AppState, ConnectionState, Entry, EntryList, Notice, NoticeLevel, RequestId};
pub use update::update;
pub use view_model::{AppViewModel, EntryView, ListView};
