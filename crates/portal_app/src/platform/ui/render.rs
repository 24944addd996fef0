use portal_core::{AppViewModel, ConnectionState, ListView, NoticeLevel};
use portal_logging::short_address;

use super::constants::{CMD_CONNECT, CMD_INIT, RULE};

/// Renders the whole page for the current view model.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![RULE.to_string(), status_line(view)];

    if let Some(notice) = &view.notice {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Blocking => "blocked",
        };
        lines.push(format!("[{tag}] {}", notice.text));
    }

    match &view.list {
        ListView::Hidden => {
            if view.can_connect {
                lines.push(format!("Wallet not connected. Type `{CMD_CONNECT}` to connect."));
            }
        }
        ListView::NeedsInitialization => {
            if view.initializing {
                lines.push("Initializing the GIF program account...".to_string());
            } else {
                lines.push(format!(
                    "The GIF program account does not exist yet. Type `{CMD_INIT}` to create it."
                ));
            }
        }
        ListView::Entries(entries) => {
            lines.push(format!("Draft: {}", view.draft));
            if view.submitting {
                lines.push("Submitting...".to_string());
            }
            if entries.is_empty() {
                lines.push("No GIFs yet.".to_string());
            }
            for entry in entries {
                lines.push(format!(
                    "{:>3}. {}  (by {})",
                    entry.position,
                    entry.link,
                    short_address(&entry.submitter)
                ));
            }
        }
    }
    lines
}

fn status_line(view: &AppViewModel) -> String {
    let wallet = match &view.connection {
        ConnectionState::Disconnected => "disconnected".to_string(),
        ConnectionState::Connected { address } => format!("connected {}", short_address(address)),
    };
    let mut status = format!("Wallet: {wallet}");
    if let ListView::Entries(entries) = &view.list {
        status.push_str(&format!(" | GIFs: {}", entries.len()));
    }
    if let Some(at) = &view.last_refresh {
        status.push_str(&format!(" | Refreshed: {at}"));
    }
    status
}
