use portal_core::{AppViewModel, ConnectionState};

use super::constants::{
    CMD_CONNECT, CMD_HELP, CMD_INIT, CMD_INPUT, CMD_QUIT, CMD_SUBMIT, RULE, SUBTITLE, TITLE,
};

/// Lines printed once at start-up.
pub fn banner() -> Vec<String> {
    vec![
        RULE.to_string(),
        TITLE.to_string(),
        SUBTITLE.to_string(),
        RULE.to_string(),
        format!("Type `{CMD_HELP}` for commands."),
    ]
}

/// Command reference; commands not usable right now say why.
pub fn help(view: &AppViewModel) -> Vec<String> {
    let connected = matches!(view.connection, ConnectionState::Connected { .. });
    let mut lines = vec!["Commands:".to_string()];
    let mut push = |usage: &str, about: &str, unavailable: Option<&str>| {
        let line = match unavailable {
            Some(reason) => format!("  {usage:<16} {about} (unavailable: {reason})"),
            None => format!("  {usage:<16} {about}"),
        };
        lines.push(line);
    };

    push(
        CMD_CONNECT,
        "Connect to Wallet",
        (!view.can_connect).then_some("already connected"),
    );
    push(
        CMD_INIT,
        "Do One-Time Initialization For GIF Program Account",
        if !connected {
            Some("connect first")
        } else if view.initializing {
            Some("initialization in progress")
        } else if !view.can_initialize {
            Some("account already exists")
        } else {
            None
        },
    );
    push(
        &format!("{CMD_INPUT} <link>"),
        "Enter gif link",
        (!connected).then_some("connect first"),
    );
    push(
        &format!("{CMD_SUBMIT} [<link>]"),
        "Submit the link",
        if !connected {
            Some("connect first")
        } else if view.submitting {
            Some("submission in progress")
        } else if !view.can_submit {
            Some("initialize the account first")
        } else {
            None
        },
    );
    push(CMD_HELP, "Show this help", None);
    push(CMD_QUIT, "Leave the portal", None);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::ListView;

    #[test]
    fn disconnected_help_marks_list_commands_unavailable() {
        let view = AppViewModel {
            can_connect: true,
            ..AppViewModel::default()
        };
        let lines = help(&view);
        let connect = lines.iter().find(|l| l.contains(CMD_CONNECT)).unwrap();
        assert!(!connect.contains("unavailable"));
        let submit = lines.iter().find(|l| l.contains(CMD_SUBMIT)).unwrap();
        assert!(submit.contains("connect first"));
    }

    #[test]
    fn connected_help_reflects_account_state() {
        let view = AppViewModel {
            connection: ConnectionState::Connected {
                address: "abc".into(),
            },
            list: ListView::NeedsInitialization,
            can_initialize: true,
            ..AppViewModel::default()
        };
        let lines = help(&view);
        let init = lines.iter().find(|l| l.contains("init ")).unwrap();
        assert!(!init.contains("unavailable"));
        let submit = lines.iter().find(|l| l.contains(CMD_SUBMIT)).unwrap();
        assert!(submit.contains("initialize the account first"));
    }
}
