pub const TITLE: &str = "GIF Portal";
pub const SUBTITLE: &str = "View your GIF collection in the metaverse";
pub const PROMPT: &str = "> ";
pub const RULE: &str = "------------------------------------------------------------";

pub const CMD_CONNECT: &str = "connect";
pub const CMD_INIT: &str = "init";
pub const CMD_INPUT: &str = "input";
pub const CMD_SUBMIT: &str = "submit";
pub const CMD_HELP: &str = "help";
pub const CMD_QUIT: &str = "quit";
