//! Parsing of bot commands from message text.

/// A recognised bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/link <code>`, or `/start <code>` from a deep link; the code may be empty.
    Link(String),
    Join,
    Status,
    Unknown(String),
}

/// Parse `text` as a command, or `None` for ordinary messages.
///
/// Accepts the `/cmd@BotName` form Telegram uses in groups.
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

    let command = match name.as_str() {
        "start" if args.is_empty() => Command::Start,
        "start" => Command::Link(args.to_string()),
        "help" => Command::Help,
        "link" => Command::Link(args.to_string()),
        "join" => Command::Join,
        "status" => Command::Status,
        _ => Command::Unknown(name),
    };
    Some(command)
}

pub const HELP_TEXT: &str = "Welcome to Coursely!\n\n\
/link <code> - connect this Telegram account using the code from your Coursely profile\n\
/join - get invite links for the channels of the courses you bought\n\
/status - show your linked account and channel access";
