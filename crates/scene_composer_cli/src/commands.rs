use scene_composer::{ChatController, ConversationMode, HostUi, Speaker};

pub const HELP_TEXT: &str =
    "Commands: /help, /mode [ask|composer], /attach <path.tscn>, /apply, /cancel, /clear, /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Mode(Option<String>),
    Attach(Option<String>),
    Apply,
    Cancel,
    Clear,
    Quit,
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim().to_string())),
        None => (trimmed, None),
    };
    let argument = argument.filter(|value| !value.is_empty());

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/mode" => SlashCommand::Mode(argument),
        "/attach" => SlashCommand::Attach(argument),
        "/apply" => SlashCommand::Apply,
        "/cancel" => SlashCommand::Cancel,
        "/clear" => SlashCommand::Clear,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}

/// Whether the input loop keeps running after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Quit,
}

/// Routes one input line to the controller.
pub fn handle_line(chat: &mut ChatController, line: &str, host: &mut dyn HostUi) -> LineOutcome {
    let Some(command) = parse_slash_command(line) else {
        chat.submit(line, host);
        return LineOutcome::Continue;
    };

    match command {
        SlashCommand::Help => host.on_message(Speaker::System, HELP_TEXT),
        SlashCommand::Mode(None) => host.on_message(
            Speaker::System,
            &format!("Current mode: {}", chat.mode().label()),
        ),
        SlashCommand::Mode(Some(value)) => match ConversationMode::parse(&value) {
            Some(mode) => chat.set_mode(mode, host),
            None => host.on_message(
                Speaker::System,
                &format!("Unknown mode '{value}'. Use 'ask' or 'composer'."),
            ),
        },
        SlashCommand::Attach(None) => {
            host.on_message(Speaker::System, "Usage: /attach <path.tscn>");
        }
        SlashCommand::Attach(Some(path)) => {
            // The controller already reported the failure to the host.
            let _ = chat.attach_file(&path, host);
        }
        SlashCommand::Apply => {
            chat.apply(host);
        }
        SlashCommand::Cancel => chat.cancel(host),
        SlashCommand::Clear => chat.clear(host),
        SlashCommand::Quit => return LineOutcome::Quit,
        SlashCommand::Unknown(command) => host.on_message(
            Speaker::System,
            &format!("Unknown command: {command}. {HELP_TEXT}"),
        ),
    }

    LineOutcome::Continue
}
