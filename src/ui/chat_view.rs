use chrono::Local;
use colored::Colorize;

use crate::api::models::{Message, Role};

pub fn message(msg: &Message) -> String {
    let time = msg.timestamp.with_timezone(&Local).format("%H:%M").to_string();
    let speaker = match msg.role {
        Role::User => "You".blue().bold(),
        Role::Assistant => "Assistant".purple().bold(),
    };
    let body = msg
        .content
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{speaker} {}\n{body}", time.dimmed())
}

pub fn transcript(messages: &[Message]) -> String {
    messages.iter().map(message).collect::<Vec<_>>().join("\n\n")
}

pub fn prompt() -> String {
    format!("{} ", ">".purple().bold())
}
