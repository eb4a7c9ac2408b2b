use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[ok]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Hint => ("HINT", ">"),
        MessageKind::Section => ("", ""),
    }
}

pub(crate) fn style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => {
            let (label, icon) = build_label(kind);
            format!("{label}: {icon} {text}")
        }
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Plain line without a label, used for tables.
pub fn line(message: impl fmt::Display) {
    println!("{}", message);
}

/// Disables ANSI styling, e.g. when reading commands from a script.
pub fn disable_colors() {
    colored::control::set_override(false);
}
