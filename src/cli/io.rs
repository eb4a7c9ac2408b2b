use dialoguer::{theme::ColorfulTheme, Confirm, Password};

use crate::cli::context::CommandError;

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Prompt for a password without echoing it.
pub fn prompt_password(theme: &ColorfulTheme, prompt: &str) -> Result<String, CommandError> {
    Password::with_theme(theme)
        .with_prompt(prompt)
        .interact()
        .map_err(CommandError::from)
}
