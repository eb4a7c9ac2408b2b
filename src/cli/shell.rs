//! Read-eval loop. Interactive sessions read through a rustyline editor with
//! command-name completion; script mode reads plain lines from stdin.

use std::io::{self, BufRead, Lines, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context, Editor, Helper,
};

use crate::cli::{
    context::{CliError, CliMode, LoopControl, ShellContext},
    output,
};

pub const SCRIPT_ENV: &str = "BUDGET_FOLDERS_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        output::disable_colors();
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    crate::init_with_filter(Some(context.config().log_filter.as_str()));

    let mut input = InputSource::for_context(&context)?;
    if mode == CliMode::Interactive {
        output::info("Type `help` to list commands.");
    }

    while context.running {
        match input.next_line(&context.prompt())? {
            Input::Line(line) => {
                if execute(&mut context, &line) == LoopControl::Exit {
                    break;
                }
            }
            Input::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Input::Closed => {
                if mode == CliMode::Interactive {
                    output::info("Exiting shell.");
                }
                break;
            }
        }
    }
    Ok(())
}

/// Runs one input line. Command failures are reported here and never end the loop.
pub(crate) fn execute(context: &mut ShellContext, line: &str) -> LoopControl {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(err) => {
            output::warning(format!("Could not read `{}`: {}", line.trim(), err));
            return LoopControl::Continue;
        }
    };
    let Some((name, rest)) = words.split_first() else {
        return LoopControl::Continue;
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match context.dispatch(&name.to_lowercase(), name, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            LoopControl::Exit
        }
        Ok(LoopControl::Continue) => LoopControl::Continue,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

enum InputSource {
    Editor(Box<Editor<CommandCompleter, DefaultHistory>>),
    Stdin(Lines<StdinLock<'static>>),
}

impl InputSource {
    fn for_context(context: &ShellContext) -> Result<Self, CliError> {
        if context.mode() == CliMode::Script {
            return Ok(InputSource::Stdin(io::stdin().lock().lines()));
        }
        let mut editor = Editor::<CommandCompleter, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandCompleter::new(context.command_names())));
        Ok(InputSource::Editor(Box::new(editor)))
    }

    fn next_line(&mut self, prompt: &str) -> Result<Input, CliError> {
        match self {
            InputSource::Stdin(lines) => match lines.next() {
                Some(line) => Ok(Input::Line(line?)),
                None => Ok(Input::Closed),
            },
            InputSource::Editor(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.trim()).ok();
                    }
                    Ok(Input::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
                Err(ReadlineError::Eof) => Ok(Input::Closed),
                Err(err) => Err(err.into()),
            },
        }
    }
}

/// Completes the first word of a line against the registered command names.
struct CommandCompleter {
    names: Vec<&'static str>,
}

impl CommandCompleter {
    fn new(mut names: Vec<&'static str>) -> Self {
        names.sort_unstable();
        names.dedup();
        Self { names }
    }

    fn matching(&self, typed: &str) -> Vec<&'static str> {
        let typed = typed.to_ascii_lowercase();
        self.names
            .iter()
            .copied()
            .filter(|name| name.starts_with(typed.as_str()))
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let word = line[..pos].trim_start();
        if word.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let candidates = self
            .matching(word)
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((pos - word.len(), candidates))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}
