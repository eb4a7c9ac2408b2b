//! Command handlers and the static registry the shell dispatches through.

use once_cell::sync::Lazy;

use crate::{
    cli::{
        context::{CliMode, CommandError, CommandResult, ShellContext},
        io as cli_io, output,
        registry::{CommandEntry, CommandRegistry},
    },
    core::{
        onboarding::{register_account, EntryRoute},
        validate, FolderUpdate, PeriodInput, SummaryService,
    },
    domain::{Displayable, PeriodState},
    utils::build_info,
};

pub(crate) static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| {
    let mut registry = CommandRegistry::new();
    register_all(&mut registry);
    registry
});

fn register_all(registry: &mut CommandRegistry) {
    let entries = [
        CommandEntry::new("help", "Show available commands", "help [command]", cmd_help),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "register",
            "Create an account and sign in",
            "register <name> <email> [password]",
            cmd_register,
        ),
        CommandEntry::new(
            "login",
            "Sign in and load your budget",
            "login <email> [password]",
            cmd_login,
        ),
        CommandEntry::new("logout", "Sign out", "logout", cmd_logout),
        CommandEntry::new(
            "setup",
            "Set the budget amount and period",
            "setup <amount> <start YYYY-MM-DD> <end YYYY-MM-DD>",
            cmd_setup,
        ),
        CommandEntry::new(
            "edit-budget",
            "Change the budget amount and period",
            "edit-budget <amount> <start YYYY-MM-DD> <end YYYY-MM-DD>",
            cmd_edit_budget,
        ),
        CommandEntry::new("folders", "List folders", "folders", cmd_folders),
        CommandEntry::new(
            "add-folder",
            "Create a spending folder",
            "add-folder <name> <allocated>",
            cmd_add_folder,
        ),
        CommandEntry::new(
            "update-folder",
            "Rename or re-allocate a folder",
            "update-folder <folder> [--name <name>] [--budget <amount>]",
            cmd_update_folder,
        ),
        CommandEntry::new(
            "spend",
            "Record an expense against a folder",
            "spend <folder> <amount>",
            cmd_spend,
        ),
        CommandEntry::new(
            "delete-folder",
            "Delete a folder",
            "delete-folder <folder>",
            cmd_delete_folder,
        ),
        CommandEntry::new(
            "profile",
            "Show budget, period and spend",
            "profile [--json]",
            cmd_profile,
        ),
        CommandEntry::new(
            "sync",
            "Retry saving folders that failed to save",
            "sync",
            cmd_sync,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ];
    for entry in entries {
        registry.register(entry);
    }
    registry.alias("quit", "exit");
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match REGISTRY.get(&name.to_lowercase()) {
            Some(entry) => {
                output::section(format!("Help: {}", entry.name));
                output::info(format!("  Description: {}", entry.description));
                output::info(format!("  Usage: {}", entry.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    output::section("Available commands");
    for entry in REGISTRY.list() {
        output::line(format!("  {:<14} {}", entry.name, entry.description));
    }
    output::hint("Use `help <command>` for details.");
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Budget Folders {}", meta.version));
    output::line(format!("  Build hash : {}", meta.git_hash));
    output::line(format!("  Built at   : {}", meta.timestamp));
    output::line(format!("  Profile    : {}", meta.profile));
    output::line(format!("  Rustc      : {}", meta.rustc));
    Ok(())
}

fn password_arg(
    context: &ShellContext,
    arg: Option<&&str>,
    usage: &str,
) -> Result<String, CommandError> {
    match (arg, context.mode) {
        (Some(password), _) => Ok((*password).to_string()),
        (None, CliMode::Interactive) => cli_io::prompt_password(&context.theme, "Password"),
        (None, CliMode::Script) => Err(CommandError::usage(usage)),
    }
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "register <name> <email> [password]";
    let [name, email, rest @ ..] = args else {
        return Err(CommandError::usage(USAGE));
    };
    let password = password_arg(context, rest.first(), USAGE)?;
    let session = register_account(
        context.auth.as_ref(),
        context.store.as_ref(),
        name,
        email,
        &password,
    )?;
    let record = context.sign_in(session)?;
    output::success(format!("Welcome, {}! Your account is ready.", record.display_name()));
    announce_route(EntryRoute::for_record(&record));
    Ok(())
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "login <email> [password]";
    let [email, rest @ ..] = args else {
        return Err(CommandError::usage(USAGE));
    };
    let password = password_arg(context, rest.first(), USAGE)?;
    if context.session.is_some() {
        context.sign_out()?;
    }
    let session = context.auth.authenticate(email, &password)?;
    let record = context.sign_in(session)?;
    output::success(format!("Signed in as {}.", record.display_name()));
    announce_route(EntryRoute::for_record(&record));
    Ok(())
}

fn announce_route(route: EntryRoute) {
    match route {
        EntryRoute::BudgetSetup => output::hint(
            "No budget yet. Run `setup <amount> <start YYYY-MM-DD> <end YYYY-MM-DD>`.",
        ),
        EntryRoute::Home => output::hint("Run `profile` for an overview or `folders` to list folders."),
    }
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.sign_out()? {
        output::success("Signed out.");
    } else {
        output::info("Not signed in.");
    }
    Ok(())
}

fn period_input(args: &[&str], usage: &str) -> Result<PeriodInput, CommandError> {
    let [amount, start, end] = args else {
        return Err(CommandError::usage(usage));
    };
    Ok(PeriodInput::parse(amount, start, end)?)
}

fn cmd_setup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.require_session()?;
    let input = period_input(args, "setup <amount> <start> <end>")?;
    context.periods.setup(&session, input)?;
    output::success(format!(
        "Budget set to {} from {} to {}.",
        context.format_amount(input.amount),
        input.start_date,
        input.end_date
    ));
    Ok(())
}

fn cmd_edit_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.require_session()?;
    let input = period_input(args, "edit-budget <amount> <start> <end>")?;
    context.periods.edit(&session, input)?;
    output::success(format!(
        "Budget updated to {} from {} to {}.",
        context.format_amount(input.amount),
        input.start_date,
        input.end_date
    ));
    Ok(())
}

fn cmd_folders(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.require_session()?;
    let folders = context.ledger.folders();
    if folders.is_empty() {
        output::info("No folders yet. Use `add-folder <name> <allocated>`.");
        return Ok(());
    }

    output::section("Folders");
    output::line(format!(
        "  {:<15} {:<20} {:>12} {:>12} {:>12}",
        "ID", "Name", "Allocated", "Spent", "Remaining"
    ));
    for folder in folders {
        let marker = if folder.is_overspent() { " !" } else { "" };
        output::line(format!(
            "  {:<15} {:<20} {:>12} {:>12} {:>12}{}",
            folder.id,
            folder.name,
            context.format_amount(folder.allocated_budget),
            context.format_amount(folder.spent_so_far),
            context.format_amount(folder.remaining()),
            marker
        ));
    }
    if context.periods.state() == PeriodState::Set {
        let total = context.periods.read().budget_amount;
        output::line(format!(
            "  Unallocated: {}",
            context.format_amount(context.ledger.unallocated_budget(total))
        ));
    }
    Ok(())
}

fn cmd_add_folder(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "add-folder <name> <allocated>";
    let session = context.require_session()?;
    let [name, allocated] = args else {
        return Err(CommandError::usage(USAGE));
    };
    let allocated = validate::parse_amount(allocated, "allocated budget")?;
    let id = context.ledger.add_folder(&session, name, allocated)?;
    output::success(format!(
        "Added folder `{}` ({}) with {} allocated.",
        name.trim(),
        id,
        context.format_amount(allocated)
    ));
    Ok(())
}

fn cmd_update_folder(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "update-folder <folder> [--name <name>] [--budget <amount>]";
    let session = context.require_session()?;
    let Some((folder, mut rest)) = args.split_first() else {
        return Err(CommandError::usage(USAGE));
    };

    let mut update = FolderUpdate::default();
    while let Some((flag, tail)) = rest.split_first() {
        let Some((value, tail)) = tail.split_first() else {
            return Err(CommandError::usage(USAGE));
        };
        match *flag {
            "--name" => update.name = Some((*value).to_string()),
            "--budget" => {
                update.allocated_budget =
                    Some(validate::parse_amount(value, "allocated budget")?)
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{}`",
                    other
                )))
            }
        }
        rest = tail;
    }
    if update == FolderUpdate::default() {
        return Err(CommandError::usage(USAGE));
    }

    let id = context.resolve_folder(folder)?;
    context.ledger.update_folder(&session, &id, update)?;
    output::success(format!("Updated folder {}.", id));
    Ok(())
}

fn cmd_spend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.require_session()?;
    let [folder, amount] = args else {
        return Err(CommandError::usage("spend <folder> <amount>"));
    };
    let amount = validate::parse_amount(amount, "expense amount")?;
    let id = context.resolve_folder(folder)?;
    let remaining = context.ledger.post_expense(&session, &id, amount)?;
    output::success(format!(
        "Recorded {}. {} left in this folder.",
        context.format_amount(amount),
        context.format_amount(remaining)
    ));
    if remaining < 0.0 {
        output::warning("This folder is overspent.");
    }
    Ok(())
}

fn cmd_delete_folder(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.require_session()?;
    let [folder] = args else {
        return Err(CommandError::usage("delete-folder <folder>"));
    };
    let id = context.resolve_folder(folder)?;

    if context.mode == CliMode::Interactive {
        if let Some(existing) = context.ledger.folder(&id) {
            let prompt = format!("Delete folder {}?", existing.display_label());
            if !cli_io::confirm_action(&context.theme, &prompt, false)? {
                output::info("Operation cancelled.");
                return Ok(());
            }
        }
    }

    match context.ledger.delete_folder(&session, &id)? {
        Some(removed) => output::success(format!("Deleted folder `{}`.", removed.name)),
        None => output::info(format!("No folder matches `{}`; nothing deleted.", folder)),
    }
    Ok(())
}

fn cmd_profile(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_session()?;
    let as_json = match args {
        [] => false,
        ["--json"] => true,
        _ => return Err(CommandError::usage("profile [--json]")),
    };
    let (name, email) = context
        .profile
        .as_ref()
        .map(|profile| (profile.name.as_str(), profile.email.as_str()))
        .unwrap_or(("User", ""));
    let period = context.periods.read();
    let summary = SummaryService::from_parts(name, email, period, context.ledger.folders());

    if as_json {
        output::line(serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::section(format!("Hello, {}", summary.name));
    output::line(format!("  Email      : {}", summary.email));
    if !summary.budget_set {
        output::line("  Budget     : not set");
        output::hint("Run `setup <amount> <start> <end>` to configure your budget.");
        return Ok(());
    }
    output::line(format!(
        "  Budget     : {}",
        context.format_amount(summary.budget_amount)
    ));
    if let Some(dates) = period.dates {
        let status = if dates.contains(context.clock.today()) {
            "active"
        } else {
            "not active today"
        };
        output::line(format!(
            "  Period     : {} to {} ({})",
            dates.start_date, dates.end_date, status
        ));
    }
    if let Some(days) = SummaryService::days_left(period, context.clock.today()) {
        output::line(format!("  Days left  : {}", days));
    }
    output::line(format!(
        "  Spent      : {}",
        context.format_amount(summary.total_spent)
    ));
    output::line(format!(
        "  Remaining  : {}",
        context.format_amount(summary.remaining_budget)
    ));
    for folder in summary.overspent_folders() {
        output::warning(format!(
            "`{}` is overspent by {}",
            folder.name,
            context.format_amount(-folder.remaining)
        ));
    }
    Ok(())
}

fn cmd_sync(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.require_session()?;
    let was_dirty = context.ledger.is_dirty();
    context.ledger.sync(&session)?;
    if was_dirty {
        output::success("Folders saved.");
    } else {
        output::info("Folders already up to date.");
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
