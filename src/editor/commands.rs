//! Editor command handlers: restore the saved view, run one command, save the new position

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

use super::dispatch::{Command, Dispatcher, Outcome};
use super::tm::TmSuggestion;
use super::{EditView, EditorSession};
use crate::cli::{Commands, SubmitArgs};
use crate::config::{Config, SavedContext, SavedState};
use crate::error::EditorError;
use crate::model::Unit;
use crate::mt::{Apertium, GoogleTranslate, MtProvider};
use crate::server::{ContextRows, HttpApi, SubmitForm};
use crate::text::diff;
use crate::text::escape::html_to_text;
use crate::utils::{colorize_edits, one_line, truncate_display};

const ROW_WIDTH: usize = 60;

/// Maps a CLI subcommand to an editor command; `None` for the ones handled elsewhere
pub fn to_command(command: Commands, current_fragment: &str) -> Option<Command> {
    let command = match command {
        Commands::Browse => Command::Navigate(current_fragment.to_string()),
        Commands::Goto { uid } => Command::GotoUnit(uid),
        Commands::Next => Command::Next,
        Commands::Prev => Command::Previous,
        Commands::Page { number } => Command::GotoPage(number),
        Commands::Filter { name, check } => match check {
            Some(check) if name == "checks" => Command::FilterChecks(check),
            _ => Command::FilterStatus(name),
        },
        Commands::Search { text, fields } => Command::Search {
            text: text.join(" "),
            fields,
        },
        Commands::Submit(args) => Command::Submit(submit_form(args)),
        Commands::Suggest(args) => Command::Suggest(submit_form(args)),
        Commands::Context => Command::MoreContext,
        Commands::Tm => Command::LookupTm,
        Commands::Mt { provider } => Command::MachineTranslate { provider },
        Commands::Copy => Command::CopyOriginal,
        Commands::Accept { suggestion } => Command::AcceptSuggestion(suggestion),
        Commands::Reject { suggestion } => Command::RejectSuggestion(suggestion),
        Commands::RejectCheck { check } => Command::RejectCheck(check),
        Commands::Diff { .. } | Commands::Mask { .. } | Commands::Config(_) => return None,
    };
    Some(command)
}

fn submit_form(args: SubmitArgs) -> SubmitForm {
    SubmitForm {
        targets: args.targets,
        fuzzy: args.fuzzy,
        captcha_answer: args.captcha_answer,
    }
}

pub async fn run(command: Commands, hash: Option<String>, server: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let api = HttpApi::new(config.api_config(server.as_deref())?)
        .context("Failed to set up the HTTP client")?;

    let state_path = config
        .state_path()
        .context("Could not determine state file path")?;
    let saved = SavedState::load(&state_path)?;
    let fragment = hash.unwrap_or(saved.fragment);

    let wants_mt = matches!(command, Commands::Mt { .. });
    let Some(command) = to_command(command, &fragment) else {
        return Ok(());
    };
    let providers = if wants_mt {
        build_providers(&config).await?
    } else {
        Vec::new()
    };

    let mut session = EditorSession::new();
    session.set_suggest_mode(saved.suggest_mode);
    let dispatcher = Dispatcher::new(&api, &providers);

    let spinner = spinner("Loading units...");

    // Every run starts by restoring the view the previous one left behind
    let result = match command {
        Command::Navigate(_) => dispatcher.dispatch(&mut session, command).await,
        command => {
            match dispatcher
                .dispatch(&mut session, Command::Navigate(fragment))
                .await
            {
                Ok(_) => {
                    if let Some(ctx) = saved.context {
                        session.resume_context_gap(ctx.uid, ctx.gap);
                    }
                }
                Err(EditorError::NoResults) if replaces_view(&command) => {
                    debug!("saved view is empty, running {:?} anyway", command)
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    return report(e);
                }
            }
            spinner.set_message("Working...");
            dispatcher.dispatch(&mut session, command).await
        }
    };
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => return report(e),
    };

    print_outcome(&session, &outcome);

    SavedState {
        fragment: session.fragment().to_string(),
        suggest_mode: session.is_suggest_mode(),
        context: session.active_uid.map(|uid| SavedContext {
            uid,
            gap: session.context_gap(),
        }),
    }
    .save(&state_path)?;

    Ok(())
}

/// Commands that load a view of their own and do not need the saved one
fn replaces_view(command: &Command) -> bool {
    matches!(
        command,
        Command::FilterStatus(_) | Command::FilterChecks(_) | Command::Search { .. } | Command::GotoUnit(_)
    )
}

async fn build_providers(config: &Config) -> Result<Vec<Box<dyn MtProvider>>> {
    let mut providers: Vec<Box<dyn MtProvider>> = Vec::new();

    for name in &config.mt.providers {
        match name.as_str() {
            "google" => providers.push(Box::new(GoogleTranslate::new(config.mt.timeout_secs)?)),
            "apertium" => {
                match Apertium::connect(&config.mt.apertium_api_base, config.mt.timeout_secs).await {
                    Ok(apertium) => providers.push(Box::new(apertium)),
                    // A broken provider only disables its own button
                    Err(e) => warn!("apertium unavailable: {}", e),
                }
            }
            other => warn!("unknown MT provider in config: {}", other),
        }
    }

    Ok(providers)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// End-of-list and empty results are messages, everything else fails the run
fn report(err: EditorError) -> Result<()> {
    let banner = err.banner();
    match err {
        EditorError::Terminal(_) | EditorError::NoResults => {
            println!("{}", banner.yellow());
            Ok(())
        }
        EditorError::Provider { .. } => {
            println!("{}", banner.red());
            Ok(())
        }
        err => Err(anyhow::Error::new(err).context(banner)),
    }
}

fn print_outcome(session: &EditorSession, outcome: &Outcome) {
    match outcome {
        Outcome::View(view) => print_view(session, view),
        Outcome::Captcha(markup) => {
            println!("{}", "[Captcha]".yellow());
            println!("  {}", one_line(&html_to_text(markup)));
            println!("Resend with --captcha-answer <answer>");
        }
        Outcome::CheckOptions(checks) => {
            println!("{}", "[Failing checks]".green());
            for check in checks {
                println!("  {:<24} {}", check.name.cyan(), check.text);
            }
            println!("Filter with: ptl-editor filter checks --check <name>");
        }
        Outcome::Context(rows) => print_context(rows),
        Outcome::Tm(None) => println!("{}", "No translation memory matches".yellow()),
        Outcome::Tm(Some(suggestions)) => print_tm(session, suggestions),
        Outcome::SuggestionAccepted { targets, .. } => {
            println!("{}", "[Suggestion accepted]".green());
            print_forms("target", targets);
        }
        Outcome::MachineTranslated(targets) => {
            println!("{}", "[Machine translation]".green());
            print_forms("target", targets);
            println!("Review, then: ptl-editor submit --fuzzy <targets>");
        }
        Outcome::Copied(copied) => {
            println!("{}", "[Copied source]".green());
            print_forms("target", &copied.targets);
        }
        Outcome::Updated => println!("{}", "Done".green()),
    }
}

fn print_forms(label: &str, forms: &[String]) {
    for (i, form) in forms.iter().enumerate() {
        println!("  {}[{}] {}", label, i, one_line(form));
    }
}

fn highlight(text: &str, pattern: Option<&Regex>) -> String {
    match pattern {
        Some(re) => re
            .replace_all(text, |caps: &regex::Captures| caps[0].yellow().bold().to_string())
            .into_owned(),
        None => text.to_string(),
    }
}

fn row(unit: &Unit, pattern: Option<&Regex>) -> String {
    let source = truncate_display(&one_line(unit.source_text()), ROW_WIDTH / 2);
    let target = truncate_display(&one_line(unit.target_text()), ROW_WIDTH / 2);
    let mark = if unit.isfuzzy { "~" } else { " " };
    format!(
        "{:>6} {} {:<32} | {}",
        unit.id,
        mark,
        highlight(&source, pattern),
        highlight(&target, pattern)
    )
}

fn print_view(session: &EditorSession, view: &EditView) {
    let pattern = session.filter.highlight_pattern();
    let (dir, store) = session.breadcrumbs();

    println!(
        "{} {}/{}  {} {}",
        "Page".green(),
        view.page,
        view.num_pages,
        "filter:".green(),
        session.filter.filter
    );
    if let Some(crumbs) = store.or(dir) {
        println!("{}", one_line(&html_to_text(crumbs)).dimmed());
    }

    for uid in &view.before {
        if let Some(unit) = session.cache.unit(*uid) {
            println!("{}", row(unit, pattern.as_ref()).dimmed());
        }
    }

    if let Some(unit) = session.cache.unit(view.uid) {
        for ctxt in &view.context.before {
            println!("  ctx  {}", one_line(ctxt.source_text()).italic().dimmed());
        }
        println!("{} {}", ">".green().bold(), format!("unit {}", unit.id).bold());
        for (i, form) in unit.source.iter().enumerate() {
            println!("  source[{}] {}", i, highlight(&one_line(&form.text), pattern.as_ref()));
        }
        for (i, form) in unit.target.iter().enumerate() {
            println!("  target[{}] {}", i, highlight(&one_line(&form.text), pattern.as_ref()));
        }
        if view.fuzzy {
            println!("  {}", "fuzzy".yellow());
        }
        if session.is_suggest_mode() {
            println!("  {}", "suggest mode".cyan());
        }
        for ctxt in &view.context.after {
            println!("  ctx  {}", one_line(ctxt.source_text()).italic().dimmed());
        }
    }

    for uid in &view.after {
        if let Some(unit) = session.cache.unit(*uid) {
            println!("{}", row(unit, pattern.as_ref()).dimmed());
        }
    }
}

fn print_context(rows: &ContextRows) {
    println!("{}", "[Context]".green());
    for unit in &rows.before {
        println!("  {:>6} {}", unit.id, one_line(unit.source_text()).dimmed());
    }
    println!("  {}", "...".dimmed());
    for unit in &rows.after {
        println!("  {:>6} {}", unit.id, one_line(unit.source_text()).dimmed());
    }
}

fn print_tm(session: &EditorSession, suggestions: &[TmSuggestion]) {
    let source = session
        .active_uid
        .and_then(|uid| session.cache.unit(uid))
        .map(|u| u.source_text().to_string())
        .unwrap_or_default();

    println!("{}", "[Translation memory]".green());
    for s in suggestions {
        let by = s
            .username
            .as_deref()
            .map(|u| format!(" by {}", u))
            .unwrap_or_default();
        println!("  {}{}", s.title.cyan(), by.dimmed());
        println!("    {}", colorize_edits(&diff::diff(&source, &s.source)));
        println!("    {}", one_line(&html_to_text(&s.target)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_with_check_maps_to_check_filter() {
        let cmd = to_command(
            Commands::Filter {
                name: "checks".into(),
                check: Some("printf".into()),
            },
            "",
        );
        assert_eq!(cmd, Some(Command::FilterChecks("printf".into())));

        let cmd = to_command(
            Commands::Filter {
                name: "fuzzy".into(),
                check: Some("printf".into()),
            },
            "",
        );
        assert_eq!(cmd, Some(Command::FilterStatus("fuzzy".into())));
    }

    #[test]
    fn test_browse_uses_current_fragment() {
        assert_eq!(
            to_command(Commands::Browse, "unit=4"),
            Some(Command::Navigate("unit=4".into()))
        );
    }

    #[test]
    fn test_offline_commands_are_not_editor_commands() {
        assert_eq!(
            to_command(
                Commands::Mask {
                    text: "%s".into()
                },
                ""
            ),
            None
        );
    }

    #[test]
    fn test_search_words_are_joined() {
        let cmd = to_command(
            Commands::Search {
                text: vec!["open".into(), "file".into()],
                fields: vec!["notes".into()],
            },
            "",
        );
        assert_eq!(
            cmd,
            Some(Command::Search {
                text: "open file".into(),
                fields: vec!["notes".into()],
            })
        );
    }

    #[test]
    fn test_terminal_errors_are_reported_not_failed() {
        assert!(report(EditorError::Terminal("You reached the end of the list".into())).is_ok());
        assert!(report(EditorError::NoResults).is_ok());
        assert!(report(EditorError::Timeout).is_err());
    }
}
