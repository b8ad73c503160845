//! Interactive terminal front-end: inquire prompts stand in for the file and
//! message dialogs, and a menu loop dispatches commands to the orchestrator.

use anyhow::Result;
use inquire::{InquireError, Select, Text};
use std::{fmt, path::PathBuf};
use tracing::{debug, info};
use weather_core::{
    Collaborators, FileDialogOptions, FileGateway, ImportOutcome, LanguageChange, LaunchProfile,
    Orchestrator, PageId, RestartChoice, SystemHost, TomlSettings, UserDialogs,
};

/// Esc and Ctrl-C both count as "the user cancelled".
fn optional<T>(res: Result<T, InquireError>) -> Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn non_empty_path(answer: Option<String>) -> Option<PathBuf> {
    answer
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

#[derive(Debug, Default)]
pub struct TerminalFiles;

impl FileGateway for TerminalFiles {
    fn prompt_save_path(&mut self, options: &FileDialogOptions) -> Result<Option<PathBuf>> {
        let help = options.describe();
        let answer = optional(Text::new("Save readings to:").with_help_message(&help).prompt())?;

        Ok(non_empty_path(answer).map(|path| options.apply_default_extension(path)))
    }

    fn prompt_open_path(&mut self, options: &FileDialogOptions) -> Result<Option<PathBuf>> {
        let help = options.describe();
        let answer = optional(Text::new("Import readings from:").with_help_message(&help).prompt())?;

        Ok(non_empty_path(answer).map(|path| {
            if path.exists() { path } else { options.apply_default_extension(path) }
        }))
    }
}

#[derive(Debug, Default)]
pub struct TerminalDialogs;

impl UserDialogs for TerminalDialogs {
    fn ask_restart(&mut self, message: &str) -> Result<RestartChoice> {
        let choices = vec!["Yes", "No", "Cancel"];
        let answer = optional(Select::new(message, choices).prompt())?;

        Ok(match answer {
            Some("Yes") => RestartChoice::Confirmed,
            Some("No") => RestartChoice::Deferred,
            _ => RestartChoice::Cancelled,
        })
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

pub fn orchestrator(settings: TomlSettings, profile: &LaunchProfile) -> Orchestrator {
    Orchestrator::new(
        Collaborators {
            settings: Box::new(settings),
            files: Box::new(TerminalFiles),
            dialogs: Box::new(TerminalDialogs),
            host: Box::new(SystemHost),
        },
        profile,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Fetch,
    SetCity,
    SetApiKey,
    GoTo(PageId),
    Export,
    Import,
    Language,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fetch => f.write_str("Fetch current temperature"),
            Action::SetCity => f.write_str("Change city"),
            Action::SetApiKey => f.write_str("Set API key"),
            Action::GoTo(page) => write!(f, "Go to {page} page"),
            Action::Export => f.write_str("Export readings"),
            Action::Import => f.write_str("Import readings"),
            Action::Language => f.write_str("Change language"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// Menu entries for the current state; export only shows up when it can run.
fn actions(page: PageId, can_export: bool) -> Vec<Action> {
    let mut actions = match page {
        PageId::Temperature => vec![Action::Fetch, Action::SetCity, Action::GoTo(PageId::Configuration)],
        PageId::Configuration => vec![Action::SetApiKey, Action::GoTo(PageId::Temperature)],
    };

    if can_export {
        actions.push(Action::Export);
    }
    actions.extend([Action::Import, Action::Language, Action::Quit]);
    actions
}

const LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("fr", "Français")];

fn render(app: &Orchestrator) {
    println!();
    match app.active_page() {
        PageId::Temperature => {
            let page = app.temperature();
            let city = if page.city().is_empty() { "(no city)" } else { page.city() };
            println!("== Temperature: {city} ==");

            if !page.raw_text().is_empty() {
                println!("{}", page.raw_text());
            }
            for reading in page.readings().unwrap_or_default() {
                println!("  {reading}");
            }
        }
        PageId::Configuration => {
            println!("== Configuration ==");
            println!("API key: {}", mask(app.configuration().api_key()));
            println!("Language: {}", app.settings().language());
        }
    }
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }

    let count = key.chars().count();
    let visible = if count > 4 { 4 } else { 0 };
    let tail: String = key.chars().skip(count - visible).collect();
    format!("{}{tail}", "*".repeat(count - visible))
}

/// Prompt for a new key and commit it. Returns false when the prompt was cancelled.
pub fn edit_api_key(app: &mut Orchestrator) -> Result<bool> {
    let current = app.configuration().api_key().to_string();
    let answer = optional(Text::new("OpenWeather API key:").with_initial_value(&current).prompt())?;

    let Some(key) = answer else {
        return Ok(false);
    };
    app.configuration_mut().set_api_key(key);
    app.save_configuration()?;
    Ok(true)
}

fn report(err: impl Into<anyhow::Error>) {
    let err = err.into();
    debug!(error = ?err, "command failed");
    eprintln!("Error: {err:#}");
}

/// Run the menu loop until the user quits or a restart takes over.
pub async fn run(app: &mut Orchestrator) -> Result<()> {
    loop {
        render(app);

        let menu = actions(app.active_page(), app.can_export());
        let Some(action) = optional(Select::new("What next?", menu).prompt())? else {
            return Ok(());
        };

        match action {
            Action::Fetch => match app.fetch_temperature().await {
                Ok(Some(_)) => {}
                Ok(None) => println!("{}", app.messages().no_api_key),
                Err(err) => report(err),
            },
            Action::SetCity => {
                let current = app.temperature().city().to_string();
                if let Some(city) = optional(Text::new("City:").with_initial_value(&current).prompt())? {
                    if let Err(err) = app.set_city(&city) {
                        report(err);
                    }
                }
            }
            Action::SetApiKey => {
                if let Err(err) = edit_api_key(app) {
                    report(err);
                }
            }
            Action::GoTo(page) => app.navigate_to(page),
            Action::Export => match app.export() {
                Ok(Some(path)) => println!("Readings written to {}", path.display()),
                Ok(None) => {}
                Err(err) => report(err),
            },
            Action::Import => match app.import() {
                Ok(ImportOutcome::Replaced(count)) => println!("{count} readings imported."),
                Ok(ImportOutcome::Empty) => println!("The file is empty; nothing imported."),
                Ok(ImportOutcome::Cancelled) => {}
                Err(err) => report(err),
            },
            Action::Language => {
                let labels: Vec<&str> = LANGUAGES.iter().map(|(_, label)| *label).collect();
                let Some(label) = optional(Select::new("Language:", labels).prompt())? else {
                    continue;
                };
                let Some((code, _)) = LANGUAGES.iter().find(|(_, l)| *l == label) else {
                    continue;
                };

                match app.change_language(code) {
                    Ok(LanguageChange::Restarting { discarded_readings }) => {
                        info!(discarded_readings, "exiting for restart");
                        return Ok(());
                    }
                    Ok(_) => {}
                    Err(err) => report(err),
                }
            }
            Action::Quit => return Ok(()),
        }
    }
}
