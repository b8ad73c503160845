//! Language switching: the restart prompt, its messages and the relaunch host.

use anyhow::{Context, Result};
use std::{
    env, io,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::info;

/// Answer to the "restart now?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartChoice {
    /// Save the language and restart now.
    Confirmed,
    /// Save the language, apply it next launch.
    Deferred,
    /// Keep the current language.
    Cancelled,
}

/// What `change_language` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageChange {
    /// A new instance was launched; the caller must exit now.
    /// Readings that were never exported are gone with this process.
    Restarting { discarded_readings: usize },
    SavedForNextLaunch,
    Cancelled,
}

/// Message boxes.
pub trait UserDialogs {
    fn ask_restart(&mut self, message: &str) -> Result<RestartChoice>;

    fn notify(&mut self, message: &str);
}

/// Launches the replacement process.
pub trait ProcessHost {
    fn current_exe(&self) -> io::Result<PathBuf>;

    fn relaunch(&mut self, exe: &Path) -> Result<()>;
}

/// Spawns the executable with no arguments and leaves it running.
#[derive(Debug, Default)]
pub struct SystemHost;

impl ProcessHost for SystemHost {
    fn current_exe(&self) -> io::Result<PathBuf> {
        env::current_exe()
    }

    fn relaunch(&mut self, exe: &Path) -> Result<()> {
        let child = Command::new(exe)
            .spawn()
            .with_context(|| format!("Failed to relaunch {}", exe.display()))?;
        info!(pid = child.id(), exe = %exe.display(), "relaunched");
        Ok(())
    }
}

/// The binary to relaunch.
///
/// Platforms without an executable suffix get `current` back untouched, so
/// dotted names like `weather-0.2` survive. Elsewhere the suffix is forced.
pub fn restart_target(current: &Path) -> PathBuf {
    let suffix = env::consts::EXE_EXTENSION;
    let has_suffix = current
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(suffix));

    if suffix.is_empty() || has_suffix {
        current.to_path_buf()
    } else {
        current.with_extension(suffix)
    }
}

/// User-facing strings for the persisted language; English unless French is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub restart: &'static str,
    pub restart_later: &'static str,
    pub never_mind: &'static str,
    pub no_api_key: &'static str,
}

const EN: Messages = Messages {
    restart: "The application must restart to change the language. Restart now?",
    restart_later: "The new language will be used the next time the application starts.",
    never_mind: "Language unchanged.",
    no_api_key: "No API key, please configure one.",
};

const FR: Messages = Messages {
    restart: "L'application doit redémarrer pour changer de langue. Redémarrer maintenant?",
    restart_later: "La nouvelle langue sera utilisée au prochain démarrage de l'application.",
    never_mind: "Langue inchangée.",
    no_api_key: "Aucune clé API, veuillez la configurer.",
};

impl Messages {
    pub fn for_language(language: &str) -> Self {
        let primary = language.split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("fr") { FR } else { EN }
    }
}
