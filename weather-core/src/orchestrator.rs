//! Application-level view model: active page, service handoff between pages,
//! command gating, JSON import/export and the language switch.
//!
//! Every command runs to completion on the caller's thread before the next
//! one starts. File handles live only for the duration of a single
//! `read_all_text`/`write_all_text` call.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::{LaunchProfile, SettingsStore},
    error::AppError,
    files::{FileDialogOptions, FileGateway},
    language::{LanguageChange, Messages, ProcessHost, RestartChoice, UserDialogs, restart_target},
    model::{TemperatureReading, readings_from_json, readings_to_json},
    page::{ConfigurationPage, PageId, TemperaturePage},
    provider::{ServiceFactory, ServiceHandle, openweather_factory},
};

/// External services the orchestrator talks to.
pub struct Collaborators {
    pub settings: Box<dyn SettingsStore>,
    pub files: Box<dyn FileGateway>,
    pub dialogs: Box<dyn UserDialogs>,
    pub host: Box<dyn ProcessHost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Cancelled,
    /// The file was empty; the readings were left alone.
    Empty,
    Replaced(usize),
}

pub struct Orchestrator {
    settings: Box<dyn SettingsStore>,
    files: Box<dyn FileGateway>,
    dialogs: Box<dyn UserDialogs>,
    host: Box<dyn ProcessHost>,
    factory: ServiceFactory,
    service: Option<ServiceHandle>,
    temperature: TemperaturePage,
    configuration: ConfigurationPage,
    active: watch::Sender<PageId>,
    save_path: Option<PathBuf>,
    open_path: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, profile: &LaunchProfile) -> Self {
        Self::with_factory(collaborators, profile, openweather_factory())
    }

    /// Build the pages and, if a key is available, the weather service.
    pub fn with_factory(
        collaborators: Collaborators,
        profile: &LaunchProfile,
        factory: ServiceFactory,
    ) -> Self {
        let Collaborators { settings, files, dialogs, host } = collaborators;

        let mut temperature = TemperaturePage::new(settings.city());
        let service = profile.resolve_api_key(settings.as_ref()).map(|key| factory(&key));

        match &service {
            Some(handle) => temperature.set_service(handle.clone()),
            None => {
                info!("no API key configured; weather service not created");
                temperature.set_raw_text(Messages::for_language(&settings.language()).no_api_key);
            }
        }

        let configuration = ConfigurationPage::new(settings.api_key());
        let (active, _) = watch::channel(PageId::all()[0]);

        Self {
            settings,
            files,
            dialogs,
            host,
            factory,
            service,
            temperature,
            configuration,
            active,
            save_path: None,
            open_path: None,
        }
    }

    pub fn active_page(&self) -> PageId {
        *self.active.borrow()
    }

    /// Registered pages in registration order.
    pub fn pages(&self) -> &'static [PageId] {
        PageId::all()
    }

    /// Receives every active-page change.
    pub fn subscribe(&self) -> watch::Receiver<PageId> {
        self.active.subscribe()
    }

    pub fn temperature(&self) -> &TemperaturePage {
        &self.temperature
    }

    pub fn temperature_mut(&mut self) -> &mut TemperaturePage {
        &mut self.temperature
    }

    pub fn configuration(&self) -> &ConfigurationPage {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut ConfigurationPage {
        &mut self.configuration
    }

    pub fn service(&self) -> Option<&ServiceHandle> {
        self.service.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn messages(&self) -> Messages {
        Messages::for_language(&self.settings.language())
    }

    /// Last path chosen in the save prompt.
    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// Last path chosen in the open prompt.
    pub fn open_path(&self) -> Option<&Path> {
        self.open_path.as_deref()
    }

    /// Switch to the page named `target`.
    ///
    /// Unknown names are rejected before anything else happens.
    pub fn navigate(&mut self, target: &str) -> Result<PageId, AppError> {
        let target = PageId::try_from(target)?;
        self.navigate_to(target);
        Ok(target)
    }

    pub fn navigate_to(&mut self, target: PageId) {
        let leaving = self.active_page();
        if leaving == PageId::Configuration {
            self.sync_service();
        }

        info!(from = %leaving, to = %target, "page changed");
        self.active.send_replace(target);
    }

    /// Push the configured key into the service and hand it to the temperature page.
    fn sync_service(&mut self) {
        let key = self.settings.api_key();

        match &self.service {
            Some(handle) if !key.is_empty() => {
                debug!("rebinding weather service key");
                handle.set_api_key(&key);
            }
            Some(_) => debug!("configured key is empty; keeping current service key"),
            None if !key.is_empty() => {
                debug!("creating weather service from configured key");
                self.service = Some((self.factory)(&key));
            }
            None => debug!("still no API key configured"),
        }

        if !self.temperature.has_service() {
            if let Some(handle) = &self.service {
                self.temperature.set_service(handle.clone());
                self.temperature.set_raw_text("");
            }
        }
    }

    /// Commit the configuration page's key to settings.
    pub fn save_configuration(&mut self) -> Result<(), AppError> {
        self.settings.set_api_key(self.configuration.api_key());
        self.settings.save()?;
        info!("configuration saved");
        Ok(())
    }

    /// Set the temperature page's city and remember it for next launch.
    pub fn set_city(&mut self, city: &str) -> Result<(), AppError> {
        let city = city.trim();
        self.temperature.set_city(city);
        self.settings.set_city(city);
        self.settings.save()?;
        Ok(())
    }

    pub async fn fetch_temperature(&mut self) -> Result<Option<TemperatureReading>, AppError> {
        Ok(self.temperature.fetch().await?.cloned())
    }

    /// True when the temperature page holds a reading list, even an empty one.
    pub fn can_export(&self) -> bool {
        self.temperature.readings().is_some()
    }

    /// Ask for a destination and write the readings there as indented JSON.
    ///
    /// Returns the written path, or `None` when the prompt was cancelled.
    pub fn export(&mut self) -> Result<Option<PathBuf>, AppError> {
        let Some(readings) = self.temperature.readings() else {
            return Err(AppError::NothingToExport);
        };
        let json = readings_to_json(readings).map_err(AppError::Serialize)?;
        let count = readings.len();

        let Some(path) = self.files.prompt_save_path(&FileDialogOptions::json())? else {
            debug!("export cancelled");
            return Ok(None);
        };
        self.save_path = Some(path.clone());

        self.files
            .write_all_text(&path, &json)
            .map_err(|source| AppError::Write { path: path.clone(), source })?;

        info!(path = %path.display(), count, "readings exported");
        Ok(Some(path))
    }

    /// Ask for a source file and replace the readings with its content.
    ///
    /// The current readings stay untouched unless the whole file parses.
    pub fn import(&mut self) -> Result<ImportOutcome, AppError> {
        let Some(path) = self.files.prompt_open_path(&FileDialogOptions::json())? else {
            debug!("import cancelled");
            return Ok(ImportOutcome::Cancelled);
        };
        self.open_path = Some(path.clone());

        let content = self
            .files
            .read_all_text(&path)
            .map_err(|source| AppError::Read { path: path.clone(), source })?;

        if content.trim().is_empty() {
            info!(path = %path.display(), "import file is empty; readings unchanged");
            return Ok(ImportOutcome::Empty);
        }

        let readings = readings_from_json(&content)
            .map_err(|source| AppError::MalformedImport { path: path.clone(), source })?;
        let count = readings.len();
        self.temperature.replace_readings(readings);

        info!(path = %path.display(), count, "readings imported");
        Ok(ImportOutcome::Replaced(count))
    }

    /// Ask whether to restart for the new language and act on the answer.
    ///
    /// On `Restarting` the replacement process is already running and the
    /// caller must exit without further work.
    pub fn change_language(&mut self, language: &str) -> Result<LanguageChange, AppError> {
        let messages = self.messages();

        match self.dialogs.ask_restart(messages.restart)? {
            RestartChoice::Confirmed => {
                self.persist_language(language)?;

                // The language is already saved; it applies next launch even if relaunching fails.
                if let Err(err) = self.relaunch() {
                    self.dialogs.notify(messages.restart_later);
                    return Err(err.into());
                }

                let discarded_readings = self.temperature.readings().map_or(0, <[_]>::len);
                if discarded_readings > 0 {
                    warn!(discarded_readings, "restarting with unexported readings");
                }
                info!(language, "language changed; restarting");
                Ok(LanguageChange::Restarting { discarded_readings })
            }
            RestartChoice::Deferred => {
                self.persist_language(language)?;
                self.dialogs.notify(messages.restart_later);
                info!(language, "language changed for next launch");
                Ok(LanguageChange::SavedForNextLaunch)
            }
            RestartChoice::Cancelled => {
                self.dialogs.notify(messages.never_mind);
                Ok(LanguageChange::Cancelled)
            }
        }
    }

    fn relaunch(&mut self) -> anyhow::Result<()> {
        let exe = self
            .host
            .current_exe()
            .context("Failed to locate the running executable")?;
        self.host.relaunch(&restart_target(&exe))
    }

    fn persist_language(&mut self, language: &str) -> Result<(), AppError> {
        self.settings.set_language(language);
        self.settings.save()?;
        Ok(())
    }
}
