//! In-memory collaborators for unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    io,
    path::{Path, PathBuf},
    rc::Rc,
    sync::{Arc, Mutex},
};

use crate::{
    config::{Config, SettingsStore},
    files::{FileDialogOptions, FileGateway},
    language::{ProcessHost, RestartChoice, UserDialogs},
    model::{WeatherRequest, WeatherResponse},
    provider::{ServiceFactory, ServiceHandle, WeatherProvider},
};

#[derive(Debug, Default)]
struct SettingsState {
    config: Config,
    saved: Vec<Config>,
}

/// Settings kept in memory; every `save` snapshots the config.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    state: Rc<RefCell<SettingsState>>,
}

impl MemorySettings {
    pub fn with_api_key(key: &str) -> Self {
        let settings = Self::default();
        settings.state.borrow_mut().config.api_key = key.to_string();
        settings
    }

    pub fn saved(&self) -> Vec<Config> {
        self.state.borrow().saved.clone()
    }
}

impl SettingsStore for MemorySettings {
    fn api_key(&self) -> String {
        self.state.borrow().config.api_key.clone()
    }

    fn set_api_key(&mut self, key: &str) {
        self.state.borrow_mut().config.api_key = key.to_string();
    }

    fn language(&self) -> String {
        self.state.borrow().config.language.clone()
    }

    fn set_language(&mut self, language: &str) {
        self.state.borrow_mut().config.language = language.to_string();
    }

    fn city(&self) -> String {
        self.state.borrow().config.city.clone()
    }

    fn set_city(&mut self, city: &str) {
        self.state.borrow_mut().config.city = city.to_string();
    }

    fn save(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let snapshot = state.config.clone();
        state.saved.push(snapshot);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FilesState {
    save_answers: VecDeque<Option<PathBuf>>,
    open_answers: VecDeque<Option<PathBuf>>,
    files: HashMap<PathBuf, String>,
    prompts: Vec<FileDialogOptions>,
    reads: usize,
    writes: usize,
}

/// Scripted prompt answers over an in-memory file map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    state: Rc<RefCell<FilesState>>,
}

impl MemoryFiles {
    pub fn answer_save(&self, answer: Option<&str>) {
        self.state.borrow_mut().save_answers.push_back(answer.map(PathBuf::from));
    }

    pub fn answer_open(&self, answer: Option<&str>) {
        self.state.borrow_mut().open_answers.push_back(answer.map(PathBuf::from));
    }

    pub fn put(&self, path: &str, text: &str) {
        self.state.borrow_mut().files.insert(PathBuf::from(path), text.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.state.borrow().files.get(Path::new(path)).cloned()
    }

    pub fn reads(&self) -> usize {
        self.state.borrow().reads
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn prompts(&self) -> Vec<FileDialogOptions> {
        self.state.borrow().prompts.clone()
    }
}

impl FileGateway for MemoryFiles {
    fn prompt_save_path(&mut self, options: &FileDialogOptions) -> Result<Option<PathBuf>> {
        let mut state = self.state.borrow_mut();
        state.prompts.push(options.clone());
        Ok(state.save_answers.pop_front().flatten())
    }

    fn prompt_open_path(&mut self, options: &FileDialogOptions) -> Result<Option<PathBuf>> {
        let mut state = self.state.borrow_mut();
        state.prompts.push(options.clone());
        Ok(state.open_answers.pop_front().flatten())
    }

    fn read_all_text(&mut self, path: &Path) -> io::Result<String> {
        let mut state = self.state.borrow_mut();
        state.reads += 1;
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write_all_text(&mut self, path: &Path, text: &str) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.writes += 1;
        state.files.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DialogsState {
    answer: Option<RestartChoice>,
    asked: Vec<String>,
    notices: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedDialogs {
    state: Rc<RefCell<DialogsState>>,
}

impl ScriptedDialogs {
    pub fn answering(choice: RestartChoice) -> Self {
        let dialogs = Self::default();
        dialogs.state.borrow_mut().answer = Some(choice);
        dialogs
    }

    pub fn asked(&self) -> Vec<String> {
        self.state.borrow().asked.clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.state.borrow().notices.clone()
    }
}

impl UserDialogs for ScriptedDialogs {
    fn ask_restart(&mut self, message: &str) -> Result<RestartChoice> {
        let mut state = self.state.borrow_mut();
        state.asked.push(message.to_string());
        state.answer.take().ok_or_else(|| anyhow!("no scripted answer left"))
    }

    fn notify(&mut self, message: &str) {
        self.state.borrow_mut().notices.push(message.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct RecordingHost {
    exe: PathBuf,
    relaunched: Rc<RefCell<Vec<PathBuf>>>,
    failing: bool,
}

impl RecordingHost {
    pub fn new(exe: &str) -> Self {
        Self { exe: PathBuf::from(exe), relaunched: Rc::default(), failing: false }
    }

    /// Host whose relaunch always fails.
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    pub fn relaunched(&self) -> Vec<PathBuf> {
        self.relaunched.borrow().clone()
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new("/opt/weather/weather")
    }
}

impl ProcessHost for RecordingHost {
    fn current_exe(&self) -> io::Result<PathBuf> {
        Ok(self.exe.clone())
    }

    fn relaunch(&mut self, exe: &Path) -> Result<()> {
        if self.failing {
            return Err(anyhow!("spawn refused for {}", exe.display()));
        }
        self.relaunched.borrow_mut().push(exe.to_path_buf());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    api_key: String,
    temperatures: VecDeque<f64>,
    requests: Vec<String>,
    failing: bool,
}

/// Weather provider returning canned temperatures in order.
#[derive(Debug, Default)]
pub struct FakeProvider {
    state: Mutex<ProviderState>,
}

impl FakeProvider {
    pub fn new(api_key: &str, temperatures: &[f64]) -> Self {
        let state = ProviderState {
            api_key: api_key.to_string(),
            temperatures: temperatures.iter().copied().collect(),
            ..ProviderState::default()
        };
        Self { state: Mutex::new(state) }
    }

    pub fn failing(api_key: &str) -> Self {
        let provider = Self::new(api_key, &[]);
        provider.state.lock().unwrap().failing = true;
        provider
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.address.clone());

        if state.failing {
            return Err(anyhow!("provider unavailable"));
        }

        let temperature_c = state
            .temperatures
            .pop_front()
            .ok_or_else(|| anyhow!("no canned temperature left"))?;
        let minute = state.requests.len() as u32;

        Ok(WeatherResponse {
            provider: "fake".to_string(),
            location_name: request.address.clone(),
            temperature_c,
            feels_like_c: temperature_c,
            condition: "clear".to_string(),
            humidity_pct: 50,
            wind_speed_mps: 1.0,
            observation_time: Utc.with_ymd_and_hms(2026, 10, 17, 12, minute, 0).unwrap(),
        })
    }

    fn api_key(&self) -> String {
        self.state.lock().unwrap().api_key.clone()
    }

    fn set_api_key(&self, api_key: &str) {
        self.state.lock().unwrap().api_key = api_key.to_string();
    }
}

/// Factory building `FakeProvider`s that answer with `temperatures`, counting constructions.
pub fn counting_factory(built: Rc<Cell<usize>>, temperatures: &'static [f64]) -> ServiceFactory {
    Box::new(move |api_key| {
        built.set(built.get() + 1);
        let handle: ServiceHandle = Arc::new(FakeProvider::new(api_key, temperatures));
        handle
    })
}
