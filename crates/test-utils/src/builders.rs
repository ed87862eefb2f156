#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use syncserver::config::{ConfigFile, RawConfigFile};
use syncserver::display::TreeDisplay;
use syncserver::engine::{ChangeDebouncer, Runtime, RuntimeEvent};
use syncserver::exec::{LaunchSpec, ProcessSupervisor};
use syncserver::fs::mock::MockFileSystem;
use syncserver::types::{DisplayMode, WatchScope};
use syncserver::watch::WatchFilter;

use crate::fake_spawner::FakeSpawner;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.config.watch.extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.config.watch.ignore.push(pattern.to_string());
        self
    }

    pub fn delay_ms(mut self, delay: u64) -> Self {
        self.config.watch.delay_ms = delay;
        self
    }

    pub fn exec(mut self, exec: &str) -> Self {
        self.config.process.exec = Some(exec.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a `Runtime` around a [`FakeSpawner`] and an in-memory filesystem.
pub struct RuntimeBuilder {
    extensions: Vec<String>,
    ignore: Vec<String>,
    delay: Duration,
    launch: LaunchSpec,
    fs: MockFileSystem,
    scope: WatchScope,
}

impl RuntimeBuilder {
    /// Defaults: `node app.js`, watching `js`/`json`, ignoring
    /// `node_modules`, 1000 ms debounce.
    pub fn new() -> Self {
        Self {
            extensions: vec!["js".to_string(), "json".to_string()],
            ignore: vec!["**/node_modules/**".to_string()],
            delay: Duration::from_millis(1000),
            launch: LaunchSpec::new("node", vec!["app.js".to_string()]),
            fs: MockFileSystem::new(),
            scope: WatchScope::ChangedFiles,
        }
    }

    pub fn delay_ms(mut self, delay: u64) -> Self {
        self.delay = Duration::from_millis(delay);
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.ignore.push(pattern.to_string());
        self
    }

    pub fn launch(mut self, launch: LaunchSpec) -> Self {
        self.launch = launch;
        self
    }

    pub fn fs(mut self, fs: MockFileSystem) -> Self {
        self.fs = fs;
        self
    }

    pub fn full_tree(mut self) -> Self {
        self.scope = WatchScope::FullTree;
        self
    }

    /// Returns the runtime plus a sender for injecting events.
    pub fn build(self, spawner: FakeSpawner) -> (Runtime<FakeSpawner>, mpsc::Sender<RuntimeEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let supervisor = ProcessSupervisor::new(spawner, tx.clone());
        (self.assemble(supervisor, rx), tx)
    }

    /// Like [`RuntimeBuilder::build`], but child exits are reported on a
    /// separate channel, so dropping the returned sender closes the
    /// runtime's inbox.
    pub fn build_detached(
        self,
        spawner: FakeSpawner,
    ) -> (Runtime<FakeSpawner>, mpsc::Sender<RuntimeEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let (exit_tx, _exit_rx) = mpsc::channel(64);
        let supervisor = ProcessSupervisor::new(spawner, exit_tx);
        (self.assemble(supervisor, rx), tx)
    }

    fn assemble(
        self,
        supervisor: ProcessSupervisor<FakeSpawner>,
        rx: mpsc::Receiver<RuntimeEvent>,
    ) -> Runtime<FakeSpawner> {
        let filter = WatchFilter::new(&self.extensions, &self.ignore)
            .expect("Failed to build watch filter from builder");
        let debouncer = ChangeDebouncer::new(filter.clone(), self.delay);
        let display = TreeDisplay::new(
            "/proj",
            Arc::new(self.fs),
            filter,
            DisplayMode::Json,
            self.scope,
        );
        Runtime::new(supervisor, debouncer, display, self.launch, rx)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
