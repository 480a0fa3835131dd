//! Shared test utilities for integration tests
//!
//! Provides centralized setup for XDG directories and a builder for throwaway
//! EnderChests so each test only spells out what it cares about.

use enderchest::config::ConfigLoader;
use enderchest::inventory::Inventory;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
    xdg_data_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
            xdg_data_home: std::env::var("XDG_DATA_HOME").ok(),
        }
    }

    fn restore(self) {
        restore_var("HOME", self.home);
        restore_var("XDG_CONFIG_HOME", self.xdg_config_home);
        restore_var("XDG_DATA_HOME", self.xdg_data_home);
    }
}

fn restore_var(key: &str, value: Option<String>) {
    match value {
        Some(orig) => std::env::set_var(key, orig),
        None => std::env::remove_var(key),
    }
}

/// Run `f` with HOME, XDG_CONFIG_HOME and XDG_DATA_HOME pointed into `test_dir`.
///
/// The user-level config file for the duration is
/// `<test_dir>/xdg/enderchest/config.toml`. Calls are serialized; do not nest them.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("xdg");
    let test_data_home = test_dir.path().join("data");
    let test_home = test_dir.path().join("home");

    fs::create_dir_all(&test_config_home).unwrap();
    fs::create_dir_all(&test_data_home).unwrap();
    fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());
    std::env::set_var("XDG_DATA_HOME", test_data_home.to_str().unwrap());

    let result = f();

    env_state.restore();

    result
}

/// A throwaway minecraft root with an EnderChest folder.
pub struct ChestFixture {
    pub temp: TempDir,
    /// Canonical minecraft root
    pub root: PathBuf,
    properties: String,
    instances: Vec<String>,
    remotes: Vec<String>,
}

impl ChestFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap().join("mc");
        fs::create_dir_all(root.join("EnderChest")).unwrap();
        let fixture = Self {
            temp,
            root,
            properties: String::new(),
            instances: Vec::new(),
            remotes: Vec::new(),
        };
        fixture.write_config();
        fixture
    }

    pub fn chest(&self) -> PathBuf {
        self.root.join("EnderChest")
    }

    /// Create a shulker box folder with the given `shulkerbox.toml` contents.
    pub fn shulker_box(&self, name: &str, config: &str) -> PathBuf {
        let dir = self.chest().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("shulkerbox.toml"), config).unwrap();
        dir
    }

    /// Write a file anywhere in the chest.
    pub fn put(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.chest().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// Register an instance rooted at `instances/<name>/.minecraft`.
    pub fn instance(
        &mut self,
        name: &str,
        version: &str,
        loader: &str,
        tags: &[&str],
        server: bool,
    ) -> PathBuf {
        let relative = format!("instances/{}/.minecraft", name);
        let root = self.root.join(&relative);
        fs::create_dir_all(&root).unwrap();
        let tags: Vec<String> = tags.iter().map(|t| format!("\"{}\"", t)).collect();
        self.instances.push(format!(
            "[[instances]]\nname = \"{}\"\nroot = \"{}\"\nminecraft_version = \"{}\"\nloader = \"{}\"\ntags = [{}]\nserver = {}\n",
            name,
            relative,
            version,
            loader,
            tags.join(", "),
            server
        ));
        self.write_config();
        root
    }

    /// Lines for the `[properties]` table.
    pub fn properties(&mut self, lines: &str) {
        self.properties = lines.to_string();
        self.write_config();
    }

    pub fn remote(&mut self, uri: &str, alias: &str) {
        self.remotes.push(format!(
            "[[remotes]]\nuri = \"{}\"\nalias = \"{}\"\n",
            uri.replace('\\', "\\\\"),
            alias
        ));
        self.write_config();
    }

    fn write_config(&self) {
        let mut contents = format!("[properties]\n{}\n\n", self.properties);
        for instance in &self.instances {
            contents.push_str(instance);
            contents.push('\n');
        }
        for remote in &self.remotes {
            contents.push_str(remote);
            contents.push('\n');
        }
        fs::write(self.chest().join("enderchest.toml"), contents).unwrap();
    }

    /// Load config through the layered loader and freeze it into an inventory.
    pub fn inventory(&self) -> Inventory {
        let config = with_xdg_env(&self.temp, || ConfigLoader::load(&self.root)).unwrap();
        Inventory::from_config(&self.root, &config).unwrap()
    }

    pub fn instance_root(&self, name: &str) -> PathBuf {
        self.root.join("instances").join(name).join(".minecraft")
    }
}

/// Where a symlink points, as written.
pub fn link_target(path: &Path) -> PathBuf {
    fs::read_link(path).unwrap()
}

pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
