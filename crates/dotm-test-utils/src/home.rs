//! [`TestHome`] sandbox for dotfile manager test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory split into a fake `home/` holding target dotfiles
/// and a `data/` directory for the manager's own files.
///
/// # Example
///
/// ```rust,no_run
/// use dotm_test_utils::TestHome;
///
/// let home = TestHome::new();
/// home.write_file(".zshrc", "export A=1\n");
/// let target = home.target(".zshrc");
/// home.assert_file_contains(".zshrc", "export A=1");
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    /// Create the sandbox with empty `home/` and `data/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("home")).unwrap();
        fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        Self { temp_dir }
    }

    /// Root of the sandbox.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The fake home directory.
    pub fn home_dir(&self) -> PathBuf {
        self.root().join("home")
    }

    /// The manager data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data")
    }

    /// Absolute path of a dotfile under the fake home, as a string suitable
    /// for an item's `file_path`.
    pub fn target(&self, rel: &str) -> String {
        self.home_dir().join(rel).to_string_lossy().into_owned()
    }

    /// Write a file under the fake home, creating parents.
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.home_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read a file under the fake home.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_file(&self, rel: &str) -> String {
        let path = self.home_dir().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Write a file into the data directory, creating parents.
    pub fn write_data_file(&self, rel: &str, content: &str) {
        let path = self.data_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Assert that the file under the fake home contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read_file(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }

    /// Assert that nothing exists at `rel` under the fake home.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let path = self.home_dir().join(rel);
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }
}
