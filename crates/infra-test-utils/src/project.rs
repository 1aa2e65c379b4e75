//! [`TestProject`] scratch directories.

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory with a separate temporary home directory.
///
/// Keeping the home directory inside the fixture stops a developer's real
/// `~/.cdk.json` from leaking into test results.
///
/// # Example
///
/// ```rust,no_run
/// use infra_test_utils::project::TestProject;
/// use serde_json::json;
///
/// let project = TestProject::new();
/// project.write_project_context(json!({"ENVIRONMENT": "prod"}));
/// project.write_app("app.toml", "[stack]\nname = \"Demo\"\n");
/// ```
pub struct TestProject {
    root: TempDir,
    home: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create empty project and home directories.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Home directory for the user context layer.
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Write `cdk.json` with `context` as its `context` object.
    pub fn write_project_context(&self, context: Value) -> PathBuf {
        self.write_json(self.root(), "cdk.json", &json!({ "context": context }))
    }

    /// Write `cdk.context.json`.
    pub fn write_cached_context(&self, context: Value) -> PathBuf {
        self.write_json(self.root(), "cdk.context.json", &context)
    }

    /// Write `~/.cdk.json` with `context` as its `context` object.
    pub fn write_user_context(&self, context: Value) -> PathBuf {
        self.write_json(self.home(), ".cdk.json", &json!({ "context": context }))
    }

    /// Write an arbitrary file relative to the project root.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write an app definition relative to the project root.
    pub fn write_app(&self, relative: &str, toml: &str) -> PathBuf {
        self.write_file(relative, toml)
    }

    fn write_json(&self, dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }
}
