// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locating project files and `.env` files under the project root.
//!
//! Searches walk the whole root and are repeated often during one command,
//! so results are memoized per (root, mode, patterns).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tether_core::{Result, TetherError};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix of every project file.
pub const PROJECT_SUFFIX: &str = ".tether.toml";

/// Directories never searched.
const SKIP_DIRS: &[&str] = &[".git", "vendor", "node_modules", "target"];

/// How a file name is compared against the search patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// File name contains the pattern.
    Contains,
    /// File name equals the pattern, ignoring ASCII case.
    IExact,
}

impl MatchMode {
    fn matches(self, file_name: &str, pattern: &str) -> bool {
        match self {
            Self::Contains => file_name.contains(pattern),
            Self::IExact => file_name.eq_ignore_ascii_case(pattern),
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::IExact => "iexact",
        }
    }
}

type CachedSearch = std::result::Result<Vec<PathBuf>, (PathBuf, String)>;

/// Reader/writer guarded memo of recursive file searches.
#[derive(Debug, Default)]
pub struct FileSearchCache {
    entries: RwLock<HashMap<String, CachedSearch>>,
}

impl FileSearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every file under `root` whose name matches any pattern.
    ///
    /// Errors are cached too, without partial results.
    pub fn search(&self, root: &Path, patterns: &[&str], mode: MatchMode) -> Result<Vec<PathBuf>> {
        let mut sorted: Vec<&str> = patterns.to_vec();
        sorted.sort_unstable();
        let key = format!("{}|{}[{}]", root.display(), mode.tag(), sorted.join("|"));

        if let Some(hit) = self.entries.read().ok().and_then(|e| e.get(&key).cloned()) {
            debug!(key = %key, "file search: cache hit");
            return unpack(hit);
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| TetherError::Internal("file search cache poisoned".into()))?;

        // Another caller may have filled the entry while we waited for the lock.
        if let Some(hit) = entries.get(&key).cloned() {
            return unpack(hit);
        }

        let result = walk(root, &sorted, mode);
        entries.insert(key, result.clone());
        unpack(result)
    }

    /// Forgets every cached search. Call after creating or deleting files.
    pub fn invalidate(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of cached searches.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unpack(cached: CachedSearch) -> Result<Vec<PathBuf>> {
    cached.map_err(|(path, message)| TetherError::io(path, std::io::Error::other(message)))
}

fn walk(root: &Path, patterns: &[&str], mode: MatchMode) -> CachedSearch {
    let mut out = Vec::new();
    let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| {
        e.depth() == 0
            || !e.file_type().is_dir()
            || !SKIP_DIRS.contains(&e.file_name().to_string_lossy().as_ref())
    });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            (path, e.to_string())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if patterns.iter().any(|p| mode.matches(&name, p)) {
            debug!(path = %entry.path().display(), "file search: match");
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// The project root: nearest ancestor of `start` holding `.git`, else `start`.
pub fn project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .unwrap_or(start)
        .to_path_buf()
}

/// Whether `root` is a git work tree.
pub fn is_git_repo(root: &Path) -> bool {
    root.join(".git").exists()
}

/// Root directory plus the search cache shared by one command.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    cache: FileSearchCache,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: FileSearchCache::new(),
        }
    }

    /// Resolves the project root from the current directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| TetherError::io(".", e))?;
        Ok(Self::new(project_root(&cwd)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &FileSearchCache {
        &self.cache
    }

    pub fn search(&self, patterns: &[&str], mode: MatchMode) -> Result<Vec<PathBuf>> {
        self.cache.search(&self.root, patterns, mode)
    }

    /// Names of every environment with a project file, sorted.
    pub fn list_environments(&self) -> Result<Vec<String>> {
        let mut envs: Vec<String> = self
            .search(&[PROJECT_SUFFIX], MatchMode::Contains)?
            .iter()
            .filter_map(|p| p.file_name()?.to_str()?.strip_suffix(PROJECT_SUFFIX).map(str::to_string))
            .collect();
        envs.sort();
        envs.dedup();
        Ok(envs)
    }
}

/// Project file name for an environment. The empty env is `.tether.toml`.
pub fn project_file_name(env: &str) -> String {
    format!("{env}{PROJECT_SUFFIX}")
}

/// Environment a `.env` style file belongs to.
///
/// Handles `.env`, `.env.secret`, `.env.{env}`, `.env.secret.{env}`,
/// `{env}.env` and `{env}.env.secret`.
pub fn env_of_dotenv_file(file_name: &str) -> Result<String> {
    if !file_name.contains('.') {
        return Ok(file_name.to_string());
    }
    if !file_name.contains(".env") {
        return Err(TetherError::Validation(format!(
            "'{file_name}' is not an env or env-secret file"
        )));
    }

    if !file_name.starts_with(".env") {
        let name = file_name
            .strip_suffix(".env.secret")
            .or_else(|| file_name.strip_suffix(".env"))
            .unwrap_or(file_name);
        return Ok(name.to_string());
    }

    let rest = file_name.trim_start_matches(".env");
    let rest = rest.strip_prefix(".secret").unwrap_or(rest);
    Ok(rest.strip_prefix('.').unwrap_or(rest).to_string())
}
