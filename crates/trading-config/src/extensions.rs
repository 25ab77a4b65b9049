//! Extension loading.
//!
//! Extensions are TOML files layered over the main configuration. They are
//! resolved once, before any command runs, from an explicit snapshot of the
//! process environment.

use config::{Config, ConfigError, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the extension file looked up in the home directory.
pub const DEFAULT_EXTENSION_FILE: &str = "extension.toml";

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Extension not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to load extension {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// The parts of the process environment extension loading depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionEnv {
    home: PathBuf,
}

impl ExtensionEnv {
    /// Resolve the home directory from an environment snapshot.
    ///
    /// `TRADING_HOME` wins; otherwise `$HOME/.trading` (or `%USERPROFILE%`).
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let home = match vars.get("TRADING_HOME") {
            Some(home) => PathBuf::from(home),
            None => vars
                .get("HOME")
                .or_else(|| vars.get("USERPROFILE"))
                .map(|dir| PathBuf::from(dir).join(".trading"))
                .unwrap_or_else(|| PathBuf::from(".trading")),
        };
        Self { home }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn default_extension(&self) -> PathBuf {
        self.home.join(DEFAULT_EXTENSION_FILE)
    }
}

/// Which extensions to load and how to treat failures.
#[derive(Debug, Clone, Default)]
pub struct ExtensionOptions {
    /// Also load `extension.toml` from the home directory, when present.
    pub load_default: bool,
    pub paths: Vec<PathBuf>,
    /// Abort on the first extension that fails to load instead of logging it.
    pub strict: bool,
}

/// Load extensions in order, returning the paths that loaded.
///
/// A missing default extension is silently skipped. Explicit extensions that
/// are missing or unparsable fail the call under `strict`, and are logged and
/// skipped otherwise. A path listed twice is loaded once.
pub fn load_extensions(
    options: &ExtensionOptions,
    env: &ExtensionEnv,
) -> Result<Vec<PathBuf>, ExtensionError> {
    let mut candidates = Vec::new();
    if options.load_default {
        let default = env.default_extension();
        if default.is_file() {
            candidates.push(default);
        } else {
            debug!(path = %default.display(), "No default extension");
        }
    }
    candidates.extend(options.paths.iter().cloned());

    let mut loaded: Vec<PathBuf> = Vec::new();
    for path in candidates {
        if loaded.contains(&path) {
            continue;
        }
        match check_extension(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Loaded extension");
                loaded.push(path);
            }
            Err(err) if options.strict => return Err(err),
            Err(err) => warn!("Failed to load extension: {}", err),
        }
    }

    Ok(loaded)
}

fn check_extension(path: &Path) -> Result<(), ExtensionError> {
    if !path.is_file() {
        return Err(ExtensionError::NotFound(path.to_path_buf()));
    }
    Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml))
        .build()
        .map(|_| ())
        .map_err(|source| ExtensionError::Invalid {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_home_resolution() {
        let env = ExtensionEnv::from_vars(vars(&[("TRADING_HOME", "/opt/trading"), ("HOME", "/home/u")]));
        assert_eq!(env.home(), Path::new("/opt/trading"));
        assert_eq!(env.default_extension(), PathBuf::from("/opt/trading/extension.toml"));

        let env = ExtensionEnv::from_vars(vars(&[("HOME", "/home/u")]));
        assert_eq!(env.home(), Path::new("/home/u/.trading"));
    }

    #[test]
    fn test_default_extension_loaded_when_present() {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join(DEFAULT_EXTENSION_FILE), "[cli]\ninteractive = true\n").unwrap();
        let env = ExtensionEnv::from_vars(vars(&[("TRADING_HOME", home.path().to_str().unwrap())]));

        let options = ExtensionOptions {
            load_default: true,
            ..Default::default()
        };
        let loaded = load_extensions(&options, &env).unwrap();
        assert_eq!(loaded, vec![env.default_extension()]);

        let options = ExtensionOptions::default();
        assert!(load_extensions(&options, &env).unwrap().is_empty());
    }

    #[test]
    fn test_missing_default_extension_is_not_an_error() {
        let home = tempfile::tempdir().unwrap();
        let env = ExtensionEnv::from_vars(vars(&[("TRADING_HOME", home.path().to_str().unwrap())]));
        let options = ExtensionOptions {
            load_default: true,
            strict: true,
            ..Default::default()
        };
        assert!(load_extensions(&options, &env).unwrap().is_empty());
    }

    #[test]
    fn test_strict_extension_failure_is_fatal() {
        let home = tempfile::tempdir().unwrap();
        let env = ExtensionEnv::from_vars(vars(&[("TRADING_HOME", home.path().to_str().unwrap())]));
        let options = ExtensionOptions {
            paths: vec![home.path().join("missing.toml")],
            strict: true,
            ..Default::default()
        };
        assert!(matches!(
            load_extensions(&options, &env),
            Err(ExtensionError::NotFound(_))
        ));
    }

    #[test]
    fn test_non_strict_extension_failure_is_skipped() {
        let home = tempfile::tempdir().unwrap();
        let broken = home.path().join("broken.toml");
        fs::write(&broken, "this is = = not toml").unwrap();
        let good = home.path().join("good.toml");
        fs::write(&good, "[remote]\nbase_url = \"http://x\"\n").unwrap();
        let env = ExtensionEnv::from_vars(vars(&[("TRADING_HOME", home.path().to_str().unwrap())]));

        let options = ExtensionOptions {
            paths: vec![broken.clone(), good.clone(), good.clone()],
            strict: false,
            ..Default::default()
        };
        assert_eq!(load_extensions(&options, &env).unwrap(), vec![good]);

        let strict = ExtensionOptions {
            paths: vec![broken],
            strict: true,
            ..Default::default()
        };
        assert!(matches!(
            load_extensions(&strict, &env),
            Err(ExtensionError::Invalid { .. })
        ));
    }
}
