//! Configuration management.

mod extensions;
mod settings;

pub use extensions::{
    load_extensions, ExtensionEnv, ExtensionError, ExtensionOptions, DEFAULT_EXTENSION_FILE,
};
pub use settings::{AppConfig, CliSettings, EngineSettings, RemoteSettings};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Load configuration from file, extensions and environment.
///
/// Later sources win: the config file (optional), then each extension in
/// order, then `TRADING__SECTION__KEY` variables.
pub fn load_config(path: &Path, extensions: &[PathBuf]) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(File::from(path).required(false));

    for extension in extensions {
        builder = builder.add_source(File::from(extension.as_path()).format(FileFormat::Toml));
    }

    let config = builder
        .add_source(
            Environment::with_prefix("TRADING")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
