use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides (`VISTA__ACCESS__RESTRICT_BY_GROUPS=true`).
pub const ENV_PREFIX: &str = "VISTA";

const DEFAULT_CONFIG_FILE: &str = "server";

#[vista_derive::vista_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a settings file overlaid with `VISTA__`-prefixed environment variables.
///
/// The file is required; its extension may be omitted (`"server"` finds `server.toml`).
/// Nested keys use double underscores: `VISTA__STORAGE__DATA_DIR` maps to `storage.data_dir`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing, unparsable, or does not match `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_with_env(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .convert_case(config::Case::Snake)
        .try_parsing(true)
}

fn layered(path: &Path, env: Environment) -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from(path).required(true)).add_source(env)
}

pub(crate) fn load_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Environment,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    info!(path = %path.display(), "Loading configuration");

    let config = layered(&path, env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
