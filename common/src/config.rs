use std::{env, path::PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat, FileStoredFormat};

use crate::{log_debug, log_warn};

pub const CONFIG_STR: &str = "CONFIG_STR";
pub const CONFIG_STR_FORMAT: &str = "CONFIG_STR_FMT";

/// Builds the layered raw configuration for a component.
///
/// Sources, from the lowest priority to the highest:
/// 1. The file named `file_name` (any supported extension) found in the
///    closest ancestor of the current directory or the current executable.
/// 2. A configuration string passed through `{env_prefix}_CONFIG_STR`, whose
///    format is given by `{env_prefix}_CONFIG_STR_FMT` (e.g., `toml`).
/// 3. Environment variables of the form `{env_prefix}_SECTION__KEY`.
pub fn load_config(file_name: &str, env_prefix: &str) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(
        File::with_name(
            &search_ancestor_dirs_for(file_name)
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.to_string()),
        )
        .required(false),
    );

    if let Some((str, format)) = Option::zip(
        env::var(format!("{env_prefix}_{CONFIG_STR}")).ok(),
        env::var(format!("{env_prefix}_{CONFIG_STR_FORMAT}")).ok(),
    ) {
        match try_parse_format(&format) {
            Ok(format) => builder = builder.add_source(File::from_str(str.as_str(), format)),
            Err(format) => log_warn!("Unknown format for config string: {}", format),
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__"),
    );

    builder
        .build()
        .inspect(|c| log_debug!("Loaded raw configurations: {:?}", c))
}

fn try_parse_format(format: &str) -> Result<FileFormat, &str> {
    use FileFormat::*;
    let all_formats = [Toml, Json, Json5, Yaml, Ron, Ini];
    all_formats
        .into_iter()
        .find(|f| f.file_extensions().contains(&format))
        .ok_or(format)
}

/// Searches the ancestors of the current working directory and of the current
/// executable (including themselves) for an entry whose name starts with
/// `name`, and returns the path with `name` appended to the closest one.
fn search_ancestor_dirs_for(name: &str) -> Option<PathBuf> {
    [env::current_dir().ok(), env::current_exe().ok()]
        .into_iter()
        .flatten()
        .find_map(|start| {
            start
                .ancestors()
                .find(|dir| {
                    dir.read_dir().is_ok_and(|entries| {
                        entries
                            .filter_map(|e| e.ok())
                            .any(|e| e.file_name().to_str().is_some_and(|n| n.starts_with(name)))
                    })
                })
                .map(|dir| dir.join(name))
        })
}
