use serde::Deserialize;

use common::{log_debug, log_warn};

use crate::ast::TargetInfo;

pub const CONFIG_FILE_NAME: &str = "exprbridge";
pub const CONFIG_ENV_PREFIX: &str = "EXPRBRIDGE";

const TAG: &str = "config";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub target: TargetInfo,

    #[serde(default)]
    pub reverse: ReverseConfig,
}

impl BridgeConfig {
    /// Loads the configuration from the default sources.
    /// See [`common::config::load_config`] for the layering.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        common::config::load_config(CONFIG_FILE_NAME, CONFIG_ENV_PREFIX)?.try_into()
    }
}

impl TryFrom<::config::Config> for BridgeConfig {
    type Error = ::config::ConfigError;

    fn try_from(value: ::config::Config) -> Result<Self, Self::Error> {
        let config: BridgeConfig = value.try_deserialize()?;
        log_debug!(target: TAG, "Loaded configurations: {:?}", config);

        let target = &config.target;
        if !matches!(target.pointer_width, 16 | 32 | 64) {
            log_warn!(
                target: TAG,
                "Unusual pointer width: {}. Pointer sorts will follow it as is.",
                target.pointer_width,
            );
        }
        if !matches!(target.long_width, 32 | 64) {
            log_warn!(
                target: TAG,
                "Unusual width for `long`: {}. No standard integer type may match some bit vector sorts.",
                target.long_width,
            );
        }
        if !matches!(target.long_double_width, 64 | 128) {
            log_warn!(
                target: TAG,
                concat!(
                    "`long double` with width {} has no IEEE-754 interchange format. ",
                    "Translating values of this type will fail."
                ),
                target.long_double_width,
            );
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReverseConfig {
    /// The signedness of the integer types picked for reconstructed literals
    /// when no better information is available.
    #[serde(default)]
    pub literal_signedness: Signedness,

    /// Whether to use the types recorded during forward translation when
    /// reconstructing literals and casts.
    #[serde(default = "default_type_hints")]
    pub type_hints: bool,
}

fn default_type_hints() -> bool {
    true
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            literal_signedness: Signedness::default(),
            type_hints: default_type_hints(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signedness {
    #[default]
    #[serde(alias = "s")]
    Signed,
    #[serde(alias = "u")]
    Unsigned,
}

impl Signedness {
    #[inline]
    pub fn is_signed(&self) -> bool {
        matches!(self, Signedness::Signed)
    }
}
