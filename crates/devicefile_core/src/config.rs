//! Configuration of a generation run

use camino::Utf8PathBuf;
use compact_str::CompactString;

/// Headers every AVR device file pulls in
pub const DEFAULT_HEADERS: [&str; 2] = ["avr/io.h", "avr/interrupt.h"];

/// Invalid or incomplete generator configuration
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),
}

impl From<derive_builder::UninitializedFieldError> for ConfigError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Self::Missing(err.field_name())
    }
}

/// Describes where and how device files are generated
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder)]
#[builder(build_fn(error = "ConfigError"))]
#[non_exhaustive]
pub struct GeneratorConfig {
    /// Folder the device files are written to
    #[builder(setter(into))]
    pub output_dir: Utf8PathBuf,
    /// Emit a USI driver. USI can emulate UART, SPI and I2C, so by default
    /// it does not get a driver of its own.
    #[builder(default = "false")]
    pub usi_driver: bool,
    /// Headers listed in every generated file
    #[builder(default = "DEFAULT_HEADERS.iter().map(|h| CompactString::from(*h)).collect()")]
    pub headers: Vec<CompactString>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfigBuilder::default()
            .output_dir("out")
            .build()
            .unwrap();
        assert_eq!(config.output_dir, Utf8PathBuf::from("out"));
        assert!(!config.usi_driver);
        assert_eq!(config.headers, vec!["avr/io.h", "avr/interrupt.h"]);
    }

    #[test]
    fn test_missing_output_dir() {
        let err = GeneratorConfigBuilder::default().build().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("output_dir")));
    }
}
