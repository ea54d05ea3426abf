//! Configuration management for the OCR server
//!
//! All settings come from environment variables, read once at startup.

use std::env;
use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub scratch: ScratchConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted multipart body size
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// GPU execution requested (`USE_GPU`)
    pub use_gpu: bool,
    /// Recognition language set as configured (`OCR_LANG`)
    pub lang: String,
    /// Detect page orientation before recognition (`OCR_ANGLE_CLS`)
    pub angle_cls: bool,
    /// Upper bound on concurrent engine calls
    pub max_concurrency: usize,
    /// Path or name of the tesseract executable
    pub tesseract_cmd: String,
    /// Optional tessdata directory
    pub tessdata_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ScratchConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Directory holding `index.html` and other static assets
    pub static_dir: PathBuf,
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_OCR_LANG: &str = "ch";

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            ocr: OcrConfig {
                use_gpu: false,
                lang: DEFAULT_OCR_LANG.to_string(),
                angle_cls: true,
                max_concurrency: default_concurrency(),
                tesseract_cmd: "tesseract".to_string(),
                tessdata_dir: None,
            },
            scratch: ScratchConfig {
                dir: env::temp_dir(),
            },
            frontend: FrontendConfig {
                static_dir: PathBuf::from("static"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Unset or empty variables fall back to [`Config::default`]; values that
    /// are present but malformed are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let max_concurrency = match get("OCR_MAX_CONCURRENCY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "OCR_MAX_CONCURRENCY",
                        value: raw,
                    })
                }
            },
            None => defaults.ocr.max_concurrency,
        };

        Ok(Config {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or("SERVER_PORT", get("SERVER_PORT"), defaults.server.port)?,
                max_upload_bytes: parse_or(
                    "MAX_UPLOAD_BYTES",
                    get("MAX_UPLOAD_BYTES"),
                    defaults.server.max_upload_bytes,
                )?,
            },
            ocr: OcrConfig {
                use_gpu: get("USE_GPU").map(|v| is_truthy(&v)).unwrap_or(false),
                lang: get("OCR_LANG")
                    .map(|v| v.trim().to_string())
                    .unwrap_or(defaults.ocr.lang),
                angle_cls: get("OCR_ANGLE_CLS")
                    .map(|v| is_truthy(&v))
                    .unwrap_or(defaults.ocr.angle_cls),
                max_concurrency,
                tesseract_cmd: get("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                tessdata_dir: get("TESSDATA_DIR").map(PathBuf::from),
            },
            scratch: ScratchConfig {
                dir: get("SCRATCH_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.scratch.dir),
            },
            frontend: FrontendConfig {
                static_dir: get("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.frontend.static_dir),
            },
        })
    }
}

/// `1`, `true` and `yes` (any case) are truthy, everything else is not.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(!config.ocr.use_gpu);
        assert_eq!(config.ocr.lang, "ch");
        assert!(config.ocr.angle_cls);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.ocr.max_concurrency >= 1);
        assert_eq!(config.frontend.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn test_use_gpu_truthy_values() {
        for value in ["1", "true", "TRUE", "Yes", " yes "] {
            let config = Config::from_lookup(lookup(&[("USE_GPU", value)])).unwrap();
            assert!(config.ocr.use_gpu, "{value:?} should enable GPU");
        }
        for value in ["0", "false", "on", "gpu"] {
            let config = Config::from_lookup(lookup(&[("USE_GPU", value)])).unwrap();
            assert!(!config.ocr.use_gpu, "{value:?} should not enable GPU");
        }
    }

    #[test]
    fn test_angle_classification_can_be_disabled() {
        let config = Config::from_lookup(lookup(&[("OCR_ANGLE_CLS", "false")])).unwrap();
        assert!(!config.ocr.angle_cls);
        let config = Config::from_lookup(lookup(&[("OCR_ANGLE_CLS", "1")])).unwrap();
        assert!(config.ocr.angle_cls);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OCR_LANG", "en"),
            ("SERVER_PORT", "9100"),
            ("OCR_MAX_CONCURRENCY", "1"),
            ("TESSDATA_DIR", "/opt/tessdata"),
            ("SCRATCH_DIR", "/var/tmp/ocr"),
        ]))
        .unwrap();
        assert_eq!(config.ocr.lang, "en");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.ocr.max_concurrency, 1);
        assert_eq!(config.ocr.tessdata_dir, Some(PathBuf::from("/opt/tessdata")));
        assert_eq!(config.scratch.dir, PathBuf::from("/var/tmp/ocr"));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(Config::from_lookup(lookup(&[("SERVER_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("OCR_MAX_CONCURRENCY", "0")])).is_err());
    }
}
