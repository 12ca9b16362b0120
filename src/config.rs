use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Remote classification endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Full URL of the analyze endpoint
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "soundwatch".to_string(),
            },
            audio: AudioConfig {
                sample_rate: 16000,
                channels: 1,
            },
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/analyze-audio".to_string(),
            timeout_secs: 30,
        }
    }
}
