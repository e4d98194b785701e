use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::models::UploadPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Directory that receives stored files. Created on first upload.
    pub content_dir: PathBuf,
    /// URL prefix under which the content directory is served.
    pub public_path: String,
    pub max_files: usize,
    pub max_file_size_bytes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_files: self.max_files,
            max_file_size: self.max_file_size_bytes,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("public/uploads"),
            public_path: "/uploads".to_string(),
            max_files: UploadPolicy::default().max_files,
            max_file_size_bytes: UploadPolicy::default().max_file_size,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            // Eg.. `APP_UPLOAD__MAX_FILES=1 ./target/app` would set `upload.max_files`
            .add_source(Environment::with_prefix("app").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            upload: UploadConfig::default(),
            cors: CorsConfig {
                allowed_origin: "http://localhost:3000".to_string(),
            },
        }
    }
}
