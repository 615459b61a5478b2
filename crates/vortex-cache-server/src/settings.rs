//! Configuracion del servidor.
//!
//! Las fuentes se aplican en orden, cada una sobreescribe a la anterior:
//! 1. Valores por defecto
//! 2. Archivo `config/vortex-cache.{toml,yaml,json}` (opcional)
//! 3. Variables de entorno `VORTEX_CACHE__*` (separador `__`)
//!
//! Ejemplo: `VORTEX_CACHE__HANDLER__KEY_PREFIX=app:`
//!
//! Las opciones del handler aceptan camelCase (`keyPrefix`) o snake_case
//! (`key_prefix`); el entorno solo produce snake_case.

use std::net::SocketAddr;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use vortex_cache_handler::{HandlerConfig, LocalHandlerConfig};

const CONFIG_FILE: &str = "config/vortex-cache";
const ENV_PREFIX: &str = "VORTEX_CACHE";

/// Politica de colocacion de escrituras cuando hay cache local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Todo se escribe en la cache local.
    Local,
    /// Todo se escribe en el store remoto.
    Remote,
    /// Entradas con tags al store remoto, el resto a la cache local.
    #[default]
    TaggedRemote,
}

/// Cache local delante del store remoto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSettings {
    #[serde(default = "default_max_capacity", alias = "max_capacity")]
    pub max_capacity: u64,

    #[serde(default = "default_ttl_seconds", alias = "ttl_seconds")]
    pub ttl_seconds: u64,

    #[serde(default)]
    pub placement: Placement,
}

fn default_max_capacity() -> u64 {
    LocalHandlerConfig::default().max_capacity
}

fn default_ttl_seconds() -> u64 {
    LocalHandlerConfig::default().ttl_seconds
}

impl LocalSettings {
    /// Configuracion del handler local, con el mismo prefijo de tags implicitos.
    pub fn handler_config(&self, handler: &HandlerConfig) -> LocalHandlerConfig {
        LocalHandlerConfig {
            max_capacity: self.max_capacity,
            ttl_seconds: self.ttl_seconds,
            implicit_tag_prefix: handler.implicit_tag_prefix().to_string(),
        }
    }
}

/// Configuracion completa del servidor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// URL de Redis. Sin ella se usa un store en memoria.
    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default)]
    pub handler: HandlerConfig,

    #[serde(default)]
    pub local: Option<LocalSettings>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8890
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            redis_url: None,
            handler: HandlerConfig::default(),
            local: None,
        }
    }
}

impl ServerSettings {
    /// Carga la configuracion desde archivo y entorno.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(environment())
            .build()?;

        Self::from_config(config)
    }

    /// Carga la configuracion desde un documento TOML (sin entorno).
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings
            .handler
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(settings)
    }

    /// Direccion de escucha.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid listen address: {e}")))
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
