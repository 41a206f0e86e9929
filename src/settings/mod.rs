//! Application settings.
//!
//! Settings are layered with [`figment`], each layer overriding the previous one:
//!
//! 1. The defaults from [`Settings::default`].
//! 2. The TOML file given on the command line (a missing file is skipped).
//! 3. Environment variables prefixed with `BOOT_`, where `__` separates nested keys,
//!    for example `BOOT_HEARTBEAT__INTERVAL=5`.
//!
//! ```toml
//! log_level = "info"
//! log_style = "full"
//! shutdown_timeout = 10
//!
//! [heartbeat]
//! interval = 60
//!
//! [[http_servers]]
//! bind_address = "127.0.0.1:8080"
//! ```
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use derive_more::Display;
use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// The prefix of the environment variables that override the settings.
pub const ENV_PREFIX: &str = "BOOT_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The maximum verbosity of the tracing output.
    pub log_level: TraceLevel,

    /// The format of the tracing output.
    pub log_style: TraceStyle,

    /// How long, in seconds, the services are given to stop once shutdown begins.
    pub shutdown_timeout: u64,

    pub heartbeat: Heartbeat,

    pub http_servers: Vec<HttpServer>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: TraceLevel::default(),
            log_style: TraceStyle::default(),
            shutdown_timeout: 10,
            heartbeat: Heartbeat::default(),
            http_servers: vec![HttpServer::default()],
        }
    }
}

impl Settings {
    /// Loads the settings, layering the TOML file at `path` and the environment over the defaults.
    ///
    /// # Errors
    ///
    /// Will return an error if a layer holds a value of the wrong type.
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

/// The periodic heartbeat job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heartbeat {
    /// Seconds between two beats. Zero disables the job.
    pub interval: u64,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self { interval: 60 }
    }
}

impl Heartbeat {
    /// The interval, or `None` when the job is disabled.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        (self.interval > 0).then(|| Duration::from_secs(self.interval))
    }
}

/// One HTTP server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServer {
    /// The address to bind to. Port `0` picks a free port.
    pub bind_address: SocketAddr,
}

impl Default for HttpServer {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    #[display("off")]
    Off,
    #[display("error")]
    Error,
    #[display("warn")]
    Warn,
    #[default]
    #[display("info")]
    Info,
    #[display("debug")]
    Debug,
    #[display("trace")]
    Trace,
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStyle {
    #[default]
    #[display("full")]
    Full,
    #[display("pretty")]
    Pretty,
    #[display("compact")]
    Compact,
    #[display("json")]
    Json,
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use figment::Jail;

    use super::{Settings, TraceLevel, TraceStyle};

    #[test]
    fn it_should_use_the_defaults_without_a_file() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load("missing.toml".as_ref())?;

            assert_eq!(settings, Settings::default());
            assert_eq!(settings.shutdown_timeout(), Duration::from_secs(10));
            assert_eq!(settings.heartbeat.interval(), Some(Duration::from_secs(60)));
            Ok(())
        });
    }

    #[test]
    fn it_should_layer_the_file_and_the_environment_over_the_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "boot.toml",
                r#"
                    log_level = "debug"
                    shutdown_timeout = 3

                    [[http_servers]]
                    bind_address = "127.0.0.1:0"

                    [[http_servers]]
                    bind_address = "127.0.0.1:0"
                "#,
            )?;
            jail.set_env("BOOT_LOG_STYLE", "json");
            jail.set_env("BOOT_HEARTBEAT__INTERVAL", "0");

            let settings = Settings::load("boot.toml".as_ref())?;

            assert_eq!(settings.log_level, TraceLevel::Debug);
            assert_eq!(settings.log_style, TraceStyle::Json);
            assert_eq!(settings.shutdown_timeout(), Duration::from_secs(3));
            assert_eq!(settings.heartbeat.interval(), None);
            assert_eq!(settings.http_servers.len(), 2);
            assert_eq!(
                settings.http_servers[0].bind_address,
                "127.0.0.1:0".parse::<SocketAddr>().unwrap()
            );
            Ok(())
        });
    }

    #[test]
    fn it_should_reject_an_unknown_trace_level() {
        Jail::expect_with(|jail| {
            jail.create_file("boot.toml", r#"log_level = "loud""#)?;

            assert!(Settings::load("boot.toml".as_ref()).is_err());
            Ok(())
        });
    }
}
