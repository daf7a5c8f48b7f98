//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (port, request id header).
    pub listener: ListenerConfig,

    /// Compute endpoint settings.
    pub invocation: InvocationConfig,

    /// Stats recorder and reporter settings.
    pub stats: StatsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Inbound header carrying a caller-supplied request id.
    pub request_id_header: Option<String>,
}

impl ListenerConfig {
    /// Socket address string to bind, e.g. "0.0.0.0:8090".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_id_header: None,
        }
    }
}

/// Compute endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InvocationConfig {
    /// Region the functions live in.
    pub region: String,

    /// Base URL of the invoke API. Derived from the region when unset.
    pub endpoint: Option<String>,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl InvocationConfig {
    /// Invoke API base URL, falling back to the regional public endpoint.
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint.clone(),
            _ => format!("https://lambda.{}.amazonaws.com", self.region),
        }
    }
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            region: "eu-west-1".to_string(),
            endpoint: None,
            connect_timeout_secs: 5,
        }
    }
}

/// Stats recording and reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Record per-target hits even without a collector to report to.
    pub recorder_enabled: bool,

    /// Collector base URL; reporting is enabled when set.
    pub report_url: Option<String>,

    /// Interval between report ticks, e.g. "5s" or "500ms".
    #[serde(
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub report_interval: Duration,
}

impl StatsConfig {
    /// Reporting implies recording.
    pub fn recorder_enabled(&self) -> bool {
        self.recorder_enabled || self.reporter_enabled()
    }

    pub fn reporter_enabled(&self) -> bool {
        self.report_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            recorder_enabled: false,
            report_url: None,
            report_interval: Duration::from_secs(5),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
        }
    }
}

fn serialize_duration<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}
