use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Transport used to ship spans to the collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    Http,
}

impl fmt::Display for OtlpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grpc => f.write_str("grpc"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// `[telemetry]`: optional OTLP span export.
///
/// Off by default; logs still go to stdout through `RUST_LOG` either way.
///
/// ```toml
/// [telemetry]
/// enabled = true
/// endpoint = "http://otel-collector:4317"
/// sample_ratio = 0.1
/// resource_attributes = { "deployment.environment" = "staging" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Collector address. gRPC collectors usually listen on 4317, HTTP on 4318.
    pub endpoint: String,
    pub protocol: OtlpProtocol,
    /// Reported as `service.name`.
    pub service_name: String,
    /// Fraction of traces kept, clamped to `0.0..=1.0`.
    pub sample_ratio: f64,
    pub timeout_seconds: u64,
    /// Extra resource attributes attached to every span.
    pub resource_attributes: HashMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:4317".to_owned(),
            protocol: OtlpProtocol::Grpc,
            service_name: "mediadrop".to_owned(),
            sample_ratio: 1.0,
            timeout_seconds: 10,
            resource_attributes: HashMap::new(),
        }
    }
}

impl TelemetryConfig {
    /// Exporter request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
