//! Prometheus exposition format support.
//!
//! This module renders the contents of a [`MetricRegistry`] in the
//! Prometheus text-based exposition format and serves it over HTTP so it can
//! be scraped by Prometheus or compatible monitoring systems.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ddwatch_sdk::prometheus::{PrometheusConfig, PrometheusExporter};
//! use ddwatch_sdk::MetricRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PrometheusConfig::builder()
//!         .listen_addr("0.0.0.0:8080")
//!         .metrics_path("/metrics")
//!         .build();
//!
//!     let registry = Arc::new(MetricRegistry::new());
//!     let exporter = PrometheusExporter::new(config, registry);
//!
//!     // Metrics available at http://localhost:8080/metrics
//!     exporter.bind().await?.serve().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use ddwatch_types::MetricSample;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::error::ServerError;
use crate::registry::MetricRegistry;

/// Name of the gauge family holding one sample per monitor.
pub const ALERT_COUNT_METRIC: &str = "datadog_monitor_prometheus_exporter_alert_count";

const ALERT_COUNT_HELP: &str = "Datadog monitors present in the latest snapshot, one sample per monitor";

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Configuration for the Prometheus metrics endpoint.
#[derive(Debug, Clone)]
pub struct PrometheusConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Path for metrics endpoint (e.g., "/metrics")
    pub metrics_path: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl PrometheusConfig {
    /// Create a new builder for PrometheusConfig.
    pub fn builder() -> PrometheusConfigBuilder {
        PrometheusConfigBuilder::default()
    }
}

/// Builder for PrometheusConfig.
#[derive(Debug, Default)]
pub struct PrometheusConfigBuilder {
    listen_addr: Option<String>,
    metrics_path: Option<String>,
}

impl PrometheusConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the metrics path.
    pub fn metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Build the PrometheusConfig.
    pub fn build(self) -> PrometheusConfig {
        let defaults = PrometheusConfig::default();
        PrometheusConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            metrics_path: self.metrics_path.unwrap_or(defaults.metrics_path),
        }
    }
}

/// Prometheus exporter that serves a registry over HTTP.
#[derive(Debug)]
pub struct PrometheusExporter {
    config: PrometheusConfig,
    registry: Arc<MetricRegistry>,
}

impl PrometheusExporter {
    /// Create a new Prometheus exporter over `registry`.
    pub fn new(config: PrometheusConfig, registry: Arc<MetricRegistry>) -> Self {
        Self { config, registry }
    }

    /// Get the current metrics in Prometheus exposition format.
    pub fn render(&self) -> String {
        format_prometheus(&self.registry.snapshot())
    }

    /// Bind the listen address.
    ///
    /// Binding is separate from serving so callers can fail fast on an
    /// unusable address and learn the actual port when binding to port 0.
    pub async fn bind(&self) -> Result<MetricsServer, ServerError> {
        let addr: SocketAddr =
            self.config
                .listen_addr
                .parse()
                .map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress {
                    addr: self.config.listen_addr.clone(),
                    reason: e.to_string(),
                })?;
        let listener = TcpListener::bind(addr).await?;

        Ok(MetricsServer {
            listener,
            metrics_path: Arc::from(self.config.metrics_path.as_str()),
            registry: self.registry.clone(),
        })
    }
}

/// A bound metrics endpoint, ready to serve.
#[derive(Debug)]
pub struct MetricsServer {
    listener: TcpListener,
    metrics_path: Arc<str>,
    registry: Arc<MetricRegistry>,
}

impl MetricsServer {
    /// Address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until an accept error occurs.
    ///
    /// Each connection is served on its own task; a failing connection is
    /// logged and does not affect the others.
    pub async fn serve(self) -> Result<(), ServerError> {
        tracing::info!(
            addr = %self.local_addr()?,
            path = %self.metrics_path,
            "serving Prometheus metrics"
        );

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let io = TokioIo::new(stream);

            let metrics_path = self.metrics_path.clone();
            let registry = self.registry.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let response = handle_request(&req, &metrics_path, &registry);
                    async move { Ok::<_, Infallible>(response) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::warn!(%peer, error = %e, "metrics connection error");
                }
            });
        }
    }
}

fn handle_request<B>(
    req: &Request<B>,
    metrics_path: &str,
    registry: &MetricRegistry,
) -> Response<Full<Bytes>> {
    let path = req.uri().path();

    if path == metrics_path {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }

        let body = format_prometheus(&registry.snapshot());
        let mut response = Response::new(Full::new(Bytes::from(body)));
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(EXPOSITION_CONTENT_TYPE));
        response
    } else if path == "/health" || path == "/healthz" {
        text_response(StatusCode::OK, "OK")
    } else {
        text_response(StatusCode::NOT_FOUND, "Not Found")
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Format samples as Prometheus exposition format.
///
/// An empty slice renders as an empty string: a family with no samples is
/// omitted entirely, HELP and TYPE included.
pub fn format_prometheus(samples: &[MetricSample]) -> String {
    let mut output = String::new();
    if samples.is_empty() {
        return output;
    }

    output.push_str(&format!("# HELP {} {}\n", ALERT_COUNT_METRIC, ALERT_COUNT_HELP));
    output.push_str(&format!("# TYPE {} gauge\n", ALERT_COUNT_METRIC));

    for sample in samples {
        let labels = sample
            .labels
            .pairs()
            .iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, escape_label_value(value)))
            .collect::<Vec<_>>()
            .join(",");

        output.push_str(&format!(
            "{}{{{}}} {}\n",
            ALERT_COUNT_METRIC,
            labels,
            format_value(sample.value)
        ));
    }

    output
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddwatch_types::SampleLabels;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn sample(name: &str, priority: &str, tags: &str) -> MetricSample {
        MetricSample::new(SampleLabels::new(name, priority, tags), 1.0)
    }

    async fn start_server(registry: Arc<MetricRegistry>) -> SocketAddr {
        let config = PrometheusConfig::builder()
            .listen_addr("127.0.0.1:0")
            .build();
        let server = PrometheusExporter::new(config, registry)
            .bind()
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.serve());
        addr
    }

    /// Issue a request and return (status line, content type, body).
    async fn request(addr: SocketAddr, method: &str, path: &str) -> (String, String, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let req = format!(
            "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            method, path
        );
        stream.write_all(req.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let raw = String::from_utf8(raw).unwrap();

        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        let status = head.lines().next().unwrap().to_string();
        let content_type = head
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.eq_ignore_ascii_case("content-type").then(|| v.trim().to_string())
            })
            .unwrap_or_default();
        (status, content_type, body.to_string())
    }

    #[test]
    fn test_format_prometheus_basic() {
        let output = format_prometheus(&[
            sample("1", "P1", "env:prod"),
            sample("2", "P2", ""),
            sample("3", "P1", "env:dev,team:x"),
        ]);

        assert!(output.contains(
            "datadog_monitor_prometheus_exporter_alert_count{name=\"1\",priority=\"P1\",tags=\"env:prod\"} 1\n"
        ));
        assert!(output.contains(
            "datadog_monitor_prometheus_exporter_alert_count{name=\"2\",priority=\"P2\",tags=\"\"} 1\n"
        ));
        assert!(output.contains(
            "datadog_monitor_prometheus_exporter_alert_count{name=\"3\",priority=\"P1\",tags=\"env:dev,team:x\"} 1\n"
        ));
    }

    #[test]
    fn test_format_includes_help_and_type_once() {
        let output = format_prometheus(&[sample("1", "", ""), sample("2", "", "")]);

        assert_eq!(output.matches("# HELP ").count(), 1);
        assert!(output.starts_with("# HELP datadog_monitor_prometheus_exporter_alert_count "));
        assert!(output.contains("# TYPE datadog_monitor_prometheus_exporter_alert_count gauge\n"));
    }

    #[test]
    fn test_empty_samples_render_nothing() {
        assert_eq!(format_prometheus(&[]), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("simple"), "simple");
        assert_eq!(escape_label_value("with\"quote"), "with\\\"quote");
        assert_eq!(escape_label_value("with\\backslash"), "with\\\\backslash");
        assert_eq!(escape_label_value("with\nnewline"), "with\\nnewline");
    }

    #[test]
    fn test_prometheus_config_builder() {
        let config = PrometheusConfig::builder()
            .listen_addr("127.0.0.1:9100")
            .metrics_path("/custom-metrics")
            .build();

        assert_eq!(config.listen_addr, "127.0.0.1:9100");
        assert_eq!(config.metrics_path, "/custom-metrics");
    }

    #[test]
    fn test_prometheus_config_defaults() {
        let config = PrometheusConfig::default();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.metrics_path, "/metrics");
    }

    #[test]
    fn test_exporter_render_tracks_registry() {
        let registry = Arc::new(MetricRegistry::new());
        let exporter = PrometheusExporter::new(PrometheusConfig::default(), registry.clone());

        assert_eq!(exporter.render(), "");

        registry.set(SampleLabels::new("7", "P3", "a:b"), 1.0);
        assert!(exporter.render().contains("name=\"7\""));

        registry.reset();
        assert_eq!(exporter.render(), "");
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_address() {
        let config = PrometheusConfig::builder().listen_addr("not-an-address").build();
        let err = PrometheusExporter::new(config, Arc::new(MetricRegistry::new()))
            .bind()
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_scrape_before_any_snapshot_is_empty() {
        let addr = start_server(Arc::new(MetricRegistry::new())).await;

        let (status, content_type, body) = request(addr, "GET", "/metrics").await;
        assert!(status.contains("200"));
        assert_eq!(content_type, EXPOSITION_CONTENT_TYPE);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_reflects_registry() {
        let registry = Arc::new(MetricRegistry::new());
        let addr = start_server(registry.clone()).await;

        registry.set(SampleLabels::new("1", "P1", "env:prod"), 1.0);
        let (_, _, body) = request(addr, "GET", "/metrics").await;
        assert!(body.contains("{name=\"1\",priority=\"P1\",tags=\"env:prod\"} 1"));

        registry.reset();
        let (_, _, body) = request(addr, "GET", "/metrics").await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let addr = start_server(Arc::new(MetricRegistry::new())).await;

        let (status, _, body) = request(addr, "GET", "/healthz").await;
        assert!(status.contains("200"));
        assert_eq!(body, "OK");

        let (status, _, _) = request(addr, "GET", "/nope").await;
        assert!(status.contains("404"));
    }

    #[tokio::test]
    async fn test_metrics_rejects_post() {
        let addr = start_server(Arc::new(MetricRegistry::new())).await;
        let (status, _, _) = request(addr, "POST", "/metrics").await;
        assert!(status.contains("405"));
    }
}
