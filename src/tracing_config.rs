//! Tracing configuration module for structured logging and observability
//!
//! The library itself only emits spans and events. Applications that want
//! to see them install a subscriber, either their own or through
//! [`TracingConfig::init`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors
    Console,
    /// Compact console output for CI environments
    Compact,
    /// JSON structured logging for production environments
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set output format
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Filter directive that will be installed
    pub fn filter_directive(&self) -> String {
        self.env_filter
            .clone()
            .unwrap_or_else(|| self.verbosity_to_filter().to_string())
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    /// - Invalid filter directive
    /// - A global subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = EnvFilter::try_new(self.filter_directive())?;
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true);
                registry.with(fmt_layer).try_init()?;
            },
        }

        Ok(())
    }
}

/// Initialize tracing for library usage from `RUST_LOG`
///
/// Does nothing if a global subscriber is already set.
pub fn init_library_tracing() {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .is_ok()
    {
        tracing::debug!("Library tracing initialized");
    }
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span wrapping one façade operation
    pub fn operation(name: &str, request_id: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "operation",
            operation = %name,
            request_id = %request_id
        )
    }

    /// Span wrapping one HTTP exchange
    pub fn http_request(method: &str, path: &str) -> Span {
        tracing::span!(
            Level::DEBUG,
            "http_request",
            method = %method,
            path = %path
        )
    }

    /// Create a span for preprocessing operations
    pub fn preprocessing(original_size: (u32, u32), target_side: u32) -> Span {
        tracing::span!(
            Level::DEBUG,
            "preprocessing",
            original_width = %original_size.0,
            original_height = %original_size.1,
            target_side = %target_side
        )
    }

    /// Create a span for postprocessing operations
    pub fn postprocessing(operation: &str) -> Span {
        tracing::span!(
            Level::DEBUG,
            "postprocessing",
            operation = %operation
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, warn};

    /// Log a completed HTTP exchange
    pub fn http_response(path: &str, status: u16, duration_ms: u64) {
        if (200..300).contains(&status) {
            debug!(
                path = %path,
                status = %status,
                duration_ms = %duration_ms,
                "HTTP response"
            );
        } else {
            warn!(
                path = %path,
                status = %status,
                duration_ms = %duration_ms,
                "HTTP error response"
            );
        }
    }

    /// Log an operation skipped because its input image was empty
    pub fn short_circuit(operation: &str) {
        debug!(operation = %operation, "Empty input image, skipping request");
    }

    /// Log a warning with recommendation
    pub fn warning_with_recommendation(message: &str, recommendation: &str) {
        warn!(
            message = %message,
            recommendation = %recommendation,
            "Warning"
        );
    }

    /// Log performance metrics
    pub fn performance_metric(operation: &str, duration_ms: u64) {
        debug!(
            operation = %operation,
            duration_ms = %duration_ms,
            "Performance metric"
        );
    }
}
