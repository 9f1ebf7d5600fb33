//! AMQP connection management with retry logic

use crate::error::{LeaderboardError, Result};
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

/// Configuration for AMQP connection
#[derive(Debug, Clone)]
pub struct AmqpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub vhost: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub connection_timeout_ms: u64,
}

impl Default for AmqpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5672,
            username: "guest".to_string(),
            password: "guest".to_string(),
            vhost: "/".to_string(),
            max_retries: 5,
            retry_delay_ms: 1000,
            connection_timeout_ms: 30000,
        }
    }
}

impl AmqpConfig {
    fn endpoint(&self) -> String {
        format!("{}:{}{}", self.host, self.port, self.vhost)
    }
}

/// Wrapper around AMQP connection with additional metadata
pub struct AmqpConnection {
    connection: Connection,
    _config: AmqpConfig,
}

impl AmqpConnection {
    /// Create a new AMQP connection with retry logic
    pub async fn new(config: AmqpConfig) -> Result<Self> {
        let mut delay = Duration::from_millis(config.retry_delay_ms);
        let mut last_error = String::new();

        for attempt in 0..=config.max_retries {
            if attempt > 0 {
                warn!(
                    "AMQP connection attempt {}/{} to {} failed: {}. Retrying in {:?}",
                    attempt,
                    config.max_retries,
                    config.endpoint(),
                    last_error,
                    delay
                );
                sleep(delay).await;
                // Exponential backoff with a 30s ceiling
                delay = Duration::from_millis((delay.as_millis() as u64 * 2).min(30000));
            }

            match Self::try_connect(&config).await {
                Ok(connection) => {
                    info!("Connected to AMQP broker at {}", config.endpoint());
                    return Ok(Self {
                        connection,
                        _config: config,
                    });
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(LeaderboardError::AmqpConnectionFailed {
            message: format!(
                "Gave up after {} retries: {}",
                config.max_retries, last_error
            ),
        }
        .into())
    }

    /// Single connection attempt, bounded by the configured timeout
    async fn try_connect(config: &AmqpConfig) -> Result<Connection> {
        let mut args = OpenConnectionArguments::new(
            &config.host,
            config.port,
            &config.username,
            &config.password,
        );
        args.virtual_host(&config.vhost);

        let open = timeout(
            Duration::from_millis(config.connection_timeout_ms),
            Connection::open(&args),
        );

        match open.await {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(e)) => Err(LeaderboardError::AmqpConnectionFailed {
                message: e.to_string(),
            }
            .into()),
            Err(_) => Err(LeaderboardError::AmqpConnectionFailed {
                message: format!(
                    "Handshake timed out after {}ms",
                    config.connection_timeout_ms
                ),
            }
            .into()),
        }
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Check if connection is still alive
    pub fn is_alive(&self) -> bool {
        self.connection.is_open()
    }

    /// Close the connection
    pub async fn close(self) -> Result<()> {
        self.connection
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to close AMQP connection: {}", e))
    }
}
