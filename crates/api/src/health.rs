//! Service health report.
//!
//! One check, `MessageQueueProxyReachable`, passes when the producer's proxy
//! lists the write topic and at least one consumer proxy lists the read
//! topic.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use vam_queue::ConnectivityCheck;

use crate::config::ServerConfig;

pub const CHECK_ID: &str = "message-queue-proxy-reachable";
pub const CHECK_NAME: &str = "MessageQueueProxyReachable";
pub const BUSINESS_IMPACT: &str = "Annotations from published Next videos will not be created, clients will not see them within content.";
pub const TECHNICAL_SUMMARY: &str = "Message queue proxy is not reachable/healthy";

pub const SERVICE_DESCRIPTION: &str = "Gets the Next video content from queue, transforms annotations to an internal representation and puts a new created annotation content to queue.";

/// Full `/__health` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub schema_version: u8,
    pub system_code: String,
    pub name: String,
    pub description: &'static str,
    pub ok: bool,
    pub checks: Vec<CheckResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: &'static str,
    pub name: &'static str,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: &'static str,
    pub technical_summary: &'static str,
    pub panic_guide: String,
    pub check_output: String,
    pub last_updated: String,
}

/// Runs the queue proxy connectivity checks.
#[derive(Clone)]
pub struct HealthChecker {
    producer: Arc<dyn ConnectivityCheck>,
    consumers: Vec<Arc<dyn ConnectivityCheck>>,
}

impl HealthChecker {
    pub fn new(
        producer: Arc<dyn ConnectivityCheck>,
        consumers: Vec<Arc<dyn ConnectivityCheck>>,
    ) -> Self {
        Self {
            producer,
            consumers,
        }
    }

    /// `Ok` with a short summary, or `Err` with every failure joined.
    pub async fn check(&self) -> Result<String, String> {
        if let Err(e) = self.producer.connectivity_check().await {
            return Err(format!(
                "Health check for {} failed. Error: {e}",
                self.producer.describe()
            ));
        }

        let mut failures = Vec::new();
        for consumer in &self.consumers {
            match consumer.connectivity_check().await {
                Ok(()) => return Ok("Ok".to_string()),
                Err(e) => failures.push(format!(
                    "Health check for {} failed. Error: {e}",
                    consumer.describe()
                )),
            }
        }

        if failures.is_empty() {
            Err("No consumer queue addresses configured".to_string())
        } else {
            Err(failures.join(" "))
        }
    }

    pub async fn report(&self, config: &ServerConfig, now: DateTime<Utc>) -> HealthReport {
        let result = self.check().await;
        if let Err(msg) = &result {
            tracing::warn!(check = CHECK_NAME, error = %msg, "Health check failed");
        }
        let ok = result.is_ok();

        HealthReport {
            schema_version: 1,
            system_code: config.system_code.clone(),
            name: config.app_name.clone(),
            description: SERVICE_DESCRIPTION,
            ok,
            checks: vec![CheckResult {
                id: CHECK_ID,
                name: CHECK_NAME,
                ok,
                severity: 1,
                business_impact: BUSINESS_IMPACT,
                technical_summary: TECHNICAL_SUMMARY,
                panic_guide: config.panic_guide.clone(),
                check_output: result.unwrap_or_else(|e| e),
                last_updated: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            }],
        }
    }
}
