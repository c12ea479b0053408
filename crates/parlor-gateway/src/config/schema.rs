use serde::Deserialize;

use parlor_core::error::{ParlorError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub matching: MatchingSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ParlorError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.matching.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(ParlorError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(ParlorError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(ParlorError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(64..=1_048_576).contains(&self.max_frame_bytes) {
            return Err(ParlorError::BadRequest(
                "gateway.max_frame_bytes must be between 64 and 1048576".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_max_frame_bytes() -> usize {
    4096
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingSection {
    /// 0 = unbounded (the default; the matching FIFO applies no
    /// backpressure unless a capacity is set here).
    #[serde(default)]
    pub queue_capacity: usize,

    #[serde(default = "default_table_id_prefix")]
    pub table_id_prefix: String,
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self {
            queue_capacity: 0,
            table_id_prefix: default_table_id_prefix(),
        }
    }
}

impl MatchingSection {
    pub fn validate(&self) -> Result<()> {
        if self.table_id_prefix.is_empty() {
            return Err(ParlorError::BadRequest(
                "matching.table_id_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_table_id_prefix() -> String {
    "match".into()
}
