//! Server settings read from the client's `initializationOptions`.
//!
//! ```json
//! {
//!   "maxCandidates": 2000,
//!   "maxBytes": 1048576,
//!   "straightTypes": ["NRGBA", "Color32"],
//!   "premultipliedTypes": ["RGBA"],
//!   "callees": ["QColor", "FromHex"],
//!   "argbCallees": ["FromArgb"],
//!   "hashHex": true,
//!   "hashAlphaFirst": false,
//!   "packedAlphaFirst": true,
//!   "defaultConvention": "premultiplied",
//!   "logFilter": "tinct_core=debug"
//! }
//! ```
//!
//! Every key is optional. Unknown keys are ignored; a key with the wrong type
//! rejects the whole object.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tinct_core::{AlphaConvention, CatalogConfig, ScanLimits};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub catalog: CatalogConfig,
    pub limits: ScanLimits,
    pub log_filter: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            limits: ScanLimits {
                max_candidates: Some(10_000),
                max_bytes: Some(8 * 1024 * 1024),
            },
            log_filter: None,
        }
    }
}

impl ServerConfig {
    pub fn from_options(options: Option<&Value>) -> Result<Self> {
        let mut config = Self::default();
        let obj = match options {
            None | Some(Value::Null) => return Ok(config),
            Some(Value::Object(obj)) => obj,
            Some(other) => bail!("initializationOptions must be an object, got {other}"),
        };

        for (key, value) in obj {
            match key.as_str() {
                "maxCandidates" => config.limits.max_candidates = limit(value, key)?,
                "maxBytes" => config.limits.max_bytes = limit(value, key)?,
                "straightTypes" => config.catalog.straight_types = strings(value, key)?,
                "premultipliedTypes" => config.catalog.premultiplied_types = strings(value, key)?,
                "callees" => config.catalog.callees = strings(value, key)?,
                "argbCallees" => config.catalog.argb_callees = strings(value, key)?,
                "hashHex" => config.catalog.hash_hex = flag(value, key)?,
                "hashAlphaFirst" => config.catalog.hash_alpha_first = flag(value, key)?,
                "packedAlphaFirst" => config.catalog.packed_alpha_first = flag(value, key)?,
                "defaultConvention" => {
                    config.catalog.default_convention = convention(value)
                        .with_context(|| format!("invalid `{key}`"))?;
                }
                "logFilter" => {
                    let filter =
                        value.as_str().with_context(|| format!("`{key}` must be a string"))?;
                    config.log_filter = Some(filter.to_string());
                }
                _ => {}
            }
        }
        Ok(config)
    }
}

/// `null` lifts the limit.
fn limit(value: &Value, key: &str) -> Result<Option<usize>> {
    match value {
        Value::Null => Ok(None),
        v => {
            let n = v.as_u64().with_context(|| format!("`{key}` must be a non-negative integer"))?;
            Ok(Some(usize::try_from(n).with_context(|| format!("`{key}` is too large"))?))
        }
    }
}

fn strings(value: &Value, key: &str) -> Result<Vec<String>> {
    let items = value.as_array().with_context(|| format!("`{key}` must be an array"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .with_context(|| format!("`{key}` entries must be strings"))
        })
        .collect()
}

fn flag(value: &Value, key: &str) -> Result<bool> {
    value.as_bool().with_context(|| format!("`{key}` must be a boolean"))
}

fn convention(value: &Value) -> Result<AlphaConvention> {
    match value.as_str() {
        Some("premultiplied") => Ok(AlphaConvention::Premultiplied),
        Some("straight" | "non-premultiplied") => Ok(AlphaConvention::NonPremultiplied),
        _ => bail!("expected \"premultiplied\" or \"straight\", got {value}"),
    }
}
