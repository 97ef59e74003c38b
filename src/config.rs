// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! Subscription limits configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
/// Bounds applied when revising client-requested subscription parameters.
///
/// The defaults are the protocol bounds from [`crate::constants`]; a server
/// may deserialize tighter values from its own configuration file.
pub struct SubscriptionLimits {
    /// Minimum publishing interval in milliseconds.
    #[serde(default = "defaults::min_publishing_interval_ms")]
    pub min_publishing_interval_ms: f64,
    /// Maximum publishing interval in milliseconds.
    #[serde(default = "defaults::max_publishing_interval_ms")]
    pub max_publishing_interval_ms: f64,
    /// Minimum subscription lifetime in milliseconds.
    #[serde(default = "defaults::min_lifetime_ms")]
    pub min_lifetime_ms: f64,
    /// Maximum subscription lifetime in milliseconds.
    #[serde(default = "defaults::max_lifetime_ms")]
    pub max_lifetime_ms: f64,
    /// Maximum time between two messages on the subscription, in
    /// milliseconds. Bounds the keep-alive product.
    #[serde(default = "defaults::max_keep_alive_interval_ms")]
    pub max_keep_alive_interval_ms: f64,
    /// Value of `MaxKeepAliveCount` used when the client requests 0.
    #[serde(default = "defaults::default_keep_alive_count")]
    pub default_keep_alive_count: u32,
    /// Maximum number of notifications per publish response.
    #[serde(default = "defaults::max_notifications_per_publish")]
    pub max_notifications_per_publish: u32,
}

impl Default for SubscriptionLimits {
    fn default() -> Self {
        Self {
            min_publishing_interval_ms: defaults::min_publishing_interval_ms(),
            max_publishing_interval_ms: defaults::max_publishing_interval_ms(),
            min_lifetime_ms: defaults::min_lifetime_ms(),
            max_lifetime_ms: defaults::max_lifetime_ms(),
            max_keep_alive_interval_ms: defaults::max_keep_alive_interval_ms(),
            default_keep_alive_count: defaults::default_keep_alive_count(),
            max_notifications_per_publish: defaults::max_notifications_per_publish(),
        }
    }
}

mod defaults {
    use crate::constants;

    pub fn min_publishing_interval_ms() -> f64 {
        constants::MIN_PUBLISHING_INTERVAL_MS
    }
    pub fn max_publishing_interval_ms() -> f64 {
        constants::MAX_PUBLISHING_INTERVAL_MS
    }
    pub fn min_lifetime_ms() -> f64 {
        constants::MIN_LIFETIME_MS
    }
    pub fn max_lifetime_ms() -> f64 {
        constants::MAX_LIFETIME_MS
    }
    pub fn max_keep_alive_interval_ms() -> f64 {
        constants::MAX_KEEP_ALIVE_INTERVAL_MS
    }
    pub fn default_keep_alive_count() -> u32 {
        constants::DEFAULT_KEEP_ALIVE_COUNT
    }
    pub fn max_notifications_per_publish() -> u32 {
        constants::MAX_NOTIFICATIONS_PER_PUBLISH
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionLimits;

    #[test]
    fn missing_fields_take_defaults() {
        let limits: SubscriptionLimits =
            serde_json::from_str(r#"{ "min_publishing_interval_ms": 250.0 }"#).unwrap();
        assert_eq!(limits.min_publishing_interval_ms, 250.0);
        assert_eq!(limits.max_publishing_interval_ms, 60_000.0);
        assert_eq!(limits.default_keep_alive_count, 3);
        assert_eq!(limits.max_notifications_per_publish, 65_535);
    }

    #[test]
    fn round_trip() {
        let limits = SubscriptionLimits::default();
        let s = serde_json::to_string(&limits).unwrap();
        let back: SubscriptionLimits = serde_json::from_str(&s).unwrap();
        assert_eq!(limits, back);
    }
}
