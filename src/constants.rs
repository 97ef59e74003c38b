// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! Protocol bounds used when revising client-requested subscription
//! parameters. Servers may tighten these through
//! [`SubscriptionLimits`](crate::config::SubscriptionLimits).

/// Shortest publishing interval a subscription may run at, in milliseconds.
pub const MIN_PUBLISHING_INTERVAL_MS: f64 = 100.0;

/// Longest publishing interval a subscription may run at, in milliseconds.
pub const MAX_PUBLISHING_INTERVAL_MS: f64 = 60_000.0;

/// Shortest time a subscription may live without client activity, in
/// milliseconds.
pub const MIN_LIFETIME_MS: f64 = 10_000.0;

/// Longest time a subscription may live without client activity, in
/// milliseconds. Also bounds the keep-alive product.
pub const MAX_LIFETIME_MS: f64 = 3_600_000.0;

/// Longest stretch between two messages on a healthy subscription, in
/// milliseconds. Bounds `max_keep_alive_count * publishing_interval`.
pub const MAX_KEEP_ALIVE_INTERVAL_MS: f64 = 60_000.0;

/// Keep-alive count substituted when the client requests 0.
pub const DEFAULT_KEEP_ALIVE_COUNT: u32 = 3;

/// Cap on the number of notifications carried by a single publish response.
pub const MAX_NOTIFICATIONS_PER_PUBLISH: u32 = 65_535;
