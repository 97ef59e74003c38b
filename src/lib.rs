// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

#![warn(missing_docs)]

//! Server-side OPC UA subscription engine.
//!
//! This crate implements the subscription state machine from OPC UA Part 4
//! 5.13.1.2: the five publishing states, the keep-alive and lifetime counter
//! discipline, fair draining of notifications across monitored items, and
//! sequence number / republish bookkeeping.
//!
//! The engine does not sample values, encode messages or own the publish
//! request queue. Those concerns are reached through the narrow traits in
//! [`subscriptions`], so the surrounding server decides how items are
//! sampled, how timers run and how responses reach the wire.

pub mod config;
pub mod constants;
pub mod subscriptions;
pub mod types;

pub use config::SubscriptionLimits;
pub use subscriptions::{
    AcknowledgementResults, HandledState, MonitoredItem, Notification, PendingPublish,
    PublishQueue, Scheduler, StateListener, Subscription, SubscriptionParameters,
    SubscriptionState,
};
pub use types::status_code::StatusCode;
pub use types::{NotificationMessage, PublishRequest, PublishResponse};
