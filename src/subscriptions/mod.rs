// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! The subscription engine and the traits it consumes.
//!
//! A [`Subscription`] is driven by two events: arrival of a publish request
//! routed to it by the owner, and expiry of its publishing timer. Everything
//! else — item sampling, the shared request queue, timers, acknowledgement
//! bookkeeping — is reached through the traits defined here.

mod monitored_item;
mod subscription;


pub use monitored_item::{MonitoredItem, Notification};
pub use subscription::{
    HandledState, Subscription, SubscriptionParameters, SubscriptionState,
};

use std::time::Duration;

use crate::types::status_code::StatusCode;
use crate::types::{PublishRequest, PublishResponse};

/// A publish request waiting to be answered.
///
/// The response travels back to the transport through a oneshot channel;
/// a request may be open for a long time while the subscription waits for
/// something to report.
pub struct PendingPublish {
    /// Transport-level id of the request, for logging.
    pub request_id: u32,
    /// The request itself.
    pub request: Box<PublishRequest>,
    /// Where the response should be sent once one is produced.
    pub response: tokio::sync::oneshot::Sender<PublishResponse>,
}

impl std::fmt::Debug for PendingPublish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPublish")
            .field("request_id", &self.request_id)
            .field("request", &self.request)
            .finish()
    }
}

/// The queue of publish requests shared by every subscription in a session.
///
/// The queue routes each request to at most one subscription, and routes the
/// next available request to any subscription that registered itself as
/// waiting.
pub trait PublishQueue: Send + Sync {
    /// Park a request the subscription cannot answer right now.
    fn enqueue_request(&self, request: PendingPublish);
    /// Take the oldest queued request, if any.
    fn poll_request(&self) -> Option<PendingPublish>;
    /// True if at least one request is queued. A subsequent poll may still
    /// come back empty if another subscription takes the request first.
    fn is_not_empty(&self) -> bool;
    /// Note that this subscription has something to send and no request to
    /// send it with. The next request to arrive should be routed to it.
    fn register_late(&self, subscription_id: u32);
}

/// Runs the publishing timer. Implementations dispatch the callback on a
/// worker after the delay elapses; the callback re-enters the subscription
/// lock.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once, `delay` from now.
    fn schedule_after(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>);
}

/// Access to the acknowledgement results the owning manager computed when it
/// accepted a publish request.
pub trait AcknowledgementResults: Send + Sync {
    /// The status of each `SubscriptionAcknowledgement` carried by the
    /// request with this handle, in request order.
    fn acknowledge_results(&self, request_handle: u32) -> Option<Vec<StatusCode>>;
}

/// Observer for subscription state transitions. Called with the subscription
/// lock held, so implementations must not call back into the subscription.
pub trait StateListener: Send + Sync {
    /// Called after the subscription moved from `previous` to `current`.
    fn on_state_change(&self, previous: SubscriptionState, current: SubscriptionState);
}
