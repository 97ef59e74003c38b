// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! The per-subscription state machine and publish dispatcher.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use hashbrown::HashMap;
use log::{debug, info, trace};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::SubscriptionLimits;
use crate::types::status_code::StatusCode;
use crate::types::{
    ModifySubscriptionRequest, NotificationMessage, PublishResponse, ResponseHeader,
};

use super::monitored_item::{MonitoredItem, Notification};
use super::{AcknowledgementResults, PendingPublish, PublishQueue, Scheduler, StateListener};

/// The state of the subscription, from the state table in OPC UA Part 4
/// 5.13.1.2.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum SubscriptionState {
    /// Publishing normally.
    Normal,
    /// Nothing to report; counting down to the next keep-alive.
    KeepAlive,
    /// Something to send but no publish request to send it with.
    Late,
    /// The lifetime expired; waiting for a publish request to carry the
    /// final status change notification.
    Closing,
    /// Closed for good. No further transitions, no further timer ticks.
    Closed,
}

/// Identifies the row of the state table in OPC UA Part 4 5.13.1.2 that
/// handled an event. Returned from the event handlers so callers and tests
/// can validate the decision taken.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum HandledState {
    None0 = 0,
    Closed1 = 1,
    Normal4 = 4,
    Normal5 = 5,
    IntervalElapsed6 = 6,
    IntervalElapsed7 = 7,
    IntervalElapsed8 = 8,
    IntervalElapsed9 = 9,
    Late10 = 10,
    Late11 = 11,
    Late12 = 12,
    KeepAlive13 = 13,
    KeepAlive14 = 14,
    KeepAlive15 = 15,
    KeepAlive16 = 16,
    KeepAlive17 = 17,
    LifetimeExpired27 = 27,
}

/// Number of publishing intervals needed to cover `limit_ms`, adding one
/// only when the division leaves a remainder.
fn interval_count(limit_ms: f64, interval_ms: f64) -> u32 {
    let count = (limit_ms / interval_ms).floor();
    if count * interval_ms < limit_ms {
        count as u32 + 1
    } else {
        count as u32
    }
}

/// The client-negotiated publishing parameters of a subscription.
///
/// Values received from the client are revised against
/// [`SubscriptionLimits`] before use; revision never fails, it only clamps.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SubscriptionParameters {
    /// Publishing interval in milliseconds.
    pub publishing_interval: f64,
    /// Number of publishing intervals without client activity before the
    /// subscription expires.
    pub lifetime_count: u32,
    /// Number of publishing intervals without a notification before a
    /// keep-alive is sent.
    pub max_keep_alive_count: u32,
    /// Cap on the notifications carried by a single publish response.
    pub max_notifications_per_publish: u32,
}

impl SubscriptionParameters {
    /// Revise the requested values against `limits`.
    pub fn revise(mut self, limits: &SubscriptionLimits) -> SubscriptionParameters {
        // The publishing interval goes first; every count below is measured
        // in units of it.
        if !self.publishing_interval.is_finite()
            || self.publishing_interval < limits.min_publishing_interval_ms
        {
            self.publishing_interval = limits.min_publishing_interval_ms;
        } else if self.publishing_interval > limits.max_publishing_interval_ms {
            self.publishing_interval = limits.max_publishing_interval_ms;
        }

        if self.max_keep_alive_count == 0 {
            self.max_keep_alive_count = limits.default_keep_alive_count;
        }
        if self.max_keep_alive_count as f64 * self.publishing_interval > limits.max_lifetime_ms {
            self.max_keep_alive_count =
                interval_count(limits.max_lifetime_ms, self.publishing_interval);
        }
        if self.max_keep_alive_count as f64 * self.publishing_interval
            > limits.max_keep_alive_interval_ms
        {
            self.max_keep_alive_count =
                interval_count(limits.max_keep_alive_interval_ms, self.publishing_interval);
        }

        if self.lifetime_count as f64 * self.publishing_interval > limits.max_lifetime_ms {
            self.lifetime_count = interval_count(limits.max_lifetime_ms, self.publishing_interval);
        }
        // The lifetime must cover at least three keep-alive periods.
        if self.max_keep_alive_count > u32::MAX / 3 {
            self.lifetime_count = u32::MAX;
        } else if self.lifetime_count < 3 * self.max_keep_alive_count {
            self.lifetime_count = 3 * self.max_keep_alive_count;
        }
        // Minimum lifetime, skipped when the publishing interval alone
        // already covers it.
        if limits.min_lifetime_ms > self.publishing_interval
            && limits.min_lifetime_ms > self.lifetime_count as f64 * self.publishing_interval
        {
            self.lifetime_count = interval_count(limits.min_lifetime_ms, self.publishing_interval);
        }

        if self.max_notifications_per_publish == 0
            || self.max_notifications_per_publish > limits.max_notifications_per_publish
        {
            self.max_notifications_per_publish = limits.max_notifications_per_publish;
        }
        self
    }
}

struct SubscriptionInner {
    params: SubscriptionParameters,
    publishing_enabled: bool,
    priority: u8,
    state: SubscriptionState,
    /// Remaining publishing intervals before the subscription expires.
    lifetime_counter: u32,
    /// Remaining publishing intervals before a keep-alive is due.
    keep_alive_counter: u32,
    /// True once any message went out on this subscription. Stays true for
    /// the rest of its life.
    message_sent: bool,
    /// True when the last gather left notifications behind. Recomputed on
    /// every emission.
    more_notifications: bool,
    /// The sequence number the next notification message will carry.
    next_sequence_number: u32,
    items: HashMap<u32, Arc<dyn MonitoredItem>>,
    /// Emitted messages not yet acknowledged, keyed by sequence number.
    available_messages: HashMap<u32, NotificationMessage>,
    /// Item ids left over from the previous gather. The head item may hold
    /// residual notifications; the next publish resumes here.
    cursor: VecDeque<u32>,
}

impl SubscriptionInner {
    fn reset_lifetime_counter(&mut self) {
        self.lifetime_counter = self.params.lifetime_count;
    }

    fn reset_keep_alive_counter(&mut self) {
        self.keep_alive_counter = self.params.max_keep_alive_count;
    }

    /// Burn one publishing interval off the lifetime counter. Only client
    /// activity replenishes it.
    fn start_publishing_timer(&mut self) {
        self.lifetime_counter -= 1;
    }

    fn notifications_available(&self) -> bool {
        !self.cursor.is_empty()
            || self
                .items
                .values()
                .any(|item| item.has_notifications() || item.is_triggered())
    }

    fn take_sequence_number(&mut self) -> u32 {
        let sequence_number = self.next_sequence_number;
        // Sequence numbers wrap past the u32 range back to 1.
        self.next_sequence_number = if self.next_sequence_number == u32::MAX {
            1
        } else {
            self.next_sequence_number + 1
        };
        sequence_number
    }

    fn available_sequence_numbers(&self) -> Option<Vec<u32>> {
        if self.available_messages.is_empty() {
            return None;
        }
        let mut sequence_numbers: Vec<u32> = self.available_messages.keys().copied().collect();
        sequence_numbers.sort_unstable();
        Some(sequence_numbers)
    }

    /// Gather up to `max_notifications_per_publish` notifications, resuming
    /// from where the previous publish stopped and appending every item that
    /// has something to report. The head item advances only once it is
    /// drained, so no item can starve the ones behind it.
    fn gather_notifications(&mut self) -> Vec<Notification> {
        let max_notifications = self.params.max_notifications_per_publish as usize;
        let mut working = std::mem::take(&mut self.cursor);

        let mut pending: Vec<u32> = self
            .items
            .values()
            .filter(|item| item.has_notifications() || item.is_triggered())
            .map(|item| item.id())
            .collect();
        // Ids are handed out monotonically, so ascending id is creation
        // order and keeps the walk deterministic.
        pending.sort_unstable();
        for id in pending {
            if !working.contains(&id) {
                working.push_back(id);
            }
        }

        let mut notifications = Vec::new();
        while notifications.len() < max_notifications {
            let Some(&head) = working.front() else {
                break;
            };
            // The item may have been removed since the cursor was saved.
            let Some(item) = self.items.get(&head) else {
                working.pop_front();
                continue;
            };
            let remaining = max_notifications - notifications.len();
            if item.drain(&mut notifications, remaining) {
                working.pop_front();
            } else {
                break;
            }
        }

        self.more_notifications = !working.is_empty();
        self.cursor = working;
        notifications
    }
}

/// A single server-side subscription: a set of monitored items published to
/// the client on a timer-driven cadence.
///
/// All event handlers and mutation operations run under one internal lock,
/// so at most one of them is in flight at a time. Handlers never block: they
/// hand requests back to the [`PublishQueue`], send finished responses
/// through the pending request's channel and arm the next timer tick via the
/// [`Scheduler`].
pub struct Subscription {
    subscription_id: u32,
    limits: SubscriptionLimits,
    /// Self-handle passed to the scheduler, so an armed timer never keeps a
    /// deleted subscription alive.
    this: Weak<Subscription>,
    publish_queue: Arc<dyn PublishQueue>,
    scheduler: Arc<dyn Scheduler>,
    acknowledgements: Arc<dyn AcknowledgementResults>,
    state_listener: Option<Arc<dyn StateListener>>,
    inner: Mutex<SubscriptionInner>,
}

impl Subscription {
    /// Create a subscription. `params` is revised against `limits` before
    /// use; call [`Subscription::parameters`] for the revised values. The
    /// publishing timer is not armed until [`Subscription::start`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subscription_id: u32,
        params: SubscriptionParameters,
        publishing_enabled: bool,
        priority: u8,
        limits: SubscriptionLimits,
        publish_queue: Arc<dyn PublishQueue>,
        scheduler: Arc<dyn Scheduler>,
        acknowledgements: Arc<dyn AcknowledgementResults>,
        state_listener: Option<Arc<dyn StateListener>>,
    ) -> Arc<Subscription> {
        let params = params.revise(&limits);
        debug!(
            "Creating subscription {} with revised parameters {:?}",
            subscription_id, params
        );
        Arc::new_cyclic(|this| Subscription {
            subscription_id,
            limits,
            this: this.clone(),
            publish_queue,
            scheduler,
            acknowledgements,
            state_listener,
            inner: Mutex::new(SubscriptionInner {
                publishing_enabled,
                priority,
                state: SubscriptionState::Normal,
                lifetime_counter: params.lifetime_count,
                keep_alive_counter: params.max_keep_alive_count,
                message_sent: false,
                more_notifications: false,
                next_sequence_number: 1,
                items: HashMap::new(),
                available_messages: HashMap::new(),
                cursor: VecDeque::new(),
                params,
            }),
        })
    }

    /// Arm the first publishing timer tick. Call exactly once, after
    /// construction.
    pub fn start(&self) {
        let inner = self.inner.lock();
        self.reschedule(&inner);
    }

    /// Handle a publish request routed to this subscription by its owner.
    ///
    /// Returns the state table row that handled the event.
    pub fn on_publish(&self, request: PendingPublish) -> HandledState {
        let mut inner = self.inner.lock();
        let handled = self.handle_publish(&mut inner, request);
        trace!(
            "Subscription {} publish handled by row {:?}, state now {:?}",
            self.subscription_id,
            handled,
            inner.state
        );
        handled
    }

    /// Handle an expiry of the publishing timer.
    ///
    /// Returns the state table row that handled the event.
    pub fn on_timer(&self) -> HandledState {
        let mut inner = self.inner.lock();
        let handled = self.handle_timer(&mut inner);
        trace!(
            "Subscription {} timer handled by row {:?}, state now {:?}, lifetime {} keep alive {}",
            self.subscription_id,
            handled,
            inner.state,
            inner.lifetime_counter,
            inner.keep_alive_counter
        );
        handled
    }

    fn handle_publish(&self, inner: &mut SubscriptionInner, request: PendingPublish) -> HandledState {
        match inner.state {
            SubscriptionState::Closed => {
                // Row 1. The owner answers requests on dead subscriptions
                // with BadNoSubscription; this engine only parks them.
                self.publish_queue.enqueue_request(request);
                HandledState::Closed1
            }
            SubscriptionState::Closing => {
                // Row 27, final act: the request carries the status change
                // out and the subscription is done.
                self.return_status_change(inner, request, StatusCode::BadTimeout);
                self.set_state(inner, SubscriptionState::Closed);
                HandledState::LifetimeExpired27
            }
            SubscriptionState::Normal => {
                if inner.publishing_enabled && inner.more_notifications {
                    // Row 5
                    inner.reset_lifetime_counter();
                    inner.message_sent = true;
                    self.return_notifications(inner, request);
                    HandledState::Normal5
                } else {
                    // Row 4
                    self.publish_queue.enqueue_request(request);
                    HandledState::Normal4
                }
            }
            SubscriptionState::Late => {
                let notifications_available = inner.notifications_available();
                if inner.publishing_enabled
                    && (notifications_available || inner.more_notifications)
                {
                    // Row 10
                    inner.reset_lifetime_counter();
                    inner.message_sent = true;
                    self.set_state(inner, SubscriptionState::Normal);
                    self.return_notifications(inner, request);
                    HandledState::Late10
                } else {
                    // Row 11
                    inner.reset_lifetime_counter();
                    inner.message_sent = true;
                    self.set_state(inner, SubscriptionState::KeepAlive);
                    self.return_keep_alive(inner, request);
                    HandledState::Late11
                }
            }
            SubscriptionState::KeepAlive => {
                // Row 13
                self.publish_queue.enqueue_request(request);
                HandledState::KeepAlive13
            }
        }
    }

    fn handle_timer(&self, inner: &mut SubscriptionInner) -> HandledState {
        match inner.state {
            // No timer runs in either closing state; a straggling tick
            // scheduled before the transition does nothing.
            SubscriptionState::Closed | SubscriptionState::Closing => HandledState::None0,
            _ => {
                inner.start_publishing_timer();
                if inner.lifetime_counter == 0 {
                    self.when_lifetime_expires(inner)
                } else {
                    match inner.state {
                        SubscriptionState::Normal => self.when_normal_timer(inner),
                        SubscriptionState::Late => self.when_late_timer(inner),
                        SubscriptionState::KeepAlive => self.when_keep_alive_timer(inner),
                        SubscriptionState::Closing | SubscriptionState::Closed => unreachable!(),
                    }
                }
            }
        }
    }

    fn when_normal_timer(&self, inner: &mut SubscriptionInner) -> HandledState {
        let publishing_enabled = inner.publishing_enabled;
        loop {
            let notifications_available = inner.notifications_available();
            let request_queued = self.publish_queue.is_not_empty();
            if request_queued && publishing_enabled && notifications_available {
                // Row 6
                let Some(request) = self.publish_queue.poll_request() else {
                    // Queue drained between the check and the poll; take
                    // another look at the conditions.
                    continue;
                };
                inner.reset_lifetime_counter();
                inner.message_sent = true;
                self.return_notifications(inner, request);
                self.reschedule(inner);
                return HandledState::IntervalElapsed6;
            } else if request_queued
                && !inner.message_sent
                && (!publishing_enabled || !notifications_available)
            {
                // Row 7
                let Some(request) = self.publish_queue.poll_request() else {
                    continue;
                };
                inner.reset_lifetime_counter();
                inner.message_sent = true;
                self.return_keep_alive(inner, request);
                self.reschedule(inner);
                return HandledState::IntervalElapsed7;
            } else if !request_queued
                && (!inner.message_sent || (publishing_enabled && notifications_available))
            {
                // Row 8
                self.set_state(inner, SubscriptionState::Late);
                self.publish_queue.register_late(self.subscription_id);
                self.reschedule(inner);
                return HandledState::IntervalElapsed8;
            } else if inner.message_sent && (!publishing_enabled || !notifications_available) {
                // Row 9
                inner.reset_keep_alive_counter();
                self.set_state(inner, SubscriptionState::KeepAlive);
                self.reschedule(inner);
                return HandledState::IntervalElapsed9;
            } else {
                // The four rows above partition the condition space.
                unreachable!(
                    "Unhandled normal state: queued {} sent {} available {}",
                    request_queued, inner.message_sent, notifications_available
                );
            }
        }
    }

    fn when_late_timer(&self, inner: &mut SubscriptionInner) -> HandledState {
        // Row 12. Still parked; either a publish request or the lifetime
        // counter gets us out of here.
        self.reschedule(inner);
        HandledState::Late12
    }

    fn when_keep_alive_timer(&self, inner: &mut SubscriptionInner) -> HandledState {
        let publishing_enabled = inner.publishing_enabled;
        loop {
            let notifications_available = inner.notifications_available();
            let request_queued = self.publish_queue.is_not_empty();
            let keep_alive_counter = inner.keep_alive_counter;
            if publishing_enabled && notifications_available && request_queued {
                // Row 14
                let Some(request) = self.publish_queue.poll_request() else {
                    continue;
                };
                inner.reset_lifetime_counter();
                inner.message_sent = true;
                self.set_state(inner, SubscriptionState::Normal);
                self.return_notifications(inner, request);
                self.reschedule(inner);
                return HandledState::KeepAlive14;
            } else if request_queued
                && keep_alive_counter == 1
                && (!publishing_enabled || !notifications_available)
            {
                // Row 15
                let Some(request) = self.publish_queue.poll_request() else {
                    continue;
                };
                inner.reset_lifetime_counter();
                inner.reset_keep_alive_counter();
                self.return_keep_alive(inner, request);
                self.reschedule(inner);
                return HandledState::KeepAlive15;
            } else if keep_alive_counter > 1
                && (!publishing_enabled || !notifications_available)
            {
                // Row 16
                inner.keep_alive_counter -= 1;
                self.reschedule(inner);
                return HandledState::KeepAlive16;
            } else if !request_queued
                && (keep_alive_counter == 1
                    || (keep_alive_counter > 1 && publishing_enabled && notifications_available))
            {
                // Row 17
                self.set_state(inner, SubscriptionState::Late);
                self.publish_queue.register_late(self.subscription_id);
                self.reschedule(inner);
                return HandledState::KeepAlive17;
            } else {
                unreachable!(
                    "Unhandled keep alive state: queued {} counter {} available {}",
                    request_queued, keep_alive_counter, notifications_available
                );
            }
        }
    }

    fn when_lifetime_expires(&self, inner: &mut SubscriptionInner) -> HandledState {
        // Row 27. Park with the queue so the next publish request is routed
        // here and can carry the BadTimeout status change. The timer is not
        // rearmed; nothing is left to pace.
        info!(
            "Subscription {} lifetime expired, closing",
            self.subscription_id
        );
        self.set_state(inner, SubscriptionState::Closing);
        self.publish_queue.register_late(self.subscription_id);
        HandledState::LifetimeExpired27
    }

    /// Answer `request` with gathered notifications, then keep answering
    /// from the queue while notifications remain. If residue is left and the
    /// queue is empty, park with the queue to get the next request.
    fn return_notifications(&self, inner: &mut SubscriptionInner, request: PendingPublish) {
        let mut request = request;
        loop {
            let notifications = inner.gather_notifications();
            if notifications.is_empty() {
                // A triggered item can drain to nothing; a keep-alive shape
                // beats an empty notification message.
                self.return_keep_alive(inner, request);
                return;
            }
            let request_handle = request.request.request_header.request_handle;
            let response = self.build_notification_response(inner, request_handle, notifications);
            Self::send_response(request, response);
            if !inner.more_notifications {
                return;
            }
            match self.publish_queue.poll_request() {
                Some(next) => {
                    inner.reset_lifetime_counter();
                    request = next;
                }
                None => {
                    self.publish_queue.register_late(self.subscription_id);
                    return;
                }
            }
        }
    }

    fn build_notification_response(
        &self,
        inner: &mut SubscriptionInner,
        request_handle: u32,
        notifications: Vec<Notification>,
    ) -> PublishResponse {
        let mut data_changes = Vec::new();
        let mut events = Vec::new();
        for notification in notifications {
            match notification {
                Notification::MonitoredItemNotification(v) => data_changes.push(v),
                Notification::Event(v) => events.push(v),
            }
        }
        let sequence_number = inner.take_sequence_number();
        debug!(
            "Subscription {} sending notification message {}, more notifications {}",
            self.subscription_id, sequence_number, inner.more_notifications
        );
        let message =
            NotificationMessage::data_change(sequence_number, Utc::now(), data_changes, events);
        inner.available_messages.insert(sequence_number, message.clone());
        PublishResponse {
            response_header: ResponseHeader::new_good(request_handle),
            subscription_id: self.subscription_id,
            available_sequence_numbers: inner.available_sequence_numbers(),
            more_notifications: inner.more_notifications,
            notification_message: message,
            results: self.acknowledgements.acknowledge_results(request_handle),
            diagnostic_infos: None,
        }
    }

    fn return_keep_alive(&self, inner: &mut SubscriptionInner, request: PendingPublish) {
        let request_handle = request.request.request_header.request_handle;
        debug!(
            "Subscription {} sending keep alive, sequence number {}",
            self.subscription_id, inner.next_sequence_number
        );
        // A keep-alive does not consume a sequence number; it announces the
        // number the next notification message will carry.
        let message = NotificationMessage::keep_alive(inner.next_sequence_number, Utc::now());
        let response = PublishResponse {
            response_header: ResponseHeader::new_good(request_handle),
            subscription_id: self.subscription_id,
            available_sequence_numbers: inner.available_sequence_numbers(),
            more_notifications: false,
            notification_message: message,
            results: self.acknowledgements.acknowledge_results(request_handle),
            diagnostic_infos: None,
        };
        Self::send_response(request, response);
    }

    fn return_status_change(
        &self,
        inner: &mut SubscriptionInner,
        request: PendingPublish,
        status: StatusCode,
    ) {
        let request_handle = request.request.request_header.request_handle;
        let sequence_number = inner.take_sequence_number();
        debug!(
            "Subscription {} sending status change {}, sequence number {}",
            self.subscription_id, status, sequence_number
        );
        // Terminal message; it is not retained for republish.
        let message = NotificationMessage::status_change(sequence_number, Utc::now(), status);
        let response = PublishResponse {
            response_header: ResponseHeader::new_good(request_handle),
            subscription_id: self.subscription_id,
            available_sequence_numbers: None,
            more_notifications: false,
            notification_message: message,
            results: self.acknowledgements.acknowledge_results(request_handle),
            diagnostic_infos: None,
        };
        Self::send_response(request, response);
    }

    fn send_response(request: PendingPublish, response: PublishResponse) {
        let PendingPublish {
            request_id,
            response: sender,
            ..
        } = request;
        if sender.send(response).is_err() {
            debug!(
                "Publish response for request {} dropped, receiver is gone",
                request_id
            );
        }
    }

    fn set_state(&self, inner: &mut SubscriptionInner, state: SubscriptionState) {
        let previous = inner.state;
        if previous == state {
            return;
        }
        inner.state = state;
        trace!(
            "Subscription {} state {:?} -> {:?}",
            self.subscription_id,
            previous,
            state
        );
        if let Some(listener) = &self.state_listener {
            listener.on_state_change(previous, state);
        }
    }

    fn reschedule(&self, inner: &SubscriptionInner) {
        let delay = Duration::from_secs_f64(inner.params.publishing_interval / 1000.0);
        let subscription = self.this.clone();
        self.scheduler.schedule_after(
            delay,
            Box::new(move || {
                if let Some(subscription) = subscription.upgrade() {
                    subscription.on_timer();
                }
            }),
        );
    }

    /// Apply a modify request: revise the new parameters and reset the
    /// lifetime counter. The keep-alive counter is left alone. Returns the
    /// revised parameters for the service response.
    pub fn modify(&self, request: &ModifySubscriptionRequest) -> SubscriptionParameters {
        let params = SubscriptionParameters {
            publishing_interval: request.requested_publishing_interval,
            lifetime_count: request.requested_lifetime_count,
            max_keep_alive_count: request.requested_max_keep_alive_count,
            max_notifications_per_publish: request.max_notifications_per_publish,
        }
        .revise(&self.limits);
        let mut inner = self.inner.lock();
        debug!(
            "Modifying subscription {}, revised parameters {:?}",
            self.subscription_id, params
        );
        inner.params = params;
        inner.priority = request.priority;
        inner.reset_lifetime_counter();
        params
    }

    /// Enable or disable publishing. Counts as client activity.
    pub fn set_publishing_mode(&self, publishing_enabled: bool) {
        let mut inner = self.inner.lock();
        inner.publishing_enabled = publishing_enabled;
        inner.reset_lifetime_counter();
    }

    /// Attach monitored items to this subscription. The items stay owned by
    /// the caller; the subscription drains them during publishes.
    pub fn add_items(&self, items: impl IntoIterator<Item = Arc<dyn MonitoredItem>>) {
        let mut inner = self.inner.lock();
        for item in items {
            inner.items.insert(item.id(), item);
        }
        inner.reset_lifetime_counter();
    }

    /// Detach monitored items by id, reporting a status for each.
    pub fn remove_items(&self, item_ids: &[u32]) -> Vec<StatusCode> {
        let mut inner = self.inner.lock();
        let results = item_ids
            .iter()
            .map(|id| match inner.items.remove(id) {
                Some(_) => StatusCode::Good,
                None => StatusCode::BadMonitoredItemIdInvalid,
            })
            .collect();
        inner.reset_lifetime_counter();
        results
    }

    /// Acknowledge a notification message, dropping it from the republish
    /// store. Acknowledging an unknown or already acknowledged number yields
    /// `BadSequenceNumberUnknown`.
    pub fn acknowledge(&self, sequence_number: u32) -> StatusCode {
        let mut inner = self.inner.lock();
        if inner.available_messages.remove(&sequence_number).is_some() {
            trace!(
                "Subscription {} acknowledged sequence number {}",
                self.subscription_id,
                sequence_number
            );
            StatusCode::Good
        } else {
            StatusCode::BadSequenceNumberUnknown
        }
    }

    /// Fetch a retained message for retransmission. Counts as client
    /// activity. `None` means the caller answers with
    /// `BadMessageNotAvailable`.
    pub fn republish(&self, sequence_number: u32) -> Option<NotificationMessage> {
        let mut inner = self.inner.lock();
        inner.reset_lifetime_counter();
        inner.available_messages.get(&sequence_number).cloned()
    }

    /// Close the subscription for good and hand its monitored items back to
    /// the caller for teardown. No further timer tick is armed.
    pub fn delete(&self) -> Vec<Arc<dyn MonitoredItem>> {
        let mut inner = self.inner.lock();
        info!("Deleting subscription {}", self.subscription_id);
        self.set_state(&mut inner, SubscriptionState::Closed);
        inner.cursor.clear();
        inner.items.drain().map(|(_, item)| item).collect()
    }

    /// The server-assigned id of this subscription.
    pub fn subscription_id(&self) -> u32 {
        self.subscription_id
    }

    /// The current publishing parameters, as revised.
    pub fn parameters(&self) -> SubscriptionParameters {
        self.inner.lock().params
    }

    /// The current state.
    pub fn state(&self) -> SubscriptionState {
        self.inner.lock().state
    }

    /// Relative priority against the session's other subscriptions.
    pub fn priority(&self) -> u8 {
        self.inner.lock().priority
    }

    /// Whether publishing is enabled.
    pub fn publishing_enabled(&self) -> bool {
        self.inner.lock().publishing_enabled
    }

    /// Remaining publishing intervals before the subscription expires.
    pub fn lifetime_counter(&self) -> u32 {
        self.inner.lock().lifetime_counter
    }

    /// Remaining publishing intervals before a keep-alive is due.
    pub fn keep_alive_counter(&self) -> u32 {
        self.inner.lock().keep_alive_counter
    }

    /// True once any message has been sent on this subscription.
    pub fn message_sent(&self) -> bool {
        self.inner.lock().message_sent
    }

    /// True if the last gather left notifications behind.
    pub fn more_notifications(&self) -> bool {
        self.inner.lock().more_notifications
    }

    /// Number of monitored items attached.
    pub fn monitored_item_count(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Sequence numbers of the retained messages, ascending.
    pub fn available_sequence_numbers(&self) -> Vec<u32> {
        self.inner.lock().available_sequence_numbers().unwrap_or_default()
    }
}
