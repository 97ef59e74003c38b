// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! End-to-end publish scenarios driven through the public API, with
//! in-memory stand-ins for the queue, scheduler and manager bookkeeping.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use opcua_subscriptions::types::{
    DataValue, MonitoredItemNotification, NotificationData, PublishRequest, RequestHeader,
};
use opcua_subscriptions::{
    AcknowledgementResults, MonitoredItem, Notification, PendingPublish, PublishQueue,
    PublishResponse, Scheduler, StatusCode, Subscription, SubscriptionLimits,
    SubscriptionParameters, SubscriptionState,
};

struct SessionQueue {
    requests: Mutex<VecDeque<PendingPublish>>,
    late: Mutex<Vec<u32>>,
}

impl SessionQueue {
    fn new() -> Arc<SessionQueue> {
        Arc::new(SessionQueue {
            requests: Mutex::new(VecDeque::new()),
            late: Mutex::new(Vec::new()),
        })
    }

    fn late_registrations(&self) -> Vec<u32> {
        self.late.lock().clone()
    }
}

impl PublishQueue for SessionQueue {
    fn enqueue_request(&self, request: PendingPublish) {
        self.requests.lock().push_back(request);
    }

    fn poll_request(&self) -> Option<PendingPublish> {
        self.requests.lock().pop_front()
    }

    fn is_not_empty(&self) -> bool {
        !self.requests.lock().is_empty()
    }

    fn register_late(&self, subscription_id: u32) {
        self.late.lock().push(subscription_id);
    }
}

/// Counts armed timers; the tests step the subscription by calling
/// `on_timer` themselves.
struct TickCounter(AtomicUsize);

impl TickCounter {
    fn new() -> Arc<TickCounter> {
        Arc::new(TickCounter(AtomicUsize::new(0)))
    }

    fn armed(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Scheduler for TickCounter {
    fn schedule_after(&self, _delay: Duration, _callback: Box<dyn FnOnce() + Send>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct NoAcks;

impl AcknowledgementResults for NoAcks {
    fn acknowledge_results(&self, _request_handle: u32) -> Option<Vec<StatusCode>> {
        None
    }
}

struct QueuedItem {
    id: u32,
    values: Mutex<VecDeque<Notification>>,
}

impl QueuedItem {
    fn new(id: u32) -> Arc<QueuedItem> {
        Arc::new(QueuedItem {
            id,
            values: Mutex::new(VecDeque::new()),
        })
    }

    fn push_values(&self, count: usize) {
        let mut values = self.values.lock();
        for i in 0..count {
            values.push_back(Notification::MonitoredItemNotification(
                MonitoredItemNotification {
                    client_handle: self.id,
                    value: DataValue::new_now(i as i32),
                },
            ));
        }
    }
}

impl MonitoredItem for QueuedItem {
    fn id(&self) -> u32 {
        self.id
    }

    fn has_notifications(&self) -> bool {
        !self.values.lock().is_empty()
    }

    fn is_triggered(&self) -> bool {
        false
    }

    fn drain(&self, into: &mut Vec<Notification>, limit: usize) -> bool {
        let mut values = self.values.lock();
        let take = values.len().min(limit);
        into.extend(values.drain(..take));
        values.is_empty()
    }
}

struct Fixture {
    queue: Arc<SessionQueue>,
    scheduler: Arc<TickCounter>,
    subscription: Arc<Subscription>,
}

fn fixture(params: SubscriptionParameters) -> Fixture {
    let queue = SessionQueue::new();
    let scheduler = TickCounter::new();
    let subscription = Subscription::new(
        42,
        params,
        true,
        0,
        SubscriptionLimits::default(),
        queue.clone(),
        scheduler.clone(),
        Arc::new(NoAcks),
        None,
    );
    subscription.start();
    Fixture {
        queue,
        scheduler,
        subscription,
    }
}

fn publish(request_handle: u32) -> (PendingPublish, oneshot::Receiver<PublishResponse>) {
    let (tx, rx) = oneshot::channel();
    (
        PendingPublish {
            request_id: request_handle,
            request: Box::new(PublishRequest {
                request_header: RequestHeader::new(request_handle),
                subscription_acknowledgements: None,
            }),
            response: tx,
        },
        rx,
    )
}

fn notification_count(response: &PublishResponse) -> usize {
    response.notification_message.notification_count()
}

#[tokio::test]
async fn keep_alive_on_empty_subscription() {
    let f = fixture(SubscriptionParameters {
        publishing_interval: 1_000.0,
        lifetime_count: 30,
        max_keep_alive_count: 3,
        max_notifications_per_publish: 0,
    });
    let mut receivers = VecDeque::new();
    for handle in 1..=3u32 {
        let (request, rx) = publish(handle);
        f.subscription.on_publish(request);
        receivers.push_back(rx);
    }

    // The first expiry answers the oldest request with a keep-alive, since
    // nothing has ever been sent. The next moves to KeepAlive and the
    // counter then burns down to the next emission.
    f.subscription.on_timer();
    let first = receivers.pop_front().unwrap().await.unwrap();
    assert!(first.notification_message.is_keep_alive());
    assert_eq!(first.notification_message.sequence_number, 1);
    assert_eq!(notification_count(&first), 0);
    assert!(!first.more_notifications);

    f.subscription.on_timer();
    assert_eq!(f.subscription.state(), SubscriptionState::KeepAlive);
    assert_eq!(f.subscription.keep_alive_counter(), 3);
    f.subscription.on_timer();
    f.subscription.on_timer();
    assert_eq!(f.subscription.keep_alive_counter(), 1);

    // Counter at 1 with a request queued: the next expiry emits another
    // keep-alive, still with sequence number 1.
    f.subscription.on_timer();
    let next = receivers.pop_front().unwrap().await.unwrap();
    assert!(next.notification_message.is_keep_alive());
    assert_eq!(next.notification_message.sequence_number, 1);
    assert_eq!(notification_count(&next), 0);
    assert!(!next.more_notifications);
}

#[tokio::test]
async fn single_data_notification() {
    let f = fixture(SubscriptionParameters {
        publishing_interval: 1_000.0,
        lifetime_count: 30,
        max_keep_alive_count: 3,
        max_notifications_per_publish: 0,
    });
    let item = QueuedItem::new(1);
    item.push_values(1);
    f.subscription.add_items([item as Arc<dyn MonitoredItem>]);

    let (request, rx) = publish(1);
    f.subscription.on_publish(request);
    f.subscription.on_timer();

    let response = rx.await.unwrap();
    assert_eq!(response.notification_message.sequence_number, 1);
    let data = response.notification_message.notification_data.as_ref().unwrap();
    assert_eq!(data.len(), 1);
    let NotificationData::DataChange(change) = &data[0] else {
        panic!("expected a data change notification");
    };
    assert_eq!(change.monitored_items.as_ref().unwrap().len(), 1);
    assert!(!response.more_notifications);
    assert_eq!(response.available_sequence_numbers, Some(vec![1]));
    assert!(f.subscription.message_sent());
}

#[tokio::test]
async fn overflow_resumes_across_publishes() {
    let f = fixture(SubscriptionParameters {
        publishing_interval: 1_000.0,
        lifetime_count: 30,
        max_keep_alive_count: 3,
        max_notifications_per_publish: 2,
    });
    let item = QueuedItem::new(1);
    item.push_values(5);
    f.subscription.add_items([item.clone() as Arc<dyn MonitoredItem>]);

    let mut receivers = Vec::new();
    for handle in 1..=3u32 {
        let (request, rx) = publish(handle);
        f.subscription.on_publish(request);
        receivers.push(rx);
    }
    f.subscription.on_timer();

    let mut sequence_numbers = Vec::new();
    let mut counts = Vec::new();
    let mut more = Vec::new();
    for rx in receivers {
        let response = rx.await.unwrap();
        sequence_numbers.push(response.notification_message.sequence_number);
        counts.push(notification_count(&response));
        more.push(response.more_notifications);
    }
    assert_eq!(sequence_numbers, vec![1, 2, 3]);
    assert_eq!(counts, vec![2, 2, 1]);
    assert_eq!(more, vec![true, true, false]);
    assert!(!item.has_notifications());
}

#[tokio::test]
async fn late_subscription_catches_the_next_request() {
    let f = fixture(SubscriptionParameters {
        publishing_interval: 1_000.0,
        lifetime_count: 30,
        max_keep_alive_count: 3,
        max_notifications_per_publish: 0,
    });

    f.subscription.on_timer();
    assert_eq!(f.subscription.state(), SubscriptionState::Late);
    assert_eq!(f.queue.late_registrations(), vec![42]);

    // The owner routes the next publish to the late subscription.
    let (request, rx) = publish(1);
    f.subscription.on_publish(request);
    let response = rx.await.unwrap();
    assert!(response.notification_message.is_keep_alive());
    assert_eq!(f.subscription.state(), SubscriptionState::KeepAlive);
}

#[tokio::test]
async fn lifetime_timeout_emits_status_change() {
    let f = fixture(SubscriptionParameters {
        publishing_interval: 20_000.0,
        lifetime_count: 3,
        max_keep_alive_count: 1,
        max_notifications_per_publish: 0,
    });
    assert_eq!(f.subscription.parameters().lifetime_count, 3);

    f.subscription.on_timer();
    f.subscription.on_timer();
    assert_eq!(f.subscription.lifetime_counter(), 1);
    let armed = f.scheduler.armed();
    f.subscription.on_timer();
    assert_eq!(f.subscription.state(), SubscriptionState::Closing);
    // The timer stops once the subscription starts closing.
    assert_eq!(f.scheduler.armed(), armed);

    let (request, rx) = publish(1);
    f.subscription.on_publish(request);
    let response = rx.await.unwrap();
    assert_eq!(response.notification_message.sequence_number, 1);
    let data = response.notification_message.notification_data.as_ref().unwrap();
    assert!(matches!(
        &data[0],
        NotificationData::StatusChange(v) if v.status == StatusCode::BadTimeout
    ));
    assert_eq!(response.available_sequence_numbers, None);
    assert_eq!(f.subscription.state(), SubscriptionState::Closed);
}

#[tokio::test]
async fn acknowledge_and_republish_round() {
    let f = fixture(SubscriptionParameters {
        publishing_interval: 1_000.0,
        lifetime_count: 30,
        max_keep_alive_count: 3,
        max_notifications_per_publish: 0,
    });
    let item = QueuedItem::new(1);
    item.push_values(1);
    f.subscription.add_items([item as Arc<dyn MonitoredItem>]);
    let (request, rx) = publish(1);
    f.subscription.on_publish(request);
    f.subscription.on_timer();
    let response = rx.await.unwrap();
    assert_eq!(response.notification_message.sequence_number, 1);

    assert_eq!(f.subscription.acknowledge(1), StatusCode::Good);
    // Acknowledged messages are gone; a republish misses and the caller
    // answers BadMessageNotAvailable.
    assert!(f.subscription.republish(1).is_none());
    assert_eq!(
        f.subscription.acknowledge(1),
        StatusCode::BadSequenceNumberUnknown
    );
    assert!(f.subscription.available_sequence_numbers().is_empty());
}
