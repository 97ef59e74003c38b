// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

use crate::types::{EventFieldList, MonitoredItemNotification};

/// A single notification drained from a monitored item, either a data change
/// or an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A data change notification.
    MonitoredItemNotification(MonitoredItemNotification),
    /// An event.
    Event(EventFieldList),
}

impl From<MonitoredItemNotification> for Notification {
    fn from(v: MonitoredItemNotification) -> Self {
        Notification::MonitoredItemNotification(v)
    }
}

impl From<EventFieldList> for Notification {
    fn from(v: EventFieldList) -> Self {
        Notification::Event(v)
    }
}

/// A monitored item as the subscription sees it: an id and a queue of
/// notifications that can be drained into a publish response.
///
/// Items are owned by the session layer, which handles sampling, filtering
/// and queue management. The subscription holds shared references for the
/// duration of its interest and hands them back on delete.
pub trait MonitoredItem: Send + Sync {
    /// Server-assigned id of the item, unique within the subscription.
    fn id(&self) -> u32;
    /// True if the item has queued notifications.
    fn has_notifications(&self) -> bool;
    /// True if the item was triggered by a linked item and should report
    /// even without a change of its own.
    fn is_triggered(&self) -> bool;
    /// Write up to `limit` notifications into `into`. Returns true when the
    /// item has nothing further to report, false if notifications remain
    /// beyond `limit`. Must not fail; item-level errors are reported as
    /// notification payloads.
    fn drain(&self, into: &mut Vec<Notification>, limit: usize) -> bool;
}
