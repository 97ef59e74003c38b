// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! `NotificationMessage` and the notification payloads it carries.

use log::trace;

use super::status_code::StatusCode;
use super::{DataValue, DiagnosticInfo, UtcTime, Variant};

/// A changed value reported for a single monitored item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoredItemNotification {
    /// The client-side handle of the monitored item.
    pub client_handle: u32,
    /// The reported value.
    pub value: DataValue,
}

/// The field values of a single event reported for a monitored item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventFieldList {
    /// The client-side handle of the monitored item.
    pub client_handle: u32,
    /// Selected event fields, in the order requested by the item's filter.
    pub event_fields: Option<Vec<Variant>>,
}

/// Aggregate of all data change notifications in a publish response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataChangeNotification {
    /// The changed values.
    pub monitored_items: Option<Vec<MonitoredItemNotification>>,
    /// Diagnostics, if requested.
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

/// Aggregate of all event notifications in a publish response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventNotificationList {
    /// The reported events.
    pub events: Option<Vec<EventFieldList>>,
}

/// Reports a change of subscription state to the client, e.g. expiry of the
/// lifetime counter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusChangeNotification {
    /// The status code describing the change.
    pub status: StatusCode,
    /// Diagnostics, if requested.
    pub diagnostic_info: DiagnosticInfo,
}

/// One entry of the `notification_data` array of a notification message.
///
/// On the wire these are extension objects; a subscription produces at most
/// one data change aggregate and one event aggregate per message, in that
/// order, or a single status change.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationData {
    /// Data change notifications.
    DataChange(DataChangeNotification),
    /// Event notifications.
    Events(EventNotificationList),
    /// A status change notification.
    StatusChange(StatusChangeNotification),
}

/// The notification payload of a publish or republish response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotificationMessage {
    /// Sequence number of this message, unique per subscription.
    pub sequence_number: u32,
    /// Time this message was produced.
    pub publish_time: UtcTime,
    /// The notifications. Empty or absent for a keep-alive.
    pub notification_data: Option<Vec<NotificationData>>,
}

impl NotificationMessage {
    /// Create a notification message carrying data changes and / or events.
    /// Calling this with neither will panic. The data can have up to 2
    /// elements to cover the case where a subscription holds monitored items
    /// for both events and data.
    pub fn data_change(
        sequence_number: u32,
        publish_time: UtcTime,
        data_change_notifications: Vec<MonitoredItemNotification>,
        event_notifications: Vec<EventFieldList>,
    ) -> NotificationMessage {
        if data_change_notifications.is_empty() && event_notifications.is_empty() {
            panic!("No notifications supplied to data_change()");
        }

        let mut notification_data = Vec::with_capacity(2);
        if !data_change_notifications.is_empty() {
            let data_change_notification = DataChangeNotification {
                monitored_items: Some(data_change_notifications),
                diagnostic_infos: None,
            };
            trace!("data change notification = {:?}", data_change_notification);
            notification_data.push(NotificationData::DataChange(data_change_notification));
        }
        if !event_notifications.is_empty() {
            let event_notification_list = EventNotificationList {
                events: Some(event_notifications),
            };
            trace!("event notification = {:?}", event_notification_list);
            notification_data.push(NotificationData::Events(event_notification_list));
        }

        NotificationMessage {
            sequence_number,
            publish_time,
            notification_data: Some(notification_data),
        }
    }

    /// Create a status change notification message.
    pub fn status_change(
        sequence_number: u32,
        publish_time: UtcTime,
        status: StatusCode,
    ) -> NotificationMessage {
        let status_change_notification = StatusChangeNotification {
            status,
            diagnostic_info: DiagnosticInfo::null(),
        };
        NotificationMessage {
            sequence_number,
            publish_time,
            notification_data: Some(vec![NotificationData::StatusChange(
                status_change_notification,
            )]),
        }
    }

    /// Create a keep-alive notification message.
    pub fn keep_alive(sequence_number: u32, publish_time: UtcTime) -> NotificationMessage {
        NotificationMessage {
            sequence_number,
            publish_time,
            notification_data: None,
        }
    }

    /// True if this message carries no notifications.
    pub fn is_keep_alive(&self) -> bool {
        self.notification_data
            .as_ref()
            .map_or(true, |d| d.is_empty())
    }

    /// The number of individual notifications in this message.
    pub fn notification_count(&self) -> usize {
        let Some(data) = &self.notification_data else {
            return 0;
        };
        data.iter()
            .map(|n| match n {
                NotificationData::DataChange(v) => {
                    v.monitored_items.as_ref().map_or(0, |i| i.len())
                }
                NotificationData::Events(v) => v.events.as_ref().map_or(0, |e| e.len()),
                NotificationData::StatusChange(_) => 1,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn keep_alive_is_empty() {
        let m = NotificationMessage::keep_alive(12, Utc::now());
        assert!(m.is_keep_alive());
        assert_eq!(m.notification_count(), 0);
        assert_eq!(m.sequence_number, 12);
    }

    #[test]
    fn data_change_orders_data_before_events() {
        let m = NotificationMessage::data_change(
            1,
            Utc::now(),
            vec![MonitoredItemNotification::default()],
            vec![EventFieldList::default()],
        );
        let data = m.notification_data.as_ref().unwrap();
        assert_eq!(data.len(), 2);
        assert!(matches!(data[0], NotificationData::DataChange(_)));
        assert!(matches!(data[1], NotificationData::Events(_)));
        assert_eq!(m.notification_count(), 2);
    }

    #[test]
    #[should_panic]
    fn data_change_rejects_empty() {
        let _ = NotificationMessage::data_change(1, Utc::now(), vec![], vec![]);
    }
}
