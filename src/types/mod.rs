// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! The types consumed and produced by the subscription engine.
//!
//! These are structurally the OPC UA Part 4 request and response payloads,
//! without the binary encoding layer: the engine hands finished
//! [`PublishResponse`] values to its owner, which is responsible for putting
//! them on the wire.

mod notification_message;
mod service_types;
pub mod status_code;

pub use notification_message::{
    DataChangeNotification, EventFieldList, EventNotificationList, MonitoredItemNotification,
    NotificationData, NotificationMessage, StatusChangeNotification,
};
pub use service_types::{
    CreateSubscriptionRequest, CreateSubscriptionResponse, ModifySubscriptionRequest,
    ModifySubscriptionResponse, PublishRequest, PublishResponse, RepublishRequest,
    RepublishResponse, RequestHeader, ResponseHeader, SubscriptionAcknowledgement,
};

use status_code::StatusCode;

/// Timestamps on messages and headers.
pub type UtcTime = chrono::DateTime<chrono::Utc>;

/// A value sampled from a monitored node together with its quality and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The sampled value, if one could be read.
    pub value: Option<Variant>,
    /// Quality of the value. `None` means `Good`.
    pub status: Option<StatusCode>,
    /// Timestamp applied by the data source.
    pub source_timestamp: Option<UtcTime>,
    /// Timestamp applied by the server.
    pub server_timestamp: Option<UtcTime>,
}

impl DataValue {
    /// Create a value with both timestamps set to now.
    pub fn new_now(value: impl Into<Variant>) -> DataValue {
        let now = chrono::Utc::now();
        DataValue {
            value: Some(value.into()),
            status: None,
            source_timestamp: Some(now),
            server_timestamp: Some(now),
        }
    }
}

/// A dynamically typed scalar value.
///
/// The full protocol variant is much richer; this carries the shapes the
/// engine and its tests exercise.
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub enum Variant {
    #[default]
    Empty,
    Boolean(bool),
    Int32(i32),
    UInt32(u32),
    Double(f64),
    String(String),
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Boolean(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int32(v)
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Variant::UInt32(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Double(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_owned())
    }
}

/// Vendor-specific diagnostics attached to an operation result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagnosticInfo {
    /// Index into the string table identifying a vendor error code.
    pub symbolic_id: Option<i32>,
    /// Index into the string table identifying the namespace of the
    /// symbolic id.
    pub namespace_uri: Option<i32>,
    /// Index into the string table identifying the locale of the text.
    pub locale: Option<i32>,
    /// Index into the string table holding a human readable description.
    pub localized_text: Option<i32>,
    /// Free-form detail text.
    pub additional_info: Option<String>,
    /// Status code of an inner operation.
    pub inner_status_code: Option<StatusCode>,
}

impl DiagnosticInfo {
    /// An empty diagnostic info, the usual value when diagnostics were not
    /// requested.
    pub fn null() -> DiagnosticInfo {
        DiagnosticInfo::default()
    }
}
