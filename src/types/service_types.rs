// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! Request and response structures for the subscription service set.
//! Structurally the Part 4 payloads, minus the encoding layer.

use chrono::Utc;

use super::notification_message::NotificationMessage;
use super::status_code::StatusCode;
use super::{DiagnosticInfo, UtcTime};

/// Information common to every request from client to server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestHeader {
    /// Request timestamp.
    pub timestamp: UtcTime,
    /// Client-assigned identifier returned in the matching response.
    pub request_handle: u32,
    /// How long the client is prepared to wait for a response, in
    /// milliseconds. Zero means no limit.
    pub timeout_hint: u32,
}

impl RequestHeader {
    /// Create a request header with the given handle.
    pub fn new(request_handle: u32) -> RequestHeader {
        RequestHeader {
            timestamp: Utc::now(),
            request_handle,
            timeout_hint: 0,
        }
    }
}

/// Information common to every response from server to client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseHeader {
    /// Response timestamp.
    pub timestamp: UtcTime,
    /// Handle of the request this message is responding to.
    pub request_handle: u32,
    /// Status of the service call as a whole.
    pub service_result: StatusCode,
    /// Requested diagnostics.
    pub service_diagnostics: DiagnosticInfo,
}

impl ResponseHeader {
    /// Create a response header with a `Good` service result.
    pub fn new_good(request_handle: u32) -> ResponseHeader {
        ResponseHeader::new_service_result(request_handle, StatusCode::Good)
    }

    /// Create a response header with the given service result.
    pub fn new_service_result(request_handle: u32, service_result: StatusCode) -> ResponseHeader {
        ResponseHeader {
            timestamp: Utc::now(),
            request_handle,
            service_result,
            service_diagnostics: DiagnosticInfo::null(),
        }
    }
}

/// Acknowledges receipt of a notification message on a subscription.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubscriptionAcknowledgement {
    /// The subscription the acknowledged message belongs to.
    pub subscription_id: u32,
    /// The sequence number being acknowledged.
    pub sequence_number: u32,
}

/// Asks the server for the next notification message on any of the session's
/// subscriptions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishRequest {
    /// Common request parameters.
    pub request_header: RequestHeader,
    /// Messages the client acknowledges with this request.
    pub subscription_acknowledgements: Option<Vec<SubscriptionAcknowledgement>>,
}

/// Carries a notification message, or a keep-alive, for one subscription.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishResponse {
    /// Common response parameters.
    pub response_header: ResponseHeader,
    /// The subscription this response belongs to.
    pub subscription_id: u32,
    /// Sequence numbers of retained messages available for republish,
    /// ascending.
    pub available_sequence_numbers: Option<Vec<u32>>,
    /// True if the subscription holds further notifications that did not fit
    /// in this message.
    pub more_notifications: bool,
    /// The notification message itself.
    pub notification_message: NotificationMessage,
    /// Result of each acknowledgement in the request, in order.
    pub results: Option<Vec<StatusCode>>,
    /// Diagnostics for the acknowledgements, if requested.
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

/// Asks the server to retransmit a retained notification message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepublishRequest {
    /// Common request parameters.
    pub request_header: RequestHeader,
    /// The subscription to retransmit from.
    pub subscription_id: u32,
    /// Sequence number of the message to retransmit.
    pub retransmit_sequence_number: u32,
}

/// Carries a retransmitted notification message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepublishResponse {
    /// Common response parameters.
    pub response_header: ResponseHeader,
    /// The retained message.
    pub notification_message: NotificationMessage,
}

/// Parameters for creating a subscription.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSubscriptionRequest {
    /// Common request parameters.
    pub request_header: RequestHeader,
    /// Requested publishing interval in milliseconds.
    pub requested_publishing_interval: f64,
    /// Requested lifetime, in publishing intervals.
    pub requested_lifetime_count: u32,
    /// Requested keep-alive spacing, in publishing intervals.
    pub requested_max_keep_alive_count: u32,
    /// Cap on notifications per publish response, 0 for no preference.
    pub max_notifications_per_publish: u32,
    /// Whether publishing starts enabled.
    pub publishing_enabled: bool,
    /// Relative priority against the session's other subscriptions.
    pub priority: u8,
}

/// Result of creating a subscription, with the server-revised parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSubscriptionResponse {
    /// Common response parameters.
    pub response_header: ResponseHeader,
    /// Server-assigned subscription id.
    pub subscription_id: u32,
    /// The publishing interval the server will actually use.
    pub revised_publishing_interval: f64,
    /// The lifetime count the server will actually use.
    pub revised_lifetime_count: u32,
    /// The keep-alive count the server will actually use.
    pub revised_max_keep_alive_count: u32,
}

/// Parameters for modifying an existing subscription.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModifySubscriptionRequest {
    /// Common request parameters.
    pub request_header: RequestHeader,
    /// The subscription to modify.
    pub subscription_id: u32,
    /// Requested publishing interval in milliseconds.
    pub requested_publishing_interval: f64,
    /// Requested lifetime, in publishing intervals.
    pub requested_lifetime_count: u32,
    /// Requested keep-alive spacing, in publishing intervals.
    pub requested_max_keep_alive_count: u32,
    /// Cap on notifications per publish response, 0 for no preference.
    pub max_notifications_per_publish: u32,
    /// Relative priority against the session's other subscriptions.
    pub priority: u8,
}

/// Result of modifying a subscription, with the server-revised parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModifySubscriptionResponse {
    /// Common response parameters.
    pub response_header: ResponseHeader,
    /// The publishing interval the server will actually use.
    pub revised_publishing_interval: f64,
    /// The lifetime count the server will actually use.
    pub revised_lifetime_count: u32,
    /// The keep-alive count the server will actually use.
    pub revised_max_keep_alive_count: u32,
}
