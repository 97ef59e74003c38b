// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock, Einar Omang

//! Status codes returned by subscription operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An OPC UA status code. The top two bits carry the severity, the next
/// fourteen the sub code; the numeric values are the standard ones from
/// Part 6.
///
/// Only the codes this engine produces or tests against are named here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(u32);

#[allow(non_upper_case_globals)]
impl StatusCode {
    /// The operation succeeded.
    pub const Good: StatusCode = StatusCode(0);
    /// An internal error occurred as a result of a programming or
    /// configuration error.
    pub const BadInternalError: StatusCode = StatusCode(0x8002_0000);
    /// The operation timed out.
    pub const BadTimeout: StatusCode = StatusCode(0x800A_0000);
    /// There was nothing to do because the request contained no operations.
    pub const BadNothingToDo: StatusCode = StatusCode(0x800F_0000);
    /// The subscription id is not valid.
    pub const BadSubscriptionIdInvalid: StatusCode = StatusCode(0x8028_0000);
    /// The monitored item id does not refer to a valid monitored item.
    pub const BadMonitoredItemIdInvalid: StatusCode = StatusCode(0x8042_0000);
    /// The server has reached the maximum number of queued publish requests.
    pub const BadTooManyPublishRequests: StatusCode = StatusCode(0x806D_0000);
    /// There is no subscription available for this session.
    pub const BadNoSubscription: StatusCode = StatusCode(0x8079_0000);
    /// The sequence number is unknown to the server.
    pub const BadSequenceNumberUnknown: StatusCode = StatusCode(0x807A_0000);
    /// The requested notification message is no longer available.
    pub const BadMessageNotAvailable: StatusCode = StatusCode(0x807B_0000);

    /// Create a status code from its raw numeric value.
    pub fn from_bits(bits: u32) -> StatusCode {
        StatusCode(bits)
    }

    /// The raw numeric value of the code.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// True if the severity is good.
    pub fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// True if the severity is uncertain.
    pub fn is_uncertain(&self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    /// True if the severity is bad.
    pub fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::StatusCode;

    #[test]
    fn severity() {
        assert!(StatusCode::Good.is_good());
        assert!(!StatusCode::Good.is_bad());
        assert!(StatusCode::BadTimeout.is_bad());
        assert!(!StatusCode::BadTimeout.is_good());
        assert!(StatusCode::from_bits(0x4000_0000).is_uncertain());
    }

    #[test]
    fn display() {
        assert_eq!(StatusCode::BadNoSubscription.to_string(), "0x80790000");
    }
}
