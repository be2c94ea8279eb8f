// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM platform event support: PLDM type 2 messaging
 *
 * Copyright (c) 2025 Code Construct
 */
#![forbid(unsafe_code)]

//! PLDM platform (type 2) event messaging.
//!
//! Wire structures for PlatformEventMessage and state sensor event data,
//! a view over a PDR repository, and the bridge that turns object-model
//! property changes into outbound sensor events.

use num_derive::FromPrimitive;

use deku::{DekuContainerRead, DekuContainerWrite, DekuRead, DekuWrite};

use thiserror::Error;

pub mod bridge;
pub mod pdr;

pub const PLDM_TYPE_PLATFORM: u8 = 2;

/// PlatformEventMessage format version in use.
pub const PLATFORM_EVENT_FORMAT_VERSION: u8 = 1;

/// Terminus id carried in outbound platform event messages.
pub const TERMINUS_ID: u8 = 1;

/// Sensor state value meaning "not yet observed".
pub const SENSOR_STATE_UNKNOWN: u8 = 0xff;

/// State sensor identifier, little-endian on the wire.
pub type SensorId = u16;

/// PLDM Platform Commands
#[allow(missing_docs)]
#[derive(FromPrimitive, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Cmd {
    GetTerminusUID = 0x03,
    SetEventReceiver = 0x04,
    GetEventReceiver = 0x05,
    PlatformEventMessage = 0x0A,
    PollForPlatformEventMessage = 0x0B,
    EventMessageSupported = 0x0C,
    EventMessageBufferSize = 0x0D,
    SetNumericSensorEnable = 0x10,
    GetSensorReading = 0x11,
    SetStateSensorEnables = 0x20,
    GetStateSensorReadings = 0x21,
    InitStateSensor = 0x22,
    SetStateEffecterEnables = 0x38,
    SetStateEffecterStates = 0x39,
    GetStateEffecterStates = 0x3A,
    GetPDRRepositoryInfo = 0x50,
    GetPDR = 0x51,
    FindPDR = 0x52,
}

/// Platform event message classes, DSP0248 Table 11.
#[allow(missing_docs)]
#[derive(FromPrimitive, Debug, PartialEq, Eq, Copy, Clone)]
#[repr(u8)]
pub enum EventClass {
    Sensor = 0x00,
    Effecter = 0x01,
    RedfishTaskExecuted = 0x02,
    RedfishMessage = 0x03,
    PdrRepositoryChanged = 0x04,
    MessagePoll = 0x05,
    HeartbeatTimerElapsed = 0x06,
}

/// Sensor event classes within a sensor event, DSP0248 Table 19.
pub mod sensor_event_class {
    pub const SENSOR_OP_STATE: u8 = 0x00;
    pub const STATE_SENSOR_STATE: u8 = 0x01;
    pub const NUMERIC_SENSOR_STATE: u8 = 0x02;
}

/// Errors from the platform event path.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("codec error: {0}")]
    Codec(#[from] deku::DekuError),
    #[error("short PDR record, {0} bytes")]
    ShortPdr(usize),
}

/// PlatformEventMessage request body.
#[derive(Debug, PartialEq, Eq, Clone, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct PlatformEventMessageReq {
    pub format_version: u8,
    pub tid: u8,
    pub event_class: u8,
    #[deku(read_all)]
    pub event_data: Vec<u8>,
}

impl PlatformEventMessageReq {
    /// Builds an event message carrying `event_data` from this terminus.
    pub fn new(event_class: EventClass, event_data: Vec<u8>) -> Self {
        Self {
            format_version: PLATFORM_EVENT_FORMAT_VERSION,
            tid: TERMINUS_ID,
            event_class: event_class as u8,
            event_data,
        }
    }
}

/// PlatformEventMessage response body, completion code excluded.
#[derive(Debug, PartialEq, Eq, Copy, Clone, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct PlatformEventMessageResp {
    /// platformEventStatus
    pub status: u8,
}

/// Event data for a state sensor state change, DSP0248 Table 19.
#[derive(Debug, PartialEq, Eq, Copy, Clone, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct StateSensorEventData {
    pub sensor_id: SensorId,
    /// Always [`sensor_event_class::STATE_SENSOR_STATE`] here.
    pub sensor_event_class: u8,
    /// Composite sensor offset within the sensor.
    pub sensor_offset: u8,
    pub event_state: u8,
    pub previous_event_state: u8,
}

impl StateSensorEventData {
    pub fn to_vec(&self) -> Result<Vec<u8>, EventError> {
        Ok(self.to_bytes()?)
    }

    pub fn parse(data: &[u8]) -> Result<Self, EventError> {
        let ((_rest, _), this) = Self::from_bytes((data, 0))?;
        Ok(this)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn event_message_encoding() {
        let req = PlatformEventMessageReq::new(
            EventClass::Sensor,
            vec![0xaa, 0xbb],
        );
        let bytes = req.to_bytes().unwrap();
        assert_eq!(bytes, [0x01, 0x01, 0x00, 0xaa, 0xbb]);

        let ((rest, _), back) =
            PlatformEventMessageReq::from_bytes((&bytes, 0)).unwrap();
        assert!(rest.is_empty());
        assert_eq!(back, req);
    }

    #[test]
    fn state_sensor_event_data_encoding() {
        let data = StateSensorEventData {
            sensor_id: 0x1234,
            sensor_event_class: sensor_event_class::STATE_SENSOR_STATE,
            sensor_offset: 2,
            event_state: 3,
            previous_event_state: 5,
        };
        let bytes = data.to_vec().unwrap();
        assert_eq!(bytes, [0x34, 0x12, 0x01, 0x02, 0x03, 0x05]);
        assert_eq!(StateSensorEventData::parse(&bytes).unwrap(), data);
    }

    #[test]
    fn event_response_decoding() {
        let ((rest, _), resp) =
            PlatformEventMessageResp::from_bytes((&[0x00][..], 0)).unwrap();
        assert!(rest.is_empty());
        assert_eq!(resp.status, 0);
    }
}
