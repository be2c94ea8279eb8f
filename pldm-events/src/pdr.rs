// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * Platform Descriptor Record repository view.
 *
 * Copyright (c) 2025 Code Construct
 */

//! A traversable view over Platform Descriptor Records.
//!
//! Records are stored in wire form and walked filtered by PDR type; only
//! the fields the event bridge needs are decoded.

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use deku::{DekuContainerRead, DekuRead, DekuWrite};

use crate::{EventError, SensorId};

/// PDR type values, DSP0248 Table 88.
#[allow(missing_docs)]
pub mod pdr_type {
    pub const TERMINUS_LOCATOR: u8 = 1;
    pub const NUMERIC_SENSOR: u8 = 2;
    pub const NUMERIC_SENSOR_INITIALIZATION: u8 = 3;
    pub const STATE_SENSOR: u8 = 4;
    pub const STATE_SENSOR_INITIALIZATION: u8 = 5;
    pub const NUMERIC_EFFECTER: u8 = 9;
    pub const STATE_EFFECTER: u8 = 11;
    pub const ENTITY_ASSOCIATION: u8 = 15;
    pub const FRU_RECORD_SET: u8 = 20;
}

/// Common PDR header, present on every record.
#[derive(Debug, PartialEq, Eq, Copy, Clone, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct PdrHeader {
    pub record_handle: u32,
    pub version: u8,
    pub pdr_type: u8,
    pub record_change_num: u16,
    /// Length of the record data past this header.
    pub data_length: u16,
}

/// Size of [`PdrHeader`] on the wire.
pub const PDR_HEADER_SIZE: usize = 10;

/// Leading fields of a state sensor PDR, DSP0248 Table 96.
///
/// Possible-states data follows and is not decoded here.
#[derive(Debug, PartialEq, Eq, Copy, Clone, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct StateSensorPdr {
    pub terminus_handle: u16,
    pub sensor_id: SensorId,
    pub entity_type: u16,
    pub entity_instance: u16,
    pub container_id: u16,
    pub sensor_init: u8,
    pub sensor_auxiliary_names: u8,
    pub composite_sensor_count: u8,
}

impl StateSensorPdr {
    /// Parses the fixed prefix of a state sensor PDR body.
    pub fn parse(data: &[u8]) -> Result<Self, EventError> {
        let ((_rest, _), this) = Self::from_bytes((data, 0))?;
        Ok(this)
    }
}

/// One record in the repository.
#[derive(Debug, Clone, Copy)]
pub struct PdrRecord<'a> {
    pub header: PdrHeader,
    /// Record body past the common header.
    pub data: &'a [u8],
}

/// An append-only store of PDRs in wire form.
#[derive(Debug, Default)]
pub struct PdrRepo {
    records: Vec<Vec<u8>>,
}

impl PdrRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record, header included.
    ///
    /// Records too short for the common header are rejected.
    pub fn add_record(&mut self, record: Vec<u8>) -> Result<(), EventError> {
        if record.len() < PDR_HEADER_SIZE {
            return Err(EventError::ShortPdr(record.len()));
        }
        PdrHeader::from_bytes((&record, 0))?;
        self.records.push(record);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walks records of one PDR type, in insertion order.
    pub fn records_of_type(
        &self,
        pdr_type: u8,
    ) -> impl Iterator<Item = PdrRecord<'_>> {
        self.records.iter().filter_map(move |record| {
            let ((_, _), header) = PdrHeader::from_bytes((record, 0)).ok()?;
            if header.pdr_type != pdr_type {
                return None;
            }
            Some(PdrRecord {
                header,
                data: &record[PDR_HEADER_SIZE..],
            })
        })
    }
}

/// Builds a state sensor PDR record for `sensor_id`.
///
/// Only the fields the event bridge consumes carry meaning; the rest are
/// zero. Used when constructing repositories by hand, and by tests.
pub fn state_sensor_record(handle: u32, sensor_id: SensorId) -> Vec<u8> {
    let body = StateSensorPdr {
        terminus_handle: 0,
        sensor_id,
        entity_type: 0,
        entity_instance: 0,
        container_id: 0,
        sensor_init: 0,
        sensor_auxiliary_names: 0,
        composite_sensor_count: 1,
    };
    // infallible: fixed-width fields only
    let body = deku::DekuContainerWrite::to_bytes(&body).unwrap_or_default();
    let header = PdrHeader {
        record_handle: handle,
        version: 1,
        pdr_type: pdr_type::STATE_SENSOR,
        record_change_num: 0,
        data_length: body.len() as u16,
    };
    let mut record =
        deku::DekuContainerWrite::to_bytes(&header).unwrap_or_default();
    record.extend_from_slice(&body);
    record
}
