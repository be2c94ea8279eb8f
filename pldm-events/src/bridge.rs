// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * Object-model property changes to PLDM state sensor events.
 *
 * Copyright (c) 2025 Code Construct
 */

//! State sensor event bridge.
//!
//! For every state sensor PDR with a mapping entry, the bridge subscribes
//! to property changes on the backing object-model path, one subscription
//! per composite sensor offset. A change that matches a mapped state value
//! is encoded as state sensor event data and sent to the event receiver as
//! a PlatformEventMessage through the request pipeline.
//!
//! Sensors without a mapping entry are skipped silently; those have custom
//! or OEM event handling outside this bridge.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use deku::DekuContainerRead;

use pldm_core::instance_id::InstanceIdDb;
use pldm_core::requester::Handler;
use pldm_core::{Eid, PldmResponse};

use crate::pdr::{pdr_type, PdrRepo, StateSensorPdr};
use crate::{
    sensor_event_class, Cmd, EventClass, PlatformEventMessageReq,
    PlatformEventMessageResp, SensorId, StateSensorEventData,
    PLDM_TYPE_PLATFORM, SENSOR_STATE_UNKNOWN,
};

/// A property value from the object-model bus.
///
/// The mapping tables declare the concrete variant per entry, so the
/// comparison branch is selected statically rather than through runtime
/// introspection.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
}

impl PropertyValue {
    /// Whether an incoming property value matches this mapping candidate.
    ///
    /// String candidates hold a `"||"`-separated list of acceptable
    /// values, each stripped of surrounding whitespace. Other variants
    /// compare for equality.
    pub fn matches(&self, incoming: &PropertyValue) -> bool {
        match (self, incoming) {
            (Self::String(candidates), Self::String(value)) => {
                candidates.split("||").map(str::trim).any(|c| c == value)
            }
            (candidate, value) => candidate == value,
        }
    }
}

/// Property names to values, as delivered by a change signal.
pub type PropertyMap = HashMap<String, PropertyValue>;

/// Where one composite sensor offset lives on the bus.
#[derive(Debug, Clone)]
pub struct DbusMapping {
    pub object_path: String,
    pub interface: String,
    pub property_name: String,
}

/// Mapped states in declaration order: `(state value, candidate)`.
pub type DbusValueMap = Vec<(u8, PropertyValue)>;

/// Per sensor id, one `(mapping, value map)` pair per composite offset.
pub type DbusObjMaps = HashMap<SensorId, Vec<(DbusMapping, DbusValueMap)>>;

/// Callback delivered on a property change: `(interface, changed)`.
pub type SignalCallback = Box<dyn Fn(&str, &PropertyMap)>;

/// An active signal subscription; dropping it unsubscribes.
pub trait Subscription {}

/// Object-model bus access used by the bridge.
///
/// Implemented over the system bus by the embedding daemon; tests use an
/// in-memory fake.
pub trait BusMonitor {
    /// Subscribes to property-changed signals for `(object_path, interface)`.
    fn properties_changed(
        &self,
        object_path: &str,
        interface: &str,
        callback: SignalCallback,
    ) -> Box<dyn Subscription>;
}

/// Maps object-model property changes to PLDM state sensor events.
pub struct SensorEventBridge {
    /// Event receiver endpoint the events are sent to.
    eid: Eid,
    iid_db: Rc<InstanceIdDb>,
    handler: Rc<Handler>,
    // last state reported as previous, per sensor and composite offset
    cache: RefCell<HashMap<SensorId, Vec<u8>>>,
    subscriptions: RefCell<Vec<Box<dyn Subscription>>>,
    this: RefCell<Weak<Self>>,
}

impl SensorEventBridge {
    pub fn new(
        eid: Eid,
        iid_db: Rc<InstanceIdDb>,
        handler: Rc<Handler>,
    ) -> Rc<Self> {
        let bridge = Rc::new(Self {
            eid,
            iid_db,
            handler,
            cache: RefCell::new(HashMap::new()),
            subscriptions: RefCell::new(Vec::new()),
            this: RefCell::new(Weak::new()),
        });
        *bridge.this.borrow_mut() = Rc::downgrade(&bridge);
        bridge
    }

    /// Subscribes for every state sensor PDR that has a mapping entry.
    ///
    /// Subscriptions live until the bridge is dropped.
    pub fn listen_sensor_events(
        &self,
        repo: &PdrRepo,
        maps: &DbusObjMaps,
        bus: &dyn BusMonitor,
    ) {
        for record in repo.records_of_type(pdr_type::STATE_SENSOR) {
            let pdr = match StateSensorPdr::parse(record.data) {
                Ok(pdr) => pdr,
                Err(e) => {
                    error!(
                        "Bad state sensor PDR, record handle '{}': {e}",
                        record.header.record_handle
                    );
                    continue;
                }
            };
            self.watch_sensor(pdr.sensor_id, maps, bus);
        }
    }

    fn watch_sensor(
        &self,
        sensor_id: SensorId,
        maps: &DbusObjMaps,
        bus: &dyn BusMonitor,
    ) {
        let Some(entries) = maps.get(&sensor_id) else {
            // Not an error: sensors without a mapping have custom or OEM
            // event handling.
            return;
        };

        for (offset, (mapping, value_map)) in entries.iter().enumerate() {
            let this = self.this.borrow().clone();
            let property_name = mapping.property_name.clone();
            let value_map = value_map.clone();
            let subscription = bus.properties_changed(
                &mapping.object_path,
                &mapping.interface,
                Box::new(move |_interface, changed| {
                    let Some(bridge) = this.upgrade() else { return };
                    bridge.property_changed(
                        sensor_id,
                        offset as u8,
                        &property_name,
                        &value_map,
                        changed,
                    );
                }),
            );
            self.subscriptions.borrow_mut().push(subscription);
        }
    }

    fn property_changed(
        &self,
        sensor_id: SensorId,
        offset: u8,
        property_name: &str,
        value_map: &DbusValueMap,
        changed: &PropertyMap,
    ) {
        let Some(value) = changed.get(property_name) else {
            return;
        };

        for (state, candidate) in value_map {
            if !candidate.matches(value) {
                continue;
            }

            let previous_state = self.previous_state(sensor_id, offset, *state);
            let event = StateSensorEventData {
                sensor_id,
                sensor_event_class: sensor_event_class::STATE_SENSOR_STATE,
                sensor_offset: offset,
                event_state: *state,
                previous_event_state: previous_state,
            };
            debug!(
                "Sensor '{sensor_id}' offset '{offset}' changed to state '{state}', previous '{previous_state}'"
            );
            let event_data = match event.to_vec() {
                Ok(event_data) => event_data,
                Err(e) => {
                    error!("Failed to encode sensor event data: {e}");
                    return;
                }
            };
            // the cache is only touched once the event is on its way
            if self.send_event_msg(EventClass::Sensor, event_data) {
                // TODO: check whether the new state, rather than the
                // state just reported as previous, should land in the
                // cache; as-is the previous field lags one transition
                // behind from the second emission on.
                self.update_cache(sensor_id, offset, previous_state);
            }
            break;
        }
    }

    // Cached state for the offset, or the new state on first observation.
    fn previous_state(
        &self,
        sensor_id: SensorId,
        offset: u8,
        new_state: u8,
    ) -> u8 {
        self.cache
            .borrow()
            .get(&sensor_id)
            .and_then(|states| states.get(offset as usize))
            .copied()
            .filter(|state| *state != SENSOR_STATE_UNKNOWN)
            .unwrap_or(new_state)
    }

    fn update_cache(&self, sensor_id: SensorId, offset: u8, state: u8) {
        let mut cache = self.cache.borrow_mut();
        let states = cache.entry(sensor_id).or_default();
        if states.len() <= offset as usize {
            states.resize(offset as usize + 1, SENSOR_STATE_UNKNOWN);
        }
        states[offset as usize] = state;
    }

    /// Sends one platform event message through the request pipeline.
    ///
    /// Returns whether the message was handed to the pipeline.
    fn send_event_msg(&self, event_class: EventClass, event_data: Vec<u8>) -> bool {
        let eid = self.eid;
        let iid = match self.iid_db.next(eid) {
            Ok(iid) => iid,
            Err(e) => {
                error!(
                    "Instance id allocation failed for endpoint ID '{eid}': {e}"
                );
                return false;
            }
        };

        let request = PlatformEventMessageReq::new(event_class, event_data);
        let payload = match deku::DekuContainerWrite::to_bytes(&request) {
            Ok(payload) => payload,
            Err(e) => {
                if let Err(e) = self.iid_db.free(eid, iid) {
                    warn!("Instance id release failed: {e}");
                }
                error!(
                    "Failed to encode platform event message request: {e}"
                );
                return false;
            }
        };

        if let Err(e) = self.handler.register_request(
            eid,
            iid,
            PLDM_TYPE_PLATFORM,
            Cmd::PlatformEventMessage as u8,
            payload,
            Box::new(platform_event_message_done),
        ) {
            error!("Failed to send the platform event message: {e}");
            return false;
        }
        true
    }
}

fn platform_event_message_done(eid: Eid, response: Option<&PldmResponse>) {
    let Some(response) = response else {
        error!(
            "Failed to receive response for platform event message from endpoint ID '{eid}'"
        );
        return;
    };
    if response.cc != 0 {
        error!(
            "Failure in platform event message response from endpoint ID '{eid}', completion code '{}'",
            response.cc
        );
        return;
    }
    match PlatformEventMessageResp::from_bytes((&response.data[..], 0)) {
        Ok((_, resp)) => trace!(
            "Platform event message accepted by endpoint ID '{eid}', status '{}'",
            resp.status
        ),
        Err(e) => error!(
            "Failed to decode response of platform event message from endpoint ID '{eid}': {e}"
        ),
    }
}
