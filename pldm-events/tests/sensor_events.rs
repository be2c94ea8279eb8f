// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * Copyright (c) 2025 Code Construct
 */

//! Sensor event bridge scenarios over a fake bus and loopback transport.

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use deku::DekuContainerRead;

use pldm_core::instance_id::InstanceIdDb;
use pldm_core::requester::{Handler, Transport};
use pldm_core::{Eid, PldmRequest, Result};

use pldm_events::bridge::{
    BusMonitor, DbusMapping, DbusObjMaps, PropertyMap, PropertyValue,
    SensorEventBridge, SignalCallback, Subscription,
};
use pldm_events::pdr::{state_sensor_record, PdrRepo};
use pldm_events::{
    sensor_event_class, Cmd, PlatformEventMessageReq, StateSensorEventData,
    PLDM_TYPE_PLATFORM, TERMINUS_ID,
};

const EID: Eid = Eid(9);
const PATH: &str = "/xyz/openbmc_project/state/host0";
const IFACE: &str = "xyz.openbmc_project.State.Host";

fn start_log() {
    let _ = env_logger::Builder::new()
        .filter(None, log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

type Sent = Rc<RefCell<Vec<(Eid, Vec<u8>)>>>;

struct LoopTransport {
    sent: Sent,
}

impl Transport for LoopTransport {
    fn send(&mut self, eid: Eid, msg: &[u8]) -> Result<()> {
        self.sent.borrow_mut().push((eid, msg.to_vec()));
        Ok(())
    }
}

struct FakeSubscription(#[allow(dead_code)] Rc<SignalCallback>);

impl Subscription for FakeSubscription {}

/// In-memory stand-in for the system bus; callbacks are held weakly so
/// dropping the bridge's subscription guards unsubscribes.
#[derive(Default)]
struct FakeBus {
    subs: RefCell<HashMap<(String, String), Vec<Weak<SignalCallback>>>>,
}

impl BusMonitor for FakeBus {
    fn properties_changed(
        &self,
        object_path: &str,
        interface: &str,
        callback: SignalCallback,
    ) -> Box<dyn Subscription> {
        let callback = Rc::new(callback);
        self.subs
            .borrow_mut()
            .entry((object_path.to_string(), interface.to_string()))
            .or_default()
            .push(Rc::downgrade(&callback));
        Box::new(FakeSubscription(callback))
    }
}

impl FakeBus {
    fn emit(&self, object_path: &str, interface: &str, changed: &PropertyMap) {
        let callbacks = self
            .subs
            .borrow()
            .get(&(object_path.to_string(), interface.to_string()))
            .cloned()
            .unwrap_or_default();
        for weak in callbacks {
            if let Some(callback) = weak.upgrade() {
                (*callback)(interface, changed);
            }
        }
    }

    fn live_subscriptions(&self) -> usize {
        self.subs
            .borrow()
            .values()
            .flatten()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }
}

struct Fixture {
    iid_db: Rc<InstanceIdDb>,
    handler: Rc<Handler>,
    bus: FakeBus,
    sent: Sent,
}

impl Fixture {
    fn new() -> Self {
        start_log();
        let sent: Sent = Rc::default();
        let iid_db = Rc::new(InstanceIdDb::new());
        let handler = Rc::new(Handler::new(
            Box::new(LoopTransport { sent: sent.clone() }),
            iid_db.clone(),
        ));
        Fixture {
            iid_db,
            handler,
            bus: FakeBus::default(),
            sent,
        }
    }

    fn bridge(&self) -> Rc<SensorEventBridge> {
        SensorEventBridge::new(EID, self.iid_db.clone(), self.handler.clone())
    }

    /// Takes the single event sent since the last call, acknowledges it,
    /// and returns the decoded sensor event data.
    fn take_event(&self) -> StateSensorEventData {
        let (eid, msg) = {
            let mut sent = self.sent.borrow_mut();
            assert_eq!(sent.len(), 1, "expected exactly one event message");
            sent.remove(0)
        };
        assert_eq!(eid, EID);

        let request = PldmRequest::from_buf(&msg).unwrap();
        assert_eq!(request.typ, PLDM_TYPE_PLATFORM);
        assert_eq!(request.cmd, Cmd::PlatformEventMessage as u8);

        let ((rest, _), event) =
            PlatformEventMessageReq::from_bytes((&request.data, 0)).unwrap();
        assert!(rest.is_empty());
        assert_eq!(event.tid, TERMINUS_ID);
        assert_eq!(event.event_class, 0x00);

        // acknowledge so the instance id is reclaimed
        self.handler
            .handle_response(
                EID,
                &[request.iid.0, request.typ, request.cmd, 0x00, 0x00],
            )
            .unwrap();
        assert_eq!(self.iid_db.outstanding(EID), 0);

        StateSensorEventData::parse(&event.event_data).unwrap()
    }

    fn no_event_sent(&self) {
        assert!(self.sent.borrow().is_empty());
    }
}

fn string_maps(sensor_id: u16) -> DbusObjMaps {
    let mapping = DbusMapping {
        object_path: PATH.to_string(),
        interface: IFACE.to_string(),
        property_name: "CurrentHostState".to_string(),
    };
    let value_map = vec![
        (3, PropertyValue::String("Enabled || Active".to_string())),
        (5, PropertyValue::String("Standby".to_string())),
        (7, PropertyValue::String("Failed".to_string())),
    ];
    DbusObjMaps::from([(sensor_id, vec![(mapping, value_map)])])
}

fn props(name: &str, value: PropertyValue) -> PropertyMap {
    PropertyMap::from([(name.to_string(), value)])
}

fn host_state(value: &str) -> PropertyMap {
    props("CurrentHostState", PropertyValue::String(value.to_string()))
}

#[test]
fn string_alternatives_match_and_first_event_self_reports() {
    let f = Fixture::new();
    let sensor_id = 0x0a01;
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, sensor_id)).unwrap();

    let bridge = f.bridge();
    bridge.listen_sensor_events(&repo, &string_maps(sensor_id), &f.bus);
    assert_eq!(f.bus.live_subscriptions(), 1);

    // "Active" is the second alternative of the state 3 candidate
    f.bus.emit(PATH, IFACE, &host_state("Active"));
    let event = f.take_event();
    assert_eq!(event.sensor_id, sensor_id);
    assert_eq!(
        event.sensor_event_class,
        sensor_event_class::STATE_SENSOR_STATE
    );
    assert_eq!(event.sensor_offset, 0);
    assert_eq!(event.event_state, 3);
    // first observation reports itself as previous
    assert_eq!(event.previous_event_state, 3);

    // second transition reports the prior state
    f.bus.emit(PATH, IFACE, &host_state("Standby"));
    let event = f.take_event();
    assert_eq!(event.event_state, 5);
    assert_eq!(event.previous_event_state, 3);

    // the cache holds the state last reported as previous, so the third
    // transition still reports 3
    f.bus.emit(PATH, IFACE, &host_state("Failed"));
    let event = f.take_event();
    assert_eq!(event.event_state, 7);
    assert_eq!(event.previous_event_state, 3);
}

#[test]
fn unmatched_or_missing_property_is_ignored() {
    let f = Fixture::new();
    let sensor_id = 0x0a02;
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, sensor_id)).unwrap();

    let bridge = f.bridge();
    bridge.listen_sensor_events(&repo, &string_maps(sensor_id), &f.bus);

    // value matching no candidate
    f.bus.emit(PATH, IFACE, &host_state("Rebooting"));
    f.no_event_sent();

    // signal lacking the mapped property
    f.bus.emit(
        PATH,
        IFACE,
        &props("OtherProperty", PropertyValue::Bool(true)),
    );
    f.no_event_sent();
    assert_eq!(f.iid_db.outstanding(EID), 0);
}

#[test]
fn sensor_without_mapping_is_skipped() {
    let f = Fixture::new();
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, 0xabcd)).unwrap();

    let bridge = f.bridge();
    // maps cover a different sensor entirely
    bridge.listen_sensor_events(&repo, &string_maps(0x0a01), &f.bus);

    assert_eq!(f.bus.live_subscriptions(), 0);
    f.bus.emit(PATH, IFACE, &host_state("Active"));
    f.no_event_sent();
    let _ = bridge;
}

#[test]
fn non_string_values_compare_for_equality() {
    let f = Fixture::new();
    let sensor_id = 0x0b01;
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, sensor_id)).unwrap();

    let mapping = DbusMapping {
        object_path: PATH.to_string(),
        interface: IFACE.to_string(),
        property_name: "Functional".to_string(),
    };
    let value_map = vec![
        (1, PropertyValue::Bool(true)),
        (2, PropertyValue::Bool(false)),
    ];
    let maps = DbusObjMaps::from([(sensor_id, vec![(mapping, value_map)])]);

    let bridge = f.bridge();
    bridge.listen_sensor_events(&repo, &maps, &f.bus);

    f.bus
        .emit(PATH, IFACE, &props("Functional", PropertyValue::Bool(false)));
    let event = f.take_event();
    assert_eq!(event.event_state, 2);
    assert_eq!(event.previous_event_state, 2);

    // a string does not match a bool candidate
    f.bus.emit(
        PATH,
        IFACE,
        &props("Functional", PropertyValue::String("false".to_string())),
    );
    f.no_event_sent();
}

#[test]
fn composite_offsets_report_independently() {
    let f = Fixture::new();
    let sensor_id = 0x0c01;
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, sensor_id)).unwrap();

    let entry = |prop: &str, state: u8| {
        (
            DbusMapping {
                object_path: PATH.to_string(),
                interface: IFACE.to_string(),
                property_name: prop.to_string(),
            },
            vec![(state, PropertyValue::Bool(true))],
        )
    };
    let maps = DbusObjMaps::from([(
        sensor_id,
        vec![entry("Ready", 1), entry("Degraded", 4)],
    )]);

    let bridge = f.bridge();
    bridge.listen_sensor_events(&repo, &maps, &f.bus);
    assert_eq!(f.bus.live_subscriptions(), 2);

    f.bus
        .emit(PATH, IFACE, &props("Degraded", PropertyValue::Bool(true)));
    let event = f.take_event();
    assert_eq!(event.sensor_offset, 1);
    assert_eq!(event.event_state, 4);

    f.bus
        .emit(PATH, IFACE, &props("Ready", PropertyValue::Bool(true)));
    let event = f.take_event();
    assert_eq!(event.sensor_offset, 0);
    assert_eq!(event.event_state, 1);
}

#[test]
fn first_matching_candidate_wins() {
    let f = Fixture::new();
    let sensor_id = 0x0d01;
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, sensor_id)).unwrap();

    let mapping = DbusMapping {
        object_path: PATH.to_string(),
        interface: IFACE.to_string(),
        property_name: "Mode".to_string(),
    };
    // both candidates accept "A"; declaration order decides
    let value_map = vec![
        (1, PropertyValue::String("A".to_string())),
        (2, PropertyValue::String("A || B".to_string())),
    ];
    let maps = DbusObjMaps::from([(sensor_id, vec![(mapping, value_map)])]);

    let bridge = f.bridge();
    bridge.listen_sensor_events(&repo, &maps, &f.bus);

    f.bus
        .emit(PATH, IFACE, &props("Mode", PropertyValue::String("A".into())));
    let event = f.take_event();
    assert_eq!(event.event_state, 1);
    f.no_event_sent();
}

#[test]
fn dropping_the_bridge_releases_subscriptions() {
    let f = Fixture::new();
    let sensor_id = 0x0e01;
    let mut repo = PdrRepo::new();
    repo.add_record(state_sensor_record(1, sensor_id)).unwrap();

    let bridge = f.bridge();
    bridge.listen_sensor_events(&repo, &string_maps(sensor_id), &f.bus);
    assert_eq!(f.bus.live_subscriptions(), 1);

    drop(bridge);
    assert_eq!(f.bus.live_subscriptions(), 0);
    f.bus.emit(PATH, IFACE, &host_state("Active"));
    f.no_event_sent();
}
