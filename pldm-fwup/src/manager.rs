// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM firmware update agent: session coordination
 *
 * Copyright (c) 2025 Code Construct
 */

//! Update coordination across managed endpoints.
//!
//! [`UpdateManager`] is the surface a [`DeviceUpdater`] needs from its
//! owner: the event queue, the instance id allocator, the request pipeline,
//! and the completion/progress reports. [`UpdateCoordinator`] is a concrete
//! owner that keeps one updater per endpoint, routes inbound firmware
//! device commands to the right session, and collects the results.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use num_traits::FromPrimitive;

use pldm_core::events::EventQueue;
use pldm_core::instance_id::InstanceIdDb;
use pldm_core::requester::Handler;
use pldm_core::{CCode, Eid, PldmRequest};

use crate::pkg::{
    ComponentImageInfo, ComponentInfoMap, FirmwareDeviceIdRecord,
    PackageSource,
};
use crate::updater::{DeviceUpdater, UpdateSettings};
use crate::{Cmd, PLDM_TYPE_FW};

/// What a per-device updater needs from its owner.
pub trait UpdateManager {
    /// The cooperative event queue driving deferred work and timers.
    fn event(&self) -> Rc<EventQueue>;
    /// The process-wide instance id allocator.
    fn instance_id_db(&self) -> Rc<InstanceIdDb>;
    /// The outbound request pipeline.
    fn handler(&self) -> Rc<Handler>;
    /// Reports the terminal outcome of one endpoint's update session.
    fn update_device_completion(&self, eid: Eid, success: bool);
    /// Reports one component applied, for activation progress accounting.
    fn update_activation_progress(&self);
}

/// Owns the update sessions for a set of endpoints.
pub struct UpdateCoordinator {
    event: Rc<EventQueue>,
    iid_db: Rc<InstanceIdDb>,
    handler: Rc<Handler>,
    devices: RefCell<HashMap<Eid, Rc<RefCell<DeviceUpdater>>>>,
    completions: RefCell<HashMap<Eid, bool>>,
    components_applied: Cell<u32>,
}

impl UpdateCoordinator {
    pub fn new(
        event: Rc<EventQueue>,
        iid_db: Rc<InstanceIdDb>,
        handler: Rc<Handler>,
    ) -> Rc<Self> {
        Rc::new(Self {
            event,
            iid_db,
            handler,
            devices: RefCell::new(HashMap::new()),
            completions: RefCell::new(HashMap::new()),
            components_applied: Cell::new(0),
        })
    }

    /// Creates the updater for `eid` and starts its update flow.
    #[allow(clippy::too_many_arguments)]
    pub fn start_device(
        self: &Rc<Self>,
        eid: Eid,
        fw_record: FirmwareDeviceIdRecord,
        components: Rc<Vec<ComponentImageInfo>>,
        comp_info: Rc<ComponentInfoMap>,
        package: Rc<dyn PackageSource>,
        settings: UpdateSettings,
    ) {
        let mgr: Rc<dyn UpdateManager> = self.clone();
        let updater = DeviceUpdater::new(
            eid, &mgr, fw_record, components, comp_info, package, settings,
        );
        updater.borrow_mut().start_fw_update_flow();
        self.devices.borrow_mut().insert(eid, updater);
    }

    /// The updater for `eid`, while its session exists.
    pub fn device(&self, eid: Eid) -> Option<Rc<RefCell<DeviceUpdater>>> {
        self.devices.borrow().get(&eid).cloned()
    }

    /// Drops the session for `eid`, tearing down its timer and any pending
    /// continuation.
    pub fn remove_device(&self, eid: Eid) -> bool {
        self.devices.borrow_mut().remove(&eid).is_some()
    }

    /// Routes an inbound firmware device command to its update session.
    ///
    /// Returns the encoded response to send back, or `None` for messages
    /// this coordinator does not handle.
    pub fn handle_request(&self, eid: Eid, msg: &[u8]) -> Option<Vec<u8>> {
        let request = match PldmRequest::from_buf(msg) {
            Ok(request) => request,
            Err(e) => {
                error!("Bad request from endpoint ID '{eid}': {e}");
                return None;
            }
        };
        if request.typ != PLDM_TYPE_FW {
            return None;
        }

        let updater = self.device(eid);
        let Some(updater) = updater else {
            debug!(
                "Firmware request from endpoint ID '{eid}' with no update session"
            );
            return None;
        };
        let mut updater = updater.borrow_mut();

        let response = match Cmd::from_u8(request.cmd) {
            Some(Cmd::RequestFirmwareData) => {
                updater.request_fw_data(&request)
            }
            Some(Cmd::TransferComplete) => updater.transfer_complete(&request),
            Some(Cmd::VerifyComplete) => updater.verify_complete(&request),
            Some(Cmd::ApplyComplete) => updater.apply_complete(&request),
            _ => {
                error!(
                    "Unexpected firmware command '{:#04x}' from endpoint ID '{eid}'",
                    request.cmd
                );
                let mut response = request.response();
                response.cc = CCode::ERROR_UNSUPPORTED_PLDM_CMD as u8;
                response.to_vec()
            }
        };
        Some(response)
    }

    /// Per-endpoint results reported so far.
    pub fn completions(&self) -> HashMap<Eid, bool> {
        self.completions.borrow().clone()
    }

    /// True once every started session has reported completion.
    pub fn is_finished(&self) -> bool {
        self.completions.borrow().len() == self.devices.borrow().len()
    }

    /// Components applied across all sessions.
    pub fn components_applied(&self) -> u32 {
        self.components_applied.get()
    }
}

impl UpdateManager for UpdateCoordinator {
    fn event(&self) -> Rc<EventQueue> {
        self.event.clone()
    }

    fn instance_id_db(&self) -> Rc<InstanceIdDb> {
        self.iid_db.clone()
    }

    fn handler(&self) -> Rc<Handler> {
        self.handler.clone()
    }

    fn update_device_completion(&self, eid: Eid, success: bool) {
        if success {
            info!("Update completed for endpoint ID '{eid}'");
        } else {
            error!("Update failed for endpoint ID '{eid}'");
        }
        self.completions.borrow_mut().insert(eid, success);
    }

    fn update_activation_progress(&self) {
        let applied = self.components_applied.get() + 1;
        self.components_applied.set(applied);
        debug!("Components applied so far: {applied}");
    }
}
