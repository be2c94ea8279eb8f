// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM firmware update agent: per-device update flow
 *
 * Copyright (c) 2025 Code Construct
 */

//! Per-device firmware update state machine.
//!
//! A [`DeviceUpdater`] drives one endpoint through the PLDM firmware update
//! flow: RequestUpdate, PassComponentTable for each applicable component,
//! then per component UpdateComponent, firmware data transfer,
//! TransferComplete, VerifyComplete and ApplyComplete, finishing with
//! ActivateFirmware. Failures while a component is in flight converge on
//! CancelUpdateComponent; the session still activates if at least one
//! component applied.
//!
//! Response callbacks never send the next request inline. They queue the
//! next action on the event queue so the pipeline has released the
//! completed transaction's instance id before the next encode. At most one
//! continuation is pending per updater.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use nom::combinator::all_consuming;

use pldm_core::events::{EventQueue, TimerToken};
use pldm_core::instance_id::InstanceIdDb;
use pldm_core::requester::{Handler, ResponseCallback};
use pldm_core::{CCode, Eid, InstanceId, PldmRequest, PldmResponse};

use crate::manager::UpdateManager;
use crate::pkg::{
    read_component, ComponentImageInfo, ComponentInfoMap,
    FirmwareDeviceIdRecord, PackageSource,
};
use crate::{
    ActivateFirmwareRequest, ActivateFirmwareResponse, ApplyCompleteRequest,
    Cmd, FwCode, PassComponentTableRequest, PassComponentTableResponse,
    RequestFirmwareDataRequest, RequestUpdateRequest, RequestUpdateResponse,
    TransferCompleteRequest, TransferFlag, UpdateComponentRequest,
    UpdateComponentResponse, UpdateOptionFlag, UpdateOptionFlags,
    VerifyCompleteRequest, PLDM_FW_BASELINE_TRANSFER,
    PLDM_FW_MIN_OUTSTANDING_REQ, PLDM_TYPE_FW,
};

// Large enough for any fixed request layout plus a 255 byte version string.
const REQ_BUF: usize = 512;

/// Session tunables for one managed endpoint.
#[derive(Debug, Clone, Copy)]
pub struct UpdateSettings {
    /// Largest RequestFirmwareData length the device may ask for.
    pub max_transfer_size: u32,
    /// Data request inactivity timeout during component transfer.
    pub update_timeout_ms: u64,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            max_transfer_size: 4096,
            update_timeout_ms: 60_000,
        }
    }
}

/// Where the update session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// RequestUpdate sent, awaiting the device's acceptance
    RequestUpdate,
    /// Passing the component table entries
    PassComponentTable,
    /// UpdateComponent sent for the current component
    UpdateComponent,
    /// The device is pulling firmware data
    AwaitingData,
    /// Transfer finished, awaiting the device's verify result
    VerifyComplete,
    /// Verify finished, awaiting the device's apply result
    ApplyComplete,
    /// ActivateFirmware sent
    Activating,
    /// CancelUpdateComponent sent for the current component
    Cancelling,
    /// Session over; completion has been reported
    Done,
}

// One scheduled continuation. Scheduling a new action replaces any prior
// one, which by construction has already run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextAction {
    PassComponentTable(usize),
    UpdateComponent(usize),
    ActivateFirmware,
    CancelUpdateComponent,
}

/// Drives the firmware update flow for a single endpoint.
pub struct DeviceUpdater {
    eid: Eid,
    // completion and progress reports go to the owning manager
    mgr: Weak<dyn UpdateManager>,
    event: Rc<EventQueue>,
    iid_db: Rc<InstanceIdDb>,
    handler: Rc<Handler>,
    fw_record: FirmwareDeviceIdRecord,
    components: Rc<Vec<ComponentImageInfo>>,
    comp_info: Rc<ComponentInfoMap>,
    package: Rc<dyn PackageSource>,
    settings: UpdateSettings,

    this: Weak<RefCell<Self>>,
    phase: Phase,
    // position within fw_record.applicable_components
    component_index: usize,
    // success tracking across partial cancellation
    component_update_status: HashMap<usize, bool>,
    pending: Option<NextAction>,
    // armed only while the device is pulling data for a component
    fw_data_timer: Option<TimerToken>,
}

impl DeviceUpdater {
    pub fn new(
        eid: Eid,
        mgr: &Rc<dyn UpdateManager>,
        fw_record: FirmwareDeviceIdRecord,
        components: Rc<Vec<ComponentImageInfo>>,
        comp_info: Rc<ComponentInfoMap>,
        package: Rc<dyn PackageSource>,
        settings: UpdateSettings,
    ) -> Rc<RefCell<Self>> {
        let updater = Rc::new(RefCell::new(Self {
            eid,
            mgr: Rc::downgrade(mgr),
            event: mgr.event(),
            iid_db: mgr.instance_id_db(),
            handler: mgr.handler(),
            fw_record,
            components,
            comp_info,
            package,
            settings,
            this: Weak::new(),
            phase: Phase::Idle,
            component_index: 0,
            component_update_status: HashMap::new(),
            pending: None,
            fw_data_timer: None,
        }));
        updater.borrow_mut().this = Rc::downgrade(&updater);
        updater
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fw_data_timer_armed(&self) -> bool {
        self.fw_data_timer.is_some()
    }

    /// Begins the update session with a RequestUpdate command.
    pub fn start_fw_update_flow(&mut self) {
        let eid = self.eid;
        let Some(iid) = self.next_iid() else { return };

        let req = RequestUpdateRequest {
            max_transfer_size: self.settings.max_transfer_size,
            num_components: self.fw_record.applicable_components.len() as u16,
            max_outstanding: PLDM_FW_MIN_OUTSTANDING_REQ,
            package_data_len: self.fw_record.package_data.len() as u16,
            image_set_version: self.fw_record.image_set_version.clone(),
        };
        let mut buf = [0u8; REQ_BUF];
        let Some(len) = req.write_buf(&mut buf) else {
            self.abandon_iid(iid);
            error!(
                "Failed to encode request update request for endpoint ID '{eid}'"
            );
            return;
        };

        let cb = self.callback(Self::request_update_done);
        if let Err(e) = self.handler.register_request(
            eid,
            iid,
            PLDM_TYPE_FW,
            Cmd::RequestUpdate as u8,
            buf[..len].to_vec(),
            cb,
        ) {
            error!("Failed to send request update for endpoint ID '{eid}': {e}");
            return;
        }
        self.phase = Phase::RequestUpdate;
    }

    fn request_update_done(&mut self, eid: Eid, response: Option<&PldmResponse>) {
        let Some(response) = response else {
            error!(
                "No response received for request update for endpoint ID '{eid}'"
            );
            self.complete(false);
            return;
        };
        if response.cc != CCode::SUCCESS as u8 {
            error!(
                "Failure in request update response for endpoint ID '{eid}', completion code '{}'",
                response.cc
            );
            self.complete(false);
            return;
        }
        let Ok((_, resp)) =
            all_consuming(RequestUpdateResponse::parse)(&response.data[..])
        else {
            error!(
                "Failed to decode request update response for endpoint ID '{eid}'"
            );
            return;
        };
        // Optional DeviceMetaData and GetPackageData transfers not handled
        if resp.fd_will_send_pkg_data != 0 {
            warn!("Endpoint ID '{eid}' requested package data, not supported");
        }

        self.schedule(NextAction::PassComponentTable(self.component_index));
    }

    fn send_pass_component_table(&mut self, offset: usize) {
        let eid = self.eid;
        let Some(iid) = self.next_iid() else { return };

        let count = self.fw_record.applicable_components.len();
        let comp =
            &self.components[self.fw_record.applicable_components[offset]];
        let req = PassComponentTableRequest {
            transfer_flag: TransferFlag::for_index(offset, count),
            classification: comp.classification,
            identifier: comp.identifier,
            classification_index: self.classification_index(offset),
            comparison_stamp: comp.comparison_stamp,
            version: comp.version.clone(),
        };

        let mut buf = [0u8; REQ_BUF];
        let Some(len) = req.write_buf(&mut buf) else {
            self.abandon_iid(iid);
            error!(
                "Failed to encode pass component table request for endpoint ID '{eid}'"
            );
            return;
        };

        let cb = self.callback(Self::pass_component_table_done);
        if let Err(e) = self.handler.register_request(
            eid,
            iid,
            PLDM_TYPE_FW,
            Cmd::PassComponentTable as u8,
            buf[..len].to_vec(),
            cb,
        ) {
            error!(
                "Failed to send pass component table request for endpoint ID '{eid}': {e}"
            );
            return;
        }
        self.phase = Phase::PassComponentTable;
    }

    fn pass_component_table_done(
        &mut self,
        eid: Eid,
        response: Option<&PldmResponse>,
    ) {
        let Some(response) = response else {
            error!(
                "No response received for pass component table for endpoint ID '{eid}'"
            );
            self.complete(false);
            return;
        };
        if response.cc != CCode::SUCCESS as u8 {
            error!(
                "Failed to pass component table for endpoint ID '{eid}', completion code '{}'",
                response.cc
            );
            self.complete(false);
            return;
        }
        let Ok((_, resp)) = all_consuming(PassComponentTableResponse::parse)(
            &response.data[..],
        ) else {
            error!(
                "Failed to decode pass component table response for endpoint ID '{eid}'"
            );
            return;
        };
        debug!(
            "Component response '{}' code '{}' for endpoint ID '{eid}'",
            resp.comp_response, resp.comp_response_code
        );

        if self.component_index
            == self.fw_record.applicable_components.len() - 1
        {
            self.component_index = 0;
            self.schedule(NextAction::UpdateComponent(self.component_index));
        } else {
            self.component_index += 1;
            self.schedule(NextAction::PassComponentTable(self.component_index));
        }
    }

    fn send_update_component(&mut self, offset: usize) {
        let eid = self.eid;
        let Some(iid) = self.next_iid() else { return };

        let comp =
            &self.components[self.fw_record.applicable_components[offset]];
        let option_flags: UpdateOptionFlags = if comp.force_update() {
            UpdateOptionFlag::ForceUpdate.into()
        } else {
            UpdateOptionFlags::empty()
        };
        let req = UpdateComponentRequest {
            classification: comp.classification,
            identifier: comp.identifier,
            classification_index: self.classification_index(offset),
            comparison_stamp: comp.comparison_stamp,
            image_size: comp.size,
            option_flags,
            version: comp.version.clone(),
        };

        let mut buf = [0u8; REQ_BUF];
        let Some(len) = req.write_buf(&mut buf) else {
            self.abandon_iid(iid);
            error!(
                "Failed to encode update component request for endpoint ID '{eid}'"
            );
            return;
        };

        let cb = self.callback(Self::update_component_done);
        if let Err(e) = self.handler.register_request(
            eid,
            iid,
            PLDM_TYPE_FW,
            Cmd::UpdateComponent as u8,
            buf[..len].to_vec(),
            cb,
        ) {
            error!(
                "Failed to send update component request for endpoint ID '{eid}': {e}"
            );
            return;
        }
        self.phase = Phase::UpdateComponent;
    }

    fn update_component_done(
        &mut self,
        eid: Eid,
        response: Option<&PldmResponse>,
    ) {
        let Some(response) = response else {
            error!(
                "No response received for update component for endpoint ID '{eid}'"
            );
            self.complete(false);
            return;
        };
        if response.cc != CCode::SUCCESS as u8 {
            error!(
                "Failure in update component response for endpoint ID '{eid}', completion code '{}'",
                response.cc
            );
            self.complete(false);
            return;
        }
        let Ok((_, resp)) =
            all_consuming(UpdateComponentResponse::parse)(&response.data[..])
        else {
            error!(
                "Failed to decode update component response for endpoint ID '{eid}'"
            );
            return;
        };
        debug!(
            "Update component accepted for endpoint ID '{eid}', compatibility '{}' code '{}'",
            resp.compatibility_resp, resp.compatibility_resp_code
        );

        // the device drives the data transfer from here
        self.phase = Phase::AwaitingData;
    }

    /// Serves a RequestFirmwareData command from the device.
    ///
    /// Returns the encoded response. A valid serve arms or restarts the
    /// data request timer; a rejected one leaves it untouched.
    pub fn request_fw_data(&mut self, request: &PldmRequest) -> Vec<u8> {
        let eid = self.eid;
        let Ok((_, fw_req)) = all_consuming(RequestFirmwareDataRequest::parse)(
            &request.data[..],
        ) else {
            error!(
                "Failed to decode request firmware data request for endpoint ID '{eid}'"
            );
            return error_response(request, CCode::ERROR_INVALID_DATA as u8);
        };
        let (offset, length) = (fw_req.offset, fw_req.length);
        debug!(
            "Firmware data request at offset '{offset}' and length '{length}' for endpoint ID '{eid}'"
        );

        if length < PLDM_FW_BASELINE_TRANSFER
            || length > self.settings.max_transfer_size
        {
            return error_response(
                request,
                FwCode::INVALID_TRANSFER_LENGTH as u8,
            );
        }

        let comp = self.current_component();
        if offset as u64 + length as u64
            > comp.size as u64 + PLDM_FW_BASELINE_TRANSFER as u64
        {
            return error_response(request, FwCode::DATA_OUT_OF_RANGE as u8);
        }

        // The device may over-request past the image end by up to the
        // baseline transfer size; the tail stays zero.
        let read_len = (length as u64)
            .min((comp.size as u64).saturating_sub(offset as u64))
            as usize;
        let mut data = vec![0u8; length as usize];
        if let Err(e) = read_component(
            self.package.as_ref(),
            comp,
            offset,
            &mut data[..read_len],
        ) {
            error!(
                "Failed to read package data at offset '{offset}' for endpoint ID '{eid}': {e}"
            );
            return error_response(request, CCode::ERROR as u8);
        }

        if self.fw_data_timer.is_none() && offset != 0 {
            warn!("First data request is not at offset 0 for endpoint ID '{eid}'");
        }
        self.restart_fw_data_timer();

        let mut response = request.response();
        response.data = data;
        response.to_vec()
    }

    /// Handles a TransferComplete command from the device.
    pub fn transfer_complete(&mut self, request: &PldmRequest) -> Vec<u8> {
        let eid = self.eid;
        self.stop_fw_data_timer();

        let Ok((_, tc)) =
            all_consuming(TransferCompleteRequest::parse)(&request.data[..])
        else {
            error!(
                "Failed to decode transfer complete request for endpoint ID '{eid}'"
            );
            return error_response(request, CCode::ERROR_INVALID_DATA as u8);
        };

        let version = self.current_component().version.clone();
        if tc.result.is_success() {
            info!(
                "Component endpoint ID '{eid}' and version '{version}' transfer complete"
            );
            self.phase = Phase::VerifyComplete;
        } else {
            error!(
                "Failure in transfer of the component endpoint ID '{eid}' and version '{version}' with transfer result '{:?}'",
                tc.result
            );
            self.component_update_status
                .insert(self.component_index, false);
            self.send_cancel_update_component();
        }

        request.response().to_vec()
    }

    /// Handles a VerifyComplete command from the device.
    pub fn verify_complete(&mut self, request: &PldmRequest) -> Vec<u8> {
        let eid = self.eid;
        let Ok((_, vc)) =
            all_consuming(VerifyCompleteRequest::parse)(&request.data[..])
        else {
            error!(
                "Failed to decode verify complete request for endpoint ID '{eid}'"
            );
            return error_response(request, CCode::ERROR_INVALID_DATA as u8);
        };

        let version = self.current_component().version.clone();
        if vc.result.is_success() {
            info!(
                "Component endpoint ID '{eid}' and version '{version}' verification complete"
            );
            self.phase = Phase::ApplyComplete;
        } else {
            error!(
                "Failed to verify component endpoint ID '{eid}' and version '{version}' with verify result '{:?}'",
                vc.result
            );
            self.component_update_status
                .insert(self.component_index, false);
            self.send_cancel_update_component();
        }

        request.response().to_vec()
    }

    /// Handles an ApplyComplete command from the device.
    pub fn apply_complete(&mut self, request: &PldmRequest) -> Vec<u8> {
        let eid = self.eid;
        let Ok((_, ac)) =
            all_consuming(ApplyCompleteRequest::parse)(&request.data[..])
        else {
            error!(
                "Failed to decode apply complete request for endpoint ID '{eid}'"
            );
            return error_response(request, CCode::ERROR_INVALID_DATA as u8);
        };

        let version = self.current_component().version.clone();
        if ac.result.is_success() {
            info!(
                "Component endpoint ID '{eid}' with version '{version}' apply complete"
            );
            self.report_activation_progress();

            if self.component_index
                == self.fw_record.applicable_components.len() - 1
            {
                self.component_index = 0;
                self.component_update_status.clear();
                self.component_update_status
                    .insert(self.component_index, true);
                self.schedule(NextAction::ActivateFirmware);
            } else {
                self.component_index += 1;
                self.component_update_status
                    .insert(self.component_index, true);
                self.schedule(NextAction::UpdateComponent(
                    self.component_index,
                ));
            }
        } else {
            error!(
                "Failed to apply component endpoint ID '{eid}' and version '{version}' with apply result '{:?}'",
                ac.result
            );
            self.component_update_status
                .insert(self.component_index, false);
            self.send_cancel_update_component();
        }

        request.response().to_vec()
    }

    fn send_activate_firmware(&mut self) {
        let eid = self.eid;
        let Some(iid) = self.next_iid() else { return };

        let req = ActivateFirmwareRequest {
            self_contained: false,
        };
        let mut buf = [0u8; 8];
        let Some(len) = req.write_buf(&mut buf) else {
            self.abandon_iid(iid);
            error!(
                "Failed to encode activate firmware request for endpoint ID '{eid}'"
            );
            return;
        };

        let cb = self.callback(Self::activate_firmware_done);
        if let Err(e) = self.handler.register_request(
            eid,
            iid,
            PLDM_TYPE_FW,
            Cmd::ActivateFirmware as u8,
            buf[..len].to_vec(),
            cb,
        ) {
            error!(
                "Failed to send activate firmware request for endpoint ID '{eid}': {e}"
            );
            return;
        }
        self.phase = Phase::Activating;
    }

    fn activate_firmware_done(
        &mut self,
        eid: Eid,
        response: Option<&PldmResponse>,
    ) {
        let Some(response) = response else {
            error!(
                "No response received for activate firmware for endpoint ID '{eid}'"
            );
            self.complete(false);
            return;
        };
        if response.cc != CCode::SUCCESS as u8 {
            error!(
                "Failed to activate firmware for endpoint ID '{eid}', completion code '{}'",
                response.cc
            );
            self.complete(false);
            return;
        }
        let Ok((_, resp)) =
            all_consuming(ActivateFirmwareResponse::parse)(&response.data[..])
        else {
            error!(
                "Failed to decode activate firmware response for endpoint ID '{eid}'"
            );
            return;
        };
        info!(
            "Firmware activation started for endpoint ID '{eid}', estimated time '{}'s",
            resp.estimated_time
        );

        self.complete(true);
    }

    fn send_cancel_update_component(&mut self) {
        let eid = self.eid;
        self.pending = None;
        let Some(iid) = self.next_iid() else { return };

        let cb = self.callback(Self::cancel_update_component_done);
        if let Err(e) = self.handler.register_request(
            eid,
            iid,
            PLDM_TYPE_FW,
            Cmd::CancelUpdateComponent as u8,
            Vec::new(),
            cb,
        ) {
            error!(
                "Failed to send cancel update component request for endpoint ID '{eid}', component index '{}': {e}",
                self.component_index
            );
            return;
        }
        self.phase = Phase::Cancelling;
    }

    fn cancel_update_component_done(
        &mut self,
        eid: Eid,
        response: Option<&PldmResponse>,
    ) {
        // A missing or failed cancel is recorded, then the session advances
        // as if it succeeded; a stuck cancel must not wedge the remaining
        // components.
        match response {
            None => error!(
                "No response received for cancel update component for endpoint ID '{eid}'"
            ),
            Some(response) if response.cc != CCode::SUCCESS as u8 => error!(
                "Failed to cancel update component for endpoint ID '{eid}', component index '{}', completion code '{}'",
                self.component_index, response.cc
            ),
            Some(_) => (),
        }

        if self.component_index
            == self.fw_record.applicable_components.len() - 1
        {
            if self.component_update_status.values().any(|ok| *ok) {
                // at least one component update succeeded, proceed with
                // activation
                self.component_index = 0;
                self.component_update_status.clear();
                self.schedule(NextAction::ActivateFirmware);
            } else {
                self.complete(false);
            }
        } else {
            self.component_index += 1;
            self.component_update_status
                .insert(self.component_index, true);
            self.schedule(NextAction::UpdateComponent(self.component_index));
        }
    }

    fn fw_data_timed_out(&mut self) {
        self.fw_data_timer = None;
        error!(
            "Firmware data request timed out for endpoint ID '{}', component index '{}'",
            self.eid, self.component_index
        );
        self.component_update_status
            .insert(self.component_index, false);
        self.send_cancel_update_component();
    }

    fn complete(&mut self, success: bool) {
        if self.phase == Phase::Done {
            return;
        }
        self.phase = Phase::Done;
        self.pending = None;
        self.stop_fw_data_timer();
        if let Some(mgr) = self.mgr.upgrade() {
            mgr.update_device_completion(self.eid, success);
        }
    }

    fn report_activation_progress(&self) {
        if let Some(mgr) = self.mgr.upgrade() {
            mgr.update_activation_progress();
        }
    }

    fn schedule(&mut self, action: NextAction) {
        self.pending = Some(action);
        let this = self.this.clone();
        self.event.defer(move || {
            if let Some(updater) = this.upgrade() {
                DeviceUpdater::run_pending(&updater);
            }
        });
    }

    fn run_pending(updater: &Rc<RefCell<Self>>) {
        let action = updater.borrow_mut().pending.take();
        let Some(action) = action else { return };
        let mut updater = updater.borrow_mut();
        match action {
            NextAction::PassComponentTable(offset) => {
                updater.send_pass_component_table(offset)
            }
            NextAction::UpdateComponent(offset) => {
                updater.send_update_component(offset)
            }
            NextAction::ActivateFirmware => updater.send_activate_firmware(),
            NextAction::CancelUpdateComponent => {
                updater.send_cancel_update_component()
            }
        }
    }

    fn callback(
        &self,
        f: fn(&mut Self, Eid, Option<&PldmResponse>),
    ) -> ResponseCallback {
        let this = self.this.clone();
        Box::new(move |eid, response| {
            if let Some(updater) = this.upgrade() {
                f(&mut updater.borrow_mut(), eid, response);
            }
        })
    }

    fn restart_fw_data_timer(&mut self) {
        if let Some(token) = self.fw_data_timer.take() {
            self.event.cancel(token);
        }
        let this = self.this.clone();
        let token =
            self.event
                .schedule(self.settings.update_timeout_ms, move || {
                    if let Some(updater) = this.upgrade() {
                        updater.borrow_mut().fw_data_timed_out();
                    }
                });
        self.fw_data_timer = Some(token);
    }

    fn stop_fw_data_timer(&mut self) {
        if let Some(token) = self.fw_data_timer.take() {
            self.event.cancel(token);
        }
    }

    fn current_component(&self) -> &ComponentImageInfo {
        &self.components
            [self.fw_record.applicable_components[self.component_index]]
    }

    fn classification_index(&self, offset: usize) -> u8 {
        let comp =
            &self.components[self.fw_record.applicable_components[offset]];
        let key = (comp.classification, comp.identifier);
        match self.comp_info.get(&key) {
            Some(index) => *index,
            None => {
                error!(
                    "Failed to find component classification '{}' and identifier '{}'",
                    comp.classification, comp.identifier
                );
                0
            }
        }
    }

    fn next_iid(&self) -> Option<InstanceId> {
        match self.iid_db.next(self.eid) {
            Ok(iid) => Some(iid),
            Err(e) => {
                error!(
                    "Instance id allocation failed for endpoint ID '{}': {e}",
                    self.eid
                );
                None
            }
        }
    }

    fn abandon_iid(&self, iid: InstanceId) {
        if let Err(e) = self.iid_db.free(self.eid, iid) {
            warn!(
                "Instance id release failed for endpoint ID '{}': {e}",
                self.eid
            );
        }
    }
}

impl Drop for DeviceUpdater {
    // dropping a session mid-flight must not leave its timer pending
    fn drop(&mut self) {
        self.stop_fw_data_timer();
    }
}

fn error_response(request: &PldmRequest, cc: u8) -> Vec<u8> {
    let mut response = request.response();
    response.cc = cc;
    response.to_vec()
}
