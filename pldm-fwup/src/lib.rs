// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM firmware update agent: PLDM type 5 messaging
 *
 * Copyright (c) 2025 Code Construct
 */
#![forbid(unsafe_code)]
// #![warn(missing_docs)]

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use nom::{
    bytes::complete::take,
    combinator::map_res,
    number::complete::{le_u16, le_u32, le_u8},
    sequence::tuple,
    IResult,
};

use enumset::{EnumSet, EnumSetType};

use pldm_core::util::SliceWriter;

/// Update coordination across managed endpoints
pub mod manager;
/// Firmware package component tables and byte source
pub mod pkg;
/// Per-device update state machine
pub mod updater;

// Firmware Update PLDM Type 5
pub const PLDM_TYPE_FW: u8 = 5;

// Baseline transfer size, the minimum legal RequestFirmwareData length
pub const PLDM_FW_BASELINE_TRANSFER: u32 = 32;

// Minimum number of outstanding RequestFirmwareData commands
pub const PLDM_FW_MIN_OUTSTANDING_REQ: u8 = 1;

/// ASCII version string type
pub const PLDM_STR_TYPE_ASCII: u8 = 1;

type VResult<I, O> = IResult<I, O>;

/// PLDM Firmware Commands
#[allow(missing_docs)]
#[derive(FromPrimitive, Debug, PartialEq)]
#[repr(u8)]
pub enum Cmd {
    QueryDeviceIdentifiers = 0x01,
    GetFirmwareParameters = 0x02,
    QueryDownstreamDevices = 0x03,
    QueryDownstreamIdentifiers = 0x04,
    GetDownstreamFirmwareParameters = 0x05,
    RequestUpdate = 0x10,
    GetPackageData = 0x11,
    GetDeviceMetaData = 0x12,
    PassComponentTable = 0x13,
    UpdateComponent = 0x14,
    RequestFirmwareData = 0x15,
    TransferComplete = 0x16,
    VerifyComplete = 0x17,
    ApplyComplete = 0x18,
    GetMetaData = 0x19,
    ActivateFirmware = 0x1A,
    GetStatus = 0x1B,
    CancelUpdateComponent = 0x1C,
    CancelUpdate = 0x1D,
    ActivatePendingComponentImageSet = 0x1E,
    ActivatePendingComponentImage = 0x1F,
    RequestDownstreamDeviceUpdate = 0x20,
}

impl Cmd {
    pub const fn is_ua(&self) -> bool {
        !self.is_fd()
    }

    /// Commands sent by the firmware device, handled by the update agent.
    pub const fn is_fd(&self) -> bool {
        matches!(
            self,
            Self::GetPackageData
                | Self::RequestFirmwareData
                | Self::TransferComplete
                | Self::VerifyComplete
                | Self::ApplyComplete
                | Self::GetMetaData
        )
    }
}

/// PLDM firmware response codes
#[allow(missing_docs)]
#[repr(u8)]
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum FwCode {
    NOT_IN_UPDATE_MODE = 0x80,
    ALREADY_IN_UPDATE_MODE = 0x81,
    DATA_OUT_OF_RANGE = 0x82,
    INVALID_TRANSFER_LENGTH = 0x83,
    INVALID_STATE_FOR_COMMAND = 0x84,
    INCOMPLETE_UPDATE = 0x85,
    BUSY_IN_BACKGROUND = 0x86,
    CANCEL_PENDING = 0x87,
    COMMAND_NOT_EXPECTED = 0x88,
    RETRY_REQUEST_FW_DATA = 0x89,
    UNABLE_TO_INITIATE_UPDATE = 0x8A,
    ACTIVATION_NOT_REQUIRED = 0x8B,
    SELF_CONTAINED_ACTIVATION_NOT_PERMITTED = 0x8C,
    NO_DEVICE_METADATA = 0x8D,
    RETRY_REQUEST_UPDATE = 0x8E,
    NO_PACKAGE_DATA = 0x8F,
    INVALID_TRANSFER_HANDLE = 0x90,
    INVALID_TRANSFER_OPERATION = 0x91,
    ACTIVATE_PENDING_IMAGE_NOT_PERMITTED = 0x92,
    PACKAGE_DATA_ERROR = 0x93,
}

/// Transfer Result codes for TransferComplete
///
/// Not all defined Transfer Result codes are defined in this enum,
/// arbitrary `u8` values may be expected.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub enum TransferResult {
    Success,
    Corrupt,
    VersionMismatch,
    Aborted,
    Timeout,
    GenericError,
    Other(u8),
}

impl TransferResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<u8> for TransferResult {
    fn from(v: u8) -> Self {
        match v {
            0x00 => Self::Success,
            0x01 => Self::Corrupt,
            0x02 => Self::VersionMismatch,
            0x03 => Self::Aborted,
            0x09 => Self::Timeout,
            0x0a => Self::GenericError,
            v => Self::Other(v),
        }
    }
}

impl From<TransferResult> for u8 {
    fn from(v: TransferResult) -> u8 {
        match v {
            TransferResult::Success => 0x00,
            TransferResult::Corrupt => 0x01,
            TransferResult::VersionMismatch => 0x02,
            TransferResult::Aborted => 0x03,
            TransferResult::Timeout => 0x09,
            TransferResult::GenericError => 0x0a,
            TransferResult::Other(v) => v,
        }
    }
}

/// Verify Result codes for VerifyComplete
///
/// Ref "VerifyComplete command format" Table 31 of DSP0267 1.1.0
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VerifyResult {
    Success,
    Failure,
    VersionMismatch,
    SecurityChecksFailed,
    IncompleteImage,
    // 0x5 - 0x8 reserved
    Timeout,
    GenericError,
    Other(u8),
}

impl VerifyResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<u8> for VerifyResult {
    fn from(v: u8) -> Self {
        match v {
            0x00 => Self::Success,
            0x01 => Self::Failure,
            0x02 => Self::VersionMismatch,
            0x03 => Self::SecurityChecksFailed,
            0x04 => Self::IncompleteImage,
            0x09 => Self::Timeout,
            0x0a => Self::GenericError,
            v => Self::Other(v),
        }
    }
}

impl From<VerifyResult> for u8 {
    fn from(v: VerifyResult) -> u8 {
        match v {
            VerifyResult::Success => 0x00,
            VerifyResult::Failure => 0x01,
            VerifyResult::VersionMismatch => 0x02,
            VerifyResult::SecurityChecksFailed => 0x03,
            VerifyResult::IncompleteImage => 0x04,
            VerifyResult::Timeout => 0x09,
            VerifyResult::GenericError => 0x0a,
            VerifyResult::Other(v) => v,
        }
    }
}

/// Apply Result codes for ApplyComplete
///
/// Ref "ApplyComplete command format" Table 32 of DSP0267 1.1.0
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ApplyResult {
    Success,
    SuccessModActivation,
    FailedMemoryWrite,
    Timeout,
    GenericError,
    Other(u8),
}

impl ApplyResult {
    /// Success with or without a modified activation method.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessModActivation)
    }
}

impl From<u8> for ApplyResult {
    fn from(v: u8) -> Self {
        match v {
            0x00 => Self::Success,
            0x01 => Self::SuccessModActivation,
            0x02 => Self::FailedMemoryWrite,
            0x09 => Self::Timeout,
            0x0a => Self::GenericError,
            v => Self::Other(v),
        }
    }
}

impl From<ApplyResult> for u8 {
    fn from(v: ApplyResult) -> u8 {
        match v {
            ApplyResult::Success => 0x00,
            ApplyResult::SuccessModActivation => 0x01,
            ApplyResult::FailedMemoryWrite => 0x02,
            ApplyResult::Timeout => 0x09,
            ApplyResult::GenericError => 0x0a,
            ApplyResult::Other(v) => v,
        }
    }
}

/// Transfer flag for PassComponentTable
#[derive(FromPrimitive, Debug, PartialEq, Copy, Clone)]
#[repr(u8)]
pub enum TransferFlag {
    Start = 0x01,
    Middle = 0x02,
    End = 0x04,
    StartAndEnd = 0x05,
}

impl TransferFlag {
    /// Flag for entry `idx` of a table of `len` entries.
    pub fn for_index(idx: usize, len: usize) -> Self {
        if len == 1 {
            Self::StartAndEnd
        } else if idx == 0 {
            Self::Start
        } else if idx == len - 1 {
            Self::End
        } else {
            Self::Middle
        }
    }
}

#[derive(EnumSetType, Debug)]
pub enum UpdateOptionFlag {
    ForceUpdate = 0,
}

pub type UpdateOptionFlags = EnumSet<UpdateOptionFlag>;

fn push_version(b: &mut SliceWriter, version: &str) -> Option<usize> {
    let len: u8 = version.len().try_into().ok()?;
    b.push_le8(PLDM_STR_TYPE_ASCII)?;
    b.push_le8(len)?;
    b.push(version.as_bytes())
}

// Type, length, then data. Non-ASCII string types are not produced by the
// update flow here.
fn parse_version(buf: &[u8]) -> VResult<&[u8], String> {
    let (r, (_typ, len)) = tuple((le_u8, le_u8))(buf)?;
    map_res(take(len), |b: &[u8]| {
        core::str::from_utf8(b).map(str::to_string)
    })(r)
}

/// RequestUpdate request fields
#[derive(Debug, PartialEq)]
pub struct RequestUpdateRequest {
    pub max_transfer_size: u32,
    pub num_components: u16,
    pub max_outstanding: u8,
    pub package_data_len: u16,
    pub image_set_version: String,
}

impl RequestUpdateRequest {
    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le32(self.max_transfer_size)?;
        b.push_le16(self.num_components)?;
        b.push_le8(self.max_outstanding)?;
        b.push_le16(self.package_data_len)?;
        push_version(&mut b, &self.image_set_version)?;
        Some(b.written())
    }

    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, (max_transfer_size, num_components, max_outstanding, package_data_len)) =
            tuple((le_u32, le_u16, le_u8, le_u16))(buf)?;
        let (r, image_set_version) = parse_version(r)?;
        Ok((
            r,
            Self {
                max_transfer_size,
                num_components,
                max_outstanding,
                package_data_len,
                image_set_version,
            },
        ))
    }
}

/// RequestUpdate response fields, completion code excluded
#[derive(Debug, PartialEq)]
pub struct RequestUpdateResponse {
    pub fd_metadata_len: u16,
    pub fd_will_send_pkg_data: u8,
}

impl RequestUpdateResponse {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, t) = tuple((le_u16, le_u8))(buf)?;
        Ok((
            r,
            RequestUpdateResponse {
                fd_metadata_len: t.0,
                fd_will_send_pkg_data: t.1,
            },
        ))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le16(self.fd_metadata_len)?;
        b.push_le8(self.fd_will_send_pkg_data)?;
        Some(b.written())
    }
}

/// PassComponentTable request fields
#[derive(Debug, PartialEq)]
pub struct PassComponentTableRequest {
    pub transfer_flag: TransferFlag,
    pub classification: u16,
    pub identifier: u16,
    pub classification_index: u8,
    pub comparison_stamp: u32,
    pub version: String,
}

impl PassComponentTableRequest {
    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.transfer_flag as u8)?;
        b.push_le16(self.classification)?;
        b.push_le16(self.identifier)?;
        b.push_le8(self.classification_index)?;
        b.push_le32(self.comparison_stamp)?;
        push_version(&mut b, &self.version)?;
        Some(b.written())
    }

    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, (transfer_flag, classification, identifier, classification_index, comparison_stamp)) =
            tuple((
                map_res(le_u8, |f| {
                    TransferFlag::from_u8(f).ok_or("bad transfer flag")
                }),
                le_u16,
                le_u16,
                le_u8,
                le_u32,
            ))(buf)?;
        let (r, version) = parse_version(r)?;
        Ok((
            r,
            Self {
                transfer_flag,
                classification,
                identifier,
                classification_index,
                comparison_stamp,
                version,
            },
        ))
    }
}

/// PassComponentTable response fields, completion code excluded
#[derive(Debug, PartialEq)]
pub struct PassComponentTableResponse {
    pub comp_response: u8,
    pub comp_response_code: u8,
}

impl PassComponentTableResponse {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, (comp_response, comp_response_code)) =
            tuple((le_u8, le_u8))(buf)?;
        Ok((
            r,
            Self {
                comp_response,
                comp_response_code,
            },
        ))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.comp_response)?;
        b.push_le8(self.comp_response_code)?;
        Some(b.written())
    }
}

/// UpdateComponent request fields
#[derive(Debug, PartialEq)]
pub struct UpdateComponentRequest {
    pub classification: u16,
    pub identifier: u16,
    pub classification_index: u8,
    pub comparison_stamp: u32,
    pub image_size: u32,
    pub option_flags: UpdateOptionFlags,
    pub version: String,
}

impl UpdateComponentRequest {
    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le16(self.classification)?;
        b.push_le16(self.identifier)?;
        b.push_le8(self.classification_index)?;
        b.push_le32(self.comparison_stamp)?;
        b.push_le32(self.image_size)?;
        b.push_le32(self.option_flags.as_u32())?;
        push_version(&mut b, &self.version)?;
        Some(b.written())
    }

    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (
            r,
            (
                classification,
                identifier,
                classification_index,
                comparison_stamp,
                image_size,
                option_flags,
            ),
        ) = tuple((le_u16, le_u16, le_u8, le_u32, le_u32, le_u32))(buf)?;
        let (r, version) = parse_version(r)?;
        Ok((
            r,
            Self {
                classification,
                identifier,
                classification_index,
                comparison_stamp,
                image_size,
                option_flags: UpdateOptionFlags::from_u32_truncated(
                    option_flags,
                ),
                version,
            },
        ))
    }
}

/// UpdateComponent response fields, completion code excluded
#[derive(Debug, PartialEq)]
pub struct UpdateComponentResponse {
    pub compatibility_resp: u8,
    pub compatibility_resp_code: u8,
    pub option_flags_enabled: u32,
    pub time_before_req_fw_data: u16,
}

impl UpdateComponentResponse {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, t) = tuple((le_u8, le_u8, le_u32, le_u16))(buf)?;
        Ok((
            r,
            Self {
                compatibility_resp: t.0,
                compatibility_resp_code: t.1,
                option_flags_enabled: t.2,
                time_before_req_fw_data: t.3,
            },
        ))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.compatibility_resp)?;
        b.push_le8(self.compatibility_resp_code)?;
        b.push_le32(self.option_flags_enabled)?;
        b.push_le16(self.time_before_req_fw_data)?;
        Some(b.written())
    }
}

/// RequestFirmwareData request fields, sent by the firmware device
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct RequestFirmwareDataRequest {
    pub offset: u32,
    pub length: u32,
}

impl RequestFirmwareDataRequest {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, (offset, length)) = tuple((le_u32, le_u32))(buf)?;
        Ok((r, Self { offset, length }))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le32(self.offset)?;
        b.push_le32(self.length)?;
        Some(b.written())
    }
}

/// TransferComplete request fields, sent by the firmware device
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct TransferCompleteRequest {
    pub result: TransferResult,
}

impl TransferCompleteRequest {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, result) = le_u8(buf)?;
        Ok((
            r,
            Self {
                result: result.into(),
            },
        ))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.result.into())?;
        Some(b.written())
    }
}

/// VerifyComplete request fields, sent by the firmware device
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct VerifyCompleteRequest {
    pub result: VerifyResult,
}

impl VerifyCompleteRequest {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, result) = le_u8(buf)?;
        Ok((
            r,
            Self {
                result: result.into(),
            },
        ))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.result.into())?;
        Some(b.written())
    }
}

/// ApplyComplete request fields, sent by the firmware device
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ApplyCompleteRequest {
    pub result: ApplyResult,
    /// Component activation methods modification bitmap
    pub activation_methods_modified: u16,
}

impl ApplyCompleteRequest {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, (result, activation_methods_modified)) =
            tuple((le_u8, le_u16))(buf)?;
        Ok((
            r,
            Self {
                result: result.into(),
                activation_methods_modified,
            },
        ))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.result.into())?;
        b.push_le16(self.activation_methods_modified)?;
        Some(b.written())
    }
}

/// ActivateFirmware request fields
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ActivateFirmwareRequest {
    pub self_contained: bool,
}

impl ActivateFirmwareRequest {
    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le8(self.self_contained as u8)?;
        Some(b.written())
    }

    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, v) = le_u8(buf)?;
        Ok((
            r,
            Self {
                self_contained: v != 0,
            },
        ))
    }
}

/// ActivateFirmware response fields, completion code excluded
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ActivateFirmwareResponse {
    pub estimated_time: u16,
}

impl ActivateFirmwareResponse {
    pub fn parse(buf: &[u8]) -> VResult<&[u8], Self> {
        let (r, estimated_time) = le_u16(buf)?;
        Ok((r, Self { estimated_time }))
    }

    pub fn write_buf(&self, buf: &mut [u8]) -> Option<usize> {
        let mut b = SliceWriter::new(buf);
        b.push_le16(self.estimated_time)?;
        Some(b.written())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    #[rustfmt::skip]
    fn write_request_update() {
        let req = RequestUpdateRequest {
            max_transfer_size: 64,
            num_components: 2,
            max_outstanding: PLDM_FW_MIN_OUTSTANDING_REQ,
            package_data_len: 0,
            image_set_version: "v1.2".to_string(),
        };

        let mut buf = [0u8; 64];
        let l = req.write_buf(&mut buf).unwrap();
        let expect = [
            // max transfer size
            0x40, 0x00, 0x00, 0x00,
            // component count
            0x02, 0x00,
            // max outstanding
            0x01,
            // package data length
            0x00, 0x00,
            // version type, length, bytes
            0x01, 0x04, b'v', b'1', b'.', b'2',
        ];
        assert_eq!(&buf[..l], expect);

        let (rest, back) = RequestUpdateRequest::parse(&buf[..l]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(back, req);
    }

    #[test]
    #[rustfmt::skip]
    fn write_pass_component_table() {
        let req = PassComponentTableRequest {
            transfer_flag: TransferFlag::StartAndEnd,
            classification: 0x000a,
            identifier: 0x1234,
            classification_index: 1,
            comparison_stamp: 0xaabbccdd,
            version: "fw".to_string(),
        };

        let mut buf = [0u8; 32];
        let l = req.write_buf(&mut buf).unwrap();
        let expect = [
            0x05,
            0x0a, 0x00,
            0x34, 0x12,
            0x01,
            0xdd, 0xcc, 0xbb, 0xaa,
            0x01, 0x02, b'f', b'w',
        ];
        assert_eq!(&buf[..l], expect);

        let (_, back) = PassComponentTableRequest::parse(&buf[..l]).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    #[rustfmt::skip]
    fn write_update_component() {
        let req = UpdateComponentRequest {
            classification: 0x000a,
            identifier: 0x0002,
            classification_index: 0,
            comparison_stamp: 1,
            image_size: 96,
            option_flags: UpdateOptionFlag::ForceUpdate.into(),
            version: "a".to_string(),
        };

        let mut buf = [0u8; 32];
        let l = req.write_buf(&mut buf).unwrap();
        let expect = [
            0x0a, 0x00,
            0x02, 0x00,
            0x00,
            0x01, 0x00, 0x00, 0x00,
            0x60, 0x00, 0x00, 0x00,
            // option flags, bit 0 set
            0x01, 0x00, 0x00, 0x00,
            0x01, 0x01, b'a',
        ];
        assert_eq!(&buf[..l], expect);

        let (_, back) = UpdateComponentRequest::parse(&buf[..l]).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn transfer_flag_selection() {
        assert_eq!(TransferFlag::for_index(0, 1), TransferFlag::StartAndEnd);
        assert_eq!(TransferFlag::for_index(0, 3), TransferFlag::Start);
        assert_eq!(TransferFlag::for_index(1, 3), TransferFlag::Middle);
        assert_eq!(TransferFlag::for_index(2, 3), TransferFlag::End);
    }

    #[test]
    fn parse_fd_requests() {
        let (_, r) =
            RequestFirmwareDataRequest::parse(&[0x40, 0, 0, 0, 0x20, 0, 0, 0])
                .unwrap();
        assert_eq!(r.offset, 0x40);
        assert_eq!(r.length, 0x20);

        let (_, t) = TransferCompleteRequest::parse(&[0x09]).unwrap();
        assert_eq!(t.result, TransferResult::Timeout);
        assert!(!t.result.is_success());

        let (_, a) = ApplyCompleteRequest::parse(&[0x01, 0x08, 0x00]).unwrap();
        assert_eq!(a.result, ApplyResult::SuccessModActivation);
        assert!(a.result.is_success());
        assert_eq!(a.activation_methods_modified, 8);

        // short apply complete rejected
        ApplyCompleteRequest::parse(&[0x00, 0x08]).unwrap_err();
    }

    #[test]
    fn parse_responses() {
        let (_, r) = RequestUpdateResponse::parse(&[0x10, 0x00, 0x01]).unwrap();
        assert_eq!(r.fd_metadata_len, 0x10);
        assert_eq!(r.fd_will_send_pkg_data, 1);

        let (_, u) = UpdateComponentResponse::parse(&[
            0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x64, 0x00,
        ])
        .unwrap();
        assert_eq!(u.option_flags_enabled, 1);
        assert_eq!(u.time_before_req_fw_data, 100);

        UpdateComponentResponse::parse(&[0x00, 0x00]).unwrap_err();
    }
}
