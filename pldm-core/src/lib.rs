// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM base message definitions.
 *
 * Copyright (c) 2025 Code Construct
 */
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Platform Level Data Model (PLDM) base protocol support
//!
//! This crate implements the base communication primitives used by the
//! higher-level PLDM requester crates: message framing, the per-endpoint
//! instance id allocator, a cooperative event queue, and the outbound
//! request pipeline that pairs requests with their response callbacks.

use core::fmt::{self, Debug};

use num_derive::FromPrimitive;
use thiserror::Error;

pub mod events;
pub mod instance_id;
pub mod requester;
pub mod util;

/// Maximum size of a PLDM message, defining our buffer sizes.
pub const PLDM_MAX_MSGSIZE: usize = 1024;

/// Number of instance ids available per endpoint.
///
/// The instance id field is 5 bits wide.
pub const PLDM_NUM_INSTANCE_IDS: u8 = 32;

/// MCTP endpoint ID of a managed device.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Eid(pub u8);

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// PLDM instance ID, making a request/response pair unique per endpoint.
///
/// Valid values are 0 through 31. Obtained from
/// [`InstanceIdDb`](instance_id::InstanceIdDb).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(pub u8);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Generic PLDM error type
#[derive(Error, Debug)]
pub enum PldmError {
    /// PLDM protocol error
    #[error("PLDM protocol error: {0}")]
    Protocol(String),
    /// Invalid argument
    #[error("invalid argument")]
    InvalidArgument,
    /// No buffer space available
    #[error("insufficient buffer space available")]
    NoSpace,
    /// All 32 instance ids for the endpoint are outstanding
    #[error("no free instance ids for endpoint {0}")]
    InstanceIdExhausted(Eid),
    /// `free` was called for an id that is not allocated
    #[error("instance id {1} is not in use for endpoint {0}")]
    InstanceIdNotAllocated(Eid, InstanceId),
    /// The transport refused the outbound message
    #[error("transport send failed: {0}")]
    Transport(String),
    /// A transaction with the same key is already outstanding
    #[error("request already pending for endpoint {0} instance id {1}")]
    DuplicateRequest(Eid, InstanceId),
}

/// Create a `PldmError::Protocol` from a message and optional description.
///
/// Example
///
/// ```
/// # let iid = 1;
/// # let actual_iid = 2;
/// use pldm_core::proto_error;
/// proto_error!("Mismatching IID", "Expected {iid:02x}, received {actual_iid:02x}");
/// proto_error!("Rq bit wasn't expected");
/// ```
#[macro_export]
macro_rules! proto_error {
    ($msg: expr, $($desc: tt)+)
        => { $crate::PldmError::Protocol(format!("{}. {}", $msg, format!($($desc)+))) };
    ($msg: expr)
        => { $crate::PldmError::Protocol(format!("{}.", $msg)) };
}

/// PLDM protocol return type
pub type Result<T> = core::result::Result<T, PldmError>;

#[allow(missing_docs)]
#[repr(u8)]
#[allow(non_camel_case_types)]
#[derive(FromPrimitive, Debug, PartialEq, Copy, Clone)]
pub enum CCode {
    SUCCESS = 0,
    ERROR = 1,
    ERROR_INVALID_DATA = 2,
    ERROR_INVALID_LENGTH = 3,
    ERROR_NOT_READY = 4,
    ERROR_UNSUPPORTED_PLDM_CMD = 5,
    ERROR_INVALID_PLDM_TYPE = 32,
}

// Header layout: [rq<<7 | iid, hdr_ver<<6 | typ, cmd], responses carry a
// completion code byte after the command.
const RQ_BIT: u8 = 0x80;
const IID_MASK: u8 = 0x1f;
const TYP_MASK: u8 = 0x3f;

/// Base PLDM request type
pub struct PldmRequest {
    /// PLDM Instance ID
    pub iid: InstanceId,
    /// PLDM type.
    pub typ: u8,
    /// PLDM command code
    pub cmd: u8,
    /// PLDM command data payload
    pub data: Vec<u8>,
}

impl Debug for PldmRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PldmRequest")
            .field("iid", &self.iid)
            .field("typ", &self.typ)
            .field("cmd", &self.cmd)
            .field("data.len()", &self.data.len())
            .field("data..10", &&self.data[..self.data.len().min(10)])
            .finish()
    }
}

impl PldmRequest {
    /// Create a new PLDM request for a given PLDM message type and command
    /// number.
    ///
    /// The instance id is zero until assigned by the caller.
    pub fn new(typ: u8, cmd: u8) -> Self {
        Self::new_data(typ, cmd, Vec::new())
    }

    /// Create a new PLDM request with a data payload.
    pub fn new_data(typ: u8, cmd: u8, data: Vec<u8>) -> Self {
        Self {
            iid: InstanceId(0),
            typ,
            cmd,
            data,
        }
    }

    /// Create a PLDM request from received message data.
    ///
    /// May fail if the message data is not parsable as a PLDM request.
    pub fn from_buf(data: &[u8]) -> Result<Self> {
        if data.len() < 3 {
            return Err(proto_error!(
                "Short request",
                "{} bytes",
                data.len()
            ));
        }

        let rq = (data[0] & RQ_BIT) != 0;
        let iid = InstanceId(data[0] & IID_MASK);
        let typ = data[1] & TYP_MASK;
        let cmd = data[2];

        if !rq {
            return Err(proto_error!("PLDM response, expected request"));
        }

        Ok(PldmRequest {
            iid,
            typ,
            cmd,
            data: data[3..].to_vec(),
        })
    }

    /// Returns the full wire form of this request, header included.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(3 + self.data.len());
        v.push(RQ_BIT | (self.iid.0 & IID_MASK));
        v.push(self.typ & TYP_MASK);
        v.push(self.cmd);
        v.extend_from_slice(&self.data);
        v
    }

    /// Create a new PLDM response for this request.
    ///
    /// The instance, type and command are carried over from the request;
    /// the completion code starts as success with an empty payload.
    pub fn response(&self) -> PldmResponse {
        PldmResponse {
            iid: self.iid,
            typ: self.typ,
            cmd: self.cmd,
            cc: CCode::SUCCESS as u8,
            data: Vec::new(),
        }
    }
}

/// Base PLDM response type
pub struct PldmResponse {
    /// PLDM Instance ID
    pub iid: InstanceId,
    /// PLDM type
    pub typ: u8,
    /// PLDM command code (defined by the original request)
    pub cmd: u8,
    /// PLDM completion code
    pub cc: u8,
    /// PLDM response data payload. Does not include the cc field.
    pub data: Vec<u8>,
}

impl Debug for PldmResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PldmResponse")
            .field("iid", &self.iid)
            .field("typ", &self.typ)
            .field("cmd", &self.cmd)
            .field("cc", &self.cc)
            .field("data.len()", &self.data.len())
            .field("data..10", &&self.data[..self.data.len().min(10)])
            .finish()
    }
}

impl PldmResponse {
    /// Create a `PldmResponse` from received message data.
    pub fn from_buf(rx_buf: &[u8]) -> Result<Self> {
        if rx_buf.len() < 4 {
            return Err(proto_error!(
                "Short response",
                "{} bytes",
                rx_buf.len()
            ));
        }

        let rq = (rx_buf[0] & RQ_BIT) != 0;
        if rq {
            return Err(proto_error!("PLDM request, expected response"));
        }

        Ok(PldmResponse {
            iid: InstanceId(rx_buf[0] & IID_MASK),
            typ: rx_buf[1] & TYP_MASK,
            cmd: rx_buf[2],
            cc: rx_buf[3],
            data: rx_buf[4..].to_vec(),
        })
    }

    /// Returns the full wire form of this response, header and completion
    /// code included.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(4 + self.data.len());
        v.push(self.iid.0 & IID_MASK);
        v.push(self.typ & TYP_MASK);
        v.push(self.cmd);
        v.push(self.cc);
        v.extend_from_slice(&self.data);
        v
    }
}
