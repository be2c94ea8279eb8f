// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM outbound request pipeline.
 *
 * Copyright (c) 2025 Code Construct
 */

//! Outbound request pipeline.
//!
//! A requester allocates an instance id, encodes its request, and hands the
//! message to [`Handler::register_request`] together with a response
//! callback. When the transport delivers a matching response the callback
//! runs exactly once, after the instance id has been returned to the
//! allocator. Transport delivery failures surface through
//! [`Handler::fail_request`] as a callback with no response.
//!
//! There is no retry at this layer; retries are the caller's policy.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use crate::instance_id::InstanceIdDb;
use crate::{Eid, InstanceId, PldmError, PldmRequest, PldmResponse, Result};

/// Delivers encoded PLDM messages to an endpoint.
///
/// Implemented over the host's MCTP stack; tests use an in-memory loopback.
/// `send` queues the message for delivery, it does not wait for a response.
pub trait Transport {
    /// Sends one encoded PLDM message (header included) to `eid`.
    fn send(&mut self, eid: Eid, msg: &[u8]) -> Result<()>;
}

/// Callback invoked with the response for a registered request.
///
/// Called exactly once: with `Some` when a matching response arrives, with
/// `None` when the transport reports delivery failure. The instance id has
/// already been released when the callback runs.
pub type ResponseCallback = Box<dyn FnOnce(Eid, Option<&PldmResponse>)>;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct RequestKey {
    eid: Eid,
    iid: InstanceId,
    typ: u8,
    cmd: u8,
}

/// Pairs outbound requests with their response callbacks.
///
/// Pending transactions are keyed by `(eid, instance id, type, command)`.
/// Responses for different transactions may interleave; each callback runs
/// on the event loop thread when its response is dispatched.
pub struct Handler {
    transport: RefCell<Box<dyn Transport>>,
    iid_db: Rc<InstanceIdDb>,
    pending: RefCell<HashMap<RequestKey, ResponseCallback>>,
}

impl Handler {
    /// Constructs a pipeline over `transport`.
    ///
    /// The allocator reference is used to release instance ids as
    /// transactions complete.
    pub fn new(transport: Box<dyn Transport>, iid_db: Rc<InstanceIdDb>) -> Self {
        Self {
            transport: RefCell::new(transport),
            iid_db,
            pending: RefCell::new(HashMap::new()),
        }
    }

    /// Sends a request and records the pending transaction.
    ///
    /// On any failure the instance id is returned to the allocator before
    /// the error is reported, so a caller that abandons the operation leaks
    /// nothing.
    pub fn register_request(
        &self,
        eid: Eid,
        iid: InstanceId,
        typ: u8,
        cmd: u8,
        payload: Vec<u8>,
        on_response: ResponseCallback,
    ) -> Result<()> {
        let key = RequestKey { eid, iid, typ, cmd };

        if self.pending.borrow().contains_key(&key) {
            self.release(eid, iid);
            return Err(PldmError::DuplicateRequest(eid, iid));
        }

        let req = PldmRequest {
            iid,
            typ,
            cmd,
            data: payload,
        };
        trace!("tx {eid} {req:?}");

        if let Err(e) = self.transport.borrow_mut().send(eid, &req.to_vec()) {
            self.release(eid, iid);
            return Err(e);
        }

        self.pending.borrow_mut().insert(key, on_response);
        Ok(())
    }

    /// Dispatches a response received from the transport.
    ///
    /// An unmatched response is logged and dropped; spurious traffic must
    /// not complete somebody else's transaction.
    pub fn handle_response(&self, eid: Eid, msg: &[u8]) -> Result<()> {
        let rsp = PldmResponse::from_buf(msg)?;
        let key = RequestKey {
            eid,
            iid: rsp.iid,
            typ: rsp.typ,
            cmd: rsp.cmd,
        };

        // the table borrow must end before the callback runs, as the
        // callback may register a follow-up request
        let cb = self.pending.borrow_mut().remove(&key);
        let Some(cb) = cb else {
            debug!(
                "Unmatched response from {eid}: iid {} type {:02x} cmd {:02x}",
                rsp.iid, rsp.typ, rsp.cmd
            );
            return Ok(());
        };

        self.release(eid, rsp.iid);
        cb(eid, Some(&rsp));
        Ok(())
    }

    /// Reports transport-level delivery failure for a registered request.
    ///
    /// The callback runs with no response; the instance id is released.
    pub fn fail_request(&self, eid: Eid, iid: InstanceId, typ: u8, cmd: u8) {
        let key = RequestKey { eid, iid, typ, cmd };
        let cb = self.pending.borrow_mut().remove(&key);
        let Some(cb) = cb else {
            debug!("Delivery failure for unknown request to {eid}");
            return;
        };

        self.release(eid, iid);
        cb(eid, None);
    }

    /// Number of transactions awaiting a response for `eid`.
    pub fn pending_for(&self, eid: Eid) -> usize {
        self.pending.borrow().keys().filter(|k| k.eid == eid).count()
    }

    fn release(&self, eid: Eid, iid: InstanceId) {
        if let Err(e) = self.iid_db.free(eid, iid) {
            warn!("Instance id release failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EID: Eid = Eid(8);

    type Sent = Rc<RefCell<Vec<(Eid, Vec<u8>)>>>;

    struct LoopTransport {
        sent: Sent,
        fail: bool,
    }

    impl Transport for LoopTransport {
        fn send(&mut self, eid: Eid, msg: &[u8]) -> Result<()> {
            if self.fail {
                return Err(PldmError::Transport("loopback closed".into()));
            }
            self.sent.borrow_mut().push((eid, msg.to_vec()));
            Ok(())
        }
    }

    fn pipeline(fail: bool) -> (Rc<InstanceIdDb>, Handler, Sent) {
        let sent: Sent = Rc::default();
        let db = Rc::new(InstanceIdDb::new());
        let handler = Handler::new(
            Box::new(LoopTransport {
                sent: sent.clone(),
                fail,
            }),
            db.clone(),
        );
        (db, handler, sent)
    }

    #[test]
    fn response_dispatch() {
        let (db, handler, sent) = pipeline(false);
        let iid = db.next(EID).unwrap();

        let got = Rc::new(RefCell::new(None));
        let g = got.clone();
        handler
            .register_request(
                EID,
                iid,
                0x05,
                0x10,
                vec![0xaa],
                Box::new(move |eid, rsp| {
                    *g.borrow_mut() = Some((eid, rsp.unwrap().cc));
                }),
            )
            .unwrap();

        assert_eq!(sent.borrow().len(), 1);
        assert_eq!(sent.borrow()[0].1, [0x80 | iid.0, 0x05, 0x10, 0xaa]);
        assert_eq!(handler.pending_for(EID), 1);
        assert_eq!(db.outstanding(EID), 1);

        handler
            .handle_response(EID, &[iid.0, 0x05, 0x10, 0x00])
            .unwrap();
        assert_eq!(*got.borrow(), Some((EID, 0)));
        assert_eq!(handler.pending_for(EID), 0);
        // id released on completion
        assert_eq!(db.outstanding(EID), 0);
    }

    #[test]
    fn unmatched_response_dropped() {
        let (db, handler, _sent) = pipeline(false);
        let iid = db.next(EID).unwrap();

        let called = Rc::new(RefCell::new(false));
        let c = called.clone();
        handler
            .register_request(
                EID,
                iid,
                0x05,
                0x10,
                vec![],
                Box::new(move |_, _| *c.borrow_mut() = true),
            )
            .unwrap();

        // wrong command
        handler
            .handle_response(EID, &[iid.0, 0x05, 0x13, 0x00])
            .unwrap();
        // wrong endpoint
        handler
            .handle_response(Eid(99), &[iid.0, 0x05, 0x10, 0x00])
            .unwrap();
        assert!(!*called.borrow());
        assert_eq!(handler.pending_for(EID), 1);
    }

    #[test]
    fn send_failure_releases_id() {
        let (db, handler, _sent) = pipeline(true);
        let iid = db.next(EID).unwrap();

        let r = handler.register_request(
            EID,
            iid,
            0x05,
            0x10,
            vec![],
            Box::new(|_, _| panic!("callback after failed send")),
        );
        assert!(matches!(r, Err(PldmError::Transport(_))));
        assert_eq!(db.outstanding(EID), 0);
        assert_eq!(handler.pending_for(EID), 0);
    }

    #[test]
    fn delivery_failure_callback() {
        let (db, handler, _sent) = pipeline(false);
        let iid = db.next(EID).unwrap();

        let got = Rc::new(RefCell::new(false));
        let g = got.clone();
        handler
            .register_request(
                EID,
                iid,
                0x02,
                0x0a,
                vec![],
                Box::new(move |_, rsp| *g.borrow_mut() = rsp.is_none()),
            )
            .unwrap();

        handler.fail_request(EID, iid, 0x02, 0x0a);
        assert!(*got.borrow());
        assert_eq!(db.outstanding(EID), 0);
    }
}
