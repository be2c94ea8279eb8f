// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM instance id allocation.
 *
 * Copyright (c) 2025 Code Construct
 */

//! Per-endpoint allocation of the 5-bit PLDM instance id.
//!
//! A requester must not reuse an instance id while a request carrying it is
//! outstanding to the same endpoint. [`InstanceIdDb`] hands out ids from a
//! 32-entry pool per endpoint; ids return to the pool when the matching
//! response arrives, when encoding fails after allocation, or when a
//! cancellation path acknowledges the freed tag.

use std::collections::HashMap;
use std::sync::Mutex;

#[allow(unused)]
use log::{debug, error, info, trace, warn};

use crate::{Eid, InstanceId, PldmError, Result, PLDM_NUM_INSTANCE_IDS};

/// Process-wide instance id allocator.
///
/// Shared across all endpoints, partitioned by endpoint id. Safe to call
/// from multiple threads; the firmware update and event paths here only ever
/// use it from the event loop thread.
#[derive(Debug, Default)]
pub struct InstanceIdDb {
    // bit n set means id n is outstanding for that endpoint
    pools: Mutex<HashMap<Eid, u32>>,
}

impl InstanceIdDb {
    /// Constructs an allocator with all ids free for every endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the lowest free instance id for `eid`.
    ///
    /// Exhaustion is a recoverable condition; the caller abandons the
    /// request attempt rather than sending with a fabricated id.
    pub fn next(&self, eid: Eid) -> Result<InstanceId> {
        let mut pools = self.lock();
        let pool = pools.entry(eid).or_insert(0);
        let free = (!*pool).trailing_zeros();
        if free >= PLDM_NUM_INSTANCE_IDS as u32 {
            return Err(PldmError::InstanceIdExhausted(eid));
        }
        *pool |= 1 << free;
        Ok(InstanceId(free as u8))
    }

    /// Returns `iid` to the pool for `eid`.
    ///
    /// Freeing an id that is not allocated is an error, surfaced so that
    /// double-release bugs show up rather than silently corrupting the pool.
    pub fn free(&self, eid: Eid, iid: InstanceId) -> Result<()> {
        if iid.0 >= PLDM_NUM_INSTANCE_IDS {
            return Err(PldmError::InvalidArgument);
        }
        let mut pools = self.lock();
        let pool = pools.entry(eid).or_insert(0);
        let bit = 1u32 << iid.0;
        if *pool & bit == 0 {
            return Err(PldmError::InstanceIdNotAllocated(eid, iid));
        }
        *pool &= !bit;
        Ok(())
    }

    /// Number of ids currently outstanding for `eid`.
    pub fn outstanding(&self, eid: Eid) -> u32 {
        self.lock().get(&eid).copied().unwrap_or(0).count_ones()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Eid, u32>> {
        self.pools.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use crate::instance_id::*;

    const EID: Eid = Eid(9);

    #[test]
    fn alloc_free() {
        let db = InstanceIdDb::new();
        let a = db.next(EID).unwrap();
        let b = db.next(EID).unwrap();
        assert_ne!(a, b);
        assert_eq!(db.outstanding(EID), 2);

        db.free(EID, a).unwrap();
        assert_eq!(db.outstanding(EID), 1);
        // the freed id is reissued
        assert_eq!(db.next(EID).unwrap(), a);
    }

    #[test]
    fn exhaustion() {
        let db = InstanceIdDb::new();
        for n in 0..PLDM_NUM_INSTANCE_IDS {
            assert_eq!(db.next(EID).unwrap(), InstanceId(n));
        }
        assert!(matches!(
            db.next(EID),
            Err(PldmError::InstanceIdExhausted(_))
        ));
        // other endpoints are unaffected
        db.next(Eid(10)).unwrap();

        db.free(EID, InstanceId(17)).unwrap();
        assert_eq!(db.next(EID).unwrap(), InstanceId(17));
    }

    #[test]
    fn double_free() {
        let db = InstanceIdDb::new();
        let a = db.next(EID).unwrap();
        db.free(EID, a).unwrap();
        assert!(matches!(
            db.free(EID, a),
            Err(PldmError::InstanceIdNotAllocated(_, _))
        ));
        assert!(db.free(EID, InstanceId(32)).is_err());
    }
}
