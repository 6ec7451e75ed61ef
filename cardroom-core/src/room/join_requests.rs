//! Private-room join request manager (spec §4.4).
//!
//! Keyed within one room by requester id. Attempts are monotone and persist
//! across rejections; a successful accept removes the entry entirely.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, RoomError};
use crate::ids::UserId;

pub const JOIN_REQUEST_COOLDOWN: Duration = Duration::from_secs(5 * 60);
pub const JOIN_REQUEST_MAX_ATTEMPTS: u32 = 3;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JoinRequest {
    pub requester_id: UserId,
    pub requester_name: String,
    pub requested_at: DateTime<Utc>,
    pub attempts: u32,
}

/// Per-room rate-limited request table.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct JoinRequestTable {
    requests: HashMap<UserId, JoinRequest>,
}

impl JoinRequestTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, requester_id: UserId) -> Option<&JoinRequest> {
        self.requests.get(&requester_id)
    }

    #[must_use]
    pub fn all(&self) -> impl Iterator<Item = &JoinRequest> {
        self.requests.values()
    }

    /// Submit or resubmit a join request. Cooldown is measured from the
    /// previous `requested_at`; exceeding `JOIN_REQUEST_MAX_ATTEMPTS` raises
    /// `too_many_requests` without bumping the counter further.
    pub fn submit(
        &mut self,
        requester_id: UserId,
        requester_name: String,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if let Some(existing) = self.requests.get(&requester_id) {
            let elapsed = now.signed_duration_since(existing.requested_at);
            let cooldown = chrono::Duration::from_std(JOIN_REQUEST_COOLDOWN)
                .unwrap_or(chrono::Duration::zero());
            if elapsed < cooldown {
                let retry_after_secs = (cooldown - elapsed).num_seconds().max(0) as u64;
                return Err(RoomError::TooManyJoinRequests { retry_after_secs }.into());
            }
            if existing.attempts >= JOIN_REQUEST_MAX_ATTEMPTS {
                return Err(RoomError::TooManyJoinRequests {
                    retry_after_secs: cooldown.num_seconds().max(0) as u64,
                }
                .into());
            }
        }

        let attempts = self.requests.get(&requester_id).map_or(0, |r| r.attempts) + 1;
        self.requests.insert(
            requester_id,
            JoinRequest {
                requester_id,
                requester_name,
                requested_at: now,
                attempts,
            },
        );
        Ok(())
    }

    /// Accept deletes the entry entirely.
    pub fn accept(&mut self, requester_id: UserId) -> Result<JoinRequest, CoreError> {
        self.requests
            .remove(&requester_id)
            .ok_or_else(|| RoomError::JoinRequestNotFound.into())
    }

    /// Reject keeps the entry so the attempt counter survives.
    pub fn reject(&mut self, requester_id: UserId) -> Result<(), CoreError> {
        if self.requests.contains_key(&requester_id) {
            Ok(())
        } else {
            Err(RoomError::JoinRequestNotFound.into())
        }
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> UserId {
        UserId::new()
    }

    #[test]
    fn cooldown_blocks_rapid_resubmission() {
        let mut table = JoinRequestTable::new();
        let requester = uid();
        let t0 = Utc::now();
        table.submit(requester, "alice".into(), t0).unwrap();

        let err = table
            .submit(requester, "alice".into(), t0 + chrono::Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Room(RoomError::TooManyJoinRequests { .. })
        ));
    }

    #[test]
    fn attempts_persist_across_rejection() {
        let mut table = JoinRequestTable::new();
        let requester = uid();
        let t0 = Utc::now();
        table.submit(requester, "alice".into(), t0).unwrap();
        table.reject(requester).unwrap();

        assert_eq!(table.get(requester).unwrap().attempts, 1);

        let t1 = t0 + chrono::Duration::seconds(301);
        table.submit(requester, "alice".into(), t1).unwrap();
        assert_eq!(table.get(requester).unwrap().attempts, 2);
    }

    #[test]
    fn exceeding_max_attempts_raises_rate_limited() {
        let mut table = JoinRequestTable::new();
        let requester = uid();
        let mut t = Utc::now();
        for _ in 0..JOIN_REQUEST_MAX_ATTEMPTS {
            table.submit(requester, "alice".into(), t).unwrap();
            t += chrono::Duration::seconds(301);
        }
        let err = table.submit(requester, "alice".into(), t).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Room(RoomError::TooManyJoinRequests { .. })
        ));
    }

    #[test]
    fn accept_removes_entry() {
        let mut table = JoinRequestTable::new();
        let requester = uid();
        table.submit(requester, "alice".into(), Utc::now()).unwrap();
        table.accept(requester).unwrap();
        assert!(table.get(requester).is_none());
    }
}
