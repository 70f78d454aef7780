//! Sequential user id allocation.
//!
//! The last-issued value is a single durable counter in the KV store.
//! `KVStore::incr` commits the new value inside one storage transaction
//! before returning it, so ids are never reused — not across concurrent
//! callers and not across process restarts, even when the caller crashes
//! right after allocation.

use crate::service::{AccountsError, AccountsService};

/// Counter value below the first issued id.
pub const USER_ID_FLOOR: i64 = 1_000_004;

/// Largest id in the fixed 7-digit space.
pub const USER_ID_CEILING: i64 = 9_999_999;

const LAST_USER_ID_KEY: &str = "accounts/last_user_id";

impl AccountsService {
    /// Allocate the next 7-digit user id.
    ///
    /// A missing or corrupt counter record falls back to the floor.
    /// Exhaustion of the id space is fatal and needs operator attention.
    pub fn next_user_id(&self) -> Result<String, AccountsError> {
        let id = self
            .kv
            .incr(LAST_USER_ID_KEY, USER_ID_FLOOR)
            .map_err(|e| AccountsError::Storage(e.to_string()))?;

        if id > USER_ID_CEILING {
            return Err(AccountsError::Exhausted(
                "user id space exhausted".into(),
            ));
        }

        Ok(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;
    use roster_kv::KVStore;

    #[test]
    fn test_first_id_is_above_floor() {
        let svc = test_service();
        assert_eq!(svc.next_user_id().unwrap(), "1000005");
    }

    #[test]
    fn test_ids_strictly_increasing() {
        let svc = test_service();
        let mut previous = 0i64;
        for _ in 0..20 {
            let id: i64 = svc.next_user_id().unwrap().parse().unwrap();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_ids_are_seven_digits() {
        let svc = test_service();
        let id = svc.next_user_id().unwrap();
        assert_eq!(id.len(), 7);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_concurrent_allocations_distinct() {
        let svc = test_service();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = svc.clone();
            handles.push(std::thread::spawn(move || {
                (0..25)
                    .map(|_| svc.next_user_id().unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 8 * 25);
    }

    #[test]
    fn test_exhaustion_is_fatal() {
        let svc = test_service();
        svc.kv
            .set(super::LAST_USER_ID_KEY, b"9999999")
            .unwrap();

        let err = svc.next_user_id().unwrap_err();
        assert!(matches!(err, AccountsError::Exhausted(_)));
    }
}
