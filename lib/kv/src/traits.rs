use crate::error::KVError;

/// KVStore provides durable key-value storage for small control records.
///
/// Keys follow a namespaced convention: `accounts/last_user_id`, etc.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Atomically increment a durable decimal counter and return the new
    /// value.
    ///
    /// The read-modify-write happens inside a single storage transaction:
    /// two concurrent callers can never observe the same value, and the new
    /// value is committed before it is returned. A missing or unparseable
    /// record counts as `start`, so the first call returns `start + 1`.
    fn incr(&self, key: &str, start: i64) -> Result<i64, KVError>;
}
