//! Request signing for the Marvel API
//!
//! Every request carries a timestamp, the public key and an MD5 digest of
//! `timestamp + private key + public key`. The concatenation has no
//! separators and the argument order must match what the service expects.

use chrono::Utc;

use super::Credentials;

/// Computes the request hash for a timestamp and key pair
///
/// Returns the lowercase hex MD5 of `timestamp + private_key + public_key`.
/// Empty keys are digested as-is; the service rejects the resulting
/// signature rather than this function failing.
pub fn sign(timestamp: &str, public_key: &str, private_key: &str) -> String {
    let mut input = String::with_capacity(timestamp.len() + private_key.len() + public_key.len());
    input.push_str(timestamp);
    input.push_str(private_key);
    input.push_str(public_key);
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Current UTC time as milliseconds since the Unix epoch
pub fn timestamp_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Authentication query parameters for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestParams {
    pub ts: String,
    pub apikey: String,
    pub hash: String,
}

impl SignedRequestParams {
    /// Signs `ts` with the given credentials
    pub fn new(ts: impl Into<String>, credentials: &Credentials) -> Self {
        let ts = ts.into();
        let hash = sign(&ts, &credentials.public_key, &credentials.private_key);
        Self {
            ts,
            apikey: credentials.public_key.clone(),
            hash,
        }
    }

    /// Query pairs in the order the service documents them
    pub fn as_query(&self) -> [(&'static str, &str); 3] {
        [
            ("ts", self.ts.as_str()),
            ("apikey", self.apikey.as_str()),
            ("hash", self.hash.as_str()),
        ]
    }
}
