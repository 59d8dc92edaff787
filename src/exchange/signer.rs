// src/exchange/signer.rs

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use url::form_urlencoded;

use crate::utils::now_millis;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_PARAM: &str = "timestamp";
pub const SIGNATURE_PARAM: &str = "signature";

/// Ordered request parameters. Serialization order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Multi-value parameter, encoded as `key=v1&key=v2`.
    pub fn push_all<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.push(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Canonical `application/x-www-form-urlencoded` form.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Result of signing: the exact bytes that were MACed plus the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    payload: String,
    signature: String,
    timestamp: i64,
}

impl SignedQuery {
    /// Canonical query string including `timestamp`, without `signature`.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Wire form: payload with `signature` appended last.
    pub fn into_query_string(self) -> String {
        format!("{}&{}={}", self.payload, SIGNATURE_PARAM, self.signature)
    }
}

/// HMAC-SHA256 request signer keyed with the account secret.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Lower-case hex HMAC-SHA256 of `payload`.
    pub fn signature(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Signs with a timestamp taken now.
    pub fn sign(&self, params: QueryParams) -> SignedQuery {
        self.sign_at(params, now_millis())
    }

    /// Signs with the given millisecond timestamp. Any caller-supplied
    /// `timestamp`/`signature` entries are dropped first.
    pub fn sign_at(&self, mut params: QueryParams, timestamp: i64) -> SignedQuery {
        params.remove(TIMESTAMP_PARAM);
        params.remove(SIGNATURE_PARAM);
        params.push(TIMESTAMP_PARAM, timestamp.to_string());

        let payload = params.to_query_string();
        let signature = self.signature(&payload);
        SignedQuery {
            payload,
            signature,
            timestamp,
        }
    }

    /// Query string or form body for an outbound call.
    pub fn encode(&self, params: QueryParams, signed: bool) -> String {
        if signed {
            self.sign(params).into_query_string()
        } else {
            params.to_query_string()
        }
    }
}
