use sha2::{Digest, Sha256};

use certid_core::{Addr, Height, Timestamp, Uid};

/// SHA-256 of arbitrary bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `uid = SHA-256(definition || resolver.bytes-or-zero || revocable-byte)`.
pub fn schema_uid(definition: &str, resolver: Option<&Addr>, revocable: bool) -> Uid {
    let mut buf = Vec::with_capacity(definition.len() + 21);
    buf.extend_from_slice(definition.as_bytes());
    buf.extend_from_slice(resolver.map(Addr::as_bytes).unwrap_or(&[0u8; 20]));
    buf.push(revocable as u8);
    Uid::from_bytes(sha256(&buf))
}

/// `uid = SHA-256(attester || schemaUID || createdAt || data)`.
pub fn attestation_uid(attester: &Addr, schema_uid: &Uid, created_at: Timestamp, data: &[u8]) -> Uid {
    let mut buf = Vec::with_capacity(20 + 32 + 8 + data.len());
    buf.extend_from_slice(attester.as_bytes());
    buf.extend_from_slice(schema_uid.as_bytes());
    buf.extend_from_slice(&created_at.to_be_bytes());
    buf.extend_from_slice(data);
    Uid::from_bytes(sha256(&buf))
}

/// `uid = SHA-256(attester || schemaUID || createdAt || payloadHash)`.
pub fn encrypted_attestation_uid(
    attester: &Addr,
    schema_uid: &Uid,
    created_at: Timestamp,
    payload_hash_hex: &str,
) -> Uid {
    let mut buf = Vec::with_capacity(20 + 32 + 8 + payload_hash_hex.len());
    buf.extend_from_slice(attester.as_bytes());
    buf.extend_from_slice(schema_uid.as_bytes());
    buf.extend_from_slice(&created_at.to_be_bytes());
    buf.extend_from_slice(payload_hash_hex.as_bytes());
    Uid::from_bytes(sha256(&buf))
}

/// Badge id = `SHA-256(name)`.
pub fn badge_id(name: &str) -> Uid {
    Uid::from_bytes(sha256(name.as_bytes()))
}

/// Proof-hash commitment: `0x || hex(SHA-256(domain || ":" || key_fields ||
/// ":" || height || ":" || time))`. Domains are `"score"`, `"profile"`,
/// `"badge"`.
pub fn proof_hash(domain: &str, key_fields: &str, height: Height, time: Timestamp) -> String {
    let preimage = format!("{domain}:{key_fields}:{height}:{time}");
    format!("0x{}", hex::encode(sha256(preimage.as_bytes())))
}
