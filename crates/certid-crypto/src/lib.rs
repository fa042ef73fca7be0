pub mod hash;

pub use hash::{attestation_uid, badge_id, encrypted_attestation_uid, proof_hash, schema_uid, sha256};
