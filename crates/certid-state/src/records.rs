//! The stored record types of the two cooperating modules: schemas,
//! attestations, identity profiles, soulbound badges, oracle authorizations,
//! and trust-score snapshots. Every cross-reference between these records is
//! by `Uid`/`Addr`, never by pointer — a presence-marker index, not a
//! pointer, links an attester to their attestations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use certid_core::{Addr, Timestamp, Uid};

// ── Schema ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schema {
    pub uid: Uid,
    pub creator: Addr,
    pub definition: String,
    pub resolver: Option<Addr>,
    pub revocable: bool,
}

// ── Attestation ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AttestationKind {
    Public,
    Encrypted {
        payload_ref: String,
        payload_hash: String,
        recipients: Vec<Addr>,
        wrapped_keys: BTreeMap<Addr, Vec<u8>>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attestation {
    pub uid: Uid,
    pub schema_uid: Uid,
    pub attester: Addr,
    pub recipient: Option<Addr>,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub revocable: bool,
    pub ref_uid: Option<Uid>,
    pub data: Vec<u8>,
    pub kind: AttestationKind,
}

impl Attestation {
    pub fn is_encrypted(&self) -> bool {
        matches!(self.kind, AttestationKind::Encrypted { .. })
    }

    /// Read-time predicate only — expiry never mutates the stored record.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(exp) if now > exp)
    }

    pub fn recipients(&self) -> &[Addr] {
        match &self.kind {
            AttestationKind::Public => &[],
            AttestationKind::Encrypted { recipients, .. } => recipients,
        }
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Individual,
    Institution,
    SystemAdmin,
    Bot,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Badge {
    pub id: Uid,
    pub name: String,
    pub description: String,
    pub awarded_at: Timestamp,
    pub awarded_by: Addr,
    pub is_revoked: bool,
    pub revoked_at: Option<Timestamp>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub address: Addr,
    pub handle: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_ref: Option<String>,
    pub public_key: Option<Vec<u8>>,
    pub social_links: BTreeMap<String, String>,
    pub credentials: Vec<Uid>,
    /// Keyed by content-derived badge id (`SHA-256(name)`).
    pub badges: BTreeMap<Uid, Badge>,
    pub entity_type: EntityType,
    pub trust_score: u8,
    pub verified: bool,
    pub verification_level: u8,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub attestation_uid: Option<Uid>,
}

// ── Oracle roster ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleAuthorization {
    pub address: Addr,
    pub is_authorized: bool,
    pub granted_at: Timestamp,
    pub granted_by: Addr,
}

// ── Trust-score result ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub hardware: u8,
    pub social: u8,
    pub onchain: u8,
    pub fee: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrustScoreResult {
    pub address: Addr,
    pub score: u8,
    pub components: ScoreComponents,
    pub sybil_multiplier: f64,
    pub is_verified_human: bool,
    pub computed_at: Timestamp,
}
