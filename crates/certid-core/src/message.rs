//! The module router's dispatch input: one `Action` variant per transaction
//! kind in the external interface table, wrapped in a `Message` that carries
//! the signer the host has already authenticated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Addr, Timestamp, Uid};

/// A submitted transaction: `signer` is the address the host has already
/// verified the signature against — handlers never re-check authentication,
/// only authorization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub signer: Addr,
    pub action: Action,
}

/// One variant per row of the transaction surface table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    RegisterSchema {
        definition: String,
        revocable: bool,
        resolver: Option<Addr>,
    },
    Attest {
        schema_uid: Uid,
        data: Vec<u8>,
        recipient: Option<Addr>,
        expires_at: Option<Timestamp>,
        revocable: bool,
        ref_uid: Option<Uid>,
    },
    Revoke {
        uid: Uid,
    },
    CreateEncryptedAttestation {
        schema_uid: Uid,
        payload_ref: String,
        payload_hash: String,
        recipients: Vec<Addr>,
        wrapped_keys: BTreeMap<Addr, Vec<u8>>,
        revocable: bool,
        expires_at: Option<Timestamp>,
    },
    CreateProfile {
        name: Option<String>,
        bio: Option<String>,
        avatar_ref: Option<String>,
        public_key: Option<Vec<u8>>,
        social_links: Option<BTreeMap<String, String>>,
    },
    UpdateProfile {
        name: Option<String>,
        bio: Option<String>,
        avatar_ref: Option<String>,
        public_key: Option<Vec<u8>>,
        social_links: Option<BTreeMap<String, String>>,
    },
    RegisterHandle {
        handle: String,
    },
    AddCredential {
        attestation_uid: Uid,
    },
    RemoveCredential {
        attestation_uid: Uid,
    },
    VerifySocial {
        platform: String,
        handle: String,
        proof: String,
    },
    AwardBadge {
        user: Addr,
        badge_name: String,
        description: String,
    },
    RevokeBadge {
        user: Addr,
        badge_name: String,
    },
    UpdateTrustScore {
        user: Addr,
        score: u8,
    },
    SetVerificationStatus {
        user: Addr,
        verified: bool,
    },
    AuthorizeOracle {
        oracle: Addr,
    },
    RevokeOracle {
        oracle: Addr,
    },
}

impl Action {
    /// Short name used in log lines and error context — mirrors the
    /// variant name without the surrounding `Action::` noise.
    pub fn name(&self) -> &'static str {
        match self {
            Action::RegisterSchema { .. } => "RegisterSchema",
            Action::Attest { .. } => "Attest",
            Action::Revoke { .. } => "Revoke",
            Action::CreateEncryptedAttestation { .. } => "CreateEncryptedAttestation",
            Action::CreateProfile { .. } => "CreateProfile",
            Action::UpdateProfile { .. } => "UpdateProfile",
            Action::RegisterHandle { .. } => "RegisterHandle",
            Action::AddCredential { .. } => "AddCredential",
            Action::RemoveCredential { .. } => "RemoveCredential",
            Action::VerifySocial { .. } => "VerifySocial",
            Action::AwardBadge { .. } => "AwardBadge",
            Action::RevokeBadge { .. } => "RevokeBadge",
            Action::UpdateTrustScore { .. } => "UpdateTrustScore",
            Action::SetVerificationStatus { .. } => "SetVerificationStatus",
            Action::AuthorizeOracle { .. } => "AuthorizeOracle",
            Action::RevokeOracle { .. } => "RevokeOracle",
        }
    }
}
