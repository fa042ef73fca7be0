//! certid-genesis
//!
//! Builds the CertID core's genesis state and implements the GenesisCodec of
//! spec §4.8: exporting the full state to a human-diffable JSON file and
//! re-importing it into a fresh instance, rebuilding every secondary index
//! and counter rather than trusting them from the file.
//!
//! Genesis writes directly into a `StateDb`, bypassing the transaction
//! engine entirely — genesis records have no signer to authenticate and no
//! prior state to validate against, so nothing here goes through the
//! module router.

pub mod params;

pub use params::GenesisParams;

use serde::{Deserialize, Serialize};
use tracing::info;

use certid_core::CertIdError;
use certid_state::{
    Attestation, AttestationKind, OracleAuthorization, Profile, Schema, StateDb, TrustScoreResult,
};

/// Apply genesis to a fresh `StateDb`: registers the CertID self-attestation
/// schema (spec §4.4.1, §9) and seeds the initial oracle roster.
///
/// # Errors
/// Returns `CertIdError::GenesisNotEmpty` if the database already holds any
/// records — genesis may only be applied once. Per spec §7, genesis
/// validation errors are fatal: the caller (`certid-node`) must refuse to
/// start rather than proceed on a partially-seeded store.
pub fn apply_genesis(db: &StateDb, params: &GenesisParams) -> Result<(), CertIdError> {
    if !db.is_empty() {
        return Err(CertIdError::GenesisNotEmpty);
    }

    info!("applying CertID genesis state");

    db.set_authority(&params.authority)?;

    let schema_uid = certid_crypto::schema_uid(&params.certid_schema_definition, None, false);
    let schema = Schema {
        uid: schema_uid,
        creator: params.authority.clone(),
        definition: params.certid_schema_definition.clone(),
        resolver: None,
        revocable: false,
    };
    db.put_schema(&schema)?;
    db.set_certid_schema_uid(&schema_uid)?;
    info!(schema_uid = %schema_uid, "genesis: CertID self-attestation schema registered");

    for oracle in &params.initial_oracles {
        db.put_oracle(&OracleAuthorization {
            address: oracle.clone(),
            is_authorized: true,
            granted_at: GENESIS_TIMESTAMP,
            granted_by: params.authority.clone(),
        })?;
    }
    if !params.initial_oracles.is_empty() {
        info!(count = params.initial_oracles.len(), "genesis: initial oracle roster seeded");
    }

    db.flush()?;
    info!("genesis state committed to disk");
    Ok(())
}

/// Wall-clock stand-in for genesis records, which predate any block context
/// a host could supply. Not a protocol constant — just the timestamp genesis
/// itself happened at.
pub const GENESIS_TIMESTAMP: certid_core::Timestamp = 0;

// ── GenesisCodec (spec §4.8) ─────────────────────────────────────────────────

/// The full exportable core state. Field order matches the import order
/// spec §4.8 mandates: schemas, attestations (public and encrypted
/// interleaved — `AttestationKind` already carries the distinction, so one
/// ordered list suffices for both "attestations" and "encrypted
/// attestations" stages), profiles (badges travel embedded in `Profile`),
/// oracles, trust-scores.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenesisState {
    pub schemas: Vec<Schema>,
    pub attestations: Vec<Attestation>,
    pub profiles: Vec<Profile>,
    pub oracles: Vec<OracleAuthorization>,
    pub trust_results: Vec<TrustScoreResult>,
    /// The genesis-computed CertID self-attestation schema uid, if one was
    /// registered (spec §4.4.1, §9).
    pub certid_schema_uid: Option<certid_core::Uid>,
    /// The module authority address fixed at genesis.
    pub authority: Option<certid_core::Addr>,
}

/// Export every record in `db` into a `GenesisState` snapshot.
pub fn export_genesis(db: &StateDb) -> Result<GenesisState, CertIdError> {
    Ok(GenesisState {
        schemas: db.iter_schemas()?,
        attestations: db.iter_attestations()?,
        profiles: db.iter_profiles()?,
        oracles: db.iter_oracles()?,
        trust_results: db.iter_trust_results()?,
        certid_schema_uid: db.certid_schema_uid()?,
        authority: db.authority()?,
    })
}

/// Import a `GenesisState` snapshot into a fresh `StateDb`, applying records
/// in the fixed order spec §4.8 specifies and rebuilding every secondary
/// index as it goes — indexes and counters are never trusted from the file,
/// only the primary records are.
///
/// # Errors
/// Returns `CertIdError::GenesisNotEmpty` if `db` is not empty.
pub fn import_genesis(db: &StateDb, state: &GenesisState) -> Result<(), CertIdError> {
    if !db.is_empty() {
        return Err(CertIdError::GenesisNotEmpty);
    }

    info!(
        schemas = state.schemas.len(),
        attestations = state.attestations.len(),
        profiles = state.profiles.len(),
        oracles = state.oracles.len(),
        trust_results = state.trust_results.len(),
        "importing genesis snapshot"
    );

    for schema in &state.schemas {
        db.put_schema(schema)?;
    }

    for attestation in &state.attestations {
        db.put_attestation(attestation)?;
        db.add_by_attester(&attestation.attester, &attestation.uid)?;
        db.add_by_schema(&attestation.schema_uid, &attestation.uid)?;
        if let Some(recipient) = &attestation.recipient {
            db.add_by_recipient(recipient, &attestation.uid)?;
        }
        if let AttestationKind::Encrypted { payload_ref, recipients, .. } = &attestation.kind {
            db.add_by_payload_ref(payload_ref, &attestation.uid)?;
            for recipient in recipients {
                db.add_by_recipient(recipient, &attestation.uid)?;
            }
        }
    }

    for profile in &state.profiles {
        db.put_profile(profile)?;
        if let Some(handle) = &profile.handle {
            db.set_handle(handle, &profile.address)?;
        }
    }

    for oracle in &state.oracles {
        db.put_oracle(oracle)?;
    }

    for result in &state.trust_results {
        db.put_trust_result(result)?;
    }

    if let Some(schema_uid) = &state.certid_schema_uid {
        db.set_certid_schema_uid(schema_uid)?;
    }

    if let Some(authority) = &state.authority {
        db.set_authority(authority)?;
    }

    db.flush()?;
    info!("genesis snapshot imported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use certid_core::Addr;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("certid_genesis_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    #[test]
    fn genesis_registers_certid_schema() {
        let db = temp_db("registers_schema");
        let params = GenesisParams {
            authority: Addr::from_bytes([1u8; 20]),
            ..Default::default()
        };
        apply_genesis(&db, &params).unwrap();

        let uid = db.certid_schema_uid().unwrap().expect("schema uid recorded");
        assert!(db.get_schema(&uid).unwrap().is_some());
    }

    #[test]
    fn genesis_may_only_be_applied_once() {
        let db = temp_db("applied_once");
        let params = GenesisParams::default();
        apply_genesis(&db, &params).unwrap();
        let err = apply_genesis(&db, &params).unwrap_err();
        assert_eq!(err.kind(), "Internal");
    }

    #[test]
    fn export_import_round_trips() {
        // Mirrors the genesis round-trip property (spec §8 property 10).
        let db1 = temp_db("roundtrip_src");
        let params = GenesisParams {
            authority: Addr::from_bytes([2u8; 20]),
            initial_oracles: vec![Addr::from_bytes([3u8; 20])],
            ..Default::default()
        };
        apply_genesis(&db1, &params).unwrap();

        let ctx = certid_core::BlockContext { height: 1, time: 1000, authority: params.authority.clone() };
        let mut sink = certid_core::VecEventSink::default();
        certid_state::engine::apply(
            &db1,
            &ctx,
            &mut sink,
            &certid_core::Message {
                signer: params.authority.clone(),
                action: certid_core::Action::CreateProfile {
                    name: Some("Alice".into()),
                    bio: None,
                    avatar_ref: None,
                    public_key: None,
                    social_links: None,
                },
            },
        )
        .unwrap();

        let snapshot = export_genesis(&db1).unwrap();

        let db2 = temp_db("roundtrip_dst");
        import_genesis(&db2, &snapshot).unwrap();

        assert_eq!(db1.certid_schema_uid().unwrap(), db2.certid_schema_uid().unwrap());
        assert_eq!(db1.iter_schemas().unwrap().len(), db2.iter_schemas().unwrap().len());
        assert_eq!(db1.iter_attestations().unwrap().len(), db2.iter_attestations().unwrap().len());
        assert_eq!(db1.iter_profiles().unwrap().len(), db2.iter_profiles().unwrap().len());
        assert_eq!(db1.iter_oracles().unwrap().len(), db2.iter_oracles().unwrap().len());
    }
}
