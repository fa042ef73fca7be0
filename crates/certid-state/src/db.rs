use std::path::Path;

use certid_core::{Addr, CertIdError, Uid};

use crate::records::Attestation;
use crate::records::{OracleAuthorization, Profile, Schema, TrustScoreResult};

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees, one per module prefix:
///   schemas          — uid bytes      → bincode(Schema)
///   attestations     — uid bytes      → bincode(Attestation)
///   profiles         — address bytes  → bincode(Profile)
///   oracles          — address bytes  → bincode(OracleAuthorization)
///   trust_results    — address bytes  → bincode(TrustScoreResult)
///   by_attester      — attester||uid  → []  (presence marker)
///   by_recipient     — recipient||uid → []  (presence marker)
///   by_schema        — schemaUid||uid → []  (presence marker)
///   by_payload_ref   — payloadRef     → uid bytes (unique)
///   by_handle        — handle bytes   → address bytes (unique)
///   meta             — arbitrary small config values (e.g. the genesis-
///                      computed CertID self-attestation schema uid)
pub struct StateDb {
    db: sled::Db,
    schemas: sled::Tree,
    attestations: sled::Tree,
    profiles: sled::Tree,
    oracles: sled::Tree,
    trust_results: sled::Tree,
    by_attester: sled::Tree,
    by_recipient: sled::Tree,
    by_schema: sled::Tree,
    by_payload_ref: sled::Tree,
    by_handle: sled::Tree,
    meta: sled::Tree,
}

fn storage_err(e: sled::Error) -> CertIdError {
    CertIdError::Storage(e.to_string())
}

fn ser<T: serde::Serialize>(v: &T) -> Result<Vec<u8>, CertIdError> {
    bincode::serialize(v).map_err(|e| CertIdError::Serialization(e.to_string()))
}

fn de<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CertIdError> {
    bincode::deserialize(bytes).map_err(|e| CertIdError::Serialization(e.to_string()))
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CertIdError> {
        let db = sled::open(path).map_err(storage_err)?;
        let schemas = db.open_tree("schemas").map_err(storage_err)?;
        let attestations = db.open_tree("attestations").map_err(storage_err)?;
        let profiles = db.open_tree("profiles").map_err(storage_err)?;
        let oracles = db.open_tree("oracles").map_err(storage_err)?;
        let trust_results = db.open_tree("trust_results").map_err(storage_err)?;
        let by_attester = db.open_tree("by_attester").map_err(storage_err)?;
        let by_recipient = db.open_tree("by_recipient").map_err(storage_err)?;
        let by_schema = db.open_tree("by_schema").map_err(storage_err)?;
        let by_payload_ref = db.open_tree("by_payload_ref").map_err(storage_err)?;
        let by_handle = db.open_tree("by_handle").map_err(storage_err)?;
        let meta = db.open_tree("meta").map_err(storage_err)?;
        Ok(Self {
            db,
            schemas,
            attestations,
            profiles,
            oracles,
            trust_results,
            by_attester,
            by_recipient,
            by_schema,
            by_payload_ref,
            by_handle,
            meta,
        })
    }

    const CERTID_SCHEMA_UID_KEY: &'static [u8] = b"certid_schema_uid";

    /// The schema uid genesis pre-registers for profile self-attestations, if
    /// any. `CreateProfile` consults this to decide whether to mint a
    /// self-attestation alongside the new profile (spec §4.4.1).
    pub fn certid_schema_uid(&self) -> Result<Option<Uid>, CertIdError> {
        match self.meta.get(Self::CERTID_SCHEMA_UID_KEY).map_err(storage_err)? {
            Some(bytes) => Ok(Some(uid_from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_certid_schema_uid(&self, uid: &Uid) -> Result<(), CertIdError> {
        self.meta
            .insert(Self::CERTID_SCHEMA_UID_KEY, uid.as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }

    const AUTHORITY_KEY: &'static [u8] = b"authority";

    /// The module authority address, fixed at genesis (spec §9 "Authority
    /// and oracles"). `certid-node` reads this back on every restart so the
    /// `BlockContext` it builds for later blocks carries the same authority
    /// genesis configured, not whatever the CLI happened to be passed.
    pub fn authority(&self) -> Result<Option<Addr>, CertIdError> {
        match self.meta.get(Self::AUTHORITY_KEY).map_err(storage_err)? {
            Some(bytes) => {
                if bytes.len() != 20 {
                    return Err(CertIdError::Storage("corrupt authority entry".into()));
                }
                let mut arr = [0u8; 20];
                arr.copy_from_slice(&bytes);
                Ok(Some(Addr::from_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_authority(&self, authority: &Addr) -> Result<(), CertIdError> {
        self.meta.insert(Self::AUTHORITY_KEY, authority.as_bytes()).map_err(storage_err)?;
        Ok(())
    }

    /// True iff the database holds no records at all — the signal `certid-node`
    /// uses to decide whether to apply genesis.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.attestations.is_empty()
            && self.profiles.is_empty()
            && self.oracles.is_empty()
    }

    pub fn flush(&self) -> Result<(), CertIdError> {
        self.db.flush().map_err(storage_err)?;
        Ok(())
    }

    // ── Schemas ──────────────────────────────────────────────────────────────

    pub fn get_schema(&self, uid: &Uid) -> Result<Option<Schema>, CertIdError> {
        match self.schemas.get(uid.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn schema_exists(&self, uid: &Uid) -> bool {
        self.schemas.contains_key(uid.as_bytes()).unwrap_or(false)
    }

    pub fn put_schema(&self, schema: &Schema) -> Result<(), CertIdError> {
        self.schemas
            .insert(schema.uid.as_bytes(), ser(schema)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn count_schemas(&self) -> u64 {
        self.schemas.len() as u64
    }

    pub fn iter_schemas(&self) -> Result<Vec<Schema>, CertIdError> {
        let mut out = Vec::new();
        for item in self.schemas.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(de(&bytes)?);
        }
        Ok(out)
    }

    // ── Attestations ─────────────────────────────────────────────────────────

    pub fn get_attestation(&self, uid: &Uid) -> Result<Option<Attestation>, CertIdError> {
        match self.attestations.get(uid.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn attestation_exists(&self, uid: &Uid) -> bool {
        self.attestations.contains_key(uid.as_bytes()).unwrap_or(false)
    }

    pub fn put_attestation(&self, att: &Attestation) -> Result<(), CertIdError> {
        self.attestations
            .insert(att.uid.as_bytes(), ser(att)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn count_attestations(&self) -> u64 {
        self.attestations.len() as u64
    }

    pub fn count_encrypted_attestations(&self) -> Result<u64, CertIdError> {
        let mut n = 0u64;
        for item in self.attestations.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let att: Attestation = de(&bytes)?;
            if att.is_encrypted() {
                n += 1;
            }
        }
        Ok(n)
    }

    pub fn iter_attestations(&self) -> Result<Vec<Attestation>, CertIdError> {
        let mut out = Vec::new();
        for item in self.attestations.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(de(&bytes)?);
        }
        Ok(out)
    }

    // ── Indexes: byAttester / byRecipient / bySchema ────────────────────────

    fn index_key(prefix: &[u8], uid: &Uid) -> Vec<u8> {
        let mut key = Vec::with_capacity(prefix.len() + 32);
        key.extend_from_slice(prefix);
        key.extend_from_slice(uid.as_bytes());
        key
    }

    pub fn add_by_attester(&self, attester: &Addr, uid: &Uid) -> Result<(), CertIdError> {
        self.by_attester
            .insert(Self::index_key(attester.as_bytes(), uid), &[])
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn add_by_recipient(&self, recipient: &Addr, uid: &Uid) -> Result<(), CertIdError> {
        self.by_recipient
            .insert(Self::index_key(recipient.as_bytes(), uid), &[])
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn add_by_schema(&self, schema_uid: &Uid, uid: &Uid) -> Result<(), CertIdError> {
        self.by_schema
            .insert(Self::index_key(schema_uid.as_bytes(), uid), &[])
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn has_by_attester(&self, attester: &Addr, uid: &Uid) -> bool {
        self.by_attester
            .contains_key(Self::index_key(attester.as_bytes(), uid))
            .unwrap_or(false)
    }

    pub fn has_by_recipient(&self, recipient: &Addr, uid: &Uid) -> bool {
        self.by_recipient
            .contains_key(Self::index_key(recipient.as_bytes(), uid))
            .unwrap_or(false)
    }

    pub fn has_by_schema(&self, schema_uid: &Uid, uid: &Uid) -> bool {
        self.by_schema
            .contains_key(Self::index_key(schema_uid.as_bytes(), uid))
            .unwrap_or(false)
    }

    /// Lazy scan over the byAttester prefix. Caller-bounded — this is a
    /// read-only query, never invoked on the write path.
    pub fn scan_by_attester(&self, attester: &Addr) -> Result<Vec<Uid>, CertIdError> {
        let mut out = Vec::new();
        for item in self.by_attester.scan_prefix(attester.as_bytes()) {
            let (key, _) = item.map_err(storage_err)?;
            out.push(uid_from_index_key(&key)?);
        }
        Ok(out)
    }

    pub fn scan_by_recipient(&self, recipient: &Addr) -> Result<Vec<Uid>, CertIdError> {
        let mut out = Vec::new();
        for item in self.by_recipient.scan_prefix(recipient.as_bytes()) {
            let (key, _) = item.map_err(storage_err)?;
            out.push(uid_from_index_key(&key)?);
        }
        Ok(out)
    }

    pub fn scan_by_schema(&self, schema_uid: &Uid) -> Result<Vec<Uid>, CertIdError> {
        let mut out = Vec::new();
        for item in self.by_schema.scan_prefix(schema_uid.as_bytes()) {
            let (key, _) = item.map_err(storage_err)?;
            out.push(uid_from_index_key(&key)?);
        }
        Ok(out)
    }

    // ── Index: byPayloadRef ──────────────────────────────────────────────────

    pub fn add_by_payload_ref(&self, payload_ref: &str, uid: &Uid) -> Result<(), CertIdError> {
        self.by_payload_ref
            .insert(payload_ref.as_bytes(), uid.as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn payload_ref_taken(&self, payload_ref: &str) -> bool {
        self.by_payload_ref.contains_key(payload_ref.as_bytes()).unwrap_or(false)
    }

    pub fn get_by_payload_ref(&self, payload_ref: &str) -> Result<Option<Uid>, CertIdError> {
        match self.by_payload_ref.get(payload_ref.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(uid_from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Profiles ─────────────────────────────────────────────────────────────

    pub fn get_profile(&self, address: &Addr) -> Result<Option<Profile>, CertIdError> {
        match self.profiles.get(address.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn profile_exists(&self, address: &Addr) -> bool {
        self.profiles.contains_key(address.as_bytes()).unwrap_or(false)
    }

    pub fn put_profile(&self, profile: &Profile) -> Result<(), CertIdError> {
        self.profiles
            .insert(profile.address.as_bytes(), ser(profile)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn iter_profiles(&self) -> Result<Vec<Profile>, CertIdError> {
        let mut out = Vec::new();
        for item in self.profiles.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(de(&bytes)?);
        }
        Ok(out)
    }

    // ── Index: byHandle ──────────────────────────────────────────────────────

    pub fn handle_owner(&self, handle: &str) -> Result<Option<Addr>, CertIdError> {
        match self.by_handle.get(handle.as_bytes()).map_err(storage_err)? {
            Some(bytes) => {
                if bytes.len() != 20 {
                    return Err(CertIdError::Storage("corrupt by_handle entry".into()));
                }
                let mut arr = [0u8; 20];
                arr.copy_from_slice(&bytes);
                Ok(Some(Addr::from_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_handle(&self, handle: &str, owner: &Addr) -> Result<(), CertIdError> {
        self.by_handle
            .insert(handle.as_bytes(), owner.as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn remove_handle(&self, handle: &str) -> Result<(), CertIdError> {
        self.by_handle.remove(handle.as_bytes()).map_err(storage_err)?;
        Ok(())
    }

    // ── Oracle roster ────────────────────────────────────────────────────────

    pub fn get_oracle(&self, address: &Addr) -> Result<Option<OracleAuthorization>, CertIdError> {
        match self.oracles.get(address.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_oracle(&self, auth: &OracleAuthorization) -> Result<(), CertIdError> {
        self.oracles
            .insert(auth.address.as_bytes(), ser(auth)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn is_oracle_authorized(&self, address: &Addr) -> bool {
        self.get_oracle(address)
            .ok()
            .flatten()
            .map(|a| a.is_authorized)
            .unwrap_or(false)
    }

    pub fn iter_oracles(&self) -> Result<Vec<OracleAuthorization>, CertIdError> {
        let mut out = Vec::new();
        for item in self.oracles.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(de(&bytes)?);
        }
        Ok(out)
    }

    // ── Trust-score results ──────────────────────────────────────────────────

    pub fn get_trust_result(&self, address: &Addr) -> Result<Option<TrustScoreResult>, CertIdError> {
        match self.trust_results.get(address.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(de(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_trust_result(&self, result: &TrustScoreResult) -> Result<(), CertIdError> {
        self.trust_results
            .insert(result.address.as_bytes(), ser(result)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn iter_trust_results(&self) -> Result<Vec<TrustScoreResult>, CertIdError> {
        let mut out = Vec::new();
        for item in self.trust_results.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(de(&bytes)?);
        }
        Ok(out)
    }
}

fn uid_from_index_key(key: &[u8]) -> Result<Uid, CertIdError> {
    if key.len() < 32 {
        return Err(CertIdError::Storage("corrupt index entry".into()));
    }
    uid_from_bytes(&key[key.len() - 32..])
}

fn uid_from_bytes(bytes: &[u8]) -> Result<Uid, CertIdError> {
    if bytes.len() != 32 {
        return Err(CertIdError::Storage("corrupt uid entry".into()));
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(bytes);
    Ok(Uid::from_bytes(arr))
}
