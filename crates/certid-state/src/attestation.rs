//! AttestationStore: public and encrypted attestations, revocation, and the
//! byAttester/byRecipient/bySchema/byPayloadRef lookup indexes.

use certid_core::{
    Addr, BlockContext, CertIdError, Event, EventSink, MAX_RECIPIENTS,
    MIN_PAYLOAD_REF_LEN, PAYLOAD_HASH_HEX_LEN, Timestamp, Uid,
};

use crate::db::StateDb;
use crate::records::{Attestation, AttestationKind, Schema};
use crate::schema::get_schema;

fn check_schema_compatible(schema: &Schema, revocable: bool) -> Result<(), CertIdError> {
    if revocable && !schema.revocable {
        return Err(CertIdError::PreconditionFailed(
            "attestation cannot be revocable under a non-revocable schema".into(),
        ));
    }
    Ok(())
}

/// Create a public attestation (spec §4.2.1).
#[allow(clippy::too_many_arguments)]
pub fn create_public(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    attester: Addr,
    schema_uid: Uid,
    data: Vec<u8>,
    recipient: Option<Addr>,
    expires_at: Option<Timestamp>,
    revocable: bool,
    ref_uid: Option<Uid>,
) -> Result<Uid, CertIdError> {
    let schema = get_schema(db, &schema_uid)?;
    check_schema_compatible(&schema, revocable)?;

    let uid = certid_crypto::attestation_uid(&attester, &schema_uid, ctx.time, &data);
    if db.attestation_exists(&uid) {
        return Err(CertIdError::AttestationConflict(uid.to_hex()));
    }

    let attestation = Attestation {
        uid,
        schema_uid,
        attester: attester.clone(),
        recipient: recipient.clone(),
        created_at: ctx.time,
        expires_at,
        revoked_at: None,
        revocable,
        ref_uid,
        data,
        kind: AttestationKind::Public,
    };

    db.put_attestation(&attestation)?;
    db.add_by_attester(&attester, &uid)?;
    db.add_by_schema(&schema_uid, &uid)?;
    if let Some(recipient) = &recipient {
        db.add_by_recipient(recipient, &uid)?;
    }

    sink.emit(
        Event::new("certid.v1.AttestationCreated")
            .with("uid", uid.to_hex())
            .with("attester", attester.to_b58())
            .with("schema_uid", schema_uid.to_hex())
            .with("kind", "public"),
    );

    Ok(uid)
}

/// Create an encrypted attestation (spec §4.2.2). Every precondition below
/// is checked before any state is touched, so a rejected request leaves no
/// trace — not in the primary record, not in an index, not in the event log.
#[allow(clippy::too_many_arguments)]
pub fn create_encrypted(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    attester: Addr,
    schema_uid: Uid,
    payload_ref: String,
    payload_hash: String,
    recipients: Vec<Addr>,
    wrapped_keys: std::collections::BTreeMap<Addr, Vec<u8>>,
    revocable: bool,
    expires_at: Option<Timestamp>,
) -> Result<Uid, CertIdError> {
    if recipients.is_empty() {
        return Err(CertIdError::InvalidArgument("recipients must not be empty".into()));
    }
    if recipients.len() > MAX_RECIPIENTS {
        return Err(CertIdError::InvalidArgument(format!(
            "recipients exceeds the {MAX_RECIPIENTS}-recipient quota"
        )));
    }
    {
        let mut sorted = recipients.clone();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != recipients.len() {
            return Err(CertIdError::InvalidArgument("recipients must be distinct".into()));
        }
    }
    for recipient in &recipients {
        match wrapped_keys.get(recipient) {
            Some(key) if !key.is_empty() => {}
            _ => {
                return Err(CertIdError::InvalidArgument(format!(
                    "missing wrapped key for recipient {recipient}"
                )));
            }
        }
    }
    if wrapped_keys.len() != recipients.len() {
        return Err(CertIdError::InvalidArgument(
            "wrappedKeys must contain exactly one entry per recipient".into(),
        ));
    }
    if payload_ref.is_empty() || payload_ref.len() < MIN_PAYLOAD_REF_LEN {
        return Err(CertIdError::InvalidArgument(format!(
            "payloadRef must be at least {MIN_PAYLOAD_REF_LEN} characters"
        )));
    }
    if payload_hash.len() != PAYLOAD_HASH_HEX_LEN
        || !payload_hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    {
        return Err(CertIdError::InvalidArgument(format!(
            "payloadHash must be {PAYLOAD_HASH_HEX_LEN} lowercase hex characters"
        )));
    }

    let schema = get_schema(db, &schema_uid)?;
    check_schema_compatible(&schema, revocable)?;

    if db.payload_ref_taken(&payload_ref) {
        return Err(CertIdError::PayloadRefConflict(payload_ref));
    }

    let uid = certid_crypto::encrypted_attestation_uid(&attester, &schema_uid, ctx.time, &payload_hash);
    if db.attestation_exists(&uid) {
        return Err(CertIdError::AttestationConflict(uid.to_hex()));
    }

    let attestation = Attestation {
        uid,
        schema_uid,
        attester: attester.clone(),
        recipient: None,
        created_at: ctx.time,
        expires_at,
        revoked_at: None,
        revocable,
        ref_uid: None,
        data: Vec::new(),
        kind: AttestationKind::Encrypted {
            payload_ref: payload_ref.clone(),
            payload_hash,
            recipients: recipients.clone(),
            wrapped_keys,
        },
    };

    db.put_attestation(&attestation)?;
    db.add_by_attester(&attester, &uid)?;
    db.add_by_schema(&schema_uid, &uid)?;
    for recipient in &recipients {
        db.add_by_recipient(recipient, &uid)?;
    }
    db.add_by_payload_ref(&payload_ref, &uid)?;

    sink.emit(
        Event::new("certid.v1.EncryptedAttestationCreated")
            .with("uid", uid.to_hex())
            .with("attester", attester.to_b58())
            .with("schema_uid", schema_uid.to_hex())
            .with("ipfs_cid", payload_ref)
            .with("recipients_count", recipients.len().to_string()),
    );

    Ok(uid)
}

/// Revoke an attestation (spec §4.2.3). Only the original attester may
/// revoke, only once, and only if the attestation was created revocable.
pub fn revoke(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    revoker: Addr,
    uid: Uid,
) -> Result<(), CertIdError> {
    let mut attestation = db
        .get_attestation(&uid)?
        .ok_or_else(|| CertIdError::AttestationNotFound(uid.to_hex()))?;

    if !attestation.revocable {
        return Err(CertIdError::PreconditionFailed(format!(
            "attestation {uid} is not revocable"
        )));
    }
    if attestation.revoked_at.is_some() {
        return Err(CertIdError::AlreadyRevoked(uid.to_hex()));
    }
    if attestation.attester != revoker {
        return Err(CertIdError::Forbidden);
    }

    attestation.revoked_at = Some(ctx.time);
    db.put_attestation(&attestation)?;

    sink.emit(
        Event::new("certid.v1.AttestationRevoked")
            .with("uid", uid.to_hex())
            .with("revoker", revoker.to_b58()),
    );

    Ok(())
}

/// Internal full-record accessor — returns the stored `Attestation` exactly
/// as persisted, including every recipient's wrapped key for an encrypted
/// record. Trusted callers only (genesis export/import, index rebuilds,
/// tests). Never hand this straight to a query caller; see
/// [`get_attestation_view`] for the access-gated projection spec §6's
/// `GetEncryptedAttestation(uid, requester?)` requires.
pub fn get_attestation(db: &StateDb, uid: &Uid) -> Result<Attestation, CertIdError> {
    db.get_attestation(uid)?.ok_or_else(|| CertIdError::AttestationNotFound(uid.to_hex()))
}

/// Query-surface projection of an attestation (spec §6): metadata is always
/// visible, but `wrapped_key_for_requester` is populated only when `requester`
/// passes the AccessGate predicate (the attester, or a named recipient) —
/// never the full `wrappedKeys` map of every other recipient's secret.
#[derive(Clone, Debug)]
pub struct AttestationView {
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
    pub is_encrypted: bool,
    pub payload_ref: Option<String>,
    pub payload_hash: Option<String>,
    pub recipients: Vec<Addr>,
    pub wrapped_key_for_requester: Option<Vec<u8>>,
    pub is_expired: bool,
}

pub fn get_attestation_view(
    db: &StateDb,
    uid: &Uid,
    requester: Option<&Addr>,
    now: Timestamp,
) -> Result<AttestationView, CertIdError> {
    let att = get_attestation(db, uid)?;

    let (payload_ref, payload_hash, recipients) = match &att.kind {
        AttestationKind::Public => (None, None, Vec::new()),
        AttestationKind::Encrypted { payload_ref, payload_hash, recipients, .. } => {
            (Some(payload_ref.clone()), Some(payload_hash.clone()), recipients.clone())
        }
    };

    let wrapped_key_for_requester = match requester {
        Some(requester) => crate::access::get_wrapped_key(db, uid, requester).ok(),
        None => None,
    };

    Ok(AttestationView {
        uid: att.uid,
        schema_uid: att.schema_uid,
        attester: att.attester,
        recipient: att.recipient,
        created_at: att.created_at,
        expires_at: att.expires_at,
        revoked_at: att.revoked_at,
        revocable: att.revocable,
        ref_uid: att.ref_uid,
        data: if att.is_encrypted() { Vec::new() } else { att.data },
        is_encrypted: att.is_encrypted(),
        payload_ref,
        payload_hash,
        recipients,
        wrapped_key_for_requester,
        is_expired: att.is_expired(now),
    })
}

pub fn get_attestations_by_attester(db: &StateDb, attester: &Addr) -> Result<Vec<Uid>, CertIdError> {
    db.scan_by_attester(attester)
}

pub fn get_attestations_by_recipient(db: &StateDb, recipient: &Addr) -> Result<Vec<Uid>, CertIdError> {
    db.scan_by_recipient(recipient)
}

pub fn get_encrypted_attestation_by_payload_ref(
    db: &StateDb,
    payload_ref: &str,
) -> Result<Attestation, CertIdError> {
    let uid = db
        .get_by_payload_ref(payload_ref)?
        .ok_or_else(|| CertIdError::AttestationNotFound(payload_ref.to_string()))?;
    get_attestation(db, &uid)
}

pub struct Stats {
    pub total_schemas: u64,
    pub total_attestations: u64,
    pub total_encrypted_attestations: u64,
}

pub fn get_stats(db: &StateDb) -> Result<Stats, CertIdError> {
    Ok(Stats {
        total_schemas: db.count_schemas(),
        total_attestations: db.count_attestations(),
        total_encrypted_attestations: db.count_encrypted_attestations()?,
    })
}
