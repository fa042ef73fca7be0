//! IdentityStore: profiles, handles, credentials, soulbound badges,
//! verification status, trust-score submission, and the oracle roster.

use std::collections::BTreeMap;

use certid_core::{
    Addr, BlockContext, CertIdError, Event, EventSink, Uid, HANDLE_MAX_LEN, HANDLE_MIN_LEN,
    MAX_BIO_LEN, MAX_CREDENTIALS, MAX_NAME_LEN, MAX_TRUST_SCORE,
};
use tracing::warn;

use crate::db::StateDb;
use crate::records::{Badge, EntityType, OracleAuthorization, Profile};

fn validate_handle(handle: &str) -> Result<(), CertIdError> {
    if handle.len() < HANDLE_MIN_LEN || handle.len() > HANDLE_MAX_LEN {
        return Err(CertIdError::InvalidArgument(format!(
            "handle must be {HANDLE_MIN_LEN}..{HANDLE_MAX_LEN} characters"
        )));
    }
    let mut chars = handle.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_lowercase() {
        return Err(CertIdError::InvalidArgument(
            "handle must start with a lowercase letter".into(),
        ));
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err(CertIdError::InvalidArgument(
            "handle may only contain lowercase letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

/// Create a profile (spec §4.4.1). If genesis has pre-registered a CertID
/// self-attestation schema, mints a non-revocable attestation carrying a
/// snapshot of the new profile and records its uid — but a failure to do so
/// must never fail profile creation itself.
#[allow(clippy::too_many_arguments)]
pub fn create_profile(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    creator: Addr,
    name: Option<String>,
    bio: Option<String>,
    avatar_ref: Option<String>,
    public_key: Option<Vec<u8>>,
    social_links: Option<BTreeMap<String, String>>,
) -> Result<(), CertIdError> {
    if db.profile_exists(&creator) {
        return Err(CertIdError::ProfileConflict(creator.to_b58()));
    }
    if let Some(name) = &name {
        if name.len() > MAX_NAME_LEN {
            return Err(CertIdError::InvalidArgument(format!("name exceeds {MAX_NAME_LEN} characters")));
        }
    }
    if let Some(bio) = &bio {
        if bio.len() > MAX_BIO_LEN {
            return Err(CertIdError::InvalidArgument(format!("bio exceeds {MAX_BIO_LEN} characters")));
        }
    }

    let mut profile = Profile {
        address: creator.clone(),
        handle: None,
        name,
        bio,
        avatar_ref,
        public_key,
        social_links: social_links.unwrap_or_default(),
        credentials: Vec::new(),
        badges: BTreeMap::new(),
        entity_type: EntityType::Individual,
        trust_score: 0,
        verified: false,
        verification_level: 0,
        is_active: true,
        created_at: ctx.time,
        updated_at: ctx.time,
        attestation_uid: None,
    };

    if let Some(schema_uid) = db.certid_schema_uid()? {
        let data = format!(
            "{{\"address\":\"{}\",\"handle\":null,\"name\":{:?},\"entityType\":\"Individual\",\"trustScore\":0,\"verified\":false,\"createdAt\":{}}}",
            profile.address, profile.name, profile.created_at,
        );
        match crate::attestation::create_public(
            db, ctx, sink, creator.clone(), schema_uid, data.into_bytes(), None, None, false, None,
        ) {
            Ok(uid) => profile.attestation_uid = Some(uid),
            Err(err) => warn!(address = %creator, error = %err, "profile self-attestation failed, continuing without it"),
        }
    }

    db.put_profile(&profile)?;

    let mut event = Event::new("certid.v1.ProfileCreated").with("address", creator.to_b58());
    if let Some(attestation_uid) = profile.attestation_uid {
        event = event.with("attestation_uid", attestation_uid.to_hex());
    }
    sink.emit(event);

    Ok(())
}

/// Update mutable profile fields (spec §4.4.2). Owner-only; `None` leaves a
/// field untouched; `social_links` merges rather than replaces. Attaches a
/// `"profile"`-domain proof hash to the emitted event (spec §4.7).
#[allow(clippy::too_many_arguments)]
pub fn update_profile(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    caller: Addr,
    name: Option<String>,
    bio: Option<String>,
    avatar_ref: Option<String>,
    public_key: Option<Vec<u8>>,
    social_links: Option<BTreeMap<String, String>>,
) -> Result<(), CertIdError> {
    let mut profile = db
        .get_profile(&caller)?
        .ok_or_else(|| CertIdError::ProfileNotFound(caller.to_b58()))?;

    if let Some(name) = name {
        if name.len() > MAX_NAME_LEN {
            return Err(CertIdError::InvalidArgument(format!("name exceeds {MAX_NAME_LEN} characters")));
        }
        profile.name = Some(name);
    }
    if let Some(bio) = bio {
        if bio.len() > MAX_BIO_LEN {
            return Err(CertIdError::InvalidArgument(format!("bio exceeds {MAX_BIO_LEN} characters")));
        }
        profile.bio = Some(bio);
    }
    if let Some(avatar_ref) = avatar_ref {
        profile.avatar_ref = Some(avatar_ref);
    }
    if let Some(public_key) = public_key {
        profile.public_key = Some(public_key);
    }
    if let Some(links) = social_links {
        profile.social_links.extend(links);
    }
    profile.updated_at = ctx.time;

    db.put_profile(&profile)?;

    let proof_hash = certid_crypto::proof_hash(
        "profile",
        &format!("{}:{}", caller, profile.updated_at),
        ctx.height,
        ctx.time,
    );
    sink.emit(
        Event::new("certid.v1.ProfileUpdated")
            .with("address", caller.to_b58())
            .with("proof_hash", proof_hash)
            .with("timestamp", ctx.time.to_string()),
    );

    Ok(())
}

/// Register (or re-register) a handle for the caller's profile (spec
/// §4.4.3). Serializes globally on the handle→address index.
pub fn register_handle(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    caller: Addr,
    handle: String,
) -> Result<(), CertIdError> {
    validate_handle(&handle)?;

    let mut profile = db
        .get_profile(&caller)?
        .ok_or_else(|| CertIdError::ProfileNotFound(caller.to_b58()))?;

    if let Some(owner) = db.handle_owner(&handle)? {
        if owner != caller {
            return Err(CertIdError::HandleConflict(handle));
        }
    }

    if let Some(old) = &profile.handle {
        if old != &handle {
            db.remove_handle(old)?;
        }
    }

    db.set_handle(&handle, &caller)?;
    profile.handle = Some(handle.clone());
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;

    sink.emit(
        Event::new("certid.v1.HandleRegistered")
            .with("address", caller.to_b58())
            .with("handle", handle),
    );

    Ok(())
}

/// Records a verified social-platform link on the caller's own profile.
/// Verifying `proof` cryptographically against the named platform is a
/// host/off-chain concern; the chain only records that verification happened
/// and under which handle, the same way `social_links` already stores
/// unverified platform links.
pub fn verify_social(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    caller: Addr,
    platform: String,
    handle: String,
    _proof: String,
) -> Result<(), CertIdError> {
    let mut profile = db
        .get_profile(&caller)?
        .ok_or_else(|| CertIdError::ProfileNotFound(caller.to_b58()))?;

    profile.social_links.insert(platform.clone(), handle.clone());
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;

    sink.emit(
        Event::new("certid.v1.SocialVerified")
            .with("address", caller.to_b58())
            .with("handle", handle),
    );

    Ok(())
}

/// Link a credential attestation uid to the caller's profile (spec §4.4.4).
/// The chain never verifies the attestation's existence or ownership — the
/// list is an opaque pointer set, not a join.
pub fn add_credential(db: &StateDb, ctx: &BlockContext, caller: Addr, attestation_uid: Uid) -> Result<(), CertIdError> {
    let mut profile = db
        .get_profile(&caller)?
        .ok_or_else(|| CertIdError::ProfileNotFound(caller.to_b58()))?;

    if profile.credentials.contains(&attestation_uid) {
        return Err(CertIdError::CredentialConflict(attestation_uid.to_hex()));
    }
    if profile.credentials.len() >= MAX_CREDENTIALS {
        return Err(CertIdError::InvalidArgument(format!(
            "profile already lists {MAX_CREDENTIALS} credentials"
        )));
    }

    profile.credentials.push(attestation_uid);
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;
    Ok(())
}

pub fn remove_credential(db: &StateDb, ctx: &BlockContext, caller: Addr, attestation_uid: Uid) -> Result<(), CertIdError> {
    let mut profile = db
        .get_profile(&caller)?
        .ok_or_else(|| CertIdError::ProfileNotFound(caller.to_b58()))?;

    let before = profile.credentials.len();
    profile.credentials.retain(|uid| uid != &attestation_uid);
    if profile.credentials.len() == before {
        return Err(CertIdError::CredentialNotFound(attestation_uid.to_hex()));
    }

    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;
    Ok(())
}

/// Award a soulbound badge (spec §4.4.5). Authority-only; never transferred;
/// a revoked badge of the same name may never be re-awarded.
pub fn award_badge(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    authority: Addr,
    user: Addr,
    badge_name: String,
    description: String,
) -> Result<(), CertIdError> {
    if authority != ctx.authority {
        return Err(CertIdError::NotAuthority);
    }

    let mut profile = db
        .get_profile(&user)?
        .ok_or_else(|| CertIdError::ProfileNotFound(user.to_b58()))?;
    if !profile.is_active {
        return Err(CertIdError::ProfileInactive(user.to_b58()));
    }

    let badge_id = certid_crypto::badge_id(&badge_name);
    if profile.badges.contains_key(&badge_id) {
        return Err(CertIdError::BadgeConflict(badge_name));
    }

    let badge = Badge {
        id: badge_id,
        name: badge_name.clone(),
        description,
        awarded_at: ctx.time,
        awarded_by: authority.clone(),
        is_revoked: false,
        revoked_at: None,
    };
    profile.badges.insert(badge_id, badge);
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;

    let proof_hash = certid_crypto::proof_hash(
        "badge",
        &format!("{}:{}:awarded", user, badge_id),
        ctx.height,
        ctx.time,
    );
    sink.emit(
        Event::new("certid.v1.BadgeAwarded")
            .with("user", user.to_b58())
            .with("badge_id", badge_id.to_hex())
            .with("authority", authority.to_b58())
            .with("proof_hash", proof_hash),
    );

    Ok(())
}

/// Marks a badge revoked — never deleted, and never re-awardable.
pub fn revoke_badge(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    authority: Addr,
    user: Addr,
    badge_name: String,
) -> Result<(), CertIdError> {
    if authority != ctx.authority {
        return Err(CertIdError::NotAuthority);
    }

    let mut profile = db
        .get_profile(&user)?
        .ok_or_else(|| CertIdError::ProfileNotFound(user.to_b58()))?;

    let badge_id = certid_crypto::badge_id(&badge_name);
    let badge = profile
        .badges
        .get_mut(&badge_id)
        .ok_or_else(|| CertIdError::BadgeNotFound(badge_name.clone()))?;
    if badge.is_revoked {
        return Err(CertIdError::AlreadyRevoked(badge_name));
    }
    badge.is_revoked = true;
    badge.revoked_at = Some(ctx.time);
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;

    let proof_hash = certid_crypto::proof_hash(
        "badge",
        &format!("{}:{}:revoked", user, badge_id),
        ctx.height,
        ctx.time,
    );
    sink.emit(
        Event::new("certid.v1.BadgeRevoked")
            .with("user", user.to_b58())
            .with("badge_id", badge_id.to_hex())
            .with("authority", authority.to_b58())
            .with("proof_hash", proof_hash),
    );

    Ok(())
}

pub fn has_badge(db: &StateDb, user: &Addr, badge_name: &str) -> Result<bool, CertIdError> {
    let profile = match db.get_profile(user)? {
        Some(p) => p,
        None => return Ok(false),
    };
    let badge_id = certid_crypto::badge_id(badge_name);
    Ok(profile.badges.get(&badge_id).map(|b| !b.is_revoked).unwrap_or(false))
}

/// Set verification status (spec §4.4.6). Authority-only. Attaches a
/// `"profile"`-domain proof hash (spec §4.7) to the emitted event.
pub fn set_verification_status(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    caller: Addr,
    user: Addr,
    verified: bool,
) -> Result<(), CertIdError> {
    if caller != ctx.authority {
        return Err(CertIdError::NotAuthority);
    }
    let mut profile = db
        .get_profile(&user)?
        .ok_or_else(|| CertIdError::ProfileNotFound(user.to_b58()))?;
    profile.verified = verified;
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;

    let proof_hash = certid_crypto::proof_hash(
        "profile",
        &format!("{}:verified:{}", user, verified),
        ctx.height,
        ctx.time,
    );
    sink.emit(
        Event::new("certid.v1.ProfileVerified")
            .with("user", user.to_b58())
            .with("authority", caller.to_b58())
            .with("verified_human", verified.to_string())
            .with("proof_hash", proof_hash),
    );

    Ok(())
}

/// Store a submitted trust score on a profile (spec §4.4.6). `submitter` must
/// be either the module authority or a currently-authorized oracle.
pub fn update_trust_score(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    submitter: Addr,
    user: Addr,
    score: u8,
) -> Result<(), CertIdError> {
    if submitter != ctx.authority && !db.is_oracle_authorized(&submitter) {
        return Err(CertIdError::OracleNotAuthorized(submitter.to_b58()));
    }
    if score > MAX_TRUST_SCORE {
        return Err(CertIdError::InvalidArgument(format!("score exceeds {MAX_TRUST_SCORE}")));
    }

    let mut profile = db
        .get_profile(&user)?
        .ok_or_else(|| CertIdError::ProfileNotFound(user.to_b58()))?;

    let old_score = profile.trust_score;
    profile.trust_score = score;
    profile.updated_at = ctx.time;
    db.put_profile(&profile)?;
    crate::trust::record_trust_score(db, user.clone(), score, ctx.time)?;

    let proof_hash = certid_crypto::proof_hash(
        "score",
        &format!("{}:{}:{}", user, old_score, score),
        ctx.height,
        ctx.time,
    );

    sink.emit(
        Event::new("certid.v1.TrustScoreUpdated")
            .with("address", user.to_b58())
            .with("old_score", old_score.to_string())
            .with("score", score.to_string())
            .with("proof_hash", proof_hash)
            .with("timestamp", ctx.time.to_string()),
    );

    Ok(())
}

/// Authorize an address to submit trust-score updates (spec §4.4.7).
pub fn authorize_oracle(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    caller: Addr,
    oracle: Addr,
) -> Result<(), CertIdError> {
    if caller != ctx.authority {
        return Err(CertIdError::NotAuthority);
    }
    db.put_oracle(&OracleAuthorization {
        address: oracle.clone(),
        is_authorized: true,
        granted_at: ctx.time,
        granted_by: caller.clone(),
    })?;
    sink.emit(
        Event::new("certid.v1.OracleAuthorized")
            .with("oracle", oracle.to_b58())
            .with("authority", caller.to_b58()),
    );
    Ok(())
}

pub fn revoke_oracle(
    db: &StateDb,
    ctx: &BlockContext,
    sink: &mut dyn EventSink,
    caller: Addr,
    oracle: Addr,
) -> Result<(), CertIdError> {
    if caller != ctx.authority {
        return Err(CertIdError::NotAuthority);
    }
    let existing = db.get_oracle(&oracle)?;
    let granted_at = existing.map(|o| o.granted_at).unwrap_or(ctx.time);
    db.put_oracle(&OracleAuthorization {
        address: oracle.clone(),
        is_authorized: false,
        granted_at,
        granted_by: caller.clone(),
    })?;
    sink.emit(
        Event::new("certid.v1.OracleRevoked")
            .with("oracle", oracle.to_b58())
            .with("authority", caller.to_b58()),
    );
    Ok(())
}

pub fn is_oracle_authorized(db: &StateDb, address: &Addr) -> bool {
    db.is_oracle_authorized(address)
}

pub fn get_profile(db: &StateDb, address: &Addr) -> Result<Profile, CertIdError> {
    db.get_profile(address)?.ok_or_else(|| CertIdError::ProfileNotFound(address.to_b58()))
}

pub fn get_profile_by_handle(db: &StateDb, handle: &str) -> Result<Profile, CertIdError> {
    let owner = db
        .handle_owner(handle)?
        .ok_or_else(|| CertIdError::HandleNotFound(handle.to_string()))?;
    get_profile(db, &owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::register_schema;
    use crate::test_support::temp_db;

    fn ctx(authority: Addr) -> BlockContext {
        BlockContext { height: 1, time: 1000, authority }
    }

    #[test]
    fn handle_registration_is_bijective() {
        // Mirrors scenario E4.
        let (_d, db) = temp_db("identity_handle_bijection");
        let authority = Addr::zero();
        let alice = Addr::from_bytes([1u8; 20]);
        let bob = Addr::from_bytes([2u8; 20]);
        let mut sink = certid_core::VecEventSink::default();

        create_profile(&db, &ctx(authority.clone()), &mut sink, alice.clone(), None, None, None, None, None).unwrap();
        register_handle(&db, &ctx(authority.clone()), &mut sink, alice.clone(), "alice".into()).unwrap();

        create_profile(&db, &ctx(authority.clone()), &mut sink, bob.clone(), None, None, None, None, None).unwrap();
        let err = register_handle(&db, &ctx(authority.clone()), &mut sink, bob, "alice".into()).unwrap_err();
        assert_eq!(err.kind(), "Conflict");

        register_handle(&db, &ctx(authority.clone()), &mut sink, alice.clone(), "alice2".into()).unwrap();
        assert!(db.handle_owner("alice").unwrap().is_none());
        assert_eq!(db.handle_owner("alice2").unwrap(), Some(alice));
    }

    #[test]
    fn create_profile_self_attests_when_schema_registered() {
        let (_d, db) = temp_db("identity_self_attestation");
        let authority = Addr::zero();
        let alice = Addr::from_bytes([3u8; 20]);
        let schema_uid = register_schema(&db, authority.clone(), "certid-self".into(), None, false).unwrap();
        db.set_certid_schema_uid(&schema_uid).unwrap();

        let mut sink = certid_core::VecEventSink::default();
        create_profile(&db, &ctx(authority), &mut sink, alice.clone(), None, None, None, None, None).unwrap();

        let profile = get_profile(&db, &alice).unwrap();
        assert!(profile.attestation_uid.is_some());
    }

    #[test]
    fn badges_are_never_re_awarded_once_revoked() {
        let (_d, db) = temp_db("identity_badge_soulbound");
        let authority = Addr::zero();
        let alice = Addr::from_bytes([4u8; 20]);
        let mut sink = certid_core::VecEventSink::default();

        create_profile(&db, &ctx(authority.clone()), &mut sink, alice.clone(), None, None, None, None, None).unwrap();
        award_badge(&db, &ctx(authority.clone()), &mut sink, authority.clone(), alice.clone(), "pioneer".into(), "early user".into()).unwrap();
        assert!(has_badge(&db, &alice, "pioneer").unwrap());

        revoke_badge(&db, &ctx(authority.clone()), &mut sink, authority.clone(), alice.clone(), "pioneer".into()).unwrap();
        assert!(!has_badge(&db, &alice, "pioneer").unwrap());

        let err = award_badge(&db, &ctx(authority.clone()), &mut sink, authority, alice, "pioneer".into(), "again".into()).unwrap_err();
        assert_eq!(err.kind(), "Conflict");
    }

    #[test]
    fn trust_score_update_requires_authority_or_oracle() {
        // Mirrors scenario E6.
        let (_d, db) = temp_db("identity_trust_score_authority");
        let authority = Addr::zero();
        let mallory = Addr::from_bytes([5u8; 20]);
        let alice = Addr::from_bytes([6u8; 20]);
        let mut sink = certid_core::VecEventSink::default();

        create_profile(&db, &ctx(authority.clone()), &mut sink, alice.clone(), None, None, None, None, None).unwrap();

        let err = update_trust_score(&db, &ctx(authority.clone()), &mut sink, mallory.clone(), alice.clone(), 42).unwrap_err();
        assert_eq!(err.kind(), "Forbidden");

        authorize_oracle(&db, &ctx(authority.clone()), &mut sink, authority.clone(), mallory.clone()).unwrap();
        update_trust_score(&db, &ctx(authority), &mut sink, mallory, alice.clone(), 42).unwrap();
        assert_eq!(get_profile(&db, &alice).unwrap().trust_score, 42);

        let result = crate::trust::get_trust_score(&db, &alice).unwrap();
        assert_eq!(result.score, 42);
        assert!(!result.is_verified_human);
    }

    #[test]
    fn profile_update_and_verification_carry_proof_hashes() {
        let (_d, db) = temp_db("identity_proof_hashes");
        let authority = Addr::zero();
        let alice = Addr::from_bytes([7u8; 20]);
        let mut sink = certid_core::VecEventSink::default();

        create_profile(&db, &ctx(authority.clone()), &mut sink, alice.clone(), None, None, None, None, None).unwrap();
        update_profile(
            &db, &ctx(authority.clone()), &mut sink, alice.clone(),
            Some("Alice".into()), None, None, None, None,
        )
        .unwrap();
        let update_event = sink.events.iter().find(|e| e.event_type == "certid.v1.ProfileUpdated").unwrap();
        assert!(update_event.attributes["proof_hash"].starts_with("0x"));

        set_verification_status(&db, &ctx(authority.clone()), &mut sink, authority, alice, true).unwrap();
        let verify_event = sink.events.iter().find(|e| e.event_type == "certid.v1.ProfileVerified").unwrap();
        assert_eq!(verify_event.attributes["verified_human"], "true");
        assert!(verify_event.attributes["proof_hash"].starts_with("0x"));
    }
}
