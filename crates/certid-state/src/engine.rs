//! The module router: dispatches a `Message` to the right submodule handler
//! under a single `BlockContext`, the way a host applies one transaction at a
//! time within a block. Every handler here is transactional at the record
//! level — sled's per-key writes are immediately durable, and every staged
//! mutation belongs to exactly one successfully-validated action, so a
//! rejected action never leaves a partial write behind (spec §5, §7).

use certid_core::{Action, BlockContext, CertIdError, EventSink, Message};
use tracing::{info, warn};

use crate::access;
use crate::attestation;
use crate::db::StateDb;
use crate::identity;
use crate::schema;

/// Applies one message against `db` under `ctx`, emitting any resulting
/// events to `sink`. Returns the error untouched on rejection — callers
/// (typically `certid-node`'s block loop) decide whether a rejected
/// transaction halts the batch or is merely logged and skipped.
pub fn apply(db: &StateDb, ctx: &BlockContext, sink: &mut dyn EventSink, msg: &Message) -> Result<(), CertIdError> {
    let name = msg.action.name();
    let result = dispatch(db, ctx, sink, msg);
    match &result {
        Ok(()) => info!(action = name, signer = %msg.signer, height = ctx.height, "applied"),
        Err(err) => warn!(action = name, signer = %msg.signer, height = ctx.height, error = %err, "rejected"),
    }
    result
}

fn dispatch(db: &StateDb, ctx: &BlockContext, sink: &mut dyn EventSink, msg: &Message) -> Result<(), CertIdError> {
    let signer = msg.signer.clone();
    match &msg.action {
        Action::RegisterSchema { definition, revocable, resolver } => {
            schema::register_schema(db, signer, definition.clone(), resolver.clone(), *revocable)
                .map(|_| ())
        }
        Action::Attest { schema_uid, data, recipient, expires_at, revocable, ref_uid } => {
            attestation::create_public(
                db, ctx, sink, signer, *schema_uid, data.clone(), recipient.clone(),
                *expires_at, *revocable, *ref_uid,
            )
            .map(|_| ())
        }
        Action::Revoke { uid } => attestation::revoke(db, ctx, sink, signer, *uid),
        Action::CreateEncryptedAttestation {
            schema_uid, payload_ref, payload_hash, recipients, wrapped_keys, revocable, expires_at,
        } => attestation::create_encrypted(
            db, ctx, sink, signer, *schema_uid, payload_ref.clone(), payload_hash.clone(),
            recipients.clone(), wrapped_keys.clone(), *revocable, *expires_at,
        )
        .map(|_| ()),
        Action::CreateProfile { name, bio, avatar_ref, public_key, social_links } => identity::create_profile(
            db, ctx, sink, signer, name.clone(), bio.clone(), avatar_ref.clone(),
            public_key.clone(), social_links.clone(),
        ),
        Action::UpdateProfile { name, bio, avatar_ref, public_key, social_links } => identity::update_profile(
            db, ctx, sink, signer, name.clone(), bio.clone(), avatar_ref.clone(),
            public_key.clone(), social_links.clone(),
        ),
        Action::RegisterHandle { handle } => {
            identity::register_handle(db, ctx, sink, signer, handle.clone())
        }
        Action::AddCredential { attestation_uid } => {
            identity::add_credential(db, ctx, signer, *attestation_uid)
        }
        Action::RemoveCredential { attestation_uid } => {
            identity::remove_credential(db, ctx, signer, *attestation_uid)
        }
        Action::VerifySocial { platform, handle, proof } => {
            identity::verify_social(db, ctx, sink, signer, platform.clone(), handle.clone(), proof.clone())
        }
        Action::AwardBadge { user, badge_name, description } => identity::award_badge(
            db, ctx, sink, signer, user.clone(), badge_name.clone(), description.clone(),
        ),
        Action::RevokeBadge { user, badge_name } => {
            identity::revoke_badge(db, ctx, sink, signer, user.clone(), badge_name.clone())
        }
        Action::UpdateTrustScore { user, score } => {
            identity::update_trust_score(db, ctx, sink, signer, user.clone(), *score)
        }
        Action::SetVerificationStatus { user, verified } => {
            identity::set_verification_status(db, ctx, sink, signer, user.clone(), *verified)
        }
        Action::AuthorizeOracle { oracle } => {
            identity::authorize_oracle(db, ctx, sink, signer, oracle.clone())
        }
        Action::RevokeOracle { oracle } => {
            identity::revoke_oracle(db, ctx, sink, signer, oracle.clone())
        }
    }
}

/// Query-surface helper re-exported for `certid-node`: whether `requester`
/// may read attestation `uid` (public always; encrypted only attester or a
/// named recipient — spec §4.3).
pub fn is_authorized(db: &StateDb, uid: &certid_core::Uid, requester: &certid_core::Addr) -> Result<bool, CertIdError> {
    access::authorized(db, uid, requester)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_db;
    use certid_core::{Addr, VecEventSink};

    fn ctx() -> BlockContext {
        BlockContext { height: 1, time: 1000, authority: Addr::zero() }
    }

    #[test]
    fn dispatches_register_schema_and_attest() {
        let (_d, db) = temp_db("engine_dispatch_basic");
        let mut sink = VecEventSink::default();
        let alice = Addr::from_bytes([1u8; 20]);

        apply(
            &db, &ctx(), &mut sink,
            &Message {
                signer: alice.clone(),
                action: Action::RegisterSchema {
                    definition: "string name,uint256 age".into(),
                    revocable: true,
                    resolver: None,
                },
            },
        )
        .unwrap();

        let schema_uid = certid_crypto::schema_uid("string name,uint256 age", None, true);
        apply(
            &db, &ctx(), &mut sink,
            &Message {
                signer: alice,
                action: Action::Attest {
                    schema_uid,
                    data: vec![1],
                    recipient: None,
                    expires_at: None,
                    revocable: true,
                    ref_uid: None,
                },
            },
        )
        .unwrap();

        assert_eq!(db.count_attestations(), 1);
        assert_eq!(sink.events.len(), 1);
        assert_eq!(sink.events[0].event_type, "certid.v1.AttestationCreated");
    }

    #[test]
    fn rejected_action_leaves_no_partial_state() {
        let (_d, db) = temp_db("engine_rejected_no_partial_state");
        let mut sink = VecEventSink::default();
        let alice = Addr::from_bytes([2u8; 20]);

        let err = apply(
            &db, &ctx(), &mut sink,
            &Message {
                signer: alice,
                action: Action::Attest {
                    schema_uid: certid_core::Uid::from_bytes([9u8; 32]),
                    data: vec![],
                    recipient: None,
                    expires_at: None,
                    revocable: false,
                    ref_uid: None,
                },
            },
        )
        .unwrap_err();

        assert_eq!(err.kind(), "NotFound");
        assert_eq!(db.count_attestations(), 0);
        assert!(sink.events.is_empty());
    }
}
