//! AccessGate: the single question of who may see an encrypted attestation's
//! wrapped key. Public attestations are readable by anyone; this module never
//! gates them.

use certid_core::{Addr, CertIdError, Uid};

use crate::db::StateDb;
use crate::records::AttestationKind;

/// True iff `requester` is entitled to read attestation `uid` — always true
/// for public attestations, and for encrypted ones iff the requester is the
/// attester or one of the named recipients.
pub fn authorized(db: &StateDb, uid: &Uid, requester: &Addr) -> Result<bool, CertIdError> {
    let attestation = db
        .get_attestation(uid)?
        .ok_or_else(|| CertIdError::AttestationNotFound(uid.to_hex()))?;

    Ok(match &attestation.kind {
        AttestationKind::Public => true,
        AttestationKind::Encrypted { recipients, .. } => {
            &attestation.attester == requester || recipients.contains(requester)
        }
    })
}

/// Returns the wrapped key `requester` holds for encrypted attestation `uid`.
/// Deliberately returns the same `Forbidden` error whether `uid` grants no
/// entry at all or the requester simply isn't among the recipients — neither
/// a missing attestation nor excluded access should be distinguishable to the
/// caller.
pub fn get_wrapped_key(db: &StateDb, uid: &Uid, requester: &Addr) -> Result<Vec<u8>, CertIdError> {
    let attestation = db.get_attestation(uid)?.ok_or(CertIdError::Forbidden)?;

    match &attestation.kind {
        AttestationKind::Public => Err(CertIdError::Forbidden),
        AttestationKind::Encrypted { wrapped_keys, .. } => {
            wrapped_keys.get(requester).cloned().ok_or(CertIdError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::create_encrypted;
    use crate::schema::register_schema;
    use crate::test_support::temp_db;
    use certid_core::BlockContext;
    use std::collections::BTreeMap;

    #[test]
    fn wrapped_key_access_matches_recipients() {
        let (_d, db) = temp_db("access_wrapped_key");
        let alice = Addr::from_bytes([1u8; 20]);
        let bob = Addr::from_bytes([2u8; 20]);
        let carol = Addr::from_bytes([3u8; 20]);
        let dave = Addr::from_bytes([4u8; 20]);
        let schema_uid = register_schema(&db, alice.clone(), "s".into(), None, false).unwrap();
        let mut sink = certid_core::VecEventSink::default();
        let ctx = BlockContext { height: 1, time: 100, authority: Addr::zero() };

        let mut wrapped = BTreeMap::new();
        wrapped.insert(bob.clone(), vec![0xBB]);
        wrapped.insert(carol.clone(), vec![0xCC]);
        let uid = create_encrypted(
            &db, &ctx, &mut sink, alice.clone(), schema_uid,
            "Q".to_string() + &"A".repeat(45), "a".repeat(64),
            vec![bob.clone(), carol.clone()], wrapped, false, None,
        )
        .unwrap();

        assert_eq!(get_wrapped_key(&db, &uid, &bob).unwrap(), vec![0xBB]);
        assert_eq!(get_wrapped_key(&db, &uid, &carol).unwrap(), vec![0xCC]);
        assert_eq!(get_wrapped_key(&db, &uid, &dave).unwrap_err().kind(), "Forbidden");
        assert!(authorized(&db, &uid, &alice).unwrap());
        assert!(!authorized(&db, &uid, &dave).unwrap());
    }

    #[test]
    fn public_attestations_are_always_authorized() {
        let (_d, db) = temp_db("access_public_always_authorized");
        let alice = Addr::from_bytes([5u8; 20]);
        let stranger = Addr::from_bytes([6u8; 20]);
        let schema_uid = register_schema(&db, alice.clone(), "s".into(), None, true).unwrap();
        let mut sink = certid_core::VecEventSink::default();
        let ctx = BlockContext { height: 1, time: 100, authority: Addr::zero() };
        let uid = crate::attestation::create_public(
            &db, &ctx, &mut sink, alice, schema_uid, vec![], None, None, true, None,
        )
        .unwrap();
        assert!(authorized(&db, &uid, &stranger).unwrap());
        assert_eq!(get_wrapped_key(&db, &uid, &stranger).unwrap_err().kind(), "Forbidden");
    }
}
