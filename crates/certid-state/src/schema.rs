//! SchemaRegistry: attestation schemas are registered once and never change.

use certid_core::{Addr, CertIdError, Uid};

use crate::db::StateDb;
use crate::records::Schema;

pub fn register_schema(
    db: &StateDb,
    creator: Addr,
    definition: String,
    resolver: Option<Addr>,
    revocable: bool,
) -> Result<Uid, CertIdError> {
    if definition.trim().is_empty() {
        return Err(CertIdError::InvalidArgument("schema definition must not be empty".into()));
    }

    let uid = certid_crypto::schema_uid(&definition, resolver.as_ref(), revocable);
    if db.schema_exists(&uid) {
        return Err(CertIdError::SchemaConflict(uid.to_hex()));
    }

    let schema = Schema { uid, creator, definition, resolver, revocable };
    db.put_schema(&schema)?;
    Ok(uid)
}

pub fn get_schema(db: &StateDb, uid: &Uid) -> Result<Schema, CertIdError> {
    db.get_schema(uid)?.ok_or_else(|| CertIdError::SchemaNotFound(uid.to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_db;

    #[test]
    fn register_and_get_round_trips() {
        let (_d, db) = temp_db("schema_round_trip");
        let alice = Addr::from_bytes([1u8; 20]);
        let uid = register_schema(&db, alice.clone(), "string name,uint256 age".into(), None, true).unwrap();
        let schema = get_schema(&db, &uid).unwrap();
        assert_eq!(schema.creator, alice);
        assert!(schema.revocable);
    }

    #[test]
    fn empty_definition_is_rejected() {
        let (_d, db) = temp_db("schema_empty_definition");
        let alice = Addr::from_bytes([1u8; 20]);
        let err = register_schema(&db, alice, "   ".into(), None, true).unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
    }

    #[test]
    fn duplicate_schema_conflicts() {
        let (_d, db) = temp_db("schema_duplicate");
        let alice = Addr::from_bytes([1u8; 20]);
        register_schema(&db, alice.clone(), "dup".into(), None, false).unwrap();
        let err = register_schema(&db, alice, "dup".into(), None, false).unwrap_err();
        assert_eq!(err.kind(), "Conflict");
    }

    #[test]
    fn unknown_schema_is_not_found() {
        let (_d, db) = temp_db("schema_unknown");
        let err = get_schema(&db, &Uid::from_bytes([9u8; 32])).unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }
}
