pub mod access;
pub mod attestation;
pub mod db;
pub mod engine;
pub mod identity;
pub mod records;
pub mod schema;
pub mod trust;

#[cfg(test)]
mod test_support;

pub use access::{authorized, get_wrapped_key};
pub use attestation::{get_attestation_view, get_stats, AttestationView, Stats};
pub use db::StateDb;
pub use engine::apply;
pub use records::{
    Attestation, AttestationKind, Badge, EntityType, OracleAuthorization, Profile,
    ScoreComponents, Schema, TrustScoreResult,
};
pub use trust::{compute_trust_score, get_trust_score, record_trust_score, ScoreInputs};
