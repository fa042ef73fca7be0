use thiserror::Error;

/// The five error kinds of the error taxonomy, plus storage/serialization
/// failures from the KV layer and internal-invariant panics (those panic
/// directly rather than returning a `CertIdError` — see module docs on
/// `certid_state::engine`).
#[derive(Debug, Error)]
pub enum CertIdError {
    // ── InvalidArgument ──────────────────────────────────────────────────────
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ── NotFound ─────────────────────────────────────────────────────────────
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("attestation not found: {0}")]
    AttestationNotFound(String),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("credential not found on profile: {0}")]
    CredentialNotFound(String),

    #[error("badge not found: {0}")]
    BadgeNotFound(String),

    #[error("handle not registered: {0}")]
    HandleNotFound(String),

    #[error("trust score not found: {0}")]
    TrustScoreNotFound(String),

    // ── Conflict ─────────────────────────────────────────────────────────────
    #[error("schema already registered: {0}")]
    SchemaConflict(String),

    #[error("attestation already exists: {0}")]
    AttestationConflict(String),

    #[error("attestation already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("profile already exists for address {0}")]
    ProfileConflict(String),

    #[error("handle already taken: {0}")]
    HandleConflict(String),

    #[error("credential already linked: {0}")]
    CredentialConflict(String),

    #[error("badge already awarded: {0}")]
    BadgeConflict(String),

    #[error("payload reference already anchored: {0}")]
    PayloadRefConflict(String),

    // ── Forbidden ────────────────────────────────────────────────────────────
    #[error("forbidden")]
    Forbidden,

    #[error("not the module authority")]
    NotAuthority,

    #[error("oracle not authorized: {0}")]
    OracleNotAuthorized(String),

    // ── PreconditionFailed ───────────────────────────────────────────────────
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("profile is inactive: {0}")]
    ProfileInactive(String),

    // ── Storage / serialization ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ── Genesis ──────────────────────────────────────────────────────────────
    #[error("genesis state is not empty; genesis may only be applied once")]
    GenesisNotEmpty,

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl CertIdError {
    /// The taxonomy kind, for callers (tests, RPC-shaped gateways) that want
    /// to branch on the coarse category rather than the specific variant.
    pub fn kind(&self) -> &'static str {
        use CertIdError::*;
        match self {
            InvalidArgument(_) => "InvalidArgument",
            SchemaNotFound(_) | AttestationNotFound(_) | ProfileNotFound(_)
            | CredentialNotFound(_) | BadgeNotFound(_) | HandleNotFound(_)
            | TrustScoreNotFound(_) => "NotFound",
            SchemaConflict(_) | AttestationConflict(_) | AlreadyRevoked(_) | ProfileConflict(_)
            | HandleConflict(_) | CredentialConflict(_) | BadgeConflict(_)
            | PayloadRefConflict(_) => "Conflict",
            Forbidden | NotAuthority | OracleNotAuthorized(_) => "Forbidden",
            PreconditionFailed(_) | ProfileInactive(_) => "PreconditionFailed",
            Serialization(_) | Storage(_) | GenesisNotEmpty | Other(_) => "Internal",
        }
    }
}
