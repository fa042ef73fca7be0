//! ─── CertID protocol constants ──────────────────────────────────────────────

// ── Attestations ─────────────────────────────────────────────────────────────

/// Hard cap on recipients per encrypted attestation (spec §4.2.2, §8 property 4).
pub const MAX_RECIPIENTS: usize = 50;

/// Minimum length of an off-chain content-addressed payload reference.
/// Sanity check only — the chain does not validate the content store's own
/// addressing format beyond this.
pub const MIN_PAYLOAD_REF_LEN: usize = 46;

/// Exact length of a hex-encoded SHA-256 payload digest.
pub const PAYLOAD_HASH_HEX_LEN: usize = 64;

// ── Profiles ─────────────────────────────────────────────────────────────────

/// Maximum length of `Profile.name`.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of `Profile.bio`.
pub const MAX_BIO_LEN: usize = 500;

/// Maximum number of credential references a profile may list. Not pinned by
/// the source distillation; chosen generously so no legitimate credential
/// list is truncated while still bounding the cost of an unbounded
/// `AddCredential` loop.
pub const MAX_CREDENTIALS: usize = 256;

/// Handle length bounds (spec §4.4.3).
pub const HANDLE_MIN_LEN: usize = 3;
pub const HANDLE_MAX_LEN: usize = 32;

/// Maximum `verificationLevel` (spec §3 `Profile`).
pub const MAX_VERIFICATION_LEVEL: u8 = 3;

/// Maximum `trustScore` (spec §3 `Profile`, §4.5).
pub const MAX_TRUST_SCORE: u8 = 100;

// ── Trust scoring (spec §4.5, §9 "deterministic floats") ────────────────────

/// `linkedDeviceScore` at or above which the hardware term contributes in
/// full. Not numerically pinned by the source distillation; picked as "high
/// confidence" without being unreachable.
pub const HIGH_TRUST_DEVICE_SCORE_THRESHOLD: u32 = 80;

/// Score at or above which a profile counts as a verified human
/// (`isVerifiedHuman`, spec §4.5). Chosen at the formula's midpoint.
pub const VERIFIED_HUMANITY_THRESHOLD: u8 = 50;

/// Account age, in months, above which the on-chain age bonus applies.
pub const ONCHAIN_AGE_BONUS_MONTHS: u32 = 6;

/// Transaction count at or above which the on-chain activity bonus applies.
pub const ONCHAIN_TX_COUNT_BONUS: u64 = 5;

/// Fee-burned threshold, in USD cents, above which the fee term saturates.
/// Cents, not a float — see Design Notes §9.
pub const FEE_BURNED_CAP_CENTS: u64 = 1_000;

/// Cap on the fee term's contribution to the trust score.
pub const FEE_TERM_MAX: u8 = 10;

/// Cap on the hardware term's contribution to the trust score.
pub const HARDWARE_TERM_MAX: u8 = 40;

/// Cap on verified social accounts counted toward the social term.
pub const SOCIAL_ACCOUNTS_CAP: u32 = 3;

/// Points awarded per verified social account, up to `SOCIAL_ACCOUNTS_CAP`.
pub const SOCIAL_POINTS_PER_ACCOUNT: u8 = 10;

/// Points awarded once account age clears `ONCHAIN_AGE_BONUS_MONTHS`.
pub const ONCHAIN_AGE_POINTS: u8 = 10;

/// Points awarded once tx count clears `ONCHAIN_TX_COUNT_BONUS`.
pub const ONCHAIN_TX_POINTS: u8 = 10;
