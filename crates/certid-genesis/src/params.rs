use serde::{Deserialize, Serialize};

use certid_core::Addr;

/// Parameters needed to stand up a fresh core: who the module authority is,
/// and the canonical definition of the self-attestation schema profiles are
/// minted against (spec §4.4.1, §9 "`CertIDSchemaUID` is a placeholder").
///
/// In production these come from a governance-approved genesis file; in
/// tests, a throwaway authority address and the default schema definition
/// are used.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisParams {
    /// The configured module authority (spec §9 "Authority and oracles").
    pub authority: Addr,

    /// Canonical definition string for the profile self-attestation schema.
    /// Its uid is *computed*, never hardcoded — `apply_genesis` derives it
    /// the same way any other schema's uid is derived (spec §3 `Schema`).
    #[serde(default = "default_certid_schema_definition")]
    pub certid_schema_definition: String,

    /// Oracles authorized at genesis time, in addition to any granted later
    /// via `AuthorizeOracle`.
    #[serde(default)]
    pub initial_oracles: Vec<Addr>,
}

pub fn default_certid_schema_definition() -> String {
    "address:address,handle:string,name:string,entityType:string,trustScore:uint8,verified:bool,createdAt:int64".to_string()
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            authority: Addr::zero(),
            certid_schema_definition: default_certid_schema_definition(),
            initial_oracles: Vec::new(),
        }
    }
}
