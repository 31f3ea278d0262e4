/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    File contains data structures for the K3 secure boot certificate
    generator.

--*/

mod firewall;
mod generator;

pub use firewall::FirewallRecord;
pub use generator::CertificateGenerator;

use k3cert_types::*;
use serde_derive::Serialize;

/// Hardware-config subnode accessor.
///
/// Property getters return `None` when the backing input omits the property;
/// completeness is decided by the generator, not the input layer.
pub trait CertGeneratorNode {
    /// Subnode name
    fn name(&self) -> &str;

    /// Integer property
    fn get_u32(&self, prop: &str) -> Option<u32>;

    /// 64-bit integer property
    fn get_u64(&self, prop: &str) -> Option<u64>;

    /// Integer-list property
    fn get_u32_list(&self, prop: &str) -> Option<Vec<u32>>;
}

/// Certificate Generator Crypto Trait
pub trait CertGeneratorCrypto {
    /// Calculate SHA-256 digest
    fn sha256_digest(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Calculate SHA2-384 digest
    fn sha384_digest(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Calculate SHA2-512 digest
    fn sha512_digest(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Distinguished name placed in the signing request.
#[derive(Clone, Debug, Serialize)]
pub struct DistinguishedName {
    pub country: String,

    pub state: String,

    pub locality: String,

    pub organization: String,

    pub organization_unit: String,

    pub common_name: String,

    pub email_address: String,
}

impl Default for DistinguishedName {
    fn default() -> Self {
        Self {
            country: "US".into(),
            state: "TX".into(),
            locality: "Dallas".into(),
            organization: "Texas Instruments Incorporated".into(),
            organization_unit: "Processors".into(),
            common_name: "TI Support".into(),
            email_address: "support@ti.com".into(),
        }
    }
}

/// Certificate Generator Configuration
pub struct CertGeneratorConfig<N>
where
    N: CertGeneratorNode,
{
    /// Signing-request distinguished name
    pub dist_name: DistinguishedName,

    /// Hash strength in bits (256, 384 or 512)
    pub sha: u32,

    /// Software revision recorded in the certificate
    pub sw_rev: u32,

    /// Destination address for the authenticated binary
    pub load_addr: u64,

    /// Raw auth-in-place word, if the input requested firewall setup
    pub auth_in_place: Option<u32>,

    /// Child subnodes of the certificate-config node, in declaration order
    pub subnodes: Vec<N>,

    /// Image payload to be signed
    pub content: Vec<u8>,
}

impl<N> Default for CertGeneratorConfig<N>
where
    N: CertGeneratorNode,
{
    fn default() -> Self {
        Self {
            dist_name: DistinguishedName::default(),
            sha: DEFAULT_SHA_BITS,
            sw_rev: DEFAULT_SW_REV,
            load_addr: DEFAULT_LOAD_ADDR,
            auth_in_place: None,
            subnodes: Vec::new(),
            content: Vec::new(),
        }
    }
}
