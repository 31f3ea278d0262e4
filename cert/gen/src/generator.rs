/*++

Licensed under the Apache-2.0 license.

File Name:

   generator.rs

Abstract:

    K3 secure boot certificate generator

--*/

use anyhow::bail;
use k3cert_types::*;
use serde_derive::Serialize;
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::*;

/// Subnodes whose name contains this substring describe firewall regions.
const FIREWALL_NODE_NAME: &str = "firewall";

/// Signing-request configuration handed to `openssl req`. The firewall body
/// is spliced in verbatim; its variables are namespaced by descriptor keys.
static CERT_CONFIG_TEMPLATE: &str = r#"[ req ]
distinguished_name     = req_distinguished_name
x509_extensions        = v3_ca
prompt                 = no
dirstring_type         = nobmp

[ req_distinguished_name ]
C                      = { dist_name.country }
ST                     = { dist_name.state }
L                      = { dist_name.locality }
O                      = { dist_name.organization }
OU                     = { dist_name.organization_unit }
CN                     = { dist_name.common_name }
emailAddress           = { dist_name.email_address }

[ v3_ca ]
basicConstraints       = CA:true
1.3.6.1.4.1.294.1.3    = ASN1:SEQUENCE:swrv
1.3.6.1.4.1.294.1.34   = ASN1:SEQUENCE:sysfw_image_integrity
1.3.6.1.4.1.294.1.35   = ASN1:SEQUENCE:sysfw_image_load
1.3.6.1.4.1.294.1.37   = ASN1:SEQUENCE:firewall

[ swrv ]
swrv = INTEGER:{ sw_rev }

[ sysfw_image_integrity ]
shaType                = OID:{ sha_oid }
shaValue               = FORMAT:HEX,OCT:{ sha_value }
imageSize              = INTEGER:{ image_size }

[ sysfw_image_load ]
destAddr = FORMAT:HEX,OCT:{ dest_addr }
authInPlace = INTEGER:{ auth_in_place }

[ firewall ]
numFirewallRegions = INTEGER:{ firewall_count }
{ certificate }"#;

#[derive(Serialize)]
struct CertConfigContext<'a> {
    dist_name: &'a DistinguishedName,
    sw_rev: u32,
    sha_oid: &'static str,
    sha_value: String,
    image_size: usize,
    dest_addr: String,
    auth_in_place: String,
    firewall_count: u32,
    certificate: &'a str,
}

/// Certificate generator
pub struct CertificateGenerator<Crypto: CertGeneratorCrypto> {
    crypto: Crypto,
}

impl<Crypto: CertGeneratorCrypto> CertificateGenerator<Crypto> {
    /// Create an instance of `CertificateGenerator`
    pub fn new(crypto: Crypto) -> Self {
        Self { crypto }
    }

    /// Generate the signing-tool input for one image.
    ///
    /// # Arguments
    ///
    /// * `config` - Certificate generator configuration
    ///
    /// # Returns
    ///
    /// * `String` - The `openssl req` configuration text
    pub fn generate<N>(&self, config: &CertGeneratorConfig<N>) -> anyhow::Result<String>
    where
        N: CertGeneratorNode,
    {
        let metadata = self.metadata(config.auth_in_place, &config.subnodes)?;
        self.signing_config(config, &metadata)
    }

    /// Build the per-image certificate metadata.
    ///
    /// An absent or zero auth-in-place word means the input did not request
    /// firewall setup: the metadata keeps its defaults and the subnodes are
    /// not read. A non-zero word is taken verbatim, low byte included, and
    /// firewall collection proceeds.
    pub fn metadata<N>(
        &self,
        auth_in_place: Option<u32>,
        subnodes: &[N],
    ) -> anyhow::Result<CertificateMetadata>
    where
        N: CertGeneratorNode,
    {
        match auth_in_place {
            None | Some(0) => Ok(CertificateMetadata::default()),
            Some(raw) => {
                let mut metadata = CertificateMetadata::with_auth_in_place(raw);
                self.collect_firewalls(&mut metadata, subnodes)?;
                Ok(metadata)
            }
        }
    }

    /// Collect firewall descriptors from the certificate-config subnodes.
    ///
    /// Subnodes whose name does not contain `firewall` are ignored. Matching
    /// subnodes are validated and rendered in declaration order; the first
    /// invalid one aborts collection. Previously collected state is reset
    /// first, so re-collection never accumulates.
    pub fn collect_firewalls<N>(
        &self,
        metadata: &mut CertificateMetadata,
        subnodes: &[N],
    ) -> anyhow::Result<()>
    where
        N: CertGeneratorNode,
    {
        metadata.reset_firewalls();
        for node in subnodes {
            if !node.name().contains(FIREWALL_NODE_NAME) {
                continue;
            }
            let descriptor = FirewallRecord::read_from(node).validate(node.name())?;
            metadata.push_firewall(&descriptor);
        }
        Ok(())
    }

    /// Assemble the full signing-request configuration text.
    pub fn signing_config<N>(
        &self,
        config: &CertGeneratorConfig<N>,
        metadata: &CertificateMetadata,
    ) -> anyhow::Result<String>
    where
        N: CertGeneratorNode,
    {
        let (sha_oid, digest) = match config.sha {
            256 => ("2.16.840.1.101.3.4.2.1", self.crypto.sha256_digest(&config.content)?),
            384 => ("2.16.840.1.101.3.4.2.2", self.crypto.sha384_digest(&config.content)?),
            512 => ("2.16.840.1.101.3.4.2.3", self.crypto.sha512_digest(&config.content)?),
            bits => bail!("Unsupported sha strength {bits}; expected 256, 384 or 512"),
        };

        let context = CertConfigContext {
            dist_name: &config.dist_name,
            sw_rev: config.sw_rev,
            sha_oid,
            sha_value: hex::encode(digest),
            image_size: config.content.len(),
            dest_addr: format!("{:08x}", config.load_addr),
            auth_in_place: format!("{:#x}", metadata.auth_in_place()),
            firewall_count: metadata.firewall_count(),
            certificate: metadata.certificate(),
        };

        let mut template = TinyTemplate::new();
        template.set_default_formatter(&format_unescaped);
        template.add_template("cert-config", CERT_CONFIG_TEMPLATE)?;
        Ok(template.render("cert-config", &context)?)
    }
}
