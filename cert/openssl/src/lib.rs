/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    File contains crypto utilities needed to generate certificates.

--*/

use k3cert_gen::CertGeneratorCrypto;
use openssl::sha::{Sha256, Sha384, Sha512};

#[derive(Default)]
pub struct OsslCrypto {}

impl CertGeneratorCrypto for OsslCrypto {
    /// Calculate SHA-256 Digest
    fn sha256_digest(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut engine = Sha256::new();
        engine.update(data);
        Ok(engine.finish().to_vec())
    }

    /// Calculate SHA2-384 Digest
    fn sha384_digest(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut engine = Sha384::new();
        engine.update(data);
        Ok(engine.finish().to_vec())
    }

    /// Calculate SHA2-512 Digest
    fn sha512_digest(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut engine = Sha512::new();
        engine.update(data);
        Ok(engine.finish().to_vec())
    }
}
