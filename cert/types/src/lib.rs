/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    File contains data structures for the K3 secure boot certificate.

--*/

use getset::{CopyGetters, Getters};
use serde_derive::{Deserialize, Serialize};

/// Lower byte of the auth-in-place word: move the authenticated binary back
/// to its header. The upper byte carries the host ID of the core owning the
/// firewalls.
pub const AUTH_IN_PLACE_MOVE_TO_HEADER: u32 = 0x02;

/// Default hash strength for the signing request.
pub const DEFAULT_SHA_BITS: u32 = 512;

/// Default software revision recorded in the certificate.
pub const DEFAULT_SW_REV: u32 = 1;

/// Default destination address for the authenticated binary.
pub const DEFAULT_LOAD_ADDR: u64 = 0x41c0_0000;

/// One firewall region's access-control configuration.
///
/// Field values are raw hardware register contents; range checking is the
/// caller's hardware policy, not enforced here.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FirewallDescriptor {
    /// Hardware firewall identifier
    pub id: u32,

    /// Sub-region index within the firewall
    pub region: u32,

    /// Raw control register value
    pub control: u32,

    /// Raw permission register values, one per privilege/security class
    pub permissions: Vec<u32>,

    /// First address covered by the rule
    pub start_address: u64,

    /// Last address covered by the rule
    pub end_address: u64,
}

impl FirewallDescriptor {
    /// Key namespacing this descriptor's variables in the flat configuration
    /// file: the decimal digits of `id` followed by those of `region`.
    /// The consuming tool depends on this exact shape.
    pub fn key(&self) -> String {
        format!("{}{}", self.id, self.region)
    }

    /// Render the descriptor as certificate-configuration lines.
    ///
    /// The block starts with a newline so that consecutive descriptors stay
    /// separated when concatenated into one configuration body.
    pub fn render(&self) -> String {
        let key = self.key();
        let mut cert = format!(
            "\nfirewallID{key} = INTEGER:{}\n\
             region{key} = INTEGER:{}\n\
             control{key} = INTEGER:{:#x}\n\
             nPermissionRegs{key} = INTEGER:{}\n",
            self.id,
            self.region,
            self.control,
            self.permissions.len()
        );
        for (index, permission) in self.permissions.iter().enumerate() {
            cert.push_str(&format!(
                "permissions{key}{index} = INTEGER:{permission:#x}\n"
            ));
        }
        cert.push_str(&format!(
            "startAddress{key} = FORMAT:HEX,OCT:{:02x}\n\
             endAddress{key} = FORMAT:HEX,OCT:{:02x}\n",
            self.start_address, self.end_address
        ));
        cert
    }
}

/// Per-image certificate metadata handed to the signing step.
///
/// `firewall_count` always equals the number of descriptor renderings
/// concatenated into `certificate`; mutation goes through
/// [`CertificateMetadata::push_firewall`] and
/// [`CertificateMetadata::reset_firewalls`] to keep it that way.
#[derive(Clone, Debug, Eq, PartialEq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct CertificateMetadata {
    /// Auth-in-place mode word
    #[getset(get_copy = "pub")]
    auth_in_place: u32,

    /// Number of firewall descriptors aggregated
    #[getset(get_copy = "pub")]
    firewall_count: u32,

    /// Concatenated descriptor renderings, in input order
    #[getset(get = "pub")]
    certificate: String,
}

impl Default for CertificateMetadata {
    fn default() -> Self {
        Self {
            auth_in_place: AUTH_IN_PLACE_MOVE_TO_HEADER,
            firewall_count: 0,
            certificate: String::new(),
        }
    }
}

impl CertificateMetadata {
    /// Metadata with an explicitly-provided auth-in-place word and no
    /// firewalls collected yet.
    pub fn with_auth_in_place(auth_in_place: u32) -> Self {
        Self {
            auth_in_place,
            ..Self::default()
        }
    }

    /// Append one descriptor's rendering to the certificate body.
    pub fn push_firewall(&mut self, descriptor: &FirewallDescriptor) {
        self.firewall_count += 1;
        self.certificate.push_str(&descriptor.render());
    }

    /// Drop any previously collected firewalls.
    pub fn reset_firewalls(&mut self) {
        self.firewall_count = 0;
        self.certificate.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_descriptor() -> FirewallDescriptor {
        FirewallDescriptor {
            id: 257,
            region: 0,
            control: 0x30000C01,
            permissions: vec![0x0000FFFF],
            start_address: 0x0,
            end_address: 0xFFFFFFFF,
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(
            sample_descriptor().render(),
            "\nfirewallID2570 = INTEGER:257\n\
             region2570 = INTEGER:0\n\
             control2570 = INTEGER:0x30000c01\n\
             nPermissionRegs2570 = INTEGER:1\n\
             permissions25700 = INTEGER:0xffff\n\
             startAddress2570 = FORMAT:HEX,OCT:00\n\
             endAddress2570 = FORMAT:HEX,OCT:ffffffff\n"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let descriptor = sample_descriptor();
        assert_eq!(descriptor.render(), descriptor.render());
    }

    #[test]
    fn test_render_multiple_permission_regs() {
        let descriptor = FirewallDescriptor {
            permissions: vec![0xFFFF, 0xC3C3FFFF],
            ..sample_descriptor()
        };
        let cert = descriptor.render();
        assert!(cert.contains("nPermissionRegs2570 = INTEGER:2\n"));
        assert!(cert.contains("permissions25700 = INTEGER:0xffff\n"));
        assert!(cert.contains("permissions25701 = INTEGER:0xc3c3ffff\n"));
    }

    #[test]
    fn test_address_padding() {
        let cert = sample_descriptor().render();
        // openssl's FORMAT:HEX parser needs at least one full octet
        assert!(cert.contains("startAddress2570 = FORMAT:HEX,OCT:00\n"));

        let descriptor = FirewallDescriptor {
            start_address: 0xA,
            end_address: 0xFF_FFFF_FFFF,
            ..sample_descriptor()
        };
        let cert = descriptor.render();
        assert!(cert.contains("startAddress2570 = FORMAT:HEX,OCT:0a\n"));
        assert!(cert.contains("endAddress2570 = FORMAT:HEX,OCT:ffffffffff\n"));
    }

    #[test]
    fn test_keys_do_not_collide_across_regions() {
        let region0 = sample_descriptor();
        let region1 = FirewallDescriptor {
            region: 1,
            ..sample_descriptor()
        };
        assert_eq!(region0.key(), "2570");
        assert_eq!(region1.key(), "2571");

        let mut metadata = CertificateMetadata::default();
        metadata.push_firewall(&region0);
        metadata.push_firewall(&region1);
        assert!(metadata.certificate().contains("firewallID2570 = INTEGER:257\n"));
        assert!(metadata.certificate().contains("firewallID2571 = INTEGER:257\n"));
        assert!(!metadata.certificate().contains("firewallID25700"));
    }

    #[test]
    fn test_metadata_default() {
        let metadata = CertificateMetadata::default();
        assert_eq!(metadata.auth_in_place(), AUTH_IN_PLACE_MOVE_TO_HEADER);
        assert_eq!(metadata.firewall_count(), 0);
        assert_eq!(metadata.certificate(), "");
    }

    #[test]
    fn test_metadata_tracks_count() {
        let mut metadata = CertificateMetadata::with_auth_in_place(0x0202);
        metadata.push_firewall(&sample_descriptor());
        metadata.push_firewall(&sample_descriptor());
        assert_eq!(metadata.auth_in_place(), 0x0202);
        assert_eq!(metadata.firewall_count(), 2);

        metadata.reset_firewalls();
        assert_eq!(metadata.firewall_count(), 0);
        assert_eq!(metadata.certificate(), "");
    }
}
