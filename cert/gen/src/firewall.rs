/*++

Licensed under the Apache-2.0 license.

File Name:

   firewall.rs

Abstract:

    File contains firewall subnode reading and validation.

--*/

use anyhow::bail;
use k3cert_types::FirewallDescriptor;

use crate::CertGeneratorNode;

/// Raw contents of one firewall subnode, prior to validation.
///
/// Any property the input omitted stays unset; [`FirewallRecord::validate`]
/// turns a complete record into an immutable [`FirewallDescriptor`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FirewallRecord {
    pub id: Option<u32>,

    pub region: Option<u32>,

    pub control: Option<u32>,

    pub permissions: Option<Vec<u32>>,

    pub start_address: Option<u64>,

    pub end_address: Option<u64>,
}

impl FirewallRecord {
    /// Read the six firewall properties off a config subnode.
    pub fn read_from<N: CertGeneratorNode>(node: &N) -> Self {
        Self {
            id: node.get_u32("id"),
            region: node.get_u32("region"),
            control: node.get_u32("control"),
            permissions: node.get_u32_list("permissions"),
            start_address: node.get_u64("start_address"),
            end_address: node.get_u64("end_address"),
        }
    }

    /// Names of all unset properties, in declaration order.
    pub fn missing_props(&self) -> Vec<&'static str> {
        [
            ("id", self.id.is_none()),
            ("region", self.region.is_none()),
            ("control", self.control.is_none()),
            ("permissions", self.permissions.is_none()),
            ("start_address", self.start_address.is_none()),
            ("end_address", self.end_address.is_none()),
        ]
        .iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| *name)
        .collect()
    }

    /// Check that every property is present and produce the descriptor.
    ///
    /// The error lists every missing property, not just the first, so a
    /// hardware engineer can fix the subnode in one pass.
    pub fn validate(self, subnode_name: &str) -> anyhow::Result<FirewallDescriptor> {
        match self {
            Self {
                id: Some(id),
                region: Some(region),
                control: Some(control),
                permissions: Some(permissions),
                start_address: Some(start_address),
                end_address: Some(end_address),
            } => Ok(FirewallDescriptor {
                id,
                region,
                control,
                permissions,
                start_address,
                end_address,
            }),
            record => bail!(
                "Subnode '{subnode_name}' is missing properties: {}",
                record.missing_props().join(",")
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn complete_record() -> FirewallRecord {
        FirewallRecord {
            id: Some(257),
            region: Some(0),
            control: Some(0x30000C01),
            permissions: Some(vec![0xFFFF]),
            start_address: Some(0),
            end_address: Some(0xFFFF_FFFF),
        }
    }

    #[test]
    fn test_validate_complete_record() {
        let descriptor = complete_record().validate("firewall-257-0").unwrap();
        assert_eq!(descriptor.id, 257);
        assert_eq!(descriptor.region, 0);
        assert_eq!(descriptor.control, 0x30000C01);
        assert_eq!(descriptor.permissions, vec![0xFFFF]);
        assert_eq!(descriptor.start_address, 0);
        assert_eq!(descriptor.end_address, 0xFFFF_FFFF);
    }

    #[test]
    fn test_validate_reports_single_missing_prop() {
        let record = FirewallRecord {
            control: None,
            ..complete_record()
        };
        assert_eq!(
            record.validate("firewall-x").unwrap_err().to_string(),
            "Subnode 'firewall-x' is missing properties: control"
        );
    }

    #[test]
    fn test_validate_reports_every_missing_prop() {
        let record = FirewallRecord {
            region: None,
            permissions: None,
            end_address: None,
            ..complete_record()
        };
        assert_eq!(
            record.validate("firewall-background").unwrap_err().to_string(),
            "Subnode 'firewall-background' is missing properties: \
             region,permissions,end_address"
        );
    }

    #[test]
    fn test_validate_empty_record() {
        assert_eq!(
            FirewallRecord::default()
                .validate("firewall-0-0")
                .unwrap_err()
                .to_string(),
            "Subnode 'firewall-0-0' is missing properties: \
             id,region,control,permissions,start_address,end_address"
        );
    }

    #[test]
    fn test_missing_props_matches_unset_fields() {
        assert!(complete_record().missing_props().is_empty());

        let record = FirewallRecord {
            id: None,
            start_address: None,
            ..complete_record()
        };
        assert_eq!(record.missing_props(), vec!["id", "start_address"]);
    }

    #[test]
    fn test_empty_permission_list_is_present() {
        // an empty list is a caller decision, not a missing property
        let record = FirewallRecord {
            permissions: Some(vec![]),
            ..complete_record()
        };
        let descriptor = record.validate("firewall-257-0").unwrap();
        assert!(descriptor.permissions.is_empty());
    }
}
