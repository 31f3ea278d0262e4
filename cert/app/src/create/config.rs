/*++

Licensed under the Apache-2.0 license.

File Name:

   config.rs

Abstract:

    File contains utilities for parsing certificate configuration files

--*/

use anyhow::Context;
use k3cert_gen::CertGeneratorNode;
use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;

/// Distinguished-name overrides
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct DistNameConfig {
    pub country: Option<String>,

    pub state: Option<String>,

    pub locality: Option<String>,

    pub organization: Option<String>,

    pub organization_unit: Option<String>,

    pub common_name: Option<String>,

    pub email_address: Option<String>,
}

/// Certificate node configuration
///
/// Scalar properties mirror the hardware-config certificate node; every
/// remaining table is a named child subnode, kept in declaration order.
#[derive(Default, Serialize, Deserialize)]
pub(crate) struct CertConfig {
    pub keyfile: Option<String>,

    #[serde(rename = "auth-in-place")]
    pub auth_in_place: Option<u32>,

    pub sha: Option<u32>,

    #[serde(rename = "sw-rev")]
    pub sw_rev: Option<u32>,

    #[serde(rename = "load-addr")]
    pub load_addr: Option<u64>,

    #[serde(rename = "dist-name")]
    pub dist_name: Option<DistNameConfig>,

    #[serde(flatten)]
    pub subnodes: toml::Table,
}

impl CertConfig {
    /// Child subnodes in declaration order.
    pub fn subnodes(&self) -> Vec<TomlNode<'_>> {
        self.subnodes
            .iter()
            .filter_map(|(name, value)| value.as_table().map(|table| TomlNode { name, table }))
            .collect()
    }
}

/// Load Certificate Configuration from file
pub(crate) fn load_cert_config(path: &PathBuf) -> anyhow::Result<CertConfig> {
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read the config file {}", path.display()))?;

    let config: CertConfig = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    Ok(config)
}

/// Subnode accessor backed by a parsed TOML table.
///
/// A property that is absent, carries a non-integer value, or does not fit
/// the requested width reads as unset; the generator's completeness check
/// then names it in the resulting error.
pub(crate) struct TomlNode<'a> {
    name: &'a str,
    table: &'a toml::Table,
}

impl CertGeneratorNode for TomlNode<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn get_u32(&self, prop: &str) -> Option<u32> {
        self.table.get(prop)?.as_integer()?.try_into().ok()
    }

    fn get_u64(&self, prop: &str) -> Option<u64> {
        self.table.get(prop)?.as_integer()?.try_into().ok()
    }

    fn get_u32_list(&self, prop: &str) -> Option<Vec<u32>> {
        self.table
            .get(prop)?
            .as_array()?
            .iter()
            .map(|value| -> Option<u32> { value.as_integer()?.try_into().ok() })
            .collect()
    }
}
