/*++

Licensed under the Apache-2.0 license.

File Name:

   mod.rs

Abstract:

    File contains implementation of the certificate creation command.

--*/

mod config;

use anyhow::{anyhow, bail, Context};
use clap::ArgMatches;
use k3cert_gen::{CertGeneratorConfig, CertificateGenerator, DistinguishedName};
use k3cert_openssl::OsslCrypto;
use k3cert_types::*;
use std::path::{Path, PathBuf};
use std::process::Command;

use config::DistNameConfig;

/// Run the command
pub(crate) fn run_cmd(args: &ArgMatches) -> anyhow::Result<()> {
    let config_path: &PathBuf = args
        .get_one::<PathBuf>("config")
        .with_context(|| "config arg not specified")?;

    let image_path: &PathBuf = args
        .get_one::<PathBuf>("image")
        .with_context(|| "image arg not specified")?;

    let out_path: &PathBuf = args
        .get_one::<PathBuf>("out")
        .with_context(|| "out arg not specified")?;

    let config = config::load_cert_config(config_path)?;

    let content = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image file {}", image_path.display()))?;

    let sha = config.sha.unwrap_or(DEFAULT_SHA_BITS);

    let gen_config = CertGeneratorConfig {
        dist_name: dist_name(config.dist_name.as_ref()),
        sha,
        sw_rev: config.sw_rev.unwrap_or(DEFAULT_SW_REV),
        load_addr: config.load_addr.unwrap_or(DEFAULT_LOAD_ADDR),
        auth_in_place: config.auth_in_place,
        subnodes: config.subnodes(),
        content,
    };

    let gen = CertificateGenerator::new(OsslCrypto::default());
    let cert_config = gen.generate(&gen_config)?;

    let cnf_path = match args.get_one::<PathBuf>("config-out") {
        Some(path) => path.clone(),
        None => out_path.with_extension("cnf"),
    };
    std::fs::write(&cnf_path, &cert_config)
        .with_context(|| format!("Failed to write config file {}", cnf_path.display()))?;

    if args.get_flag("no-sign") {
        return Ok(());
    }

    let keyfile = config
        .keyfile
        .as_ref()
        .ok_or_else(|| anyhow!("Missing keyfile in {}", config_path.display()))?;
    let config_dir = config_path
        .parent()
        .with_context(|| "Invalid parent path")?;
    let key_path = config_dir.join(keyfile);

    sign_cert(&cnf_path, &key_path, out_path, sha)
}

/// Distinguished name with config overrides applied.
fn dist_name(overrides: Option<&DistNameConfig>) -> DistinguishedName {
    let mut dist_name = DistinguishedName::default();
    let Some(overrides) = overrides else {
        return dist_name;
    };
    if let Some(country) = &overrides.country {
        dist_name.country = country.clone();
    }
    if let Some(state) = &overrides.state {
        dist_name.state = state.clone();
    }
    if let Some(locality) = &overrides.locality {
        dist_name.locality = locality.clone();
    }
    if let Some(organization) = &overrides.organization {
        dist_name.organization = organization.clone();
    }
    if let Some(organization_unit) = &overrides.organization_unit {
        dist_name.organization_unit = organization_unit.clone();
    }
    if let Some(common_name) = &overrides.common_name {
        dist_name.common_name = common_name.clone();
    }
    if let Some(email_address) = &overrides.email_address {
        dist_name.email_address = email_address.clone();
    }
    dist_name
}

/// Sign the generated configuration with the external openssl tool.
fn sign_cert(cnf_path: &Path, key_path: &Path, out_path: &Path, sha: u32) -> anyhow::Result<()> {
    let output = Command::new("openssl")
        .arg("req")
        .arg("-new")
        .arg("-x509")
        .arg("-key")
        .arg(key_path)
        .arg("-nodes")
        .arg("-outform")
        .arg("DER")
        .arg("-out")
        .arg(out_path)
        .arg("-config")
        .arg(cnf_path)
        .arg(format!("-sha{sha}"))
        .output()
        .with_context(|| "Failed to run openssl")?;

    if !output.status.success() {
        bail!(
            "openssl req failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}
