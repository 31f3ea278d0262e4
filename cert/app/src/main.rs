/*++

Licensed under the Apache-2.0 license.

File Name:

   main.rs

Abstract:

    Main entry point for the K3 secure boot certificate application

--*/
use std::path::PathBuf;

use clap::{arg, value_parser, Command};

mod create;

/// Entry point
fn main() {
    let sub_cmds = vec![Command::new("create")
        .about("Create the secure boot certificate for a firmware image")
        .arg(
            arg!(--"config" <FILE> "Certificate Configuration file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"image" <FILE> "Firmware image payload to certify")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"out" <FILE> "Output DER certificate")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"config-out" <FILE> "Output file for the generated signing configuration")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--"no-sign" "Stop after writing the signing configuration").required(false))];

    let cmd = Command::new("k3cert-app")
        .arg_required_else_help(true)
        .subcommands(sub_cmds)
        .about("K3 secure boot certificate tools")
        .get_matches();

    let result = match cmd.subcommand().unwrap() {
        ("create", args) => create::run_cmd(args),
        (_, _) => unreachable!(),
    };

    if let Err(e) = result {
        println!("Fatal Error: {e:?}");
        std::process::exit(1);
    }
}
