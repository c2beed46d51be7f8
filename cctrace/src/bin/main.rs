// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, anyhow};
use cctrace::application::Application;
use cctrace::semantic::Invocation;
use cctrace::{args, config};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Parse the command line arguments.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;

    // Initialize the logging system.
    init_logging(arguments.verbosity);
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");
    let os = env::consts::OS;
    let family = env::consts::FAMILY;
    let arch = env::consts::ARCH;
    log::info!("Running on... {family}/{os} {arch}");
    log::info!("{arguments}");

    let current_directory =
        env::current_dir().with_context(|| "Failed to get current working directory")?;
    // Load the configuration.
    let configuration = config::Loader::load(&current_directory, &arguments.config)?;
    log::info!("{configuration}");

    let working_dir = arguments.directory.as_ref().map(PathBuf::from).unwrap_or(current_directory);
    let invocation = Invocation::from_command_line(working_dir, &arguments.command)
        .ok_or_else(|| anyhow!("Missing compiler command"))?;

    // Run the application.
    let application = Application::configure(&configuration, &arguments.output);
    log::debug!("Configuration complete, analyzing the compiler call now...");
    let result = application.run(&invocation);
    log::debug!("Exit code: {result:?}");

    Ok(result)
}

/// The `RUST_LOG` environment variable sets the level, unless the
/// verbose flag was given on the command line.
fn init_logging(verbosity: u8) {
    let pid = std::process::id();
    let mut builder = env_logger::Builder::from_default_env();
    match verbosity {
        0 => &mut builder,
        1 => builder.filter_level(log::LevelFilter::Info),
        2 => builder.filter_level(log::LevelFilter::Debug),
        _ => builder.filter_level(log::LevelFilter::Trace),
    };
    builder
        .format(move |buf, record| {
            writeln!(buf, "[cctrace/{pid}] {} {}", record.level(), record.args())
        })
        .init();
}
