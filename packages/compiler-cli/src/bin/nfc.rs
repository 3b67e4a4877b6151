/**
 * Native Feature Compiler CLI - nfc
 *
 * Generates the native-image initialization unit from declaration manifests.
 */
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use native_feature_compiler::logging::ConsoleLogger;
use native_feature_compiler::LogLevel;
use native_feature_compiler_cli::config::nfc::CONFIG_FILE_NAME;
use native_feature_compiler_cli::config::NfcConfig;
use native_feature_compiler_cli::error::CliError;
use native_feature_compiler_cli::perform_generate::{
    perform_generate, perform_inspect, perform_plan,
};
use std::path::{Path, PathBuf};
use std::process;

fn project_args() -> [Arg; 4] {
    [
        Arg::new("config")
            .short('c')
            .long("config")
            .value_name("PATH")
            .help("Path to nfc.json (defaults to ./nfc.json when present)"),
        Arg::new("manifest")
            .short('m')
            .long("manifest")
            .value_name("GLOB")
            .action(ArgAction::Append)
            .help("Declaration manifest pattern; replaces the configured ones"),
        Arg::new("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("debug, info, warn or error"),
        Arg::new("unit-name")
            .long("unit-name")
            .value_name("NAME")
            .help("Internal name of the generated unit"),
    ]
}

fn cli() -> Command {
    Command::new("nfc")
        .version(native_feature_compiler_cli::version())
        .about("Native image feature compiler")
        .subcommand_required(true)
        .subcommand(
            Command::new("generate")
                .about("Synthesize the initialization unit")
                .args(project_args())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help("Output directory"),
                )
                .arg(
                    Arg::new("listing")
                        .long("listing")
                        .action(ArgAction::SetTrue)
                        .help("Also write a text listing beside the unit"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the merged registration plan as JSON")
                .args(project_args()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the listing of a generated unit")
                .arg(Arg::new("artifact").required(true).value_name("FILE")),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<NfcConfig> {
    let explicit = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = match explicit.or_else(|| NfcConfig::discover(Path::new("."))) {
        Some(path) => NfcConfig::load(&path)?,
        None => NfcConfig::default(),
    };

    if let Some(manifests) = matches.get_many::<String>("manifest") {
        // Command-line patterns are relative to the working directory.
        config.manifests = manifests
            .map(|m| std::env::current_dir().map(|cwd| cwd.join(m).to_string_lossy().into_owned()))
            .collect::<Result<_, _>>()
            .context("failed to resolve the working directory")?;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.log_level = level
            .parse::<LogLevel>()
            .map_err(CliError::InvalidLogLevel)?;
    }
    if let Some(unit_name) = matches.get_one::<String>("unit-name") {
        config.synthesis.unit_name = unit_name.clone();
    }
    if let Ok(Some(output)) = matches.try_get_one::<String>("output") {
        config.output_dir = Some(std::env::current_dir()?.join(output));
    }
    Ok(config)
}

fn run() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("generate", sub)) => {
            let config = load_config(sub)?;
            let logger = ConsoleLogger::new(config.log_level);
            let result = perform_generate(&config, &logger, sub.get_flag("listing"))?;
            println!("{}", result.artifact.display());
        }
        Some(("plan", sub)) => {
            let config = load_config(sub)?;
            let logger = ConsoleLogger::new(config.log_level);
            println!("{}", perform_plan(&config, &logger)?);
        }
        Some(("inspect", sub)) => {
            let artifact = sub
                .get_one::<String>("artifact")
                .context("missing artifact path")?;
            print!("{}", perform_inspect(Path::new(artifact))?);
        }
        _ => unreachable!("a subcommand is required"),
    }
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {:#}", error);
        if error.downcast_ref::<CliError>().is_some_and(|e| matches!(e, CliError::NoManifests)) {
            eprintln!("hint: list manifest patterns in {} or pass --manifest", CONFIG_FILE_NAME);
        }
        process::exit(1);
    }
}
