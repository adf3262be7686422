use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use yamlrest_engine::{
    CannedTransport, ExecutionContext, HarnessConfig, HttpTransport, TestScript, parse_script_file, run_script,
};
use yamlrest_types::Version;

// Blocking transport owns its own runtime, so main stays synchronous.
fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => run_cmd(sub),
        Some(("check", sub)) => check_cmd(sub),
        Some(("apis", sub)) => apis_cmd(sub),
        _ => bail!("expected a subcommand; see --help"),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .action(ArgAction::Set)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Harness config file (YAML or JSON)");
    let api_spec_arg = Arg::new("api-spec")
        .long("api-spec")
        .action(ArgAction::Append)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Extra API definition file; may be repeated");

    Command::new("yamlrest")
        .about("Run declarative REST test scripts")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Run a script against the configured service")
                .arg(Arg::new("script").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(config_arg.clone())
                .arg(api_spec_arg.clone())
                .arg(Arg::new("base-url").long("base-url").action(ArgAction::Set).help("Overrides the configured base URL"))
                .arg(
                    Arg::new("server-version")
                        .long("server-version")
                        .action(ArgAction::Set)
                        .help("Pin the service version instead of probing it"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Echo requests instead of sending them"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a script and list its steps")
                .arg(Arg::new("script").required(true).value_parser(clap::value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("apis")
                .about("List known API names")
                .arg(config_arg)
                .arg(api_spec_arg),
        )
}

fn load_config(matches: &ArgMatches) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(specs) = matches.get_many::<PathBuf>("api-spec") {
        config.api_specs.extend(specs.cloned());
    }
    Ok(config)
}

fn run_cmd(matches: &ArgMatches) -> Result<()> {
    let script_path = matches.get_one::<PathBuf>("script").context("script path is required")?;
    let script = parse_script_file(script_path)?;

    let mut config = load_config(matches)?;
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    if let Some(raw) = matches.get_one::<String>("server-version") {
        config.server_version = Some(Version::from_str(raw).with_context(|| format!("invalid --server-version '{raw}'"))?);
    }

    let context = if matches.get_flag("dry-run") {
        ExecutionContext::new(dry_run_transport(&config))
    } else {
        let registry = config.load_registry()?;
        ExecutionContext::new(HttpTransport::connect(&config, registry)?)
    };
    let mut context = context.with_default_params(config.default_param_policy());

    let result = run_and_print(&mut context, &script);
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "stash": context.stash().to_value() }))?);
    result
}

/// Echo transport for `--dry-run`; an unpinned version behaves like a current release.
fn dry_run_transport(config: &HarnessConfig) -> CannedTransport {
    config.server_version.map(CannedTransport::new).unwrap_or_default()
}

fn run_and_print(context: &mut ExecutionContext, script: &TestScript) -> Result<()> {
    let reports = run_script(context, script)?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    info!(steps = reports.len(), "script completed");
    Ok(())
}

fn check_cmd(matches: &ArgMatches) -> Result<()> {
    let script_path = matches.get_one::<PathBuf>("script").context("script path is required")?;
    let script = parse_script_file(script_path)?;
    println!("{}: {} steps", script.name.as_deref().unwrap_or("<unnamed>"), script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        println!("  {index:>3}  {}", step.describe());
    }
    Ok(())
}

fn apis_cmd(matches: &ArgMatches) -> Result<()> {
    let registry = load_config(matches)?.load_registry()?;
    for name in registry.names() {
        if let Some(endpoint) = registry.find(name) {
            println!("{name:<28} {:<12} {}", endpoint.methods.join(","), endpoint.paths.join("  "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn dry_run_without_pinned_version_keeps_error_trace() {
        let config = HarnessConfig::default();
        let mut context =
            ExecutionContext::new(dry_run_transport(&config)).with_default_params(config.default_param_policy());
        let response = context
            .call_api("cluster.put_settings", &IndexMap::new(), &[json!({"transient": {}})], &IndexMap::new())
            .unwrap();
        assert_eq!(response.body["params"]["error_trace"], "true");
    }

    #[test]
    fn dry_run_honours_pinned_legacy_version() {
        let config = HarnessConfig {
            server_version: Some(Version::new(5, 1, 2)),
            ..HarnessConfig::default()
        };
        let mut context =
            ExecutionContext::new(dry_run_transport(&config)).with_default_params(config.default_param_policy());
        let response = context
            .call_api("cluster.put_settings", &IndexMap::new(), &[], &IndexMap::new())
            .unwrap();
        assert!(response.body["params"].get("error_trace").is_none());
    }

    #[test]
    fn parses_run_arguments() {
        let matches = build_cli()
            .try_get_matches_from([
                "yamlrest",
                "run",
                "smoke.yaml",
                "--api-spec",
                "a.yaml",
                "--api-spec",
                "b.yaml",
                "--dry-run",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        assert!(sub.get_flag("dry-run"));
        assert_eq!(sub.get_many::<PathBuf>("api-spec").unwrap().count(), 2);
    }
}
