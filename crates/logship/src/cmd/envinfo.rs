use std::collections::BTreeMap;

use logship_transport::{EndpointResolver, DEFAULT_ENDPOINT, ENDPOINT_ENV};
use serde::Serialize;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

const TOKEN_ENV: &str = "LOGSHIP_TOKEN";

/// Where submissions would go if a stream were created now.
#[derive(Serialize)]
struct EndpointInfo {
    default: &'static str,
    resolved: String,
    source: &'static str,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: &'static str,
    target: String,
    endpoint: EndpointInfo,
    environment: BTreeMap<&'static str, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let override_host = std::env::var(ENDPOINT_ENV).ok();

    let mut environment = BTreeMap::new();
    environment.insert(
        TOKEN_ENV,
        std::env::var(TOKEN_ENV)
            .ok()
            .map(|token| format!("<redacted:{} bytes>", token.len())),
    );
    environment.insert(ENDPOINT_ENV, override_host.clone());
    environment.insert("RUST_LOG", std::env::var("RUST_LOG").ok());

    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION"),
        target: target(),
        endpoint: EndpointInfo {
            default: DEFAULT_ENDPOINT,
            resolved: EndpointResolver::new(true).host(),
            source: endpoint_source(override_host.as_deref()),
        },
        environment,
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

fn endpoint_source(override_host: Option<&str>) -> &'static str {
    match override_host {
        Some(host) if !host.is_empty() => "environment",
        _ => "default",
    }
}

fn target() -> String {
    option_env!("LOGSHIP_BUILD_TARGET")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS))
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("logship {} ({})\n", output.version, output.target);
            println!(
                "  Collector:  {} (from {})",
                output.endpoint.resolved, output.endpoint.source
            );
            println!("  Default:    {}", output.endpoint.default);
            for (name, value) in &output.environment {
                println!("  {:<18}{}", name, value.as_deref().unwrap_or("(not set)"));
            }
        }
        OutputFormat::Raw => println!("{}", output.endpoint.resolved),
    }
}
