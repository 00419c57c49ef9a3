use std::time::Duration;

use logship_event::{Event, Graph, Severity, Value};
use logship_stream::{LogStream, StreamConfig};

use crate::cmd::SendArgs;
use crate::exit::{
    event_error, stream_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, TIMEOUT, USAGE,
};
use crate::output::{print_send_summary, OutputFormat, SendSummary};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let event = resolve_event(&args)?;
    let level = Severity::from(args.level);
    let config = resolve_config(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))?;

    let summary = runtime.block_on(async {
        let stream =
            LogStream::new(config).map_err(|err| stream_error("stream setup failed", err))?;
        stream.send(level, event);
        let settled = stream.settle(timeout).await;

        Ok::<_, CliError>(SendSummary {
            url: stream.url(),
            level: level.as_str(),
            settled,
            disabled: stream.is_disabled(),
            stats: stream.stats(),
        })
    })?;

    print_send_summary(&summary, format);

    if !summary.settled {
        return Err(CliError::new(
            TIMEOUT,
            format!("delivery did not complete within {}", args.timeout),
        ));
    }
    if summary.stats.failed > 0 || summary.stats.dropped > 0 {
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

fn resolve_config(args: &SendArgs) -> CliResult<StreamConfig> {
    let token = args
        .token
        .clone()
        .ok_or_else(|| CliError::new(USAGE, "a token is required (argument or LOGSHIP_TOKEN)"))?;

    let mut config = StreamConfig::new(token)
        .with_tls(!args.insecure)
        .with_page_info(args.page_info)
        .with_echo(args.echo);
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    config
        .validate()
        .map_err(|err| stream_error("invalid configuration", err))?;
    Ok(config)
}

fn resolve_event(args: &SendArgs) -> CliResult<Event> {
    let mut graph = Graph::new();
    let values: Vec<Value> = if !args.json.is_empty() {
        args.json
            .iter()
            .map(|text| {
                serde_json::from_str::<serde_json::Value>(text)
                    .map(|json| graph.import(json))
                    .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))
            })
            .collect::<CliResult<_>>()?
    } else {
        args.data.iter().map(|text| Value::from(text.as_str())).collect()
    };

    if values.is_empty() {
        return Err(CliError::new(USAGE, "nothing to send: pass --json or --data"));
    }
    Event::from_args(graph, values).map_err(|err| event_error("invalid event", err))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
