use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use logship_transport::PipelineStats;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Outcome of one `send` invocation.
#[derive(Debug, Serialize)]
pub struct SendSummary {
    pub url: String,
    pub level: &'static str,
    pub settled: bool,
    pub disabled: bool,
    #[serde(flatten)]
    pub stats: PipelineStats,
}

pub fn print_send_summary(summary: &SendSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "URL",
                    "LEVEL",
                    "DISPATCHED",
                    "DELIVERED",
                    "FAILED",
                    "DROPPED",
                ])
                .add_row(vec![
                    summary.url.clone(),
                    summary.level.to_string(),
                    summary.stats.dispatched.to_string(),
                    summary.stats.delivered.to_string(),
                    summary.stats.failed.to_string(),
                    summary.stats.dropped.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "url={} level={} dispatched={} delivered={} failed={} dropped={} settled={} disabled={}",
                summary.url,
                summary.level,
                summary.stats.dispatched,
                summary.stats.delivered,
                summary.stats.failed,
                summary.stats.dropped,
                summary.settled,
                summary.disabled
            );
        }
        OutputFormat::Raw => println!("{}", summary.stats.delivered),
    }
}

#[derive(Debug, Serialize)]
pub struct DigestOutput {
    pub algorithm: &'static str,
    pub input_bytes: usize,
    pub digest: String,
}

pub fn print_digest(output: &DigestOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ALGORITHM", "INPUT BYTES", "DIGEST"])
                .add_row(vec![
                    output.algorithm.to_string(),
                    output.input_bytes.to_string(),
                    output.digest.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{} = {}", output.algorithm, output.digest),
        OutputFormat::Raw => println!("{}", output.digest),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
