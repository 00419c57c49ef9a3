use logship_digest::{digest, Output, Rendered};

use crate::cmd::DigestArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_digest, print_raw, DigestOutput, OutputFormat};

pub fn run(args: DigestArgs, format: OutputFormat) -> CliResult<i32> {
    let key = args.key.as_deref();
    let output = if args.raw { Output::Raw } else { Output::Hex };

    match digest(&args.input, key, output) {
        Rendered::Raw(bytes) => print_raw(&bytes),
        Rendered::Hex(hex) => print_digest(
            &DigestOutput {
                algorithm: algorithm(key),
                input_bytes: args.input.len(),
                digest: hex,
            },
            format,
        ),
    }
    Ok(SUCCESS)
}

fn algorithm(key: Option<&str>) -> &'static str {
    match key {
        Some(key) if !key.is_empty() => "hmac-md5",
        _ => "md5",
    }
}
