use serde_json::{json, Value};

/// Source of the metadata sent in `PAGE` envelopes.
///
/// Returns a flat descriptive mapping; nested objects are allowed for
/// grouped dimensions such as screen size.
pub trait PageInfoSource: Send + Sync {
    fn page_info(&self) -> Value;
}

/// Describes the running process, for hosts without a browser page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostInfo;

impl PageInfoSource for HostInfo {
    fn page_info(&self) -> Value {
        let executable = std::env::current_exe()
            .ok()
            .map(|path| path.display().to_string());
        let cwd = std::env::current_dir()
            .ok()
            .map(|path| path.display().to_string());

        json!({
            "url": executable,
            "referrer": Value::Null,
            "cwd": cwd,
            "pid": std::process::id(),
            "platform": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "family": std::env::consts::FAMILY,
            "agent": {
                "name": "logship",
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }
}

/// Returns a fixed mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPageInfo(pub Value);

impl PageInfoSource for StaticPageInfo {
    fn page_info(&self) -> Value {
        self.0.clone()
    }
}
