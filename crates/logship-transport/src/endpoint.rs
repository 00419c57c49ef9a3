use std::fmt;
use std::sync::Arc;

/// Collector host used when nothing overrides it.
pub const DEFAULT_ENDPOINT: &str = "localhost:8080/v1";

/// Environment variable consulted on every send for a collector host.
pub const ENDPOINT_ENV: &str = "LOGSHIP_ENDPOINT";

/// URL scheme of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn from_tls(use_tls: bool) -> Self {
        if use_tls {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability of the request object carrying submissions.
///
/// The mode picks the URL scheme and whether requests carry the
/// `X-Requested-With` marker (see [`crate::Submission::for_mode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Full request support; the configured TLS option is used verbatim.
    #[default]
    Standard,
    /// Legacy cross-domain requests, which must mirror the hosting page's
    /// own scheme to satisfy mixed-content restrictions. These are marked
    /// as AJAX requests.
    Legacy { page_scheme: Scheme },
}

type AmbientSource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Resolves the submission URL for a stream at send time.
///
/// Host precedence: the stream's configured endpoint, then the ambient
/// source (by default [`ENDPOINT_ENV`]), then [`DEFAULT_ENDPOINT`]. The
/// ambient source is consulted on every call, never cached.
#[derive(Clone)]
pub struct EndpointResolver {
    use_tls: bool,
    mode: TransportMode,
    configured: Option<String>,
    ambient: AmbientSource,
}

impl EndpointResolver {
    pub fn new(use_tls: bool) -> Self {
        Self {
            use_tls,
            mode: TransportMode::Standard,
            configured: None,
            ambient: Arc::new(|| std::env::var(ENDPOINT_ENV).ok()),
        }
    }

    /// Override the transport mode.
    pub fn with_mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Pin the collector host for this stream.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.configured = endpoint.filter(|host| !host.is_empty());
        self
    }

    /// Replace the ambient override source.
    pub fn with_ambient<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.ambient = Arc::new(source);
        self
    }

    pub fn scheme(&self) -> Scheme {
        match self.mode {
            TransportMode::Legacy { page_scheme } => page_scheme,
            TransportMode::Standard => Scheme::from_tls(self.use_tls),
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn host(&self) -> String {
        if let Some(host) = &self.configured {
            return host.clone();
        }
        (self.ambient)()
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// `{scheme}://{host}/logs/{token}`
    pub fn url(&self, token: &str) -> String {
        format!("{}://{}/logs/{}", self.scheme(), self.host(), token)
    }
}

impl fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointResolver")
            .field("use_tls", &self.use_tls)
            .field("mode", &self.mode)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn no_ambient(use_tls: bool) -> EndpointResolver {
        EndpointResolver::new(use_tls).with_ambient(|| None)
    }

    #[test]
    fn default_host_without_override() {
        let resolver = no_ambient(true);
        assert_eq!(
            resolver.url("test_token"),
            "https://localhost:8080/v1/logs/test_token"
        );
    }

    #[test]
    fn tls_option_selects_scheme_in_standard_mode() {
        assert_eq!(no_ambient(true).scheme(), Scheme::Https);
        assert_eq!(no_ambient(false).scheme(), Scheme::Http);
    }

    #[test]
    fn legacy_mode_mirrors_page_scheme() {
        let resolver = no_ambient(true).with_mode(TransportMode::Legacy {
            page_scheme: Scheme::Http,
        });
        assert_eq!(resolver.scheme(), Scheme::Http);

        let resolver = no_ambient(false).with_mode(TransportMode::Legacy {
            page_scheme: Scheme::Https,
        });
        assert_eq!(resolver.scheme(), Scheme::Https);
    }

    #[test]
    fn ambient_override_is_used_verbatim() {
        let resolver =
            EndpointResolver::new(true).with_ambient(|| Some("somwhere.com/custom-logging".into()));
        assert_eq!(
            resolver.url("test_token"),
            "https://somwhere.com/custom-logging/logs/test_token"
        );
    }

    #[test]
    fn ambient_source_is_read_on_every_call() {
        let current = Arc::new(Mutex::new(None::<String>));
        let source = Arc::clone(&current);
        let resolver = EndpointResolver::new(false).with_ambient(move || {
            source
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        });

        assert_eq!(resolver.host(), DEFAULT_ENDPOINT);
        *current.lock().unwrap() = Some("collector.internal:9000".to_string());
        assert_eq!(resolver.url("t"), "http://collector.internal:9000/logs/t");
    }

    #[test]
    fn configured_endpoint_wins_over_ambient() {
        let resolver = EndpointResolver::new(true)
            .with_ambient(|| Some("ambient.example".into()))
            .with_endpoint(Some("pinned.example".into()));
        assert_eq!(resolver.host(), "pinned.example");
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let resolver = EndpointResolver::new(true)
            .with_ambient(|| Some(String::new()))
            .with_endpoint(Some(String::new()));
        assert_eq!(resolver.host(), DEFAULT_ENDPOINT);
    }
}
