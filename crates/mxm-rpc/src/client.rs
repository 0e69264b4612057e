//! Maxemail API client facade.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;
use url::Url;

use maxemail_client::{
    ClientConfig, Credentials, DeprecationInterceptor, DeprecationNotice, DeprecationSink, Error,
    ErrorParser, Logger, LoggerHandle, MxmHttpClient, RequestLogger, Result, MISSING_CREDENTIALS,
};

use crate::helper::FileTransfer;
use crate::options::ClientOptions;
use crate::service::Service;

/// Default Maxemail API endpoint.
pub const DEFAULT_URI: &str = "https://mxm.xtremepush.com/";

const API_PATH: &str = "api/json/";
const FILE_UPLOAD_SERVICE: &str = "file_upload";

/// Entry point to the Maxemail API.
///
/// Services are reached by name through [`service`](Self::service); the HTTP
/// transport behind them is built on first use and shared by every service
/// and the file transfer helper.
///
/// # Example
///
/// ```rust,ignore
/// use maxemail_rpc::{Client, Credentials};
/// use serde_json::json;
///
/// let client = Client::new(Credentials::token("apitoken"))?;
/// let root = client.service("folder")?.invoke("fetchRoot", &[json!("email")]).await?;
/// ```
#[derive(Debug)]
pub struct Client {
    uri: Url,
    credentials: Credentials,
    debug_logging: bool,
    config: ClientConfig,
    logger: LoggerHandle,
    deprecations: DeprecationSink,
    transport: Mutex<Option<Arc<MxmHttpClient>>>,
    services: Mutex<HashMap<String, Arc<Service>>>,
    helper: Mutex<Option<Arc<FileTransfer>>>,
}

impl Client {
    /// Client for the default endpoint.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder().credentials(credentials).build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Client from deserialized options.
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        let mut builder = Self::builder()
            .credentials(options.credentials()?)
            .debug_logging(options.debug_logging);
        if let Some(uri) = options.uri {
            builder = builder.uri(uri);
        }
        builder.build()
    }

    /// Client configured from `MXM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_options(ClientOptions::from_env())
    }

    /// Normalized endpoint, e.g. `https://mxm.xtremepush.com/`.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn is_debug_logging(&self) -> bool {
        self.debug_logging
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Proxy for the named service. Repeated calls return the same instance.
    pub fn service(&self, name: &str) -> Result<Arc<Service>> {
        let transport = self.transport()?;
        let mut services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        let service = services
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Service::new(name, transport)));
        Ok(Arc::clone(service))
    }

    /// File upload/download helper.
    pub fn helper(&self) -> Result<Arc<FileTransfer>> {
        if let Some(helper) = self
            .helper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(helper));
        }

        let transport = self.transport()?;
        let file_upload = self.service(FILE_UPLOAD_SERVICE)?;
        let mut slot = self.helper.lock().unwrap_or_else(PoisonError::into_inner);
        let helper = slot.get_or_insert_with(|| {
            Arc::new(FileTransfer::new(transport, file_upload, self.logger.clone()))
        });
        Ok(Arc::clone(helper))
    }

    /// Install the logger for deprecation warnings, debug logging and the
    /// file transfer helper.
    pub fn set_logger(&self, logger: Arc<dyn Logger>) {
        self.logger.set(logger);
    }

    /// The installed logger, a no-op one unless [`set_logger`](Self::set_logger) was called.
    pub fn logger(&self) -> Arc<dyn Logger> {
        self.logger.get()
    }

    /// Drain the deprecation notices received so far.
    ///
    /// Only the most recent 100 undrained notices are kept.
    pub fn take_deprecations(&self) -> Vec<DeprecationNotice> {
        self.deprecations.take()
    }

    /// Run `callback` for every deprecation notice received from now on.
    pub fn on_deprecation<F>(&self, callback: F)
    where
        F: Fn(&DeprecationNotice) + Send + Sync + 'static,
    {
        self.deprecations.set_callback(callback);
    }

    fn transport(&self) -> Result<Arc<MxmHttpClient>> {
        let mut slot = self.transport.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(transport) = slot.as_ref() {
            return Ok(Arc::clone(transport));
        }

        let base_url = self.uri.join(API_PATH)?;
        debug!(base_url = %base_url, debug_logging = self.debug_logging, "Building transport");

        let mut transport = MxmHttpClient::new(base_url, &self.credentials, self.config.clone())?;
        if self.debug_logging {
            transport = transport.with_interceptor(Arc::new(RequestLogger::new(self.logger.clone())));
        }
        let transport = Arc::new(
            transport
                .with_interceptor(Arc::new(DeprecationInterceptor::new(
                    self.logger.clone(),
                    self.deprecations.clone(),
                )))
                .with_interceptor(Arc::new(ErrorParser)),
        );

        *slot = Some(Arc::clone(&transport));
        Ok(transport)
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    uri: Option<String>,
    debug_logging: bool,
    config: ClientConfig,
    logger: Option<Arc<dyn Logger>>,
}

impl ClientBuilder {
    /// Token or username/password credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// API endpoint; any path is discarded.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Log every request and response at debug level.
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Transport tuning.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Validate and build the client. No connection is made.
    pub fn build(self) -> Result<Client> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::invalid_argument(MISSING_CREDENTIALS))?;
        let uri = normalize_uri(self.uri.as_deref().unwrap_or(DEFAULT_URI))?;
        let logger = self.logger.map(LoggerHandle::new).unwrap_or_default();

        Ok(Client {
            uri,
            credentials,
            debug_logging: self.debug_logging,
            config: self.config,
            logger,
            deprecations: DeprecationSink::new(),
            transport: Mutex::new(None),
            services: Mutex::new(HashMap::new()),
            helper: Mutex::new(None),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("credentials", &self.credentials)
            .field("uri", &self.uri)
            .field("debug_logging", &self.debug_logging)
            .field("config", &self.config)
            .field("logger", &self.logger.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Reduce a URI to `scheme://host[:port]/`.
pub fn normalize_uri(raw: &str) -> Result<Url> {
    const MISSING_PARTS: &str = "URI must contain protocol scheme and host";

    if raw.trim().trim_matches('/').is_empty() && !raw.is_empty() {
        return Err(Error::invalid_argument("URI malformed"));
    }

    let parsed = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(Error::invalid_argument(MISSING_PARTS))
        }
        Err(e) => {
            return Err(Error::with_source(
                maxemail_client::ErrorKind::InvalidArgument("URI malformed".into()),
                e,
            ))
        }
    };

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(Error::invalid_argument(MISSING_PARTS)),
    };

    let normalized = match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    };
    Url::parse(&normalized).map_err(Into::into)
}
