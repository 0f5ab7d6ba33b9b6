use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::FutureExt;
use http::StatusCode;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use hyper::{Request, Response};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tower::timeout::Timeout;
use tower::Service;
use url::Url;

use crate::request_builder::{ensure_trailing_slash, url_join_segment};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(10);

type BodyTy = Full<Bytes>;

type HttpsClient = Client<HttpsConnector<HttpConnector>, BodyTy>;
type TimeoutClient = Timeout<HttpsClient>;
pub type PausedClient = PauseLayerMiddleware<TimeoutClient>;

#[derive(Clone)]
pub struct GatewayProvider {
    pub(crate) client: PausedClient,
    pub(crate) headers: HeaderMap,
    pub(crate) gateway_url: Url,
    pub(crate) feeder_gateway_url: Url,
    /// Passed as the `token` query parameter of `add_transaction`.
    pub(crate) token: Option<String>,
    pause_until: Arc<RwLock<Option<Instant>>>,
}

impl std::fmt::Debug for GatewayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayProvider")
            .field("gateway_url", &self.gateway_url)
            .field("feeder_gateway_url", &self.feeder_gateway_url)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GatewayProvider {
    /// This function will append the /gateway and /feeder_gateway suffixes to this single base url to get
    /// the feeder-gateway and gateway urls.
    pub fn new_from_base_path(base_path: Url) -> Self {
        let (mut gateway_url, mut feeder_gateway_url) = (base_path.clone(), base_path);
        url_join_segment(&mut gateway_url, "gateway");
        url_join_segment(&mut feeder_gateway_url, "feeder_gateway");
        Self::new(gateway_url, feeder_gateway_url)
    }

    /// Both urls are used as bases for method paths, a missing trailing `/` is added so the last segment
    /// is kept when joining.
    pub fn new(mut gateway_url: Url, mut feeder_gateway_url: Url) -> Self {
        ensure_trailing_slash(&mut gateway_url);
        ensure_trailing_slash(&mut feeder_gateway_url);
        let pause_until = Arc::new(RwLock::new(None));
        Self {
            client: build_client(DEFAULT_REQUEST_TIMEOUT, Arc::clone(&pause_until)),
            headers: HeaderMap::new(),
            gateway_url,
            feeder_gateway_url,
            token: None,
            pause_until,
        }
    }

    /// Bounds every http call made by this provider.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout, Arc::clone(&self.pause_until));
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn remove_header(&mut self, name: HeaderName) -> Option<HeaderValue> {
        self.headers.remove(name)
    }

    pub fn gateway_url(&self) -> &Url {
        &self.gateway_url
    }

    pub fn feeder_gateway_url(&self) -> &Url {
        &self.feeder_gateway_url
    }

    pub fn starknet_alpha_mainnet() -> Self {
        Self::new(
            Url::parse("https://alpha-mainnet.starknet.io/gateway/")
                .expect("Failed to parse Starknet Alpha Mainnet gateway url. This should not fail in prod."),
            Url::parse("https://feeder.alpha-mainnet.starknet.io/feeder_gateway/")
                .expect("Failed to parse Starknet Alpha Mainnet feeder gateway url. This should not fail in prod."),
        )
    }

    pub fn starknet_alpha_sepolia() -> Self {
        Self::new(
            Url::parse("https://alpha-sepolia.starknet.io/gateway/")
                .expect("Failed to parse Starknet Alpha Sepolia gateway url. This should not fail in prod."),
            Url::parse("https://feeder.alpha-sepolia.starknet.io/feeder_gateway/")
                .expect("Failed to parse Starknet Alpha Sepolia feeder gateway url. This should not fail in prod."),
        )
    }

    pub fn starknet_integration_sepolia() -> Self {
        Self::new(
            Url::parse("https://integration-sepolia.starknet.io/gateway/")
                .expect("Failed to parse Starknet Integration Sepolia gateway url. This should not fail in prod."),
            Url::parse("https://feeder.integration-sepolia.starknet.io/feeder_gateway/").expect(
                "Failed to parse Starknet Integration Sepolia feeder gateway url. This should not fail in prod.",
            ),
        )
    }
}

fn build_client(timeout: Duration, pause_until: Arc<RwLock<Option<Instant>>>) -> PausedClient {
    let connector = HttpsConnector::new();
    let base_client = Client::builder(TokioExecutor::new()).build::<_, BodyTy>(connector);

    // Retries are driven by the caller, see `crate::retry`.
    let timeout_layer = Timeout::new(base_client, timeout);
    PauseLayerMiddleware::new(timeout_layer, pause_until)
}

/// Holds back outgoing requests while the gateway is rate limiting us.
///
/// A `429 Too Many Requests` response starts a pause lasting for its `Retry-After` header (10 seconds when
/// absent). Every request issued through the same provider during that window waits for it to end.
#[derive(Clone, Debug)]
pub struct PauseLayerMiddleware<S> {
    inner: S,
    pause_until: Arc<RwLock<Option<Instant>>>,
}

impl<S> PauseLayerMiddleware<S> {
    pub fn new(inner: S, pause_until: Arc<RwLock<Option<Instant>>>) -> Self {
        PauseLayerMiddleware { inner, pause_until }
    }
}

impl<S, Req: Send + Sync + 'static> Service<Request<Req>> for PauseLayerMiddleware<S>
where
    S: Service<Request<Req>, Response = Response<Incoming>, Error = Box<dyn Error + Send + Sync>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Req>) -> Self::Future {
        let pause_until = self.pause_until.clone();
        let mut inner = self.inner.clone();

        async move {
            let pause_duration = {
                let maybe_pause_instant = *pause_until.read().await;
                match maybe_pause_instant {
                    Some(pause_instant) if pause_instant > Instant::now() => Some(pause_instant - Instant::now()),
                    Some(_) => {
                        *pause_until.write().await = None;
                        None
                    }
                    None => None,
                }
            };

            if let Some(duration) = pause_duration {
                tracing::debug!(pause = ?duration, "Waiting for the gateway rate limit to expire");
                tokio::time::sleep(duration).await;
            }

            let response = inner.call(req).await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = get_retry_after(&response).unwrap_or(DEFAULT_RATE_LIMIT_PAUSE);
                let mut pause = pause_until.write().await;
                if pause.is_none() {
                    tracing::info!(retry_after = ?retry_after, "⏳ Rate limited by the gateway");
                }
                *pause = Some(Instant::now() + retry_after);
            }

            Ok(response)
        }
        .boxed()
    }
}

fn get_retry_after<B>(response: &Response<B>) -> Option<Duration> {
    let retry_after = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
    retry_after.trim().parse::<u64>().ok().map(Duration::from_secs)
}
