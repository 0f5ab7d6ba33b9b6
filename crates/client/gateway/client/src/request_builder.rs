use std::borrow::Cow;
use std::collections::BTreeMap;

use bytes::Bytes;
use http::Method;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Request, Response, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;
use starknet_types_core::felt::Felt;
use tower::Service;
use url::Url;

use crate::builder::PausedClient;
use crate::error::TransportError;

pub(crate) fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
}

/// Appends a path segment to a url, making sure the result ends with a `/` so that it can be joined again.
pub(crate) fn url_join_segment(url: &mut Url, segment: &str) {
    ensure_trailing_slash(url);
    let path = format!("{}{}/", url.path(), segment.trim_matches('/'));
    url.set_path(&path);
}

#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a PausedClient,
    url: Url,
    params: BTreeMap<Cow<'static, str>, String>,
    headers: HeaderMap,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(client: &'a PausedClient, base_url: Url, headers: HeaderMap) -> Self {
        Self { client, url: base_url, params: BTreeMap::new(), headers }
    }

    pub fn add_uri_segment(mut self, segment: &str) -> Result<Self, TransportError> {
        self.url = self
            .url
            .join(segment)
            .map_err(|err| TransportError::InvalidRequest(format!("Cannot join {segment:?} to {}: {err}", self.url)))?;
        Ok(self)
    }

    pub fn add_param(mut self, name: Cow<'static, str>, value: &str) -> Self {
        self.params.insert(name, value.to_string());
        self
    }

    pub fn add_felt_param(self, name: &'static str, value: &Felt) -> Self {
        self.add_param(Cow::Borrowed(name), &format!("{value:#x}"))
    }

    pub async fn send_get<T>(self) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, Full::default())?;
        unpack(call(self.client, request).await?).await
    }

    pub async fn send_post<T, D>(self, body: &D) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        D: Serialize,
    {
        let body = serde_json::to_vec(body)
            .map_err(|err| TransportError::InvalidRequest(format!("Failed to serialize request body: {err}")))?;
        let mut request = self.request(Method::POST, Full::new(Bytes::from(body)))?;
        request.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        unpack(call(self.client, request).await?).await
    }

    fn request(&self, method: Method, body: Full<Bytes>) -> Result<Request<Full<Bytes>>, TransportError> {
        let uri = self.build_uri()?;
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;
        request.headers_mut().extend(self.headers.clone());
        Ok(request)
    }

    fn build_uri(&self) -> Result<Uri, TransportError> {
        let mut url = self.url.clone();
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter().map(|(key, value)| (key.as_ref(), value.as_str())));
        }

        url.as_str().try_into().map_err(|_| TransportError::InvalidRequest(format!("Invalid url: {url}")))
    }
}

async fn call(client: &PausedClient, request: Request<Full<Bytes>>) -> Result<Response<Incoming>, TransportError> {
    client.clone().call(request).await.map_err(TransportError::from_service_error)
}

async fn unpack<T>(response: Response<Incoming>) -> Result<T, TransportError>
where
    T: DeserializeOwned,
{
    let http_status = response.status();
    let whole_body = response
        .collect()
        .await
        .map_err(|err| TransportError::Transient(format!("Failed to read response body: {err}")))?
        .to_bytes();

    if !http_status.is_success() {
        return Err(TransportError::from_http_failure(http_status, &whole_body));
    }

    serde_json::from_slice(&whole_body)
        .map_err(|serde_error| TransportError::UnexpectedResponse(format!("Failed to parse response body: {serde_error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayProvider;

    #[test]
    fn test_url_join_segment() {
        let mut url = Url::parse("https://example.com/base").unwrap();
        url_join_segment(&mut url, "gateway");
        assert_eq!(url.as_str(), "https://example.com/base/gateway/");
        url_join_segment(&mut url, "/nested/");
        assert_eq!(url.as_str(), "https://example.com/base/gateway/nested/");
    }

    #[test]
    fn test_build_uri_with_params() {
        let provider = GatewayProvider::new_from_base_path(Url::parse("http://localhost:5050").unwrap());
        let uri = RequestBuilder::new(&provider.client, provider.feeder_gateway_url.clone(), HeaderMap::new())
            .add_uri_segment("get_nonce")
            .unwrap()
            .add_felt_param("contractAddress", &Felt::from(0xabc))
            .add_param(Cow::from("blockNumber"), "pending")
            .build_uri()
            .unwrap();

        assert_eq!(
            uri.to_string(),
            "http://localhost:5050/feeder_gateway/get_nonce?blockNumber=pending&contractAddress=0xabc"
        );
    }
}
