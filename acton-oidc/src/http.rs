//! HTTP transport for OAuth2 and OIDC requests
//!
//! One reqwest-backed transport serves discovery, JWKS fetches, and the code
//! exchange, so the configured [`TlsOptions`] apply uniformly. Redirects are
//! disabled: the OAuth2 layer must observe 3xx responses itself.

use std::future::Future;
use std::pin::Pin;

use crate::tls::TlsOptions;

/// TLS-aware async HTTP client handed to `oauth2` and `openidconnect`.
#[derive(Clone, Debug)]
pub struct HttpClient {
    tls: TlsOptions,
}

impl HttpClient {
    /// Create a client that applies the given TLS options to every call
    #[must_use]
    pub const fn new(tls: TlsOptions) -> Self {
        Self { tls }
    }
}

impl<'c> oauth2::AsyncHttpClient<'c> for HttpClient {
    type Error = reqwest::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<oauth2::HttpResponse, Self::Error>> + Send + 'c>>;

    fn call(&'c self, request: oauth2::HttpRequest) -> Self::Future {
        Box::pin(send_request(&self.tls, request))
    }
}

async fn send_request(
    tls: &TlsOptions,
    request: oauth2::HttpRequest,
) -> Result<oauth2::HttpResponse, reqwest::Error> {
    let client = tls
        .apply(reqwest::Client::builder())
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let method = request.method().clone();
    let url = request.uri().to_string();
    let headers = request.headers().clone();
    let body = request.into_body();

    let mut request_builder = client.request(method, &url).body(body);

    for (name, value) in &headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = request_builder.send().await?;

    let status_code = response.status();
    let headers = response.headers().to_owned();
    let body = response.bytes().await?.to_vec();

    let mut builder = http::Response::builder().status(status_code);
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }
    // This should never fail as we're building with valid components
    Ok(builder.body(body).expect("Failed to build HTTP response"))
}
