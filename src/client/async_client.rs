use super::utils::reqwest_to_sweep_error;
use super::AsyncRequests;
use crate::config::SearchConfig;
use crate::error::SweepError;
use crate::requests::Request;
use crate::responses::Response;

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::redirect::Policy;
use tracing::instrument;

/// concrete implementation of an [`AsyncRequests`] client using an underlying [`reqwest::Client`]
///
/// # Warning
///
/// when bringing your own [`reqwest::Client`], make sure its redirect policy is
/// [`Policy::none`]; a followed redirect hides the very response that proves a hit.
/// The same goes for `reqwest::Client::default()`, so prefer [`AsyncClient::new`].
#[derive(Clone, Debug)]
pub struct AsyncClient {
    client: reqwest::Client,
}

impl AsyncClient {
    /// create a new client with redirects disabled and the default per-request timeout
    ///
    /// # Errors
    ///
    /// see [`AsyncClient::from_config`]
    pub fn new() -> Result<Self, SweepError> {
        Self::from_config(&SearchConfig::default())
    }

    /// create a new client, using the given [`reqwest::Client`] as the base
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// create a new client with redirects disabled and the configured per-request timeout
    ///
    /// # Examples
    ///
    /// ```
    /// # use codesweep::client::AsyncClient;
    /// # use codesweep::config::SearchConfig;
    /// # use codesweep::error::SweepError;
    /// # fn main() -> Result<(), SweepError> {
    /// let client = AsyncClient::from_config(&SearchConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// This method fails if a TLS backend cannot be initialized, or the resolver
    /// cannot load the system configuration.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SweepError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.workers)
            .build()?;

        Ok(Self::with_client(client))
    }

    /// get a reference to the wrapped [`reqwest::Client`]
    #[must_use]
    pub const fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// restructure a [`Request`] into one that can be sent over the wire
    ///
    /// `Host` and `Content-Length` are left for reqwest to generate
    #[instrument(skip_all, level = "trace")]
    fn build_request(&self, request: &Request) -> Result<reqwest::Request, SweepError> {
        let mut builder = self
            .client
            .post(request.url())
            .timeout(request.timeout())
            .body(request.body().to_string());

        for (key, value) in request.headers() {
            builder = builder.header(key, value);
        }

        if let Some(cookies) = request.cookie_header() {
            builder = builder.header(COOKIE, cookies);
        }

        builder.build().map_err(reqwest_to_sweep_error)
    }
}

#[async_trait]
impl AsyncRequests for AsyncClient {
    /// use the underlying [`reqwest::Client`] to send a [`Request`] in order to receive its [`Response`]
    ///
    /// # Errors
    ///
    /// This method fails if the request can't be built from the captured headers, or
    /// if there was an error while sending the request (timeout, refused connection, etc...)
    #[instrument(skip_all, fields(candidate = request.candidate()), level = "trace")]
    async fn send(&self, request: Request) -> Result<Response, SweepError> {
        let reqwest_request = self.build_request(&request)?;

        // start timer for the request
        let now = Instant::now();

        let reqwest_response = self
            .client
            .execute(reqwest_request)
            .await
            .map_err(reqwest_to_sweep_error)?;

        let response =
            Response::from_reqwest_response(request.id(), reqwest_response, now.elapsed()).await;

        Ok(response)
    }
}
