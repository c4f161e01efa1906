use issuewatch_core::{CoreError, FetchError};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

const USER_AGENT: &str = concat!("issuewatch/", env!("CARGO_PKG_VERSION"));

/// Fetches the public issue listing page of a single repository.
#[derive(Debug, Clone)]
pub struct IssueListingClient {
    http_client: Client,
    listing_url: String,
}

impl IssueListingClient {
    pub fn new(listing_url: impl Into<String>) -> Result<Self, CoreError> {
        let http_client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self::with_client(http_client, listing_url))
    }

    pub fn with_client(http_client: Client, listing_url: impl Into<String>) -> Self {
        Self {
            http_client,
            listing_url: listing_url.into(),
        }
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    /// Issues one unauthenticated GET and returns the body. Anything other
    /// than `200 OK` is an error; logging it is left to the caller.
    pub async fn fetch_listing(&self) -> Result<String, CoreError> {
        info!("Fetching issue listing: {}", self.listing_url);

        let response = self
            .http_client
            .get(&self.listing_url)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed {
                url: self.listing_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                url: self.listing_url.clone(),
                status_code: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::BodyUnreadable {
                reason: e.to_string(),
            })?;

        debug!("Fetched {} bytes from {}", body.len(), self.listing_url);
        Ok(body)
    }
}
