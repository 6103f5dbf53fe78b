use tracing::debug;

use super::LinkSender;
use crate::error::DriverError;
use crate::settings::ConnectionSettings;
use crate::wire::LinkRequest;

/// HTTP client for the REST link. The remote serves a self-signed
/// certificate, so validation is off at the client as well as in every body.
pub struct LinkClient {
    client: reqwest::Client,
    base_url: String,
}

impl LinkClient {
    pub fn new(settings: &ConnectionSettings) -> Result<Self, DriverError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.link_base_url(),
        })
    }

    pub fn url_for(&self, request: &LinkRequest) -> String {
        format!("{}{}", self.base_url, request.endpoint)
    }
}

impl LinkSender for LinkClient {
    async fn post(&self, request: &LinkRequest) -> Result<(), DriverError> {
        let url = self.url_for(request);
        debug!(%url, "link post");
        let response = self
            .client
            .post(&url)
            .json(&request.data)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DriverError::Link {
                endpoint: request.endpoint.clone(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_endpoint() {
        let settings = ConnectionSettings {
            host: "10.0.0.5".into(),
            link_port: 1026,
            ..ConnectionSettings::default()
        };
        let client = LinkClient::new(&settings).unwrap();
        let req = LinkRequest::new("prop/clear", serde_json::Map::new());
        assert_eq!(client.url_for(&req), "http://10.0.0.5:1026/prop/clear");
    }
}
