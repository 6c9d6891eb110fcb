use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Channel, ChannelStats, Pin, Platform, RecentMessage, User};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Client for the traQ v3 REST API.
///
/// Every request carries the bot's bearer token and is bounded by the
/// configured timeout, so a hung call surfaces as a transport error instead
/// of stalling the run.
pub struct TraqClient {
    client: Client,
    base_url: String,
    access_token: String,
}

#[derive(Deserialize)]
struct ChannelList {
    public: Vec<Channel>,
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    content: &'a str,
    embed: bool,
}

impl TraqClient {
    pub fn new(config: &ApiConfig, access_token: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = expect_status(req.send().await?, StatusCode::OK).await?;
        Ok(response.json().await?)
    }
}

async fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ApiError> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[async_trait::async_trait]
impl Platform for TraqClient {
    async fn list_public_channels(&self) -> Result<Vec<Channel>, ApiError> {
        let list: ChannelList = self.fetch(self.get("/channels")).await?;
        Ok(list.public)
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch(self.get("/users")).await
    }

    async fn list_recent_messages(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<RecentMessage>, ApiError> {
        let req = self
            .get(&format!("/channels/{channel_id}/messages"))
            .query(&[("limit", limit.to_string().as_str()), ("order", "desc")]);
        self.fetch(req).await
    }

    async fn list_subscribers(&self, channel_id: &str) -> Result<Vec<String>, ApiError> {
        self.fetch(self.get(&format!("/channels/{channel_id}/subscribers")))
            .await
    }

    async fn get_channel_stats(&self, channel_id: &str) -> Result<ChannelStats, ApiError> {
        self.fetch(self.get(&format!("/channels/{channel_id}/stats")))
            .await
    }

    async fn list_pins(&self, channel_id: &str) -> Result<Vec<Pin>, ApiError> {
        self.fetch(self.get(&format!("/channels/{channel_id}/pins")))
            .await
    }

    async fn post_message(
        &self,
        channel_id: &str,
        content: &str,
        embed: bool,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/channels/{channel_id}/messages", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&PostMessageRequest { content, embed })
            .send()
            .await?;
        expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }
}
