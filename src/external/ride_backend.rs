use async_trait::async_trait;
use std::time::Duration;

use crate::{
    api::RideBackendAPI,
    entities::{Ride, RideDraft, RideSearch},
    error::Error,
};

use super::check_status;

#[derive(Debug, Clone)]
pub struct RideBackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl RideBackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl RideBackendAPI for RideBackendClient {
    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error> {
        draft.validate()?;

        let res = self
            .client
            .post(format!("{}/rides", self.base_url))
            .json(&draft)
            .send()
            .await?;

        Ok(check_status(res)?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn search_rides(&self, search: RideSearch) -> Result<Vec<Ride>, Error> {
        let res = self
            .client
            .post(format!("{}/rides/search", self.base_url))
            .json(&search)
            .send()
            .await?;

        Ok(check_status(res)?.json().await?)
    }
}
