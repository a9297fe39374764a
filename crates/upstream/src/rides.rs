//! Ride wait-time provider (queue-times.com response shape).

use async_trait::async_trait;
use parkpal_common::{ParkConfig, ParkFeed, ParkPalResult, RideFeed};
use tracing::{debug, instrument};

use crate::client::HttpClient;

/// Source of normalized ride lists, one park per call.
#[async_trait]
pub trait RideSource: Send + Sync {
    async fn fetch_rides(&self, park: &ParkConfig) -> ParkPalResult<ParkFeed>;
}

/// Fetches each park's configured URL and normalizes the response.
pub struct QueueTimesClient {
    http: HttpClient,
}

impl QueueTimesClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RideSource for QueueTimesClient {
    #[instrument(skip(self, park), fields(park_id = park.id))]
    async fn fetch_rides(&self, park: &ParkConfig) -> ParkPalResult<ParkFeed> {
        let body = self.http.get_bytes(&park.url, &[]).await?;
        let feed = RideFeed::classify(&body).into_park_feed()?;

        debug!(rides = feed.rides.len(), "Fetched rides");
        Ok(feed)
    }
}
