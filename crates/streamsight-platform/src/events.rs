//! Event collection over `/event/events`.

use async_trait::async_trait;
use serde::Deserialize;

use streamsight_core::api::{EventApi, PageFilter};
use streamsight_core::config::paths;
use streamsight_core::error::Result;
use streamsight_core::model::{Event, PagedResult, PageStatistics};

use crate::client::PlatformClient;
use crate::paging::page_params;

#[derive(Debug, Deserialize)]
struct EventPage {
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    statistics: PageStatistics,
}

#[async_trait]
impl EventApi for PlatformClient {
    async fn events(&self, filter: &PageFilter) -> Result<PagedResult<Event>> {
        let page: EventPage = self.get_json(paths::EVENTS, &page_params(filter)).await?;
        Ok(PagedResult::new(page.events, page.statistics))
    }
}
