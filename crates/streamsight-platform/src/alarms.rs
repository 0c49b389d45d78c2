//! Alarm collection over `/alarm/alarms`.

use async_trait::async_trait;
use serde::Deserialize;

use streamsight_core::api::{AlarmApi, PageFilter};
use streamsight_core::config::paths;
use streamsight_core::error::Result;
use streamsight_core::model::{Alarm, PagedResult, PageStatistics};

use crate::client::PlatformClient;
use crate::paging::page_params;

#[derive(Debug, Deserialize)]
struct AlarmPage {
    #[serde(default)]
    alarms: Vec<Alarm>,
    #[serde(default)]
    statistics: PageStatistics,
}

#[async_trait]
impl AlarmApi for PlatformClient {
    async fn alarms(&self, filter: &PageFilter) -> Result<PagedResult<Alarm>> {
        let page: AlarmPage = self.get_json(paths::ALARMS, &page_params(filter)).await?;
        Ok(PagedResult::new(page.alarms, page.statistics))
    }
}
