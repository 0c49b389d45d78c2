//! Read-through paginated alarm/event lists for the engine source.

use streamsight_core::api::{DynAlarmApi, DynEventApi, PageFilter};
use streamsight_core::config::MONITOR_PAGE_SIZE;
use streamsight_core::error::Result;
use streamsight_core::model::{Alarm, EngineId, Event, PagedResult};

/// Paged view of the engine's alarms and events.
///
/// Page positions are tracked client-side; stepping below page 1 clamps.
/// No caching — every page call hits the platform.
pub struct MonitorFeed {
    alarms: DynAlarmApi,
    events: DynEventApi,
    source: EngineId,
    page_size: u32,
    alarm_page: u32,
    event_page: u32,
    status_filter: Option<String>,
}

impl MonitorFeed {
    /// Create a feed for the given engine source id.
    pub fn new(alarms: DynAlarmApi, events: DynEventApi, source: EngineId) -> Self {
        Self {
            alarms,
            events,
            source,
            page_size: MONITOR_PAGE_SIZE,
            alarm_page: 1,
            event_page: 1,
            status_filter: None,
        }
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restrict the alarm list to a status (e.g. `ACTIVE`), or clear the
    /// restriction with `None`.
    pub fn set_status_filter(&mut self, status: Option<String>) {
        self.status_filter = status;
    }

    /// Current alarm page position.
    pub fn alarm_page(&self) -> u32 {
        self.alarm_page
    }

    /// Current event page position.
    pub fn event_page(&self) -> u32 {
        self.event_page
    }

    /// Fetch the alarm page `direction` steps away (−1, 0, +1).
    pub async fn alarms_page(&mut self, direction: i32) -> Result<PagedResult<Alarm>> {
        self.alarm_page = step(self.alarm_page, direction);
        let filter = self.filter(self.alarm_page, self.status_filter.clone());
        self.alarms.alarms(&filter).await
    }

    /// Fetch the event page `direction` steps away (−1, 0, +1).
    pub async fn events_page(&mut self, direction: i32) -> Result<PagedResult<Event>> {
        self.event_page = step(self.event_page, direction);
        let filter = self.filter(self.event_page, None);
        self.events.events(&filter).await
    }

    fn filter(&self, current_page: u32, status: Option<String>) -> PageFilter {
        PageFilter {
            page_size: self.page_size,
            current_page,
            source: Some(self.source.0.clone()),
            status,
            with_total_pages: true,
        }
    }
}

/// Step a page position, clamping at page 1.
fn step(page: u32, direction: i32) -> u32 {
    (i64::from(page) + i64::from(direction)).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps_at_first_page() {
        assert_eq!(step(1, -1), 1);
        assert_eq!(step(1, 0), 1);
        assert_eq!(step(1, 1), 2);
        assert_eq!(step(5, -1), 4);
    }
}
