//! Push channel realized by polling the documented HTTP surface.
//!
//! The vendor's realtime transport is proprietary; this channel delivers
//! the same message contract (`/managedobjects/{id}` with the managed
//! object wrapped in a `data.data` envelope) by polling the inventory at a
//! fixed interval. Subscriptions stop polling when dropped.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use streamsight_core::api::{Inventory, PushChannel, PushSubscription};
use streamsight_core::error::{Error, Result};

use crate::client::PlatformClient;

const CHANNEL_PREFIX: &str = "/managedobjects/";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MESSAGE_BUFFER: usize = 32;

/// Polling implementation of [`PushChannel`].
pub struct PollingPushChannel {
    client: Arc<PlatformClient>,
    interval: Duration,
}

impl PollingPushChannel {
    /// Create a channel polling at the default interval.
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self::with_interval(client, DEFAULT_POLL_INTERVAL)
    }

    /// Create a channel polling at a custom interval.
    pub fn with_interval(client: Arc<PlatformClient>, interval: Duration) -> Self {
        Self { client, interval }
    }
}

#[async_trait]
impl PushChannel for PollingPushChannel {
    async fn subscribe(&self, channel: &str) -> Result<PushSubscription> {
        let object_id = channel
            .strip_prefix(CHANNEL_PREFIX)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Config(format!("unsupported channel: {channel}")))?
            .to_string();

        let (tx, rx) = mpsc::channel(MESSAGE_BUFFER);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let client = Arc::clone(&self.client);
        let interval = self.interval;
        let channel_name = channel.to_string();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        match client.get(&object_id).await {
                            Ok(object) => {
                                let message = json!({ "data": { "data": object } });
                                if tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(channel = %channel_name, "poll failed: {e}");
                            }
                        }
                    }
                }
            }
            tracing::debug!(channel = %channel_name, "push subscription closed");
        });

        Ok(PushSubscription::new(channel, rx, stop_tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_prefix_validation() {
        assert_eq!("/managedobjects/42".strip_prefix(CHANNEL_PREFIX), Some("42"));
        assert_eq!("/alarms/42".strip_prefix(CHANNEL_PREFIX), None);
    }
}
