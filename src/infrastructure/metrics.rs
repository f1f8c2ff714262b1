use crate::domain::ports::MetricsHooks;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Metrics-hooks adapter that emits terminal booking transitions as log
/// events for the downstream recalculation job.
///
/// The recalculation itself lives outside this crate; all the lifecycle needs
/// is a delivery point it can fire and forget.
#[derive(Default, Clone)]
pub struct LoggingMetricsHooks;

impl LoggingMetricsHooks {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsHooks for LoggingMetricsHooks {
    async fn on_booking_completed(&self, professional_id: Uuid) -> Result<()> {
        info!("booking completed for professional {professional_id}");
        Ok(())
    }

    async fn on_booking_cancelled(&self, professional_id: Uuid) -> Result<()> {
        info!("booking cancelled for professional {professional_id}");
        Ok(())
    }
}
