mod backend;
mod ingest;

pub use backend::PlannerClient;
pub use ingest::IngestControl;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::PlanError;
use crate::model::{PlanEvent, RunConfig, TravelRequest};

/// One plan-generation run: validate, request, stream, return the final
/// text. The engine owns the accumulator for the whole run; a second run
/// needs a fresh engine. No retry is performed here; the caller decides
/// whether to resubmit.
pub struct PlanEngine {
    cfg: RunConfig,
}

impl PlanEngine {
    pub fn new(cfg: RunConfig) -> Self {
        Self { cfg }
    }

    /// Runs to completion, publishing progress on `event_tx` and honoring
    /// cancel messages on `control_rx` between chunk reads. The returned
    /// text equals the last emitted snapshot; on error or cancellation no
    /// partial text escapes.
    pub async fn run(
        self,
        request: TravelRequest,
        today: NaiveDate,
        event_tx: mpsc::UnboundedSender<PlanEvent>,
        mut control_rx: mpsc::UnboundedReceiver<IngestControl>,
    ) -> Result<String, PlanError> {
        request.validate(today)?;

        let client = PlannerClient::new(&self.cfg)?;
        let response = client.generate_plan(&request).await?;
        let _ = event_tx.send(PlanEvent::RequestSent);
        debug!("plan stream open");

        let body = response.bytes_stream();
        futures::pin_mut!(body);
        ingest::accumulate(body, &event_tx, &mut control_rx).await
    }
}
