use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;

use super::{endpoint_url, RemoteCall, RemoteEndpoint, RemoteInventory, TransportError};
use crate::domain::inventory::Availability;
use crate::metrics::Metrics;

const SERVICE: &str = "inventory";

/// Inventory ledger backed by the inventory service's REST API
/// (`GET /api/inventory/{productId}/available?quantity=N`).
pub struct HttpInventory {
    client: reqwest::Client,
    base_url: Url,
    call: RemoteCall,
}

impl HttpInventory {
    pub fn new(endpoint: &RemoteEndpoint) -> Result<Self, TransportError> {
        Ok(Self {
            client: endpoint.build_client()?,
            base_url: endpoint.parse_base_url()?,
            call: RemoteCall::new(SERVICE, endpoint),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.call = self.call.with_metrics(metrics);
        self
    }
}

#[async_trait]
impl RemoteInventory for HttpInventory {
    async fn check_availability(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<Availability, TransportError> {
        let url = endpoint_url(&self.base_url, &["api", "inventory", product_id, "available"])?;

        self.call
            .run(|| {
                let request = self.client.get(url.clone()).query(&[("quantity", quantity)]);
                async move {
                    request
                        .send()
                        .await
                        .and_then(|response| response.error_for_status())
                        .map_err(|e| self.call.transport_error(e))?
                        .json::<Availability>()
                        .await
                        .map_err(|e| self.call.transport_error(e))
                }
            })
            .await
    }
}
