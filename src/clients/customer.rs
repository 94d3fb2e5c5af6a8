use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use super::{endpoint_url, RemoteCall, RemoteDirectory, RemoteEndpoint, TransportError};
use crate::domain::customer::Customer;
use crate::metrics::Metrics;

const SERVICE: &str = "customer";

/// Customer directory backed by the customer service's REST API
/// (`GET /api/customers/{customerId}`).
pub struct HttpCustomerDirectory {
    client: reqwest::Client,
    base_url: Url,
    call: RemoteCall,
}

impl HttpCustomerDirectory {
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
impl RemoteDirectory for HttpCustomerDirectory {
    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, TransportError> {
        let url = endpoint_url(&self.base_url, &["api", "customers", customer_id])?;

        self.call
            .run(|| {
                let request = self.client.get(url.clone());
                async move {
                    let response = request.send().await.map_err(|e| self.call.transport_error(e))?;

                    if response.status() == StatusCode::NOT_FOUND {
                        tracing::debug!(customer_id, "Customer not found");
                        return Ok(None);
                    }

                    let customer = response
                        .error_for_status()
                        .map_err(|e| self.call.transport_error(e))?
                        .json::<Customer>()
                        .await
                        .map_err(|e| self.call.transport_error(e))?;

                    Ok(Some(customer))
                }
            })
            .await
    }
}
