use serde_json::{json, Value};

use super::cache::CacheTier;
use super::client::{ApiClient, ReadOptions};
use super::envelope::Envelope;
use super::error::ApiError;
use super::transport::ApiRequest;
use super::types::{Order, OrderPayload, OrderReceipt};

pub(crate) const ORDER_PREFIX: &str = "GET:/orders";
pub(crate) const ADMIN_PREFIX: &str = "GET:/admin/";

pub(crate) const ORDER_ID_KEYS: [&str; 4] = ["orderId", "order_id", "_id", "id"];

impl ApiClient {
    /// Persist a cash-on-delivery order.
    pub async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, ApiError> {
        let body =
            serde_json::to_value(payload).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let value = self.request(ApiRequest::post("/orders", body)).await?;
        self.invalidate(&[ORDER_PREFIX, ADMIN_PREFIX]);

        let envelope = Envelope::parse(value);
        Ok(OrderReceipt {
            success: envelope.success,
            order_id: envelope.str_field(&ORDER_ID_KEYS),
            message: envelope.message,
        })
    }

    pub async fn list_orders(&self, options: ReadOptions) -> Result<Vec<Order>, ApiError> {
        let value = self
            .cached_read("/orders", vec![], CacheTier::List, options)
            .await?;
        Envelope::parse(value)
            .list(&["orders"])
            .into_iter()
            .map(parse_order)
            .collect()
    }

    pub async fn get_order(&self, id: &str, options: ReadOptions) -> Result<Order, ApiError> {
        let value = self
            .cached_read(&format!("/orders/{}", id), vec![], CacheTier::Detail, options)
            .await?;
        parse_order(Envelope::parse(value).entity(&["order"]))
    }

    pub async fn cancel_order(&self, id: &str) -> Result<OrderReceipt, ApiError> {
        let value = self
            .request(ApiRequest::put(format!("/orders/{}/cancel", id), json!({})))
            .await?;
        self.invalidate(&[ORDER_PREFIX, ADMIN_PREFIX]);

        let envelope = Envelope::parse(value);
        Ok(OrderReceipt {
            success: envelope.success,
            order_id: envelope.str_field(&ORDER_ID_KEYS),
            message: envelope.message,
        })
    }

    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::put(
            format!("/orders/{}/status", id),
            json!({ "status": status }),
        ))
        .await?;
        self.invalidate(&[ORDER_PREFIX, ADMIN_PREFIX]);
        Ok(())
    }

    /// Tracking is volatile; always hits the network.
    pub async fn track_order(&self, id: &str) -> Result<Value, ApiError> {
        self.cached_read(
            &format!("/orders/{}/track", id),
            vec![],
            CacheTier::Detail,
            ReadOptions::uncached(),
        )
        .await
    }

    /// Invoice PDF bytes. Binary, never cached.
    pub async fn order_invoice(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        self.request_bytes(ApiRequest::get(format!("/orders/{}/invoice", id)))
            .await
    }
}

fn parse_order(value: Value) -> Result<Order, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed(format!("bad order: {}", e)))
}
