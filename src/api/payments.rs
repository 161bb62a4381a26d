use serde_json::Value;

use super::cache::CacheTier;
use super::client::{ApiClient, ReadOptions};
use super::envelope::Envelope;
use super::error::ApiError;
use super::orders::{ADMIN_PREFIX, ORDER_ID_KEYS, ORDER_PREFIX};
use super::transport::ApiRequest;
use super::types::{GatewayOrder, OrderPayload, PaymentOrder, VerificationOutcome, VerifyPaymentRequest};

impl ApiClient {
    /// Create an order plus its gateway-side reservation for online payment.
    ///
    /// The gateway descriptor and public key may be absent when the backend
    /// could not reach the gateway; callers must treat that as a failure
    /// before opening any widget.
    pub async fn create_payment_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<PaymentOrder, ApiError> {
        let body =
            serde_json::to_value(payload).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let value = self
            .request(ApiRequest::post("/payments/create-order", body))
            .await?;
        self.invalidate(&[ORDER_PREFIX, ADMIN_PREFIX]);

        let envelope = Envelope::parse(value);
        let order_id = envelope
            .str_field(&ORDER_ID_KEYS)
            .ok_or_else(|| ApiError::Malformed("payment order without an order id".to_string()))?;

        Ok(PaymentOrder {
            order_id,
            gateway: gateway_order(&envelope.data),
            gateway_key: envelope.str_field(&["key", "keyId", "gatewayKey"]),
            message: envelope.message,
        })
    }

    /// Confirm a gateway payment signature with the backend.
    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<VerificationOutcome, ApiError> {
        let body =
            serde_json::to_value(request).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let value = self
            .request(ApiRequest::post("/payments/verify-payment", body))
            .await?;
        self.invalidate(&[ORDER_PREFIX, ADMIN_PREFIX]);

        let envelope = Envelope::parse(value);
        Ok(VerificationOutcome {
            success: envelope.success,
            message: envelope.message,
        })
    }

    /// Payment state is volatile while a gateway transaction settles;
    /// always hits the network.
    pub async fn payment_order_status(&self, id: &str) -> Result<Value, ApiError> {
        self.cached_read(
            &format!("/payments/order-status/{}", id),
            vec![],
            CacheTier::Detail,
            ReadOptions::uncached(),
        )
        .await
    }
}

fn gateway_order(data: &Value) -> Option<GatewayOrder> {
    ["gatewayOrder", "razorpayOrder", "paymentOrder"]
        .iter()
        .find_map(|key| data.get(*key))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}
