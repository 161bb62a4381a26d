use async_trait::async_trait;

/// Configuration handed to the payment widget before it opens.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Gateway public key returned by the payment-order endpoint.
    pub key: String,
    /// Amount in minor units (paise, cents).
    pub amount: u64,
    pub currency: String,
    /// Human-readable line referencing the order.
    pub description: String,
    /// Gateway-side order id the widget charges against.
    pub gateway_order_id: String,
    pub prefill: Prefill,
    pub theme_color: String,
}

/// Contact details prefilled into the widget from the shipping address.
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// How a gateway interaction ended.
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    /// The widget reported a completed payment; still needs server-side
    /// signature verification.
    Success {
        gateway_order_id: String,
        payment_id: String,
        signature: String,
    },
    /// The gateway rejected or aborted the payment.
    Failed {
        code: Option<String>,
        description: String,
    },
    /// The user closed the widget without paying. Not a failure.
    Dismissed,
}

/// The third-party payment widget, seen from the checkout flow.
///
/// The production widget lives outside this crate (it is a hosted script in
/// the web frontend); this seam is what the flow drives and what tests
/// script.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn open(&self, options: GatewayOptions) -> GatewayOutcome;
}
