//! Checkout workflow: converts the client-side cart into a persisted order.
//!
//! Modeled as an explicit state machine instead of a pile of booleans so
//! illegal combinations (verifying a payment that was never submitted,
//! submitting an unconfirmed address) cannot be represented at all.

pub mod gateway;

pub use gateway::{GatewayOptions, GatewayOutcome, PaymentGateway, Prefill};

use thiserror::Error;

use crate::api::types::{OrderPayload, ShippingAddress, VerifyPaymentRequest};
use crate::api::ApiClient;
use crate::cart::{Cart, CartItem};

/// Country assumed when the shipping address leaves it blank.
/// [`crate::config::Config`] defaults source their branding from here.
pub const DEFAULT_COUNTRY: &str = "India";
/// Brand color handed to the payment widget.
pub const THEME_COLOR: &str = "#7b2d8e";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cod,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Online => "online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Editable address form.
    CollectingAddress,
    /// Address review modal is up, waiting for the user's confirmation.
    AwaitingConfirmation,
    /// Order creation request in flight.
    Submitting,
    /// Payment widget is open, waiting for its callback.
    AwaitingGatewayRedirect,
    /// Signature verification request in flight.
    VerifyingPayment,
    Completed,
    PaymentFailed,
}

impl CheckoutState {
    /// States in which the place-order action must be a no-op.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            CheckoutState::Submitting
                | CheckoutState::AwaitingGatewayRedirect
                | CheckoutState::VerifyingPayment
        )
    }
}

/// Where the UI should go next.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    CartView,
    OrderSuccess {
        order_id: String,
        amount: f64,
    },
    PaymentSuccess {
        order_id: String,
        payment_id: String,
        amount: f64,
    },
    PaymentFailure {
        order_id: String,
        message: String,
    },
}

/// Outcome of one place-order attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutResult {
    /// Order placed (and, for online payments, verified). Cart is cleared.
    Completed(Navigation),
    /// Payment failed after an order was created; routed to the failure
    /// view. Cart is preserved.
    Failed {
        navigation: Navigation,
        message: String,
    },
    /// Submission rejected before any payment happened; back to the address
    /// form with the cart intact.
    Rejected { message: String },
    /// User dismissed the payment widget; back to the address form. This is
    /// an informational notice, not a failure.
    Cancelled { message: String },
    /// The action was invoked from a state where it is disabled.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("an order attempt is already in progress")]
    InProgress,
}

impl CheckoutError {
    /// Where the UI should route when checkout cannot start at all. An empty
    /// cart sends the user back to the cart view; field errors keep them on
    /// the address form.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            CheckoutError::EmptyCart => Some(Navigation::CartView),
            _ => None,
        }
    }
}

/// One checkout session. Owns the cart for the duration of the flow.
#[derive(Debug)]
pub struct CheckoutFlow {
    state: CheckoutState,
    cart: Cart,
    address: ShippingAddress,
    method: PaymentMethod,
    default_country: String,
    theme_color: String,
}

impl CheckoutFlow {
    /// Entry guard: the workflow never runs with zero items; callers should
    /// route [`Navigation::CartView`] on [`CheckoutError::EmptyCart`].
    pub fn new(
        cart: Cart,
        address: ShippingAddress,
        method: PaymentMethod,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            state: CheckoutState::CollectingAddress,
            cart,
            address,
            method,
            default_country: DEFAULT_COUNTRY.to_string(),
            theme_color: THEME_COLOR.to_string(),
        })
    }

    /// Override the built-in country default and widget theme, typically
    /// from [`crate::config::Config`].
    pub fn branded(mut self, default_country: &str, theme_color: &str) -> Self {
        self.default_country = default_country.to_string();
        self.theme_color = theme_color.to_string();
        self
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Hand the cart back once the flow is over.
    pub fn into_cart(self) -> Cart {
        self.cart
    }

    pub fn set_address(&mut self, address: ShippingAddress) {
        if self.state == CheckoutState::CollectingAddress {
            self.address = address;
        } else {
            tracing::warn!("ignoring address edit in state {:?}", self.state);
        }
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        if self.state == CheckoutState::CollectingAddress {
            self.method = method;
        }
    }

    /// Validate the address and raise the confirmation modal. Pure
    /// client-side gating; no network call happens here.
    pub fn request_confirmation(&mut self) -> Result<(), CheckoutError> {
        match self.state {
            CheckoutState::CollectingAddress => {}
            _ => return Err(CheckoutError::InProgress),
        }

        if let Some(field) = first_missing_field(&self.address) {
            return Err(CheckoutError::MissingField(field));
        }
        if self.address.country.trim().is_empty() {
            self.address.country = self.default_country.clone();
        }

        self.state = CheckoutState::AwaitingConfirmation;
        Ok(())
    }

    /// User backed out of the review modal.
    pub fn cancel_confirmation(&mut self) {
        if self.state == CheckoutState::AwaitingConfirmation {
            self.state = CheckoutState::CollectingAddress;
        }
    }

    /// User confirmed the displayed address: submit the order with the
    /// currently selected payment method.
    pub async fn place_order(
        &mut self,
        api: &ApiClient,
        gateway: &dyn PaymentGateway,
    ) -> CheckoutResult {
        if self.state.is_busy() {
            tracing::debug!("place_order ignored, already {:?}", self.state);
            return CheckoutResult::Ignored;
        }
        if self.state != CheckoutState::AwaitingConfirmation {
            tracing::warn!("place_order invoked in state {:?}", self.state);
            return CheckoutResult::Ignored;
        }

        self.state = CheckoutState::Submitting;
        let payload = self.build_payload();

        match self.method {
            PaymentMethod::Cod => self.submit_cod(api, payload).await,
            PaymentMethod::Online => self.submit_online(api, gateway, payload).await,
        }
    }

    async fn submit_cod(&mut self, api: &ApiClient, payload: OrderPayload) -> CheckoutResult {
        let total = payload.total;
        match api.create_order(&payload).await {
            Ok(receipt) if receipt.success => {
                let order_id = match receipt.order_id {
                    Some(id) => id,
                    None => {
                        return self.reject("Order was created without an id".to_string());
                    }
                };
                tracing::info!("order {} placed (cod, total {})", order_id, total);
                self.cart.clear();
                self.state = CheckoutState::Completed;
                CheckoutResult::Completed(Navigation::OrderSuccess {
                    order_id,
                    amount: total,
                })
            }
            Ok(receipt) => self.reject(
                receipt
                    .message
                    .unwrap_or_else(|| "Failed to place order".to_string()),
            ),
            Err(err) => self.reject(err.user_message()),
        }
    }

    async fn submit_online(
        &mut self,
        api: &ApiClient,
        gateway: &dyn PaymentGateway,
        payload: OrderPayload,
    ) -> CheckoutResult {
        let total = payload.total;
        let payment_order = match api.create_payment_order(&payload).await {
            Ok(order) => order,
            Err(err) => return self.reject(err.user_message()),
        };

        // Without a gateway reservation and public key there is nothing to
        // open; fail before presenting any widget.
        let (gateway_order, key) = match (payment_order.gateway, payment_order.gateway_key) {
            (Some(order), Some(key)) => (order, key),
            _ => {
                return self.reject(
                    payment_order
                        .message
                        .unwrap_or_else(|| "Payment gateway is unavailable".to_string()),
                )
            }
        };

        let order_id = payment_order.order_id;
        let options = GatewayOptions {
            key,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            description: format!("Aurelane order {}", order_id),
            gateway_order_id: gateway_order.id,
            prefill: Prefill {
                name: self.address.name.clone(),
                email: self.address.email.clone(),
                phone: self.address.phone.clone(),
            },
            theme_color: self.theme_color.clone(),
        };

        self.state = CheckoutState::AwaitingGatewayRedirect;
        match gateway.open(options).await {
            GatewayOutcome::Success {
                gateway_order_id,
                payment_id,
                signature,
            } => {
                self.state = CheckoutState::VerifyingPayment;
                self.verify(api, order_id, gateway_order_id, payment_id, signature, total)
                    .await
            }
            GatewayOutcome::Failed { code, description } => {
                tracing::warn!(
                    "gateway payment failed for order {} ({:?}): {}",
                    order_id,
                    code,
                    description
                );
                self.state = CheckoutState::PaymentFailed;
                CheckoutResult::Failed {
                    navigation: Navigation::PaymentFailure {
                        order_id,
                        message: description.clone(),
                    },
                    message: description,
                }
            }
            GatewayOutcome::Dismissed => {
                tracing::info!("payment widget dismissed for order {}", order_id);
                self.state = CheckoutState::CollectingAddress;
                CheckoutResult::Cancelled {
                    message: "Payment cancelled".to_string(),
                }
            }
        }
    }

    async fn verify(
        &mut self,
        api: &ApiClient,
        order_id: String,
        gateway_order_id: String,
        payment_id: String,
        signature: String,
        total: f64,
    ) -> CheckoutResult {
        let request = VerifyPaymentRequest {
            gateway_order_id,
            payment_id: payment_id.clone(),
            signature,
            order_id: order_id.clone(),
        };

        match api.verify_payment(&request).await {
            Ok(outcome) if outcome.success => {
                tracing::info!("payment verified for order {}", order_id);
                self.cart.clear();
                self.state = CheckoutState::Completed;
                CheckoutResult::Completed(Navigation::PaymentSuccess {
                    order_id,
                    payment_id,
                    amount: total,
                })
            }
            Ok(outcome) => {
                let message = outcome
                    .message
                    .unwrap_or_else(|| "Payment verification failed".to_string());
                self.fail_verification(order_id, message)
            }
            Err(err) => self.fail_verification(order_id, err.user_message()),
        }
    }

    // Cart stays intact: the user may retry payment for the same items.
    fn fail_verification(&mut self, order_id: String, message: String) -> CheckoutResult {
        tracing::warn!("verification failed for order {}: {}", order_id, message);
        self.state = CheckoutState::PaymentFailed;
        CheckoutResult::Failed {
            navigation: Navigation::PaymentFailure {
                order_id,
                message: message.clone(),
            },
            message,
        }
    }

    fn reject(&mut self, message: String) -> CheckoutResult {
        tracing::warn!("order submission rejected: {}", message);
        self.state = CheckoutState::CollectingAddress;
        CheckoutResult::Rejected { message }
    }

    fn build_payload(&self) -> OrderPayload {
        let mut address = self.address.clone();
        if address.country.trim().is_empty() {
            address.country = self.default_country.clone();
        }

        OrderPayload {
            items: self.cart.items().iter().map(CartItem::to_order_line).collect(),
            shipping_address: address,
            payment_method: self.method.as_str().to_string(),
            total: self.cart.total(),
        }
    }
}

fn first_missing_field(address: &ShippingAddress) -> Option<&'static str> {
    let required: [(&'static str, &str); 7] = [
        ("name", &address.name),
        ("email", &address.email),
        ("phone", &address.phone),
        ("addressLine1", &address.address_line1),
        ("city", &address.city),
        ("state", &address.state),
        ("pincode", &address.pincode),
    ];
    required
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::cache::CacheTiers;
    use crate::api::testing::{ok, MockTransport};
    use crate::api::types::DiscountType;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockGateway {
        outcome: GatewayOutcome,
        opens: AtomicUsize,
        last_options: Mutex<Option<GatewayOptions>>,
    }

    impl MockGateway {
        fn new(outcome: GatewayOutcome) -> Self {
            Self {
                outcome,
                opens: AtomicUsize::new(0),
                last_options: Mutex::new(None),
            }
        }

        fn success() -> Self {
            Self::new(GatewayOutcome::Success {
                gateway_order_id: "gw_123".to_string(),
                payment_id: "pay_9".to_string(),
                signature: "sig".to_string(),
            })
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn open(&self, options: GatewayOptions) -> GatewayOutcome {
            self.opens.fetch_add(1, Ordering::SeqCst);
            *self.last_options.lock().unwrap() = Some(options);
            self.outcome.clone()
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(crate::cart::CartItem {
            product_id: "g1".to_string(),
            name: "Star Sapphire".to_string(),
            unit_price: 5000.0,
            discount: 0.0,
            discount_type: DiscountType::Percentage,
            quantity: 2,
            available_stock: 5,
            image_ref: Some("sapphire.jpg".to_string()),
        });
        cart
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: String::new(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            country: String::new(),
        }
    }

    fn client(transport: Arc<MockTransport>) -> ApiClient {
        ApiClient::new(transport as _, CacheTiers::default())
    }

    fn payment_create_response() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "orderId": "ORD7",
                "key": "rzp_test_abc",
                "gatewayOrder": {"id": "gw_123", "amount": 1000000, "currency": "INR"}
            }
        })
    }

    #[test]
    fn test_empty_cart_is_refused() {
        let err = CheckoutFlow::new(Cart::new(), address(), PaymentMethod::Cod).unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
        assert_eq!(err.navigation(), Some(Navigation::CartView));
    }

    #[test]
    fn test_field_errors_stay_on_the_address_form() {
        assert_eq!(CheckoutError::MissingField("phone").navigation(), None);
        assert_eq!(CheckoutError::InProgress.navigation(), None);
    }

    #[test]
    fn test_validation_gate_reports_first_missing_field() {
        let mut incomplete = address();
        incomplete.name = "  ".to_string();
        incomplete.email = String::new();
        let mut flow = CheckoutFlow::new(cart(), incomplete, PaymentMethod::Cod).unwrap();

        let err = flow.request_confirmation().unwrap_err();
        assert_eq!(err, CheckoutError::MissingField("name"));
        assert_eq!(flow.state(), CheckoutState::CollectingAddress);
    }

    #[test]
    fn test_validation_gate_checks_every_required_field() {
        for (field, mutate) in [
            ("email", Box::new(|a: &mut ShippingAddress| a.email.clear())
                as Box<dyn Fn(&mut ShippingAddress)>),
            ("phone", Box::new(|a| a.phone = " ".to_string())),
            ("addressLine1", Box::new(|a| a.address_line1.clear())),
            ("city", Box::new(|a| a.city.clear())),
            ("state", Box::new(|a| a.state.clear())),
            ("pincode", Box::new(|a| a.pincode.clear())),
        ] {
            let mut bad = address();
            mutate(&mut bad);
            let mut flow = CheckoutFlow::new(cart(), bad, PaymentMethod::Cod).unwrap();
            assert_eq!(
                flow.request_confirmation().unwrap_err(),
                CheckoutError::MissingField(field)
            );
        }
    }

    #[test]
    fn test_confirmation_defaults_country_and_can_be_cancelled() {
        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Cod).unwrap();
        flow.request_confirmation().unwrap();
        assert_eq!(flow.state(), CheckoutState::AwaitingConfirmation);
        assert_eq!(flow.address.country, DEFAULT_COUNTRY);

        flow.cancel_confirmation();
        assert_eq!(flow.state(), CheckoutState::CollectingAddress);
        assert!(!flow.cart().is_empty());
    }

    #[tokio::test]
    async fn test_cod_success_clears_cart_and_navigates() {
        let transport = MockTransport::json(json!({"success": true, "orderId": "ORD1"}));
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Cod).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        assert_eq!(
            result,
            CheckoutResult::Completed(Navigation::OrderSuccess {
                order_id: "ORD1".to_string(),
                amount: 10000.0,
            })
        );
        assert_eq!(flow.state(), CheckoutState::Completed);
        assert!(flow.cart().is_empty());
        assert_eq!(gateway.opens(), 0);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/orders");
        let body = requests[0].body.clone().unwrap();
        assert_eq!(body["items"][0]["price"], json!(5000.0));
        assert_eq!(body["items"][0]["quantity"], json!(2));
        assert_eq!(body["paymentMethod"], json!("cod"));
        assert_eq!(body["total"], json!(10000.0));
        assert_eq!(body["shippingAddress"]["country"], json!(DEFAULT_COUNTRY));
    }

    #[tokio::test]
    async fn test_cod_failure_returns_to_address_with_cart_intact() {
        let transport = MockTransport::json(json!({"success": false, "message": "out of stock"}));
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Cod).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        assert_eq!(
            result,
            CheckoutResult::Rejected {
                message: "out of stock".to_string()
            }
        );
        assert_eq!(flow.state(), CheckoutState::CollectingAddress);
        assert!(!flow.cart().is_empty());
    }

    #[tokio::test]
    async fn test_online_success_verifies_and_completes() {
        let transport = MockTransport::new(|request| match request.path.as_str() {
            "/payments/create-order" => ok(payment_create_response()),
            "/payments/verify-payment" => ok(json!({"success": true})),
            other => panic!("unexpected request to {}", other),
        });
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Online).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        assert_eq!(
            result,
            CheckoutResult::Completed(Navigation::PaymentSuccess {
                order_id: "ORD7".to_string(),
                payment_id: "pay_9".to_string(),
                amount: 10000.0,
            })
        );
        assert!(flow.cart().is_empty());

        let options = gateway.last_options.lock().unwrap().clone().unwrap();
        assert_eq!(options.key, "rzp_test_abc");
        assert_eq!(options.amount, 1000000);
        assert_eq!(options.currency, "INR");
        assert_eq!(options.gateway_order_id, "gw_123");
        assert_eq!(options.prefill.email, "priya@example.com");
        assert!(options.description.contains("ORD7"));

        let verify = transport
            .requests()
            .into_iter()
            .find(|r| r.path == "/payments/verify-payment")
            .unwrap();
        let body = verify.body.unwrap();
        assert_eq!(body["gatewayOrderId"], json!("gw_123"));
        assert_eq!(body["paymentId"], json!("pay_9"));
        assert_eq!(body["signature"], json!("sig"));
        assert_eq!(body["orderId"], json!("ORD7"));
    }

    #[tokio::test]
    async fn test_verification_failure_navigates_to_failure_view() {
        let transport = MockTransport::new(|request| match request.path.as_str() {
            "/payments/create-order" => ok(payment_create_response()),
            "/payments/verify-payment" => {
                ok(json!({"success": false, "message": "signature mismatch"}))
            }
            other => panic!("unexpected request to {}", other),
        });
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Online).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        assert_eq!(
            result,
            CheckoutResult::Failed {
                navigation: Navigation::PaymentFailure {
                    order_id: "ORD7".to_string(),
                    message: "signature mismatch".to_string(),
                },
                message: "signature mismatch".to_string(),
            }
        );
        assert_eq!(flow.state(), CheckoutState::PaymentFailed);
        assert!(!flow.cart().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_skips_verification() {
        let transport = MockTransport::new(|request| match request.path.as_str() {
            "/payments/create-order" => ok(payment_create_response()),
            other => panic!("unexpected request to {}", other),
        });
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::new(GatewayOutcome::Failed {
            code: Some("BAD_CARD".to_string()),
            description: "card declined".to_string(),
        });

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Online).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        match result {
            CheckoutResult::Failed { navigation, .. } => {
                assert_eq!(
                    navigation,
                    Navigation::PaymentFailure {
                        order_id: "ORD7".to_string(),
                        message: "card declined".to_string(),
                    }
                );
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(transport
            .requests()
            .iter()
            .all(|r| r.path != "/payments/verify-payment"));
    }

    #[tokio::test]
    async fn test_gateway_dismissal_returns_to_address() {
        let transport = MockTransport::new(|request| match request.path.as_str() {
            "/payments/create-order" => ok(payment_create_response()),
            other => panic!("unexpected request to {}", other),
        });
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::new(GatewayOutcome::Dismissed);

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Online).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        assert!(matches!(result, CheckoutResult::Cancelled { .. }));
        assert_eq!(flow.state(), CheckoutState::CollectingAddress);
        assert_eq!(flow.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_gateway_descriptor_rejects_without_opening_widget() {
        let transport = MockTransport::json(json!({"success": true, "orderId": "ORD7"}));
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Online).unwrap();
        flow.request_confirmation().unwrap();
        let result = flow.place_order(&api, &gateway).await;

        assert!(matches!(result, CheckoutResult::Rejected { .. }));
        assert_eq!(gateway.opens(), 0);
        assert_eq!(flow.state(), CheckoutState::CollectingAddress);
    }

    #[tokio::test]
    async fn test_resubmission_guard_blocks_busy_states() {
        let transport = MockTransport::json(json!({"success": true, "orderId": "ORD1"}));
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Cod).unwrap();
        flow.request_confirmation().unwrap();

        for state in [
            CheckoutState::Submitting,
            CheckoutState::AwaitingGatewayRedirect,
            CheckoutState::VerifyingPayment,
        ] {
            flow.state = state;
            assert_eq!(flow.place_order(&api, &gateway).await, CheckoutResult::Ignored);
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_place_order_after_completion_is_ignored() {
        let transport = MockTransport::json(json!({"success": true, "orderId": "ORD1"}));
        let api = client(Arc::clone(&transport));
        let gateway = MockGateway::success();

        let mut flow = CheckoutFlow::new(cart(), address(), PaymentMethod::Cod).unwrap();
        flow.request_confirmation().unwrap();
        flow.place_order(&api, &gateway).await;
        assert_eq!(transport.calls(), 1);

        let second = flow.place_order(&api, &gateway).await;
        assert_eq!(second, CheckoutResult::Ignored);
        assert_eq!(transport.calls(), 1);
    }
}
