use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        checkout::{CheckoutVerification, VerifyCheckoutRequest},
        fulfillment::{
            BuyerActionResult, CancelOrderItemRequest, ConfirmDeliveryRequest,
            UpdateOrderItemStatusRequest,
        },
        orders::{OrderItemList, OrderList, OrderWithItems},
        webhook::WebhookAck,
    },
    entity::sea_orm_active_enums::{OrderItemStatus, ShippingCarrier},
    error::ErrorData,
    models::{Order, OrderItem, PostalAddress, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::{buyer, checkout, health, orders, params, seller, webhook},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        webhook::stripe_webhook,
        checkout::verify_checkout,
        orders::list_orders,
        orders::get_order,
        seller::list_order_items,
        seller::update_order_item_status,
        buyer::confirm_delivery,
        buyer::cancel_order_item
    ),
    components(
        schemas(
            Order,
            OrderItem,
            OrderItemStatus,
            ShippingCarrier,
            ShippingAddress,
            PostalAddress,
            OrderList,
            OrderWithItems,
            OrderItemList,
            WebhookAck,
            VerifyCheckoutRequest,
            CheckoutVerification,
            UpdateOrderItemStatusRequest,
            ConfirmDeliveryRequest,
            CancelOrderItemRequest,
            BuyerActionResult,
            ErrorData,
            params::Pagination,
            params::SortOrder,
            params::OrderListQuery,
            params::OrderItemListQuery,
            Meta,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderItemList>,
            ApiResponse<OrderItem>,
            ApiResponse<CheckoutVerification>,
            ApiResponse<BuyerActionResult>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Webhooks", description = "Payment gateway callbacks"),
        (name = "Checkout", description = "Buyer-side checkout verification"),
        (name = "Orders", description = "Buyer order history"),
        (name = "Seller", description = "Seller fulfillment"),
        (name = "Buyer", description = "Buyer fulfillment actions"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
