use marketplace_orders::{
    dto::{
        checkout::VerifyCheckoutRequest,
        fulfillment::{CancelOrderItemRequest, UpdateOrderItemStatusRequest},
    },
    entity::sea_orm_active_enums::{OrderItemStatus, ShippingCarrier},
    error::AppError,
};
use uuid::Uuid;

fn update(status: &str) -> UpdateOrderItemStatusRequest {
    UpdateOrderItemStatusRequest {
        order_item_id: Uuid::new_v4().to_string(),
        new_status: status.to_string(),
        tracking_number: None,
        shipping_carrier: None,
    }
}

#[test]
fn status_update_is_parsed_and_trimmed() {
    let mut req = update("shipped");
    req.tracking_number = Some("  TRK1 ".into());
    req.shipping_carrier = Some("Royal_Mail".into());

    let parsed = req.validate().unwrap();
    assert_eq!(parsed.new_status, OrderItemStatus::Shipped);
    assert_eq!(parsed.shipment.tracking_number.as_deref(), Some("TRK1"));
    assert_eq!(parsed.shipment.carrier, Some(ShippingCarrier::RoyalMail));
}

#[test]
fn status_update_rejects_bad_fields() {
    let err = update("refunded").validate().unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let mut bad_id = update("shipped");
    bad_id.order_item_id = "item-1".into();
    assert!(matches!(
        bad_id.validate().unwrap_err(),
        AppError::InvalidInput(_)
    ));

    let mut long = update("shipped");
    long.tracking_number = Some("X".repeat(101));
    assert!(matches!(long.validate().unwrap_err(), AppError::InvalidInput(_)));

    let mut carrier = update("shipped");
    carrier.shipping_carrier = Some("pigeon".into());
    assert!(matches!(
        carrier.validate().unwrap_err(),
        AppError::InvalidInput(_)
    ));
}

#[test]
fn blank_shipment_fields_are_dropped() {
    let mut req = update("shipped");
    req.tracking_number = Some("   ".into());
    req.shipping_carrier = Some("".into());

    let parsed = req.validate().unwrap();
    assert_eq!(parsed.shipment.tracking_number, None);
    assert_eq!(parsed.shipment.carrier, None);
}

#[test]
fn cancel_reason_is_bounded() {
    let ok = CancelOrderItemRequest {
        order_item_id: Uuid::new_v4().to_string(),
        reason: Some(" changed my mind ".into()),
    };
    assert_eq!(ok.reason().unwrap().as_deref(), Some("changed my mind"));

    let long = CancelOrderItemRequest {
        order_item_id: Uuid::new_v4().to_string(),
        reason: Some("r".repeat(501)),
    };
    assert!(long.reason().is_err());
}

#[test]
fn checkout_session_id_must_look_like_a_session() {
    let ok = VerifyCheckoutRequest {
        session_id: "cs_test_a1B2".into(),
    };
    assert_eq!(ok.session_id().unwrap(), "cs_test_a1B2");

    for bad in ["", "cs_", "pi_123", "cs_test;drop", "cs_test-1"] {
        let req = VerifyCheckoutRequest {
            session_id: bad.into(),
        };
        assert!(req.session_id().is_err(), "{bad} should be rejected");
    }
}

#[test]
fn error_codes_map_to_statuses() {
    use axum::http::StatusCode;

    assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::NotAuthorized.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::InvalidStatus("x".into()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(AppError::MissingBuyerIdentity.code(), "missing_buyer_identity");
    assert!(!AppError::MissingBuyerIdentity.is_retryable());
    assert!(AppError::Db(sea_orm::DbErr::Custom("down".into())).is_retryable());
}
