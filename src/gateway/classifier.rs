use serde::Serialize;

use crate::gateway::event::{CheckoutSession, PaymentStatus, SessionMode};

/// Where a verified checkout session goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Order,
    Skip(SkipReason),
}

/// Why a session was left to a sibling pipeline (or to a later event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ListingBoost,
    Subscription,
    Setup,
    PaymentNotSettled,
    UnhandledEvent,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ListingBoost => "listing_boost",
            SkipReason::Subscription => "subscription",
            SkipReason::Setup => "setup",
            SkipReason::PaymentNotSettled => "payment_not_settled",
            SkipReason::UnhandledEvent => "unhandled_event",
        }
    }
}

pub const LISTING_BOOST_TYPE: &str = "listing_boost";

/// Pure decision over the session payload; first matching rule wins.
pub fn classify_session(session: &CheckoutSession) -> Route {
    if session.metadata_value("type") == Some(LISTING_BOOST_TYPE) {
        return Route::Skip(SkipReason::ListingBoost);
    }

    match session.mode {
        Some(SessionMode::Subscription) => return Route::Skip(SkipReason::Subscription),
        Some(SessionMode::Setup) => return Route::Skip(SkipReason::Setup),
        _ => {}
    }

    match session.payment_status {
        Some(status) if status != PaymentStatus::Paid => {
            Route::Skip(SkipReason::PaymentNotSettled)
        }
        _ => Route::Order,
    }
}
