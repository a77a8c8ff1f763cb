//! Order item status transitions.
//!
//! Every status change is expressed as a [`Transition`] and turned into a
//! [`TransitionPlan`] before anything is written. Seller transitions go
//! through a [`SellerTransitionGuard`]; the default guard accepts every
//! move so sellers can correct mistakes. Buyer transitions are always
//! validated against the current status.

use thiserror::Error;

use crate::entity::sea_orm_active_enums::{OrderItemStatus, ShippingCarrier};

/// Shipment details a seller may attach when marking an item shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shipment {
    pub tracking_number: Option<String>,
    pub carrier: Option<ShippingCarrier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Seller {
        to: OrderItemStatus,
        shipment: Shipment,
    },
    BuyerConfirmDelivery,
    BuyerCancel,
}

impl Transition {
    pub fn target(&self) -> OrderItemStatus {
        match self {
            Transition::Seller { to, .. } => *to,
            Transition::BuyerConfirmDelivery => OrderItemStatus::Delivered,
            Transition::BuyerCancel => OrderItemStatus::Cancelled,
        }
    }
}

/// Timestamp column stamped (at most once) when entering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampedAt {
    SellerReceived,
    Shipped,
    Delivered,
}

pub fn stamp_for(status: OrderItemStatus) -> Option<StampedAt> {
    match status {
        OrderItemStatus::Received => Some(StampedAt::SellerReceived),
        OrderItemStatus::Shipped => Some(StampedAt::Shipped),
        OrderItemStatus::Delivered => Some(StampedAt::Delivered),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: OrderItemStatus,
    pub to: OrderItemStatus,
    pub stamp: Option<StampedAt>,
    pub shipment: Option<Shipment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    #[error("This item has already been delivered")]
    AlreadyDelivered,
    #[error("This item must be shipped before delivery can be confirmed")]
    NotShipped,
    #[error("This item has already been cancelled")]
    AlreadyCancelled,
    #[error("This item has already been shipped and can no longer be cancelled")]
    AlreadyShipped,
    #[error("Cannot move an item from {from} to {to}")]
    Disallowed {
        from: OrderItemStatus,
        to: OrderItemStatus,
    },
}

pub trait SellerTransitionGuard: Send + Sync {
    fn check(&self, from: OrderItemStatus, to: OrderItemStatus) -> Result<(), TransitionRejected>;
}

/// Accepts any seller move, including out of terminal states.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAnySellerTransition;

impl SellerTransitionGuard for AllowAnySellerTransition {
    fn check(&self, _from: OrderItemStatus, _to: OrderItemStatus) -> Result<(), TransitionRejected> {
        Ok(())
    }
}

/// Only forward moves along the fulfillment path, or cancellation of a live item.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardOnlySellerTransition;

impl SellerTransitionGuard for ForwardOnlySellerTransition {
    fn check(&self, from: OrderItemStatus, to: OrderItemStatus) -> Result<(), TransitionRejected> {
        let allowed = match to {
            OrderItemStatus::Cancelled => !from.is_terminal(),
            _ if from.is_terminal() => from == to,
            _ => rank(to) >= rank(from),
        };
        if allowed {
            Ok(())
        } else {
            Err(TransitionRejected::Disallowed { from, to })
        }
    }
}

fn rank(status: OrderItemStatus) -> u8 {
    match status {
        OrderItemStatus::Pending => 0,
        OrderItemStatus::Received => 1,
        OrderItemStatus::Processing => 2,
        OrderItemStatus::Shipped => 3,
        OrderItemStatus::Delivered => 4,
        OrderItemStatus::Cancelled => 5,
    }
}

pub fn plan_transition(
    from: OrderItemStatus,
    transition: Transition,
    guard: &dyn SellerTransitionGuard,
) -> Result<TransitionPlan, TransitionRejected> {
    let to = transition.target();
    let shipment = match transition {
        Transition::Seller { to, shipment } => {
            guard.check(from, to)?;
            // Tracking details only mean something on a shipment.
            (to == OrderItemStatus::Shipped && shipment != Shipment::default()).then_some(shipment)
        }
        Transition::BuyerConfirmDelivery => {
            match from {
                OrderItemStatus::Shipped => {}
                OrderItemStatus::Delivered => return Err(TransitionRejected::AlreadyDelivered),
                _ => return Err(TransitionRejected::NotShipped),
            }
            None
        }
        Transition::BuyerCancel => {
            match from {
                OrderItemStatus::Pending
                | OrderItemStatus::Received
                | OrderItemStatus::Processing => {}
                OrderItemStatus::Cancelled => return Err(TransitionRejected::AlreadyCancelled),
                OrderItemStatus::Delivered => return Err(TransitionRejected::AlreadyDelivered),
                OrderItemStatus::Shipped => return Err(TransitionRejected::AlreadyShipped),
            }
            None
        }
    };

    Ok(TransitionPlan {
        from,
        to,
        stamp: stamp_for(to),
        shipment,
    })
}
