//! Pickup/delivery orders and their status lifecycle.

use std::fmt;

use jiff::civil::Date;
use thiserror::Error;

use crate::Coordinate;

/// Repository identifier of an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order#{}", self.0)
    }
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderStatus {
    /// Waiting to be planned.
    #[default]
    Pending,
    /// Placed on a route plan.
    Assigned,
    /// Picked up and on its way.
    InTransit,
    /// Handed over at the delivery location.
    Delivered,
    /// Delivery attempted and failed.
    Failed,
    /// Withdrawn by the customer or dispatcher.
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this state may be placed on a route.
    ///
    /// ```
    /// use fleetroute_core::OrderStatus;
    ///
    /// assert!(OrderStatus::Pending.is_routable());
    /// assert!(!OrderStatus::Delivered.is_routable());
    /// ```
    #[must_use]
    pub const fn is_routable(self) -> bool {
        matches!(self, Self::Pending | Self::Assigned)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Dispatcher-facing urgency. Informational only; the planner ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderPriority {
    /// Can slip a day.
    Low,
    /// Default urgency.
    #[default]
    Normal,
    /// Should go out today.
    High,
    /// Must go out today.
    Urgent,
}

/// Errors returned by [`Order::mark_assigned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{order} cannot move from {from} to assigned")]
pub struct OrderStatusError {
    /// Order whose transition was rejected.
    pub order: OrderId,
    /// Status the order was in.
    pub from: OrderStatus,
}

/// A single pickup-and-delivery job.
///
/// The order repository owns orders; the planner reads them as snapshots and
/// only ever writes [`Order::status`].
///
/// # Examples
/// ```
/// use fleetroute_core::{Coordinate, Order, OrderId, OrderStatus};
/// use jiff::civil::date;
///
/// let mut order = Order::new(
///     OrderId(7),
///     Coordinate { latitude: 52.50, longitude: 13.40 },
///     Coordinate { latitude: 52.55, longitude: 13.45 },
///     120,
///     date(2024, 5, 6),
/// );
/// order.mark_assigned()?;
/// assert_eq!(order.status, OrderStatus::Assigned);
/// # Ok::<(), fleetroute_core::OrderStatusError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    /// Repository identifier.
    pub id: OrderId,
    /// Human-readable order number.
    #[cfg_attr(feature = "serde", serde(default))]
    pub number: String,
    /// Where the goods are collected.
    pub pickup: Coordinate,
    /// Where the goods are dropped off.
    pub delivery: Coordinate,
    /// Load in kilograms; always positive for a valid order.
    pub weight_kg: u32,
    /// Day the customer asked for.
    pub requested_date: Date,
    /// Current lifecycle state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: OrderStatus,
    /// Dispatcher urgency.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: OrderPriority,
}

impl Order {
    /// Construct a pending order with normal priority.
    #[must_use]
    pub fn new(
        id: OrderId,
        pickup: Coordinate,
        delivery: Coordinate,
        weight_kg: u32,
        requested_date: Date,
    ) -> Self {
        Self {
            id,
            number: format!("ORD-{:06}", id.0),
            pickup,
            delivery,
            weight_kg,
            requested_date,
            status: OrderStatus::Pending,
            priority: OrderPriority::Normal,
        }
    }

    /// Move the order to [`OrderStatus::Assigned`].
    ///
    /// Idempotent for orders that are already assigned.
    ///
    /// # Errors
    ///
    /// Returns [`OrderStatusError`] when the order is in transit, delivered,
    /// failed or cancelled.
    pub fn mark_assigned(&mut self) -> Result<(), OrderStatusError> {
        if !self.status.is_routable() {
            return Err(OrderStatusError {
                order: self.id,
                from: self.status,
            });
        }
        self.status = OrderStatus::Assigned;
        Ok(())
    }
}
