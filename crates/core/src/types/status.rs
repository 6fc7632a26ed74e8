//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// Moves forward through `processing` → `shipped` → `delivered` in the
/// back-office. The progression is advisory: an admin can set any status, so
/// [`OrderStatus::is_forward_transition`] exists for the UI to warn with,
/// not as a hard guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Whether moving from `self` to `next` follows the normal progression.
    #[must_use]
    pub fn is_forward_transition(self, next: Self) -> bool {
        self.rank() <= next.rank()
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Processing => 0,
            Self::Shipped => 1,
            Self::Delivered => 2,
        }
    }

    /// The lowercase wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status recorded on an order.
///
/// Orders are only created after a successful gateway callback, so in
/// practice every stored order is `paid`; the enum keeps the column honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// The lowercase wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Processing.is_forward_transition(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.is_forward_transition(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.is_forward_transition(OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.is_forward_transition(OrderStatus::Processing));
        assert!(!OrderStatus::Shipped.is_forward_transition(OrderStatus::Processing));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(OrderStatus::Processing.to_string(), "processing");
        assert_eq!(
            "shipped".parse::<OrderStatus>().unwrap(),
            OrderStatus::Shipped
        );
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
    }
}
