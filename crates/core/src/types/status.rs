//! Status enums for orders and contact messages.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order as reported by the orders API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Read state of a message submitted through the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Not yet opened by an admin.
    #[default]
    #[serde(alias = "new")]
    Unread,
    /// Opened but not answered.
    Read,
    /// Answered by an admin.
    Replied,
}

impl ContactStatus {
    /// Whether the message still counts toward the unread badge.
    #[must_use]
    pub const fn is_unread(self) -> bool {
        matches!(self, Self::Unread)
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unread => write!(f, "unread"),
            Self::Read => write!(f, "read"),
            Self::Replied => write!(f, "replied"),
        }
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" | "new" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            _ => Err(format!("invalid contact status: {s}")),
        }
    }
}
