//! Status enums for orders, consultations, users and chat.
//!
//! The API reports statuses as lower-case strings. Values this client does
//! not know about deserialize to the `Other` variant instead of failing, so a
//! new server-side status never breaks order history.

use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
            /// A value this client does not recognise.
            #[serde(untagged)]
            Other(String),
        }

        impl $name {
            /// Wire representation.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Ok(match s.to_ascii_lowercase().as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(s.to_string()),
                })
            }
        }
    };
}

wire_enum! {
    /// Order lifecycle status.
    OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    /// Order payment status.
    PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
    }
}

wire_enum! {
    /// Pharmacist consultation status.
    ConsultationStatus {
        Pending => "pending",
        Answered => "answered",
        Closed => "closed",
    }
}

wire_enum! {
    /// Consultation topic.
    ConsultationCategory {
        General => "general",
        Medication => "medication",
        SideEffects => "side-effects",
        Interactions => "interactions",
        Emergency => "emergency",
    }
}

wire_enum! {
    /// Account role.
    UserRole {
        Customer => "customer",
        Pharmacist => "pharmacist",
        Admin => "admin",
    }
}

impl Default for ConsultationCategory {
    fn default() -> Self {
        Self::General
    }
}

/// Author of a chat transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    /// The person using the site.
    User,
    /// The assistant.
    Bot,
}
