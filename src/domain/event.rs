//! Ledger event log entries.
//!
//! Events are a closed sum type; consumers match exhaustively instead of
//! comparing kind strings.

use crate::domain::{Money, MemberId, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity attached to fraud alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// What happened, with its structured payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum EventBody {
    MemberCreated {
        member_id: MemberId,
        member_name: String,
        referrer_name: String,
    },
    Deposit {
        member_id: MemberId,
        member_name: String,
        recipient_name: String,
        gross: Money,
    },
    Payment {
        recipient_id: MemberId,
        recipient_name: String,
        from_name: String,
        net: Money,
    },
    Successor {
        nominator_name: String,
        successor_name: String,
        new_parent_name: String,
        sequence: u32,
        position: u32,
    },
    View {
        count: u32,
    },
    Registration {
        member_name: String,
        referrer_name: Option<String>,
    },
    Info {
        message: String,
    },
    FraudAlert {
        member_name: String,
        severity: Severity,
    },
}

impl EventBody {
    /// Human-readable log line for this event.
    pub fn message(&self) -> String {
        match self {
            EventBody::MemberCreated {
                member_name,
                referrer_name,
                ..
            } => format!("{} registered under {}", member_name, referrer_name),
            EventBody::Deposit {
                member_name,
                recipient_name,
                gross,
                ..
            } => format!("{} from {} -> {}", gross, member_name, recipient_name),
            EventBody::Payment {
                recipient_name,
                from_name,
                net,
                ..
            } => format!("{} received {} from {}", recipient_name, net, from_name),
            EventBody::Successor {
                nominator_name,
                successor_name,
                new_parent_name,
                sequence,
                position,
            } => format!(
                "SUCCESSOR: {} (seq #{} = pos #{}) nominated by {} -> proposed move to {}'s network",
                successor_name, sequence, position, nominator_name, new_parent_name
            ),
            EventBody::View { count } => {
                if *count == 1 {
                    "1 new site view".to_string()
                } else {
                    format!("{} new site views", count)
                }
            }
            EventBody::Registration {
                member_name,
                referrer_name,
            } => match referrer_name {
                Some(r) => format!("{} registered under {}", member_name, r),
                None => format!("{} registered (direct)", member_name),
            },
            EventBody::Info { message } => message.clone(),
            EventBody::FraudAlert { member_name, .. } => format!(
                "Suspicious activity detected for {} - rapid registration pattern",
                member_name
            ),
        }
    }
}

/// One entry in the bounded event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub id: Uuid,
    pub at: TimeMs,
    #[serde(flatten)]
    pub body: EventBody,
}

impl LedgerEvent {
    /// Stamp a body with a fresh id and the given time.
    pub fn new(at: TimeMs, body: EventBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            at,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_message_pluralizes() {
        assert_eq!(EventBody::View { count: 1 }.message(), "1 new site view");
        assert_eq!(EventBody::View { count: 3 }.message(), "3 new site views");
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let event = LedgerEvent::new(
            TimeMs::new(7),
            EventBody::FraudAlert {
                member_name: "Mallory".to_string(),
                severity: Severity::Medium,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "fraud-alert");
        assert_eq!(json["severity"], "medium");
    }

    #[test]
    fn test_registration_message_direct() {
        let body = EventBody::Registration {
            member_name: "Ada".to_string(),
            referrer_name: None,
        };
        assert_eq!(body.message(), "Ada registered (direct)");
    }
}
