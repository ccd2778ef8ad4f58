//! Domain types for the listline referral ledger.
//!
//! This module provides:
//! - Exact money handling via the Money wrapper
//! - Domain primitives: MemberId, NominationId, TimeMs
//! - Ledger entities: Member, Listline, LedgerEvent, HistoryPoint

pub mod event;
pub mod history;
pub mod listline;
pub mod member;
pub mod money;
pub mod primitives;

pub use event::{EventBody, LedgerEvent, Severity};
pub use history::HistoryPoint;
pub use listline::{Listline, ListlinePositions};
pub use member::{LinkStats, Member};
pub use money::Money;
pub use primitives::{MemberId, NominationId, TimeMs, SYSTEM_ID};
