pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod runner;

pub use config::{Config, SimConfig};
pub use engine::{Engine, EngineSnapshot, PositionIndex, ReferralForest};
pub use error::{AppError, EngineError};
pub use gateway::{FailingGateway, GatewayError, InProcessGateway, NominationGateway};
pub use domain::{
    LedgerEvent, Listline, Member, MemberId, Money, NominationId, TimeMs, SYSTEM_ID,
};
pub use runner::Runner;
