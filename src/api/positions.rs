use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{MemberId, Money, TimeMs};
use crate::engine::PositionCounts;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitDto {
    pub id: MemberId,
    pub name: String,
    pub paid: bool,
    pub joined_at: TimeMs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPositionsResponse {
    pub member_id: MemberId,
    pub name: String,
    pub upline: Vec<String>,
    #[serde(flatten)]
    pub positions: PositionCounts,
    pub total_earnings_from_position1: Money,
    pub recruits: Vec<RecruitDto>,
}

/// Per-member dashboard read: position counts, received payments, three-deep
/// upline names, and direct recruits. Served from the position index, O(1) in
/// forest size.
pub async fn get_member_positions(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MemberPositionsResponse>, AppError> {
    let member_id = MemberId::new(id);
    let engine = state.engine.lock().await;

    let member = engine.forest().require(&member_id)?.clone();
    let positions = engine.member_positions(&member_id)?;
    let total_earnings_from_position1 = positions
        .payments
        .iter()
        .fold(Money::zero(), |acc, p| acc + p.net);

    let upline = engine
        .forest()
        .upline_chain(&member_id, 3)
        .iter()
        .map(|id| engine.forest().name_of(id))
        .collect();

    let recruits = engine
        .position_index()
        .recruits(&member_id)
        .iter()
        .filter_map(|id| engine.forest().get(id))
        .map(|m| RecruitDto {
            id: m.id.clone(),
            name: m.name.clone(),
            paid: m.has_deposited,
            joined_at: m.created_at,
        })
        .collect();

    Ok(Json(MemberPositionsResponse {
        member_id,
        name: member.name,
        upline,
        positions,
        total_earnings_from_position1,
        recruits,
    }))
}
