use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::engine::TreeNode;

/// The referral forest as a nested tree, rooted at the system account's
/// direct recruits.
pub async fn get_tree(State(state): State<AppState>) -> Json<Vec<TreeNode>> {
    Json(state.engine.lock().await.tree())
}
