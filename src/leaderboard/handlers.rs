use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::models::{LeaderboardResponse, SubmitScoreRequest, SubmitScoreResponse};
use crate::shared::{AppError, AppState, GameKind};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub game: GameKind,
}

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    #[serde(default)]
    pub game: GameKind,
}

/// HTTP handler for reading the ranking
///
/// GET /leaderboard?limit=n&game=combat|quiz
/// Returns the best scores, highest first, or a placeholder text
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let limit = match query.limit {
        Some(0) => return Err(AppError::BadRequest("limit must be positive".to_string())),
        Some(limit) => limit,
        None => state.leaderboard_size,
    };

    let client = state.leaderboards.for_game(query.game);
    let view = client.fetch_top(limit).await;
    info!(
        collection = %client.collection(),
        entries = view.entries().len(),
        "Ranking served"
    );

    Ok(Json(view.into()))
}

/// HTTP handler for saving a score
///
/// POST /leaderboard?game=combat|quiz
/// Returns the id of the new record
#[instrument(name = "submit_score", skip(state))]
pub async fn submit_score(
    State(state): State<AppState>,
    Query(query): Query<GameQuery>,
    Json(request): Json<SubmitScoreRequest>,
) -> Result<Json<SubmitScoreResponse>, AppError> {
    let client = state.leaderboards.for_game(query.game);
    let id = client.submit(&request.name, request.score).await?;

    info!(id = %id, collection = %client.collection(), "Score saved over HTTP");
    Ok(Json(SubmitScoreResponse { id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{AppStateBuilder, FailingScoreStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/leaderboard", get(get_leaderboard).post(submit_score))
            .with_state(state)
    }

    fn post(body: &'static str) -> Request<Body> {
        post_to("/leaderboard", body)
    }

    fn post_to(uri: &'static str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_submit_then_read_ranking() {
        let state = AppStateBuilder::new().build();

        let response = app(state.clone())
            .oneshot(post(r#"{"name": "alice", "score": 320}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved: SubmitScoreResponse = read_json(response).await;
        assert!(!saved.id.is_empty());

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let ranking: LeaderboardResponse = read_json(response).await;
        assert_eq!(ranking.entries.len(), 1);
        assert_eq!(ranking.entries[0].rank, 1);
        assert_eq!(ranking.entries[0].name, "alice");
        assert_eq!(ranking.entries[0].score, 320);
        assert!(ranking.placeholder.is_none());
    }

    #[tokio::test]
    async fn test_missing_name_uses_default() {
        let state = AppStateBuilder::new().build();

        let response = app(state.clone())
            .oneshot(post(r#"{"score": 10}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view = state
            .leaderboards
            .for_game(GameKind::Combat)
            .fetch_top(1)
            .await;
        assert_eq!(view.entries()[0].name, "Anonymous");
    }

    #[tokio::test]
    async fn test_quiz_scores_stay_off_combat_ranking() {
        let state = AppStateBuilder::new().build();

        let response = app(state.clone())
            .oneshot(post_to(
                "/leaderboard?game=quiz",
                r#"{"name": "quinn", "score": 140}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let read = |uri: &'static str| {
            app(state.clone()).oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        };

        let combat: LeaderboardResponse = read_json(read("/leaderboard").await.unwrap()).await;
        assert!(combat.entries.is_empty());

        let quiz: LeaderboardResponse =
            read_json(read("/leaderboard?game=quiz").await.unwrap()).await;
        assert_eq!(quiz.entries.len(), 1);
        assert_eq!(quiz.entries[0].name, "quinn");
    }

    #[tokio::test]
    async fn test_unknown_game_is_rejected() {
        let state = AppStateBuilder::new().build();

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?game=chess")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_ranking_has_placeholder() {
        let state = AppStateBuilder::new().build();

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/leaderboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let ranking: LeaderboardResponse = read_json(response).await;
        assert!(ranking.entries.is_empty());
        assert_eq!(ranking.placeholder.as_deref(), Some("No ranking data yet"));
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected() {
        let state = AppStateBuilder::new().build();

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/leaderboard?limit=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_negative_score_is_rejected() {
        let state = AppStateBuilder::new().build();

        let response = app(state)
            .oneshot(post(r#"{"name": "mallory", "score": -5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_bad_gateway() {
        let state = AppStateBuilder::new()
            .with_store(Arc::new(FailingScoreStore))
            .build();

        let response = app(state)
            .oneshot(post(r#"{"name": "bob", "score": 10}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["error"], "Could not save your score. Please try again.");
    }
}
