use crate::combat::{CombatSnapshot, Entity, RoundState};
use crate::effects::HealthBand;
use crate::event::{GameEvent, RankingTarget};
use crate::leaderboard::LeaderboardView;
use crate::quiz::{QuizSnapshot, QuizState};

use super::messages::{
    ComboPayload, HealthBarPayload, LeaderboardPayload, LevelPayload, LogPayload, MessageType,
    MonsterPayload, ProblemPayload, ScorePayload, SessionEndedPayload, SoundPayload,
    SubmitStatusPayload, TimeLeftPayload, WebSocketMessage,
};

/// Modal names understood by the client
pub const ANSWER_MODAL: &str = "answer";
pub const ENDING_MODAL: &str = "ending";
pub const RANKING_MODAL: &str = "ranking";

/// Translates a session event into the widget updates the client renders
pub fn present(event: &GameEvent) -> Result<Vec<WebSocketMessage>, serde_json::Error> {
    match event {
        GameEvent::CombatUpdated(snapshot) => present_combat(snapshot),
        GameEvent::QuizUpdated(snapshot) => present_quiz(snapshot),
        GameEvent::Sound(cue) => Ok(vec![WebSocketMessage::with_payload(
            MessageType::Sound,
            &SoundPayload { cue: *cue },
        )?]),
        GameEvent::Visual(effect) => Ok(vec![WebSocketMessage::with_payload(
            MessageType::Visual,
            effect,
        )?]),
        GameEvent::LogUpdated { lines } => Ok(vec![WebSocketMessage::with_payload(
            MessageType::Log,
            &LogPayload {
                lines: lines.clone(),
            },
        )?]),
        GameEvent::Leaderboard { target, view } => present_ranking(*target, view),
        GameEvent::SubmitStatusChanged(status) => Ok(vec![WebSocketMessage::with_payload(
            MessageType::SubmitStatus,
            &SubmitStatusPayload {
                phase: status.phase,
                enabled: status.enabled,
                error: status.error.clone(),
            },
        )?]),
        GameEvent::SessionEnded {
            reason,
            reload_required,
        } => Ok(vec![WebSocketMessage::with_payload(
            MessageType::SessionEnded,
            &SessionEndedPayload {
                reason: *reason,
                reload_required: *reload_required,
            },
        )?]),
    }
}

fn health_bar(id: &str, entity: &Entity) -> Result<WebSocketMessage, serde_json::Error> {
    WebSocketMessage::with_payload(
        MessageType::HealthBar,
        &HealthBarPayload {
            id: id.to_string(),
            current: entity.health(),
            max: entity.max_health(),
            band: HealthBand::for_health(entity.health(), entity.max_health()),
        },
    )
}

fn problem_text(problem: Option<&crate::problem::Problem>) -> ProblemPayload {
    ProblemPayload {
        text: problem.map(ToString::to_string).unwrap_or_default(),
    }
}

fn present_combat(snapshot: &CombatSnapshot) -> Result<Vec<WebSocketMessage>, serde_json::Error> {
    let monster = &snapshot.monster;

    Ok(vec![
        health_bar("hero", &snapshot.hero)?,
        health_bar("monster", &monster.entity)?,
        WebSocketMessage::with_payload(
            MessageType::Score,
            &ScorePayload {
                score: snapshot.score,
            },
        )?,
        WebSocketMessage::with_payload(
            MessageType::Level,
            &LevelPayload {
                level: snapshot.level,
            },
        )?,
        WebSocketMessage::with_payload(
            MessageType::Monster,
            &MonsterPayload {
                name: monster.entity.name.clone(),
                avatar: monster.avatar.clone(),
                is_boss: monster.is_boss,
            },
        )?,
        WebSocketMessage::with_payload(
            MessageType::Problem,
            &problem_text(snapshot.problem.as_ref()),
        )?,
        WebSocketMessage::modal(ANSWER_MODAL, snapshot.state == RoundState::AwaitingInput)?,
        WebSocketMessage::modal(ENDING_MODAL, snapshot.state == RoundState::GameClear)?,
    ])
}

fn present_quiz(snapshot: &QuizSnapshot) -> Result<Vec<WebSocketMessage>, serde_json::Error> {
    Ok(vec![
        WebSocketMessage::with_payload(
            MessageType::Score,
            &ScorePayload {
                score: snapshot.score,
            },
        )?,
        WebSocketMessage::with_payload(
            MessageType::Combo,
            &ComboPayload {
                combo: snapshot.combo,
            },
        )?,
        WebSocketMessage::with_payload(
            MessageType::TimeLeft,
            &TimeLeftPayload {
                seconds: snapshot.time_left,
            },
        )?,
        WebSocketMessage::with_payload(
            MessageType::Problem,
            &problem_text(snapshot.problem.as_ref()),
        )?,
        WebSocketMessage::modal(ENDING_MODAL, snapshot.state == QuizState::Finished)?,
    ])
}

fn present_ranking(
    target: RankingTarget,
    view: &LeaderboardView,
) -> Result<Vec<WebSocketMessage>, serde_json::Error> {
    let mut messages = Vec::with_capacity(2);

    // The standalone ranking opens as soon as loading starts
    if target == RankingTarget::Standalone && *view == LeaderboardView::Loading {
        messages.push(WebSocketMessage::modal(RANKING_MODAL, true)?);
    }

    messages.push(WebSocketMessage::with_payload(
        MessageType::Leaderboard,
        &LeaderboardPayload {
            target,
            entries: view.entries().to_vec(),
            placeholder: view.placeholder().map(str::to_string),
        },
    )?);

    Ok(messages)
}
