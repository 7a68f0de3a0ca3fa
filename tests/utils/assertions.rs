//! Helpers for inspecting the events a session published
#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::sync::broadcast::{self, error::TryRecvError};

use math_quest::event::{EndReason, GameEvent};
use math_quest::leaderboard::{LeaderboardView, SubmitStatus};

/// Takes every event currently buffered, skipping over any lag gap
pub fn drain(receiver: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
        }
    }
}

pub fn session_end(events: &[GameEvent]) -> Option<(EndReason, bool)> {
    events.iter().find_map(|event| match event {
        GameEvent::SessionEnded {
            reason,
            reload_required,
        } => Some((*reason, *reload_required)),
        _ => None,
    })
}

pub fn submit_statuses(events: &[GameEvent]) -> Vec<SubmitStatus> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::SubmitStatusChanged(status) => Some(status.clone()),
            _ => None,
        })
        .collect()
}

pub fn rankings(events: &[GameEvent]) -> Vec<LeaderboardView> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::Leaderboard { view, .. } => Some(view.clone()),
            _ => None,
        })
        .collect()
}

/// The most recent narrative log, newest line first
pub fn last_log(events: &[GameEvent]) -> Option<Vec<String>> {
    events.iter().rev().find_map(|event| match event {
        GameEvent::LogUpdated { lines } => Some(lines.clone()),
        _ => None,
    })
}
