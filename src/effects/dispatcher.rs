use std::sync::Arc;
use tracing::trace;

use super::{Effect, SoundCue, VisualEffect};
use crate::event::{GameEvent, SessionPublisher};
use crate::messages::MessageQueue;

/// Fire-and-forget receiver for sound and visual cues
pub trait EffectSink: Send + Sync {
    fn play_sound(&self, cue: SoundCue);

    fn show_visual(&self, effect: VisualEffect);
}

/// Forwards cues to the session's event channel
pub struct PublishingEffects {
    publisher: SessionPublisher,
}

impl PublishingEffects {
    pub fn new(publisher: SessionPublisher) -> Self {
        Self { publisher }
    }
}

impl EffectSink for PublishingEffects {
    fn play_sound(&self, cue: SoundCue) {
        self.publisher.publish(GameEvent::Sound(cue));
    }

    fn show_visual(&self, effect: VisualEffect) {
        self.publisher.publish(GameEvent::Visual(effect));
    }
}

/// Routes effects recorded by a controller to their destinations
///
/// Sounds and visuals go to the effect sink, narrative lines to the message
/// queue, and a refresh publishes the state snapshot supplied by the caller.
#[derive(Clone)]
pub struct EffectDispatcher {
    sink: Arc<dyn EffectSink>,
    messages: MessageQueue,
    publisher: SessionPublisher,
}

impl EffectDispatcher {
    pub fn new(
        sink: Arc<dyn EffectSink>,
        messages: MessageQueue,
        publisher: SessionPublisher,
    ) -> Self {
        Self {
            sink,
            messages,
            publisher,
        }
    }

    /// Dispatches effects in recorded order. A refresh publishes `snapshot`
    /// at most once per call.
    pub fn dispatch(&self, effects: Vec<Effect>, snapshot: GameEvent) {
        let mut snapshot = Some(snapshot);

        for effect in effects {
            trace!(session_id = %self.publisher.session_id(), effect = ?effect, "Dispatching effect");
            match effect {
                Effect::Sound(cue) => self.sink.play_sound(cue),
                Effect::Visual(visual) => self.sink.show_visual(visual),
                Effect::Narrate(line) => self.messages.enqueue(line),
                Effect::Refresh => {
                    if let Some(event) = snapshot.take() {
                        self.publisher.publish(event);
                    }
                }
            }
        }
    }

    /// Plays a cue outside of a controller transition
    pub fn play_sound(&self, cue: SoundCue) {
        self.sink.play_sound(cue);
    }

    /// Publishes an event that does not come from a controller transition
    pub fn publish(&self, event: GameEvent) {
        self.publisher.publish(event);
    }
}
