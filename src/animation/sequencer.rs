//! Chains the open, fall and close clips.
//!
//! ```text
//! Idle --Begin--> Opening --open ended--> Falling --fall ended--> Closing --close ended--> Done
//! ```
//!
//! Every transition is driven by the completion of the clip that precedes it.
//! Events that do not match the current state are dropped, so a stray or
//! repeated completion can never start a clip twice.

use crate::{config::ClipNames, data_structures::scene::Scene, error::SceneError};

/// What the sequencer needs from whoever owns the clips.
pub trait ClipPlayer {
    fn has_clip(&self, name: &str) -> bool;

    fn start_clip(&mut self, name: &str) -> Result<(), SceneError>;
}

impl ClipPlayer for Scene {
    fn has_clip(&self, name: &str) -> bool {
        self.animation_group_by_name(name).is_ok()
    }

    fn start_clip(&mut self, name: &str) -> Result<(), SceneError> {
        self.animation_group_by_name_mut(name)?.play();
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Open,
    Fall,
    Close,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequenceState {
    #[default]
    Idle,
    Opening,
    Falling,
    Closing,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceEvent {
    Begin,
    ClipEnded(Stage),
}

/// The transition table. `None` means the event is ignored in `state`.
pub fn transition(
    state: SequenceState,
    event: SequenceEvent,
) -> Option<(SequenceState, Option<Stage>)> {
    use SequenceEvent::*;
    use SequenceState::*;
    match (state, event) {
        (Idle, Begin) => Some((Opening, Some(Stage::Open))),
        (Opening, ClipEnded(Stage::Open)) => Some((Falling, Some(Stage::Fall))),
        (Falling, ClipEnded(Stage::Fall)) => Some((Closing, Some(Stage::Close))),
        // nothing follows the close clip yet
        (Closing, ClipEnded(Stage::Close)) => Some((Done, None)),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct Sequencer {
    names: ClipNames,
    state: SequenceState,
}

impl Sequencer {
    pub fn new(names: ClipNames) -> Self {
        Self {
            names,
            state: SequenceState::Idle,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn clip_name(&self, stage: Stage) -> &str {
        match stage {
            Stage::Open => &self.names.open,
            Stage::Fall => &self.names.fall,
            Stage::Close => &self.names.close,
        }
    }

    fn stage_of(&self, clip: &str) -> Option<Stage> {
        [Stage::Open, Stage::Fall, Stage::Close]
            .into_iter()
            .find(|&stage| self.clip_name(stage) == clip)
    }

    /// Checks that all three clips exist and starts the opening one.
    ///
    /// Nothing is started when a clip is missing.
    pub fn begin(&mut self, player: &mut impl ClipPlayer) -> Result<(), SceneError> {
        for stage in [Stage::Open, Stage::Fall, Stage::Close] {
            let name = self.clip_name(stage);
            if !player.has_clip(name) {
                return Err(SceneError::missing_animation_group(name));
            }
        }
        self.apply(SequenceEvent::Begin, player)
    }

    /// Feeds the completion of clip `name` into the state machine.
    pub fn on_clip_ended(
        &mut self,
        name: &str,
        player: &mut impl ClipPlayer,
    ) -> Result<(), SceneError> {
        match self.stage_of(name) {
            Some(stage) => self.apply(SequenceEvent::ClipEnded(stage), player),
            None => Ok(()),
        }
    }

    fn apply(
        &mut self,
        event: SequenceEvent,
        player: &mut impl ClipPlayer,
    ) -> Result<(), SceneError> {
        let Some((next, action)) = transition(self.state, event) else {
            log::debug!("Ignoring {:?} while {:?}", event, self.state);
            return Ok(());
        };
        if let Some(stage) = action {
            let name = self.clip_name(stage).to_string();
            player.start_clip(&name)?;
            log::info!("Started animation {}", name);
        }
        log::debug!("Sequence {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}
