//! Scoring collaborator: accumulates the points the merge resolver awards.
//!
//! The simulation core only *emits* [`ScoreAwarded`]; it never reads the
//! total back.  Anything that wants to display or persist the score observes
//! this resource.

use bevy::prelude::*;

/// One score award, carrying the consumed tier's score value.
#[derive(Message, Debug, Clone, Copy)]
pub struct ScoreAwarded {
    pub amount: u32,
}

/// Running score for the current session.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Score {
    pub total: u32,
}

impl Score {
    pub fn reset(&mut self) {
        self.total = 0;
    }
}

/// Fold the step's awards into the running total.
pub fn score_award_system(mut awards: MessageReader<ScoreAwarded>, mut score: ResMut<Score>) {
    for award in awards.read() {
        score.total += award.amount;
    }
}
