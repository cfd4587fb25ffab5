//! Staggered reveal of evaluated attempts.
//!
//! Each attempt row goes `Idle -> Revealing(0) -> ... -> Revealing(L) ->
//! Persisted`. The sequencer is purely reactive: the round schedules one
//! timer per tile and calls [`RevealSequencer::advance`] as they fire.

use crate::evaluator::{Evaluation, LetterStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Idle,
    /// Number of tiles flipped so far.
    Revealing(usize),
    Persisted,
}

/// What a single tile should look like right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileView {
    /// Letter shown without any status colour.
    Hidden,
    /// Tile is flipping into its status this frame.
    Flipping(LetterStatus),
    /// Status locked in.
    Final(LetterStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// Timer belonged to a row that is no longer revealing.
    Ignored,
    Flipped(usize),
    /// Last tile flipped; the row is now persisted.
    Completed,
}

#[derive(Debug, Clone)]
struct RowReveal {
    state: RevealState,
    evaluation: Evaluation,
}

#[derive(Debug, Clone, Default)]
pub struct RevealSequencer {
    rows: Vec<RowReveal>,
}

impl RevealSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing a freshly appended attempt.
    ///
    /// A row still mid-reveal is persisted on the spot so rows never animate
    /// concurrently; its index is returned so the caller can finish any
    /// bookkeeping tied to completion.
    pub fn begin(&mut self, evaluation: Evaluation) -> (usize, Option<usize>) {
        let interrupted = self
            .rows
            .iter()
            .position(|r| matches!(r.state, RevealState::Revealing(_)));
        if let Some(row) = interrupted {
            self.rows[row].state = RevealState::Persisted;
        }
        self.rows.push(RowReveal {
            state: RevealState::Revealing(0),
            evaluation,
        });
        (self.rows.len() - 1, interrupted)
    }

    /// Flip the next tile of `row`.
    pub fn advance(&mut self, row: usize) -> RevealStep {
        let Some(reveal) = self.rows.get_mut(row) else {
            return RevealStep::Ignored;
        };
        let RevealState::Revealing(flipped) = reveal.state else {
            return RevealStep::Ignored;
        };

        let flipped = flipped + 1;
        if flipped >= reveal.evaluation.len() {
            reveal.state = RevealState::Persisted;
            RevealStep::Completed
        } else {
            reveal.state = RevealState::Revealing(flipped);
            RevealStep::Flipped(flipped - 1)
        }
    }

    #[must_use]
    pub fn state(&self, row: usize) -> RevealState {
        self.rows.get(row).map_or(RevealState::Idle, |r| r.state)
    }

    #[must_use]
    pub fn tile(&self, row: usize, position: usize) -> TileView {
        let Some(reveal) = self.rows.get(row) else {
            return TileView::Hidden;
        };
        let Some(status) = reveal.evaluation.get(position) else {
            return TileView::Hidden;
        };
        match reveal.state {
            RevealState::Persisted => TileView::Final(status),
            RevealState::Revealing(flipped) if position < flipped => TileView::Flipping(status),
            RevealState::Revealing(_) | RevealState::Idle => TileView::Hidden,
        }
    }

    /// Locked-in statuses of a row, available once it is persisted.
    #[must_use]
    pub fn persisted(&self, row: usize) -> Option<&Evaluation> {
        self.rows
            .get(row)
            .filter(|r| r.state == RevealState::Persisted)
            .map(|r| &r.evaluation)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.rows
            .iter()
            .any(|r| matches!(r.state, RevealState::Revealing(_)))
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn reset(&mut self) {
        self.rows.clear();
    }
}
