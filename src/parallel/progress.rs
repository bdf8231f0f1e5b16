//! One-way progress reporting from scenario workers.
//!
//! Sends never block; a dropped receiver just turns reporting into a no-op.

use std::sync::mpsc::{channel, Receiver, Sender};

use serde::Serialize;

use crate::ranking::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub scenario: Scenario,
    /// Candidate rows finished so far.
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Progress {
    sender: Option<Sender<ProgressEvent>>,
}

impl Progress {
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (sender, receiver) = channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn report(&self, scenario: Scenario, done: usize, total: usize) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(ProgressEvent {
                scenario,
                done,
                total,
            });
        }
    }
}
