//! Headless presenter that writes cues to the log.
use game_core::{Cue, Presenter};

/// Logs every cue at `debug`, health changes at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter {
    cues: u64,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cues received so far.
    pub fn cue_count(&self) -> u64 {
        self.cues
    }
}

impl Presenter for LogPresenter {
    fn cue(&mut self, cue: Cue) {
        self.cues += 1;
        match cue {
            Cue::PartyHealth { health, max } => {
                tracing::info!(target: "spellcast::cue", health, max, "party health")
            }
            Cue::EnemyHealth { health, max } => {
                tracing::info!(target: "spellcast::cue", health, max, "enemy health")
            }
            cue => tracing::debug!(target: "spellcast::cue", ?cue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::DisplayId;

    #[test]
    fn counts_every_cue() {
        let mut presenter = LogPresenter::new();
        presenter.cue(Cue::ActivateDisplay(DisplayId::Lobby));
        presenter.cue(Cue::PartyHealth { health: 3, max: 10 });
        assert_eq!(presenter.cue_count(), 2);
    }
}
