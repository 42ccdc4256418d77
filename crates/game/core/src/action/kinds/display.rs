//! Full-screen displays driven by time.

use crate::action::{ActionContext, TimedAction};
use crate::presentation::{Cue, DisplayId};

/// Labels shown by the countdown, one per step.
pub const COUNTDOWN_LABELS: [&str; 3] = ["3", "2", "1"];

/// Banner shown once the countdown ends.
pub const WAITING_FOR_SPELLS_TEXT: &str = "Waiting for players to draw spells...\n";

/// Round-start countdown, followed by the "waiting for spells" banner.
#[derive(Clone, Debug, Default)]
pub struct CountdownAction {
    duration: u64,
    step: u64,
    next_label: usize,
}

impl CountdownAction {
    pub fn init(&mut self) {
        *self = Self::default();
    }
}

impl TimedAction for CountdownAction {
    fn execution_time(&self) -> u64 {
        self.duration
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        self.duration = ctx.config.timing.countdown_ms;
        self.step = ctx.config.timing.countdown_step_ms;
        ctx.cue(Cue::ActivateDisplay(DisplayId::Countdown));
        ctx.cue(Cue::DisplayText {
            display: DisplayId::Countdown,
            text: COUNTDOWN_LABELS[0],
        });
        self.next_label = 1;
    }

    fn on_update(&mut self, ctx: &mut ActionContext<'_>, elapsed: u64) {
        if self.next_label < COUNTDOWN_LABELS.len()
            && elapsed >= self.next_label as u64 * self.step
        {
            ctx.cue(Cue::DisplayText {
                display: DisplayId::Countdown,
                text: COUNTDOWN_LABELS[self.next_label],
            });
            self.next_label += 1;
        }
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.cue(Cue::DeactivateDisplay(DisplayId::Countdown));
        ctx.cue(Cue::ActivateDisplay(DisplayId::WaitingForSpells));
        ctx.cue(Cue::DisplayText {
            display: DisplayId::WaitingForSpells,
            text: WAITING_FOR_SPELLS_TEXT,
        });
    }
}

/// Shows a display for a fixed duration.
#[derive(Clone, Debug, Default)]
pub struct FullScreenDisplayAction {
    display: Option<DisplayId>,
    duration: u64,
}

impl FullScreenDisplayAction {
    pub fn init(&mut self, display: DisplayId, duration: u64) {
        self.display = Some(display);
        self.duration = duration;
    }

    pub fn display(&self) -> Option<DisplayId> {
        self.display
    }
}

impl TimedAction for FullScreenDisplayAction {
    fn execution_time(&self) -> u64 {
        self.duration
    }

    fn on_start(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(display) = self.display {
            ctx.cue(Cue::ActivateDisplay(display));
        }
    }

    fn on_finish(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(display) = self.display {
            ctx.cue(Cue::DeactivateDisplay(display));
        }
    }
}
