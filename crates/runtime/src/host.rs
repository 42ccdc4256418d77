//! Frame loop driving a [`Game`] on a tokio runtime.
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use game_core::Presenter;

use crate::clock::Clock;
use crate::error::{Result, RuntimeError};
use crate::game::Game;
use crate::session::SessionService;

/// Ticks a game at a fixed interval until told to stop.
#[derive(Debug, Clone)]
pub struct GameHost<C> {
    interval: Duration,
    clock: C,
}

impl<C: Clock> GameHost<C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            clock,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts `game` if needed, then ticks it until `shutdown` turns true
    /// or its sender is dropped. Returns the number of frames run.
    pub async fn run<S, P>(
        &self,
        game: &mut Game<S, P>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<u64>
    where
        S: SessionService,
        P: Presenter,
    {
        if !game.is_started() {
            game.start(self.clock.now())?;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    game.tick(self.clock.now())?;
                    frames += 1;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(frames, phase = ?game.current_phase(), "game host stopped");
        Ok(frames)
    }
}

impl<C: Clock + 'static> GameHost<C> {
    /// Moves `game` onto its own task.
    pub fn spawn<S, P>(self, mut game: Game<S, P>) -> HostHandle<S, P>
    where
        S: SessionService + Send + 'static,
        P: Presenter + Send + 'static,
    {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(async move {
            let frames = self.run(&mut game, receiver).await?;
            Ok((frames, game))
        });
        HostHandle { shutdown, task }
    }
}

/// A game running on a spawned task.
pub struct HostHandle<S, P> {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(u64, Game<S, P>)>>,
}

impl<S, P> HostHandle<S, P> {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and hands the game back with its frame count.
    pub async fn shutdown(self) -> Result<(u64, Game<S, P>)> {
        // Err means the task already ended and dropped its receiver.
        let _ = self.shutdown.send(true);
        self.task.await.map_err(RuntimeError::HostJoin)?
    }
}

impl<S, P> std::fmt::Debug for HostHandle<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
