//! Tick callback that reports run progress through `tracing`.
//!
//! Every delivery and death is logged at `debug`. Every `every` ticks a
//! one-line `info` progress record summarizes the run so far, including
//! the box-count series collected by the wrapped [`BoxCountRecorder`].

use cocaro_agents::Robot;
use cocaro_core::runner::{BoxCountRecorder, TickCallback};
use cocaro_core::tick::{SimulationState, TickSummary};
use tracing::{debug, info};

/// Callback that logs per-tick events and periodic progress.
#[derive(Debug)]
pub struct ProgressCallback {
    every: u64,
    deliveries: u64,
    deaths: u64,
    recorder: BoxCountRecorder,
}

impl ProgressCallback {
    /// Log a progress line every `every` ticks (0 disables it).
    pub const fn new(every: u64) -> Self {
        Self {
            every,
            deliveries: 0,
            deaths: 0,
            recorder: BoxCountRecorder::new(),
        }
    }

    /// The `(tick, boxes_remaining)` series recorded so far.
    pub fn box_counts(&self) -> &[(u64, u32)] {
        &self.recorder.samples
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        self.recorder.on_tick(summary, sim);

        for (agent, delivery) in &summary.deliveries {
            self.deliveries = self.deliveries.saturating_add(1);
            debug!(
                tick = summary.tick,
                %agent,
                task = %delivery.task,
                color = %delivery.color,
                reward = delivery.reward,
                "Delivery recorded"
            );
        }
        for (agent, death) in &summary.deaths {
            self.deaths = self.deaths.saturating_add(1);
            debug!(
                tick = summary.tick,
                %agent,
                position = %death.position,
                released = ?death.released_task,
                "Death recorded"
            );
        }

        if self.every > 0 && summary.tick.checked_rem(self.every) == Some(0) {
            let mean_energy = mean_energy(sim);
            info!(
                tick = summary.tick,
                robots_alive = summary.robots_alive,
                boxes_remaining = summary.boxes_remaining,
                deliveries = self.deliveries,
                deaths = self.deaths,
                mean_energy,
                messages_delivered = summary.messages_delivered,
                messages_dropped = summary.messages_dropped,
                "Progress"
            );
        }
    }
}

/// Mean energy of the robots still active, rounded down.
fn mean_energy(sim: &SimulationState) -> u64 {
    let (sum, n) = sim
        .robots
        .values()
        .filter(|r| r.is_active())
        .map(Robot::energy)
        .fold((0_u64, 0_u64), |(sum, n), e| {
            (sum.saturating_add(u64::from(e)), n.saturating_add(1))
        });
    sum.checked_div(n).unwrap_or(0)
}
