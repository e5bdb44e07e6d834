use std::time::Duration;

use shared::domain::{Coordinate, PeerId};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
struct PeerTrack {
    peer_id: PeerId,
    path: Vec<Coordinate>,
    index: usize,
}

/// Advances simulated peers along fixed cyclic paths, one step per tick.
#[derive(Debug, Default)]
pub struct LiveSimulator {
    tracks: Vec<PeerTrack>,
    ticks: u64,
}

impl LiveSimulator {
    /// Registers a peer path. Empty paths are ignored; `start_index` wraps.
    pub fn add_track(&mut self, peer_id: PeerId, path: Vec<Coordinate>, start_index: usize) {
        if path.is_empty() {
            return;
        }
        let index = start_index % path.len();
        self.tracks.push(PeerTrack {
            peer_id,
            path,
            index,
        });
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn position_index(&self, peer_id: PeerId) -> Option<usize> {
        self.track(peer_id).map(|track| track.index)
    }

    pub fn current_position(&self, peer_id: PeerId) -> Option<Coordinate> {
        self.track(peer_id).map(|track| track.path[track.index])
    }

    /// Moves every track one step and returns the new positions.
    pub fn tick(&mut self) -> Vec<(PeerId, Coordinate)> {
        self.ticks += 1;
        self.tracks
            .iter_mut()
            .map(|track| {
                track.index = (track.index + 1) % track.path.len();
                (track.peer_id, track.path[track.index])
            })
            .collect()
    }

    fn track(&self, peer_id: PeerId) -> Option<&PeerTrack> {
        self.tracks.iter().find(|track| track.peer_id == peer_id)
    }
}

/// Repeating tick source. Dropping or stopping it aborts the task, so no tick is
/// delivered after teardown.
pub struct SimulatorTimer {
    task: Option<JoinHandle<()>>,
}

impl SimulatorTimer {
    pub fn start(period: Duration, ticks: mpsc::Sender<u64>) -> Self {
        info!(period_ms = period.as_millis() as u64, "simulator: timer started");
        let task = tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick of a tokio interval completes immediately
            interval.tick().await;
            let mut count = 0u64;
            loop {
                interval.tick().await;
                count += 1;
                if ticks.send(count).await.is_err() {
                    debug!("simulator: tick receiver closed");
                    break;
                }
            }
        });
        Self { task: Some(task) }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("simulator: timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SimulatorTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.5, 0.5),
        ]
    }

    #[test]
    fn index_after_n_ticks_is_start_plus_n_mod_len() {
        for start in 0..5 {
            for n in [0usize, 1, 4, 5, 6, 23] {
                let mut simulator = LiveSimulator::default();
                simulator.add_track(PeerId(1), square(), start);
                for _ in 0..n {
                    simulator.tick();
                }
                assert_eq!(simulator.position_index(PeerId(1)), Some((start + n) % 5));
            }
        }
    }

    #[test]
    fn peers_share_one_tick_but_keep_their_own_paths() {
        let mut simulator = LiveSimulator::default();
        simulator.add_track(PeerId(1), square(), 0);
        simulator.add_track(
            PeerId(2),
            vec![Coordinate::new(9.0, 9.0), Coordinate::new(8.0, 8.0)],
            1,
        );
        let moved = simulator.tick();
        assert_eq!(
            moved,
            vec![
                (PeerId(1), Coordinate::new(1.0, 0.0)),
                (PeerId(2), Coordinate::new(9.0, 9.0)),
            ]
        );
        assert_eq!(simulator.ticks(), 1);
    }

    #[test]
    fn empty_paths_are_not_simulated_and_start_index_wraps() {
        let mut simulator = LiveSimulator::default();
        simulator.add_track(PeerId(1), Vec::new(), 0);
        simulator.add_track(PeerId(2), square(), 7);
        assert_eq!(simulator.position_index(PeerId(1)), None);
        assert_eq!(simulator.position_index(PeerId(2)), Some(2));
        assert_eq!(
            simulator.current_position(PeerId(2)),
            Some(Coordinate::new(1.0, 1.0))
        );
    }

    #[tokio::test]
    async fn timer_emits_ticks_until_dropped() {
        let (tx, mut rx) = mpsc::channel(8);
        let timer = SimulatorTimer::start(Duration::from_millis(5), tx);
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        assert!(timer.is_running());

        drop(timer);
        // aborting the task drops the only sender, closing the channel
        while rx.recv().await.is_some() {}
        assert!(rx.recv().await.is_none());
    }
}
