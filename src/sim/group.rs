//! Simulated control group state shared between the motion buffer worker, the state server
//! and the real-time loop.

use super::motion_buffer::Waypoint;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Configuration of one simulated group.
#[derive(Debug, Clone)]
pub struct SimControlGroup {
    /// Control group number, zero based.
    pub groupno: i32,
    /// Joints in this group.
    pub num_joints: usize,
    /// Starting joint positions, radians. Must have `num_joints` entries.
    pub initial_positions: Vec<f64>,
}

impl SimControlGroup {
    /// A group at the all-zeros home position.
    pub fn at_home(groupno: i32, num_joints: usize) -> Self {
        Self {
            groupno,
            num_joints,
            initial_positions: vec![0.0; num_joints],
        }
    }
}

/// Mutable joint state of one group.
#[derive(Debug, Clone)]
pub(crate) struct GroupState {
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
}

/// Everything the per-group workers share.
pub(crate) struct GroupShared {
    pub groupno: i32,
    pub num_joints: usize,
    state: Mutex<GroupState>,
    /// Set to freeze at the current position; consumed by the motion worker.
    pub sig_stop: AtomicBool,
    pub waypoint_tx: Sender<Waypoint>,
    /// Kept for queue depth reporting and for draining on stop.
    pub waypoint_rx: Receiver<Waypoint>,
}

impl GroupShared {
    pub fn new(config: &SimControlGroup) -> Self {
        let (waypoint_tx, waypoint_rx) = crossbeam_channel::unbounded();

        let mut positions = config.initial_positions.clone();
        positions.resize(config.num_joints, 0.0);

        Self {
            groupno: config.groupno,
            num_joints: config.num_joints,
            state: Mutex::new(GroupState {
                positions,
                velocities: vec![0.0; config.num_joints],
            }),
            sig_stop: AtomicBool::new(false),
            waypoint_tx,
            waypoint_rx,
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear all queued waypoints and signal the worker to freeze.
    pub fn stop_motion(&self) {
        while self.waypoint_rx.try_recv().is_ok() {}

        self.sig_stop
            .store(true, std::sync::atomic::Ordering::Release);
    }

    /// Queued waypoints not yet consumed by the worker.
    pub fn queue_depth(&self) -> usize {
        self.waypoint_rx.len()
    }
}
