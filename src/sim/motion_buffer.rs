//! Per-group motion buffer: a FIFO of trajectory waypoints consumed by a worker that plays
//! them out at the simulator's update rate.
//!
//! Between consecutive waypoints the worker emits intermediate samples: cubic Hermite when
//! both ends carry velocities, linear otherwise. A waypoint whose time-from-start is not
//! after the previous one starts a new trajectory.

use super::group::GroupShared;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// One trajectory goal for one group, joint vectors already sliced to the group's joint
/// count.
#[derive(Debug, Clone, Default)]
pub(crate) struct Waypoint {
    /// Seconds from trajectory start.
    pub time_from_start: f64,
    /// Goal joint positions, radians.
    pub positions: Vec<f64>,
    /// Goal joint velocities, rad/s. `None` when the point did not carry velocities, which
    /// downgrades the segment to linear interpolation.
    pub velocities: Option<Vec<f64>>,
}

/// Linear interpolation between two waypoints at blend factor `alpha`.
fn interpolate(last: &Waypoint, current: &Waypoint, alpha: f64) -> Waypoint {
    let positions = last
        .positions
        .iter()
        .zip(&current.positions)
        .map(|(last_joint, current_joint)| last_joint + alpha * (current_joint - last_joint))
        .collect();

    Waypoint {
        time_from_start: last.time_from_start
            + alpha * (current.time_from_start - last.time_from_start),
        positions,
        velocities: None,
    }
}

/// Cubic Hermite interpolation from `start` to `current` over `delta_time` seconds, sampled
/// `current_time` seconds into the segment.
///
/// With `Δx = Bp − Ap` and `Σv = Bv + Av` the coefficients are
/// `a₁ = 6Δx/Δ² − 2(Σv + Av)/Δ` and `a₂ = −12Δx/Δ³ + 6Σv/Δ²`, giving
/// `p(t) = Ap + Av·t + a₁t²/2 + a₂t³/6`.
fn accelerate(
    start: &Waypoint,
    current: &Waypoint,
    current_time: f64,
    delta_time: f64,
) -> Waypoint {
    let start_vel = start.velocities.as_deref().unwrap_or_default();
    let current_vel = current.velocities.as_deref().unwrap_or_default();

    let positions = start
        .positions
        .iter()
        .zip(&current.positions)
        .zip(start_vel.iter().zip(current_vel))
        .map(|((last_joint, current_joint), (last_vel, current_vel))| {
            let delta_x = current_joint - last_joint;
            let dv = current_vel + last_vel;
            let a1 = 6.0 * delta_x / delta_time.powi(2) - 2.0 * (dv + last_vel) / delta_time;
            let a2 = -12.0 * delta_x / delta_time.powi(3) + 6.0 * dv / delta_time.powi(2);

            last_joint + last_vel * current_time + a1 * current_time.powi(2) / 2.0
                + a2 * current_time.powi(3) / 6.0
        })
        .collect();

    Waypoint {
        time_from_start: start.time_from_start + current_time,
        positions,
        // The sampled point is a position goal only; velocity continuity comes from the
        // coefficients, not from re-deriving per-sample velocities
        velocities: None,
    }
}

/// Sleep for `duration`, then move the group to `point`. Returns `true` when a stop was
/// signalled in the meantime: the position is left untouched and the caller must abandon the
/// rest of the segment.
fn move_to(group: &GroupShared, point: &Waypoint, duration: f64) -> bool {
    if duration > 0.0 {
        spin_sleep::sleep(Duration::from_secs_f64(duration));
    }

    if group.sig_stop.swap(false, Ordering::AcqRel) {
        log::debug!("group {} stopping motion immediately", group.groupno);

        return true;
    }

    let mut state = group.lock();

    for (slot, value) in state.positions.iter_mut().zip(&point.positions) {
        *slot = *value;
    }

    false
}

/// The worker loop. Exits when the channel disconnects or the simulator signals shutdown.
pub(crate) fn motion_worker(
    rx: Receiver<Waypoint>,
    group: Arc<GroupShared>,
    update_rate: f64,
    shared: Arc<super::SimShared>,
) {
    log::debug!("motion worker for group {} running", group.groupno);

    let update_duration = if update_rate > 0.0 {
        1.0 / update_rate
    } else {
        0.0
    };

    let mut last_goal = Waypoint {
        time_from_start: 0.0,
        positions: group.lock().positions.clone(),
        velocities: None,
    };

    while !shared.stop.load(Ordering::Relaxed) {
        let current_goal = match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(waypoint) => waypoint,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let mut stopped = false;

        let mut move_duration = if current_goal.time_from_start <= last_goal.time_from_start {
            // Not a continuation: treat this point as the start of a new trajectory
            current_goal.time_from_start
        } else {
            let mut move_duration = current_goal.time_from_start - last_goal.time_from_start;

            if update_rate > 0.0 {
                let starting_goal = last_goal.clone();
                let full_duration = move_duration;

                while update_duration < move_duration {
                    let intermediate =
                        if starting_goal.velocities.is_none() || current_goal.velocities.is_none() {
                            interpolate(&last_goal, &current_goal, update_duration / move_duration)
                        } else {
                            accelerate(
                                &starting_goal,
                                &current_goal,
                                full_duration - move_duration + update_duration,
                                full_duration,
                            )
                        };

                    if move_to(&group, &intermediate, update_duration) {
                        stopped = true;

                        break;
                    }

                    last_goal = intermediate;
                    move_duration = current_goal.time_from_start - last_goal.time_from_start;
                }
            }

            move_duration
        };

        if !stopped {
            if move_duration < 0.0 {
                move_duration = 0.0;
            }

            stopped = move_to(&group, &current_goal, move_duration);
        }

        if stopped {
            // Freeze where we are; the next point starts a fresh trajectory
            last_goal = Waypoint {
                time_from_start: 0.0,
                positions: group.lock().positions.clone(),
                velocities: None,
            };

            continue;
        }

        last_goal = current_goal;
    }

    log::debug!("motion worker for group {} exiting", group.groupno);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hermite_hits_both_boundary_positions() {
        let a = Waypoint {
            time_from_start: 0.0,
            positions: vec![0.0],
            velocities: Some(vec![0.0]),
        };
        let b = Waypoint {
            time_from_start: 1.0,
            positions: vec![1.0],
            velocities: Some(vec![0.0]),
        };

        let first = accelerate(&a, &b, 0.0, 1.0);
        let last = accelerate(&a, &b, 1.0, 1.0);

        assert!((first.positions[0] - 0.0).abs() < 1e-9);
        assert!((last.positions[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hermite_midpoint_of_rest_to_rest_segment() {
        let a = Waypoint {
            time_from_start: 0.0,
            positions: vec![0.0],
            velocities: Some(vec![0.0]),
        };
        let b = Waypoint {
            time_from_start: 1.0,
            positions: vec![1.0],
            velocities: Some(vec![0.0]),
        };

        let mid = accelerate(&a, &b, 0.5, 1.0);

        // Rest-to-rest cubic is symmetric about the midpoint
        assert!((mid.positions[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn linear_interpolation_blends_positions_and_time() {
        let a = Waypoint {
            time_from_start: 1.0,
            positions: vec![0.0, 2.0],
            velocities: None,
        };
        let b = Waypoint {
            time_from_start: 3.0,
            positions: vec![1.0, 4.0],
            velocities: None,
        };

        let sample = interpolate(&a, &b, 0.25);

        assert_eq!(sample.positions, vec![0.25, 2.5]);
        assert!((sample.time_from_start - 1.5).abs() < 1e-9);
    }
}
