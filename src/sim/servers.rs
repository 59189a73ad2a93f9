//! The simulator's protocol workers: one thread per TCP listener plus the real-time UDP
//! loop.

use super::SimShared;
use super::motion_buffer::Waypoint;
use crate::error::Error;
use crate::message::{
    CommandType, DhParameters, JointFeedback, JointFeedbackEx, MessageBody, MotoMotionReply,
    MsgType, PendantMode, RealTimeJointStateEx, RealTimeJointStateExData, RealTimeMode,
    ReadIoBitReply, ReadIoGroupReply, ReplyType, ResultType, RobotStatus, SimpleMessage,
    Ternary, ValidFields, WriteIoBitReply, WriteIoGroupReply,
};
use crate::transport::{Transport, UdpEndpoint};
use crate::{MOT_MAX_GR, ROS_MAX_JOINT};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

fn accept(listener: &TcpListener, name: &str) -> Option<Transport> {
    log::info!("[{}] waiting for connection", name);

    let (stream, peer) = match listener.accept() {
        Ok(accepted) => accepted,
        Err(e) => {
            log::error!("[{}] accept failed: {}", name, e);

            return None;
        }
    };

    log::info!("[{}] got connection from {}", name, peer);

    Transport::from_stream(stream).ok()
}

fn pad(values: &[f64]) -> [f32; ROS_MAX_JOINT] {
    let mut padded = [0.0f32; ROS_MAX_JOINT];

    for (slot, value) in padded.iter_mut().zip(values) {
        *slot = *value as f32;
    }

    padded
}

fn waypoint(
    time: f32,
    pos: &[f32; ROS_MAX_JOINT],
    vel: &[f32; ROS_MAX_JOINT],
    valid_fields: ValidFields,
    num_joints: usize,
) -> Waypoint {
    Waypoint {
        time_from_start: f64::from(time),
        positions: pos[..num_joints].iter().map(|&p| f64::from(p)).collect(),
        velocities: valid_fields
            .contains(ValidFields::VELOCITY)
            .then(|| vel[..num_joints].iter().map(|&v| f64::from(v)).collect()),
    }
}

/// Answers motion control requests and demultiplexes trajectory points into the per-group
/// motion buffers.
pub(crate) fn motion_server(listener: TcpListener, shared: Arc<SimShared>) {
    let Some(mut transport) = accept(&listener, "motion server") else {
        return;
    };

    while !shared.stop.load(Ordering::Relaxed) {
        let msg = match transport.recv() {
            Ok(msg) => msg,
            Err(e) => {
                if !shared.stop.load(Ordering::Relaxed) {
                    log::debug!("[motion server] connection ended: {}", e);
                }

                break;
            }
        };

        let reply = match msg.body {
            MessageBody::MotionCtrl(request) => {
                if request.command == CommandType::StopMotion {
                    for group in &shared.groups {
                        group.stop_motion();
                    }
                }

                let (result, subcode) = shared.motion_reply();
                let mut reply = MotoMotionReply::new(request.command, result, subcode);

                reply.sequence = request.sequence;

                if request.command == CommandType::CheckQueueCnt {
                    reply.groupno = request.groupno;
                    reply.data[0] = shared
                        .group(request.groupno)
                        .map(|group| group.queue_depth() as f32)
                        .unwrap_or(-1.0);
                }

                SimpleMessage::service_reply(reply, ReplyType::Success)
            }
            MessageBody::JointTrajPtFull(point) => {
                if let Some(group) = shared.group(point.groupno) {
                    let _ = group.waypoint_tx.send(waypoint(
                        point.time,
                        &point.pos,
                        &point.vel,
                        point.valid_fields,
                        group.num_joints,
                    ));
                } else {
                    log::warn!(
                        "[motion server] trajectory point for unknown group {}",
                        point.groupno
                    );
                }

                let (result, subcode) = shared.motion_reply();

                SimpleMessage::service_reply(
                    MotoMotionReply::new(
                        CommandType::from(i32::from(MsgType::JointTrajPtFull)),
                        result,
                        subcode,
                    ),
                    ReplyType::Success,
                )
            }
            MessageBody::JointTrajPtFullEx(point) => {
                for sub in &point.points {
                    if let Some(group) = shared.group(sub.groupno) {
                        let _ = group.waypoint_tx.send(waypoint(
                            sub.time,
                            &sub.pos,
                            &sub.vel,
                            sub.valid_fields,
                            group.num_joints,
                        ));
                    } else {
                        log::warn!(
                            "[motion server] trajectory point for unknown group {}",
                            sub.groupno
                        );
                    }
                }

                let (result, subcode) = shared.motion_reply();

                SimpleMessage::service_reply(
                    MotoMotionReply::new(
                        CommandType::from(i32::from(MsgType::MotoJointTrajPtFullEx)),
                        result,
                        subcode,
                    ),
                    ReplyType::Success,
                )
            }
            MessageBody::SelectTool(request) => {
                let (result, subcode) = shared.motion_reply();
                let mut reply = MotoMotionReply::new(
                    CommandType::from(i32::from(MsgType::MotoSelectTool)),
                    result,
                    subcode,
                );

                reply.groupno = request.groupno;
                reply.sequence = request.sequence;

                SimpleMessage::service_reply(reply, ReplyType::Success)
            }
            MessageBody::GetDhParameters => {
                SimpleMessage::service_reply(DhParameters::default(), ReplyType::Success)
            }
            other => {
                log::trace!("[motion server] ignoring {:?}", other.msg_type());

                continue;
            }
        };

        if let Err(e) = transport.send(&reply) {
            log::debug!("[motion server] send failed: {}", e);

            break;
        }
    }

    log::debug!("[motion server] exiting");
}

/// Publishes per-group joint feedback, extended feedback and robot status at a fixed rate.
pub(crate) fn state_server(listener: TcpListener, shared: Arc<SimShared>, rate: f64) {
    let Some(mut transport) = accept(&listener, "state server") else {
        return;
    };

    let period = Duration::from_secs_f64(1.0 / rate);
    let started = Instant::now();

    while !shared.stop.load(Ordering::Relaxed) {
        let time = started.elapsed().as_secs_f32();

        let mut groups = heapless::Vec::<JointFeedback, MOT_MAX_GR>::new();
        let mut in_motion = false;

        for group in &shared.groups {
            let state = group.lock();

            let feedback = JointFeedback {
                groupno: group.groupno,
                valid_fields: ValidFields::TIME | ValidFields::POSITION | ValidFields::VELOCITY,
                time,
                pos: pad(&state.positions),
                vel: pad(&state.velocities),
                acc: [0.0; ROS_MAX_JOINT],
            };

            drop(state);

            in_motion |= group.queue_depth() > 0;

            let _ = groups.push(feedback);
        }

        let status = RobotStatus {
            drives_powered: Ternary::True,
            e_stopped: Ternary::False,
            error_code: 0,
            in_error: Ternary::False,
            in_motion: if in_motion {
                Ternary::True
            } else {
                Ternary::False
            },
            mode: PendantMode::Auto,
            motion_possible: Ternary::True,
        };

        let send = groups
            .iter()
            .map(|feedback| SimpleMessage::topic(*feedback))
            .chain([
                SimpleMessage::topic(JointFeedbackEx {
                    groups: groups.clone(),
                }),
                SimpleMessage::topic(status),
            ])
            .try_for_each(|msg| transport.send(&msg));

        if let Err(e) = send {
            if !shared.stop.load(Ordering::Relaxed) {
                log::debug!("[state server] connection ended: {}", e);
            }

            break;
        }

        spin_sleep::sleep(period);
    }

    log::debug!("[state server] exiting");
}

/// Answers IO reads and writes against an in-memory address map.
pub(crate) fn io_server(listener: TcpListener, shared: Arc<SimShared>) {
    let Some(mut transport) = accept(&listener, "io server") else {
        return;
    };

    while !shared.stop.load(Ordering::Relaxed) {
        let msg = match transport.recv() {
            Ok(msg) => msg,
            Err(e) => {
                if !shared.stop.load(Ordering::Relaxed) {
                    log::debug!("[io server] connection ended: {}", e);
                }

                break;
            }
        };

        let reply = match msg.body {
            MessageBody::ReadIoBit(request) => SimpleMessage::service_reply(
                ReadIoBitReply {
                    value: shared.io_read(request.address) & 1,
                    result_code: 0,
                },
                ReplyType::Success,
            ),
            MessageBody::WriteIoBit(request) => {
                shared.io_write(request.address, request.value & 1);

                SimpleMessage::service_reply(WriteIoBitReply { result_code: 0 }, ReplyType::Success)
            }
            MessageBody::ReadIoGroup(request) => SimpleMessage::service_reply(
                ReadIoGroupReply {
                    value: shared.io_read(request.address) & 0xff,
                    result_code: 0,
                },
                ReplyType::Success,
            ),
            MessageBody::WriteIoGroup(request) => {
                shared.io_write(request.address, request.value & 0xff);

                SimpleMessage::service_reply(
                    WriteIoGroupReply { result_code: 0 },
                    ReplyType::Success,
                )
            }
            other => {
                log::trace!("[io server] ignoring {:?}", other.msg_type());

                continue;
            }
        };

        if let Err(e) = transport.send(&reply) {
            log::debug!("[io server] send failed: {}", e);

            break;
        }
    }

    log::debug!("[io server] exiting");
}

/// Accepts real-time mode control requests and runs the UDP session around them.
pub(crate) fn rt_control_server(listener: TcpListener, shared: Arc<SimShared>) {
    let Some(mut transport) = accept(&listener, "rt control server") else {
        return;
    };

    while !shared.stop.load(Ordering::Relaxed) {
        let msg = match transport.recv() {
            Ok(msg) => msg,
            Err(e) => {
                if !shared.stop.load(Ordering::Relaxed) {
                    log::debug!("[rt control server] connection ended: {}", e);
                }

                break;
            }
        };

        let MessageBody::MotionCtrl(request) = msg.body else {
            log::trace!("[rt control server] ignoring {:?}", msg.header.msg_type);

            continue;
        };

        match request.command {
            CommandType::StartRealTimeMotionMode => {
                if shared.rt_running.swap(true, Ordering::AcqRel) {
                    log::warn!("[rt control server] real-time session already running");
                } else {
                    let worker_shared = Arc::clone(&shared);

                    let spawned = std::thread::Builder::new()
                        .name("motosm-sim-rt".into())
                        .spawn(move || rt_worker(worker_shared));

                    if spawned.is_err() {
                        shared.rt_running.store(false, Ordering::Release);
                    }
                }
            }
            CommandType::StopRealTimeMotionMode => {
                shared.rt_stop.store(true, Ordering::Release);
            }
            _ => {}
        }

        let reply = SimpleMessage::service_reply(
            MotoMotionReply::new(request.command, ResultType::Success, 0),
            ReplyType::Success,
        );

        if let Err(e) = transport.send(&reply) {
            log::debug!("[rt control server] send failed: {}", e);

            break;
        }
    }

    log::debug!("[rt control server] exiting");
}

/// The controller-side real-time loop: send state, await the echoed command, apply it, sleep
/// the period remainder.
fn rt_worker(shared: Arc<SimShared>) {
    let Some(peer) = shared.rt_peer() else {
        log::error!("[rt worker] no peer address configured, not starting");

        shared.rt_running.store(false, Ordering::Release);

        return;
    };

    let endpoint = match UdpEndpoint::bind(([0, 0, 0, 0], 0).into()) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            log::error!("[rt worker] failed to bind: {}", e);

            shared.rt_running.store(false, Ordering::Release);

            return;
        }
    };

    let period = Duration::from_secs_f64(1.0 / shared.rt_rate);

    // Generous per-cycle deadline: the external controller may take a few cycles to appear
    let _ = endpoint.set_read_timeout(Some(Duration::from_secs(1)));

    log::debug!("[rt worker] streaming to {}", peer);

    let mut message_id: i32 = 0;

    while !shared.stop.load(Ordering::Relaxed) && !shared.rt_stop.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        let mode = shared.rt_mode();

        let mut groups = heapless::Vec::<RealTimeJointStateExData, MOT_MAX_GR>::new();

        for group in &shared.groups {
            let state = group.lock();

            let _ = groups.push(RealTimeJointStateExData {
                groupno: group.groupno,
                pos: pad(&state.positions),
                vel: pad(&state.velocities),
            });
        }

        let state_msg = SimpleMessage::topic(RealTimeJointStateEx {
            message_id,
            mode,
            groups,
        });

        if let Err(e) = endpoint.send_to(&state_msg, peer) {
            log::error!("[rt worker] send failed: {}", e);

            break;
        }

        let command = match endpoint.recv_from() {
            Ok((msg, _from)) => match msg.body {
                MessageBody::RealTimeJointCommandEx(command) => command,
                _ => {
                    log::trace!("[rt worker] ignoring {:?}", msg.header.msg_type);

                    continue;
                }
            },
            Err(Error::Timeout) => {
                log::warn!("[rt worker] no command for message id {}", message_id);

                message_id += 1;

                continue;
            }
            Err(e) => {
                log::error!("[rt worker] receive failed: {}", e);

                break;
            }
        };

        if command.message_id != message_id {
            let e = Error::EchoMismatch {
                sent: message_id,
                received: command.message_id,
            };

            log::error!("[rt worker] terminating session: {}", e);

            break;
        }

        for data in &command.groups {
            let Some(group) = shared.group(data.groupno) else {
                log::warn!("[rt worker] command for unknown group {}", data.groupno);

                continue;
            };

            let mut state = group.lock();

            match mode {
                RealTimeMode::Idle | RealTimeMode::Unknown(_) => {}
                RealTimeMode::JointPosition => {
                    for k in 0..group.num_joints {
                        let pos_cmd = f64::from(data.command[k]);

                        // Finite difference against the previous position, taken before the
                        // assignment
                        state.velocities[k] =
                            (pos_cmd - state.positions[k]) / period.as_secs_f64();
                        state.positions[k] = pos_cmd;
                    }
                }
                RealTimeMode::JointVelocity => {
                    for k in 0..group.num_joints {
                        let vel_cmd = f64::from(data.command[k]);

                        state.positions[k] += vel_cmd * period.as_secs_f64();
                        state.velocities[k] = vel_cmd;
                    }
                }
            }
        }

        message_id += 1;

        let elapsed = cycle_start.elapsed();

        if elapsed < period {
            spin_sleep::sleep(period - elapsed);
        }
    }

    shared.rt_stop.store(false, Ordering::Release);
    shared.rt_running.store(false, Ordering::Release);

    log::debug!("[rt worker] exiting");
}
