//! Motion control service client (TCP port 50240).

use crate::Timeouts;
use crate::error::Error;
use crate::message::{
    CommandType, DhParameters, JointTrajPtFull, JointTrajPtFullEx, MessageBody, MotoMotionCtrl,
    MotoMotionReply, ResultType, SelectTool, SimpleMessage,
};
use crate::transport::Transport;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default TCP port of the motion service.
pub const TCP_PORT_MOTION: u16 = 50240;

/// A trajectory point in either the single group or the multi group flavour.
#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryPoint {
    /// Single group, tag 14.
    Full(JointTrajPtFull),
    /// Multi group, tag 2016.
    FullEx(JointTrajPtFullEx),
}

impl From<JointTrajPtFull> for TrajectoryPoint {
    fn from(value: JointTrajPtFull) -> Self {
        Self::Full(value)
    }
}

impl From<JointTrajPtFullEx> for TrajectoryPoint {
    fn from(value: JointTrajPtFullEx) -> Self {
        Self::FullEx(value)
    }
}

/// Synchronous request/reply client for the controller's motion service.
///
/// All operations lock the underlying socket for the duration of one request and its reply, so
/// at most one request is ever outstanding. Failed commands are surfaced as
/// [`Error::RemoteFailure`] and never retried; a blind retry of a motion command is unsafe.
///
/// The usual session order is advisory but worth following: connect, [`start_servos`],
/// [`start_traj_mode`], stream trajectory points, [`stop_traj_mode`], [`stop_servos`],
/// [`disconnect`].
///
/// [`start_servos`]: MotionClient::start_servos
/// [`start_traj_mode`]: MotionClient::start_traj_mode
/// [`stop_traj_mode`]: MotionClient::stop_traj_mode
/// [`stop_servos`]: MotionClient::stop_servos
/// [`disconnect`]: MotionClient::disconnect
#[derive(Debug)]
pub struct MotionClient {
    transport: Mutex<Transport>,
}

impl MotionClient {
    /// Connect to the motion service at `addr`.
    pub fn connect(addr: SocketAddr, timeouts: &Timeouts) -> Result<Self, Error> {
        let transport = Transport::connect(addr, timeouts.connect)?;

        transport.set_read_timeout(Some(timeouts.request))?;

        Ok(Self {
            transport: Mutex::new(transport),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Transport> {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reply_of(&self, request: &SimpleMessage) -> Result<MotoMotionReply, Error> {
        let reply = self.lock().send_and_recv(request)?;

        match reply.body {
            MessageBody::MotionReply(reply) => Ok(reply),
            // Anything else from the controller counts as a failed service call
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }

    fn request(&self, groupno: i32, command: CommandType) -> Result<MotoMotionReply, Error> {
        self.reply_of(&SimpleMessage::service_request(MotoMotionCtrl::for_group(
            groupno, command,
        )))
    }

    /// Issue `command` and demand a `SUCCESS` result.
    fn command(&self, command: CommandType) -> Result<(), Error> {
        let reply = self.request(-1, command)?;

        match reply.result {
            ResultType::Success => Ok(()),
            result => Err(Error::RemoteFailure {
                result,
                subcode: reply.subcode,
            }),
        }
    }

    /// Whether the controller is currently able to accept motion commands.
    pub fn check_motion_ready(&self) -> Result<bool, Error> {
        let reply = self.request(-1, CommandType::CheckMotionReady)?;

        Ok(reply.result == ResultType::Success)
    }

    /// The number of trajectory points queued on the controller for `groupno`.
    pub fn check_queue_count(&self, groupno: i32) -> Result<i32, Error> {
        let reply = self.request(groupno, CommandType::CheckQueueCnt)?;

        match reply.result {
            ResultType::Success => Ok(reply.data[0] as i32),
            result => Err(Error::RemoteFailure {
                result,
                subcode: reply.subcode,
            }),
        }
    }

    /// Stop the current motion.
    pub fn stop_motion(&self) -> Result<(), Error> {
        self.command(CommandType::StopMotion)
    }

    /// Turn servo power on.
    pub fn start_servos(&self) -> Result<(), Error> {
        self.command(CommandType::StartServos)
    }

    /// Turn servo power off, stopping any motion.
    pub fn stop_servos(&self) -> Result<(), Error> {
        self.command(CommandType::StopServos)
    }

    /// Clear the active alarm.
    pub fn reset_alarm(&self) -> Result<(), Error> {
        self.command(CommandType::ResetAlarm)
    }

    /// Enter trajectory streaming mode.
    pub fn start_traj_mode(&self) -> Result<(), Error> {
        self.command(CommandType::StartTrajMode)
    }

    /// Leave trajectory streaming mode.
    pub fn stop_traj_mode(&self) -> Result<(), Error> {
        self.command(CommandType::StopTrajMode)
    }

    /// Cooperative shutdown: tell the controller the session is over, then close the socket.
    ///
    /// The controller tears the connection down on receipt, so no reply is awaited.
    pub fn disconnect(&self) -> Result<(), Error> {
        let mut transport = self.lock();

        transport.send(&SimpleMessage::service_request(MotoMotionCtrl::new(
            CommandType::Disconnect,
        )))?;

        log::info!("disconnected from {}", transport.peer());

        Ok(())
    }

    /// Activate tool file `tool` for `groupno`.
    pub fn select_tool(&self, groupno: i32, tool: i32, sequence: i32) -> Result<(), Error> {
        let reply = self.reply_of(&SimpleMessage::service_request(SelectTool {
            groupno,
            tool,
            sequence,
        }))?;

        match reply.result {
            ResultType::Success => Ok(()),
            result => Err(Error::RemoteFailure {
                result,
                subcode: reply.subcode,
            }),
        }
    }

    /// Read the Denavit-Hartenberg parameters of every group.
    pub fn get_dh_parameters(&self) -> Result<DhParameters, Error> {
        let reply = self.lock().send_and_recv(&SimpleMessage::dh_parameter_request())?;

        match reply.body {
            MessageBody::DhParameters(params) => Ok(params),
            MessageBody::MotionReply(reply) => Err(Error::RemoteFailure {
                result: reply.result,
                subcode: reply.subcode,
            }),
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }

    /// Stream one trajectory point to the controller.
    ///
    /// Readiness is checked locally before the point variant is even examined: sending to a
    /// controller that is not in trajectory mode would only come back as a remote failure with
    /// a less useful diagnostic.
    pub fn send_joint_trajectory_point(
        &self,
        point: impl Into<TrajectoryPoint>,
    ) -> Result<(), Error> {
        if !self.check_motion_ready()? {
            return Err(Error::NotReady);
        }

        let msg = match point.into() {
            TrajectoryPoint::Full(point) => SimpleMessage::topic(point),
            TrajectoryPoint::FullEx(point) => SimpleMessage::topic(point),
        };

        let reply = self.reply_of(&msg)?;

        match reply.result {
            ResultType::Success => Ok(()),
            result => Err(Error::RemoteFailure {
                result,
                subcode: reply.subcode,
            }),
        }
    }
}
