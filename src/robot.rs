//! The top-level facade bundling one client per controller endpoint.

use crate::control_group::{ControlGroup, ControlGroupDefinition};
use crate::error::Error;
use crate::io_client::IoClient;
use crate::motion::MotionClient;
use crate::real_time::RealTimeClient;
use crate::state::StateClient;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// The controller's listening ports. Defaults are the ports the MotoPlus job binds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ports {
    /// Motion service.
    pub motion: u16,
    /// State topic stream.
    pub state: u16,
    /// IO service.
    pub io: u16,
    /// Real-time control channel.
    pub rt_control: u16,
    /// Real-time UDP data channel.
    pub rt_data: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            motion: crate::motion::TCP_PORT_MOTION,
            state: crate::state::TCP_PORT_STATE,
            io: crate::io_client::TCP_PORT_IO,
            rt_control: crate::real_time::TCP_PORT_REALTIME_MOTION,
            rt_data: crate::real_time::UDP_PORT_REALTIME_MOTION,
        }
    }
}

/// Timeouts used by the clients.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// TCP connect timeout.
    pub connect: Duration,
    /// Per-request reply timeout on the service channels.
    pub request: Duration,
    /// How long [`StateClient::start`] waits for the initial set of feedback messages.
    pub start_state: Duration,
    /// Per-cycle receive timeout of the real-time UDP loop.
    pub rt_cycle: Duration,
    /// How many consecutive receive timeouts the real-time loop tolerates before exiting.
    pub rt_timeouts_before_exit: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(2),
            request: Duration::from_secs(5),
            start_state: Duration::from_secs(10),
            // Four nominal 250 Hz periods
            rt_cycle: Duration::from_millis(16),
            rt_timeouts_before_exit: 125,
        }
    }
}

/// Which endpoints [`Robot::connect`] brings up, plus ports and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotOptions {
    /// Connect the motion service client. Default `true`.
    pub start_motion: bool,
    /// Connect and start the state subscriber. Default `true`.
    pub start_state: bool,
    /// Connect the IO client. Default `true`.
    pub start_io: bool,
    /// Connect the real-time control channel. Default `false`.
    pub start_realtime: bool,
    /// Endpoint ports.
    pub ports: Ports,
    /// Client timeouts.
    pub timeouts: Timeouts,
}

impl Default for RobotOptions {
    fn default() -> Self {
        Self {
            start_motion: true,
            start_state: true,
            start_io: true,
            start_realtime: false,
            ports: Ports::default(),
            timeouts: Timeouts::default(),
        }
    }
}

/// A connected MOTOMAN controller.
///
/// Owns up to one client per endpoint; which ones exist is decided by the
/// [`RobotOptions`] flags at connect time.
pub struct Robot {
    defs: Vec<ControlGroupDefinition>,
    motion: Option<MotionClient>,
    state: Option<StateClient>,
    io: Option<IoClient>,
    rt: Option<RealTimeClient>,
}

impl Robot {
    /// Connect the configured endpoints of the controller at `ip`.
    ///
    /// When the state subscriber is enabled this blocks until the initial feedback set for
    /// every defined group has arrived, so positions are readable as soon as this returns.
    pub fn connect(
        ip: IpAddr,
        control_groups: Vec<ControlGroupDefinition>,
        options: RobotOptions,
    ) -> Result<Self, Error> {
        if control_groups.is_empty() {
            return Err(Error::InvalidGroupDefinition {
                reason: "at least one control group must be defined",
            });
        }

        let timeouts = options.timeouts;

        let motion = if options.start_motion {
            Some(MotionClient::connect(
                SocketAddr::new(ip, options.ports.motion),
                &timeouts,
            )?)
        } else {
            None
        };

        let state = if options.start_state {
            let mut client = StateClient::new(
                SocketAddr::new(ip, options.ports.state),
                control_groups.iter().map(|def| def.groupno()).collect(),
                &timeouts,
            );

            client.start()?;

            Some(client)
        } else {
            None
        };

        let io = if options.start_io {
            Some(IoClient::connect(
                SocketAddr::new(ip, options.ports.io),
                &timeouts,
            )?)
        } else {
            None
        };

        let rt = if options.start_realtime {
            Some(RealTimeClient::connect(
                SocketAddr::new(ip, options.ports.rt_control),
                &timeouts,
            )?)
        } else {
            None
        };

        Ok(Self {
            defs: control_groups,
            motion,
            state,
            io,
            rt,
        })
    }

    /// The motion service client, if enabled.
    pub fn motion(&self) -> Option<&MotionClient> {
        self.motion.as_ref()
    }

    /// The state subscriber, if enabled.
    pub fn state(&self) -> Option<&StateClient> {
        self.state.as_ref()
    }

    /// The IO client, if enabled.
    pub fn io(&self) -> Option<&IoClient> {
        self.io.as_ref()
    }

    /// The real-time client, if enabled.
    pub fn rt(&self) -> Option<&RealTimeClient> {
        self.rt.as_ref()
    }

    /// Mutable access to the real-time client, needed to start and stop its UDP loop.
    pub fn rt_mut(&mut self) -> Option<&mut RealTimeClient> {
        self.rt.as_mut()
    }

    /// Views of every defined control group, keyed by nothing: iterate or use
    /// [`Robot::control_group`].
    pub fn control_groups(&self) -> impl Iterator<Item = ControlGroup<'_>> {
        self.defs
            .iter()
            .map(|def| ControlGroup::new(def, self.state.as_ref()))
    }

    /// The view of the group with the given `groupid`, if defined.
    pub fn control_group(&self, groupid: &str) -> Option<ControlGroup<'_>> {
        self.defs
            .iter()
            .find(|def| def.groupid() == groupid)
            .map(|def| ControlGroup::new(def, self.state.as_ref()))
    }
}
