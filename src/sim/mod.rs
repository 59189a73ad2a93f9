//! An in-process simulator playing the controller side of the Simple Message protocol.
//!
//! [`ControllerSim`] binds the same four TCP endpoints a real controller exposes (motion,
//! state, IO, real-time control) plus the real-time UDP exchange, so the whole client stack
//! can be driven without hardware. Trajectory points are played out through per-group motion
//! buffers with cubic-Hermite interpolation between velocity-carrying waypoints.
//!
//! The simulator does not model alarm conditions: motion requests are acknowledged with the
//! configured reply (`SUCCESS` unless overridden with [`ControllerSim::set_motion_reply`]).

mod group;
mod motion_buffer;
mod servers;

pub use group::SimControlGroup;

use crate::error::Error;
use crate::message::{RealTimeMode, ResultType};
use crate::robot::Ports;
use group::GroupShared;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Simulator configuration.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Address the listeners bind to. Use port 0 in [`SimOptions::ports`] for ephemeral
    /// ports, reported by [`ControllerSim::addrs`].
    pub bind_ip: IpAddr,
    /// Listener ports. Defaults to the real controller ports.
    pub ports: Ports,
    /// State topic publish rate, Hz.
    pub state_rate: f64,
    /// Motion buffer interpolation rate, Hz.
    pub update_rate: f64,
    /// Real-time exchange rate, Hz.
    pub rt_rate: f64,
    /// Command interpretation of the real-time session.
    pub rt_mode: RealTimeMode,
    /// Where real-time state datagrams are sent: the external controller's bound UDP
    /// address. Required before a real-time session can start.
    pub rt_peer: Option<SocketAddr>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ports: Ports::default(),
            state_rate: 25.0,
            update_rate: 100.0,
            rt_rate: 250.0,
            rt_mode: RealTimeMode::JointVelocity,
            rt_peer: None,
        }
    }
}

/// The addresses the simulator actually bound, for clients connecting to ephemeral ports.
#[derive(Debug, Copy, Clone)]
pub struct SimAddrs {
    /// Motion service listener.
    pub motion: SocketAddr,
    /// State topic listener.
    pub state: SocketAddr,
    /// IO service listener.
    pub io: SocketAddr,
    /// Real-time control listener.
    pub rt_control: SocketAddr,
}

pub(crate) struct SimShared {
    pub stop: AtomicBool,
    pub rt_stop: AtomicBool,
    pub rt_running: AtomicBool,
    pub rt_rate: f64,
    rt_peer: Mutex<Option<SocketAddr>>,
    rt_mode: Mutex<RealTimeMode>,
    pub groups: Vec<Arc<GroupShared>>,
    io_store: Mutex<HashMap<u32, u32>>,
    motion_reply: Mutex<(ResultType, i32)>,
}

impl SimShared {
    pub fn group(&self, groupno: i32) -> Option<&Arc<GroupShared>> {
        self.groups.iter().find(|group| group.groupno == groupno)
    }

    pub fn rt_mode(&self) -> RealTimeMode {
        *lock(&self.rt_mode)
    }

    pub fn rt_peer(&self) -> Option<SocketAddr> {
        *lock(&self.rt_peer)
    }

    pub fn motion_reply(&self) -> (ResultType, i32) {
        *lock(&self.motion_reply)
    }

    pub fn io_read(&self, address: u32) -> u32 {
        lock(&self.io_store).get(&address).copied().unwrap_or(0)
    }

    pub fn io_write(&self, address: u32, value: u32) {
        lock(&self.io_store).insert(address, value);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-process stand-in for a MOTOMAN controller.
///
/// Each listener accepts one connection, like the MotoPlus job. Workers are daemon-style:
/// [`ControllerSim::stop`] signals them and they exit at their next top-of-loop check or
/// socket error.
pub struct ControllerSim {
    shared: Arc<SimShared>,
    addrs: SimAddrs,
}

impl ControllerSim {
    /// Bind all listeners, spawn the per-group motion buffer workers and the protocol
    /// servers.
    pub fn start(groups: Vec<SimControlGroup>, options: SimOptions) -> Result<Self, Error> {
        let motion_listener =
            TcpListener::bind(SocketAddr::new(options.bind_ip, options.ports.motion))?;
        let state_listener =
            TcpListener::bind(SocketAddr::new(options.bind_ip, options.ports.state))?;
        let io_listener = TcpListener::bind(SocketAddr::new(options.bind_ip, options.ports.io))?;
        let rt_listener =
            TcpListener::bind(SocketAddr::new(options.bind_ip, options.ports.rt_control))?;

        let addrs = SimAddrs {
            motion: motion_listener.local_addr()?,
            state: state_listener.local_addr()?,
            io: io_listener.local_addr()?,
            rt_control: rt_listener.local_addr()?,
        };

        let shared = Arc::new(SimShared {
            stop: AtomicBool::new(false),
            rt_stop: AtomicBool::new(false),
            rt_running: AtomicBool::new(false),
            rt_rate: options.rt_rate,
            rt_peer: Mutex::new(options.rt_peer),
            rt_mode: Mutex::new(options.rt_mode),
            groups: groups.iter().map(|g| Arc::new(GroupShared::new(g))).collect(),
            io_store: Mutex::new(HashMap::new()),
            motion_reply: Mutex::new((ResultType::Success, 0)),
        });

        for group in &shared.groups {
            let rx = group.waypoint_rx.clone();
            let group = Arc::clone(group);
            let worker_shared = Arc::clone(&shared);
            let update_rate = options.update_rate;

            std::thread::Builder::new()
                .name(format!("motosm-sim-motion-{}", group.groupno))
                .spawn(move || {
                    motion_buffer::motion_worker(rx, group, update_rate, worker_shared)
                })?;
        }

        let spawn = |name: &str, f: Box<dyn FnOnce() + Send>| {
            std::thread::Builder::new()
                .name(format!("motosm-sim-{name}"))
                .spawn(f)
                .map(|_| ())
        };

        {
            let shared = Arc::clone(&shared);
            spawn(
                "motion",
                Box::new(move || servers::motion_server(motion_listener, shared)),
            )?;
        }

        {
            let shared = Arc::clone(&shared);
            let rate = options.state_rate;
            spawn(
                "state",
                Box::new(move || servers::state_server(state_listener, shared, rate)),
            )?;
        }

        {
            let shared = Arc::clone(&shared);
            spawn(
                "io",
                Box::new(move || servers::io_server(io_listener, shared)),
            )?;
        }

        {
            let shared = Arc::clone(&shared);
            spawn(
                "rt-control",
                Box::new(move || servers::rt_control_server(rt_listener, shared)),
            )?;
        }

        log::info!(
            "simulator listening on {} (motion) / {} (state) / {} (io) / {} (rt)",
            addrs.motion,
            addrs.state,
            addrs.io,
            addrs.rt_control
        );

        Ok(Self { shared, addrs })
    }

    /// The bound listener addresses.
    pub fn addrs(&self) -> SimAddrs {
        self.addrs
    }

    /// Change the real-time command interpretation. Takes effect at the next cycle.
    pub fn set_rt_mode(&self, mode: RealTimeMode) {
        *lock(&self.shared.rt_mode) = mode;
    }

    /// Set where real-time state datagrams are sent. Must be called before the external
    /// controller requests `START_REALTIME_MOTION_MODE` unless it was given in
    /// [`SimOptions::rt_peer`].
    pub fn set_rt_peer(&self, peer: SocketAddr) {
        *lock(&self.shared.rt_peer) = Some(peer);
    }

    /// Override the result every motion service reply carries, e.g. to exercise failure
    /// handling in clients.
    pub fn set_motion_reply(&self, result: ResultType, subcode: i32) {
        *lock(&self.shared.motion_reply) = (result, subcode);
    }

    /// Current joint positions of `groupno`, radians.
    pub fn joint_positions(&self, groupno: i32) -> Option<Vec<f64>> {
        self.shared
            .group(groupno)
            .map(|group| group.lock().positions.clone())
    }

    /// Current joint velocities of `groupno`, rad/s.
    pub fn joint_velocities(&self, groupno: i32) -> Option<Vec<f64>> {
        self.shared
            .group(groupno)
            .map(|group| group.lock().velocities.clone())
    }

    /// Trajectory points queued but not yet consumed for `groupno`.
    pub fn queue_depth(&self, groupno: i32) -> Option<usize> {
        self.shared.group(groupno).map(|group| group.queue_depth())
    }

    /// Whether a real-time session is currently streaming.
    pub fn rt_running(&self) -> bool {
        self.shared.rt_running.load(Ordering::Relaxed)
    }

    /// Signal every worker to stop. Workers exit at their next top-of-loop check; workers
    /// still parked in `accept` are daemon-style and exit with the process.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        self.shared.rt_stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for ControllerSim {
    fn drop(&mut self) {
        self.stop();
    }
}
