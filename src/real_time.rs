//! Real-time motion client (TCP port 50243 control channel + UDP port 50244 data channel).
//!
//! After [`RealTimeClient::start_rt_mode`] the controller streams one
//! [`RealTimeJointStateEx`] datagram per cycle (250 Hz by default) and expects a
//! [`RealTimeJointCommandEx`] answer echoing the state's `message_id` before the next cycle.
//! The echo is the session's liveness contract: controllers terminate on mismatch.

use crate::error::Error;
use crate::message::{
    CommandType, MessageBody, MotoMotionCtrl, MotoMotionReply, RealTimeJointCommandEx,
    RealTimeJointCommandExData, RealTimeJointStateEx, ResultType, SimpleMessage,
};
use crate::transport::{Transport, UdpEndpoint};
use crate::{MOT_MAX_GR, Timeouts};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Default TCP port of the real-time control channel.
pub const TCP_PORT_REALTIME_MOTION: u16 = 50243;

/// Default UDP port of the real-time data channel.
pub const UDP_PORT_REALTIME_MOTION: u16 = 50244;

/// The user control function: maps each incoming joint state to the per-group command data of
/// the reply. The `message_id` echo is handled by the loop, not the control function.
pub type ControlFn =
    dyn FnMut(&RealTimeJointStateEx) -> heapless::Vec<RealTimeJointCommandExData, MOT_MAX_GR>
        + Send;

/// Client for the controller's real-time motion mode.
pub struct RealTimeClient {
    control: Mutex<Transport>,
    udp_loop: Option<JoinHandle<()>>,
    stop_tx: Option<crossbeam_channel::Sender<()>>,
    overruns: Arc<AtomicU64>,
    cycle_timeout: Duration,
    timeouts_before_exit: u32,
}

impl RealTimeClient {
    /// Connect the TCP control channel at `addr`.
    pub fn connect(addr: SocketAddr, timeouts: &Timeouts) -> Result<Self, Error> {
        let control = Transport::connect(addr, timeouts.connect)?;

        control.set_read_timeout(Some(timeouts.request))?;

        Ok(Self {
            control: Mutex::new(control),
            udp_loop: None,
            stop_tx: None,
            overruns: Arc::new(AtomicU64::new(0)),
            cycle_timeout: timeouts.rt_cycle,
            timeouts_before_exit: timeouts.rt_timeouts_before_exit,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Transport> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request(&self, command: CommandType) -> Result<MotoMotionReply, Error> {
        let reply = self
            .lock()
            .send_and_recv(&SimpleMessage::service_request(MotoMotionCtrl::new(command)))?;

        match reply.body {
            MessageBody::MotionReply(reply) => Ok(reply),
            _ => Err(Error::RemoteFailure {
                result: ResultType::Unknown(-1),
                subcode: 0,
            }),
        }
    }

    fn command(&self, command: CommandType) -> Result<(), Error> {
        let reply = self.request(command)?;

        match reply.result {
            ResultType::Success => Ok(()),
            result => Err(Error::RemoteFailure {
                result,
                subcode: reply.subcode,
            }),
        }
    }

    /// Ask the controller to start streaming real-time state packets.
    pub fn start_rt_mode(&self) -> Result<(), Error> {
        self.command(CommandType::StartRealTimeMotionMode)
    }

    /// Ask the controller to stop the real-time session. The UDP loop observes the end of the
    /// stream through its receive timeout; call [`RealTimeClient::stop_udp_loop`] to reap it.
    pub fn stop_rt_mode(&self) -> Result<(), Error> {
        self.command(CommandType::StopRealTimeMotionMode)
    }

    /// Bind the UDP data socket at `bind` and spawn the cyclic exchange.
    ///
    /// `period` is the controller's nominal cycle period; handling that takes longer is
    /// counted as an overrun (see [`RealTimeClient::overruns`]) but never skips a reply.
    /// Returns the bound local address, useful when binding port 0.
    pub fn start_udp_loop(
        &mut self,
        bind: SocketAddr,
        period: Duration,
        control: impl FnMut(&RealTimeJointStateEx) -> heapless::Vec<RealTimeJointCommandExData, MOT_MAX_GR>
        + Send
        + 'static,
    ) -> Result<SocketAddr, Error> {
        if self.udp_loop.is_some() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "real-time UDP loop is already running",
            )));
        }

        let endpoint = UdpEndpoint::bind(bind)?;

        endpoint.set_read_timeout(Some(self.cycle_timeout))?;

        let local = endpoint.local_addr()?;

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let overruns = Arc::clone(&self.overruns);
        let timeouts_before_exit = self.timeouts_before_exit;

        self.udp_loop = Some(
            std::thread::Builder::new()
                .name("motosm-rt-loop".into())
                .spawn(move || {
                    udp_loop(
                        endpoint,
                        Box::new(control),
                        stop_rx,
                        overruns,
                        period,
                        timeouts_before_exit,
                    )
                })?,
        );

        self.stop_tx = Some(stop_tx);

        Ok(local)
    }

    /// Signal the UDP loop to exit at its next cycle boundary and wait for it.
    pub fn stop_udp_loop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }

        if let Some(handle) = self.udp_loop.take() {
            let _ = handle.join();
        }
    }

    /// Number of cycles whose handling exceeded the nominal period since the loop started.
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Drop for RealTimeClient {
    fn drop(&mut self) {
        self.stop_udp_loop();
    }
}

fn udp_loop(
    endpoint: UdpEndpoint,
    mut control: Box<ControlFn>,
    stop_rx: crossbeam_channel::Receiver<()>,
    overruns: Arc<AtomicU64>,
    period: Duration,
    timeouts_before_exit: u32,
) {
    log::debug!("real-time UDP loop running");

    let mut consecutive_timeouts = 0u32;

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        let (msg, from) = match endpoint.recv_from() {
            Ok(received) => {
                consecutive_timeouts = 0;

                received
            }
            Err(Error::Timeout) => {
                consecutive_timeouts += 1;

                if consecutive_timeouts >= timeouts_before_exit {
                    log::error!(
                        "no real-time state for {} cycles, exiting",
                        consecutive_timeouts
                    );

                    break;
                }

                continue;
            }
            Err(e) => {
                log::error!("real-time receive failed: {}", e);

                break;
            }
        };

        let MessageBody::RealTimeJointStateEx(state) = msg.body else {
            log::trace!("ignoring {:?} on the real-time socket", msg.header.msg_type);

            continue;
        };

        let cycle_start = Instant::now();

        let command = RealTimeJointCommandEx {
            // Echo contract: the reply must carry the id of the state it answers
            message_id: state.message_id,
            groups: control(&state),
        };

        if let Err(e) = endpoint.send_to(&SimpleMessage::topic(command), from) {
            log::error!("real-time send failed: {}", e);

            break;
        }

        // Deadline misses are reported, never skipped: the controller still got its reply,
        // just late
        if cycle_start.elapsed() > period {
            overruns.fetch_add(1, Ordering::Relaxed);

            log::warn!("real-time cycle overran its {:?} period", period);
        }
    }

    log::debug!("real-time UDP loop exiting");
}
