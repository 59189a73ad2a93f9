//! State topic subscriber (TCP port 50241).
//!
//! The controller publishes joint feedback and robot status continuously. A background reader
//! ingests the stream and keeps the latest snapshot of each topic; synchronous callers get
//! copies, never references into the store.

use crate::error::Error;
use crate::message::{JointFeedback, JointFeedbackEx, MessageBody, RobotStatus};
use crate::transport::{ShutdownHandle, Transport};
use crate::{MOT_MAX_GR, Timeouts};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default TCP port of the state topic stream.
pub const TCP_PORT_STATE: u16 = 50241;

type JointFeedbackCallback = Arc<dyn Fn(JointFeedback) + Send + Sync>;
type JointFeedbackExCallback = Arc<dyn Fn(JointFeedbackEx) + Send + Sync>;

/// Latest-value store plus registered callbacks, all behind one lock.
///
/// Critical sections only copy data in or out; user callbacks are invoked after the lock is
/// released.
#[derive(Default)]
struct Store {
    joint_feedback: [Option<JointFeedback>; MOT_MAX_GR],
    joint_feedback_ex: Option<JointFeedbackEx>,
    robot_status: Option<RobotStatus>,
    feedback_callbacks: Vec<JointFeedbackCallback>,
    feedback_ex_callbacks: Vec<JointFeedbackExCallback>,
}

struct Shared {
    store: Mutex<Store>,
    arrived: Condvar,
    stop: AtomicBool,
}

impl std::fmt::Debug for Shared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared").field("stop", &self.stop).finish()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Subscriber for the controller's continuous state topics.
#[derive(Debug)]
pub struct StateClient {
    addr: SocketAddr,
    groups: Vec<i32>,
    connect_timeout: Duration,
    start_timeout: Duration,
    shared: Arc<Shared>,
    reader: Option<JoinHandle<()>>,
    shutdown: Option<ShutdownHandle>,
}

impl StateClient {
    /// Create a subscriber for the state endpoint at `addr`.
    ///
    /// `groups` lists the group numbers the controller is configured with;
    /// [`StateClient::start`] blocks until feedback for each of them has been seen.
    pub fn new(addr: SocketAddr, groups: Vec<i32>, timeouts: &Timeouts) -> Self {
        Self {
            addr,
            groups,
            connect_timeout: timeouts.connect,
            start_timeout: timeouts.start_state,
            shared: Arc::new(Shared {
                store: Mutex::new(Store::default()),
                arrived: Condvar::new(),
                stop: AtomicBool::new(false),
            }),
            reader: None,
            shutdown: None,
        }
    }

    /// Connect and spawn the background reader, then block until at least one joint feedback
    /// per configured group, one extended feedback and one robot status have arrived.
    ///
    /// On expiry the reader is stopped and [`Error::InitialFeedbackTimeout`] is returned.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.reader.is_some() {
            return Ok(());
        }

        let transport = Transport::connect(self.addr, self.connect_timeout)?;

        self.shutdown = Some(transport.shutdown_handle()?);

        let shared = Arc::clone(&self.shared);

        self.reader = Some(
            std::thread::Builder::new()
                .name("motosm-state-reader".into())
                .spawn(move || reader_loop(transport, shared))?,
        );

        let groups = self.groups.clone();

        let guard = self.shared.lock();

        let (_guard, wait) = self
            .shared
            .arrived
            .wait_timeout_while(guard, self.start_timeout, |store| {
                !have_initial(store, &groups)
            })
            .unwrap_or_else(PoisonError::into_inner);

        if wait.timed_out() {
            drop(_guard);
            self.stop();

            return Err(Error::InitialFeedbackTimeout);
        }

        Ok(())
    }

    /// Signal the reader to stop, unblock it and wait for it to exit.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);

        if let Some(shutdown) = self.shutdown.take() {
            shutdown.shutdown();
        }

        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }

    /// The latest joint feedback for `groupno`, if any has arrived.
    pub fn joint_feedback(&self, groupno: i32) -> Option<JointFeedback> {
        let store = self.shared.lock();

        *store.joint_feedback.get(groupno as usize)?
    }

    /// The latest extended joint feedback, if any has arrived.
    pub fn joint_feedback_ex(&self) -> Option<JointFeedbackEx> {
        self.shared.lock().joint_feedback_ex.clone()
    }

    /// The latest robot status, if any has arrived.
    pub fn robot_status(&self) -> Option<RobotStatus> {
        self.shared.lock().robot_status
    }

    /// Register a callback invoked with a copy of every incoming joint feedback message.
    ///
    /// Callbacks run on the reader thread: keep them short, and do not call back into this
    /// subscriber from inside one.
    pub fn add_joint_feedback_callback(
        &self,
        callback: impl Fn(JointFeedback) + Send + Sync + 'static,
    ) {
        self.shared.lock().feedback_callbacks.push(Arc::new(callback));
    }

    /// Register a callback invoked with a copy of every incoming extended feedback message.
    ///
    /// Same restrictions as [`StateClient::add_joint_feedback_callback`].
    pub fn add_joint_feedback_ex_callback(
        &self,
        callback: impl Fn(JointFeedbackEx) + Send + Sync + 'static,
    ) {
        self.shared
            .lock()
            .feedback_ex_callbacks
            .push(Arc::new(callback));
    }
}

impl Drop for StateClient {
    fn drop(&mut self) {
        self.stop();
    }
}

fn have_initial(store: &Store, groups: &[i32]) -> bool {
    groups
        .iter()
        .all(|groupno| matches!(store.joint_feedback.get(*groupno as usize), Some(Some(_))))
        && store.joint_feedback_ex.is_some()
        && store.robot_status.is_some()
}

fn reader_loop(mut transport: Transport, shared: Arc<Shared>) {
    log::debug!("state reader running against {}", transport.peer());

    while !shared.stop.load(Ordering::Relaxed) {
        let msg = match transport.recv() {
            Ok(msg) => msg,
            // The whole declared frame was consumed, so the stream is still aligned and one
            // bad message can be dropped
            Err(
                e @ (Error::ShortFrame { .. } | Error::InvalidGroupCount { .. } | Error::Wire(_)),
            ) => {
                log::warn!("dropping undecodable state message: {}", e);

                continue;
            }
            Err(e) => {
                if !shared.stop.load(Ordering::Relaxed) {
                    log::error!("state stream failed: {}", e);
                }

                break;
            }
        };

        match msg.body {
            MessageBody::JointFeedback(feedback) => {
                let callbacks = {
                    let mut store = shared.lock();

                    match store.joint_feedback.get_mut(feedback.groupno as usize) {
                        Some(slot) => *slot = Some(feedback),
                        None => {
                            log::warn!(
                                "joint feedback for out of range group {}",
                                feedback.groupno
                            );

                            continue;
                        }
                    }

                    store.feedback_callbacks.clone()
                };

                shared.arrived.notify_all();

                for callback in callbacks {
                    callback(feedback);
                }
            }
            MessageBody::JointFeedbackEx(feedback) => {
                let callbacks = {
                    let mut store = shared.lock();

                    store.joint_feedback_ex = Some(feedback.clone());

                    store.feedback_ex_callbacks.clone()
                };

                shared.arrived.notify_all();

                for callback in callbacks {
                    callback(feedback.clone());
                }
            }
            MessageBody::RobotStatus(status) => {
                shared.lock().robot_status = Some(status);

                shared.arrived.notify_all();
            }
            _ => log::trace!("ignoring {:?} on the state stream", msg.header.msg_type),
        }
    }

    log::debug!("state reader exiting");
}
