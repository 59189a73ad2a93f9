//! A pure Rust client library and simulator for the Yaskawa MOTOMAN MotoPlus "Simple Message"
//! protocol.
//!
//! A controller running the MotoPlus Simple Message job exposes four endpoints, all little
//! endian and length prefixed:
//!
//! - TCP 50240: motion control service requests and trajectory point streaming
//!   ([`MotionClient`]).
//! - TCP 50241: continuous joint feedback and robot status topics ([`StateClient`]).
//! - TCP 50242: IO bit/group read and write services ([`IoClient`]).
//! - TCP 50243 + UDP 50244: real-time motion mode control and its fixed-rate (typically
//!   250 Hz) state/command exchange ([`RealTimeClient`]).
//!
//! [`Robot`] bundles one client per endpoint behind a single facade. [`sim::ControllerSim`]
//! plays the controller side of all of the above in-process, including a cubic-Hermite
//! trajectory interpolator, so the full stack can be exercised without hardware.
//!
//! # Examples
//!
//! ```rust,no_run
//! use motosm::{ControlGroupDefinition, Robot, RobotOptions};
//!
//! # fn main() -> Result<(), motosm::error::Error> {
//! let robot = Robot::connect(
//!     "192.168.255.200".parse().unwrap(),
//!     vec![ControlGroupDefinition::new(
//!         "R1",
//!         0,
//!         6,
//!         vec!["s", "l", "u", "r", "b", "t"],
//!     )?],
//!     RobotOptions::default(),
//! )?;
//!
//! let motion = robot.motion().expect("motion is enabled by default");
//! motion.start_servos()?;
//! motion.start_traj_mode()?;
//!
//! if let Some(feedback) = robot.state().and_then(|state| state.joint_feedback(0)) {
//!     log::info!("group 0 is at {:?}", feedback.pos);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

mod control_group;
pub mod error;
mod io_client;
pub mod message;
mod motion;
mod real_time;
mod robot;
pub mod sim;
mod state;
mod transport;

pub use control_group::{ControlGroup, ControlGroupDefinition};
pub use io_client::IoClient;
pub use motion::{MotionClient, TrajectoryPoint};
pub use real_time::RealTimeClient;
pub use robot::{Ports, Robot, RobotOptions, Timeouts};
pub use state::StateClient;
pub use transport::{Transport, UdpEndpoint};

/// Maximum number of joints per control group. Joint vectors on the wire are always this long,
/// right-padded with zeros.
pub const ROS_MAX_JOINT: usize = 10;

/// Maximum number of simultaneously controllable groups per controller.
pub const MOT_MAX_GR: usize = 4;
