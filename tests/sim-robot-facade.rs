//! The top-level facade against the simulator: connect, group views and sub-clients.

use motosm::sim::{ControllerSim, SimControlGroup, SimOptions};
use motosm::{ControlGroupDefinition, Ports, Robot, RobotOptions, Timeouts};
use std::net::IpAddr;
use std::time::Duration;

#[test]
fn facade_wires_every_enabled_endpoint() {
    let sim = ControllerSim::start(
        vec![
            SimControlGroup::at_home(0, 6),
            SimControlGroup {
                groupno: 1,
                num_joints: 2,
                initial_positions: vec![0.25, -0.25],
            },
        ],
        SimOptions {
            ports: Ports {
                motion: 0,
                state: 0,
                io: 0,
                rt_control: 0,
                rt_data: 0,
            },
            ..SimOptions::default()
        },
    )
    .expect("simulator start");

    let addrs = sim.addrs();
    let ip: IpAddr = "127.0.0.1".parse().unwrap();

    let robot = Robot::connect(
        ip,
        vec![
            ControlGroupDefinition::new("R1", 0, 6, vec!["s", "l", "u", "r", "b", "t"])
                .expect("definition"),
            ControlGroupDefinition::new("S1", 1, 2, vec!["t1", "t2"]).expect("definition"),
        ],
        RobotOptions {
            start_realtime: true,
            ports: Ports {
                motion: addrs.motion.port(),
                state: addrs.state.port(),
                io: addrs.io.port(),
                rt_control: addrs.rt_control.port(),
                rt_data: 0,
            },
            timeouts: Timeouts {
                start_state: Duration::from_secs(2),
                ..Timeouts::default()
            },
            ..RobotOptions::default()
        },
    )
    .expect("facade connect");

    // Connect blocked on the initial feedback, so group views are immediately live
    let positioner = robot.control_group("S1").expect("group S1");

    assert_eq!(positioner.groupno(), 1);
    assert_eq!(positioner.num_joints(), 2);
    assert_eq!(positioner.joint_names(), ["t1", "t2"]);

    let position = positioner.position().expect("latest position");

    assert_eq!(position.len(), 2);
    assert!((position[0] - 0.25).abs() < 1e-6);

    assert_eq!(robot.control_groups().count(), 2);
    assert!(robot.control_group("nope").is_none());

    // All four sub-clients exist and answer
    let motion = robot.motion().expect("motion client");

    assert!(motion.check_motion_ready().expect("ready"));

    let io = robot.io().expect("io client");

    io.write_bit(1, 1).expect("write");

    assert_eq!(io.read_bit(1).expect("read"), 1);

    assert!(robot.rt().is_some());

    let status = robot
        .state()
        .expect("state client")
        .robot_status()
        .expect("status snapshot");

    assert!(status.motion_possible.is_true());
}

#[test]
fn facade_requires_at_least_one_group() {
    let result = Robot::connect(
        "127.0.0.1".parse().unwrap(),
        vec![],
        RobotOptions::default(),
    );

    assert!(matches!(
        result,
        Err(motosm::error::Error::InvalidGroupDefinition { .. })
    ));
}
