//! Motion service client against the simulator: command round-trips, failure surfacing and
//! the local readiness precondition.

use motosm::error::Error;
use motosm::message::{JointTrajPtFull, ResultType, ValidFields, subcode};
use motosm::sim::{ControllerSim, SimControlGroup, SimOptions};
use motosm::{MotionClient, Ports, Timeouts};

fn sim() -> ControllerSim {
    ControllerSim::start(
        vec![SimControlGroup::at_home(0, 6)],
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
    .expect("simulator start")
}

#[test]
fn commands_succeed_against_a_healthy_controller() {
    let sim = sim();

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    assert!(client.check_motion_ready().expect("check_motion_ready"));

    client.start_servos().expect("start_servos");
    client.start_traj_mode().expect("start_traj_mode");

    assert_eq!(client.check_queue_count(0).expect("check_queue_count"), 0);

    client.select_tool(0, 1, -1).expect("select_tool");

    let dh = client.get_dh_parameters().expect("get_dh_parameters");

    assert_eq!(dh.groups[0][0].theta, 0.0);

    client.stop_traj_mode().expect("stop_traj_mode");
    client.stop_servos().expect("stop_servos");
    client.disconnect().expect("disconnect");
}

#[test]
fn failure_replies_surface_result_and_subcode() {
    let sim = sim();

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    sim.set_motion_reply(ResultType::Alarm, subcode::NOT_READY_ALARM);

    match client.start_servos() {
        Err(Error::RemoteFailure { result, subcode: sub }) => {
            assert_eq!(result, ResultType::Alarm);
            assert_eq!(sub, subcode::NOT_READY_ALARM);
        }
        other => panic!("expected RemoteFailure, got {:?}", other),
    }
}

#[test]
fn trajectory_send_is_refused_locally_when_not_ready() {
    let sim = sim();

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    // A non-success ready check must reject the point before anything is sent
    sim.set_motion_reply(ResultType::NotReady, subcode::NOT_READY_SERVO_OFF);

    let point = JointTrajPtFull {
        groupno: 0,
        sequence: 0,
        valid_fields: ValidFields::TIME | ValidFields::POSITION,
        time: 0.0,
        ..JointTrajPtFull::default()
    };

    assert!(matches!(
        client.send_joint_trajectory_point(point),
        Err(Error::NotReady)
    ));

    // Nothing was queued
    assert_eq!(sim.queue_depth(0), Some(0));
}

#[test]
fn trajectory_send_is_acknowledged_when_ready() {
    let sim = sim();

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    let point = JointTrajPtFull {
        groupno: 0,
        sequence: 0,
        valid_fields: ValidFields::TIME | ValidFields::POSITION,
        time: 0.0,
        ..JointTrajPtFull::default()
    };

    client
        .send_joint_trajectory_point(point)
        .expect("trajectory point accepted");
}
