//! Trajectory streaming against the simulator's motion buffer: cubic playout and multi group
//! fanout.

use motosm::message::{JointTrajPtExData, JointTrajPtFull, JointTrajPtFullEx, ValidFields};
use motosm::sim::{ControllerSim, SimControlGroup, SimOptions};
use motosm::{MOT_MAX_GR, MotionClient, Ports, Timeouts};
use std::time::{Duration, Instant};

fn sim(groups: Vec<SimControlGroup>) -> ControllerSim {
    ControllerSim::start(
        groups,
        SimOptions {
            ports: Ports {
                motion: 0,
                state: 0,
                io: 0,
                rt_control: 0,
                rt_data: 0,
            },
            update_rate: 100.0,
            ..SimOptions::default()
        },
    )
    .expect("simulator start")
}

fn full_pt(groupno: i32, sequence: i32, time: f32, pos0: f32, vel0: f32) -> JointTrajPtFull {
    let mut pos = [0.0f32; 10];
    pos[0] = pos0;

    let mut vel = [0.0f32; 10];
    vel[0] = vel0;

    JointTrajPtFull {
        groupno,
        sequence,
        valid_fields: ValidFields::TIME | ValidFields::POSITION | ValidFields::VELOCITY,
        time,
        pos,
        vel,
        acc: [0.0; 10],
    }
}

fn wait_for<F: Fn() -> bool>(deadline: Duration, condition: F) -> bool {
    let start = Instant::now();

    while start.elapsed() < deadline {
        if condition() {
            return true;
        }

        std::thread::sleep(Duration::from_millis(10));
    }

    false
}

#[test]
fn cubic_playout_reaches_both_trajectory_boundaries() {
    let sim = sim(vec![SimControlGroup::at_home(0, 6)]);

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    // Rest-to-rest segment from 0 to 1 rad over one second
    client
        .send_joint_trajectory_point(full_pt(0, 0, 0.0, 0.0, 0.0))
        .expect("initial point");
    client
        .send_joint_trajectory_point(full_pt(0, 1, 1.0, 1.0, 0.0))
        .expect("goal point");

    // Mid-trajectory the joint must have left the start without reaching the goal
    assert!(wait_for(Duration::from_secs(1), || {
        let pos = sim.joint_positions(0).unwrap()[0];

        pos > 0.05 && pos < 0.95
    }));

    // And settle on the goal position
    assert!(wait_for(Duration::from_secs(2), || {
        (sim.joint_positions(0).unwrap()[0] - 1.0).abs() < 1e-3
    }));
}

#[test]
fn ex_points_fan_out_to_their_groups() {
    let sim = sim(vec![
        SimControlGroup::at_home(0, 6),
        SimControlGroup::at_home(1, 2),
    ]);

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    let mut points = heapless::Vec::<JointTrajPtExData, MOT_MAX_GR>::new();

    let mut pos0 = [0.0f32; 10];
    pos0[0] = 0.25;

    let mut pos1 = [0.0f32; 10];
    pos1[0] = -0.75;

    points
        .push(JointTrajPtExData {
            groupno: 0,
            valid_fields: ValidFields::TIME | ValidFields::POSITION,
            time: 0.0,
            pos: pos0,
            vel: [0.0; 10],
            acc: [0.0; 10],
        })
        .unwrap();
    points
        .push(JointTrajPtExData {
            groupno: 1,
            valid_fields: ValidFields::TIME | ValidFields::POSITION,
            time: 0.0,
            pos: pos1,
            vel: [0.0; 10],
            acc: [0.0; 10],
        })
        .unwrap();

    client
        .send_joint_trajectory_point(JointTrajPtFullEx {
            sequence: 0,
            points,
        })
        .expect("ex point accepted");

    // time = 0 starts a new trajectory, so each group jumps straight to its own goal
    assert!(wait_for(Duration::from_secs(1), || {
        let group0 = sim.joint_positions(0).unwrap();
        let group1 = sim.joint_positions(1).unwrap();

        (group0[0] - 0.25).abs() < 1e-6 && (group1[0] + 0.75).abs() < 1e-6
    }));

    // The fanout went to the right groups only
    assert_eq!(sim.joint_positions(0).unwrap()[1..], [0.0; 5]);
    assert_eq!(sim.joint_positions(1).unwrap()[1..], [0.0; 1]);
}

#[test]
fn stop_clears_the_queue_and_freezes() {
    let sim = sim(vec![SimControlGroup::at_home(0, 1)]);

    let client = MotionClient::connect(sim.addrs().motion, &Timeouts::default()).expect("connect");

    client
        .send_joint_trajectory_point(full_pt(0, 0, 0.0, 0.0, 0.0))
        .expect("initial point");

    // Queue several slow segments, then stop mid-flight
    for (sequence, time) in [(1, 2.0f32), (2, 4.0), (3, 6.0)] {
        client
            .send_joint_trajectory_point(full_pt(0, sequence, time, time, 0.0))
            .expect("queued point");
    }

    std::thread::sleep(Duration::from_millis(300));

    client.stop_motion().expect("stop_motion");

    assert_eq!(sim.queue_depth(0), Some(0));

    std::thread::sleep(Duration::from_millis(200));
    let frozen = sim.joint_positions(0).unwrap()[0];

    std::thread::sleep(Duration::from_millis(300));
    let still = sim.joint_positions(0).unwrap()[0];

    assert!((frozen - still).abs() < 1e-9);
    assert!(still < 2.0);
}
