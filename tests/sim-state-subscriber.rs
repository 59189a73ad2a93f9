//! State subscriber against the simulator: startup synchronisation, snapshot isolation and
//! callback fan-out.

use motosm::sim::{ControllerSim, SimControlGroup, SimOptions};
use motosm::{Ports, StateClient, Timeouts};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn sim_two_groups() -> ControllerSim {
    ControllerSim::start(
        vec![
            SimControlGroup::at_home(0, 6),
            SimControlGroup {
                groupno: 1,
                num_joints: 2,
                initial_positions: vec![0.5, -0.5],
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
            state_rate: 25.0,
            ..SimOptions::default()
        },
    )
    .expect("simulator start")
}

fn timeouts() -> Timeouts {
    Timeouts {
        start_state: Duration::from_secs(1),
        ..Timeouts::default()
    }
}

#[test]
fn start_blocks_until_the_initial_set_has_arrived() {
    let sim = sim_two_groups();

    let mut client = StateClient::new(sim.addrs().state, vec![0, 1], &timeouts());

    client.start().expect("start within one second");

    // Everything the startup barrier waited for is now readable
    let group0 = client.joint_feedback(0).expect("group 0 feedback");
    let group1 = client.joint_feedback(1).expect("group 1 feedback");
    let ex = client.joint_feedback_ex().expect("extended feedback");
    let status = client.robot_status().expect("robot status");

    assert_eq!(group0.groupno, 0);
    assert_eq!(group1.groupno, 1);
    assert!((group1.pos[0] - 0.5).abs() < 1e-6);
    // Positions are padded out to ten joints on the wire
    assert_eq!(group1.pos[2..], [0.0; 8]);
    assert_eq!(ex.groups.len(), 2);
    assert!(status.motion_possible.is_true());

    client.stop();
}

#[test]
fn snapshots_are_isolated_copies() {
    let sim = sim_two_groups();

    let mut client = StateClient::new(sim.addrs().state, vec![0, 1], &timeouts());

    client.start().expect("start");

    let mut first = client.joint_feedback(1).expect("feedback");

    first.pos[0] = 1234.5;

    let second = client.joint_feedback(1).expect("feedback");

    assert!((second.pos[0] - 0.5).abs() < 1e-6);

    let mut ex = client.joint_feedback_ex().expect("extended feedback");

    ex.groups.clear();

    assert_eq!(client.joint_feedback_ex().expect("fresh copy").groups.len(), 2);
}

#[test]
fn callbacks_run_for_every_feedback_message() {
    let sim = sim_two_groups();

    let mut client = StateClient::new(sim.addrs().state, vec![0, 1], &timeouts());

    let seen = Arc::new(AtomicUsize::new(0));
    let seen_ex = Arc::new(AtomicUsize::new(0));

    {
        let seen = Arc::clone(&seen);
        client.add_joint_feedback_callback(move |_feedback| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
    }

    {
        let seen_ex = Arc::clone(&seen_ex);
        client.add_joint_feedback_ex_callback(move |feedback| {
            assert_eq!(feedback.groups.len(), 2);
            seen_ex.fetch_add(1, Ordering::Relaxed);
        });
    }

    client.start().expect("start");

    // A few publish periods at 25 Hz
    std::thread::sleep(Duration::from_millis(300));

    client.stop();
    sim.stop();

    // Two per-group messages per tick
    assert!(seen.load(Ordering::Relaxed) >= 4);
    assert!(seen_ex.load(Ordering::Relaxed) >= 2);
}

#[test]
fn start_times_out_against_a_silent_port() {
    // A listener that accepts but never publishes
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    let accepter = std::thread::spawn(move || {
        let _conn = listener.accept();

        std::thread::sleep(Duration::from_secs(2));
    });

    let mut client = StateClient::new(
        addr,
        vec![0],
        &Timeouts {
            start_state: Duration::from_millis(200),
            ..Timeouts::default()
        },
    );

    assert!(matches!(
        client.start(),
        Err(motosm::error::Error::InitialFeedbackTimeout)
    ));

    let _ = accepter.join();
}
