//! Real-time motion loop against the simulator: echo contract, velocity integration and the
//! corrected position-mode velocity estimate.

use motosm::message::{
    MessageBody, RealTimeJointCommandEx, RealTimeJointCommandExData, RealTimeMode, SimpleMessage,
};
use motosm::sim::{ControllerSim, SimControlGroup, SimOptions};
use motosm::{MOT_MAX_GR, Ports, RealTimeClient, Timeouts, UdpEndpoint};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const PERIOD: Duration = Duration::from_millis(4);

fn sim(mode: RealTimeMode) -> ControllerSim {
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
            rt_rate: 250.0,
            rt_mode: mode,
            ..SimOptions::default()
        },
    )
    .expect("simulator start")
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
fn velocity_mode_integrates_exactly_one_command_per_cycle() {
    let sim = sim(RealTimeMode::JointVelocity);

    let mut client =
        RealTimeClient::connect(sim.addrs().rt_control, &Timeouts::default()).expect("connect");

    // The state packet with message id N reflects N applied commands, so sampling at a fixed
    // id gives a deterministic position regardless of wall-clock jitter
    let sampled = Arc::new(Mutex::new(None::<(f32, f32)>));

    let control_sample = Arc::clone(&sampled);

    let local = client
        .start_udp_loop("127.0.0.1:0".parse().unwrap(), PERIOD, move |state| {
            if state.message_id == 250 {
                let data = &state.groups[0];

                *control_sample.lock().unwrap() = Some((data.pos[0], data.vel[0]));
            }

            let mut groups = heapless::Vec::<RealTimeJointCommandExData, MOT_MAX_GR>::new();

            let mut command = [0.0f32; 10];
            command[0] = 0.1;

            let _ = groups.push(RealTimeJointCommandExData {
                groupno: 0,
                command,
            });

            groups
        })
        .expect("udp loop");

    sim.set_rt_peer(local);
    client.start_rt_mode().expect("start_rt_mode");

    assert!(wait_for(Duration::from_secs(5), || {
        sampled.lock().unwrap().is_some()
    }));

    let (pos, vel) = sampled.lock().unwrap().take().unwrap();

    // 250 cycles × 0.1 rad/s × 4 ms = 0.1 rad
    assert!((pos - 0.1).abs() < 1e-3, "position was {}", pos);
    assert!((vel - 0.1).abs() < 1e-6, "velocity was {}", vel);

    client.stop_rt_mode().expect("stop_rt_mode");
    client.stop_udp_loop();

    assert!(wait_for(Duration::from_secs(2), || !sim.rt_running()));
}

#[test]
fn position_mode_reports_the_finite_difference_velocity() {
    let sim = sim(RealTimeMode::JointPosition);

    let mut client =
        RealTimeClient::connect(sim.addrs().rt_control, &Timeouts::default()).expect("connect");

    // The state with id 1 reflects the first applied position command; its velocity must be
    // the finite difference against the previous position, not zero
    let sampled = Arc::new(Mutex::new(None::<(f32, f32)>));

    let control_sample = Arc::clone(&sampled);

    let local = client
        .start_udp_loop("127.0.0.1:0".parse().unwrap(), PERIOD, move |state| {
            if state.message_id == 1 {
                let data = &state.groups[0];

                *control_sample.lock().unwrap() = Some((data.pos[0], data.vel[0]));
            }

            let mut groups = heapless::Vec::<RealTimeJointCommandExData, MOT_MAX_GR>::new();

            let mut command = [0.0f32; 10];
            command[0] = 0.5;

            let _ = groups.push(RealTimeJointCommandExData {
                groupno: 0,
                command,
            });

            groups
        })
        .expect("udp loop");

    sim.set_rt_peer(local);
    client.start_rt_mode().expect("start_rt_mode");

    assert!(wait_for(Duration::from_secs(5), || {
        sampled.lock().unwrap().is_some()
    }));

    let (pos, vel) = sampled.lock().unwrap().take().unwrap();

    assert!((pos - 0.5).abs() < 1e-6, "position was {}", pos);
    // (0.5 − 0) / 4 ms = 125 rad/s
    assert!((vel - 125.0).abs() < 1e-3, "velocity was {}", vel);

    client.stop_rt_mode().expect("stop_rt_mode");
    client.stop_udp_loop();
}

#[test]
fn echo_mismatch_terminates_the_session() {
    let sim = sim(RealTimeMode::JointVelocity);

    let control =
        RealTimeClient::connect(sim.addrs().rt_control, &Timeouts::default()).expect("connect");

    // Hand-rolled endpoint that deliberately echoes the wrong id
    let endpoint = UdpEndpoint::bind("127.0.0.1:0".parse().unwrap()).expect("bind");

    endpoint
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("timeout");

    sim.set_rt_peer(endpoint.local_addr().expect("local addr"));
    control.start_rt_mode().expect("start_rt_mode");

    let (msg, from) = endpoint.recv_from().expect("first state packet");

    let MessageBody::RealTimeJointStateEx(state) = msg.body else {
        panic!("expected a real-time state packet");
    };

    let mut groups = heapless::Vec::<RealTimeJointCommandExData, MOT_MAX_GR>::new();

    let _ = groups.push(RealTimeJointCommandExData {
        groupno: 0,
        command: [0.0; 10],
    });

    endpoint
        .send_to(
            &SimpleMessage::topic(RealTimeJointCommandEx {
                message_id: state.message_id + 1000,
                groups,
            }),
            from,
        )
        .expect("send bad echo");

    assert!(wait_for(Duration::from_secs(2), || !sim.rt_running()));

    // No command was ever applied
    assert_eq!(sim.joint_positions(0).unwrap()[0], 0.0);
}
