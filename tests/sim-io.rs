//! IO service client against the simulator's in-memory IO image.

use motosm::sim::{ControllerSim, SimControlGroup, SimOptions};
use motosm::{IoClient, Ports, Timeouts};

#[test]
fn bits_and_groups_read_back_what_was_written() {
    let sim = ControllerSim::start(
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
    .expect("simulator start");

    let client = IoClient::connect(sim.addrs().io, &Timeouts::default()).expect("connect");

    assert_eq!(client.read_bit(27010).expect("read unset bit"), 0);

    client.write_bit(27010, 1).expect("write bit");

    assert_eq!(client.read_bit(27010).expect("read bit"), 1);

    client.write_group(1001, 0xa5).expect("write group");

    assert_eq!(client.read_group(1001).expect("read group"), 0xa5);

    // Unrelated addresses stay untouched
    assert_eq!(client.read_group(1002).expect("read other group"), 0);
}
