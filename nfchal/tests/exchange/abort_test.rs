use std::thread;
use std::time::Duration;

use nfchal::transceiver::{ChipCommand, MockTransceiver, SharedMock};
use nfchal::{Error, Hal};

// Posting an abort from another thread while `receive` is blocked must
// unblock it with `Aborted` and leave the chip in the idle command state.
#[test]
fn cross_thread_abort_unblocks_receive() {
    let mut mock = MockTransceiver::new();
    mock.block_on_empty = true;
    let shared = SharedMock::from_mock(mock);
    let mut hal = Hal::new(shared.boxed()).unwrap();

    let abort = hal.abort_handle();
    let poster = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        abort.post();
    });

    let got = hal.receive();
    poster.join().unwrap();

    assert!(matches!(got, Err(Error::Aborted)));
    assert_eq!(shared.with(|m| m.last_command()), Some(ChipCommand::Idle));
}

#[test]
fn abort_posted_before_the_call_is_consumed_once() {
    let shared = SharedMock::new();
    let mut hal = Hal::new(shared.boxed()).unwrap();
    hal.abort_handle().post();

    assert!(matches!(hal.receive(), Err(Error::Aborted)));
    // The abort was consumed: the next receive times out normally instead.
    assert!(matches!(hal.receive(), Err(Error::IoTimeout)));
}
