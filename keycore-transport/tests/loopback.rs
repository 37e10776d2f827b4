//! Host-side walkthrough of the HID interface
//!
//! Plays the role of a host stack: enumerate via setup requests, then push
//! a request report and drain the response, checking the channel keeps its
//! single-outstanding-report discipline across the exchange.

use keycore_transport::{
    ChannelState, Error, Event, HID_DESCRIPTOR, HidChannel, REPORT_DESCRIPTOR, REPORT_SIZE,
    ReportSink, Result, SetupReply, UsbDriver, handle_setup,
};

/// Driver whose host side is scripted by the test
#[derive(Default)]
struct LoopbackDriver {
    configured: bool,
    /// Reports the host has taken off the IN endpoint
    host_inbox: Vec<[u8; REPORT_SIZE]>,
    /// Report sitting on the IN endpoint, if any
    in_flight: Option<[u8; REPORT_SIZE]>,
    armed: bool,
    /// When true, tick() has the host drain the IN endpoint
    host_reading: bool,
}

impl UsbDriver for LoopbackDriver {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn transmit(&mut self, report: &[u8; REPORT_SIZE]) -> Result<()> {
        self.in_flight = Some(*report);
        Ok(())
    }

    fn arm_receive(&mut self) -> Result<()> {
        self.armed = true;
        Ok(())
    }

    fn tick(&mut self) -> Option<Event> {
        if self.host_reading {
            if let Some(report) = self.in_flight.take() {
                self.host_inbox.push(report);
                return Some(Event::InComplete);
            }
        }
        None
    }
}

struct Echo {
    received: Vec<[u8; REPORT_SIZE]>,
}

impl ReportSink for Echo {
    fn on_report(&mut self, report: &[u8; REPORT_SIZE]) {
        self.received.push(*report);
    }
}

#[test]
fn enumeration_serves_descriptors() {
    let mut channel = HidChannel::new();

    // wValue selects the descriptor type in the high byte
    assert_eq!(
        handle_setup(&mut channel, 0x81, 0x06, 0x2200, 512),
        SetupReply::Data(&REPORT_DESCRIPTOR)
    );
    assert_eq!(
        handle_setup(&mut channel, 0x81, 0x06, 0x2100, 9),
        SetupReply::Data(&HID_DESCRIPTOR)
    );
    assert_eq!(handle_setup(&mut channel, 0x21, 0x0A, 0x0000, 0), SetupReply::Ack);
}

#[test]
fn request_response_round_trip() {
    let mut driver = LoopbackDriver {
        configured: true,
        host_reading: true,
        ..LoopbackDriver::default()
    };
    let mut channel = HidChannel::new();
    let mut sink = Echo { received: Vec::new() };

    channel.initialize(&mut driver).unwrap();
    assert!(driver.armed);

    // Host sends a request report
    let request = [0x86u8; REPORT_SIZE];
    driver.armed = false;
    channel.on_out_report(&mut driver, &mut sink, &request).unwrap();
    assert_eq!(sink.received, vec![request]);
    assert!(driver.armed, "endpoint must be re-armed for the next report");

    // Device answers with two response reports; the host keeps reading, so
    // the second send completes inside the retry budget
    channel.send_report(&mut driver, &[0x01; REPORT_SIZE]).unwrap();
    channel.send_report(&mut driver, &[0x02; REPORT_SIZE]).unwrap();

    // Drain the last report
    if let Some(Event::InComplete) = driver.tick() {
        channel.on_in_complete();
    }

    assert_eq!(
        driver.host_inbox,
        vec![[0x01; REPORT_SIZE], [0x02; REPORT_SIZE]]
    );
    assert_eq!(channel.state(), ChannelState::Idle);
}

#[test]
fn stalled_host_surfaces_device_busy() {
    let mut driver = LoopbackDriver {
        configured: true,
        host_reading: false,
        ..LoopbackDriver::default()
    };
    let mut channel = HidChannel::new();
    channel.initialize(&mut driver).unwrap();

    channel.send_report(&mut driver, &[0x0a; REPORT_SIZE]).unwrap();
    assert_eq!(
        channel.send_report(&mut driver, &[0x0b; REPORT_SIZE]).unwrap_err(),
        Error::DeviceBusy
    );

    // The host wakes up; the pending report is still intact and the channel
    // recovers on the next send
    driver.host_reading = true;
    channel.send_report(&mut driver, &[0x0b; REPORT_SIZE]).unwrap();
    assert_eq!(
        driver.host_inbox,
        vec![[0x0a; REPORT_SIZE]]
    );
    assert_eq!(driver.in_flight, Some([0x0b; REPORT_SIZE]));
}
