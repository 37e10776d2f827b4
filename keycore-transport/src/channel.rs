//! HID channel state machine
//!
//! One IN report may be in flight at a time. The channel tracks that with a
//! two-state machine and turns an over-eager sender into a bounded spin on
//! the driver's event source rather than an unbounded block.

use crate::descriptor::REPORT_SIZE;
use crate::error::{Error, Result};

/// Scheduler ticks to wait for the in-flight report before giving up
pub const SEND_RETRY_BUDGET: u32 = 50;

/// Occupancy of the IN endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No report in flight, ready to transmit
    Idle,
    /// A report was handed to the driver and the host has not taken it yet
    Busy,
}

/// Events surfaced by the USB driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The host read the in-flight IN report
    InComplete,
}

/// Interface to the USB device layer
///
/// Implemented over the real device peripheral in firmware and over a mock
/// in tests. `tick` lets the channel drive the driver's event loop while it
/// waits for an IN completion.
pub trait UsbDriver {
    /// Whether enumeration finished and the interface is usable
    fn is_configured(&self) -> bool;

    /// Hand a report to the IN endpoint
    fn transmit(&mut self, report: &[u8; REPORT_SIZE]) -> Result<()>;

    /// Ready the OUT endpoint for the next report
    fn arm_receive(&mut self) -> Result<()>;

    /// Run one step of the device event loop
    fn tick(&mut self) -> Option<Event>;
}

/// Consumer of OUT reports, normally the CTAP message reassembler
pub trait ReportSink {
    fn on_report(&mut self, report: &[u8; REPORT_SIZE]);
}

/// IN-direction flow control plus the interface idle rate
#[derive(Debug)]
pub struct HidChannel {
    state: ChannelState,
    idle_rate: u8,
}

impl Default for HidChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl HidChannel {
    pub fn new() -> Self {
        HidChannel {
            state: ChannelState::Idle,
            idle_rate: 0,
        }
    }

    /// Reset the channel and arm reception, called once after enumeration
    pub fn initialize<D: UsbDriver>(&mut self, driver: &mut D) -> Result<()> {
        self.state = ChannelState::Idle;
        driver.arm_receive()
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn idle_rate(&self) -> u8 {
        self.idle_rate
    }

    pub fn set_idle_rate(&mut self, rate: u8) {
        self.idle_rate = rate;
    }

    /// Deliver an OUT report and immediately re-arm the endpoint
    ///
    /// Re-arming before the sink's work is even visible keeps the host from
    /// seeing a NAKing endpoint while a long request is processed.
    pub fn on_out_report<D, K>(
        &mut self,
        driver: &mut D,
        sink: &mut K,
        report: &[u8; REPORT_SIZE],
    ) -> Result<()>
    where
        D: UsbDriver,
        K: ReportSink,
    {
        sink.on_report(report);
        driver.arm_receive()
    }

    /// The host consumed the in-flight IN report
    pub fn on_in_complete(&mut self) {
        self.state = ChannelState::Idle;
    }

    /// Queue one IN report toward the host
    ///
    /// Before the interface is configured this is a silent no-op: reports
    /// produced during enumeration are dropped, not errors. If the previous
    /// report is still in flight, the driver is ticked up to
    /// [`SEND_RETRY_BUDGET`] times waiting for its completion; exhausting
    /// the budget fails with [`Error::DeviceBusy`] and leaves the in-flight
    /// report untouched.
    pub fn send_report<D: UsbDriver>(
        &mut self,
        driver: &mut D,
        report: &[u8; REPORT_SIZE],
    ) -> Result<()> {
        if !driver.is_configured() {
            return Ok(());
        }

        let mut retries = 0;
        while self.state == ChannelState::Busy {
            if retries >= SEND_RETRY_BUDGET {
                log::debug!("IN endpoint still busy after {} ticks", SEND_RETRY_BUDGET);
                return Err(Error::DeviceBusy);
            }
            if let Some(Event::InComplete) = driver.tick() {
                self.on_in_complete();
            }
            retries += 1;
        }

        // Busy before transmit: the completion interrupt may fire before
        // transmit returns
        self.state = ChannelState::Busy;
        if let Err(err) = driver.transmit(report) {
            // Nothing went out, so no completion will ever arrive
            self.state = ChannelState::Idle;
            return Err(err);
        }
        Ok(())
    }
}
