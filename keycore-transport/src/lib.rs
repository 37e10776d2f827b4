//! USB HID transport for the authenticator core
//!
//! Moves fixed-size 64-byte reports between the USB device layer and the
//! CTAP message layer with a single-outstanding-response discipline:
//!
//! - OUT reports are handed to the message reassembler and reception is
//!   re-armed immediately, so the endpoint never stalls on processing
//! - IN reports go out one at a time; a send while the previous report is
//!   still in flight spins for a bounded number of scheduler ticks and then
//!   fails with [`Error::DeviceBusy`] instead of blocking forever
//!
//! The crate also carries the fixed HID report descriptor and the class
//! request handling for the CTAP HID interface.

pub mod channel;
pub mod descriptor;
pub mod error;

// Re-export commonly used types
pub use channel::{ChannelState, Event, HidChannel, ReportSink, SEND_RETRY_BUDGET, UsbDriver};
pub use descriptor::{HID_DESCRIPTOR, REPORT_DESCRIPTOR, REPORT_SIZE, SetupReply, handle_setup};
pub use error::{Error, Result};
