//! CTAP HID descriptors and interface setup requests
//!
//! The report descriptor advertises the FIDO usage page (0xF1D0) with one
//! 64-byte IN and one 64-byte OUT report. Both descriptors are fixed byte
//! strings served verbatim for `GET_DESCRIPTOR`; of the class-specific
//! requests only `SET_IDLE` is accepted, everything else stalls.

use crate::channel::HidChannel;

/// Fixed report size for both directions
pub const REPORT_SIZE: usize = 64;

/// HID report descriptor for the CTAP interface
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: [u8; 34] = [
    0x06, 0xD0, 0xF1, // USAGE_PAGE (FIDO)
    0x09, 0x01,       // USAGE (CTAP HID)
    0xA1, 0x01,       // COLLECTION (Application)
    0x09, 0x20,       //   USAGE (Data In)
    0x15, 0x00,       //   LOGICAL_MINIMUM (0)
    0x26, 0xFF, 0x00, //   LOGICAL_MAXIMUM (255)
    0x75, 0x08,       //   REPORT_SIZE (8)
    0x95, 0x40,       //   REPORT_COUNT (64)
    0x81, 0x02,       //   INPUT (Data,Var,Abs)
    0x09, 0x21,       //   USAGE (Data Out)
    0x15, 0x00,       //   LOGICAL_MINIMUM (0)
    0x26, 0xFF, 0x00, //   LOGICAL_MAXIMUM (255)
    0x75, 0x08,       //   REPORT_SIZE (8)
    0x95, 0x40,       //   REPORT_COUNT (64)
    0x91, 0x02,       //   OUTPUT (Data,Var,Abs)
    0xC0,             // END_COLLECTION
];

/// HID class descriptor (bcdHID 1.11, one report descriptor)
pub const HID_DESCRIPTOR: [u8; 9] = [
    0x09, // bLength
    DESC_TYPE_HID,
    0x11, // bcdHID
    0x01,
    0x00, // bCountryCode
    0x01, // bNumDescriptors
    DESC_TYPE_REPORT,
    REPORT_DESCRIPTOR.len() as u8, // wDescriptorLength
    0x00,
];

/// HID class descriptor type
pub const DESC_TYPE_HID: u8 = 0x21;

/// HID report descriptor type
pub const DESC_TYPE_REPORT: u8 = 0x22;

const REQ_TYPE_MASK: u8 = 0x60;
const REQ_TYPE_STANDARD: u8 = 0x00;
const REQ_TYPE_CLASS: u8 = 0x20;

const REQ_GET_DESCRIPTOR: u8 = 0x06;
const REQ_SET_IDLE: u8 = 0x0A;

/// Outcome of a setup request on the HID interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupReply<'a> {
    /// Send these bytes in the data stage
    Data(&'a [u8]),
    /// Acknowledge with no data
    Ack,
    /// Protocol stall: request not supported
    Stall,
}

/// Handle a setup request addressed to the HID interface
///
/// `request_type`/`request`/`value`/`length` are the raw fields of the USB
/// setup packet. `SET_IDLE` stores the idle rate on the channel;
/// `GET_DESCRIPTOR` serves the HID or report descriptor truncated to the
/// requested length; everything else stalls.
pub fn handle_setup(
    channel: &mut HidChannel,
    request_type: u8,
    request: u8,
    value: u16,
    length: u16,
) -> SetupReply<'static> {
    match request_type & REQ_TYPE_MASK {
        REQ_TYPE_CLASS => match request {
            REQ_SET_IDLE => {
                channel.set_idle_rate((value >> 8) as u8);
                SetupReply::Ack
            }
            _ => SetupReply::Stall,
        },
        REQ_TYPE_STANDARD => match request {
            REQ_GET_DESCRIPTOR => {
                let descriptor: &'static [u8] = match (value >> 8) as u8 {
                    DESC_TYPE_REPORT => &REPORT_DESCRIPTOR,
                    DESC_TYPE_HID => &HID_DESCRIPTOR,
                    _ => return SetupReply::Stall,
                };
                let len = descriptor.len().min(length as usize);
                SetupReply::Data(&descriptor[..len])
            }
            _ => SetupReply::Stall,
        },
        _ => SetupReply::Stall,
    }
}
