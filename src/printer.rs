//! Receipt printer.
//!
//! Emits ESC/POS command bytes for an entry ticket. The port is anything
//! `io::Write` (serial device, spool file, test buffer). A print attempt is
//! all-or-nothing: any failure surfaces as a single terminal error with no
//! partial-print recovery, because the physical device's state cannot be
//! assumed idempotent for a blind re-attempt.

use anyhow::{Context, Result};
use std::io::Write;

const ESC: u8 = 0x1b;
const GS: u8 = 0x1d;

const INIT: &[u8] = &[ESC, b'@'];
const CUT: &[u8] = &[GS, b'V', 0x41];
const ALIGN_CENTER: &[u8] = &[ESC, b'a', 0x01];
const ALIGN_LEFT: &[u8] = &[ESC, b'a', 0x00];
const BOLD_ON: &[u8] = &[ESC, b'E', 0x01];
const BOLD_OFF: &[u8] = &[ESC, b'E', 0x00];
const DOUBLE_ON: &[u8] = &[GS, b'!', 0x11];
const DOUBLE_OFF: &[u8] = &[GS, b'!', 0x00];
const LINESPACE_TIGHT: &[u8] = &[ESC, b'3', 0x12];

const SEPARATOR: &str = "================================";

/// A structured entry ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketRecord {
    pub ticket_number: String,
    pub date: String,
    pub entry_time: String,
    pub plate_number: String,
    pub vehicle_type: String,
    pub parking_slot: String,
    pub driver_name: Option<String>,
    pub contact_number: Option<String>,
}

/// Render the full ESC/POS byte stream for a receipt.
pub fn render_receipt(record: &TicketRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(512);
    out.extend_from_slice(INIT);
    out.extend_from_slice(LINESPACE_TIGHT);
    out.push(b'\n');

    out.extend_from_slice(ALIGN_CENTER);
    out.extend_from_slice(BOLD_ON);
    out.extend_from_slice(DOUBLE_ON);
    out.extend_from_slice(b"PARKING RECEIPT\n\n");
    out.extend_from_slice(DOUBLE_OFF);
    out.extend_from_slice(BOLD_OFF);
    out.extend_from_slice(SEPARATOR.as_bytes());
    out.push(b'\n');

    out.extend_from_slice(ALIGN_LEFT);
    field(&mut out, "Ticket #", &record.ticket_number);
    out.push(b'\n');
    field(&mut out, "Date", &record.date);
    field(&mut out, "Time", &record.entry_time);
    out.push(b'\n');
    field(&mut out, "Plate Number", &record.plate_number);
    field(&mut out, "Vehicle Type", &record.vehicle_type);
    field(&mut out, "Parking Slot", &record.parking_slot);
    out.push(b'\n');
    field(&mut out, "Driver", record.driver_name.as_deref().unwrap_or("N/A"));
    field(
        &mut out,
        "Contact",
        record.contact_number.as_deref().unwrap_or("N/A"),
    );

    out.extend_from_slice(ALIGN_CENTER);
    out.extend_from_slice(SEPARATOR.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(BOLD_ON);
    out.extend_from_slice(b"Thank you for parking with us!\n");
    out.extend_from_slice(BOLD_OFF);
    out.extend_from_slice(SEPARATOR.as_bytes());
    out.extend_from_slice(b"\n\n\n");
    out.extend_from_slice(CUT);
    out
}

fn field(out: &mut Vec<u8>, label: &str, value: &str) {
    out.extend_from_slice(format!("  {}: {}\n", label, value).as_bytes());
}

/// Writes rendered receipts to a port in a single attempt.
pub struct ReceiptPrinter<W: Write> {
    port: W,
}

impl<W: Write> ReceiptPrinter<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    /// Print one receipt. Any write failure (device not connected, port
    /// gone) is returned as one error for this attempt; the caller decides
    /// whether to ask the user to retry.
    pub fn print(&mut self, record: &TicketRecord) -> Result<()> {
        let bytes = render_receipt(record);
        self.port
            .write_all(&bytes)
            .context("write receipt to printer port")?;
        self.port.flush().context("flush printer port")?;
        Ok(())
    }
}
