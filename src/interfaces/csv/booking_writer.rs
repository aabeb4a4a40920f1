use crate::application::report::{EndOfDayReport, LedgerEntry};
use crate::error::{BookingError, Result};
use std::io::Write;

/// Writes the canonical booking ledger as CSV.
pub struct BookingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BookingWriter<W> {
    /// Creates a new `BookingWriter` over any `Write` sink (e.g., Stdout).
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Serializes the ledger, header first. An empty ledger writes nothing.
    pub fn write_entries(&mut self, entries: &[LedgerEntry]) -> Result<()> {
        for entry in entries {
            self.writer.serialize(entry)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Pretty-prints the end-of-day report as JSON.
pub fn write_report<W: Write>(mut sink: W, report: &EndOfDayReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut sink, report)
        .map_err(|e| BookingError::Internal(Box::new(e)))?;
    writeln!(sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::report::RoomCensus;
    use crate::domain::booking::{BookingSource, BookingStatus, Money};
    use rust_decimal_macros::dec;

    fn entry(room: &str, guest: &str) -> LedgerEntry {
        LedgerEntry {
            room: room.into(),
            guest: guest.into(),
            email: "guest@example.com".into(),
            check_in: "2025-03-01".parse().unwrap(),
            check_out: "2025-03-05".parse().unwrap(),
            nights: 4,
            guests: 2,
            status: BookingStatus::Confirmed,
            total_price: Money::new(dec!(480.00)),
            balance_due: Money::new(dec!(480.00)),
            source: BookingSource::Online,
            group_reference: String::new(),
        }
    }

    #[test]
    fn test_ledger_csv_shape() {
        let mut buffer = Vec::new();
        BookingWriter::new(&mut buffer)
            .write_entries(&[entry("101", "John Doe"), entry("102", "Jane Roe")])
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "room,guest,email,check_in,check_out,nights,guests,status,total_price,balance_due,source,group_reference"
        );
        assert!(lines.next().unwrap().starts_with("101,John Doe,"));
        assert!(lines.next().unwrap().starts_with("102,Jane Roe,"));
    }

    #[test]
    fn test_report_json_is_pretty() {
        let report = EndOfDayReport {
            date: "2025-03-05".parse().unwrap(),
            arrivals: vec![],
            departures: vec![],
            in_house: vec![],
            rooms: RoomCensus {
                available: 3,
                occupied: 1,
                cleaning: 0,
                maintenance: 0,
            },
            open_housekeeping_tasks: 1,
        };

        let mut buffer = Vec::new();
        write_report(&mut buffer, &report).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("\"date\": \"2025-03-05\""));
        assert!(text.contains("\"open_housekeeping_tasks\": 1"));
        assert!(text.ends_with('\n'));
    }
}
