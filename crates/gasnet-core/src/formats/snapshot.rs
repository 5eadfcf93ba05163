//! # Snapshot Format
//!
//! Line-oriented text serialization of both stores.
//!
//! ```text
//! Pipes:<count>
//! <id> <name> <length> <diameter> <underRepair:0|1>     one field per line
//! Stations:<count>
//! <id> <name> <total> <working> <classification>       one field per line
//! ```
//!
//! Field order is positional and fixed; there are no field names. Reals are
//! written in their shortest round-trip decimal form, booleans as `0`/`1`.
//!
//! ## Strictness
//!
//! Decoding rejects any deviation in shape: a missing or misspelled header,
//! fewer lines than the declared count needs, a duplicate id within a
//! section, or non-blank content after the last station. Every field must
//! parse as its type. Values are NOT range-checked: a negative length or a
//! station with more working than total workshops is accepted as written.
//!
//! Decoding builds a complete `Snapshot` before anything is handed back, so a
//! failed load never reaches the stores.

use crate::primitives::{PIPES_HEADER, STATIONS_HEADER};
use crate::{GasnetError, Pipe, RecordId, Station};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// The full contents of both stores at one instant; the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub pipes: BTreeMap<RecordId, Pipe>,
    pub stations: BTreeMap<RecordId, Station>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty() && self.stations.is_empty()
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Serialize a snapshot to text.
///
/// Fails with `InvalidField` if a name or classification contains a line
/// break, which the positional layout cannot represent.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, GasnetError> {
    let mut out = String::new();

    push_line(&mut out, format_args!("{}{}", PIPES_HEADER, snapshot.pipes.len()));
    for (id, pipe) in &snapshot.pipes {
        push_line(&mut out, id);
        push_line(&mut out, single_line(pipe.name(), "pipe name", *id)?);
        push_line(&mut out, pipe.length_km());
        push_line(&mut out, pipe.diameter_mm());
        push_line(&mut out, u8::from(pipe.is_under_repair()));
    }

    push_line(
        &mut out,
        format_args!("{}{}", STATIONS_HEADER, snapshot.stations.len()),
    );
    for (id, station) in &snapshot.stations {
        push_line(&mut out, id);
        push_line(&mut out, single_line(station.name(), "station name", *id)?);
        push_line(&mut out, station.total_workshops());
        push_line(&mut out, station.working_workshops());
        push_line(
            &mut out,
            single_line(station.classification(), "station classification", *id)?,
        );
    }

    Ok(out)
}

/// Serialize a snapshot into a writer.
pub fn write_snapshot<W: Write>(mut writer: W, snapshot: &Snapshot) -> Result<(), GasnetError> {
    let text = encode_snapshot(snapshot)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn push_line(out: &mut String, value: impl Display) {
    out.push_str(&value.to_string());
    out.push('\n');
}

fn single_line<'a>(value: &'a str, field: &str, id: RecordId) -> Result<&'a str, GasnetError> {
    if value.contains(['\n', '\r']) {
        return Err(GasnetError::InvalidField(format!(
            "{} of record {} contains a line break",
            field, id
        )));
    }
    Ok(value)
}

// =============================================================================
// DECODING
// =============================================================================

/// Parse a snapshot from text.
///
/// Input consisting only of whitespace decodes to an empty snapshot.
pub fn decode_snapshot(text: &str) -> Result<Snapshot, GasnetError> {
    if text.trim().is_empty() {
        return Ok(Snapshot::new());
    }

    let mut cursor = LineCursor::new(text);

    let pipe_count = cursor.header(PIPES_HEADER)?;
    let mut pipes = BTreeMap::new();
    for index in 1..=pipe_count {
        let context = format!("pipe {} of {}", index, pipe_count);
        let (line, id) = cursor.field::<u64>(&context, "id")?;
        let name = cursor.text(&context, "name")?;
        let (_, length_km) = cursor.field::<f64>(&context, "length")?;
        let (_, diameter_mm) = cursor.field::<u32>(&context, "diameter")?;
        let under_repair = cursor.flag(&context, "repair flag")?;

        let pipe = Pipe::new(name, length_km, diameter_mm, under_repair);
        if pipes.insert(RecordId(id), pipe).is_some() {
            return Err(GasnetError::malformed(line, format!("duplicate pipe id {}", id)));
        }
    }

    let station_count = cursor.header(STATIONS_HEADER)?;
    let mut stations = BTreeMap::new();
    for index in 1..=station_count {
        let context = format!("station {} of {}", index, station_count);
        let (line, id) = cursor.field::<u64>(&context, "id")?;
        let name = cursor.text(&context, "name")?;
        let (_, total) = cursor.field::<u32>(&context, "total workshops")?;
        let (_, working) = cursor.field::<u32>(&context, "working workshops")?;
        let classification = cursor.text(&context, "classification")?;

        let station = Station::from_parts(name, total, working, classification);
        if stations.insert(RecordId(id), station).is_some() {
            return Err(GasnetError::malformed(
                line,
                format!("duplicate station id {}", id),
            ));
        }
    }

    cursor.expect_end()?;

    Ok(Snapshot { pipes, stations })
}

/// Parse a snapshot from a reader.
pub fn read_snapshot<R: Read>(mut reader: R) -> Result<Snapshot, GasnetError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    decode_snapshot(&text)
}

/// Walks the input one line at a time, tracking 1-based line numbers.
struct LineCursor<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> Result<(usize, &'a str), GasnetError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok((self.line_no, line))
            }
            None => Err(GasnetError::malformed(
                self.line_no + 1,
                format!("unexpected end of data, expected {}", what),
            )),
        }
    }

    fn header(&mut self, prefix: &str) -> Result<usize, GasnetError> {
        let (line, raw) = self.next_line(&format!("'{}' header", prefix))?;
        let count = raw.strip_prefix(prefix).ok_or_else(|| {
            GasnetError::malformed(line, format!("expected '{}<count>', found '{}'", prefix, raw))
        })?;
        count.trim().parse::<usize>().map_err(|_| {
            GasnetError::malformed(line, format!("invalid record count '{}'", count))
        })
    }

    fn text(&mut self, context: &str, field: &str) -> Result<String, GasnetError> {
        let (_, raw) = self.next_line(&format!("{} of {}", field, context))?;
        Ok(raw.to_string())
    }

    fn field<T: FromStr>(&mut self, context: &str, field: &str) -> Result<(usize, T), GasnetError> {
        let (line, raw) = self.next_line(&format!("{} of {}", field, context))?;
        let value = raw.trim().parse::<T>().map_err(|_| {
            GasnetError::malformed(line, format!("invalid {} of {}: '{}'", field, context, raw))
        })?;
        Ok((line, value))
    }

    fn flag(&mut self, context: &str, field: &str) -> Result<bool, GasnetError> {
        let (line, raw) = self.next_line(&format!("{} of {}", field, context))?;
        match raw.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(GasnetError::malformed(
                line,
                format!("invalid {} of {}: expected 0 or 1, found '{}'", field, context, other),
            )),
        }
    }

    fn expect_end(&mut self) -> Result<(), GasnetError> {
        for raw in self.lines.by_ref() {
            self.line_no += 1;
            if !raw.trim().is_empty() {
                return Err(GasnetError::malformed(
                    self.line_no,
                    "unexpected content after the last station",
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
