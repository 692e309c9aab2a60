//! Recorded walk logs.
//!
//! A walk log is a headerless CSV of timestamped input events captured on a
//! device, so authoring and navigation can be replayed without one:
//!
//! ```text
//! # timestamp_ms, event, x, y, z[, marker]
//! 0,    anchor, 0.0, 0.0, 0.0, pi
//! 500,  camera, 0.0, 0.0, -0.5
//! 900,  add,    0.0, 0.0, -1.0
//! 4000, end,    2.0, 0.0, -3.0
//! 4200, undo
//! ```
//!
//! `add` places the start waypoint when none exists yet and an intermediate
//! otherwise. Coordinates are scene-frame camera (or marker) positions.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use nalgebra::Vector3;

#[derive(Debug, Clone, PartialEq)]
pub enum WalkEvent {
    /// Marker detected at `position`.
    Anchor {
        position: Vector3<f64>,
        marker: String,
    },
    /// Camera moved; no tap.
    Camera(Vector3<f64>),
    /// Tap: place a waypoint at the camera position.
    Add(Vector3<f64>),
    /// Tap: place the destination at the camera position.
    End(Vector3<f64>),
    /// Tap: remove the last waypoint.
    Undo,
}

impl WalkEvent {
    /// Camera position carried by the event, if any.
    pub fn camera(&self) -> Option<&Vector3<f64>> {
        match self {
            Self::Camera(p) | Self::Add(p) | Self::End(p) => Some(p),
            Self::Anchor { .. } | Self::Undo => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkEntry {
    pub timestamp_ms: u64,
    pub event: WalkEvent,
}

#[derive(Debug, Clone, Default)]
pub struct WalkLog {
    pub entries: Vec<WalkEntry>,
}

impl WalkLog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (line, rec) in rdr.records().enumerate() {
            let rec = rec?;
            let entry =
                parse_entry(&rec).with_context(|| format!("Bad walk log record {}", line + 1))?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Duration covered by the log.
    pub fn span_ms(&self) -> u64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.timestamp_ms.saturating_sub(first.timestamp_ms),
            _ => 0,
        }
    }
}

fn parse_entry(rec: &StringRecord) -> Result<WalkEntry> {
    if rec.len() < 2 {
        bail!("expected at least timestamp and event, got {} fields", rec.len());
    }
    let timestamp_ms: u64 = rec[0].parse()?;
    let event = match &rec[1] {
        "undo" => WalkEvent::Undo,
        "camera" => WalkEvent::Camera(parse_position(rec)?),
        "add" => WalkEvent::Add(parse_position(rec)?),
        "end" => WalkEvent::End(parse_position(rec)?),
        "anchor" => {
            let position = parse_position(rec)?;
            let Some(marker) = rec.get(5).filter(|m| !m.is_empty()) else {
                bail!("anchor event without a marker name");
            };
            WalkEvent::Anchor {
                position,
                marker: marker.to_string(),
            }
        }
        other => bail!("unknown event `{other}`"),
    };
    Ok(WalkEntry {
        timestamp_ms,
        event,
    })
}

fn parse_position(rec: &StringRecord) -> Result<Vector3<f64>> {
    if rec.len() < 5 {
        bail!("expected x, y, z after event, got {} fields", rec.len());
    }
    Ok(Vector3::new(rec[2].parse()?, rec[3].parse()?, rec[4].parse()?))
}
