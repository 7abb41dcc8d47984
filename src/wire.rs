//! Fixed-layout, big-endian codecs for persisted and exchanged values.
//!
//! Layouts:
//! - [`PartitionMessage`]: `i64 source_id | i16 partition | f64 signal`
//!   (18 bytes).
//! - [`EdgeValue`]: `i16 partition | u8 weight` (3 bytes).
//! - [`VertexValue`]: `i16 current_partition | i16 new_partition` (4 bytes).

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// A label announcement carrying an optional reinforcement signal.
///
/// Announcements without an explicit signal carry 0.0 on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionMessage {
    pub source_id: i64,
    pub partition: i16,
    pub signal: f64,
}

impl PartitionMessage {
    /// Encoded size in bytes.
    pub const ENCODED_LEN: usize = 18;

    /// An announcement with the default (zero) signal.
    pub fn new(source_id: i64, partition: i16) -> Self {
        Self {
            source_id,
            partition,
            signal: 0.0,
        }
    }

    /// An announcement carrying a reinforcement signal.
    pub fn with_signal(source_id: i64, partition: i16, signal: f64) -> Self {
        Self {
            source_id,
            partition,
            signal,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_i64::<BigEndian>(self.source_id)?;
        w.write_i16::<BigEndian>(self.partition)?;
        w.write_f64::<BigEndian>(self.signal)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let source_id = r.read_i64::<BigEndian>()?;
        let partition = r.read_i16::<BigEndian>()?;
        let signal = r.read_f64::<BigEndian>()?;
        Ok(Self {
            source_id,
            partition,
            signal,
        })
    }
}

/// Per-neighbor state persisted with an edge: the last announced label of the
/// neighbor and the edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeValue {
    pub partition: i16,
    pub weight: u8,
}

impl Default for EdgeValue {
    fn default() -> Self {
        Self {
            partition: -1,
            weight: 1,
        }
    }
}

impl EdgeValue {
    /// Encoded size in bytes.
    pub const ENCODED_LEN: usize = 3;

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_i16::<BigEndian>(self.partition)?;
        w.write_u8(self.weight)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let partition = r.read_i16::<BigEndian>()?;
        let weight = r.read_u8()?;
        Ok(Self { partition, weight })
    }
}

/// Persisted vertex state: the committed label and the pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexValue {
    pub current_partition: i16,
    pub new_partition: i16,
}

impl Default for VertexValue {
    fn default() -> Self {
        Self {
            current_partition: -1,
            new_partition: -1,
        }
    }
}

impl VertexValue {
    /// Encoded size in bytes.
    pub const ENCODED_LEN: usize = 4;

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_i16::<BigEndian>(self.current_partition)?;
        w.write_i16::<BigEndian>(self.new_partition)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let current_partition = r.read_i16::<BigEndian>()?;
        let new_partition = r.read_i16::<BigEndian>()?;
        Ok(Self {
            current_partition,
            new_partition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_round_trip_is_bit_exact() {
        let msg = PartitionMessage::with_signal(-42, 7, 1.0);
        let mut buf = Vec::new();
        msg.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), PartitionMessage::ENCODED_LEN);
        let back = PartitionMessage::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(msg, back);
        assert_eq!(msg.signal.to_bits(), back.signal.to_bits());
    }

    #[test]
    fn message_layout_is_big_endian() {
        let msg = PartitionMessage::with_signal(1, 2, 0.0);
        let mut buf = Vec::new();
        msg.write_to(&mut buf).unwrap();
        assert_eq!(
            buf,
            [0, 0, 0, 0, 0, 0, 0, 1, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn default_message_signal_is_zero() {
        assert_eq!(PartitionMessage::new(9, 3).signal.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn edge_value_round_trip() {
        let v = EdgeValue {
            partition: -1,
            weight: 200,
        };
        let mut buf = Vec::new();
        v.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), EdgeValue::ENCODED_LEN);
        assert_eq!(EdgeValue::read_from(&mut buf.as_slice()).unwrap(), v);
    }

    #[test]
    fn vertex_value_round_trip() {
        let v = VertexValue {
            current_partition: 12,
            new_partition: -1,
        };
        let mut buf = Vec::new();
        v.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), VertexValue::ENCODED_LEN);
        assert_eq!(VertexValue::read_from(&mut buf.as_slice()).unwrap(), v);
    }

    #[test]
    fn truncated_input_fails() {
        let buf = [0u8; 2];
        assert!(PartitionMessage::read_from(&mut buf.as_ref()).is_err());
        assert!(VertexValue::read_from(&mut buf.as_ref()).is_err());
    }
}
