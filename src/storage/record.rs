//! Data file record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record including this field)
//! +------------------+
//! | Student ID       | (length-prefixed UTF-8)
//! +------------------+
//! | Sequence         | (u64 LE, insertion order of the student)
//! +------------------+
//! | Body             | (length-prefixed bytes, JSON document)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Cursor, Read};

use super::checksum::compute_checksum;

/// Smallest possible record: length + empty id + sequence + empty body + checksum.
pub const MIN_RECORD_SIZE: usize = 4 + 4 + 8 + 4 + 4;

/// One version of one student document as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    /// Student key (canonical UUID string)
    pub student_id: String,
    /// Insertion sequence, fixed at creation and carried across updates
    pub sequence: u64,
    /// Encoded document
    pub body: Vec<u8>,
}

impl StudentRecord {
    pub fn new(student_id: impl Into<String>, sequence: u64, body: Vec<u8>) -> Self {
        Self {
            student_id: student_id.into(),
            sequence,
            body,
        }
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.student_id.len() + 8 + 4 + self.body.len());

        buf.extend_from_slice(&(self.student_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.student_id.as_bytes());

        buf.extend_from_slice(&self.sequence.to_le_bytes());

        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);

        buf
    }

    /// Serializes the complete record, checksum included.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserializes one record from the start of `data`, verifying its checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);

        let id_bytes = read_prefixed(&mut cursor)?;
        let student_id = String::from_utf8(id_bytes).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
        })?;

        let mut seq_buf = [0u8; 8];
        cursor.read_exact(&mut seq_buf)?;
        let sequence = u64::from_le_bytes(seq_buf);

        let body = read_prefixed(&mut cursor)?;

        if cursor.position() as usize != checksum_offset - 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Trailing bytes inside record",
            ));
        }

        Ok((
            Self {
                student_id,
                sequence,
                body,
            },
            record_length,
        ))
    }
}

fn read_prefixed(reader: &mut Cursor<&[u8]>) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let remaining = reader.get_ref().len() - reader.position() as usize;
    if len > remaining {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Field length {} exceeds record body", len),
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
