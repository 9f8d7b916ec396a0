// polar-roll/src/bpolar/codec.rs
//
// Layout of a .bpolar stream:
//
//   string   metadata (7-bit encoded length + UTF-8)
//   string   metadata
//   i32 LE   speed count, [1, 100]
//   i32 LE   heading count, [1, 360]
//   string   status
//   for j in 0..headings, for i in 0..speeds:
//       f64 LE speed[i], f64 LE heading[j], f64 LE max_roll[i][j]
//
// Every speed is written once per heading and every heading once per speed.
// Well-formed files repeat the same values, so the last write wins.

use super::errors::{BpolarError, MatrixDimension};
use super::response_matrix::{validate_count, ResponseMatrix};
use log::debug;
use ndarray::Array2;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

const TRIPLET_BYTES: usize = 24;

/// Decode a `.bpolar` byte buffer.
pub fn decode(bytes: &[u8]) -> Result<ResponseMatrix, BpolarError> {
    decode_keyed(bytes, "")
}

/// Decode a `.bpolar` byte buffer, recording `source_key` as its provenance.
pub fn decode_keyed(bytes: &[u8], source_key: &str) -> Result<ResponseMatrix, BpolarError> {
    let mut reader = bytes;
    read_matrix(&mut reader, source_key)
}

/// Decode a response matrix from any byte stream. Nothing is returned unless
/// the whole data section could be read.
pub fn read_matrix<R: Read>(
    reader: &mut R,
    source_key: &str,
) -> Result<ResponseMatrix, BpolarError> {
    let metadata = [
        read_string(reader, "metadata header")?,
        read_string(reader, "metadata header")?,
    ];
    let speed_count = read_i32(reader, "speed count")?;
    let heading_count = read_i32(reader, "heading count")?;
    check_header_count(MatrixDimension::Speed, speed_count)?;
    check_header_count(MatrixDimension::Heading, heading_count)?;
    let status = read_string(reader, "status header")?;

    let nspeeds = speed_count as usize;
    let nheadings = heading_count as usize;
    let mut speeds = vec![0.0; nspeeds];
    let mut headings = vec![0.0; nheadings];
    let mut max_roll = Array2::<f64>::zeros((nspeeds, nheadings));
    for j in 0..nheadings {
        for i in 0..nspeeds {
            speeds[i] = read_f64(reader)?;
            headings[j] = read_f64(reader)?;
            max_roll[[i, j]] = read_f64(reader)?;
        }
    }

    Ok(ResponseMatrix::from_parts(
        speeds,
        headings,
        max_roll,
        metadata,
        status,
        source_key.to_string(),
    ))
}

/// Encode a response matrix into the `.bpolar` layout.
pub fn encode(matrix: &ResponseMatrix) -> Vec<u8> {
    let [first, second] = matrix.metadata();
    let mut buf = Vec::with_capacity(
        encoded_header_len(matrix) + matrix.speed_count() * matrix.heading_count() * TRIPLET_BYTES,
    );
    push_string(&mut buf, first);
    push_string(&mut buf, second);
    buf.extend_from_slice(&(matrix.speed_count() as i32).to_le_bytes());
    buf.extend_from_slice(&(matrix.heading_count() as i32).to_le_bytes());
    push_string(&mut buf, matrix.status());
    for (j, heading) in matrix.headings().iter().enumerate() {
        for (i, speed) in matrix.speeds().iter().enumerate() {
            buf.extend_from_slice(&speed.to_le_bytes());
            buf.extend_from_slice(&heading.to_le_bytes());
            buf.extend_from_slice(&matrix.max_roll()[[i, j]].to_le_bytes());
        }
    }
    buf
}

pub fn write_matrix<W: Write>(writer: &mut W, matrix: &ResponseMatrix) -> io::Result<()> {
    writer.write_all(&encode(matrix))
}

/// Read and decode a `.bpolar` file. A missing file maps to
/// [`BpolarError::NotFound`] carrying the attempted path.
pub fn read_bpolar_file(path: &Path) -> Result<ResponseMatrix, BpolarError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(BpolarError::NotFound(path.display().to_string()))
        }
        Err(e) => return Err(BpolarError::ReadFailure(e)),
    };
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode_keyed(&bytes, &path.display().to_string())
}

pub fn write_bpolar_file(path: &Path, matrix: &ResponseMatrix) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    write_matrix(&mut file, matrix)?;
    file.flush()
}

fn check_header_count(dimension: MatrixDimension, count: i32) -> Result<(), BpolarError> {
    if count < 1 {
        return Err(BpolarError::InvalidDimensions { dimension, count });
    }
    validate_count(dimension, count as usize)
}

fn read_failure(e: io::Error, section: &'static str) -> BpolarError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        BpolarError::Truncated(section)
    } else {
        BpolarError::ReadFailure(e)
    }
}

fn read_u8<R: Read>(reader: &mut R, section: &'static str) -> Result<u8, BpolarError> {
    let mut byte = [0u8; 1];
    reader
        .read_exact(&mut byte)
        .map_err(|e| read_failure(e, section))?;
    Ok(byte[0])
}

fn read_i32<R: Read>(reader: &mut R, section: &'static str) -> Result<i32, BpolarError> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| read_failure(e, section))?;
    Ok(i32::from_le_bytes(bytes))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64, BpolarError> {
    let mut bytes = [0u8; 8];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| read_failure(e, "data section"))?;
    Ok(f64::from_le_bytes(bytes))
}

/// Length prefix: 7 bits per byte, least significant group first, high bit
/// set while more bytes follow. At most five bytes for a 32-bit length.
fn read_7bit_length<R: Read>(reader: &mut R, section: &'static str) -> Result<usize, BpolarError> {
    let mut value: u32 = 0;
    let mut shift = 0;
    loop {
        let byte = read_u8(reader, section)?;
        if shift == 28 && byte > 0x07 {
            return Err(BpolarError::ReadFailure(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("string length prefix in the {} overflows 31 bits", section),
            )));
        }
        value |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(value as usize);
        }
        shift += 7;
    }
}

// Invalid UTF-8 is replaced rather than rejected; header contents are never
// interpreted.
fn read_string<R: Read>(reader: &mut R, section: &'static str) -> Result<String, BpolarError> {
    let len = read_7bit_length(reader, section)?;
    let mut buf = Vec::new();
    reader
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| read_failure(e, section))?;
    if buf.len() < len {
        return Err(BpolarError::Truncated(section));
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn push_7bit_length(buf: &mut Vec<u8>, len: usize) {
    let mut value = len as u32;
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn push_string(buf: &mut Vec<u8>, value: &str) {
    push_7bit_length(buf, value.len());
    buf.extend_from_slice(value.as_bytes());
}

fn encoded_header_len(matrix: &ResponseMatrix) -> usize {
    let [first, second] = matrix.metadata();
    [first.len(), second.len(), matrix.status().len()]
        .iter()
        .map(|len| len + 5)
        .sum::<usize>()
        + 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use std::error::Error;

    /// Yields `bytes`, then fails with a non-EOF error.
    struct FailingReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            let n = buf.len().min(self.bytes.len() - self.pos);
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn sample_matrix() -> ResponseMatrix {
        let speeds = vec![0.0, 5.0, 10.0, 15.0];
        let headings: Vec<f64> = (0..12).map(|k| k as f64 * 30.0).collect();
        let max_roll = Array2::from_shape_fn((speeds.len(), headings.len()), |(i, j)| {
            (i as f64 + 1.0) * 1.5 + (j as f64 * 30.0).to_radians().sin().abs() * 10.0
        });
        ResponseMatrix::new(speeds, headings, max_roll)
            .unwrap()
            .with_metadata("PROLL v2", "MAXROLL")
            .with_status("OK")
    }

    fn header_bytes(speed_count: i32, heading_count: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        push_string(&mut buf, "a");
        push_string(&mut buf, "b");
        buf.extend_from_slice(&speed_count.to_le_bytes());
        buf.extend_from_slice(&heading_count.to_le_bytes());
        push_string(&mut buf, "status");
        buf
    }

    #[test]
    fn test_round_trip() {
        let matrix = sample_matrix();
        let bytes = encode(&matrix);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, matrix);
        assert_eq!(decoded.metadata()[0], "PROLL v2");
        assert_eq!(decoded.status(), "OK");
        assert_eq!(decoded.source_key(), "");
    }

    #[test]
    fn test_round_trip_at_dimension_limits() {
        let speeds: Vec<f64> = (0..100).map(|s| s as f64 * 0.25).collect();
        let headings: Vec<f64> = (0..360).map(|h| h as f64).collect();
        let max_roll = Array2::from_shape_fn((100, 360), |(i, j)| (i * 360 + j) as f64 / 1000.0);
        let matrix = ResponseMatrix::new(speeds, headings, max_roll).unwrap();
        let decoded = decode_keyed(&encode(&matrix), "limits").unwrap();
        assert_eq!(decoded, matrix);
        assert_eq!(decoded.source_key(), "limits");
    }

    #[test]
    fn test_data_section_size() {
        let matrix = sample_matrix();
        let bytes = encode(&matrix);
        let header = 1 + 8 + 1 + 7 + 4 + 4 + 1 + 2;
        assert_eq!(bytes.len(), header + 4 * 12 * TRIPLET_BYTES);
    }

    #[test]
    fn test_data_section_order() {
        let matrix = sample_matrix();
        let bytes = encode(&matrix);
        let data = &bytes[bytes.len() - 4 * 12 * TRIPLET_BYTES..];
        let at = |k: usize| f64::from_le_bytes(data[k * 8..k * 8 + 8].try_into().unwrap());
        // second triplet: speed[1], heading[0], roll[1][0]
        assert_eq!(at(3), 5.0);
        assert_eq!(at(4), 0.0);
        assert_eq!(at(5), matrix.max_roll()[[1, 0]]);
        // fifth triplet starts the second heading
        assert_eq!(at(12), 0.0);
        assert_eq!(at(13), 30.0);
    }

    #[test]
    fn test_last_write_wins_for_repeated_axes() {
        let mut bytes = header_bytes(2, 2);
        let triplets = [
            [1.0, 0.0, 10.0],
            [2.0, 0.0, 20.0],
            [1.5, 90.0, 11.0],
            [2.5, 90.0, 21.0],
        ];
        for triplet in triplets {
            for value in triplet {
                bytes.extend_from_slice(&f64::to_le_bytes(value));
            }
        }
        let matrix = decode(&bytes).unwrap();
        assert_eq!(matrix.speeds(), &[1.5, 2.5]);
        assert_eq!(matrix.headings(), &[0.0, 90.0]);
        assert_eq!(matrix.roll_at(1, 1), Some(21.0));
    }

    #[test]
    fn test_invalid_speed_counts() {
        for count in [0, 101, -4] {
            let err = decode(&header_bytes(count, 10)).unwrap_err();
            assert!(
                matches!(
                    err,
                    BpolarError::InvalidDimensions {
                        dimension: MatrixDimension::Speed,
                        count: c
                    } if c == count
                ),
                "count {} gave {:?}",
                count,
                err
            );
        }
    }

    #[test]
    fn test_invalid_heading_counts() {
        for count in [0, 361] {
            let err = decode(&header_bytes(10, count)).unwrap_err();
            assert!(matches!(
                err,
                BpolarError::InvalidDimensions {
                    dimension: MatrixDimension::Heading,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_truncation_at_every_offset() {
        let bytes = encode(&sample_matrix());
        for cut in 0..bytes.len() {
            match decode(&bytes[..cut]) {
                Err(BpolarError::Truncated(_)) => {}
                other => panic!("cut at {} gave {:?}", cut, other),
            }
        }
    }

    #[test]
    fn test_long_string_length_prefix() {
        let long = "x".repeat(300);
        let matrix = sample_matrix().with_metadata(long.clone(), "");
        let bytes = encode(&matrix);
        // 300 = 0b10_0101100 -> [0xAC, 0x02]
        assert_eq!(&bytes[..2], &[0xAC, 0x02]);
        assert_eq!(decode(&bytes).unwrap().metadata()[0], long);
    }

    #[test]
    fn test_invalid_utf8_header_is_replaced() {
        let mut bytes = vec![2, b'o', 0xFF];
        bytes.extend_from_slice(&header_bytes(1, 1)[2..]);
        for value in [0.0, 0.0, 4.0] {
            bytes.extend_from_slice(&f64::to_le_bytes(value));
        }
        let matrix = decode(&bytes).unwrap();
        assert_eq!(matrix.metadata()[0], "o\u{FFFD}");
        assert_eq!(matrix.metadata()[1], "b");
        assert_eq!(matrix.roll_at(0, 0), Some(4.0));
    }

    #[test]
    fn test_round_trip_keeps_nan_cells() {
        let matrix =
            ResponseMatrix::new(vec![0.0], vec![0.0, 90.0], array![[1.0, f64::NAN]]).unwrap();
        let bytes = encode(&matrix);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, matrix);
        assert!(decoded.roll_at(0, 1).unwrap().is_nan());
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_io_error_is_read_failure() {
        // both strings and half of the speed count, then the source fails
        let mut reader = FailingReader {
            bytes: header_bytes(2, 2)[..6].to_vec(),
            pos: 0,
        };
        match read_matrix(&mut reader, "") {
            Err(err @ BpolarError::ReadFailure(_)) => {
                let source = err.source().unwrap();
                let io_err = source.downcast_ref::<io::Error>().unwrap();
                assert_eq!(io_err.kind(), io::ErrorKind::Other);
                if let BpolarError::ReadFailure(e) = err {
                    assert_eq!(e.kind(), io::ErrorKind::Other);
                }
            }
            other => panic!("expected ReadFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_overlong_length_prefix_is_read_failure() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            BpolarError::ReadFailure(_)
        ));
    }

    #[test]
    fn test_read_bpolar_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MAXROLL_H5.5_T7.5.bpolar");
        match read_bpolar_file(&path) {
            Err(BpolarError::NotFound(p)) => assert!(p.ends_with("MAXROLL_H5.5_T7.5.bpolar")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bpolar");
        let matrix = sample_matrix();
        write_bpolar_file(&path, &matrix).unwrap();
        let decoded = read_bpolar_file(&path).unwrap();
        assert_eq!(decoded, matrix);
        assert_eq!(decoded.source_key(), path.display().to_string());
    }
}
