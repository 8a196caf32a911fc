//! NumPy `.npy` (format version 1.0) for little-endian `f64` arrays in C
//! order, the layout `numpy.save` produces for a float64 array.
//!
//! ```text
//! bytes 0-5:  \x93NUMPY
//! bytes 6-7:  major, minor version (1, 0)
//! bytes 8-9:  header length, little-endian u16
//! header:     "{'descr': '<f8', 'fortran_order': False, 'shape': (r, c), }"
//!             space padded, newline terminated, total prefix a multiple of 64
//! data:       r * c little-endian f64 values, row-major
//! ```

use std::fs;
use std::path::Path;

use crate::error::{HarnessError, Result};

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// A decoded `.npy` array.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

/// Writes a 2-D table; every row must have the same length.
pub fn write_npy_2d(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
        return Err(HarnessError::Shape(format!(
            "row {bad} has {} columns, expected {cols}",
            rows[bad].len()
        )));
    }
    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    write(path, &[rows.len(), cols], &data)
}

fn write(path: &Path, shape: &[usize], data: &[f64]) -> Result<()> {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    let shape_str = format!("({})", dims.join(", "));
    let mut header = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': {shape_str}, }}");
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + header.len() + data.len() * 8);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for v in data {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads a C-ordered `<f8` array of any rank, as written by `write_npy_2d`
/// or `numpy.save`.
pub fn read_npy(path: &Path) -> Result<NpyArray> {
    let bytes = fs::read(path)?;
    let bad = |msg: &str| HarnessError::Shape(format!("{}: {msg}", path.display()));

    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(bad("not a .npy file"));
    }
    if bytes[6] != 1 {
        return Err(bad("unsupported .npy version"));
    }
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let data_start = 10 + header_len;
    if bytes.len() < data_start {
        return Err(bad("truncated header"));
    }
    let header = std::str::from_utf8(&bytes[10..data_start]).map_err(|_| bad("header is not UTF-8"))?;
    if !header.contains("'descr': '<f8'") || !header.contains("'fortran_order': False") {
        return Err(bad("only C-ordered little-endian f64 arrays are supported"));
    }

    let open = header.find("'shape': (").ok_or_else(|| bad("missing shape"))? + "'shape': (".len();
    let close = open + header[open..].find(')').ok_or_else(|| bad("unterminated shape"))?;
    let shape = header[open..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|_| bad("invalid shape")))
        .collect::<Result<Vec<usize>>>()?;

    let count: usize = shape.iter().product();
    let payload = &bytes[data_start..];
    if payload.len() != count * 8 {
        return Err(bad("payload does not match shape"));
    }
    let data = payload
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    Ok(NpyArray { shape, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_aligned_and_describes_the_table() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("train_values.npy");
        write_npy_2d(&path, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();

        let bytes = fs::read(&path).unwrap();
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 6 * 8);

        let array = read_npy(&path).unwrap();
        assert_eq!(array.shape, vec![2, 3]);
        assert_eq!(array.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn reads_one_dimensional_numpy_output() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("test_values.npy");
        let mut header = "{'descr': '<f8', 'fortran_order': False, 'shape': (2,), }".to_string();
        header.push_str(&" ".repeat(128 - 10 - header.len() - 1));
        header.push('\n');
        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        for v in [7.0f64, 7.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        fs::write(&path, bytes).unwrap();

        let array = read_npy(&path).unwrap();
        assert_eq!(array.shape, vec![2]);
        assert_eq!(array.data, vec![7.0, 7.0]);
    }

    #[test]
    fn ragged_tables_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = write_npy_2d(&tmp.path().join("x.npy"), &[vec![1.0], vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, HarnessError::Shape(_)));
    }
}
