//! NumPy `.npy` reading and writing.
//!
//! Supports format versions 1.0, 2.0 and 3.0, C-ordered little-endian
//! `f4`/`f8` arrays with one to three axes. Arrays with fewer than three
//! axes are promoted by appending unit axes. Tables are always written as
//! version 1.0 `<f4`.

use crate::{Error, Result};
use std::path::Path;
use wavegrid_core::LookupTable;

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Element type of an NPY payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F4,
    F8,
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self> {
        match descr {
            "<f4" => Ok(Dtype::F4),
            "<f8" => Ok(Dtype::F8),
            other => Err(Error::NpyDtype(other.to_string())),
        }
    }

    fn size(self) -> usize {
        match self {
            Dtype::F4 => 4,
            Dtype::F8 => 8,
        }
    }
}

/// Parsed header dictionary.
#[derive(Debug)]
struct Header {
    dtype: Dtype,
    shape: Vec<usize>,
}

/// Read an `.npy` file into a lookup table.
pub fn read_npy<P: AsRef<Path>>(path: P) -> Result<LookupTable> {
    let bytes = std::fs::read(path)?;
    decode_npy(&bytes)
}

/// Decode an in-memory `.npy` image.
pub fn decode_npy(bytes: &[u8]) -> Result<LookupTable> {
    if bytes.len() < MAGIC.len() + 2 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Npy("missing \\x93NUMPY magic".into()));
    }
    let major = bytes[MAGIC.len()];
    let rest = &bytes[MAGIC.len() + 2..];

    let (header_len, rest) = match major {
        1 => {
            let len = rest
                .get(..2)
                .ok_or_else(|| Error::Npy("truncated header length".into()))?;
            (usize::from(u16::from_le_bytes([len[0], len[1]])), &rest[2..])
        }
        2 | 3 => {
            let len = rest
                .get(..4)
                .ok_or_else(|| Error::Npy("truncated header length".into()))?;
            let len = u32::from_le_bytes([len[0], len[1], len[2], len[3]]);
            (len as usize, &rest[4..])
        }
        v => return Err(Error::Npy(format!("unsupported format version {v}"))),
    };

    let header_bytes = rest
        .get(..header_len)
        .ok_or_else(|| Error::Npy("truncated header".into()))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|_| Error::Npy("header is not valid text".into()))?;
    let header = parse_header(header_text)?;
    let body = &rest[header_len..];

    let count = header
        .shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::Npy("shape overflows".into()))?;
    let needed = count
        .checked_mul(header.dtype.size())
        .ok_or_else(|| Error::Npy("shape overflows".into()))?;
    let payload = body.get(..needed).ok_or_else(|| {
        Error::Npy(format!(
            "expected {needed} bytes of data, found {}",
            body.len()
        ))
    })?;

    let data: Vec<f32> = match header.dtype {
        Dtype::F4 => payload
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        Dtype::F8 => payload
            .chunks_exact(8)
            .map(|c| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(c);
                f64::from_le_bytes(raw) as f32
            })
            .collect(),
    };

    Ok(LookupTable::from_dims(data, &header.shape)?)
}

/// Parse the Python dict literal that forms the NPY header.
fn parse_header(text: &str) -> Result<Header> {
    let descr = dict_value(text, "descr")?;
    let descr = descr
        .strip_prefix(['\'', '"'])
        .and_then(|s| s.split(['\'', '"']).next())
        .ok_or_else(|| Error::Npy("descr is not a string".into()))?;
    let dtype = Dtype::parse(descr)?;

    let fortran = dict_value(text, "fortran_order")?;
    if fortran.starts_with("True") {
        return Err(Error::NpyFortranOrder);
    }
    if !fortran.starts_with("False") {
        return Err(Error::Npy("fortran_order is not a boolean".into()));
    }

    let shape = dict_value(text, "shape")?;
    let inner = shape
        .strip_prefix('(')
        .and_then(|s| s.split(')').next())
        .ok_or_else(|| Error::Npy("shape is not a tuple".into()))?;
    let shape = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| Error::Npy(format!("bad shape entry {s:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Header { dtype, shape })
}

/// Text following `'key':` in the header dict.
fn dict_value<'a>(text: &'a str, key: &str) -> Result<&'a str> {
    let start = [format!("'{key}'"), format!("\"{key}\"")]
        .iter()
        .find_map(|quoted| text.find(quoted.as_str()).map(|i| i + quoted.len()))
        .ok_or_else(|| Error::Npy(format!("header has no {key:?} entry")))?;
    let after = text[start..].trim_start();
    let value = after
        .strip_prefix(':')
        .ok_or_else(|| Error::Npy(format!("{key:?} has no value")))?;
    Ok(value.trim_start())
}

/// Encode a table as a version 1.0 `<f4` `.npy` image with a 3-axis shape.
pub fn encode_npy(table: &LookupTable) -> Vec<u8> {
    let [a, b, c] = table.shape();
    let mut header =
        format!("{{'descr': '<f4', 'fortran_order': False, 'shape': ({a}, {b}, {c}), }}");
    // magic + version + u16 length + header + '\n' must be a multiple of 64
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + header.len() + table.len() * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for &v in table.data() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Write a table as an `.npy` file.
pub fn write_npy<P: AsRef<Path>>(path: P, table: &LookupTable) -> Result<()> {
    std::fs::write(path, encode_npy(table))?;
    Ok(())
}
