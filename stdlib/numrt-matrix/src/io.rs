//! Binary matrix files.
//!
//! # Format
//!
//! All integers are little-endian.
//!
//! ```text
//! magic     4 bytes  "NRMX"
//! version   u8       1
//! kind      u8       0 boolean, 1 integer, 2 real, 3 complex
//! layout    u8       0 dense, 1 sparse
//! reserved  u8       0
//! rows      u64
//! columns   u64
//! body
//! ```
//!
//! A dense body holds the coefficients column by column. Booleans are
//! packed eight per byte, least significant bit first, and every column
//! starts on a fresh byte. A sparse body is a `u64` entry count followed by
//! `(u64 row, u64 column, value)` triples in column-major order, with
//! 0-based positions and one byte per boolean value.
//!
//! Integers are `i64`, reals `f64`, complex values a real `f64` followed by
//! an imaginary `f64`.
//!
//! Saving writes the materialized logical matrix in its current layout.
//! Loading always produces a fresh dense matrix; a sparse file whose shape
//! exceeds [`MAX_SPARSE_LOAD`] coefficients is rejected as malformed.

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;
use crate::scalar::{Scalar, ScalarKind, Value};
use crate::storage::{DenseData, MatrixType, SparseData, Storage};
use crate::variant::Variant;
use num_complex::Complex64;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// File magic.
pub const MAGIC: [u8; 4] = *b"NRMX";

/// Current format version.
pub const VERSION: u8 = 1;

/// Largest coefficient count a sparse file may expand to on load.
pub const MAX_SPARSE_LOAD: usize = 1 << 28;

// ============================================================
// Header
// ============================================================

fn kind_byte(kind: ScalarKind) -> u8 {
    match kind {
        ScalarKind::Boolean => 0,
        ScalarKind::Integer => 1,
        ScalarKind::Real => 2,
        ScalarKind::Complex => 3,
    }
}

fn kind_from_byte(byte: u8) -> MatrixResult<ScalarKind> {
    match byte {
        0 => Ok(ScalarKind::Boolean),
        1 => Ok(ScalarKind::Integer),
        2 => Ok(ScalarKind::Real),
        3 => Ok(ScalarKind::Complex),
        other => Err(MatrixError::Format(format!("unknown kind byte {other}"))),
    }
}

fn layout_byte(layout: MatrixType) -> u8 {
    match layout {
        MatrixType::Dense => 0,
        MatrixType::Sparse => 1,
    }
}

fn layout_from_byte(byte: u8) -> MatrixResult<MatrixType> {
    match byte {
        0 => Ok(MatrixType::Dense),
        1 => Ok(MatrixType::Sparse),
        other => Err(MatrixError::Format(format!("unknown layout byte {other}"))),
    }
}

struct Header {
    kind: ScalarKind,
    layout: MatrixType,
    rows: usize,
    cols: usize,
}

impl Header {
    fn write<W: Write>(&self, w: &mut W) -> MatrixResult<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[VERSION, kind_byte(self.kind), layout_byte(self.layout), 0])?;
        write_u64(w, self.rows as u64)?;
        write_u64(w, self.cols as u64)?;
        Ok(())
    }

    fn read<R: Read>(r: &mut R) -> MatrixResult<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(MatrixError::Format(format!("bad magic {magic:?}")));
        }
        let mut bytes = [0u8; 4];
        r.read_exact(&mut bytes)?;
        let [version, kind, layout, _reserved] = bytes;
        if version != VERSION {
            return Err(MatrixError::Format(format!(
                "unsupported version {version}"
            )));
        }
        Ok(Self {
            kind: kind_from_byte(kind)?,
            layout: layout_from_byte(layout)?,
            rows: read_extent(r)?,
            cols: read_extent(r)?,
        })
    }
}

// ============================================================
// Primitive codecs
// ============================================================

fn write_u64<W: Write>(w: &mut W, value: u64) -> MatrixResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u64<R: Read>(r: &mut R) -> MatrixResult<u64> {
    let mut bytes = [0u8; 8];
    r.read_exact(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

fn read_f64<R: Read>(r: &mut R) -> MatrixResult<f64> {
    Ok(f64::from_bits(read_u64(r)?))
}

fn read_extent<R: Read>(r: &mut R) -> MatrixResult<usize> {
    let value = read_u64(r)?;
    usize::try_from(value).map_err(|_| MatrixError::Format(format!("extent {value} too large")))
}

fn write_value<W: Write>(w: &mut W, value: Value) -> MatrixResult<()> {
    match value {
        Value::Boolean(b) => w.write_all(&[u8::from(b)])?,
        Value::Integer(i) => w.write_all(&i.to_le_bytes())?,
        Value::Real(x) => w.write_all(&x.to_le_bytes())?,
        Value::Complex(z) => {
            w.write_all(&z.re.to_le_bytes())?;
            w.write_all(&z.im.to_le_bytes())?;
        }
    }
    Ok(())
}

fn read_value<R: Read>(r: &mut R, kind: ScalarKind) -> MatrixResult<Value> {
    Ok(match kind {
        ScalarKind::Boolean => {
            let mut byte = [0u8; 1];
            r.read_exact(&mut byte)?;
            match byte[0] {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                other => {
                    return Err(MatrixError::Format(format!("bad boolean byte {other}")));
                }
            }
        }
        ScalarKind::Integer => Value::Integer(read_u64(r)? as i64),
        ScalarKind::Real => Value::Real(read_f64(r)?),
        ScalarKind::Complex => {
            let re = read_f64(r)?;
            Value::Complex(Complex64::new(re, read_f64(r)?))
        }
    })
}

// ============================================================
// Bodies
// ============================================================

fn write_dense<S: Scalar, W: Write>(w: &mut W, rows: usize, values: &[S]) -> MatrixResult<()> {
    if S::KIND != ScalarKind::Boolean {
        for &v in values {
            write_value(w, v.to_value())?;
        }
        return Ok(());
    }
    for column in values.chunks(rows.max(1)) {
        for octet in column.chunks(8) {
            let byte = octet
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_zero())
                .fold(0u8, |acc, (bit, _)| acc | (1 << bit));
            w.write_all(&[byte])?;
        }
    }
    Ok(())
}

fn read_dense<S: Scalar, R: Read>(r: &mut R, header: &Header) -> MatrixResult<DenseData<S>> {
    let (rows, cols) = (header.rows, header.cols);
    let count = rows.saturating_mul(cols);
    // The body proves the shape; grow with it rather than trust the header.
    let mut data = Vec::with_capacity(count.min(1 << 20));
    match header.kind {
        // Zero rows means an empty body whatever the column count.
        ScalarKind::Boolean if rows == 0 => {}
        ScalarKind::Boolean => {
            let mut octet = [0u8; 1];
            for _ in 0..cols {
                for row in 0..rows {
                    if row % 8 == 0 {
                        r.read_exact(&mut octet)?;
                    }
                    let bit = (octet[0] >> (row % 8)) & 1 == 1;
                    data.push(coerce(Value::Boolean(bit))?);
                }
            }
        }
        kind => {
            for _ in 0..count {
                data.push(coerce(read_value(r, kind)?)?);
            }
        }
    }
    Ok(DenseData::from_column_major(rows, cols, data))
}

fn read_sparse<S: Scalar, R: Read>(r: &mut R, header: &Header) -> MatrixResult<DenseData<S>> {
    let count = read_u64(r)?;
    let mut sparse = SparseData::zeros(header.rows, header.cols);
    for _ in 0..count {
        let row = read_extent(r)?;
        let col = read_extent(r)?;
        let value = coerce(read_value(r, header.kind)?)?;
        if !sparse.set(row, col, value) {
            return Err(MatrixError::Format(format!(
                "entry ({row}, {col}) outside {}x{}",
                header.rows, header.cols
            )));
        }
    }
    let coefficients = header.rows * header.cols;
    if coefficients > MAX_SPARSE_LOAD {
        return Err(MatrixError::Format(format!(
            "sparse {}x{} is too large to load densely",
            header.rows, header.cols
        )));
    }
    Ok(sparse.to_dense())
}

fn coerce<S: Scalar>(value: Value) -> MatrixResult<S> {
    S::from_value(value).ok_or_else(|| {
        MatrixError::Format(format!("{value} does not fit the declared kind"))
    })
}

fn read_matrix<S: Scalar, R: Read>(r: &mut R, header: &Header) -> MatrixResult<Matrix<S>> {
    if header.rows.checked_mul(header.cols).is_none() {
        return Err(MatrixError::Format(format!(
            "shape {}x{} overflows",
            header.rows, header.cols
        )));
    }
    let dense = match header.layout {
        MatrixType::Dense => read_dense(r, header)?,
        MatrixType::Sparse => read_sparse(r, header)?,
    };
    Ok(Matrix::from_dense(dense))
}

// ============================================================
// Public API
// ============================================================

/// Serialize `matrix` to `writer`.
pub fn write_to<S: Scalar, W: Write>(matrix: &Matrix<S>, mut writer: W) -> MatrixResult<()> {
    let block = matrix.apply_lazy_transforms_and_scaling();
    let header = Header {
        kind: S::KIND,
        layout: block.layout(),
        rows: block.rows(),
        cols: block.cols(),
    };
    header.write(&mut writer)?;
    match &*block {
        Storage::Dense(dense) => write_dense(&mut writer, header.rows, dense.as_slice())?,
        Storage::Sparse(sparse) => {
            write_u64(&mut writer, sparse.nnz() as u64)?;
            for (row, col, value) in sparse.iter() {
                write_u64(&mut writer, row as u64)?;
                write_u64(&mut writer, col as u64)?;
                write_value(&mut writer, value.to_value())?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Deserialize a matrix of whatever kind the stream declares.
pub fn read_variant<R: Read>(mut reader: R) -> MatrixResult<Variant> {
    let header = Header::read(&mut reader)?;
    Ok(match header.kind {
        ScalarKind::Boolean => read_matrix::<bool, _>(&mut reader, &header)?.into(),
        ScalarKind::Integer => read_matrix::<i64, _>(&mut reader, &header)?.into(),
        ScalarKind::Real => read_matrix::<f64, _>(&mut reader, &header)?.into(),
        ScalarKind::Complex => read_matrix::<Complex64, _>(&mut reader, &header)?.into(),
    })
}

/// Deserialize a matrix and convert it to kind `S`.
///
/// Fails with `InvalidRuntimeConversion` when the stored kind does not
/// convert to `S` without loss.
pub fn read_from<S: Scalar, R: Read>(reader: R) -> MatrixResult<Matrix<S>> {
    Matrix::from_variant(&read_variant(reader)?)
}

/// Write `matrix` to the file at `path`, replacing it.
pub fn save<S: Scalar>(matrix: &Matrix<S>, path: impl AsRef<Path>) -> MatrixResult<()> {
    let path = path.as_ref();
    let (rows, cols) = matrix.shape();
    debug!(path = %path.display(), kind = ?S::KIND, rows, cols, "saving matrix");
    write_to(matrix, BufWriter::new(File::create(path)?))
}

/// Read a matrix of kind `S` from the file at `path`.
pub fn load<S: Scalar>(path: impl AsRef<Path>) -> MatrixResult<Matrix<S>> {
    let path = path.as_ref();
    debug!(path = %path.display(), kind = ?S::KIND, "loading matrix");
    read_from(BufReader::new(File::open(path)?))
}

/// Read a matrix of any kind from the file at `path`.
pub fn load_variant(path: impl AsRef<Path>) -> MatrixResult<Variant> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading matrix variant");
    read_variant(BufReader::new(File::open(path)?))
}

impl<S: Scalar> Matrix<S> {
    /// Write to the file at `path`. See [`save`].
    pub fn save(&self, path: impl AsRef<Path>) -> MatrixResult<()> {
        save(self, path)
    }

    /// Read from the file at `path`. See [`load`].
    pub fn load(path: impl AsRef<Path>) -> MatrixResult<Self> {
        load(path)
    }
}
