//! Matrix file round trips
//!
//! - Every kind and layout through save/load on disk
//! - Deferred state is written materialized
//! - Malformed files and kind mismatches

use numrt_matrix::io::{self, MAGIC};
use numrt_matrix::{
    BooleanMatrix, Complex64, ComplexMatrix, IntegerMatrix, MatrixError, MatrixType, RealMatrix,
    Variant,
};
use std::fs;
use tempfile::TempDir;

fn workspace() -> TempDir {
    tempfile::tempdir().unwrap()
}

// ============================================================
// Round trips
// ============================================================

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_every_kind_dense() {
        let dir = workspace();

        let b = BooleanMatrix::from_rows(&[[true, false, true], [false, false, true]]).unwrap();
        let path = dir.path().join("b.nrmx");
        b.save(&path).unwrap();
        assert_eq!(BooleanMatrix::load(&path).unwrap(), b);

        let i = IntegerMatrix::from_rows(&[[i64::MIN, -1], [0, i64::MAX]]).unwrap();
        let path = dir.path().join("i.nrmx");
        i.save(&path).unwrap();
        assert_eq!(IntegerMatrix::load(&path).unwrap(), i);

        let r = RealMatrix::from_rows(&[[0.1, -2.5e300], [f64::INFINITY, -0.0]]).unwrap();
        let path = dir.path().join("r.nrmx");
        r.save(&path).unwrap();
        assert_eq!(RealMatrix::load(&path).unwrap(), r);

        let z = ComplexMatrix::from_rows(&[[Complex64::new(1.0, -1.0)], [Complex64::new(0.0, 3.5)]])
            .unwrap();
        let path = dir.path().join("z.nrmx");
        z.save(&path).unwrap();
        assert_eq!(ComplexMatrix::load(&path).unwrap(), z);
    }

    #[test]
    fn test_sparse_loads_dense() {
        let dir = workspace();
        let s = IntegerMatrix::sparse(4, 5, [(1, 5, 3), (4, 1, -7)]).unwrap();
        let path = dir.path().join("s.nrmx");
        s.save(&path).unwrap();
        let back = IntegerMatrix::load(&path).unwrap();
        assert_eq!(back.matrix_type(), MatrixType::Dense);
        assert_eq!(back, s);
    }

    #[test]
    fn test_sparse_boolean() {
        let dir = workspace();
        let s = BooleanMatrix::sparse(9, 2, [(9, 2, true)]).unwrap();
        let path = dir.path().join("sb.nrmx");
        s.save(&path).unwrap();
        assert_eq!(BooleanMatrix::load(&path).unwrap(), s);
    }

    #[test]
    fn test_pending_transform_is_materialized() {
        let dir = workspace();
        let a = RealMatrix::from_rows(&[[1.0, 2.0, 3.0]]).unwrap();
        let t = &a.transpose() * 2.0_f64;
        let path = dir.path().join("t.nrmx");
        t.save(&path).unwrap();
        let back = RealMatrix::load(&path).unwrap();
        assert_eq!(back.shape(), (3, 1));
        assert_eq!(back.to_column_major(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_empty_matrix() {
        let dir = workspace();
        let e = RealMatrix::with_dimensions(0, 3).unwrap();
        let path = dir.path().join("e.nrmx");
        e.save(&path).unwrap();
        let back = RealMatrix::load(&path).unwrap();
        assert_eq!(back.shape(), (0, 3));
    }

    #[test]
    fn test_load_widens_and_reports_kind() {
        let dir = workspace();
        let i = IntegerMatrix::from_rows(&[[1, 2]]).unwrap();
        let path = dir.path().join("w.nrmx");
        io::save(&i, &path).unwrap();

        let widened: ComplexMatrix = io::load(&path).unwrap();
        assert_eq!(widened.value(1, 2).unwrap(), Complex64::new(2.0, 0.0));

        let variant = io::load_variant(&path).unwrap();
        assert!(matches!(variant, Variant::MatrixInteger(_)));
    }
}

// ============================================================
// Failures
// ============================================================

mod failure_tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = workspace();
        assert!(matches!(
            RealMatrix::load(dir.path().join("absent.nrmx")),
            Err(MatrixError::Io(_))
        ));
    }

    #[test]
    fn test_corrupt_header() {
        let dir = workspace();
        let path = dir.path().join("bad.nrmx");
        RealMatrix::identity(2).save(&path).unwrap();
        let original = fs::read(&path).unwrap();
        assert_eq!(&original[..4], &MAGIC);

        let mut bytes = original.clone();
        bytes[4] = 9;
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(RealMatrix::load(&path), Err(MatrixError::Format(_))));

        let mut bytes = original.clone();
        bytes[5] = 7;
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(RealMatrix::load(&path), Err(MatrixError::Format(_))));

        let mut bytes = original;
        bytes[6] = 2;
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(RealMatrix::load(&path), Err(MatrixError::Format(_))));
    }

    #[test]
    fn test_sparse_entry_out_of_range() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&[1, 1, 1, 0]);
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&5u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&9i64.to_le_bytes());
        assert!(matches!(
            io::read_from::<i64, _>(bytes.as_slice()),
            Err(MatrixError::Format(_))
        ));
    }

    fn header(kind: u8, layout: u8, rows: u64, cols: u64) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[1, kind, layout, 0]);
        bytes.extend_from_slice(&rows.to_le_bytes());
        bytes.extend_from_slice(&cols.to_le_bytes());
        bytes
    }

    #[test]
    fn test_oversized_sparse_shape_is_rejected() {
        let mut bytes = header(2, 1, 1 << 31, 1 << 31);
        bytes.extend_from_slice(&0u64.to_le_bytes());
        assert!(matches!(
            io::read_from::<f64, _>(bytes.as_slice()),
            Err(MatrixError::Format(_))
        ));
    }

    #[test]
    fn test_declared_shape_must_be_backed_by_body() {
        let mut bytes = header(0, 0, 1 << 40, 1);
        bytes.push(0b1010_1010);
        assert!(matches!(
            io::read_from::<bool, _>(bytes.as_slice()),
            Err(MatrixError::Io(_))
        ));

        let bytes = header(2, 0, 1 << 31, 1 << 31);
        assert!(matches!(
            io::read_from::<f64, _>(bytes.as_slice()),
            Err(MatrixError::Io(_))
        ));

        let bytes = header(0, 0, 0, u64::MAX);
        let empty = io::read_from::<bool, _>(bytes.as_slice()).unwrap();
        assert_eq!(empty.shape(), (0, usize::MAX));
    }

    #[test]
    fn test_complex_does_not_load_as_real() {
        let dir = workspace();
        let path = dir.path().join("z.nrmx");
        let z = ComplexMatrix::from_rows(&[[Complex64::new(0.0, 1.0)]]).unwrap();
        z.save(&path).unwrap();
        assert!(matches!(
            RealMatrix::load(&path),
            Err(MatrixError::InvalidRuntimeConversion { .. })
        ));
    }
}
