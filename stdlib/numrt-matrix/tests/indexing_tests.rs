//! Indexing integration tests
//!
//! - Boundary indices (0 and extent + 1) for every argument kind
//! - Result shapes for scalar and sequence selectors
//! - Single-index reads in row-major logical order

use numrt_matrix::{
    BooleanMatrix, Complex64, IndexArg, IntegerMatrix, MatrixError, Range, RealMatrix, Selection,
    Set, Tuple, Variant,
};

/// `[[1, 2, 3], [4, 5, 6]]`
fn sample() -> IntegerMatrix {
    IntegerMatrix::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap()
}

/// Index `i` expressed as every accepted argument kind.
fn every_kind(i: i64) -> Vec<Variant> {
    let mut set = Set::new();
    set.insert(i);
    let mut tuple = Tuple::new();
    tuple.push(i);
    vec![
        Variant::Integer(i),
        Variant::Real(i as f64),
        Variant::Complex(Complex64::new(i as f64, 0.0)),
        Variant::Range(Range::new(i, i)),
        Variant::Set(set),
        Variant::Tuple(tuple),
        Variant::from(IntegerMatrix::from_rows(&[[i]]).unwrap()),
        Variant::from(RealMatrix::from_rows(&[[i as f64]]).unwrap()),
        Variant::from(
            numrt_matrix::ComplexMatrix::from_rows(&[[Complex64::new(i as f64, 0.0)]]).unwrap(),
        ),
    ]
}

fn matrix(selection: Selection<i64>) -> IntegerMatrix {
    selection.into_matrix().expect("expected a submatrix")
}

// ============================================================
// Boundaries
// ============================================================

mod boundary_tests {
    use super::*;

    #[test]
    fn test_row_zero_and_past_end() {
        let m = sample();
        for bad in [0, 3] {
            for arg in every_kind(bad) {
                let err = m.at(&arg, 1).unwrap_err();
                assert!(
                    matches!(err, MatrixError::InvalidRow { index, extent: 2 } if index == bad),
                    "{arg:?}: {err}"
                );
            }
        }
    }

    #[test]
    fn test_column_zero_and_past_end() {
        let m = sample();
        for bad in [0, 4] {
            for arg in every_kind(bad) {
                let err = m.at(1, &arg).unwrap_err();
                assert!(
                    matches!(err, MatrixError::InvalidColumn { index, extent: 3 } if index == bad),
                    "{arg:?}: {err}"
                );
            }
        }
    }

    #[test]
    fn test_single_index_zero_and_past_end() {
        let m = sample();
        for bad in [0, 7] {
            for arg in every_kind(bad) {
                let err = m.at_index(&arg).unwrap_err();
                assert!(
                    matches!(err, MatrixError::InvalidIndex { index, extent: 6 } if index == bad),
                    "{arg:?}: {err}"
                );
            }
        }
    }

    #[test]
    fn test_every_kind_accepts_extent() {
        let m = sample();
        for arg in every_kind(2) {
            let selection = m.at(&arg, 3).unwrap();
            let value = match selection {
                Selection::Scalar(v) => v,
                Selection::Matrix(sub) => {
                    assert_eq!(sub.shape(), (1, 1));
                    sub.value(1, 1).unwrap()
                }
            };
            assert_eq!(value, 6, "{arg:?}");
        }
        for arg in every_kind(6) {
            assert!(m.at_index(&arg).is_ok(), "{arg:?}");
        }
    }

    #[test]
    fn test_value_rejects_negative_indices() {
        let m = sample();
        assert!(matches!(
            m.value_at(-1),
            Err(MatrixError::InvalidIndex { index: -1, extent: 6 })
        ));
        assert!(matches!(m.value_at(0), Err(MatrixError::InvalidIndex { .. })));
        assert!(matches!(
            m.value(-3, 1),
            Err(MatrixError::InvalidRow { index: -3, extent: 2 })
        ));
        assert!(matches!(
            m.value(1, 4),
            Err(MatrixError::InvalidColumn { index: 4, extent: 3 })
        ));
    }

    #[test]
    fn test_sequence_reports_failing_entry() {
        let m = sample();
        let err = m.at(Range::new(1, 3), 1).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidRow { index: 3, extent: 2 }));
    }

    #[test]
    fn test_unbounded_range_stops_at_first_bad_term() {
        let m = IntegerMatrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        assert!(matches!(
            m.at(Range::new(1, i64::MAX), 1),
            Err(MatrixError::InvalidRow { index: 3, extent: 2 })
        ));
        assert!(matches!(
            m.at(1, Range::new(2, i64::MAX)),
            Err(MatrixError::InvalidColumn { index: 3, extent: 2 })
        ));
        assert!(matches!(
            m.at_index(Range::new(1, i64::MAX)),
            Err(MatrixError::InvalidIndex { index: 5, extent: 4 })
        ));
        let descending = Range::with_second(2, 1, i64::MIN).unwrap();
        assert!(matches!(
            m.at_index(&Variant::Range(descending)),
            Err(MatrixError::InvalidIndex { index: 0, extent: 4 })
        ));
    }

    #[test]
    fn test_non_integral_arguments() {
        let m = sample();
        assert!(matches!(
            m.at(1.5_f64, 1),
            Err(MatrixError::InvalidParameterValue(_))
        ));
        assert!(matches!(
            m.at(Complex64::new(1.0, 1.0), 1),
            Err(MatrixError::InvalidParameterValue(_))
        ));
        assert!(matches!(
            m.at(&Variant::Boolean(true), 1),
            Err(MatrixError::InvalidParameterValue(_))
        ));
        let mut nested = Tuple::new();
        nested.push(Variant::Range(Range::new(1, 2)));
        assert!(matches!(
            m.at(&nested, 1),
            Err(MatrixError::InvalidParameterValue(_))
        ));
    }
}

// ============================================================
// Shapes
// ============================================================

mod shape_tests {
    use super::*;

    #[test]
    fn test_scalar_pair_is_scalar() {
        let m = sample();
        assert!(matches!(m.at(2, 1).unwrap(), Selection::Scalar(4)));
        assert_eq!(m.at(2.0_f64, 3_i64).unwrap().scalar(), Some(6));
    }

    #[test]
    fn test_row_sequence_with_scalar_column() {
        let m = sample();
        let sub = matrix(m.at(Range::new(1, 2), 2).unwrap());
        assert_eq!(sub.shape(), (2, 1));
        assert_eq!(sub.to_column_major(), vec![2, 5]);
    }

    #[test]
    fn test_scalar_row_with_column_sequence() {
        let m = sample();
        let sub = matrix(m.at(2, vec![3_i64, 1]).unwrap());
        assert_eq!(sub.shape(), (1, 2));
        assert_eq!(sub.to_column_major(), vec![6, 4]);
    }

    #[test]
    fn test_sequence_pair_gathers_in_order() {
        let m = sample();
        let rows = Range::with_second(2, 1, 1).unwrap();
        let mut cols = Set::new();
        cols.insert(3_i64);
        cols.insert(1_i64);
        let sub = matrix(m.at(&rows, &cols).unwrap());
        assert_eq!(sub, IntegerMatrix::from_rows(&[[6, 4], [3, 1]]).unwrap());
    }

    #[test]
    fn test_repeated_indices_repeat() {
        let m = sample();
        let sub = matrix(m.at(vec![1_i64, 1], vec![2_i64, 2]).unwrap());
        assert_eq!(sub, IntegerMatrix::from_rows(&[[2, 2], [2, 2]]).unwrap());
    }

    #[test]
    fn test_matrix_of_indices_reads_column_major() {
        let m = sample();
        let picks = IntegerMatrix::from_rows(&[[1, 3], [2, 1]]).unwrap();
        let sub = matrix(m.at(1, &picks).unwrap());
        assert_eq!(sub.to_column_major(), vec![1, 2, 3, 1]);
    }

    #[test]
    fn test_boolean_matrix_indices() {
        let m = sample();
        let ones = BooleanMatrix::ones(1, 2);
        let sub = matrix(m.at(&ones, 2).unwrap());
        assert_eq!(sub.to_column_major(), vec![2, 2]);
        let zeros = BooleanMatrix::zero(1, 1);
        assert!(matches!(
            m.at(&zeros, 1),
            Err(MatrixError::InvalidRow { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_sequence_selects_empty() {
        let m = sample();
        let none = Range::new(3, 2);
        assert!(none.is_empty());
        let sub = matrix(m.at(&none, 1).unwrap());
        assert_eq!(sub.shape(), (0, 1));
    }

    #[test]
    fn test_selection_into_variant() {
        let m = sample();
        let v: Variant = m.at(1, vec![1_i64, 2]).unwrap().into();
        assert!(matches!(v, Variant::MatrixInteger(_)));
        let s: Variant = m.at(1, 1).unwrap().into();
        assert!(matches!(s, Variant::Integer(1)));
    }

    #[test]
    fn test_selectors_are_public() {
        assert_eq!(
            Range::new(1, 3).selector().unwrap(),
            numrt_matrix::Selector::Range(Range::new(1, 3))
        );
    }
}

// ============================================================
// Single index
// ============================================================

mod single_index_tests {
    use super::*;

    #[test]
    fn test_row_major_order() {
        let m = sample();
        let values: Vec<i64> = (1..=6).map(|k| m.value_at(k).unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_honors_pending_transpose() {
        let t = sample().transpose();
        assert_eq!(t.value_at(2).unwrap(), 4);
        assert_eq!(t.at_index(3).unwrap().scalar(), Some(2));
    }

    #[test]
    fn test_sequence_shape_follows_source() {
        let row = IntegerMatrix::from_rows(&[[7, 8, 9]]).unwrap();
        let picked = matrix(row.at_index(vec![3_i64, 1]).unwrap());
        assert_eq!(picked.shape(), (1, 2));
        assert_eq!(picked.to_column_major(), vec![9, 7]);

        let m = sample();
        let picked = matrix(m.at_index(Range::new(4, 6)).unwrap());
        assert_eq!(picked.shape(), (3, 1));
        assert_eq!(picked.to_column_major(), vec![4, 5, 6]);
    }

    #[test]
    fn test_column_vector_is_linear() {
        let col = RealMatrix::from_rows(&[[1.5], [2.5], [3.5]]).unwrap();
        assert_eq!(col.value_at(3).unwrap(), 3.5);
        assert!(col.value_at(4).is_err());
    }
}
