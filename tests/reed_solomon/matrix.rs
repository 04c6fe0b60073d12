//! Matrix Algebra Tests
//!
//! Inversion, products and the error cases of the GF(256) matrix type.

use rs256::reed_solomon::{Galois8, Matrix, RsError};

#[test]
fn test_identity_and_zero() {
    let identity = Matrix::identity(3);
    assert_eq!(identity.dimensions(), (3, 3));
    for r in 0..3 {
        for c in 0..3 {
            let expected = if r == c { Galois8::ONE } else { Galois8::ZERO };
            assert_eq!(identity.get(r, c).unwrap(), expected);
        }
    }
    assert_eq!(Matrix::zero(2, 5).row(1).unwrap(), &[Galois8::ZERO; 5]);
}

#[test]
fn test_multiply_by_identity() {
    let m = Matrix::from_rows(&[[1u8, 2, 3], [4, 5, 6]]).unwrap();
    assert_eq!(m.multiply(&Matrix::identity(3)).unwrap(), m);
    assert_eq!(Matrix::identity(2).multiply(&m).unwrap(), m);
}

#[test]
fn test_multiply_known_product() {
    let left = Matrix::from_rows(&[[1u8, 2], [3, 4]]).unwrap();
    let right = Matrix::from_rows(&[[5u8, 6], [7, 8]]).unwrap();
    let expected = Matrix::from_rows(&[[11u8, 22], [19, 42]]).unwrap();
    assert_eq!(left.multiply(&right).unwrap(), expected);
}

#[test]
fn test_double_inversion() {
    let m = Matrix::from_rows(&[[56u8, 23, 98], [3, 100, 200], [45, 201, 123]]).unwrap();
    let inverse = m.invert().unwrap();
    assert_eq!(m.multiply(&inverse).unwrap(), Matrix::identity(3));
    assert_eq!(inverse.invert().unwrap(), m);
}

#[test]
fn test_inversion_with_zero_pivot() {
    // Leading zero forces a row swap
    let m = Matrix::from_rows(&[[0u8, 1, 0], [1, 0, 0], [0, 0, 7]]).unwrap();
    let inverse = m.invert().unwrap();
    assert_eq!(inverse.multiply(&m).unwrap(), Matrix::identity(3));
}

#[test]
fn test_singular_matrix() {
    let m = Matrix::from_rows(&[[1u8, 0, 0], [0, 0, 0], [0, 0, 1]]).unwrap();
    assert_eq!(m.invert(), Err(RsError::Singular));

    // Second row is twice the first
    let m = Matrix::from_rows(&[[1u8, 2], [2, 4]]).unwrap();
    assert_eq!(m.invert(), Err(RsError::Singular));
}

#[test]
fn test_non_square_inversion() {
    let m = Matrix::zero(2, 3);
    assert_eq!(m.invert(), Err(RsError::NotSquare { rows: 2, cols: 3 }));
}

#[test]
fn test_dimension_mismatch() {
    let a = Matrix::zero(2, 3);
    let b = Matrix::zero(2, 3);
    assert!(matches!(a.multiply(&b), Err(RsError::DimensionMismatch { .. })));
    assert!(matches!(
        a.augment(&Matrix::zero(3, 1)),
        Err(RsError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_augment_and_submatrix() {
    let left = Matrix::from_rows(&[[1u8, 2], [3, 4]]).unwrap();
    let right = Matrix::from_rows(&[[5u8], [6]]).unwrap();
    let joined = left.augment(&right).unwrap();
    assert_eq!(joined, Matrix::from_rows(&[[1u8, 2, 5], [3, 4, 6]]).unwrap());
    assert_eq!(joined.submatrix(0, 0, 2, 2).unwrap(), left);
    assert_eq!(joined.submatrix(0, 2, 2, 3).unwrap(), right);
    assert!(joined.submatrix(0, 0, 3, 3).is_err());
    assert!(joined.submatrix(1, 2, 0, 3).is_err());
}

#[test]
fn test_out_of_range_access() {
    let mut m = Matrix::zero(2, 2);
    assert_eq!(
        m.get(2, 0),
        Err(RsError::IndexOutOfRange { row: 2, col: 0, rows: 2, cols: 2 })
    );
    assert!(m.set(0, 2, Galois8::ONE).is_err());
    assert!(m.row(5).is_err());
    assert!(m.swap_rows(0, 2).is_err());
}

#[test]
fn test_swap_rows() {
    let mut m = Matrix::from_rows(&[[1u8, 2], [3, 4]]).unwrap();
    m.swap_rows(0, 1).unwrap();
    assert_eq!(m, Matrix::from_rows(&[[3u8, 4], [1, 2]]).unwrap());
}

#[test]
fn test_ragged_rows_rejected() {
    let rows: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
    assert!(matches!(
        Matrix::from_rows(&rows),
        Err(RsError::InvalidArgument(_))
    ));
}

#[test]
fn test_display_formats() {
    let m = Matrix::from_rows(&[[1u8, 2], [3, 255]]).unwrap();
    assert_eq!(m.to_string(), "[[1, 2], [3, 255]]");
    assert_eq!(m.to_hex_string(), "01 02\n03 ff\n");
}
