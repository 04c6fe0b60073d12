//! Galois Field (GF(2^8)) Arithmetic Tests
//!
//! Field laws checked exhaustively where 256 × 256 is cheap enough.

use rs256::reed_solomon::galois::{
    all_possible_polynomials, generate_exp_table, generate_log_table, GaloisTable,
    GENERATING_POLYNOMIAL,
};
use rs256::reed_solomon::{Galois8, RsError};

fn all_elements() -> impl Iterator<Item = Galois8> {
    (0..=255u8).map(Galois8::new)
}

// ============================================================================
// Field Laws
// ============================================================================

#[test]
fn test_addition_is_xor_and_self_inverse() {
    for a in all_elements() {
        assert_eq!(a + a, Galois8::ZERO);
        assert_eq!(a - a, Galois8::ZERO);
        assert_eq!(a + Galois8::ZERO, a);
    }
    assert_eq!((Galois8::new(5) + Galois8::new(3)).value(), 6);
}

#[test]
fn test_multiplication_commutes() {
    for a in all_elements() {
        for b in all_elements() {
            assert_eq!(a * b, b * a);
        }
    }
}

#[test]
fn test_distributive_law() {
    let samples = [0u8, 1, 2, 3, 29, 77, 128, 200, 255];
    for &a in &samples {
        for &b in &samples {
            for c in all_elements() {
                let (a, b) = (Galois8::new(a), Galois8::new(b));
                assert_eq!(a * (b + c), a * b + a * c);
            }
        }
    }
}

#[test]
fn test_division_undoes_multiplication() {
    for a in all_elements() {
        for b in all_elements().filter(|b| !b.is_zero()) {
            assert_eq!((a * b).checked_div(b).unwrap(), a);
        }
    }
}

#[test]
fn test_division_by_zero() {
    for a in all_elements() {
        assert_eq!(a.checked_div(Galois8::ZERO), Err(RsError::DivisionByZero));
    }
}

#[test]
fn test_every_nonzero_element_has_inverse() {
    for a in all_elements().filter(|a| !a.is_zero()) {
        assert_eq!(a * a.inverse().unwrap(), Galois8::ONE);
    }
    assert_eq!(Galois8::ZERO.inverse(), Err(RsError::DivisionByZero));
}

#[test]
fn test_pow_matches_repeated_multiplication() {
    for a in all_elements() {
        let mut expected = Galois8::ONE;
        for n in 0..10 {
            assert_eq!(a.pow(n), expected, "{}^{}", a, n);
            expected *= a;
        }
    }
    assert_eq!(Galois8::new(2).pow(255), Galois8::ONE);
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_exp_table_inverts_log_table() {
    let table = GaloisTable::global();
    for a in 1..=255u8 {
        assert_eq!(table.exp[table.log[a as usize] as usize], a);
    }
}

#[test]
fn test_generated_tables_match_global() {
    let log = generate_log_table(GENERATING_POLYNOMIAL).unwrap();
    let exp = generate_exp_table(&log);
    let table = GaloisTable::global();
    assert_eq!(log, table.log);
    assert_eq!(exp, table.exp);
}

#[test]
fn test_all_possible_polynomials() {
    let polynomials = all_possible_polynomials();
    assert_eq!(
        polynomials,
        vec![29, 43, 45, 77, 95, 99, 101, 105, 113, 135, 141, 169, 195, 207, 231, 245]
    );
    for polynomial in polynomials {
        assert!(GaloisTable::new(polynomial).is_ok());
    }
}

#[test]
fn test_non_generating_polynomial_rejected() {
    assert_eq!(
        generate_log_table(1).unwrap_err(),
        RsError::InvalidPolynomial(1)
    );
}
