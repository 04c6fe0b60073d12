//! Galois Field GF(2^8) arithmetic for Reed-Solomon erasure coding
//!
//! ## Generating polynomial
//!
//! The field is built from the generating polynomial **29** (0x11D once the
//! implicit x⁸ term is added: x⁸ + x⁴ + x³ + x² + 1). Any of the sixteen
//! primitive polynomials returned by [`all_possible_polynomials`] would give
//! a valid field, but the choice changes every parity byte, so it is fixed
//! for the lifetime of the process.
//!
//! ## Tables
//!
//! Multiplication and division go through a logarithm table and an
//! antilogarithm ("exp") table. The exp table is stored twice over
//! (510 entries) so `log[a] + log[b]` can index it directly without a modulo
//! in the multiply path.

use super::error::{Result, RsError};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::OnceLock;

/// Number of elements in the field
pub const FIELD_SIZE: usize = 256;

/// Generating polynomial for the process-wide field (low 8 bits of 0x11D)
pub const GENERATING_POLYNOMIAL: u8 = 29;

/// Order of the multiplicative group
const LIMIT: usize = FIELD_SIZE - 1;

/// Length of the doubled exp table
pub const EXP_TABLE_SIZE: usize = LIMIT * 2;

/// Walk the multiplicative group by repeated doubling and record the
/// exponent at which each nonzero element first appears.
///
/// Fails with [`RsError::InvalidPolynomial`] when an element comes round a
/// second time, which means `polynomial` is not primitive.
pub fn generate_log_table(polynomial: u8) -> Result<[u8; FIELD_SIZE]> {
    let mut log = [0u8; FIELD_SIZE];
    let mut seen = [false; FIELD_SIZE];

    let mut b = 1usize;
    for l in 0..LIMIT {
        if seen[b] {
            return Err(RsError::InvalidPolynomial(polynomial));
        }
        seen[b] = true;
        log[b] = l as u8;

        b <<= 1;
        if b >= FIELD_SIZE {
            b = (b - FIELD_SIZE) ^ polynomial as usize;
        }
    }

    Ok(log)
}

/// Build the antilog table from a log table, duplicated across
/// `0..255` and `255..510`.
pub fn generate_exp_table(log_table: &[u8; FIELD_SIZE]) -> [u8; EXP_TABLE_SIZE] {
    let mut exp = [0u8; EXP_TABLE_SIZE];
    for (value, &log) in log_table.iter().enumerate().skip(1) {
        exp[log as usize] = value as u8;
        exp[log as usize + LIMIT] = value as u8;
    }
    exp
}

/// Every polynomial that generates a field of 256 elements.
///
/// Not used by the codec, which is fixed to [`GENERATING_POLYNOMIAL`].
pub fn all_possible_polynomials() -> Vec<u8> {
    (0..=u8::MAX)
        .filter(|&p| generate_log_table(p).is_ok())
        .collect()
}

/// Galois Field lookup tables for fast arithmetic
pub struct GaloisTable {
    pub log: [u8; FIELD_SIZE],
    pub exp: [u8; EXP_TABLE_SIZE],
}

impl GaloisTable {
    /// Build log/exp tables for the given generating polynomial
    pub fn new(polynomial: u8) -> Result<Self> {
        let log = generate_log_table(polynomial)?;
        let exp = generate_exp_table(&log);
        Ok(Self { log, exp })
    }

    /// Process-wide tables for [`GENERATING_POLYNOMIAL`], built on first use
    pub fn global() -> &'static GaloisTable {
        static TABLE: OnceLock<GaloisTable> = OnceLock::new();
        TABLE.get_or_init(|| match GaloisTable::new(GENERATING_POLYNOMIAL) {
            Ok(table) => table,
            Err(e) => panic!("Built-in generating polynomial rejected: {e}"),
        })
    }
}

/// Galois Field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Galois8(u8);

impl Galois8 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Computes `self` multiplied by itself `exponent` times.
    ///
    /// `x⁰` is 1 for every `x`, including zero.
    pub fn pow(self, exponent: usize) -> Self {
        if exponent == 0 {
            return Self::ONE;
        }
        if self.is_zero() {
            return Self::ZERO;
        }

        let table = GaloisTable::global();
        let log = table.log[self.0 as usize] as usize;
        Self(table.exp[(log * (exponent % LIMIT)) % LIMIT])
    }

    /// Division that reports a zero divisor instead of panicking
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            return Err(RsError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Self::ZERO);
        }

        let table = GaloisTable::global();
        let log_diff = (table.log[self.0 as usize] as usize + LIMIT
            - table.log[rhs.0 as usize] as usize)
            % LIMIT;
        Ok(Self(table.exp[log_diff]))
    }

    /// Multiplicative inverse
    #[inline]
    pub fn inverse(self) -> Result<Self> {
        Self::ONE.checked_div(self)
    }
}

// Addition (XOR in Galois fields)
impl Add for Galois8 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for Galois8 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

// Subtraction (same as addition in GF(2^n))
impl Sub for Galois8 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl SubAssign for Galois8 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

// Multiplication using log tables
impl Mul for Galois8 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }

        let table = GaloisTable::global();
        let log_sum = table.log[self.0 as usize] as usize + table.log[rhs.0 as usize] as usize;
        Self(table.exp[log_sum])
    }
}

impl MulAssign for Galois8 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// Division using log tables; panics on a zero divisor like integer `/`
impl Div for Galois8 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        match self.checked_div(rhs) {
            Ok(quotient) => quotient,
            Err(_) => panic!("Division by zero in Galois field"),
        }
    }
}

impl DivAssign for Galois8 {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// Conversion traits
impl From<u8> for Galois8 {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Galois8> for u8 {
    fn from(val: Galois8) -> Self {
        val.0
    }
}

impl std::fmt::Display for Galois8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
