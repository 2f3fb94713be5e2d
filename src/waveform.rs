//! Scaling raw waveform bytes into time/voltage samples.
//!
//! `:WAVeform:PREamble?` answers with ten comma-separated numbers in a fixed
//! order (format, type, points, count, x increment, x origin, x reference,
//! y increment, y origin, y reference). The order is not self-describing; the
//! index constants below are the instrument's contract.

use serde::Serialize;

use crate::error::{Error, Result};

pub const PREAMBLE_LEN: usize = 10;

pub const POINTS: usize = 2;
pub const X_INCREMENT: usize = 4;
pub const X_ORIGIN: usize = 5;
pub const Y_INCREMENT: usize = 7;
pub const Y_ORIGIN: usize = 8;
pub const Y_REFERENCE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preamble {
    values: [f64; PREAMBLE_LEN],
}

impl Preamble {
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.len() != PREAMBLE_LEN {
            return Err(Error::Preamble(values.len()));
        }
        let mut fields = [0.0; PREAMBLE_LEN];
        fields.copy_from_slice(values);
        Ok(Self { values: fields })
    }

    pub fn x_increment(&self) -> f64 {
        self.values[X_INCREMENT]
    }
    pub fn x_origin(&self) -> f64 {
        self.values[X_ORIGIN]
    }
    pub fn y_increment(&self) -> f64 {
        self.values[Y_INCREMENT]
    }
    pub fn y_origin(&self) -> f64 {
        self.values[Y_ORIGIN]
    }
    pub fn y_reference(&self) -> f64 {
        self.values[Y_REFERENCE]
    }

    /// Number of points the instrument says it will transfer.
    pub fn points(&self) -> f64 {
        self.values[POINTS]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub voltage: f64,
}

/// Converts a raw byte block into samples, one per byte.
///
/// Time runs forward through the block while the voltage for time index `i`
/// is taken from byte `len - 1 - i`: the first sample uses the last byte
/// received. Downstream consumers rely on this ordering.
pub fn convert(preamble: &Preamble, block: &[u8]) -> Vec<Sample> {
    let count = block.len();
    let x_inc = preamble.x_increment();
    let x_org = preamble.x_origin();
    let y_inc = preamble.y_increment();
    let y_org = preamble.y_origin();
    let y_ref = preamble.y_reference();

    (0..count)
        .map(|i| Sample {
            time: x_org + i as f64 * x_inc,
            voltage: (y_ref - block[count - 1 - i] as f64) * y_inc - y_org,
        })
        .collect()
}
