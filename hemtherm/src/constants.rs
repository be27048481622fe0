// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Unit conversions and reference values used when reading device files and material tables

pub const NANOMETRE: f64 = 1e-9; // Metres in a nanometre
pub const MICROMETRE: f64 = 1e-6; // Metres in a micrometre
pub const REFERENCE_TEMPERATURE: f64 = 300.0; // Temperature at which material parameters are tabulated, in K
pub const MINIMUM_TEMPERATURE: f64 = 200.0; // Lower bound of the validated material range, in K
pub const MAXIMUM_TEMPERATURE: f64 = 900.0; // Upper bound of the validated material range, in K
pub const TWO_DEG_OFFSET: f64 = 1.5; // Depth of the 2DEG below the barrier, in nm
pub const CURRENT_EXPONENT: f64 = 1.5; // Default exponent of the drain current degradation with temperature
