// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Hemtherm is a finite volume thermal solver for GaN high electron mobility transistors
//!
//! # Overview
//! Hemtherm estimates the junction temperature, thermal resistance and heat distribution of a
//! HEMT from its layer stack. The device is meshed on a structured rectilinear grid, refined
//! towards the gate and towards the top of each layer, and the heat equation is discretised with
//! a cell centred finite volume scheme. The conductivity of each layer depends on temperature,
//! so the steady problem is solved by fixed point iteration on a sequence of linear problems.
//!
//! Transient operation is modelled with explicit or implicit Euler stepping of a pulsed source,
//! and an electro-thermal loop feeds the junction temperature back into the dissipated power.
//!
//! # Usage
//! Hemtherm is distributed as a binary crate, and is intended to be run from the command line. To run the software first define
//! a structure in a `.toml` file:
//!
//! ```toml
//! name = "GaN slab"
//!
//! [dimensions]
//! device_length = 10.0
//! gate_width = 10.0
//!
//! [gate]
//! position = 0.0
//! length = 10.0
//! heat_depth = 50.0
//!
//! [operating_point]
//! power = 1.0
//!
//! [boundaries]
//! bottom = { type = "isothermal", temperature = 300.0 }
//!
//! [[layers]]
//! name = "Channel"
//! material = "GaN"
//! thickness = 300000.0
//! layer_type = "channel"
//! ```
//!
//! where layers are listed from the bottom of the substrate to the top surface.

#![allow(clippy::type_complexity)]

/// The command line global application, tracing and display primitives
pub mod app;

/// Physical constants
mod constants;

/// Device and geometry
pub mod device;

/// Error handling
pub mod error;

/// Computes quantities of interest from a solved temperature field
pub mod postprocessor;

/// The finite volume heat conduction solver
pub mod thermal;
