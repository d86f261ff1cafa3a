//! # qubosat - Solving Quadratic Models with MaxSAT Solvers
//!
//! `qubosat` reduces quadratic unconstrained binary optimization (QUBO) and
//! Ising models to weighted partial MaxSAT instances, hands them to a MaxSAT
//! solver and decodes the solver's assignment into a sample of the original
//! model.
//!
//! The two central pieces are the [encoder](encodings::quadratic) that
//! quantizes real coefficients into integer clause weights and the
//! [decoder](decoding) that maps the boolean assignment back to model values.
//! [`sampler::Sampler`] ties both together with a [solver](solvers).
//!
//! ## Example
//!
//! ```
//! use qubosat::{
//!     encodings::Precision,
//!     instances::QuadraticModel,
//!     sampler::{Options, Sampler},
//!     solvers::exhaustive,
//!     types::Vartype,
//! };
//!
//! let mut model = QuadraticModel::new(2, Vartype::Binary);
//! model.add_linear(0, -1.0).unwrap();
//! model.add_linear(1, -1.0).unwrap();
//! model.add_quadratic(0, 1, 3.0).unwrap();
//!
//! let mut sampler = Sampler::new(
//!     exhaustive::Solver::default(),
//!     Options { precision: Precision::Auto },
//! );
//! let sample = sampler.sample(&model).unwrap();
//! assert_eq!(sample.energy, -1.0);
//! ```
//!
//! ## Features
//!
//! | Feature name | Description |
//! | --- | --- |
//! | `fxhash` | Use the faster firefox hash function from `rustc-hash` in `qubosat`. |
//! | `compression` | Enable parsing and writing compressed WCNF files. |
//! | `serde` | Serialization of variable domains and samples. |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! Currently, the MSRV of `qubosat` is 1.76.0.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod decoding;
pub mod encodings;
pub mod instances;
pub mod labels;
pub mod sampler;
pub mod solvers;
pub mod types;
