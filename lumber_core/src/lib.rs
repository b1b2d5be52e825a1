//! # lumber_core - Dimension Lumber Design Values
//!
//! `lumber_core` computes adjusted allowable design values for visually
//! graded dimension lumber per the NDS for Wood Construction: species/grade
//! reference tables, the piecewise-linear size and flat-use factor curves of
//! NDS Supplement Table 4A, and the rules that combine wet service, flat use,
//! size, repetitive member and bearing area factors.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: adjustment operations are pure functions
//! - **SI inside**: metres, pascals and kg/m³; psi only at the table edges
//! - **Rich Errors**: structured error types, never silent defaults
//! - **Extensible**: new species are data, see [`materials::custom`]
//!
//! ## Quick Start
//!
//! ```rust
//! use lumber_core::adjustment::adjusted_design_values;
//! use lumber_core::materials::{LumberMaterial, LumberSize, Orientation};
//! use lumber_core::nds_factors::WetService;
//!
//! let joist = LumberMaterial::southern_pine("no_2", "", WetService::Dry).unwrap();
//! let (b, h) = LumberSize::L2x10.section_m(Orientation::Edge);
//! let values = adjusted_design_values(&joist, b, h, 1.15, 1.0).unwrap();
//!
//! println!("{}", values.format_report());
//! ```
//!
//! ## Modules
//!
//! - [`adjustment`] - Adjusted design value operations
//! - [`materials`] - Species tables, grades and the lumber material
//! - [`nds_factors`] - Wet service factors and the size factor curves
//! - [`curve`] - Piecewise-linear interpolation
//! - [`config`] - TOML configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod adjustment;
pub mod config;
pub mod curve;
pub mod errors;
pub mod materials;
pub mod nds_factors;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use adjustment::{
    adjusted_bending_value, adjusted_compression_parallel_value,
    adjusted_compression_perpendicular_value, adjusted_design_values, adjusted_minimum_modulus,
    adjusted_modulus_of_elasticity, adjusted_shear_value, adjusted_tension_value,
    AdjustedDesignValues,
};
pub use config::DesignConfig;
pub use errors::{LumberError, LumberResult};
pub use materials::{GradeFamily, LumberMaterial, ReferenceValueProvider, Species, SubGrade};
pub use nds_factors::WetService;
