//! # Materials Database
//!
//! Reference design values for visually graded dimension lumber
//! (NDS Supplement Table 4A) and the material entity the adjustment engine
//! works on.
//!
//! ## Species
//!
//! - **Southern Pine**: width-graduated Fb, Ft and Fc (SPIB metric tables)
//! - **Spruce-Pine-Fir**: constant values per grade
//! - **Tabulated**: any species loaded from a TOML table, see [`custom`]
//!
//! Every species is a [`ReferenceValueProvider`]; the adjustment engine only
//! ever talks to that capability.
//!
//! ## Example
//!
//! ```rust
//! use lumber_core::materials::{GradeFamily, LumberMaterial, Species, SubGrade};
//! use lumber_core::nds_factors::WetService;
//!
//! let sp = LumberMaterial::new(
//!     &Species::SouthernPine,
//!     GradeFamily::No2,
//!     SubGrade::None,
//!     WetService::Dry,
//! )
//! .unwrap();
//! assert_eq!(sp.reference_values().fv, 1.2e6);
//! ```

pub mod custom;
pub mod lumber;
pub mod lumber_sizes;
pub mod southern_pine;
pub mod spruce_pine_fir;

pub use custom::TabulatedSpecies;
pub use lumber::{LumberMaterial, SolvedMaterial};
pub use lumber_sizes::{LumberSize, Orientation};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::curve::PiecewiseLinearCurve;
use crate::errors::{LumberError, LumberResult};
use crate::units::{Inches, Meters};

/// Density shared by the built-in species tables (kg/m³)
pub const DIMENSION_LUMBER_DENSITY: f64 = (657.0 + 577.0) / 2.0;

/// Poisson ratio shared by the built-in species tables
pub const DIMENSION_LUMBER_POISSON_RATIO: f64 = 0.2;

// ============================================================================
// Grades
// ============================================================================

/// Grade families of NDS Table 4A dimension lumber.
///
/// Determines which size-factor curve set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeFamily {
    /// Select Structural
    #[serde(rename = "structural")]
    Structural,
    /// No. 1
    #[serde(rename = "no_1")]
    No1,
    /// No. 2
    #[serde(rename = "no_2")]
    No2,
    /// No. 3
    #[serde(rename = "no_3")]
    No3,
    /// Stud
    #[serde(rename = "stud")]
    Stud,
}

impl GradeFamily {
    /// All grade families
    pub const ALL: [GradeFamily; 5] = [
        GradeFamily::Structural,
        GradeFamily::No1,
        GradeFamily::No2,
        GradeFamily::No3,
        GradeFamily::Stud,
    ];

    /// Canonical code ("structural", "no_1", ...)
    pub fn code(&self) -> &'static str {
        match self {
            GradeFamily::Structural => "structural",
            GradeFamily::No1 => "no_1",
            GradeFamily::No2 => "no_2",
            GradeFamily::No3 => "no_3",
            GradeFamily::Stud => "stud",
        }
    }

    /// Parse from common string representations ("no_1", "No.1", "#1", "SS")
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '.', '#', '_', '-'], "").as_str() {
            "structural" | "ss" | "selectstructural" | "selstr" => Some(GradeFamily::Structural),
            "no1" | "1" | "n1" => Some(GradeFamily::No1),
            "no2" | "2" | "n2" => Some(GradeFamily::No2),
            "no3" | "3" | "n3" => Some(GradeFamily::No3),
            "stud" => Some(GradeFamily::Stud),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GradeFamily::Structural => "Select Structural",
            GradeFamily::No1 => "No. 1",
            GradeFamily::No2 => "No. 2",
            GradeFamily::No3 => "No. 3",
            GradeFamily::Stud => "Stud",
        }
    }

    /// Stud grade uses its own size-factor curves
    pub fn is_stud(&self) -> bool {
        matches!(self, GradeFamily::Stud)
    }
}

impl std::fmt::Display for GradeFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Density sub-grade. Only some species publish dense/non-dense values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum SubGrade {
    /// No sub-grade ("")
    #[default]
    #[serde(rename = "")]
    None,
    /// Dense
    #[serde(rename = "dense")]
    Dense,
    /// Non-dense
    #[serde(rename = "non_dense")]
    NonDense,
}

impl SubGrade {
    /// All sub-grades
    pub const ALL: [SubGrade; 3] = [SubGrade::None, SubGrade::Dense, SubGrade::NonDense];

    /// Canonical code ("", "dense", "non_dense")
    pub fn code(&self) -> &'static str {
        match self {
            SubGrade::None => "",
            SubGrade::Dense => "dense",
            SubGrade::NonDense => "non_dense",
        }
    }

    /// Parse a canonical code, ignoring case. Anything else is `None`.
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sub| sub.code().eq_ignore_ascii_case(s))
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SubGrade::None => "",
            SubGrade::Dense => "Dense",
            SubGrade::NonDense => "Non-Dense",
        }
    }
}

impl std::fmt::Display for SubGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tabulated Values
// ============================================================================

/// Length unit a width-graduated table is keyed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableUnit {
    /// Metres
    #[default]
    #[serde(alias = "m")]
    Meters,
    /// Inches
    #[serde(alias = "in")]
    Inches,
}

impl TableUnit {
    /// Convert a length in metres into this unit
    pub fn from_meters(&self, length_m: f64) -> f64 {
        match self {
            TableUnit::Meters => length_m,
            TableUnit::Inches => Inches::from(Meters(length_m)).0,
        }
    }
}

/// A reference value that is either constant or graduated by member width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabulatedValue {
    /// Same value for every width
    Constant(f64),
    /// Interpolated over width breakpoints in `unit`
    WidthGraduated {
        unit: TableUnit,
        curve: PiecewiseLinearCurve,
    },
}

impl TabulatedValue {
    /// Tabulated value for a member whose wider face measures `width_m`
    pub fn at(&self, width_m: f64) -> LumberResult<f64> {
        match self {
            TabulatedValue::Constant(v) => Ok(*v),
            TabulatedValue::WidthGraduated { unit, curve } => {
                curve.evaluate(unit.from_meters(width_m))
            }
        }
    }

    /// True when the value depends on width
    pub fn is_width_graduated(&self) -> bool {
        matches!(self, TabulatedValue::WidthGraduated { .. })
    }
}

/// Unadjusted reference design values for one species/grade/sub-grade (Pa).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDesignValues {
    /// Bending Fb
    pub fb: TabulatedValue,
    /// Tension parallel to grain Ft
    pub ft: TabulatedValue,
    /// Shear parallel to grain Fv
    pub fv: f64,
    /// Compression perpendicular to grain Fc_perp
    pub fct: f64,
    /// Compression parallel to grain Fc
    pub fc: TabulatedValue,
    /// Modulus of elasticity E
    pub e: f64,
    /// Minimum modulus of elasticity Emin
    pub emin: f64,
}

impl ReferenceDesignValues {
    /// Evaluate every value for a member whose wider face measures `width_m`
    pub fn at_width(&self, width_m: f64) -> LumberResult<ReferenceValuesAt> {
        Ok(ReferenceValuesAt {
            width_m,
            fb: self.fb.at(width_m)?,
            ft: self.ft.at(width_m)?,
            fv: self.fv,
            fct: self.fct,
            fc: self.fc.at(width_m)?,
            e: self.e,
            emin: self.emin,
        })
    }
}

/// Reference values evaluated at a member width (Pa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValuesAt {
    /// Width the values were evaluated at (m)
    pub width_m: f64,
    pub fb: f64,
    pub ft: f64,
    pub fv: f64,
    pub fct: f64,
    pub fc: f64,
    pub e: f64,
    pub emin: f64,
}

// ============================================================================
// Grade Tables
// ============================================================================

/// Grade/sub-grade keyed records of one species.
///
/// Aliased grades hold the same `Arc` as their target, so corrections to the
/// target record are seen through the alias.
#[derive(Debug, Clone, Default)]
pub struct GradeTable {
    entries: BTreeMap<(GradeFamily, SubGrade), Arc<ReferenceDesignValues>>,
}

impl GradeTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. A duplicate key is a configuration error.
    pub fn insert(
        &mut self,
        grade: GradeFamily,
        sub_grade: SubGrade,
        values: ReferenceDesignValues,
    ) -> LumberResult<Arc<ReferenceDesignValues>> {
        let values = Arc::new(values);
        self.insert_shared(grade, sub_grade, Arc::clone(&values))?;
        Ok(values)
    }

    /// Make `(grade, sub_grade)` share the record of `(target, target_sub)`
    pub fn alias(
        &mut self,
        grade: GradeFamily,
        sub_grade: SubGrade,
        target: GradeFamily,
        target_sub: SubGrade,
    ) -> LumberResult<()> {
        let shared = self.get(target, target_sub).ok_or_else(|| {
            LumberError::config(format!(
                "alias {}{} refers to missing grade {}{}",
                grade.code(),
                sub_suffix(sub_grade),
                target.code(),
                sub_suffix(target_sub)
            ))
        })?;
        self.insert_shared(grade, sub_grade, shared)
    }

    fn insert_shared(
        &mut self,
        grade: GradeFamily,
        sub_grade: SubGrade,
        values: Arc<ReferenceDesignValues>,
    ) -> LumberResult<()> {
        if self.entries.contains_key(&(grade, sub_grade)) {
            return Err(LumberError::config(format!(
                "grade {}{} defined twice",
                grade.code(),
                sub_suffix(sub_grade)
            )));
        }
        self.entries.insert((grade, sub_grade), values);
        Ok(())
    }

    /// Record for a grade/sub-grade, if present
    pub fn get(
        &self,
        grade: GradeFamily,
        sub_grade: SubGrade,
    ) -> Option<Arc<ReferenceDesignValues>> {
        self.entries.get(&(grade, sub_grade)).cloned()
    }

    /// Every grade/sub-grade pair in the table
    pub fn keys(&self) -> Vec<(GradeFamily, SubGrade)> {
        self.entries.keys().copied().collect()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn sub_suffix(sub_grade: SubGrade) -> String {
    match sub_grade {
        SubGrade::None => String::new(),
        other => format!("/{}", other.code()),
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Capability of resolving a grade/sub-grade to one reference value record.
pub trait ReferenceValueProvider: Send + Sync {
    /// Species name ("SouthernPine", "SprucePineFir", ...)
    fn name(&self) -> &str;

    /// Density (kg/m³)
    fn density(&self) -> f64;

    /// Poisson ratio
    fn poisson_ratio(&self) -> f64;

    /// Accepted grade/sub-grade pairs. Fails when the species table itself
    /// could not be built.
    fn grades(&self) -> LumberResult<Vec<(GradeFamily, SubGrade)>>;

    /// Exactly one record for the pair, or [`LumberError::UnknownGrade`]
    fn reference_values(
        &self,
        grade: GradeFamily,
        sub_grade: SubGrade,
    ) -> LumberResult<Arc<ReferenceDesignValues>>;
}

/// Built-in species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Southern Pine (SPIB grading rules)
    #[serde(rename = "SP")]
    SouthernPine,
    /// Spruce-Pine-Fir (NDS Table 4A)
    #[serde(rename = "SPF")]
    SprucePineFir,
}

impl Species {
    /// All built-in species
    pub const ALL: [Species; 2] = [Species::SouthernPine, Species::SprucePineFir];

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> LumberResult<Self> {
        match s.to_uppercase().replace([' ', '_'], "-").as_str() {
            "SP" | "SOUTHERN-PINE" | "SOUTHERNPINE" => Ok(Species::SouthernPine),
            "SPF" | "SPRUCE-PINE-FIR" | "SPRUCEPINEFIR" => Ok(Species::SprucePineFir),
            _ => Err(LumberError::invalid_input(
                "species",
                s,
                "Unknown species (expected SP or SPF, or a loaded species table)",
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::SouthernPine => "Southern Pine",
            Species::SprucePineFir => "Spruce-Pine-Fir",
        }
    }

    /// The species as a `'static` provider
    pub fn provider(self) -> &'static dyn ReferenceValueProvider {
        match self {
            Species::SouthernPine => &Species::SouthernPine,
            Species::SprucePineFir => &Species::SprucePineFir,
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ReferenceValueProvider for Species {
    fn name(&self) -> &str {
        match self {
            Species::SouthernPine => southern_pine::NAME,
            Species::SprucePineFir => spruce_pine_fir::NAME,
        }
    }

    fn density(&self) -> f64 {
        DIMENSION_LUMBER_DENSITY
    }

    fn poisson_ratio(&self) -> f64 {
        DIMENSION_LUMBER_POISSON_RATIO
    }

    fn grades(&self) -> LumberResult<Vec<(GradeFamily, SubGrade)>> {
        match self {
            Species::SouthernPine => southern_pine::grades(),
            Species::SprucePineFir => spruce_pine_fir::grades(),
        }
    }

    fn reference_values(
        &self,
        grade: GradeFamily,
        sub_grade: SubGrade,
    ) -> LumberResult<Arc<ReferenceDesignValues>> {
        match self {
            Species::SouthernPine => southern_pine::reference_values(grade, sub_grade),
            Species::SprucePineFir => spruce_pine_fir::reference_values(grade, sub_grade),
        }
    }
}

/// Find a provider by name: built-in species first, then loaded tables.
pub fn find_provider<'a>(
    name: &str,
    tables: &'a [TabulatedSpecies],
) -> LumberResult<&'a dyn ReferenceValueProvider> {
    if let Ok(species) = Species::from_str_flexible(name) {
        return Ok(species.provider());
    }
    tables
        .iter()
        .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
        .map(|t| t as &dyn ReferenceValueProvider)
        .ok_or_else(|| {
            LumberError::invalid_input(
                "species",
                name,
                "Unknown species (expected SP, SPF, or a loaded species table)",
            )
        })
}
