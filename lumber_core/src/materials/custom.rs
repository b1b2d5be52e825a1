//! Species Tables Loaded From TOML
//!
//! Additional species are plain data: a TOML file lists the grades and their
//! reference values, and the resulting [`TabulatedSpecies`] is a
//! [`ReferenceValueProvider`] like the built-in species. The adjustment
//! engine needs no change to support it.
//!
//! ## Format
//!
//! ```toml
//! name = "HemFir"
//! density = 500.0
//! poisson_ratio = 0.2
//! stress_unit = "psi"          # "psi" or "pa" (default "pa")
//! width_unit = "in"            # unit of width_breakpoints, "m" or "in" (default "m")
//! width_breakpoints = [1.0, 3.5, 5.5, 7.25, 9.25, 11.25]
//!
//! [[grades]]
//! grade = "no_1"
//! fb = [975.0, 975.0, 850.0, 800.0, 725.0, 700.0]   # graduated by width
//! ft = 625.0
//! fv = 150.0
//! fct = 405.0
//! fc = 1350.0
//! e = 1.5e6
//! emin = 550e3
//!
//! [[grades]]
//! grade = "no_2"
//! alias_of = "no_1"            # shares the No. 1 record
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    GradeFamily, GradeTable, ReferenceDesignValues, ReferenceValueProvider, SubGrade, TableUnit,
    TabulatedValue, DIMENSION_LUMBER_POISSON_RATIO,
};
use crate::curve::PiecewiseLinearCurve;
use crate::errors::{LumberError, LumberResult};
use crate::units::psi;

/// Stress unit of the values in a species table file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StressUnit {
    /// Pascals
    #[default]
    Pa,
    /// Pounds per square inch
    Psi,
}

impl StressUnit {
    fn to_pascals(self, value: f64) -> f64 {
        match self {
            StressUnit::Pa => value,
            StressUnit::Psi => psi(value),
        }
    }
}

/// A value that is either a single number or one number per width breakpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    /// Same for every width
    Constant(f64),
    /// One value per entry of `width_breakpoints`
    Graduated(Vec<f64>),
}

/// One `[[grades]]` entry of a species table file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub grade: String,
    #[serde(default)]
    pub sub_grade: String,
    /// Share the record of another grade instead of listing values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
    #[serde(default)]
    pub alias_sub_grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fb: Option<ValueSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft: Option<ValueSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fc: Option<ValueSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emin: Option<f64>,
}

/// Raw contents of a species table file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTableFile {
    pub name: String,
    pub density: f64,
    #[serde(default = "default_poisson_ratio")]
    pub poisson_ratio: f64,
    #[serde(default)]
    pub stress_unit: StressUnit,
    #[serde(default)]
    pub width_unit: TableUnit,
    #[serde(default)]
    pub width_breakpoints: Vec<f64>,
    pub grades: Vec<GradeEntry>,
}

fn default_poisson_ratio() -> f64 {
    DIMENSION_LUMBER_POISSON_RATIO
}

/// A species whose reference values come from a table file
#[derive(Debug, Clone)]
pub struct TabulatedSpecies {
    name: String,
    density: f64,
    poisson_ratio: f64,
    table: GradeTable,
}

impl TabulatedSpecies {
    /// Parse and validate a species table from TOML text
    pub fn from_toml_str(content: &str) -> LumberResult<Self> {
        let file: SpeciesTableFile = toml::from_str(content)
            .map_err(|e| LumberError::config(format!("species table: {}", e)))?;
        Self::from_table_file(file)
    }

    /// Read, parse and validate a species table file
    pub fn from_file(path: impl AsRef<Path>) -> LumberResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LumberError::io(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Validate raw table contents and build the grade records.
    ///
    /// Aliases are resolved after every valued grade, in file order, so an
    /// alias may point at a grade listed later or at an earlier alias.
    pub fn from_table_file(file: SpeciesTableFile) -> LumberResult<Self> {
        if file.name.trim().is_empty() {
            return Err(LumberError::config("species table: name must not be empty"));
        }
        if !(file.density.is_finite() && file.density > 0.0) {
            return Err(LumberError::config(format!(
                "species table '{}': density must be positive",
                file.name
            )));
        }
        if file.grades.is_empty() {
            return Err(LumberError::config(format!(
                "species table '{}': no grades listed",
                file.name
            )));
        }

        let mut table = GradeTable::new();
        let mut aliases = Vec::new();
        for entry in &file.grades {
            let grade = parse_grade(&file.name, &entry.grade, &entry.sub_grade)?;
            match &entry.alias_of {
                Some(target) => {
                    let target = parse_grade(&file.name, target, &entry.alias_sub_grade)?;
                    aliases.push((grade, target));
                }
                None => {
                    let values = build_values(&file, entry)?;
                    table.insert(grade.0, grade.1, values)?;
                }
            }
        }
        for ((grade, sub_grade), (target, target_sub)) in aliases {
            table.alias(grade, sub_grade, target, target_sub)?;
        }

        debug!(species = %file.name, records = table.len(), "loaded species table");
        Ok(Self {
            name: file.name,
            density: file.density,
            poisson_ratio: file.poisson_ratio,
            table,
        })
    }
}

fn parse_grade(
    species: &str,
    grade: &str,
    sub_grade: &str,
) -> LumberResult<(GradeFamily, SubGrade)> {
    match (GradeFamily::from_str_flexible(grade), SubGrade::from_str_flexible(sub_grade)) {
        (Some(g), Some(s)) => Ok((g, s)),
        _ => Err(LumberError::unknown_grade(species, grade, sub_grade)),
    }
}

fn build_values(
    file: &SpeciesTableFile,
    entry: &GradeEntry,
) -> LumberResult<ReferenceDesignValues> {
    let label = format!("{} {} {}", file.name, entry.grade, entry.sub_grade);
    let label = label.trim_end();
    let missing = |field: &str| {
        LumberError::config(format!(
            "species table '{}': {} has no '{}' value",
            file.name, entry.grade, field
        ))
    };
    let scalar = |value: Option<f64>, field: &str| -> LumberResult<f64> {
        let value = value.ok_or_else(|| missing(field))?;
        if !value.is_finite() {
            return Err(LumberError::config(format!("{} {}: non-finite value", label, field)));
        }
        Ok(file.stress_unit.to_pascals(value))
    };
    let tabulated = |spec: &Option<ValueSpec>, field: &str| -> LumberResult<TabulatedValue> {
        match spec.as_ref().ok_or_else(|| missing(field))? {
            ValueSpec::Constant(v) => Ok(TabulatedValue::Constant(scalar(Some(*v), field)?)),
            ValueSpec::Graduated(values) => {
                let ys = values.iter().map(|v| file.stress_unit.to_pascals(*v)).collect();
                let curve = PiecewiseLinearCurve::new(
                    format!("{} {}", label, field),
                    file.width_breakpoints.clone(),
                    ys,
                )?;
                Ok(TabulatedValue::WidthGraduated {
                    unit: file.width_unit,
                    curve,
                })
            }
        }
    };

    Ok(ReferenceDesignValues {
        fb: tabulated(&entry.fb, "fb")?,
        ft: tabulated(&entry.ft, "ft")?,
        fv: scalar(entry.fv, "fv")?,
        fct: scalar(entry.fct, "fct")?,
        fc: tabulated(&entry.fc, "fc")?,
        e: scalar(entry.e, "e")?,
        emin: scalar(entry.emin, "emin")?,
    })
}

impl ReferenceValueProvider for TabulatedSpecies {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn poisson_ratio(&self) -> f64 {
        self.poisson_ratio
    }

    fn grades(&self) -> LumberResult<Vec<(GradeFamily, SubGrade)>> {
        Ok(self.table.keys())
    }

    fn reference_values(
        &self,
        grade: GradeFamily,
        sub_grade: SubGrade,
    ) -> LumberResult<Arc<ReferenceDesignValues>> {
        self.table.get(grade, sub_grade).ok_or_else(|| {
            LumberError::unknown_grade(self.name.as_str(), grade.code(), sub_grade.code())
        })
    }
}
