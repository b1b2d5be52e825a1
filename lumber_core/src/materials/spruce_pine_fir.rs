//! Spruce-Pine-Fir Reference Design Values (NDS Supplement Table 4A)
//!
//! Constant values per grade, published in psi. No. 2 shares the No. 1
//! record. Spruce-Pine-Fir has no dense/non-dense sub-grades, so any
//! sub-grade other than the empty one is rejected as an unknown grade.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{GradeFamily, GradeTable, ReferenceDesignValues, SubGrade, TabulatedValue};
use crate::errors::{LumberError, LumberResult};
use crate::units::psi;

/// Species name used for material names and errors
pub const NAME: &str = "SprucePineFir";

/// Shear Fv for every grade (psi)
const FV_PSI: f64 = 135.0;

/// Compression perpendicular to grain for every grade (psi)
const FCT_PSI: f64 = 425.0;

/// (grade, Fb, Ft, Fc, E, Emin), psi
const ROWS: [(GradeFamily, f64, f64, f64, f64, f64); 4] = [
    (GradeFamily::Structural, 1150.0, 700.0, 1400.0, 1.5e6, 550e3),
    (GradeFamily::No1, 875.0, 450.0, 1150.0, 1.4e6, 510e3),
    (GradeFamily::No3, 500.0, 250.0, 650.0, 1.2e6, 440e3),
    (GradeFamily::Stud, 675.0, 350.0, 725.0, 1.2e6, 440e3),
];

fn build_table() -> LumberResult<GradeTable> {
    let mut table = GradeTable::new();
    for (grade, fb, ft, fc, e, emin) in ROWS {
        let values = ReferenceDesignValues {
            fb: TabulatedValue::Constant(psi(fb)),
            ft: TabulatedValue::Constant(psi(ft)),
            fv: psi(FV_PSI),
            fct: psi(FCT_PSI),
            fc: TabulatedValue::Constant(psi(fc)),
            e: psi(e),
            emin: psi(emin),
        };
        table.insert(grade, SubGrade::None, values)?;
    }
    table.alias(GradeFamily::No2, SubGrade::None, GradeFamily::No1, SubGrade::None)?;

    debug!(records = table.len(), "built Spruce-Pine-Fir reference table");
    Ok(table)
}

static TABLE: Lazy<LumberResult<GradeTable>> = Lazy::new(build_table);

fn table() -> LumberResult<&'static GradeTable> {
    TABLE.as_ref().map_err(Clone::clone)
}

/// Accepted grades (all with the empty sub-grade)
pub fn grades() -> LumberResult<Vec<(GradeFamily, SubGrade)>> {
    Ok(table()?.keys())
}

/// Record for a grade. Non-empty sub-grades are unknown grades.
pub fn reference_values(
    grade: GradeFamily,
    sub_grade: SubGrade,
) -> LumberResult<Arc<ReferenceDesignValues>> {
    table()?
        .get(grade, sub_grade)
        .ok_or_else(|| LumberError::unknown_grade(NAME, grade.code(), sub_grade.code()))
}
