//! Southern Pine Reference Design Values
//!
//! Visually graded Southern Pine dimension lumber per SPIB grading rules, from
//! the metric edition of the Southern Pine Use Guide (Southern Forest Products
//! Association). Fb, Ft and Fc are published per member width and are
//! interpolated over [`WIDTH_BREAKPOINTS_M`]; Fv, Fc_perp, E and Emin are
//! constant per grade.
//!
//! Stud grade shares the No. 3 record.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{GradeFamily, GradeTable, ReferenceDesignValues, SubGrade, TableUnit, TabulatedValue};
use crate::curve::PiecewiseLinearCurve;
use crate::errors::{LumberError, LumberResult};

/// Species name used for material names and errors
pub const NAME: &str = "SouthernPine";

/// Width breakpoints (m) the graduated values are published at
pub const WIDTH_BREAKPOINTS_M: [f64; 6] = [0.000, 0.038, 0.140, 0.184, 0.235, 0.286];

struct GradeRow {
    grade: GradeFamily,
    sub_grade: SubGrade,
    fb: [f64; 6],
    ft: [f64; 6],
    fv: f64,
    fct: f64,
    fc: [f64; 6],
    e: f64,
    emin: f64,
}

const ROWS: [GradeRow; 10] = [
    GradeRow {
        grade: GradeFamily::Structural,
        sub_grade: SubGrade::None,
        fb: [16.20e6, 16.20e6, 14.50e6, 13.40e6, 11.70e6, 11.00e6],
        ft: [11.40e6, 11.40e6, 10.00e6, 9.30e6, 7.90e6, 7.60e6],
        fv: 1.2e6,
        fct: 3.9e6,
        fc: [13.10e6, 13.10e6, 12.40e6, 11.70e6, 11.40e6, 11.40e6],
        e: 12.4e9,
        emin: 4.6e9,
    },
    GradeRow {
        grade: GradeFamily::Structural,
        sub_grade: SubGrade::Dense,
        fb: [18.60e6, 18.60e6, 16.50e6, 15.20e6, 13.40e6, 12.40e6],
        ft: [13.10e6, 13.10e6, 11.40e6, 10.70e6, 9.00e6, 8.60e6],
        fv: 1.2e6,
        fct: 4.6e6,
        fc: [14.10e6, 14.10e6, 13.10e6, 12.80e6, 12.40e6, 12.10e6],
        e: 13.1e9,
        emin: 4.8e9,
    },
    GradeRow {
        grade: GradeFamily::Structural,
        sub_grade: SubGrade::NonDense,
        fb: [14.10e6, 14.10e6, 12.80e6, 11.70e6, 10.30e6, 9.70e6],
        ft: [10.00e6, 10.00e6, 9.00e6, 8.30e6, 7.20e6, 6.70e6],
        fv: 1.2e6,
        fct: 3.3e6,
        fc: [12.40e6, 12.40e6, 11.70e6, 11.40e6, 11.00e6, 10.70e6],
        e: 11e9,
        emin: 4e9,
    },
    GradeRow {
        grade: GradeFamily::No1,
        sub_grade: SubGrade::None,
        fb: [10.30e6, 10.30e6, 9.30e6, 8.60e6, 7.20e6, 6.90e6],
        ft: [6.90e6, 6.90e6, 6.00e6, 5.50e6, 4.80e6, 4.50e6],
        fv: 1.2e6,
        fct: 3.9e6,
        fc: [11.40e6, 11.40e6, 10.70e6, 10.30e6, 10.00e6, 9.70e6],
        e: 11e9,
        emin: 4e9,
    },
    GradeRow {
        grade: GradeFamily::No1,
        sub_grade: SubGrade::Dense,
        fb: [11.40e6, 11.40e6, 10.30e6, 9.30e6, 8.30e6, 7.60e6],
        ft: [7.60e6, 7.60e6, 6.90e6, 6.20e6, 5.50e6, 5.20e6],
        fv: 1.2e6,
        fct: 4.6e6,
        fc: [12.10e6, 12.10e6, 11.40e6, 11.00e6, 10.70e6, 10.30e6],
        e: 12.4e9,
        emin: 4.6e9,
    },
    GradeRow {
        grade: GradeFamily::No1,
        sub_grade: SubGrade::NonDense,
        fb: [9.00e6, 9.00e6, 8.30e6, 7.60e6, 6.60e6, 6.20e6],
        ft: [6.00e6, 6.00e6, 5.30e6, 4.80e6, 4.30e6, 4.00e6],
        fv: 1.2e6,
        fct: 3.3e6,
        fc: [10.70e6, 10.70e6, 10.00e6, 9.70e6, 9.70e6, 9.30e6],
        e: 9.7e9,
        emin: 3.5e9,
    },
    GradeRow {
        grade: GradeFamily::No2,
        sub_grade: SubGrade::None,
        fb: [7.60e6, 7.60e6, 6.90e6, 6.40e6, 5.50e6, 5.20e6],
        ft: [4.70e6, 4.70e6, 4.10e6, 3.80e6, 3.30e6, 3.10e6],
        fv: 1.2e6,
        fct: 3.9e6,
        fc: [10.00e6, 10.00e6, 9.70e6, 9.30e6, 9.00e6, 8.60e6],
        e: 9.7e9,
        emin: 3.5e9,
    },
    GradeRow {
        grade: GradeFamily::No2,
        sub_grade: SubGrade::Dense,
        fb: [8.30e6, 8.30e6, 7.20e6, 6.70e6, 5.90e6, 5.50e6],
        ft: [5.20e6, 5.20e6, 4.50e6, 4.10e6, 3.60e6, 3.40e6],
        fv: 1.2e6,
        fct: 4.6e6,
        fc: [10.30e6, 10.30e6, 10.00e6, 9.70e6, 9.30e6, 9.00e6],
        e: 11e9,
        emin: 4e9,
    },
    GradeRow {
        grade: GradeFamily::No2,
        sub_grade: SubGrade::NonDense,
        fb: [7.20e6, 7.20e6, 6.60e6, 6.00e6, 5.20e6, 4.80e6],
        ft: [4.10e6, 4.10e6, 3.60e6, 3.40e6, 2.90e6, 2.80e6],
        fv: 1.2e6,
        fct: 3.3e6,
        fc: [10.00e6, 10.00e6, 9.30e6, 9.00e6, 8.60e6, 8.60e6],
        e: 9e9,
        emin: 3.2e9,
    },
    GradeRow {
        grade: GradeFamily::No3,
        sub_grade: SubGrade::None,
        fb: [4.50e6, 4.50e6, 4.00e6, 3.60e6, 3.30e6, 3.10e6],
        ft: [2.80e6, 2.80e6, 2.40e6, 2.20e6, 1.90e6, 1.70e6],
        fv: 1.2e6,
        fct: 3.9e6,
        fc: [5.90e6, 5.90e6, 5.50e6, 5.30e6, 5.20e6, 5.00e6],
        e: 9e9,
        emin: 3.2e9,
    },
];

fn graduated(name: String, values: &[f64; 6]) -> LumberResult<TabulatedValue> {
    Ok(TabulatedValue::WidthGraduated {
        unit: TableUnit::Meters,
        curve: PiecewiseLinearCurve::new(name, WIDTH_BREAKPOINTS_M.to_vec(), values.to_vec())?,
    })
}

fn build_table() -> LumberResult<GradeTable> {
    let mut table = GradeTable::new();
    for row in &ROWS {
        let label = format!("{} {}{}", NAME, row.grade.code(), sub_label(row.sub_grade));
        let values = ReferenceDesignValues {
            fb: graduated(format!("{} Fb", label), &row.fb)?,
            ft: graduated(format!("{} Ft", label), &row.ft)?,
            fv: row.fv,
            fct: row.fct,
            fc: graduated(format!("{} Fc", label), &row.fc)?,
            e: row.e,
            emin: row.emin,
        };
        table.insert(row.grade, row.sub_grade, values)?;
    }
    table.alias(GradeFamily::Stud, SubGrade::None, GradeFamily::No3, SubGrade::None)?;

    debug!(records = table.len(), "built Southern Pine reference table");
    Ok(table)
}

fn sub_label(sub_grade: SubGrade) -> String {
    match sub_grade {
        SubGrade::None => String::new(),
        other => format!(" {}", other.code()),
    }
}

static TABLE: Lazy<LumberResult<GradeTable>> = Lazy::new(build_table);

fn table() -> LumberResult<&'static GradeTable> {
    TABLE.as_ref().map_err(Clone::clone)
}

/// Accepted grade/sub-grade pairs
pub fn grades() -> LumberResult<Vec<(GradeFamily, SubGrade)>> {
    Ok(table()?.keys())
}

/// Record for a grade/sub-grade.
///
/// No. 3 and stud accept only the empty sub-grade.
pub fn reference_values(
    grade: GradeFamily,
    sub_grade: SubGrade,
) -> LumberResult<Arc<ReferenceDesignValues>> {
    table()?
        .get(grade, sub_grade)
        .ok_or_else(|| LumberError::unknown_grade(NAME, grade.code(), sub_grade.code()))
}
