//! Dimension Lumber Material
//!
//! Binds one reference value record (selected from species, grade and
//! sub-grade at construction) with density, Poisson ratio and the wet-service
//! condition. A failed construction yields no material, so no adjustment can
//! run against partially selected values.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{GradeFamily, ReferenceDesignValues, ReferenceValueProvider, Species, SubGrade};
use crate::errors::{LumberError, LumberResult};
use crate::nds_factors::{size_factor_curves, WetService};

/// Elastic material handle handed to downstream analysis code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedMaterial {
    /// Unique material name (`species_grade_subgrade`)
    pub name: String,
    /// Modulus of elasticity (Pa)
    pub e: f64,
    /// Poisson ratio
    pub nu: f64,
    /// Density (kg/m³)
    pub rho: f64,
}

/// Dimension lumber of one species, grade and sub-grade
#[derive(Debug, Clone)]
pub struct LumberMaterial {
    name: String,
    grade: GradeFamily,
    sub_grade: SubGrade,
    density: f64,
    poisson_ratio: f64,
    wet_service: WetService,
    values: Arc<ReferenceDesignValues>,
    solved: OnceCell<SolvedMaterial>,
}

impl LumberMaterial {
    /// Select the reference values for `grade`/`sub_grade` from `provider`.
    ///
    /// Fails with [`LumberError::UnknownGrade`] when the species does not
    /// publish that combination.
    pub fn new(
        provider: &dyn ReferenceValueProvider,
        grade: GradeFamily,
        sub_grade: SubGrade,
        wet_service: WetService,
    ) -> LumberResult<Self> {
        // Size factor curves must exist before any material does.
        size_factor_curves()?;

        let values = provider.reference_values(grade, sub_grade).map_err(|e| {
            warn!(
                species = provider.name(),
                grade = grade.code(),
                sub_grade = sub_grade.code(),
                "{}",
                e
            );
            e
        })?;

        Ok(Self {
            name: provider.name().to_string(),
            grade,
            sub_grade,
            density: provider.density(),
            poisson_ratio: provider.poisson_ratio(),
            wet_service,
            values,
            solved: OnceCell::new(),
        })
    }

    /// Same as [`LumberMaterial::new`] with grade and sub-grade given as text
    pub fn from_names(
        provider: &dyn ReferenceValueProvider,
        grade: &str,
        sub_grade: &str,
        wet_service: WetService,
    ) -> LumberResult<Self> {
        match (GradeFamily::from_str_flexible(grade), SubGrade::from_str_flexible(sub_grade)) {
            (Some(g), Some(s)) => Self::new(provider, g, s, wet_service),
            _ => {
                let err = LumberError::unknown_grade(provider.name(), grade, sub_grade);
                warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Southern Pine material
    pub fn southern_pine(
        grade: &str,
        sub_grade: &str,
        wet_service: WetService,
    ) -> LumberResult<Self> {
        Self::from_names(&Species::SouthernPine, grade, sub_grade, wet_service)
    }

    /// Spruce-Pine-Fir material
    pub fn spruce_pine_fir(
        grade: &str,
        sub_grade: &str,
        wet_service: WetService,
    ) -> LumberResult<Self> {
        Self::from_names(&Species::SprucePineFir, grade, sub_grade, wet_service)
    }

    /// Species name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grade(&self) -> GradeFamily {
        self.grade
    }

    pub fn sub_grade(&self) -> SubGrade {
        self.sub_grade
    }

    /// Density (kg/m³)
    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn poisson_ratio(&self) -> f64 {
        self.poisson_ratio
    }

    pub fn wet_service(&self) -> WetService {
        self.wet_service
    }

    /// The selected reference value record
    pub fn reference_values(&self) -> &ReferenceDesignValues {
        &self.values
    }

    /// Shared handle to the selected record
    pub fn shared_reference_values(&self) -> Arc<ReferenceDesignValues> {
        Arc::clone(&self.values)
    }

    /// Tabulated Fb for a member whose wider face is `width_m`
    pub fn tabulated_fb(&self, width_m: f64) -> LumberResult<f64> {
        self.values.fb.at(width_m)
    }

    /// Tabulated Ft for a member whose wider face is `width_m`
    pub fn tabulated_ft(&self, width_m: f64) -> LumberResult<f64> {
        self.values.ft.at(width_m)
    }

    /// Tabulated Fc for a member whose wider face is `width_m`
    pub fn tabulated_fc(&self, width_m: f64) -> LumberResult<f64> {
        self.values.fc.at(width_m)
    }

    /// Name of the solved material: `species_grade_subgrade`
    pub fn solved_material_name(&self) -> String {
        format!("{}_{}_{}", self.name, self.grade.code(), self.sub_grade.code())
    }

    /// Elastic material handle, created on first call and cached
    pub fn solved_material(&self) -> &SolvedMaterial {
        self.solved.get_or_init(|| SolvedMaterial {
            name: self.solved_material_name(),
            e: self.values.e,
            nu: self.poisson_ratio,
            rho: self.density,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::DIMENSION_LUMBER_DENSITY;

    #[test]
    fn test_southern_pine_material() {
        let mat = LumberMaterial::southern_pine("no_2", "", WetService::Dry).unwrap();
        assert_eq!(mat.name(), "SouthernPine");
        assert_eq!(mat.grade(), GradeFamily::No2);
        assert_eq!(mat.sub_grade(), SubGrade::None);
        assert_eq!(mat.density(), DIMENSION_LUMBER_DENSITY);
        assert_eq!(mat.poisson_ratio(), 0.2);
        assert_eq!(mat.reference_values().fv, 1.2e6);
        assert_eq!(mat.tabulated_fb(0.235).unwrap(), 5.50e6);
    }

    #[test]
    fn test_unknown_sub_grade_fails() {
        let err =
            LumberMaterial::southern_pine("no_1", "unknown_value", WetService::Dry).unwrap_err();
        assert_eq!(
            err,
            LumberError::unknown_grade("SouthernPine", "no_1", "unknown_value")
        );
    }

    #[test]
    fn test_unknown_grade_fails() {
        let err = LumberMaterial::spruce_pine_fir("utility", "", WetService::Dry).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_GRADE");
    }

    #[test]
    fn test_spf_sub_grade_rejected() {
        assert!(LumberMaterial::spruce_pine_fir("no_1", "dense", WetService::Dry).is_err());
    }

    #[test]
    fn test_solved_material_created_once() {
        let mat = LumberMaterial::southern_pine("structural", "dense", WetService::Dry).unwrap();
        assert_eq!(mat.solved_material_name(), "SouthernPine_structural_dense");

        let first = mat.solved_material() as *const SolvedMaterial;
        let second = mat.solved_material() as *const SolvedMaterial;
        assert_eq!(first, second);

        let solved = mat.solved_material();
        assert_eq!(solved.e, 13.1e9);
        assert_eq!(solved.nu, 0.2);
        assert_eq!(solved.rho, DIMENSION_LUMBER_DENSITY);
    }

    #[test]
    fn test_solved_material_name_without_sub_grade() {
        let mat = LumberMaterial::spruce_pine_fir("stud", "", WetService::Wet).unwrap();
        assert_eq!(mat.solved_material_name(), "SprucePineFir_stud_");
        assert!(mat.wet_service().is_wet());
    }
}
