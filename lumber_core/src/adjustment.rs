//! # Design Value Adjustment
//!
//! Pure functions combining a [`LumberMaterial`]'s tabulated values with the
//! NDS Table 4A factors for a rectangular cross-section.
//!
//! Sections are given as `(b, h)` in metres, where `b` is the horizontal
//! dimension and `h` the dimension in the direction of bending load. Size
//! factor lookups always use the larger dimension as the width and the
//! smaller as the thickness; only the flat-use factor looks at orientation
//! (`b > h` means the wide face is loaded).
//!
//! ## Example
//!
//! ```rust
//! use lumber_core::adjustment::adjusted_shear_value;
//! use lumber_core::materials::LumberMaterial;
//! use lumber_core::nds_factors::WetService;
//!
//! let mat = LumberMaterial::southern_pine("no_2", "", WetService::Wet).unwrap();
//! assert!((adjusted_shear_value(&mat) - 1.164e6).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::errors::{LumberError, LumberResult};
use crate::materials::{GradeFamily, LumberMaterial};
use crate::nds_factors::{nds_ref, size_factor_curves, STUD_MAX_WIDTH_IN};
use crate::units::{Inches, Meters, Pascals, Psi, IN_TO_M};

/// Width and thickness of a validated section (m)
#[derive(Debug, Clone, Copy)]
struct Section {
    width_m: f64,
    thickness_m: f64,
}

impl Section {
    fn new(b: f64, h: f64) -> LumberResult<Self> {
        check_positive("b", b)?;
        check_positive("h", h)?;
        Ok(Self {
            width_m: b.max(h),
            thickness_m: b.min(h),
        })
    }

    fn width_in(&self) -> f64 {
        Inches::from(Meters(self.width_m)).0
    }

    fn thickness_in(&self) -> f64 {
        Inches::from(Meters(self.thickness_m)).0
    }
}

fn check_positive(field: &str, value: f64) -> LumberResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        let err = LumberError::invalid_input(
            field,
            value.to_string(),
            "Must be a positive, finite number",
        );
        warn!("{}", err);
        Err(err)
    }
}

/// Stud curves stop at 8 in; a member that wide is not stud grade.
fn stud_width_in(curve: &str, section: &Section) -> LumberResult<f64> {
    if section.width_m >= STUD_MAX_WIDTH_IN * IN_TO_M {
        let err = LumberError::domain(curve, section.width_in(), 0.0, STUD_MAX_WIDTH_IN);
        warn!("stud too wide: {}", err);
        return Err(err);
    }
    Ok(section.width_in())
}

// ============================================================================
// Factors
// ============================================================================

/// Flat-use factor C_fu.
///
/// 1.0 unless `b > h`. Otherwise the curve for the thickness class of `h` is
/// evaluated at `b` in inches.
pub fn bending_flat_use_factor(b: f64, h: f64) -> LumberResult<f64> {
    check_positive("b", b)?;
    check_positive("h", h)?;
    if b <= h {
        return Ok(1.0);
    }
    let curves = size_factor_curves()?;
    let (b_in, h_in) = (Inches::from(Meters(b)).0, Inches::from(Meters(h)).0);
    curves.flat_use(h_in).evaluate(b_in)
}

/// Bending size factor C_F for Fb
pub fn bending_size_factor(grade: GradeFamily, b: f64, h: f64) -> LumberResult<f64> {
    let section = Section::new(b, h)?;
    let curves = size_factor_curves()?;
    if grade.is_stud() {
        let width_in = stud_width_in(curves.stud_fb_size.name(), &section)?;
        curves.stud_fb_size.evaluate(width_in)
    } else {
        curves.fb_size(section.thickness_in()).evaluate(section.width_in())
    }
}

/// Tension size factor C_F for Ft
pub fn tension_size_factor(grade: GradeFamily, b: f64, h: f64) -> LumberResult<f64> {
    let section = Section::new(b, h)?;
    let curves = size_factor_curves()?;
    if grade.is_stud() {
        let curve = curves.stud_ft_size();
        curve.evaluate(stud_width_in(curve.name(), &section)?)
    } else {
        curves.ft_size().evaluate(section.width_in())
    }
}

/// Compression size factor C_F for Fc
pub fn compression_size_factor(grade: GradeFamily, b: f64, h: f64) -> LumberResult<f64> {
    let section = Section::new(b, h)?;
    let curves = size_factor_curves()?;
    if grade.is_stud() {
        let width_in = stud_width_in(curves.stud_fc_size.name(), &section)?;
        curves.stud_fc_size.evaluate(width_in)
    } else {
        curves.fc_size.evaluate(section.width_in())
    }
}

// ============================================================================
// Adjusted Values
// ============================================================================

/// Adjusted bending Fb' = Fb × C_r × C_M × C_fu × C_F.
///
/// C_M = 0.85 only for wet service with Fb (at the member width) above
/// 1150 psi / 0.85.
pub fn adjusted_bending_value(
    material: &LumberMaterial,
    b: f64,
    h: f64,
    repetitive_factor: f64,
) -> LumberResult<f64> {
    check_positive("repetitive_factor", repetitive_factor)?;
    let section = Section::new(b, h)?;
    let fb = material.tabulated_fb(section.width_m)?;

    let c_m = material.wet_service().factor_fb(fb);
    let c_fu = bending_flat_use_factor(b, h)?;
    let c_f = bending_size_factor(material.grade(), b, h)?;
    let factor = repetitive_factor * c_m * c_fu * c_f;

    trace!(
        material = %material.solved_material_name(),
        c_r = repetitive_factor,
        c_m,
        c_fu,
        c_f,
        "Fb'"
    );
    Ok(factor * fb)
}

/// Adjusted tension Ft' = Ft × C_F
pub fn adjusted_tension_value(material: &LumberMaterial, b: f64, h: f64) -> LumberResult<f64> {
    let section = Section::new(b, h)?;
    let ft = material.tabulated_ft(section.width_m)?;
    let c_f = tension_size_factor(material.grade(), b, h)?;

    trace!(material = %material.solved_material_name(), c_f, "Ft'");
    Ok(c_f * material.wet_service().factor_ft() * ft)
}

/// Adjusted shear Fv' = Fv × C_M
pub fn adjusted_shear_value(material: &LumberMaterial) -> f64 {
    material.wet_service().factor_fv() * material.reference_values().fv
}

/// Adjusted bearing Fc_perp' = Fc_perp × C_b × C_M
pub fn adjusted_compression_perpendicular_value(
    material: &LumberMaterial,
    bearing_area_factor: f64,
) -> LumberResult<f64> {
    check_positive("bearing_area_factor", bearing_area_factor)?;
    let c_m = material.wet_service().factor_fc_perp();

    trace!(material = %material.solved_material_name(), c_b = bearing_area_factor, c_m, "Fc_perp'");
    Ok(bearing_area_factor * c_m * material.reference_values().fct)
}

/// Adjusted compression parallel Fc' = Fc × C_M × C_F.
///
/// C_M = 0.8 only for wet service with Fc (at the member width) above
/// 750 psi / 0.8.
pub fn adjusted_compression_parallel_value(
    material: &LumberMaterial,
    b: f64,
    h: f64,
) -> LumberResult<f64> {
    let section = Section::new(b, h)?;
    let fc = material.tabulated_fc(section.width_m)?;
    let c_m = material.wet_service().factor_fc(fc);
    let c_f = compression_size_factor(material.grade(), b, h)?;

    trace!(material = %material.solved_material_name(), c_m, c_f, "Fc'");
    Ok(c_m * c_f * fc)
}

/// Adjusted modulus of elasticity E' = E × C_M
pub fn adjusted_modulus_of_elasticity(material: &LumberMaterial) -> f64 {
    material.wet_service().factor_e() * material.reference_values().e
}

/// Adjusted minimum modulus Emin' = Emin × C_M
pub fn adjusted_minimum_modulus(material: &LumberMaterial) -> f64 {
    material.wet_service().factor_e() * material.reference_values().emin
}

// ============================================================================
// Full Record
// ============================================================================

/// Every adjusted value of a member together with the factors applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedDesignValues {
    /// `species_grade_subgrade`
    pub material: String,
    /// Wet service condition
    pub wet_service: bool,
    /// Horizontal section dimension b (m)
    pub width_m: f64,
    /// Section dimension in the load direction h (m)
    pub depth_m: f64,

    /// Fb' (Pa)
    pub fb: f64,
    /// Ft' (Pa)
    pub ft: f64,
    /// Fv' (Pa)
    pub fv: f64,
    /// Fc_perp' (Pa)
    pub fc_perp: f64,
    /// Fc' (Pa)
    pub fc: f64,
    /// E' (Pa)
    pub e: f64,
    /// Emin' (Pa)
    pub e_min: f64,

    /// Repetitive member factor
    pub c_r: f64,
    /// Wet service factor for Fb
    pub c_m_fb: f64,
    /// Flat use factor
    pub c_fu: f64,
    /// Size factor for Fb
    pub c_f_fb: f64,
    /// Size factor for Ft
    pub c_f_ft: f64,
    /// Wet service factor for Fv
    pub c_m_fv: f64,
    /// Bearing area factor
    pub c_b: f64,
    /// Wet service factor for Fc_perp
    pub c_m_fc_perp: f64,
    /// Wet service factor for Fc
    pub c_m_fc: f64,
    /// Size factor for Fc
    pub c_f_fc: f64,
    /// Wet service factor for E and Emin
    pub c_m_e: f64,
}

/// Compute every adjusted value for a member.
///
/// `repetitive_factor` and `bearing_area_factor` are the caller's C_r and
/// C_b (1.0 when not applicable).
pub fn adjusted_design_values(
    material: &LumberMaterial,
    b: f64,
    h: f64,
    repetitive_factor: f64,
    bearing_area_factor: f64,
) -> LumberResult<AdjustedDesignValues> {
    let section = Section::new(b, h)?;
    let wet = material.wet_service();
    let grade = material.grade();

    Ok(AdjustedDesignValues {
        material: material.solved_material_name(),
        wet_service: wet.is_wet(),
        width_m: b,
        depth_m: h,

        fb: adjusted_bending_value(material, b, h, repetitive_factor)?,
        ft: adjusted_tension_value(material, b, h)?,
        fv: adjusted_shear_value(material),
        fc_perp: adjusted_compression_perpendicular_value(material, bearing_area_factor)?,
        fc: adjusted_compression_parallel_value(material, b, h)?,
        e: adjusted_modulus_of_elasticity(material),
        e_min: adjusted_minimum_modulus(material),

        c_r: repetitive_factor,
        c_m_fb: wet.factor_fb(material.tabulated_fb(section.width_m)?),
        c_fu: bending_flat_use_factor(b, h)?,
        c_f_fb: bending_size_factor(grade, b, h)?,
        c_f_ft: tension_size_factor(grade, b, h)?,
        c_m_fv: wet.factor_fv(),
        c_b: bearing_area_factor,
        c_m_fc_perp: wet.factor_fc_perp(),
        c_m_fc: wet.factor_fc(material.tabulated_fc(section.width_m)?),
        c_f_fc: compression_size_factor(grade, b, h)?,
        c_m_e: wet.factor_e(),
    })
}

impl AdjustedDesignValues {
    /// Format as a multi-line string for reports (stresses in psi)
    pub fn format_report(&self) -> String {
        let psi = |pa: f64| Psi::from(Pascals(pa)).0;
        format!(
            "Adjusted Design Values: {} ({:.1} mm x {:.1} mm, {})\n\
             ================================================\n\
             C_r  (Repetitive)        = {:.3}   {}\n\
             C_M  (Wet Service - Fb)  = {:.3}   {}\n\
             C_fu (Flat Use)          = {:.3}   {}\n\
             C_F  (Size - Fb)         = {:.3}   {}\n\
             C_F  (Size - Ft)         = {:.3}   {}\n\
             C_M  (Wet Service - Fv)  = {:.3}   {}\n\
             C_b  (Bearing Area)      = {:.3}   {}\n\
             C_M  (Wet Service - Fc⊥) = {:.3}   {}\n\
             C_M  (Wet Service - Fc)  = {:.3}   {}\n\
             C_F  (Size - Fc)         = {:.3}   {}\n\
             C_M  (Wet Service - E)   = {:.3}   {}\n\
             ------------------------------------------------\n\
             Fb'     = {:>10.0} psi\n\
             Ft'     = {:>10.0} psi\n\
             Fv'     = {:>10.0} psi\n\
             Fc_perp'= {:>10.0} psi\n\
             Fc'     = {:>10.0} psi\n\
             E'      = {:>10.0} psi\n\
             Emin'   = {:>10.0} psi",
            self.material,
            self.width_m * 1000.0,
            self.depth_m * 1000.0,
            if self.wet_service { "wet" } else { "dry" },
            self.c_r, nds_ref::C_R,
            self.c_m_fb, nds_ref::C_M,
            self.c_fu, nds_ref::C_FU,
            self.c_f_fb, nds_ref::C_F,
            self.c_f_ft, nds_ref::C_F,
            self.c_m_fv, nds_ref::C_M,
            self.c_b, nds_ref::C_B,
            self.c_m_fc_perp, nds_ref::C_M,
            self.c_m_fc, nds_ref::C_M,
            self.c_f_fc, nds_ref::C_F,
            self.c_m_e, nds_ref::C_M,
            psi(self.fb),
            psi(self.ft),
            psi(self.fv),
            psi(self.fc_perp),
            psi(self.fc),
            psi(self.e),
            psi(self.e_min),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{LumberSize, Orientation};
    use crate::nds_factors::WetService;
    use crate::units::PSI_TO_PA;

    const B_2X10: f64 = 1.5 * IN_TO_M;
    const H_2X10: f64 = 9.25 * IN_TO_M;

    #[test]
    fn test_flat_use_factor() {
        // On edge
        assert_eq!(bending_flat_use_factor(B_2X10, H_2X10).unwrap(), 1.0);
        // Square
        assert_eq!(bending_flat_use_factor(0.1, 0.1).unwrap(), 1.0);
        // 2x10 flat: thin curve at 9.25 in, between 8 (1.15) and 10 (1.20)
        let c_fu = bending_flat_use_factor(H_2X10, B_2X10).unwrap();
        assert!((c_fu - 1.18125).abs() < 1e-9);
        // 4x10 flat: thick curve
        let c_fu = bending_flat_use_factor(H_2X10, 3.5 * IN_TO_M).unwrap();
        assert!((c_fu - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_bending_size_factor() {
        let c_f = bending_size_factor(GradeFamily::No2, B_2X10, H_2X10).unwrap();
        assert!((c_f - 1.1375).abs() < 1e-9);
        // Orientation does not matter for size factors
        let flat = bending_size_factor(GradeFamily::No2, H_2X10, B_2X10).unwrap();
        assert_eq!(c_f, flat);
        // 6x12 uses the thick curve: between 10 (1.2) and 12 (1.1)
        let (b, h) = (5.5 * IN_TO_M, 11.25 * IN_TO_M);
        let c_f = bending_size_factor(GradeFamily::Structural, b, h).unwrap();
        assert!((c_f - 1.1375).abs() < 1e-9);
    }

    #[test]
    fn test_stud_size_factors() {
        let b = 1.5 * IN_TO_M;
        let h = 3.5 * IN_TO_M;
        assert!((bending_size_factor(GradeFamily::Stud, b, h).unwrap() - 1.1).abs() < 1e-9);
        assert!((tension_size_factor(GradeFamily::Stud, b, h).unwrap() - 1.1).abs() < 1e-9);
        assert!((compression_size_factor(GradeFamily::Stud, b, h).unwrap() - 1.05).abs() < 1e-9);

        let wide = 8.0 * IN_TO_M;
        for result in [
            bending_size_factor(GradeFamily::Stud, b, wide),
            tension_size_factor(GradeFamily::Stud, b, wide),
            compression_size_factor(GradeFamily::Stud, b, wide),
        ] {
            assert_eq!(result.unwrap_err().error_code(), "DOMAIN_ERROR");
        }
        assert!(bending_size_factor(GradeFamily::Stud, b, 7.999 * IN_TO_M).is_ok());
    }

    #[test]
    fn test_compression_size_factor() {
        let c_f = compression_size_factor(GradeFamily::No1, B_2X10, H_2X10).unwrap();
        assert!((c_f - 1.01875).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_section_rejected() {
        for (b, h) in [(0.0, 0.2), (-0.04, 0.2), (0.04, f64::NAN), (f64::INFINITY, 0.1)] {
            let err = bending_size_factor(GradeFamily::No1, b, h).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
        let mat = LumberMaterial::spruce_pine_fir("no_1", "", WetService::Dry).unwrap();
        assert!(adjusted_bending_value(&mat, B_2X10, H_2X10, 0.0).is_err());
        assert!(adjusted_compression_perpendicular_value(&mat, -1.0).is_err());
    }

    #[test]
    fn test_adjusted_bending_sp_2x10() {
        let mat = LumberMaterial::southern_pine("no_2", "", WetService::Dry).unwrap();
        let fb = mat.tabulated_fb(H_2X10).unwrap();
        let fb_adj = adjusted_bending_value(&mat, B_2X10, H_2X10, 1.0).unwrap();
        assert!((fb_adj - 1.1375 * fb).abs() < 1e-3);

        let repetitive = adjusted_bending_value(&mat, B_2X10, H_2X10, 1.15).unwrap();
        assert!((repetitive - 1.15 * fb_adj).abs() < 1e-3);
    }

    #[test]
    fn test_wet_bending_threshold() {
        // SP structural 2x10: Fb well above 1150 psi / 0.85
        let dry = LumberMaterial::southern_pine("structural", "", WetService::Dry).unwrap();
        let wet = LumberMaterial::southern_pine("structural", "", WetService::Wet).unwrap();
        let fb_dry = adjusted_bending_value(&dry, B_2X10, H_2X10, 1.0).unwrap();
        let fb_wet = adjusted_bending_value(&wet, B_2X10, H_2X10, 1.0).unwrap();
        assert!((fb_wet - 0.85 * fb_dry).abs() < 1e-3);

        // SP No. 3: below the threshold, no derating
        let dry = LumberMaterial::southern_pine("no_3", "", WetService::Dry).unwrap();
        let wet = LumberMaterial::southern_pine("no_3", "", WetService::Wet).unwrap();
        assert_eq!(
            adjusted_bending_value(&dry, B_2X10, H_2X10, 1.0).unwrap(),
            adjusted_bending_value(&wet, B_2X10, H_2X10, 1.0).unwrap()
        );
    }

    #[test]
    fn test_wet_bending_threshold_within_graduated_curve() {
        // SP No. 1 Fb falls with width and crosses 1150 psi / 0.85 between 2x4 and 2x6
        let dry = LumberMaterial::southern_pine("no_1", "", WetService::Dry).unwrap();
        let wet = LumberMaterial::southern_pine("no_1", "", WetService::Wet).unwrap();
        let limit = 1150.0 / 0.85 * PSI_TO_PA;

        let (b, h) = LumberSize::L2x4.section_m(Orientation::Edge);
        assert!(dry.tabulated_fb(h).unwrap() > limit);
        let ratio = adjusted_bending_value(&wet, b, h, 1.0).unwrap()
            / adjusted_bending_value(&dry, b, h, 1.0).unwrap();
        assert!((ratio - 0.85).abs() < 1e-9);

        let (b, h) = LumberSize::L2x6.section_m(Orientation::Edge);
        assert!(dry.tabulated_fb(h).unwrap() <= limit);
        let ratio = adjusted_bending_value(&wet, b, h, 1.0).unwrap()
            / adjusted_bending_value(&dry, b, h, 1.0).unwrap();
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tension_has_no_wet_or_flat_adjustment() {
        let dry = LumberMaterial::southern_pine("no_1", "dense", WetService::Dry).unwrap();
        let wet = LumberMaterial::southern_pine("no_1", "dense", WetService::Wet).unwrap();
        let edge = adjusted_tension_value(&dry, B_2X10, H_2X10).unwrap();
        assert_eq!(edge, adjusted_tension_value(&wet, B_2X10, H_2X10).unwrap());
        assert_eq!(edge, adjusted_tension_value(&dry, H_2X10, B_2X10).unwrap());

        let ft = dry.tabulated_ft(H_2X10).unwrap();
        assert!((edge - 1.1375 * ft).abs() < 1e-3);
    }

    #[test]
    fn test_geometry_independent_values() {
        let mat = LumberMaterial::spruce_pine_fir("structural", "", WetService::Wet).unwrap();
        assert!((adjusted_shear_value(&mat) - 0.97 * 135.0 * PSI_TO_PA).abs() < 1e-6);
        assert!((adjusted_modulus_of_elasticity(&mat) - 0.9 * 1.5e6 * PSI_TO_PA).abs() < 1e-3);
        assert!((adjusted_minimum_modulus(&mat) - 0.9 * 550e3 * PSI_TO_PA).abs() < 1e-3);

        let fc_perp = adjusted_compression_perpendicular_value(&mat, 1.25).unwrap();
        assert!((fc_perp - 1.25 * 0.67 * 425.0 * PSI_TO_PA).abs() < 1e-6);
    }

    #[test]
    fn test_full_record_matches_individual_operations() {
        let mat = LumberMaterial::southern_pine("no_1", "", WetService::Wet).unwrap();
        let values = adjusted_design_values(&mat, B_2X10, H_2X10, 1.15, 1.1).unwrap();

        assert_eq!(values.material, "SouthernPine_no_1_");
        assert!(values.wet_service);
        assert_eq!(values.fb, adjusted_bending_value(&mat, B_2X10, H_2X10, 1.15).unwrap());
        assert_eq!(values.fc, adjusted_compression_parallel_value(&mat, B_2X10, H_2X10).unwrap());
        assert_eq!(values.fv, adjusted_shear_value(&mat));
        assert_eq!(values.c_r, 1.15);
        assert_eq!(values.c_b, 1.1);
        assert_eq!(values.c_fu, 1.0);
        assert_eq!(values.c_m_fv, 0.97);
        assert_eq!(values.c_m_fc_perp, 0.67);
        assert_eq!(values.c_m_e, 0.9);

        let factors = values.c_r * values.c_m_fb * values.c_fu * values.c_f_fb;
        let expected_fb = factors * mat.tabulated_fb(H_2X10).unwrap();
        assert!((values.fb - expected_fb).abs() < 1e-3);
    }

    #[test]
    fn test_report_and_serialization() {
        let mat = LumberMaterial::spruce_pine_fir("no_2", "", WetService::Dry).unwrap();
        let values = adjusted_design_values(&mat, B_2X10, H_2X10, 1.0, 1.0).unwrap();

        let report = values.format_report();
        assert!(report.contains("SprucePineFir_no_2_"));
        assert!(report.contains(nds_ref::C_FU));
        assert!(report.contains("Fb'"));

        let json = serde_json::to_string(&values).unwrap();
        let parsed: AdjustedDesignValues = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.material, values.material);
        assert_eq!(parsed.c_f_fc, values.c_f_fc);
    }

    #[test]
    fn test_too_narrow_is_domain_error() {
        // Size curves start at 1 in
        let mat = LumberMaterial::spruce_pine_fir("no_1", "", WetService::Dry).unwrap();
        let err = adjusted_compression_parallel_value(&mat, 0.01, 0.02).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
    }
}
