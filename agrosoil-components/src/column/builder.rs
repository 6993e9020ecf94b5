use super::SoilColumn;
use crate::layer::SoilLayer;
use crate::retention::VanGenuchtenRetention;
use agrosoil_core::capabilities::RetentionCurve;
use agrosoil_core::errors::{SoilError, SoilResult};
use agrosoil_core::parameters::{GeneralParameters, SoilParameters, UserInitialValues};
use log::debug;
use std::rc::Rc;

/// Build a new soil column from the profile description.
///
/// Every layer thickness of the general parameters needs a matching set of
/// soil parameters. Without an explicit retention curve the layers use
/// [`VanGenuchtenRetention`].
#[derive(Debug, Default)]
pub struct SoilColumnBuilder {
    general: GeneralParameters,
    soil: Vec<SoilParameters>,
    initial: UserInitialValues,
    retention: Option<Rc<dyn RetentionCurve>>,
}

impl SoilColumnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layer geometry and the profile-wide depths.
    pub fn with_general_parameters(&mut self, general: GeneralParameters) -> &mut Self {
        self.general = general;
        self
    }

    /// Set the soil properties, one entry per layer from the surface down.
    pub fn with_soil_parameters(&mut self, soil: Vec<SoilParameters>) -> &mut Self {
        self.soil = soil;
        self
    }

    pub fn with_initial_values(&mut self, initial: UserInitialValues) -> &mut Self {
        self.initial = initial;
        self
    }

    /// Use `retention` for the hydraulic limits and pressure head of every layer.
    pub fn with_retention_curve(&mut self, retention: Rc<dyn RetentionCurve>) -> &mut Self {
        self.retention = Some(retention);
        self
    }

    /// Validate the profile and create the column.
    pub fn build(&self) -> SoilResult<SoilColumn> {
        self.general.validate()?;
        if self.soil.len() != self.general.number_of_layers() {
            return Err(SoilError::LayerCountMismatch {
                thickness_count: self.general.number_of_layers(),
                soil_count: self.soil.len(),
            });
        }

        let retention: Rc<dyn RetentionCurve> = match &self.retention {
            Some(retention) => Rc::clone(retention),
            None => Rc::new(VanGenuchtenRetention::default()),
        };

        let layers = self
            .general
            .layer_thickness
            .iter()
            .zip(&self.soil)
            .enumerate()
            .map(|(index, (thickness, params))| {
                params.validate(index)?;
                SoilLayer::new(*thickness, params, &self.initial, Rc::clone(&retention))
            })
            .collect::<SoilResult<Vec<_>>>()?;

        debug!(
            "Built soil column with {} layers down to {:.2} m",
            layers.len(),
            self.general.profile_depth()
        );
        SoilColumn::from_layers(&self.general, layers)
    }
}
