use super::SoilColumn;
use agrosoil_core::capabilities::CropGrowth;
use agrosoil_core::units::{FloatValue, M2_PER_HA};
use std::rc::Rc;

impl SoilColumn {
    /// Associate the crop growing on the column.
    ///
    /// Only a weak reference is kept, the crop reads as absent once the
    /// driver drops it.
    pub fn put_crop(&mut self, crop: &Rc<dyn CropGrowth>) {
        self.crop = Some(Rc::downgrade(crop));
    }

    pub fn remove_crop(&mut self) {
        self.crop = None;
    }

    pub fn crop(&self) -> Option<Rc<dyn CropGrowth>> {
        self.crop.as_ref().and_then(|crop| crop.upgrade())
    }

    /// Add the crop's nitrogen uptake of the day to the accumulator.
    pub fn accumulate_crop_n_uptake(&mut self) {
        if let Some(crop) = self.crop() {
            self.crop_n_uptake += crop.daily_n_uptake();
        }
    }

    /// Accumulated crop nitrogen uptake [kg N ha-1].
    pub fn daily_crop_n_uptake(&self) -> FloatValue {
        self.crop_n_uptake * M2_PER_HA
    }

    pub fn reset_crop_n_uptake(&mut self) {
        self.crop_n_uptake = 0.0;
    }

    /// Number of layers reached by the roots, zero without a crop.
    pub fn root_zone_layer_count(&self) -> usize {
        match self.crop() {
            Some(crop) if crop.rooting_depth() > 0.0 => {
                self.layer_number_for_depth(crop.rooting_depth()) + 1
            }
            _ => 0,
        }
    }
}
