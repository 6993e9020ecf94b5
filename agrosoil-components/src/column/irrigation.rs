//! Irrigation
//!
//! # Trigger
//!
//! Automatic irrigation is triggered by the plant available water of the
//! layers down to the critical moisture depth:
//!
//! $$PAW = \frac{\sum_i (\theta_i - \theta_{pwp,i})\,h_i}{\sum_i (\theta_{fc,i} - \theta_{pwp,i})\,h_i}$$
//!
//! Water is given when $PAW$ lies strictly below the threshold. With a crop
//! on the field irrigation is further restricted to the crop's temperature
//! sum window.
//!
//! # Infiltration
//!
//! Irrigation water enters the top layer. Each layer takes up water until
//! it is saturated and passes the rest on to the layer below, water
//! leaving the bottom layer is added to the flux at the lower boundary.

use super::SoilColumn;
use crate::layer::Constituent;
use agrosoil_core::errors::{ensure_non_negative, SoilResult};
use agrosoil_core::parameters::AutomaticIrrigationParameters;
use agrosoil_core::units::{FloatValue, MM_PER_M};
use log::debug;

/// Nitrogen [kg N m-2] carried by water [mm] at a concentration [mg N l-1].
fn dissolved_nitrogen(water_mm: FloatValue, n_concentration: FloatValue) -> FloatValue {
    // 1 mm over 1 m2 is one litre
    water_mm * n_concentration * 1.0e-6
}

impl SoilColumn {
    /// Plant available water of the layers down to the critical moisture
    /// depth as a fraction of their available water capacity.
    pub fn plant_available_water_fraction(&self) -> FloatValue {
        let last = self.layer_number_for_depth(self.critical_moisture_depth);
        let (available, capacity) = self.layers[..=last].iter().fold(
            (0.0, 0.0),
            |(available, capacity), layer| {
                let pwp = layer.permanent_wilting_point();
                (
                    available + (layer.moisture() - pwp) * layer.thickness(),
                    capacity + (layer.field_capacity() - pwp) * layer.thickness(),
                )
            },
        );
        if capacity > 0.0 {
            available / capacity
        } else {
            0.0
        }
    }

    /// Irrigate when the plant available water falls below `threshold`.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Plant available water fraction triggering irrigation
    /// * `amount` - Irrigation water [mm]
    /// * `n_concentration` - Nitrate in the irrigation water [mg N l-1]
    ///
    /// # Returns
    ///
    /// True if the column was irrigated
    pub fn apply_irrigation_via_trigger(
        &mut self,
        threshold: FloatValue,
        amount: FloatValue,
        n_concentration: FloatValue,
    ) -> SoilResult<bool> {
        ensure_non_negative("irrigation threshold", threshold)?;
        ensure_non_negative("irrigation amount", amount)?;
        ensure_non_negative("irrigation N concentration", n_concentration)?;

        if let Some(crop) = self.crop() {
            let (start, end) = crop.irrigation_heat_sum_window();
            let temperature_sum = crop.current_temperature_sum();
            if temperature_sum < start || temperature_sum > end {
                return Ok(false);
            }
        }

        let fraction = self.plant_available_water_fraction();
        if fraction < threshold {
            debug!(
                "Plant available water {:.3} below threshold {:.3}, irrigating",
                fraction, threshold
            );
            self.apply_irrigation(amount, n_concentration)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Automatic irrigation with stored parameters.
    pub fn apply_automatic_irrigation(
        &mut self,
        params: &AutomaticIrrigationParameters,
    ) -> SoilResult<bool> {
        params.validate()?;
        self.apply_irrigation_via_trigger(params.threshold, params.amount, params.n_concentration)
    }

    /// Irrigate unconditionally.
    ///
    /// # Arguments
    ///
    /// * `amount` - Irrigation water [mm]
    /// * `n_concentration` - Nitrate in the irrigation water [mg N l-1]
    pub fn apply_irrigation(&mut self, amount: FloatValue, n_concentration: FloatValue) -> SoilResult<()> {
        ensure_non_negative("irrigation amount", amount)?;
        ensure_non_negative("irrigation N concentration", n_concentration)?;

        let mut remaining = amount;
        for layer in &mut self.layers {
            if remaining <= 0.0 {
                break;
            }
            let received = remaining.min(layer.free_pore_space_mm());
            if received > 0.0 {
                let thickness = layer.thickness();
                layer.set_moisture(layer.moisture() + received / (MM_PER_M * thickness))?;
                layer.add_concentration(
                    Constituent::Nitrate,
                    dissolved_nitrogen(received, n_concentration) / thickness,
                );
            }
            remaining -= received;
        }
        let overflow = remaining.max(0.0);
        self.flux_at_lower_boundary += overflow;

        debug!(
            "Irrigated {:.1} mm at {:.1} mg N l-1, {:.1} mm left the profile",
            amount, n_concentration, overflow
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{column, LIMITS};
    use super::*;
    use agrosoil_core::capabilities::CropGrowth;
    use is_close::is_close;
    use std::rc::Rc;

    #[derive(Debug)]
    struct CropAt(FloatValue);

    impl CropGrowth for CropAt {
        fn daily_n_uptake(&self) -> FloatValue {
            0.0
        }

        fn irrigation_heat_sum_window(&self) -> (FloatValue, FloatValue) {
            (200.0, 1200.0)
        }

        fn current_temperature_sum(&self) -> FloatValue {
            self.0
        }

        fn rooting_depth(&self) -> FloatValue {
            0.5
        }
    }

    fn set_moisture(column: &mut SoilColumn, moisture: FloatValue) {
        for layer in column.layers_mut() {
            layer.set_moisture(moisture).unwrap();
        }
    }

    #[test]
    fn test_plant_available_water_fraction() {
        let mut column = column(5, 0.1);
        set_moisture(&mut column, 0.2);
        // (0.2 - 0.1) / (0.3 - 0.1)
        assert!(is_close!(column.plant_available_water_fraction(), 0.5));
    }

    #[test]
    fn test_trigger_strictly_below_threshold() {
        let mut column = column(5, 0.1);
        set_moisture(&mut column, 0.2);
        let fraction = column.plant_available_water_fraction();

        let water = column.total_water_mm();
        assert!(!column.apply_irrigation_via_trigger(fraction, 20.0, 0.0).unwrap());
        assert_eq!(column.total_water_mm(), water);

        assert!(column
            .apply_irrigation_via_trigger(fraction + 1e-6, 20.0, 0.0)
            .unwrap());
        assert!(is_close!(column.total_water_mm(), water + 20.0));
    }

    #[test]
    fn test_trigger_respects_crop_window() {
        let mut column = column(5, 0.1);
        set_moisture(&mut column, 0.12);

        let early: Rc<dyn CropGrowth> = Rc::new(CropAt(100.0));
        column.put_crop(&early);
        assert!(!column.apply_irrigation_via_trigger(0.5, 20.0, 0.0).unwrap());

        let growing: Rc<dyn CropGrowth> = Rc::new(CropAt(600.0));
        column.put_crop(&growing);
        assert!(column.apply_irrigation_via_trigger(0.5, 20.0, 0.0).unwrap());
    }

    #[test]
    fn test_irrigation_fills_from_the_top() {
        let mut column = column(3, 0.1);
        set_moisture(&mut column, 0.3);
        // 15 mm of free pore space per layer
        column.apply_irrigation(20.0, 0.0).unwrap();

        assert!(is_close!(column.layers()[0].moisture(), LIMITS.saturation));
        assert!(is_close!(column.layers()[1].moisture(), 0.35));
        assert!(is_close!(column.layers()[2].moisture(), 0.3));
        assert_eq!(column.flux_at_lower_boundary, 0.0);
    }

    #[test]
    fn test_irrigation_overflow_leaves_profile() {
        let mut column = column(2, 0.1);
        set_moisture(&mut column, 0.4);
        column.apply_irrigation(25.0, 10.0).unwrap();

        assert!(is_close!(column.flux_at_lower_boundary, 15.0));
        for layer in column.layers() {
            assert!(is_close!(layer.moisture(), LIMITS.saturation));
        }
    }

    #[test]
    fn test_irrigation_nitrate_follows_water() {
        let mut column = column(2, 0.1);
        set_moisture(&mut column, 0.4);
        column.apply_irrigation(25.0, 10.0).unwrap();

        // 5 mm at 10 mg N l-1 = 5e-5 kg N m-2 over 0.1 m
        for layer in column.layers() {
            assert!(is_close!(layer.no3(), 5.0e-4));
        }
    }

    #[test]
    fn test_invalid_irrigation_rejected() {
        let mut column = column(2, 0.1);
        let water = column.total_water_mm();
        assert!(column.apply_irrigation(-1.0, 0.0).is_err());
        assert!(column.apply_irrigation(10.0, FloatValue::INFINITY).is_err());
        assert_eq!(column.total_water_mm(), water);
    }

    #[test]
    fn test_automatic_irrigation_parameters() {
        let mut column = column(5, 0.1);
        set_moisture(&mut column, 0.12);
        let params = AutomaticIrrigationParameters::default();
        assert!(column.apply_automatic_irrigation(&params).unwrap());
        assert!(is_close!(column.layers()[0].moisture(), 0.12 + params.amount / 100.0));
    }
}
