//! Mineral fertilisation
//!
//! # NMin Method
//!
//! The fertiliser demand is derived from the mineral nitrogen found in the
//! soil, sampled down to the request's sampling depth and down to 30 cm:
//!
//! $$D = \max(N_{target} - N_{sampling},\ N_{target,30} - N_{30})$$
//!
//! No fertiliser is given when $D$ is below the minimum application, larger
//! demands are capped at the maximum application. With a top-dressing delay
//! only the immediate fraction is given on the day, the remainder is stored
//! as the pending top-dressing.
//!
//! When the top layer is wetter than field capacity the field cannot be
//! driven on and the fertilisation is adjourned to the next day.
//!
//! # N Demand Method
//!
//! A known nitrogen demand is met directly: the mineral nitrogen found down
//! to the demand depth is subtracted from the demand and the shortfall, if
//! any, is applied on the day.

use super::schedule::{DeferredApplication, ScheduledTask};
use super::SoilColumn;
use crate::layer::Constituent;
use agrosoil_core::errors::{ensure_non_negative, SoilResult};
use agrosoil_core::parameters::{MineralFertiliserPartition, NMinRequest};
use agrosoil_core::units::{kg_per_ha_to_kg_per_m3, FloatValue, NMIN_SECONDARY_DEPTH};
use log::{debug, info, warn};

impl SoilColumn {
    /// Apply mineral nitrogen [kg N ha-1] to the top layer.
    ///
    /// The amount is split into carbamide, NH4 and NO3 by the partition.
    /// Nothing is changed when the amount or the partition is invalid.
    pub fn apply_mineral_fertiliser(
        &mut self,
        partition: &MineralFertiliserPartition,
        amount: FloatValue,
    ) -> SoilResult<()> {
        ensure_non_negative("mineral fertiliser amount", amount)?;
        partition.validate()?;
        self.add_mineral_fertiliser(partition, amount);
        Ok(())
    }

    /// Adds an already validated application to the top layer.
    fn add_mineral_fertiliser(&mut self, partition: &MineralFertiliserPartition, amount: FloatValue) {
        let top = &mut self.layers[0];
        let thickness = top.thickness();
        for (constituent, fraction) in [
            (Constituent::Carbamide, partition.carbamide),
            (Constituent::Ammonium, partition.nh4),
            (Constituent::Nitrate, partition.no3),
        ] {
            top.add_concentration(constituent, kg_per_ha_to_kg_per_m3(amount * fraction, thickness));
        }

        debug!(
            "Applied {:.2} kg N ha-1 of mineral fertiliser '{}'",
            amount, partition.name
        );
    }

    /// Fertilise up to a known nitrogen demand [kg N ha-1].
    ///
    /// The mineral nitrogen down to `demand_depth` [m] is subtracted from
    /// `n_demand` and the shortfall is applied at once.
    ///
    /// # Returns
    ///
    /// The amount applied [kg N ha-1], zero when the soil already holds the
    /// demand.
    pub fn apply_mineral_fertiliser_via_n_demand(
        &mut self,
        partition: &MineralFertiliserPartition,
        demand_depth: FloatValue,
        n_demand: FloatValue,
    ) -> SoilResult<FloatValue> {
        ensure_non_negative("N demand depth", demand_depth)?;
        ensure_non_negative("N demand", n_demand)?;
        partition.validate()?;

        let soil_n = self.mineral_nitrogen_kg_per_ha(demand_depth);
        let recommendation = (n_demand - soil_n).max(0.0);
        if recommendation > 0.0 {
            self.add_mineral_fertiliser(partition, recommendation);
        } else {
            debug!(
                "Soil holds {:.2} kg N ha-1 down to {:.2} m, N demand of {:.2} already met",
                soil_n, demand_depth, n_demand
            );
        }
        Ok(recommendation)
    }

    /// Fertilise by the NMin method.
    ///
    /// # Returns
    ///
    /// The amount applied on this day [kg N ha-1]. A delayed remainder is
    /// not included, it is applied later by the daily drain.
    pub fn apply_mineral_fertiliser_via_nmin_method(
        &mut self,
        partition: &MineralFertiliserPartition,
        request: &NMinRequest,
    ) -> SoilResult<FloatValue> {
        partition.validate()?;
        request.validate()?;
        Ok(self.run_nmin_method(partition, request))
    }

    fn run_nmin_method(
        &mut self,
        partition: &MineralFertiliserPartition,
        request: &NMinRequest,
    ) -> FloatValue {
        let top = &self.layers[0];
        if top.moisture() > top.field_capacity() {
            info!(
                "Top layer wetter than field capacity ({:.3} > {:.3}), NMin fertilisation adjourned by one day",
                top.moisture(),
                top.field_capacity()
            );
            self.schedule.push(DeferredApplication {
                remaining_days: 1,
                task: ScheduledTask::AdjournedNMin {
                    partition: partition.clone(),
                    request: request.clone(),
                },
            });
            return 0.0;
        }

        let n_sampling = self.mineral_nitrogen_kg_per_ha(request.sampling_depth);
        let n_30 = self.mineral_nitrogen_kg_per_ha(NMIN_SECONDARY_DEPTH);
        let deficit = (request.target_n - n_sampling).max(request.target_n_30 - n_30);

        if deficit <= 0.0 || deficit < request.min_application {
            debug!(
                "NMin demand {:.2} kg N ha-1 below the minimum application {:.2}, no fertiliser applied",
                deficit, request.min_application
            );
            return 0.0;
        }

        let amount = deficit.min(request.max_application);
        if deficit > request.max_application {
            debug!(
                "NMin demand {:.2} kg N ha-1 capped at the maximum application {:.2}",
                deficit, request.max_application
            );
        }

        if request.top_dressing_delay_days == 0 {
            self.add_mineral_fertiliser(partition, amount);
            return amount;
        }

        let immediate = amount * request.immediate_fraction;
        if immediate > 0.0 {
            self.add_mineral_fertiliser(partition, immediate);
        }
        self.schedule_top_dressing(partition, amount - immediate, request.top_dressing_delay_days);
        immediate
    }

    fn schedule_top_dressing(
        &mut self,
        partition: &MineralFertiliserPartition,
        amount: FloatValue,
        delay_days: u32,
    ) {
        if amount <= 0.0 {
            return;
        }
        debug!(
            "Top-dressing of {:.2} kg N ha-1 due in {} days",
            amount, delay_days
        );
        if let Some(pending) = self
            .schedule
            .add_top_dressing(amount, partition.clone(), delay_days)
        {
            warn!(
                "Top-dressing of {:.2} kg N ha-1 added to the pending one with {} days remaining: {:?}",
                amount, pending.remaining_days, pending.task
            );
        }
    }

    /// Queue a mineral application [kg N ha-1] for `delay_days` daily drains.
    pub fn schedule_fertiliser(
        &mut self,
        partition: &MineralFertiliserPartition,
        amount: FloatValue,
        delay_days: u32,
    ) -> SoilResult<()> {
        ensure_non_negative("mineral fertiliser amount", amount)?;
        partition.validate()?;
        debug!(
            "Scheduled {:.2} kg N ha-1 of '{}' in {} days",
            amount, partition.name, delay_days
        );
        self.schedule.push(DeferredApplication {
            remaining_days: delay_days,
            task: ScheduledTask::Fixed {
                amount,
                partition: partition.clone(),
            },
        });
        Ok(())
    }

    /// Count down the pending top-dressing and apply it when due.
    ///
    /// Returns the amount applied [kg N ha-1], zero on days without a due
    /// top-dressing.
    pub fn apply_possible_top_dressing(&mut self) -> FloatValue {
        let mut applied = 0.0;
        for task in self.schedule.drain_due(ScheduledTask::is_top_dressing) {
            if let ScheduledTask::TopDressing { amount, partition } = task {
                info!("Applying top-dressing of {:.2} kg N ha-1", amount);
                self.add_mineral_fertiliser(&partition, amount);
                applied += amount;
            }
        }
        applied
    }

    /// Count down every deferred application and execute those due.
    ///
    /// Adjourned NMin requests are evaluated again against the current soil
    /// and may be adjourned once more. Returns the total applied [kg N ha-1].
    pub fn apply_possible_delayed_fertiliser(&mut self) -> FloatValue {
        let mut applied = 0.0;
        for task in self.schedule.drain_due(|task| !task.is_top_dressing()) {
            match task {
                ScheduledTask::Fixed { amount, partition } => {
                    info!("Applying delayed fertiliser of {:.2} kg N ha-1", amount);
                    self.add_mineral_fertiliser(&partition, amount);
                    applied += amount;
                }
                ScheduledTask::AdjournedNMin { partition, request } => {
                    info!("Retrying adjourned NMin fertilisation");
                    applied += self.run_nmin_method(&partition, &request);
                }
                ScheduledTask::TopDressing { .. } => {}
            }
        }
        applied
    }

    /// Daily drain of the schedule: top-dressing first, then deferred records.
    ///
    /// Every record was validated when it was scheduled, so draining cannot
    /// fail.
    pub fn apply_scheduled_fertiliser(&mut self) -> FloatValue {
        let top_dressing = self.apply_possible_top_dressing();
        let delayed = self.apply_possible_delayed_fertiliser();
        top_dressing + delayed
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::column;
    use super::*;
    use agrosoil_core::errors::SoilError;
    use is_close::is_close;

    fn nitrogen_in_column(column: &SoilColumn) -> FloatValue {
        column
            .layers()
            .iter()
            .map(|l| (l.mineral_nitrogen() + l.carbamide()) * l.thickness() * 10_000.0)
            .sum()
    }

    fn request(target_n: FloatValue, delay: u32) -> NMinRequest {
        NMinRequest {
            sampling_depth: 0.3,
            target_n,
            target_n_30: 0.0,
            min_application: 10.0,
            max_application: 60.0,
            top_dressing_delay_days: delay,
            immediate_fraction: 0.0,
        }
    }

    fn with_soil_nitrogen(kg_per_ha: FloatValue) -> SoilColumn {
        let mut column = column(5, 0.1);
        column
            .layer_mut(0)
            .unwrap()
            .set_concentration(Constituent::Nitrate, kg_per_ha_to_kg_per_m3(kg_per_ha, 0.1))
            .unwrap();
        column
    }

    #[test]
    fn test_nitrate_to_top_layer_only() {
        let mut column = column(5, 0.1);
        column
            .apply_mineral_fertiliser(&MineralFertiliserPartition::nitrate(), 40.0)
            .unwrap();

        assert!(is_close!(column.layers()[0].no3(), 0.04));
        for layer in &column.layers()[1..] {
            assert_eq!(layer.no3(), 0.0);
        }
    }

    #[test]
    fn test_partition_split() {
        let mut column = column(5, 0.2);
        let partition = MineralFertiliserPartition::new("x", "mix", 0.5, 0.3, 0.2);
        column.apply_mineral_fertiliser(&partition, 100.0).unwrap();

        let top = &column.layers()[0];
        assert!(is_close!(top.carbamide(), 0.025));
        assert!(is_close!(top.nh4(), 0.015));
        assert!(is_close!(top.no3(), 0.01));
        assert!(is_close!(nitrogen_in_column(&column), 100.0));
    }

    #[test]
    fn test_invalid_application_leaves_state_unchanged() {
        let mut column = column(5, 0.1);
        assert!(matches!(
            column.apply_mineral_fertiliser(&MineralFertiliserPartition::nitrate(), -5.0),
            Err(SoilError::InvalidMagnitude { .. })
        ));
        let partition = MineralFertiliserPartition::new("x", "x", 0.6, 0.6, 0.0);
        assert!(matches!(
            column.apply_mineral_fertiliser(&partition, 5.0),
            Err(SoilError::InvalidPartition { .. })
        ));
        assert_eq!(nitrogen_in_column(&column), 0.0);
    }

    #[test]
    fn test_nmin_applies_deficit() {
        let mut column = with_soil_nitrogen(20.0);
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(
                &MineralFertiliserPartition::nitrate(),
                &request(50.0, 0),
            )
            .unwrap();
        assert!(is_close!(applied, 30.0));
        assert!(is_close!(column.mineral_nitrogen_kg_per_ha(0.3), 50.0));
    }

    #[test]
    fn test_nmin_below_minimum_applies_nothing() {
        let mut column = with_soil_nitrogen(45.0);
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(
                &MineralFertiliserPartition::nitrate(),
                &request(50.0, 0),
            )
            .unwrap();
        assert_eq!(applied, 0.0);

        let mut column = with_soil_nitrogen(80.0);
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(
                &MineralFertiliserPartition::nitrate(),
                &request(50.0, 0),
            )
            .unwrap();
        assert_eq!(applied, 0.0);
        assert!(column.fertiliser_schedule().is_empty());
    }

    #[test]
    fn test_nmin_capped_at_maximum() {
        let mut column = with_soil_nitrogen(0.0);
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(
                &MineralFertiliserPartition::nitrate(),
                &request(150.0, 0),
            )
            .unwrap();
        assert_eq!(applied, 60.0);
    }

    #[test]
    fn test_nmin_uses_larger_shortfall() {
        let mut column = with_soil_nitrogen(20.0);
        let request = NMinRequest {
            target_n_30: 45.0,
            ..request(30.0, 0)
        };
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(&MineralFertiliserPartition::nitrate(), &request)
            .unwrap();
        assert!(is_close!(applied, 25.0));
    }

    #[test]
    fn test_nmin_delayed_top_dressing() {
        let mut column = with_soil_nitrogen(20.0);
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(
                &MineralFertiliserPartition::nitrate(),
                &request(50.0, 3),
            )
            .unwrap();
        assert_eq!(applied, 0.0);
        assert!(is_close!(column.fertiliser_schedule().pending_amount(), 30.0));

        assert_eq!(column.apply_possible_top_dressing(), 0.0);
        assert_eq!(column.apply_possible_top_dressing(), 0.0);
        assert!(is_close!(column.apply_possible_top_dressing(), 30.0));
        assert_eq!(column.apply_possible_top_dressing(), 0.0);
        assert!(is_close!(column.mineral_nitrogen_kg_per_ha(0.3), 50.0));
    }

    #[test]
    fn test_nmin_immediate_fraction() {
        let mut column = with_soil_nitrogen(20.0);
        let request = NMinRequest {
            immediate_fraction: 0.4,
            ..request(50.0, 2)
        };
        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(&MineralFertiliserPartition::nitrate(), &request)
            .unwrap();
        assert!(is_close!(applied, 12.0));
        assert!(is_close!(column.fertiliser_schedule().pending_amount(), 18.0));
    }

    #[test]
    fn test_nmin_adjourned_when_wet() {
        let mut column = with_soil_nitrogen(20.0);
        column.layer_mut(0).unwrap().set_moisture(0.4).unwrap();

        let applied = column
            .apply_mineral_fertiliser_via_nmin_method(
                &MineralFertiliserPartition::nitrate(),
                &request(50.0, 0),
            )
            .unwrap();
        assert_eq!(applied, 0.0);
        assert_eq!(column.fertiliser_schedule().pending().len(), 1);

        // Still wet on the next day: adjourned again
        assert_eq!(column.apply_possible_delayed_fertiliser(), 0.0);
        assert_eq!(column.fertiliser_schedule().pending().len(), 1);

        column.layer_mut(0).unwrap().set_moisture(0.25).unwrap();
        let applied = column.apply_possible_delayed_fertiliser();
        assert!(is_close!(applied, 30.0));
        assert!(column.fertiliser_schedule().is_empty());
    }

    #[test]
    fn test_delayed_fertiliser() {
        let mut column = column(5, 0.1);
        let partition = MineralFertiliserPartition::calcium_ammonium_nitrate();
        column.schedule_fertiliser(&partition, 20.0, 2).unwrap();
        column.schedule_fertiliser(&partition, 10.0, 1).unwrap();
        column.schedule_fertiliser(&partition, 5.0, 2).unwrap();

        assert_eq!(column.apply_possible_delayed_fertiliser(), 10.0);
        assert_eq!(column.apply_possible_delayed_fertiliser(), 25.0);
        assert_eq!(column.apply_possible_delayed_fertiliser(), 0.0);
        assert!(is_close!(nitrogen_in_column(&column), 35.0));
    }

    #[test]
    fn test_schedule_rejects_invalid_amount() {
        let mut column = column(5, 0.1);
        assert!(column
            .schedule_fertiliser(&MineralFertiliserPartition::nitrate(), FloatValue::NAN, 1)
            .is_err());
        assert!(column.fertiliser_schedule().is_empty());
    }

    #[test]
    fn test_second_top_dressing_adds_to_pending() {
        let mut column = with_soil_nitrogen(20.0);
        let partition = MineralFertiliserPartition::nitrate();
        column
            .apply_mineral_fertiliser_via_nmin_method(&partition, &request(50.0, 5))
            .unwrap();
        let request = NMinRequest {
            sampling_depth: 0.1,
            ..request(40.0, 2)
        };
        column
            .apply_mineral_fertiliser_via_nmin_method(&partition, &request)
            .unwrap();

        let pending = column.fertiliser_schedule().pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].remaining_days, 5);
        assert!(is_close!(column.fertiliser_schedule().pending_amount(), 50.0));

        let applied: FloatValue = (0..5).map(|_| column.apply_scheduled_fertiliser()).sum();
        assert!(is_close!(applied, 50.0));
        assert!(is_close!(nitrogen_in_column(&column), 70.0));
    }

    #[test]
    fn test_fully_immediate_nmin_keeps_pending_top_dressing() {
        let mut column = column(5, 0.1);
        let partition = MineralFertiliserPartition::nitrate();
        column
            .apply_mineral_fertiliser_via_nmin_method(&partition, &request(50.0, 3))
            .unwrap();
        assert!(is_close!(column.fertiliser_schedule().pending_amount(), 50.0));

        let request = NMinRequest {
            sampling_depth: 0.1,
            immediate_fraction: 1.0,
            ..request(20.0, 3)
        };
        let immediate = column
            .apply_mineral_fertiliser_via_nmin_method(&partition, &request)
            .unwrap();
        assert!(is_close!(immediate, 20.0));
        assert_eq!(column.fertiliser_schedule().pending().len(), 1);
        assert!(is_close!(column.fertiliser_schedule().pending_amount(), 50.0));

        let later: FloatValue = (0..5).map(|_| column.apply_scheduled_fertiliser()).sum();
        assert!(is_close!(later, 50.0));
        assert!(is_close!(nitrogen_in_column(&column), 70.0));
    }

    #[test]
    fn test_n_demand_applies_shortfall() {
        let mut column = with_soil_nitrogen(25.0);
        let applied = column
            .apply_mineral_fertiliser_via_n_demand(&MineralFertiliserPartition::nitrate(), 0.3, 60.0)
            .unwrap();
        assert!(is_close!(applied, 35.0));
        assert!(is_close!(column.mineral_nitrogen_kg_per_ha(0.3), 60.0));
        assert!(column.fertiliser_schedule().is_empty());
    }

    #[test]
    fn test_n_demand_met_by_soil() {
        let mut column = with_soil_nitrogen(40.0);
        let applied = column
            .apply_mineral_fertiliser_via_n_demand(&MineralFertiliserPartition::urea(), 0.2, 30.0)
            .unwrap();
        assert_eq!(applied, 0.0);
        assert!(is_close!(nitrogen_in_column(&column), 40.0));
    }

    #[test]
    fn test_n_demand_rejects_invalid_input() {
        let mut column = column(5, 0.1);
        let partition = MineralFertiliserPartition::nitrate();
        assert!(matches!(
            column.apply_mineral_fertiliser_via_n_demand(&partition, FloatValue::NAN, 30.0),
            Err(SoilError::InvalidMagnitude { .. })
        ));
        assert!(matches!(
            column.apply_mineral_fertiliser_via_n_demand(&partition, 0.3, -1.0),
            Err(SoilError::InvalidMagnitude { .. })
        ));
        assert_eq!(nitrogen_in_column(&column), 0.0);
    }

    #[test]
    fn test_scheduled_drain_sums_both_kinds() {
        let mut column = with_soil_nitrogen(20.0);
        let partition = MineralFertiliserPartition::nitrate();
        column
            .apply_mineral_fertiliser_via_nmin_method(&partition, &request(50.0, 1))
            .unwrap();
        column.schedule_fertiliser(&partition, 15.0, 1).unwrap();

        let applied = column.apply_scheduled_fertiliser();
        assert!(is_close!(applied, 45.0));
        assert!(column.fertiliser_schedule().is_empty());
    }
}
