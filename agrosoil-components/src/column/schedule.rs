//! Deferred fertiliser applications
//!
//! Pending applications are plain records held in one [`FertiliserSchedule`].
//! Each record counts down once per daily drain and is executed when its
//! countdown reaches zero, so a record scheduled with a delay of `d` days is
//! applied on the `d`-th drain after it was scheduled. A record scheduled
//! with a delay of zero is applied on the next drain.
//!
//! At most one top-dressing is pending at any time: a further top-dressing
//! is added to the pending one, which then waits for the later of the two
//! due days. Records cannot be revoked once scheduled.

use agrosoil_core::parameters::{MineralFertiliserPartition, NMinRequest};
use agrosoil_core::units::FloatValue;
use serde::{Deserialize, Serialize};

/// What a deferred record does when it falls due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduledTask {
    /// Remainder of an NMin fertilisation [kg N ha-1]
    TopDressing {
        amount: FloatValue,
        partition: MineralFertiliserPartition,
    },
    /// A fixed mineral application [kg N ha-1]
    Fixed {
        amount: FloatValue,
        partition: MineralFertiliserPartition,
    },
    /// NMin fertilisation postponed because the soil was too wet
    AdjournedNMin {
        partition: MineralFertiliserPartition,
        request: NMinRequest,
    },
}

impl ScheduledTask {
    pub fn is_top_dressing(&self) -> bool {
        matches!(self, ScheduledTask::TopDressing { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredApplication {
    /// Drains left until the task is executed
    pub remaining_days: u32,
    pub task: ScheduledTask,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertiliserSchedule {
    records: Vec<DeferredApplication>,
}

impl FertiliserSchedule {
    /// All records in the order they were scheduled.
    pub fn pending(&self) -> &[DeferredApplication] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn top_dressing(&self) -> Option<&DeferredApplication> {
        self.records.iter().find(|r| r.task.is_top_dressing())
    }

    /// Amount [kg N ha-1] still waiting as fixed or top-dressing records.
    pub fn pending_amount(&self) -> FloatValue {
        self.records
            .iter()
            .map(|r| match &r.task {
                ScheduledTask::TopDressing { amount, .. } | ScheduledTask::Fixed { amount, .. } => {
                    *amount
                }
                ScheduledTask::AdjournedNMin { .. } => 0.0,
            })
            .sum()
    }

    pub(crate) fn push(&mut self, record: DeferredApplication) {
        self.records.push(record);
    }

    /// Add a top-dressing to the schedule.
    ///
    /// When one is already pending the amounts are summed into it, the
    /// pending partition is kept and the record falls due at the later of
    /// the two due days. Returns the merged record's state before the merge.
    pub(crate) fn add_top_dressing(
        &mut self,
        amount: FloatValue,
        partition: MineralFertiliserPartition,
        delay_days: u32,
    ) -> Option<DeferredApplication> {
        match self.records.iter_mut().find(|r| r.task.is_top_dressing()) {
            Some(record) => {
                let previous = record.clone();
                record.remaining_days = record.remaining_days.max(delay_days);
                if let ScheduledTask::TopDressing { amount: pending, .. } = &mut record.task {
                    *pending += amount;
                }
                Some(previous)
            }
            None => {
                self.records.push(DeferredApplication {
                    remaining_days: delay_days,
                    task: ScheduledTask::TopDressing { amount, partition },
                });
                None
            }
        }
    }

    /// Count down every record selected by `filter` and take out the ones due.
    ///
    /// Due tasks are returned in scheduling order.
    pub(crate) fn drain_due<F>(&mut self, filter: F) -> Vec<ScheduledTask>
    where
        F: Fn(&ScheduledTask) -> bool,
    {
        let mut due = Vec::new();
        let mut kept = Vec::with_capacity(self.records.len());
        for mut record in self.records.drain(..) {
            if filter(&record.task) {
                record.remaining_days = record.remaining_days.saturating_sub(1);
                if record.remaining_days == 0 {
                    due.push(record.task);
                    continue;
                }
            }
            kept.push(record);
        }
        self.records = kept;
        due
    }
}
