/// 候选标定点聚合
///
/// 对每个观测按 RSS 容差查询训练数据，把所有观测匹配到的标定点合并为一次定位内的候选集合。

use crate::algorithms::{AccessPointObservation, CandidatePoint};
use crate::error::StoreError;
use crate::training::TrainingStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 聚合参数
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationParams {
    /// RSS 容差半宽（dBm）
    pub band_half_width: i32,
    /// 信号幅值超过该值时附加弱信号偏差
    pub weakness_threshold: i32,
    /// 弱信号偏差的整数除数
    pub weakness_divisor: i32,
}

impl Default for AggregationParams {
    fn default() -> Self {
        AggregationParams {
            band_half_width: 2,
            weakness_threshold: 55,
            weakness_divisor: 5,
        }
    }
}

/// RSS 查询边界 `(|r + w|, |r - w|)`，按此顺序传给存储
pub fn rss_band(rss_dbm: i32, half_width: i32) -> (i32, i32) {
    ((rss_dbm + half_width).abs(), (rss_dbm - half_width).abs())
}

/// 观测与样本之间的偏差：`||r| - rss| + 弱信号偏差`
pub fn signal_deviation(rss_dbm: i32, sample_rss: i32, params: &AggregationParams) -> i32 {
    let magnitude = rss_dbm.abs();
    let weakness = magnitude - params.weakness_threshold;
    let bonus = if weakness > 0 && params.weakness_divisor != 0 {
        weakness / params.weakness_divisor
    } else {
        0
    };
    (magnitude - sample_rss).abs() + bonus
}

/// 一次定位内的候选集合，保持首次匹配顺序
#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
    candidates: Vec<CandidatePoint>,
    index: HashMap<String, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location_id: &str) -> Option<&CandidatePoint> {
        self.index.get(location_id).map(|&i| &self.candidates[i])
    }

    pub fn get_mut(&mut self, location_id: &str) -> Option<&mut CandidatePoint> {
        let i = *self.index.get(location_id)?;
        self.candidates.get_mut(i)
    }

    /// 追加首次匹配的标定点，调用方先用 `get_mut` 确认其不存在
    fn push_new(&mut self, candidate: CandidatePoint) {
        self.index
            .insert(candidate.location_id.clone(), self.candidates.len());
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidatePoint> {
        self.candidates.iter()
    }

    pub fn into_vec(self) -> Vec<CandidatePoint> {
        self.candidates
    }
}

/// 查询所有观测的匹配样本并聚合为候选集合
///
/// 每条匹配样本都使对应标定点的频次加一；同一路由器的偏差覆盖旧值。
/// 没有坐标的标定点被跳过。某个路由器的容差查询失败时记录警告并跳过该路由器，
/// 其余路由器照常聚合。
pub fn get_likeliest_points<S: TrainingStore + ?Sized>(
    store: &S,
    observations: &[AccessPointObservation],
    params: &AggregationParams,
) -> Result<CandidateSet, StoreError> {
    let mut set = CandidateSet::new();

    for observation in observations {
        let rss = observation.rss_dbm();
        let (first_bound, second_bound) = rss_band(rss, params.band_half_width);
        let samples =
            match store.locations_by_rss_band(observation.router_id(), first_bound, second_bound) {
                Ok(samples) => samples,
                Err(err) => {
                    warn!(router = %observation.router_id(), %err, "calibration query failed, router skipped");
                    continue;
                }
            };
        debug!(
            router = %observation.router_id(),
            rss,
            matches = samples.len(),
            "calibration samples in band"
        );

        for sample in samples {
            let deviation = signal_deviation(rss, sample.rss, params);
            if let Some(candidate) = set.get_mut(&sample.location_id) {
                candidate.record_match(observation.router_id().clone(), deviation);
                continue;
            }

            match store.coordinate_of_location(&sample.location_id)? {
                Some(coordinate) => set.push_new(CandidatePoint::new(
                    sample.location_id,
                    coordinate,
                    observation.router_id().clone(),
                    deviation,
                )),
                None => debug!(location = %sample.location_id, "calibration location has no coordinate"),
            }
        }
    }

    Ok(set)
}
