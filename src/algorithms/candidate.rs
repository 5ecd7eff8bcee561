/// 候选标定点及其排序、择优
///
/// 候选点来自一次定位中所有观测对训练数据的匹配结果，只在该次定位内有效。

use crate::algorithms::{Point2D, RouterId};
use crate::error::{PositioningError, Result};
use std::collections::BTreeMap;

/// 候选标定点
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePoint {
    /// 标定点标识（如房间号）
    pub location_id: String,
    /// 标定点坐标
    pub coordinate: Point2D,
    /// 被观测匹配的次数
    pub frequency_count: u32,
    /// 路由器 -> RSS 偏差；同一路由器的后续匹配会覆盖而不是累加
    pub signal_diff_by_router: BTreeMap<RouterId, i32>,
}

impl CandidatePoint {
    /// 首次匹配时创建，频次为 1
    pub fn new(location_id: impl Into<String>, coordinate: Point2D, router: RouterId, deviation: i32) -> Self {
        let mut signal_diff_by_router = BTreeMap::new();
        signal_diff_by_router.insert(router, deviation);
        CandidatePoint {
            location_id: location_id.into(),
            coordinate,
            frequency_count: 1,
            signal_diff_by_router,
        }
    }

    /// 再次匹配：频次加一，覆盖该路由器的偏差
    pub fn record_match(&mut self, router: RouterId, deviation: i32) {
        self.frequency_count += 1;
        self.signal_diff_by_router.insert(router, deviation);
    }

    /// 记录了偏差的路由器数量
    pub fn router_count(&self) -> usize {
        self.signal_diff_by_router.len()
    }

    /// 平均信号偏差；没有任何偏差记录时为 None
    pub fn average_signal_diff(&self) -> Option<f64> {
        if self.signal_diff_by_router.is_empty() {
            return None;
        }
        let total: f64 = self.signal_diff_by_router.values().map(|&d| d as f64).sum();
        Some(total / self.signal_diff_by_router.len() as f64)
    }
}

/// 只保留出现频次最高的候选点
///
/// 按频次稳定升序排序后，从头部移除低于最大频次的元素。同为最大频次的候选点不在此处区分。
pub fn rank_and_filter(mut candidates: Vec<CandidatePoint>) -> Vec<CandidatePoint> {
    candidates.sort_by_key(|c| c.frequency_count);
    let Some(highest) = candidates.last().map(|c| c.frequency_count) else {
        return candidates;
    };
    candidates.retain(|c| c.frequency_count == highest);
    candidates
}

/// 按列表顺序扫描，选出平均偏差最小的候选点下标
///
/// 偏差严格更小则替换；完全相等时选离上一次估计更近的一个；仍相等则保留先出现的。
pub fn choose_best_index(candidates: &[CandidatePoint], last_estimate: Point2D) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let Some(average) = candidate.average_signal_diff() else {
            continue;
        };
        match best {
            None => best = Some((index, average)),
            Some((best_index, best_average)) => {
                if average < best_average {
                    best = Some((index, average));
                } else if average == best_average {
                    let new_distance = last_estimate.distance_to(&candidate.coordinate);
                    let old_distance = last_estimate.distance_to(&candidates[best_index].coordinate);
                    if new_distance < old_distance {
                        best = Some((index, average));
                    }
                }
            }
        }
    }
    best.map(|(index, _)| index)
        .ok_or(PositioningError::NoCandidateMatch)
}

/// 选出最佳候选点
pub fn choose_best(candidates: &[CandidatePoint], last_estimate: Point2D) -> Result<&CandidatePoint> {
    choose_best_index(candidates, last_estimate).map(|index| &candidates[index])
}

/// 平均偏差最小的候选点下标，不做距离决胜（k 近邻逐个取出时使用）
pub fn best_index(candidates: &[CandidatePoint]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let Some(average) = candidate.average_signal_diff() else {
            continue;
        };
        match best {
            Some((_, best_average)) if average >= best_average => {}
            _ => best = Some((index, average)),
        }
    }
    best.map(|(index, _)| index)
}
