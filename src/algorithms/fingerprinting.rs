/// 指纹定位（k 近邻平滑）与模式匹配（单一最佳点）
///
/// 两者共用同一条候选点流水线：聚合 -> 频次过滤 -> 择优。
/// 指纹定位在候选点足够多时取前 K 个最佳点的质心，并在质心明显偏离历史轨迹时退回最佳点。

use crate::algorithms::{CandidatePoint, Point2D, best_index, choose_best, rank_and_filter};
use crate::error::{PositioningError, Result};
use serde::{Deserialize, Serialize};

/// 平滑参数
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    /// 参与质心计算的近邻数量 K
    pub k_nearest_neighbors: usize,
    /// 平滑点比最佳点远离上一次估计超过该值（像素）时采用最佳点
    pub snap_tolerance_px: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        SmoothingParams {
            k_nearest_neighbors: 4,
            snap_tolerance_px: 90.0,
        }
    }
}

/// 指纹定位
pub fn fingerprint(
    candidates: Vec<CandidatePoint>,
    last_estimate: Point2D,
    params: &SmoothingParams,
) -> Result<Point2D> {
    let ranked = rank_and_filter(candidates);
    if ranked.len() < params.k_nearest_neighbors {
        return choose_best(&ranked, last_estimate).map(|c| c.coordinate);
    }
    k_nearest_estimate(ranked, last_estimate, params)
}

/// 模式匹配：与指纹定位相同的候选流水线，但总是直接返回最佳点
pub fn pattern_matching(candidates: Vec<CandidatePoint>, last_estimate: Point2D) -> Result<Point2D> {
    let ranked = rank_and_filter(candidates);
    choose_best(&ranked, last_estimate).map(|c| c.coordinate)
}

/// 依次取出 K 个平均偏差最小的候选点，求质心后做平滑/回退判断
pub fn k_nearest_estimate(
    mut ranked: Vec<CandidatePoint>,
    last_estimate: Point2D,
    params: &SmoothingParams,
) -> Result<Point2D> {
    let best = choose_best(&ranked, last_estimate)?.coordinate;

    let mut neighbours = Vec::with_capacity(params.k_nearest_neighbors);
    while neighbours.len() < params.k_nearest_neighbors {
        let Some(index) = best_index(&ranked) else {
            break;
        };
        neighbours.push(ranked.remove(index).coordinate);
    }

    let centroid = integer_centroid(&neighbours).ok_or(PositioningError::NoCandidateMatch)?;
    Ok(snap_or_smooth(last_estimate, centroid, best, params.snap_tolerance_px))
}

/// 整数截断的等权质心（标定点坐标均为整数像素）
pub fn integer_centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Some(Point2D::new((sum_x / count).trunc(), (sum_y / count).trunc()))
}

/// 平滑点相对最佳点离上一次估计远出 `tolerance` 以上时返回最佳点，否则返回平滑点
pub fn snap_or_smooth(last_estimate: Point2D, smoothed: Point2D, best: Point2D, tolerance: f64) -> Point2D {
    let distance_from_smoothed = last_estimate.distance_to(&smoothed);
    let distance_from_best = last_estimate.distance_to(&best);
    if distance_from_smoothed - distance_from_best > tolerance {
        best
    } else {
        smoothed
    }
}
