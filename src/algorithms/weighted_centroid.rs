/// 加权质心定位
///
/// 对最佳候选点按其匹配到的各路由器静态权重加权，再除以路由器数量。
/// 注意：归一化用的是路由器个数而不是权重之和，结果会整体向原点收缩；保留历史行为，不做修正。

use crate::algorithms::{
    CandidatePoint, Point2D, RouterSet, SmoothingParams, choose_best, rank_and_filter, snap_or_smooth,
};
use crate::error::{PositioningError, Result};

/// 加权质心定位
pub fn weighted_centroid(
    candidates: Vec<CandidatePoint>,
    routers: &RouterSet,
    last_estimate: Point2D,
    params: &SmoothingParams,
) -> Result<Point2D> {
    let ranked = rank_and_filter(candidates);
    let best = choose_best(&ranked, last_estimate)?;
    let weighted = weighted_point(best, routers).ok_or(PositioningError::NoCandidateMatch)?;
    Ok(snap_or_smooth(
        last_estimate,
        weighted,
        best.coordinate,
        params.snap_tolerance_px,
    ))
}

/// 单个候选点的加权坐标
///
/// 未配置权重的路由器按权重 0 计入但仍计数。没有任何路由器记录时为 None。
/// 结果保留小数部分，不取整到整数像素，因此 90px 回退判断用的是未取整的坐标。
pub fn weighted_point(candidate: &CandidatePoint, routers: &RouterSet) -> Option<Point2D> {
    let count = candidate.router_count();
    if count == 0 {
        return None;
    }

    let mut weighted_x = 0.0;
    let mut weighted_y = 0.0;
    for router in candidate.signal_diff_by_router.keys() {
        let weight = routers.weight(router).unwrap_or(0.0);
        weighted_x += weight * candidate.coordinate.x;
        weighted_y += weight * candidate.coordinate.y;
    }

    Some(Point2D::new(weighted_x / count as f64, weighted_y / count as f64))
}
