/// 路由器筛选：四个路由器都有读数时丢弃信号最弱的一个

use crate::algorithms::AccessPointObservation;
use crate::error::{PositioningError, Result};

/// 参与筛选所需的路由器数量
pub const ROUTERS_FOR_SELECTION: usize = 4;

/// 几何算法需要的路由器数量
pub const ROUTERS_FOR_GEOMETRY: usize = 3;

/// 恰好 4 个观测时移除原始 RSS 值最小（最负，即最弱）的一个，其余保持输入顺序。
///
/// 比较使用带符号的原始值，不取绝对值。多个相同最小值时移除第一个。
/// 观测数量不是 4 时原样返回。
pub fn select_routers(observations: &[AccessPointObservation]) -> Vec<AccessPointObservation> {
    let mut selected = observations.to_vec();
    if selected.len() != ROUTERS_FOR_SELECTION {
        return selected;
    }

    let mut weakest = 0;
    for (index, observation) in selected.iter().enumerate() {
        if observation.rss_dbm() < selected[weakest].rss_dbm() {
            weakest = index;
        }
    }
    selected.remove(weakest);
    selected
}

/// 筛选并要求得到恰好 3 个路由器
pub fn require_trio(observations: &[AccessPointObservation]) -> Result<[AccessPointObservation; 3]> {
    let selected = select_routers(observations);
    let available = selected.len();
    <[AccessPointObservation; 3]>::try_from(selected).map_err(|_| {
        PositioningError::InsufficientRouters {
            available,
            required: ROUTERS_FOR_GEOMETRY,
        }
    })
}
