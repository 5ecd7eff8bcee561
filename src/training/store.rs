/// 训练数据存储接口
///
/// 定位引擎只读访问存储，使用以下四种查询。

use crate::algorithms::{Point2D, RouterId};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// 某个路由器在某个标定点记录的一条 RSS 样本
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// 记录的 RSS 幅值（正数，dBm 的绝对值）
    pub rss: i32,
    /// 标定点标识
    pub location_id: String,
}

impl CalibrationSample {
    pub fn new(rss: i32, location_id: impl Into<String>) -> Self {
        CalibrationSample {
            rss,
            location_id: location_id.into(),
        }
    }
}

/// 只读训练数据存储
pub trait TrainingStore {
    /// 某路由器 RSS 落在两个边界之间（含边界）的全部样本。
    ///
    /// 两个边界是无序的一对：调用方按 `(|r+2|, |r-2|)` 的顺序传入，实现必须容忍任一顺序。
    fn locations_by_rss_band(
        &self,
        router: &RouterId,
        first_bound: i32,
        second_bound: i32,
    ) -> Result<Vec<CalibrationSample>, StoreError>;

    /// 标定点坐标，不存在时为 None
    fn coordinate_of_location(&self, location_id: &str) -> Result<Option<Point2D>, StoreError>;

    /// 全部标定点坐标（会话开始时给地图渲染用）
    fn all_training_coordinates(&self) -> Result<Vec<Point2D>, StoreError>;

    /// 路由器坐标，不存在时为 None
    fn router_coordinate(&self, router: &RouterId) -> Result<Option<Point2D>, StoreError>;
}
