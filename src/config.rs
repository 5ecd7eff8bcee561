/// 定位引擎配置
///
/// 路由器位置与权重、模型参数、平滑参数、回放参数，可从 JSON 文件加载。

use crate::algorithms::{
    DistanceModel, Point2D, ROUTERS_FOR_SELECTION, Router, RouterSet, SmoothingParams,
};
use crate::error::ConfigError;
use crate::training::AggregationParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// 地图边界，超出范围的估计点被拉回到边缘内侧
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub width: f64,
    pub height: f64,
    /// 越界点放置在距边缘多少像素处
    #[serde(default = "default_pixel_adjustment")]
    pub pixel_adjustment: f64,
}

fn default_pixel_adjustment() -> f64 {
    25.0
}

impl MapBounds {
    pub fn new(width: f64, height: f64) -> Self {
        MapBounds {
            width,
            height,
            pixel_adjustment: default_pixel_adjustment(),
        }
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// 把越界坐标移到距边缘 `pixel_adjustment` 处，界内坐标不变
    pub fn clamp(&self, point: Point2D) -> Point2D {
        let mut clamped = point;
        if clamped.x < 0.0 {
            clamped.x = self.pixel_adjustment;
        }
        if clamped.x > self.width {
            clamped.x = self.width - self.pixel_adjustment;
        }
        if clamped.y > self.height {
            clamped.y = self.height - self.pixel_adjustment;
        }
        if clamped.y < 0.0 {
            clamped.y = self.pixel_adjustment;
        }
        clamped
    }
}

/// 回放参数
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayParams {
    /// 相邻两个采样周期的间隔（录制时间轴，毫秒）
    pub interval_ms: i64,
    /// 采样窗口半宽：窗口为 `[t - half, t + half)`
    pub half_window_ms: i64,
    /// 定时播放时两次输出之间的实际间隔（毫秒）
    pub playback_period_ms: u64,
}

impl Default for ReplayParams {
    fn default() -> Self {
        ReplayParams {
            interval_ms: 5000,
            half_window_ms: 500,
            playback_period_ms: 1000,
        }
    }
}

/// 定位配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    /// 路由器 SSID 前缀，后接编号
    pub ssid_prefix: String,
    /// 四个固定路由器
    pub routers: Vec<Router>,
    pub distance_model: DistanceModel,
    pub aggregation: AggregationParams,
    pub smoothing: SmoothingParams,
    /// 各算法"上一次估计"的初始值
    pub calibration_start: Point2D,
    pub map_bounds: Option<MapBounds>,
    pub replay: ReplayParams,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        PositioningConfig {
            ssid_prefix: "CiscoLinksysE120".to_string(),
            routers: vec![
                Router::new("CiscoLinksysE1200", 120.0, 90.0, 0.95),
                Router::new("CiscoLinksysE1201", 860.0, 110.0, 0.85),
                Router::new("CiscoLinksysE1202", 140.0, 620.0, 0.80),
                Router::new("CiscoLinksysE1203", 880.0, 640.0, 0.75),
            ],
            distance_model: DistanceModel::default(),
            aggregation: AggregationParams::default(),
            smoothing: SmoothingParams::default(),
            calibration_start: Point2D::new(500.0, 500.0),
            map_bounds: None,
            replay: ReplayParams::default(),
        }
    }
}

impl PositioningConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PositioningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn router_set(&self) -> RouterSet {
        RouterSet::from_vec(self.routers.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.routers.len() != ROUTERS_FOR_SELECTION {
            return invalid(format!(
                "exactly {} routers are required, got {}",
                ROUTERS_FOR_SELECTION,
                self.routers.len()
            ));
        }
        let mut seen = HashSet::new();
        for router in &self.routers {
            if !seen.insert(&router.id) {
                return invalid(format!("duplicate router {}", router.id));
            }
            if !(router.weight > 0.0 && router.weight <= 1.0) {
                return invalid(format!("router {} weight {} outside (0, 1]", router.id, router.weight));
            }
            if !router.coordinate.is_finite() {
                return invalid(format!("router {} has a non-finite coordinate", router.id));
            }
        }

        self.distance_model.validate().map_err(ConfigError::Invalid)?;

        if self.aggregation.band_half_width < 0 {
            return invalid("band_half_width must not be negative".to_string());
        }
        if self.aggregation.weakness_divisor <= 0 {
            return invalid("weakness_divisor must be positive".to_string());
        }
        if self.smoothing.k_nearest_neighbors == 0 {
            return invalid("k_nearest_neighbors must be at least 1".to_string());
        }
        if !(self.smoothing.snap_tolerance_px.is_finite() && self.smoothing.snap_tolerance_px >= 0.0) {
            return invalid("snap_tolerance_px must be a non-negative number".to_string());
        }
        if self.replay.interval_ms <= 0 || self.replay.half_window_ms <= 0 {
            return invalid("replay interval and half window must be positive".to_string());
        }
        if let Some(bounds) = &self.map_bounds {
            if !(bounds.width > 2.0 * bounds.pixel_adjustment && bounds.height > 2.0 * bounds.pixel_adjustment) {
                return invalid("map bounds must be larger than twice the pixel adjustment".to_string());
            }
        }
        Ok(())
    }
}
