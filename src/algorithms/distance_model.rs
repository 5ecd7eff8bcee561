/// RSS 到距离转换模型
///
/// 固定 2437 MHz（信道 6）载波的自由空间路径损耗公式，先得到米，再按地图比例换算为像素。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 载波频率（MHz）
pub const CARRIER_FREQUENCY_MHZ: f64 = 2437.0;

/// 自由空间路径损耗常数（距离以米、频率以 MHz 计）
pub const FSPL_CONSTANT_DB: f64 = 27.55;

/// 每米英尺数
pub const FEET_PER_METER: f64 = 0.3048;

/// 地图比例：每英尺像素数
pub const PIXELS_PER_FOOT: f64 = 5.7;

/// RSS 转距离模型
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceModel {
    /// 米到英尺的换算系数
    pub feet_per_meter: f64,
    /// 英尺到像素的换算系数
    pub pixels_per_foot: f64,
}

impl DistanceModel {
    pub fn new(feet_per_meter: f64, pixels_per_foot: f64) -> Self {
        DistanceModel {
            feet_per_meter,
            pixels_per_foot,
        }
    }

    /// 根据 RSS 计算距离（米）
    ///
    /// 公式: d = 10^((27.55 - 20*log10(f) + |RSS|) / 20)
    pub fn distance_meters(&self, rss_dbm: i32) -> f64 {
        let exponent =
            (FSPL_CONSTANT_DB - 20.0 * CARRIER_FREQUENCY_MHZ.log10() + (rss_dbm as f64).abs())
                / 20.0;
        10_f64.powf(exponent)
    }

    /// 根据 RSS 计算地图上的距离（像素）
    pub fn distance_pixels(&self, rss_dbm: i32) -> f64 {
        self.distance_meters(rss_dbm) * self.feet_per_meter * self.pixels_per_foot
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.feet_per_meter.is_finite() && self.feet_per_meter > 0.0) {
            return Err("feet_per_meter must be a positive finite number".to_string());
        }
        if !(self.pixels_per_foot.is_finite() && self.pixels_per_foot > 0.0) {
            return Err("pixels_per_foot must be a positive finite number".to_string());
        }
        Ok(())
    }
}

impl Default for DistanceModel {
    fn default() -> Self {
        DistanceModel::new(FEET_PER_METER, PIXELS_PER_FOOT)
    }
}

impl fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FSPL @ {} MHz, {} ft/m, {} px/ft",
            CARRIER_FREQUENCY_MHZ, self.feet_per_meter, self.pixels_per_foot
        )
    }
}
