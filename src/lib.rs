//! Wi-Fi 室内定位引擎
//!
//! 由四个固定位置路由器的 RSS 读数与一份离线标定（训练）数据估计二维平面坐标（地图像素）。
//!
//! - `algorithms`: 距离模型、路由器筛选、候选点排序以及五种定位算法
//! - `training`: 训练数据存储接口与候选点聚合
//! - `positioning`: 单次采样的定位流程与会话状态
//! - `playback`: 历史数据回放与定时播放

pub mod algorithms;
pub mod config;
pub mod error;
pub mod playback;
pub mod positioning;
pub mod training;

pub use config::PositioningConfig;
pub use error::{ConfigError, PositioningError, Result, StoreError};
pub use playback::{PlaybackEvent, ReplaySession, RouterSeries, replay, replay_tracks, run_playback};
pub use positioning::{ObservationWindow, PositioningEngine, SessionState};
