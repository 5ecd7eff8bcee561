/// 定位引擎错误定义
///
/// 所有定位错误都只影响当前采样周期，调用方记录"无估计"后继续下一周期。

use crate::algorithms::AlgorithmType;
use thiserror::Error;

/// 定位结果类型
pub type Result<T> = std::result::Result<T, PositioningError>;

/// 单个采样周期内的定位错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositioningError {
    /// 训练数据中没有任何与当前观测匹配的标定点
    #[error("no calibration point matched the current observations")]
    NoCandidateMatch,

    /// 可用路由器数量不足
    #[error("insufficient routers: {available} available, {required} required")]
    InsufficientRouters { available: usize, required: usize },

    /// 路由器几何退化（共线或重合），线性求解无意义
    #[error("degenerate geometry in {algorithm}: {detail}")]
    DegenerateGeometry {
        algorithm: AlgorithmType,
        detail: String,
    },

    /// 训练数据存储查询失败
    #[error("training store error: {0}")]
    Store(#[from] StoreError),
}

/// 训练数据存储错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("unknown router: {0}")]
    UnknownRouter(String),

    #[error("failed to read training data: {0}")]
    Io(String),

    #[error("failed to parse training data: {0}")]
    Parse(String),
}

/// 配置加载与校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
