/// 定位算法模块
///
/// 该模块提供 Wi-Fi 室内定位所需的各个组件：
/// - RSS 到距离转换模型
/// - 路由器筛选（丢弃最弱信号）
/// - 候选标定点的频次过滤与择优
/// - 五种定位算法（三边定位、三角定位、指纹定位、模式匹配、加权质心）

pub mod access_point;
pub mod candidate;
pub mod distance_model;
pub mod fingerprinting;
pub mod geometric;
pub mod results;
pub mod router_selector;
pub mod weighted_centroid;

pub use access_point::*;
pub use candidate::*;
pub use distance_model::*;
pub use fingerprinting::*;
pub use geometric::*;
pub use results::*;
pub use router_selector::*;
pub use weighted_centroid::*;
