/// 训练（标定）数据
///
/// - `store`: 训练数据存储的只读查询接口
/// - `memory`: 基于 JSON 的内存实现
/// - `aggregation`: 按 RSS 容差查询并聚合候选标定点

pub mod aggregation;
pub mod memory;
pub mod store;

pub use aggregation::*;
pub use memory::*;
pub use store::*;
