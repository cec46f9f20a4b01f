//! 加权有限状态转换器运行时
//!
//! 提供语法构建所需的全部原语：
//! - 字面接受 / 插入 / 删除 / 替换（cross）
//! - 连接、并集、有界与无界闭包
//! - 组合、加权优化
//! - 字符串改写（最优改写、全部改写、匹配判断）

mod compose;
mod graph;
mod optimize;
pub mod rewrite;
mod types;

pub use compose::compose;
pub use graph::{Fst, ProjectType};
pub use types::{Arc, Label, StateId, Weight};
