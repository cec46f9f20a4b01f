//! FST 基础类型：标签、权重、弧

use std::cmp::Ordering;

/// 状态编号（状态数组下标）
pub type StateId = usize;

/// 弧标签
///
/// 0 保留给 epsilon，字符 `c` 编码为 `c as u32 + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub const EPSILON: Label = Label(0);

    pub fn from_char(ch: char) -> Self {
        Label(ch as u32 + 1)
    }

    /// epsilon 返回 None
    pub fn to_char(self) -> Option<char> {
        if self.is_epsilon() {
            None
        } else {
            char::from_u32(self.0 - 1)
        }
    }

    pub fn is_epsilon(self) -> bool {
        self.0 == 0
    }
}

/// 热带半环权重
///
/// - 沿路径相乘 = 数值相加
/// - 路径间相加 = 取最小值
/// - `ZERO` (+∞) 表示不可达 / 非终止
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight(f32);

impl Weight {
    pub const ONE: Weight = Weight(0.0);
    pub const ZERO: Weight = Weight(f32::INFINITY);

    /// 构造权重
    ///
    /// 最短路搜索要求权重非负：负值与 NaN 截断为 `ONE`
    pub fn new(value: f32) -> Self {
        if value < 0.0 || value.is_nan() {
            tracing::warn!("权重必须非负，{} 已截断为 0", value);
            return Self::ONE;
        }
        // -0.0 与 0.0 统一，保证编码键一致
        if value == 0.0 {
            Self::ONE
        } else {
            Weight(value)
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == f32::INFINITY
    }

    pub fn times(self, other: Weight) -> Weight {
        Weight::new(self.0 + other.0)
    }

    pub fn plus(self, other: Weight) -> Weight {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// 用于编码/比较的位表示
    pub(crate) fn key(self) -> u32 {
        self.0.to_bits()
    }

    pub(crate) fn from_key(bits: u32) -> Self {
        Weight(f32::from_bits(bits))
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::ONE
    }
}

/// 全序权重，用于最短路径堆
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrderedWeight(pub Weight);

impl Eq for OrderedWeight {}

impl PartialOrd for OrderedWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.value().total_cmp(&other.0.value())
    }
}

/// 弧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: Weight,
    pub nextstate: StateId,
}

impl Arc {
    pub fn new(ilabel: Label, olabel: Label, weight: Weight, nextstate: StateId) -> Self {
        Self {
            ilabel,
            olabel,
            weight,
            nextstate,
        }
    }

    /// 输入输出均为 epsilon
    pub fn is_epsilon(&self) -> bool {
        self.ilabel.is_epsilon() && self.olabel.is_epsilon()
    }
}

/// 编码后的弧键（输入、输出、权重），用于把转换器当作无权接受器处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ArcKey {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: u32,
}

impl ArcKey {
    pub fn of(arc: &Arc) -> Self {
        Self {
            ilabel: arc.ilabel,
            olabel: arc.olabel,
            weight: arc.weight.key(),
        }
    }

    pub fn to_arc(self, nextstate: StateId) -> Arc {
        Arc::new(
            self.ilabel,
            self.olabel,
            Weight::from_key(self.weight),
            nextstate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip_and_epsilon() {
        assert!(Label::EPSILON.is_epsilon());
        assert_eq!(Label::EPSILON.to_char(), None);
        assert_eq!(Label::from_char('7').to_char(), Some('7'));
        assert!(!Label::from_char('\0').is_epsilon());
    }

    #[test]
    fn test_tropical_semiring() {
        let a = Weight::new(1.5);
        let b = Weight::new(0.5);
        assert_eq!(a.times(b).value(), 2.0);
        assert_eq!(a.plus(b), b);
        assert_eq!(Weight::ZERO.plus(a), a);
        assert!(Weight::ONE.times(Weight::ZERO).is_zero());
        assert_eq!(Weight::new(-0.0).key(), Weight::ONE.key());
    }

    #[test]
    fn test_negative_weight_clamped() {
        assert_eq!(Weight::new(-1.0), Weight::ONE);
        assert_eq!(Weight::new(f32::NAN), Weight::ONE);
        assert_eq!(Weight::new(0.25).value(), 0.25);
    }
}
