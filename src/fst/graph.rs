//! FST 图结构与构造原语
//!
//! 状态存放在数组中，弧以下标指向目标状态。
//! 所有组合子按值消费操作数并返回新图，便于写成 `a + b | c` 的形式。

use std::collections::{BTreeSet, VecDeque};
use std::ops::{Add, BitOr};
use std::path::Path;

use anyhow::Result;

use crate::fst::types::{Arc, Label, StateId, Weight};

#[derive(Debug, Clone, PartialEq)]
struct State {
    arcs: Vec<Arc>,
    final_weight: Weight,
}

impl State {
    fn new() -> Self {
        Self {
            arcs: Vec::new(),
            final_weight: Weight::ZERO,
        }
    }
}

/// 加权有限状态转换器
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fst {
    states: Vec<State>,
    start: Option<StateId>,
}

/// 投影方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Input,
    Output,
}

impl Fst {
    /// 空图（不接受任何串）
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // 底层读写
    // ------------------------------------------------------------------

    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::new());
        self.states.len() - 1
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = Some(state);
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn set_final(&mut self, state: StateId, weight: Weight) {
        self.states[state].final_weight = weight;
    }

    pub fn final_weight(&self, state: StateId) -> Weight {
        self.states[state].final_weight
    }

    pub fn is_final(&self, state: StateId) -> bool {
        !self.states[state].final_weight.is_zero()
    }

    pub fn add_arc(&mut self, state: StateId, arc: Arc) {
        self.states[state].arcs.push(arc);
    }

    pub fn arcs(&self, state: StateId) -> &[Arc] {
        &self.states[state].arcs
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> {
        0..self.states.len()
    }

    /// 没有起始状态即为空语言
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    // ------------------------------------------------------------------
    // 原语
    // ------------------------------------------------------------------

    /// 由 (输入, 输出) 标签序列构造单链
    fn chain(pairs: impl IntoIterator<Item = (Label, Label)>) -> Self {
        let mut fst = Fst::new();
        let mut current = fst.add_state();
        fst.set_start(current);
        for (ilabel, olabel) in pairs {
            let next = fst.add_state();
            fst.add_arc(current, Arc::new(ilabel, olabel, Weight::ONE, next));
            current = next;
        }
        fst.set_final(current, Weight::ONE);
        fst
    }

    /// 接受字面串（空串即 epsilon 接受器）
    pub fn accep(text: &str) -> Self {
        Self::chain(text.chars().map(|c| (Label::from_char(c), Label::from_char(c))))
    }

    /// 插入字面串：输入为空，输出 `text`
    pub fn insert(text: &str) -> Self {
        Self::chain(text.chars().map(|c| (Label::EPSILON, Label::from_char(c))))
    }

    /// 删除字面串：输入 `text`，输出为空
    pub fn delete(text: &str) -> Self {
        Self::chain(text.chars().map(|c| (Label::from_char(c), Label::EPSILON)))
    }

    /// 替换：输入 `input` 输出 `output`，按位置对齐，较短一侧以 epsilon 补齐
    pub fn cross(input: &str, output: &str) -> Self {
        let ilabels: Vec<Label> = input.chars().map(Label::from_char).collect();
        let olabels: Vec<Label> = output.chars().map(Label::from_char).collect();
        let len = ilabels.len().max(olabels.len());
        Self::chain((0..len).map(|i| {
            (
                ilabels.get(i).copied().unwrap_or(Label::EPSILON),
                olabels.get(i).copied().unwrap_or(Label::EPSILON),
            )
        }))
    }

    /// 单字符集合接受器（如数字类）
    pub fn char_class(chars: impl IntoIterator<Item = char>) -> Self {
        let mut fst = Fst::new();
        let start = fst.add_state();
        let end = fst.add_state();
        fst.set_start(start);
        fst.set_final(end, Weight::ONE);
        let unique: BTreeSet<char> = chars.into_iter().collect();
        for ch in unique {
            let label = Label::from_char(ch);
            fst.add_arc(start, Arc::new(label, label, Weight::ONE, end));
        }
        fst
    }

    /// 字符串映射：多条 cross 的并集
    pub fn string_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .map(|(input, output)| Self::cross(input, output))
            .fold(Fst::new(), |acc, fst| acc.union(fst))
    }

    /// 从 TSV 文件读取字符串映射
    ///
    /// - 单列：接受该串
    /// - 两列：第一列替换为第二列
    /// - 空行忽略
    pub fn string_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("无法读取字符串文件 {:?}: {}", path, e))?;

        let mut fst = Fst::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').collect();
            let entry = match columns.as_slice() {
                [input] => Self::accep(input),
                [input, output] => Self::cross(input, output),
                _ => anyhow::bail!(
                    "字符串文件 {:?} 第 {} 行列数无效: {}",
                    path,
                    line_no + 1,
                    columns.len()
                ),
            };
            fst = fst.union(entry);
        }
        Ok(fst)
    }

    // ------------------------------------------------------------------
    // 组合子
    // ------------------------------------------------------------------

    /// 把 `other` 的状态追加到本图，返回偏移量
    fn append_states(&mut self, other: Fst) -> StateId {
        let offset = self.states.len();
        for mut state in other.states {
            for arc in &mut state.arcs {
                arc.nextstate += offset;
            }
            self.states.push(state);
        }
        offset
    }

    /// 连接
    pub fn concat(mut self, other: Fst) -> Fst {
        let (Some(_), Some(other_start)) = (self.start, other.start) else {
            return Fst::new();
        };
        let boundary = self.states.len();
        let offset = self.append_states(other);
        for state in 0..boundary {
            let weight = self.states[state].final_weight;
            if weight.is_zero() {
                continue;
            }
            self.states[state].final_weight = Weight::ZERO;
            self.add_arc(
                state,
                Arc::new(Label::EPSILON, Label::EPSILON, weight, other_start + offset),
            );
        }
        self
    }

    /// 并集
    pub fn union(self, other: Fst) -> Fst {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        let mut fst = Fst::new();
        let start = fst.add_state();
        fst.set_start(start);
        for part in [self, other] {
            let part_start = part.start;
            let offset = fst.append_states(part);
            if let Some(s) = part_start {
                fst.add_arc(
                    start,
                    Arc::new(Label::EPSILON, Label::EPSILON, Weight::ONE, s + offset),
                );
            }
        }
        fst
    }

    /// Kleene 闭包（零次或多次）
    pub fn star(self) -> Fst {
        let mut fst = Fst::new();
        let start = fst.add_state();
        fst.set_start(start);
        fst.set_final(start, Weight::ONE);
        let inner_start = self.start;
        let offset = fst.append_states(self);
        let Some(inner_start) = inner_start else {
            return fst;
        };
        fst.add_arc(
            start,
            Arc::new(Label::EPSILON, Label::EPSILON, Weight::ONE, inner_start + offset),
        );
        for state in offset..fst.states.len() {
            let weight = fst.states[state].final_weight;
            if weight.is_zero() {
                continue;
            }
            fst.states[state].final_weight = Weight::ZERO;
            fst.add_arc(state, Arc::new(Label::EPSILON, Label::EPSILON, weight, start));
        }
        fst
    }

    /// 有界/无界闭包：重复 `min` 到 `max` 次，`max = None` 表示无上界
    pub fn closure(self, min: usize, max: Option<usize>) -> Fst {
        let mut result = Fst::accep("");
        for _ in 0..min {
            result = result.concat(self.clone());
        }
        match max {
            None => result.concat(self.star()),
            Some(max) => {
                // a(a(a)?)? 形式，避免歧义路径
                let mut tail = Fst::accep("");
                for _ in min..max {
                    tail = self.clone().concat(tail).optional();
                }
                result.concat(tail)
            }
        }
    }

    /// 可选（0 或 1 次）
    pub fn optional(self) -> Fst {
        self.union(Fst::accep(""))
    }

    /// 交换输入输出
    pub fn invert(mut self) -> Fst {
        for state in &mut self.states {
            for arc in &mut state.arcs {
                std::mem::swap(&mut arc.ilabel, &mut arc.olabel);
            }
        }
        self
    }

    /// 投影为接受器
    pub fn project(mut self, project_type: ProjectType) -> Fst {
        for state in &mut self.states {
            for arc in &mut state.arcs {
                match project_type {
                    ProjectType::Input => arc.olabel = arc.ilabel,
                    ProjectType::Output => arc.ilabel = arc.olabel,
                }
            }
        }
        self
    }

    /// 给整条路径附加权重（作用在终止权重上）
    ///
    /// 权重经 [`Weight::new`] 构造，负值已截断为 0
    pub fn add_weight(mut self, weight: Weight) -> Fst {
        for state in &mut self.states {
            if !state.final_weight.is_zero() {
                state.final_weight = state.final_weight.times(weight);
            }
        }
        self
    }

    // ------------------------------------------------------------------
    // 查询与修剪
    // ------------------------------------------------------------------

    /// 按输入侧判断是否接受 `input`（忽略输出）
    pub fn accepts(&self, input: &str) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        let mut current = self.input_epsilon_closure([start].into_iter().collect());
        for ch in input.chars() {
            let label = Label::from_char(ch);
            let next: BTreeSet<StateId> = current
                .iter()
                .flat_map(|&s| self.arcs(s).iter())
                .filter(|a| a.ilabel == label)
                .map(|a| a.nextstate)
                .collect();
            if next.is_empty() {
                return false;
            }
            current = self.input_epsilon_closure(next);
        }
        current.iter().any(|&s| self.is_final(s))
    }

    fn input_epsilon_closure(&self, mut states: BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut queue: VecDeque<StateId> = states.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            for arc in self.arcs(state) {
                if arc.ilabel.is_epsilon() && states.insert(arc.nextstate) {
                    queue.push_back(arc.nextstate);
                }
            }
        }
        states
    }

    /// 删除不可达或无法到达终止状态的状态
    pub fn connect(self) -> Fst {
        let Some(start) = self.start else {
            return Fst::new();
        };
        let n = self.states.len();

        let mut accessible = vec![false; n];
        let mut queue = VecDeque::from([start]);
        accessible[start] = true;
        while let Some(state) = queue.pop_front() {
            for arc in self.arcs(state) {
                if !accessible[arc.nextstate] {
                    accessible[arc.nextstate] = true;
                    queue.push_back(arc.nextstate);
                }
            }
        }

        let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); n];
        for (state, data) in self.states.iter().enumerate() {
            for arc in &data.arcs {
                reverse[arc.nextstate].push(state);
            }
        }
        let mut coaccessible = vec![false; n];
        let mut queue: VecDeque<StateId> = (0..n).filter(|&s| self.is_final(s)).collect();
        for &state in &queue {
            coaccessible[state] = true;
        }
        while let Some(state) = queue.pop_front() {
            for &prev in &reverse[state] {
                if !coaccessible[prev] {
                    coaccessible[prev] = true;
                    queue.push_back(prev);
                }
            }
        }

        if !(accessible[start] && coaccessible[start]) {
            return Fst::new();
        }

        let mut mapping: Vec<Option<StateId>> = vec![None; n];
        let mut next_id = 0;
        for state in 0..n {
            if accessible[state] && coaccessible[state] {
                mapping[state] = Some(next_id);
                next_id += 1;
            }
        }

        let mut fst = Fst::new();
        for (state, data) in self.states.into_iter().enumerate() {
            if mapping[state].is_none() {
                continue;
            }
            let id = fst.add_state();
            fst.set_final(id, data.final_weight);
            for arc in data.arcs {
                if let Some(target) = mapping[arc.nextstate] {
                    fst.add_arc(id, Arc { nextstate: target, ..arc });
                }
            }
        }
        fst.start = mapping[start];
        fst
    }
}

/// `a + b`：连接
impl Add for Fst {
    type Output = Fst;

    fn add(self, rhs: Fst) -> Fst {
        self.concat(rhs)
    }
}

/// `a | b`：并集
impl BitOr for Fst {
    type Output = Fst;

    fn bitor(self, rhs: Fst) -> Fst {
        self.union(rhs)
    }
}
