//! 组合（composition）
//!
//! 结果等价于把 `a` 的输出送入 `b` 的输入。epsilon 通过三状态过滤器处理：
//! 两次匹配之间先成对推进双方的 epsilon，再单独推进剩余一方，
//! 保证每种对齐只生成一条路径。

use std::collections::{HashMap, VecDeque};

use crate::fst::graph::Fst;
use crate::fst::types::{Arc, Label, StateId, Weight};

/// epsilon 过滤器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Filter {
    /// 刚完成匹配，可任意推进
    Matched,
    /// 只允许继续推进 `a` 的输出 epsilon
    LeftOnly,
    /// 只允许继续推进 `b` 的输入 epsilon
    RightOnly,
}

type Triple = (StateId, StateId, Filter);

pub fn compose(a: &Fst, b: &Fst) -> Fst {
    let (Some(a_start), Some(b_start)) = (a.start(), b.start()) else {
        return Fst::new();
    };

    // b 的弧按输入标签建索引
    let b_index: Vec<HashMap<Label, Vec<usize>>> = b
        .states()
        .map(|s| {
            let mut index: HashMap<Label, Vec<usize>> = HashMap::new();
            for (i, arc) in b.arcs(s).iter().enumerate() {
                index.entry(arc.ilabel).or_default().push(i);
            }
            index
        })
        .collect();

    let mut fst = Fst::new();
    let mut ids: HashMap<Triple, StateId> = HashMap::new();
    let mut queue: VecDeque<Triple> = VecDeque::new();

    let initial = (a_start, b_start, Filter::Matched);
    let start = fst.add_state();
    fst.set_start(start);
    ids.insert(initial, start);
    queue.push_back(initial);

    while let Some(triple) = queue.pop_front() {
        let (sa, sb, filter) = triple;
        let id = ids[&triple];

        if a.is_final(sa) && b.is_final(sb) {
            fst.set_final(id, a.final_weight(sa).times(b.final_weight(sb)));
        }

        let mut moves: Vec<(Label, Label, Weight, Triple)> = Vec::new();

        for arc_a in a.arcs(sa) {
            if arc_a.olabel.is_epsilon() {
                // a 单独推进
                if filter != Filter::RightOnly {
                    moves.push((
                        arc_a.ilabel,
                        Label::EPSILON,
                        arc_a.weight,
                        (arc_a.nextstate, sb, Filter::LeftOnly),
                    ));
                }
                // 双方 epsilon 同时推进
                if filter == Filter::Matched {
                    for &i in b_index[sb].get(&Label::EPSILON).into_iter().flatten() {
                        let arc_b = &b.arcs(sb)[i];
                        moves.push((
                            arc_a.ilabel,
                            arc_b.olabel,
                            arc_a.weight.times(arc_b.weight),
                            (arc_a.nextstate, arc_b.nextstate, Filter::Matched),
                        ));
                    }
                }
                continue;
            }

            for &i in b_index[sb].get(&arc_a.olabel).into_iter().flatten() {
                let arc_b = &b.arcs(sb)[i];
                moves.push((
                    arc_a.ilabel,
                    arc_b.olabel,
                    arc_a.weight.times(arc_b.weight),
                    (arc_a.nextstate, arc_b.nextstate, Filter::Matched),
                ));
            }
        }

        // b 单独推进
        if filter != Filter::LeftOnly {
            for &i in b_index[sb].get(&Label::EPSILON).into_iter().flatten() {
                let arc_b = &b.arcs(sb)[i];
                moves.push((
                    Label::EPSILON,
                    arc_b.olabel,
                    arc_b.weight,
                    (sa, arc_b.nextstate, Filter::RightOnly),
                ));
            }
        }

        for (ilabel, olabel, weight, target) in moves {
            let next = match ids.get(&target) {
                Some(&next) => next,
                None => {
                    let next = fst.add_state();
                    ids.insert(target, next);
                    queue.push_back(target);
                    next
                }
            };
            fst.add_arc(id, Arc::new(ilabel, olabel, weight, next));
        }
    }

    fst.connect()
}

impl Fst {
    /// `self` ∘ `other`
    pub fn compose(&self, other: &Fst) -> Fst {
        compose(self, other)
    }
}
