//! 加权优化
//!
//! optimize = connect → rm_epsilon → 编码确定化 → 最小化 → connect
//!
//! 确定化与最小化把 (输入, 输出, 权重) 三元组编码为单一标签，
//! 把转换器当作无权接受器处理，因此对任何输入都会终止，且不改变转换关系。

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::fst::graph::Fst;
use crate::fst::types::{Arc, ArcKey, Label, StateId, Weight};

impl Fst {
    /// 删除输入输出均为 epsilon 的弧
    pub fn rm_epsilon(self) -> Fst {
        let Some(start) = self.start() else {
            return Fst::new();
        };

        let mut fst = Fst::new();
        for _ in self.states() {
            fst.add_state();
        }
        fst.set_start(start);

        for state in self.states() {
            let closure = self.epsilon_closure(state);
            let mut final_weight = Weight::ZERO;
            let mut arcs: BTreeMap<(Label, Label, StateId), Weight> = BTreeMap::new();

            for (&reached, &distance) in &closure {
                final_weight = final_weight.plus(distance.times(self.final_weight(reached)));
                for arc in self.arcs(reached).iter().filter(|a| !a.is_epsilon()) {
                    let weight = distance.times(arc.weight);
                    arcs.entry((arc.ilabel, arc.olabel, arc.nextstate))
                        .and_modify(|w| *w = w.plus(weight))
                        .or_insert(weight);
                }
            }

            fst.set_final(state, final_weight);
            for ((ilabel, olabel, nextstate), weight) in arcs {
                fst.add_arc(state, Arc::new(ilabel, olabel, weight, nextstate));
            }
        }

        fst.connect()
    }

    /// 经 epsilon 弧可达的状态及最短距离
    fn epsilon_closure(&self, state: StateId) -> BTreeMap<StateId, Weight> {
        let mut distance = BTreeMap::from([(state, Weight::ONE)]);
        let mut queue = VecDeque::from([state]);
        while let Some(current) = queue.pop_front() {
            let base = distance[&current];
            for arc in self.arcs(current).iter().filter(|a| a.is_epsilon()) {
                let candidate = base.times(arc.weight);
                let improved = match distance.get(&arc.nextstate) {
                    Some(old) => candidate.value() < old.value(),
                    None => true,
                };
                if improved {
                    distance.insert(arc.nextstate, candidate);
                    queue.push_back(arc.nextstate);
                }
            }
        }
        distance
    }

    /// 编码确定化：子集构造，弧键为 (输入, 输出, 权重)
    fn determinize_encoded(&self) -> Fst {
        let Some(start) = self.start() else {
            return Fst::new();
        };

        let mut fst = Fst::new();
        let mut subsets: BTreeMap<BTreeSet<StateId>, StateId> = BTreeMap::new();
        let mut queue: VecDeque<BTreeSet<StateId>> = VecDeque::new();

        let initial: BTreeSet<StateId> = BTreeSet::from([start]);
        let id = fst.add_state();
        fst.set_start(id);
        subsets.insert(initial.clone(), id);
        queue.push_back(initial);

        while let Some(subset) = queue.pop_front() {
            let id = subsets[&subset];
            let mut final_weight = Weight::ZERO;
            let mut moves: BTreeMap<ArcKey, BTreeSet<StateId>> = BTreeMap::new();

            for &state in &subset {
                final_weight = final_weight.plus(self.final_weight(state));
                for arc in self.arcs(state) {
                    moves
                        .entry(ArcKey::of(arc))
                        .or_default()
                        .insert(arc.nextstate);
                }
            }

            fst.set_final(id, final_weight);
            for (key, target) in moves {
                let next = match subsets.get(&target) {
                    Some(&next) => next,
                    None => {
                        let next = fst.add_state();
                        subsets.insert(target.clone(), next);
                        queue.push_back(target);
                        next
                    }
                };
                fst.add_arc(id, key.to_arc(next));
            }
        }

        fst
    }

    /// Moore 划分细化最小化（要求编码意义下确定）
    fn minimize_encoded(&self) -> Fst {
        let Some(start) = self.start() else {
            return Fst::new();
        };
        let n = self.num_states();

        // 初始划分：按终止权重
        let mut initial: BTreeMap<u32, usize> = BTreeMap::new();
        let mut class: Vec<usize> = self
            .states()
            .map(|s| {
                let len = initial.len();
                *initial.entry(self.final_weight(s).key()).or_insert(len)
            })
            .collect();
        let mut num_classes = initial.len();

        loop {
            let mut signatures: BTreeMap<(usize, Vec<(ArcKey, usize)>), usize> = BTreeMap::new();
            let refined: Vec<usize> = self
                .states()
                .map(|s| {
                    let mut transitions: Vec<(ArcKey, usize)> = self
                        .arcs(s)
                        .iter()
                        .map(|a| (ArcKey::of(a), class[a.nextstate]))
                        .collect();
                    transitions.sort();
                    let len = signatures.len();
                    *signatures.entry((class[s], transitions)).or_insert(len)
                })
                .collect();
            let stable = signatures.len() == num_classes;
            class = refined;
            num_classes = signatures.len();
            if stable {
                break;
            }
        }

        let mut fst = Fst::new();
        for _ in 0..num_classes {
            fst.add_state();
        }
        fst.set_start(class[start]);

        let mut built = vec![false; num_classes];
        for state in 0..n {
            let c = class[state];
            if built[c] {
                continue;
            }
            built[c] = true;
            fst.set_final(c, self.final_weight(state));
            for arc in self.arcs(state) {
                fst.add_arc(c, Arc { nextstate: class[arc.nextstate], ..*arc });
            }
        }

        fst
    }

    /// 完整优化流程
    pub fn optimize(self) -> Fst {
        let before = (self.num_states(), self.num_arcs());
        let optimized = self
            .connect()
            .rm_epsilon()
            .determinize_encoded()
            .minimize_encoded()
            .connect();
        tracing::debug!(
            "FST 优化: {} 状态/{} 弧 -> {} 状态/{} 弧",
            before.0,
            before.1,
            optimized.num_states(),
            optimized.num_arcs()
        );
        optimized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fst::rewrite;

    fn digit() -> Fst {
        Fst::char_class('0'..='9')
    }

    #[test]
    fn test_rm_epsilon_keeps_language() {
        let fst = Fst::accep("a") + Fst::accep("").optional() + Fst::accep("b");
        let removed = fst.rm_epsilon();
        assert!(removed.accepts("ab"));
        assert!(!removed.accepts("a"));
        assert!(removed
            .states()
            .all(|s| removed.arcs(s).iter().all(|a| !a.is_epsilon())));
    }

    #[test]
    fn test_optimize_minimizes_redundant_union() {
        let fst = Fst::accep("abc") | Fst::accep("abc") | Fst::accep("abd");
        let optimized = fst.optimize();
        // a -> b -> {c, d} 共享后缀终止状态
        assert_eq!(optimized.num_states(), 4);
        assert!(optimized.accepts("abc"));
        assert!(optimized.accepts("abd"));
        assert!(!optimized.accepts("ab"));
    }

    #[test]
    fn test_optimize_preserves_closure_language() {
        let fst = (digit().star() + Fst::accep(".") + digit().closure(4, None)).optimize();
        assert!(fst.accepts(".1234"));
        assert!(fst.accepts("99.00001"));
        assert!(!fst.accepts("9.123"));
        assert!(!fst.accepts("9.12.34"));
        // 确定化后每个状态每个标签至多一条弧
        for state in fst.states() {
            let labels: BTreeSet<Label> = fst.arcs(state).iter().map(|a| a.ilabel).collect();
            assert_eq!(labels.len(), fst.arcs(state).len());
        }
    }

    #[test]
    fn test_optimize_preserves_transduction_and_weights() {
        let fst = Fst::cross("0", "zero") | Fst::cross("0", "o").add_weight(Weight::new(0.1));
        let optimized = fst.optimize();
        assert_eq!(rewrite::top_rewrite("0", &optimized).as_deref(), Some("zero"));
        assert_eq!(rewrite::rewrites("0", &optimized), vec!["zero", "o"]);
    }

    #[test]
    fn test_optimize_is_deterministic() {
        let build = || (digit().closure(1, Some(3)) + Fst::insert("!")).optimize();
        assert_eq!(build(), build());
    }
}
