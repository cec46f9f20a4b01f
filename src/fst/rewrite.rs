//! 字符串改写：把输入串送入规则 FST，读取输出

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::fst::graph::Fst;
use crate::fst::types::{OrderedWeight, StateId, Weight};

/// `rewrites` 最多返回的结果数
pub const MAX_REWRITES: usize = 256;

/// 输入串与规则组合后的格
pub fn rewrite_lattice(input: &str, rule: &Fst) -> Fst {
    Fst::accep(input).compose(rule)
}

/// 最优改写；不匹配时返回 None
pub fn top_rewrite(input: &str, rule: &Fst) -> Option<String> {
    shortest_output(&rewrite_lattice(input, rule)).map(|(output, _)| output)
}

/// 所有不同的改写，按权重升序（同权重按字典序）
///
/// 环路不展开
pub fn rewrites(input: &str, rule: &Fst) -> Vec<String> {
    let lattice = rewrite_lattice(input, rule);
    let Some(start) = lattice.start() else {
        return Vec::new();
    };

    let mut found: BTreeMap<String, Weight> = BTreeMap::new();
    let mut on_path = vec![false; lattice.num_states()];
    let mut output = String::new();
    collect_paths(
        &lattice,
        start,
        Weight::ONE,
        &mut output,
        &mut on_path,
        &mut found,
    );

    let mut ranked: Vec<(String, Weight)> = found.into_iter().collect();
    ranked.sort_by(|a, b| {
        OrderedWeight(a.1)
            .cmp(&OrderedWeight(b.1))
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.into_iter().map(|(output, _)| output).collect()
}

/// `input` 能否被改写为 `output`
pub fn matches(input: &str, output: &str, rule: &Fst) -> bool {
    !rewrite_lattice(input, rule)
        .compose(&Fst::accep(output))
        .is_empty()
}

fn collect_paths(
    lattice: &Fst,
    state: StateId,
    weight: Weight,
    output: &mut String,
    on_path: &mut [bool],
    found: &mut BTreeMap<String, Weight>,
) {
    if found.len() >= MAX_REWRITES && !found.contains_key(output.as_str()) {
        return;
    }
    if lattice.is_final(state) {
        let total = weight.times(lattice.final_weight(state));
        found
            .entry(output.clone())
            .and_modify(|w| *w = w.plus(total))
            .or_insert(total);
    }

    on_path[state] = true;
    for arc in lattice.arcs(state) {
        if on_path[arc.nextstate] {
            continue;
        }
        let pushed = arc.olabel.to_char();
        if let Some(ch) = pushed {
            output.push(ch);
        }
        collect_paths(
            lattice,
            arc.nextstate,
            weight.times(arc.weight),
            output,
            on_path,
            found,
        );
        if pushed.is_some() {
            output.pop();
        }
    }
    on_path[state] = false;
}

/// Dijkstra 最短路径，返回路径输出串和总权重（要求权重非负）
fn shortest_output(lattice: &Fst) -> Option<(String, Weight)> {
    let start = lattice.start()?;
    let n = lattice.num_states();

    let mut distance = vec![Weight::ZERO; n];
    let mut previous: Vec<Option<(StateId, usize)>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    distance[start] = Weight::ONE;
    heap.push(Reverse((OrderedWeight(Weight::ONE), start)));

    while let Some(Reverse((OrderedWeight(weight), state))) = heap.pop() {
        if weight.value() > distance[state].value() {
            continue;
        }
        for (index, arc) in lattice.arcs(state).iter().enumerate() {
            let candidate = weight.times(arc.weight);
            if candidate.value() < distance[arc.nextstate].value() {
                distance[arc.nextstate] = candidate;
                previous[arc.nextstate] = Some((state, index));
                heap.push(Reverse((OrderedWeight(candidate), arc.nextstate)));
            }
        }
    }

    let (best, total) = lattice
        .states()
        .filter(|&s| lattice.is_final(s) && !distance[s].is_zero())
        .map(|s| (s, distance[s].times(lattice.final_weight(s))))
        .min_by(|a, b| OrderedWeight(a.1).cmp(&OrderedWeight(b.1)))?;

    let mut labels = Vec::new();
    let mut current = best;
    while let Some((prev, index)) = previous[current] {
        labels.push(lattice.arcs(prev)[index].olabel);
        current = prev;
    }
    let output: String = labels.iter().rev().filter_map(|l| l.to_char()).collect();
    Some((output, total))
}
