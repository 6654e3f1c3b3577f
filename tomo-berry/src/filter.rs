//! 按尺寸筛选连通域.

use crate::Labeling;
use std::cmp::Reverse;

/// 丢弃体素个数落在 `[min_size, max_size]` 之外的连通域, 并将存活者按体素个数降序
/// (同尺寸时按原标签升序) 重新编号为 `1..=k`.
///
/// 该顺序是对外约定: 下游的 "取前 N 大" 之类操作依赖它.
/// 该操作是幂等的: 对已筛选的结果以相同区间再次筛选, 结果不变.
pub fn filter_by_size(mut labeling: Labeling, min_size: usize, max_size: usize) -> Labeling {
    let mut order: Vec<u32> = labeling
        .sizes()
        .iter()
        .enumerate()
        .filter(|(_, size)| (min_size..=max_size).contains(*size))
        .map(|(i, _)| i as u32 + 1)
        .collect();
    order.sort_by_key(|&l| (Reverse(labeling.sizes()[l as usize - 1]), l));

    let identity =
        order.len() == labeling.len() && order.iter().zip(1u32..).all(|(a, b)| *a == b);
    if !identity {
        labeling.relabel(&order);
    }
    labeling
}
