//! 三维连通域标记.
//!
//! 采用两遍扫描 + 并查集:
//!
//! 1. 按行优先 `(z, y, x)` 顺序扫描前景体素, 只查看已扫描过的那一半邻居,
//!   分配临时标签, 并在并查集中合并相邻的临时标签;
//! 2. 再扫描一遍, 将临时标签替换为其根, 并按根 **第一次出现的扫描位置** 重新编号为 `1..=k`.
//!
//! 第二遍的编号规则使得最终标签只取决于体数据本身, 与合并顺序以及是否分块并行无关.

mod union_find;

use crate::config::Connectivity;
use crate::consts::voxel::{is_foreground, NO_LABEL};
use crate::volume::{backward_offsets, shift};
use crate::{Idx3d, Offset3d};
use ndarray::{Array3, ArrayView3};
use union_find::UnionFind;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::{s, Axis, Zip};
        use rayon::prelude::*;
    }
}

/// 一次标记的结果: 标签体数据以及每个标签的体素个数.
///
/// 标签 `l` (`l >= 1`) 的体素个数为 `sizes()[l - 1]`. 0 表示背景.
/// 标签值只在一次标记内有意义, 不同调用之间不保证稳定.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labeling {
    labels: Array3<u32>,
    sizes: Vec<usize>,
}

impl Labeling {
    /// 形状为 `shape` 的全背景结果.
    #[inline]
    pub fn empty(shape: Idx3d) -> Self {
        Self {
            labels: Array3::zeros(shape),
            sizes: vec![],
        }
    }

    /// 标签体数据.
    #[inline]
    pub fn labels(&self) -> ArrayView3<'_, u32> {
        self.labels.view()
    }

    /// 各标签的体素个数, 按标签升序.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// 标签 `label` 的体素个数. 标签不存在时返回 `None`.
    #[inline]
    pub fn size_of(&self, label: u32) -> Option<usize> {
        (label as usize)
            .checked_sub(1)
            .and_then(|i| self.sizes.get(i).copied())
    }

    /// 连通域个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// 是否没有任何连通域?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// 体数据形状.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.labels.dim()
    }

    /// 收集标签为 `label` 的所有体素索引. 结果按行优先存储.
    pub fn members(&self, label: u32) -> Vec<Idx3d> {
        self.labels
            .indexed_iter()
            .filter_map(|(pos, l)| (*l == label).then_some(pos))
            .collect()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_parts(self) -> (Array3<u32>, Vec<usize>) {
        (self.labels, self.sizes)
    }

    /// 只保留满足 `keep(label, size)` 的连通域, 其余体素置为背景.
    /// 存活者保持原有相对顺序, 重新编号为 `1..=k`.
    pub fn retain<F: FnMut(u32, usize) -> bool>(&mut self, mut keep: F) {
        let order: Vec<u32> = (1..=self.len() as u32)
            .filter(|&l| keep(l, self.sizes[l as usize - 1]))
            .collect();
        if order.len() != self.len() {
            self.relabel(&order);
        }
    }

    /// 按 `order` 重新编号: `order[i]` 成为新标签 `i + 1`, 不在 `order` 中的标签被清除.
    ///
    /// `order` 中的标签必须存在且互不重复, 否则程序行为未定义 (可能 panic).
    pub(crate) fn relabel(&mut self, order: &[u32]) {
        let mut remap = vec![NO_LABEL; self.sizes.len() + 1];
        let mut sizes = Vec::with_capacity(order.len());
        for (i, &old) in order.iter().enumerate() {
            debug_assert_eq!(remap[old as usize], NO_LABEL);
            remap[old as usize] = i as u32 + 1;
            sizes.push(self.sizes[old as usize - 1]);
        }
        self.labels.mapv_inplace(|l| remap[l as usize]);
        self.sizes = sizes;
    }
}

/// 在 `connectivity` 规则下标记二值图 `binary` 的所有前景连通域.
///
/// 非零体素均视为前景. 最终标签按连通域在行优先扫描中第一次出现的顺序分配.
/// 全背景输入返回全零标签图和空尺寸表, 不会出错.
pub fn label(binary: ArrayView3<'_, u8>, connectivity: Connectivity) -> Labeling {
    let back = backward_offsets(connectivity);
    let (provisional, mut uf) = provisional_labels(binary, &back);
    resolve(provisional, &mut uf)
}

/// 借助 `rayon`, 按 z 方向每 `slab_depth` 层一块, 并行地标记二值图.
///
/// 每块独立标记后, 合并跨越块边界的连通域. 结果与 [`label`] 完全相同,
/// 不受线程调度影响.
///
/// `slab_depth` 为 0 时程序 panic.
#[cfg(feature = "rayon")]
pub fn label_par(
    binary: ArrayView3<'_, u8>,
    connectivity: Connectivity,
    slab_depth: usize,
) -> Labeling {
    assert!(slab_depth >= 1, "分块厚度必须为正");
    let shape = binary.dim();
    let back = backward_offsets(connectivity);

    let starts: Vec<usize> = (0..shape.0).step_by(slab_depth).collect();
    let parts: Vec<(Array3<u32>, UnionFind)> = starts
        .par_iter()
        .map(|&z0| {
            let z1 = (z0 + slab_depth).min(shape.0);
            provisional_labels(binary.slice(s![z0..z1, .., ..]), &back)
        })
        .collect();

    // 拼接各块的临时标签.
    let mut provisional = Array3::<u32>::zeros(shape);
    let mut uf = UnionFind::new();
    for (&z0, (local, local_uf)) in starts.iter().zip(parts.iter()) {
        let offset = uf.len() - 1;
        assert!(
            offset + local_uf.len() - 1 <= u32::MAX as usize,
            "连通域临时标签数超过 u32 上限"
        );
        let offset = offset as u32;
        uf.append_shifted(local_uf, offset);

        let z1 = z0 + local.len_of(Axis(0));
        Zip::from(provisional.slice_mut(s![z0..z1, .., ..]))
            .and(local)
            .for_each(|g, &l| {
                if l != NO_LABEL {
                    *g = l + offset;
                }
            });
    }

    // 缝合: 每块第一层只需查看上一块最后一层的邻居.
    let seam: Vec<Offset3d> = back.into_iter().filter(|off| off.0 == -1).collect();
    for &z0 in starts.iter().skip(1) {
        for ((y, x), &here) in provisional.index_axis(Axis(0), z0).indexed_iter() {
            if here == NO_LABEL {
                continue;
            }
            for &off in seam.iter() {
                let Some(n) = shift((z0, y, x), off, shape) else {
                    continue;
                };
                let there = provisional[n];
                if there != NO_LABEL {
                    uf.union(here, there);
                }
            }
        }
    }

    resolve(provisional, &mut uf)
}

/// 第一遍扫描: 分配临时标签并记录等价关系.
fn provisional_labels(binary: ArrayView3<'_, u8>, back: &[Offset3d]) -> (Array3<u32>, UnionFind) {
    let shape = binary.dim();
    let mut provisional = Array3::<u32>::zeros(shape);
    let mut uf = UnionFind::new();

    for (pos, &v) in binary.indexed_iter() {
        if !is_foreground(v) {
            continue;
        }
        let mut current = NO_LABEL;
        for &off in back {
            let Some(n) = shift(pos, off, shape) else {
                continue;
            };
            let neigh = provisional[n];
            if neigh == NO_LABEL {
                continue;
            }
            current = if current == NO_LABEL {
                neigh
            } else {
                uf.union(current, neigh)
            };
        }
        if current == NO_LABEL {
            current = uf.make_set();
        }
        provisional[pos] = current;
    }
    (provisional, uf)
}

/// 第二遍扫描: 临时标签 -> 根 -> 按首次出现顺序编号的最终标签.
fn resolve(mut provisional: Array3<u32>, uf: &mut UnionFind) -> Labeling {
    let mut remap = vec![NO_LABEL; uf.len()];
    let mut sizes: Vec<usize> = Vec::with_capacity(16);

    for l in provisional.iter_mut() {
        if *l == NO_LABEL {
            continue;
        }
        let root = uf.find(*l) as usize;
        if remap[root] == NO_LABEL {
            sizes.push(0);
            remap[root] = sizes.len() as u32;
        }
        let fin = remap[root];
        sizes[fin as usize - 1] += 1;
        *l = fin;
    }
    Labeling {
        labels: provisional,
        sizes,
    }
}
