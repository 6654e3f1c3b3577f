/// 带路径减半的并查集. 0 号元素固定代表背景.
///
/// 合并时总是让编号较小的根成为新根, 因此每个集合的根就是其中最早创建的元素.
/// 这保证了标记结果只取决于扫描顺序, 与合并顺序无关.
#[derive(Clone, Debug)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// 初始化, 只含背景元素.
    pub fn new() -> Self {
        Self {
            parent: Vec::from([0]),
        }
    }

    /// 元素个数 (包括背景).
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// 新建一个单元素集合, 返回其编号.
    pub fn make_set(&mut self) -> u32 {
        let id = self.parent.len();
        assert!(id <= u32::MAX as usize, "连通域临时标签数超过 u32 上限");
        let id = id as u32;
        self.parent.push(id);
        id
    }

    /// 查找 `x` 所在集合的根.
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    /// 合并 `a`, `b` 所在的集合. 返回合并后的根.
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let (ra, rb) = (self.find(a), self.find(b));
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi as usize] = lo;
        lo
    }

    /// 将 `other` 的所有非背景元素整体平移 `offset` 后追加到 `self` 末尾.
    ///
    /// `offset` 必须等于 `self.len() - 1`, 即 `other` 的 1 号元素会成为 `self` 的第 `len` 号元素.
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub fn append_shifted(&mut self, other: &UnionFind, offset: u32) {
        debug_assert_eq!(offset as usize + 1, self.len());
        self.parent
            .extend(other.parent.iter().skip(1).map(|p| p + offset));
    }
}

#[cfg(test)]
mod tests {
    use super::UnionFind;

    #[test]
    fn test_lowest_root_wins() {
        let mut uf = UnionFind::new();
        let ids: Vec<u32> = (0..5).map(|_| uf.make_set()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        uf.union(5, 3);
        uf.union(4, 5);
        assert_eq!(uf.find(4), 3);
        uf.union(4, 2);
        assert_eq!(uf.find(5), 2);
        assert_eq!(uf.find(1), 1);
        assert_eq!(uf.find(0), 0);
    }

    #[test]
    fn test_append_shifted() {
        let mut a = UnionFind::new();
        a.make_set();
        a.make_set();
        let mut b = UnionFind::new();
        b.make_set();
        b.make_set();
        b.union(1, 2);

        a.append_shifted(&b, 2);
        assert_eq!(a.len(), 5);
        assert_eq!(a.find(4), 3);
        assert_eq!(a.find(2), 2);
    }
}
