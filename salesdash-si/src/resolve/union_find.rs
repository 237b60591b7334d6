//! Union-find over record indices
//!
//! Union by rank with path halving. The extracted partition depends only
//! on which unions were applied, not on their order, which is what makes
//! the resolver's output order-independent.

use std::collections::BTreeMap;

pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    /// Every element starts as its own singleton
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut current = x;
        while self.parent[current] != current {
            // Path halving
            self.parent[current] = self.parent[self.parent[current]];
            current = self.parent[current];
        }
        current
    }

    /// Merge the sets containing `a` and `b`; returns false when they were
    /// already the same set
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        if self.rank[root_a] < self.rank[root_b] {
            self.parent[root_a] = root_b;
        } else if self.rank[root_a] > self.rank[root_b] {
            self.parent[root_b] = root_a;
        } else {
            self.parent[root_b] = root_a;
            self.rank[root_a] += 1;
        }
        true
    }

    /// The partition as groups of member indices. Members ascend within a
    /// group and groups are ordered by their smallest member, so the
    /// rendering is canonical whatever order unions happened in.
    pub fn partitions(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in 0..self.parent.len() {
            let root = self.find(index);
            by_root.entry(root).or_default().push(index);
        }
        let mut groups: Vec<Vec<usize>> = by_root.into_values().collect();
        groups.sort_by_key(|group| group[0]);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_without_unions() {
        let mut uf = UnionFind::new(3);
        assert_eq!(uf.partitions(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn union_merges_transitively() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 3);
        uf.union(3, 4);
        assert_eq!(uf.find(0), uf.find(4));
        assert_eq!(uf.partitions(), vec![vec![0, 3, 4], vec![1], vec![2]]);
    }

    #[test]
    fn redundant_union_reports_false() {
        let mut uf = UnionFind::new(2);
        assert!(uf.union(0, 1));
        assert!(!uf.union(1, 0));
    }

    #[test]
    fn partition_is_independent_of_union_order() {
        let mut forward = UnionFind::new(6);
        forward.union(0, 2);
        forward.union(2, 4);
        forward.union(1, 5);

        let mut backward = UnionFind::new(6);
        backward.union(1, 5);
        backward.union(4, 2);
        backward.union(2, 0);

        assert_eq!(forward.partitions(), backward.partitions());
    }
}
