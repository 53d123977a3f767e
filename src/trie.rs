// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The compressed word trie: two dense arrays addressed by the same index.
//!
//! At a node-start index `n`, `byts[n]` holds the sibling count `k` and
//! `byts[n+1..=n+k]` the sibling byte values in ascending order. NUL
//! siblings come first and mean "a word may end here"; their `idxs` slot
//! holds the packed word value (see `types::WordMeta`) instead of a child
//! index. Several consecutive NULs encode alternative flag/region/affix
//! combinations for the same word.
//!
//! Shared subtrees are plain index aliasing: two parents can point at the
//! same child start. [`TrieBuilder`] produces that sharing by hash-consing
//! equivalent subtrees before flattening, which is what keeps a
//! multi-million-word dictionary in tens of megabytes.
//!
//! Every accessor is bounds-checked and returns `None`/nothing on a
//! structurally broken index: lookup layers translate that into "bad
//! word" rather than an error (the file codec already validated counts,
//! this is belt-and-braces against corrupt sharing).

use std::collections::HashMap;

/// Paired `byts`/`idxs` arrays for one word tree.
#[derive(Debug, Clone, Default)]
pub struct TrieStore {
    byts: Vec<u8>,
    idxs: Vec<u32>,
}

impl TrieStore {
    pub fn new(byts: Vec<u8>, idxs: Vec<u32>) -> Self {
        debug_assert_eq!(byts.len(), idxs.len());
        TrieStore { byts, idxs }
    }

    /// True when the tree holds no words at all.
    pub fn is_empty(&self) -> bool {
        self.byts.is_empty()
    }

    /// Total number of array slots (node counts plus siblings).
    pub fn len(&self) -> usize {
        self.byts.len()
    }

    pub fn byts(&self) -> &[u8] {
        &self.byts
    }

    pub fn idxs(&self) -> &[u32] {
        &self.idxs
    }

    /// Number of siblings at `node`, or `None` when the index is out of
    /// range or the sibling slice would be.
    pub fn sibling_count(&self, node: usize) -> Option<usize> {
        let count = *self.byts.get(node)? as usize;
        if node + count >= self.byts.len() && count > 0 {
            return None;
        }
        Some(count)
    }

    /// The packed word values of the leading NUL siblings at `node`, in
    /// on-disk order. Empty when no word ends here.
    pub fn word_values(&self, node: usize) -> &[u32] {
        let Some(count) = self.sibling_count(node) else {
            return &[];
        };
        let sibs = &self.byts[node + 1..node + 1 + count];
        let nuls = sibs.iter().take_while(|&&b| b == 0).count();
        &self.idxs[node + 1..node + 1 + nuls]
    }

    /// Follow the sibling with byte value `b` (non-NUL) from `node`.
    /// Binary search over the sorted sibling bytes.
    pub fn child(&self, node: usize, b: u8) -> Option<usize> {
        debug_assert_ne!(b, 0);
        let count = self.sibling_count(node)?;
        let sibs = &self.byts[node + 1..node + 1 + count];
        let at = sibs.binary_search(&b).ok()?;
        let child = self.idxs[node + 1 + at] as usize;
        if child < self.byts.len() {
            Some(child)
        } else {
            None
        }
    }

    /// Non-NUL siblings at `node` as `(byte, child_index)` pairs, used by
    /// suggestion walks that must try every branch.
    pub fn branches(&self, node: usize) -> impl Iterator<Item = (u8, usize)> + '_ {
        let count = self.sibling_count(node).unwrap_or(0);
        (node + 1..node + 1 + count)
            .filter(move |&i| self.byts[i] != 0)
            .map(move |i| (self.byts[i], self.idxs[i] as usize))
    }

    /// Depth-first traversal of all words. The callback receives the word
    /// bytes and each packed value in on-disk order. Shared subtrees are
    /// visited once per path, which is exactly what enumerating words
    /// requires.
    pub fn for_each_word<F: FnMut(&[u8], u32)>(&self, mut f: F) {
        if self.is_empty() {
            return;
        }
        let mut word: Vec<u8> = Vec::with_capacity(64);
        self.walk_words(0, &mut word, &mut f, 0);
    }

    fn walk_words<F: FnMut(&[u8], u32)>(
        &self,
        node: usize,
        word: &mut Vec<u8>,
        f: &mut F,
        depth: usize,
    ) {
        // Corrupt sharing could loop; the depth guard turns that into
        // silently dropped garbage words instead of a stack overflow.
        if depth > crate::types::MAXWLEN {
            return;
        }
        let Some(count) = self.sibling_count(node) else {
            return;
        };
        for i in node + 1..node + 1 + count {
            let b = self.byts[i];
            if b == 0 {
                f(word, self.idxs[i]);
            } else {
                let child = self.idxs[i] as usize;
                word.push(b);
                self.walk_words(child, word, f, depth + 1);
                word.pop();
            }
        }
    }

    /// Store the word count of every subtree in the otherwise unused
    /// `idxs` slot of each node-start index. Needed for looking up a word
    /// by its number when expanding `.sug` suggestions.
    pub fn store_subtree_counts(&mut self) {
        if self.is_empty() {
            return;
        }
        // Iterative post-order: children first so parents can sum them.
        let mut arr: Vec<usize> = vec![0];
        let mut cur: Vec<usize> = vec![1];
        let mut counts: Vec<u32> = vec![0];
        while let Some(&node) = arr.last() {
            let depth = arr.len() - 1;
            let total = self.byts[node] as usize;
            if cur[depth] > total {
                self.idxs[node] = counts[depth];
                if depth > 0 {
                    counts[depth - 1] += counts[depth];
                }
                arr.pop();
                cur.pop();
                counts.pop();
                continue;
            }
            let i = node + cur[depth];
            cur[depth] += 1;
            let b = self.byts[i];
            if b == 0 {
                // One word, however many flag variants follow.
                counts[depth] += 1;
                while cur[depth] <= total && self.byts[node + cur[depth]] == 0 {
                    cur[depth] += 1;
                }
            } else {
                arr.push(self.idxs[i] as usize);
                cur.push(1);
                counts.push(0);
            }
        }
    }

    /// Number of distinct nodes, counted the way the file format does
    /// (each node contributes `1 + sibling_count` slots, shared nodes
    /// count once).
    pub fn node_count(&self) -> usize {
        let mut seen = vec![false; self.byts.len().max(1)];
        let mut count = 0usize;
        let mut stack = vec![0usize];
        if self.is_empty() {
            return 0;
        }
        while let Some(node) = stack.pop() {
            if seen[node] {
                continue;
            }
            seen[node] = true;
            count += 1;
            for (_, child) in self.branches(node) {
                stack.push(child);
            }
        }
        count
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Trie-compression memory thresholds, the `mkspellmem` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressLimits {
    /// KByte of node memory before the first compression.
    pub start: u32,
    /// KByte of growth between subsequent compressions.
    pub inc: u32,
    /// Words added between compressions once memory is tight.
    pub added: u32,
}

impl Default for CompressLimits {
    fn default() -> Self {
        // The classic `mkspellmem` default: 460 000, 8 000, 500 000.
        CompressLimits {
            start: 460_000,
            inc: 8_000,
            added: 500_000,
        }
    }
}

impl CompressLimits {
    /// All three must be positive and `inc` must not exceed `start`.
    pub fn validate(&self) -> bool {
        self.start > 0 && self.inc > 0 && self.added > 0 && self.inc <= self.start
    }
}

#[derive(Debug, Clone)]
struct BuildNode {
    byte: u8,
    /// Packed word value for NUL nodes, 0 otherwise.
    value: u32,
    /// Child node indices, NULs first then ascending byte order.
    children: Vec<usize>,
    /// In-edge count after compression. A node with more than one parent
    /// must be unshared before an insert may mutate it.
    refs: u32,
}

/// Incremental trie construction with content-addressed compression.
///
/// Insert words (already case-folded for the fold tree), then `finish()`
/// to obtain the flat arrays with shared subtrees coalesced.
pub struct TrieBuilder {
    arena: Vec<BuildNode>,
    limits: CompressLimits,
    words_since_compress: u32,
    compressed_once: bool,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::with_limits(CompressLimits::default())
    }

    pub fn with_limits(limits: CompressLimits) -> Self {
        TrieBuilder {
            arena: vec![BuildNode {
                byte: 0,
                value: 0,
                children: Vec::new(),
                refs: 1,
            }],
            limits,
            words_since_compress: 0,
            compressed_once: false,
        }
    }

    /// Add one word with its packed value. Identical (word, value) pairs
    /// collapse to a single entry; differing values on the same word pile
    /// up as consecutive NUL siblings in insertion order.
    pub fn insert(&mut self, word: &[u8], value: u32) {
        let mut node = 0usize;
        for &b in word {
            debug_assert_ne!(b, 0);
            node = self.child_or_new(node, b);
        }
        // A NUL child per distinct value, insertion order preserved.
        let exists = self.arena[node]
            .children
            .iter()
            .any(|&c| self.arena[c].byte == 0 && self.arena[c].value == value);
        if !exists {
            let at = self.arena[node]
                .children
                .iter()
                .position(|&c| self.arena[c].byte != 0)
                .unwrap_or(self.arena[node].children.len());
            let nul = self.alloc(0, value);
            self.arena[node].children.insert(at, nul);
        }

        self.words_since_compress += 1;
        if self.due_for_compress() {
            self.compress();
        }
    }

    fn due_for_compress(&self) -> bool {
        // Approximate the classic memory accounting: the first compression
        // waits for `start` KByte worth of nodes, later ones for `inc`;
        // `added` words force one regardless.
        let node_kb = (self.arena.len() * std::mem::size_of::<BuildNode>()) / 1024;
        if self.words_since_compress >= self.limits.added {
            return true;
        }
        if self.compressed_once {
            node_kb >= self.limits.inc as usize && self.words_since_compress > 0
        } else {
            node_kb >= self.limits.start as usize
        }
    }

    fn child_or_new(&mut self, node: usize, b: u8) -> usize {
        if let Some(pos) = self.arena[node]
            .children
            .iter()
            .position(|&c| self.arena[c].byte == b)
        {
            let c = self.arena[node].children[pos];
            return self.unshared(node, pos, c);
        }
        let at = self.arena[node]
            .children
            .iter()
            .position(|&c| self.arena[c].byte > b)
            .unwrap_or(self.arena[node].children.len());
        let new = self.alloc(b, 0);
        self.arena[node].children.insert(at, new);
        new
    }

    /// Make sure the child at `parent.children[pos]` is exclusively ours
    /// before descending to mutate it. Compression can leave a subtree
    /// with several parents; cloning one level restores single ownership,
    /// deeper levels unshare lazily as the descent continues.
    fn unshared(&mut self, parent: usize, pos: usize, child: usize) -> usize {
        if self.arena[child].refs <= 1 {
            return child;
        }
        self.arena[child].refs -= 1;
        let mut clone = self.arena[child].clone();
        clone.refs = 1;
        for &gc in &clone.children {
            self.arena[gc].refs += 1;
        }
        self.arena.push(clone);
        let new = self.arena.len() - 1;
        self.arena[parent].children[pos] = new;
        new
    }

    fn alloc(&mut self, byte: u8, value: u32) -> usize {
        self.arena.push(BuildNode {
            byte,
            value,
            children: Vec::new(),
            refs: 1,
        });
        self.arena.len() - 1
    }

    /// Coalesce equivalent subtrees by post-order fingerprinting. Children
    /// pointers are rewritten to canonical representatives; orphaned nodes
    /// stay in the arena until `finish()` drops them.
    pub fn compress(&mut self) {
        let mut canon: HashMap<Vec<u64>, usize> = HashMap::new();
        let mut rewritten: HashMap<usize, usize> = HashMap::new();
        Self::canonicalize(&mut self.arena, 0, &mut canon, &mut rewritten);
        self.recount_refs();
        self.words_since_compress = 0;
        self.compressed_once = true;
    }

    /// Recompute in-edge counts from the root after canonicalization.
    fn recount_refs(&mut self) {
        for n in &mut self.arena {
            n.refs = 0;
        }
        self.arena[0].refs = 1;
        let mut visited = vec![false; self.arena.len()];
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            let children = self.arena[node].children.clone();
            for c in children {
                self.arena[c].refs += 1;
                stack.push(c);
            }
        }
    }

    fn canonicalize(
        arena: &mut Vec<BuildNode>,
        node: usize,
        canon: &mut HashMap<Vec<u64>, usize>,
        rewritten: &mut HashMap<usize, usize>,
    ) -> usize {
        if let Some(&r) = rewritten.get(&node) {
            return r;
        }
        let children = arena[node].children.clone();
        let mut new_children = Vec::with_capacity(children.len());
        for c in children {
            new_children.push(Self::canonicalize(arena, c, canon, rewritten));
        }
        arena[node].children = new_children;

        // Fingerprint: own byte/value plus each (already canonical) child.
        let mut key: Vec<u64> = Vec::with_capacity(arena[node].children.len() + 1);
        key.push(((arena[node].byte as u64) << 32) | arena[node].value as u64);
        for &c in &arena[node].children {
            key.push(c as u64);
        }
        let repr = *canon.entry(key).or_insert(node);
        rewritten.insert(node, repr);
        repr
    }

    /// Compress one final time and flatten into the paired arrays.
    pub fn finish(mut self) -> TrieStore {
        // An empty builder (no words) flattens to an empty store, the
        // canonical "no tree" representation in the file.
        if self.arena[0].children.is_empty() {
            return TrieStore::default();
        }
        self.compress();

        let mut byts: Vec<u8> = Vec::new();
        let mut idxs: Vec<u32> = Vec::new();
        let mut placed: HashMap<usize, u32> = HashMap::new();
        Self::flatten(&self.arena, 0, &mut byts, &mut idxs, &mut placed);
        TrieStore::new(byts, idxs)
    }

    fn flatten(
        arena: &[BuildNode],
        node: usize,
        byts: &mut Vec<u8>,
        idxs: &mut Vec<u32>,
        placed: &mut HashMap<usize, u32>,
    ) -> u32 {
        if let Some(&at) = placed.get(&node) {
            return at;
        }
        let start = byts.len() as u32;
        placed.insert(node, start);
        let children = &arena[node].children;
        byts.push(children.len() as u8);
        idxs.push(0);
        // Reserve the sibling slots, then fill: children flatten after the
        // parent so the parent occupies one contiguous run.
        let first_slot = byts.len();
        for &c in children {
            byts.push(arena[c].byte);
            idxs.push(0);
        }
        for (i, &c) in children.iter().enumerate() {
            if arena[c].byte == 0 {
                idxs[first_slot + i] = arena[c].value;
            } else {
                let child_at = Self::flatten(arena, c, byts, idxs, placed);
                idxs[first_slot + i] = child_at;
            }
        }
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(words: &[(&str, u32)]) -> TrieStore {
        let mut b = TrieBuilder::new();
        for &(w, v) in words {
            b.insert(w.as_bytes(), v);
        }
        b.finish()
    }

    fn collect(store: &TrieStore) -> Vec<(String, u32)> {
        let mut out = Vec::new();
        store.for_each_word(|w, v| out.push((String::from_utf8_lossy(w).into_owned(), v)));
        out
    }

    #[test]
    fn empty_tree() {
        let store = TrieBuilder::new().finish();
        assert!(store.is_empty());
        assert_eq!(store.node_count(), 0);
        assert!(store.word_values(0).is_empty());
    }

    #[test]
    fn insert_and_walk() {
        let store = build(&[("the", 0), ("these", 0), ("theses", 0)]);
        let words: Vec<String> = collect(&store).into_iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["the", "these", "theses"]);
    }

    #[test]
    fn lookup_by_child() {
        let store = build(&[("the", 7), ("tea", 9)]);
        let mut node = 0usize;
        for &b in b"the" {
            node = store.child(node, b).unwrap();
        }
        assert_eq!(store.word_values(node), &[7]);
        assert!(store.child(0, b'x').is_none());
    }

    #[test]
    fn multiple_values_keep_insertion_order() {
        let store = build(&[("color", 3), ("color", 11)]);
        let mut node = 0usize;
        for &b in b"color" {
            node = store.child(node, b).unwrap();
        }
        assert_eq!(store.word_values(node), &[3, 11]);
        // Identical duplicates collapse.
        let store2 = build(&[("color", 3), ("color", 3)]);
        let mut node = 0usize;
        for &b in b"color" {
            node = store2.child(node, b).unwrap();
        }
        assert_eq!(store2.word_values(node), &[3]);
    }

    #[test]
    fn shared_suffixes_compress() {
        // "walked"/"talked" share the "alked" tail; compression must fold
        // the common subtree into one copy.
        let shared = build(&[("walked", 0), ("talked", 0)]);
        let unshared = {
            let mut b = TrieBuilder::new();
            b.insert(b"walked", 0);
            b.finish()
        };
        assert!(shared.len() < unshared.len() * 2);
        let words: Vec<String> = collect(&shared).into_iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["talked", "walked"]);
    }

    #[test]
    fn compression_is_idempotent_on_contents() {
        let mut b = TrieBuilder::new();
        for w in ["ring", "sing", "king", "rings", "sings", "kings"] {
            b.insert(w.as_bytes(), 0);
        }
        b.compress();
        let store = b.finish();
        let mut words: Vec<String> = collect(&store).into_iter().map(|(w, _)| w).collect();
        words.sort();
        assert_eq!(words, vec!["king", "kings", "ring", "rings", "sing", "sings"]);
    }

    #[test]
    fn limits_validation() {
        assert!(CompressLimits::default().validate());
        assert!(!CompressLimits {
            start: 100,
            inc: 200,
            added: 1
        }
        .validate());
        assert!(!CompressLimits {
            start: 0,
            inc: 0,
            added: 0
        }
        .validate());
    }
}
