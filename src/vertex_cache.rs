//! Vertex cache simulation and cache-aware element ordering.
//!
//! The simulator processes springs and triangles sequentially, touching the
//! points each element references. How often those points are still "hot"
//! depends only on the element order, which this module can measure and
//! improve:
//!
//! - [`LruVertexCache`]: a fixed-size least-recently-used cache model
//! - [`acmr`]: average cache miss ratio of an element sequence
//! - [`vertex_miss_ratio`]: how far a triangle sequence is from a strip
//! - [`forsyth_order`]: Tom Forsyth's greedy linear-speed vertex cache
//!   optimization, generalized to elements of any arity
//!
//! # Example
//!
//! ```
//! use shipmesh::vertex_cache::{acmr, forsyth_order};
//!
//! // Springs of a 2x2 square, in a poor order
//! let springs = [[0u32, 3], [1, 2], [0, 1], [2, 3], [0, 2], [1, 3]];
//! let order = forsyth_order(&springs, 4, 32);
//! let reordered: Vec<[u32; 2]> = order.iter().map(|&i| springs[i]).collect();
//!
//! assert!(acmr(&reordered, 32) <= acmr(&springs, 32));
//! ```

use std::collections::VecDeque;

/// Default number of cache slots.
pub const DEFAULT_CACHE_SIZE: usize = 32;

// Forsyth scoring constants
const CACHE_DECAY_POWER: f32 = 1.5;
const LAST_ELEMENT_SCORE: f32 = 0.75;
const VALENCE_BOOST_SCALE: f32 = 2.0;
const VALENCE_BOOST_POWER: f32 = 0.5;

// ==================== LRU model ====================

/// A least-recently-used cache of vertex indices.
///
/// The front of the queue is the most recently used vertex.
#[derive(Debug, Clone)]
pub struct LruVertexCache {
    entries: VecDeque<u32>,
    size: usize,
}

impl LruVertexCache {
    /// Create an empty cache with `size` slots.
    pub fn new(size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(size + 1),
            size,
        }
    }

    /// Touch a vertex.
    ///
    /// # Returns
    /// `true` on a cache hit, `false` on a miss.
    pub fn use_vertex(&mut self, vertex: u32) -> bool {
        if let Some(position) = self.position(vertex) {
            self.entries.remove(position);
            self.entries.push_front(vertex);
            return true;
        }

        self.entries.push_front(vertex);
        self.entries.truncate(self.size);
        false
    }

    /// Position of a vertex in the cache, 0 being the most recent.
    pub fn position(&self, vertex: u32) -> Option<usize> {
        self.entries.iter().position(|&v| v == vertex)
    }

    /// Number of vertices currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no vertex.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==================== Metrics ====================

/// Average cache miss ratio of a sequence of elements.
///
/// Every vertex of every element is pushed through an LRU cache of
/// `cache_size` slots; the result is the number of misses divided by the
/// number of elements. A perfect spring order approaches 0.5 misses per
/// spring on a long chain; the worst order is `N`.
///
/// Returns 0 for an empty sequence.
pub fn acmr<const N: usize>(elements: &[[u32; N]], cache_size: usize) -> f32 {
    if elements.is_empty() {
        return 0.0;
    }

    let mut cache = LruVertexCache::new(cache_size);
    let misses = elements
        .iter()
        .flat_map(|element| element.iter())
        .filter(|&&v| !cache.use_vertex(v))
        .count();

    misses as f32 / elements.len() as f32
}

/// Ratio of vertices not shared with the previous triangle.
///
/// 0 when every triangle shares an edge with its predecessor, as in a
/// strip; 1 when consecutive triangles share nothing.
pub fn vertex_miss_ratio(triangles: &[[u32; 3]]) -> f32 {
    if triangles.is_empty() {
        return 0.0;
    }

    let misses: usize = triangles
        .windows(2)
        .map(|pair| {
            let common = pair[1].iter().filter(|v| pair[0].contains(v)).count();
            2usize.saturating_sub(common)
        })
        .sum();

    misses as f32 / (2.0 * triangles.len() as f32)
}

// ==================== Forsyth ordering ====================

#[derive(Debug, Clone, Default)]
struct VertexData {
    cache_position: Option<usize>,
    score: f32,
    remaining_elements: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    score: f32,
    drawn: bool,
}

fn vertex_score(vertex: &VertexData, arity: usize, cache_size: usize) -> f32 {
    if vertex.remaining_elements.is_empty() {
        return -1.0;
    }

    let mut score = match vertex.cache_position {
        Some(position) if position < arity => LAST_ELEMENT_SCORE,
        Some(position) => {
            let scaler = 1.0 / (cache_size - arity) as f32;
            (1.0 - (position - arity) as f32 * scaler).powf(CACHE_DECAY_POWER)
        }
        None => 0.0,
    };

    // Favor vertices with few elements left, so lone vertices go early
    let valence = vertex.remaining_elements.len() as f32;
    score += VALENCE_BOOST_SCALE * valence.powf(-VALENCE_BOOST_POWER);

    score
}

/// Greedy cache-aware ordering of elements.
///
/// Each step draws the element whose vertices score highest, where a vertex
/// scores for being recently used and for having few elements left to draw.
/// Only elements touching cached vertices are rescored per step; a full scan
/// happens when none of them is left.
///
/// # Arguments
///
/// * `elements` - Vertex indices of each element
/// * `vertex_count` - Number of vertices; every index must be below it
/// * `cache_size` - Simulated cache slots; must exceed `N`
///
/// # Returns
/// A permutation of `0..elements.len()`: the new order of old indices.
pub fn forsyth_order<const N: usize>(
    elements: &[[u32; N]],
    vertex_count: usize,
    cache_size: usize,
) -> Vec<usize> {
    debug_assert!(N < cache_size, "cache must hold more than one element");

    let mut vertices = vec![VertexData::default(); vertex_count];
    let mut element_data = vec![ElementData::default(); elements.len()];

    for (e, element) in elements.iter().enumerate() {
        for &v in element {
            vertices[v as usize].remaining_elements.push(e);
        }
    }

    for vertex in &mut vertices {
        vertex.score = vertex_score(vertex, N, cache_size);
    }

    let mut best: Option<usize> = None;
    let mut best_score = f32::MIN;
    for (e, element) in elements.iter().enumerate() {
        let score: f32 = element.iter().map(|&v| vertices[v as usize].score).sum();
        element_data[e].score = score;
        if score > best_score {
            best_score = score;
            best = Some(e);
        }
    }

    let mut cache: VecDeque<usize> = VecDeque::with_capacity(cache_size + N);
    let mut order = Vec::with_capacity(elements.len());

    while order.len() < elements.len() {
        let chosen = match best {
            Some(e) => e,
            None => {
                let Some(e) = best_undrawn(&element_data) else {
                    break;
                };
                e
            }
        };

        order.push(chosen);
        element_data[chosen].drawn = true;

        for &v in &elements[chosen] {
            let v = v as usize;
            vertices[v].remaining_elements.retain(|&e| e != chosen);

            if let Some(position) = cache.iter().position(|&c| c == v) {
                cache.remove(position);
            }
            cache.push_front(v);
        }

        for (position, &v) in cache.iter().enumerate() {
            let vertex = &mut vertices[v];
            vertex.cache_position = (position < cache_size).then_some(position);
            vertex.score = vertex_score(vertex, N, cache_size);
        }

        // An element scores the sum over all its vertices, cached or not
        best = None;
        best_score = f32::MIN;
        for &v in &cache {
            for &e in &vertices[v].remaining_elements {
                debug_assert!(!element_data[e].drawn);
                let score: f32 = elements[e].iter().map(|&u| vertices[u as usize].score).sum();
                element_data[e].score = score;
                if score > best_score {
                    best_score = score;
                    best = Some(e);
                }
            }
        }

        while cache.len() > cache_size {
            if let Some(evicted) = cache.pop_back() {
                vertices[evicted].cache_position = None;
            }
        }
    }

    order
}

fn best_undrawn(elements: &[ElementData]) -> Option<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.drawn)
        .max_by(|(_, a), (_, b)| a.score.total_cmp(&b.score))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Springs of a `w` x `h` grid: horizontal, vertical and both diagonals.
    fn grid_springs(w: u32, h: u32) -> Vec<[u32; 2]> {
        let id = |x: u32, y: u32| x + y * w;
        let mut springs = Vec::new();
        for y in 0..h {
            for x in 0..w {
                if x + 1 < w {
                    springs.push([id(x, y), id(x + 1, y)]);
                }
                if y + 1 < h {
                    springs.push([id(x, y), id(x, y + 1)]);
                }
                if x + 1 < w && y + 1 < h {
                    springs.push([id(x, y), id(x + 1, y + 1)]);
                    springs.push([id(x + 1, y), id(x, y + 1)]);
                }
            }
        }
        springs
    }

    /// A deterministic scramble: stride through the sequence.
    fn scrambled<T: Copy>(items: &[T]) -> Vec<T> {
        let n = items.len();
        let stride = (0..)
            .map(|k| n / 2 + 1 + k)
            .find(|&s| gcd(s, n) == 1)
            .unwrap();
        (0..n).map(|i| items[(i * stride) % n]).collect()
    }

    fn gcd(a: usize, b: usize) -> usize {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }

    #[test]
    fn test_lru_hits_and_misses() {
        let mut cache = LruVertexCache::new(2);
        assert!(!cache.use_vertex(0));
        assert!(!cache.use_vertex(1));
        assert!(cache.use_vertex(0));
        assert_eq!(cache.position(0), Some(0));
        assert_eq!(cache.position(1), Some(1));

        // Evicts 1, the least recent
        assert!(!cache.use_vertex(2));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.position(1), None);
        assert!(cache.use_vertex(0));
    }

    #[test]
    fn test_acmr_chain() {
        // 4 distinct vertices over 3 springs
        let chain = [[0u32, 1], [1, 2], [2, 3]];
        assert!((acmr(&chain, 32) - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_acmr_with_eviction() {
        let springs = [[0u32, 1], [2, 3], [0, 1]];
        assert_eq!(acmr(&springs, 2), 2.0);
        assert!((acmr(&springs, 4) - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_acmr_empty() {
        let empty: [[u32; 3]; 0] = [];
        assert_eq!(acmr(&empty, 32), 0.0);
    }

    #[test]
    fn test_vertex_miss_ratio() {
        let strip = [[0u32, 1, 2], [1, 2, 3], [2, 3, 4]];
        assert_eq!(vertex_miss_ratio(&strip), 0.0);

        let disjoint = [[0u32, 1, 2], [3, 4, 5], [6, 7, 8]];
        assert!((vertex_miss_ratio(&disjoint) - 4.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_forsyth_is_permutation() {
        let springs = grid_springs(7, 5);
        let mut order = forsyth_order(&springs, 35, DEFAULT_CACHE_SIZE);
        assert_eq!(order.len(), springs.len());
        order.sort_unstable();
        assert!(order.iter().enumerate().all(|(i, &e)| i == e));
    }

    #[test]
    fn test_forsyth_improves_scrambled_springs() {
        let springs = scrambled(&grid_springs(40, 30));
        let order = forsyth_order(&springs, 1200, DEFAULT_CACHE_SIZE);
        let reordered: Vec<[u32; 2]> = order.iter().map(|&i| springs[i]).collect();

        let before = acmr(&springs, DEFAULT_CACHE_SIZE);
        let after = acmr(&reordered, DEFAULT_CACHE_SIZE);
        assert!(after < before, "before {} after {}", before, after);
    }

    #[test]
    fn test_forsyth_triangles() {
        let mut triangles = Vec::new();
        let w = 20u32;
        for y in 0..15u32 {
            for x in 0..w - 1 {
                let (a, b, c, d) = (x + y * w, x + 1 + y * w, x + (y + 1) * w, x + 1 + (y + 1) * w);
                triangles.push([a, b, c]);
                triangles.push([b, d, c]);
            }
        }
        let triangles = scrambled(&triangles);
        let order = forsyth_order(&triangles, (w * 16) as usize, DEFAULT_CACHE_SIZE);
        let reordered: Vec<[u32; 3]> = order.iter().map(|&i| triangles[i]).collect();

        assert_eq!(reordered.len(), triangles.len());
        assert!(acmr(&reordered, DEFAULT_CACHE_SIZE) < acmr(&triangles, DEFAULT_CACHE_SIZE));
    }

    #[test]
    fn test_forsyth_counts_uncached_vertex_valence() {
        // After [0, 1], both [1, 3] and [1, 2] share the cached vertex 1.
        // Vertex 2 has nothing else left while vertex 3 still has three
        // springs, so [1, 2] must go next.
        let springs = [[0u32, 1], [1, 3], [1, 2], [3, 4], [3, 5], [3, 6]];
        let order = forsyth_order(&springs, 7, DEFAULT_CACHE_SIZE);
        assert_eq!(&order[..2], &[0, 2]);
    }

    #[test]
    fn test_forsyth_disconnected_elements() {
        // No shared vertices: every step after the first falls back to a scan
        let springs = [[0u32, 1], [2, 3], [4, 5]];
        let order = forsyth_order(&springs, 6, 4);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_vertex_score() {
        let lone = VertexData {
            cache_position: None,
            score: 0.0,
            remaining_elements: vec![0],
        };
        assert!((vertex_score(&lone, 2, 32) - 2.0).abs() < 1e-6);

        let recent = VertexData {
            cache_position: Some(1),
            ..lone.clone()
        };
        assert!((vertex_score(&recent, 2, 32) - 2.75).abs() < 1e-6);

        let done = VertexData {
            remaining_elements: Vec::new(),
            ..lone
        };
        assert_eq!(vertex_score(&done, 2, 32), -1.0);
    }
}
