//! Read-only analytics over a built compatibility graph
//!
//! Components, hub ranking and incompatibility density. Every function takes
//! the graph by shared reference and returns plain serializable values.

use super::csr::CompatibilityGraph;
use crate::segment::ParsedRecords;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Connected-component partition of the graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    /// Component id per node, numbered in order of each component's lowest node
    pub component_of: Vec<u32>,
    /// Node count per component id
    pub sizes: Vec<usize>,
}

impl Components {
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    pub fn component(&self, node: u32) -> u32 {
        self.component_of[node as usize]
    }

    /// Size of the component containing `node`
    pub fn size_of(&self, node: u32) -> usize {
        self.sizes[self.component(node) as usize]
    }

    /// Nodes that form a component on their own
    pub fn isolates(&self) -> Vec<u32> {
        self.component_of
            .iter()
            .enumerate()
            .filter(|(_, c)| self.sizes[**c as usize] == 1)
            .map(|(n, _)| n as u32)
            .collect()
    }

    /// Size of the largest component, 0 for an empty graph
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Component id keyed by MIDDLE
    pub fn by_middle(&self, graph: &CompatibilityGraph) -> BTreeMap<String, u32> {
        self.component_of
            .iter()
            .enumerate()
            .map(|(n, &c)| (graph.middle(n as u32).to_string(), c))
            .collect()
    }
}

/// One node of the hub ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubEntry {
    pub node: u32,
    pub middle: String,
    pub degree: u32,
    /// Share of the other nodes this node is legal with
    pub participation: f64,
}

/// Per-folio incompatibility density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolioDensity {
    pub folio: String,
    /// Distinct MIDDLEs the folio uses
    pub middles: usize,
    pub density: f64,
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], i: usize, j: usize) {
    let pi = find(parent, i);
    let pj = find(parent, j);
    if pi != pj {
        // Lower root wins so relabelling follows node order
        let (lo, hi) = if pi < pj { (pi, pj) } else { (pj, pi) };
        parent[hi] = lo;
    }
}

impl CompatibilityGraph {
    /// Connected components via union-find
    pub fn components(&self) -> Components {
        let n = self.node_count();
        let mut parent: Vec<usize> = (0..n).collect();

        for (a, b) in self.edges() {
            union(&mut parent, a as usize, b as usize);
        }

        let mut label: FxHashMap<usize, u32> = FxHashMap::default();
        let mut component_of = Vec::with_capacity(n);
        let mut sizes: Vec<usize> = Vec::new();

        for i in 0..n {
            let root = find(&mut parent, i);
            let next = label.len() as u32;
            let id = *label.entry(root).or_insert(next);
            if id as usize == sizes.len() {
                sizes.push(0);
            }
            sizes[id as usize] += 1;
            component_of.push(id);
        }

        Components {
            component_of,
            sizes,
        }
    }

    fn hub_entry(&self, node: u32) -> HubEntry {
        let degree = self.degree(node);
        let others = self.node_count().saturating_sub(1);
        HubEntry {
            node,
            middle: self.middle(node).to_string(),
            degree,
            participation: if others == 0 {
                0.0
            } else {
                degree as f64 / others as f64
            },
        }
    }

    /// All nodes by degree, highest first; equal degrees keep insertion order
    pub fn hub_ranking(&self) -> Vec<HubEntry> {
        let mut nodes: Vec<u32> = (0..self.node_count() as u32).collect();
        // sort_by_key is stable
        nodes.sort_by_key(|&n| std::cmp::Reverse(self.degree(n)));
        nodes.into_iter().map(|n| self.hub_entry(n)).collect()
    }

    /// The top `k` of [`hub_ranking`](Self::hub_ranking)
    pub fn hubs(&self, k: usize) -> Vec<HubEntry> {
        let mut ranking = self.hub_ranking();
        ranking.truncate(k);
        ranking
    }

    /// `1 - legal_edges / possible_pairs` over the given MIDDLEs
    ///
    /// MIDDLEs that are not nodes are ignored, duplicates count once. Fewer
    /// than two nodes gives 0.
    pub fn incompatibility_density<S: AsRef<str>>(&self, subset: &[S]) -> f64 {
        let ids: FxHashSet<u32> = subset
            .iter()
            .filter_map(|m| self.node_id(m.as_ref()))
            .collect();
        self.density_of_ids(&ids)
    }

    /// Incompatibility density of the whole graph
    pub fn density(&self) -> f64 {
        let ids: FxHashSet<u32> = (0..self.node_count() as u32).collect();
        self.density_of_ids(&ids)
    }

    fn density_of_ids(&self, ids: &FxHashSet<u32>) -> f64 {
        let k = ids.len();
        if k < 2 {
            return 0.0;
        }
        let possible = k * (k - 1) / 2;
        let legal: usize = ids
            .iter()
            .map(|&a| {
                self.neighbors(a)
                    .iter()
                    .filter(|&&b| b > a && ids.contains(&b))
                    .count()
            })
            .sum();
        1.0 - legal as f64 / possible as f64
    }

    /// Incompatibility density of the MIDDLEs used by each folio, in order of
    /// first appearance
    pub fn density_by_folio(&self, parsed: &ParsedRecords<'_>) -> Vec<FolioDensity> {
        let mut order: Vec<String> = Vec::new();
        let mut used: FxHashMap<String, FxHashSet<u32>> = FxHashMap::default();

        for (record, analyses) in parsed.iter() {
            if !used.contains_key(&record.folio) {
                order.push(record.folio.clone());
                used.insert(record.folio.clone(), FxHashSet::default());
            }
            let ids = used.entry(record.folio.clone()).or_default();
            for analysis in analyses.iter().filter_map(|r| r.as_ref().ok()) {
                if let Some(id) = self.node_id(&analysis.middle) {
                    ids.insert(id);
                }
            }
        }

        order
            .into_iter()
            .map(|folio| {
                let ids = used.remove(&folio).unwrap_or_default();
                FolioDensity {
                    middles: ids.len(),
                    density: self.density_of_ids(&ids),
                    folio,
                }
            })
            .collect()
    }

    /// Distinct MIDDLEs in the order the records first use them
    pub fn introduction_order(&self, parsed: &ParsedRecords<'_>) -> Vec<String> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut order = Vec::new();
        for analysis in parsed.successes() {
            if seen.insert(analysis.middle.as_str()) {
                order.push(analysis.middle.clone());
            }
        }
        order
    }
}
