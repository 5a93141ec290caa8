//! # Pathway Search Module
//!
//! ## Purpose
//! Finds reaction paths between two compounds, either the shortest one or every simple path up to a
//! length bound, with thermodynamic (Gibbs energy) and novelty pruning.
//!
//! ## Main Data Structures
//! - `PathwayQuery`: endpoints, length bound, mode flag, pruning thresholds, verbosity
//! - `Path`: `[compound, reaction, compound, ..., compound]`, its length is the number of reactions
//! - `NeighborSource`: what a traversal needs from a graph (does a node exist, feasible next steps)
//! - `StoreGraph`: `NeighborSource` backed by a `CompoundStore`, loads and prunes lazily, caches per request
//! - `PathFinder` / `SearchMode`: the two traversals behind one dispatch enum
//!
//! ## Key Logic
//! 1. **Resolution**: unknown start or end compound gives an empty result, not an error
//! 2. **Edges**: compound -> product for every reaction the compound is a reactant of; self loops are dropped
//! 3. **Pruning**: a reaction with Gibbs energy above the ceiling is never followed, a destination with a
//!    novelty score below the floor (or unknown to the store) is never entered
//! 4. **BFS**: visited set plus parent map, the end node is checked when discovered, nodes at depth
//!    `max_length` are not expanded
//! 5. **DFS**: recursive enumeration with an on-path set, so no compound repeats inside one path

use crate::Store::{Compound, CompoundStore, StoreError};
use crate::cancel::CancelToken;
use crate::error::SearchError;
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

pub const DEFAULT_NP_MIN: f64 = -3.0;
pub const DEFAULT_GIBBS_CAP: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayQuery {
    pub start: String,
    pub end: String,
    /// maximum number of reactions in a path
    pub max_length: usize,
    pub all_paths: bool,
    /// novelty-score floor
    pub np_min: f64,
    /// Gibbs-energy ceiling
    pub gibbs_cap: f64,
    pub verbose: bool,
}

impl PathwayQuery {
    pub fn new(start: &str, end: &str, max_length: usize, all_paths: bool) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            max_length,
            all_paths,
            np_min: DEFAULT_NP_MIN,
            gibbs_cap: DEFAULT_GIBBS_CAP,
            verbose: false,
        }
    }

    pub fn np_min(mut self, np_min: f64) -> Self {
        self.np_min = np_min;
        self
    }

    pub fn gibbs_cap(mut self, gibbs_cap: f64) -> Self {
        self.gibbs_cap = gibbs_cap;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn mode(&self) -> SearchMode {
        if self.all_paths {
            SearchMode::AllPaths(AllPaths {
                max_length: self.max_length,
            })
        } else {
            SearchMode::ShortestPath(ShortestPath {
                max_length: self.max_length,
            })
        }
    }
}

/// Alternating compound and reaction ids, starting and ending with a compound id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The zero-length path made of one compound.
    pub fn single(compound_id: &str) -> Self {
        Path(vec![compound_id.to_string()])
    }

    /// number of reactions
    pub fn length(&self) -> usize {
        self.0.len() / 2
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    pub fn compounds(&self) -> impl Iterator<Item = &str> {
        self.0.iter().step_by(2).map(String::as_str)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &str> {
        self.0.iter().skip(1).step_by(2).map(String::as_str)
    }

    pub fn start(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn end(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn is_simple(&self) -> bool {
        let mut seen = HashSet::new();
        self.compounds().all(|id| seen.insert(id))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items = self.0.iter();
        if let Some(first) = items.next() {
            write!(f, "{}", first)?;
        }
        while let (Some(reaction), Some(compound)) = (items.next(), items.next()) {
            write!(f, " -[{}]-> {}", reaction, compound)?;
        }
        Ok(())
    }
}

pub fn pretty_print_paths(paths: &[Path]) {
    let mut table = Table::new();
    table.add_row(row!["#", "Length", "Path"]);
    for (i, path) in paths.iter().enumerate() {
        table.add_row(row![i + 1, path.length(), path.to_string()]);
    }
    table.printstd();
}

/// One feasible hop: follow `reaction_id` to `compound_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub reaction_id: String,
    pub compound_id: String,
}

impl Step {
    pub fn new(reaction_id: &str, compound_id: &str) -> Self {
        Self {
            reaction_id: reaction_id.to_string(),
            compound_id: compound_id.to_string(),
        }
    }
}

/// Graph access used by the traversals.
pub trait NeighborSource {
    /// `false` when the compound id is unknown.
    fn resolves(&mut self, compound_id: &str) -> Result<bool, SearchError>;
    /// Feasible steps out of `compound_id`, already pruned, in a deterministic order.
    fn neighbors(&mut self, compound_id: &str) -> Result<Vec<Step>, SearchError>;
}

/// `NeighborSource` over a `CompoundStore`. Holds only what the current request has touched.
pub struct StoreGraph<'a, S: CompoundStore + ?Sized> {
    store: &'a S,
    cancel: &'a CancelToken,
    np_min: f64,
    gibbs_cap: f64,
    verbose: bool,
    // None for ids the store does not know
    compounds: HashMap<String, Option<Compound>>,
    expanded: HashMap<String, Vec<Step>>,
}

impl<'a, S: CompoundStore + ?Sized> StoreGraph<'a, S> {
    pub fn new(store: &'a S, query: &PathwayQuery, cancel: &'a CancelToken) -> Self {
        Self {
            store,
            cancel,
            np_min: query.np_min,
            gibbs_cap: query.gibbs_cap,
            verbose: query.verbose,
            compounds: HashMap::new(),
            expanded: HashMap::new(),
        }
    }

    /// number of compounds whose reactions were loaded
    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    fn compound(&mut self, compound_id: &str) -> Result<Option<&Compound>, SearchError> {
        if !self.compounds.contains_key(compound_id) {
            self.cancel.check()?;
            let found = match self.store.find_compound_by_id(compound_id) {
                Ok(compound) => Some(compound),
                Err(StoreError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            };
            self.compounds.insert(compound_id.to_string(), found);
        }
        Ok(self.compounds.get(compound_id).and_then(Option::as_ref))
    }

    fn enterable(&mut self, compound_id: &str) -> Result<bool, SearchError> {
        let np_min = self.np_min;
        Ok(match self.compound(compound_id)? {
            None => false,
            Some(compound) => !compound.novelty_score.is_some_and(|score| score < np_min),
        })
    }
}

impl<S: CompoundStore + ?Sized> NeighborSource for StoreGraph<'_, S> {
    fn resolves(&mut self, compound_id: &str) -> Result<bool, SearchError> {
        Ok(self.compound(compound_id)?.is_some())
    }

    fn neighbors(&mut self, compound_id: &str) -> Result<Vec<Step>, SearchError> {
        if let Some(steps) = self.expanded.get(compound_id) {
            return Ok(steps.clone());
        }
        self.cancel.check()?;
        let reactions = match self.store.find_reactions_incident(compound_id) {
            Ok(reactions) => reactions,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut steps = Vec::new();
        let mut seen = HashSet::new();
        for reaction in reactions.iter().filter(|r| r.has_reactant(compound_id)) {
            if reaction
                .gibbs_energy
                .is_some_and(|gibbs| gibbs > self.gibbs_cap)
            {
                debug!(
                    "reaction {} pruned: Gibbs energy above {}",
                    reaction.id, self.gibbs_cap
                );
                continue;
            }
            for product in reaction.products.iter() {
                if product == compound_id || !seen.insert((reaction.id.as_str(), product.as_str())) {
                    continue;
                }
                if !self.enterable(product)? {
                    debug!("compound {} pruned: unknown or below novelty floor", product);
                    continue;
                }
                steps.push(Step::new(&reaction.id, product));
            }
        }
        if self.verbose {
            info!(
                "expanded {}: {} incident reactions, {} feasible steps",
                compound_id,
                reactions.len(),
                steps.len()
            );
        }
        self.expanded.insert(compound_id.to_string(), steps.clone());
        Ok(steps)
    }
}

#[enum_dispatch]
pub trait PathFinder {
    fn find_paths(
        &self,
        graph: &mut dyn NeighborSource,
        start: &str,
        end: &str,
    ) -> Result<Vec<Path>, SearchError>;
}

/// Breadth-first search, returns the first path that reaches the end (at most one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortestPath {
    pub max_length: usize,
}

impl PathFinder for ShortestPath {
    fn find_paths(
        &self,
        graph: &mut dyn NeighborSource,
        start: &str,
        end: &str,
    ) -> Result<Vec<Path>, SearchError> {
        if !graph.resolves(start)? || !graph.resolves(end)? {
            return Ok(Vec::new());
        }
        if start == end {
            return Ok(vec![Path::single(start)]);
        }
        // child -> (parent, reaction)
        let mut parents: HashMap<String, (String, String)> = HashMap::new();
        let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
        let mut frontier: VecDeque<(String, usize)> = VecDeque::from([(start.to_string(), 0)]);

        while let Some((node, depth)) = frontier.pop_front() {
            if depth >= self.max_length {
                continue;
            }
            for step in graph.neighbors(&node)? {
                if !visited.insert(step.compound_id.clone()) {
                    continue;
                }
                parents.insert(step.compound_id.clone(), (node.clone(), step.reaction_id));
                if step.compound_id == end {
                    return Ok(vec![trace_back(&parents, start, end)]);
                }
                frontier.push_back((step.compound_id, depth + 1));
            }
        }
        Ok(Vec::new())
    }
}

fn trace_back(parents: &HashMap<String, (String, String)>, start: &str, end: &str) -> Path {
    let mut sequence = vec![end.to_string()];
    let mut current = end;
    while current != start {
        let Some((parent, reaction)) = parents.get(current) else {
            break;
        };
        sequence.push(reaction.clone());
        sequence.push(parent.clone());
        current = parent.as_str();
    }
    sequence.reverse();
    Path(sequence)
}

/// Depth-first enumeration of every simple path with at most `max_length` reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllPaths {
    pub max_length: usize,
}

impl AllPaths {
    fn walk(
        &self,
        graph: &mut dyn NeighborSource,
        end: &str,
        trail: &mut Vec<String>,
        on_path: &mut HashSet<String>,
        paths: &mut Vec<Path>,
    ) -> Result<(), SearchError> {
        let Some(node) = trail.last().cloned() else {
            return Ok(());
        };
        if node == end {
            paths.push(Path(trail.clone()));
            return Ok(());
        }
        if trail.len() / 2 >= self.max_length {
            return Ok(());
        }
        for step in graph.neighbors(&node)? {
            if on_path.contains(&step.compound_id) {
                continue;
            }
            on_path.insert(step.compound_id.clone());
            trail.push(step.reaction_id);
            trail.push(step.compound_id.clone());
            self.walk(graph, end, trail, on_path, paths)?;
            trail.truncate(trail.len() - 2);
            on_path.remove(&step.compound_id);
        }
        Ok(())
    }
}

impl PathFinder for AllPaths {
    fn find_paths(
        &self,
        graph: &mut dyn NeighborSource,
        start: &str,
        end: &str,
    ) -> Result<Vec<Path>, SearchError> {
        if !graph.resolves(start)? || !graph.resolves(end)? {
            return Ok(Vec::new());
        }
        let mut trail = vec![start.to_string()];
        let mut on_path = HashSet::from([start.to_string()]);
        let mut paths = Vec::new();
        self.walk(graph, end, &mut trail, &mut on_path, &mut paths)?;
        Ok(paths)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[enum_dispatch(PathFinder)]
pub enum SearchMode {
    ShortestPath(ShortestPath),
    AllPaths(AllPaths),
}

/// Runs one pathway query against `store`.
pub fn search_pathways<S>(
    store: &S,
    query: &PathwayQuery,
    cancel: &CancelToken,
) -> Result<Vec<Path>, SearchError>
where
    S: CompoundStore + ?Sized,
{
    let mut graph = StoreGraph::new(store, query, cancel);
    let paths = query
        .mode()
        .find_paths(&mut graph, &query.start, &query.end)?;
    info!(
        "pathway {} -> {} ({}, max length {}): {} path(s), {} compounds expanded",
        query.start,
        query.end,
        if query.all_paths { "all paths" } else { "shortest" },
        query.max_length,
        paths.len(),
        graph.expanded_count()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store::Reaction;
    use crate::Store::memory_store::MemoryStore;

    /// Adjacency list graph recording which nodes were expanded.
    struct MapGraph {
        edges: HashMap<String, Vec<Step>>,
        expanded: Vec<String>,
    }

    impl MapGraph {
        // (reaction, from, to)
        fn new(edges: &[(&str, &str, &str)]) -> Self {
            let mut map: HashMap<String, Vec<Step>> = HashMap::new();
            for &(reaction, from, to) in edges {
                map.entry(from.to_string()).or_default().push(Step::new(reaction, to));
                map.entry(to.to_string()).or_default();
            }
            Self {
                edges: map,
                expanded: Vec::new(),
            }
        }
    }

    impl NeighborSource for MapGraph {
        fn resolves(&mut self, compound_id: &str) -> Result<bool, SearchError> {
            Ok(self.edges.contains_key(compound_id))
        }

        fn neighbors(&mut self, compound_id: &str) -> Result<Vec<Step>, SearchError> {
            self.expanded.push(compound_id.to_string());
            Ok(self.edges.get(compound_id).cloned().unwrap_or_default())
        }
    }

    fn chain() -> MapGraph {
        MapGraph::new(&[
            ("R1", "A", "B"),
            ("R2", "B", "C"),
            ("R3", "C", "D"),
            ("R4", "D", "E"),
            ("R5", "E", "F"),
        ])
    }

    // A -> B -> D, A -> C -> D, A -> D, D -> E, C -> A, B -> C
    fn diamond() -> MapGraph {
        MapGraph::new(&[
            ("R1", "A", "B"),
            ("R2", "A", "C"),
            ("R3", "B", "D"),
            ("R4", "C", "D"),
            ("R5", "A", "D"),
            ("R6", "D", "E"),
            ("R7", "C", "A"),
            ("R8", "B", "C"),
        ])
    }

    fn shortest(max_length: usize) -> SearchMode {
        PathwayQuery::new("", "", max_length, false).mode()
    }

    fn all(max_length: usize) -> SearchMode {
        PathwayQuery::new("", "", max_length, true).mode()
    }

    #[test]
    fn test_path_accessors() {
        let path = Path(vec!["A".into(), "R1".into(), "B".into(), "R2".into(), "C".into()]);
        assert_eq!(path.length(), 2);
        assert_eq!(path.compounds().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(path.reactions().collect::<Vec<_>>(), vec!["R1", "R2"]);
        assert_eq!(path.start(), Some("A"));
        assert_eq!(path.end(), Some("C"));
        assert!(path.is_simple());
        assert_eq!(path.to_string(), "A -[R1]-> B -[R2]-> C");
        assert_eq!(Path::single("A").length(), 0);
        assert_eq!(serde_json::to_string(&path).unwrap(), r#"["A","R1","B","R2","C"]"#);
    }

    #[test]
    fn test_mode_follows_flag() {
        assert_eq!(shortest(4), SearchMode::ShortestPath(ShortestPath { max_length: 4 }));
        assert_eq!(all(2), SearchMode::AllPaths(AllPaths { max_length: 2 }));
    }

    #[test]
    fn test_bound_shorter_than_only_path() {
        assert!(shortest(3).find_paths(&mut chain(), "A", "F").unwrap().is_empty());
        assert!(all(3).find_paths(&mut chain(), "A", "F").unwrap().is_empty());

        let bfs = shortest(5).find_paths(&mut chain(), "A", "F").unwrap();
        assert_eq!(bfs.len(), 1);
        assert_eq!(bfs[0].length(), 5);
        assert_eq!(all(5).find_paths(&mut chain(), "A", "F").unwrap(), bfs);
    }

    #[test]
    fn test_bfs_stops_at_depth_bound() {
        let mut graph = chain();
        shortest(2).find_paths(&mut graph, "A", "F").unwrap();
        // nodes at depth 2 are reached but never expanded
        assert_eq!(graph.expanded, vec!["A", "B"]);
    }

    #[test]
    fn test_bfs_only_loads_reachable_frontier() {
        let mut graph = diamond();
        let paths = shortest(4).find_paths(&mut graph, "A", "D").unwrap();
        assert_eq!(paths[0].as_slice(), ["A", "R5", "D"]);
        assert_eq!(graph.expanded, vec!["A"]);
    }

    #[test]
    fn test_dfs_enumerates_simple_paths() {
        let paths = all(3).find_paths(&mut diamond(), "A", "D").unwrap();
        let mut rendered: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        rendered.sort();
        assert_eq!(
            rendered,
            vec![
                "A -[R1]-> B -[R3]-> D",
                "A -[R1]-> B -[R8]-> C -[R4]-> D",
                "A -[R2]-> C -[R4]-> D",
                "A -[R5]-> D",
            ]
        );
        assert!(paths.iter().all(|p| p.is_simple() && p.length() <= 3));
        assert!(paths.iter().all(|p| p.start() == Some("A") && p.end() == Some("D")));
    }

    #[test]
    fn test_bfs_never_longer_than_dfs() {
        let nodes = ["A", "B", "C", "D", "E"];
        for max_length in 0..4 {
            for start in nodes {
                for end in nodes {
                    let bfs = shortest(max_length)
                        .find_paths(&mut diamond(), start, end)
                        .unwrap();
                    let dfs = all(max_length).find_paths(&mut diamond(), start, end).unwrap();
                    assert_eq!(bfs.is_empty(), dfs.is_empty(), "{} -> {}", start, end);
                    if let Some(best) = dfs.iter().map(Path::length).min() {
                        assert_eq!(bfs[0].length(), best, "{} -> {}", start, end);
                    }
                    assert!(dfs.iter().all(|p| p.is_simple() && p.length() <= max_length));
                }
            }
        }
    }

    #[test]
    fn test_start_equals_end() {
        let bfs = shortest(3).find_paths(&mut diamond(), "A", "A").unwrap();
        let dfs = all(3).find_paths(&mut diamond(), "A", "A").unwrap();
        assert_eq!(bfs, vec![Path::single("A")]);
        assert_eq!(dfs, vec![Path::single("A")]);
    }

    #[test]
    fn test_unknown_endpoints_give_empty_result() {
        assert!(shortest(3).find_paths(&mut diamond(), "A", "Z").unwrap().is_empty());
        assert!(all(3).find_paths(&mut diamond(), "Z", "A").unwrap().is_empty());
    }

    fn network() -> MemoryStore {
        let compound = |id: &str, novelty: Option<f64>| Compound {
            id: id.to_string(),
            formula: "C2H6O".to_string(),
            names: vec![],
            novelty_score: novelty,
            gibbs_formation: None,
            models: vec![],
            generation: None,
            reaction_ids: vec![],
        };
        let reaction = |id: &str, reactants: &[&str], products: &[&str], gibbs: Option<f64>| Reaction {
            id: id.to_string(),
            reactants: reactants.iter().map(|s| s.to_string()).collect(),
            products: products.iter().map(|s| s.to_string()).collect(),
            gibbs_energy: gibbs,
            equation: None,
        };
        MemoryStore::new(
            vec![
                compound("S", Some(0.0)),
                compound("Hot", None),
                compound("Odd", Some(-7.5)),
                compound("Mid", Some(-1.0)),
                compound("T", None),
                compound("Far", None),
            ],
            vec![
                // direct but thermodynamically infeasible
                reaction("Rhot", &["S"], &["T"], Some(250.0)),
                // through a compound below the novelty floor
                reaction("Rodd1", &["S"], &["Odd"], Some(-10.0)),
                reaction("Rodd2", &["Odd"], &["T"], None),
                // feasible route, with a co-product that is never entered
                reaction("Rmid1", &["S"], &["Mid", "Ghost"], Some(5.0)),
                reaction("Rmid2", &["Mid", "Hot"], &["T", "Mid"], Some(99.0)),
                // only usable backwards, edges run reactant -> product
                reaction("Rback", &["T"], &["S"], None),
                reaction("Rfar", &["T"], &["Far"], None),
            ],
            vec![],
        )
    }

    #[test]
    fn test_store_graph_pruning() {
        let store = network();
        let cancel = CancelToken::new();
        let query = PathwayQuery::new("S", "T", 4, false);
        let mut graph = StoreGraph::new(&store, &query, &cancel);
        assert_eq!(graph.neighbors("S").unwrap(), vec![Step::new("Rmid1", "Mid")]);
        assert_eq!(graph.neighbors("Mid").unwrap(), vec![Step::new("Rmid2", "T")]);
        assert_eq!(graph.neighbors("T").unwrap().len(), 2);
        assert!(graph.resolves("S").unwrap());
        assert!(!graph.resolves("Ghost").unwrap());
        assert_eq!(graph.expanded_count(), 3);
    }

    #[test]
    fn test_store_search_respects_thresholds() {
        let store = network();
        let cancel = CancelToken::new();

        let strict = PathwayQuery::new("S", "T", 4, true);
        let paths = search_pathways(&store, &strict, &cancel).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].as_slice(), ["S", "Rmid1", "Mid", "Rmid2", "T"]);

        let relaxed = PathwayQuery::new("S", "T", 4, true)
            .np_min(-10.0)
            .gibbs_cap(300.0);
        let mut rendered: Vec<String> = search_pathways(&store, &relaxed, &cancel)
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect();
        rendered.sort();
        assert_eq!(
            rendered,
            vec![
                "S -[Rhot]-> T",
                "S -[Rmid1]-> Mid -[Rmid2]-> T",
                "S -[Rodd1]-> Odd -[Rodd2]-> T",
            ]
        );

        let verbose = search_pathways(&store, &relaxed.clone().verbose(true), &cancel).unwrap();
        assert_eq!(verbose.len(), 3);
        let shortest = PathwayQuery {
            all_paths: false,
            ..relaxed
        };
        let paths = search_pathways(&store, &shortest, &cancel).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].as_slice(), ["S", "Rhot", "T"]);
    }

    #[test]
    fn test_store_search_direction_and_unknown_ids() {
        let store = network();
        let cancel = CancelToken::new();
        let reverse = PathwayQuery::new("Far", "S", 5, false);
        assert!(search_pathways(&store, &reverse, &cancel).unwrap().is_empty());
        let typo = PathwayQuery::new("S", "Tt", 5, true);
        assert!(search_pathways(&store, &typo, &cancel).unwrap().is_empty());
    }

    #[test]
    fn test_store_search_cancel() {
        let store = network();
        let cancel = CancelToken::new();
        cancel.cancel();
        let query = PathwayQuery::new("S", "T", 4, false);
        assert!(matches!(
            search_pathways(&store, &query, &cancel),
            Err(SearchError::Canceled)
        ));
    }
}
