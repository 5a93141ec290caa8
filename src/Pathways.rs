/// eng
/// Pathway search over the compound-reaction network: nodes are compound ids, every reaction links each
/// of its reactants to each of its products. The graph is never materialized, only the part reachable from
/// the start compound is pulled from the store while the search expands it. Reactions above the Gibbs
/// energy ceiling and compounds below the novelty floor are pruned at expansion time.
/// Two modes:
/// 1) shortest path (breadth-first), returns at most one path
/// 2) all simple paths up to the length bound (depth-first)
/// ----------------------------------------------------------------
/// # Examples
/// ```
/// use MineSearch::Pathways::pathway_search::{PathwayQuery, search_pathways};
/// use MineSearch::Store::memory_store::MemoryStore;
/// use MineSearch::cancel::CancelToken;
/// let store = MemoryStore::from_json_str(r#"{
///     "compounds": [{"id": "A", "formula": "C2H6O"}, {"id": "B", "formula": "C2H4O"}],
///     "reactions": [{"id": "R1", "reactants": ["A"], "products": ["B"]}]
/// }"#).unwrap();
/// let query = PathwayQuery::new("A", "B", 3, false);
/// let paths = search_pathways(&store, &query, &CancelToken::new()).unwrap();
/// assert_eq!(paths[0].as_slice(), ["A", "R1", "B"]);
/// assert_eq!(paths[0].length(), 1);
/// ```
pub mod pathway_search;
