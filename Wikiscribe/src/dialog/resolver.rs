//! Dialogue graph resolver
//!
//! Walks the successor links from a root node and folds the graph into a
//! [`ResolvedBranch`] tree:
//!
//! - a single successor continues the current branch
//! - several successors open one child branch per option
//! - when every option reaches the same non-player node, the options are cut
//!   just before it and the walk resumes there (rejoin)
//! - a node seen earlier on the same path ends the branch as a cycle terminator
//!
//! The seen set is owned by each call frame and cloned into every child, so a
//! revisit in one option never hides a node from its siblings.

use std::collections::HashSet;

use futures_util::future::{BoxFuture, FutureExt, try_join_all};

use super::store::DialogueStore;
use super::types::{DialogueNode, NodeId, ResolvedBranch, ResolvedNode};
use crate::error::{Error, Result};

/// Ids visited along the current path
pub type SeenSet = HashSet<NodeId>;

/// Default limit on nested divergence points
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// Maximum nesting of divergence points before giving up
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Resolves dialogue graphs from a [`DialogueStore`]
pub struct DialogueResolver<'a, S: DialogueStore + ?Sized> {
    store: &'a S,
    options: ResolverOptions,
}

impl<'a, S: DialogueStore + ?Sized> DialogueResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: ResolverOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve the branch starting at `start_id`.
    ///
    /// An unknown root yields an empty branch. Store errors propagate.
    pub async fn resolve(&self, start_id: NodeId, seen_along_path: &SeenSet) -> Result<ResolvedBranch> {
        let Some(start) = self.store.lookup_node(start_id).await? else {
            tracing::debug!("Dialogue root {} not found", start_id);
            return Ok(ResolvedBranch::default());
        };
        self.resolve_from(start, seen_along_path.clone(), 0).await
    }

    fn resolve_from<'s>(
        &'s self,
        start: DialogueNode,
        mut seen: SeenSet,
        depth: usize,
    ) -> BoxFuture<'s, Result<ResolvedBranch>> {
        async move {
            tracing::debug!("Resolving dialogue branch from {} (depth {})", start.id, depth);

            let mut out: Vec<ResolvedNode> = Vec::new();
            let mut current = Some(start);

            while let Some(node) = current.take() {
                if seen.contains(&node.id) {
                    tracing::debug!("Dialogue {} closes a cycle", node.id);
                    out.push(ResolvedNode::cycle_terminator(node));
                    break;
                }
                seen.insert(node.id);

                let emitted = node.has_text();
                if emitted {
                    out.push(ResolvedNode::new(node.clone()));
                }

                let mut successors = self.store.lookup_nodes_bulk(&node.successor_ids).await?;
                successors.retain(DialogueNode::has_text);

                if successors.len() <= 1 {
                    current = successors.pop();
                    continue;
                }

                if depth >= self.options.max_depth {
                    return Err(Error::DepthLimitExceeded {
                        depth: self.options.max_depth,
                    });
                }

                // Siblings each get their own copy of the path
                let mut candidates = try_join_all(
                    successors
                        .into_iter()
                        .map(|next| self.resolve_from(next, seen.clone(), depth + 1)),
                )
                .await?;

                let rejoin = find_rejoin(&candidates).cloned();
                if let Some(ref rejoin) = rejoin {
                    tracing::debug!(
                        "Dialogue {}: {} options rejoin at {}",
                        node.id,
                        candidates.len(),
                        rejoin.id
                    );
                    for candidate in &mut candidates {
                        candidate.truncate_before(rejoin.id);
                    }
                }

                attach_branches(&mut out, node, emitted, candidates);
                current = rejoin;
            }

            Ok(ResolvedBranch::new(out))
        }
        .boxed()
    }
}

/// Hang `branches` off the node that diverged.
///
/// A divergence node without text isn't in `out`, so it is added as a silent
/// carrier to keep its options.
fn attach_branches(out: &mut Vec<ResolvedNode>, node: DialogueNode, emitted: bool, branches: Vec<ResolvedBranch>) {
    match out.last_mut() {
        Some(last) if emitted => last.branches = branches,
        _ => out.push(ResolvedNode {
            node,
            is_cycle_terminator: false,
            branches,
        }),
    }
}

/// Pick the node every candidate branch reaches.
///
/// Player nodes never qualify. Among the common nodes the one with the smallest
/// summed first-occurrence index wins (nearest to the divergence); ties go to
/// the earlier node in the first candidate.
pub fn find_rejoin(candidates: &[ResolvedBranch]) -> Option<&DialogueNode> {
    let (first, rest) = candidates.split_first()?;
    let mut best: Option<(usize, &DialogueNode)> = None;

    for (pos, resolved) in first.nodes.iter().enumerate() {
        let id = resolved.id();
        if resolved.node.speaker_role.is_player() || first.position(id) != Some(pos) {
            continue;
        }

        let mut total = pos;
        let mut in_all = true;
        for other in rest {
            if let Some(other_pos) = other.position(id) {
                total += other_pos;
            } else {
                in_all = false;
                break;
            }
        }

        if in_all && best.is_none_or(|(best_total, _)| total < best_total) {
            best = Some((total, &resolved.node));
        }
    }

    best.map(|(_, node)| node)
}
