use std::collections::HashSet;

use crate::models::{ActionRecord, BlockRecord};
use crate::services::{ActionRepository, BlockRepository, GatewayError};

/// Computes the set of user ids that must never be surfaced to a requester.
///
/// Block and action state changes too frequently to cache across requests,
/// so the set is recomputed fresh on every call.
pub struct ExclusionSetResolver<'a, A, B> {
    actions: &'a A,
    blocks: &'a B,
}

impl<'a, A, B> ExclusionSetResolver<'a, A, B>
where
    A: ActionRepository,
    B: BlockRepository,
{
    pub fn new(actions: &'a A, blocks: &'a B) -> Self {
        Self { actions, blocks }
    }

    /// Resolve the full exclusion set for `user_id`.
    ///
    /// Issues the three underlying reads concurrently and unions them. Any
    /// read failing fails the whole resolution: an incomplete exclusion set
    /// is a safety risk, not a degradation.
    pub async fn resolve(&self, user_id: &str) -> Result<HashSet<String>, GatewayError> {
        let (actions_from, actions_to, blocks) = tokio::try_join!(
            self.actions.load_actions_from(user_id),
            self.actions.load_actions_to(user_id),
            self.blocks.load_blocks_involving(user_id),
        )?;

        Ok(exclusion_union(user_id, &actions_from, &actions_to, &blocks))
    }
}

/// Pure union of the four exclusion sources:
/// the requester itself, blocks in either direction, every non-unmatched
/// action the requester has taken, and mutual matches.
pub fn exclusion_union(
    user_id: &str,
    actions_from: &[ActionRecord],
    actions_to: &[ActionRecord],
    blocks: &[BlockRecord],
) -> HashSet<String> {
    let mut excluded = HashSet::new();
    excluded.insert(user_id.to_string());

    for block in blocks {
        // Symmetric: either direction suppresses visibility both ways.
        if block.blocker_id == user_id {
            excluded.insert(block.blocked_id.clone());
        } else if block.blocked_id == user_id {
            excluded.insert(block.blocker_id.clone());
        }
    }

    for action in actions_from {
        if action.actor_id == user_id && !action.is_unmatched {
            excluded.insert(action.target_id.clone());
        }
    }

    // Mutual matches: a non-unmatched like in both directions. Already
    // covered by the outgoing-action pass above, kept explicit so an
    // inconsistent upstream (missing outgoing record) still excludes the
    // matched pair.
    let liked_by: HashSet<&str> = actions_to
        .iter()
        .filter(|a| a.target_id == user_id && a.is_like() && !a.is_unmatched)
        .map(|a| a.actor_id.as_str())
        .collect();

    for action in actions_from {
        if action.actor_id == user_id
            && action.is_like()
            && !action.is_unmatched
            && liked_by.contains(action.target_id.as_str())
        {
            excluded.insert(action.target_id.clone());
        }
    }

    excluded
}
