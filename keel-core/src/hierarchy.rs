//! Cycle prevention for self-referencing tables
//!
//! `ProductCategories.ParentCategoryId` and `ProjectTasks.ParentTaskId` form
//! trees; `SchedulerBookings.RescheduledFromBookingId/RescheduledToBookingId`
//! form doubly linked chains. Foreign keys only guarantee that a referenced
//! row exists, so shape checks happen here before a link is written.

use std::collections::{HashMap, HashSet};

use crate::error::HierarchyError;

/// Default depth limit for parent chains
pub const MAX_DEPTH: usize = 32;

/// Parent link of every node in one tree: `id -> parent id`
pub type ParentLinks = HashMap<i32, Option<i32>>;

/// Check that pointing `node` at `new_parent` keeps the links a forest.
///
/// `links` holds the current state; the node's own previous parent is
/// irrelevant because it is being replaced. The depth counted against
/// `max_depth` covers the new ancestors, the node itself and the deepest
/// level of the subtree moving with it.
pub fn validate_parent(
    node: i32,
    new_parent: Option<i32>,
    links: &ParentLinks,
    max_depth: usize,
) -> Result<(), HierarchyError> {
    let Some(parent) = new_parent else {
        return Ok(());
    };

    if parent == node {
        return Err(HierarchyError::SelfParent(node));
    }

    let mut visited = HashSet::new();
    let mut current = Some(parent);
    let mut ancestors = 0;

    while let Some(ancestor) = current {
        if ancestor == node || !visited.insert(ancestor) {
            return Err(HierarchyError::Cycle { node, parent });
        }

        ancestors += 1;
        if ancestors >= max_depth {
            return Err(HierarchyError::TooDeep {
                depth: ancestors + 1,
                limit: max_depth,
            });
        }

        current = match links.get(&ancestor) {
            Some(next) => *next,
            None => return Err(HierarchyError::MissingParent(ancestor)),
        };
    }

    let depth = ancestors + 1 + subtree_height(node, links);
    if depth > max_depth {
        return Err(HierarchyError::TooDeep {
            depth,
            limit: max_depth,
        });
    }

    Ok(())
}

/// Levels below `node`; zero for a leaf
fn subtree_height(node: i32, links: &ParentLinks) -> usize {
    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    for (&id, parent) in links {
        if let Some(parent) = parent {
            children.entry(*parent).or_default().push(id);
        }
    }

    let mut seen = HashSet::from([node]);
    let mut level = vec![node];
    let mut height = 0;
    loop {
        let next: Vec<i32> = level
            .iter()
            .filter_map(|id| children.get(id))
            .flatten()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if next.is_empty() {
            return height;
        }
        height += 1;
        level = next;
    }
}

/// One node of a reschedule chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub id: i32,
    pub from: Option<i32>,
    pub to: Option<i32>,
}

/// Check that `from`/`to` links mirror each other and never loop.
pub fn validate_chain(links: &[ChainLink]) -> Result<(), HierarchyError> {
    let by_id: HashMap<i32, &ChainLink> = links.iter().map(|link| (link.id, link)).collect();

    for link in links {
        if let Some(to) = link.to {
            if to == link.id {
                return Err(HierarchyError::SelfParent(link.id));
            }
            match by_id.get(&to) {
                Some(next) if next.from == Some(link.id) => {}
                _ => return Err(HierarchyError::BrokenLink { from: link.id, to }),
            }
        }
        if let Some(from) = link.from {
            if from == link.id {
                return Err(HierarchyError::SelfParent(link.id));
            }
            match by_id.get(&from) {
                Some(prev) if prev.to == Some(link.id) => {}
                _ => return Err(HierarchyError::BrokenLink { from, to: link.id }),
            }
        }
    }

    // Mirrored links can still close a loop; walk forward from every node.
    for link in links {
        let mut visited = HashSet::new();
        let mut current = Some(link.id);
        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(HierarchyError::Cycle {
                    node: link.id,
                    parent: id,
                });
            }
            current = by_id.get(&id).and_then(|l| l.to);
        }
    }

    Ok(())
}
