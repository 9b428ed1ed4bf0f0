//! Folder tree projection for menus and folder pickers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use dms_auth::PermissionEvaluator;
use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, ProjectId};
use dms_database::DatabasePool;
use dms_database::repositories::FolderRepository;
use dms_entity::folder::{Folder, FolderTree, TreeEntry};
use dms_entity::user::Capability;

use crate::context::RequestContext;
use crate::scope::Scope;

/// Builds indented folder trees. Read-only.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Database pool.
    db: Arc<DatabasePool>,
    /// Title of the entry standing for the project root.
    root_label: String,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(db: Arc<DatabasePool>, root_label: impl Into<String>) -> Self {
        Self {
            db,
            root_label: root_label.into(),
        }
    }

    /// The visible hierarchy of a project below a root entry with no folder.
    pub async fn directory_tree(&self, ctx: &RequestContext, project_id: ProjectId) -> AppResult<FolderTree> {
        let mut conn = self.db.acquire().await?;
        let mut scope = Scope::load(&mut conn, ctx, project_id).await?;

        let mut tree = FolderTree::empty();
        tree.entries.push(TreeEntry {
            depth: 0,
            folder_id: None,
            title: self.root_label.clone(),
        });

        if !scope.allowed_to(Capability::ViewDmsfFolders) {
            return Ok(tree);
        }

        let folders = FolderRepository::list_by_project(&mut conn, project_id).await?;
        let children = children_map(&folders);
        walk(&children, &mut scope.acl, None, 1, &mut tree);

        debug!(project_id = %project_id, rows = tree.len(), "Built directory tree");
        Ok(tree)
    }

    /// The visible hierarchy below one folder, the folder itself first.
    pub async fn folder_tree(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<FolderTree> {
        let mut conn = self.db.acquire().await?;
        let folder = FolderRepository::get(&mut conn, folder_id).await?;
        let mut scope = Scope::load(&mut conn, ctx, folder.project_id).await?;
        scope.require(Capability::ViewDmsfFolders)?;
        if scope.acl.in_trash(folder_id) {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        scope.require_permitted(folder_id)?;

        let mut tree = FolderTree::empty();
        tree.entries.push(TreeEntry {
            depth: 0,
            folder_id: Some(folder.id),
            title: folder.title.clone(),
        });

        let folders = FolderRepository::subtree(&mut conn, folder_id).await?;
        let children = children_map(&folders);
        walk(&children, &mut scope.acl, Some(folder_id), 1, &mut tree);
        Ok(tree)
    }
}

/// Children per parent, sorted by position then title.
fn children_map(folders: &[Folder]) -> HashMap<Option<FolderId>, Vec<&Folder>> {
    let mut map: HashMap<Option<FolderId>, Vec<&Folder>> = HashMap::new();
    for folder in folders {
        map.entry(folder.parent_id).or_default().push(folder);
    }
    for siblings in map.values_mut() {
        siblings.sort_by_key(|f| f.sort_key());
    }
    map
}

/// Depth-first walk below `start`. A hidden folder hides its subtree.
fn walk(
    children: &HashMap<Option<FolderId>, Vec<&Folder>>,
    acl: &mut PermissionEvaluator,
    start: Option<FolderId>,
    depth: usize,
    tree: &mut FolderTree,
) {
    let mut stack: Vec<(&Folder, usize)> = Vec::new();
    let mut emitted: HashSet<FolderId> = tree.entries.iter().filter_map(|e| e.folder_id).collect();
    push_children(children, start, depth, &mut stack);

    while let Some((folder, depth)) = stack.pop() {
        if folder.is_deleted() || !acl.permits(folder.id) {
            continue;
        }
        // Parent chains are acyclic, but a corrupted one must not spin forever.
        if !emitted.insert(folder.id) {
            continue;
        }
        tree.entries.push(TreeEntry {
            depth,
            folder_id: Some(folder.id),
            title: folder.title.clone(),
        });
        push_children(children, Some(folder.id), depth + 1, &mut stack);
    }
}

fn push_children<'a>(
    children: &HashMap<Option<FolderId>, Vec<&'a Folder>>,
    parent: Option<FolderId>,
    depth: usize,
    stack: &mut Vec<(&'a Folder, usize)>,
) {
    if let Some(siblings) = children.get(&parent) {
        // Reversed so the first sibling is popped first.
        stack.extend(siblings.iter().rev().map(|f| (*f, depth)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dms_auth::{Principal, ProjectAccess};
    use dms_entity::project::Project;
    use dms_entity::status::EntryStatus;

    fn project() -> Project {
        Project {
            id: ProjectId::new(),
            identifier: "p".to_string(),
            name: "P".to_string(),
            dms_enabled: true,
            non_member_role_id: None,
            anonymous_role_id: None,
            created_at: Utc::now(),
        }
    }

    fn folder(project: &Project, id: FolderId, parent_id: Option<FolderId>, title: &str) -> Folder {
        Folder {
            id,
            project_id: project.id,
            parent_id,
            title: title.to_string(),
            description: String::new(),
            position: 0,
            status: EntryStatus::Active,
            deleted_by: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn evaluator(project: &Project, folders: &[Folder]) -> PermissionEvaluator {
        let access = ProjectAccess::new(project, Principal::System, Vec::new());
        PermissionEvaluator::new(&access, folders, &[])
    }

    #[test]
    fn test_walk_orders_siblings_depth_first() {
        let p = project();
        let (a, b, c) = (FolderId::new(), FolderId::new(), FolderId::new());
        let folders = vec![
            folder(&p, b, None, "beta"),
            folder(&p, c, Some(a), "child"),
            folder(&p, a, None, "alpha"),
        ];
        let mut acl = evaluator(&p, &folders);

        let mut tree = FolderTree::empty();
        walk(&children_map(&folders), &mut acl, None, 1, &mut tree);

        let titles: Vec<_> = tree.entries.iter().map(|e| (e.depth, e.title.as_str())).collect();
        assert_eq!(titles, vec![(1, "alpha"), (2, "child"), (1, "beta")]);
    }

    #[test]
    fn test_walk_stops_on_corrupted_parent_cycle() {
        let p = project();
        let (top, child) = (FolderId::new(), FolderId::new());
        let folders = vec![
            folder(&p, top, Some(child), "top"),
            folder(&p, child, Some(top), "child"),
        ];
        let mut acl = evaluator(&p, &folders);

        let mut tree = FolderTree::empty();
        tree.entries.push(TreeEntry {
            depth: 0,
            folder_id: Some(top),
            title: "top".to_string(),
        });
        walk(&children_map(&folders), &mut acl, Some(top), 1, &mut tree);

        let ids: Vec<_> = tree.entries.iter().filter_map(|e| e.folder_id).collect();
        assert_eq!(ids, vec![top, child]);
    }
}
