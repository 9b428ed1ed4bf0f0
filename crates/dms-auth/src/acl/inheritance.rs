//! Folder permission inheritance.
//!
//! Inheritance rules:
//! - The entries of the nearest folder on the ancestor-or-self chain that
//!   has any entry decide. A folder's own entries override inherited ones.
//! - A principal is granted when it is listed as a user or holds a listed role.
//! - A chain without any entry is open to everyone holding the project
//!   capability that led here.

use std::collections::{HashMap, HashSet};

use sqlx::SqliteConnection;
use tracing::debug;

use dms_core::result::AppResult;
use dms_core::types::{FolderId, RoleId, UserId};
use dms_database::repositories::{FolderPermissionRepository, FolderRepository};
use dms_entity::folder::Folder;
use dms_entity::permission::{FolderPermission, PrincipalRef};

use crate::rbac::ProjectAccess;

#[derive(Debug, Clone, Copy)]
struct Node {
    parent_id: Option<FolderId>,
    deleted: bool,
}

/// Evaluates folder permissions of one principal over one project.
///
/// Built once per request from a snapshot of the project's folders and
/// permission entries; results are memoised per folder.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    user_id: Option<UserId>,
    role_ids: HashSet<RoleId>,
    bypass: bool,
    nodes: HashMap<FolderId, Node>,
    entries: HashMap<FolderId, Vec<PrincipalRef>>,
    granted: HashMap<FolderId, bool>,
}

impl PermissionEvaluator {
    /// Create an evaluator from loaded rows.
    pub fn new(access: &ProjectAccess, folders: &[Folder], permissions: &[FolderPermission]) -> Self {
        let nodes = folders
            .iter()
            .map(|f| {
                (
                    f.id,
                    Node {
                        parent_id: f.parent_id,
                        deleted: f.is_deleted(),
                    },
                )
            })
            .collect();

        let mut entries: HashMap<FolderId, Vec<PrincipalRef>> = HashMap::new();
        for permission in permissions {
            entries
                .entry(permission.folder_id)
                .or_default()
                .push(permission.principal());
        }

        Self {
            user_id: access.principal().user_id(),
            role_ids: access.role_ids().into_iter().collect(),
            bypass: access.bypasses_folder_permissions(),
            nodes,
            entries,
            granted: HashMap::new(),
        }
    }

    /// Load the project's folders and entries and build an evaluator.
    pub async fn load(conn: &mut SqliteConnection, access: &ProjectAccess) -> AppResult<Self> {
        let folders = FolderRepository::list_by_project(conn, access.project_id()).await?;
        let permissions =
            FolderPermissionRepository::list_for_project(conn, access.project_id()).await?;
        debug!(
            project_id = %access.project_id(),
            folders = folders.len(),
            entries = permissions.len(),
            "Loaded folder permission snapshot"
        );
        Ok(Self::new(access, &folders, &permissions))
    }

    /// Walk the ancestor-or-self chain, nearest first.
    ///
    /// The walk stops after as many hops as there are folders, so a
    /// corrupted parent chain cannot loop.
    fn chain(&self, folder_id: FolderId) -> impl Iterator<Item = FolderId> + '_ {
        let limit = self.nodes.len() + 1;
        std::iter::successors(Some(folder_id), move |id| {
            self.nodes.get(id).and_then(|n| n.parent_id)
        })
        .take(limit)
    }

    /// The folder whose entries decide for `folder_id`, if any.
    pub fn effective_source(&self, folder_id: FolderId) -> Option<FolderId> {
        self.chain(folder_id)
            .find(|id| self.entries.get(id).is_some_and(|e| !e.is_empty()))
    }

    /// Entries attached directly to a folder.
    pub fn entries_of(&self, folder_id: FolderId) -> &[PrincipalRef] {
        self.entries.get(&folder_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the folder's effective permission admits the principal.
    pub fn permits(&mut self, folder_id: FolderId) -> bool {
        if self.bypass {
            return true;
        }
        if let Some(granted) = self.granted.get(&folder_id) {
            return *granted;
        }

        let granted = match self.effective_source(folder_id) {
            None => true,
            Some(source) => self.entries_of(source).iter().any(|entry| match entry {
                PrincipalRef::User(id) => Some(*id) == self.user_id,
                PrincipalRef::Role(id) => self.role_ids.contains(id),
            }),
        };
        self.granted.insert(folder_id, granted);
        granted
    }

    /// Whether the folder or any of its ancestors is deleted.
    pub fn in_trash(&self, folder_id: FolderId) -> bool {
        self.chain(folder_id)
            .any(|id| self.nodes.get(&id).is_some_and(|n| n.deleted))
    }

    /// Whether the folder is listed for the principal: live and permitted.
    pub fn is_visible(&mut self, folder_id: FolderId) -> bool {
        !self.in_trash(folder_id) && self.permits(folder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dms_core::types::{FolderPermissionId, ProjectId};
    use dms_entity::permission::PrincipalType;
    use dms_entity::project::Project;
    use dms_entity::status::EntryStatus;
    use dms_entity::user::Role;

    use crate::principal::Principal;

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

    fn folder(project: &Project, parent: Option<&Folder>, status: EntryStatus) -> Folder {
        Folder {
            id: FolderId::new(),
            project_id: project.id,
            parent_id: parent.map(|p| p.id),
            title: "f".to_string(),
            description: String::new(),
            position: 0,
            status,
            deleted_by: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(folder: &Folder, principal: PrincipalRef) -> FolderPermission {
        let (principal_type, principal_id) = principal.into_parts();
        FolderPermission {
            id: FolderPermissionId::new(),
            folder_id: folder.id,
            principal_type,
            principal_id,
        }
    }

    #[test]
    fn test_open_without_entries() {
        let p = project();
        let root = folder(&p, None, EntryStatus::Active);
        let child = folder(&p, Some(&root), EntryStatus::Active);
        let access = ProjectAccess::new(&p, Principal::Anonymous, vec![]);
        let mut eval = PermissionEvaluator::new(&access, &[root.clone(), child.clone()], &[]);
        assert!(eval.permits(child.id));
        assert_eq!(eval.effective_source(child.id), None);
    }

    #[test]
    fn test_nearest_entries_decide() {
        let p = project();
        let user = UserId::new();
        let other = UserId::new();
        let root = folder(&p, None, EntryStatus::Active);
        let child = folder(&p, Some(&root), EntryStatus::Active);
        let grandchild = folder(&p, Some(&child), EntryStatus::Active);
        let entries = vec![
            entry(&root, PrincipalRef::User(user)),
            entry(&child, PrincipalRef::User(other)),
        ];
        let access = ProjectAccess::new(&p, Principal::User { id: user, admin: false }, vec![]);
        let folders = [root.clone(), child.clone(), grandchild.clone()];
        let mut eval = PermissionEvaluator::new(&access, &folders, &entries);

        assert!(eval.permits(root.id));
        assert!(!eval.permits(child.id));
        assert_eq!(eval.effective_source(grandchild.id), Some(child.id));
        assert!(!eval.permits(grandchild.id));
        assert_eq!(entries[0].principal_type, PrincipalType::User);
    }

    #[test]
    fn test_role_entry_and_admin() {
        let p = project();
        let role = Role {
            id: RoleId::new(),
            name: "Manager".to_string(),
            position: 1,
            capabilities: vec![],
        };
        let root = folder(&p, None, EntryStatus::Active);
        let entries = vec![entry(&root, PrincipalRef::Role(role.id))];

        let member = Principal::User { id: UserId::new(), admin: false };
        let access = ProjectAccess::new(&p, member, vec![role]);
        let mut eval = PermissionEvaluator::new(&access, &[root.clone()], &entries);
        assert!(eval.permits(root.id));

        let stranger = ProjectAccess::new(&p, Principal::User { id: UserId::new(), admin: false }, vec![]);
        let mut eval = PermissionEvaluator::new(&stranger, &[root.clone()], &entries);
        assert!(!eval.permits(root.id));

        let admin = ProjectAccess::new(&p, Principal::User { id: UserId::new(), admin: true }, vec![]);
        let mut eval = PermissionEvaluator::new(&admin, &[root.clone()], &entries);
        assert!(eval.permits(root.id));
    }

    #[test]
    fn test_deleted_ancestor_hides() {
        let p = project();
        let root = folder(&p, None, EntryStatus::Deleted);
        let child = folder(&p, Some(&root), EntryStatus::Active);
        let access = ProjectAccess::new(&p, Principal::System, vec![]);
        let mut eval = PermissionEvaluator::new(&access, &[root.clone(), child.clone()], &[]);
        assert!(eval.in_trash(child.id));
        assert!(!eval.is_visible(child.id));
    }

    #[test]
    fn test_cyclic_chain_terminates() {
        let p = project();
        let mut a = folder(&p, None, EntryStatus::Active);
        let b = folder(&p, Some(&a), EntryStatus::Active);
        a.parent_id = Some(b.id);
        let access = ProjectAccess::new(&p, Principal::Anonymous, vec![]);
        let mut eval = PermissionEvaluator::new(&access, &[a.clone(), b], &[]);
        assert!(eval.permits(a.id));
        assert!(!eval.in_trash(a.id));
    }
}
