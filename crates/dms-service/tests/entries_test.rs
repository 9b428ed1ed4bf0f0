//! Integration tests for bulk entry operations, the trash bin, folder
//! permission management and e-mail drafts.

mod helpers;

use dms_core::error::ErrorKind;
use dms_core::types::UserId;
use dms_entity::permission::PrincipalRef;
use dms_service::EntryRef;
use dms_service::link::{CreateLinkRequest, LinkTarget};

use helpers::{REPORT, TestApp};

#[tokio::test]
async fn test_trash_lists_deleted_entries() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);

    app.folders.delete(&ctx, app.f6, false).await.unwrap();
    app.files.delete(&ctx, app.file.id, false).await.unwrap();

    let trash = app.trash.trash(&ctx, app.project1).await.unwrap();
    let mut folder_titles: Vec<_> = trash.folders.iter().map(|f| f.title.as_str()).collect();
    folder_titles.sort_unstable();

    assert_eq!(folder_titles, vec!["folder4", "folder6"]);
    assert_eq!(trash.files.len(), 1);
    assert_eq!(trash.files[0].id, app.file.id);
    assert!(trash.links.is_empty());
    assert_eq!(trash.len(), 3);
}

#[tokio::test]
async fn test_trash_requires_delete_capability() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.developer);

    let err = app.trash.trash(&ctx, app.project1).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_delete_entries_reports_failures_per_entry() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);

    let refs = [
        EntryRef::Folder(app.f6),
        EntryRef::File(app.file.id),
        EntryRef::FolderLink(app.link.id),
        EntryRef::Folder(app.f1),
        EntryRef::FileLink(app.link.id),
    ];
    let outcome = app
        .entries
        .delete_entries(&ctx, app.project1, &refs, false)
        .await
        .unwrap();

    assert_eq!(outcome.applied, refs[..3].to_vec());
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].entry, EntryRef::Folder(app.f1));
    assert_eq!(outcome.failures[0].message, "Folder is not empty");
    assert_eq!(outcome.failures[1].kind, ErrorKind::Validation);
    assert!(!outcome.is_success());

    let trash = app.trash.trash(&ctx, app.project1).await.unwrap();
    assert_eq!(trash.len(), 4);
}

#[tokio::test]
async fn test_restore_entries_brings_entries_back() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);
    let refs = [
        EntryRef::Folder(app.f6),
        EntryRef::File(app.file.id),
        EntryRef::FolderLink(app.link.id),
    ];
    app.entries
        .delete_entries(&ctx, app.project1, &refs, false)
        .await
        .unwrap();

    let outcome = app
        .entries
        .restore_entries(&ctx, app.project1, &refs)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.applied.len(), 3);
    let trash = app.trash.trash(&ctx, app.project1).await.unwrap();
    assert_eq!(trash.len(), 1);
}

#[tokio::test]
async fn test_commit_entries_purges() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);

    let outcome = app
        .entries
        .delete_entries(&ctx, app.project1, &[EntryRef::Folder(app.f4)], true)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(app.folder_count(app.project1).await, 5);
}

#[tokio::test]
async fn test_delete_entries_without_capability_rejects_request() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.developer);

    let err = app
        .entries
        .delete_entries(&ctx, app.project1, &[EntryRef::Folder(app.f6)], false)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(app.folder_count(app.project1).await, 7);
}

#[tokio::test]
async fn test_entries_from_other_project_rejected() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);

    let outcome = app
        .entries
        .delete_entries(&ctx, app.project2, &[EntryRef::Folder(app.f6)], false)
        .await
        .unwrap();

    assert!(outcome.applied.is_empty());
    assert_eq!(outcome.failures[0].kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_entry_refs_parse_from_form_values() {
    let app = TestApp::new().await;

    let folder: EntryRef = format!("folder-{}", app.f1).parse().unwrap();
    let link: EntryRef = format!("folder-link-{}", app.link.id).parse().unwrap();

    assert_eq!(folder, EntryRef::Folder(app.f1));
    assert_eq!(link, EntryRef::FolderLink(app.link.id));
    assert!("folder-nope".parse::<EntryRef>().is_err());
}

#[tokio::test]
async fn test_permission_queries() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);

    assert!(
        app.permissions
            .permission_for_role(&ctx, app.f7, app.manager_role.id)
            .await
            .unwrap()
    );
    assert!(
        !app.permissions
            .permission_for_role(&ctx, app.f7, app.developer_role.id)
            .await
            .unwrap()
    );

    let users = app.permissions.permissions_users(&ctx, app.f7).await.unwrap();
    let logins: Vec<_> = users.iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["dlopper"]);
}

#[tokio::test]
async fn test_grant_requires_existing_principal_and_capability() {
    let app = TestApp::new().await;
    let manager = app.as_user(&app.manager);
    let developer = app.as_user(&app.developer);

    let err = app
        .permissions
        .grant(&developer, app.f6, PrincipalRef::Role(app.developer_role.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = app
        .permissions
        .grant(&manager, app.f6, PrincipalRef::User(UserId::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    app.permissions
        .grant(&manager, app.f6, PrincipalRef::Role(app.manager_role.id))
        .await
        .unwrap();
    let visible = app.folders.visible(&developer, app.project1).await.unwrap();
    assert!(!visible.iter().any(|f| f.id == app.f6));
}

#[tokio::test]
async fn test_email_draft_expands_folders() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);

    let draft = app
        .email
        .email_draft(&ctx, app.project1, &[EntryRef::Folder(app.f1)])
        .await
        .unwrap();

    assert_eq!(draft.from.as_deref(), Some("jsmith@example.org"));
    assert_eq!(draft.reply_to.as_deref(), Some("docs@example.org"));
    assert!(!draft.links_only);
    assert_eq!(draft.files.len(), 1);
    assert_eq!(draft.files[0].file_id, app.file.id);
    assert_eq!(draft.files[0].revision_id, app.revision.id);
    assert_eq!(draft.total_size(), REPORT.len() as i64);
}

#[tokio::test]
async fn test_email_draft_resolves_links_once() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.manager);
    let file_link = app
        .links
        .create_link(
            &ctx,
            CreateLinkRequest {
                project_id: app.project1,
                folder_id: Some(app.f6),
                name: None,
                target: LinkTarget::File(app.file.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(file_link.name, "report.txt");

    let draft = app
        .email
        .email_draft(
            &ctx,
            app.project1,
            &[
                EntryRef::FileLink(file_link.id),
                EntryRef::File(app.file.id),
                EntryRef::FolderLink(app.link.id),
            ],
        )
        .await
        .unwrap();

    assert_eq!(draft.files.len(), 1);
}

#[tokio::test]
async fn test_email_draft_requires_email_capability() {
    let app = TestApp::new().await;
    let ctx = app.as_user(&app.developer);

    let err = app
        .email
        .email_draft(&ctx, app.project1, &[EntryRef::File(app.file.id)])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authorization);
}
