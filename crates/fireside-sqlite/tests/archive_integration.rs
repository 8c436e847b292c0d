//! Archive service running on a real SQLite file

use fireside_core::{
    Archive, Deepening, Fireside, FiresideFamily, Outline, OutlineItemKind, Snippet, TagRequest,
    Visibility,
};
use fireside_sqlite::{SqliteBackend, SqliteConfig};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Archive<SqliteBackend> {
    let config = SqliteConfig::new(dir.path().join("fireside.db"));
    Archive::new(SqliteBackend::open(config).expect("open database"))
}

async fn count(archive: &Archive<SqliteBackend>, name: &str) -> Option<u32> {
    archive
        .tag_by_name(name)
        .await
        .unwrap()
        .map(|t| t.reference_count)
}

#[tokio::test]
async fn test_snippet_tag_lifecycle() {
    let dir = TempDir::new().unwrap();
    let archive = open(&dir);

    let saved = archive
        .create_snippet(
            Snippet::new("f1", "S1", "text", 1.0),
            vec![TagRequest::named("Purpose")],
        )
        .await
        .unwrap();
    assert_eq!(count(&archive, "purpose").await, Some(1));

    archive
        .update_snippet(
            &saved.stored.id,
            Snippet::new("f1", "S1", "text", 1.0),
            vec![TagRequest::named("Purpose"), TagRequest::named("Creation")],
        )
        .await
        .unwrap();
    assert_eq!(count(&archive, "Purpose").await, Some(1));
    assert_eq!(count(&archive, "Creation").await, Some(1));

    archive.delete_snippet(&saved.stored.id).await.unwrap();
    assert_eq!(count(&archive, "Purpose").await, Some(0));
    assert_eq!(count(&archive, "Creation").await, Some(0));
}

#[tokio::test]
async fn test_counts_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let archive = open(&dir);
        let snippet = archive
            .create_snippet(
                Snippet::new("f1", "Soul", "text", 1.0),
                vec![TagRequest::named("Soul").with_weight(7)],
            )
            .await
            .unwrap();
        archive
            .create_deepening(
                Deepening::new(&snippet.stored.id, "More", "text"),
                vec![TagRequest::named("soul")],
            )
            .await
            .unwrap();
    }

    let archive = open(&dir);
    let tags = archive.tags().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "Soul");
    assert_eq!(tags[0].reference_count, 2);
    assert!(archive.recount_tags().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_share_one_tag() {
    let dir = TempDir::new().unwrap();
    let archive = open(&dir);

    let mut handles = Vec::new();
    for i in 0..8 {
        let archive = archive.clone();
        handles.push(tokio::spawn(async move {
            archive
                .create_snippet(
                    Snippet::new("f1", format!("Snippet {}", i), "text", f64::from(i)),
                    vec![TagRequest::named("Soul"), TagRequest::named("Growth")],
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let tags = archive.tags().await.unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.iter().all(|t| t.reference_count == 8));
}

#[tokio::test]
async fn test_repository_queries() {
    let dir = TempDir::new().unwrap();
    let archive = open(&dir);

    let family = archive
        .create_family(FiresideFamily::new("family-general", "General", "Introductory topics"))
        .await
        .unwrap();
    let fireside = archive
        .create_fireside(Fireside::new(&family.id, "Why Life?", "On purpose"))
        .await
        .unwrap();

    for (name, order, visibility) in [
        ("Third", 3.0, Visibility::Public),
        ("First", 1.0, Visibility::Public),
        ("Second", 2.0, Visibility::Private),
    ] {
        archive
            .create_snippet(
                Snippet::new(&fireside.id, name, "text", order).with_visibility(visibility),
                Vec::new(),
            )
            .await
            .unwrap();
    }

    let all = archive.snippets_by_fireside(&fireside.id, false).await.unwrap();
    let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);

    let public = archive.snippets_by_fireside(&fireside.id, true).await.unwrap();
    assert_eq!(public.len(), 2);

    let by_family = archive.firesides_by_family(&family.id).await.unwrap();
    assert_eq!(by_family.len(), 1);
    let found = archive.family_by_uid("family-general").await.unwrap().unwrap();
    assert_eq!(found.id, family.id);

    let mut outline = Outline::new("user-1", "Study plan");
    outline.add_item(OutlineItemKind::Snippet, &all[0].id);
    outline.is_public = true;
    archive.create_outline(outline).await.unwrap();
    assert_eq!(archive.public_outlines().await.unwrap().len(), 1);
    assert_eq!(archive.outlines_by_user("user-1").await.unwrap()[0].items.len(), 1);
}
