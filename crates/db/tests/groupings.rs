//! Integration tests for entities, collections, and preceding links.

use aura_db::models::job::NewJob;
use aura_db::repositories::{CollectionRepo, EntityRepo, JobRepo, PrecedingRepo, ProjectRepo};
use sqlx::SqlitePool;

const NOW: i64 = 1_700_000_000;

async fn seed_project(pool: &SqlitePool) -> i64 {
    ProjectRepo::create(pool, "Demo", "demo", "not-a-real-hash")
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Entities & collections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn entity_create_is_idempotent_on_the_triple(pool: SqlitePool) {
    let project_id = seed_project(&pool).await;

    EntityRepo::create(&pool, project_id, "commit", "abc", NOW)
        .await
        .unwrap();
    let first = EntityRepo::find(&pool, project_id, "commit", "abc")
        .await
        .unwrap()
        .unwrap();

    // A racing second create must not produce a second row.
    EntityRepo::create(&pool, project_id, "commit", "abc", NOW + 5)
        .await
        .unwrap();
    let second = EntityRepo::find(&pool, project_id, "commit", "abc")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.created_at, NOW);
}

#[sqlx::test(migrations = "./migrations")]
async fn same_triple_in_both_namespaces_is_allowed(pool: SqlitePool) {
    let project_id = seed_project(&pool).await;

    EntityRepo::create(&pool, project_id, "ref", "main", NOW)
        .await
        .unwrap();
    CollectionRepo::create(&pool, project_id, "ref", "main", NOW)
        .await
        .unwrap();

    assert!(EntityRepo::find(&pool, project_id, "ref", "main")
        .await
        .unwrap()
        .is_some());
    assert!(CollectionRepo::find(&pool, project_id, "ref", "main")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn collection_membership_is_a_set(pool: SqlitePool) {
    let project_id = seed_project(&pool).await;
    EntityRepo::create(&pool, project_id, "commit", "abc", NOW)
        .await
        .unwrap();
    let entity = EntityRepo::find(&pool, project_id, "commit", "abc")
        .await
        .unwrap()
        .unwrap();
    CollectionRepo::create(&pool, project_id, "mr", "7", NOW)
        .await
        .unwrap();
    let collection = CollectionRepo::find(&pool, project_id, "mr", "7")
        .await
        .unwrap()
        .unwrap();

    CollectionRepo::insert_entity(&pool, collection.id, entity.id)
        .await
        .unwrap();
    CollectionRepo::insert_entity(&pool, collection.id, entity.id)
        .await
        .unwrap();

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM collections_entities WHERE collection_id = ?")
            .bind(collection.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);
}

// ---------------------------------------------------------------------------
// Preceding links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn links_are_queryable_and_deletable_by_older_side(pool: SqlitePool) {
    let project_id = seed_project(&pool).await;
    EntityRepo::create(&pool, project_id, "rev", "1", NOW)
        .await
        .unwrap();
    let entity = EntityRepo::find(&pool, project_id, "rev", "1")
        .await
        .unwrap()
        .unwrap();

    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        ids.push(
            JobRepo::create(
                &pool,
                &NewJob {
                    entity_id: entity.id,
                    name,
                    cmd: "",
                    env: "",
                    tag: "linux",
                    created_at: NOW,
                    earliest_start_at: NOW,
                },
            )
            .await
            .unwrap(),
        );
    }
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    PrecedingRepo::insert(&pool, a, b).await.unwrap();
    PrecedingRepo::insert(&pool, a, c).await.unwrap();

    let mut successors = PrecedingRepo::succeeding_ids(&pool, a).await.unwrap();
    successors.sort_unstable();
    assert_eq!(successors, vec![b, c]);
    assert!(PrecedingRepo::succeeding_ids(&pool, b)
        .await
        .unwrap()
        .is_empty());

    PrecedingRepo::delete_for_older(&pool, a).await.unwrap();
    assert!(PrecedingRepo::succeeding_ids(&pool, a)
        .await
        .unwrap()
        .is_empty());
}
