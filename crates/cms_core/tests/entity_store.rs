use cms_core::db::open_db_in_memory;
use cms_core::model::api_tag::ApiTag;
use cms_core::model::image::Image;
use cms_core::repo::entity_store::{EntityStore, ListQuery, RepoError};
use rusqlite::Connection;
use uuid::Uuid;

const IMAGES: EntityStore<Image> = EntityStore::new();
const TAGS: EntityStore<ApiTag> = EntityStore::new();

fn image(file_name: &str, created: i64) -> Image {
    Image {
        id: Uuid::new_v4(),
        file_name: file_name.to_string(),
        image_data: "iVBORw0KGgo=".to_string(),
        image_path: format!("/media/{file_name}"),
        alt_text: None,
        version: 1,
        created,
        changed: None,
        creator_id: None,
        changed_user: None,
    }
}

fn tag(name: &str) -> ApiTag {
    ApiTag {
        id: Uuid::new_v4(),
        name: name.to_string(),
        version: 1,
        created: 0,
        creator_id: None,
        changed: None,
        changed_user: None,
    }
}

#[test]
fn insert_get_update_delete_round() {
    let conn = open_db_in_memory().unwrap();
    let mut stored = image("logo.png", 10);

    let id = IMAGES.insert(&conn, &stored).unwrap();
    assert_eq!(IMAGES.get(&conn, id).unwrap(), stored);

    stored.alt_text = Some("Company logo".to_string());
    stored.version = 2;
    IMAGES.update(&conn, &stored).unwrap();
    assert_eq!(IMAGES.get(&conn, id).unwrap().alt_text.as_deref(), Some("Company logo"));

    assert!(IMAGES.delete(&conn, id).unwrap());
    assert!(IMAGES.find(&conn, id).unwrap().is_none());
}

#[test]
fn missing_rows_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ghost = image("ghost.png", 0);

    assert!(matches!(
        IMAGES.get(&conn, ghost.id),
        Err(RepoError::NotFound { kind: "image", id }) if id == ghost.id
    ));
    assert!(matches!(
        IMAGES.update(&conn, &ghost),
        Err(RepoError::NotFound { .. })
    ));
    assert!(matches!(
        IMAGES.delete(&conn, ghost.id),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn list_defaults_to_id_order_and_honors_sort_and_paging() {
    let conn = open_db_in_memory().unwrap();
    let mut images = vec![image("b.png", 3), image("a.png", 1), image("c.png", 2)];
    for item in &images {
        IMAGES.insert(&conn, item).unwrap();
    }

    images.sort_by_key(|item| item.id);
    let by_id: Vec<Uuid> = IMAGES
        .list(&conn, &ListQuery::page(0, 10))
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(by_id, images.iter().map(|item| item.id).collect::<Vec<_>>());

    let names: Vec<String> = IMAGES
        .list(&conn, &ListQuery::page(1, 2).sorted_by("fileName", "desc"))
        .unwrap()
        .into_iter()
        .map(|item| item.file_name)
        .collect();
    assert_eq!(names, vec!["b.png".to_string(), "a.png".to_string()]);
}

#[test]
fn invalid_paging_fails_before_touching_storage() {
    // No migrations: any executed query would fail with a missing table.
    let raw = Connection::open_in_memory().unwrap();

    assert!(matches!(
        IMAGES.list(&raw, &ListQuery::page(0, 0)),
        Err(RepoError::InvalidQuery(_))
    ));
    assert!(matches!(
        IMAGES.list(&raw, &ListQuery::page(-1, 5)),
        Err(RepoError::InvalidQuery(_))
    ));
    assert!(matches!(
        IMAGES.list(&raw, &ListQuery::page(0, 5).sorted_by("image_data", "asc")),
        Err(RepoError::InvalidQuery(_))
    ));
}

#[test]
fn duplicate_natural_key_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    TAGS.insert(&conn, &tag("payments")).unwrap();

    assert!(matches!(
        TAGS.insert(&conn, &tag("payments")),
        Err(RepoError::Conflict(_))
    ));
    let found = TAGS.find_by(&conn, "name", "payments").unwrap().unwrap();
    assert_eq!(found.name, "payments");
}

#[test]
fn writes_inside_a_rolled_back_transaction_disappear() {
    let mut conn = open_db_in_memory().unwrap();
    let item = image("temp.png", 0);

    let tx = conn.transaction().unwrap();
    IMAGES.insert(&tx, &item).unwrap();
    assert!(IMAGES.find(&tx, item.id).unwrap().is_some());
    tx.rollback().unwrap();

    assert!(IMAGES.find(&conn, item.id).unwrap().is_none());
}
