use cms_core::db::open_db_in_memory;
use cms_core::model::EntityId;
use cms_core::repo::entity_store::ListQuery;
use cms_core::service::faq_category_service::{FaqCategoryRequest, FaqCategoryService};
use cms_core::service::faq_service::{FaqRequest, FaqService, UpdateFaqRequest};
use cms_core::ServiceError;
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

fn faq(categories: &[EntityId]) -> FaqRequest {
    FaqRequest {
        question: "How do I rotate my API key?".to_string(),
        answer: "From the developer portal settings page.".to_string(),
        langcode: "en".to_string(),
        status: true,
        faq_order: 1,
        faq_categories: categories.to_vec(),
    }
}

fn category(service: &FaqCategoryService<'_>, name: &str) -> EntityId {
    service
        .create_category(&FaqCategoryRequest {
            name: name.to_string(),
            description: None,
        })
        .unwrap()
}

fn link_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM faq_faq_categories;", [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_links_existing_categories() {
    let conn = open_db_in_memory().unwrap();
    let categories = FaqCategoryService::try_new(&conn).unwrap();
    let faqs = FaqService::try_new(&conn).unwrap();
    let billing = category(&categories, "Billing");
    let security = category(&categories, "Security");

    let id = faqs.create_faq(faq(&[billing, security, billing])).unwrap();

    let view = faqs.get_faq(id).unwrap();
    let linked: BTreeSet<EntityId> = view.associations.into_iter().collect();
    assert_eq!(linked, BTreeSet::from([billing, security]));
    assert_eq!(view.parent.faq_order, 1);
    assert!(view.parent.changed.is_some());
}

#[test]
fn unknown_category_aborts_without_partial_commit() {
    let conn = open_db_in_memory().unwrap();
    let categories = FaqCategoryService::try_new(&conn).unwrap();
    let faqs = FaqService::try_new(&conn).unwrap();
    let billing = category(&categories, "Billing");
    let missing = Uuid::new_v4();

    let err = faqs.create_faq(faq(&[billing, missing])).unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { kind: "faq_category", id } if id == missing));
    assert!(faqs.list_faqs(&ListQuery::page(0, 10)).unwrap().is_empty());
    assert_eq!(link_count(&conn), 0);
}

#[test]
fn update_reconciles_category_links() {
    let conn = open_db_in_memory().unwrap();
    let categories = FaqCategoryService::try_new(&conn).unwrap();
    let faqs = FaqService::try_new(&conn).unwrap();
    let a = category(&categories, "A");
    let b = category(&categories, "B");
    let c = category(&categories, "C");
    let id = faqs.create_faq(faq(&[a, b])).unwrap();

    let mut changed = faq(&[b, c]);
    changed.answer = "Use the CLI.".to_string();
    faqs.update_faq(UpdateFaqRequest { id, faq: changed }).unwrap();

    let view = faqs.get_faq(id).unwrap();
    let linked: BTreeSet<EntityId> = view.associations.into_iter().collect();
    assert_eq!(linked, BTreeSet::from([b, c]));
    assert_eq!(view.parent.answer, "Use the CLI.");
    assert_eq!(link_count(&conn), 2);
}

#[test]
fn zero_order_and_blank_question_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let faqs = FaqService::try_new(&conn).unwrap();

    let mut zero = faq(&[]);
    zero.faq_order = 0;
    assert!(matches!(faqs.create_faq(zero), Err(ServiceError::Validation(_))));

    let mut blank = faq(&[]);
    blank.question = " ".to_string();
    assert!(matches!(faqs.create_faq(blank), Err(ServiceError::Validation(_))));

    let mut nil_category = faq(&[Uuid::nil()]);
    nil_category.faq_order = -1;
    assert!(matches!(
        faqs.create_faq(nil_category),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn delete_removes_links_and_frees_categories() {
    let conn = open_db_in_memory().unwrap();
    let categories = FaqCategoryService::try_new(&conn).unwrap();
    let faqs = FaqService::try_new(&conn).unwrap();
    let billing = category(&categories, "Billing");
    let id = faqs.create_faq(faq(&[billing])).unwrap();

    // Linked categories are protected by the foreign key.
    assert!(matches!(
        categories.delete_category(billing),
        Err(ServiceError::Conflict(_))
    ));

    assert!(faqs.delete_faq(id).unwrap());
    assert_eq!(link_count(&conn), 0);
    assert!(matches!(faqs.get_faq(id), Err(ServiceError::NotFound { .. })));
    assert!(categories.delete_category(billing).unwrap());
}

#[test]
fn list_pages_in_requested_order() {
    let conn = open_db_in_memory().unwrap();
    let faqs = FaqService::try_new(&conn).unwrap();
    for order in [3, 1, 2] {
        let mut request = faq(&[]);
        request.faq_order = order;
        faqs.create_faq(request).unwrap();
    }

    let orders: Vec<i64> = faqs
        .list_faqs(&ListQuery::page(0, 2).sorted_by("faqOrder", "desc"))
        .unwrap()
        .into_iter()
        .map(|view| view.parent.faq_order)
        .collect();
    assert_eq!(orders, vec![3, 2]);
}
