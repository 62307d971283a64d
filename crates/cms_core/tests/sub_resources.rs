use cms_core::db::open_db_in_memory;
use cms_core::reconcile::cascade::SubResourcePayload;
use cms_core::repo::entity_store::ListQuery;
use cms_core::service::attachment_service::{AttachmentPayload, AttachmentService};
use cms_core::service::image_service::{ImagePayload, ImageService};
use cms_core::ServiceError;
use uuid::Uuid;

fn image_payload() -> ImagePayload {
    ImagePayload {
        file_name: Some("banner.png".to_string()),
        image_data: Some("iVBORw0KGgo=".to_string()),
        image_path: Some("/media/banner.png".to_string()),
        alt_text: None,
        actor_id: Some(Uuid::from_u128(7)),
    }
}

#[test]
fn image_create_requires_content_fields() {
    let conn = open_db_in_memory().unwrap();
    let images = ImageService::try_new(&conn).unwrap();

    let mut missing_path = image_payload();
    missing_path.image_path = Some("  ".to_string());
    assert!(matches!(
        images.create_image(&missing_path),
        Err(ServiceError::Validation(_))
    ));

    let id = images.create_image(&image_payload()).unwrap();
    let image = images.get_image(id).unwrap();
    assert_eq!(image.version, 1);
    assert_eq!(image.creator_id, Some(Uuid::from_u128(7)));
    assert!(image.changed.is_none());
}

#[test]
fn image_update_is_partial_and_versioned() {
    let conn = open_db_in_memory().unwrap();
    let images = ImageService::try_new(&conn).unwrap();
    let id = images.create_image(&image_payload()).unwrap();
    let editor = Uuid::from_u128(8);

    images
        .update_image(
            id,
            &ImagePayload {
                image_path: Some("/media/banner-2.png".to_string()),
                actor_id: Some(editor),
                ..ImagePayload::default()
            },
        )
        .unwrap();

    let image = images.get_image(id).unwrap();
    assert_eq!(image.file_name, "banner.png");
    assert_eq!(image.image_path, "/media/banner-2.png");
    assert_eq!(image.version, 2);
    assert_eq!(image.changed_user, Some(editor));
    assert!(image.changed.is_some());

    assert!(matches!(
        images.update_image(id, &ImagePayload::default()),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        images.update_image(Uuid::new_v4(), &image_payload()),
        Err(ServiceError::NotFound { kind: "image", .. })
    ));
}

#[test]
fn empty_payloads_are_detected() {
    assert!(ImagePayload::default().is_empty());
    assert!(ImagePayload {
        alt_text: Some(" ".to_string()),
        actor_id: Some(Uuid::new_v4()),
        ..ImagePayload::default()
    }
    .is_empty());
    assert!(AttachmentPayload {
        file_url: Some(Vec::new()),
        ..AttachmentPayload::default()
    }
    .is_empty());
    assert!(!image_payload().is_empty());
}

#[test]
fn attachment_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let attachments = AttachmentService::try_new(&conn).unwrap();

    let no_body = AttachmentPayload {
        file_name: Some("guide.pdf".to_string()),
        file_url: None,
        file_path: Some("/docs/guide.pdf".to_string()),
        actor_id: None,
    };
    assert!(matches!(
        attachments.create_attachment(&no_body),
        Err(ServiceError::Validation(_))
    ));

    let id = attachments
        .create_attachment(&AttachmentPayload {
            file_url: Some(b"%PDF-1.7".to_vec()),
            ..no_body
        })
        .unwrap();
    attachments
        .update_attachment(
            id,
            &AttachmentPayload {
                file_url: Some(b"%PDF-1.7 v2".to_vec()),
                ..AttachmentPayload::default()
            },
        )
        .unwrap();

    let stored = attachments.get_attachment(id).unwrap();
    assert_eq!(stored.file_url, b"%PDF-1.7 v2".to_vec());
    assert_eq!(stored.file_name, "guide.pdf");
    assert_eq!(stored.version, 2);

    assert_eq!(
        attachments
            .list_attachments(&ListQuery::page(0, 10))
            .unwrap()
            .len(),
        1
    );
    assert!(attachments.delete_attachment(id).unwrap());
    assert!(matches!(
        attachments.delete_attachment(id),
        Err(ServiceError::NotFound { .. })
    ));
}
