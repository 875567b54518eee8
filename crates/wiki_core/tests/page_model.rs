use wiki_core::db::open_db_in_memory;
use wiki_core::{
    FieldErrorKind, Page, PageAttributes, PageLifecycle, PageService, PageServiceError,
    PageStatus, SqlitePageRepository,
};

#[test]
fn route_prepends_wiki_prefix() {
    let mut page = Page::default();
    page.set_url_title("some_title");
    assert_eq!(page.route().as_deref(), Some("/wiki/some_title"));
}

#[test]
fn rendered_content_converts_markdown_to_html() {
    let mut page = Page::default();
    page.content = "This should be HTML text".to_string();
    assert_eq!(page.rendered_content().matches("<p>").count(), 1);
}

#[test]
fn validate_without_title_reports_title_first() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqlitePageRepository::try_new(&mut conn).unwrap();
    let service = PageService::new(repo);

    let mut page = Page::default();
    page.content = "I'm content".to_string();
    let err = service.validate(&mut page).unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.get(0).unwrap().path, "title");
    assert_eq!(page.errors().get(0).unwrap().path, "title");
    assert_eq!(page.lifecycle(), PageLifecycle::Invalid);
}

#[test]
fn validate_empty_page_reports_content_third() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqlitePageRepository::try_new(&mut conn).unwrap();
    let service = PageService::new(repo);

    let mut page = Page::default();
    let _ = service.validate(&mut page);

    let errors = page.errors();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors.get(2).unwrap().path, "content");
    assert_eq!(
        errors.by_path("urlTitle").unwrap().kind,
        FieldErrorKind::MissingRequiredField
    );
}

#[test]
fn create_with_invalid_status_is_rejected_and_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqlitePageRepository::try_new(&mut conn).unwrap();
        let mut service = PageService::new(repo);

        let err = service
            .create(PageAttributes {
                title: Some("A".to_string()),
                url_title: Some("B".to_string()),
                content: Some("C".to_string()),
                status: Some("cat".to_string()),
                ..PageAttributes::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            PageServiceError::InvalidEnumValue(ref value) if value.value == "cat"
        ));
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM pages;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn attributes_deserialize_from_camel_case_payload() {
    let attributes: PageAttributes = serde_json::from_value(serde_json::json!({
        "title": "Grace Hopper",
        "urlTitle": "grace",
        "content": "COBOL",
        "tags": ["navy", "compilers"],
        "status": "closed"
    }))
    .unwrap();

    let page = Page::build(attributes).unwrap();
    assert_eq!(page.url_title(), Some("grace"));
    assert_eq!(page.status, PageStatus::Closed);
    assert_eq!(page.tags(), ["compilers", "navy"]);
}

#[test]
fn status_deserialization_rejects_unknown_values() {
    let ok: PageStatus = serde_json::from_str("\"open\"").unwrap();
    assert_eq!(ok, PageStatus::Open);

    let err = serde_json::from_str::<PageStatus>("\"cat\"").unwrap_err();
    assert!(err.to_string().contains("cat"));
}

#[test]
fn page_serializes_with_external_field_names() {
    let mut page = Page::new("Title of this page", "Content");
    page.set_tags(["b", "a"]);
    page.apply_hooks();

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["title"], "Title of this page");
    assert_eq!(json["urlTitle"], "Title_of_this_page");
    assert_eq!(json["status"], "open");
    assert_eq!(json["tags"], serde_json::json!(["a", "b"]));
    assert!(json["id"].is_null());
    assert!(json.get("errors").is_none());
}
