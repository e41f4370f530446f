use std::time::Duration;

use atlas_server::store::CountryStore;
use chrono::{DateTime, Utc};

use crate::common::{MAX_UPLOAD_SIZE, TestApp, country_form, image_bytes, routes};

#[tokio::test]
async fn empty_collection_lists_nothing() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::COUNTRIES).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["countries"], serde_json::json!([]));
}

#[tokio::test]
async fn create_then_list() {
    let app = TestApp::spawn().await;

    let res = app.create_country("Japan").await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "Japan");
    let id = res.id();
    let image_path = res.image_path();
    assert!(image_path.ends_with(".png"));
    assert!(!image_path.contains('/'));
    assert!(app.upload_path(&image_path).is_file());

    let countries = app.list().await;
    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0]["id"], id);
    assert_eq!(countries[0]["name"], "Japan");
    assert_eq!(countries[0]["image_path"], image_path.as_str());
    assert!(countries[0]["created_at"].is_string());
}

#[tokio::test]
async fn create_trims_name() {
    let app = TestApp::spawn().await;
    let res = app.create_country("  Peru  ").await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "Peru");
}

#[tokio::test]
async fn create_without_image_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_country_ok("Chile").await;

    let res = app
        .post_form(routes::COUNTRIES, country_form(Some("France"), None))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "Country name and image are required");
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(app.list().await.len(), 1);

    let rows = CountryStore::new(&app.db).list().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Chile");
}

#[tokio::test]
async fn create_without_name_leaves_no_file() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::COUNTRIES,
            country_form(None, Some(("photo.jpg", "image/jpeg", image_bytes()))),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "Country name and image are required");
    assert!(app.stored_files().is_empty());
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn create_with_blank_name_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::COUNTRIES,
            country_form(Some("   "), Some(("photo.png", "image/png", image_bytes()))),
        )
        .await;

    assert_eq!(res.status, 400);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn create_with_overlong_name_is_rejected() {
    let app = TestApp::spawn().await;
    let name = "a".repeat(257);

    let res = app.create_country(&name).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn create_with_disallowed_extension_is_unsupported() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::COUNTRIES,
            country_form(Some("Spain"), Some(("notes.txt", "image/png", image_bytes()))),
        )
        .await;

    assert_eq!(res.status, 415);
    assert_eq!(res.body["code"], "FILE_TYPE_NOT_ALLOWED");
    assert!(app.list().await.is_empty());
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn create_with_disallowed_content_type_is_unsupported() {
    let app = TestApp::spawn().await;

    let res = app
        .post_form(
            routes::COUNTRIES,
            country_form(
                Some("Spain"),
                Some(("photo.png", "application/octet-stream", image_bytes())),
            ),
        )
        .await;

    assert_eq!(res.status, 415);
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn create_with_oversized_image_is_rejected() {
    let app = TestApp::spawn().await;
    let oversized = vec![0u8; (MAX_UPLOAD_SIZE + 1024) as usize];

    let res = app
        .post_form(
            routes::COUNTRIES,
            country_form(Some("Norway"), Some(("big.jpg", "image/jpeg", oversized))),
        )
        .await;

    assert_eq!(res.status, 413, "{}", res.text);
    assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.list().await.is_empty());
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn image_at_the_limit_is_accepted() {
    let app = TestApp::spawn().await;
    let exact = vec![7u8; MAX_UPLOAD_SIZE as usize];

    let res = app
        .post_form(
            routes::COUNTRIES,
            country_form(Some("Iceland"), Some(("edge.webp", "image/webp", exact))),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let metadata = std::fs::metadata(app.upload_path(&res.image_path())).unwrap();
    assert_eq!(metadata.len(), MAX_UPLOAD_SIZE);
}

#[tokio::test]
async fn list_is_newest_first_with_increasing_ids() {
    let app = TestApp::spawn().await;

    let mut ids = Vec::new();
    for name in ["Kenya", "Brazil", "Canada"] {
        let (id, _) = app.create_country_ok(name).await;
        ids.push(id);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let countries = app.list().await;
    let names: Vec<_> = countries
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Canada", "Brazil", "Kenya"]);

    let created: Vec<DateTime<Utc>> = countries
        .iter()
        .map(|c| c["created_at"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(
        created.windows(2).all(|w| w[0] > w[1]),
        "created_at should strictly decrease down the list: {created:?}"
    );
}

#[tokio::test]
async fn markup_in_names_is_stored_verbatim() {
    let app = TestApp::spawn().await;

    let res = app.create_country("<b>A&B</b>").await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "<b>A&B</b>");

    let countries = app.list().await;
    assert_eq!(countries[0]["name"], "<b>A&B</b>");
}

#[tokio::test]
async fn each_upload_gets_its_own_file() {
    let app = TestApp::spawn().await;
    let (_, first) = app.create_country_ok("Italy").await;
    let (_, second) = app.create_country_ok("Italy").await;

    assert_ne!(first, second);
    assert_eq!(app.stored_files().len(), 2);
}

#[tokio::test]
async fn delete_removes_row_and_file() {
    let app = TestApp::spawn().await;
    let (id, image_path) = app.create_country_ok("Egypt").await;

    let res = app.delete(&routes::country(id)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["message"], "Country deleted successfully");
    assert!(app.list().await.is_empty());
    assert!(!app.upload_path(&image_path).exists());
}

#[tokio::test]
async fn delete_missing_id_succeeds() {
    let app = TestApp::spawn().await;

    let res = app.delete(&routes::country(9999)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["message"], "Country deleted successfully");
}

#[tokio::test]
async fn delete_twice_succeeds() {
    let app = TestApp::spawn().await;
    let (id, _) = app.create_country_ok("Greece").await;

    assert_eq!(app.delete(&routes::country(id)).await.status, 200);
    assert_eq!(app.delete(&routes::country(id)).await.status, 200);
}

#[tokio::test]
async fn delete_with_missing_file_still_removes_row() {
    let app = TestApp::spawn().await;
    let (id, image_path) = app.create_country_ok("Morocco").await;
    std::fs::remove_file(app.upload_path(&image_path)).unwrap();

    let res = app.delete(&routes::country(id)).await;

    assert_eq!(res.status, 200);
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let app = TestApp::spawn().await;
    let (first, _) = app.create_country_ok("Fiji").await;
    app.delete(&routes::country(first)).await;

    let (second, _) = app.create_country_ok("Samoa").await;

    assert!(second > first);
}

#[tokio::test]
async fn update_name_keeps_image() {
    let app = TestApp::spawn().await;
    let (id, image_path) = app.create_country_ok("Holland").await;

    let res = app
        .put_form(&routes::country(id), country_form(Some("Netherlands"), None))
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["message"], "Country updated successfully");

    let countries = app.list().await;
    assert_eq!(countries[0]["name"], "Netherlands");
    assert_eq!(countries[0]["image_path"], image_path.as_str());
    assert!(app.upload_path(&image_path).is_file());
}

#[tokio::test]
async fn update_image_replaces_file() {
    let app = TestApp::spawn().await;
    let (id, old_path) = app.create_country_ok("Vietnam").await;

    let res = app
        .put_form(
            &routes::country(id),
            country_form(None, Some(("bay.gif", "image/gif", b"GIF89a".to_vec()))),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let countries = app.list().await;
    let new_path = countries[0]["image_path"].as_str().unwrap().to_string();
    assert_eq!(countries[0]["name"], "Vietnam");
    assert_ne!(new_path, old_path);
    assert!(new_path.ends_with(".gif"));
    assert!(!app.upload_path(&old_path).exists());
    assert_eq!(std::fs::read(app.upload_path(&new_path)).unwrap(), b"GIF89a");
    assert_eq!(app.stored_files().len(), 1);
}

#[tokio::test]
async fn update_name_and_image_together() {
    let app = TestApp::spawn().await;
    let (id, old_path) = app.create_country_ok("Burma").await;

    let res = app
        .put_form(
            &routes::country(id),
            country_form(
                Some("Myanmar"),
                Some(("pagoda.jpg", "image/jpeg", b"JPEG_DATA".to_vec())),
            ),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let row = CountryStore::new(&app.db)
        .get(id as i32)
        .await
        .unwrap()
        .expect("row should still exist");
    assert_eq!(row.name, "Myanmar");
    assert_ne!(row.image_path, old_path);
    assert!(row.image_path.ends_with(".jpg"));
    assert!(!app.upload_path(&old_path).exists());
    assert_eq!(
        std::fs::read(app.upload_path(&row.image_path)).unwrap(),
        b"JPEG_DATA"
    );
    assert_eq!(app.list().await.len(), 1);
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .put_form(
            &routes::country(4242),
            country_form(Some("Atlantis"), Some(("a.png", "image/png", image_bytes()))),
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn update_without_changes_is_rejected() {
    let app = TestApp::spawn().await;
    let (id, _) = app.create_country_ok("Laos").await;

    let res = app
        .put_form(&routes::country(id), country_form(None, None))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_with_blank_name_is_rejected() {
    let app = TestApp::spawn().await;
    let (id, _) = app.create_country_ok("Nepal").await;

    let res = app
        .put_form(&routes::country(id), country_form(Some(" "), None))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(app.list().await[0]["name"], "Nepal");
}
