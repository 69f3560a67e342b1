use serde_json::json;
use uuid::Uuid;

use crate::common::{MAX_PHOTO_SIZE, TestApp, fake_jpeg, routes};

mod upload {
    use sea_orm::ConnectionTrait;

    use super::*;

    #[tokio::test]
    async fn upload_creates_a_pending_try_on() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let id = app.upload_photo(&token).await;

        let res = app.get_with_token(&routes::try_on(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let try_on = &res.body["try_on"];
        assert_eq!(try_on["status"], "pending");
        assert!(try_on["product_id"].is_null());
        assert!(try_on["result_image"].is_null());
    }

    #[tokio::test]
    async fn stored_file_is_named_after_user_with_original_extension() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let profile = app.get_with_token(routes::PROFILE, &token).await;
        let user_id = profile.body["user"]["id"].as_str().unwrap().to_string();

        let id = app.upload_photo(&token).await;

        let res = app.get_with_token(&routes::try_on(id), &token).await;
        let original = res.body["try_on"]["original_image"].as_str().unwrap();
        let file_name = std::path::Path::new(original)
            .file_name()
            .unwrap()
            .to_str()
            .unwrap();
        assert!(file_name.starts_with(&format!("{user_id}_")), "{file_name}");
        assert!(file_name.ends_with(".jpg"), "{file_name}");
        assert!(app.upload_dir.join(file_name).exists());
    }

    #[tokio::test]
    async fn upload_without_photo_field_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app
            .upload_with_token("picture", "me.jpg", "image/jpeg", fake_jpeg(), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app
            .upload_with_token("photo", "notes.txt", "text/plain", b"hello".to_vec(), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let big = vec![0u8; MAX_PHOTO_SIZE as usize + 1];

        let res = app
            .upload_with_token("photo", "big.png", "image/png", big, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(stored_photos(&app).is_empty());
        assert_eq!(std::fs::read_dir(app.upload_dir.join(".tmp")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn large_photo_is_stored_intact() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let photo: Vec<u8> = (0..MAX_PHOTO_SIZE).map(|i| (i % 251) as u8).collect();

        let res = app
            .upload_with_token("photo", "full.png", "image/png", photo.clone(), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let id = res.uuid("try_on_id");

        let image = app
            .get_bytes_with_token(&routes::try_on_image(id, "original"), &token)
            .await;
        assert_eq!(image.status().as_u16(), 200);
        assert_eq!(image.bytes().await.unwrap().to_vec(), photo);
    }

    #[tokio::test]
    async fn empty_photo_is_rejected_and_not_kept() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app
            .upload_with_token("photo", "empty.jpg", "image/jpeg", Vec::new(), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(stored_photos(&app).is_empty());
    }

    #[tokio::test]
    async fn photo_is_removed_when_try_on_cannot_be_saved() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        app.db
            .execute_unprepared("DROP TABLE try_on")
            .await
            .unwrap();

        let res = app
            .upload_with_token("photo", "me.jpg", "image/jpeg", fake_jpeg(), &token)
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");
        assert!(stored_photos(&app).is_empty());
    }

    /// Files in the upload directory, ignoring the temp area.
    fn stored_photos(app: &TestApp) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(&app.upload_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_file())
            .collect()
    }
}

mod processing {
    use super::*;

    #[tokio::test]
    async fn process_is_synchronous_then_completes_after_the_delay() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let product_id = app.create_product("linen-shirt", "shirts", "Acme").await;
        let id = app.upload_photo(&token).await;

        let res = app
            .post_with_token(
                routes::PROCESS,
                &json!({"try_on_id": id, "product_id": product_id}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.uuid("try_on_id"), id);

        let now = app.get_with_token(&routes::try_on(id), &token).await;
        assert_eq!(now.body["try_on"]["status"], "processing");
        assert_eq!(now.body["try_on"]["product_id"], product_id.to_string());
        assert!(now.body["try_on"]["result_image"].is_null());

        let done = app.wait_for_status(id, &token, "completed").await;
        assert_eq!(done["result_image"], done["original_image"]);

        let history = app.get_with_token(routes::HISTORY, &token).await;
        let entry = &history.body["try_ons"][0];
        assert_eq!(entry["id"], id.to_string());
        assert_eq!(entry["status"], "completed");
        assert!(entry["result_image"].is_string());
    }

    #[tokio::test]
    async fn reprocessing_restarts_and_still_completes() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let shirt = app.create_product("linen-shirt", "shirts", "Acme").await;
        let chinos = app.create_product("chinos", "trousers", "Acme").await;
        let id = app.upload_photo(&token).await;

        for product_id in [shirt, chinos] {
            let res = app
                .post_with_token(
                    routes::PROCESS,
                    &json!({"try_on_id": id, "product_id": product_id}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let done = app.wait_for_status(id, &token, "completed").await;
        assert_eq!(done["product_id"], chinos.to_string());
    }

    #[tokio::test]
    async fn processing_an_unknown_product_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.upload_photo(&token).await;

        let res = app
            .post_with_token(
                routes::PROCESS,
                &json!({"try_on_id": id, "product_id": Uuid::new_v4()}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let unchanged = app.get_with_token(&routes::try_on(id), &token).await;
        assert_eq!(unchanged.body["try_on"]["status"], "pending");
    }

    #[tokio::test]
    async fn malformed_process_body_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app
            .post_with_token(
                routes::PROCESS,
                &json!({"try_on_id": "not-a-uuid", "product_id": Uuid::new_v4()}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn other_users_try_on_is_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice@example.com").await;
        let bob = app.create_authenticated_user("bob@example.com").await;
        let product_id = app.create_product("linen-shirt", "shirts", "Acme").await;
        let id = app.upload_photo(&alice).await;

        let get = app.get_with_token(&routes::try_on(id), &bob).await;
        assert_eq!(get.status, 404);
        assert_eq!(get.body["code"], "NOT_FOUND");

        let image = app
            .get_bytes_with_token(&routes::try_on_image(id, "original"), &bob)
            .await;
        assert_eq!(image.status().as_u16(), 404);

        let process = app
            .post_with_token(
                routes::PROCESS,
                &json!({"try_on_id": id, "product_id": product_id}),
                &bob,
            )
            .await;
        assert_eq!(process.status, 404);

        let delete = app.delete_with_token(&routes::history_entry(id), &bob).await;
        assert_eq!(delete.status, 404);
        assert_eq!(delete.body["code"], "NOT_FOUND");

        let bobs_history = app.get_with_token(routes::HISTORY, &bob).await;
        assert_eq!(bobs_history.body["try_ons"].as_array().unwrap().len(), 0);

        let still_there = app.get_with_token(&routes::try_on(id), &alice).await;
        assert_eq!(still_there.status, 200);
        assert_eq!(still_there.body["try_on"]["status"], "pending");
    }
}

mod history {
    use sea_orm::EntityTrait;

    use super::*;

    #[tokio::test]
    async fn history_is_newest_first() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let first = app.upload_photo(&token).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let second = app.upload_photo(&token).await;

        let res = app.get_with_token(routes::HISTORY, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let ids: Vec<&str> = res.body["try_ons"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![second.to_string(), first.to_string()]);
    }

    #[tokio::test]
    async fn deleted_try_on_disappears_from_reads() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let kept = app.upload_photo(&token).await;
        let removed = app.upload_photo(&token).await;

        let res = app
            .delete_with_token(&routes::history_entry(removed), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let history = app.get_with_token(routes::HISTORY, &token).await;
        let ids: Vec<&str> = history.body["try_ons"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![kept.to_string()]);

        let get = app.get_with_token(&routes::try_on(removed), &token).await;
        assert_eq!(get.status, 404);

        let again = app
            .delete_with_token(&routes::history_entry(removed), &token)
            .await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn deleting_while_processing_prevents_completion() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let product_id = app.create_product("linen-shirt", "shirts", "Acme").await;
        let id = app.upload_photo(&token).await;

        app.post_with_token(
            routes::PROCESS,
            &json!({"try_on_id": id, "product_id": product_id}),
            &token,
        )
        .await;
        let res = app.delete_with_token(&routes::history_entry(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        tokio::time::sleep(crate::common::PROCESSING_DELAY * 2).await;

        let record = tryon_server::entity::try_on::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(record.deleted);
        assert!(record.deleted_at.is_some());
        assert_eq!(record.status, ::common::TryOnStatus::Processing);
        assert!(record.result_image.is_none());
    }
}

mod images {
    use super::*;

    #[tokio::test]
    async fn original_image_can_be_downloaded() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.upload_photo(&token).await;

        let res = app
            .get_bytes_with_token(&routes::try_on_image(id, "original"), &token)
            .await;

        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(res.headers()["content-type"], "image/jpeg");
        assert_eq!(res.bytes().await.unwrap().to_vec(), fake_jpeg());
    }

    #[tokio::test]
    async fn result_image_is_missing_until_completed() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let product_id = app.create_product("linen-shirt", "shirts", "Acme").await;
        let id = app.upload_photo(&token).await;

        let before = app
            .get_bytes_with_token(&routes::try_on_image(id, "result"), &token)
            .await;
        assert_eq!(before.status().as_u16(), 404);

        app.post_with_token(
            routes::PROCESS,
            &json!({"try_on_id": id, "product_id": product_id}),
            &token,
        )
        .await;
        app.wait_for_status(id, &token, "completed").await;

        let after = app
            .get_bytes_with_token(&routes::try_on_image(id, "result"), &token)
            .await;
        assert_eq!(after.status().as_u16(), 200);
        assert_eq!(after.bytes().await.unwrap().to_vec(), fake_jpeg());
    }

    #[tokio::test]
    async fn unknown_image_kind_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.upload_photo(&token).await;

        let res = app
            .get_with_token(&routes::try_on_image(id, "thumbnail"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
