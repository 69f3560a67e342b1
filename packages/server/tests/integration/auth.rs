use serde_json::json;

use crate::common::{PASSWORD, TestApp, TestResponse, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_can_register_with_valid_credentials() {
        let app = TestApp::spawn().await;

        let res = app.register("alice@example.com", PASSWORD, "Alice").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["user"]["id"].is_string());
        assert_eq!(res.body["user"]["email"], "alice@example.com");
        assert_eq!(res.body["user"]["name"], "Alice");
        assert!(res.body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn email_is_normalized_before_storage() {
        let app = TestApp::spawn().await;

        let res = app.register("  Alice@Example.COM ", PASSWORD, "Alice").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_email() {
        let app = TestApp::spawn().await;

        let first = app.register("alice@example.com", PASSWORD, "Alice").await;
        assert_eq!(first.status, 200, "First registration failed: {}", first.text);

        let res = app
            .register("ALICE@example.com", "another-password", "Impostor")
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");

        let login = app.login("alice@example.com", PASSWORD).await;
        assert_eq!(login.status, 200, "First user should still log in: {}", login.text);
        assert_eq!(login.body["user"]["name"], "Alice");
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;

        let res = app.register("alice@example.com", "short", "Alice").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_a_malformed_email() {
        let app = TestApp::spawn().await;

        let res = app.register("not-an-email", PASSWORD, "Alice").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_an_empty_name() {
        let app = TestApp::spawn().await;

        let res = app.register("alice@example.com", PASSWORD, "   ").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_user_can_login_and_receives_token() {
        let app = TestApp::spawn().await;
        app.register("alice@example.com", PASSWORD, "Alice").await;

        let res = app.login("alice@example.com", PASSWORD).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn issued_token_is_accepted_by_protected_routes() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app.get_with_token(routes::PROFILE, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn cannot_login_with_wrong_password() {
        let app = TestApp::spawn().await;
        app.register("alice@example.com", PASSWORD, "Alice").await;

        for attempt in ["correct-horse-batterY", "correct-horse-battery ", "wrong"] {
            let res = app.login("alice@example.com", attempt).await;

            assert_eq!(res.status, 401, "password {attempt:?} was accepted");
            assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
        }
    }

    #[tokio::test]
    async fn cannot_login_with_unknown_email() {
        let app = TestApp::spawn().await;

        let res = app.login("nobody@example.com", PASSWORD).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn login_with_empty_fields_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.login("", "").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod request_validation {
    use super::*;

    #[tokio::test]
    async fn malformed_json_body_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::REGISTER))
            .header("Content-Type", "application/json")
            .body("not valid json")
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_required_fields_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &json!({"email": "alice@example.com"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod authenticated_access {
    use super::*;

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::HISTORY).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn request_with_malformed_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::HISTORY, "not-a-valid-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn request_with_non_bearer_auth_scheme_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::PROFILE))
            .header("Authorization", "Basic abc123")
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn protected_write_is_rejected_before_the_handler_runs() {
        let app = TestApp::spawn().await;

        // Invalid body, but auth is checked first.
        let res = app
            .post_without_token(routes::PROCESS, &json!({"try_on_id": "nope"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let app = TestApp::spawn().await;
        let forged = tryon_server::utils::jwt::sign(
            uuid::Uuid::new_v4(),
            "mallory@example.com",
            "some-other-secret",
            1,
        )
        .unwrap();

        let res = app.get_with_token(routes::PROFILE, &forged).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
