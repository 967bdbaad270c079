#[cfg(test)]
mod integration_tests {
    use crate::handlers::followings::{FollowRequest, SetFollowingsRequest};
    use crate::handlers::users::{CreateUserRequest, UpdateUserRequest, UserResponse};
    use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
    use crate::test_utils::test_utils::{init_test_tracing, setup_test_app};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn setup_server() -> TestServer {
        let app = setup_test_app().await;
        TestServer::new(app).unwrap()
    }

    async fn create_user(server: &TestServer, username: &str) -> i32 {
        let response = server
            .post("/api/v1/users")
            .json(&CreateUserRequest {
                username: username.to_string(),
                email: None,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<UserResponse> = response.json();
        body.data.id
    }

    async fn user_ids(server: &TestServer, path: &str) -> Vec<i32> {
        let response = server.get(path).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<UserResponse>> = response.json();
        body.data.into_iter().map(|user| user.id).collect()
    }

    #[tokio::test]
    async fn test_health_check() {
        let _guard = init_test_tracing();
        let server = setup_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
        assert_eq!(body.admin_models, 2);
    }

    #[tokio::test]
    async fn test_create_user() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&CreateUserRequest {
                username: "carol".to_string(),
                email: Some("carol@example.com".to_string()),
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "User created successfully");
        assert_eq!(body.data["username"], "carol");
        assert_eq!(body.data["email"], "carol@example.com");
        assert!(body.data["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&CreateUserRequest {
                username: "alice".to_string(),
                email: None,
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.code, "USERNAME_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "dave", "email": "not-an-email" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "x".repeat(151) }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_users_and_user() {
        let server = setup_server().await;

        let response = server.get("/api/v1/users").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<UserResponse>> = response.json();
        let usernames: Vec<&str> = body.data.iter().map(|user| user.username.as_str()).collect();
        assert_eq!(usernames, vec!["alice", "bob"]);

        let response = server.get("/api/v1/users/2").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.data.username, "bob");

        server.get("/api/v1/users/999").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_user() {
        let server = setup_server().await;

        let response = server
            .put("/api/v1/users/1")
            .json(&UpdateUserRequest {
                email: Some(Some("alice@example.com".to_string())),
                ..Default::default()
            })
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.data.username, "alice");
        assert_eq!(body.data.email.as_deref(), Some("alice@example.com"));

        let response = server
            .put("/api/v1/users/1")
            .json(&UpdateUserRequest {
                username: Some("bob".to_string()),
                ..Default::default()
            })
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .put("/api/v1/users/999")
            .json(&UpdateUserRequest::default())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_user_clears_email_only_when_null() {
        let server = setup_server().await;

        server
            .put("/api/v1/users/1")
            .json(&json!({ "email": "alice@example.com" }))
            .await
            .assert_status(StatusCode::OK);

        // An absent email is left alone
        let response = server
            .put("/api/v1/users/1")
            .json(&json!({ "username": "alicia" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.data.username, "alicia");
        assert_eq!(body.data.email.as_deref(), Some("alice@example.com"));

        let response = server.put("/api/v1/users/1").json(&json!({ "email": null })).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.data.username, "alicia");
        assert_eq!(body.data.email, None);

        server
            .put("/api/v1/users/1")
            .json(&json!({ "email": "not-an-email" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let server = setup_server().await;

        server.delete("/api/v1/users/2").await.assert_status(StatusCode::OK);
        server.get("/api/v1/users/2").await.assert_status(StatusCode::NOT_FOUND);
        server.delete("/api/v1/users/2").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_follow_is_visible_from_both_sides() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 2 })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.data.username, "bob");

        assert_eq!(user_ids(&server, "/api/v1/users/1/followings").await, vec![2]);
        assert_eq!(user_ids(&server, "/api/v1/users/2/followers").await, vec![1]);
        assert!(user_ids(&server, "/api/v1/users/1/followers").await.is_empty());
        assert!(user_ids(&server, "/api/v1/users/2/followings").await.is_empty());
    }

    #[tokio::test]
    async fn test_follow_twice_keeps_one_following() {
        let server = setup_server().await;

        server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 2 })
            .await
            .assert_status(StatusCode::CREATED);
        let response = server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 2 })
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<UserResponse> = response.json();
        assert_eq!(body.message, "User already followed");
        assert_eq!(user_ids(&server, "/api/v1/users/2/followers").await, vec![1]);
    }

    #[tokio::test]
    async fn test_follow_unknown_users() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 999 })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "USER_NOT_FOUND");

        server
            .post("/api/v1/users/999/followings")
            .json(&FollowRequest { user_id: 1 })
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/api/v1/users/999/followers")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_set_followings_replaces_the_set() {
        let server = setup_server().await;
        let carol = create_user(&server, "carol").await;

        server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 2 })
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put("/api/v1/users/1/followings")
            .json(&SetFollowingsRequest { user_ids: vec![carol] })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<UserResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].username, "carol");
        assert!(user_ids(&server, "/api/v1/users/2/followers").await.is_empty());

        // an empty set is allowed
        server
            .put("/api/v1/users/1/followings")
            .json(&SetFollowingsRequest { user_ids: vec![] })
            .await
            .assert_status(StatusCode::OK);
        assert!(user_ids(&server, "/api/v1/users/1/followings").await.is_empty());

        let response = server
            .put("/api/v1/users/1/followings")
            .json(&SetFollowingsRequest { user_ids: vec![2, 999] })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(user_ids(&server, "/api/v1/users/1/followings").await.is_empty());
    }

    #[tokio::test]
    async fn test_unfollow() {
        let server = setup_server().await;

        server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 2 })
            .await
            .assert_status(StatusCode::CREATED);

        server
            .delete("/api/v1/users/1/followings/2")
            .await
            .assert_status(StatusCode::OK);
        assert!(user_ids(&server, "/api/v1/users/2/followers").await.is_empty());

        let response = server.delete("/api/v1/users/1/followings/2").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "FOLLOWING_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_deleting_user_removes_followings() {
        let server = setup_server().await;

        server
            .post("/api/v1/users/1/followings")
            .json(&FollowRequest { user_id: 2 })
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/users/2/followings")
            .json(&FollowRequest { user_id: 1 })
            .await
            .assert_status(StatusCode::CREATED);

        server.delete("/api/v1/users/2").await.assert_status(StatusCode::OK);

        assert!(user_ids(&server, "/api/v1/users/1/followings").await.is_empty());
        assert!(user_ids(&server, "/api/v1/users/1/followers").await.is_empty());
    }

    #[tokio::test]
    async fn test_admin_index() {
        let server = setup_server().await;

        let response = server.get("/admin").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["site_name"], "MovieClub administration");
        let apps = body.data["apps"].as_array().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0]["app_label"], "movies");
        assert_eq!(apps[0]["models"][0]["model_name"], "genre");
        assert_eq!(apps[0]["models"][1]["model_name"], "movie");
        assert_eq!(apps[0]["models"][1]["url"], "/admin/movies/movie");
        assert_eq!(apps[0]["models"][1]["list_display"], json!(["title", "genre"]));
    }

    #[tokio::test]
    async fn test_admin_movie_list_columns() {
        let server = setup_server().await;

        let response = server.get("/admin/movies/movie").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        let list = &body.data;
        assert_eq!(
            list["columns"],
            json!([
                { "field": "title", "label": "Title" },
                { "field": "genre", "label": "Genre" }
            ])
        );
        assert_eq!(list["count"], 1);
        assert_eq!(list["results"][0]["values"], json!(["The Third Man", "Noir"]));

        let response = server.get("/admin/movies/genre").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["columns"], json!([{ "field": "name", "label": "Name" }]));
        assert_eq!(body.data["results"][0]["values"], json!(["Noir"]));
    }

    #[tokio::test]
    async fn test_admin_list_pagination() {
        let server = setup_server().await;

        for name in ["Drama", "Western"] {
            server
                .post("/admin/movies/genre")
                .json(&json!({ "name": name }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/admin/movies/genre")
            .add_query_param("page", 2)
            .add_query_param("page_size", 2)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["count"], 3);
        assert_eq!(body.data["total_pages"], 2);
        assert_eq!(body.data["page"], 2);
        assert_eq!(body.data["results"], json!([{ "pk": 3, "values": ["Western"] }]));

        server
            .get("/admin/movies/genre")
            .add_query_param("page", 0)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_create_update_delete_movie() {
        let server = setup_server().await;

        let response = server
            .post("/admin/movies/movie")
            .json(&json!({ "title": "Rififi", "genre_id": 1 }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["title"], "Rififi");
        assert_eq!(body.data["genre"], "Noir");
        let movie_id = body.data["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/admin/movies/movie/{}", movie_id))
            .json(&json!({ "title": "Du rififi chez les hommes" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["title"], "Du rififi chez les hommes");
        assert_eq!(body.data["genre_id"], 1);

        let response = server.get(&format!("/admin/movies/movie/{}", movie_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["title"], "Du rififi chez les hommes");

        server
            .delete(&format!("/admin/movies/movie/{}", movie_id))
            .await
            .assert_status(StatusCode::OK);
        server
            .get(&format!("/admin/movies/movie/{}", movie_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_rejects_invalid_data() {
        let server = setup_server().await;

        // genre_id is required
        let response = server
            .post("/admin/movies/movie")
            .json(&json!({ "title": "Rififi" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "INVALID_DATA");

        // unknown genre
        server
            .post("/admin/movies/movie")
            .json(&json!({ "title": "Rififi", "genre_id": 999 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/admin/movies/genre")
            .json(&json!(["Noir"]))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/admin/movies/genre")
            .json(&json!({ "name": "Noir" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_admin_unknown_model_and_object() {
        let server = setup_server().await;

        let response = server.get("/admin/movies/actor").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "MODEL_NOT_FOUND");

        // users are not registered on the admin site
        server.get("/admin/accounts/user").await.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/admin/movies/movie/999").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "OBJECT_NOT_FOUND");

        server
            .delete("/admin/movies/genre/999")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let server = setup_server().await;

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let doc: Value = response.json();
        assert_eq!(doc["info"]["title"], "MovieClub API");
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/users/{user_id}/followings"));
        assert!(paths.contains_key("/admin/{app_label}/{model_name}"));
    }
}
