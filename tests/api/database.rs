//! Scenarios that need a migrated Postgres; run with `cargo test -- --ignored`.

use axum::http::StatusCode;
use novelmt_api::{
    db::{
        comment::{insert_comment, like_comment, report_comment, unlike_comment, unreport_comment},
        error::DatabaseError,
        genre::{insert_genre, update_genre},
        novel::{get_novel, insert_novel, toggle_favorite},
        reading_history::{get_reading_history, upsert_reading_history},
        user::{external_identity_login, get_user_entity_by_id, insert_user},
    },
    error::Error,
    model::{
        CommentReport, ExternalProfile, GenreChanges, HistoryEntry, NewComment, NewGenre,
        NewNovel, NewUser, NovelStatus, Role, User,
    },
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::helper::{AppStateTest, body_json, json_request};

fn new_novel(title: &str, genres: Vec<String>) -> NewNovel {
    NewNovel {
        title: title.to_string(),
        author: Some("Tester".to_string()),
        description: None,
        genres,
        cover_image: None,
        status: NovelStatus::Ongoing,
        views: 0,
        created_by: None,
    }
}

fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

async fn insert_reader(pool: &PgPool, full_name: &str, avatar: &str) -> User {
    let suffix = unique_suffix();

    insert_user(
        pool,
        NewUser {
            username: format!("reader_{}", suffix),
            email: format!("reader_{}@localhost", suffix),
            password: None,
            full_name: full_name.to_string(),
            avatar: avatar.to_string(),
            google_id: None,
        },
    )
    .await
    .unwrap()
}

fn new_comment(user_id: Uuid) -> NewComment {
    NewComment {
        novel_id: Uuid::new_v4(),
        chapter_id: None,
        parent_id: None,
        user_id,
        user_name: "reader".to_string(),
        user_avatar: String::new(),
        content: "Great chapter".to_string(),
        rating: 4,
    }
}

#[tokio::test]
#[ignore]
async fn register_twice_should_conflict() {
    let test_state = AppStateTest::with_database().await;
    let suffix = Uuid::new_v4().simple().to_string();
    let body = json!({
        "username": format!("user_{}", &suffix[..8]),
        "email": format!("{}@localhost", suffix),
        "password": "password"
    });

    let response = test_state
        .generate_response(json_request("POST", "/auth/register", None, body.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["user"]["role"], "user");
    assert!(created["token"].is_string());
    assert!(created["user"].get("password").is_none());

    let response = test_state
        .generate_response(json_request("POST", "/auth/register", None, body))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn favorite_toggle_twice_should_restore_novel() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;
    let user_id = Uuid::new_v4();

    let novel = insert_novel(pool, new_novel("Toggle", vec![])).await.unwrap();

    let (liked, favorited) = toggle_favorite(pool, novel.id, user_id).await.unwrap();
    assert!(favorited);
    assert_eq!(liked.likes, 1);
    assert_eq!(liked.favorited_by, vec![user_id]);

    let (restored, favorited) = toggle_favorite(pool, novel.id, user_id).await.unwrap();
    assert!(!favorited);
    assert_eq!(restored.likes, 0);
    assert!(restored.favorited_by.is_empty());
}

#[tokio::test]
#[ignore]
async fn genre_rename_should_cascade_to_novels() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let old_name = format!("Old {}", &suffix[..8]);
    let new_name = format!("New {}", &suffix[..8]);

    let genre = insert_genre(
        pool,
        NewGenre {
            name: old_name.clone(),
            slug: format!("old-{}", &suffix[..8]),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    let novel = insert_novel(pool, new_novel("Cascade", vec![old_name, "Drama".to_string()]))
        .await
        .unwrap();
    let untouched = insert_novel(pool, new_novel("Bystander", vec!["Drama".to_string()]))
        .await
        .unwrap();

    let renamed = update_genre(
        pool,
        genre.id,
        GenreChanges {
            name: Some(new_name.clone()),
            slug: None,
            description: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, new_name);

    let novel = get_novel(pool, novel.id).await.unwrap();
    assert_eq!(novel.genres, vec![new_name, "Drama".to_string()]);

    let bystander = get_novel(pool, untouched.id).await.unwrap();
    assert_eq!(bystander.genres, vec!["Drama".to_string()]);
    assert_eq!(bystander.updated_at, untouched.updated_at);
}

#[tokio::test]
#[ignore]
async fn comment_author_fields_should_come_from_the_user_record() {
    let test_state = AppStateTest::with_database().await;
    let author = insert_reader(&test_state.app_state.pool, "Ada Reader", "/covers/ada.png").await;
    let token = test_state.token_for(&author);

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/comments",
            Some(&token),
            json!({
                "content": "Loved it",
                "novelId": Uuid::new_v4(),
                "userName": "Someone Else",
                "userAvatar": "/covers/fake.png"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let comment = body_json(response).await;
    assert_eq!(comment["userId"], author.id.to_string());
    assert_eq!(comment["userName"], "Ada Reader");
    assert_eq!(comment["userAvatar"], "/covers/ada.png");
    assert_eq!(comment["reported"], false);
}

#[tokio::test]
#[ignore]
async fn comment_author_fields_should_come_from_the_request_without_a_user_record() {
    let test_state = AppStateTest::with_database().await;
    let (user, token) = test_state.generate_jwt(Role::User);

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/comments",
            Some(&token),
            json!({
                "content": "First!",
                "novelId": Uuid::new_v4(),
                "userName": "Guest Reader",
                "userAvatar": "/covers/guest.png"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let comment = body_json(response).await;
    assert_eq!(comment["userId"], user.id.to_string());
    assert_eq!(comment["userName"], "Guest Reader");
    assert_eq!(comment["userAvatar"], "/covers/guest.png");
}

#[tokio::test]
#[ignore]
async fn comment_likes_and_reports_should_persist() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;
    let reader = Uuid::new_v4();

    let comment = insert_comment(pool, new_comment(Uuid::new_v4())).await.unwrap();

    let liked = like_comment(pool, comment.id, reader).await.unwrap();
    assert_eq!(liked.likes, vec![reader]);
    let liked = like_comment(pool, comment.id, reader).await.unwrap();
    assert_eq!(liked.likes, vec![reader]);

    let unliked = unlike_comment(pool, comment.id, reader).await.unwrap();
    assert!(unliked.likes.is_empty());

    let spam = CommentReport::new(reader, Some("Spam".to_string()));
    let reported = report_comment(pool, comment.id, spam.clone()).await.unwrap();
    assert!(reported.is_reported());
    let reported = report_comment(pool, comment.id, spam).await.unwrap();
    assert_eq!(reported.reports.len(), 1);
    assert_eq!(reported.reports[0].reason, "Spam");

    let cleared = unreport_comment(pool, comment.id).await.unwrap();
    assert!(!cleared.is_reported());
    assert_eq!(cleared.content, "Great chapter");
}

#[tokio::test]
#[ignore]
async fn liking_a_missing_comment_should_be_not_found() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;

    let result = like_comment(pool, Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(
        result,
        Err(Error::Database(DatabaseError::NotFound("Comment")))
    ));
}

#[tokio::test]
#[ignore]
async fn history_add_twice_should_keep_one_entry_per_novel() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;
    let user_id = Uuid::new_v4();
    let novel_id = Uuid::new_v4();
    let entry = |chapter_id: Uuid, chapter_title: &str| HistoryEntry {
        novel_id,
        chapter_id,
        chapter_title: Some(chapter_title.to_string()),
        novel_title: Some("The Long Road".to_string()),
        novel_cover: None,
    };

    let first = upsert_reading_history(pool, user_id, entry(Uuid::new_v4(), "Chapter 1"))
        .await
        .unwrap();
    let next_chapter = Uuid::new_v4();
    let second = upsert_reading_history(pool, user_id, entry(next_chapter, "Chapter 2"))
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.chapter_id, next_chapter);
    assert!(second.last_read > first.last_read);

    let history = get_reading_history(pool, user_id, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].chapter_title.as_deref(), Some("Chapter 2"));
}

#[tokio::test]
#[ignore]
async fn external_login_should_link_an_existing_email() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;
    let existing = insert_reader(pool, "Ada Reader", "/covers/ada.png").await;
    let profile = ExternalProfile {
        provider_id: format!("google-{}", unique_suffix()),
        email: existing.email.clone(),
        display_name: Some("Ada G.".to_string()),
        avatar: Some("https://lh3.example.com/ada.jpg".to_string()),
    };

    let linked = external_identity_login(pool, &profile).await.unwrap();
    assert_eq!(linked.id, existing.id);
    assert_eq!(linked.google_id.as_deref(), Some(profile.provider_id.as_str()));
    assert_eq!(linked.avatar, "/covers/ada.png");
    assert_eq!(linked.full_name, "Ada Reader");

    let again = external_identity_login(pool, &profile).await.unwrap();
    assert_eq!(again.id, existing.id);
}

#[tokio::test]
#[ignore]
async fn external_login_should_create_a_passwordless_account() {
    let test_state = AppStateTest::with_database().await;
    let pool = &test_state.app_state.pool;
    let suffix = unique_suffix();
    let profile = ExternalProfile {
        provider_id: format!("google-{}", suffix),
        email: format!("newcomer{}@gmail.com", suffix),
        display_name: Some("New Comer".to_string()),
        avatar: Some("https://lh3.example.com/new.jpg".to_string()),
    };

    let created = external_identity_login(pool, &profile).await.unwrap();
    assert!(created.username.starts_with(&format!("newcomer{}_", suffix)));
    assert_eq!(created.email, profile.email);
    assert_eq!(created.full_name, "New Comer");
    assert_eq!(created.avatar, "https://lh3.example.com/new.jpg");
    assert_eq!(created.role, Role::User);
    assert_eq!(created.google_id.as_deref(), Some(profile.provider_id.as_str()));

    let entity = get_user_entity_by_id(pool, created.id).await.unwrap().unwrap();
    assert!(entity.password.is_none());
}
