use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// Suffix appended to every derived nickname.
const NICKNAME_SUFFIX: &str = "붕";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub student_id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nickname: String,
    pub choice_type: String,
    pub topic: Option<String>,
}

impl User {
    pub async fn find_by_student_id(db: &PgPool, student_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, student_id, password_hash, nickname, choice_type, topic
            FROM users
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, student_id, password_hash, nickname, choice_type, topic
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user inside the caller's transaction so that mailbox
    /// provisioning can commit or roll back together with the insert.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        username: &str,
        student_id: &str,
        password_hash: &str,
        nickname: &str,
        choice_type: &str,
        topic: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, student_id, password_hash, nickname, choice_type, topic)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, student_id, password_hash, nickname, choice_type, topic
            "#,
        )
        .bind(username)
        .bind(student_id)
        .bind(password_hash)
        .bind(nickname)
        .bind(choice_type)
        .bind(topic)
        .fetch_one(&mut **tx)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, student_id, password_hash, nickname, choice_type, topic
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}

/// Check the externally maintained roster for a student ID.
pub async fn roster_contains(db: &PgPool, student_id: &str) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM quipu_students WHERE student_id = $1)",
    )
    .bind(student_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Given-name-first usernames: the trailing token is the surname and gets
/// dropped; a single-token name is kept whole. "길동 홍" becomes "길동붕".
pub fn derive_nickname(username: &str) -> String {
    let parts: Vec<&str> = username.split_whitespace().collect();
    match parts.split_last() {
        Some((_surname, given)) if !given.is_empty() => {
            format!("{}{}", given.concat(), NICKNAME_SUFFIX)
        }
        _ => format!("{}{}", username.trim(), NICKNAME_SUFFIX),
    }
}

/// Sample up to `n` users; fewer than `n` in the population means the whole
/// population comes back in random order.
pub fn sample_users(users: &[User], n: usize) -> Vec<&User> {
    let mut rng = rand::thread_rng();
    users.choose_multiple(&mut rng, n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.into(),
            student_id: format!("S{id}"),
            password_hash: "hash".into(),
            nickname: derive_nickname(username),
            choice_type: "A".into(),
            topic: None,
        }
    }

    #[test]
    fn nickname_drops_the_surname() {
        assert_eq!(derive_nickname("길동 홍"), "길동붕");
    }

    #[test]
    fn nickname_keeps_single_token_names_whole() {
        assert_eq!(derive_nickname("홍길동"), "홍길동붕");
    }

    #[test]
    fn nickname_joins_multi_token_given_names() {
        assert_eq!(derive_nickname("마리 앤 리"), "마리앤붕");
    }

    #[test]
    fn sample_clamps_to_population_size() {
        assert!(sample_users(&[], 2).is_empty());

        let one = vec![user(1, "a")];
        assert_eq!(sample_users(&one, 2).len(), 1);

        let two = vec![user(1, "a"), user(2, "b")];
        assert_eq!(sample_users(&two, 2).len(), 2);

        let five: Vec<User> = (1..=5).map(|i| user(i, "u")).collect();
        assert_eq!(sample_users(&five, 2).len(), 2);
    }

    #[test]
    fn sample_returns_distinct_users() {
        let five: Vec<User> = (1..=5).map(|i| user(i, "u")).collect();
        let picked = sample_users(&five, 2);
        assert_ne!(picked[0].id, picked[1].id);
    }

    #[test]
    fn password_hash_never_serializes() {
        let json = serde_json::to_string(&user(1, "길동 홍")).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hash"));
    }
}
