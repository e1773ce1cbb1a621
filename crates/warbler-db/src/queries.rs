use std::collections::HashSet;

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;
use uuid::Uuid;

use warbler_types::DEFAULT_IMAGE_URL;
use warbler_types::models::ProfileStats;

use crate::error::classify_user_conflict;
use crate::models::{MessageRow, NewUser, ProfileUpdate, UserRow};
use crate::{Database, Result, StoreError};

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.image_url, u.header_image_url, u.bio, u.location, u.password, u.created_at";

const MESSAGE_COLUMNS: &str = "m.id, m.text, m.user_id, u.username, u.image_url, m.created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, new: &NewUser<'_>) -> Result<UserRow> {
        let id = new.id.to_string();
        let image_url = new
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_URL);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, image_url) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, new.username, new.email, new.password_hash, image_url],
            )
            .map_err(classify_user_conflict)?;

            query_user_by_id(conn, &id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, &id.to_string()))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            Ok(conn.query_row(&sql, [username], user_from_row).optional()?)
        })
    }

    /// All users, or only those whose username contains `query` when it is
    /// non-empty. Matching is a case-sensitive substring test.
    pub fn search_users(&self, query: Option<&str>) -> Result<Vec<UserRow>> {
        let needle = query.map(str::trim).filter(|q| !q.is_empty());

        self.with_conn(|conn| {
            let rows = match needle {
                Some(needle) => {
                    let sql = format!(
                        "SELECT {USER_COLUMNS} FROM users u
                         WHERE instr(u.username, ?1) > 0
                         ORDER BY u.username"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt
                        .query_map([needle], user_from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                None => {
                    let sql = format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.username");
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt
                        .query_map([], user_from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };
            Ok(rows)
        })
    }

    pub fn update_user(&self, id: Uuid, update: &ProfileUpdate<'_>) -> Result<UserRow> {
        let id = id.to_string();

        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE users
                     SET username = ?2, email = ?3, image_url = ?4, header_image_url = ?5,
                         bio = ?6, location = ?7
                     WHERE id = ?1",
                    params![
                        id,
                        update.username,
                        update.email,
                        update.image_url,
                        update.header_image_url,
                        update.bio,
                        update.location
                    ],
                )
                .map_err(classify_user_conflict)?;

            if changed == 0 {
                return Err(StoreError::NotFound);
            }
            query_user_by_id(conn, &id)?.ok_or(StoreError::NotFound)
        })
    }

    /// Delete an account. Messages, likes and follow edges in both
    /// directions go with it through the cascade rules.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let id = id.to_string();
        self.with_tx(|tx| {
            let removed = tx.execute("DELETE FROM users WHERE id = ?1", [&id])?;
            Ok(removed > 0)
        })
    }

    /// Clear every table, children first, in one transaction.
    pub fn reset(&self) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute_batch(
                "DELETE FROM likes;
                 DELETE FROM follows;
                 DELETE FROM messages;
                 DELETE FROM users;",
            )?;
            Ok(())
        })
    }

    pub fn profile_stats(&self, user_id: Uuid) -> Result<ProfileStats> {
        let id = user_id.to_string();
        self.with_conn(|conn| {
            Ok(ProfileStats {
                messages: count(conn, "SELECT COUNT(*) FROM messages WHERE user_id = ?1", &id)?,
                following: count(conn, "SELECT COUNT(*) FROM follows WHERE follower_id = ?1", &id)?,
                followers: count(conn, "SELECT COUNT(*) FROM follows WHERE followee_id = ?1", &id)?,
                likes: count(conn, "SELECT COUNT(*) FROM likes WHERE user_id = ?1", &id)?,
            })
        })
    }

    // -- Follows --

    /// Add the edge `follower -> followee`. Returns false when the edge was
    /// already present or the two ids are the same user.
    pub fn follow(&self, follower: Uuid, followee: Uuid) -> Result<bool> {
        if follower == followee {
            return Ok(false);
        }

        let inserted = self.with_conn(|conn| {
            Ok(conn.execute(
                "INSERT OR IGNORE INTO follows (follower_id, followee_id) VALUES (?1, ?2)",
                params![follower.to_string(), followee.to_string()],
            )?)
        })?;

        debug!("follow {} -> {} (inserted: {})", follower, followee, inserted > 0);
        Ok(inserted > 0)
    }

    /// Remove the edge `follower -> followee`; the reverse edge is untouched.
    pub fn unfollow(&self, follower: Uuid, followee: Uuid) -> Result<bool> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                params![follower.to_string(), followee.to_string()],
            )?)
        })?;

        debug!("unfollow {} -> {} (removed: {})", follower, followee, removed > 0);
        Ok(removed > 0)
    }

    /// Does `user` follow `other`?
    pub fn is_following(&self, user: Uuid, other: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2)",
                params![user.to_string(), other.to_string()],
                |row| row.get(0),
            )?)
        })
    }

    /// Is `user` followed by `other`?
    pub fn is_followed_by(&self, user: Uuid, other: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM follows WHERE followee_id = ?1 AND follower_id = ?2)",
                params![user.to_string(), other.to_string()],
                |row| row.get(0),
            )?)
        })
    }

    /// Accounts `user` follows.
    pub fn following(&self, user: Uuid) -> Result<Vec<UserRow>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM follows f
             JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = ?1
             ORDER BY u.username"
        );
        self.with_conn(|conn| query_users(conn, &sql, &user.to_string()))
    }

    /// Accounts following `user`.
    pub fn followers(&self, user: Uuid) -> Result<Vec<UserRow>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = ?1
             ORDER BY u.username"
        );
        self.with_conn(|conn| query_users(conn, &sql, &user.to_string()))
    }

    // -- Likes --

    pub fn like(&self, user: Uuid, message: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![user.to_string(), message.to_string()],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn unlike(&self, user: Uuid, message: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                params![user.to_string(), message.to_string()],
            )?;
            Ok(removed > 0)
        })
    }

    /// Toggle a like: removes if it exists, inserts if not.
    /// Returns true when the like was added.
    pub fn toggle_like(&self, user: Uuid, message: Uuid) -> Result<bool> {
        let (uid, mid) = (user.to_string(), message.to_string());

        let added = self.with_tx(|tx| {
            let removed = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                params![uid, mid],
            )?;
            if removed > 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![uid, mid],
            )?;
            Ok(true)
        })?;

        debug!("toggle like {} on {} (added: {})", user, message, added);
        Ok(added)
    }

    /// Number of messages `user` has liked.
    pub fn get_number_of_likes(&self, user: Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM likes WHERE user_id = ?1", &user.to_string())
        })
    }

    /// Messages `user` has liked, most recently posted first.
    pub fn liked_messages(&self, user: Uuid) -> Result<Vec<MessageRow>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM likes l
             JOIN messages m ON m.id = l.message_id
             JOIN users u ON u.id = m.user_id
             WHERE l.user_id = ?1
             ORDER BY m.created_at DESC, m.rowid DESC"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user.to_string()], message_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn liked_message_ids(&self, user: Uuid) -> Result<HashSet<Uuid>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT message_id FROM likes WHERE user_id = ?1")?;
            let ids = stmt
                .query_map([user.to_string()], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids.iter().filter_map(|id| id.parse().ok()).collect())
        })
    }

    // -- Messages --

    pub fn insert_message(&self, id: Uuid, author: Uuid, text: &str) -> Result<MessageRow> {
        let id = id.to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, text, user_id) VALUES (?1, ?2, ?3)",
                params![id, text, author.to_string()],
            )?;
            query_message_by_id(conn, &id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn get_message(&self, id: Uuid) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message_by_id(conn, &id.to_string()))
    }

    /// Delete a message if `author` wrote it. Its likes cascade.
    pub fn delete_message(&self, id: Uuid, author: Uuid) -> Result<bool> {
        self.with_tx(|tx| {
            let removed = tx.execute(
                "DELETE FROM messages WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), author.to_string()],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn user_messages(&self, user: Uuid, limit: u32) -> Result<Vec<MessageRow>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m
             JOIN users u ON u.id = m.user_id
             WHERE m.user_id = ?1
             ORDER BY m.created_at DESC, m.rowid DESC
             LIMIT ?2"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user.to_string(), limit], message_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Latest messages written by `user` or by anyone `user` follows.
    pub fn home_feed(&self, user: Uuid, limit: u32) -> Result<Vec<MessageRow>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m
             JOIN users u ON u.id = m.user_id
             WHERE m.user_id = ?1
                OR m.user_id IN (SELECT followee_id FROM follows WHERE follower_id = ?1)
             ORDER BY m.created_at DESC, m.rowid DESC
             LIMIT ?2"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user.to_string(), limit], message_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        image_url: row.get(3)?,
        header_image_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        password: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        user_id: row.get(2)?,
        author_username: row.get(3)?,
        author_image_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    Ok(conn.query_row(&sql, [id], user_from_row).optional()?)
}

fn query_users(conn: &Connection, sql: &str, id: &str) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([id], user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn query_message_by_id(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages m
         JOIN users u ON u.id = m.user_id
         WHERE m.id = ?1"
    );
    Ok(conn.query_row(&sql, [id], message_from_row).optional()?)
}

fn count(conn: &Connection, sql: &str, id: &str) -> Result<u64> {
    let n: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(u64::try_from(n).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_user(db: &Database, username: &str) -> Uuid {
        let email = format!("{username}@test.com");
        db.create_user(&NewUser {
            id: Uuid::new_v4(),
            username,
            email: &email,
            password_hash: "HASHED_PASSWORD",
            image_url: None,
        })
        .unwrap()
        .id
        .parse()
        .unwrap()
    }

    fn add_message(db: &Database, author: Uuid, text: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.insert_message(id, author, text).unwrap();
        id
    }

    #[test]
    fn test_user_model() {
        let db = Database::open_in_memory().unwrap();
        let row = db
            .create_user(&NewUser {
                id: Uuid::new_v4(),
                username: "testuser",
                email: "test@test.com",
                password_hash: "HASHED_PASSWORD",
                image_url: Some(""),
            })
            .unwrap();
        let id: Uuid = row.id.parse().unwrap();

        assert_eq!(row.username, "testuser");
        assert_eq!(row.email, "test@test.com");
        assert_eq!(row.password, "HASHED_PASSWORD");
        assert_eq!(row.image_url, DEFAULT_IMAGE_URL);
        assert!(row.bio.is_none());

        // New users have no messages and no followers
        let stats = db.profile_stats(id).unwrap();
        assert_eq!(stats, ProfileStats::default());

        let updated = db
            .update_user(
                id,
                &ProfileUpdate {
                    username: "testuser",
                    email: "test@test.com",
                    image_url: "https://example.com/bird.jpg",
                    header_image_url: "https://example.com/chicken.png",
                    bio: Some("I'm a bird and it's always the word!"),
                    location: Some("The Chicken Coop, SF"),
                },
            )
            .unwrap();
        assert_eq!(updated.image_url, "https://example.com/bird.jpg");
        assert_eq!(updated.header_image_url, "https://example.com/chicken.png");
        assert_eq!(updated.bio.as_deref(), Some("I'm a bird and it's always the word!"));
        assert_eq!(updated.location.as_deref(), Some("The Chicken Coop, SF"));
    }

    #[test]
    fn test_duplicate_username_and_email() {
        let db = Database::open_in_memory().unwrap();
        add_user(&db, "edward");

        let err = db
            .create_user(&NewUser {
                id: Uuid::new_v4(),
                username: "edward",
                email: "other@test.com",
                password_hash: "x",
                image_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));

        let err = db
            .create_user(&NewUser {
                id: Uuid::new_v4(),
                username: "eddie",
                email: "edward@test.com",
                password_hash: "x",
                image_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[test]
    fn test_is_followed_by() {
        let db = Database::open_in_memory().unwrap();
        let user1 = add_user(&db, "testuser");
        let user2 = add_user(&db, "testuser2");

        assert!(db.follow(user1, user2).unwrap());

        assert!(!db.is_followed_by(user1, user2).unwrap());
        assert!(db.is_followed_by(user2, user1).unwrap());
        assert!(db.is_following(user1, user2).unwrap());
        assert!(!db.is_following(user2, user1).unwrap());
    }

    #[test]
    fn test_is_following_reciprocal() {
        let db = Database::open_in_memory().unwrap();
        let user1 = add_user(&db, "testuser");
        let user2 = add_user(&db, "testuser2");

        db.follow(user1, user2).unwrap();
        db.follow(user2, user1).unwrap();

        assert!(db.is_following(user1, user2).unwrap());
        assert!(db.is_following(user2, user1).unwrap());
    }

    #[test]
    fn test_follow_is_idempotent_and_rejects_self() {
        let db = Database::open_in_memory().unwrap();
        let a = add_user(&db, "a_user");
        let b = add_user(&db, "b_user");

        assert!(db.follow(a, b).unwrap());
        assert!(!db.follow(a, b).unwrap()); // duplicate
        assert_eq!(db.followers(b).unwrap().len(), 1);

        assert!(!db.follow(a, a).unwrap());
        assert!(!db.is_following(a, a).unwrap());
    }

    #[test]
    fn test_unfollow_removes_one_direction() {
        let db = Database::open_in_memory().unwrap();
        let a = add_user(&db, "a_user");
        let b = add_user(&db, "b_user");
        db.follow(a, b).unwrap();
        db.follow(b, a).unwrap();

        assert!(db.unfollow(a, b).unwrap());
        assert!(!db.unfollow(a, b).unwrap());

        assert!(!db.is_following(a, b).unwrap());
        assert!(db.is_following(b, a).unwrap());
    }

    #[test]
    fn test_following_and_followers_lists() {
        let db = Database::open_in_memory().unwrap();
        let edward = add_user(&db, "edward");
        let juan = add_user(&db, "juan");
        let ana = add_user(&db, "ana");

        db.follow(edward, juan).unwrap();
        db.follow(edward, ana).unwrap();
        db.follow(ana, juan).unwrap();

        let names: Vec<String> = db.following(edward).unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["ana", "juan"]);

        let names: Vec<String> = db.followers(juan).unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["ana", "edward"]);

        let stats = db.profile_stats(juan).unwrap();
        assert_eq!(stats.followers, 2);
        assert_eq!(stats.following, 0);
    }

    #[test]
    fn test_get_number_of_likes() {
        let db = Database::open_in_memory().unwrap();
        let user1 = add_user(&db, "testuser");
        let user2 = add_user(&db, "testuser2");
        let msg = add_message(&db, user1, "testuser message here");

        assert_eq!(db.get_number_of_likes(user2).unwrap(), 0);

        assert!(db.like(user2, msg).unwrap());
        assert!(!db.like(user2, msg).unwrap()); // duplicate

        assert_eq!(db.get_number_of_likes(user2).unwrap(), 1);
        assert_eq!(db.get_number_of_likes(user2).unwrap(), 1);
        assert_eq!(db.get_number_of_likes(user1).unwrap(), 0);
    }

    #[test]
    fn test_toggle_like() {
        let db = Database::open_in_memory().unwrap();
        let user = add_user(&db, "testuser");
        let msg = add_message(&db, user, "liking my own message");

        assert!(db.toggle_like(user, msg).unwrap());
        assert!(db.liked_message_ids(user).unwrap().contains(&msg));
        assert_eq!(db.liked_messages(user).unwrap().len(), 1);

        assert!(!db.toggle_like(user, msg).unwrap());
        assert!(db.liked_message_ids(user).unwrap().is_empty());
        assert_eq!(db.get_number_of_likes(user).unwrap(), 0);
    }

    #[test]
    fn test_search_users() {
        let db = Database::open_in_memory().unwrap();
        add_user(&db, "edward");
        add_user(&db, "juan");

        let all = db.search_users(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(db.search_users(Some("  ")).unwrap().len(), 2);

        let hits = db.search_users(Some("ed")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "edward");

        assert!(db.search_users(Some("%")).unwrap().is_empty());
    }

    #[test]
    fn test_home_feed_includes_followed_only() {
        let db = Database::open_in_memory().unwrap();
        let edward = add_user(&db, "edward");
        let juan = add_user(&db, "juan");
        let ana = add_user(&db, "ana");

        add_message(&db, edward, "from edward");
        add_message(&db, juan, "from juan");
        add_message(&db, ana, "from ana");
        db.follow(edward, juan).unwrap();

        let feed: Vec<String> = db.home_feed(edward, 100).unwrap().into_iter().map(|m| m.text).collect();
        assert_eq!(feed.len(), 2);
        assert!(feed.contains(&"from edward".to_string()));
        assert!(feed.contains(&"from juan".to_string()));
        assert!(!feed.contains(&"from ana".to_string()));
    }

    #[test]
    fn test_delete_message_requires_author() {
        let db = Database::open_in_memory().unwrap();
        let edward = add_user(&db, "edward");
        let juan = add_user(&db, "juan");
        let msg = add_message(&db, edward, "hello");
        db.like(juan, msg).unwrap();

        assert!(!db.delete_message(msg, juan).unwrap());
        assert!(db.delete_message(msg, edward).unwrap());
        assert!(db.get_message(msg).unwrap().is_none());
        assert_eq!(db.get_number_of_likes(juan).unwrap(), 0);
    }

    #[test]
    fn test_delete_user_cascades() {
        let db = Database::open_in_memory().unwrap();
        let edward = add_user(&db, "edward");
        let juan = add_user(&db, "juan");
        let msg = add_message(&db, edward, "edward's message");
        let juans = add_message(&db, juan, "juan's message");

        db.follow(edward, juan).unwrap();
        db.follow(juan, edward).unwrap();
        db.like(juan, msg).unwrap();
        db.like(edward, juans).unwrap();

        assert!(db.delete_user(edward).unwrap());
        assert!(db.get_user_by_id(edward).unwrap().is_none());
        assert!(db.get_message(msg).unwrap().is_none());
        assert!(db.followers(juan).unwrap().is_empty());
        assert!(db.following(juan).unwrap().is_empty());
        assert_eq!(db.get_number_of_likes(juan).unwrap(), 0);
        assert!(!db.delete_user(edward).unwrap());
    }

    #[test]
    fn test_reset_clears_everything() {
        let db = Database::open_in_memory().unwrap();
        let edward = add_user(&db, "edward");
        let juan = add_user(&db, "juan");
        let msg = add_message(&db, edward, "hi");
        db.follow(juan, edward).unwrap();
        db.like(juan, msg).unwrap();

        db.reset().unwrap();

        assert!(db.search_users(None).unwrap().is_empty());
        assert!(db.get_message(msg).unwrap().is_none());
        assert_eq!(db.get_number_of_likes(juan).unwrap(), 0);
    }
}
