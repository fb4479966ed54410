use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{COMMENT_ID_LEN, POST_ID_LEN, USER_ID_LEN};
use crate::core::errors::ApiError;
use crate::core::helpers::{new_id, now};
use crate::models::models::{Comment, Post, User};

/// The whole dataset as one document. Relationships are id references
/// between the three sibling collections, so integrity checks happen at
/// every mutation boundary rather than falling out of the structure.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Db {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

impl Db {
    /// Starter data written on first load: two users following each other,
    /// a post from each (liked by the other), and a comment on each post.
    pub fn seed() -> Db {
        let now = now();
        Db {
            users: vec![
                User {
                    id: "u1".to_string(),
                    name: "Alex".to_string(),
                    avatar: "https://i.pravatar.cc/150?img=5".to_string(),
                    bio: "Frontend tinkerer".to_string(),
                    followers: vec!["u2".to_string()],
                    following: vec!["u2".to_string()],
                },
                User {
                    id: "u2".to_string(),
                    name: "Jamie".to_string(),
                    avatar: "https://i.pravatar.cc/150?img=3".to_string(),
                    bio: "Back-end enthusiast".to_string(),
                    followers: vec!["u1".to_string()],
                    following: vec!["u1".to_string()],
                },
            ],
            posts: vec![
                Post {
                    id: "p1".to_string(),
                    user_id: "u1".to_string(),
                    content: "First post on ripple, say hi!".to_string(),
                    image: String::new(),
                    created_at: now,
                    likes: vec!["u2".to_string()],
                },
                Post {
                    id: "p2".to_string(),
                    user_id: "u2".to_string(),
                    content: "Storage layer is up, feed next.".to_string(),
                    image: String::new(),
                    created_at: now,
                    likes: vec!["u1".to_string()],
                },
            ],
            comments: vec![
                Comment {
                    id: "c1".to_string(),
                    post_id: "p1".to_string(),
                    user_id: "u2".to_string(),
                    text: "Hi from the other side".to_string(),
                    created_at: now,
                },
                Comment {
                    id: "c2".to_string(),
                    post_id: "p2".to_string(),
                    user_id: "u1".to_string(),
                    text: "Nice, ship it".to_string(),
                    created_at: now,
                },
            ],
        }
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    fn fresh_user_id(&self) -> String {
        loop {
            let id = new_id(USER_ID_LEN);
            if self.user(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_post_id(&self) -> String {
        loop {
            let id = new_id(POST_ID_LEN);
            if self.post(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_comment_id(&self) -> String {
        loop {
            let id = new_id(COMMENT_ID_LEN);
            if !self.comments.iter().any(|c| c.id == id) {
                return id;
            }
        }
    }

    /// Callers validate input first; inserts only assign the id and append.
    pub fn insert_user(&mut self, name: String, avatar: String, bio: String) -> User {
        let user = User {
            id: self.fresh_user_id(),
            name,
            avatar,
            bio,
            followers: Vec::new(),
            following: Vec::new(),
        };
        self.users.push(user.clone());
        user
    }

    pub fn insert_post(&mut self, user_id: String, content: String, image: String) -> Post {
        let post = Post {
            id: self.fresh_post_id(),
            user_id,
            content,
            image,
            created_at: now(),
            likes: Vec::new(),
        };
        self.posts.push(post.clone());
        post
    }

    pub fn insert_comment(&mut self, post_id: String, user_id: String, text: String) -> Comment {
        let comment = Comment {
            id: self.fresh_comment_id(),
            post_id,
            user_id,
            text,
            created_at: now(),
        };
        self.comments.push(comment.clone());
        comment
    }

    /// Removes a post and every comment attached to it.
    pub fn remove_post(&mut self, id: &str) -> Option<Post> {
        let idx = self.posts.iter().position(|p| p.id == id)?;
        let post = self.posts.remove(idx);
        self.comments.retain(|c| c.post_id != id);
        Some(post)
    }

    /// Removes a user together with everything that references them: their
    /// follow edges on both endpoints, their posts (and those posts'
    /// comments), their comments elsewhere, and their likes.
    pub fn remove_user(&mut self, id: &str) -> Option<User> {
        let idx = self.users.iter().position(|u| u.id == id)?;
        let user = self.users.remove(idx);

        for other in &mut self.users {
            other.followers.retain(|f| f != id);
            other.following.retain(|f| f != id);
        }

        let authored: Vec<String> = self
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id.clone())
            .collect();
        for post_id in authored {
            self.remove_post(&post_id);
        }

        self.comments.retain(|c| c.user_id != id);
        for post in &mut self.posts {
            post.likes.retain(|l| l != id);
        }

        Some(user)
    }
}

/// Snapshot persistence. Every request loads the full dataset and every
/// mutation writes it back; there is no cache between requests.
pub trait Store: Send + Sync {
    fn load(&self) -> anyhow::Result<Db>;
    fn save(&self, db: &Db) -> anyhow::Result<()>;
}

/// One pretty-printed JSON file on disk, seeded on first load.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Store for FileStore {
    fn load(&self) -> anyhow::Result<Db> {
        if !self.path.exists() {
            let db = Db::seed();
            self.save(&db)
                .with_context(|| format!("seeding {}", self.path.display()))?;
            info!(path = %self.path.display(), "created data file with starter data");
            return Ok(db);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save(&self, db: &Db) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(db).context("serializing snapshot")?;
        fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
    }
}

/// In-memory stand-in for FileStore. Keeps the serialized form so load/save
/// round-trip through JSON exactly like the file-backed store.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> anyhow::Result<Db> {
        let mut slot = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        match slot.as_deref() {
            Some(raw) => serde_json::from_str(raw).context("parsing in-memory snapshot"),
            None => {
                let db = Db::seed();
                *slot = Some(serde_json::to_string_pretty(&db)?);
                Ok(db)
            }
        }
    }

    fn save(&self, db: &Db) -> anyhow::Result<()> {
        let mut slot = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        *slot = Some(serde_json::to_string_pretty(db)?);
        Ok(())
    }
}

/// Shared handle over the store. The mutex serializes whole
/// load-check-mutate-save cycles, so two concurrent mutations cannot race
/// each other into a lost write.
pub struct AppState {
    store: Box<dyn Store>,
    gate: Mutex<()>,
}

impl AppState {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Box::new(store),
            gate: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, ApiError> {
        self.gate
            .lock()
            .map_err(|_| ApiError::Storage("state lock poisoned".to_string()))
    }

    pub fn read<T>(&self, op: impl FnOnce(&Db) -> Result<T, ApiError>) -> Result<T, ApiError> {
        let _guard = self.lock()?;
        let db = self.store.load()?;
        op(&db)
    }

    /// Runs the operation against a fresh snapshot and persists it only on
    /// success. A failed precondition drops the snapshot unsaved, so it
    /// never mutates stored state.
    pub fn write<T>(&self, op: impl FnOnce(&mut Db) -> Result<T, ApiError>) -> Result<T, ApiError> {
        let _guard = self.lock()?;
        let mut db = self.store.load()?;
        let out = op(&mut db)?;
        self.store.save(&db)?;
        Ok(out)
    }
}
