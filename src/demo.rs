//! A small users service described entirely by route contracts.
//!
//! The contracts here are shared by the `server` binary (through
//! [`routes`]) and by clients calling it through a
//! [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! | Method | Path                 | Declared results          |
//! |--------|----------------------|---------------------------|
//! | GET    | `/users/{id}`        | 200 `User`, 404           |
//! | PUT    | `/users/{id}`        | 200 `User`, 404           |
//! | DELETE | `/users/{id}`        | 200 `Deleted`, 404        |
//! | POST   | `/users/{id}/posts`  | 201 `Post`, 404           |
//!
//! Creating a post with an empty title fails with a plain error, which
//! clients see as the generic 500.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures::future::{ready, Ready};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::binder::{bind, RouteTable};
use crate::error::HandlerError;
use crate::response::HttpResult;
use crate::route::RouteContract;
use crate::schema::{self, Schema};
use crate::template::UrlTemplate;

/// Path parameters of every users route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserParams {
    pub id: String,
}

impl UserParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: String,
}

/// 404 body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFound {
    pub error: String,
}

/// Body of a route that either finds its resource or answers 404.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lookup<T> {
    Found(T),
    Missing(NotFound),
}

pub type LookupResult<T> = HttpResult<Lookup<T>>;

/// `code` with a `T` body, or 404 with a [`NotFound`] body.
fn found_or_missing<T>(code: u16) -> Schema<LookupResult<T>>
where
    T: DeserializeOwned + 'static,
{
    let found = schema::status::<Lookup<T>>(code).refine(|v| T::deserialize(&v["body"]).is_ok());
    let missing =
        schema::status::<Lookup<T>>(404).refine(|v| NotFound::deserialize(&v["body"]).is_ok());
    found.or(missing)
}

static USER_PATH: Lazy<UrlTemplate> =
    Lazy::new(|| UrlTemplate::parse("/users/{id}").expect("valid users template"));

static POSTS_PATH: Lazy<UrlTemplate> =
    Lazy::new(|| UrlTemplate::parse("/users/{id}/posts").expect("valid posts template"));

fn users_path() -> UrlTemplate {
    USER_PATH.clone()
}

pub fn get_user() -> RouteContract<UserParams, LookupResult<User>> {
    RouteContract::get(users_path(), found_or_missing(200))
}

pub fn update_user() -> RouteContract<UserParams, LookupResult<User>, UpdateUser> {
    RouteContract::put(users_path(), found_or_missing(200), schema::object())
}

pub fn delete_user() -> RouteContract<UserParams, LookupResult<Deleted>, ()> {
    RouteContract::delete(users_path(), found_or_missing(200), schema::empty_body())
}

pub fn create_post() -> RouteContract<UserParams, LookupResult<Post>, NewPost> {
    RouteContract::post(POSTS_PATH.clone(), found_or_missing(201), schema::object())
}

/// In-memory backing store for the demo service.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    posts: Arc<RwLock<Vec<Post>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.users.write() {
            map.extend(users.into_iter().map(|u| (u.id.clone(), u)));
        }
        store
    }

    pub fn post_count(&self) -> usize {
        self.posts.read().map(|p| p.len()).unwrap_or(0)
    }

    fn find(&self, id: &str) -> Result<LookupResult<User>, HandlerError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let user = users.get(id).cloned().ok_or_else(|| missing(id))?;
        Ok(HttpResult::new(200, Lookup::Found(user)))
    }

    fn rename(&self, id: &str, update: UpdateUser) -> Result<LookupResult<User>, HandlerError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let user = users.get_mut(id).ok_or_else(|| missing(id))?;
        user.name = update.name;
        Ok(HttpResult::new(200, Lookup::Found(user.clone())))
    }

    fn remove(&self, id: &str) -> Result<LookupResult<Deleted>, HandlerError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.remove(id).ok_or_else(|| missing(id))?;
        if let Ok(mut posts) = self.posts.write() {
            posts.retain(|p| p.author != id);
        }
        Ok(HttpResult::new(
            200,
            Lookup::Found(Deleted {
                deleted: id.to_string(),
            }),
        ))
    }

    fn add_post(&self, author: &str, new: NewPost) -> Result<LookupResult<Post>, HandlerError> {
        if new.title.trim().is_empty() {
            return Err(HandlerError::msg("Post title must not be empty"));
        }
        if !self.users.read().map_err(|_| poisoned())?.contains_key(author) {
            return Err(missing(author));
        }

        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        let post = Post {
            id: format!("p{}", posts.len() + 1),
            author: author.to_string(),
            title: new.title,
        };
        posts.push(post.clone());
        log::info!("user {} created post {}", author, post.id);
        Ok(HttpResult::new(201, Lookup::Found(post)))
    }
}

fn missing(id: &str) -> HandlerError {
    HandlerError::respond(HttpResult::new(
        404,
        NotFound {
            error: format!("No user with id {}", id),
        },
    ))
}

fn poisoned() -> HandlerError {
    HandlerError::msg("user store lock poisoned")
}

type Handled<R> = Ready<Result<R, HandlerError>>;

/// Bind every users route to `store`.
pub fn routes(store: UserStore) -> RouteTable {
    let (s1, s2, s3, s4) = (store.clone(), store.clone(), store.clone(), store);

    RouteTable::new()
        .route(bind(
            get_user(),
            move |p: UserParams, _: Option<()>| -> Handled<_> { ready(s1.find(&p.id)) },
        ))
        .route(bind(
            update_user(),
            move |p: UserParams, body: Option<UpdateUser>| -> Handled<_> {
                ready(match body {
                    Some(update) => s2.rename(&p.id, update),
                    None => Err(HandlerError::msg("missing request body")),
                })
            },
        ))
        .route(bind(
            delete_user(),
            move |p: UserParams, _: Option<()>| -> Handled<_> { ready(s3.remove(&p.id)) },
        ))
        .route(bind(
            create_post(),
            move |p: UserParams, body: Option<NewPost>| -> Handled<_> {
                ready(match body {
                    Some(new) => s4.add_post(&p.id, new),
                    None => Err(HandlerError::msg("missing request body")),
                })
            },
        ))
}
