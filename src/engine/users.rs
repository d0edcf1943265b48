//! Account listings for administrators.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::{
    engine::{
        aggregation::{owner_average, owner_averages},
        scope,
    },
    errors::AppError,
    models::{
        Identity, Role, User,
        page::{Page, PageRequest, SortOrder},
        rating::RatingFilter,
        store::StoreFilter,
        user::{UserId, UserListing},
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSortKey {
    #[default]
    Name,
    Email,
    Role,
    CreatedAt,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    #[serde(default)]
    pub sort_by: UserSortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl UserListQuery {
    fn matches(&self, user: &User) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_deref()
                .map(str::trim)
                .filter(|needle| !needle.is_empty())
                .is_none_or(|needle| haystack.to_lowercase().contains(&needle.to_lowercase()))
        };

        contains(&user.name, &self.name)
            && contains(&user.email, &self.email)
            && self.role.is_none_or(|role| user.role == role)
    }
}

fn compare(a: &User, b: &User, key: UserSortKey) -> Ordering {
    match key {
        UserSortKey::Name => a.name.cmp(&b.name),
        UserSortKey::Email => a.email.cmp(&b.email),
        UserSortKey::Role => a.role.as_str().cmp(&b.role.as_str()),
        UserSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

pub async fn list_users(
    state: &AppState,
    identity: &Identity,
    query: UserListQuery,
    page: PageRequest,
) -> Result<Page<UserListing>, AppError> {
    scope::require_admin(identity)?;
    page.validate()?;

    let all_stores = StoreFilter::default();
    let all_ratings = RatingFilter::All;
    let (users, stores, ratings) = futures::try_join!(
        state.directory.users(),
        state.directory.stores(&all_stores),
        state.ratings.list(&all_ratings),
    )?;

    let mut users: Vec<User> = users.into_iter().filter(|user| query.matches(user)).collect();
    users.sort_by(|a, b| {
        query
            .sort_order
            .apply(compare(a, b, query.sort_by))
            .then_with(|| a.id.cmp(&b.id))
    });

    let averages = owner_averages(&stores, &ratings);
    let listings = users
        .into_iter()
        .map(|user| {
            let average_rating = (user.role == Role::StoreOwner)
                .then(|| averages.get(&user.id).copied().unwrap_or_default());
            UserListing {
                user,
                average_rating,
            }
        })
        .collect();

    page.paginate(listings)
}

pub async fn get_user(
    state: &AppState,
    identity: &Identity,
    user_id: UserId,
) -> Result<UserListing, AppError> {
    scope::require_admin(identity)?;
    scope::validate_id(user_id, "user")?;

    let user = state
        .directory
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.role != Role::StoreOwner {
        return Ok(UserListing {
            user,
            average_rating: None,
        });
    }

    let owned = StoreFilter::owned_by(user.id);
    let all_ratings = RatingFilter::All;
    let (stores, ratings) = futures::try_join!(
        state.directory.stores(&owned),
        state.ratings.list(&all_ratings),
    )?;

    let average_rating = Some(owner_average(user.id, &stores, &ratings));
    Ok(UserListing {
        user,
        average_rating,
    })
}
