//! Role- and ownership-based visibility.
//!
//! | Role        | Ratings on store S | Own ratings | Store aggregates     |
//! |-------------|--------------------|-------------|----------------------|
//! | admin       | any S              | yes         | all stores           |
//! | store_owner | only owned S       | yes         | owned stores only    |
//! | user        | no                 | yes         | all, without raters  |
//!
//! Every read path asks this module for a scope value instead of comparing
//! roles itself.

use std::collections::BTreeSet;

use crate::{
    db::Directory,
    errors::AppError,
    models::{
        Identity, Rating, Role, Store,
        rating::RatingFilter,
        store::{StoreFilter, StoreId},
    },
};

/// Proof that the holder may list the individual ratings of one store.
/// Only [`authorize_store_ratings`] hands these out.
#[derive(Debug, Clone)]
pub struct StoreRatingsGrant {
    store: Store,
}

impl StoreRatingsGrant {
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn rating_filter(&self) -> RatingFilter {
        RatingFilter::Store(self.store.id)
    }
}

/// Which stores' aggregates a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateScope {
    Global,
    Stores(BTreeSet<StoreId>),
}

impl AggregateScope {
    pub fn permits(&self, store_id: StoreId) -> bool {
        match self {
            AggregateScope::Global => true,
            AggregateScope::Stores(ids) => ids.contains(&store_id),
        }
    }

    pub fn rating_filter(&self) -> RatingFilter {
        match self {
            AggregateScope::Global => RatingFilter::All,
            AggregateScope::Stores(ids) => RatingFilter::Stores(ids.iter().copied().collect()),
        }
    }

    pub fn store_filter(&self, identity: &Identity) -> StoreFilter {
        match self {
            AggregateScope::Global => StoreFilter::default(),
            AggregateScope::Stores(_) => StoreFilter::owned_by(identity.id),
        }
    }
}

/// Whether rater identities may accompany rating rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaterVisibility {
    Full,
    Hidden,
}

pub fn validate_id(id: i64, what: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::InvalidArgument(format!("Invalid {what} id: {id}")));
    }
    Ok(())
}

fn require_role(identity: &Identity, role: Role) -> Result<(), AppError> {
    if identity.role != role {
        tracing::warn!(
            "Denied {} {} access reserved for {}",
            identity.role,
            identity.id,
            role
        );
        return Err(AppError::Forbidden(
            "Access denied. Insufficient permissions.".into(),
        ));
    }
    Ok(())
}

pub fn require_admin(identity: &Identity) -> Result<(), AppError> {
    require_role(identity, Role::Admin)
}

pub fn require_store_owner(identity: &Identity) -> Result<(), AppError> {
    require_role(identity, Role::StoreOwner)
}

/// Only plain users rate stores and receive recommendations.
pub fn require_user(identity: &Identity) -> Result<(), AppError> {
    require_role(identity, Role::User)
}

pub fn own_ratings(identity: &Identity) -> RatingFilter {
    RatingFilter::Rater(identity.id)
}

pub fn rater_visibility(identity: &Identity) -> RaterVisibility {
    match identity.role {
        Role::Admin | Role::StoreOwner => RaterVisibility::Full,
        Role::User => RaterVisibility::Hidden,
    }
}

/// Existence is confirmed before ownership, so a missing store is reported
/// as `NotFound` even to callers who could not have read it.
pub async fn authorize_store_ratings(
    directory: &dyn Directory,
    identity: &Identity,
    store_id: StoreId,
) -> Result<StoreRatingsGrant, AppError> {
    validate_id(store_id, "store")?;

    let store = directory
        .store(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))?;

    match identity.role {
        Role::Admin => Ok(StoreRatingsGrant { store }),
        Role::StoreOwner if store.is_owned_by(identity.id) => Ok(StoreRatingsGrant { store }),
        Role::StoreOwner => {
            tracing::warn!(
                "Store owner {} denied ratings of store {}",
                identity.id,
                store_id
            );
            Err(AppError::Forbidden(
                "You can only view ratings for your own stores".into(),
            ))
        }
        Role::User => Err(AppError::Forbidden("Access denied".into())),
    }
}

pub async fn aggregate_scope(
    directory: &dyn Directory,
    identity: &Identity,
) -> Result<AggregateScope, AppError> {
    match identity.role {
        Role::Admin | Role::User => Ok(AggregateScope::Global),
        Role::StoreOwner => {
            let owned = directory
                .stores(&StoreFilter::owned_by(identity.id))
                .await?
                .into_iter()
                .map(|store| store.id)
                .collect();
            Ok(AggregateScope::Stores(owned))
        }
    }
}

/// A rating may be removed by its rater or by an admin.
pub fn authorize_rating_delete(identity: &Identity, rating: &Rating) -> Result<(), AppError> {
    if identity.is_admin() || rating.rater_id == identity.id {
        return Ok(());
    }

    tracing::warn!(
        "{} {} denied deleting rating {} by {}",
        identity.role,
        identity.id,
        rating.id,
        rating.rater_id
    );
    Err(AppError::Forbidden(
        "You can only delete your own ratings".into(),
    ))
}
