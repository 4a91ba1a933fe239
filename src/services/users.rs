use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{addresses, users};
use crate::errors::ApiError;
use crate::models::address::{Address, CreateAddressRequest, UpdateAddressRequest};
use crate::models::user::{UpdateProfileRequest, UserDto};

pub struct UserService;

impl UserService {
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<UserDto, ApiError> {
        users::find_by_id(pool, user_id)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<UserDto, ApiError> {
        users::update_profile(
            pool,
            user_id,
            req.first_name.as_deref(),
            req.last_name.as_deref(),
        )
        .await?
        .map(UserDto::from)
        .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn list_addresses(pool: &PgPool, user_id: Uuid) -> Result<Vec<Address>, ApiError> {
        Ok(addresses::list_for_user(pool, user_id).await?)
    }

    pub async fn create_address(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateAddressRequest,
    ) -> Result<Address, ApiError> {
        if req.is_default == Some(true) {
            addresses::clear_default(pool, user_id).await?;
        }
        Ok(addresses::create(pool, user_id, req).await?)
    }

    pub async fn update_address(
        pool: &PgPool,
        user_id: Uuid,
        address_id: Uuid,
        req: &UpdateAddressRequest,
    ) -> Result<Address, ApiError> {
        Self::owned_address(pool, user_id, address_id).await?;
        if req.is_default == Some(true) {
            addresses::clear_default(pool, user_id).await?;
        }
        Ok(addresses::update(pool, address_id, req).await?)
    }

    pub async fn delete_address(
        pool: &PgPool,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<(), ApiError> {
        Self::owned_address(pool, user_id, address_id).await?;
        addresses::delete(pool, address_id).await?;
        Ok(())
    }

    /// NotFound when the address is absent, Forbidden when it belongs to
    /// someone else.
    async fn owned_address(
        pool: &PgPool,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<Address, ApiError> {
        let address = addresses::find_by_id(pool, address_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Address not found"))?;
        if address.user_id != user_id {
            return Err(ApiError::Forbidden("You do not own this address".into()));
        }
        Ok(address)
    }

    // Admin

    pub async fn list_all(pool: &PgPool) -> Result<Vec<UserDto>, ApiError> {
        let all = users::list_all(pool).await?;
        Ok(all.into_iter().map(UserDto::from).collect())
    }

    pub async fn get_by_id(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<(UserDto, Vec<Address>), ApiError> {
        let user = users::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let addresses = addresses::list_for_user(pool, user_id).await?;
        Ok((user.into(), addresses))
    }
}
