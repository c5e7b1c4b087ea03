use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::users::{InsertUserEntity, UserEntity},
    value_objects::{
        addresses::Address,
        enums::roles::Role,
        validation::{ValidationError, ensure, ensure_not_blank},
    },
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// The authenticated caller every service operation acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<Address>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserEntity> for UserModel {
    type Error = anyhow::Error;

    fn try_from(entity: UserEntity) -> Result<Self, Self::Error> {
        let role = Role::from_str(&entity.role)
            .ok_or_else(|| anyhow!("user {} has unknown role {:?}", entity.id, entity.role))?;
        let address = Address::from_json(entity.address)
            .with_context(|| format!("user {} has an unreadable address", entity.id))?;

        Ok(Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            address,
            role,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserModel {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: Option<Address>,
}

impl RegisterUserModel {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_not_blank(&self.name, "name")?;
        ensure_not_blank(&self.phone, "phone")?;
        let email = self.normalized_email();
        ensure(
            email.contains('@') && !email.starts_with('@') && !email.ends_with('@'),
            "email is invalid",
        )?;
        ensure(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        )
    }

    pub fn to_entity(&self, password_hash: String) -> anyhow::Result<InsertUserEntity> {
        let now = Utc::now();
        Ok(InsertUserEntity {
            name: self.name.trim().to_string(),
            email: self.normalized_email(),
            password_hash,
            phone: self.phone.trim().to_string(),
            address: self.address.as_ref().map(Address::to_json).transpose()?,
            role: Role::User.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokenModel {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterUserModel {
        RegisterUserModel {
            name: "Asha".to_string(),
            email: "  Asha@Example.COM ".to_string(),
            password: "secret1".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: None,
        }
    }

    #[test]
    fn emails_are_trimmed_and_lower_cased() {
        let model = registration();
        assert_eq!(model.validate(), Ok(()));
        assert_eq!(
            model.to_entity("hash".to_string()).unwrap().email,
            "asha@example.com"
        );
    }

    #[test]
    fn new_accounts_are_plain_users() {
        let entity = registration().to_entity("hash".to_string()).unwrap();
        assert_eq!(entity.role, "user");
    }

    #[test]
    fn short_passwords_are_rejected() {
        let mut model = registration();
        model.password = "12345".to_string();
        assert!(model.validate().is_err());
    }

    fn stored_user(role: &str, address: Option<serde_json::Value>) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone: "+91 98765 43210".to_string(),
            address,
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_stored_role_is_not_downgraded() {
        assert!(UserModel::try_from(stored_user("superuser", None)).is_err());
        assert_eq!(
            UserModel::try_from(stored_user("admin", None)).unwrap().role,
            Role::Admin
        );
    }

    #[test]
    fn unreadable_stored_address_fails_to_load() {
        let user = stored_user("user", Some(serde_json::json!(true)));
        assert!(UserModel::try_from(user).is_err());
    }
}
