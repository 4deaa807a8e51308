//! Registration and sign-in.

use std::sync::Arc;

use domains::{DomainError, PasswordHasher, Result, TokenService, User, UserRepository};

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self { users, hasher, tokens }
    }

    /// Creates a `Read` user. The repository still enforces uniqueness, so a
    /// concurrent registration that slips past the pre-check also fails.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        if username.is_empty() {
            return Err(DomainError::validation("`username` is required"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("`password` is required"));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::username_taken());
        }

        let hash = self.hasher.hash(password).await?;
        let user = self.users.insert(User::new(username, hash)).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignIn> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::warn!("sign-in for unknown user");
            return Err(DomainError::invalid_credentials());
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "sign-in with wrong password");
            return Err(DomainError::invalid_credentials());
        }

        let token = self.tokens.issue(&user)?;
        Ok(SignIn { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{HashedPassword, MockPasswordHasher, MockTokenService, MockUserRepository};
    use mockall::predicate::eq;

    fn stored_user() -> User {
        User::new("JohnDoe", HashedPassword::from_phc("$argon2id$hash"))
    }

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
        tokens: MockTokenService,
    ) -> AuthService {
        AuthService::new(Arc::new(users), Arc::new(hasher), Arc::new(tokens))
    }

    #[tokio::test]
    async fn register_hashes_before_insert() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|u| u.password_hash.as_str() == "$argon2id$hash" && u.username == "JohnDoe")
            .returning(Ok);

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .with(eq("123dev321"))
            .returning(|_| Ok(HashedPassword::from_phc("$argon2id$hash")));

        let svc = service(users, hasher, MockTokenService::new());
        let user = svc.register("JohnDoe", "123dev321").await.unwrap();
        assert_eq!(user.role, domains::Role::Read);
    }

    #[tokio::test]
    async fn register_rejects_taken_username_without_insert() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_user())));
        users.expect_insert().never();

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().never();

        let svc = service(users, hasher, MockTokenService::new());
        let err = svc.register("JohnDoe", "pw").await.unwrap_err();
        assert_eq!(err, DomainError::username_taken());
    }

    #[tokio::test]
    async fn register_requires_both_fields() {
        let svc = service(
            MockUserRepository::new(),
            MockPasswordHasher::new(),
            MockTokenService::new(),
        );
        assert!(matches!(
            svc.register("", "pw").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.register("bob", "").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn sign_in_failures_share_one_message() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .with(eq("ghost"))
            .returning(|_| Ok(None));
        users
            .expect_find_by_username()
            .with(eq("JohnDoe"))
            .returning(|_| Ok(Some(stored_user())));

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(false));

        let mut tokens = MockTokenService::new();
        tokens.expect_issue().never();

        let svc = service(users, hasher, tokens);
        let unknown = svc.sign_in("ghost", "pw").await.unwrap_err();
        let wrong = svc.sign_in("JohnDoe", "nope").await.unwrap_err();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown, DomainError::invalid_credentials());
    }

    #[tokio::test]
    async fn sign_in_issues_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_user())));

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().returning(|_, _| Ok(true));

        let mut tokens = MockTokenService::new();
        tokens
            .expect_issue()
            .withf(|u| u.username == "JohnDoe")
            .returning(|_| Ok("signed.jwt.token".to_string()));

        let svc = service(users, hasher, tokens);
        let signed_in = svc.sign_in("JohnDoe", "123dev321").await.unwrap();
        assert_eq!(signed_in.token, "signed.jwt.token");
        assert_eq!(signed_in.user.username, "JohnDoe");
    }
}
