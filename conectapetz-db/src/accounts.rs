use crate::{
    client::{DbClient, DbError, StorageKey},
    record::UserRecord,
};
use conectapetz_common::{
    feed::Feed,
    model::{
        Id, ModelValidationError,
        auth::{Credential, PasswordHash, PasswordHashingError},
        user::{Email, Login, Profile, ProfileUpdate, Registration, User, UserName},
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("This e-mail is already registered")]
    EmailTaken,
    #[error("Wrong e-mail or password")]
    InvalidCredentials,
    #[error("No user is logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<PasswordHashingError> for AccountError {
    fn from(value: PasswordHashingError) -> Self {
        AccountError::Database(value.into())
    }
}

fn require_password(password: &str) -> Result<&str, ModelValidationError> {
    if password.is_empty() {
        Err(ModelValidationError::Blank("password"))
    } else {
        Ok(password)
    }
}

impl DbClient {
    /// Stored users. An unreadable list is an error, so nothing overwrites it.
    async fn user_records(&self) -> Result<Vec<UserRecord>, DbError> {
        self.try_get(StorageKey::Users)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn set_current_user(&self, profile: &Profile) -> Result<(), DbError> {
        self.try_set(StorageKey::CurrentUser, profile).await
    }

    /// The logged-in user, if any.
    pub async fn current_user(&self) -> Option<Profile> {
        self.get(StorageKey::CurrentUser).await
    }

    /// The public profile of whoever uses `email`.
    pub async fn user_by_email(&self, email: &str) -> Option<Profile> {
        let records = match self.user_records().await {
            Ok(records) => records,
            Err(err) => {
                warn!(email, error = %err, "Stored users are unreadable");
                return None;
            }
        };
        let record = records.into_iter().find(|record| record.email == email)?;

        match User::try_from(record) {
            Ok(user) => Some(Profile::from(&user)),
            Err(err) => {
                warn!(email, error = %err, "Stored user is invalid");
                None
            }
        }
    }

    /// Creates the account and logs it in.
    pub async fn register(&self, registration: &Registration) -> Result<Profile, AccountError> {
        let name = UserName::new(&registration.name).map_err(ModelValidationError::from)?;
        let email = Email::new(&registration.email).map_err(ModelValidationError::from)?;
        let password = require_password(&registration.password)?;

        let mut ids = self.write_lock().await;
        let mut records = self.user_records().await?;
        if records.iter().any(|record| record.email == email.get()) {
            return Err(AccountError::EmailTaken);
        }

        let user = User {
            id: Id::generate(&mut ids),
            name,
            email,
            credential: Credential::Hashed(PasswordHash::generate(password)?),
            avatar: None,
        };
        records.push(UserRecord::from(&user));
        self.try_set(StorageKey::Users, &records).await?;

        let profile = Profile::from(&user);
        self.set_current_user(&profile).await?;

        info!(user = %user.id, "Registered user");
        Ok(profile)
    }

    /// Checks the credentials and logs the user in. A plaintext password left
    /// over from older records is replaced by its hash.
    pub async fn login(&self, login: &Login) -> Result<Profile, AccountError> {
        let _guard = self.write_lock().await;
        let mut records = self.user_records().await?;
        let email = login.email.trim();

        let Some(index) = records.iter().position(|record| record.email == email) else {
            return Err(AccountError::InvalidCredentials);
        };
        let mut user = match User::try_from(records[index].clone()) {
            Ok(user) => user,
            Err(err) => {
                warn!(email, error = %err, "Stored user is invalid, refusing login");
                return Err(AccountError::InvalidCredentials);
            }
        };
        if !user.credential.verify(&login.password)? {
            return Err(AccountError::InvalidCredentials);
        }

        if user.credential.is_legacy() {
            user.credential = Credential::Hashed(PasswordHash::generate(&login.password)?);
            records[index] = UserRecord::from(&user);
            if self.set(StorageKey::Users, &records).await {
                debug!(user = %user.id, "Upgraded plaintext password");
            }
        }

        let profile = Profile::from(&user);
        self.set_current_user(&profile).await?;
        Ok(profile)
    }

    pub async fn logout(&self) -> bool {
        self.remove(StorageKey::CurrentUser).await
    }

    /// Updates the profile of `current`. When the e-mail changes, authorship and
    /// reactions in the feed move along with it.
    pub async fn update_profile(
        &self,
        current: &Profile,
        update: ProfileUpdate,
    ) -> Result<Profile, AccountError> {
        let name = UserName::new(&update.name).map_err(ModelValidationError::from)?;
        let email = Email::new(&update.email).map_err(ModelValidationError::from)?;
        let avatar = update
            .avatar
            .map(|avatar| avatar.validate().map_err(ModelValidationError::from))
            .transpose()?;
        let password = update
            .password
            .as_deref()
            .map(str::trim)
            .filter(|password| !password.is_empty());

        let _guard = self.write_lock().await;
        let mut records = self.user_records().await?;
        let old_email = current.email.get();

        let Some(index) = records.iter().position(|record| record.email == old_email) else {
            return Err(AccountError::NotLoggedIn);
        };
        if email.get() != old_email && records.iter().any(|record| record.email == email.get()) {
            return Err(AccountError::EmailTaken);
        }

        let mut user = User::try_from(records[index].clone())?;
        user.name = name;
        user.email = email;
        user.avatar = avatar;
        if let Some(password) = password {
            user.credential = Credential::Hashed(PasswordHash::generate(password)?);
        }

        records[index] = UserRecord::from(&user);
        self.try_set(StorageKey::Users, &records).await?;
        let profile = Profile::from(&user);
        self.set_current_user(&profile).await?;

        if user.email.get() != old_email
            && let Some(mut feed) = self.get::<Feed>(StorageKey::Posts).await
            && feed.rename_user(old_email, user.email.get())
        {
            self.try_set(StorageKey::Posts, &feed).await?;
            info!(user = %user.id, "Moved feed activity to new e-mail");
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        accounts::AccountError,
        client::{StorageKey, tests::memory_client},
    };
    use conectapetz_common::{
        feed::Feed,
        model::{
            ModelValidationError,
            post::CreatePost,
            user::{AvatarUpload, Login, Profile, ProfileUpdate, Registration},
        },
        reaction::ReactionKind,
    };

    fn registration(name: &str, email: &str, password: &str) -> Registration {
        Registration {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    fn login(email: &str, password: &str) -> Login {
        Login {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    fn update(name: &str, email: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_owned(),
            email: email.to_owned(),
            password: None,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn registering_logs_in_and_hashes() {
        let client = memory_client().await;

        let profile = client
            .register(&registration("Ana", "ana@x.com", "pw123"))
            .await
            .unwrap();

        assert!(profile.id.as_str().starts_with("user-"));
        assert_eq!(client.current_user().await, Some(profile));
        let stored = client.get_raw(StorageKey::Users).await.unwrap().unwrap();
        assert!(!stored.contains("pw123"));
        assert!(stored.contains("passwordHash"));
    }

    #[tokio::test]
    async fn duplicate_and_invalid_registrations_fail() {
        let client = memory_client().await;
        client
            .register(&registration("Ana", "ana@x.com", "pw123"))
            .await
            .unwrap();

        assert!(matches!(
            client.register(&registration("Outra", "ana@x.com", "x")).await,
            Err(AccountError::EmailTaken)
        ));
        assert!(matches!(
            client.register(&registration("Bia", "bia@x", "x")).await,
            Err(AccountError::Validation(ModelValidationError::Email(_)))
        ));
        assert!(matches!(
            client.register(&registration("Bia", "bia@x.com", "")).await,
            Err(AccountError::Validation(ModelValidationError::Blank("password")))
        ));
        assert!(matches!(
            client.register(&registration(" ", "bia@x.com", "x")).await,
            Err(AccountError::Validation(ModelValidationError::UserName(_)))
        ));
    }

    #[tokio::test]
    async fn login_and_logout() {
        let client = memory_client().await;
        client
            .register(&registration("Ana", "ana@x.com", "pw123"))
            .await
            .unwrap();
        assert!(client.logout().await);
        assert_eq!(client.current_user().await, None);

        assert!(matches!(
            client.login(&login("ana@x.com", "nope")).await,
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            client.login(&login("bia@x.com", "pw123")).await,
            Err(AccountError::InvalidCredentials)
        ));

        let profile = client.login(&login("ana@x.com", "pw123")).await.unwrap();
        assert_eq!(profile.name.get(), "Ana");
        assert_eq!(client.current_user().await, Some(profile));
    }

    #[tokio::test]
    async fn legacy_plaintext_is_upgraded_on_login() {
        let client = memory_client().await;
        client
            .set_raw(
                StorageKey::Users,
                r#"[{"id": "1730000000000", "name": "Ana", "email": "ana@x.com", "password": "pw123"}]"#,
            )
            .await
            .unwrap();

        let profile = client.login(&login("ana@x.com", "pw123")).await.unwrap();
        assert_eq!(profile.id.as_str(), "1730000000000");

        let stored = client.get_raw(StorageKey::Users).await.unwrap().unwrap();
        assert!(!stored.contains("pw123"));
        assert!(client.logout().await);
        assert!(client.login(&login("ana@x.com", "pw123")).await.is_ok());
    }

    #[tokio::test]
    async fn long_stored_names_can_still_log_in() {
        let client = memory_client().await;
        let name = "Associação Protetora dos Animais de São Paulo e Região Metropolitana";
        client
            .set_raw(
                StorageKey::Users,
                &format!(r#"[{{"name": "{name}", "email": "apa@x.com", "password": "pw123"}}]"#),
            )
            .await
            .unwrap();

        let profile = client.login(&login("apa@x.com", "pw123")).await.unwrap();

        assert_eq!(profile.name.get(), name);
        assert_eq!(client.current_user().await, Some(profile.clone()));
        assert_eq!(client.user_by_email("apa@x.com").await, Some(profile));
    }

    #[tokio::test]
    async fn unreadable_users_are_never_overwritten() {
        let client = memory_client().await;
        let raw = r#"[{"name": "Ana", "email": 7}]"#;
        client.set_raw(StorageKey::Users, raw).await.unwrap();

        assert!(matches!(
            client.register(&registration("Bia", "bia@x.com", "pw123")).await,
            Err(AccountError::Database(_))
        ));
        assert!(matches!(
            client.login(&login("ana@x.com", "pw123")).await,
            Err(AccountError::Database(_))
        ));
        assert_eq!(client.user_by_email("bia@x.com").await, None);

        assert_eq!(client.get_raw(StorageKey::Users).await.unwrap().as_deref(), Some(raw));
        assert_eq!(client.current_user().await, None);
    }

    #[tokio::test]
    async fn profile_updates_validate_and_protect_emails() {
        let client = memory_client().await;
        client
            .register(&registration("Bia", "bia@x.com", "pw"))
            .await
            .unwrap();
        let ana = client
            .register(&registration("Ana", "ana@x.com", "pw123"))
            .await
            .unwrap();

        assert!(matches!(
            client.update_profile(&ana, update("Ana", "bia@x.com")).await,
            Err(AccountError::EmailTaken)
        ));

        let mut with_pdf_avatar = update("Ana", "ana@x.com");
        with_pdf_avatar.avatar = Some(AvatarUpload {
            url: "blob:a".to_owned(),
            mime_type: "application/pdf".to_owned(),
            size: 10,
        });
        assert!(matches!(
            client.update_profile(&ana, with_pdf_avatar).await,
            Err(AccountError::Validation(ModelValidationError::Avatar(_)))
        ));

        let mut renamed = update("Ana Maria", "ana@x.com");
        renamed.password = Some("  ".to_owned());
        let profile = client.update_profile(&ana, renamed).await.unwrap();
        assert_eq!(profile.name.get(), "Ana Maria");
        assert_eq!(client.current_user().await, Some(profile));
        assert!(client.login(&login("ana@x.com", "pw123")).await.is_ok());
    }

    #[tokio::test]
    async fn password_changes_when_given() {
        let client = memory_client().await;
        let ana = client
            .register(&registration("Ana", "ana@x.com", "pw123"))
            .await
            .unwrap();

        let mut change = update("Ana", "ana@x.com");
        change.password = Some(" novo ".to_owned());
        client.update_profile(&ana, change).await.unwrap();

        assert!(client.login(&login("ana@x.com", "pw123")).await.is_err());
        assert!(client.login(&login("ana@x.com", "novo")).await.is_ok());
    }

    #[tokio::test]
    async fn email_change_moves_feed_activity() {
        let client = memory_client().await;
        let ana = client
            .register(&registration("Ana", "ana@x.com", "pw123"))
            .await
            .unwrap();
        let post_id = client
            .create_post(
                &ana,
                CreatePost {
                    title: "Olá".to_owned(),
                    summary: String::new(),
                    body: "Mundo".to_owned(),
                    attachment: None,
                },
            )
            .await
            .unwrap()
            .outcome
            .changed()
            .unwrap();
        let _ = client.add_comment(&ana, post_id.as_str(), "Oi").await;
        let _ = client
            .toggle_reaction(&ana, post_id.as_str(), ReactionKind::Love)
            .await;

        let moved: Profile = client
            .update_profile(&ana, update("Ana", "ana@y.com"))
            .await
            .unwrap();
        assert_eq!(moved.email.get(), "ana@y.com");

        let feed: Feed = client.get(StorageKey::Posts).await.unwrap();
        let post = feed.post(post_id.as_str()).unwrap();
        assert!(post.author.is("ana@y.com"));
        assert!(post.comments[0].is_authored_by("ana@y.com"));
        assert_eq!(
            feed.user_reaction(post_id.as_str(), "ana@y.com"),
            Some(ReactionKind::Love)
        );
        assert_eq!(client.user_by_email("ana@x.com").await, None);
        assert_eq!(client.user_by_email("ana@y.com").await, Some(moved));
    }
}
