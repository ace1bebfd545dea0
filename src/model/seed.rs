use crate::{
    Config, auth,
    model::{
        CrudRepository, ModelManager,
        entity::{UserEntity, UserEntityCreateUpdate},
        error::DatabaseResult,
    },
    web::{AuthenticatedUser, UserRole},
};

/// Creates the admin account from the `[admin]` config section unless a user
/// with that name already exists.
#[tracing::instrument(skip_all)]
pub async fn bootstrap_admin(mm: &ModelManager, config: &Config) -> DatabaseResult<()> {
    let Some(admin) = config.admin() else {
        tracing::debug!("no [admin] section configured, skipping bootstrap");
        return Ok(());
    };

    let actor = AuthenticatedUser::admin();
    if UserEntity::find_by_username(mm, &actor, admin.username())
        .await?
        .is_some()
    {
        tracing::debug!("admin `{}` already exists, bootstrap skipped", admin.username());
        return Ok(());
    }

    let password_hash = auth::hash_password(admin.password())?;
    UserEntity::create(
        mm,
        &actor,
        UserEntityCreateUpdate {
            username: admin.username().to_string(),
            password_hash,
            role: UserRole::Admin,
        },
    )
    .await?;

    tracing::info!("admin `{}` bootstrapped", admin.username());
    Ok(())
}
