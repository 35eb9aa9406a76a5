// Operator tool: register an identity and print its API token.
//
//   issue_token <email>
//
// Uses DATABASE_URL like the server does.

use anyhow::Context;

use social_media_api::{
    config::Config,
    infrastructure::{database::SocialDatabase, identity::register_identity},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let email = std::env::args()
        .nth(1)
        .context("usage: issue_token <email>")?;

    let config = Config::from_env()?;
    if let Some(dir) = config.database.parent_dir() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let db = SocialDatabase::connect(&config.database).await?;
    let (identity, token) = register_identity(&db, &email).await?;

    tracing::info!("registered user {} <{}>", identity.user_id, identity.email);
    println!("{}", token);
    Ok(())
}
