use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Local;

use crate::{
    cli::{create_progress_bar, SyncArgs},
    config::SyncConfig,
    credentials::{CredentialPresence, Netrc},
    remote::HttpRemote,
    sync::Syncer,
};

pub async fn sync(args: &SyncArgs) -> Result<String> {
    if !args.skip_credential_check {
        ensure_credentials(&Netrc::from_home())?;
    }

    let config = SyncConfig::from(args);
    let today = Local::now().date_naive();

    let bar = create_progress_bar(0, "Downloading station files".to_string());
    let syncer = Syncer::new(config, Arc::new(HttpRemote::new())).with_progress_bar(bar);
    let stats = syncer.run(today).await?;

    Ok(stats.to_string())
}

fn ensure_credentials(credentials: &impl CredentialPresence) -> Result<()> {
    if !credentials.is_present() {
        bail!("Unable to run because no .netrc file is detected. Please create one for Earthdata login");
    }

    Ok(())
}

// -- Tests -------------------------------------------------------------------
