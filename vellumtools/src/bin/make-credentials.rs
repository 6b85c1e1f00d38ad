// Generate a credential pair: <name>.priv with the full key material and
// <name>.pub with the public halves only.

use tracing::{error, info};
use vellum::identity::Identity;

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("credential generation failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "client".to_string());
    let identity = Identity::generate();

    let private_path = format!("{name}.priv");
    let public_path = format!("{name}.pub");
    identity.write_private_file(&private_path)?;
    identity.write_public_file(&public_path)?;

    info!(
        artifact_id = %identity.artifact_id(),
        %private_path,
        %public_path,
        "credentials written"
    );
    Ok(())
}
