// Admin Demo - logs into a running API server and creates a listing through the property wizard

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use estate_backoffice::{
    client::{HttpTransport, ListQuery},
    config::Config,
    core::Resource,
    forms::{CompleteOutcome, PropertyForm, StepOutcome},
    models::FileItem,
    AdminShell,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let transport = Arc::new(HttpTransport::new(&config.client.api_base_url));
    let mut shell = AdminShell::new(transport, &config);

    let session = shell.login(&config.admin.email, &config.admin.password).await?;
    info!("Logged in as {} ({:?})", session.user.email, session.user.role);

    let wizard = shell
        .create_wizard::<PropertyForm>()
        .ok_or_else(|| anyhow::anyhow!("Properties cannot be created"))?;

    // Step 1: deliberately too short, to show step-local validation
    wizard.set_field("title", json!("Vila"));
    if let StepOutcome::Blocked(errors) = wizard.next() {
        for (path, message) in errors.iter() {
            warn!("{}: {}", path, message);
        }
    }

    let front = FileItem::new("/uploads/vila-front.jpg", "vila-front.jpg")
        .with_size(482_113)
        .with_type("image/jpeg");
    let garden = FileItem::new("/uploads/vila-garden.jpg", "vila-garden.jpg").with_type("image/jpeg");
    let main_image = garden.id.clone();

    let fields = [
        ("title", json!("Nádherná Vila u Brna")),
        ("description", json!("Family villa with a large garden, garage and a view of the valley.")),
        ("type", json!("VILLA")),
        ("region", json!("Jihomoravský kraj")),
        ("city", json!("Brno")),
        ("address", json!("Údolní 15, Brno")),
        ("price", json!("4200000")),
        ("bedrooms", json!(4)),
        ("bathrooms", json!(2)),
        ("size", json!(240)),
        ("amenities", json!(["garden", "garage", "garden"])),
        ("images", json!([front, garden])),
        ("mainImage", json!(main_image)),
    ];
    for (path, value) in fields {
        wizard.set_field(path, value);
    }

    loop {
        match wizard.next() {
            StepOutcome::Advanced(index) => {
                let title = wizard.current_step().map(|step| step.title).unwrap_or_default();
                info!("Step {}: {}", index + 1, title)
            }
            StepOutcome::Blocked(errors) => anyhow::bail!("Step blocked: {}", errors),
            StepOutcome::ReadyToSubmit | StepOutcome::NotOptional => break,
        }
    }

    match wizard.complete().await {
        CompleteOutcome::Submitted(record) => info!("Created property {}", record["id"]),
        CompleteOutcome::Invalid(errors) => warn!("Invalid property: {}", errors),
        CompleteOutcome::Failed(err) => warn!("Save failed: {}", err),
        CompleteOutcome::Ignored => warn!("Property already submitted"),
    }

    let page = shell.list(Resource::Properties, ListQuery::default()).await?;
    info!("{} properties on the server", page.pagination.total);

    for notification in shell.notifications().drain() {
        info!("[{:?}] {}", notification.level, notification.message);
    }

    Ok(())
}
