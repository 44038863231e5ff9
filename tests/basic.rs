use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;

use estate_backoffice::{
    api::create_router,
    app_state::AppState,
    client::{ClientError, HttpTransport, ListQuery},
    config::Config,
    core::{EntityId, Resource},
    forms::{BlogPostForm, CompleteOutcome, StepOutcome},
    AdminShell,
};

async fn spawn_server(config: &Config) -> String {
    let state = AppState::new(config.clone()).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_blog_post_wizard_over_http() {
    let config = Config::default();
    let base_url = spawn_server(&config).await;
    let mut shell = AdminShell::new(Arc::new(HttpTransport::new(base_url)), &config);

    shell
        .login(&config.admin.email, &config.admin.password)
        .await
        .unwrap();

    let wizard = shell.create_wizard::<BlogPostForm>().unwrap();
    wizard.set_field("title", json!("Nové byty v Praze"));
    assert_eq!(wizard.value("slug"), Some(json!("nov-byty-v-praze")));
    wizard.set_field("excerpt", json!("Developers opened three new projects."));
    wizard.set_field(
        "content",
        json!("Three residential projects in Prague opened sales this month, adding four hundred flats."),
    );
    assert_eq!(wizard.next(), StepOutcome::Advanced(1));

    wizard.set_field("category", json!("Market"));
    wizard.set_field("tags", json!("prague, new builds, prague"));
    assert_eq!(wizard.next(), StepOutcome::Advanced(2));
    assert_eq!(wizard.skip(), StepOutcome::ReadyToSubmit);

    let record = match wizard.complete().await {
        CompleteOutcome::Submitted(record) => record,
        other => panic!("expected Submitted, got {:?}", other),
    };
    let id = EntityId(record["id"].as_i64().unwrap());
    assert_eq!(record["tags"], json!(["prague", "new builds"]));

    let page = shell
        .list(Resource::BlogPosts, ListQuery::default().search("praze"))
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.data[0]["id"], record["id"]);

    // A second post with the same slug is rejected by the server
    let duplicate = shell.create_wizard::<BlogPostForm>().unwrap();
    for (path, value) in record.as_object().unwrap() {
        duplicate.set_field(path, value.clone());
    }
    assert!(matches!(
        duplicate.complete().await,
        CompleteOutcome::Failed(ClientError::Conflict(_))
    ));

    shell.delete(Resource::BlogPosts, id).await.unwrap();
    let missing = shell.edit_wizard::<BlogPostForm>(id).await;
    assert!(matches!(missing, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let config = Config::default();
    let shell = AdminShell::new(Arc::new(HttpTransport::new("http://127.0.0.1:9")), &config);
    let result = shell.list(Resource::Properties, ListQuery::default()).await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
    assert_eq!(shell.notifications().len(), 1);
}
