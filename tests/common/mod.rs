use std::net::SocketAddr;
use std::path::PathBuf;

use locale_hub::app::create_router;
use locale_hub::app_state::AppState;
use locale_hub::config::I18nConfig;
use locale_hub::i18n::init_i18n;

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

pub fn translations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("translations")
}

/// Serves the full router with the bundled translations on an ephemeral port.
pub async fn spawn_server() -> TestServer {
    let config = I18nConfig {
        translations_dir: translations_dir(),
        ..I18nConfig::default()
    };
    let service = init_i18n(&config).expect("translations should load");
    let base_path = config.base_path.clone();
    let app = create_router(AppState::new(config, service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    TestServer {
        addr,
        base_url: format!("http://{}{}", addr, base_path),
    }
}
