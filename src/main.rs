use std::net::TcpListener;
use std::sync::Arc;

use token_maker::auth::KeyRing;
use token_maker::configuration::get_configuration;
use token_maker::startup::run;
use token_maker::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // 구조화된 로깅 초기화
    init_telemetry("info");

    tracing::info!("Starting application");

    // 설정 로드
    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // 키 검증 실패는 치명적입니다 (키 자체는 기록하지 않음)
    let key_ring = KeyRing::from_settings(&configuration.token).map_err(|e| {
        tracing::error!("Failed to build token key ring: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Token key error")
    })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, Arc::new(key_ring))?;
    tracing::info!("Server started successfully");

    server.await
}
