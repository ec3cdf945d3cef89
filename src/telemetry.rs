use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// 구조화된 로깅 subscriber를 구성합니다.
/// JSON 형식으로 출력하며, RUST_LOG가 없으면 `default_filter`를 사용합니다.
pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    Registry::default().with(env_filter).with(formatting_layer)
}

/// 전역 subscriber를 설치합니다. actix-web의 `log` 레코드도 함께 수집됩니다.
pub fn init_telemetry(default_filter: &str) {
    if let Err(e) = get_subscriber(default_filter).try_init() {
        eprintln!("Telemetry already initialized: {}", e);
    }
}
