use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, market::client::MarketClient},
    application::{
        jwt::SessionCodec,
        ports::market::MarketApi,
        use_cases::{
            impersonation::ImpersonationUseCases, payment::PaymentUseCases,
            session::SessionUseCases,
        },
    },
    infra::config::AppConfig,
};

pub fn init_app_state() -> AppState {
    let config = Arc::new(AppConfig::from_env());

    let codec = Arc::new(SessionCodec::new(
        config.session_secret.clone(),
        config.session_ttl,
    ));

    let api: Arc<dyn MarketApi> = Arc::new(MarketClient::new(config.market_api_base.clone()));

    AppState {
        config: config.clone(),
        codec,
        session_use_cases: Arc::new(SessionUseCases::new(api.clone())),
        impersonation_use_cases: Arc::new(ImpersonationUseCases::new(
            api.clone(),
            config.impersonation_ttl,
        )),
        payment_use_cases: Arc::new(PaymentUseCases::new(api)),
    }
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "bazargate=debug,tower_http=debug".into());

    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
        .ok();
}
