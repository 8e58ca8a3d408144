use std::sync::Arc;

use crate::{
    application::{
        jwt::SessionCodec,
        use_cases::{
            impersonation::ImpersonationUseCases, payment::PaymentUseCases,
            session::SessionUseCases,
        },
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<SessionCodec>,
    pub session_use_cases: Arc<SessionUseCases>,
    pub impersonation_use_cases: Arc<ImpersonationUseCases>,
    pub payment_use_cases: Arc<PaymentUseCases>,
}
