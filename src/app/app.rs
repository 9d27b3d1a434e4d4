use axum::{http::HeaderValue, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::{AdminUserConfig, AppConfig, BraintreeConfig, ConfigError, JwtConfig, MongoConfig};
use crate::gateway::{braintree::BraintreeGateway, DisabledGateway, GatewayError, PaymentGateway};
use crate::middlewares::auth_middleware::AuthState;
use crate::repository::category_repo::{CategoryRepository, MongoCategoryRepository};
use crate::repository::mongo;
use crate::repository::order_repo::{MongoOrderRepository, OrderRepository};
use crate::repository::product_repo::{MongoProductRepository, ProductRepository};
use crate::repository::user_repo::{UserRepository, UserRepositoryImpl};
use crate::router::{
    auth_router::auth_router, category_router::category_router, product_router::product_router,
    user_router::user_router,
};
use crate::service::category_service::{CategoryService, CategoryServiceImpl};
use crate::service::order_service::{OrderService, OrderServiceImpl};
use crate::service::payment_service::{PaymentService, PaymentServiceImpl};
use crate::service::product_service::{ProductService, ProductServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Invalid listen address: {0}")]
    Address(String),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage handles the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

#[derive(Clone)]
pub struct AppServices {
    pub user_service: Arc<dyn UserService>,
    pub category_service: Arc<dyn CategoryService>,
    pub product_service: Arc<dyn ProductService>,
    pub order_service: Arc<dyn OrderService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub auth_state: Arc<AuthState>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        jwt_utils: Arc<dyn JwtTokenUtils>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        AppServices {
            user_service: Arc::new(UserServiceImpl::new(repos.users.clone(), jwt_utils.clone())),
            category_service: Arc::new(CategoryServiceImpl::new(repos.categories.clone())),
            product_service: Arc::new(ProductServiceImpl::new(repos.products.clone(), repos.categories.clone())),
            order_service: Arc::new(OrderServiceImpl::new(repos.orders.clone(), repos.users.clone())),
            payment_service: Arc::new(PaymentServiceImpl::new(gateway, repos.orders)),
            auth_state: Arc::new(AuthState { jwt_utils, user_repo: repos.users }),
        }
    }
}

/// All API routes under `/api/v1`, plus `/health`.
pub fn api_router(services: &AppServices) -> Router {
    let auth_state = services.auth_state.clone();
    let api = Router::new()
        .nest(
            "/auth",
            auth_router(services.user_service.clone(), services.order_service.clone(), auth_state.clone()),
        )
        .nest("/category", category_router(services.category_service.clone(), auth_state.clone()))
        .nest(
            "/product",
            product_router(services.product_service.clone(), services.payment_service.clone(), auth_state.clone()),
        )
        .nest("/user", user_router(services.user_service.clone(), auth_state));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(|| async { "OK" }))
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, AppError> {
    let layer = match origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .map_err(|e| AppError::Config(ConfigError::InvalidValue(format!("CORS_ORIGIN: {}", e))))?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    };
    Ok(layer.allow_methods(Any).allow_headers(Any))
}

fn payment_gateway() -> Result<Arc<dyn PaymentGateway>, AppError> {
    match BraintreeConfig::from_env() {
        Ok(config) => Ok(Arc::new(BraintreeGateway::new(&config)?)),
        Err(e) => {
            warn!("Braintree not configured ({}); payments are disabled", e);
            Ok(Arc::new(DisabledGateway))
        }
    }
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;

        let db = mongo::connect(&mongo_config).await?;
        mongo::ensure_indexes(&db).await?;

        let repos = Repositories {
            users: Arc::new(UserRepositoryImpl::new(&db)),
            categories: Arc::new(MongoCategoryRepository::new(&db)),
            products: Arc::new(MongoProductRepository::new(&db)),
            orders: Arc::new(MongoOrderRepository::new(&db)),
        };
        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let services = AppServices::new(repos, jwt_utils, payment_gateway()?);

        Self::create_first_admin_user(services.user_service.as_ref()).await;

        let router = api_router(&services)
            .layer(cors_layer(config.cors_origin.as_deref())?)
            .layer(TraceLayer::new_for_http());

        Ok(App { config, router })
    }

    pub async fn start(self) -> Result<(), AppError> {
        let host = self
            .config
            .host
            .parse()
            .map_err(|e| AppError::Address(format!("{}: {}", self.config.host, e)))?;
        let addr = SocketAddr::new(host, self.config.port);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server running at http://{}", addr);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server shut down");
        Ok(())
    }

    async fn create_first_admin_user(user_service: &dyn UserService) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };
        if let Err(e) = user_service.seed_admin(&admin_conf).await {
            error!("Failed to create admin user: {e}");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
