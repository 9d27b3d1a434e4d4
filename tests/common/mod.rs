//! In-memory repositories and gateway shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bson::oid::ObjectId;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use storefront_backend::app::app::{api_router, AppServices, Repositories};
use storefront_backend::config::JwtConfig;
use storefront_backend::gateway::{GatewayError, PaymentGateway, SaleRequest};
use storefront_backend::model::category::Category;
use storefront_backend::model::order::{Order, OrderStatus};
use storefront_backend::model::product::{Product, ProductPhoto};
use storefront_backend::model::user::{User, ROLE_ADMIN, ROLE_CUSTOMER};
use storefront_backend::repository::category_repo::CategoryRepository;
use storefront_backend::repository::order_repo::OrderRepository;
use storefront_backend::repository::product_repo::{ProductQuery, ProductRepository};
use storefront_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use storefront_backend::repository::user_repo::UserRepository;
use storefront_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use storefront_backend::util::password::{PasswordUtils, PasswordUtilsImpl};

/// Monotonic timestamps so "newest first" is deterministic within a test.
fn stamp() -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!("2024-01-01T00:00:00.{:09}Z", COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[derive(Default)]
pub struct InMemoryUsers {
    pub users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("email"));
        }
        user.id = Some(ObjectId::new());
        user.created_at = Some(stamp());
        user.updated_at = user.created_at.clone();
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("user"))?;
        user.id = Some(id);
        user.created_at = slot.created_at.clone();
        user.updated_at = Some(stamp());
        *slot = user.clone();
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == Some(*id)).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct InMemoryCategories {
    pub categories: Mutex<Vec<Category>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn insert(&self, mut category: Category) -> RepositoryResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.slug == category.slug) {
            return Err(RepositoryError::already_exists("slug"));
        }
        category.id = Some(ObjectId::new());
        category.created_at = Some(stamp());
        categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: ObjectId, name: &str, slug: &str) -> RepositoryResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        let slot = categories
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("category"))?;
        slot.name = name.to_string();
        slot.slug = slug.to_string();
        slot.updated_at = Some(stamp());
        Ok(slot.clone())
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        Ok(self.categories.lock().unwrap().iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Category>> {
        Ok(self.categories.lock().unwrap().iter().find(|c| c.id == Some(*id)).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != Some(id));
        if categories.len() == before {
            return Err(RepositoryError::not_found("category"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProducts {
    pub products: Mutex<Vec<Product>>,
}

fn matches(query: &ProductQuery, product: &Product) -> bool {
    if !query.categories.is_empty() && !query.categories.contains(&product.category) {
        return false;
    }
    if let Some(range) = query.price {
        if !range.contains(product.price) {
            return false;
        }
    }
    if let Some(keyword) = query.keyword.as_deref() {
        let keyword = keyword.to_lowercase();
        if !product.name.to_lowercase().contains(&keyword) && !product.description.to_lowercase().contains(&keyword) {
            return false;
        }
    }
    query.exclude.map_or(true, |id| product.id != Some(id))
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn insert(&self, mut product: Product) -> RepositoryResult<Product> {
        product.id = Some(ObjectId::new());
        product.created_at = Some(stamp());
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: ObjectId, mut product: Product) -> RepositoryResult<Product> {
        let mut products = self.products.lock().unwrap();
        let slot = products
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("product"))?;
        product.id = Some(id);
        product.created_at = slot.created_at.clone();
        if product.photo.is_none() {
            product.photo = slot.photo.clone();
        }
        *slot = product.clone();
        Ok(product)
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>> {
        Ok(self.products.lock().unwrap().iter().find(|p| p.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Product>> {
        Ok(self.products.lock().unwrap().iter().find(|p| p.id == Some(*id)).cloned())
    }

    async fn find_photo(&self, id: &ObjectId) -> RepositoryResult<Option<ProductPhoto>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(*id))
            .and_then(|p| p.photo.clone()))
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != Some(id));
        if products.len() == before {
            return Err(RepositoryError::not_found("product"));
        }
        Ok(())
    }

    async fn list(&self, query: &ProductQuery) -> RepositoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| matches(query, p))
            .cloned()
            .map(|p| Product { photo: None, ..p })
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(products.into_iter().skip(query.skip as usize).take(limit).collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.products.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    pub orders: Mutex<Vec<Order>>,
    pub fail_inserts: AtomicBool,
    pub create_calls: AtomicUsize,
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create(&self, mut order: Order) -> RepositoryResult<Order> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::database("write concern failed"));
        }
        order.id = Some(ObjectId::new());
        order.status = Some(order.status.unwrap_or_default());
        order.created_at = Some(stamp());
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn find_by_buyer(&self, buyer: &ObjectId) -> RepositoryResult<Vec<Order>> {
        Ok(self.orders.lock().unwrap().iter().filter(|o| o.buyer == *buyer).cloned().collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        let slot = orders
            .iter_mut()
            .find(|o| o.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("order"))?;
        slot.status = Some(status);
        Ok(slot.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Approve,
    Decline,
    Misconfigured,
}

pub struct FakeGateway {
    pub mode: GatewayMode,
    pub sale_calls: AtomicUsize,
    pub sales: Mutex<Vec<SaleRequest>>,
}

impl FakeGateway {
    pub fn new(mode: GatewayMode) -> Self {
        FakeGateway { mode, sale_calls: AtomicUsize::new(0), sales: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.sale_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn generate_client_token(&self) -> Result<String, GatewayError> {
        match self.mode {
            GatewayMode::Approve => Ok("client-token-123".to_string()),
            GatewayMode::Decline => Err(GatewayError::Rejected("Authentication failed".to_string())),
            GatewayMode::Misconfigured => Err(GatewayError::Configuration("no credentials".to_string())),
        }
    }

    async fn sale(&self, request: SaleRequest) -> Result<Value, GatewayError> {
        self.sale_calls.fetch_add(1, Ordering::SeqCst);
        let amount = request.amount.clone();
        self.sales.lock().unwrap().push(request);
        match self.mode {
            GatewayMode::Approve => Ok(json!({
                "transaction": { "id": "txn_1", "status": "SUBMITTED_FOR_SETTLEMENT", "amount": { "value": amount } }
            })),
            GatewayMode::Decline => Err(GatewayError::Rejected("Processor declined".to_string())),
            GatewayMode::Misconfigured => Err(GatewayError::Configuration("no credentials".to_string())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub categories: Arc<InMemoryCategories>,
    pub products: Arc<InMemoryProducts>,
    pub orders: Arc<InMemoryOrders>,
    pub gateway: Arc<FakeGateway>,
    pub jwt: JwtTokenUtilsImpl,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(GatewayMode::Approve)
    }

    pub fn with_gateway(mode: GatewayMode) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let categories = Arc::new(InMemoryCategories::default());
        let products = Arc::new(InMemoryProducts::default());
        let orders = Arc::new(InMemoryOrders::default());
        let gateway = Arc::new(FakeGateway::new(mode));
        let jwt = JwtTokenUtilsImpl::new(JwtConfig::default());

        let repos = Repositories {
            users: users.clone(),
            categories: categories.clone(),
            products: products.clone(),
            orders: orders.clone(),
        };
        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(jwt.clone());
        let services = AppServices::new(repos, jwt_utils, gateway.clone());

        TestApp { router: api_router(&services), users, categories, products, orders, gateway, jwt }
    }

    /// Stores a user directly and returns it with a valid token.
    pub async fn seed_user(&self, email: &str, password: &str, role: i32) -> (User, String) {
        let user = User {
            id: None,
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password: PasswordUtilsImpl::hash_password(password).unwrap(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            answer: "blue".to_string(),
            role,
            created_at: None,
            updated_at: None,
        };
        let user = self.users.insert(user).await.unwrap();
        let token = self.jwt.generate_token(&user.id.unwrap().to_hex(), &user.email, user.role).unwrap();
        (user, token)
    }

    pub async fn customer(&self) -> (User, String) {
        self.seed_user("jane@example.com", "secret123", ROLE_CUSTOMER).await
    }

    pub async fn admin(&self) -> (User, String) {
        self.seed_user("admin@example.com", "adminpass", ROLE_ADMIN).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token.to_string());
    }
    builder.body(Body::empty()).unwrap()
}
