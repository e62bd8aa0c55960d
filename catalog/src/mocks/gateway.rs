//! In-memory gateway for tests and demos.

use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::operation::Operation;
use crate::types::{
    AuthSession, Credentials, Product, ProductDraft, ProductId, ProductUpdate, Registered,
    Registration, User, UserId,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// One request as the mock server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Operation requested.
    pub operation: Operation,
    /// Bearer token attached when the request was issued.
    pub bearer: Option<String>,
}

#[derive(Debug, Default)]
struct Server {
    products: Vec<Product>,
    accounts: Vec<(User, String)>,
    next_id: u64,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    requests: Vec<RecordedRequest>,
    register_signs_in: bool,
}

impl Server {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Mock gateway.
///
/// Behaves like a small catalog server: ids are assigned on create, writes
/// require a bearer token, missing products answer 404. Tests can script
/// failures with [`MockGateway::fail_next`] and control settlement order
/// with [`MockGateway::hold`] / [`MockGateway::release`]. A hold delays the
/// reply only; the server applies the request as soon as it arrives.
///
/// The bearer is read from the shared [`CredentialStore`] when the request
/// is issued, before any hold, exactly as a real client would.
#[derive(Debug, Clone)]
pub struct MockGateway {
    server: Arc<Mutex<Server>>,
    gates: Arc<Mutex<HashMap<Operation, Arc<Semaphore>>>>,
    credentials: CredentialStore,
}

impl MockGateway {
    /// Empty server reading bearer tokens from `credentials`.
    #[must_use]
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            server: Arc::new(Mutex::new(Server::default())),
            gates: Arc::new(Mutex::new(HashMap::new())),
            credentials,
        }
    }

    /// Seed the server's product list.
    #[must_use]
    pub fn with_products(self, products: impl IntoIterator<Item = Product>) -> Self {
        self.server().products.extend(products);
        self
    }

    /// Answer register with a `{ token, user }` session instead of a bare
    /// user record.
    #[must_use]
    pub fn with_register_sessions(self) -> Self {
        self.server().register_signs_in = true;
        self
    }

    /// Create an account that can log in.
    pub fn add_account(&self, name: &str, email: &str, password: &str) -> User {
        let mut server = self.server();
        let user = User {
            id: UserId::new(server.next_id("u")),
            name: name.to_string(),
            email: email.to_string(),
        };
        server.accounts.push((user.clone(), password.to_string()));
        user
    }

    /// Products currently held by the server.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.server().products.clone()
    }

    /// Every request received so far, in issue order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.server().requests.clone()
    }

    /// Fail the next call of `operation` with `error`. Calls queue up.
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.server()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Hold the replies of every subsequent call of `operation` until
    /// released.
    pub fn hold(&self, operation: Operation) {
        self.gates()
            .entry(operation)
            .or_insert_with(|| Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held replies of `operation` through, oldest first.
    pub fn release(&self, operation: Operation, count: usize) {
        if let Some(gate) = self.gates().get(&operation) {
            gate.add_permits(count);
        }
    }

    /// Stop holding `operation` and let every waiting call through.
    pub fn release_all(&self, operation: Operation) {
        if let Some(gate) = self.gates().remove(&operation) {
            gate.close();
        }
    }

    fn server(&self) -> MutexGuard<'_, Server> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn gates(&self) -> MutexGuard<'_, HashMap<Operation, Arc<Semaphore>>> {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the request, then apply scripted failures and the bearer
    /// requirement.
    fn admit(&self, operation: Operation) -> Result<(), GatewayError> {
        let bearer = self.credentials.token().unwrap_or_else(|error| {
            tracing::warn!(%error, "mock gateway could not read bearer token");
            None
        });
        let authorized = bearer.is_some();

        let mut server = self.server();
        server.requests.push(RecordedRequest { operation, bearer });
        if let Some(error) = server
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }

        if operation.requires_bearer() && !authorized {
            return Err(rejected(401, "Not authorized, no token"));
        }
        Ok(())
    }

    /// Wait for the reply gate of `operation`, if it is held.
    ///
    /// The server has already applied the request; only the reply is delayed.
    async fn reply(&self, operation: Operation) {
        let gate = self.gates().get(&operation).cloned();
        if let Some(gate) = gate {
            // A closed gate means release_all; proceed without a permit
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn find(&self, id: &ProductId) -> Result<Product, GatewayError> {
        self.server()
            .products
            .iter()
            .find(|product| &product.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    fn insert(&self, draft: &ProductDraft) -> Product {
        let mut server = self.server();
        let id = ProductId::new(server.next_id("p"));
        let product = draft.clone().into_product(id);
        server.products.push(product.clone());
        product
    }

    fn modify(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product, GatewayError> {
        let mut server = self.server();
        let slot = server
            .products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(not_found)?;
        *slot = update.apply_to(slot);
        Ok(slot.clone())
    }

    fn remove(&self, id: &ProductId) -> Result<(), GatewayError> {
        let mut server = self.server();
        let before = server.products.len();
        server.products.retain(|product| &product.id != id);
        if server.products.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, GatewayError> {
        let mut server = self.server();
        let user = server
            .accounts
            .iter()
            .find(|(user, password)| {
                user.email == credentials.email && *password == credentials.password
            })
            .map(|(user, _)| user.clone())
            .ok_or_else(|| rejected(401, "Invalid credentials"))?;
        let token = server.next_id("token");
        Ok(AuthSession { token, user })
    }

    fn enroll(&self, registration: &Registration) -> Result<Registered, GatewayError> {
        let mut server = self.server();
        if server
            .accounts
            .iter()
            .any(|(user, _)| user.email == registration.email)
        {
            return Err(rejected(400, "User already exists"));
        }

        let user = User {
            id: UserId::new(server.next_id("u")),
            name: registration.name.clone(),
            email: registration.email.clone(),
        };
        server
            .accounts
            .push((user.clone(), registration.password.clone()));

        if server.register_signs_in {
            let token = server.next_id("token");
            Ok(Registered::Session(AuthSession { token, user }))
        } else {
            Ok(Registered::User(user))
        }
    }
}

fn rejected(status: u16, detail: &str) -> GatewayError {
    GatewayError::Rejected {
        status,
        detail: Some(detail.to_string()),
    }
}

fn not_found() -> GatewayError {
    rejected(404, "Product not found")
}

impl Gateway for MockGateway {
    async fn fetch_products(&self) -> Result<Vec<Product>, GatewayError> {
        let result = self
            .admit(Operation::FetchProducts)
            .map(|()| self.products());
        self.reply(Operation::FetchProducts).await;
        result
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        let result = self
            .admit(Operation::FetchProductById)
            .and_then(|()| self.find(id));
        self.reply(Operation::FetchProductById).await;
        result
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, GatewayError> {
        let result = self
            .admit(Operation::CreateProduct)
            .map(|()| self.insert(draft));
        self.reply(Operation::CreateProduct).await;
        result
    }

    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, GatewayError> {
        let result = self
            .admit(Operation::UpdateProduct)
            .and_then(|()| self.modify(id, update));
        self.reply(Operation::UpdateProduct).await;
        result
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        let result = self
            .admit(Operation::DeleteProduct)
            .and_then(|()| self.remove(id));
        self.reply(Operation::DeleteProduct).await;
        result
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, GatewayError> {
        let result = self
            .admit(Operation::Login)
            .and_then(|()| self.authenticate(credentials));
        self.reply(Operation::Login).await;
        result
    }

    async fn register(&self, registration: &Registration) -> Result<Registered, GatewayError> {
        let result = self
            .admit(Operation::Register)
            .and_then(|()| self.enroll(registration));
        self.reply(Operation::Register).await;
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::time::Duration;

    fn draft(title: &str) -> ProductDraft {
        ProductDraft {
            title: title.into(),
            description: "d".into(),
            price: 1.0,
            category: "c".into(),
            stock: 0,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_writes_require_bearer() {
        let credentials = CredentialStore::in_memory();
        let gateway = MockGateway::new(credentials.clone());

        let err = gateway.create_product(&draft("Lamp")).await.unwrap_err();
        assert_eq!(err, rejected(401, "Not authorized, no token"));

        credentials.persist("t").unwrap();
        let product = gateway.create_product(&draft("Lamp")).await.unwrap();
        assert_eq!(gateway.products(), vec![product]);

        let bearers: Vec<_> = gateway.requests().into_iter().map(|r| r.bearer).collect();
        assert_eq!(bearers, vec![None, Some("t".to_string())]);
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let gateway = MockGateway::new(CredentialStore::in_memory());
        gateway.fail_next(Operation::FetchProducts, GatewayError::Transport("down".into()));

        assert!(gateway.fetch_products().await.is_err());
        assert!(gateway.fetch_products().await.is_ok());
    }

    #[tokio::test]
    async fn test_hold_blocks_until_released() {
        let gateway = MockGateway::new(CredentialStore::in_memory());
        gateway.hold(Operation::FetchProducts);

        let held = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.fetch_products().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!held.is_finished());

        gateway.release(Operation::FetchProducts, 1);
        assert!(held.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_held_write_is_applied_before_reply() {
        let credentials = CredentialStore::in_memory();
        credentials.persist("t").unwrap();
        let gateway = MockGateway::new(credentials);
        gateway.hold(Operation::CreateProduct);

        let held = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.create_product(&draft("Lamp")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(gateway.products().len(), 1);
        assert!(!held.is_finished());

        gateway.release_all(Operation::CreateProduct);
        assert_eq!(held.await.unwrap().unwrap().title, "Lamp");
    }

    #[tokio::test]
    async fn test_login_and_register() {
        let gateway = MockGateway::new(CredentialStore::in_memory());
        let ada = gateway.add_account("Ada", "ada@example.com", "secret1");

        let session = gateway
            .login(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.user, ada);

        let err = gateway
            .login(&Credentials::new("ada@example.com", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err, rejected(401, "Invalid credentials"));

        let err = gateway
            .register(&Registration {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, rejected(400, "User already exists"));
    }

    #[tokio::test]
    async fn test_missing_products_answer_not_found() {
        let credentials = CredentialStore::in_memory();
        credentials.persist("t").unwrap();
        let gateway = MockGateway::new(credentials);
        let id = ProductId::new("X");

        assert_eq!(gateway.fetch_product(&id).await.unwrap_err(), not_found());
        assert_eq!(
            gateway
                .update_product(&id, &ProductUpdate::default())
                .await
                .unwrap_err(),
            not_found()
        );
        assert_eq!(gateway.delete_product(&id).await.unwrap_err(), not_found());
    }
}
