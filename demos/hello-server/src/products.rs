use axum::routing::get;
use sail::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
}

#[derive(Default)]
pub struct ProductService {
    products: RwLock<HashMap<String, Product>>,
}

impl ProductService {
    pub async fn create(&self, req: CreateProductRequest) -> Product {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            price: req.price,
        };
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        product
    }

    pub async fn get(&self, id: &str) -> Option<Product> {
        self.products.read().await.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<Product> {
        self.products.read().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.products.read().await.len()
    }
}

pub struct ProductController {
    service: Arc<ProductService>,
}

impl ProductController {
    async fn create(&self, req: CreateProductRequest) -> ApiResponse<Product> {
        ApiResponse::success(self.service.create(req).await).with_status(StatusCode::CREATED)
    }

    async fn get_one(&self, id: String) -> ApiResponse<Product> {
        match self.service.get(&id).await {
            Some(product) => ApiResponse::success(product),
            None => ApiResponse::error(StatusCode::NOT_FOUND, format!("Product not found: {}", id)),
        }
    }

    async fn list(&self) -> ApiResponse<Vec<Product>> {
        ApiResponse::success(self.service.list().await)
    }
}

impl Controller for ProductController {
    fn register_routes(self: Arc<Self>, router: &mut Router) -> sail::Result<()> {
        let (list, create) = (Arc::clone(&self), Arc::clone(&self));
        router.handle(
            "/products",
            get(move || async move { list.list().await }).post(
                move |Json(req): Json<CreateProductRequest>| async move { create.create(req).await },
            ),
        )?;

        router.handle(
            "/products/{id}",
            get(move |Path(id): Path<String>| async move { self.get_one(id).await }),
        )
    }
}

#[derive(Default)]
pub struct ProductModule {
    service: Arc<ProductService>,
}

#[async_trait]
impl Module for ProductModule {
    fn name(&self) -> &str {
        "ProductModule"
    }

    async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
        ctx.container()
            .register_arc("products", Arc::clone(&self.service))?;
        ctx.add_controller(Arc::new(ProductController {
            service: Arc::clone(&self.service),
        }))?;
        Ok(())
    }
}

#[async_trait]
impl OnApplicationBootstrap for ProductModule {
    async fn on_application_bootstrap(&mut self) -> Result<(), LifecycleError> {
        self.service
            .create(CreateProductRequest {
                name: "Sample".to_string(),
                price: 9.99,
            })
            .await;
        tracing::info!("Seeded product catalog");
        Ok(())
    }
}

#[async_trait]
impl OnApplicationShutdown for ProductModule {
    async fn on_application_shutdown(&mut self) -> Result<(), LifecycleError> {
        let count = self.service.count().await;
        tracing::info!("Dropping {} products", count);
        Ok(())
    }
}
