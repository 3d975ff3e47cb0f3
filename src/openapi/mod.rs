use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = r#"
# Stockroom Inventory API

Records goods receipts and goods issues against per-warehouse stock levels.
Every movement is written to the movement log and applied to the stock
ledger in a single transaction, so the log and the quantities never
disagree.

## Movements

- `transaction_type` is `"in"` (receipt) or `"out"` (issue)
- An issue larger than the available quantity is rejected with `409`
- A movement that misses its deadline is rolled back and answered with `408`
- Deleting a movement removes the record only; quantities are unchanged

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 10, max 100).
Out-of-range values fall back to the defaults.
"#
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::movements::record_movement,
        crate::handlers::movements::list_movements,
        crate::handlers::movements::get_movement,
        crate::handlers::movements::delete_movement,
        crate::handlers::stock_levels::list_stock_levels,
        crate::handlers::stock_levels::get_stock_level,
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,
        crate::handlers::warehouses::create_warehouse,
        crate::handlers::warehouses::list_warehouses,
        crate::handlers::warehouses::get_warehouse,
        crate::handlers::warehouses::update_warehouse,
        crate::handlers::warehouses::delete_warehouse,
    ),
    components(
        schemas(
            crate::handlers::health::HealthResponse,
            crate::handlers::movements::RecordMovementRequest,
            crate::handlers::movements::MovementResponse,
            crate::handlers::stock_levels::StockLevelResponse,
            crate::handlers::products::ProductResponse,
            crate::services::products::ProductInput,
            crate::services::products::UpdateProductInput,
            crate::handlers::categories::CategoryResponse,
            crate::services::categories::CategoryInput,
            crate::services::categories::UpdateCategoryInput,
            crate::handlers::suppliers::SupplierResponse,
            crate::services::suppliers::SupplierInput,
            crate::services::suppliers::UpdateSupplierInput,
            crate::handlers::warehouses::WarehouseResponse,
            crate::services::warehouses::WarehouseInput,
            crate::services::warehouses::UpdateWarehouseInput,
            crate::errors::ErrorResponse
        )
    ),
    tags(
        (name = "movements", description = "Goods receipts and goods issues"),
        (name = "stock-levels", description = "Read-only stock quantities per product and warehouse"),
        (name = "products", description = "Product catalog"),
        (name = "categories", description = "Product categories"),
        (name = "suppliers", description = "Suppliers"),
        (name = "warehouses", description = "Warehouses"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
