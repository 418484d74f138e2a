use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{
    auth, customers, deliveries, health, orders, pos, products, services, shipments, tracks,
    ErrorBody, MessageBody,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "FabClean API", description = "Laundry franchise back office, customer portal and worker scanning"),
    paths(
        health::ping,
        auth::signup,
        auth::login,
        auth::me,
        auth::logout,
        auth::admin_login,
        services::list_active_services,
        services::list_services,
        services::create_service,
        services::get_service,
        services::update_service,
        services::delete_service,
        orders::place_order,
        orders::list_customer_orders,
        orders::update_customer_order,
        orders::delete_customer_order,
        orders::order_qr,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::advance_order,
        orders::revert_order,
        orders::cancel_order,
        orders::export_orders,
        orders::analytics,
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::export_customers,
        deliveries::list_deliveries,
        deliveries::create_delivery,
        deliveries::get_delivery,
        deliveries::update_delivery,
        shipments::list_shipments,
        shipments::create_shipment,
        shipments::get_shipment,
        shipments::advance_shipment,
        tracks::record_scan,
        tracks::list_tracks,
        pos::create_transaction,
        pos::list_transactions,
        products::list_products,
        products::low_stock,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
    ),
    components(schemas(ErrorBody, MessageBody)),
    modifiers(&BearerAuth),
    tags(
        (name = "orders", description = "Customer portal orders"),
        (name = "admin", description = "Back office order management"),
        (name = "customers", description = "Customer records"),
        (name = "services", description = "Service catalog"),
        (name = "logistics", description = "Deliveries, shipments and QR scans"),
        (name = "pos", description = "Counter sales"),
        (name = "inventory", description = "Products and stock"),
        (name = "auth", description = "Sessions"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme the secured paths refer to.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("UUID")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/ping",
            "/api/orders",
            "/api/orders/{id}/qr",
            "/admin/api/orders/{id}/advance",
            "/api/products/low-stock",
            "/api/tracks",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.schemas.contains_key("ErrorBody"));
    }
}
