//! End-to-end tests of the order flow against an in-memory database:
//! submission, pricing, discount snapshots, the lifecycle gate, the
//! atomic reconciliation, hard deletion, and the KPI aggregates.

use chrono::Utc;
use uuid::Uuid;

use olivier_core::lifecycle::ensure_editable;
use olivier_core::pricing::price_order;
use olivier_core::{
    Cart, CoreError, OrderLine, OrderStatus, OrderType, Pharmacy, PharmacyStatus, Product, Role,
    User,
};
use olivier_db::repository::order::generate_line_id;
use olivier_db::{Database, DbConfig, DbError, OrderService, ServiceError};

// =============================================================================
// Fixtures
// =============================================================================

struct TestContext {
    db: Database,
    service: OrderService,
    admin: User,
    commercial: User,
    pharmacy: Pharmacy,
    product_a: Product,
    product_b: Product,
}

fn user(role: Role, name: &str) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        email: format!("{}@olivier-de-leos.fr", name.to_lowercase().replace(' ', ".")),
        full_name: name.to_string(),
        role,
        sector: Some("Provence".to_string()),
        created_at: Utc::now(),
    }
}

fn pharmacy(commercial_id: &str, discount_rate_bps: u32) -> Pharmacy {
    Pharmacy {
        id: Uuid::new_v4().to_string(),
        name: "Pharmacie du Vieux Port".to_string(),
        contact_name: Some("M. Blanc".to_string()),
        address: "12 quai de Rive Neuve".to_string(),
        postal_code: "13007".to_string(),
        city: "Marseille".to_string(),
        phone: None,
        email: Some("contact@pharmacie-vieux-port.fr".to_string()),
        sector: "Provence".to_string(),
        status: PharmacyStatus::Active,
        assigned_commercial_id: Some(commercial_id.to_string()),
        first_contact_date: None,
        discount_rate_bps,
        created_at: Utc::now(),
    }
}

fn product(sku: &str, gross_cents: i64, min_qty: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        ean: Some("3400000000001".to_string()),
        name: format!("Produit {sku}"),
        description: None,
        gross_unit_price_cents: gross_cents,
        retail_unit_price_cents: gross_cents * 2,
        vat_rate_bps: 2000,
        stock_quantity: 500,
        minimum_order_quantity: min_qty,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Fresh in-memory database seeded with an admin, a commercial, one
/// pharmacy at 21% and the two products of the worked example
/// (50.00 € min 5, 20.00 € min 3).
async fn setup() -> TestContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let admin = user(Role::Admin, "Claire Admin");
    let commercial = user(Role::Commercial, "Jean Dupont");
    db.users().insert(&admin).await.unwrap();
    db.users().insert(&commercial).await.unwrap();

    let pharmacy = pharmacy(&commercial.id, 2100);
    db.pharmacies().insert(&pharmacy).await.unwrap();

    let product_a = product("VIS-CREME-50", 5000, 5);
    let product_b = product("COR-LAIT-200", 2000, 3);
    db.products().insert(&product_a).await.unwrap();
    db.products().insert(&product_b).await.unwrap();

    let service = OrderService::new(db.clone());

    TestContext {
        db,
        service,
        admin,
        commercial,
        pharmacy,
        product_a,
        product_b,
    }
}

/// The worked-example cart: 5 × 50.00 € + 3 × 20.00 €.
fn example_cart(ctx: &TestContext) -> Cart {
    let mut cart = Cart::for_reassort();
    cart.add_product(&ctx.product_a).unwrap(); // qty = min = 5
    cart.add_product(&ctx.product_b).unwrap(); // qty = min = 3
    cart
}

// =============================================================================
// Submission & Pricing
// =============================================================================

#[tokio::test]
async fn submit_order_prices_the_worked_example() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    assert!(order.order_number.starts_with("CMD-"));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.order_type, OrderType::Reassort);
    assert_eq!(order.total_before_discount_cents, 31000); // 310.00
    assert_eq!(order.discount_rate_bps, 2100);
    assert_eq!(order.discount_amount_cents, 6510); // 65.10
    assert_eq!(order.shipping_amount_cents, 990); // 244.90 < 300.00
    assert_eq!(order.total_amount_cents, 25480); // 254.80

    let lines = ctx.db.orders().get_lines(&order.id).await.unwrap();
    assert_eq!(lines.len(), 2);

    let line_a = lines
        .iter()
        .find(|l| l.sku_snapshot == "VIS-CREME-50")
        .unwrap();
    assert_eq!(line_a.quantity, 5);
    assert_eq!(line_a.unit_price_gross_cents, 5000);
    assert_eq!(line_a.line_total_gross_cents, 25000);
    assert_eq!(line_a.product_id.as_deref(), Some(ctx.product_a.id.as_str()));
}

#[tokio::test]
async fn stored_totals_match_a_pricing_rerun() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    let lines = ctx.db.orders().get_lines(&order.id).await.unwrap();
    let recomputed = price_order(&lines, order.discount_rate());

    assert_eq!(order.total_before_discount(), recomputed.total_before_discount);
    assert_eq!(order.discount_amount(), recomputed.discount_amount);
    assert_eq!(order.shipping_amount(), recomputed.shipping_amount);
    assert_eq!(order.total_amount(), recomputed.total_amount);
}

#[tokio::test]
async fn shipping_threshold_boundary_on_submission() {
    let ctx = setup().await;

    let no_discount = pharmacy(&ctx.commercial.id, 0);
    ctx.db.pharmacies().insert(&no_discount).await.unwrap();

    let just_below = product("TEST-29999", 29999, 1);
    let exactly_at = product("TEST-30000", 30000, 1);
    ctx.db.products().insert(&just_below).await.unwrap();
    ctx.db.products().insert(&exactly_at).await.unwrap();

    let mut cart = Cart::for_reassort();
    cart.add_product(&just_below).unwrap();
    let order = ctx
        .service
        .submit_order(&cart, &no_discount.id, &ctx.commercial.id, None)
        .await
        .unwrap();
    assert_eq!(order.shipping_amount_cents, 990);

    let mut cart = Cart::for_reassort();
    cart.add_product(&exactly_at).unwrap();
    let order = ctx
        .service
        .submit_order(&cart, &no_discount.id, &ctx.commercial.id, None)
        .await
        .unwrap();
    assert_eq!(order.shipping_amount_cents, 0);
}

#[tokio::test]
async fn empty_cart_is_not_submittable() {
    let ctx = setup().await;
    let cart = Cart::for_reassort();

    let err = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Core(CoreError::EmptyCart)));
}

#[tokio::test]
async fn below_minimum_cart_reports_every_violation_and_blocks() {
    let ctx = setup().await;

    let mut cart = example_cart(&ctx);
    cart.set_quantity(&ctx.product_a.id, 2).unwrap(); // min 5
    cart.set_quantity(&ctx.product_b.id, 1).unwrap(); // min 3

    let err = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap_err();

    match err {
        ServiceError::Core(CoreError::MinimumQuantities(violations)) => {
            assert_eq!(violations.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Correcting to exactly the minimum makes the cart valid
    cart.set_quantity(&ctx.product_a.id, 5).unwrap();
    cart.set_quantity(&ctx.product_b.id, 3).unwrap();
    assert!(ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .is_ok());
}

// =============================================================================
// Discount Snapshot Immutability
// =============================================================================

#[tokio::test]
async fn pharmacy_rate_change_never_touches_submitted_orders() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    // Renegotiation: the pharmacy moves to 30%
    ctx.db
        .pharmacies()
        .set_discount_rate(&ctx.pharmacy.id, 3000)
        .await
        .unwrap();

    let stored = ctx.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.discount_rate_bps, 2100);
    assert_eq!(stored.discount_amount_cents, 6510);
    assert_eq!(stored.total_amount_cents, 25480);
}

#[tokio::test]
async fn reconciliation_uses_the_stored_rate_not_the_live_one() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    ctx.db
        .pharmacies()
        .set_discount_rate(&ctx.pharmacy.id, 3000)
        .await
        .unwrap();

    // Edit the order after the renegotiation: same lines, new totals run
    let edited = ctx.service.edit_order_lines(&order.id, &cart).await.unwrap();

    // Still priced at the 21% agreed at submission
    assert_eq!(edited.discount_rate_bps, 2100);
    assert_eq!(edited.discount_amount_cents, 6510);
    assert_eq!(edited.total_amount_cents, 25480);
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn edit_replaces_lines_and_recomputes_totals() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    // Drop product B, double product A to 10
    let mut edit = Cart::for_reassort();
    edit.add_product(&ctx.product_a).unwrap();
    edit.set_quantity(&ctx.product_a.id, 10).unwrap();

    let edited = ctx.service.edit_order_lines(&order.id, &edit).await.unwrap();

    // 10 × 50.00 = 500.00; 21% → 105.00; net 395.00 ≥ 300 → free shipping
    assert_eq!(edited.total_before_discount_cents, 50000);
    assert_eq!(edited.discount_amount_cents, 10500);
    assert_eq!(edited.shipping_amount_cents, 0);
    assert_eq!(edited.total_amount_cents, 39500);

    let lines = ctx.db.orders().get_lines(&order.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 10);
}

#[tokio::test]
async fn edit_refreshes_product_text_but_not_prices() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    // The edit session's cart was built against the old catalog
    let edit = example_cart(&ctx);

    // Meanwhile the catalog gets a rename AND a price increase
    let mut renamed = ctx.product_a.clone();
    renamed.name = "Crème visage nouvelle formule".to_string();
    renamed.gross_unit_price_cents = 9999;
    ctx.db.products().update(&renamed).await.unwrap();

    ctx.service.edit_order_lines(&order.id, &edit).await.unwrap();

    let lines = ctx.db.orders().get_lines(&order.id).await.unwrap();
    let line_a = lines
        .iter()
        .find(|l| l.sku_snapshot == "VIS-CREME-50")
        .unwrap();

    // Text re-snapshotted from the current catalog...
    assert_eq!(line_a.name_snapshot, "Crème visage nouvelle formule");
    // ...but the price basis stays what the edit session held
    assert_eq!(line_a.unit_price_gross_cents, 5000);
}

#[tokio::test]
async fn failed_reconciliation_leaves_the_pre_edit_state() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    let before_lines = ctx.db.orders().get_lines(&order.id).await.unwrap();

    // Forge a line set that fails mid-insert (duplicate primary key on
    // the second line) after the delete step has already run
    let duplicate_id = generate_line_id();
    let now = Utc::now();
    let bad_line = |qty: i64| OrderLine {
        id: duplicate_id.clone(),
        order_id: order.id.clone(),
        product_id: Some(ctx.product_a.id.clone()),
        name_snapshot: ctx.product_a.name.clone(),
        sku_snapshot: ctx.product_a.sku.clone(),
        ean_snapshot: None,
        quantity: qty,
        unit_price_gross_cents: 5000,
        unit_price_retail_cents: 10000,
        line_total_gross_cents: 5000 * qty,
        line_total_retail_cents: 10000 * qty,
        created_at: now,
    };
    let bad_lines = vec![bad_line(1), bad_line(2)];
    let totals = price_order(&bad_lines, order.discount_rate());

    let err = ctx
        .db
        .orders()
        .replace_lines(&order.id, &bad_lines, &totals)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    // Rollback: the original lines AND the original totals are intact
    let after = ctx.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(after.total_before_discount_cents, 31000);
    assert_eq!(after.total_amount_cents, 25480);

    let after_lines = ctx.db.orders().get_lines(&order.id).await.unwrap();
    assert_eq!(after_lines.len(), before_lines.len());
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn lines_are_frozen_once_the_order_leaves_pending() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    ctx.service
        .update_status(&order.id, &ctx.admin, OrderStatus::Delivered)
        .await
        .unwrap();

    let err = ctx
        .service
        .edit_order_lines(&order.id, &cart)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::OrderNotEditable { .. })
    ));

    // Precondition failure, not a partial write
    let stored = ctx.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount_cents, 25480);
    assert_eq!(ctx.db.orders().get_lines(&order.id).await.unwrap().len(), 2);
    assert!(ensure_editable(&stored).is_err());
}

#[tokio::test]
async fn commercial_may_self_cancel_a_pending_order() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    let cancelled = ctx
        .service
        .update_status(&order.id, &ctx.commercial, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn commercial_may_not_validate_or_cancel_after_validation() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    let err = ctx
        .service
        .update_status(&order.id, &ctx.commercial, OrderStatus::Validated)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::StatusChangeForbidden { .. })
    ));

    ctx.service
        .update_status(&order.id, &ctx.admin, OrderStatus::Validated)
        .await
        .unwrap();

    let err = ctx
        .service
        .update_status(&order.id, &ctx.commercial, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::StatusChangeForbidden { .. })
    ));
}

#[tokio::test]
async fn admin_override_may_walk_an_order_backward() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    // Forward to shipped, then the back-office walks it back
    ctx.service
        .update_status(&order.id, &ctx.admin, OrderStatus::Shipped)
        .await
        .unwrap();
    let back = ctx
        .service
        .update_status(&order.id, &ctx.admin, OrderStatus::Validated)
        .await
        .unwrap();
    assert_eq!(back.status, OrderStatus::Validated);
}

// =============================================================================
// Hard Deletion
// =============================================================================

#[tokio::test]
async fn deletion_is_admin_only_and_cascades_lines() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(&cart, &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    let err = ctx
        .service
        .delete_order(&order.id, &ctx.commercial)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::AdminOnly { .. })));

    ctx.service.delete_order(&order.id, &ctx.admin).await.unwrap();

    assert!(ctx.db.orders().get_by_id(&order.id).await.unwrap().is_none());
    assert!(ctx.db.orders().get_lines(&order.id).await.unwrap().is_empty());
}

// =============================================================================
// Resolved View & Reporting
// =============================================================================

#[tokio::test]
async fn resolved_view_carries_order_lines_pharmacy_and_commercial() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let order = ctx
        .service
        .submit_order(
            &cart,
            &ctx.pharmacy.id,
            &ctx.commercial.id,
            Some("Livraison le matin".to_string()),
        )
        .await
        .unwrap();

    let view = ctx.service.order_with_details(&order.id).await.unwrap();

    assert_eq!(view.order.id, order.id);
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.pharmacy.id, ctx.pharmacy.id);
    assert_eq!(view.commercial.id, ctx.commercial.id);
    assert_eq!(view.order.notes.as_deref(), Some("Livraison le matin"));

    // The invariant renderers rely on
    assert_eq!(
        view.order.total_amount_cents,
        view.order.total_before_discount_cents - view.order.discount_amount_cents
            + view.order.shipping_amount_cents
    );

    // The view is what email/PDF/CSV consumers receive, as JSON
    let json = serde_json::to_string(&view).unwrap();
    assert!(json.contains(&order.order_number));
    assert!(json.contains("Pharmacie du Vieux Port"));
}

#[tokio::test]
async fn kpis_aggregate_orders_and_exclude_cancelled() {
    let ctx = setup().await;

    let first = ctx
        .service
        .submit_order(&example_cart(&ctx), &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();
    let second = ctx
        .service
        .submit_order(&example_cart(&ctx), &ctx.pharmacy.id, &ctx.commercial.id, None)
        .await
        .unwrap();

    // Cancel the second: it must disappear from every aggregate
    ctx.service
        .update_status(&second.id, &ctx.admin, OrderStatus::Cancelled)
        .await
        .unwrap();

    let global = ctx.db.reporting().global_kpis().await.unwrap();
    assert_eq!(global.order_count, 1);
    assert_eq!(global.revenue_cents, first.total_amount_cents);

    let by_pharmacy = ctx.db.reporting().pharmacy_kpis().await.unwrap();
    let row = by_pharmacy
        .iter()
        .find(|k| k.pharmacy_id == ctx.pharmacy.id)
        .unwrap();
    assert_eq!(row.order_count, 1);
    assert_eq!(row.revenue_cents, first.total_amount_cents);
    assert_eq!(row.average_basket().cents(), first.total_amount_cents);

    let by_product = ctx.db.reporting().product_kpis().await.unwrap();
    let creme = by_product.iter().find(|k| k.sku == "VIS-CREME-50").unwrap();
    assert_eq!(creme.quantity_sold, 5);
    assert_eq!(creme.revenue_cents, 25000);
    assert_eq!(creme.order_count, 1);

    let by_commercial = ctx.db.reporting().commercial_kpis().await.unwrap();
    let rep = by_commercial
        .iter()
        .find(|k| k.commercial_id == ctx.commercial.id)
        .unwrap();
    assert_eq!(rep.order_count, 1);
}

#[tokio::test]
async fn submitting_for_an_unknown_pharmacy_is_not_found() {
    let ctx = setup().await;
    let cart = example_cart(&ctx);

    let err = ctx
        .service
        .submit_order(&cart, "missing-pharmacy", &ctx.commercial.id, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Db(DbError::NotFound { .. })));
}
