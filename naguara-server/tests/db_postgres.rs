//! Tests against a real PostgreSQL: each one gets a fresh database with
//! the migrations applied and the `catalogo` fixture loaded. They need
//! `DATABASE_URL` pointing at a server the test user can create databases on.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use naguara_server::db;
use naguara_server::db::ventas::VentaExtras;
use naguara_server::services::exchange_rate::{fixed_source, refresh_rate};
use naguara_server::util::hash_password;
use naguara_server::{AppState, Config, ServiceError, api};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::error::ErrorCode;
use shared::models::{
    ClienteInput, CompraCreate, DetalleCompraInput, DetalleRecibido, DetalleVentaInput,
    EstadoCompra, FuenteTasa, Rol, TransformacionCreate, TransformacionSalida, VentaCreate,
};
use sqlx::PgPool;
use tower::ServiceExt;

const VENDEDOR: i32 = 1;

fn state(pool: PgPool, tasa_api: Option<Decimal>) -> AppState {
    AppState {
        pool,
        config: Arc::new(Config::for_database("postgres://fixture")),
        rates: fixed_source(tasa_api),
    }
}

fn app(pool: PgPool) -> Router {
    api::build_app(state(pool, None))
}

fn app_code(err: ServiceError) -> ErrorCode {
    match err {
        ServiceError::App(e) => e.code,
        ServiceError::Db(e) => panic!("unexpected infrastructure error: {e}"),
    }
}

async fn stock(pool: &PgPool, id: i32) -> Decimal {
    sqlx::query_scalar("SELECT stock FROM productos WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn linea(id_producto: i32, cantidad: Decimal, precio_unitario: Decimal) -> DetalleVentaInput {
    DetalleVentaInput {
        id_producto,
        cantidad,
        precio_unitario,
    }
}

fn venta(detalles: Vec<DetalleVentaInput>) -> VentaCreate {
    VentaCreate {
        id_cliente: None,
        metodo_pago: "tarjeta".into(),
        detalles,
        detalles_pago: None,
        referencia_pago: None,
        banco_pago: None,
        monto_recibido: None,
    }
}

fn extras(venta: &VentaCreate) -> VentaExtras {
    VentaExtras {
        total: venta.total().unwrap(),
        ..Default::default()
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn post_json(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ── Sales ──

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_sale_decrements_stock_per_line(pool: PgPool) {
    let data = venta(vec![
        linea(1, Decimal::new(25, 1), Decimal::from(120)),
        linea(2, Decimal::ONE, Decimal::from(180)),
        linea(1, Decimal::new(5, 1), Decimal::from(120)),
    ]);

    let creada = db::ventas::create(&pool, VENDEDOR, &data, &extras(&data))
        .await
        .unwrap();

    // 2.5 × 120 + 1 × 180 + 0.5 × 120
    assert_eq!(creada.total, Decimal::from(540));
    assert_eq!(stock(&pool, 1).await, Decimal::from(7));
    assert_eq!(stock(&pool, 2).await, Decimal::from(4));
    assert_eq!(count(&pool, "detalle_venta").await, 3);

    let listadas = db::ventas::list(&pool, None).await.unwrap();
    assert_eq!(listadas.len(), 1);
    assert_eq!(listadas[0].total, Decimal::from(540));
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_sale_with_insufficient_stock_rolls_back(pool: PgPool) {
    let data = venta(vec![
        linea(1, Decimal::ONE, Decimal::from(120)),
        linea(2, Decimal::from(6), Decimal::from(180)),
    ]);

    let err = db::ventas::create(&pool, VENDEDOR, &data, &extras(&data))
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::InsufficientStock);

    assert_eq!(stock(&pool, 1).await, Decimal::from(10));
    assert_eq!(stock(&pool, 2).await, Decimal::from(5));
    assert_eq!(count(&pool, "ventas").await, 0);
    assert_eq!(count(&pool, "detalle_venta").await, 0);
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_repeated_product_counts_against_remaining_stock(pool: PgPool) {
    // 3 + 3 fits in 5 only if each line is checked alone
    let data = venta(vec![
        linea(2, Decimal::from(3), Decimal::from(180)),
        linea(2, Decimal::from(3), Decimal::from(180)),
    ]);
    let err = db::ventas::create(&pool, VENDEDOR, &data, &extras(&data))
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::InsufficientStock);
    assert_eq!(stock(&pool, 2).await, Decimal::from(5));
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_sale_of_unknown_product_persists_nothing(pool: PgPool) {
    let data = venta(vec![
        linea(1, Decimal::ONE, Decimal::from(120)),
        linea(99, Decimal::ONE, Decimal::from(10)),
    ]);
    let err = db::ventas::create(&pool, VENDEDOR, &data, &extras(&data))
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::ProductNotFound);
    assert_eq!(stock(&pool, 1).await, Decimal::from(10));
    assert_eq!(count(&pool, "ventas").await, 0);
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_concurrent_sales_never_oversell(pool: PgPool) {
    // Two sales of 6 against a stock of 10: only one can commit
    let data = venta(vec![linea(1, Decimal::from(6), Decimal::from(120))]);
    let extra = extras(&data);

    let (a, b) = tokio::join!(
        db::ventas::create(&pool, VENDEDOR, &data, &extra),
        db::ventas::create(&pool, VENDEDOR, &data, &extra),
    );

    let fallidas: Vec<ErrorCode> = [a, b]
        .into_iter()
        .filter_map(|r| r.err())
        .map(app_code)
        .collect();
    assert_eq!(fallidas, vec![ErrorCode::InsufficientStock]);
    assert_eq!(stock(&pool, 1).await, Decimal::from(4));
    assert_eq!(count(&pool, "ventas").await, 1);
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_sale_endpoint_reports_total_and_change(pool: PgPool) {
    let app = app(pool.clone());
    let config = Config::for_database("postgres://fixture");
    let token = naguara_server::auth::session::create_token(
        &shared::models::SessionUser {
            id: VENDEDOR,
            nombre: "Carmen".into(),
            rol: "Vendedor".into(),
        },
        &config.session_secret,
        config.session_ttl,
    )
    .unwrap();

    let request = post_json(
        "/api/ventas",
        Some(&token),
        json!({
            "metodo_pago": "efectivo_bs",
            "monto_recibido": 500,
            "detalles": [
                { "id_producto": 1, "cantidad": 1.5, "precio_unitario": 120 },
                { "id_producto": 2, "cantidad": 1, "precio_unitario": 180 },
            ],
        }),
    );
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["venta"]["total"], 360.0);

    let cambio: Option<Decimal> = sqlx::query_scalar("SELECT cambio FROM ventas")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(cambio, Some(Decimal::from(140)));
    assert_eq!(stock(&pool, 1).await, Decimal::new(85, 1));
}

// ── Transformations ──

fn transformacion(cantidad_origen: Decimal, detalles: Vec<(i32, Decimal)>) -> TransformacionCreate {
    TransformacionCreate {
        producto_origen_id: 1,
        cantidad_origen,
        peso_origen_real: None,
        observaciones: Some("Despiece".into()),
        detalles: detalles
            .into_iter()
            .map(|(producto_destino_id, cantidad_destino)| TransformacionSalida {
                producto_destino_id,
                cantidad_destino,
            })
            .collect(),
    }
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_transformation_moves_stock(pool: PgPool) {
    let data = transformacion(
        Decimal::from(4),
        vec![(2, Decimal::new(15, 1)), (3, Decimal::from(2))],
    );

    let id = db::transformaciones::create(&pool, VENDEDOR, &data).await.unwrap();

    assert_eq!(stock(&pool, 1).await, Decimal::from(6));
    assert_eq!(stock(&pool, 2).await, Decimal::new(65, 1));
    assert_eq!(stock(&pool, 3).await, Decimal::from(2));

    let salidas = db::transformaciones::detalles(&pool, id).await.unwrap();
    assert_eq!(salidas.len(), 2);
    let peso: Option<Decimal> =
        sqlx::query_scalar("SELECT peso_origen_real FROM transformacion_producto WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(peso, Some(Decimal::from(4)));
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_transformation_failures_roll_back(pool: PgPool) {
    let sin_stock = transformacion(Decimal::from(11), vec![(2, Decimal::ONE)]);
    let err = db::transformaciones::create(&pool, VENDEDOR, &sin_stock)
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::InsufficientStock);

    let sin_destino = transformacion(Decimal::from(2), vec![(2, Decimal::ONE), (99, Decimal::ONE)]);
    let err = db::transformaciones::create(&pool, VENDEDOR, &sin_destino)
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::ProductNotFound);

    assert_eq!(stock(&pool, 1).await, Decimal::from(10));
    assert_eq!(stock(&pool, 2).await, Decimal::from(5));
    assert_eq!(count(&pool, "transformacion_producto").await, 0);
}

// ── Purchases ──

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_purchase_receipts_add_only_the_delta(pool: PgPool) {
    let compra = CompraCreate {
        id_proveedor: 1,
        num_factura: Some("F-0012".into()),
        observaciones: None,
        detalles: vec![DetalleCompraInput {
            id_producto: 3,
            cantidad: Decimal::from(10),
            precio_compra: Decimal::from(50),
        }],
    };
    let id = db::compras::create(&pool, VENDEDOR, &compra).await.unwrap();
    let cabecera = db::compras::find(&pool, id).await.unwrap().unwrap();
    assert_eq!(cabecera.total, Decimal::from(500));

    let id_detalle = db::compras::detalles(&pool, id).await.unwrap()[0].id;
    let recibido = |cantidad: i64| {
        vec![DetalleRecibido {
            id_detalle,
            cantidad_recibida: Decimal::from(cantidad),
            lote: None,
            fecha_vencimiento: None,
        }]
    };

    let estado = db::compras::recibir(&pool, id, &recibido(4)).await.unwrap();
    assert_eq!(estado, EstadoCompra::Parcial);
    assert_eq!(stock(&pool, 3).await, Decimal::from(4));

    let estado = db::compras::recibir(&pool, id, &recibido(7)).await.unwrap();
    assert_eq!(estado, EstadoCompra::Parcial);
    assert_eq!(stock(&pool, 3).await, Decimal::from(7));

    let err = db::compras::recibir(&pool, id, &recibido(5)).await.unwrap_err();
    assert_eq!(app_code(err), ErrorCode::ValidationFailed);
    let err = db::compras::recibir(&pool, id, &recibido(11)).await.unwrap_err();
    assert_eq!(app_code(err), ErrorCode::ReceiveExceedsOrdered);
    assert_eq!(stock(&pool, 3).await, Decimal::from(7));

    let estado = db::compras::recibir(&pool, id, &recibido(10)).await.unwrap();
    assert_eq!(estado, EstadoCompra::Recibida);
    assert_eq!(stock(&pool, 3).await, Decimal::from(10));

    let err = db::compras::recibir(&pool, id, &recibido(10)).await.unwrap_err();
    assert_eq!(app_code(err), ErrorCode::PurchaseAlreadyReceived);
}

// ── Clients ──

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_duplicate_cedula_is_a_conflict(pool: PgPool) {
    let input = ClienteInput {
        cedula_rif: "V-12345678".into(),
        nombre: "María Pérez".into(),
        telefono: None,
        direccion: None,
    };
    db::clientes::create(&pool, &input).await.unwrap();

    // The unique index itself rejects a second row
    let err = db::clientes::create(&pool, &input).await.unwrap_err();
    assert_eq!(err.pg_code().as_deref(), Some("23505"));

    let config = Config::for_database("postgres://fixture");
    let token = naguara_server::auth::session::create_token(
        &shared::models::SessionUser {
            id: VENDEDOR,
            nombre: "Carmen".into(),
            rol: "Vendedor".into(),
        },
        &config.session_secret,
        config.session_ttl,
    )
    .unwrap();
    let request = post_json(
        "/api/clientes",
        Some(&token),
        json!({ "cedula_rif": " V-12345678 ", "nombre": "Otra María" }),
    );
    let (status, _, body) = send(app(pool.clone()), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6302);
    assert_eq!(count(&pool, "clientes").await, 1);
}

// ── Dashboard ──

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_dashboard_counts_match_tables(pool: PgPool) {
    let stats = db::configuracion::dashboard_stats(&pool).await.unwrap();
    assert_eq!(stats.total_productos, 3);
    assert_eq!(stats.total_proveedores, 2);
    assert_eq!(stats.productos_stock_minimo, 1);
    assert_eq!(stats.ventas_hoy, 0);

    let data = venta(vec![linea(2, Decimal::new(45, 1), Decimal::from(180))]);
    db::ventas::create(&pool, VENDEDOR, &data, &extras(&data))
        .await
        .unwrap();

    // Pechuga drops to 0.5, below its minimum of 1
    let stats = db::configuracion::dashboard_stats(&pool).await.unwrap();
    assert_eq!(stats.ventas_hoy, 1);
    assert_eq!(stats.productos_stock_minimo, 2);
}

// ── Login ──

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_login_sets_cookie_only_on_success(pool: PgPool) {
    let hash = hash_password("secreto123").unwrap();
    db::usuarios::create(&pool, "Luis", "luis", &hash, Rol::Vendedor)
        .await
        .unwrap();
    let app = app(pool);

    let request = post_json(
        "/login",
        None,
        json!({ "nombre_usuario": "luis", "password": "otra" }),
    );
    let (status, headers, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Contraseña incorrecta");
    assert!(headers.get(header::SET_COOKIE).is_none());

    let request = post_json(
        "/login",
        None,
        json!({ "nombre_usuario": "nadie", "password": "secreto123" }),
    );
    let (status, headers, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.get(header::SET_COOKIE).is_none());

    let request = post_json(
        "/login",
        None,
        json!({ "nombre_usuario": "luis", "password": "secreto123" }),
    );
    let (status, headers, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usuario"]["nombre"], "Luis");
    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("naguara.sid="));
    assert!(cookie.contains("HttpOnly"));
}

// ── Exchange rate ──

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_rate_falls_back_to_stored_value(pool: PgPool) {
    db::tasas::insert_rate(&pool, Decimal::new(405, 1), "manual")
        .await
        .unwrap();

    let tasa = refresh_rate(&state(pool.clone(), None)).await;
    assert_eq!(tasa.tasa_bs, Decimal::new(405, 1));
    assert_eq!(tasa.fuente, FuenteTasa::Fallback);
    assert_eq!(count(&pool, "tasa_cambio").await, 1);
}

#[sqlx::test(migrations = "./migrations", fixtures("catalogo"))]
async fn test_rate_from_api_is_stored_when_it_moves(pool: PgPool) {
    db::tasas::insert_rate(&pool, Decimal::new(405, 1), "manual")
        .await
        .unwrap();

    // Within the 0.1 threshold: nothing new is stored
    let tasa = refresh_rate(&state(pool.clone(), Some(Decimal::new(4055, 2)))).await;
    assert_eq!(tasa.fuente, FuenteTasa::ApiOficial);
    assert_eq!(count(&pool, "tasa_cambio").await, 1);

    let tasa = refresh_rate(&state(pool.clone(), Some(Decimal::from(41)))).await;
    assert_eq!(tasa.tasa_bs, Decimal::from(41));
    assert_eq!(count(&pool, "tasa_cambio").await, 2);
    assert_eq!(
        db::tasas::latest_rate(&pool).await.unwrap(),
        Some(Decimal::from(41))
    );
}
