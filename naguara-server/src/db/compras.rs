//! Compra database operations (supplier purchases)

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Compra, CompraCreate, CompraQuery, DetalleCompra, DetalleRecibido, EstadisticasCompras,
    EstadoCompra, FacturaProveedor, TopProveedor,
};
use sqlx::PgPool;

use crate::error::ServiceResult;

const COMPRA_SELECT: &str = r#"
    SELECT c.id, c.id_proveedor, c.id_usuario, c.num_factura, c.observaciones, c.estado,
           c.total, c.fecha_compra, c.fecha_recepcion,
           p.nombre AS proveedor_nombre, u.nombre AS usuario_nombre
    FROM compras c
    LEFT JOIN proveedores p ON c.id_proveedor = p.id
    LEFT JOIN usuarios u ON c.id_usuario = u.id
"#;

pub async fn list(pool: &PgPool, query: &CompraQuery) -> ServiceResult<Vec<Compra>> {
    let rows = sqlx::query_as::<_, Compra>(&format!(
        r#"{COMPRA_SELECT}
        WHERE ($1::TEXT IS NULL OR c.estado = $1)
          AND ($2::INT IS NULL OR c.id_proveedor = $2)
          AND ($3::DATE IS NULL OR c.fecha_compra >= $3)
          AND ($4::DATE IS NULL OR c.fecha_compra < $4::DATE + 1)
        ORDER BY c.fecha_compra DESC"#
    ))
    .bind(query.estado.as_deref().filter(|s| !s.is_empty()))
    .bind(query.proveedor_id)
    .bind(query.fecha_desde)
    .bind(query.fecha_hasta)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, id: i32) -> ServiceResult<Option<Compra>> {
    let row = sqlx::query_as::<_, Compra>(&format!("{COMPRA_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn detalles(pool: &PgPool, id_compra: i32) -> ServiceResult<Vec<DetalleCompra>> {
    let rows = sqlx::query_as::<_, DetalleCompra>(
        r#"
        SELECT dc.id, dc.id_compra, dc.id_producto, dc.cantidad, dc.precio_compra,
               dc.cantidad_recibida, dc.lote, dc.fecha_vencimiento,
               pr.nombre AS producto_nombre, pr.unidad_medida
        FROM detalle_compra dc
        LEFT JOIN productos pr ON dc.id_producto = pr.id
        WHERE dc.id_compra = $1
        ORDER BY dc.id
        "#,
    )
    .bind(id_compra)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Supplier block of the purchase invoice
pub async fn proveedor_factura(pool: &PgPool, id_proveedor: Option<i32>) -> ServiceResult<FacturaProveedor> {
    let row = sqlx::query_as::<_, FacturaProveedor>(
        "SELECT nombre, contacto, direccion FROM proveedores WHERE id = $1",
    )
    .bind(id_proveedor)
    .fetch_optional(pool)
    .await?;
    Ok(row.unwrap_or(FacturaProveedor {
        nombre: None,
        contacto: None,
        direccion: None,
    }))
}

/// Insert a pending purchase with its lines; the total is computed in SQL.
pub async fn create(pool: &PgPool, usuario_id: i32, data: &CompraCreate) -> ServiceResult<i32> {
    let mut tx = pool.begin().await?;

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO compras (id_proveedor, id_usuario, num_factura, observaciones, estado)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(data.id_proveedor)
    .bind(usuario_id)
    .bind(&data.num_factura)
    .bind(&data.observaciones)
    .bind(EstadoCompra::Pendiente.as_str())
    .fetch_one(&mut *tx)
    .await?;

    for detalle in &data.detalles {
        sqlx::query(
            r#"
            INSERT INTO detalle_compra (id_compra, id_producto, cantidad, precio_compra, cantidad_recibida)
            VALUES ($1, $2, $3, $4, 0)
            "#,
        )
        .bind(id)
        .bind(detalle.id_producto)
        .bind(detalle.cantidad)
        .bind(detalle.precio_compra)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        UPDATE compras SET total = COALESCE(
            (SELECT SUM(cantidad * precio_compra) FROM detalle_compra WHERE id_compra = $1), 0)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

/// Record received quantities and add the newly received delta to stock.
///
/// `cantidad_recibida` is the cumulative quantity for the line: it may not
/// exceed the ordered quantity nor go below what was already received.
pub async fn recibir(
    pool: &PgPool,
    id: i32,
    recibidos: &[DetalleRecibido],
) -> ServiceResult<EstadoCompra> {
    let mut tx = pool.begin().await?;

    let estado: Option<String> =
        sqlx::query_scalar("SELECT estado FROM compras WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let estado = estado.ok_or_else(|| AppError::new(ErrorCode::PurchaseNotFound))?;
    if estado == EstadoCompra::Recibida.as_str() {
        return Err(AppError::new(ErrorCode::PurchaseAlreadyReceived).into());
    }

    for recibido in recibidos {
        let linea: Option<(i32, Decimal, Decimal)> = sqlx::query_as(
            "SELECT id_producto, cantidad, cantidad_recibida FROM detalle_compra \
             WHERE id = $1 AND id_compra = $2 FOR UPDATE",
        )
        .bind(recibido.id_detalle)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let (id_producto, cantidad, anterior) = linea.ok_or_else(|| {
            AppError::new(ErrorCode::PurchaseLineNotFound).with_detail("id_detalle", recibido.id_detalle)
        })?;

        if recibido.cantidad_recibida > cantidad {
            return Err(AppError::new(ErrorCode::ReceiveExceedsOrdered)
                .with_detail("id_detalle", recibido.id_detalle)
                .with_detail("cantidad", cantidad.to_string())
                .into());
        }
        if recibido.cantidad_recibida < anterior {
            return Err(AppError::validation(format!(
                "La cantidad recibida no puede ser menor a la ya recibida ({anterior})"
            ))
            .with_detail("id_detalle", recibido.id_detalle)
            .into());
        }

        sqlx::query(
            "UPDATE detalle_compra SET cantidad_recibida = $1, lote = COALESCE($2, lote), \
             fecha_vencimiento = COALESCE($3, fecha_vencimiento) WHERE id = $4",
        )
        .bind(recibido.cantidad_recibida)
        .bind(&recibido.lote)
        .bind(recibido.fecha_vencimiento)
        .bind(recibido.id_detalle)
        .execute(&mut *tx)
        .await?;

        let delta = recibido.cantidad_recibida - anterior;
        if delta > Decimal::ZERO {
            sqlx::query("UPDATE productos SET stock = stock + $1 WHERE id = $2")
                .bind(delta)
                .bind(id_producto)
                .execute(&mut *tx)
                .await?;
        }
    }

    let lineas: Vec<(Decimal, Decimal)> = sqlx::query_as(
        "SELECT cantidad, cantidad_recibida FROM detalle_compra WHERE id_compra = $1",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;
    let nuevo_estado = EstadoCompra::tras_recepcion(&lineas);

    sqlx::query("UPDATE compras SET estado = $1, fecha_recepcion = NOW() WHERE id = $2")
        .bind(nuevo_estado.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(nuevo_estado)
}

pub async fn estadisticas(pool: &PgPool, mes: u32, anio: i32) -> ServiceResult<EstadisticasCompras> {
    let row = sqlx::query_as::<_, EstadisticasCompras>(
        r#"
        SELECT COUNT(*) AS total_compras,
               COALESCE(SUM(total), 0) AS total_invertido,
               COALESCE(AVG(total), 0) AS promedio_compra,
               COUNT(*) FILTER (WHERE estado = 'pendiente') AS compras_pendientes,
               COUNT(*) FILTER (WHERE estado = 'recibida') AS compras_recibidas
        FROM compras
        WHERE EXTRACT(MONTH FROM fecha_compra) = $1 AND EXTRACT(YEAR FROM fecha_compra) = $2
        "#,
    )
    .bind(mes as i32)
    .bind(anio)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Top 5 suppliers by amount purchased
pub async fn top_proveedores(pool: &PgPool) -> ServiceResult<Vec<TopProveedor>> {
    let rows = sqlx::query_as::<_, TopProveedor>(
        r#"
        SELECT p.id, p.nombre,
               COUNT(c.id) AS total_compras,
               COALESCE(SUM(c.total), 0) AS total_comprado
        FROM proveedores p
        LEFT JOIN compras c ON p.id = c.id_proveedor
        GROUP BY p.id, p.nombre
        ORDER BY total_comprado DESC
        LIMIT 5
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
