//! Sale invoice rendering
//!
//! Builds a self-contained HTML document for `GET /api/ventas/{id}/factura`.
//! Amounts are shown in Bolívares and, when the sale recorded an exchange
//! rate, in US dollars at that rate.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use shared::models::{
    FacturaEmpresa, METODOS_PAGO_DEFAULT, VentaDetalle, precio_en_dolares, round_money,
};

/// Venezuela standard time (UTC-4)
const VET_OFFSET_SECS: i32 = -4 * 3600;

const STYLE: &str = "body{font-family:monospace;max-width:420px;margin:0 auto;font-size:13px}\
h1,h2{text-align:center;margin:4px 0}.center{text-align:center}\
table{width:100%;border-collapse:collapse}th,td{padding:2px 0}\
.r{text-align:right}.total{font-weight:bold;border-top:1px solid #000}\
.sep{border-top:2px solid #000;margin:8px 0}";

/// Invoice document number, e.g. `VENT-000042`
pub fn numero_venta(id: i32) -> String {
    format!("VENT-{id:06}")
}

/// Display name of a payment method id
pub fn nombre_metodo(metodo: &str) -> &str {
    METODOS_PAGO_DEFAULT
        .iter()
        .find(|(id, _)| *id == metodo)
        .map(|(_, nombre)| *nombre)
        .unwrap_or(metodo)
}

/// Render the invoice of a sale.
pub fn render_factura_venta(empresa: &FacturaEmpresa, venta: &VentaDetalle) -> String {
    let tasa = venta.tasa_cambio.filter(|t| *t > Decimal::ZERO);
    let numero = numero_venta(venta.id);
    let fecha = fecha_local(venta.fecha_venta);

    let mut doc = HtmlWriter::new();
    doc.raw("<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\">")
        .raw("<title>Factura ")
        .text(&numero)
        .raw("</title><style>")
        .raw(STYLE)
        .raw("</style></head><body>");

    // Company
    doc.tag("h1", &empresa.nombre)
        .p("center", &format!("RIF: {}", empresa.rif))
        .p("center", &empresa.direccion)
        .p("center", &format!("Tel: {}", empresa.telefono))
        .raw("<div class=\"sep\"></div>");

    // Client
    let cliente = &venta.cliente;
    doc.field("RIF/C.I.", cliente.cedula_rif.as_deref().unwrap_or("-"))
        .field("Razón Social", cliente.nombre.as_deref().unwrap_or("Consumidor final"))
        .field("Dirección", cliente.direccion.as_deref().unwrap_or("-"))
        .field("Teléfono", cliente.telefono.as_deref().unwrap_or("-"))
        .field("Cajero", venta.vendedor.as_deref().unwrap_or("-"));

    doc.tag("h2", "FACTURA")
        .field("Factura", &numero)
        .field("Fecha", &fecha.format("%d/%m/%Y").to_string())
        .field("Hora", &fecha.format("%H:%M").to_string());

    // Lines
    doc.raw("<table><thead><tr><th>Producto</th><th>Cant.</th>")
        .raw("<th class=\"r\">Precio</th><th class=\"r\">Monto</th></tr></thead><tbody>");
    for linea in &venta.detalles {
        let unidad = linea.unidad_medida.as_deref().unwrap_or("");
        doc.raw("<tr><td>")
            .text(linea.producto_nombre.as_deref().unwrap_or("-"))
            .raw("</td><td>")
            .text(&format!("{} {unidad}", linea.cantidad.normalize()))
            .raw("</td><td class=\"r\">")
            .text(&bs(linea.precio_unitario))
            .raw("</td><td class=\"r\">")
            .text(&bs(linea.subtotal()))
            .raw("</td></tr>");
    }
    doc.raw("</tbody></table><div class=\"sep\"></div>");

    // Totals
    doc.raw("<table>")
        .amount_row("", "Subtotal", venta.subtotal, tasa)
        .amount_row(
            "",
            &format!("IVA ({}%)", venta.iva_rate.normalize()),
            venta.iva,
            tasa,
        )
        .amount_row("total", "TOTAL", venta.total, tasa)
        .raw("</table>");

    doc.field("Método de pago", nombre_metodo(&venta.metodo_pago));
    if let Some(tasa) = tasa {
        doc.p("center", &format!("Tasa de cambio: 1 USD = {tasa} Bs"));
    }
    doc.raw("<div class=\"sep\"></div>")
        .p("center", &empresa.mensaje)
        .raw("</body></html>");

    doc.finish()
}

fn fecha_local(fecha: DateTime<Utc>) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(VET_OFFSET_SECS)
        .map(|offset| fecha.with_timezone(&offset))
        .unwrap_or_else(|| fecha.fixed_offset())
}

fn bs(amount: Decimal) -> String {
    format!("Bs. {:.2}", round_money(amount))
}

fn usd(amount: Decimal, tasa: Decimal) -> Option<String> {
    precio_en_dolares(amount, tasa).map(|v| format!("$ {v:.2}"))
}

/// Escape text for HTML element and attribute content
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Small fluent HTML writer; `text` always escapes.
struct HtmlWriter {
    buf: String,
}

impl HtmlWriter {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(4096),
        }
    }

    fn raw(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self
    }

    fn text(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(&escape_html(s));
        self
    }

    fn tag(&mut self, name: &str, content: &str) -> &mut Self {
        self.raw("<").raw(name).raw(">").text(content).raw("</").raw(name).raw(">")
    }

    fn p(&mut self, class: &str, content: &str) -> &mut Self {
        self.raw("<p class=\"").raw(class).raw("\">").text(content).raw("</p>")
    }

    fn field(&mut self, label: &str, value: &str) -> &mut Self {
        self.raw("<p><strong>")
            .text(label)
            .raw(":</strong> ")
            .text(value)
            .raw("</p>")
    }

    fn amount_row(
        &mut self,
        class: &str,
        label: &str,
        amount: Decimal,
        tasa: Option<Decimal>,
    ) -> &mut Self {
        self.raw("<tr class=\"")
            .raw(class)
            .raw("\"><td>")
            .text(label)
            .raw("</td><td class=\"r\">")
            .text(&bs(amount))
            .raw("</td><td class=\"r\">");
        if let Some(usd) = tasa.and_then(|t| usd(amount, t)) {
            self.text(&usd);
        }
        self.raw("</td></tr>")
    }

    fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ClienteVenta, DetalleVenta};

    fn venta(tasa_cambio: Option<Decimal>) -> VentaDetalle {
        VentaDetalle {
            id: 42,
            fecha_venta: Utc::now(),
            cliente: ClienteVenta {
                nombre: Some("Pollos <Ana> & Cía".into()),
                cedula_rif: Some("J-12345678".into()),
                telefono: None,
                direccion: None,
            },
            vendedor: Some("Luis".into()),
            metodo_pago: "pago_movil".into(),
            tasa_cambio,
            detalles: vec![DetalleVenta {
                id: 1,
                id_venta: 42,
                id_producto: 3,
                cantidad: Decimal::new(15, 1),
                precio_unitario: Decimal::from(200),
                producto_nombre: Some("Pechuga".into()),
                unidad_medida: Some("kg".into()),
            }],
            subtotal: Decimal::from(300),
            iva: Decimal::from(48),
            iva_rate: Decimal::from(16),
            total: Decimal::from(348),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Pechuga"), "Pechuga");
    }

    #[test]
    fn test_render_contains_amounts() {
        let html = render_factura_venta(&FacturaEmpresa::from(None), &venta(Some(Decimal::from(200))));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("VENT-000042"));
        assert!(html.contains("Na&#39;Guara"));
        assert!(html.contains("Pechuga"));
        assert!(html.contains("1.5 kg"));
        assert!(html.contains("Bs. 300.00"));
        assert!(html.contains("IVA (16%)"));
        assert!(html.contains("Bs. 348.00"));
        assert!(html.contains("$ 1.74"));
        assert!(html.contains("Pago Móvil"));
        assert!(html.contains("1 USD = 200 Bs"));
    }

    #[test]
    fn test_render_escapes_client() {
        let html = render_factura_venta(&FacturaEmpresa::from(None), &venta(None));
        assert!(html.contains("Pollos &lt;Ana&gt; &amp; Cía"));
        assert!(!html.contains("<Ana>"));
    }

    #[test]
    fn test_render_without_rate_has_no_usd() {
        let html = render_factura_venta(&FacturaEmpresa::from(None), &venta(None));
        assert!(!html.contains("$ "));
        assert!(!html.contains("Tasa de cambio"));
    }

    #[test]
    fn test_nombre_metodo() {
        assert_eq!(nombre_metodo("efectivo_usd"), "Efectivo USD");
        assert_eq!(nombre_metodo("cripto"), "cripto");
    }
}
