//! Bs/USD exchange rate: official API with a stored/default fallback chain
//!
//! Resolution order:
//! 1. the official API (`promedio`, else `compra`, else `venta`, must be > 0)
//! 2. the most recent active stored rate
//! 3. the configured default
//!
//! A resolved rate that moved more than the configured threshold from the
//! latest stored row is persisted with `fuente = 'api'`. The same cycle runs
//! on request and from the background poller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{FuenteTasa, TasaActual};
use tokio::task::JoinHandle;

use crate::db;
use crate::error::{BoxError, ServiceResult};
use crate::state::AppState;

/// Rate reported by a source
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRate {
    pub tasa_bs: Decimal,
    pub fecha_actualizacion: Option<DateTime<Utc>>,
}

/// Upstream provider of the official rate
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedRate, BoxError>;
}

/// `ve.dolarapi.com` response (only the fields we read)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DolarApiResponse {
    pub promedio: Option<Decimal>,
    pub compra: Option<Decimal>,
    pub venta: Option<Decimal>,
    #[serde(rename = "fechaActualizacion")]
    pub fecha_actualizacion: Option<String>,
}

impl DolarApiResponse {
    /// First positive of `promedio`, `compra`, `venta`
    pub fn tasa(&self) -> Option<Decimal> {
        [self.promedio, self.compra, self.venta]
            .into_iter()
            .flatten()
            .find(|v| *v > Decimal::ZERO)
    }

    pub fn fecha(&self) -> Option<DateTime<Utc>> {
        self.fecha_actualizacion
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

/// HTTP client for the official-rate API
pub struct DolarApiSource {
    client: reqwest::Client,
    url: String,
}

impl DolarApiSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateSource for DolarApiSource {
    async fn fetch(&self) -> Result<FetchedRate, BoxError> {
        let body: DolarApiResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tasa_bs = body.tasa().ok_or("Tasa no válida")?;
        Ok(FetchedRate {
            tasa_bs,
            fecha_actualizacion: body.fecha(),
        })
    }
}

/// Rate chosen by [`resolve_rate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    pub tasa_bs: Decimal,
    pub fecha_actualizacion: DateTime<Utc>,
    pub fuente: FuenteTasa,
}

/// Walk the fallback chain: source, then `last_active`, then `default_rate`.
pub async fn resolve_rate(
    source: &dyn RateSource,
    last_active: Option<Decimal>,
    default_rate: Decimal,
) -> ResolvedRate {
    match source.fetch().await {
        Ok(fetched) if fetched.tasa_bs > Decimal::ZERO => ResolvedRate {
            tasa_bs: fetched.tasa_bs,
            fecha_actualizacion: fetched.fecha_actualizacion.unwrap_or_else(Utc::now),
            fuente: FuenteTasa::ApiOficial,
        },
        outcome => {
            match outcome {
                Err(e) => tracing::warn!(error = %e, "Exchange-rate API unavailable, using fallback"),
                Ok(fetched) => {
                    tracing::warn!(tasa = %fetched.tasa_bs, "Exchange-rate API returned an unusable rate")
                }
            }
            ResolvedRate {
                tasa_bs: last_active.unwrap_or(default_rate),
                fecha_actualizacion: Utc::now(),
                fuente: FuenteTasa::Fallback,
            }
        }
    }
}

/// A missing stored rate counts as zero.
pub fn should_persist(tasa: Decimal, last_stored: Option<Decimal>, threshold: Decimal) -> bool {
    (tasa - last_stored.unwrap_or(Decimal::ZERO)).abs() > threshold
}

/// Run one resolve-compare-persist cycle.
///
/// Database failures are logged and skipped: the resolved rate is still
/// returned.
pub async fn refresh_rate(state: &AppState) -> TasaActual {
    let last_active = db::tasas::latest_active_rate(&state.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read stored exchange rate");
            None
        });
    let resolved = resolve_rate(
        state.rates.as_ref(),
        last_active,
        state.config.fx_default_rate,
    )
    .await;

    if let Err(e) = persist_if_moved(state, resolved.tasa_bs).await {
        tracing::warn!(tasa = %resolved.tasa_bs, error = %e, "Could not store exchange rate");
    }

    TasaActual::new(
        resolved.tasa_bs,
        resolved.fecha_actualizacion,
        resolved.fuente,
    )
}

async fn persist_if_moved(state: &AppState, tasa: Decimal) -> ServiceResult<()> {
    let last_stored = db::tasas::latest_rate(&state.pool).await?;
    if should_persist(tasa, last_stored, state.config.fx_change_threshold) {
        db::tasas::insert_rate(&state.pool, tasa, "api").await?;
        tracing::info!(tasa = %tasa, "Stored new exchange rate");
    }
    Ok(())
}

/// Latest stored rate, or the configured default (used to price listings)
pub async fn current_stored_rate(state: &AppState) -> ServiceResult<Decimal> {
    Ok(db::tasas::latest_rate(&state.pool)
        .await?
        .unwrap_or(state.config.fx_default_rate))
}

/// Spawn the background poller; the first cycle runs immediately.
pub fn spawn_rate_poller(state: AppState) -> JoinHandle<()> {
    let period = state.config.fx_poll_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let tasa = refresh_rate(&state).await;
            tracing::debug!(tasa = %tasa.tasa_bs, fuente = ?tasa.fuente, "Exchange rate polled");
        }
    })
}

/// Rate source that always reports the same value (local tooling and tests)
pub struct FixedRateSource(pub Option<Decimal>);

#[async_trait]
impl RateSource for FixedRateSource {
    async fn fetch(&self) -> Result<FetchedRate, BoxError> {
        let tasa_bs = self.0.ok_or("Tasa no disponible")?;
        Ok(FetchedRate {
            tasa_bs,
            fecha_actualizacion: None,
        })
    }
}

pub fn fixed_source(tasa: Option<Decimal>) -> Arc<dyn RateSource> {
    Arc::new(FixedRateSource(tasa))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FX_RATE;

    #[test]
    fn test_api_field_precedence() {
        let body: DolarApiResponse =
            serde_json::from_str(r#"{"compra":36.1,"venta":36.9,"promedio":36.5}"#).unwrap();
        assert_eq!(body.tasa(), Some(Decimal::new(365, 1)));

        let body: DolarApiResponse =
            serde_json::from_str(r#"{"compra":36.1,"venta":36.9,"promedio":null}"#).unwrap();
        assert_eq!(body.tasa(), Some(Decimal::new(361, 1)));

        let body: DolarApiResponse =
            serde_json::from_str(r#"{"promedio":0,"compra":0,"venta":37}"#).unwrap();
        assert_eq!(body.tasa(), Some(Decimal::from(37)));

        let body: DolarApiResponse = serde_json::from_str(r#"{"promedio":0}"#).unwrap();
        assert_eq!(body.tasa(), None);
    }

    #[test]
    fn test_api_date_parsing() {
        let body: DolarApiResponse = serde_json::from_str(
            r#"{"promedio":36.5,"fechaActualizacion":"2025-03-01T12:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(
            body.fecha().map(|d| d.to_rfc3339()),
            Some("2025-03-01T12:00:00+00:00".to_string())
        );

        let body = DolarApiResponse {
            fecha_actualizacion: Some("ayer".into()),
            ..Default::default()
        };
        assert_eq!(body.fecha(), None);
    }

    #[tokio::test]
    async fn test_resolve_uses_api_rate() {
        let source = FixedRateSource(Some(Decimal::new(3650, 2)));
        let resolved = resolve_rate(&source, Some(Decimal::from(30)), DEFAULT_FX_RATE).await;
        assert_eq!(resolved.tasa_bs, Decimal::new(3650, 2));
        assert_eq!(resolved.fuente, FuenteTasa::ApiOficial);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_stored_rate() {
        let source = FixedRateSource(None);
        let resolved = resolve_rate(&source, Some(Decimal::from(30)), DEFAULT_FX_RATE).await;
        assert_eq!(resolved.tasa_bs, Decimal::from(30));
        assert_eq!(resolved.fuente, FuenteTasa::Fallback);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_default() {
        let source = FixedRateSource(None);
        let resolved = resolve_rate(&source, None, DEFAULT_FX_RATE).await;
        assert_eq!(resolved.tasa_bs, DEFAULT_FX_RATE);
        assert_eq!(resolved.fuente, FuenteTasa::Fallback);
    }

    #[tokio::test]
    async fn test_resolve_rejects_non_positive_rate() {
        let source = FixedRateSource(Some(Decimal::ZERO));
        let resolved = resolve_rate(&source, None, DEFAULT_FX_RATE).await;
        assert_eq!(resolved.tasa_bs, DEFAULT_FX_RATE);
        assert_eq!(resolved.fuente, FuenteTasa::Fallback);
    }

    #[test]
    fn test_should_persist_threshold() {
        let threshold = Decimal::new(1, 1);
        assert!(!should_persist(Decimal::new(3655, 2), Some(Decimal::new(365, 1)), threshold));
        assert!(!should_persist(Decimal::new(366, 1), Some(Decimal::new(365, 1)), threshold));
        assert!(should_persist(Decimal::new(3661, 2), Some(Decimal::new(365, 1)), threshold));
        assert!(should_persist(Decimal::new(3639, 2), Some(Decimal::new(365, 1)), threshold));
        assert!(should_persist(Decimal::new(365, 1), None, threshold));
    }

    #[tokio::test]
    async fn test_dolarapi_source_unreachable_is_error() {
        // Port 9 (discard) on localhost is not an HTTP server
        let source = DolarApiSource::new("http://127.0.0.1:9/v1/dolares/oficial", Duration::from_millis(500)).unwrap();
        assert!(source.fetch().await.is_err());
    }
}
