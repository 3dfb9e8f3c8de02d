//! Parâmetros do oráculo e dos pools: defaults, leitura de ambiente e validação.
//!
//! Configuração inválida é rejeitada na hora e nunca persistida.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::math::BPS_SCALE;

/// Parâmetros do agregador, do circuit breaker e do histórico.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Quórum mínimo de submissões frescas.
    pub min_sources: usize,
    /// Idade máxima (s) de uma submissão ou do preço publicado.
    pub stale_threshold_secs: u64,
    /// Confiança mínima (0..=100) para `is_healthy`.
    pub confidence_threshold: u8,
    /// Desvio (bps) acima do qual o breaker dispara.
    pub trip_threshold_bps: u32,
    /// Desvio (bps) em relação ao último preço normal abaixo do qual o breaker se recupera.
    pub reset_threshold_bps: u32,
    pub breaker_enabled: bool,
    /// Buckets retidos no histórico (24 × 30 buckets horários).
    pub history_capacity: usize,
    /// Buckets considerados no TWAP.
    pub twap_window: usize,
    pub bucket_secs: u64,
    /// Faixa (bps) em torno do preço publicado que conta como submissão precisa.
    pub accuracy_band_bps: u32,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            min_sources: 3,
            stale_threshold_secs: 300,
            confidence_threshold: 70,
            trip_threshold_bps: 2_000,
            reset_threshold_bps: 1_000,
            breaker_enabled: true,
            history_capacity: 24 * 30,
            twap_window: 24,
            bucket_secs: 3_600,
            accuracy_band_bps: 100,
        }
    }
}

fn bps_in_range(name: &str, v: u32) -> Result<()> {
    if v == 0 || v > BPS_SCALE {
        crate::core_bail!(ErrorCode::InvalidConfig, { "field" => name, "value" => v });
    }
    Ok(())
}

impl OracleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_sources == 0 {
            crate::core_bail!(ErrorCode::InvalidConfig, { "field" => "min_sources", "value" => 0 });
        }
        if self.confidence_threshold > 100 {
            crate::core_bail!(ErrorCode::InvalidConfig, {
                "field" => "confidence_threshold",
                "value" => self.confidence_threshold,
            });
        }
        bps_in_range("trip_threshold_bps", self.trip_threshold_bps)?;
        bps_in_range("reset_threshold_bps", self.reset_threshold_bps)?;
        bps_in_range("accuracy_band_bps", self.accuracy_band_bps)?;
        if self.reset_threshold_bps > self.trip_threshold_bps {
            crate::core_bail!(ErrorCode::InvalidConfig, {
                "field" => "reset_threshold_bps",
                "value" => self.reset_threshold_bps,
                "trip" => self.trip_threshold_bps,
            });
        }
        if self.stale_threshold_secs == 0
            || self.history_capacity == 0
            || self.twap_window == 0
            || self.bucket_secs == 0
        {
            crate::core_bail!(ErrorCode::InvalidConfig, { "field" => "janelas", "value" => 0 });
        }
        Ok(())
    }

    /// Lê `ORACLE_*` do ambiente; variáveis ausentes ficam no default.
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let s = Self {
            min_sources: env_or("ORACLE_MIN_SOURCES", d.min_sources)?,
            stale_threshold_secs: env_or("ORACLE_STALE_THRESHOLD_SECS", d.stale_threshold_secs)?,
            confidence_threshold: env_or("ORACLE_CONFIDENCE_THRESHOLD", d.confidence_threshold)?,
            trip_threshold_bps: env_or("ORACLE_TRIP_THRESHOLD_BPS", d.trip_threshold_bps)?,
            reset_threshold_bps: env_or("ORACLE_RESET_THRESHOLD_BPS", d.reset_threshold_bps)?,
            breaker_enabled: env_or("ORACLE_BREAKER_ENABLED", d.breaker_enabled)?,
            history_capacity: env_or("ORACLE_HISTORY_CAPACITY", d.history_capacity)?,
            twap_window: env_or("ORACLE_TWAP_WINDOW", d.twap_window)?,
            bucket_secs: env_or("ORACLE_BUCKET_SECS", d.bucket_secs)?,
            accuracy_band_bps: env_or("ORACLE_ACCURACY_BAND_BPS", d.accuracy_band_bps)?,
        };
        s.validate()?;
        Ok(s)
    }

    /// Aplica um `SettingsUpdate` numa cópia e valida antes de devolver.
    pub fn apply(&self, update: &SettingsUpdate) -> Result<Self> {
        let mut next = self.clone();
        if let Some(n) = update.min_sources {
            next.min_sources = n;
        }
        if let Some(c) = update.confidence_threshold {
            next.confidence_threshold = c;
        }
        if let Some(bps) = update.deviation_threshold_bps {
            next.trip_threshold_bps = bps;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Payload de `update_settings`: cada campo é opcional e independente.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub min_sources: Option<usize>,
    pub confidence_threshold: Option<u8>,
    pub deviation_threshold_bps: Option<u32>,
}

/// Parâmetros comuns a todos os pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolDefaults {
    /// Taxa do flash loan (9 bps = 0,09%).
    pub flash_fee_bps: u32,
    /// Fração máxima de uma reserva emprestável (1000 bps = 10%).
    pub flash_max_bps: u32,
    /// Piso de cada reserva após saques.
    pub min_reserve: u128,
}

impl Default for PoolDefaults {
    fn default() -> Self {
        Self {
            flash_fee_bps: 9,
            flash_max_bps: 1_000,
            min_reserve: 1,
        }
    }
}

impl PoolDefaults {
    pub fn validate(&self) -> Result<()> {
        if self.flash_fee_bps > BPS_SCALE {
            crate::core_bail!(ErrorCode::InvalidConfig, { "field" => "flash_fee_bps", "value" => self.flash_fee_bps });
        }
        bps_in_range("flash_max_bps", self.flash_max_bps)?;
        if self.min_reserve == 0 {
            crate::core_bail!(ErrorCode::InvalidConfig, { "field" => "min_reserve", "value" => 0 });
        }
        Ok(())
    }

    /// Lê `POOL_*` do ambiente; variáveis ausentes ficam no default.
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let p = Self {
            flash_fee_bps: env_or("POOL_FLASH_FEE_BPS", d.flash_fee_bps)?,
            flash_max_bps: env_or("POOL_FLASH_MAX_BPS", d.flash_max_bps)?,
            min_reserve: env_or("POOL_MIN_RESERVE", d.min_reserve)?,
        };
        p.validate()?;
        Ok(p)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            crate::core_err!(ErrorCode::InvalidConfig, { "field" => key, "value" => raw, "detalhe" => e })
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(OracleSettings::default().validate().is_ok());
        assert!(PoolDefaults::default().validate().is_ok());
        assert_eq!(OracleSettings::default().history_capacity, 720);
    }

    #[test]
    fn update_fields_are_independent() {
        let base = OracleSettings::default();
        let next = base
            .apply(&SettingsUpdate { min_sources: Some(5), ..Default::default() })
            .unwrap();
        assert_eq!(next.min_sources, 5);
        assert_eq!(next.confidence_threshold, base.confidence_threshold);
        assert_eq!(next.trip_threshold_bps, base.trip_threshold_bps);
    }

    #[test]
    fn invalid_update_rejected() {
        let base = OracleSettings::default();
        let err = base
            .apply(&SettingsUpdate { confidence_threshold: Some(101), ..Default::default() })
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidConfig);
        let err = base
            .apply(&SettingsUpdate { min_sources: Some(0), ..Default::default() })
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidConfig);
        // trip abaixo do reset (1000) também é inválido
        let err = base
            .apply(&SettingsUpdate { deviation_threshold_bps: Some(500), ..Default::default() })
            .unwrap_err();
        assert_eq!(err, ErrorCode::InvalidConfig);
    }

    #[test]
    fn deserialize_partial_uses_defaults() {
        let s: OracleSettings = serde_json::from_str(r#"{"min_sources": 4}"#).unwrap();
        assert_eq!(s.min_sources, 4);
        assert_eq!(s.trip_threshold_bps, 2_000);
    }
}
