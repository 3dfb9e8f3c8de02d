//! Tipos básicos do AMM (escala fixa de 9 casas) + identificadores.

use core::fmt;

use serde::{Deserialize, Serialize};

pub use crate::math::{U256, BPS_SCALE};

pub type Amount = u128; // escala 1e9
pub type Bps = u32; // 0..=10_000

pub const DECIMALS: u32 = 9;
pub const UNIT: Amount = 1_000_000_000; // 1e9
/// Escala do preço spot `reserveOut * 1e6 / reserveIn`.
pub const PRICE_SCALE: u128 = 1_000_000;
/// Fator do stable-swap simplificado: 0,997 = 997/1000.
pub const STABLE_NUM: u128 = 997;
pub const STABLE_DEN: u128 = 1_000;

/// Identificador do pool (ex.: `"SOL/USDC"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PoolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lado de uma reserva.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

/// Sentido de um swap.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    AToB,
    BToA,
}

impl SwapDirection {
    pub const fn input_side(self) -> Side {
        match self {
            Self::AToB => Side::A,
            Self::BToA => Side::B,
        }
    }
}

/// Curva de precificação do pool.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    ConstantProduct,
    /// `amplification` fica guardado como metadado; a fórmula ainda não o usa.
    StableSwap { amplification: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reserves {
    pub a: Amount,
    pub b: Amount,
}

impl Reserves {
    pub fn new(a: Amount, b: Amount) -> Self {
        Self { a, b }
    }

    /// `(reserve_in, reserve_out)` para o sentido dado.
    pub fn oriented(&self, direction: SwapDirection) -> (Amount, Amount) {
        match direction {
            SwapDirection::AToB => (self.a, self.b),
            SwapDirection::BToA => (self.b, self.a),
        }
    }

    pub fn get(&self, side: Side) -> Amount {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// `k = a * b` em 256 bits.
    pub fn k(&self) -> U256 {
        U256::from(self.a) * U256::from(self.b)
    }
}
