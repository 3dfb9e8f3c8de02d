//! Identidade do chamador e verificação de permissão administrativa.
//!
//! A camada de ledger autentica o chamador e fornece o "agora" monotônico; o núcleo
//! apenas confia nesses dados e nunca consulta relógio próprio.
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error_catalog::ErrorCode;

/// Segundos unix fornecidos pelo chamador.
pub type Timestamp = u64;

/// Principal de 32 bytes (chave pública / conta).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Endereço com todos os bytes iguais; prático em testes e demos.
    pub const fn repeat_byte(b: u8) -> Self {
        Self([b; 32])
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| {
            crate::core_err!(ErrorCode::InvalidConfig, address => s, detalhe => e)
        })?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| crate::core_err!(ErrorCode::InvalidConfig, address => s))?;
        Ok(Self(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // forma curta: 0xabcd…
        write!(f, "Address(0x{}…)", &self.to_hex()[..8])
    }
}

/// Contexto de cada chamada: quem chama e quando.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub now: Timestamp,
}

impl CallContext {
    pub const fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

/// Falha com `Unauthorized` se `caller` não for o admin registrado.
pub fn ensure_admin(caller: &Address, admin: &Address) -> Result<()> {
    if caller != admin {
        crate::core_bail!(ErrorCode::Unauthorized, caller => caller);
    }
    Ok(())
}
