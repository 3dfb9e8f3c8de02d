//! Catálogo imutável de erros do núcleo (AMM, oráculo, autorização e configuração).
use core::fmt;

/// Código de erro estável.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    /// Montante zerado ou malformado.
    InvalidAmount,
    /// Reservas insuficientes para a operação.
    InsufficientLiquidity,
    /// Resultado violou o limite informado pelo chamador.
    SlippageExceeded,
    /// Flash loan devolvido sem principal + taxa.
    InsufficientRepayment,
    /// Overflow ou underflow em cálculos numéricos.
    Overflow,
    /// Pool já inicializado.
    PoolExists,
    /// Pool inexistente.
    UnknownPool,
    /// Confiança fora de [0, 100].
    InvalidConfidence,
    /// Stake zerado ou reporter já registrado.
    InvalidStake,
    /// Fontes frescas abaixo do quórum.
    InsufficientDataSources,
    /// Circuit breaker disparado para o par.
    CircuitBreakerActive,
    /// Preço publicado está velho.
    StalePrice,
    /// Par inexistente.
    UnknownPair,
    /// Par já cadastrado.
    PairExists,
    /// Reporter não registrado.
    UnknownReporter,
    /// Submissões pausadas pelo admin.
    OraclePaused,
    /// Par desativado.
    PairInactive,
    /// Chamador sem permissão.
    Unauthorized,
    /// Configuração administrativa inválida.
    InvalidConfig,
}

impl ErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "AMM-0001",
            Self::InsufficientLiquidity => "AMM-0002",
            Self::SlippageExceeded => "AMM-0003",
            Self::InsufficientRepayment => "AMM-0004",
            Self::Overflow => "AMM-0005",
            Self::PoolExists => "AMM-0006",
            Self::UnknownPool => "AMM-0007",
            Self::InvalidConfidence => "ORC-0001",
            Self::InvalidStake => "ORC-0002",
            Self::InsufficientDataSources => "ORC-0003",
            Self::CircuitBreakerActive => "ORC-0004",
            Self::StalePrice => "ORC-0005",
            Self::UnknownPair => "ORC-0006",
            Self::PairExists => "ORC-0007",
            Self::UnknownReporter => "ORC-0008",
            Self::OraclePaused => "ORC-0009",
            Self::PairInactive => "ORC-0010",
            Self::Unauthorized => "AUT-0001",
            Self::InvalidConfig => "CFG-0001",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "Montante inválido",
            Self::InsufficientLiquidity => "Liquidez insuficiente",
            Self::SlippageExceeded => "Slippage excedido",
            Self::InsufficientRepayment => "Pagamento insuficiente",
            Self::Overflow => "Overflow numérico",
            Self::PoolExists => "Pool já existe",
            Self::UnknownPool => "Pool desconhecido",
            Self::InvalidConfidence => "Confiança inválida",
            Self::InvalidStake => "Stake inválido",
            Self::InsufficientDataSources => "Fontes insuficientes",
            Self::CircuitBreakerActive => "Circuit breaker ativo",
            Self::StalePrice => "Preço desatualizado",
            Self::UnknownPair => "Par desconhecido",
            Self::PairExists => "Par já existe",
            Self::UnknownReporter => "Reporter desconhecido",
            Self::OraclePaused => "Oráculo pausado",
            Self::PairInactive => "Par inativo",
            Self::Unauthorized => "Não autorizado",
            Self::InvalidConfig => "Configuração inválida",
        }
    }

    /// Mensagem base em português. Aceita placeholders `{chave}` do contexto.
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "amount deve ser > 0",
            Self::InsufficientLiquidity => "reservas insuficientes para a operação",
            Self::SlippageExceeded => "resultado abaixo do mínimo aceito",
            Self::InsufficientRepayment => "pagamento não cobre principal + taxa",
            Self::Overflow => "overflow/underflow numérico",
            Self::PoolExists => "pool já inicializado",
            Self::UnknownPool => "pool não encontrado",
            Self::InvalidConfidence => "confiança deve estar em [0, 100]",
            Self::InvalidStake => "stake deve ser > 0 e o reporter não pode estar registrado",
            Self::InsufficientDataSources => "fontes frescas abaixo do quórum",
            Self::CircuitBreakerActive => "circuit breaker disparado para o par",
            Self::StalePrice => "último preço publicado está velho",
            Self::UnknownPair => "par não encontrado",
            Self::PairExists => "par já cadastrado",
            Self::UnknownReporter => "reporter não registrado",
            Self::OraclePaused => "submissões pausadas",
            Self::PairInactive => "par desativado",
            Self::Unauthorized => "chamador sem permissão",
            Self::InvalidConfig => "configuração administrativa inválida",
        }
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [ErrorCode] {
        const ALL: &[ErrorCode] = &[
            ErrorCode::InvalidAmount,
            ErrorCode::InsufficientLiquidity,
            ErrorCode::SlippageExceeded,
            ErrorCode::InsufficientRepayment,
            ErrorCode::Overflow,
            ErrorCode::PoolExists,
            ErrorCode::UnknownPool,
            ErrorCode::InvalidConfidence,
            ErrorCode::InvalidStake,
            ErrorCode::InsufficientDataSources,
            ErrorCode::CircuitBreakerActive,
            ErrorCode::StalePrice,
            ErrorCode::UnknownPair,
            ErrorCode::PairExists,
            ErrorCode::UnknownReporter,
            ErrorCode::OraclePaused,
            ErrorCode::PairInactive,
            ErrorCode::Unauthorized,
            ErrorCode::InvalidConfig,
        ];
        ALL
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: ErrorCode) -> &'static str {
    code.message_pt()
}
