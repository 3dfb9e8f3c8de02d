//! Tipo de erro unificado do núcleo com formatação estável.
use core::fmt;
use std::collections::BTreeMap;

use crate::error_catalog::{default_locale_message, ErrorCode};

const CONTEXT_VALUE_MAX: usize = 256;

fn sanitize_value(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| match ch {
            '\n' | '\r' | '\t' => ' ',
            _ => ch,
        })
        .collect();
    if cleaned.chars().count() > CONTEXT_VALUE_MAX {
        let mut truncated = cleaned
            .chars()
            .take(CONTEXT_VALUE_MAX - 1)
            .collect::<String>();
        truncated.push('…');
        truncated
    } else {
        cleaned
    }
}

fn render_template(template: &str, context: &BTreeMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            rendered.push(ch);
            continue;
        }
        let mut key = String::new();
        for next in chars.by_ref() {
            if next == '}' {
                break;
            }
            key.push(next);
        }
        match context.get(&key) {
            Some(value) if !key.is_empty() => rendered.push_str(value),
            _ => {
                rendered.push('{');
                rendered.push_str(&key);
                rendered.push('}');
            }
        }
    }
    rendered
}

/// Erro do núcleo com contexto estruturado.
#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub context: BTreeMap<String, String>,
}

impl Error {
    /// Cria um novo erro sem contexto adicional.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            context: BTreeMap::new(),
        }
    }

    /// Adiciona um par chave/valor ao contexto.
    pub fn with_context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let key_string = key.into();
        if !key_string.is_empty() {
            let sanitized = sanitize_value(&value.to_string());
            self.context.insert(key_string, sanitized);
        }
        self
    }

    fn resolved_message(&self) -> String {
        render_template(default_locale_message(self.code), &self.context)
    }

    /// Mensagem curta para UI.
    pub fn to_user_string(&self) -> String {
        format!("[{}] {}", self.code.code(), self.resolved_message())
    }

    /// Renderiza um template arbitrário usando o contexto atual.
    pub fn render_with_template(&self, template: &str) -> String {
        render_template(template, &self.context)
    }

    /// Serialização estável em JSON para logs.
    pub fn to_log_json(&self) -> String {
        serde_json::json!({
            "code": self.code.code(),
            "title": self.code.title(),
            "message": self.resolved_message(),
            "context": self.context,
        })
        .to_string()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl std::error::Error for Error {}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Error::new(code)
    }
}

impl PartialEq<ErrorCode> for Error {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.code == *other
    }
}

/// Resultado padrão das operações do núcleo.
pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! core_err {
  ($code:expr) => {{
    $crate::error::Error::new($code)
  }};
  ($code:expr, $($key:ident => $value:expr),+ $(,)?) => {{
    let mut err = $crate::error::Error::new($code);
    $(
      err = err.with_context(stringify!($key), $value);
    )+
    err
  }};
  ($code:expr, { $($key:expr => $value:expr),+ $(,)? }) => {{
    let mut err = $crate::error::Error::new($code);
    $(
      err = err.with_context($key, $value);
    )+
    err
  }};
}

#[macro_export]
macro_rules! core_bail {
  ($($tt:tt)*) => {
    return Err($crate::core_err!($($tt)*))
  };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_string_basic() {
        let err = Error::new(ErrorCode::InvalidAmount);
        assert_eq!(err.to_user_string(), "[AMM-0001] amount deve ser > 0");
    }

    #[test]
    fn placeholder_subst() {
        let err = Error::new(ErrorCode::Overflow).with_context("detalhe", "valor");
        assert_eq!(err.render_with_template("falha {detalhe}"), "falha valor");
    }

    #[test]
    fn log_json_shape() {
        let err = Error::new(ErrorCode::InsufficientLiquidity).with_context("reserve", "0");
        let parsed: serde_json::Value = serde_json::from_str(&err.to_log_json()).unwrap();
        assert_eq!(parsed["code"], "AMM-0002");
        assert_eq!(parsed["title"], "Liquidez insuficiente");
        assert_eq!(parsed["context"]["reserve"], "0");
        assert!(parsed["message"].is_string());
    }

    #[test]
    fn macros_variants() {
        let err = core_err!(ErrorCode::InvalidAmount, amount => 0);
        assert_eq!(err, ErrorCode::InvalidAmount);
        assert_eq!(err.context.get("amount").unwrap(), "0");

        let err_block = core_err!(ErrorCode::UnknownPair, { "pair" => "SOL/USDC" });
        assert_eq!(err_block.code, ErrorCode::UnknownPair);
        assert_eq!(err_block.context.get("pair").unwrap(), "SOL/USDC");
    }

    #[test]
    fn bail_returns_early() {
        fn check(v: u64) -> Result<u64> {
            if v == 0 {
                core_bail!(ErrorCode::InvalidAmount, amount => v);
            }
            Ok(v)
        }
        assert_eq!(check(0).unwrap_err(), ErrorCode::InvalidAmount);
        assert_eq!(check(7).unwrap(), 7);
    }
}
