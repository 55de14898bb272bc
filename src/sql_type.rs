//! SQL type tokens accepted for target columns.
//!
//! Target types travel through the session as plain strings so that hand
//! entered types survive untouched. [`SqlType`] is the parsed view used where a
//! type has to be checked: persisted schema documents, CLI defaults and the
//! advisory type check on a session.

use std::{fmt, str::FromStr};

use anyhow::{Context, Result, anyhow, bail, ensure};

/// Type assigned to every column of a schema generated from CSV headers.
pub const DEFAULT_TARGET_TYPE: &str = "NVARCHAR(100)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    NVarChar,
    VarChar,
    Char,
}

impl TextKind {
    fn as_str(&self) -> &'static str {
        match self {
            TextKind::NVarChar => "NVARCHAR",
            TextKind::VarChar => "VARCHAR",
            TextKind::Char => "CHAR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalKind {
    Decimal,
    Numeric,
}

impl DecimalKind {
    fn as_str(&self) -> &'static str {
        match self {
            DecimalKind::Decimal => "DECIMAL",
            DecimalKind::Numeric => "NUMERIC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    BigInt,
    Float,
    Real,
    Bit,
    Date,
    DateTime,
    DateTime2,
    Decimal {
        kind: DecimalKind,
        precision: u32,
        scale: u32,
    },
    Text {
        kind: TextKind,
        length: u32,
    },
}

impl SqlType {
    /// Tokens offered when picking a type for a column.
    pub fn catalogue() -> &'static [&'static str] {
        &[
            "INT",
            "BIGINT",
            "FLOAT",
            "REAL",
            "DECIMAL(18,2)",
            "NUMERIC(18,2)",
            "BIT",
            "DATE",
            "DATETIME",
            "DATETIME2",
            "NVARCHAR(100)",
            "VARCHAR(100)",
            "CHAR(10)",
        ]
    }

    pub fn is_supported(token: &str) -> bool {
        token.parse::<SqlType>().is_ok()
    }

    pub fn base_name(&self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Bit => "BIT",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
            SqlType::DateTime2 => "DATETIME2",
            SqlType::Decimal { kind, .. } => kind.as_str(),
            SqlType::Text { kind, .. } => kind.as_str(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SqlType::Text { .. })
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Decimal {
                kind,
                precision,
                scale,
            } => write!(f, "{}({precision},{scale})", kind.as_str()),
            SqlType::Text { kind, length } => write!(f, "{}({length})", kind.as_str()),
            other => f.write_str(other.base_name()),
        }
    }
}

impl FromStr for SqlType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        let (base, args) = match normalized.split_once('(') {
            Some((base, rest)) => {
                let inner = rest
                    .strip_suffix(')')
                    .ok_or_else(|| anyhow!("Type '{value}' must close with ')'"))?;
                (base.trim(), Some(inner))
            }
            None => (normalized.as_str(), None),
        };

        match (base, args) {
            ("INT", None) => Ok(SqlType::Int),
            ("BIGINT", None) => Ok(SqlType::BigInt),
            ("FLOAT", None) => Ok(SqlType::Float),
            ("REAL", None) => Ok(SqlType::Real),
            ("BIT", None) => Ok(SqlType::Bit),
            ("DATE", None) => Ok(SqlType::Date),
            ("DATETIME", None) => Ok(SqlType::DateTime),
            ("DATETIME2", None) => Ok(SqlType::DateTime2),
            ("DECIMAL", Some(inner)) => parse_decimal(DecimalKind::Decimal, inner, value),
            ("NUMERIC", Some(inner)) => parse_decimal(DecimalKind::Numeric, inner, value),
            ("NVARCHAR", Some(inner)) => parse_text(TextKind::NVarChar, inner, value),
            ("VARCHAR", Some(inner)) => parse_text(TextKind::VarChar, inner, value),
            ("CHAR", Some(inner)) => parse_text(TextKind::Char, inner, value),
            _ => Err(anyhow!(
                "Unsupported type '{value}'. Supported types: {}",
                SqlType::catalogue().join(", ")
            )),
        }
    }
}

fn parse_decimal(kind: DecimalKind, inner: &str, original: &str) -> Result<SqlType> {
    let Some((precision, scale)) = inner.split_once(',') else {
        bail!(
            "{} type requires precision and scale, e.g. {}(18,2)",
            kind.as_str(),
            kind.as_str()
        );
    };
    let precision: u32 = precision
        .trim()
        .parse()
        .with_context(|| format!("Parsing precision in '{original}'"))?;
    let scale: u32 = scale
        .trim()
        .parse()
        .with_context(|| format!("Parsing scale in '{original}'"))?;
    ensure!(precision > 0, "Precision in '{original}' must be positive");
    ensure!(
        scale <= precision,
        "Scale ({scale}) cannot exceed precision ({precision}) in '{original}'"
    );
    Ok(SqlType::Decimal {
        kind,
        precision,
        scale,
    })
}

fn parse_text(kind: TextKind, inner: &str, original: &str) -> Result<SqlType> {
    let length: u32 = inner
        .trim()
        .parse()
        .with_context(|| format!("Parsing length in '{original}'"))?;
    ensure!(length > 0, "Length in '{original}' must be positive");
    Ok(SqlType::Text { kind, length })
}

/// `clap` value parser that keeps the user's token once it is known to parse.
pub fn parse_type_token(value: &str) -> Result<String, String> {
    value
        .parse::<SqlType>()
        .map(|_| value.trim().to_string())
        .map_err(|err| err.to_string())
}
