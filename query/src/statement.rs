//! SQL text plus the values bound to it.
//!
//! Templates are written with `:name` placeholders (and `?` for positional
//! ones). [`Statement::compile`] turns them into PostgreSQL `$n` parameters
//! right before execution.

use crate::errors::QueryError;
use crate::models::SqlValue;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    named: Vec<(String, SqlValue)>,
    positional: Vec<SqlValue>,
}

/// A statement ready for the driver: `$n` placeholders and binds in `$n` order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            named: Vec::new(),
            positional: Vec::new(),
        }
    }

    /// Binds a named parameter, replacing an earlier value for the same name.
    pub fn bind(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        match self.named.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name.to_string(), value)),
        }
        self
    }

    pub fn bind_positional(mut self, value: impl Into<SqlValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param(&self, name: &str) -> Option<&SqlValue> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Named parameters in bind order.
    pub fn named_params(&self) -> &[(String, SqlValue)] {
        &self.named
    }

    pub fn positional_params(&self) -> &[SqlValue] {
        &self.positional
    }

    /// Distinct `:name` placeholders referenced by the SQL text, in first-use order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in segments(&self.sql) {
            if let Segment::Named(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn compile(&self) -> Result<CompiledStatement, QueryError> {
        let mut sql = String::with_capacity(self.sql.len() + 8);
        let mut binds: Vec<SqlValue> = Vec::new();
        let mut slots: Vec<(&str, usize)> = Vec::new();
        let mut positional = self.positional.iter();

        for segment in segments(&self.sql) {
            match segment {
                Segment::Text(text) => sql.push_str(text),
                Segment::Named(name) => {
                    let value = self
                        .param(name)
                        .ok_or_else(|| QueryError::MissingParameter(name.to_string()))?;
                    if value.is_null() {
                        sql.push_str("NULL");
                        continue;
                    }
                    let index = match slots.iter().find(|(n, _)| *n == name) {
                        Some((_, index)) => *index,
                        None => {
                            binds.push(value.clone());
                            slots.push((name, binds.len()));
                            binds.len()
                        }
                    };
                    sql.push('$');
                    sql.push_str(&index.to_string());
                }
                Segment::Positional => {
                    let value = positional.next().ok_or_else(|| {
                        QueryError::MissingParameter(format!("?{}", binds.len() + 1))
                    })?;
                    if value.is_null() {
                        sql.push_str("NULL");
                        continue;
                    }
                    binds.push(value.clone());
                    sql.push('$');
                    sql.push_str(&binds.len().to_string());
                }
            }
        }

        Ok(CompiledStatement { sql, binds })
    }
}

enum Segment<'a> {
    Text(&'a str),
    Named(&'a str),
    Positional,
}

// Quoted literals and `::type` casts pass through untouched.
fn segments(sql: &str) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut in_quote = false;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                in_quote = !in_quote;
                i += 1;
            }
            _ if in_quote => i += 1,
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') =>
            {
                if start < i {
                    out.push(Segment::Text(&sql[start..i]));
                }
                let name_start = i + 1;
                let mut end = name_start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                out.push(Segment::Named(&sql[name_start..end]));
                i = end;
                start = end;
            }
            b'?' => {
                if start < i {
                    out.push(Segment::Text(&sql[start..i]));
                }
                out.push(Segment::Positional);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        out.push(Segment::Text(&sql[start..]));
    }
    out
}
