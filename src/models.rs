use garde::Validate;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::entities::filme;

// Missing members fall back to empty defaults so they fail validation
// per field instead of rejecting the whole body.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateFilmeDto {
    #[garde(length(chars, min = 1, max = 50))]
    pub nome: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub genero: String,
    #[garde(range(min = 70, max = 300))]
    pub duracao: i32,
}

/// Mutable-field projection of a filme, target of both PUT and PATCH.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateFilmeDto {
    #[garde(length(chars, min = 1, max = 50))]
    pub nome: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub genero: String,
    #[garde(range(min = 70, max = 300))]
    pub duracao: i32,
}

impl From<&filme::Model> for UpdateFilmeDto {
    fn from(m: &filme::Model) -> Self {
        Self { nome: m.nome.clone(), genero: m.genero.clone(), duracao: m.duracao }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadFilmeDto {
    pub nome: String,
    pub genero: String,
    pub duracao: i32,
    pub hora_da_consulta: Timestamp,
}

impl From<filme::Model> for ReadFilmeDto {
    fn from(m: filme::Model) -> Self {
        Self { nome: m.nome, genero: m.genero, duracao: m.duracao, hora_da_consulta: Timestamp::now() }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilmeResponse {
    pub id: i32,
    pub nome: String,
    pub genero: String,
    pub duracao: i32,
}

impl From<filme::Model> for FilmeResponse {
    fn from(m: filme::Model) -> Self {
        Self { id: m.id, nome: m.nome, genero: m.genero, duracao: m.duracao }
    }
}

/// Largest offset or limit SQLite can bind.
pub const MAX_ROWS: u64 = i64::MAX as u64;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl ListQuery {
    /// Resolves `(skip, take)`, clamping `take` to `max_take` and both to [`MAX_ROWS`].
    pub fn resolve(&self, default_take: u64, max_take: u64) -> (u64, u64) {
        let skip = self.skip.unwrap_or(0).min(MAX_ROWS);
        let take = self.take.unwrap_or(default_take).min(max_take).min(MAX_ROWS);
        (skip, take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrors;

    const MIN_DURACAO: i32 = 70;
    const MAX_DURACAO: i32 = 300;

    fn dto(nome: &str, genero: &str, duracao: i32) -> CreateFilmeDto {
        CreateFilmeDto { nome: nome.into(), genero: genero.into(), duracao }
    }

    #[test]
    fn duracao_bounds_are_inclusive() {
        assert!(dto("Alien", "Terror", MIN_DURACAO).validate().is_ok());
        assert!(dto("Alien", "Terror", MAX_DURACAO).validate().is_ok());
        assert!(dto("Alien", "Terror", MIN_DURACAO - 1).validate().is_err());
        assert!(dto("Alien", "Terror", MAX_DURACAO + 1).validate().is_err());
    }

    #[test]
    fn nome_length_counts_characters() {
        let fifty = "é".repeat(50);
        assert!(dto(&fifty, "Drama", 120).validate().is_ok());
        let errors = FieldErrors::from(dto(&"x".repeat(51), "", 120).validate().unwrap_err());
        assert!(errors.get("nome").is_some());
        assert!(errors.get("genero").is_some());
        assert!(errors.get("duracao").is_none());
    }

    #[test]
    fn missing_members_become_field_errors() {
        let parsed: CreateFilmeDto = serde_json::from_str(r#"{"nome": "Alien"}"#).unwrap();
        let errors = FieldErrors::from(parsed.validate().unwrap_err());
        assert!(errors.get("genero").is_some());
        assert!(errors.get("duracao").is_some());
    }

    #[test]
    fn update_projection_enforces_duration_range() {
        let update = UpdateFilmeDto { nome: "Alien".into(), genero: "Terror".into(), duracao: 20 };
        assert!(update.validate().is_err());
    }

    #[test]
    fn list_query_defaults_and_clamps() {
        assert_eq!(ListQuery::default().resolve(50, 1000), (0, 50));
        let q = ListQuery { skip: Some(10), take: Some(5000) };
        assert_eq!(q.resolve(50, 1000), (10, 1000));
    }

    #[test]
    fn list_query_stays_within_sql_integers() {
        let q = ListQuery { skip: Some(u64::MAX), take: Some(u64::MAX) };
        assert_eq!(q.resolve(50, u64::MAX), (MAX_ROWS, MAX_ROWS));
    }
}
